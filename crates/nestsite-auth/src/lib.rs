//! NestSite Auth — password hashing, JWT issuance/validation, invite
//! tokens and tenant-scoped access control.

pub mod access;
pub mod config;
pub mod error;
pub mod password;
pub mod service;
pub mod token;

pub use access::{Action, Principal, authorize, authorize_agency, role_allows};
pub use config::AuthConfig;
pub use error::AuthError;
pub use service::{AuthService, LoginInput, LoginOutput};
pub use token::{AccessTokenClaims, ValidatedClaims};
