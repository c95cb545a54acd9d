//! NestSite Core — domain models, error types, validation rules and
//! the repository traits implemented by the database layer.

pub mod error;
pub mod models;
pub mod repository;
pub mod validation;

pub use error::{ImportIssue, NestError, NestResult};
