//! Authentication service — login orchestration.

use nestsite_core::error::{NestError, NestResult};
use nestsite_core::models::user::{User, UserStatus};
use nestsite_core::repository::UserRepository;
use nestsite_core::validation::validate_email;
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::config::AuthConfig;
use crate::error::AuthError;
use crate::password;
use crate::token;

/// Input for the login flow.
#[derive(Debug, Deserialize)]
pub struct LoginInput {
    pub email: String,
    pub password: String,
}

/// Successful login result.
#[derive(Debug, Serialize)]
pub struct LoginOutput {
    /// Signed JWT access token.
    pub access_token: String,
    pub token_type: &'static str,
    /// Access token lifetime in seconds.
    pub expires_in: u64,
    pub user_id: Uuid,
}

/// Authentication service.
///
/// Generic over the user repository so that the auth layer has no
/// dependency on the database crate.
pub struct AuthService<U: UserRepository> {
    user_repo: U,
    config: AuthConfig,
}

impl<U: UserRepository> AuthService<U> {
    pub fn new(user_repo: U, config: AuthConfig) -> Self {
        Self { user_repo, config }
    }

    pub fn config(&self) -> &AuthConfig {
        &self.config
    }

    /// Authenticate a user with email + password and issue an access
    /// token.
    pub async fn login(&self, input: LoginInput) -> NestResult<LoginOutput> {
        // Unknown and malformed emails look the same as a bad password.
        let email = validate_email(&input.email).map_err(|_| AuthError::InvalidCredentials)?;
        let user = self
            .user_repo
            .get_by_email(&email)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        // Password first: account status is only revealed to its owner.
        let valid = match user.password_hash.as_deref() {
            Some(hash) => {
                password::verify_password(&input.password, hash, self.config.pepper.as_deref())
                    .map_err(|e| NestError::Crypto(e.to_string()))?
            }
            None => false,
        };
        if !valid {
            return Err(AuthError::InvalidCredentials.into());
        }

        ensure_active(&user)?;

        let access_token = token::issue_access_token(user.id, user.agency_id, &self.config)?;
        info!(user_id = %user.id, "User logged in");

        Ok(LoginOutput {
            access_token,
            token_type: "Bearer",
            expires_in: self.config.access_token_lifetime_secs,
            user_id: user.id,
        })
    }

    /// Validate a bearer token and load the user it names, rejecting
    /// users that were disabled after the token was issued.
    pub async fn authenticate(&self, bearer: &str) -> NestResult<User> {
        let claims = token::validate_access_token(bearer, &self.config)?;
        let user_id = claims.user_id()?;
        let user = self
            .user_repo
            .get_by_id(user_id)
            .await
            .map_err(|e| match e {
                NestError::NotFound { .. } => {
                    AuthError::TokenInvalid("user no longer exists".into()).into()
                }
                other => other,
            })?;
        ensure_active(&user)?;
        Ok(user)
    }
}

fn ensure_active(user: &User) -> Result<(), AuthError> {
    match user.status {
        UserStatus::Active => Ok(()),
        UserStatus::Invited => Err(AuthError::AccountInvited),
        UserStatus::Disabled => Err(AuthError::AccountDisabled),
    }
}
