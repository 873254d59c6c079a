use std::sync::Arc;

use anyhow::Context;
use tracing::{debug, info, instrument};

use crate::{
    auth::{
        jwt::{generate_access_token, verify_token},
        password::{DUMMY_HASH, hash_password, verify_password},
    },
    error::AppError,
    model::user::User,
    models::MAX_FIELD_LEN,
    store::UserStore,
};

/// Registration, credential checks and token issuance over a [`UserStore`].
pub struct AuthService {
    users: Arc<dyn UserStore>,
    jwt_secret: String,
    token_ttl: usize,
}

impl AuthService {
    pub fn new(users: Arc<dyn UserStore>, jwt_secret: String, token_ttl: usize) -> Self {
        Self {
            users,
            jwt_secret,
            token_ttl,
        }
    }

    #[instrument(name = "auth_register", skip(self, password, full_name))]
    pub async fn register(&self, email: &str, password: &str, full_name: &str) -> Result<(), AppError> {
        if email.len() > MAX_FIELD_LEN || full_name.len() > MAX_FIELD_LEN {
            info!("Registration refused: field too long");
            return Err(AppError::InvalidBody);
        }

        // cheap check first so taken emails skip the hash
        if self.users.get(email).await?.is_some() {
            info!("Registration refused: email taken");
            return Err(AppError::AlreadyRegistered);
        }

        let user = User {
            email: email.to_string(),
            password_hash: hash_password(password)?,
            full_name: full_name.to_string(),
            is_admin: false,
        };

        if !self.users.insert(user).await? {
            info!("Registration refused: email taken");
            return Err(AppError::AlreadyRegistered);
        }

        info!("User registered");
        Ok(())
    }

    /// Unknown email and wrong password fail the same way.
    #[instrument(name = "auth_login", skip(self, password))]
    pub async fn login(&self, email: &str, password: &str) -> Result<(String, User), AppError> {
        let Some(user) = self.users.get(email).await? else {
            // same hashing cost as a real mismatch
            verify_password(password, DUMMY_HASH);
            info!("Invalid credentials: user not found");
            return Err(AppError::InvalidCredentials);
        };

        if !verify_password(password, &user.password_hash) {
            info!("Invalid credentials: password mismatch");
            return Err(AppError::InvalidCredentials);
        }

        let token = generate_access_token(&user.email, &self.jwt_secret, self.token_ttl)
            .context("failed to sign access token")?;

        info!("Login successful");
        Ok((token, user))
    }

    /// Email carried by a valid token. Bad signature, malformed and expired
    /// tokens all yield `None`.
    pub fn verify_token(&self, token: &str) -> Option<String> {
        match verify_token(token, &self.jwt_secret) {
            Ok(claims) => Some(claims.sub),
            Err(e) => {
                debug!(error = %e, "Token rejected");
                None
            }
        }
    }

    /// Resolves the caller behind an optional bearer token.
    pub async fn authenticate(&self, token: Option<&str>) -> Result<User, AppError> {
        let token = token.ok_or(AppError::TokenRequired)?;
        let email = self.verify_token(token).ok_or(AppError::Unauthorized)?;

        // a valid token for a user that no longer exists
        self.users
            .get(&email)
            .await?
            .ok_or(AppError::Unauthorized)
    }

    /// Seeds an admin account at startup. Returns `false` when the email is
    /// already registered, leaving that account untouched.
    pub async fn bootstrap_admin(
        &self,
        email: &str,
        password: &str,
        full_name: &str,
    ) -> anyhow::Result<bool> {
        if self.users.get(email).await?.is_some() {
            return Ok(false);
        }

        let admin = User {
            email: email.to_string(),
            password_hash: hash_password(password)?,
            full_name: full_name.to_string(),
            is_admin: true,
        };

        self.users.insert(admin).await
    }
}
