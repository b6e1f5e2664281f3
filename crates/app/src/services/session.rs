use crate::auth::{AuthGuard, CredentialCheck, Credentials, SessionCookieCheck, hash_password};
use crate::config::{ConfigError, ENV_PASSWORD};
use crate::error::{AppError, Result};
use crate::services::SharedConfig;

/// Issues and inspects the dashboard session cookie.
#[derive(Clone)]
pub struct SessionService {
    config: SharedConfig,
    guard: AuthGuard,
}

impl SessionService {
    pub(super) fn new(config: SharedConfig, guard: AuthGuard) -> Self {
        Self { config, guard }
    }

    /// Checks `password` and returns the cookie value to hand back.
    pub fn login(&self, password: &str) -> Result<String> {
        let Some(expected) = self.config.password.as_deref() else {
            return Err(ConfigError::Missing(ENV_PASSWORD).into());
        };
        let token = hash_password(password);
        let candidate = Credentials {
            authorization: None,
            session_cookie: Some(token.clone()),
        };
        if !SessionCookieCheck::for_password(expected).verify(&candidate) {
            tracing::warn!("login rejected");
            return Err(AppError::Unauthorized("Invalid password".to_string()));
        }
        Ok(token)
    }

    pub fn is_authenticated(&self, credentials: &Credentials) -> bool {
        self.guard.authorize(credentials)
    }
}
