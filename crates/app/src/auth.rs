//! Request authorization for the dashboard.
//!
//! Two strategies can vouch for a request: a static bearer token (the
//! dashboard password or the cron secret) and the session cookie issued at
//! login. They run in that order and the first match wins.

use std::fmt::Write;
use std::sync::Arc;

use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;

use crate::config::DashboardConfig;

pub const SESSION_COOKIE: &str = "dashboard_auth";

/// Credential material lifted off an inbound request.
#[derive(Debug, Clone, Default)]
pub struct Credentials {
    pub authorization: Option<String>,
    pub session_cookie: Option<String>,
}

pub trait CredentialCheck: Send + Sync {
    fn name(&self) -> &'static str;
    fn verify(&self, credentials: &Credentials) -> bool;
}

/// Accepts `Authorization: Bearer <secret>` for any configured secret.
pub struct BearerTokenCheck {
    accepted: Vec<String>,
}

impl BearerTokenCheck {
    /// Returns `None` when every secret is empty.
    pub fn new<'a>(secrets: impl IntoIterator<Item = &'a str>) -> Option<Self> {
        let accepted: Vec<String> = secrets
            .into_iter()
            .filter(|secret| !secret.is_empty())
            .map(|secret| format!("Bearer {secret}"))
            .collect();
        if accepted.is_empty() {
            None
        } else {
            Some(Self { accepted })
        }
    }
}

impl CredentialCheck for BearerTokenCheck {
    fn name(&self) -> &'static str {
        "bearer"
    }

    fn verify(&self, credentials: &Credentials) -> bool {
        let Some(header) = credentials.authorization.as_deref() else {
            return false;
        };
        self.accepted
            .iter()
            .any(|accepted| constant_time_eq(accepted, header))
    }
}

/// Accepts a session cookie carrying the password digest.
pub struct SessionCookieCheck {
    expected: String,
}

impl SessionCookieCheck {
    pub fn for_password(password: &str) -> Self {
        Self {
            expected: hash_password(password),
        }
    }
}

impl CredentialCheck for SessionCookieCheck {
    fn name(&self) -> &'static str {
        "session_cookie"
    }

    fn verify(&self, credentials: &Credentials) -> bool {
        credentials
            .session_cookie
            .as_deref()
            .is_some_and(|value| constant_time_eq(&self.expected, value))
    }
}

#[derive(Clone)]
pub struct AuthGuard {
    checks: Arc<Vec<Box<dyn CredentialCheck>>>,
}

impl AuthGuard {
    pub fn new(checks: Vec<Box<dyn CredentialCheck>>) -> Self {
        Self {
            checks: Arc::new(checks),
        }
    }

    pub fn from_config(config: &DashboardConfig) -> Self {
        let mut checks: Vec<Box<dyn CredentialCheck>> = Vec::new();
        let secrets = [config.password.as_deref(), config.cron_secret.as_deref()];
        if let Some(bearer) = BearerTokenCheck::new(secrets.into_iter().flatten()) {
            checks.push(Box::new(bearer));
        }
        if let Some(password) = config.password.as_deref() {
            checks.push(Box::new(SessionCookieCheck::for_password(password)));
        }
        Self::new(checks)
    }

    /// Name of the first strategy that accepts `credentials`.
    pub fn accepted_by(&self, credentials: &Credentials) -> Option<&'static str> {
        self.checks
            .iter()
            .find(|check| check.verify(credentials))
            .map(|check| check.name())
    }

    pub fn authorize(&self, credentials: &Credentials) -> bool {
        self.accepted_by(credentials).is_some()
    }
}

/// Lowercase hex SHA-256 of `value`.
pub fn hash_password(value: &str) -> String {
    let digest = Sha256::digest(value.as_bytes());
    let mut out = String::with_capacity(digest.len() * 2);
    for byte in digest {
        let _ = write!(out, "{byte:02x}");
    }
    out
}

fn constant_time_eq(a: &str, b: &str) -> bool {
    a.len() == b.len() && a.as_bytes().ct_eq(b.as_bytes()).into()
}
