pub mod app;
pub mod auth;
pub mod config;
pub mod error;
pub mod services;
pub mod store;
pub mod util;

pub use app::AppState;
pub use auth::{
    AuthGuard, BearerTokenCheck, CredentialCheck, Credentials, SESSION_COOKIE, SessionCookieCheck,
    hash_password,
};
pub use config::{ConfigError, DashboardConfig, RangeParams};
pub use error::{ApiError, AppError, Result};
pub use services::{
    AnalyticsService, AppServices, InsertSummary, RecordsQuery, SessionService, SyncError,
    SyncReport, SyncService,
};
pub use store::{SqliteUsageStore, UsageStore};
pub use util::time::{normalize_rfc3339_to_utc, resolve_range};
