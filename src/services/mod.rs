//! Business operations over the shared pool. Services are cheap to build and
//! are constructed per request from [`crate::state::AppState`].

pub mod activity_service;
pub mod chart_service;
pub mod entry_service;
pub mod user_service;

pub use activity_service::ActivityService;
pub use chart_service::{ChartRowSource, ChartService, ChartView, PgChartRowSource};
pub use entry_service::{BulkEntryUpdate, EntryService};
pub use user_service::UserService;

use thiserror::Error;

use crate::auth::{AuthError, PasswordError};
use crate::chart::ChartError;
use crate::database::DatabaseError;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    #[error(transparent)]
    Database(#[from] DatabaseError),

    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error(transparent)]
    Password(#[from] PasswordError),

    #[error(transparent)]
    Chart(#[from] ChartError),
}

impl From<sqlx::Error> for ServiceError {
    fn from(err: sqlx::Error) -> Self {
        ServiceError::Database(err.into())
    }
}

pub type ServiceResult<T> = Result<T, ServiceError>;

/// Maps a unique violation to a conflict with `message`, leaves other errors alone
pub(crate) fn conflict_on_unique(err: sqlx::Error, message: &str) -> ServiceError {
    if let sqlx::Error::Database(db_err) = &err {
        if db_err.is_unique_violation() {
            return ServiceError::Conflict(message.to_string());
        }
    }
    err.into()
}
