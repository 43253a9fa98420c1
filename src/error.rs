use thiserror::Error;
use tonic::Status;
use uuid::Uuid;

/// One line of a loan request that asked for more than is available.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Shortfall {
    pub item_id: Uuid,
    pub requested: i64,
    pub available: i64,
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Invalid input: {0}")]
    Validation(String),

    #[error("Duplicate asset code '{code}' (already used by item {existing_id})")]
    DuplicateCode { code: String, existing_id: Uuid },

    #[error("Insufficient availability: {}", describe_shortfalls(.0))]
    InsufficientAvailability(Vec<Shortfall>),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Blob storage error: {0}")]
    Blob(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn missing_fields(fields: &[&str]) -> Self {
        AppError::Validation(format!("missing required field(s): {}", fields.join(", ")))
    }

    pub fn item_not_found() -> Self {
        AppError::NotFound("Item not found".to_string())
    }

    pub fn loan_not_found() -> Self {
        AppError::NotFound("Loan not found".to_string())
    }
}

fn describe_shortfalls(shortfalls: &[Shortfall]) -> String {
    shortfalls
        .iter()
        .map(|s| {
            format!(
                "item {} requested {} but only {} available",
                s.item_id, s.requested, s.available
            )
        })
        .collect::<Vec<_>>()
        .join("; ")
}

impl From<AppError> for Status {
    fn from(err: AppError) -> Self {
        match err {
            AppError::Validation(msg) => Status::invalid_argument(msg),
            e @ AppError::DuplicateCode { .. } => Status::already_exists(e.to_string()),
            e @ AppError::InsufficientAvailability(_) => Status::failed_precondition(e.to_string()),
            AppError::NotFound(msg) => Status::not_found(msg),
            AppError::Database(e) => Status::internal(format!("Database error: {}", e)),
            AppError::Blob(msg) => Status::internal(format!("Blob storage error: {}", msg)),
            AppError::Internal(msg) => Status::internal(msg),
        }
    }
}

pub type AppResult<T> = Result<T, AppError>;
