use thiserror::Error;

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("model not found")]
    ModelNotFound,
    /// a row would break a uniqueness constraint (eg: a job slug already in use)
    #[error("conflict: {0}")]
    Conflict(String),
    /// a row points to a missing row (eg: unknown node id)
    #[error("invalid reference: {0}")]
    InvalidReference(String),
    #[error("database error: {0}")]
    DbError(String),
    #[error("bad column: {0}")]
    ColumnError(String),
}

impl From<sqlx::Error> for ModelError {
    fn from(error: sqlx::Error) -> Self {
        match &error {
            sqlx::Error::RowNotFound => Self::ModelNotFound,
            sqlx::Error::Database(db_error) if db_error.is_unique_violation() => {
                Self::Conflict(db_error.message().to_string())
            }
            sqlx::Error::Database(db_error) if db_error.is_foreign_key_violation() => {
                Self::InvalidReference(db_error.message().to_string())
            }
            sqlx::Error::ColumnNotFound(column) => Self::ColumnError(column.clone()),
            _ => Self::DbError(error.to_string()),
        }
    }
}
