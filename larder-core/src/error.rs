use thiserror::Error;

/// Error type for entity store and pipeline operations.
///
/// Missing rows are not errors anywhere in the core: lookups return
/// `Ok(None)` or empty collections so callers can treat "unknown" as a
/// representable state.
#[derive(Error, Debug)]
pub enum CoreError {
    #[error("database error: {0}")]
    Database(#[from] diesel::result::Error),

    #[error("{kind} \"{name}\" already exists")]
    AlreadyExists { kind: &'static str, name: String },

    #[error("CSV import failed: {0}")]
    Csv(#[from] csv::Error),
}

pub type CoreResult<T> = Result<T, CoreError>;
