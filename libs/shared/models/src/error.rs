use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Not Found: {0}")]
    NotFound(String),

    #[error("Bad Request: {0}")]
    BadRequest(String),

    #[error("Internal Error: {0}")]
    Internal(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Export error: {0}")]
    Export(String),
}

impl AppError {
    /// Process exit code for command-line front ends, following sysexits(3).
    pub fn exit_code(&self) -> u8 {
        match self {
            AppError::NotFound(_) => 66,
            AppError::BadRequest(_) => 64,
            AppError::Storage(_) => 74,
            AppError::Export(_) => 73,
            AppError::Internal(_) => 70,
        }
    }

    pub fn report(&self) {
        tracing::error!("Error ({}): {}", self.exit_code(), self);
    }
}
