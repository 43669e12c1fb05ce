pub mod error;
pub mod patient;

pub use error::AppError;
pub use patient::*;
