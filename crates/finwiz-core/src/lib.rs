mod checked;
pub mod error;
pub mod time_value;
pub mod types;

#[cfg(feature = "fixed_income")]
pub mod fixed_income;

pub use error::FinWizError;
pub use types::*;

/// Standard result type for all finwiz operations
pub type FinWizResult<T> = Result<T, FinWizError>;
