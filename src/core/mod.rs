pub mod registration;

pub use crate::domain::model::{RegistrationOutcome, RegistrationRequest};
pub use crate::domain::ports::{AcademiaStore, Clock};
pub use crate::utils::error::Result;
