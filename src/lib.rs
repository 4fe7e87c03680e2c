pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

pub use crate::adapters::{ConfiguredClock, FixedClock, InMemoryStore, SqliteStore, SystemClock};
pub use crate::config::{CliConfig, Settings};
pub use crate::core::registration::CourseRegistrationHandler;
pub use crate::domain::model::{
    Course, CourseId, CourseRegistration, InsertOutcome, RegistrationOutcome,
    RegistrationRequest, Semester, SemesterId, Student, StudentId,
};
pub use crate::domain::ports::{AcademiaStore, Clock};
pub use crate::utils::error::{RegistryError, Result};
