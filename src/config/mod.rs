pub mod toml_config;

use crate::domain::model::{CourseId, RegistrationRequest};
use crate::utils::error::Result;
use crate::utils::validation::{self, Validate};
use chrono::NaiveDate;
#[cfg(feature = "cli")]
use clap::Parser;
use serde::{Deserialize, Serialize};
use toml_config::TomlConfig;

pub const DEFAULT_DATABASE_PATH: &str = "academia.db";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "cli", derive(Parser))]
#[cfg_attr(feature = "cli", command(name = "course-registration"))]
#[cfg_attr(
    feature = "cli",
    command(about = "Register a student into a course offering")
)]
pub struct CliConfig {
    #[cfg_attr(feature = "cli", arg(short, long, help = "Path to TOML configuration file"))]
    pub config: Option<String>,

    #[cfg_attr(feature = "cli", arg(long, help = "SQLite database path (or :memory:)"))]
    pub database: Option<String>,

    #[cfg_attr(feature = "cli", arg(long, default_value = ""))]
    pub full_name: String,

    #[cfg_attr(feature = "cli", arg(long, default_value = ""))]
    pub badge: String,

    #[cfg_attr(feature = "cli", arg(long))]
    pub course_id: i64,

    #[cfg_attr(
        feature = "cli",
        arg(long, help = "Reference date YYYY-MM-DD instead of the system date")
    )]
    pub today: Option<String>,

    #[cfg_attr(feature = "cli", arg(long, help = "Emit JSON log lines"))]
    pub json_logs: bool,

    #[cfg_attr(feature = "cli", arg(short, long, help = "Enable verbose output"))]
    pub verbose: bool,
}

/// Effective settings after merging the optional TOML file with CLI flags.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub database_path: String,
    pub today: Option<NaiveDate>,
    pub log_level: Option<String>,
    pub json_logs: bool,
    pub verbose: bool,
    pub request: RegistrationRequest,
}

impl CliConfig {
    /// CLI flags win over the file.
    pub fn resolve(&self) -> Result<Settings> {
        let file = match &self.config {
            Some(path) => {
                let file = TomlConfig::from_file(path)?;
                file.validate()?;
                Some(file)
            }
            None => None,
        };

        let database_path = self
            .database
            .clone()
            .or_else(|| file.as_ref().map(|f| f.database_path().to_string()))
            .unwrap_or_else(|| DEFAULT_DATABASE_PATH.to_string());

        let today = match &self.today {
            Some(value) => Some(validation::parse_date("today", value)?),
            None => match &file {
                Some(f) => f.today()?,
                None => None,
            },
        };

        let settings = Settings {
            database_path,
            today,
            log_level: file
                .as_ref()
                .and_then(|f| f.log_level().map(str::to_string)),
            json_logs: self.json_logs || file.as_ref().is_some_and(|f| f.json_logs()),
            verbose: self.verbose,
            request: RegistrationRequest {
                full_name: self.full_name.clone(),
                badge: self.badge.clone(),
                course_id: CourseId(self.course_id),
            },
        };
        settings.validate()?;
        Ok(settings)
    }
}

impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        self.resolve().map(|_| ())
    }
}

impl Validate for Settings {
    fn validate(&self) -> Result<()> {
        validation::validate_path("database", &self.database_path)?;
        validation::validate_any_non_empty(
            &["full_name", "badge"],
            &[self.request.full_name.as_str(), self.request.badge.as_str()],
        )?;
        if let Some(level) = &self.log_level {
            validation::validate_log_level("logging.level", level)?;
        }
        Ok(())
    }
}
