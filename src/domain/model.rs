use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! id_type {
    ($name:ident) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub i64);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<i64> for $name {
            fn from(value: i64) -> Self {
                Self(value)
            }
        }
    };
}

id_type!(StudentId);
id_type!(CourseId);
id_type!(SemesterId);

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Student {
    pub id: StudentId,
    pub full_name: String,
    pub badge: String,
}

/// Inclusive calendar window during which a course accepts registrations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Semester {
    pub id: SemesterId,
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl Semester {
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Course {
    pub id: CourseId,
    pub semester: Option<Semester>,
}

impl Course {
    /// A course without a semester is never open.
    pub fn is_open_on(&self, date: NaiveDate) -> bool {
        self.semester.is_some_and(|s| s.contains(date))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CourseRegistration {
    pub student_id: StudentId,
    pub course_id: CourseId,
}

/// Input of a single registration attempt. Empty strings mean "not supplied".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistrationRequest {
    #[serde(default)]
    pub full_name: String,
    #[serde(default)]
    pub badge: String,
    pub course_id: CourseId,
}

impl RegistrationRequest {
    pub fn by_full_name(full_name: impl Into<String>, course_id: CourseId) -> Self {
        Self {
            full_name: full_name.into(),
            badge: String::new(),
            course_id,
        }
    }

    pub fn by_badge(badge: impl Into<String>, course_id: CourseId) -> Self {
        Self {
            full_name: String::new(),
            badge: badge.into(),
            course_id,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RegistrationOutcome {
    Registered,
    StudentNotFound,
    CourseNotFound,
    AlreadyRegistered,
    OutsideSemesterWindow,
}

impl RegistrationOutcome {
    pub fn is_registered(self) -> bool {
        matches!(self, RegistrationOutcome::Registered)
    }
}

impl fmt::Display for RegistrationOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            RegistrationOutcome::Registered => "registered",
            RegistrationOutcome::StudentNotFound => "student not found",
            RegistrationOutcome::CourseNotFound => "course not found",
            RegistrationOutcome::AlreadyRegistered => "already registered",
            RegistrationOutcome::OutsideSemesterWindow => "outside semester window",
        };
        f.write_str(text)
    }
}

/// Result of the store's conditional insert.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertOutcome {
    Inserted,
    AlreadyExists,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_semester_window_is_inclusive() {
        let semester = Semester {
            id: SemesterId(1),
            start: date(2023, 11, 1),
            end: date(2023, 12, 15),
        };

        assert!(semester.contains(date(2023, 11, 1)));
        assert!(semester.contains(date(2023, 12, 15)));
        assert!(!semester.contains(date(2023, 10, 31)));
        assert!(!semester.contains(date(2023, 12, 16)));
    }

    #[test]
    fn test_course_without_semester_is_closed() {
        let course = Course {
            id: CourseId(1),
            semester: None,
        };
        assert!(!course.is_open_on(date(2023, 12, 1)));
    }

    #[test]
    fn test_outcome_serializes_as_snake_case() {
        let json = serde_json::to_string(&RegistrationOutcome::OutsideSemesterWindow).unwrap();
        assert_eq!(json, "\"outside_semester_window\"");
        assert!(RegistrationOutcome::Registered.is_registered());
        assert!(!RegistrationOutcome::AlreadyRegistered.is_registered());
    }
}
