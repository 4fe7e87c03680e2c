use crate::domain::model::{
    Course, CourseId, CourseRegistration, InsertOutcome, Student, StudentId,
};
use crate::utils::error::Result;
use async_trait::async_trait;
use chrono::NaiveDate;

/// Data access needed by the registration use case.
#[async_trait]
pub trait AcademiaStore: Send + Sync {
    async fn find_student_by_full_name(&self, full_name: &str) -> Result<Option<Student>>;

    async fn find_student_by_badge(&self, badge: &str) -> Result<Option<Student>>;

    /// Loads the course together with its semester.
    async fn find_course_with_semester(&self, course_id: CourseId) -> Result<Option<Course>>;

    async fn find_registration(
        &self,
        student_id: StudentId,
        course_id: CourseId,
    ) -> Result<Option<CourseRegistration>>;

    /// Inserts and commits a registration as one atomic unit. Must return
    /// `AlreadyExists` rather than store a second row for the same pair.
    async fn insert_registration(
        &self,
        student_id: StudentId,
        course_id: CourseId,
    ) -> Result<InsertOutcome>;

    async fn count_registrations(&self, student_id: StudentId, course_id: CourseId)
        -> Result<usize>;
}

pub trait Clock: Send + Sync {
    fn today(&self) -> NaiveDate;
}
