use crate::domain::model::{InsertOutcome, RegistrationOutcome, RegistrationRequest, Student};
use crate::domain::ports::{AcademiaStore, Clock};
use crate::utils::error::Result;

/// Registers a student into a course offering.
///
/// Checks run in order and stop at the first failure: student lookup,
/// course lookup, duplicate registration, semester window. Business-rule
/// failures come back as a [`RegistrationOutcome`]; store failures as `Err`.
pub struct CourseRegistrationHandler<S: AcademiaStore, C: Clock> {
    store: S,
    clock: C,
}

impl<S: AcademiaStore, C: Clock> CourseRegistrationHandler<S, C> {
    pub fn new(store: S, clock: C) -> Self {
        Self { store, clock }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub async fn handle(&self, request: RegistrationRequest) -> Result<RegistrationOutcome> {
        let Some(student) = self.resolve_student(&request).await? else {
            tracing::warn!(
                full_name = %request.full_name,
                badge = %request.badge,
                "Student not found. Registration failed."
            );
            return Ok(RegistrationOutcome::StudentNotFound);
        };

        let Some(course) = self
            .store
            .find_course_with_semester(request.course_id)
            .await?
        else {
            tracing::warn!(
                student_id = %student.id,
                course_id = %request.course_id,
                "Course not found. Registration failed."
            );
            return Ok(RegistrationOutcome::CourseNotFound);
        };

        if self
            .store
            .find_registration(student.id, course.id)
            .await?
            .is_some()
        {
            tracing::info!(
                student_id = %student.id,
                course_id = %course.id,
                "Student {} is already registered in course {}",
                student.id,
                course.id
            );
            return Ok(RegistrationOutcome::AlreadyRegistered);
        }

        let today = self.clock.today();
        if !course.is_open_on(today) {
            tracing::warn!(
                student_id = %student.id,
                course_id = %course.id,
                %today,
                "Student cannot register for a past or future course. Registration failed."
            );
            return Ok(RegistrationOutcome::OutsideSemesterWindow);
        }

        match self.store.insert_registration(student.id, course.id).await? {
            InsertOutcome::Inserted => {
                tracing::info!(
                    student_id = %student.id,
                    course_id = %course.id,
                    "Student {} registered in course {}",
                    student.id,
                    course.id
                );
                Ok(RegistrationOutcome::Registered)
            }
            InsertOutcome::AlreadyExists => {
                // A concurrent request committed the same pair after our duplicate check.
                tracing::info!(
                    student_id = %student.id,
                    course_id = %course.id,
                    "Student {} is already registered in course {}",
                    student.id,
                    course.id
                );
                Ok(RegistrationOutcome::AlreadyRegistered)
            }
        }
    }

    /// Boolean form of [`handle`](Self::handle): `true` only when a registration was stored.
    pub async fn register(&self, request: RegistrationRequest) -> Result<bool> {
        self.handle(request).await.map(RegistrationOutcome::is_registered)
    }

    async fn resolve_student(&self, request: &RegistrationRequest) -> Result<Option<Student>> {
        if !request.full_name.is_empty() {
            self.store.find_student_by_full_name(&request.full_name).await
        } else if !request.badge.is_empty() {
            self.store.find_student_by_badge(&request.badge).await
        } else {
            Ok(None)
        }
    }
}
