use crate::domain::model::{
    Course, CourseId, CourseRegistration, InsertOutcome, Semester, SemesterId, Student, StudentId,
};
use crate::domain::ports::AcademiaStore;
use crate::utils::error::Result;
use async_trait::async_trait;
use chrono::NaiveDate;
use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;
use tokio::sync::Mutex;

#[derive(Debug, Default)]
struct State {
    students: BTreeMap<StudentId, Student>,
    semesters: BTreeMap<SemesterId, Semester>,
    courses: BTreeMap<CourseId, Option<SemesterId>>,
    registrations: HashSet<CourseRegistration>,
    next_id: i64,
}

impl State {
    fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }
}

/// In-process store. Clones share the same data.
#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    state: Arc<Mutex<State>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn add_student(&self, full_name: &str, badge: &str) -> Student {
        let mut state = self.state.lock().await;
        let student = Student {
            id: StudentId(state.next_id()),
            full_name: full_name.to_string(),
            badge: badge.to_string(),
        };
        state.students.insert(student.id, student.clone());
        student
    }

    pub async fn add_semester(&self, start: NaiveDate, end: NaiveDate) -> Semester {
        let mut state = self.state.lock().await;
        let semester = Semester {
            id: SemesterId(state.next_id()),
            start,
            end,
        };
        state.semesters.insert(semester.id, semester);
        semester
    }

    /// Unknown semester ids are stored as-is and load as a course without semester.
    pub async fn add_course(&self, semester_id: Option<SemesterId>) -> Course {
        let mut state = self.state.lock().await;
        let id = CourseId(state.next_id());
        state.courses.insert(id, semester_id);
        Course {
            id,
            semester: semester_id.and_then(|s| state.semesters.get(&s).copied()),
        }
    }

    pub async fn registration_count(&self) -> usize {
        self.state.lock().await.registrations.len()
    }
}

#[async_trait]
impl AcademiaStore for InMemoryStore {
    async fn find_student_by_full_name(&self, full_name: &str) -> Result<Option<Student>> {
        let state = self.state.lock().await;
        Ok(state
            .students
            .values()
            .find(|s| s.full_name == full_name)
            .cloned())
    }

    async fn find_student_by_badge(&self, badge: &str) -> Result<Option<Student>> {
        let state = self.state.lock().await;
        Ok(state.students.values().find(|s| s.badge == badge).cloned())
    }

    async fn find_course_with_semester(&self, course_id: CourseId) -> Result<Option<Course>> {
        let state = self.state.lock().await;
        Ok(state.courses.get(&course_id).map(|semester_id| Course {
            id: course_id,
            semester: semester_id.and_then(|s| state.semesters.get(&s).copied()),
        }))
    }

    async fn find_registration(
        &self,
        student_id: StudentId,
        course_id: CourseId,
    ) -> Result<Option<CourseRegistration>> {
        let key = CourseRegistration {
            student_id,
            course_id,
        };
        let state = self.state.lock().await;
        Ok(state.registrations.get(&key).copied())
    }

    async fn insert_registration(
        &self,
        student_id: StudentId,
        course_id: CourseId,
    ) -> Result<InsertOutcome> {
        let mut state = self.state.lock().await;
        let inserted = state.registrations.insert(CourseRegistration {
            student_id,
            course_id,
        });
        Ok(if inserted {
            InsertOutcome::Inserted
        } else {
            InsertOutcome::AlreadyExists
        })
    }

    async fn count_registrations(
        &self,
        student_id: StudentId,
        course_id: CourseId,
    ) -> Result<usize> {
        let state = self.state.lock().await;
        Ok(state
            .registrations
            .iter()
            .filter(|r| r.student_id == student_id && r.course_id == course_id)
            .count())
    }
}
