//! SQLite-backed academia store.
//!
//! Registrations are guarded by `UNIQUE(student_id, course_id)`, so the
//! insert doubles as the duplicate check when two requests race.

use crate::domain::model::{
    Course, CourseId, CourseRegistration, InsertOutcome, Semester, SemesterId, Student, StudentId,
};
use crate::domain::ports::AcademiaStore;
use crate::utils::error::{RegistryError, Result};
use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

static MEMDB_COUNTER: AtomicU64 = AtomicU64::new(0);

type CourseRow = (i64, Option<i64>, Option<NaiveDate>, Option<NaiveDate>);

#[derive(Debug, Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    const ACQUIRE_TIMEOUT: Duration = Duration::from_secs(5);

    /// Opens or creates the database at `path` and applies migrations.
    /// `":memory:"` gives a private in-memory database.
    pub async fn connect(path: &str) -> Result<Self> {
        let pool = if path == ":memory:" {
            // Each call gets its own shared-cache name so parallel tests don't collide.
            let id = MEMDB_COUNTER.fetch_add(1, Ordering::Relaxed);
            let uri = format!(
                "file:course-registration-{}-{}?mode=memory&cache=shared",
                std::process::id(),
                id
            );
            let options = SqliteConnectOptions::new()
                .filename(&uri)
                .shared_cache(true)
                .create_if_missing(true)
                .foreign_keys(true);

            SqlitePoolOptions::new()
                .max_connections(1)
                .min_connections(1)
                .idle_timeout(None)
                .acquire_timeout(Self::ACQUIRE_TIMEOUT)
                .connect_with(options)
                .await?
        } else {
            if let Some(parent) = Path::new(path).parent() {
                if !parent.as_os_str().is_empty() {
                    std::fs::create_dir_all(parent)?;
                }
            }

            let options = SqliteConnectOptions::new()
                .filename(path)
                .create_if_missing(true)
                .foreign_keys(true)
                .journal_mode(SqliteJournalMode::Wal)
                .busy_timeout(Duration::from_secs(5));

            SqlitePoolOptions::new()
                .max_connections(5)
                .acquire_timeout(Self::ACQUIRE_TIMEOUT)
                .connect_with(options)
                .await?
        };

        tracing::info!(path = %path, "Database connected");

        sqlx::migrate!("./migrations").run(&pool).await?;
        tracing::debug!("Database migrations checked/applied");

        Ok(Self { pool })
    }

    pub async fn add_student(&self, full_name: &str, badge: &str) -> Result<Student> {
        let result = sqlx::query("INSERT INTO students (full_name, badge) VALUES (?, ?)")
            .bind(full_name)
            .bind(badge)
            .execute(&self.pool)
            .await?;

        Ok(Student {
            id: StudentId(result.last_insert_rowid()),
            full_name: full_name.to_string(),
            badge: badge.to_string(),
        })
    }

    pub async fn add_semester(&self, start: NaiveDate, end: NaiveDate) -> Result<Semester> {
        let result = sqlx::query("INSERT INTO semesters (start_date, end_date) VALUES (?, ?)")
            .bind(start)
            .bind(end)
            .execute(&self.pool)
            .await?;

        Ok(Semester {
            id: SemesterId(result.last_insert_rowid()),
            start,
            end,
        })
    }

    pub async fn add_course(&self, semester_id: Option<SemesterId>) -> Result<Course> {
        let result = sqlx::query("INSERT INTO courses (semester_id) VALUES (?)")
            .bind(semester_id.map(|s| s.0))
            .execute(&self.pool)
            .await?;

        let id = CourseId(result.last_insert_rowid());
        self.find_course_with_semester(id)
            .await?
            .ok_or(RegistryError::Database(sqlx::Error::RowNotFound))
    }

    async fn find_student_where(&self, column: &str, value: &str) -> Result<Option<Student>> {
        let sql = format!(
            "SELECT id, full_name, badge FROM students WHERE {} = ? ORDER BY id LIMIT 1",
            column
        );
        let row = sqlx::query_as::<_, (i64, String, String)>(&sql)
            .bind(value)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(|(id, full_name, badge)| Student {
            id: StudentId(id),
            full_name,
            badge,
        }))
    }
}

#[async_trait]
impl AcademiaStore for SqliteStore {
    async fn find_student_by_full_name(&self, full_name: &str) -> Result<Option<Student>> {
        self.find_student_where("full_name", full_name).await
    }

    async fn find_student_by_badge(&self, badge: &str) -> Result<Option<Student>> {
        self.find_student_where("badge", badge).await
    }

    async fn find_course_with_semester(&self, course_id: CourseId) -> Result<Option<Course>> {
        let row = sqlx::query_as::<_, CourseRow>(
            r#"
            SELECT c.id, s.id, s.start_date, s.end_date
            FROM courses c
            LEFT JOIN semesters s ON s.id = c.semester_id
            WHERE c.id = ?
            "#,
        )
        .bind(course_id.0)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|(id, semester_id, start, end)| {
            let semester = match (semester_id, start, end) {
                (Some(semester_id), Some(start), Some(end)) => Some(Semester {
                    id: SemesterId(semester_id),
                    start,
                    end,
                }),
                _ => None,
            };
            Course {
                id: CourseId(id),
                semester,
            }
        }))
    }

    async fn find_registration(
        &self,
        student_id: StudentId,
        course_id: CourseId,
    ) -> Result<Option<CourseRegistration>> {
        let row = sqlx::query_as::<_, (i64, i64)>(
            "SELECT student_id, course_id FROM student_courses WHERE student_id = ? AND course_id = ?",
        )
        .bind(student_id.0)
        .bind(course_id.0)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|(student_id, course_id)| CourseRegistration {
            student_id: StudentId(student_id),
            course_id: CourseId(course_id),
        }))
    }

    async fn insert_registration(
        &self,
        student_id: StudentId,
        course_id: CourseId,
    ) -> Result<InsertOutcome> {
        let now = chrono::Utc::now().timestamp();

        // Nothing is visible until commit; dropping this future rolls back.
        let mut tx = self.pool.begin().await?;

        let inserted = sqlx::query(
            "INSERT INTO student_courses (student_id, course_id, registered_at) VALUES (?, ?, ?)",
        )
        .bind(student_id.0)
        .bind(course_id.0)
        .bind(now)
        .execute(&mut *tx)
        .await;

        match inserted {
            Ok(_) => {
                tx.commit().await?;
                Ok(InsertOutcome::Inserted)
            }
            Err(sqlx::Error::Database(ref db_err)) if db_err.is_unique_violation() => {
                tx.rollback().await?;
                Ok(InsertOutcome::AlreadyExists)
            }
            Err(e) => Err(RegistryError::from(e)),
        }
    }

    async fn count_registrations(
        &self,
        student_id: StudentId,
        course_id: CourseId,
    ) -> Result<usize> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM student_courses WHERE student_id = ? AND course_id = ?",
        )
        .bind(student_id.0)
        .bind(course_id.0)
        .fetch_one(&self.pool)
        .await?;

        Ok(count as usize)
    }
}
