use chrono::NaiveDate;
use course_registration::{
    AcademiaStore, CourseId, CourseRegistrationHandler, FixedClock, InMemoryStore,
    RegistrationOutcome, RegistrationRequest, SqliteStore,
};
use std::sync::Arc;
use tempfile::TempDir;
use tokio_test::{assert_err, assert_ok};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

#[tokio::test]
async fn test_ada_registers_in_current_course_on_disk() {
    let temp_dir = TempDir::new().unwrap();
    let db_path = temp_dir.path().join("academia.db");
    let db_path = db_path.to_str().unwrap();

    let store = SqliteStore::connect(db_path).await.unwrap();
    let ada = store.add_student("Ada Lovelace", "").await.unwrap();
    let semester = store
        .add_semester(date(2023, 11, 1), date(2023, 12, 15))
        .await
        .unwrap();
    let c1 = store.add_course(Some(semester.id)).await.unwrap();

    let handler = CourseRegistrationHandler::new(store, FixedClock::new(date(2023, 12, 1)));
    let registered = assert_ok!(
        handler
            .register(RegistrationRequest::by_full_name("Ada Lovelace", c1.id))
            .await
    );
    assert!(registered);
    drop(handler);

    // Reopen to make sure the row was committed.
    let reopened = SqliteStore::connect(db_path).await.unwrap();
    assert_eq!(reopened.count_registrations(ada.id, c1.id).await.unwrap(), 1);
}

#[tokio::test]
async fn test_ada_is_rejected_for_future_semester() {
    let store = SqliteStore::connect(":memory:").await.unwrap();
    let ada = store.add_student("Ada Lovelace", "").await.unwrap();
    let semester = store
        .add_semester(date(2024, 1, 1), date(2024, 5, 1))
        .await
        .unwrap();
    let c1 = store.add_course(Some(semester.id)).await.unwrap();

    let handler = CourseRegistrationHandler::new(store, FixedClock::new(date(2023, 12, 1)));
    let outcome = handler
        .handle(RegistrationRequest::by_full_name("Ada Lovelace", c1.id))
        .await
        .unwrap();

    assert_eq!(outcome, RegistrationOutcome::OutsideSemesterWindow);
    assert_eq!(
        handler.store().count_registrations(ada.id, c1.id).await.unwrap(),
        0
    );
}

#[tokio::test]
async fn test_repeat_request_on_sqlite_is_idempotent() {
    let store = SqliteStore::connect(":memory:").await.unwrap();
    let grace = store.add_student("Grace Hopper", "B-7").await.unwrap();
    let semester = store
        .add_semester(date(2023, 11, 1), date(2023, 12, 15))
        .await
        .unwrap();
    let course = store.add_course(Some(semester.id)).await.unwrap();
    let handler = CourseRegistrationHandler::new(store, FixedClock::new(date(2023, 12, 1)));

    let request = RegistrationRequest::by_badge("B-7", course.id);
    assert!(handler.register(request.clone()).await.unwrap());
    assert!(!handler.register(request).await.unwrap());

    assert_eq!(
        handler
            .store()
            .count_registrations(grace.id, course.id)
            .await
            .unwrap(),
        1
    );
}

#[tokio::test]
async fn test_sqlite_unknown_student_and_course() {
    let store = SqliteStore::connect(":memory:").await.unwrap();
    store.add_student("Ada Lovelace", "").await.unwrap();
    let course = store.add_course(None).await.unwrap();
    let handler = CourseRegistrationHandler::new(store, FixedClock::new(date(2023, 12, 1)));

    let unknown_student = handler
        .handle(RegistrationRequest::by_full_name("Nobody", course.id))
        .await
        .unwrap();
    let unknown_course = handler
        .handle(RegistrationRequest::by_full_name("Ada Lovelace", CourseId(404)))
        .await
        .unwrap();

    assert_eq!(unknown_student, RegistrationOutcome::StudentNotFound);
    assert_eq!(unknown_course, RegistrationOutcome::CourseNotFound);
}

#[tokio::test]
async fn test_missing_database_directory_is_created() {
    let temp_dir = TempDir::new().unwrap();
    let db_path = temp_dir.path().join("nested").join("dir").join("academia.db");

    assert_ok!(SqliteStore::connect(db_path.to_str().unwrap()).await);
    assert!(db_path.exists());
}

#[tokio::test]
async fn test_unopenable_database_is_an_error() {
    let temp_dir = TempDir::new().unwrap();
    // A directory cannot be opened as a database file.
    assert_err!(SqliteStore::connect(temp_dir.path().to_str().unwrap()).await);
}

async fn race<S: AcademiaStore + 'static>(
    handler: Arc<CourseRegistrationHandler<S, FixedClock>>,
    course_id: CourseId,
) -> Vec<RegistrationOutcome> {
    let tasks: Vec<_> = (0..8)
        .map(|_| {
            let handler = Arc::clone(&handler);
            tokio::spawn(async move {
                handler
                    .handle(RegistrationRequest::by_full_name("Ada Lovelace", course_id))
                    .await
            })
        })
        .collect();

    let mut outcomes = Vec::new();
    for task in tasks {
        outcomes.push(task.await.unwrap().unwrap());
    }
    outcomes
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_registrations_store_one_row_in_memory() {
    let store = InMemoryStore::new();
    let ada = store.add_student("Ada Lovelace", "").await;
    let semester = store.add_semester(date(2023, 11, 1), date(2023, 12, 15)).await;
    let course = store.add_course(Some(semester.id)).await;
    let handler = Arc::new(CourseRegistrationHandler::new(
        store.clone(),
        FixedClock::new(date(2023, 12, 1)),
    ));

    let outcomes = race(handler, course.id).await;

    let registered = outcomes.iter().filter(|o| o.is_registered()).count();
    assert_eq!(registered, 1);
    assert!(outcomes
        .iter()
        .all(|o| matches!(o, RegistrationOutcome::Registered | RegistrationOutcome::AlreadyRegistered)));
    assert_eq!(store.count_registrations(ada.id, course.id).await.unwrap(), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_registrations_store_one_row_in_sqlite() {
    let store = SqliteStore::connect(":memory:").await.unwrap();
    let ada = store.add_student("Ada Lovelace", "").await.unwrap();
    let semester = store
        .add_semester(date(2023, 11, 1), date(2023, 12, 15))
        .await
        .unwrap();
    let course = store.add_course(Some(semester.id)).await.unwrap();
    let handler = Arc::new(CourseRegistrationHandler::new(
        store.clone(),
        FixedClock::new(date(2023, 12, 1)),
    ));

    let outcomes = race(handler, course.id).await;

    assert_eq!(outcomes.iter().filter(|o| o.is_registered()).count(), 1);
    assert_eq!(store.count_registrations(ada.id, course.id).await.unwrap(), 1);
}
