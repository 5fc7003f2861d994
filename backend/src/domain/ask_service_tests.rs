//! Tests for the ask orchestrator.

use std::sync::Arc;

use super::*;
use crate::domain::ports::{
    AnswerGeneratorError, MockAnswerGenerator, MockRecordStore, RecordStoreError,
};
use crate::domain::{AcademicYear, CourseDetails, ErrorCode, QuestionText};
use crate::test_support::{FixtureClock, RecordingAnswerGenerator, demo_store};
use rstest::{fixture, rstest};

fn code(raw: &str) -> CourseCode {
    CourseCode::new(raw).expect("valid code")
}

fn student_with_count(count: u32) -> User {
    User::new(
        UserId::new("CS_STUDENT_1").expect("valid id"),
        "Test Student",
        "CS2023001",
        AcademicYear::new(2).expect("valid year"),
    )
    .with_courses([code("CSC101"), code("CSC201")])
    .with_query_count(count)
}

fn intro_course() -> Course {
    Course::new(
        code("CSC101"),
        "Introduction to Programming",
        CourseDetails {
            lecturer: Some("Dr. Smith".to_owned()),
            next_topic: Some("Recursion".to_owned()),
            lab_schedule: Some("Tuesdays 2-4pm".to_owned()),
        },
    )
}

fn request(question: &str, hint: Option<&str>) -> AskRequest {
    AskRequest {
        user_id: UserId::new("CS_STUDENT_1").expect("valid id"),
        question: QuestionText::new(question).expect("valid question"),
        course_code_hint: hint.map(str::to_owned),
    }
}

#[fixture]
fn clock() -> Arc<dyn Clock> {
    Arc::new(FixtureClock::default())
}

fn make_service(
    store: MockRecordStore,
    generator: MockAnswerGenerator,
    clock: Arc<dyn Clock>,
) -> AskService<MockRecordStore, MockAnswerGenerator> {
    AskService::new(Arc::new(store), Arc::new(generator), clock)
}

fn expect_user(store: &mut MockRecordStore, count: u32) {
    store
        .expect_get_user()
        .times(1)
        .return_once(move |_| Ok(Some(student_with_count(count))));
}

#[rstest]
#[tokio::test]
async fn course_mention_is_answered_logged_and_counted(clock: Arc<dyn Clock>) {
    let mut store = MockRecordStore::new();
    expect_user(&mut store, 0);
    store
        .expect_get_course()
        .times(1)
        .return_once(|_| Ok(Some(intro_course())));
    store
        .expect_append_question()
        .withf(|record| {
            record.question() == "when is the CSC101 lab?"
                && record.response() == "CSC101 (Introduction to Programming): Recursion"
                && record.course_code() == Some("CSC101")
                && record.timestamp() == "2026-10-19T09:30:00.000000+01:00"
        })
        .times(1)
        .return_once(|_| Ok(()));
    store
        .expect_update_query_count()
        .withf(|id, count| id.as_ref() == "CS_STUDENT_1" && *count == 1)
        .times(1)
        .return_once(|_, _| Ok(()));
    let mut generator = MockAnswerGenerator::new();
    generator.expect_generate().times(0);

    let response = make_service(store, generator, clock)
        .ask(request("when is the CSC101 lab?", Some("CSC101")))
        .await
        .expect("answer");

    assert_eq!(
        response,
        AskResponse {
            answer: "CSC101 (Introduction to Programming): Recursion".to_owned(),
            source: AnswerSource::CourseLookup,
            query_count: 1,
        }
    );
}

#[rstest]
#[case(50)]
#[case(51)]
#[tokio::test]
async fn exhausted_quota_rejects_without_side_effects(clock: Arc<dyn Clock>, #[case] count: u32) {
    let mut store = MockRecordStore::new();
    expect_user(&mut store, count);
    store.expect_get_course().times(0);
    store.expect_append_question().times(0);
    store.expect_update_query_count().times(0);
    let mut generator = MockAnswerGenerator::new();
    generator.expect_generate().times(0);

    let err = make_service(store, generator, clock)
        .ask(request("what is recursion?", None))
        .await
        .expect_err("quota exceeded");

    assert_eq!(err.code(), ErrorCode::QuotaExceeded);
    assert_eq!(err.message(), "Daily limit reached");
}

#[rstest]
#[tokio::test]
async fn last_allowed_question_reaches_the_limit(clock: Arc<dyn Clock>) {
    let mut store = MockRecordStore::new();
    expect_user(&mut store, 49);
    store.expect_append_question().times(1).return_once(|_| Ok(()));
    store
        .expect_update_query_count()
        .withf(|_, count| *count == 50)
        .times(1)
        .return_once(|_, _| Ok(()));
    let mut generator = MockAnswerGenerator::new();
    generator
        .expect_generate()
        .times(1)
        .return_once(|_| Ok("A stack is LIFO.".to_owned()));

    let response = make_service(store, generator, clock)
        .ask(request("what is a stack?", None))
        .await
        .expect("answer");

    assert_eq!(response.query_count, 50);
    assert_eq!(response.source, AnswerSource::Generated);
}

#[rstest]
#[tokio::test]
async fn unknown_student_is_not_found(clock: Arc<dyn Clock>) {
    let mut store = MockRecordStore::new();
    store.expect_get_user().times(1).return_once(|_| Ok(None));
    store.expect_append_question().times(0);
    store.expect_update_query_count().times(0);
    let mut generator = MockAnswerGenerator::new();
    generator.expect_generate().times(0);

    let err = make_service(store, generator, clock)
        .ask(request("hello", None))
        .await
        .expect_err("missing student");

    assert_eq!(err.code(), ErrorCode::NotFound);
    assert_eq!(err.message(), "CS student not found in database");
}

#[rstest]
#[tokio::test]
async fn student_read_failure_is_storage_error(clock: Arc<dyn Clock>) {
    let mut store = MockRecordStore::new();
    store
        .expect_get_user()
        .times(1)
        .return_once(|_| Err(RecordStoreError::connection("refused")));

    let err = make_service(store, MockAnswerGenerator::new(), clock)
        .ask(request("hello", None))
        .await
        .expect_err("store down");

    assert_eq!(err.code(), ErrorCode::StorageError);
}

#[rstest]
#[tokio::test]
async fn generation_failure_leaves_no_trace(clock: Arc<dyn Clock>) {
    let mut store = MockRecordStore::new();
    expect_user(&mut store, 3);
    store.expect_append_question().times(0);
    store.expect_update_query_count().times(0);
    let mut generator = MockAnswerGenerator::new();
    generator
        .expect_generate()
        .times(1)
        .return_once(|_| Err(AnswerGeneratorError::provider(401_u16, "invalid api key")));

    let err = make_service(store, generator, clock)
        .ask(request("explain quicksort", None))
        .await
        .expect_err("generation failed");

    assert_eq!(err.code(), ErrorCode::ServiceUnavailable);
    assert!(err.message().starts_with("AI Error: "));
}

#[rstest]
#[tokio::test]
async fn log_failure_still_answers_and_counts(clock: Arc<dyn Clock>) {
    let mut store = MockRecordStore::new();
    expect_user(&mut store, 7);
    store
        .expect_append_question()
        .times(1)
        .return_once(|_| Err(RecordStoreError::rejected(503_u16, "unavailable")));
    store
        .expect_update_query_count()
        .withf(|_, count| *count == 8)
        .times(1)
        .return_once(|_, _| Ok(()));
    let mut generator = MockAnswerGenerator::new();
    generator
        .expect_generate()
        .times(1)
        .return_once(|_| Ok("Big-O bounds growth.".to_owned()));

    let response = make_service(store, generator, clock)
        .ask(request("what is big-O?", None))
        .await
        .expect("answer despite log failure");

    assert_eq!(response.answer, "Big-O bounds growth.");
    assert_eq!(response.query_count, 8);
}

#[rstest]
#[tokio::test]
async fn counter_write_failure_is_storage_error(clock: Arc<dyn Clock>) {
    let mut store = MockRecordStore::new();
    expect_user(&mut store, 1);
    store.expect_append_question().times(1).return_once(|_| Ok(()));
    store
        .expect_update_query_count()
        .times(1)
        .return_once(|_, _| Err(RecordStoreError::timeout("10s")));
    let mut generator = MockAnswerGenerator::new();
    generator
        .expect_generate()
        .times(1)
        .return_once(|_| Ok("answer".to_owned()));

    let err = make_service(store, generator, clock)
        .ask(request("what is a graph?", None))
        .await
        .expect_err("counter write failed");

    assert_eq!(err.code(), ErrorCode::StorageError);
}

#[rstest]
#[tokio::test]
async fn get_course_is_idempotent(clock: Arc<dyn Clock>) {
    let mut store = MockRecordStore::new();
    store
        .expect_get_course()
        .times(2)
        .returning(|_| Ok(Some(intro_course())));
    let service = make_service(store, MockAnswerGenerator::new(), clock);

    let first = service.get_course(&code("csc101")).await.expect("first");
    let second = service.get_course(&code("CSC101")).await.expect("second");

    assert_eq!(first, second);
    assert_eq!(first.lecturer(), Some("Dr. Smith"));
}

#[rstest]
#[tokio::test]
async fn unknown_course_is_not_found(clock: Arc<dyn Clock>) {
    let mut store = MockRecordStore::new();
    store.expect_get_course().times(1).return_once(|_| Ok(None));

    let err = make_service(store, MockAnswerGenerator::new(), clock)
        .get_course(&code("CSC999"))
        .await
        .expect_err("unknown course");

    assert_eq!(err.code(), ErrorCode::NotFound);
    assert_eq!(err.message(), "Course not found");
}

#[rstest]
#[tokio::test]
async fn concurrent_questions_cannot_overrun_the_limit(clock: Arc<dyn Clock>) {
    let store = Arc::new(demo_store());
    store.insert_user(student_with_count(49));
    let generator = Arc::new(
        RecordingAnswerGenerator::answering("generated").with_delay(Duration::from_millis(30)),
    );
    let service = AskService::new(Arc::clone(&store), Arc::clone(&generator), clock);

    let (first, second) = tokio::join!(
        service.ask(request("what is a heap?", None)),
        service.ask(request("what is a trie?", None)),
    );

    let outcomes = [first, second];
    let successes = outcomes.iter().filter(|outcome| outcome.is_ok()).count();
    let rejections = outcomes
        .iter()
        .filter(|outcome| {
            matches!(outcome, Err(err) if err.code() == ErrorCode::QuotaExceeded)
        })
        .count();
    assert_eq!((successes, rejections), (1, 1));
    assert_eq!(generator.calls(), 1);

    let user_id = UserId::new("CS_STUDENT_1").expect("valid id");
    let stored = store.get_user(&user_id).await.expect("read").expect("student");
    assert_eq!(stored.query_count(), 50);
    assert_eq!(store.questions_for(&user_id).len(), 1);
}
