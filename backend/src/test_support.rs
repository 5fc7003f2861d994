//! Test utilities for the backend crate.
//!
//! Shared helpers for unit tests (in `src/`) and integration tests (in
//! `tests/`). Compiled for tests and behind the `test-support` feature.

pub mod clock {
    //! Deterministic clock.

    use chrono::{DateTime, Local, TimeZone, Utc};
    use mockable::Clock;

    /// Clock frozen at one instant.
    #[derive(Debug, Clone, Copy)]
    pub struct FixtureClock {
        utc_now: DateTime<Utc>,
    }

    impl FixtureClock {
        /// Clock frozen at `utc_now`.
        pub fn at(utc_now: DateTime<Utc>) -> Self {
            Self { utc_now }
        }
    }

    impl Default for FixtureClock {
        /// 2026-10-19T08:30:00Z, i.e. 09:30 West Africa Time.
        fn default() -> Self {
            let utc_now = Utc
                .with_ymd_and_hms(2026, 10, 19, 8, 30, 0)
                .single()
                .expect("fixture timestamp is unambiguous");
            Self { utc_now }
        }
    }

    impl Clock for FixtureClock {
        fn local(&self) -> DateTime<Local> {
            self.utc_now.with_timezone(&Local)
        }

        fn utc(&self) -> DateTime<Utc> {
            self.utc_now
        }
    }
}

pub mod generation {
    //! Answer generator double that counts calls.

    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use async_trait::async_trait;

    use crate::domain::ports::{AnswerGenerator, AnswerGeneratorError, GenerationPrompt};

    /// Generator returning a fixed outcome, optionally after a delay.
    #[derive(Debug)]
    pub struct RecordingAnswerGenerator {
        outcome: Result<String, AnswerGeneratorError>,
        delay: Option<Duration>,
        calls: AtomicUsize,
        last_prompt: Mutex<Option<GenerationPrompt>>,
    }

    impl RecordingAnswerGenerator {
        /// Generator answering every prompt with `answer`.
        pub fn answering(answer: &str) -> Self {
            Self::with_outcome(Ok(answer.to_owned()))
        }

        /// Generator failing every prompt with `error`.
        pub fn failing(error: AnswerGeneratorError) -> Self {
            Self::with_outcome(Err(error))
        }

        fn with_outcome(outcome: Result<String, AnswerGeneratorError>) -> Self {
            Self {
                outcome,
                delay: None,
                calls: AtomicUsize::new(0),
                last_prompt: Mutex::new(None),
            }
        }

        /// Sleep for `delay` before answering.
        #[must_use]
        pub fn with_delay(mut self, delay: Duration) -> Self {
            self.delay = Some(delay);
            self
        }

        /// Number of prompts received.
        pub fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }

        /// Most recent prompt received.
        pub fn last_prompt(&self) -> Option<GenerationPrompt> {
            self.last_prompt.lock().expect("prompt mutex").clone()
        }
    }

    #[async_trait]
    impl AnswerGenerator for RecordingAnswerGenerator {
        async fn generate(
            &self,
            prompt: &GenerationPrompt,
        ) -> Result<String, AnswerGeneratorError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            *self.last_prompt.lock().expect("prompt mutex") = Some(prompt.clone());
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
            self.outcome.clone()
        }
    }
}

pub mod store {
    //! Seeded in-memory record store.

    use crate::domain::{AcademicYear, Course, CourseCode, CourseDetails, User, UserId};
    use crate::outbound::record_store::InMemoryRecordStore;

    /// Identifier of the seeded student.
    pub const DEMO_USER_ID: &str = "CS_STUDENT_1";

    fn code(raw: &str) -> CourseCode {
        CourseCode::new(raw).expect("valid fixture course code")
    }

    /// The seeded second-year student, enrolled in CSC101 and CSC201.
    pub fn demo_student() -> User {
        User::new(
            UserId::new(DEMO_USER_ID).expect("valid fixture user id"),
            "Test Student",
            "CS2023001",
            AcademicYear::new(2).expect("valid fixture year"),
        )
        .with_courses([code("CSC101"), code("CSC201")])
    }

    /// The seeded catalogue.
    pub fn demo_courses() -> [Course; 2] {
        [
            Course::new(
                code("CSC101"),
                "Introduction to Programming",
                CourseDetails {
                    lecturer: Some("Dr. Smith".to_owned()),
                    next_topic: Some("Recursion".to_owned()),
                    lab_schedule: Some("Tuesdays 2-4pm".to_owned()),
                },
            ),
            Course::new(
                code("CSC201"),
                "Data Structures",
                CourseDetails {
                    lecturer: Some("Dr. Johnson".to_owned()),
                    next_topic: Some("Binary Trees".to_owned()),
                    lab_schedule: Some("Thursdays 10am-12pm".to_owned()),
                },
            ),
        ]
    }

    /// Store holding [`demo_student`] and [`demo_courses`].
    pub fn demo_store() -> InMemoryRecordStore {
        let store = InMemoryRecordStore::new();
        store.insert_user(demo_student());
        for course in demo_courses() {
            store.insert_course(course);
        }
        store
    }
}

pub mod openapi {
    //! OpenAPI schema traversal helpers.

    use utoipa::openapi::RefOr;
    use utoipa::openapi::schema::{Object, Schema};

    /// Extract an `Object` schema, panicking with a diagnostic if not an Object.
    pub fn unwrap_object_schema<'a>(schema: &'a RefOr<Schema>, name: &str) -> &'a Object {
        match schema {
            RefOr::T(Schema::Object(obj)) => obj,
            RefOr::Ref(reference) => {
                panic!(
                    "schema '{name}' is a $ref to '{}'; resolve the reference first",
                    reference.ref_location
                );
            }
            _ => panic!("schema '{name}' is not an Object"),
        }
    }
}

pub use clock::FixtureClock;
pub use generation::RecordingAnswerGenerator;
pub use store::{DEMO_USER_ID, demo_courses, demo_store, demo_student};
