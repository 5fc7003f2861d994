//! Answer resolution: deterministic course lookup first, generation second.
//!
//! A question that mentions one of the student's enrolled course codes is
//! answered from the course record. When several enrolled codes appear, the
//! lexicographically smallest wins, because enrolment is an ordered set.
//! Anything else goes to the answer generator under a deadline.

use std::sync::Arc;
use std::time::Duration;

use serde_json::json;
use tracing::{debug, warn};

use crate::domain::ports::{AnswerGenerator, AnswerGeneratorError, GenerationPrompt, RecordStore};
use crate::domain::{AssistantPersona, Course, CourseCode, Error, QuestionText, User};

/// Default upper bound on a single generation call.
pub const DEFAULT_GENERATION_DEADLINE: Duration = Duration::from_secs(30);

/// Placeholder used when a course has no recorded next topic.
pub const MISSING_TOPIC_FALLBACK: &str = "Ask your lecturer";

/// Resolved answer and the path that produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// Formatted from the matched course's record.
    CourseInfo { code: CourseCode, answer: String },
    /// Produced by the answer generator.
    Generated { answer: String },
}

impl Resolution {
    /// Answer text.
    pub fn answer(&self) -> &str {
        match self {
            Self::CourseInfo { answer, .. } | Self::Generated { answer } => answer.as_str(),
        }
    }

    /// Consume into the answer text.
    pub fn into_answer(self) -> String {
        match self {
            Self::CourseInfo { answer, .. } | Self::Generated { answer } => answer,
        }
    }
}

/// Render the deterministic answer for a course.
///
/// # Examples
/// ```
/// use cs_assistant::domain::{Course, CourseCode, CourseDetails, format_course_answer};
///
/// let course = Course::new(
///     CourseCode::new("CSC101").expect("valid code"),
///     "Introduction to Programming",
///     CourseDetails { next_topic: Some("Recursion".into()), ..CourseDetails::default() },
/// );
/// assert_eq!(
///     format_course_answer(&course),
///     "CSC101 (Introduction to Programming): Recursion"
/// );
/// ```
pub fn format_course_answer(course: &Course) -> String {
    format!(
        "{} ({}): {}",
        course.code(),
        course.title(),
        course.next_topic().unwrap_or(MISSING_TOPIC_FALLBACK)
    )
}

/// First enrolled code mentioned in `question`, in ascending code order.
pub fn match_enrolled_course<'a>(user: &'a User, question: &QuestionText) -> Option<&'a CourseCode> {
    user.courses()
        .iter()
        .find(|code| code.is_mentioned_in(question.as_ref()))
}

/// Chooses between course lookup and generation.
pub struct AnswerResolver<S: ?Sized, G: ?Sized> {
    store: Arc<S>,
    generator: Arc<G>,
    persona: AssistantPersona,
    deadline: Duration,
}

impl<S: ?Sized, G: ?Sized> AnswerResolver<S, G> {
    /// Resolver with the default persona and deadline.
    pub fn new(store: Arc<S>, generator: Arc<G>) -> Self {
        Self {
            store,
            generator,
            persona: AssistantPersona::default(),
            deadline: DEFAULT_GENERATION_DEADLINE,
        }
    }

    /// Replace the persona used for the system message.
    #[must_use]
    pub fn with_persona(mut self, persona: AssistantPersona) -> Self {
        self.persona = persona;
        self
    }

    /// Replace the generation deadline.
    #[must_use]
    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline = deadline;
        self
    }
}

impl<S, G> AnswerResolver<S, G>
where
    S: RecordStore + ?Sized,
    G: AnswerGenerator + ?Sized,
{
    /// Resolve `question` for `user`.
    ///
    /// # Errors
    /// - `storage_error` when the matched course cannot be read.
    /// - `service_unavailable` when generation fails or exceeds the deadline.
    pub async fn resolve(&self, question: &QuestionText, user: &User) -> Result<Resolution, Error> {
        if let Some(code) = match_enrolled_course(user, question) {
            let course = self
                .store
                .get_course(code)
                .await
                .map_err(|err| err.into_domain("get_course"))?;
            match course {
                Some(course) => {
                    debug!(user_id = %user.id(), course_code = %code, "answered from course record");
                    return Ok(Resolution::CourseInfo {
                        code: code.clone(),
                        answer: format_course_answer(&course),
                    });
                }
                None => {
                    warn!(
                        user_id = %user.id(),
                        course_code = %code,
                        "enrolled course missing from catalogue; generating instead"
                    );
                }
            }
        }

        let prompt = GenerationPrompt {
            system: self.persona.system_prompt(),
            user: AssistantPersona::user_prompt(user.year(), question),
        };
        let answer = self.generate_within_deadline(&prompt).await?;
        Ok(Resolution::Generated { answer })
    }

    async fn generate_within_deadline(&self, prompt: &GenerationPrompt) -> Result<String, Error> {
        let outcome = tokio::time::timeout(self.deadline, self.generator.generate(prompt))
            .await
            .unwrap_or_else(|_| {
                Err(AnswerGeneratorError::timeout(format!(
                    "no answer within {} ms",
                    self.deadline.as_millis()
                )))
            });
        outcome.map_err(Self::map_generator_error)
    }

    fn map_generator_error(error: AnswerGeneratorError) -> Error {
        warn!(error = %error, "answer generation failed");
        Error::service_unavailable(format!("AI Error: {error}"))
            .with_details(json!({ "cause": error.to_string() }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::{MockAnswerGenerator, MockRecordStore, RecordStoreError};
    use crate::domain::{AcademicYear, CourseDetails, ErrorCode, UserId};
    use async_trait::async_trait;
    use rstest::{fixture, rstest};

    fn code(raw: &str) -> CourseCode {
        CourseCode::new(raw).expect("valid code")
    }

    fn course(raw: &str, title: &str, next_topic: Option<&str>) -> Course {
        Course::new(
            code(raw),
            title,
            CourseDetails {
                next_topic: next_topic.map(str::to_owned),
                ..CourseDetails::default()
            },
        )
    }

    fn question(raw: &str) -> QuestionText {
        QuestionText::new(raw).expect("valid question")
    }

    #[fixture]
    fn student() -> User {
        User::new(
            UserId::new("CS_STUDENT_1").expect("valid id"),
            "Test Student",
            "CS2023001",
            AcademicYear::new(2).expect("valid year"),
        )
        .with_courses([code("CSC101"), code("CSC201")])
    }

    fn resolver(
        store: MockRecordStore,
        generator: MockAnswerGenerator,
    ) -> AnswerResolver<MockRecordStore, MockAnswerGenerator> {
        AnswerResolver::new(Arc::new(store), Arc::new(generator))
    }

    #[rstest]
    #[tokio::test]
    async fn enrolled_course_mention_is_answered_from_record(student: User) {
        let mut store = MockRecordStore::new();
        store
            .expect_get_course()
            .withf(|requested| requested.as_ref() == "CSC101")
            .times(1)
            .return_once(|_| {
                Ok(Some(course(
                    "CSC101",
                    "Introduction to Programming",
                    Some("Recursion"),
                )))
            });
        let mut generator = MockAnswerGenerator::new();
        generator.expect_generate().times(0);

        let resolution = resolver(store, generator)
            .resolve(&question("when is the CSC101 lab?"), &student)
            .await
            .expect("resolution");

        assert_eq!(
            resolution,
            Resolution::CourseInfo {
                code: code("CSC101"),
                answer: "CSC101 (Introduction to Programming): Recursion".to_owned(),
            }
        );
    }

    #[rstest]
    #[tokio::test]
    async fn smallest_matching_code_wins(student: User) {
        let mut store = MockRecordStore::new();
        store
            .expect_get_course()
            .withf(|requested| requested.as_ref() == "CSC101")
            .times(1)
            .return_once(|_| Ok(Some(course("CSC101", "Introduction to Programming", None))));

        let resolution = resolver(store, MockAnswerGenerator::new())
            .resolve(&question("is csc201 harder than csc101?"), &student)
            .await
            .expect("resolution");

        assert_eq!(
            resolution.answer(),
            "CSC101 (Introduction to Programming): Ask your lecturer"
        );
    }

    #[rstest]
    #[tokio::test]
    async fn unmatched_question_calls_generator_once(student: User) {
        let mut store = MockRecordStore::new();
        store.expect_get_course().times(0);
        let mut generator = MockAnswerGenerator::new();
        generator
            .expect_generate()
            .withf(|prompt| {
                prompt.user == "CS Student (2 year) asks: what is recursion?"
                    && prompt.system.contains("Computer Science assistant")
            })
            .times(1)
            .return_once(|_| Ok("Recursion is a function calling itself.".to_owned()));

        let resolution = resolver(store, generator)
            .resolve(&question("what is recursion?"), &student)
            .await
            .expect("resolution");

        assert_eq!(
            resolution,
            Resolution::Generated {
                answer: "Recursion is a function calling itself.".to_owned()
            }
        );
    }

    #[rstest]
    #[tokio::test]
    async fn unenrolled_code_is_not_matched(student: User) {
        let mut store = MockRecordStore::new();
        store.expect_get_course().times(0);
        let mut generator = MockAnswerGenerator::new();
        generator
            .expect_generate()
            .times(1)
            .return_once(|_| Ok("MTH101 covers calculus.".to_owned()));

        let resolution = resolver(store, generator)
            .resolve(&question("what is MTH101 about?"), &student)
            .await
            .expect("resolution");

        assert!(matches!(resolution, Resolution::Generated { .. }));
    }

    #[rstest]
    #[tokio::test]
    async fn missing_course_record_falls_back_to_generation(student: User) {
        let mut store = MockRecordStore::new();
        store
            .expect_get_course()
            .times(1)
            .return_once(|_| Ok(None));
        let mut generator = MockAnswerGenerator::new();
        generator
            .expect_generate()
            .times(1)
            .return_once(|_| Ok("generated".to_owned()));

        let resolution = resolver(store, generator)
            .resolve(&question("CSC201 next class?"), &student)
            .await
            .expect("resolution");

        assert_eq!(resolution.into_answer(), "generated");
    }

    #[rstest]
    #[tokio::test]
    async fn course_read_failure_is_storage_error(student: User) {
        let mut store = MockRecordStore::new();
        store
            .expect_get_course()
            .times(1)
            .return_once(|_| Err(RecordStoreError::connection("refused")));
        let mut generator = MockAnswerGenerator::new();
        generator.expect_generate().times(0);

        let err = resolver(store, generator)
            .resolve(&question("CSC101 topic?"), &student)
            .await
            .expect_err("storage failure");

        assert_eq!(err.code(), ErrorCode::StorageError);
    }

    #[rstest]
    #[case(AnswerGeneratorError::transport("connection reset"))]
    #[case(AnswerGeneratorError::rate_limited("slow down"))]
    #[case(AnswerGeneratorError::provider(500_u16, "upstream"))]
    #[case(AnswerGeneratorError::empty_completion())]
    #[tokio::test]
    async fn generator_failures_become_service_unavailable(
        student: User,
        #[case] failure: AnswerGeneratorError,
    ) {
        let cause = failure.to_string();
        let mut generator = MockAnswerGenerator::new();
        generator
            .expect_generate()
            .times(1)
            .return_once(move |_| Err(failure));

        let err = resolver(MockRecordStore::new(), generator)
            .resolve(&question("explain big-O"), &student)
            .await
            .expect_err("generation failure");

        assert_eq!(err.code(), ErrorCode::ServiceUnavailable);
        assert_eq!(err.details(), Some(&json!({ "cause": cause })));
    }

    struct StalledGenerator;

    #[async_trait]
    impl AnswerGenerator for StalledGenerator {
        async fn generate(
            &self,
            _prompt: &GenerationPrompt,
        ) -> Result<String, AnswerGeneratorError> {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok("too late".to_owned())
        }
    }

    #[rstest]
    #[tokio::test]
    async fn deadline_elapsing_is_service_unavailable(student: User) {
        let resolver = AnswerResolver::new(Arc::new(MockRecordStore::new()), Arc::new(StalledGenerator))
            .with_deadline(Duration::from_millis(20));

        let err = resolver
            .resolve(&question("explain big-O"), &student)
            .await
            .expect_err("deadline");

        assert_eq!(err.code(), ErrorCode::ServiceUnavailable);
        assert!(err.message().contains("generator timeout"));
    }
}
