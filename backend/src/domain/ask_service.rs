//! Request orchestration for `ask` and `get_course`.
//!
//! `ask` holds the student's guard from loading the record until the new
//! query count is stored, so concurrent questions from one student cannot
//! both pass the quota check on the same counter value.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, FixedOffset};
use mockable::Clock;
use tracing::{error, info};

use crate::domain::ports::{
    AnswerGenerator, AnswerSource, AskCommand, AskRequest, AskResponse, CourseQuery, RecordStore,
};
use crate::domain::{
    AnswerResolver, AssistantPersona, Course, CourseCode, DEFAULT_GENERATION_DEADLINE, Error,
    InteractionEntry, InteractionLogger, QuotaTracker, Resolution, User, UserId, UserLocks,
};

/// West Africa Time (UTC+01:00, no daylight saving), the default reference
/// offset for question timestamps.
pub const WEST_AFRICA_TIME: FixedOffset = match FixedOffset::east_opt(3600) {
    Some(offset) => offset,
    None => panic!("UTC+01:00 is a valid offset"),
};

/// Tunables for [`AskService`].
#[derive(Debug, Clone)]
pub struct AskServiceOptions {
    pub quota: QuotaTracker,
    pub persona: AssistantPersona,
    pub generation_deadline: Duration,
    pub reference_offset: FixedOffset,
}

impl Default for AskServiceOptions {
    fn default() -> Self {
        Self {
            quota: QuotaTracker::default(),
            persona: AssistantPersona::default(),
            generation_deadline: DEFAULT_GENERATION_DEADLINE,
            reference_offset: WEST_AFRICA_TIME,
        }
    }
}

/// Orchestrator implementing the [`AskCommand`] and [`CourseQuery`] ports.
pub struct AskService<S: ?Sized, G: ?Sized> {
    store: Arc<S>,
    resolver: AnswerResolver<S, G>,
    logger: InteractionLogger<S>,
    quota: QuotaTracker,
    locks: UserLocks,
    clock: Arc<dyn Clock>,
    reference_offset: FixedOffset,
}

impl<S: ?Sized, G: ?Sized> AskService<S, G> {
    /// Service with default options.
    pub fn new(store: Arc<S>, generator: Arc<G>, clock: Arc<dyn Clock>) -> Self {
        Self::with_options(store, generator, clock, AskServiceOptions::default())
    }

    /// Service with explicit options.
    pub fn with_options(
        store: Arc<S>,
        generator: Arc<G>,
        clock: Arc<dyn Clock>,
        options: AskServiceOptions,
    ) -> Self {
        let AskServiceOptions {
            quota,
            persona,
            generation_deadline,
            reference_offset,
        } = options;
        Self {
            resolver: AnswerResolver::new(Arc::clone(&store), generator)
                .with_persona(persona)
                .with_deadline(generation_deadline),
            logger: InteractionLogger::new(Arc::clone(&store)),
            store,
            quota,
            locks: UserLocks::new(),
            clock,
            reference_offset,
        }
    }

    fn now(&self) -> DateTime<FixedOffset> {
        self.clock.utc().with_timezone(&self.reference_offset)
    }
}

impl<S, G> AskService<S, G>
where
    S: RecordStore + ?Sized,
    G: AnswerGenerator + ?Sized,
{
    async fn load_user(&self, user_id: &UserId) -> Result<User, Error> {
        self.store
            .get_user(user_id)
            .await
            .map_err(|err| err.into_domain("get_user"))?
            .ok_or_else(|| Error::not_found("CS student not found in database"))
    }

    async fn record_interaction(&self, request: &AskRequest, answer: &str) {
        let entry = InteractionEntry {
            user_id: request.user_id.clone(),
            question: request.question.as_ref().to_owned(),
            answer: answer.to_owned(),
            course_code_hint: request.course_code_hint.clone(),
            asked_at: self.now(),
        };
        if let Err(err) = self.logger.log(entry).await {
            error!(
                user_id = %request.user_id,
                error = %err,
                details = ?err.details(),
                "failed to log answered question"
            );
        }
    }
}

#[async_trait]
impl<S, G> AskCommand for AskService<S, G>
where
    S: RecordStore + ?Sized,
    G: AnswerGenerator + ?Sized,
{
    async fn ask(&self, request: AskRequest) -> Result<AskResponse, Error> {
        let _guard = self.locks.acquire(&request.user_id).await;

        let user = self.load_user(&request.user_id).await?;
        self.quota.ensure_available(&user)?;

        let resolution = self.resolver.resolve(&request.question, &user).await?;
        let source = match resolution {
            Resolution::CourseInfo { .. } => AnswerSource::CourseLookup,
            Resolution::Generated { .. } => AnswerSource::Generated,
        };
        let answer = resolution.into_answer();

        self.record_interaction(&request, &answer).await;

        let query_count = self.quota.increment(&user)?;
        self.store
            .update_query_count(user.id(), query_count)
            .await
            .map_err(|err| err.into_domain("update_query_count"))?;

        info!(
            user_id = %user.id(),
            source = ?source,
            query_count,
            "answered question"
        );
        Ok(AskResponse {
            answer,
            source,
            query_count,
        })
    }
}

#[async_trait]
impl<S, G> CourseQuery for AskService<S, G>
where
    S: RecordStore + ?Sized,
    G: AnswerGenerator + ?Sized,
{
    async fn get_course(&self, code: &CourseCode) -> Result<Course, Error> {
        self.store
            .get_course(code)
            .await
            .map_err(|err| err.into_domain("get_course"))?
            .ok_or_else(|| Error::not_found("Course not found"))
    }
}

#[cfg(test)]
#[path = "ask_service_tests.rs"]
mod tests;
