//! In-process application wired to the seeded in-memory store.
//!
//! Mirrors the production route table so integration suites exercise the
//! real handlers, extractor configuration and trace middleware.

use std::sync::Arc;

use actix_web::body::MessageBody;
use actix_web::dev::{ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::http::StatusCode;
use actix_web::test as actix_test;
use actix_web::{App, web};
use cs_assistant::Trace;
use cs_assistant::domain::ports::RecordStore;
use cs_assistant::domain::{AskService, AskServiceOptions, QuotaTracker, User, UserId};
use cs_assistant::inbound::http::ask::ask;
use cs_assistant::inbound::http::courses::get_course;
use cs_assistant::inbound::http::state::HttpState;
use cs_assistant::inbound::http::{json_config, path_config};
use cs_assistant::outbound::record_store::InMemoryRecordStore;
use cs_assistant::test_support::{
    DEMO_USER_ID, FixtureClock, RecordingAnswerGenerator, demo_store,
};
use serde_json::Value;

/// Answer returned by the default generator double.
pub const GENERATED_ANSWER: &str = "Here is a short explanation from the assistant.";

/// Adapters and tunables behind one application instance.
pub struct AskApp {
    pub store: Arc<InMemoryRecordStore>,
    pub generator: Arc<RecordingAnswerGenerator>,
    pub options: AskServiceOptions,
}

impl Default for AskApp {
    fn default() -> Self {
        Self::with_generator(RecordingAnswerGenerator::answering(GENERATED_ANSWER))
    }
}

impl AskApp {
    /// Seeded store with the given generator double.
    pub fn with_generator(generator: RecordingAnswerGenerator) -> Self {
        Self {
            store: Arc::new(demo_store()),
            generator: Arc::new(generator),
            options: AskServiceOptions::default(),
        }
    }

    /// Replace the daily limit.
    #[must_use]
    pub fn with_daily_limit(mut self, limit: u32) -> Self {
        self.options.quota = QuotaTracker::new(limit);
        self
    }

    /// Shared state built from the current adapters.
    pub fn http_state(&self) -> web::Data<HttpState> {
        let service = Arc::new(AskService::with_options(
            Arc::clone(&self.store),
            Arc::clone(&self.generator),
            Arc::new(FixtureClock::default()),
            self.options.clone(),
        ));
        web::Data::new(HttpState::new(service.clone(), service))
    }

    /// Send one request through a fresh application instance.
    pub async fn send(&self, request: actix_test::TestRequest) -> Reply {
        let app = actix_test::init_service(app(self.http_state())).await;
        Reply::read(actix_test::call_service(&app, request.to_request()).await).await
    }

    /// Current record of the seeded student.
    pub async fn demo_student(&self) -> User {
        let id = UserId::new(DEMO_USER_ID).expect("valid id");
        self.store
            .get_user(&id)
            .await
            .expect("store read")
            .expect("seeded student")
    }
}

/// Route table around `state`, as served in production.
pub fn app(
    state: web::Data<HttpState>,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    App::new()
        .app_data(state)
        .app_data(json_config())
        .app_data(path_config())
        .wrap(Trace)
        .service(web::scope("/cs").service(ask).service(get_course))
}

/// Status, trace header and JSON body of a response.
#[derive(Debug)]
pub struct Reply {
    pub status: StatusCode,
    pub trace_id: Option<String>,
    pub body: Value,
}

impl Reply {
    /// Drain `response` into a [`Reply`].
    pub async fn read<B: MessageBody>(response: ServiceResponse<B>) -> Self {
        let status = response.status();
        let trace_id = response
            .headers()
            .get("trace-id")
            .and_then(|value| value.to_str().ok())
            .map(str::to_owned);
        let body = actix_test::read_body_json(response).await;
        Self {
            status,
            trace_id,
            body,
        }
    }
}

/// `POST /cs/ask` request for `question` from the seeded student.
pub fn ask_request(question: &str) -> actix_test::TestRequest {
    actix_test::TestRequest::post()
        .uri("/cs/ask")
        .set_json(serde_json::json!({ "question": question, "user_id": DEMO_USER_ID }))
}
