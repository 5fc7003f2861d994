//! Adapter selection and HTTP state assembly.

use std::sync::Arc;

use mockable::DefaultClock;
use tracing::{info, warn};

use cs_assistant::domain::ports::{AnswerGenerator, FixtureAnswerGenerator, RecordStore};
use cs_assistant::domain::{AskService, AskServiceOptions, QuotaTracker};
use cs_assistant::inbound::http::state::HttpState;
use cs_assistant::outbound::generation::OpenAiAnswerGenerator;
use cs_assistant::outbound::record_store::{FirebaseRecordStore, InMemoryRecordStore};
use cs_assistant::settings::{AppSettings, GeneratorBackend, StoreBackend};

/// Startup failures while wiring adapters.
#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    /// A setting is missing or malformed.
    #[error(transparent)]
    Settings(#[from] cs_assistant::settings::SettingsError),
    /// The seed snapshot could not be loaded.
    #[error(transparent)]
    Seed(#[from] cs_assistant::outbound::record_store::SnapshotLoadError),
    /// The Firebase adapter could not be built.
    #[error(transparent)]
    Firebase(#[from] cs_assistant::outbound::record_store::FirebaseStoreBuildError),
    /// An HTTP client could not be built.
    #[error("failed to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),
}

fn build_record_store(settings: &AppSettings) -> Result<Arc<dyn RecordStore>, StartupError> {
    match settings.store_backend()? {
        StoreBackend::Memory => {
            let seed_path = settings.seed_path();
            let store = InMemoryRecordStore::from_seed_file(&seed_path)?;
            info!(seed_path = %seed_path.display(), "using in-memory record store");
            Ok(Arc::new(store))
        }
        StoreBackend::Firebase => {
            let url = settings.firebase_database_url()?;
            info!(host = url.host_str(), "using Firebase record store");
            let mut store = FirebaseRecordStore::new(url, settings.store_timeout())?;
            if let Some(token) = settings.firebase_auth_token.as_deref() {
                store = store.with_auth_token(token);
            }
            Ok(Arc::new(store))
        }
    }
}

fn build_answer_generator(
    settings: &AppSettings,
) -> Result<Arc<dyn AnswerGenerator>, StartupError> {
    match settings.generator_backend()? {
        GeneratorBackend::OpenAi => {
            let endpoint = settings.openai_base_url()?;
            info!(model = settings.openai_model(), "using chat-completions generator");
            let generator = OpenAiAnswerGenerator::new(
                endpoint,
                settings.openai_api_key()?,
                settings.generation_timeout(),
            )?
            .with_model(settings.openai_model())
            .with_temperature(settings.temperature());
            Ok(Arc::new(generator))
        }
        GeneratorBackend::Fixture => {
            warn!("using offline fixture generator; answers are canned text");
            Ok(Arc::new(FixtureAnswerGenerator))
        }
    }
}

/// Build the handler state from configured adapters.
///
/// # Errors
/// Returns [`StartupError`] when a setting is invalid or an adapter cannot
/// be constructed.
pub fn build_http_state(settings: &AppSettings) -> Result<HttpState, StartupError> {
    let store = build_record_store(settings)?;
    let generator = build_answer_generator(settings)?;
    let options = AskServiceOptions {
        quota: QuotaTracker::new(settings.daily_query_limit()),
        generation_deadline: settings.generation_timeout(),
        reference_offset: settings.utc_offset()?,
        ..AskServiceOptions::default()
    };
    let service = Arc::new(AskService::with_options(
        store,
        generator,
        Arc::new(DefaultClock),
        options,
    ));
    Ok(HttpState::new(service.clone(), service))
}
