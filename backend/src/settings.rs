//! Application settings loaded via OrthoConfig.
//!
//! Values come from CLI flags, `CS_ASSISTANT_*` environment variables and an
//! optional configuration file. Every field is optional; accessors supply the
//! defaults and validate the values that need parsing.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use chrono::FixedOffset;
use ortho_config::OrthoConfig;
use reqwest::Url;
use serde::Deserialize;

use crate::domain::{DAILY_QUERY_LIMIT, DEFAULT_GENERATION_DEADLINE};
use crate::outbound::generation::{
    DEFAULT_OPENAI_ENDPOINT, DEFAULT_OPENAI_MODEL, DEFAULT_TEMPERATURE,
};

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8000";
const DEFAULT_STORE_TIMEOUT_SECS: u64 = 10;
const DEFAULT_UTC_OFFSET_MINUTES: i32 = 60;

fn default_seed_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("fixtures")
        .join("seed.json")
}

/// Errors raised when a configured value cannot be used.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SettingsError {
    /// A value failed to parse.
    #[error("invalid {field}: {message}")]
    Invalid {
        /// Setting name.
        field: &'static str,
        /// Parse failure.
        message: String,
    },
    /// A setting required by the selected backend is absent.
    #[error("{field} is required when {requirement}")]
    Missing {
        /// Setting name.
        field: &'static str,
        /// Condition making it required.
        requirement: &'static str,
    },
}

/// Record store implementation selected at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    /// In-process store seeded from a snapshot file.
    Memory,
    /// Firebase Realtime Database over REST.
    Firebase,
}

/// Answer generator implementation selected at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GeneratorBackend {
    /// Chat-completions provider.
    OpenAi,
    /// Offline generator with a fixed reply.
    Fixture,
}

/// Server settings.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "CS_ASSISTANT")]
pub struct AppSettings {
    /// Socket address to bind, e.g. `0.0.0.0:8000`.
    pub bind_addr: Option<String>,
    /// `memory` or `firebase`.
    pub store_backend: Option<String>,
    /// Realtime Database root URL, e.g. `https://project.firebaseio.com/`.
    pub firebase_database_url: Option<String>,
    /// Database secret or ID token sent as the `auth` query parameter.
    pub firebase_auth_token: Option<String>,
    /// Snapshot seeding the in-memory store.
    pub seed_path: Option<PathBuf>,
    /// Per-request timeout for record store calls, in seconds.
    pub store_timeout_secs: Option<u64>,
    /// `openai` or `fixture`. Defaults to `openai` when an API key is set.
    pub generator_backend: Option<String>,
    /// Chat-completions endpoint.
    pub openai_base_url: Option<String>,
    /// Chat-completions model.
    pub openai_model: Option<String>,
    /// Chat-completions bearer token.
    pub openai_api_key: Option<String>,
    /// Sampling temperature.
    pub temperature: Option<f32>,
    /// Generation deadline, in seconds.
    pub generation_timeout_secs: Option<u64>,
    /// Answered questions allowed per student.
    pub daily_query_limit: Option<u32>,
    /// Reference offset for question timestamps, in minutes east of UTC.
    pub utc_offset_minutes: Option<i32>,
}

impl AppSettings {
    /// Socket address to bind.
    ///
    /// # Errors
    /// Returns [`SettingsError::Invalid`] when the address does not parse.
    pub fn bind_addr(&self) -> Result<SocketAddr, SettingsError> {
        self.bind_addr
            .as_deref()
            .unwrap_or(DEFAULT_BIND_ADDR)
            .parse()
            .map_err(|err: std::net::AddrParseError| SettingsError::Invalid {
                field: "bind_addr",
                message: err.to_string(),
            })
    }

    /// Selected record store.
    ///
    /// # Errors
    /// Returns [`SettingsError::Invalid`] for unknown backend names.
    pub fn store_backend(&self) -> Result<StoreBackend, SettingsError> {
        match self
            .store_backend
            .as_deref()
            .map(str::to_ascii_lowercase)
            .as_deref()
        {
            None | Some("memory") => Ok(StoreBackend::Memory),
            Some("firebase") => Ok(StoreBackend::Firebase),
            Some(other) => Err(SettingsError::Invalid {
                field: "store_backend",
                message: format!("unknown backend {other:?}; expected memory or firebase"),
            }),
        }
    }

    /// Realtime Database root URL.
    ///
    /// # Errors
    /// Fails when absent or not a URL.
    pub fn firebase_database_url(&self) -> Result<Url, SettingsError> {
        let raw = self
            .firebase_database_url
            .as_deref()
            .ok_or(SettingsError::Missing {
                field: "firebase_database_url",
                requirement: "store_backend is firebase",
            })?;
        parse_url("firebase_database_url", raw)
    }

    /// Snapshot seeding the in-memory store.
    pub fn seed_path(&self) -> PathBuf {
        self.seed_path.clone().unwrap_or_else(default_seed_path)
    }

    /// Record store request timeout.
    pub fn store_timeout(&self) -> Duration {
        Duration::from_secs(
            self.store_timeout_secs
                .unwrap_or(DEFAULT_STORE_TIMEOUT_SECS)
                .max(1),
        )
    }

    /// Selected answer generator.
    ///
    /// Unset, it is `openai` when an API key is configured. Otherwise it is
    /// `fixture`, but only for the in-memory store: a Firebase deployment must
    /// opt into the offline generator explicitly.
    ///
    /// # Errors
    /// Returns [`SettingsError::Invalid`] for unknown backend names and
    /// [`SettingsError::Missing`] when a Firebase deployment has neither a
    /// key nor an explicit backend.
    pub fn generator_backend(&self) -> Result<GeneratorBackend, SettingsError> {
        match self
            .generator_backend
            .as_deref()
            .map(str::to_ascii_lowercase)
            .as_deref()
        {
            None if self.openai_api_key.is_some() => Ok(GeneratorBackend::OpenAi),
            None if self.store_backend()? == StoreBackend::Firebase => {
                Err(SettingsError::Missing {
                    field: "openai_api_key",
                    requirement: "store_backend is firebase and generator_backend is not fixture",
                })
            }
            None | Some("fixture") => Ok(GeneratorBackend::Fixture),
            Some("openai") => Ok(GeneratorBackend::OpenAi),
            Some(other) => Err(SettingsError::Invalid {
                field: "generator_backend",
                message: format!("unknown backend {other:?}; expected openai or fixture"),
            }),
        }
    }

    /// Chat-completions endpoint.
    ///
    /// # Errors
    /// Returns [`SettingsError::Invalid`] when the URL does not parse.
    pub fn openai_base_url(&self) -> Result<Url, SettingsError> {
        parse_url(
            "openai_base_url",
            self.openai_base_url
                .as_deref()
                .unwrap_or(DEFAULT_OPENAI_ENDPOINT),
        )
    }

    /// Chat-completions model.
    pub fn openai_model(&self) -> &str {
        self.openai_model.as_deref().unwrap_or(DEFAULT_OPENAI_MODEL)
    }

    /// Chat-completions bearer token.
    ///
    /// # Errors
    /// Returns [`SettingsError::Missing`] when unset.
    pub fn openai_api_key(&self) -> Result<&str, SettingsError> {
        self.openai_api_key
            .as_deref()
            .filter(|key| !key.trim().is_empty())
            .ok_or(SettingsError::Missing {
                field: "openai_api_key",
                requirement: "generator_backend is openai",
            })
    }

    /// Sampling temperature.
    pub fn temperature(&self) -> f32 {
        self.temperature.unwrap_or(DEFAULT_TEMPERATURE)
    }

    /// Generation deadline.
    pub fn generation_timeout(&self) -> Duration {
        self.generation_timeout_secs
            .map_or(DEFAULT_GENERATION_DEADLINE, |secs| {
                Duration::from_secs(secs.max(1))
            })
    }

    /// Answered questions allowed per student.
    pub fn daily_query_limit(&self) -> u32 {
        self.daily_query_limit.unwrap_or(DAILY_QUERY_LIMIT)
    }

    /// Reference offset for question timestamps.
    ///
    /// # Errors
    /// Returns [`SettingsError::Invalid`] for offsets beyond ±24 hours.
    pub fn utc_offset(&self) -> Result<FixedOffset, SettingsError> {
        let minutes = self.utc_offset_minutes.unwrap_or(DEFAULT_UTC_OFFSET_MINUTES);
        minutes
            .checked_mul(60)
            .and_then(FixedOffset::east_opt)
            .ok_or_else(|| SettingsError::Invalid {
                field: "utc_offset_minutes",
                message: format!("{minutes} minutes is not a valid UTC offset"),
            })
    }
}

fn parse_url(field: &'static str, raw: &str) -> Result<Url, SettingsError> {
    Url::parse(raw).map_err(|err| SettingsError::Invalid {
        field,
        message: err.to_string(),
    })
}
