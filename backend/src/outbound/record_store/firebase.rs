//! Reqwest-backed Firebase Realtime Database adapter.
//!
//! One REST round trip per port call against `{base}/{path}.json`. The
//! optional database secret travels as the `auth` query parameter, so every
//! reqwest error is stripped of its URL before it is surfaced.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderValue, IF_MATCH};
use reqwest::{Client, Method, RequestBuilder, StatusCode, Url};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::json;
use tracing::debug;
use zeroize::Zeroizing;

use super::dto::{CourseRecordDto, QuestionRecordDto, StoreSnapshot, UserRecordDto};
use crate::domain::ports::{RecordStore, RecordStoreError};
use crate::domain::{Course, CourseCode, QuestionRecord, User, UserId};

/// ETag Firebase reports for a location holding no data.
const NULL_ETAG: &str = "null_etag";

/// Errors raised while building the adapter.
#[derive(Debug, thiserror::Error)]
pub enum FirebaseStoreBuildError {
    /// The database URL cannot carry path segments.
    #[error("database URL {0} cannot be used as a base URL")]
    CannotBeBase(String),
    /// The HTTP client could not be constructed.
    #[error("failed to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),
}

/// Record store backed by the Firebase Realtime Database REST API.
pub struct FirebaseRecordStore {
    client: Client,
    base_url: Url,
    auth_token: Option<Zeroizing<String>>,
}

impl FirebaseRecordStore {
    /// Build an adapter for `base_url` with a per-request timeout.
    ///
    /// # Errors
    /// Fails when the URL cannot carry a path or the client cannot be built.
    pub fn new(base_url: Url, timeout: Duration) -> Result<Self, FirebaseStoreBuildError> {
        if base_url.cannot_be_a_base() {
            return Err(FirebaseStoreBuildError::CannotBeBase(base_url.to_string()));
        }
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url,
            auth_token: None,
        })
    }

    /// Authenticate requests with a database secret or ID token.
    #[must_use]
    pub fn with_auth_token(mut self, token: impl Into<String>) -> Self {
        self.auth_token = Some(Zeroizing::new(token.into()));
        self
    }

    /// Write every user and course of `snapshot`, replacing existing records.
    ///
    /// # Errors
    /// Returns the first failed write.
    pub async fn put_snapshot(&self, snapshot: &StoreSnapshot) -> Result<(), RecordStoreError> {
        for (id, user) in &snapshot.users {
            self.write_json(Method::PUT, &["users", id], user, None)
                .await?;
        }
        for (code, course) in &snapshot.courses {
            self.write_json(Method::PUT, &["courses", code], course, None)
                .await?;
        }
        Ok(())
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url, RecordStoreError> {
        let mut url = self.base_url.clone();
        {
            let mut path = url.path_segments_mut().map_err(|()| {
                RecordStoreError::connection("database URL cannot carry a path")
            })?;
            path.pop_if_empty();
            if let Some((last, parents)) = segments.split_last() {
                path.extend(parents);
                path.push(&format!("{last}.json"));
            }
        }
        if let Some(token) = &self.auth_token {
            url.query_pairs_mut().append_pair("auth", token.as_str());
        }
        Ok(url)
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        segments: &[&str],
    ) -> Result<Option<T>, RecordStoreError> {
        let url = self.endpoint(segments)?;
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(map_transport_error)?;
        let status = response.status();
        let body = response.bytes().await.map_err(map_transport_error)?;
        if !status.is_success() {
            return Err(map_status_error(status, body.as_ref()));
        }
        decode_optional(body.as_ref())
    }

    fn write_request<T: Serialize + ?Sized>(
        &self,
        method: Method,
        segments: &[&str],
        body: &T,
        if_match: Option<&'static str>,
    ) -> Result<RequestBuilder, RecordStoreError> {
        let url = self.endpoint(segments)?;
        let mut request = self.client.request(method, url).json(body);
        if let Some(etag) = if_match {
            request = request.header(IF_MATCH, HeaderValue::from_static(etag));
        }
        Ok(request)
    }

    /// PUT for a new question record, conditional on the location being empty.
    fn append_request(&self, record: &QuestionRecord) -> Result<RequestBuilder, RecordStoreError> {
        let record_id = record.id().to_string();
        self.write_request(
            Method::PUT,
            &["questions", record.user_id().as_ref(), &record_id],
            &QuestionRecordDto::from(record),
            Some(NULL_ETAG),
        )
    }

    async fn write_json<T: Serialize + Sync>(
        &self,
        method: Method,
        segments: &[&str],
        body: &T,
        if_match: Option<&'static str>,
    ) -> Result<(), RecordStoreError> {
        let request = self.write_request(method, segments, body, if_match)?;
        send_write(request).await
    }
}

async fn send_write(request: RequestBuilder) -> Result<(), RecordStoreError> {
    let response = request.send().await.map_err(map_transport_error)?;
    let status = response.status();
    if status.is_success() {
        return Ok(());
    }
    let body = response.bytes().await.map_err(map_transport_error)?;
    Err(map_status_error(status, body.as_ref()))
}

#[async_trait]
impl RecordStore for FirebaseRecordStore {
    async fn get_user(&self, id: &UserId) -> Result<Option<User>, RecordStoreError> {
        let record: Option<UserRecordDto> = self.get_json(&["users", id.as_ref()]).await?;
        record
            .map(|dto| dto.into_domain(id.clone()))
            .transpose()
            .map_err(RecordStoreError::decode)
    }

    async fn get_course(&self, code: &CourseCode) -> Result<Option<Course>, RecordStoreError> {
        let record: Option<CourseRecordDto> = self.get_json(&["courses", code.as_ref()]).await?;
        Ok(record.map(|dto| dto.into_domain(code.clone())))
    }

    async fn update_query_count(&self, id: &UserId, count: u32) -> Result<(), RecordStoreError> {
        self.write_json(
            Method::PATCH,
            &["users", id.as_ref()],
            &json!({ "query_count": count }),
            None,
        )
        .await
    }

    async fn append_question(&self, record: &QuestionRecord) -> Result<(), RecordStoreError> {
        debug!(user_id = %record.user_id(), record_id = %record.id(), "appending question record");
        send_write(self.append_request(record)?).await
    }
}

fn decode_optional<T: DeserializeOwned>(body: &[u8]) -> Result<Option<T>, RecordStoreError> {
    serde_json::from_slice(body).map_err(|error| {
        RecordStoreError::decode(format!("invalid record store JSON payload: {error}"))
    })
}

fn map_transport_error(error: reqwest::Error) -> RecordStoreError {
    let error = error.without_url();
    if error.is_timeout() {
        RecordStoreError::timeout(error.to_string())
    } else {
        RecordStoreError::connection(error.to_string())
    }
}

fn map_status_error(status: StatusCode, body: &[u8]) -> RecordStoreError {
    let preview = body_preview(body);
    match status {
        StatusCode::REQUEST_TIMEOUT | StatusCode::GATEWAY_TIMEOUT => {
            RecordStoreError::timeout(format!("status {}: {preview}", status.as_u16()))
        }
        StatusCode::PRECONDITION_FAILED => {
            RecordStoreError::conflict(format!("record already exists: {preview}"))
        }
        _ => RecordStoreError::rejected(status.as_u16(), preview),
    }
}

fn body_preview(body: &[u8]) -> String {
    const PREVIEW_CHAR_LIMIT: usize = 160;

    let compact = String::from_utf8_lossy(body)
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");
    if compact.chars().count() > PREVIEW_CHAR_LIMIT {
        let truncated: String = compact.chars().take(PREVIEW_CHAR_LIMIT).collect();
        format!("{truncated}...")
    } else {
        compact
    }
}
