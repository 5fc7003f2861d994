//! Process-local record store.
//!
//! Holds records in their wire form so reads go through the same decoding
//! as the Firebase adapter. Seeded from a JSON snapshot for local runs and
//! used directly by tests.

use std::collections::BTreeMap;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use cap_std::{ambient_authority, fs::Dir};
use uuid::Uuid;

use super::dto::{CourseRecordDto, QuestionRecordDto, StoreSnapshot, UserRecordDto};
use crate::domain::ports::{RecordStore, RecordStoreError};
use crate::domain::{Course, CourseCode, QuestionId, QuestionRecord, User, UserId};

/// Errors raised while loading a seed snapshot from disk.
#[derive(Debug, thiserror::Error)]
pub enum SnapshotLoadError {
    /// The file could not be read.
    #[error("failed to read snapshot {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    /// The file is not a valid snapshot document.
    #[error("failed to parse snapshot {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    /// A record in the snapshot does not decode into the domain model.
    #[error("invalid snapshot {path}: {message}")]
    Invalid { path: PathBuf, message: String },
}

/// Read and validate a snapshot document.
///
/// # Errors
/// Returns [`SnapshotLoadError`] when the file is unreadable or invalid.
pub fn load_snapshot(path: &Path) -> Result<StoreSnapshot, SnapshotLoadError> {
    let io_error = |source| SnapshotLoadError::Io {
        path: path.to_path_buf(),
        source,
    };
    let file_name = path.file_name().ok_or_else(|| {
        io_error(io::Error::new(
            io::ErrorKind::InvalidInput,
            "snapshot path has no file name",
        ))
    })?;
    let parent = path
        .parent()
        .filter(|parent| !parent.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let directory = Dir::open_ambient_dir(parent, ambient_authority()).map_err(io_error)?;
    let raw = directory.read_to_string(file_name).map_err(io_error)?;

    let snapshot: StoreSnapshot =
        serde_json::from_str(&raw).map_err(|source| SnapshotLoadError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
    snapshot
        .validate()
        .map_err(|message| SnapshotLoadError::Invalid {
            path: path.to_path_buf(),
            message,
        })?;
    Ok(snapshot)
}

#[derive(Debug, Default)]
struct StoreState {
    users: BTreeMap<String, UserRecordDto>,
    courses: BTreeMap<String, CourseRecordDto>,
    questions: BTreeMap<String, BTreeMap<String, QuestionRecordDto>>,
}

/// Record store kept in process memory.
#[derive(Debug, Default)]
pub struct InMemoryRecordStore {
    state: Mutex<StoreState>,
}

impl InMemoryRecordStore {
    /// Empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-populated with `snapshot`.
    pub fn from_snapshot(snapshot: StoreSnapshot) -> Self {
        let StoreSnapshot { users, courses } = snapshot;
        Self {
            state: Mutex::new(StoreState {
                users,
                courses,
                questions: BTreeMap::new(),
            }),
        }
    }

    /// Store seeded from the snapshot document at `path`.
    ///
    /// # Errors
    /// Returns [`SnapshotLoadError`] when the file is unreadable or invalid.
    pub fn from_seed_file(path: &Path) -> Result<Self, SnapshotLoadError> {
        load_snapshot(path).map(Self::from_snapshot)
    }

    /// Insert or replace a student record.
    pub fn insert_user(&self, user: User) {
        self.lock()
            .users
            .insert(user.id().as_ref().to_owned(), UserRecordDto::from(&user));
    }

    /// Insert or replace a course record.
    pub fn insert_course(&self, course: Course) {
        self.lock()
            .courses
            .insert(course.code().as_ref().to_owned(), CourseRecordDto::from(&course));
    }

    /// Every logged question for `user_id`.
    pub fn questions_for(&self, user_id: &UserId) -> Vec<QuestionRecord> {
        let state = self.lock();
        let Some(records) = state.questions.get(user_id.as_ref()) else {
            return Vec::new();
        };
        records
            .iter()
            .filter_map(|(raw_id, dto)| {
                let id = Uuid::parse_str(raw_id).ok().map(QuestionId::from_uuid)?;
                dto.clone().into_domain(id, user_id.clone()).ok()
            })
            .collect()
    }

    fn lock(&self) -> MutexGuard<'_, StoreState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl RecordStore for InMemoryRecordStore {
    async fn get_user(&self, id: &UserId) -> Result<Option<User>, RecordStoreError> {
        let record = self.lock().users.get(id.as_ref()).cloned();
        record
            .map(|dto| dto.into_domain(id.clone()))
            .transpose()
            .map_err(RecordStoreError::decode)
    }

    async fn get_course(&self, code: &CourseCode) -> Result<Option<Course>, RecordStoreError> {
        let record = self.lock().courses.get(code.as_ref()).cloned();
        Ok(record.map(|dto| dto.into_domain(code.clone())))
    }

    async fn update_query_count(&self, id: &UserId, count: u32) -> Result<(), RecordStoreError> {
        // A PATCH against a missing location creates it, so this does too.
        self.lock()
            .users
            .entry(id.as_ref().to_owned())
            .or_insert_with(|| UserRecordDto {
                name: String::new(),
                matric_no: String::new(),
                year: 1,
                query_count: 0,
                courses: BTreeMap::new(),
            })
            .query_count = count;
        Ok(())
    }

    async fn append_question(&self, record: &QuestionRecord) -> Result<(), RecordStoreError> {
        let record_id = record.id().to_string();
        let mut state = self.lock();
        let bucket = state
            .questions
            .entry(record.user_id().as_ref().to_owned())
            .or_default();
        if bucket.contains_key(&record_id) {
            return Err(RecordStoreError::conflict(format!(
                "question {record_id} already exists"
            )));
        }
        bucket.insert(record_id, QuestionRecordDto::from(record));
        Ok(())
    }
}
