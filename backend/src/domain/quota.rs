//! Daily question quota.
//!
//! The tracker is a pure function of a student's stored counter. Callers
//! persist the incremented value themselves and serialise check-then-increment
//! per student through [`UserLocks`].

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError, Weak};

use serde_json::json;
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

use crate::domain::{Error, User, UserId};

/// Default number of answered questions allowed per student per day.
pub const DAILY_QUERY_LIMIT: u32 = 50;

/// Enforces the daily ceiling on answered questions.
///
/// # Examples
/// ```
/// use cs_assistant::domain::{AcademicYear, QuotaTracker, User, UserId};
///
/// let tracker = QuotaTracker::default();
/// let user = User::new(
///     UserId::new("CS_STUDENT_1").expect("valid id"),
///     "Test Student",
///     "CS2023001",
///     AcademicYear::new(2).expect("valid year"),
/// )
/// .with_query_count(49);
/// assert!(tracker.check(&user));
/// assert!(!tracker.check(&user.with_query_count(50)));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuotaTracker {
    limit: u32,
}

impl Default for QuotaTracker {
    fn default() -> Self {
        Self::new(DAILY_QUERY_LIMIT)
    }
}

impl QuotaTracker {
    /// Tracker allowing `limit` answered questions.
    pub fn new(limit: u32) -> Self {
        Self { limit }
    }

    /// Configured ceiling.
    pub fn limit(&self) -> u32 {
        self.limit
    }

    /// Whether the student may ask another question.
    pub fn check(&self, user: &User) -> bool {
        user.query_count() < self.limit
    }

    /// Fail with `quota_exceeded` when the student is at or over the limit.
    pub fn ensure_available(&self, user: &User) -> Result<(), Error> {
        if self.check(user) {
            return Ok(());
        }
        Err(Error::quota_exceeded("Daily limit reached").with_details(json!({
            "limit": self.limit,
            "used": user.query_count(),
        })))
    }

    /// Counter value to persist after a successful answer.
    pub fn increment(&self, user: &User) -> Result<u32, Error> {
        user.query_count().checked_add(1).ok_or_else(|| {
            Error::internal("query counter overflow")
                .with_details(json!({ "userId": user.id().as_ref() }))
        })
    }
}

/// Registry of per-student async mutexes.
///
/// Holding a student's guard serialises every quota read-modify-write for
/// that student within this process. Entries are weak, so the map only keeps
/// students with a request in flight.
#[derive(Debug, Default)]
pub struct UserLocks {
    entries: Mutex<HashMap<UserId, Weak<AsyncMutex<()>>>>,
}

/// Guard returned by [`UserLocks::acquire`]; dropping it releases the student.
pub type UserGuard = OwnedMutexGuard<()>;

impl UserLocks {
    /// Empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait for exclusive access to `user_id`.
    pub async fn acquire(&self, user_id: &UserId) -> UserGuard {
        let lock = self.lock_for(user_id);
        lock.lock_owned().await
    }

    /// Number of students with a live lock entry.
    pub fn tracked(&self) -> usize {
        let entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        entries.values().filter(|weak| weak.strong_count() > 0).count()
    }

    fn lock_for(&self, user_id: &UserId) -> Arc<AsyncMutex<()>> {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(existing) = entries.get(user_id).and_then(Weak::upgrade) {
            return existing;
        }
        entries.retain(|_, weak| weak.strong_count() > 0);
        let lock = Arc::new(AsyncMutex::new(()));
        entries.insert(user_id.clone(), Arc::downgrade(&lock));
        lock
    }
}
