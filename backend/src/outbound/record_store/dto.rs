//! Wire layout of the record store.
//!
//! ```text
//! users/{id}                    {name, matric_no, year, query_count, courses: {CODE: true}}
//! courses/{CODE}                {title, lecturer, next_topic, lab_schedule}
//! questions/{userId}/{recordId} {question, response, timestamp, course_code}
//! ```
//!
//! Both store adapters and the seed snapshot share these DTOs, so the
//! in-memory store decodes exactly what the remote store would return.

use std::collections::BTreeMap;

use chrono::DateTime;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::domain::{
    AcademicYear, Course, CourseCode, CourseDetails, QuestionId, QuestionRecord,
    QuestionRecordDraft, User, UserId,
};

const fn default_year() -> u8 {
    1
}

/// Stored student record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRecordDto {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub matric_no: String,
    #[serde(default = "default_year")]
    pub year: u8,
    #[serde(default)]
    pub query_count: u32,
    #[serde(default)]
    pub courses: BTreeMap<String, bool>,
}

impl UserRecordDto {
    /// Decode into a domain student keyed by `id`.
    ///
    /// Only courses flagged `true` count as enrolled. Enrolment keys that are
    /// not usable course codes are skipped with a warning so one bad key
    /// does not lock the student out.
    pub fn into_domain(self, id: UserId) -> Result<User, String> {
        let year = AcademicYear::new(self.year).map_err(|err| format!("user {id}: {err}"))?;
        let courses = self
            .courses
            .into_iter()
            .filter(|(_, enrolled)| *enrolled)
            .filter_map(|(raw, _)| match CourseCode::new(&raw) {
                Ok(code) => Some(code),
                Err(err) => {
                    warn!(user_id = %id, course_key = %raw, error = %err, "skipping unusable enrolment key");
                    None
                }
            })
            .collect::<Vec<_>>();
        Ok(User::new(id, self.name, self.matric_no, year)
            .with_courses(courses)
            .with_query_count(self.query_count))
    }
}

impl From<&User> for UserRecordDto {
    fn from(user: &User) -> Self {
        Self {
            name: user.name().to_owned(),
            matric_no: user.matric_no().to_owned(),
            year: user.year().get(),
            query_count: user.query_count(),
            courses: user
                .courses()
                .iter()
                .map(|code| (code.as_ref().to_owned(), true))
                .collect(),
        }
    }
}

/// Stored course record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CourseRecordDto {
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lecturer: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_topic: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lab_schedule: Option<String>,
}

impl CourseRecordDto {
    /// Decode into a domain course keyed by `code`.
    pub fn into_domain(self, code: CourseCode) -> Course {
        Course::new(
            code,
            self.title,
            CourseDetails {
                lecturer: self.lecturer,
                next_topic: self.next_topic,
                lab_schedule: self.lab_schedule,
            },
        )
    }
}

impl From<&Course> for CourseRecordDto {
    fn from(course: &Course) -> Self {
        Self {
            title: course.title().to_owned(),
            lecturer: course.lecturer().map(str::to_owned),
            next_topic: course.next_topic().map(str::to_owned),
            lab_schedule: course.lab_schedule().map(str::to_owned),
        }
    }
}

/// Stored question record. An absent course hint is stored as `""`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionRecordDto {
    pub question: String,
    pub response: String,
    pub timestamp: String,
    #[serde(default)]
    pub course_code: String,
}

impl QuestionRecordDto {
    /// Decode into a domain record.
    pub fn into_domain(self, id: QuestionId, user_id: UserId) -> Result<QuestionRecord, String> {
        let asked_at = DateTime::parse_from_rfc3339(&self.timestamp)
            .map_err(|err| format!("question {id}: invalid timestamp {:?}: {err}", self.timestamp))?;
        let course_code = Some(self.course_code).filter(|hint| !hint.is_empty());
        Ok(QuestionRecord::new(
            id,
            QuestionRecordDraft {
                user_id,
                question: self.question,
                response: self.response,
                course_code,
                asked_at,
            },
        ))
    }
}

impl From<&QuestionRecord> for QuestionRecordDto {
    fn from(record: &QuestionRecord) -> Self {
        Self {
            question: record.question().to_owned(),
            response: record.response().to_owned(),
            timestamp: record.timestamp(),
            course_code: record.course_code().unwrap_or_default().to_owned(),
        }
    }
}

/// Users and courses in the persisted layout, as used for seeding.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreSnapshot {
    #[serde(default)]
    pub users: BTreeMap<String, UserRecordDto>,
    #[serde(default)]
    pub courses: BTreeMap<String, CourseRecordDto>,
}

impl StoreSnapshot {
    /// Check every key and record decodes into the domain model.
    pub fn validate(&self) -> Result<(), String> {
        for (raw_id, record) in &self.users {
            let id = UserId::new(raw_id).map_err(|err| format!("user key {raw_id:?}: {err}"))?;
            record.clone().into_domain(id)?;
        }
        for (raw_code, _) in &self.courses {
            let code =
                CourseCode::new(raw_code).map_err(|err| format!("course key {raw_code:?}: {err}"))?;
            if code.as_ref() != raw_code {
                return Err(format!("course key {raw_code:?} must be upper case"));
            }
        }
        Ok(())
    }
}
