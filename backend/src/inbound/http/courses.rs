//! Course lookup endpoint.
//!
//! ```text
//! GET /cs/courses/CSC101
//! ```

use actix_web::{HttpResponse, get, web};
use serde::{Deserialize, Serialize};
use serde_json::json;
use utoipa::ToSchema;

use crate::domain::{Course, CourseCode, Error};
use crate::inbound::http::ApiResult;
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::state::HttpState;

/// Response body for `GET /cs/courses/{code}`.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct CourseResponse {
    /// Normalised course code.
    #[schema(example = "CSC101")]
    pub code: String,
    /// Course title.
    #[schema(example = "Introduction to Programming")]
    pub title: String,
    /// Lecturer name.
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(example = "Dr. Smith")]
    pub lecturer: Option<String>,
    /// Topic of the next lecture.
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(example = "Recursion")]
    pub next_topic: Option<String>,
    /// Lab schedule.
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(example = "Tuesdays 2-4pm")]
    pub lab_schedule: Option<String>,
}

impl From<Course> for CourseResponse {
    fn from(course: Course) -> Self {
        Self {
            code: course.code().to_string(),
            title: course.title().to_owned(),
            lecturer: course.lecturer().map(str::to_owned),
            next_topic: course.next_topic().map(str::to_owned),
            lab_schedule: course.lab_schedule().map(str::to_owned),
        }
    }
}

/// Fetch a course record by code. Codes are case-insensitive.
#[utoipa::path(
    get,
    path = "/cs/courses/{code}",
    params(("code" = String, Path, description = "Course code, e.g. CSC101")),
    responses(
        (status = 200, description = "Course", body = CourseResponse),
        (status = 404, description = "Course not found", body = ErrorSchema),
        (status = 500, description = "Record store failure", body = ErrorSchema)
    ),
    tags = ["cs"],
    operation_id = "getCourse"
)]
#[get("/courses/{code}")]
pub async fn get_course(
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let raw = path.into_inner();
    // A code that cannot be a store key cannot name a stored course.
    let code = CourseCode::new(&raw).map_err(|err| {
        Error::not_found("Course not found")
            .with_details(json!({ "code": raw, "cause": err.to_string() }))
    })?;
    let course = state.courses.get_course(&code).await?;
    Ok(HttpResponse::Ok().json(CourseResponse::from(course)))
}
