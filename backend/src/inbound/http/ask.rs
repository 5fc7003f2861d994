//! Question answering endpoint.
//!
//! ```text
//! POST /cs/ask {"question":"when is the CSC101 lab?","user_id":"CS_STUDENT_1","course_code":"CSC101"}
//! ```

use actix_web::{HttpResponse, post, web};
use serde::{Deserialize, Serialize};
use serde_json::json;
use utoipa::ToSchema;

use crate::domain::ports::AskRequest;
use crate::domain::{
    Error, QuestionText, QuestionValidationError, UserId, UserValidationError,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::state::HttpState;

/// Request body for `POST /cs/ask`.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct AskRequestBody {
    /// Question text, at most 4000 characters once trimmed. Stored as sent.
    #[schema(example = "When is the CSC101 lab?")]
    pub question: String,
    /// Student record identifier.
    #[schema(example = "CS_STUDENT_1")]
    pub user_id: String,
    /// Optional course hint, logged with the question.
    #[serde(default)]
    #[schema(example = "CSC101")]
    pub course_code: Option<String>,
}

/// Response body for `POST /cs/ask`.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct AskResponseBody {
    /// Answer text.
    #[schema(example = "CSC101 (Introduction to Programming): Recursion")]
    pub response: String,
}

impl TryFrom<AskRequestBody> for AskRequest {
    type Error = Error;

    fn try_from(body: AskRequestBody) -> Result<Self, Self::Error> {
        let user_id = UserId::new(&body.user_id).map_err(map_user_id_error)?;
        let question = QuestionText::new(&body.question).map_err(map_question_error)?;
        Ok(Self {
            user_id,
            question,
            course_code_hint: body.course_code,
        })
    }
}

fn map_question_error(err: QuestionValidationError) -> Error {
    let code = match err {
        QuestionValidationError::Empty => "empty_question",
        QuestionValidationError::TooLong { .. } => "question_too_long",
    };
    Error::invalid_request(err.to_string())
        .with_details(json!({ "field": "question", "code": code }))
}

fn map_user_id_error(err: UserValidationError) -> Error {
    let code = match err {
        UserValidationError::EmptyId => "empty_user_id",
        UserValidationError::IdTooLong { .. } => "user_id_too_long",
        UserValidationError::IdSurroundingWhitespace => "user_id_whitespace",
        UserValidationError::IdReservedCharacter { .. } => "user_id_reserved_character",
    };
    Error::invalid_request(err.to_string())
        .with_details(json!({ "field": "user_id", "code": code }))
}

/// Answer a student's question.
///
/// Questions naming one of the student's enrolled courses are answered from
/// the course record; everything else goes to the answer generator. Each
/// answered question counts against the daily limit.
#[utoipa::path(
    post,
    path = "/cs/ask",
    request_body = AskRequestBody,
    responses(
        (status = 200, description = "Answer", body = AskResponseBody),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 404, description = "Student not found", body = ErrorSchema),
        (status = 429, description = "Daily limit reached", body = ErrorSchema),
        (status = 500, description = "Record store failure", body = ErrorSchema),
        (status = 503, description = "Answer generator unavailable", body = ErrorSchema)
    ),
    tags = ["cs"],
    operation_id = "askQuestion"
)]
#[post("/ask")]
pub async fn ask(
    state: web::Data<HttpState>,
    payload: web::Json<AskRequestBody>,
) -> ApiResult<HttpResponse> {
    let request = AskRequest::try_from(payload.into_inner())?;
    let answered = state.ask.ask(request).await?;
    Ok(HttpResponse::Ok().json(AskResponseBody {
        response: answered.answer,
    }))
}
