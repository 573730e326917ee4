use super::session::Session;
use super::state::{GuardedJobManager, ServerState};
use crate::job::{JobError, JobId, JobInput, ValidationErrors};
use crate::user::Permission;

use axum::{
    extract::{FromRequest, FromRequestParts, Path, Query, Request, State},
    http::{request::Parts, StatusCode},
    response::{IntoResponse, Redirect, Response},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{debug, error, warn};

const JOBS_LIST_PATH: &str = "/jobs";

impl IntoResponse for JobError {
    fn into_response(self) -> Response {
        let message = self.to_string();
        match self {
            JobError::NotFound => StatusCode::NOT_FOUND.into_response(),
            JobError::ValidationFailed(errors) => {
                (StatusCode::UNPROCESSABLE_ENTITY, Json(json!({ "errors": errors })))
                    .into_response()
            }
            JobError::ConcurrencyConflict { id } => {
                warn!("Rejecting edit of job {}: concurrent modification", id);
                (
                    StatusCode::CONFLICT,
                    Json(json!({ "error": message, "id": id })),
                )
                    .into_response()
            }
            JobError::Unauthorized => StatusCode::FORBIDDEN.into_response(),
            JobError::Store(err) => {
                error!("Job store failure: {:#}", err);
                StatusCode::INTERNAL_SERVER_ERROR.into_response()
            }
        }
    }
}

/// An authenticated caller allowed to modify jobs.
/// Rejects with 401 without a session and 403 without `EditJobs`, before
/// the request body is looked at.
pub struct JobEditor(pub Session);

impl FromRequestParts<ServerState> for JobEditor {
    type Rejection = Response;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &ServerState,
    ) -> Result<Self, Self::Rejection> {
        let session = Session::from_request_parts(parts, state)
            .await
            .map_err(IntoResponse::into_response)?;
        session
            .require(Permission::EditJobs)
            .map_err(IntoResponse::into_response)?;
        Ok(JobEditor(session))
    }
}

/// A submitted job form. A body that is not a JSON object of the expected
/// shape is answered like any other invalid form, with 422 and a `body`
/// field error.
pub struct JobForm(pub JobInput);

impl<S: Send + Sync> FromRequest<S> for JobForm {
    type Rejection = Response;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<JobInput>::from_request(req, state).await {
            Ok(Json(input)) => Ok(JobForm(input)),
            Err(rejection) => {
                debug!("Rejecting job form body: {}", rejection.body_text());
                let errors = ValidationErrors::single("body", rejection.body_text());
                Err(submission_response::<()>(
                    &JobInput::default(),
                    Err(JobError::ValidationFailed(errors)),
                ))
            }
        }
    }
}

#[derive(Deserialize, Debug, Default)]
pub struct SearchQuery {
    #[serde(default)]
    pub phrase: Option<String>,
}

/// Re-shown form after a rejected submission.
#[derive(Serialize)]
struct InvalidJobForm<'a> {
    job: &'a JobInput,
    errors: &'a ValidationErrors,
}

fn parse_id(raw: &str) -> Option<JobId> {
    raw.parse().ok()
}

fn redirect_to_list() -> Response {
    Redirect::to(JOBS_LIST_PATH).into_response()
}

fn submission_response<T>(input: &JobInput, result: Result<T, JobError>) -> Response {
    match result {
        Ok(_) => redirect_to_list(),
        Err(JobError::ValidationFailed(errors)) => (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(InvalidJobForm {
                job: input,
                errors: &errors,
            }),
        )
            .into_response(),
        Err(err) => err.into_response(),
    }
}

async fn list_jobs(State(jobs): State<GuardedJobManager>) -> Response {
    match jobs.list() {
        Ok(list) => Json(list).into_response(),
        Err(err) => err.into_response(),
    }
}

async fn show_search_form() -> Response {
    Json(json!({ "phrase": "" })).into_response()
}

async fn search_jobs(
    State(jobs): State<GuardedJobManager>,
    Query(query): Query<SearchQuery>,
) -> Response {
    let phrase = query.phrase.unwrap_or_default();
    match jobs.search(&phrase) {
        Ok(list) => Json(list).into_response(),
        Err(err) => err.into_response(),
    }
}

async fn job_details(State(jobs): State<GuardedJobManager>, Path(id): Path<String>) -> Response {
    match jobs.get_by_id(parse_id(&id)) {
        Ok(job) => Json(job).into_response(),
        Err(err) => err.into_response(),
    }
}

async fn create_form(_editor: JobEditor) -> Response {
    Json(json!({ "question": "", "answer": "" })).into_response()
}

async fn create_job(
    _editor: JobEditor,
    State(jobs): State<GuardedJobManager>,
    JobForm(input): JobForm,
) -> Response {
    let result = jobs.create(&input);
    submission_response(&input, result)
}

/// Shared by the edit form and the delete confirmation, both show the job.
async fn job_for_editor(
    _editor: JobEditor,
    State(jobs): State<GuardedJobManager>,
    Path(id): Path<String>,
) -> Response {
    match jobs.get_by_id(parse_id(&id)) {
        Ok(job) => Json(job).into_response(),
        Err(err) => err.into_response(),
    }
}

async fn edit_job(
    _editor: JobEditor,
    State(jobs): State<GuardedJobManager>,
    Path(id): Path<String>,
    JobForm(input): JobForm,
) -> Response {
    let result = jobs.update(parse_id(&id), &input);
    submission_response(&input, result)
}

async fn delete_job(
    _editor: JobEditor,
    State(jobs): State<GuardedJobManager>,
    Path(id): Path<String>,
) -> Response {
    match jobs.delete(parse_id(&id)) {
        Ok(_) => redirect_to_list(),
        Err(err) => err.into_response(),
    }
}

pub fn make_jobs_routes(state: ServerState) -> Router {
    Router::new()
        .route("/", get(list_jobs))
        .route("/search-form", get(show_search_form))
        .route("/search", get(search_jobs))
        .route("/create", get(create_form).post(create_job))
        .route("/{id}", get(job_details))
        .route("/{id}/edit", get(job_for_editor).post(edit_job))
        .route("/{id}/delete", get(job_for_editor).post(delete_job))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::header::CONTENT_TYPE;
    use serde_json::Value;

    async fn extract_form(body: &'static str) -> Result<JobInput, Response> {
        let request = Request::builder()
            .method("POST")
            .uri("/jobs/create")
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from(body))
            .unwrap();
        JobForm::from_request(request, &())
            .await
            .map(|JobForm(input)| input)
    }

    async fn body_json(response: Response) -> Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn job_form_accepts_partial_objects() {
        let Ok(input) = extract_form(r#"{"question": "Q"}"#).await else {
            panic!("partial form rejected");
        };
        assert_eq!(input.question.as_deref(), Some("Q"));
        assert_eq!(input.answer, None);
    }

    #[tokio::test]
    async fn job_form_with_wrong_field_type_is_an_invalid_form() {
        let response = extract_form(r#"{"question": 1, "answer": "a"}"#)
            .await
            .unwrap_err();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

        let body = body_json(response).await;
        assert_eq!(body["errors"].as_array().unwrap().len(), 1);
        assert_eq!(body["errors"][0]["field"], "body");
        assert!(!body["errors"][0]["message"].as_str().unwrap().is_empty());
        assert!(body["job"].is_object());
    }

    #[tokio::test]
    async fn job_form_with_malformed_json_is_an_invalid_form() {
        let response = extract_form("{not json").await.unwrap_err();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body_json(response).await["errors"][0]["field"], "body");
    }

    #[test]
    fn parses_numeric_ids_only() {
        assert_eq!(parse_id("12"), Some(12));
        assert_eq!(parse_id("-3"), Some(-3));
        assert_eq!(parse_id("abc"), None);
        assert_eq!(parse_id(""), None);
    }

    #[test]
    fn error_status_codes() {
        assert_eq!(
            JobError::NotFound.into_response().status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            JobError::ConcurrencyConflict { id: 1 }
                .into_response()
                .status(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            JobError::Unauthorized.into_response().status(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            JobError::ValidationFailed(ValidationErrors::default())
                .into_response()
                .status(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            JobError::Store(anyhow::anyhow!("disk on fire"))
                .into_response()
                .status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
