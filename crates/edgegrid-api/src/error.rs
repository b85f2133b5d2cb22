//! Mapping of orchestration errors onto HTTP responses.

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use tracing::{debug, error};

use edgegrid_orchestrator::OrchestratorError;

/// Handler error; rendered as the status code plus the plain-text message.
#[derive(Debug)]
pub struct ApiError(pub OrchestratorError);

pub type ApiResult<T> = Result<T, ApiError>;

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self.0 {
            OrchestratorError::Validation(_) => StatusCode::BAD_REQUEST,
            OrchestratorError::NotFound(_) => StatusCode::NOT_FOUND,
            OrchestratorError::Conflict(_) => StatusCode::UNPROCESSABLE_ENTITY,
            OrchestratorError::FailedPrecondition(_) => StatusCode::CONFLICT,
            OrchestratorError::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            OrchestratorError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<OrchestratorError> for ApiError {
    fn from(err: OrchestratorError) -> Self {
        ApiError(err)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError(OrchestratorError::validation(rejection.body_text()))
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError(OrchestratorError::validation(rejection.body_text()))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!(%status, error = %self.0, "request failed");
        } else {
            debug!(%status, error = %self.0, "request rejected");
        }
        (status, self.0.to_string()).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_kind_has_its_status() {
        let cases = [
            (OrchestratorError::Validation("x".into()), 400),
            (OrchestratorError::NotFound("x".into()), 404),
            (OrchestratorError::Conflict("x".into()), 422),
            (OrchestratorError::FailedPrecondition("x".into()), 409),
            (OrchestratorError::Unavailable("x".into()), 503),
            (OrchestratorError::Internal("x".into()), 500),
        ];
        for (err, code) in cases {
            assert_eq!(ApiError(err).status().as_u16(), code);
        }
    }
}
