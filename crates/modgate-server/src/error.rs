use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use modgate_core::error::ModgateError;
use modgate_core::types::ErrorKind;

// ---------------------------------------------------------------------------
// AppError: unified error type for HTTP responses
// ---------------------------------------------------------------------------

/// Unified error type for HTTP responses.
#[derive(Debug)]
pub struct AppError(pub anyhow::Error);

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = if let Some(e) = self.0.downcast_ref::<ModgateError>() {
            match e {
                ModgateError::Rejected(_) => StatusCode::FORBIDDEN,
                ModgateError::UnknownAction(_)
                | ModgateError::TemplateRender { .. }
                | ModgateError::InvalidRequest(_) => StatusCode::UNPROCESSABLE_ENTITY,
                ModgateError::ConfigValidation(_)
                | ModgateError::ConfigNotFound(_)
                | ModgateError::Io(_)
                | ModgateError::Yaml(_)
                | ModgateError::Json(_) => StatusCode::INTERNAL_SERVER_ERROR,
            }
        } else {
            StatusCode::INTERNAL_SERVER_ERROR
        };

        let body = serde_json::json!({ "error": self.0.to_string() });
        (status, axum::Json(body)).into_response()
    }
}

impl<E> From<E> for AppError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        Self(err.into())
    }
}

/// HTTP status for a finished [`ExecutionResult`](modgate_core::types::ExecutionResult).
pub fn status_for(kind: Option<&ErrorKind>) -> StatusCode {
    match kind {
        None => StatusCode::OK,
        Some(ErrorKind::Rejected) => StatusCode::FORBIDDEN,
        Some(ErrorKind::InvalidRequest | ErrorKind::UnknownAction | ErrorKind::TemplateRender) => {
            StatusCode::UNPROCESSABLE_ENTITY
        }
        Some(ErrorKind::Timeout) => StatusCode::GATEWAY_TIMEOUT,
        Some(
            ErrorKind::AuthFailure
            | ErrorKind::PermissionDenied
            | ErrorKind::TargetNotFound
            | ErrorKind::UnexpectedStatus { .. }
            | ErrorKind::NetworkFailure
            | ErrorKind::InternalFailure,
        ) => StatusCode::BAD_GATEWAY,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejected_maps_to_403() {
        let err = AppError(ModgateError::Rejected("no role".into()).into());
        assert_eq!(err.into_response().status(), StatusCode::FORBIDDEN);
    }

    #[test]
    fn invalid_request_maps_to_422() {
        let err = AppError(ModgateError::InvalidRequest("needs target".into()).into());
        assert_eq!(err.into_response().status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[test]
    fn template_render_maps_to_422() {
        let err = AppError(
            ModgateError::TemplateRender {
                key: "reason".into(),
            }
            .into(),
        );
        assert_eq!(err.into_response().status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[test]
    fn plain_anyhow_maps_to_500() {
        let err = AppError(anyhow::anyhow!("boom"));
        assert_eq!(
            err.into_response().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn result_statuses() {
        assert_eq!(status_for(None), StatusCode::OK);
        assert_eq!(
            status_for(Some(&ErrorKind::Timeout)),
            StatusCode::GATEWAY_TIMEOUT
        );
        assert_eq!(
            status_for(Some(&ErrorKind::AuthFailure)),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            status_for(Some(&ErrorKind::Rejected)),
            StatusCode::FORBIDDEN
        );
    }
}
