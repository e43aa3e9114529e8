use std::process::{ExitCode, Termination};

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use error_stack::Report;
use kernel::KernelError;
use serde_json::json;

#[derive(Debug)]
pub struct StackTrace(Report<KernelError>);

impl From<Report<KernelError>> for StackTrace {
    fn from(e: Report<KernelError>) -> Self {
        StackTrace(e)
    }
}

impl Termination for StackTrace {
    fn report(self) -> ExitCode {
        self.0.report()
    }
}

#[derive(Debug)]
pub struct ErrorStatus(Report<KernelError>);

impl From<Report<KernelError>> for ErrorStatus {
    fn from(e: Report<KernelError>) -> Self {
        ErrorStatus(e)
    }
}

impl ErrorStatus {
    fn status(&self) -> StatusCode {
        match self.0.current_context() {
            KernelError::NotFound { .. } => StatusCode::NOT_FOUND,
            KernelError::Validation { .. } | KernelError::InsufficientStock { .. } => {
                StatusCode::BAD_REQUEST
            }
            KernelError::Concurrency => StatusCode::CONFLICT,
            KernelError::Timeout => StatusCode::REQUEST_TIMEOUT,
            KernelError::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn message(&self) -> String {
        let context = self.0.current_context();
        if self.status().is_server_error() {
            return format!("An unexpected error occurred: {context}");
        }
        let details = self
            .0
            .frames()
            .filter_map(|frame| {
                frame
                    .downcast_ref::<String>()
                    .map(String::as_str)
                    .or_else(|| frame.downcast_ref::<&'static str>().copied())
            })
            .collect::<Vec<_>>();
        if details.is_empty() {
            context.to_string()
        } else {
            format!("{context} ({})", details.join("; "))
        }
    }
}

impl IntoResponse for ErrorStatus {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!("{:?}", self.0);
        }
        (status, Json(json!({ "error": self.message() }))).into_response()
    }
}

#[cfg(test)]
mod test {
    use axum::http::StatusCode;
    use axum::response::IntoResponse;
    use error_stack::Report;
    use kernel::KernelError;

    use super::ErrorStatus;

    fn status(error: KernelError) -> StatusCode {
        ErrorStatus::from(Report::new(error)).into_response().status()
    }

    #[test]
    fn expected_failures_are_client_errors() {
        assert_eq!(status(KernelError::not_found(12)), StatusCode::NOT_FOUND);
        assert_eq!(status(KernelError::validation("bogus")), StatusCode::BAD_REQUEST);
        assert_eq!(
            status(KernelError::InsufficientStock {
                isbn: 12,
                requested: 100,
                available: 7,
            }),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn unexpected_failures_are_server_errors() {
        assert_eq!(status(KernelError::Internal), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(status(KernelError::Timeout), StatusCode::REQUEST_TIMEOUT);
        assert_eq!(status(KernelError::Concurrency), StatusCode::CONFLICT);
    }

    #[test]
    fn message_carries_attached_details() {
        let error = ErrorStatus::from(
            Report::new(KernelError::validation("price")).attach_printable("`free` is not a decimal value"),
        );
        assert_eq!(
            error.message(),
            "Invalid field: price (`free` is not a decimal value)"
        );

        let error = ErrorStatus::from(Report::new(KernelError::Internal).attach_printable("secret"));
        assert_eq!(
            error.message(),
            "An unexpected error occurred: Internal kernel error"
        );
    }
}
