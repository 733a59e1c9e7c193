use crate::utils::error::TryOnError;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TryOnSuccess {
    pub success: bool,
    pub result_image_url: String,
}

impl TryOnSuccess {
    pub fn new(result_image_url: String) -> Self {
        Self {
            success: true,
            result_image_url,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct UploadSuccess {
    pub success: bool,
    pub url: String,
}

impl UploadSuccess {
    pub fn new(url: String) -> Self {
        Self { success: true, url }
    }
}

#[derive(Debug, Serialize)]
pub struct RegisterSuccess {
    pub success: bool,
    pub message: String,
}

impl RegisterSuccess {
    pub fn new() -> Self {
        Self {
            success: true,
            message: "User registered successfully.".to_string(),
        }
    }
}

impl Default for RegisterSuccess {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Serialize)]
pub struct FailureBody {
    pub success: bool,
    pub message: String,
}

/// For routes without their own failure logging. The try-on engine logs its
/// failures together with the stage they happened in.
pub fn log_failure(route: &str, error: &TryOnError) {
    if error.status_code().is_server_error() {
        tracing::error!("{} failed: {}", route, error);
    } else {
        tracing::warn!("{} rejected: {}", route, error);
    }
}

impl IntoResponse for TryOnError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        tracing::debug!("Responding with {}: {}", status, self);

        let body = FailureBody {
            success: false,
            message: self.client_message(),
        };
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_body_shape() {
        let value = serde_json::to_value(TryOnSuccess::new(
            "data:image/png;base64,Zm9v".to_string(),
        ))
        .unwrap();
        assert_eq!(
            value,
            serde_json::json!({"success": true, "resultImageUrl": "data:image/png;base64,Zm9v"})
        );
    }

    #[test]
    fn test_register_body_shape() {
        let value = serde_json::to_value(RegisterSuccess::new()).unwrap();
        assert_eq!(
            value,
            serde_json::json!({"success": true, "message": "User registered successfully."})
        );
    }

    #[test]
    fn test_conflict_response_status() {
        let response = TryOnError::Conflict {
            message: "Email is already registered.".to_string(),
        }
        .into_response();
        assert_eq!(response.status(), axum::http::StatusCode::CONFLICT);
    }

    #[test]
    fn test_error_response_status() {
        let response = TryOnError::input("Missing required field: userImageUrl").into_response();
        assert_eq!(response.status(), axum::http::StatusCode::BAD_REQUEST);

        let response = TryOnError::model("boom").into_response();
        assert_eq!(
            response.status(),
            axum::http::StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
