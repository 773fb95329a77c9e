//! Uniform response envelope

use crate::fs::FsError;
use axum::extract::multipart::MultipartError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use log::{error, warn};
use serde::Serialize;

const STATUS_SUCCESS: &str = "Success";
const STATUS_FAILURE: &str = "Failure";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiResponse<T: Serialize> {
    pub status: &'static str,
    pub response_code: u16,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn success(message: impl Into<String>, data: T) -> Json<Self> {
        Json(ApiResponse {
            status: STATUS_SUCCESS,
            response_code: StatusCode::OK.as_u16(),
            message: message.into(),
            data: Some(data),
        })
    }
}

impl ApiResponse<()> {
    pub fn message(message: impl Into<String>) -> Json<Self> {
        Json(ApiResponse {
            status: STATUS_SUCCESS,
            response_code: StatusCode::OK.as_u16(),
            message: message.into(),
            data: None,
        })
    }
}

/// A failed request, rendered as a failure envelope.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        ApiError {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }

    /// Map a filesystem error, prefixing the failed action.
    pub fn failed(action: &'static str) -> impl FnOnce(FsError) -> ApiError {
        move |e| {
            let status = match e {
                FsError::InvalidInput(_) => StatusCode::BAD_REQUEST,
                FsError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
            };
            ApiError {
                status,
                message: format!("Failed to {}: {}", action, e),
            }
        }
    }
}

impl From<MultipartError> for ApiError {
    fn from(e: MultipartError) -> Self {
        ApiError::bad_request(format!("Failed to read multipart body: {}", e.body_text()))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            error!("request failed: {}", self.message);
        } else {
            warn!("request rejected: {}", self.message);
        }

        let body = ApiResponse::<()> {
            status: STATUS_FAILURE,
            response_code: self.status.as_u16(),
            message: self.message,
            data: None,
        };
        (self.status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::StoreError;

    #[test]
    fn invalid_input_maps_to_bad_request() {
        let err = ApiError::failed("create folder")(FsError::InvalidInput("path is required".into()));
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
        assert_eq!(err.message, "Failed to create folder: path is required");
    }

    #[test]
    fn store_errors_map_to_internal_error() {
        let err = ApiError::failed("list files")(FsError::Store(StoreError::NotFound("k".into())));
        assert_eq!(err.status, StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn success_envelope_omits_missing_data() {
        let Json(body) = ApiResponse::message("done");
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"status": "Success", "responseCode": 200, "message": "done"})
        );
    }
}
