//! Folder, upload, download and delete endpoints

use super::{ApiError, ApiResponse, AppState, PathQuery};
use crate::fs::{DownloadLink, UploadedFile};
use axum::extract::{Multipart, Query, State};
use axum::http::header;
use axum::response::IntoResponse;
use axum::Json;
use serde_json::{json, Value};
use std::collections::HashMap;

/// GET /ping
pub async fn ping() -> Json<Value> {
    Json(json!({ "message": "pong" }))
}

/// POST /create-folder
pub async fn create_folder(
    State(state): State<AppState>,
    Query(query): Query<PathQuery>,
) -> Result<Json<ApiResponse<()>>, ApiError> {
    state
        .explorer
        .create_folder(&query.path)
        .await
        .map_err(ApiError::failed("create folder"))?;

    Ok(ApiResponse::message("Folder created successfully"))
}

/// POST /upload - multipart fields `path` (optional) and `file`.
pub async fn upload_file(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<ApiResponse<()>>, ApiError> {
    let mut folder_path: Option<String> = None;
    let mut upload: Option<UploadedFile> = None;

    while let Some(field) = multipart.next_field().await? {
        let name = field.name().map(str::to_owned);
        match name.as_deref() {
            Some("path") => folder_path = Some(field.text().await?),
            Some("file") => {
                let file_name = field.file_name().map(str::to_owned).unwrap_or_default();
                let data = field.bytes().await?.to_vec();
                upload = Some(UploadedFile {
                    name: file_name,
                    data,
                });
            }
            _ => {}
        }
    }

    let file = upload.ok_or_else(|| {
        ApiError::bad_request("Failed to retrieve uploaded file: missing \"file\" field")
    })?;

    let key = state
        .explorer
        .upload_file(folder_path.as_deref(), file)
        .await
        .map_err(ApiError::failed("upload file"))?;

    Ok(ApiResponse::message(format!(
        "File uploaded successfully with object key: {}",
        key
    )))
}

/// POST /upload-multiple - multipart fields `fileCount` and `file0`..`fileN-1`.
pub async fn upload_multiple_files(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<ApiResponse<()>>, ApiError> {
    let mut file_count: Option<String> = None;
    let mut received: HashMap<String, UploadedFile> = HashMap::new();

    while let Some(field) = multipart.next_field().await? {
        let Some(name) = field.name().map(str::to_owned) else {
            continue;
        };
        if name == "fileCount" {
            file_count = Some(field.text().await?);
        } else if name.starts_with("file") {
            let file_name = field.file_name().map(str::to_owned).unwrap_or_default();
            let data = field.bytes().await?.to_vec();
            received.insert(
                name,
                UploadedFile {
                    name: file_name,
                    data,
                },
            );
        }
    }

    let count: usize = file_count
        .as_deref()
        .and_then(|count| count.trim().parse().ok())
        .ok_or_else(|| ApiError::bad_request("Failed to retrieve file count"))?;

    let mut files = Vec::with_capacity(count);
    for i in 0..count {
        let file = received.remove(&format!("file{}", i)).ok_or_else(|| {
            ApiError::bad_request(format!("Failed to retrieve uploaded file: file{}", i))
        })?;
        files.push(file);
    }

    let uploaded = state
        .explorer
        .upload_files(files)
        .await
        .map_err(ApiError::failed("upload files"))?;

    Ok(ApiResponse::message(format!(
        "Uploaded {} files successfully",
        uploaded
    )))
}

/// GET /download - presigned URL and base name of an object.
pub async fn download_file(
    State(state): State<AppState>,
    Query(query): Query<PathQuery>,
) -> Result<Json<ApiResponse<DownloadLink>>, ApiError> {
    let link = state
        .explorer
        .download_link(&query.path)
        .await
        .map_err(ApiError::failed("generate download link"))?;

    Ok(ApiResponse::success("Download link generated", link))
}

/// GET /object - raw content of an object.
pub async fn read_file(
    State(state): State<AppState>,
    Query(query): Query<PathQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let data = state
        .explorer
        .read_object(&query.path)
        .await
        .map_err(ApiError::failed("read file"))?;

    Ok(([(header::CONTENT_TYPE, "application/octet-stream")], data))
}

/// DELETE /delete - a single object.
pub async fn delete_file(
    State(state): State<AppState>,
    Query(query): Query<PathQuery>,
) -> Result<Json<ApiResponse<()>>, ApiError> {
    state
        .explorer
        .delete_object(&query.path)
        .await
        .map_err(ApiError::failed("delete file"))?;

    Ok(ApiResponse::message("File deleted successfully"))
}

/// DELETE /delete-folder - a folder and everything below it.
pub async fn delete_folder(
    State(state): State<AppState>,
    Query(query): Query<PathQuery>,
) -> Result<Json<ApiResponse<()>>, ApiError> {
    state
        .explorer
        .delete_folder(&query.path)
        .await
        .map_err(ApiError::failed("delete folder"))?;

    Ok(ApiResponse::message("Folder deleted successfully"))
}
