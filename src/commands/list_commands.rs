//! Listing endpoints

use super::{ApiError, ApiResponse, AppState, PathQuery};
use crate::config::parse_bool;
use crate::fs::{ListingPage, ObjectRecord};
use axum::extract::{Query, State};
use axum::http::HeaderMap;
use axum::Json;
use serde::Deserialize;

/// Request header carrying the continuation token of `/list`.
pub const NEXT_PAGE_HEADER: &str = "x-next";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListQuery {
    #[serde(default)]
    pub path: String,
    pub page_size: Option<String>,
    pub is_folder: Option<String>,
}

/// GET /list - one page of a folder.
///
/// Unparsable `pageSize` falls back to the configured default and
/// unparsable `isFolder` to false.
pub async fn list_files(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<ListQuery>,
) -> Result<Json<ApiResponse<ListingPage>>, ApiError> {
    let token = headers
        .get(NEXT_PAGE_HEADER)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default();
    let page_size = query
        .page_size
        .as_deref()
        .and_then(|size| size.trim().parse::<i32>().ok())
        .unwrap_or(state.default_page_size);
    let folders_only = query
        .is_folder
        .as_deref()
        .and_then(parse_bool)
        .unwrap_or(false);

    let page = state
        .explorer
        .list_page(&query.path, token, page_size, folders_only)
        .await
        .map_err(ApiError::failed("list files"))?;

    Ok(ApiResponse::success("Files listed successfully", page))
}

/// GET /list-all - every record below a folder.
pub async fn list_all_files(
    State(state): State<AppState>,
    Query(query): Query<PathQuery>,
) -> Result<Json<ApiResponse<ListingPage>>, ApiError> {
    let page = state
        .explorer
        .list_all_files(&query.path)
        .await
        .map_err(ApiError::failed("list all files"))?;

    Ok(ApiResponse::success("Files listed successfully", page))
}

/// GET /list-folders - every folder marker below a folder.
pub async fn list_all_folders(
    State(state): State<AppState>,
    Query(query): Query<PathQuery>,
) -> Result<Json<ApiResponse<Vec<ObjectRecord>>>, ApiError> {
    let folders = state
        .explorer
        .list_all_folders(&query.path)
        .await
        .map_err(ApiError::failed("list folders"))?;

    Ok(ApiResponse::success("Folders listed successfully", folders))
}
