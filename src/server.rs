//! HTTP router

use crate::commands::{
    create_folder, delete_file, delete_folder, download_file, list_all_files, list_all_folders,
    list_files, ping, read_file, upload_file, upload_multiple_files, AppState,
};
use axum::extract::DefaultBodyLimit;
use axum::routing::{delete, get, post};
use axum::Router;

pub fn router(state: AppState, max_upload_bytes: usize) -> Router {
    Router::new()
        .route("/ping", get(ping))
        .route("/create-folder", post(create_folder))
        .route("/upload", post(upload_file))
        .route("/upload-multiple", post(upload_multiple_files))
        .route("/download", get(download_file))
        .route("/object", get(read_file))
        .route("/delete", delete(delete_file))
        .route("/delete-folder", delete(delete_folder))
        .route("/list", get(list_files))
        .route("/list-all", get(list_all_files))
        .route("/list-folders", get(list_all_folders))
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .with_state(state)
}
