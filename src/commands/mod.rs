//! HTTP commands module
//!
//! Every route handler, split into logical submodules:
//! - `response`: Success/failure envelope and error mapping
//! - `list_commands`: Page, recursive and folder listings
//! - `object_commands`: Folder creation, uploads, downloads and deletes

mod list_commands;
mod object_commands;
mod response;

use crate::fs::Explorer;
use serde::Deserialize;
use std::sync::Arc;

// Re-export all commands
pub use list_commands::*;
pub use object_commands::*;
pub use response::{ApiError, ApiResponse};

/// State shared by every handler.
#[derive(Clone)]
pub struct AppState {
    pub explorer: Arc<Explorer>,
    /// Page size used by `/list` when the request gives none.
    pub default_page_size: i32,
}

impl AppState {
    pub fn new(explorer: Arc<Explorer>, default_page_size: i32) -> Self {
        Self {
            explorer,
            default_page_size,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct PathQuery {
    #[serde(default)]
    pub path: String,
}
