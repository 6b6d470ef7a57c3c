//! # Redline
//!
//! A document-review tracker, usable both as a standalone binary and as a library.
//!
//! Departments own documents, documents optionally carry an imported
//! spreadsheet, and reviewers attach per-cell comments with an open/resolved
//! status.
//!
//! ## Library Usage
//!
//! ```toml
//! [dependencies]
//! redline = "0.1"
//! ```
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use std::path::PathBuf;
//! use redline::server::{AppState, create_router};
//! use redline::store::{SqliteStore, Store};
//!
//! let store = SqliteStore::new(&PathBuf::from("./data/redline.db")).unwrap();
//! store.initialize().unwrap();
//!
//! let state = Arc::new(AppState {
//!     store: Arc::new(store),
//! });
//! let router = create_router(state);
//! // Serve with axum...
//! ```

pub mod config;
pub mod error;
pub mod normalize;
pub mod server;
pub mod sheet;
pub mod store;
pub mod types;
