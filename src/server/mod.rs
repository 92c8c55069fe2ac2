//! HTTP server

pub mod http;

pub use http::{route, run, AppState, CALLBACK_PATH, LEGACY_CALLBACK_PATH};
