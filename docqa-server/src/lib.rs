//! `docqa-server` exposes the docqa question-answering pipeline over HTTP.
//! A single-page chat UI talks to a small JSON API backed by `docqa-core`.

pub mod server;

pub use server::{AppState, NO_RESULTS_MESSAGE, ServerConfig, app_router, run_server};
