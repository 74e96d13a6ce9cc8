//! Portfolio site backend
//!
//! - `GET /api/github-repos` aggregates public repositories with preview images
//! - `POST /api/contact` validates and records contact form submissions
//! - Configuration comes from the environment, see `config`

pub mod config;
pub mod endpoints;
pub mod models;
pub mod state;
pub mod utils;

#[cfg(test)]
pub(crate) mod test_utils;

use axum::{
    routing::{get, post},
    Extension, Router,
};

use crate::endpoints::{
    contact::submit::index::handler as contact_submit_handler,
    github::repos::list::index::handler as github_repos_list_handler,
};
use crate::state::AppState;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/github-repos", get(github_repos_list_handler))
        .route("/api/contact", post(contact_submit_handler))
        .layer(Extension(state))
}
