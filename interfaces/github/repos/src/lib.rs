//! GitHub REST client for public repository listings and readmes
//!
//! - `GitHubApi` is the transport seam; `GitHubClient` is the reqwest-backed implementation
//! - Set a token to lift the anonymous rate limit

pub mod index;
pub mod models;
