use std::sync::Arc;

use interfaces_github_repos::index::GitHubApi;

use crate::config::Config;
use crate::utils::{contact_sink::ContactSink, readme_image::ImagePolicy};

/// Shared by every request. Holds no mutable state.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub github: Arc<dyn GitHubApi>,
    pub contact_sink: Arc<dyn ContactSink>,
    pub image_policy: Arc<ImagePolicy>,
}

impl AppState {
    pub fn new(
        config: Config,
        github: Arc<dyn GitHubApi>,
        contact_sink: Arc<dyn ContactSink>,
    ) -> Self {
        Self {
            config: Arc::new(config),
            github,
            contact_sink,
            image_policy: Arc::new(ImagePolicy::default()),
        }
    }
}
