use async_trait::async_trait;
use tracing::info;

use crate::models::ContactSubmission;

/// Where accepted contact submissions go.
#[async_trait]
pub trait ContactSink: Send + Sync {
    async fn record(&self, submission: &ContactSubmission) -> anyhow::Result<()>;
}

/// Writes submissions to the log. No delivery integration yet.
pub struct LogContactSink;

#[async_trait]
impl ContactSink for LogContactSink {
    async fn record(&self, submission: &ContactSubmission) -> anyhow::Result<()> {
        info!(
            name = %submission.name,
            email = %submission.email,
            message = %submission.message,
            "Contact message"
        );
        Ok(())
    }
}
