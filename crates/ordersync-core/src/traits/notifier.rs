//! Notifier trait — where messages go.

use async_trait::async_trait;

use crate::error::Result;

#[async_trait]
pub trait Notifier: Send + Sync {
    fn name(&self) -> &str;

    /// Post one text message. Any non-success reply is an error.
    async fn send(&self, text: &str) -> Result<()>;
}
