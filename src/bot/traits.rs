//! Shared traits.

use super::types::Activity;

/// Outbound half of the chat transport. The hosting runtime implements
/// this; the pipeline never knows which transport it is speaking to.
#[async_trait::async_trait]
pub trait ActivitySink: Send + Sync {
    async fn send(&self, activity: Activity) -> anyhow::Result<()>;
}
