use anyhow::Result;
use async_trait::async_trait;

/// A chat-completion model capability (多模型扩展).
///
/// The orchestrator treats this as an optional collaborator: when no
/// provider is configured the model-backed tiers are skipped entirely and
/// analysis proceeds rule-based.
#[async_trait]
pub trait ChatModel: Send + Sync {
    /// 模型提供商名称
    fn provider(&self) -> &str;

    /// 模型名称
    fn model_name(&self) -> &str;

    /// One system+user round trip; returns the raw completion text.
    async fn chat(&self, system: &str, user: &str) -> Result<String>;
}
