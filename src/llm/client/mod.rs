//! LLM客户端 - 提供统一的LLM服务接口

use anyhow::Result;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::future::Future;

use crate::config::Config;
use crate::error::ScriptError;
use crate::llm::oracle::Oracle;

mod providers;

use providers::ProviderClient;

/// LLM客户端 - 提供统一的LLM服务接口
#[derive(Clone)]
pub struct LLMClient {
    config: Config,
    client: ProviderClient,
}

impl LLMClient {
    /// 创建新的LLM客户端
    pub fn new(config: Config) -> Result<Self> {
        let client = ProviderClient::new(&config.llm)?;
        Ok(Self { client, config })
    }

    /// 通用重试逻辑，用于处理异步操作的重试机制
    ///
    /// 模型明确拒绝的情况不重试，直接返回给调用方。
    async fn retry_with_backoff<T, F, Fut>(&self, operation: F) -> Result<T>
    where
        F: Fn() -> Fut,
        Fut: Future<Output = Result<T, anyhow::Error>>,
    {
        let llm_config = &self.config.llm;
        let max_retries = llm_config.retry_attempts.max(1);
        let retry_delay_ms = llm_config.retry_delay_ms;
        let mut retries = 0;

        loop {
            match operation().await {
                Ok(result) => return Ok(result),
                Err(err) if ScriptError::is_refusal(&err) => return Err(err),
                Err(err) => {
                    retries += 1;
                    eprintln!(
                        "❌ Model call failed, retrying (attempt {} / {}): {}",
                        retries, max_retries, err
                    );
                    if retries >= max_retries {
                        return Err(err);
                    }
                    tokio::time::sleep(std::time::Duration::from_millis(retry_delay_ms)).await;
                }
            }
        }
    }
}

impl Oracle for LLMClient {
    async fn prompt(&self, system_prompt: &str, user_prompt: &str) -> Result<String> {
        tracing::debug!(
            provider = %self.config.llm.provider,
            model = %self.config.llm.model,
            "prompt call ({} chars)",
            user_prompt.len()
        );
        let agent = self.client.create_agent(system_prompt, &self.config.llm);

        self.retry_with_backoff(|| async { agent.prompt(user_prompt).await })
            .await
    }

    async fn extract<T>(&self, system_prompt: &str, user_prompt: &str) -> Result<T>
    where
        T: JsonSchema + for<'a> Deserialize<'a> + Serialize + Send + Sync + 'static,
    {
        tracing::debug!(
            provider = %self.config.llm.provider,
            model = %self.config.llm.model,
            schema = std::any::type_name::<T>(),
            "extract call ({} chars)",
            user_prompt.len()
        );
        let extractor = self
            .client
            .create_extractor::<T>(system_prompt, &self.config.llm);

        self.retry_with_backoff(|| async { extractor.extract(user_prompt).await })
            .await
    }
}
