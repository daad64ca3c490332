use anyhow::Result;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// 生成模型能力的抽象
///
/// 模型本身不保存调用之间的状态，每次调用都是独立的一问一答。
#[allow(async_fn_in_trait)]
pub trait Oracle {
    /// 自由文本补全
    async fn prompt(&self, system_prompt: &str, user_prompt: &str) -> Result<String>;

    /// 按 `T` 的 JSON Schema 做结构化补全
    async fn extract<T>(&self, system_prompt: &str, user_prompt: &str) -> Result<T>
    where
        T: JsonSchema + for<'a> Deserialize<'a> + Serialize + Send + Sync + 'static;
}
