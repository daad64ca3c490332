use anyhow::Result;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::llm::Oracle;

/// 需求扩写结果
#[derive(Debug, Serialize, Deserialize, Clone, JsonSchema)]
pub struct EnhancedQuery {
    /// 先推理用户真正想要什么，需要补充哪些细节
    pub reasoning: String,
    /// 以第一人称重写后的、更具体的脚本需求
    pub enhanced_query: String,
}

const ENHANCER_SYSTEM_PROMPT: &str = "A user is asking for a Python script that will do something useful for them. \
The user's query will generally not contain enough information for the AI that writes the script. \
Take the query and add relevant details, information and context to make it more useful. \
It is okay to make reasonable assumptions to fill in the blanks, but keep them logical and relevant to the original request. \
Never ask clarifying questions back; decide on plausible details yourself. \
Stay in the first person: the result must read like a better, more specific request from the user for a script that does something useful for them.";

/// 把简短的用户需求扩写成更完整的第一人称需求
pub async fn enhance<O: Oracle>(oracle: &O, user_query: &str) -> Result<String> {
    let result = oracle
        .extract::<EnhancedQuery>(ENHANCER_SYSTEM_PROMPT, &format!("User query: {}", user_query))
        .await?;

    Ok(ensure_enriched(user_query, result.enhanced_query.trim()))
}

/// 扩写结果不能比原始需求更短，否则把它附加在原始需求之后
fn ensure_enriched(user_query: &str, enhanced: &str) -> String {
    if enhanced.len() >= user_query.len() {
        enhanced.to_string()
    } else if enhanced.is_empty() {
        user_query.to_string()
    } else {
        format!("{}\n\n{}", user_query, enhanced)
    }
}
