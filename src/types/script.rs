use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::config::SCRIPT_EXTENSION;

/// 模型在给出规格前的一步推理
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, JsonSchema)]
pub struct ReasoningStep {
    /// 这一步的思考过程
    pub thought: String,
    /// 对这一步的简短概括
    pub concise_step: String,
}

/// 脚本规格，驱动代码生成，失败后会被新的规格取代
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, JsonSchema)]
pub struct ScriptSpecification {
    /// 逐步推理过程，先思考再给出其它字段
    pub reasoning_steps: Vec<ReasoningStep>,
    /// 对脚本实现方式的详细描述
    pub description: String,
    /// snake_case 形式的脚本名称
    pub name: String,
    /// 脚本会产出的内容
    pub outputs: Vec<String>,
    /// 脚本接受的命令行参数
    pub parameters: Vec<String>,
}

impl ScriptSpecification {
    /// 以新的描述派生出一份规格，其余字段保持不变
    pub fn with_description(&self, description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            ..self.clone()
        }
    }

    pub fn file_name(&self) -> String {
        script_file_name(&self.name)
    }
}

/// 一次生成尝试的产物
#[derive(Debug, Clone)]
pub struct GeneratedScript {
    pub specification: ScriptSpecification,
    /// 模型的原始回复
    pub source_text: String,
    /// 从代码块中提取出的源码，为空表示没有找到代码块
    pub code: String,
    pub file_name: String,
}

impl GeneratedScript {
    pub fn new(specification: ScriptSpecification, source_text: String, code: String) -> Self {
        let file_name = specification.file_name();
        Self {
            specification,
            source_text,
            code,
            file_name,
        }
    }

    pub fn has_code(&self) -> bool {
        !self.code.trim().is_empty()
    }
}

/// 灵感模式下的脚本创意
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, JsonSchema)]
pub struct ScriptIdea {
    /// 简短醒目的标题
    pub title: String,
    /// 一两句话说明脚本做什么
    pub description: String,
    /// 以用户口吻写成、可直接用来生成脚本的需求
    pub prompt: String,
}

/// 在名称后补上脚本扩展名
pub fn script_file_name(name: &str) -> String {
    if name.ends_with(SCRIPT_EXTENSION) {
        name.to_string()
    } else {
        format!("{}{}", name, SCRIPT_EXTENSION)
    }
}

/// 把模型给出的名称规整为 snake_case 标识符
///
/// 规整后为空时返回 `None`。
pub fn sanitize_script_name(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    let stem = trimmed.strip_suffix(SCRIPT_EXTENSION).unwrap_or(trimmed);

    let mut name = String::with_capacity(stem.len());
    for ch in stem.chars() {
        if ch.is_ascii_alphanumeric() {
            name.push(ch.to_ascii_lowercase());
        } else if !name.ends_with('_') {
            name.push('_');
        }
    }

    let name = name.trim_matches('_').to_string();
    if name.is_empty() {
        return None;
    }

    if name.starts_with(|c: char| c.is_ascii_digit()) {
        Some(format!("script_{}", name))
    } else {
        Some(name)
    }
}
