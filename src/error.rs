use thiserror::Error;

/// 脚本生成流程中的领域错误
#[derive(Error, Debug)]
pub enum ScriptError {
    /// 模型拒绝给出结构化输出
    #[error("The model declined to produce structured output: {0}")]
    OracleRefusal(String),

    /// 生成结果中没有找到代码块
    #[error("No fenced code block found in the generated response")]
    ExtractionFailure,

    #[error("Invalid script specification: {0}")]
    InvalidSpecification(String),

    #[error("No script ideas were generated for '{0}'")]
    NoIdeas(String),

    #[error("Selection {index} is out of range (expected 1-{len})")]
    SelectionOutOfRange { index: usize, len: usize },
}

impl ScriptError {
    /// 拒绝类错误不应被重试
    pub fn is_refusal(err: &anyhow::Error) -> bool {
        matches!(
            err.downcast_ref::<ScriptError>(),
            Some(ScriptError::OracleRefusal(_))
        )
    }
}
