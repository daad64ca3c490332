use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// 运行生成脚本的方式
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, JsonSchema)]
pub struct RunPlan {
    /// 单行 shell 命令，必须包含脚本文件名
    pub command: String,
    /// 脚本依赖的第三方包（不含标准库）
    pub required_packages: Vec<String>,
}

/// 子进程执行结果
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ExecutionResult {
    pub stdout: String,
    pub stderr: String,
    pub exit_code: i32,
}

impl ExecutionResult {
    /// 进程未能启动时的结果，错误信息放入 stderr
    pub fn launch_failure(error: impl std::fmt::Display) -> Self {
        Self {
            stdout: String::new(),
            stderr: error.to_string(),
            exit_code: -1,
        }
    }

    pub fn success(&self) -> bool {
        self.exit_code == 0
    }
}

/// 模型对一次运行的判定
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, JsonSchema)]
pub struct EvaluationVerdict {
    /// 脚本是否按描述完成了任务
    pub succeeded: bool,
    /// 判定理由
    pub explanation: String,
}

impl EvaluationVerdict {
    pub fn failed(explanation: impl Into<String>) -> Self {
        Self {
            succeeded: false,
            explanation: explanation.into(),
        }
    }
}

/// 依赖安装结果
#[derive(Debug, Clone, PartialEq)]
pub struct InstallOutcome {
    pub success: bool,
    pub diagnostic: String,
}

impl InstallOutcome {
    pub fn installed() -> Self {
        Self {
            success: true,
            diagnostic: String::new(),
        }
    }
}
