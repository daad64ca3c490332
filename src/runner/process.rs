use anyhow::{Context, Result};
use std::path::PathBuf;
use std::process::Stdio;
use tokio::process::Command as TokioCommand;

use crate::types::ExecutionResult;

/// 子进程启动器
///
/// 所有调用都会等待进程退出，输出全部缓冲后一次性返回，没有超时。
#[allow(async_fn_in_trait)]
pub trait ProcessLauncher {
    /// 直接执行程序
    async fn run(&self, program: &str, args: &[String]) -> Result<ExecutionResult>;

    /// 通过 shell 执行一行命令
    async fn run_shell(&self, command: &str) -> Result<ExecutionResult>;
}

/// 基于 tokio::process 的启动器
pub struct SystemProcessLauncher {
    working_dir: PathBuf,
}

impl SystemProcessLauncher {
    pub fn new(working_dir: impl Into<PathBuf>) -> Self {
        Self {
            working_dir: working_dir.into(),
        }
    }

    async fn capture(&self, mut cmd: TokioCommand, command_line: &str) -> Result<ExecutionResult> {
        // 生成的脚本可能会读取标准输入，这里给一个空输入避免卡住
        cmd.current_dir(&self.working_dir)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        tracing::debug!(cwd = %self.working_dir.display(), "spawning: {}", command_line);

        let output = cmd
            .output()
            .await
            .with_context(|| format!("Failed to launch: {}", command_line))?;

        let result = ExecutionResult {
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
            exit_code: output.status.code().unwrap_or(-1),
        };
        tracing::debug!(exit_code = result.exit_code, "finished: {}", command_line);
        Ok(result)
    }
}

impl Default for SystemProcessLauncher {
    fn default() -> Self {
        Self::new(".")
    }
}

impl ProcessLauncher for SystemProcessLauncher {
    async fn run(&self, program: &str, args: &[String]) -> Result<ExecutionResult> {
        let mut cmd = TokioCommand::new(program);
        cmd.args(args);
        let command_line = format!("{} {}", program, args.join(" "));
        self.capture(cmd, command_line.trim_end()).await
    }

    async fn run_shell(&self, command: &str) -> Result<ExecutionResult> {
        let mut cmd = if cfg!(windows) {
            let mut cmd = TokioCommand::new("cmd");
            cmd.arg("/C");
            cmd
        } else {
            let mut cmd = TokioCommand::new("sh");
            cmd.arg("-c");
            cmd
        };
        cmd.arg(command);
        self.capture(cmd, command).await
    }
}
