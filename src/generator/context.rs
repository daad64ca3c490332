use anyhow::Result;

use crate::config::Config;
use crate::llm::client::LLMClient;
use crate::runner::process::SystemProcessLauncher;
use crate::ui::TerminalPrompter;

/// 生成流程共享的依赖
///
/// 模型、进程启动器和终端交互都以泛型注入，测试时替换成脚本化的实现。
pub struct GeneratorContext<O, L, P> {
    /// LLM调用器，用于与AI通信。
    pub oracle: O,
    /// 运行脚本与 pip 的子进程启动器
    pub launcher: L,
    /// 终端交互
    pub prompter: P,
    /// 配置
    pub config: Config,
}

impl<O, L, P> GeneratorContext<O, L, P> {
    pub fn new(oracle: O, launcher: L, prompter: P, config: Config) -> Self {
        Self {
            oracle,
            launcher,
            prompter,
            config,
        }
    }
}

impl GeneratorContext<LLMClient, SystemProcessLauncher, TerminalPrompter> {
    /// 使用真实模型、系统进程和终端创建上下文
    pub fn from_config(config: Config) -> Result<Self> {
        let oracle = LLMClient::new(config.clone())?;
        let launcher = SystemProcessLauncher::new(config.output_dir.clone());
        Ok(Self::new(oracle, launcher, TerminalPrompter::new(), config))
    }
}
