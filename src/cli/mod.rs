use crate::config::{Config, LLMProvider};
use crate::generator::workflow::{LaunchRequest, LoopMode};
use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;

/// scriptforge - 根据一句话需求生成可运行的 Python 脚本
#[derive(Parser, Debug)]
#[command(name = "scriptforge")]
#[command(about = "Generate custom Python scripts from a natural-language prompt.")]
#[command(version)]
pub struct Args {
    /// 想要生成的脚本描述
    pub prompt: Option<String>,

    /// 运行脚本并评估，失败后询问是否重试
    #[arg(long = "loop")]
    pub interactive_loop: bool,

    /// 运行脚本并评估，失败后自动重试直到成功
    #[arg(long)]
    pub autoloop: bool,

    /// 灵感模式：按类别生成脚本创意并从中挑选
    #[arg(long)]
    pub inspo: bool,

    /// 使用的模型
    #[arg(long)]
    pub model: Option<String>,

    /// 温度参数
    #[arg(long)]
    pub temperature: Option<f64>,

    /// 配置文件路径
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// 脚本输出目录，未指定时使用配置文件中的值（默认为当前目录）
    #[arg(short, long)]
    pub output_dir: Option<PathBuf>,

    /// LLM Provider (openai, anthropic, deepseek, openrouter, ollama)
    #[arg(long)]
    pub llm_provider: Option<String>,

    /// LLM API KEY
    #[arg(long)]
    pub llm_api_key: Option<String>,

    /// LLM API基地址
    #[arg(long)]
    pub llm_api_base_url: Option<String>,

    /// 最大tokens数
    #[arg(long)]
    pub max_tokens: Option<u32>,

    /// 自动重试模式下的最大生成次数
    #[arg(long)]
    pub max_attempts: Option<u32>,

    /// 运行脚本与 pip 使用的 Python 解释器
    #[arg(long)]
    pub interpreter: Option<String>,

    /// 是否启用详细日志
    #[arg(short, long)]
    pub verbose: bool,
}

impl Args {
    /// 重试模式，`--autoloop` 优先于 `--loop`
    pub fn loop_mode(&self) -> LoopMode {
        if self.autoloop {
            LoopMode::Autonomous
        } else if self.interactive_loop {
            LoopMode::Interactive
        } else {
            LoopMode::Single
        }
    }

    /// 本次调用的生成请求
    pub fn launch_request(&self) -> LaunchRequest {
        LaunchRequest {
            prompt: self.prompt.clone(),
            inspo: self.inspo,
            mode: self.loop_mode(),
        }
    }

    /// 将CLI参数转换为配置，命令行参数覆盖配置文件
    pub fn into_config(self) -> Result<Config> {
        let mut config = Config::load(self.config.as_deref())?;

        if let Some(output_dir) = self.output_dir {
            config.output_dir = output_dir;
        }

        // 覆盖LLM配置
        if let Some(provider_str) = self.llm_provider {
            if let Ok(provider) = provider_str.parse::<LLMProvider>() {
                config.llm.provider = provider;
            } else {
                eprintln!(
                    "⚠️ Unknown provider: {}, using {}",
                    provider_str, config.llm.provider
                );
            }
        }
        if let Some(llm_api_base_url) = self.llm_api_base_url {
            config.llm.api_base_url = llm_api_base_url;
        }
        if let Some(llm_api_key) = self.llm_api_key {
            config.llm.api_key = llm_api_key;
        }
        if let Some(model) = self.model {
            config.llm.model = model;
        }
        if let Some(max_tokens) = self.max_tokens {
            config.llm.max_tokens = max_tokens;
        }
        if let Some(temperature) = self.temperature {
            config.llm.temperature = temperature;
        }

        // 脚本运行配置
        if let Some(max_attempts) = self.max_attempts {
            config.script.max_generation_attempts = max_attempts;
        }
        if let Some(interpreter) = self.interpreter {
            config.script.interpreter = interpreter;
        }

        config.verbose = config.verbose || self.verbose;

        Ok(config)
    }
}
