use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

/// 默认配置文件名
pub const DEFAULT_CONFIG_FILE: &str = "scriptforge.toml";

/// 生成脚本的文件扩展名
pub const SCRIPT_EXTENSION: &str = ".py";

/// LLM Provider类型
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Default)]
pub enum LLMProvider {
    #[serde(rename = "openai")]
    #[default]
    OpenAI,
    #[serde(rename = "anthropic")]
    Anthropic,
    #[serde(rename = "deepseek")]
    DeepSeek,
    #[serde(rename = "openrouter")]
    OpenRouter,
    #[serde(rename = "ollama")]
    Ollama,
}

impl std::fmt::Display for LLMProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LLMProvider::OpenAI => write!(f, "openai"),
            LLMProvider::Anthropic => write!(f, "anthropic"),
            LLMProvider::DeepSeek => write!(f, "deepseek"),
            LLMProvider::OpenRouter => write!(f, "openrouter"),
            LLMProvider::Ollama => write!(f, "ollama"),
        }
    }
}

impl std::str::FromStr for LLMProvider {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "openai" => Ok(LLMProvider::OpenAI),
            "anthropic" => Ok(LLMProvider::Anthropic),
            "deepseek" => Ok(LLMProvider::DeepSeek),
            "openrouter" => Ok(LLMProvider::OpenRouter),
            "ollama" => Ok(LLMProvider::Ollama),
            _ => Err(format!("Unknown provider: {}", s)),
        }
    }
}

/// 应用程序配置
#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct Config {
    /// LLM模型配置
    pub llm: LLMConfig,

    /// 脚本生成与运行配置
    pub script: ScriptConfig,

    /// 生成脚本的保存目录
    pub output_dir: PathBuf,

    /// 是否启用详细日志
    pub verbose: bool,
}

/// LLM模型配置
#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct LLMConfig {
    /// LLM Provider类型
    pub provider: LLMProvider,

    /// LLM API KEY
    pub api_key: String,

    /// LLM API基地址
    pub api_base_url: String,

    /// 模型名称
    pub model: String,

    /// 最大tokens
    pub max_tokens: u32,

    /// 温度
    pub temperature: f64,

    /// 重试次数
    pub retry_attempts: u32,

    /// 重试间隔（毫秒）
    pub retry_delay_ms: u64,
}

/// 脚本生成与运行配置
#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct ScriptConfig {
    /// 运行脚本和安装依赖所用的解释器
    pub interpreter: String,

    /// 安装依赖前是否先执行 ensurepip
    pub ensure_pip: bool,

    /// 依赖安装的最大尝试次数
    pub max_install_attempts: u32,

    /// 自动循环模式下的最大生成次数
    pub max_generation_attempts: u32,

    /// 交给模型评估时 stdout/stderr 的截断长度（字符数）
    pub output_truncate_length: usize,
}

impl Config {
    /// 从文件加载配置
    pub fn from_file(path: &Path) -> Result<Self> {
        let mut file =
            File::open(path).context(format!("Failed to open config file: {:?}", path))?;
        let mut content = String::new();
        file.read_to_string(&mut content)
            .context("Failed to read config file")?;

        let config: Config = toml::from_str(&content).context("Failed to parse config file")?;
        Ok(config)
    }

    /// 按以下顺序加载：显式指定的路径、当前目录下的默认配置文件、内置默认值
    pub fn load(explicit_path: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit_path {
            return Self::from_file(path);
        }

        let default_config_path = std::env::current_dir()
            .unwrap_or_else(|_| PathBuf::from("."))
            .join(DEFAULT_CONFIG_FILE);

        if default_config_path.exists() {
            Self::from_file(&default_config_path)
        } else {
            Ok(Config::default())
        }
    }
}

impl ScriptConfig {
    /// 实际使用的解释器路径
    ///
    /// 激活了虚拟环境时优先使用其中的解释器，保证依赖安装和脚本运行落在同一个环境里。
    pub fn resolved_interpreter(&self) -> String {
        let venv = std::env::var("VIRTUAL_ENV").ok();
        self.interpreter_for_venv(venv.as_deref())
    }

    pub(crate) fn interpreter_for_venv(&self, venv: Option<&str>) -> String {
        match venv {
            Some(venv) if !venv.trim().is_empty() => {
                let bin_dir = if cfg!(windows) { "Scripts" } else { "bin" };
                Path::new(venv)
                    .join(bin_dir)
                    .join("python")
                    .to_string_lossy()
                    .to_string()
            }
            _ => self.interpreter.clone(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            llm: LLMConfig::default(),
            script: ScriptConfig::default(),
            output_dir: PathBuf::from("."),
            verbose: false,
        }
    }
}

impl Default for LLMConfig {
    fn default() -> Self {
        Self {
            provider: LLMProvider::default(),
            api_key: std::env::var("SCRIPTFORGE_LLM_API_KEY")
                .or_else(|_| std::env::var("OPENAI_API_KEY"))
                .unwrap_or_default(),
            api_base_url: String::from("https://api.openai.com/v1"),
            model: String::from("gpt-4o-2024-08-06"),
            max_tokens: 4096,
            temperature: 0.2,
            retry_attempts: 3,
            retry_delay_ms: 2000,
        }
    }
}

impl Default for ScriptConfig {
    fn default() -> Self {
        Self {
            interpreter: String::from("python3"),
            ensure_pip: true,
            max_install_attempts: 3,
            max_generation_attempts: 5,
            output_truncate_length: 8000,
        }
    }
}
