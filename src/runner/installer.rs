use anyhow::Result;
use colored::Colorize;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::config::ScriptConfig;
use crate::llm::Oracle;
use crate::runner::process::ProcessLauncher;
use crate::runner::resolver::clean_packages;
use crate::types::InstallOutcome;

/// 模型对 pip 报错的分析
#[derive(Debug, Serialize, Deserialize, Clone, JsonSchema)]
pub struct PipAnalysis {
    /// 修正后的包列表，无法修正时原样返回
    pub fixed_packages: Vec<String>,
    /// 报错原因与修正说明
    pub explanation: String,
}

/// 安装依赖时使用的参数
#[derive(Debug, Clone)]
pub struct InstallSettings {
    pub interpreter: String,
    pub ensure_pip: bool,
    pub max_attempts: u32,
}

impl InstallSettings {
    pub fn from_config(config: &ScriptConfig) -> Self {
        Self {
            interpreter: config.resolved_interpreter(),
            ensure_pip: config.ensure_pip,
            max_attempts: config.max_install_attempts,
        }
    }
}

const PIP_SYSTEM_PROMPT: &str = "You are an assistant specialized in Python package management and pip errors. \
Analyze the given list of packages and the error output, then suggest fixes or explain why they can't be fixed.";

/// 让模型分析 pip 的报错并给出修正后的包列表
pub async fn analyze_pip_error<O: Oracle>(
    oracle: &O,
    packages: &[String],
    error_output: &str,
) -> Result<PipAnalysis> {
    let user_prompt = format!(
        "Original packages: {}\nError output: {}\n\n\
         Please analyze the error and suggest fixes for the package list. If no fix is possible, explain why.\n\
         Return the list of packages, either fixed or as they were if no fix is possible.",
        packages.join(", "),
        error_output
    );

    let analysis = oracle
        .extract::<PipAnalysis>(PIP_SYSTEM_PROMPT, &user_prompt)
        .await?;

    println!("{}", format!("Analysis result: {}", analysis.explanation).bright_blue());
    println!(
        "{}",
        format!("Fixed packages: {}", analysis.fixed_packages.join(", ")).bright_blue()
    );
    Ok(analysis)
}

/// 安装脚本依赖
///
/// 安装失败不会中断流程：次数用尽后依然返回成功，并在 diagnostic 中说明。
pub async fn install_packages<O: Oracle, L: ProcessLauncher>(
    oracle: &O,
    launcher: &L,
    packages: &[String],
    settings: &InstallSettings,
) -> Result<InstallOutcome> {
    if packages.is_empty() {
        return Ok(InstallOutcome::installed());
    }

    if settings.ensure_pip {
        ensure_pip(launcher, &settings.interpreter).await;
    }

    let max_attempts = settings.max_attempts.max(1);
    let mut current = packages.to_vec();

    for attempt in 1..=max_attempts {
        println!(
            "📦 Installing packages (attempt {} / {}): {}",
            attempt,
            max_attempts,
            current.join(" ")
        );

        let mut args = vec!["-m".to_string(), "pip".to_string(), "install".to_string()];
        args.extend(current.iter().cloned());

        let error_output = match launcher.run(&settings.interpreter, &args).await {
            Ok(result) if result.success() => {
                println!("✅ Packages installed: {}", current.join(", "));
                return Ok(InstallOutcome::installed());
            }
            Ok(result) if result.stderr.trim().is_empty() => result.stdout,
            Ok(result) => result.stderr,
            Err(err) => format!("{:#}", err),
        };
        eprintln!("⚠️ pip install failed: {}", error_output.trim());

        if attempt == max_attempts {
            break;
        }

        let analysis = analyze_pip_error(oracle, &current, &error_output).await?;
        let fixed = clean_packages(&analysis.fixed_packages);
        if fixed.is_empty() {
            // 修正后不再需要任何第三方包
            return Ok(InstallOutcome {
                success: true,
                diagnostic: analysis.explanation,
            });
        }
        if fixed != current {
            tracing::debug!(?current, ?fixed, "package list revised");
            current = fixed;
        }
    }

    Ok(InstallOutcome {
        success: true,
        diagnostic: format!(
            "Failed to install packages after {} attempts, running the script anyway.",
            max_attempts
        ),
    })
}

async fn ensure_pip<L: ProcessLauncher>(launcher: &L, interpreter: &str) {
    let args = ["-m", "ensurepip", "--upgrade"].map(String::from);
    match launcher.run(interpreter, &args).await {
        Ok(result) if result.success() => tracing::debug!("ensurepip finished"),
        Ok(result) => eprintln!("⚠️ ensurepip failed: {}", result.stderr.trim()),
        Err(err) => eprintln!("⚠️ ensurepip could not be started: {:#}", err),
    }
}
