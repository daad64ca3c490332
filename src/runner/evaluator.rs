use anyhow::Result;
use colored::Colorize;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::llm::Oracle;
use crate::runner::process::ProcessLauncher;
use crate::types::{EvaluationVerdict, ExecutionResult, RunPlan, ScriptSpecification};

/// 失败后修订的脚本描述
#[derive(Debug, Serialize, Deserialize, Clone, JsonSchema)]
pub struct UpdatedDescription {
    /// 针对失败原因改进后的完整描述
    pub description: String,
}

const EVALUATION_SYSTEM_PROMPT: &str = "Your job is to determine if the script that was run worked as intended, \
based on its output and the script's description. Answer with a boolean and a brief explanation.";

const REVISION_SYSTEM_PROMPT: &str =
    "You are an assistant tasked with improving a Python script description based on a failed implementation.";

/// 按运行计划执行脚本，启动失败也作为结果返回
pub async fn execute<L: ProcessLauncher>(launcher: &L, plan: &RunPlan) -> ExecutionResult {
    println!("{}", "\n🚀 Running the script with command:".bright_blue());
    println!("{}", plan.command.bright_blue());

    match launcher.run_shell(&plan.command).await {
        Ok(result) => {
            if !result.stdout.is_empty() {
                println!("\n{}\n{}", "stdout:".bold(), result.stdout);
            }
            if !result.stderr.is_empty() {
                println!("\n{}\n{}", "stderr:".bold(), result.stderr);
            }
            result
        }
        Err(err) => {
            eprintln!("❌ Failed to launch the script: {:#}", err);
            ExecutionResult::launch_failure(format!("{:#}", err))
        }
    }
}

/// 让模型判断这次运行是否达成了描述中的目标
pub async fn evaluate<O: Oracle>(
    oracle: &O,
    specification: &ScriptSpecification,
    result: &ExecutionResult,
    truncate_length: usize,
) -> Result<EvaluationVerdict> {
    println!(
        "{}",
        "\n🔎 Evaluating the script output, one moment...".bright_blue()
    );

    let user_prompt = format!(
        "Script description: {}\n\
         Parameters: {}\n\
         Outputs: {}\n\
         Exit code: {}\n\
         Actual stdout: {}\n\
         Actual stderr: {}\n\n\
         Did the script work as intended?",
        specification.description,
        specification.parameters.join(", "),
        specification.outputs.join(", "),
        result.exit_code,
        truncate(&result.stdout, truncate_length),
        truncate(&result.stderr, truncate_length),
    );

    let verdict = oracle
        .extract::<EvaluationVerdict>(EVALUATION_SYSTEM_PROMPT, &user_prompt)
        .await?;

    let label = if verdict.succeeded {
        "Success".green()
    } else {
        "Failure".red()
    };
    println!("Evaluation result: {}", label);
    println!("Explanation: {}", verdict.explanation);
    Ok(verdict)
}

/// 根据失败的实现和用户反馈改写描述
pub async fn revise_description<O: Oracle>(
    oracle: &O,
    old_description: &str,
    failed_source: &str,
    failure_explanation: &str,
    feedback: Option<&str>,
) -> Result<String> {
    let mut user_prompt = format!(
        "Original description: {}\n\n\
         Failed script:\n{}\n\n\
         Why it failed: {}\n",
        old_description, failed_source, failure_explanation
    );
    if let Some(feedback) = feedback.map(str::trim).filter(|f| !f.is_empty()) {
        user_prompt.push_str(&format!("\nUser feedback on the failed script:\n{}\n", feedback));
    }
    user_prompt.push_str(
        "\nPlease provide an updated description that addresses potential issues in the failed script, \
         incorporates user feedback (if provided), and suggests improvements.",
    );

    let updated = oracle
        .extract::<UpdatedDescription>(REVISION_SYSTEM_PROMPT, &user_prompt)
        .await?;

    let description = updated.description.trim();
    if description.is_empty() {
        tracing::warn!("revised description was empty, keeping the previous one");
        return Ok(old_description.to_string());
    }
    Ok(description.to_string())
}

/// 按字符截断，超出部分用提示替代
pub fn truncate(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((byte_index, _)) => format!(
            "{}\n... [truncated, {} characters total]",
            &text[..byte_index],
            text.chars().count()
        ),
        None => text.to_string(),
    }
}
