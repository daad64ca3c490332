use crate::config::Config;
use crate::generator::context::GeneratorContext;
use crate::generator::inspiration;
use crate::llm::Oracle;
use crate::runner::process::ProcessLauncher;
use crate::ui::{UserPrompter, display_intro};

use anyhow::Result;
use std::collections::HashMap;
use std::time::{Duration, Instant};

pub mod pipeline;

pub use pipeline::{LoopMode, LoopOutcome, LoopState, ScriptPipeline};

/// 时间跟踪作用域
pub struct TimingScope {
    start_time: Instant,
    phase_start_times: HashMap<String, Instant>,
    phase_durations: Vec<(String, Duration)>,
}

impl Default for TimingScope {
    fn default() -> Self {
        Self::new()
    }
}

impl TimingScope {
    pub fn new() -> Self {
        Self {
            start_time: Instant::now(),
            phase_start_times: HashMap::new(),
            phase_durations: Vec::new(),
        }
    }

    /// 开始一个新的阶段计时
    pub fn start_phase(&mut self, phase_name: &str) {
        self.phase_start_times
            .insert(phase_name.to_string(), Instant::now());
    }

    /// 结束一个阶段的计时，同名阶段的耗时会累加
    pub fn end_phase(&mut self, phase_name: &str) -> Option<Duration> {
        let duration = self.phase_start_times.remove(phase_name)?.elapsed();
        match self
            .phase_durations
            .iter_mut()
            .find(|(name, _)| name == phase_name)
        {
            Some((_, total)) => *total += duration,
            None => self
                .phase_durations
                .push((phase_name.to_string(), duration)),
        }
        Some(duration)
    }

    /// 获取总执行时间
    pub fn get_total_duration(&self) -> Duration {
        self.start_time.elapsed()
    }

    /// 获取某个阶段的累计耗时
    pub fn get_phase_duration(&self, phase_name: &str) -> Option<Duration> {
        self.phase_durations
            .iter()
            .find(|(name, _)| name == phase_name)
            .map(|(_, duration)| *duration)
    }

    /// 获取格式化的执行时间报告
    pub fn generate_timing_report(&self) -> String {
        let mut report = format!(
            "Total time: {:.2}s\n",
            self.get_total_duration().as_secs_f64()
        );

        if !self.phase_durations.is_empty() {
            report.push_str("\nPhases:\n");
            for (phase, duration) in &self.phase_durations {
                report.push_str(&format!("- {}: {:.3}s\n", phase, duration.as_secs_f64()));
            }
        }

        report
    }
}

/// 时间跟踪常量
pub struct TimingKeys;

impl TimingKeys {
    pub const ENHANCE: &'static str = "enhance";
    pub const SPECIFY: &'static str = "specify";
    pub const GENERATE: &'static str = "generate";
    pub const OUTPUT: &'static str = "output";
    pub const RUN: &'static str = "run";
    pub const EVALUATE: &'static str = "evaluate";
}

/// 一次命令行调用的请求
#[derive(Debug, Clone)]
pub struct LaunchRequest {
    pub prompt: Option<String>,
    pub inspo: bool,
    pub mode: LoopMode,
}

/// 没有需求也没有开启灵感模式时的提示
pub const MISSING_PROMPT_MESSAGE: &str =
    "Please provide a prompt or use --inspo for inspiration mode.";

/// 启动脚本生成工作流
pub async fn launch(config: &Config, request: LaunchRequest) -> Result<Option<LoopOutcome>> {
    display_intro();

    if !request.inspo && !has_prompt(request.prompt.as_deref()) {
        println!("{}", MISSING_PROMPT_MESSAGE);
        return Ok(None);
    }

    let context = GeneratorContext::from_config(config.clone())?;
    run_request(&context, request).await
}

/// 在给定上下文中处理一次请求
///
/// 灵感模式优先于命令行给出的需求。
pub async fn run_request<O, L, P>(
    context: &GeneratorContext<O, L, P>,
    request: LaunchRequest,
) -> Result<Option<LoopOutcome>>
where
    O: Oracle,
    L: ProcessLauncher,
    P: UserPrompter,
{
    let prompt = if request.inspo {
        Some(inspiration::get_inspiration(&context.oracle, &context.prompter).await?)
    } else {
        request.prompt
    };

    let Some(prompt) = prompt.filter(|p| has_prompt(Some(p))) else {
        println!("{}", MISSING_PROMPT_MESSAGE);
        return Ok(None);
    };

    let mut pipeline = ScriptPipeline::new(context, request.mode);
    let outcome = pipeline.run(&prompt).await?;
    tracing::info!(?outcome, "generation finished");

    if context.config.verbose {
        println!("\n{}", pipeline.timing().generate_timing_report());
    }
    Ok(Some(outcome))
}

fn has_prompt(prompt: Option<&str>) -> bool {
    prompt.is_some_and(|p| !p.trim().is_empty())
}
