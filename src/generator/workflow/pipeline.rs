use anyhow::Result;
use colored::Colorize;
use std::path::PathBuf;

use crate::error::ScriptError;
use crate::generator::context::GeneratorContext;
use crate::generator::workflow::{TimingKeys, TimingScope};
use crate::generator::{code, enhancer, extractor, outlet, specification};
use crate::llm::Oracle;
use crate::runner::installer::{InstallSettings, install_packages};
use crate::runner::process::ProcessLauncher;
use crate::runner::{evaluate, execute, resolve_run_plan, revise_description};
use crate::types::{EvaluationVerdict, GeneratedScript, ScriptSpecification};
use crate::ui::UserPrompter;

/// 没有找到代码块时给出的失败说明
pub const NO_CODE_BLOCK: &str = "no fenced code block found";

/// 生成后是否运行并重试
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopMode {
    /// 只生成并保存
    Single,
    /// 运行失败后询问用户是否重试
    Interactive,
    /// 运行失败后自动重试，直到成功或次数用尽
    Autonomous,
}

/// 一次生成流程的最终结果
#[derive(Debug, Clone, PartialEq)]
pub enum LoopOutcome {
    /// 单次模式，脚本已保存
    Saved(PathBuf),
    /// 脚本运行并通过了评估
    Succeeded { path: PathBuf, attempts: u32 },
    /// 用户拒绝继续重试
    Declined { attempts: u32 },
    /// 自动模式次数用尽
    Exhausted { attempts: u32 },
}

/// 执行与评估循环的状态
#[derive(Debug)]
pub enum LoopState {
    /// 刚生成出一份脚本
    Generated(GeneratedScript),
    /// 脚本已保存，等待运行
    Running {
        script: GeneratedScript,
        path: PathBuf,
    },
    /// 已拿到评估结论
    Evaluated {
        script: GeneratedScript,
        path: Option<PathBuf>,
        verdict: EvaluationVerdict,
    },
    /// 准备修订描述并重新生成
    Regenerating {
        script: GeneratedScript,
        verdict: EvaluationVerdict,
        feedback: Option<String>,
    },
    Done(LoopOutcome),
}

/// 从需求到脚本的完整流程
pub struct ScriptPipeline<'a, O, L, P> {
    context: &'a GeneratorContext<O, L, P>,
    mode: LoopMode,
    timing: TimingScope,
    original_prompt: String,
    specification: Option<ScriptSpecification>,
    attempts: u32,
}

impl<'a, O, L, P> ScriptPipeline<'a, O, L, P>
where
    O: Oracle,
    L: ProcessLauncher,
    P: UserPrompter,
{
    pub fn new(context: &'a GeneratorContext<O, L, P>, mode: LoopMode) -> Self {
        Self {
            context,
            mode,
            timing: TimingScope::new(),
            original_prompt: String::new(),
            specification: None,
            attempts: 0,
        }
    }

    pub fn timing(&self) -> &TimingScope {
        &self.timing
    }

    /// 当前生效的规格，失败重试后会被新的规格取代
    pub fn specification(&self) -> Option<&ScriptSpecification> {
        self.specification.as_ref()
    }

    /// 执行流程直到得出结果
    pub async fn run(&mut self, prompt: &str) -> Result<LoopOutcome> {
        self.original_prompt = prompt.to_string();

        println!("{}", "\n✨ Enhancing your request...".bright_blue());
        self.timing.start_phase(TimingKeys::ENHANCE);
        let enhanced = enhancer::enhance(&self.context.oracle, prompt).await?;
        self.timing.end_phase(TimingKeys::ENHANCE);
        tracing::debug!("enhanced query: {}", enhanced);

        self.timing.start_phase(TimingKeys::SPECIFY);
        let specification = specification::specify(&self.context.oracle, &enhanced).await?;
        self.timing.end_phase(TimingKeys::SPECIFY);

        let script = self.generate(specification).await?;
        let mut state = LoopState::Generated(script);

        loop {
            state = match state {
                LoopState::Done(outcome) => return Ok(outcome),
                other => self.step(other).await?,
            };
        }
    }

    /// 推进一步状态机
    async fn step(&mut self, state: LoopState) -> Result<LoopState> {
        match state {
            LoopState::Generated(script) => self.on_generated(script),
            LoopState::Running { script, path } => {
                let verdict = self.run_and_evaluate(&script).await?;
                Ok(LoopState::Evaluated {
                    script,
                    path: Some(path),
                    verdict,
                })
            }
            LoopState::Evaluated {
                script,
                path,
                verdict,
            } => self.on_evaluated(script, path, verdict),
            LoopState::Regenerating {
                script,
                verdict,
                feedback,
            } => {
                let next = self.regenerate(&script, &verdict, feedback.as_deref()).await?;
                Ok(LoopState::Generated(next))
            }
            done @ LoopState::Done(_) => Ok(done),
        }
    }

    fn on_generated(&mut self, script: GeneratedScript) -> Result<LoopState> {
        if !script.has_code() {
            if self.mode == LoopMode::Single {
                return Err(ScriptError::ExtractionFailure.into());
            }
            eprintln!("❌ {}, the script was not saved", NO_CODE_BLOCK);
            return Ok(LoopState::Evaluated {
                script,
                path: None,
                verdict: EvaluationVerdict::failed(NO_CODE_BLOCK),
            });
        }

        self.timing.start_phase(TimingKeys::OUTPUT);
        let path = outlet::save_script(&self.context.config.output_dir, &script)?;
        self.timing.end_phase(TimingKeys::OUTPUT);

        if self.mode == LoopMode::Single {
            return Ok(LoopState::Done(LoopOutcome::Saved(path)));
        }
        Ok(LoopState::Running { script, path })
    }

    fn on_evaluated(
        &mut self,
        script: GeneratedScript,
        path: Option<PathBuf>,
        verdict: EvaluationVerdict,
    ) -> Result<LoopState> {
        if verdict.succeeded {
            if let Some(path) = path {
                println!("{}", "✅ The script worked as intended!".green());
                return Ok(LoopState::Done(LoopOutcome::Succeeded {
                    path,
                    attempts: self.attempts,
                }));
            }
        }

        let attempts = self.attempts;
        let feedback = match self.mode {
            LoopMode::Single => {
                return Ok(LoopState::Done(LoopOutcome::Declined { attempts }));
            }
            LoopMode::Autonomous => {
                let max_attempts = self.context.config.script.max_generation_attempts.max(1);
                if attempts >= max_attempts {
                    eprintln!(
                        "❌ The script still fails after {} attempts, giving up.",
                        attempts
                    );
                    return Ok(LoopState::Done(LoopOutcome::Exhausted { attempts }));
                }
                println!(
                    "{}",
                    format!(
                        "🔁 Trying again automatically (attempt {} / {})",
                        attempts + 1,
                        max_attempts
                    )
                    .yellow()
                );
                None
            }
            LoopMode::Interactive => {
                let prompter = &self.context.prompter;
                if !prompter.confirm("The script did not work as intended. Do you want to try again?")? {
                    return Ok(LoopState::Done(LoopOutcome::Declined { attempts }));
                }
                if prompter.confirm("Would you like to give feedback on what went wrong?")? {
                    Some(prompter.input("Describe what should be different")?)
                } else {
                    None
                }
            }
        };

        Ok(LoopState::Regenerating {
            script,
            verdict,
            feedback,
        })
    }

    /// 生成代码并提取代码块
    async fn generate(&mut self, specification: ScriptSpecification) -> Result<GeneratedScript> {
        self.attempts += 1;
        println!(
            "{}",
            format!("\n🧠 Writing {} (attempt {})...", specification.file_name(), self.attempts)
                .bright_blue()
        );

        self.timing.start_phase(TimingKeys::GENERATE);
        let source_text =
            code::generate_code(&self.context.oracle, &self.original_prompt, &specification).await?;
        self.timing.end_phase(TimingKeys::GENERATE);

        let code = extractor::extract_code(&source_text);
        self.specification = Some(specification.clone());
        Ok(GeneratedScript::new(specification, source_text, code))
    }

    async fn run_and_evaluate(&mut self, script: &GeneratedScript) -> Result<EvaluationVerdict> {
        let oracle = &self.context.oracle;
        let launcher = &self.context.launcher;
        let script_config = &self.context.config.script;
        let settings = InstallSettings::from_config(script_config);

        self.timing.start_phase(TimingKeys::RUN);
        let plan =
            resolve_run_plan(oracle, &script.file_name, &script.code, &settings.interpreter).await?;
        tracing::debug!(?plan, "resolved run plan");

        let install = install_packages(oracle, launcher, &plan.required_packages, &settings).await?;
        if !install.diagnostic.is_empty() {
            eprintln!("⚠️ {}", install.diagnostic);
        }

        let result = execute(launcher, &plan).await;
        self.timing.end_phase(TimingKeys::RUN);

        self.timing.start_phase(TimingKeys::EVALUATE);
        let verdict = evaluate(
            oracle,
            &script.specification,
            &result,
            script_config.output_truncate_length,
        )
        .await?;
        self.timing.end_phase(TimingKeys::EVALUATE);
        Ok(verdict)
    }

    /// 修订描述后用新的规格重新生成
    async fn regenerate(
        &mut self,
        script: &GeneratedScript,
        verdict: &EvaluationVerdict,
        feedback: Option<&str>,
    ) -> Result<GeneratedScript> {
        println!("{}", "\n📝 Revising the script description...".bright_blue());
        let failed_source = if script.has_code() {
            &script.code
        } else {
            &script.source_text
        };

        let description = revise_description(
            &self.context.oracle,
            &script.specification.description,
            failed_source,
            &verdict.explanation,
            feedback,
        )
        .await?;
        println!("New description: {}", description);

        let superseded = script.specification.with_description(description);
        self.generate(superseded).await
    }
}
