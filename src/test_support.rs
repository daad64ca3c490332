//! 测试用的模型、进程与终端替身

use anyhow::{Result, anyhow};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::VecDeque;
use std::sync::Mutex;

use crate::llm::Oracle;
use crate::runner::process::ProcessLauncher;
use crate::types::ExecutionResult;
use crate::ui::UserPrompter;

/// 一次模型调用的记录
#[derive(Debug, Clone)]
pub struct OracleCall {
    /// `prompt` 或者提取目标类型的名称
    pub kind: String,
    pub system_prompt: String,
    pub user_prompt: String,
}

/// 按顺序回放预设回复的模型
#[derive(Default)]
pub struct ScriptedOracle {
    prompts: Mutex<VecDeque<String>>,
    extractions: Mutex<VecDeque<Value>>,
    calls: Mutex<Vec<OracleCall>>,
}

impl ScriptedOracle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_prompt(self, response: impl Into<String>) -> Self {
        self.prompts.lock().unwrap().push_back(response.into());
        self
    }

    pub fn with_extraction(self, value: Value) -> Self {
        self.extractions.lock().unwrap().push_back(value);
        self
    }

    pub fn calls(&self) -> Vec<OracleCall> {
        self.calls.lock().unwrap().clone()
    }

    /// 名称中包含 `needle` 的调用次数
    pub fn count(&self, needle: &str) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|call| call.kind.contains(needle))
            .count()
    }

    fn record(&self, kind: &str, system_prompt: &str, user_prompt: &str) {
        self.calls.lock().unwrap().push(OracleCall {
            kind: kind.to_string(),
            system_prompt: system_prompt.to_string(),
            user_prompt: user_prompt.to_string(),
        });
    }
}

impl Oracle for ScriptedOracle {
    async fn prompt(&self, system_prompt: &str, user_prompt: &str) -> Result<String> {
        self.record("prompt", system_prompt, user_prompt);
        self.prompts
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| anyhow!("no scripted prompt response left"))
    }

    async fn extract<T>(&self, system_prompt: &str, user_prompt: &str) -> Result<T>
    where
        T: JsonSchema + for<'a> Deserialize<'a> + Serialize + Send + Sync + 'static,
    {
        let kind = std::any::type_name::<T>();
        self.record(kind, system_prompt, user_prompt);
        let value = self
            .extractions
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| anyhow!("no scripted extraction left for {}", kind))?;
        Ok(serde_json::from_value(value)?)
    }
}

/// 记录所有调用并回放预设结果的进程启动器
#[derive(Default)]
pub struct RecordingLauncher {
    results: Mutex<VecDeque<Result<ExecutionResult, String>>>,
    invocations: Mutex<Vec<String>>,
}

impl RecordingLauncher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_result(self, result: ExecutionResult) -> Self {
        self.results.lock().unwrap().push_back(Ok(result));
        self
    }

    pub fn with_launch_error(self, error: impl Into<String>) -> Self {
        self.results.lock().unwrap().push_back(Err(error.into()));
        self
    }

    pub fn invocations(&self) -> Vec<String> {
        self.invocations.lock().unwrap().clone()
    }

    fn next(&self, invocation: String) -> Result<ExecutionResult> {
        self.invocations.lock().unwrap().push(invocation);
        match self.results.lock().unwrap().pop_front() {
            Some(Ok(result)) => Ok(result),
            Some(Err(error)) => Err(anyhow!(error)),
            // 没有预设时视为成功
            None => Ok(ExecutionResult::default()),
        }
    }
}

impl ProcessLauncher for RecordingLauncher {
    async fn run(&self, program: &str, args: &[String]) -> Result<ExecutionResult> {
        self.next(format!("{} {}", program, args.join(" ")))
    }

    async fn run_shell(&self, command: &str) -> Result<ExecutionResult> {
        self.next(command.to_string())
    }
}

/// 回放预设回答的终端交互
#[derive(Default)]
pub struct ScriptedPrompter {
    confirms: Mutex<VecDeque<bool>>,
    inputs: Mutex<VecDeque<String>>,
    selections: Mutex<VecDeque<usize>>,
    questions: Mutex<Vec<String>>,
}

impl ScriptedPrompter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_confirm(self, answer: bool) -> Self {
        self.confirms.lock().unwrap().push_back(answer);
        self
    }

    pub fn with_input(self, answer: impl Into<String>) -> Self {
        self.inputs.lock().unwrap().push_back(answer.into());
        self
    }

    pub fn with_selection(self, index: usize) -> Self {
        self.selections.lock().unwrap().push_back(index);
        self
    }

    pub fn questions(&self) -> Vec<String> {
        self.questions.lock().unwrap().clone()
    }
}

impl UserPrompter for ScriptedPrompter {
    fn confirm(&self, question: &str) -> Result<bool> {
        self.questions.lock().unwrap().push(question.to_string());
        self.confirms
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| anyhow!("unexpected confirm: {}", question))
    }

    fn input(&self, question: &str) -> Result<String> {
        self.questions.lock().unwrap().push(question.to_string());
        self.inputs
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| anyhow!("unexpected input: {}", question))
    }

    fn select(&self, question: &str, _items: &[String]) -> Result<usize> {
        self.questions.lock().unwrap().push(question.to_string());
        self.selections
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| anyhow!("unexpected select: {}", question))
    }
}
