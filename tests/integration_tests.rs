use anyhow::{Result, anyhow};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::collections::VecDeque;
use std::fs;
use std::path::PathBuf;
use std::sync::Mutex;
use tempfile::TempDir;

use scriptforge::config::Config;
use scriptforge::extract_code;
use scriptforge::generator::context::GeneratorContext;
use scriptforge::generator::workflow::{LaunchRequest, LoopMode, LoopOutcome, launch, run_request};
use scriptforge::llm::Oracle;
use scriptforge::runner::process::{ProcessLauncher, SystemProcessLauncher};
use scriptforge::runner::resolver::{clean_packages, normalize_interpreter};
use scriptforge::types::script::{sanitize_script_name, script_file_name};
use scriptforge::ui::TerminalPrompter;

/// 按顺序回放结构化结果和文本回复的模型
struct CannedOracle {
    texts: Mutex<VecDeque<String>>,
    values: Mutex<VecDeque<Value>>,
}

impl CannedOracle {
    fn new(texts: Vec<&str>, values: Vec<Value>) -> Self {
        Self {
            texts: Mutex::new(texts.into_iter().map(String::from).collect()),
            values: Mutex::new(values.into_iter().collect()),
        }
    }
}

impl Oracle for CannedOracle {
    async fn prompt(&self, _system_prompt: &str, _user_prompt: &str) -> Result<String> {
        self.texts
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| anyhow!("no text left"))
    }

    async fn extract<T>(&self, _system_prompt: &str, _user_prompt: &str) -> Result<T>
    where
        T: JsonSchema + for<'a> Deserialize<'a> + Serialize + Send + Sync + 'static,
    {
        let value = self
            .values
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| anyhow!("no value left"))?;
        Ok(serde_json::from_value(value)?)
    }
}

fn word_counter_oracle() -> CannedOracle {
    CannedOracle::new(
        vec!["Here it is:\n```python\nimport sys\nprint(len(sys.argv))\n```\n"],
        vec![
            json!({
                "reasoning": "Word counting",
                "enhanced_query": "I want a script that counts the words in a text file I pass on the command line."
            }),
            json!({
                "reasoning_steps": [],
                "description": "Counts words in a text file.",
                "name": "word-counter",
                "outputs": ["word count"],
                "parameters": ["file"]
            }),
        ],
    )
}

#[test]
fn test_extract_code_public_api() {
    assert_eq!(extract_code("```python\nprint(1)\n```"), "print(1)");
    assert_eq!(extract_code("no code here"), "");
}

#[test]
fn test_script_naming() {
    assert_eq!(script_file_name("word_counter"), "word_counter.py");
    assert_eq!(
        sanitize_script_name("Word Counter.py"),
        Some("word_counter".to_string())
    );
}

#[test]
fn test_run_command_helpers() {
    assert_eq!(
        normalize_interpreter("python3 tool.py --x 1", "/opt/venv/bin/python"),
        "/opt/venv/bin/python tool.py --x 1"
    );
    assert_eq!(
        clean_packages(&[
            "pip install requests os".to_string(),
            "python-dotenv".to_string(),
            "requests".to_string(),
        ]),
        vec!["requests".to_string(), "python-dotenv".to_string()]
    );
}

#[test]
fn test_config_from_file() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("scriptforge.toml");
    fs::write(
        &config_path,
        "output_dir = \"generated\"\n\n[script]\ninterpreter = \"python3.11\"\nensure_pip = false\n",
    )
    .unwrap();

    let config = Config::from_file(&config_path).unwrap();

    assert_eq!(config.output_dir, PathBuf::from("generated"));
    assert_eq!(config.script.interpreter, "python3.11");
    assert!(!config.script.ensure_pip);
    assert_eq!(config.script.max_install_attempts, 3);
}

#[tokio::test]
async fn test_launch_without_prompt_does_nothing() {
    let temp_dir = TempDir::new().unwrap();
    let config = Config {
        output_dir: temp_dir.path().to_path_buf(),
        ..Default::default()
    };

    let outcome = launch(
        &config,
        LaunchRequest {
            prompt: None,
            inspo: false,
            mode: LoopMode::Single,
        },
    )
    .await
    .unwrap();

    assert!(outcome.is_none());
    assert_eq!(fs::read_dir(temp_dir.path()).unwrap().count(), 0);
}

#[tokio::test]
async fn test_single_generation_with_custom_oracle() {
    let temp_dir = TempDir::new().unwrap();
    let config = Config {
        output_dir: temp_dir.path().join("scripts"),
        ..Default::default()
    };
    let context = GeneratorContext::new(
        word_counter_oracle(),
        SystemProcessLauncher::new(temp_dir.path()),
        TerminalPrompter::new(),
        config,
    );

    let outcome = run_request(
        &context,
        LaunchRequest {
            prompt: Some("count words in a file".to_string()),
            inspo: false,
            mode: LoopMode::Single,
        },
    )
    .await
    .unwrap();

    let expected = temp_dir.path().join("scripts").join("word_counter.py");
    assert_eq!(outcome, Some(LoopOutcome::Saved(expected.clone())));
    assert_eq!(
        fs::read_to_string(expected).unwrap(),
        "import sys\nprint(len(sys.argv))\n"
    );
}

#[cfg(unix)]
#[tokio::test]
async fn test_system_launcher_runs_shell_commands() {
    let temp_dir = TempDir::new().unwrap();
    let launcher = SystemProcessLauncher::new(temp_dir.path());

    let result = launcher.run_shell("printf hello").await.unwrap();

    assert!(result.success());
    assert_eq!(result.stdout, "hello");
}
