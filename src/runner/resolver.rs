use anyhow::Result;
use regex::Regex;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

use crate::llm::Oracle;
use crate::types::RunPlan;

/// 模型直接给出的运行方式，尚未清洗
#[derive(Debug, Serialize, Deserialize, Clone, JsonSchema)]
pub struct RunCommandDraft {
    /// 运行脚本的单行命令，例如 `python word_counter.py --file notes.txt`
    pub run_command: String,
    /// 需要 pip 安装的第三方包，每项一个，例如 `["matplotlib", "pandas>=2.0"]`
    pub required_packages: Vec<String>,
}

static PYTHON_TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^python(3(\.\d+)?)?$").unwrap());

/// 常见的标准库模块，模型经常把它们误列为依赖
const PY_STDLIB: &[&str] = &[
    "abc", "argparse", "array", "ast", "asyncio", "base64", "bisect", "calendar", "cmath",
    "collections", "concurrent", "configparser", "contextlib", "copy", "csv", "ctypes",
    "dataclasses", "datetime", "decimal", "difflib", "email", "enum", "fnmatch", "fractions",
    "functools", "getpass", "glob", "gzip", "hashlib", "heapq", "hmac", "html", "http", "io",
    "itertools", "json", "logging", "math", "mimetypes", "multiprocessing", "operator", "os",
    "pathlib", "pickle", "platform", "pprint", "queue", "random", "re", "secrets", "shlex",
    "shutil", "signal", "socket", "sqlite3", "statistics", "string", "struct", "subprocess",
    "sys", "tempfile", "textwrap", "threading", "time", "timeit", "tkinter", "traceback",
    "turtle", "typing", "unicodedata", "unittest", "urllib", "uuid", "venv", "warnings",
    "wave", "webbrowser", "xml", "zipfile", "zlib",
];

fn system_prompt(file_name: &str) -> String {
    format!(
        "Your job is to create the command necessary to run the following script. \
         Return the one-line command necessary to run the script in run_command. \
         In addition, we need to know which pip packages are needed; return them in required_packages, one package per item, like this:\n\n\
         [\"matplotlib\", \"pandas\", \"numpy\"]\n\n\
         The run_command must be a one-line terminal command that includes the script name. The script name is {name}.\n\
         Some examples of run commands:\n\n\
         python {name}\n\
         python {name} --arg1 arg1 --arg2 arg2\n\
         python {name} --text \"Hello, world!\"\n\n\
         The command should be specific to this script and must not include any other commands that are not needed to run it. \
         Leave required_packages empty when the script only uses the standard library.",
        name = file_name
    )
}

/// 询问模型如何运行脚本以及需要哪些依赖
///
/// 返回的命令一定包含 `file_name`，首个 python 解释器会被替换成 `interpreter`。
pub async fn resolve_run_plan<O: Oracle>(
    oracle: &O,
    file_name: &str,
    source_text: &str,
    interpreter: &str,
) -> Result<RunPlan> {
    let draft = oracle
        .extract::<RunCommandDraft>(&system_prompt(file_name), source_text)
        .await?;
    tracing::debug!(?draft, "run command draft");

    let mut command = draft.run_command.trim().to_string();
    if !command.contains(file_name) {
        tracing::warn!(
            "run command '{}' does not mention {}, falling back to the default",
            command,
            file_name
        );
        command = format!("python {}", file_name);
    }

    Ok(RunPlan {
        command: normalize_interpreter(&command, interpreter),
        required_packages: clean_packages(&draft.required_packages),
    })
}

/// 把命令开头的 `python`/`python3`/`python3.N` 换成指定解释器
pub fn normalize_interpreter(command: &str, interpreter: &str) -> String {
    let trimmed = command.trim_start();
    let (first, rest) = match trimmed.find(char::is_whitespace) {
        Some(index) => trimmed.split_at(index),
        None => (trimmed, ""),
    };

    if PYTHON_TOKEN.is_match(first) {
        format!("{}{}", interpreter, rest)
    } else {
        trimmed.to_string()
    }
}

/// 从模型给出的包列表中提取真正需要安装的第三方包
///
/// 每一项单独清洗：去掉 pip/install/解释器等命令片段，合并版本约束中的空格，
/// 去掉标准库模块并按包名去重。
pub fn clean_packages(items: &[String]) -> Vec<String> {
    let mut packages: Vec<String> = Vec::new();

    for item in items {
        for package in split_requirements(item) {
            if !package.starts_with(|c: char| c.is_ascii_alphanumeric()) {
                continue;
            }
            let lower = package.to_lowercase();
            let base = package_base_name(&lower);
            if PY_STDLIB.contains(&base) {
                continue;
            }
            if !packages
                .iter()
                .any(|p| package_base_name(&p.to_lowercase()) == base)
            {
                packages.push(package);
            }
        }
    }
    packages
}

/// 把一项拆成若干个需求串
///
/// 以运算符开头的片段，或者紧跟在以运算符结尾的片段之后的部分，属于同一个版本约束。
fn split_requirements(item: &str) -> Vec<String> {
    let mut requirements: Vec<String> = Vec::new();
    let mut continues = false;

    for token in item.split_whitespace() {
        let lower = token.to_lowercase();
        if token.starts_with('-')
            || matches!(lower.as_str(), "pip" | "pip3" | "install")
            || PYTHON_TOKEN.is_match(&lower)
        {
            continue;
        }

        let starts_constraint = token.starts_with(is_constraint_char);
        match requirements.last_mut() {
            Some(last) if continues || starts_constraint => last.push_str(token),
            _ => requirements.push(token.to_string()),
        }
        continues = token.ends_with(is_constraint_char);
    }
    requirements
}

fn is_constraint_char(c: char) -> bool {
    matches!(c, '=' | '<' | '>' | '~' | '!' | ',')
}

/// 去掉版本约束和 extras，只保留包名
fn package_base_name(spec: &str) -> &str {
    let end = spec
        .find(|c: char| matches!(c, '=' | '<' | '>' | '~' | '!' | '[' | ';'))
        .unwrap_or(spec.len());
    &spec[..end]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::ScriptedOracle;
    use serde_json::json;

    fn items(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|item| item.to_string()).collect()
    }

    #[test]
    fn test_clean_packages_strips_pip_noise() {
        let packages = clean_packages(&items(&["pip install --upgrade requests numpy", "requests"]));

        assert_eq!(packages, vec!["requests", "numpy"]);
    }

    #[test]
    fn test_clean_packages_drops_stdlib_and_interpreter() {
        let packages = clean_packages(&items(&[
            "python3 -m pip install os sys",
            "json",
            "pandas>=2.0",
            "argparse",
        ]));

        assert_eq!(packages, vec!["pandas>=2.0"]);
    }

    #[test]
    fn test_clean_packages_keeps_python_prefixed_distributions() {
        let packages = clean_packages(&items(&[
            "pip install python-dotenv python-dateutil requests",
            "python-docx",
            "python3.11",
        ]));

        assert_eq!(
            packages,
            vec!["python-dotenv", "python-dateutil", "requests", "python-docx"]
        );
    }

    #[test]
    fn test_clean_packages_joins_spaced_version_constraints() {
        let packages = clean_packages(&items(&[
            "pip install pandas >= 2.0",
            "numpy >=1.24, <2.0",
            "rich== 13.7",
        ]));

        assert_eq!(packages, vec!["pandas>=2.0", "numpy>=1.24,<2.0", "rich==13.7"]);
    }

    #[test]
    fn test_clean_packages_empty_input() {
        assert!(clean_packages(&[]).is_empty());
        assert!(clean_packages(&items(&["pip install", "  "])).is_empty());
    }

    #[test]
    fn test_normalize_interpreter_variants() {
        assert_eq!(
            normalize_interpreter("python a.py --x 1", "/venv/bin/python"),
            "/venv/bin/python a.py --x 1"
        );
        assert_eq!(normalize_interpreter("python3 a.py", "py"), "py a.py");
        assert_eq!(normalize_interpreter("python3.11 a.py", "py"), "py a.py");
        assert_eq!(normalize_interpreter("python", "py"), "py");
    }

    #[test]
    fn test_normalize_interpreter_leaves_other_commands() {
        assert_eq!(normalize_interpreter("pythonic a.py", "py"), "pythonic a.py");
        assert_eq!(normalize_interpreter("cat a.py | python", "py"), "cat a.py | python");
    }

    #[tokio::test]
    async fn test_resolve_run_plan_keeps_valid_command() {
        let oracle = ScriptedOracle::new().with_extraction(json!({
            "run_command": "python word_counter.py --file sample.txt",
            "required_packages": ["rich"]
        }));

        let plan = resolve_run_plan(&oracle, "word_counter.py", "import rich", "python3")
            .await
            .unwrap();

        assert_eq!(plan.command, "python3 word_counter.py --file sample.txt");
        assert_eq!(plan.required_packages, vec!["rich"]);
        assert!(oracle.calls()[0].system_prompt.contains("word_counter.py"));
    }

    #[tokio::test]
    async fn test_resolve_run_plan_always_mentions_file_name() {
        let oracle = ScriptedOracle::new().with_extraction(json!({
            "run_command": "python other.py",
            "required_packages": []
        }));

        let plan = resolve_run_plan(&oracle, "word_counter.py", "print(1)", "python3")
            .await
            .unwrap();

        assert!(plan.command.contains("word_counter.py"));
        assert_eq!(plan.command, "python3 word_counter.py");
        assert!(plan.required_packages.is_empty());
    }
}
