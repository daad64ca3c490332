use anyhow::Result;

use crate::llm::Oracle;
use crate::types::ScriptSpecification;

const CODE_SYSTEM_PROMPT: &str = r#"You are a master Python script writer. Write a complete, functional Python script that meets the given requirements. Your script must:
   a. Include every necessary import statement.
   b. Use argparse for command-line arguments with helpful documentation. Add a short how-to section to the parser description explaining how to use the script.
   c. Implement the main functionality as described.
   d. Handle errors and edge cases: wrap every fallible operation in try/except and print informative error messages.
   e. Explain the code with clear, concise comments at every step.
   f. Output ONLY the code, wrapped in exactly one markdown code block, so it can be pasted into a .py file and run.

You may use any pip libraries that benefit the script. You are free to expand on the given ideas when it improves the script.

It is CRUCIAL that the whole answer is a single markdown code block, like this:
```python
# Your code goes here
```"#;

/// 组装发给模型的用户消息
pub fn build_code_request(original_prompt: &str, specification: &ScriptSpecification) -> String {
    format!(
        "{prompt}\n\n\
         I have thought a little about this, and the following information might be useful:\n\n\
         Maybe we could call it {name}?\n\n\
         Description of what the script should do:\n{description}\n\n\
         Ideas for the outputs of the script:\n{outputs}\n\n\
         Ideas for the script input parameters:\n{parameters}\n",
        prompt = original_prompt,
        name = specification.name,
        description = specification.description,
        outputs = specification.outputs.join(", "),
        parameters = specification.parameters.join(", "),
    )
}

/// 根据规格生成脚本源码，返回模型的原始回复
///
/// 回复应当是一个代码块，这里不做结构校验，交给 [`crate::generator::extractor::extract_code`]。
pub async fn generate_code<O: Oracle>(
    oracle: &O,
    original_prompt: &str,
    specification: &ScriptSpecification,
) -> Result<String> {
    let request = build_code_request(original_prompt, specification);
    oracle.prompt(CODE_SYSTEM_PROMPT, &request).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::ScriptedOracle;

    fn spec() -> ScriptSpecification {
        ScriptSpecification {
            reasoning_steps: vec![],
            description: "Counts words in a file".to_string(),
            name: "word_counter".to_string(),
            outputs: vec!["total count".to_string(), "per-line counts".to_string()],
            parameters: vec!["file_path".to_string()],
        }
    }

    #[test]
    fn test_build_code_request_contains_specification() {
        let request = build_code_request("count words in a file", &spec());

        assert!(request.starts_with("count words in a file"));
        assert!(request.contains("word_counter"));
        assert!(request.contains("Counts words in a file"));
        assert!(request.contains("total count, per-line counts"));
        assert!(request.contains("file_path"));
    }

    #[tokio::test]
    async fn test_generate_code_returns_raw_response() {
        let raw = "```python\nimport argparse\n```";
        let oracle = ScriptedOracle::new().with_prompt(raw);

        let response = generate_code(&oracle, "count words", &spec()).await.unwrap();

        assert_eq!(response, raw);
        let calls = oracle.calls();
        assert_eq!(calls.len(), 1);
        assert!(calls[0].system_prompt.contains("argparse"));
        assert!(calls[0].system_prompt.contains("try/except"));
    }
}
