use anyhow::Result;
use colored::Colorize;

use crate::error::ScriptError;
use crate::llm::Oracle;
use crate::types::ScriptSpecification;
use crate::types::script::sanitize_script_name;

const SPECIFICATION_SYSTEM_PROMPT: &str = "You are a master Python CLI script writer tasked with designing an exceptional script based on a user's request. \
Think deeply about the implementation, the input parameters, the outputs, and how to make the script genuinely impressive and useful.

First, list the steps needed to build the perfect script. Think step by step and consider every component and potential challenge.
Next, write a detailed description of the proposed implementation: how it works, what makes it stand out, and how it interacts with the user.
Then, choose a snake_case name for the script that reflects its functionality.
Finally, list the input parameters the script accepts and the outputs it produces. Be thorough so the script is as useful and flexible as possible.";

/// 根据扩写后的需求生成脚本规格
pub async fn specify<O: Oracle>(oracle: &O, enhanced_query: &str) -> Result<ScriptSpecification> {
    let raw = oracle
        .extract::<ScriptSpecification>(SPECIFICATION_SYSTEM_PROMPT, enhanced_query)
        .await?;

    let specification = validate(raw)?;
    print_specification(&specification);
    Ok(specification)
}

/// 规整名称并检查必填字段
fn validate(mut specification: ScriptSpecification) -> Result<ScriptSpecification, ScriptError> {
    specification.name = sanitize_script_name(&specification.name).ok_or_else(|| {
        ScriptError::InvalidSpecification(format!(
            "script name '{}' is not a usable identifier",
            specification.name
        ))
    })?;

    specification.description = specification.description.trim().to_string();
    if specification.description.is_empty() {
        return Err(ScriptError::InvalidSpecification(
            "description is empty".to_string(),
        ));
    }

    specification.parameters.retain(|p| !p.trim().is_empty());
    specification.outputs.retain(|o| !o.trim().is_empty());
    Ok(specification)
}

fn print_specification(specification: &ScriptSpecification) {
    println!("\n{}", "📐 Script specification".bright_blue().bold());
    for (i, step) in specification.reasoning_steps.iter().enumerate() {
        println!("   Step {}: {}", i + 1, step.concise_step);
        tracing::debug!(step = i + 1, "thought: {}", step.thought);
    }
    println!("   Name: {}", specification.name);
    println!("   Description: {}", specification.description);
    println!("   Parameters: {:?}", specification.parameters);
    println!("   Outputs: {:?}", specification.outputs);
}
