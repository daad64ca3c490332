use anyhow::Result;
use colored::Colorize;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::error::ScriptError;
use crate::llm::Oracle;
use crate::types::ScriptIdea;
use crate::ui::UserPrompter;

/// 一次生成的全部创意
#[derive(Debug, Serialize, Deserialize, Clone, JsonSchema)]
pub struct ScriptIdeas {
    pub ideas: Vec<ScriptIdea>,
}

const IDEAS_SYSTEM_PROMPT: &str = "You are an assistant specialized in generating creative ideas for Python scripts. \
Given a category or general request, generate 5 unique and interesting script ideas that would be useful to users. \
Make sure every idea is feasible as a CLI script and not too over the top.";

/// 针对某个类别生成脚本创意
pub async fn generate_script_ideas<O: Oracle>(oracle: &O, category: &str) -> Result<Vec<ScriptIdea>> {
    let user_prompt = format!(
        "Category or request: {}\n\n\
         Please generate 5 unique script ideas. Each idea should include:\n\
         1. A catchy title\n\
         2. A brief description of what the script does, no more than a sentence or two\n\
         3. A prompt that could be used to generate this script, written in the first person like a user would\n\n\
         Be creative and think of scripts that are both fun and useful!",
        category
    );

    let result = oracle
        .extract::<ScriptIdeas>(IDEAS_SYSTEM_PROMPT, &user_prompt)
        .await?;

    let ideas: Vec<ScriptIdea> = result
        .ideas
        .into_iter()
        .filter(|idea| !idea.prompt.trim().is_empty())
        .collect();

    if ideas.is_empty() {
        return Err(ScriptError::NoIdeas(category.to_string()).into());
    }
    Ok(ideas)
}

/// 让用户从创意列表中挑选一个
pub fn choose_idea<P: UserPrompter>(prompter: &P, ideas: &[ScriptIdea]) -> Result<ScriptIdea> {
    if ideas.is_empty() {
        return Err(ScriptError::NoIdeas(String::new()).into());
    }

    for (i, idea) in ideas.iter().enumerate() {
        println!("{}", format!("{}. {}", i + 1, idea.title).bright_blue());
        println!("   {}\n", idea.description);
    }

    let items: Vec<String> = ideas
        .iter()
        .enumerate()
        .map(|(i, idea)| format!("{}. {}", i + 1, idea.title))
        .collect();
    let index = prompter.select("Choose a script idea", &items)?;

    let selected = ideas
        .get(index)
        .cloned()
        .ok_or(ScriptError::SelectionOutOfRange {
            index: index + 1,
            len: ideas.len(),
        })?;

    println!("\nGreat choice! Here's the prompt for your selected idea:\n");
    println!("{}", selected.prompt.bright_blue());
    Ok(selected)
}

/// 灵感模式：询问类别、生成创意、选择并返回对应的需求
pub async fn get_inspiration<O: Oracle, P: UserPrompter>(oracle: &O, prompter: &P) -> Result<String> {
    let category = prompter.input("Enter a category or general request for script ideas")?;
    println!("\n💡 Thinking of some creative script ideas for you...\n");

    let ideas = generate_script_ideas(oracle, category.trim()).await?;
    let selected = choose_idea(prompter, &ideas)?;
    Ok(selected.prompt)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{ScriptedOracle, ScriptedPrompter};
    use serde_json::json;

    fn ideas_json() -> serde_json::Value {
        json!({
            "ideas": [
                {"title": "Dup Finder", "description": "Finds duplicate files.", "prompt": "I want a script that finds duplicate files in a folder."},
                {"title": "Renamer", "description": "Bulk renames files.", "prompt": "I want a script that renames files by pattern."},
                {"title": "Broken", "description": "No prompt.", "prompt": "  "}
            ]
        })
    }

    #[tokio::test]
    async fn test_generate_script_ideas_drops_ideas_without_prompt() {
        let oracle = ScriptedOracle::new().with_extraction(ideas_json());

        let ideas = generate_script_ideas(&oracle, "file management").await.unwrap();

        assert_eq!(ideas.len(), 2);
        assert!(oracle.calls()[0].user_prompt.contains("file management"));
    }

    #[tokio::test]
    async fn test_generate_script_ideas_empty_is_error() {
        let oracle = ScriptedOracle::new().with_extraction(json!({"ideas": []}));

        let err = generate_script_ideas(&oracle, "nothing").await.unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ScriptError>(),
            Some(ScriptError::NoIdeas(_))
        ));
    }

    #[tokio::test]
    async fn test_get_inspiration_returns_selected_prompt() {
        let oracle = ScriptedOracle::new().with_extraction(ideas_json());
        let prompter = ScriptedPrompter::new()
            .with_input("file management")
            .with_selection(1);

        let prompt = get_inspiration(&oracle, &prompter).await.unwrap();

        assert_eq!(prompt, "I want a script that renames files by pattern.");
    }

    #[test]
    fn test_choose_idea_out_of_range() {
        let ideas = vec![ScriptIdea {
            title: "Only".to_string(),
            description: "One idea".to_string(),
            prompt: "Do one thing".to_string(),
        }];
        let prompter = ScriptedPrompter::new().with_selection(4);

        let err = choose_idea(&prompter, &ideas).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ScriptError>(),
            Some(ScriptError::SelectionOutOfRange { index: 5, len: 1 })
        ));
    }

    #[test]
    fn test_choose_idea_empty_list() {
        let prompter = ScriptedPrompter::new();

        assert!(choose_idea(&prompter, &[]).is_err());
    }
}
