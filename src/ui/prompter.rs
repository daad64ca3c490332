use anyhow::{Context, Result};
use dialoguer::{Confirm, Input, Select, theme::ColorfulTheme};

/// 与终端用户的交互
pub trait UserPrompter {
    /// 是/否 确认
    fn confirm(&self, question: &str) -> Result<bool>;

    /// 读取一行自由文本，允许为空
    fn input(&self, question: &str) -> Result<String>;

    /// 从列表中选择一项，返回下标
    fn select(&self, question: &str, items: &[String]) -> Result<usize>;
}

/// 基于 dialoguer 的终端交互
pub struct TerminalPrompter {
    theme: ColorfulTheme,
}

impl TerminalPrompter {
    pub fn new() -> Self {
        Self {
            theme: ColorfulTheme::default(),
        }
    }
}

impl Default for TerminalPrompter {
    fn default() -> Self {
        Self::new()
    }
}

impl UserPrompter for TerminalPrompter {
    fn confirm(&self, question: &str) -> Result<bool> {
        Confirm::with_theme(&self.theme)
            .with_prompt(question)
            .default(false)
            .interact()
            .context("Failed to read confirmation")
    }

    fn input(&self, question: &str) -> Result<String> {
        Input::<String>::with_theme(&self.theme)
            .with_prompt(question)
            .allow_empty(true)
            .interact_text()
            .context("Failed to read input")
    }

    fn select(&self, question: &str, items: &[String]) -> Result<usize> {
        Select::with_theme(&self.theme)
            .with_prompt(question)
            .items(items)
            .default(0)
            .interact()
            .context("Selection cancelled")
    }
}
