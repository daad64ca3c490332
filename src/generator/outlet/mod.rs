use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

use crate::types::GeneratedScript;

/// 保存脚本到指定目录
pub fn save_script(output_dir: &Path, script: &GeneratedScript) -> Result<PathBuf> {
    DiskOutlet::new(output_dir).save(script)
}

pub trait Outlet {
    fn save(&self, script: &GeneratedScript) -> Result<PathBuf>;
}

pub struct DiskOutlet {
    output_dir: PathBuf,
}

impl DiskOutlet {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }
}

impl Outlet for DiskOutlet {
    fn save(&self, script: &GeneratedScript) -> Result<PathBuf> {
        // 创建输出目录
        if !self.output_dir.exists() {
            fs::create_dir_all(&self.output_dir).with_context(|| {
                format!(
                    "Failed to create output directory: {}",
                    self.output_dir.display()
                )
            })?;
        }

        let file_path = self.output_dir.join(&script.file_name);
        let mut content = script.code.clone();
        if !content.ends_with('\n') {
            content.push('\n');
        }

        // 已存在的同名文件会被覆盖
        fs::write(&file_path, content)
            .with_context(|| format!("Failed to write script: {}", file_path.display()))?;

        println!("🏁 Script generated and saved as {}", file_path.display());
        Ok(file_path)
    }
}
