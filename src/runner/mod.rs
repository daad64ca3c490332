//! 运行阶段：解析运行方式、安装依赖、执行并评估脚本

pub mod evaluator;
pub mod installer;
pub mod process;
pub mod resolver;

pub use evaluator::{evaluate, execute, revise_description};
pub use installer::{InstallSettings, install_packages};
pub use process::{ProcessLauncher, SystemProcessLauncher};
pub use resolver::{normalize_interpreter, resolve_run_plan};
