pub mod execution;
pub mod script;

pub use execution::{EvaluationVerdict, ExecutionResult, InstallOutcome, RunPlan};
pub use script::{GeneratedScript, ReasoningStep, ScriptIdea, ScriptSpecification};
