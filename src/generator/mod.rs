pub mod code;
pub mod context;
pub mod enhancer;
pub mod extractor;
pub mod inspiration;
pub mod outlet;
pub mod specification;
pub mod workflow;
