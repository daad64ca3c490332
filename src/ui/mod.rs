pub mod banner;
pub mod prompter;

pub use banner::display_intro;
pub use prompter::{TerminalPrompter, UserPrompter};
