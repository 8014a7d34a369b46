pub mod analyze;
pub mod completions;
pub mod history;
pub mod tables;
pub mod util;
