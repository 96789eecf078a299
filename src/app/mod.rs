pub mod check;
pub mod dispatch;

pub use check::{StorySummary, check_story};
pub use dispatch::{build_handler, dispatch};
