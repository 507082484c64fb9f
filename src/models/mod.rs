//! Domain models shared by the sources, the evaluator and the bot

mod address;
mod report;
mod verdict;

pub use address::*;
pub use report::*;
pub use verdict::*;
