pub mod aggregator;
pub mod cli;
pub mod client;
pub mod cursor;
pub mod logging;
pub mod retry;

#[cfg(test)]
mod testing;

pub use aggregator::Aggregator;
pub use cli::{handle_command, FetchCommands, StudiesArgs};
pub use client::ClinicalTrialsClient;
pub use cursor::{Page, PageCursor};
pub use retry::{RetryPolicy, Retrying};
