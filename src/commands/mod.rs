//! Command handlers for the spend CLI.
//!
//! This module contains implementations for all CLI subcommands.

mod challenges;
mod expenses;
mod favorites;
mod init;
mod report;
mod status;

use serde::Serialize;
use std::fmt::Debug;
use tracing::{debug, info};

pub use challenges::{
    cancel_challenge, check_challenges, list_challenges, points, start_challenge, ChallengeBoard,
    PointsSummary,
};
pub use expenses::{add_expense, delete_expense, list_expenses, update_expense, ExpenseChange};
pub use favorites::{add_favorite, list_favorites, remove_favorite, use_favorite};
pub use init::init;
pub use report::report;
pub use status::status;

/// The output type for a command. This allows the command to return a consistent message and,
/// optionally, structured data.
#[derive(Debug, Clone, Serialize)]
pub struct Out<T>
where
    T: Serialize + Clone + Debug,
{
    /// A message that can be printed to the user regarding the outcome of the command execution.
    message: String,

    /// Any structured data that needs to be output from the call.
    structure: Option<T>,
}

impl<T, S> From<S> for Out<T>
where
    T: Debug + Clone + Serialize,
    S: Into<String>,
{
    fn from(value: S) -> Self {
        Out::new_message(value)
    }
}

impl<T> Out<T>
where
    T: Serialize + Clone + Debug,
{
    /// Create a new `Out` object that has `Some(structure)`.
    pub fn new<S>(message: S, structure: T) -> Self
    where
        S: Into<String>,
    {
        Self {
            message: message.into(),
            structure: Some(structure),
        }
    }

    /// Create a new `Out` object that has `None` for `structure`.
    pub fn new_message<S>(message: S) -> Self
    where
        S: Into<String>,
    {
        Self {
            message: message.into(),
            structure: None,
        }
    }

    /// Get the `message`.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Get the structured data stored in `structure`.
    pub fn structure(&self) -> Option<&T> {
        self.structure.as_ref()
    }

    /// Print the message to `info!` and the structured data (if it exists) as JSON to `debug!`.
    pub fn print(&self) {
        info!("{}", self.message);
        if let Some(structure) = self.structure() {
            if let Ok(json) = serde_json::to_string_pretty(structure) {
                debug!("Command output:\n\n{json}\n\n");
            }
        }
    }
}

impl Out<String> {
    /// For commands whose output is a document, such as a report. The document in `structure`
    /// is written to stdout as-is so that it can be redirected, and the message goes to `info!`.
    pub fn print_document(&self) {
        if let Some(document) = self.structure() {
            print!("{document}");
        }
        info!("{}", self.message);
    }
}

/// `1 expense`, `2 expenses`.
fn plural(count: usize, singular: &str, plural: &str) -> String {
    format!("{count} {}", if count == 1 { singular } else { plural })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_out() {
        let out = Out::new("done", vec![1, 2]);
        assert_eq!(out.message(), "done");
        assert_eq!(out.structure(), Some(&vec![1, 2]));

        let out: Out<()> = "just a message".into();
        assert!(out.structure().is_none());
    }

    #[test]
    fn test_plural() {
        assert_eq!(plural(1, "expense", "expenses"), "1 expense");
        assert_eq!(plural(0, "expense", "expenses"), "0 expenses");
    }
}
