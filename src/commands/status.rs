//! Checks the connection to the expense backend.

use crate::commands::{plural, Out};
use crate::error::{ErrorType, IntoResult};
use crate::repo::{ExpenseRepository, Mode};
use crate::{Config, Result};
use anyhow::Context;

/// Fetches every expense from `repo` to prove that the backend is reachable. The structure is the
/// number of expenses found.
///
/// # Errors
/// `ErrorType::Repository` if the backend cannot be reached or answers with an error.
pub async fn status(
    config: Config,
    repo: &dyn ExpenseRepository,
    mode: Mode,
) -> Result<Out<usize>> {
    let source = match mode {
        Mode::Http => config.api_url().to_string(),
        Mode::Test => "in-memory test data".to_string(),
    };
    let count = repo
        .list_all()
        .await
        .with_context(|| {
            format!("Cannot connect to the expense backend at {source}, make sure it is running")
        })
        .pub_result(ErrorType::Repository)?
        .len();
    Ok(Out::new(
        format!(
            "✅ Connected to {source}! Found {}.",
            plural(count, "expense", "expenses")
        ),
        count,
    ))
}
