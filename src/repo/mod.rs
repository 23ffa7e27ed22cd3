//! Access to the expense backend.
//!
//! The `ExpenseRepository` trait is the seam between the application and wherever expenses are
//! kept. `HttpRepository` talks to the REST backend. `MemoryRepository` holds seeded data in
//! memory so that the whole program can be run without a backend.

mod http;
mod memory;

use crate::error::{ErrorType, IntoResult};
use crate::model::Expense;
use crate::{Config, Result};
use chrono::NaiveDate;

pub use http::HttpRepository;
pub use memory::MemoryRepository;

/// The environment variable that selects `Mode::Test` when set to a non-empty value.
pub const TEST_MODE_ENV: &str = "SPEND_IN_TEST_MODE";

/// CRUD access to expenses.
#[async_trait::async_trait]
pub trait ExpenseRepository: Send + Sync {
    /// Returns every expense.
    async fn list_all(&self) -> anyhow::Result<Vec<Expense>>;

    /// Returns the expense with `id`, or `None` if there is none.
    async fn get(&self, id: i64) -> anyhow::Result<Option<Expense>>;

    /// Stores a new expense and returns it with its assigned id.
    async fn create(&self, expense: &Expense) -> anyhow::Result<Expense>;

    /// Replaces the expense with `id`. It is an error if no such expense exists.
    async fn update(&self, id: i64, expense: &Expense) -> anyhow::Result<Expense>;

    /// Deletes the expense with `id`. It is an error if no such expense exists.
    async fn delete(&self, id: i64) -> anyhow::Result<()>;
}

/// Whether to use the real backend or in-memory test data.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    #[default]
    Http,
    Test,
}

impl Mode {
    /// `Mode::Test` if `SPEND_IN_TEST_MODE` is set and non-empty, otherwise `Mode::Http`.
    pub fn from_env() -> Self {
        match std::env::var(TEST_MODE_ENV) {
            Ok(value) if !value.is_empty() => Mode::Test,
            _ => Mode::Http,
        }
    }
}

/// Creates the repository for `mode`. In `Mode::Test` the data is seeded relative to `today`.
pub fn repository(
    config: &Config,
    mode: Mode,
    today: NaiveDate,
) -> Result<Box<dyn ExpenseRepository>> {
    let repo: Box<dyn ExpenseRepository> = match mode {
        Mode::Http => Box::new(
            HttpRepository::new(config.api_url().clone()).pub_result(ErrorType::Repository)?,
        ),
        Mode::Test => {
            Box::new(MemoryRepository::seeded(today).pub_result(ErrorType::Repository)?)
        }
    };
    Ok(repo)
}
