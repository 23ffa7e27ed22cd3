//! Expense command handlers. Every change to an expense re-evaluates the active challenges.

use crate::args::{AddExpenseArgs, UpdateExpenseArgs};
use crate::commands::challenges::{completed_lines, refresh_after_change};
use crate::commands::{plural, Out};
use crate::error::{Error, ErrorType, IntoResult};
use crate::model::{CompletedChallenge, Expense};
use crate::repo::ExpenseRepository;
use crate::{report, Config, Result};
use anyhow::Context;
use chrono::NaiveDate;
use serde::Serialize;
use std::fmt::Write;

/// The result of changing an expense: the expense as stored and any challenges that completed
/// when they were re-evaluated.
#[derive(Debug, Clone, Serialize)]
pub struct ExpenseChange {
    pub expense: Expense,
    pub completed: Vec<CompletedChallenge>,
}

fn expense_line(expense: &Expense, currency: &str) -> String {
    let mut line = format!(
        "  [{}] {} {}: {}{} ({})",
        expense
            .id()
            .map(|id| id.to_string())
            .unwrap_or_else(|| "-".to_string()),
        expense.date(),
        expense.title(),
        currency,
        expense.amount(),
        expense.category()
    );
    if let Some(note) = expense.description().filter(|d| !d.is_empty()) {
        let _ = write!(line, " - {note}");
    }
    line
}

/// Lists all expenses, most recent first, under their total.
pub async fn list_expenses(
    config: Config,
    repo: &dyn ExpenseRepository,
) -> Result<Out<Vec<Expense>>> {
    let mut expenses = repo
        .list_all()
        .await
        .context("Unable to fetch expenses")
        .pub_result(ErrorType::Repository)?;
    expenses.sort_by(|a, b| b.date().cmp(&a.date()).then(b.id().cmp(&a.id())));
    let all: Vec<&Expense> = expenses.iter().collect();
    let total = report::total(&all).pub_result(ErrorType::Repository)?;

    let mut message = format!(
        "Total: {}{total}\n{}",
        config.currency_symbol(),
        plural(expenses.len(), "expense", "expenses")
    );
    for expense in &expenses {
        let _ = write!(
            message,
            "\n{}",
            expense_line(expense, config.currency_symbol())
        );
    }
    Ok(Out::new(message, expenses))
}

/// Records a new expense, dated `today` unless the args give a date.
///
/// # Errors
/// - `ErrorType::Validation` if the title or category is blank or the amount is not positive
/// - `ErrorType::Repository` if the backend rejects the expense
pub async fn add_expense(
    config: Config,
    repo: &dyn ExpenseRepository,
    args: AddExpenseArgs,
    today: NaiveDate,
) -> Result<Out<ExpenseChange>> {
    let mut expense = Expense::new(
        args.title().trim(),
        args.amount(),
        args.category().trim(),
        args.date().unwrap_or(today),
    );
    if let Some(description) = args.description() {
        expense = expense.with_description(description);
    }
    expense.validate().pub_result(ErrorType::Validation)?;

    let created = repo
        .create(&expense)
        .await
        .context("Unable to create the expense")
        .pub_result(ErrorType::Repository)?;
    let completed = refresh_after_change(&config, repo, today).await;
    let message = format!(
        "Added expense:\n{}{}",
        expense_line(&created, config.currency_symbol()),
        completed_lines(&completed)
    );
    Ok(Out::new(
        message,
        ExpenseChange {
            expense: created,
            completed,
        },
    ))
}

/// Changes the given fields of the expense `args.id()`.
///
/// # Errors
/// - `ErrorType::Validation` if no fields are given, there is no such expense, or the updated
///   expense is invalid
/// - `ErrorType::Repository` if the backend cannot be reached or rejects the update
pub async fn update_expense(
    config: Config,
    repo: &dyn ExpenseRepository,
    args: UpdateExpenseArgs,
    today: NaiveDate,
) -> Result<Out<ExpenseChange>> {
    let id = args.id();
    let updates = args.updates();
    if updates.is_empty() {
        return Err(Error::msg(
            ErrorType::Validation,
            "Nothing to update, give at least one field to change",
        ));
    }
    let existing = repo
        .get(id)
        .await
        .with_context(|| format!("Unable to fetch expense {id}"))
        .pub_result(ErrorType::Repository)?
        .ok_or_else(|| {
            Error::msg(
                ErrorType::Validation,
                format!("There is no expense with the id {id}"),
            )
        })?;
    let updated = updates.apply(&existing);
    updated.validate().pub_result(ErrorType::Validation)?;

    let stored = repo
        .update(id, &updated)
        .await
        .with_context(|| format!("Unable to update expense {id}"))
        .pub_result(ErrorType::Repository)?;
    let completed = refresh_after_change(&config, repo, today).await;
    let message = format!(
        "Updated expense:\n{}{}",
        expense_line(&stored, config.currency_symbol()),
        completed_lines(&completed)
    );
    Ok(Out::new(
        message,
        ExpenseChange {
            expense: stored,
            completed,
        },
    ))
}

/// Deletes the expense `id`.
pub async fn delete_expense(
    config: Config,
    repo: &dyn ExpenseRepository,
    id: i64,
    today: NaiveDate,
) -> Result<Out<Vec<CompletedChallenge>>> {
    repo.delete(id)
        .await
        .with_context(|| format!("Unable to delete expense {id}"))
        .pub_result(ErrorType::Repository)?;
    let completed = refresh_after_change(&config, repo, today).await;
    Ok(Out::new(
        format!("Deleted expense {id}{}", completed_lines(&completed)),
        completed,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::start_challenge;
    use crate::model::{Amount, ExpenseUpdates};
    use crate::repo::MemoryRepository;
    use crate::test::{date, expense, repo_with, TestEnv};
    use std::str::FromStr;

    fn amount(s: &str) -> Amount {
        Amount::from_str(s).unwrap()
    }

    #[tokio::test]
    async fn test_list_most_recent_first() {
        let env = TestEnv::new().await;
        let repo = repo_with(vec![
            expense("Old", "10", "Food", "2025-01-01"),
            expense("New", "20", "Bills", "2025-02-01").with_description("phone"),
        ]);
        let out = list_expenses(env.config(), &repo).await.unwrap();
        let listed = out.structure().unwrap();
        assert_eq!(listed[0].title(), "New");
        assert!(out.message().starts_with("Total: ₹30.00\n2 expenses"));
        assert!(out
            .message()
            .contains("[2] 2025-02-01 New: ₹20.00 (Bills) - phone"));
    }

    #[tokio::test]
    async fn test_list_total_too_large() {
        let env = TestEnv::new().await;
        let repo = repo_with(vec![
            expense("A", "50000000000000000000000000000", "Food", "2025-01-01"),
            expense("B", "50000000000000000000000000000", "Food", "2025-01-02"),
        ]);
        let err = list_expenses(env.config(), &repo).await.unwrap_err();
        assert_eq!(err.error_type(), ErrorType::Repository);
    }

    #[tokio::test]
    async fn test_add_rejects_zero_amount() {
        let env = TestEnv::new().await;
        let repo = MemoryRepository::new();
        let args = AddExpenseArgs::new("Tea", amount("0"), "Food", None, None);
        let err = add_expense(env.config(), &repo, args, date("2025-03-05"))
            .await
            .unwrap_err();
        assert_eq!(err.error_type(), ErrorType::Validation);
        assert!(err.to_string().contains("greater than 0"), "{err}");
        assert!(repo.list_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_add_defaults_to_today() {
        let env = TestEnv::new().await;
        let repo = MemoryRepository::new();
        let today = date("2025-03-05");
        let args = AddExpenseArgs::new("Lunch", amount("250"), " Food ", None, None);
        let out = add_expense(env.config(), &repo, args, today).await.unwrap();
        let change = out.structure().unwrap();
        assert_eq!(change.expense.id(), Some(1));
        assert_eq!(change.expense.date(), today);
        assert_eq!(change.expense.category(), "Food");
        assert!(change.completed.is_empty());
    }

    #[tokio::test]
    async fn test_add_rejects_invalid() {
        let env = TestEnv::new().await;
        let repo = MemoryRepository::new();
        let args = AddExpenseArgs::new("", amount("250"), "Food", None, None);
        let err = add_expense(env.config(), &repo, args, date("2025-03-05"))
            .await
            .unwrap_err();
        assert_eq!(err.error_type(), ErrorType::Validation);
        assert!(repo.list_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_add_reevaluates_challenges() {
        let env = TestEnv::new().await;
        let repo = MemoryRepository::new();
        let start = date("2025-03-01");
        start_challenge(env.config(), &repo, "no-eating-out-7", start)
            .await
            .unwrap();

        // Recording a bus ticket a week later closes the challenge successfully.
        let args = AddExpenseArgs::new("Bus", amount("40"), "Transportation", None, None);
        let out = add_expense(env.config(), &repo, args, date("2025-03-08"))
            .await
            .unwrap();
        let change = out.structure().unwrap();
        assert_eq!(change.completed.len(), 1);
        assert!(out.message().contains("🏆"));
    }

    #[tokio::test]
    async fn test_update() {
        let env = TestEnv::new().await;
        let repo = repo_with(vec![expense("Tea", "20", "Food", "2025-03-01")]);
        let args = UpdateExpenseArgs::new(
            1,
            ExpenseUpdates {
                amount: Some(amount("25")),
                ..Default::default()
            },
        );
        let out = update_expense(env.config(), &repo, args, date("2025-03-02"))
            .await
            .unwrap();
        assert_eq!(out.structure().unwrap().expense.amount(), amount("25"));
        assert_eq!(repo.get(1).await.unwrap().unwrap().title(), "Tea");
    }

    #[tokio::test]
    async fn test_update_errors() {
        let env = TestEnv::new().await;
        let repo = repo_with(vec![expense("Tea", "20", "Food", "2025-03-01")]);
        let today = date("2025-03-02");

        let nothing = UpdateExpenseArgs::new(1, ExpenseUpdates::default());
        let err = update_expense(env.config(), &repo, nothing, today)
            .await
            .unwrap_err();
        assert_eq!(err.error_type(), ErrorType::Validation);

        let missing = UpdateExpenseArgs::new(
            9,
            ExpenseUpdates {
                title: Some("x".to_string()),
                ..Default::default()
            },
        );
        let err = update_expense(env.config(), &repo, missing, today)
            .await
            .unwrap_err();
        assert_eq!(err.error_type(), ErrorType::Validation);
    }

    #[tokio::test]
    async fn test_delete() {
        let env = TestEnv::new().await;
        let repo = repo_with(vec![expense("Tea", "20", "Food", "2025-03-01")]);
        let today = date("2025-03-02");
        let out = delete_expense(env.config(), &repo, 1, today).await.unwrap();
        assert_eq!(out.message(), "Deleted expense 1");
        assert!(repo.list_all().await.unwrap().is_empty());

        let err = delete_expense(env.config(), &repo, 1, today)
            .await
            .unwrap_err();
        assert_eq!(err.error_type(), ErrorType::Repository);
    }
}
