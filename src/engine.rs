//! The challenge engine.
//!
//! `evaluate` is a pure function: it takes an expense snapshot, the active challenges and the
//! current date and decides which challenges keep running, which have been won and which have
//! been lost. `ChallengeEngine` wraps it with the persisted active and completed lists.

use crate::error::{Error, ErrorType, IntoResult};
use crate::model::{
    catalog, ActiveChallenge, ChallengeDefinition, ChallengeKind, CompletedChallenge, Expense,
};
use crate::store::{self, Store, ACTIVE_CHALLENGES, COMPLETED_CHALLENGES};
use crate::Result;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::{debug, info, trace};

/// A daily budget challenge fails if any single day's total is above this.
pub const DAILY_BUDGET_LIMIT: i64 = 500;

/// The outcome of one evaluation pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Evaluation {
    /// Challenges that are still running, with `days_elapsed` and `failed` refreshed.
    pub active: Vec<ActiveChallenge>,
    /// Challenges whose window closed during this pass and which were won.
    pub completed: Vec<CompletedChallenge>,
}

/// Evaluates every active challenge against `expenses` as of `today`.
///
/// A challenge whose window has closed never appears in the returned active list. It appears in
/// `completed` if it was won and is dropped otherwise. For a running challenge, `failed` is only a
/// display flag: a category abstinence challenge with a matching expense keeps running until its
/// window closes, and a daily budget challenge is never flagged while running.
pub fn evaluate(expenses: &[Expense], active: &[ActiveChallenge], today: NaiveDate) -> Evaluation {
    let mut evaluation = Evaluation::default();
    for challenge in active {
        let days_elapsed = days_between(challenge.start_date(), today);
        let window = window(expenses, challenge.start_date(), today);
        let definition = challenge.definition();

        if days_elapsed < definition.duration_days() {
            let failed = match definition.kind() {
                ChallengeKind::CategoryAbstinence => has_category_expense(definition, &window),
                ChallengeKind::DailyBudget => false,
            };
            evaluation.active.push(ActiveChallenge {
                days_elapsed,
                failed,
                ..challenge.clone()
            });
            continue;
        }

        let won = match definition.kind() {
            ChallengeKind::CategoryAbstinence => !has_category_expense(definition, &window),
            ChallengeKind::DailyBudget => within_daily_budget(&window),
        };
        debug!(
            "Challenge '{}' closed after {days_elapsed} days: {}",
            challenge.id(),
            if won { "won" } else { "lost" }
        );
        if won {
            evaluation
                .completed
                .push(CompletedChallenge::new(definition.clone(), today));
        }
    }
    evaluation
}

/// Whole days from `start` to `today`, clamped to zero when `start` is in the future.
fn days_between(start: NaiveDate, today: NaiveDate) -> u32 {
    let days = (today - start).num_days().max(0);
    u32::try_from(days).unwrap_or(u32::MAX)
}

/// Expenses dated within `[start, today]`, both ends inclusive.
fn window(expenses: &[Expense], start: NaiveDate, today: NaiveDate) -> Vec<&Expense> {
    expenses
        .iter()
        .filter(|e| e.date() >= start && e.date() <= today)
        .collect()
}

fn has_category_expense(definition: &ChallengeDefinition, window: &[&Expense]) -> bool {
    window
        .iter()
        .any(|e| definition.target_category().matches(e.category()))
}

/// Per-date totals. Dates without expenses are absent. A total too large for a `Decimal` is
/// `None`.
fn daily_totals(window: &[&Expense]) -> BTreeMap<NaiveDate, Option<Decimal>> {
    let mut totals = BTreeMap::new();
    for expense in window {
        let total = totals.entry(expense.date()).or_insert(Some(Decimal::ZERO));
        *total = total.and_then(|t| t.checked_add(expense.amount().value()));
    }
    totals
}

/// A day whose total overflowed is over the limit.
fn within_daily_budget(window: &[&Expense]) -> bool {
    let limit = Decimal::from(DAILY_BUDGET_LIMIT);
    daily_totals(window)
        .values()
        .all(|total| matches!(total, Some(t) if *t <= limit))
}

/// Owns the active and completed challenge lists in a `Store`.
#[derive(Debug, Clone)]
pub struct ChallengeEngine<S> {
    store: S,
    catalog: Vec<ChallengeDefinition>,
}

impl<S> ChallengeEngine<S>
where
    S: Store,
{
    /// Creates an engine using the built-in challenge catalog.
    pub fn new(store: S) -> Self {
        Self::with_catalog(store, catalog())
    }

    pub fn with_catalog(store: S, catalog: Vec<ChallengeDefinition>) -> Self {
        Self { store, catalog }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn catalog(&self) -> &[ChallengeDefinition] {
        &self.catalog
    }

    /// The persisted active challenges, as of the last write.
    pub async fn active(&self) -> Result<Vec<ActiveChallenge>> {
        store::load_list(&self.store, ACTIVE_CHALLENGES)
            .await
            .pub_result(ErrorType::Store)
    }

    /// The persisted completed challenges, oldest first.
    pub async fn completed(&self) -> Result<Vec<CompletedChallenge>> {
        store::load_list(&self.store, COMPLETED_CHALLENGES)
            .await
            .pub_result(ErrorType::Store)
    }

    /// Runs `evaluate` against the persisted active list and writes the result back.
    ///
    /// Nothing is written when the new active list equals the stored one. Otherwise the new
    /// active list is written, then the newly completed challenges are appended to the completed
    /// list. Returns the evaluation, whose `completed` field holds only the newly completed
    /// challenges.
    pub async fn refresh(&self, expenses: &[Expense], today: NaiveDate) -> Result<Evaluation> {
        let active = self.active().await?;
        trace!(
            "Evaluating {} active challenges against {} expenses as of {today}",
            active.len(),
            expenses.len()
        );
        let evaluation = evaluate(expenses, &active, today);
        if evaluation.active == active {
            debug!("Active challenges unchanged, nothing to write");
            return Ok(evaluation);
        }

        // The active list goes first. A closed challenge must never be evaluated twice, even if
        // the completed list cannot be written.
        store::save_list(&self.store, ACTIVE_CHALLENGES, &evaluation.active)
            .await
            .pub_result(ErrorType::Store)?;
        if !evaluation.completed.is_empty() {
            let mut completed = self.completed().await?;
            completed.extend(evaluation.completed.iter().cloned());
            store::save_list(&self.store, COMPLETED_CHALLENGES, &completed)
                .await
                .pub_result(ErrorType::Store)?;
            for c in &evaluation.completed {
                info!(
                    "Completed challenge '{}' for {} points",
                    c.definition().title(),
                    c.points()
                );
            }
        }
        Ok(evaluation)
    }

    /// Starts the catalog challenge `definition_id` as of `today`.
    ///
    /// # Errors
    /// - `ErrorType::AlreadyActive` if the challenge is already running. Nothing is written.
    /// - `ErrorType::UnknownChallenge` if the catalog has no such challenge.
    pub async fn start_challenge(
        &self,
        definition_id: &str,
        today: NaiveDate,
    ) -> Result<ActiveChallenge> {
        let mut active = self.active().await?;
        if active.iter().any(|c| c.id() == definition_id) {
            return Err(Error::msg(
                ErrorType::AlreadyActive,
                format!("The challenge '{definition_id}' is already active"),
            ));
        }
        let definition = self
            .catalog
            .iter()
            .find(|d| d.id() == definition_id)
            .cloned()
            .ok_or_else(|| {
                Error::msg(
                    ErrorType::UnknownChallenge,
                    format!("There is no challenge with the id '{definition_id}'"),
                )
            })?;

        let started = ActiveChallenge::start(definition, today);
        active.push(started.clone());
        store::save_list(&self.store, ACTIVE_CHALLENGES, &active)
            .await
            .pub_result(ErrorType::Store)?;
        debug!("Started challenge '{definition_id}' on {today}");
        Ok(started)
    }

    /// Removes the active challenge `id`. Returns the removed challenge, or `None` if no such
    /// challenge was active, which is not an error.
    pub async fn cancel_challenge(&self, id: &str) -> Result<Option<ActiveChallenge>> {
        let mut active = self.active().await?;
        let removed = active
            .iter()
            .position(|c| c.id() == id)
            .map(|ix| active.remove(ix));
        store::save_list(&self.store, ACTIVE_CHALLENGES, &active)
            .await
            .pub_result(ErrorType::Store)?;
        debug!(
            "Cancel '{id}': {}",
            if removed.is_some() {
                "removed"
            } else {
                "was not active"
            }
        );
        Ok(removed)
    }

    /// The sum of points over all completed challenges.
    pub async fn total_points(&self) -> Result<u64> {
        Ok(self
            .completed()
            .await?
            .iter()
            .map(|c| u64::from(c.points()))
            .sum())
    }

    /// The catalog minus the challenges that are currently active. A challenge that has been
    /// completed before can be started again.
    pub async fn available_definitions(&self) -> Result<Vec<ChallengeDefinition>> {
        let active = self.active().await?;
        Ok(self
            .catalog
            .iter()
            .filter(|d| !active.iter().any(|a| a.id() == d.id()))
            .cloned()
            .collect())
    }
}
