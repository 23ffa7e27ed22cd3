//! Challenge command handlers.

use crate::commands::{plural, Out};
use crate::engine::{ChallengeEngine, Evaluation};
use crate::error::{ErrorType, IntoResult};
use crate::model::{ActiveChallenge, ChallengeDefinition, CompletedChallenge};
use crate::repo::ExpenseRepository;
use crate::store::SqliteStore;
use crate::{Config, Result};
use anyhow::Context;
use chrono::NaiveDate;
use serde::Serialize;
use std::fmt::Write;
use tracing::warn;

/// The state of all challenges, as shown by `spend challenges list`.
#[derive(Debug, Clone, Serialize)]
pub struct ChallengeBoard {
    pub active: Vec<ActiveChallenge>,
    pub available: Vec<ChallengeDefinition>,
    pub total_points: u64,
}

/// Completed challenges and their points, as shown by `spend challenges points`.
#[derive(Debug, Clone, Serialize)]
pub struct PointsSummary {
    pub completed: Vec<CompletedChallenge>,
    pub total_points: u64,
}

pub(crate) fn engine(config: &Config) -> ChallengeEngine<SqliteStore> {
    ChallengeEngine::new(config.store().clone())
}

/// Fetches the expense snapshot and evaluates the active challenges against it.
pub(crate) async fn refresh(
    engine: &ChallengeEngine<SqliteStore>,
    repo: &dyn ExpenseRepository,
    today: NaiveDate,
) -> Result<Evaluation> {
    let expenses = repo
        .list_all()
        .await
        .context("Unable to fetch expenses to evaluate challenges")
        .pub_result(ErrorType::Repository)?;
    engine.refresh(&expenses, today).await
}

/// Re-evaluates challenges after something changed. The change itself has already happened, so
/// a failure here is logged and not returned.
pub(crate) async fn refresh_after_change(
    config: &Config,
    repo: &dyn ExpenseRepository,
    today: NaiveDate,
) -> Vec<CompletedChallenge> {
    match refresh(&engine(config), repo, today).await {
        Ok(evaluation) => evaluation.completed,
        Err(e) => {
            warn!("Unable to re-evaluate challenges: {e}");
            Vec::new()
        }
    }
}

/// One line per newly completed challenge, or an empty string.
pub(crate) fn completed_lines(completed: &[CompletedChallenge]) -> String {
    let mut text = String::new();
    for c in completed {
        let def = c.definition();
        let _ = write!(
            text,
            "\n🏆 Challenge completed: {} {} (+{} points)",
            def.badge(),
            def.title(),
            def.points()
        );
    }
    text
}

fn active_line(c: &ActiveChallenge) -> String {
    let def = c.definition();
    let mut line = format!(
        "  {} {} [{}]: day {} of {} ({:.0}%)",
        def.badge(),
        def.title(),
        def.id(),
        c.days_elapsed(),
        def.duration_days(),
        c.progress() * 100.0
    );
    if c.failed() {
        let _ = write!(line, " ⚠ you spent on {}", def.target_category());
    }
    line
}

fn available_line(def: &ChallengeDefinition) -> String {
    format!(
        "  {} {} [{}]: {} ({}, {} points)",
        def.badge(),
        def.title(),
        def.id(),
        def.description(),
        plural(def.duration_days() as usize, "day", "days"),
        def.points()
    )
}

/// Shows the active challenges, the challenges that can be started and the total points.
///
/// The active challenges are re-evaluated first. If the expenses cannot be fetched, the last
/// stored state is shown instead.
pub async fn list_challenges(
    config: Config,
    repo: &dyn ExpenseRepository,
    today: NaiveDate,
) -> Result<Out<ChallengeBoard>> {
    let completed = refresh_after_change(&config, repo, today).await;
    let engine = engine(&config);
    let board = ChallengeBoard {
        active: engine.active().await?,
        available: engine.available_definitions().await?,
        total_points: engine.total_points().await?,
    };

    let mut message = String::from("Active challenges:");
    if board.active.is_empty() {
        message.push_str("\n  none");
    }
    for c in &board.active {
        let _ = write!(message, "\n{}", active_line(c));
    }
    message.push_str("\nAvailable challenges:");
    if board.available.is_empty() {
        message.push_str("\n  none");
    }
    for def in &board.available {
        let _ = write!(message, "\n{}", available_line(def));
    }
    let _ = write!(message, "\nTotal points: {}", board.total_points);
    message.push_str(&completed_lines(&completed));
    Ok(Out::new(message, board))
}

/// Starts the catalog challenge `id` today, then re-evaluates all challenges.
///
/// # Errors
/// - `ErrorType::AlreadyActive` if the challenge is already running
/// - `ErrorType::UnknownChallenge` if there is no such challenge
pub async fn start_challenge(
    config: Config,
    repo: &dyn ExpenseRepository,
    id: &str,
    today: NaiveDate,
) -> Result<Out<ActiveChallenge>> {
    let started = engine(&config).start_challenge(id, today).await?;
    let completed = refresh_after_change(&config, repo, today).await;
    let def = started.definition();
    let message = format!(
        "Started {} {}: {} for {}{}",
        def.badge(),
        def.title(),
        def.description(),
        plural(def.duration_days() as usize, "day", "days"),
        completed_lines(&completed)
    );
    Ok(Out::new(message, started))
}

/// Stops the active challenge `id` without earning its points. Cancelling a challenge that is
/// not active does nothing.
pub async fn cancel_challenge(
    config: Config,
    repo: &dyn ExpenseRepository,
    id: &str,
    today: NaiveDate,
) -> Result<Out<Option<ActiveChallenge>>> {
    let removed = engine(&config).cancel_challenge(id).await?;
    let completed = refresh_after_change(&config, repo, today).await;
    let message = match &removed {
        Some(c) => format!("Cancelled {}", c.definition().title()),
        None => format!("The challenge '{id}' is not active, nothing to cancel"),
    };
    Ok(Out::new(
        format!("{message}{}", completed_lines(&completed)),
        removed,
    ))
}

/// Evaluates the active challenges against the current expenses and reports the outcome.
///
/// # Errors
/// `ErrorType::Repository` if the expenses cannot be fetched.
pub async fn check_challenges(
    config: Config,
    repo: &dyn ExpenseRepository,
    today: NaiveDate,
) -> Result<Out<Evaluation>> {
    let engine = engine(&config);
    let before = engine.active().await?;
    let evaluation = refresh(&engine, repo, today).await?;

    let closed = before.len().saturating_sub(evaluation.active.len());
    let dropped = closed.saturating_sub(evaluation.completed.len());
    let mut message = format!(
        "Checked challenges: {} still running",
        plural(evaluation.active.len(), "challenge", "challenges")
    );
    if dropped > 0 {
        let _ = write!(
            message,
            ", {} ended without success",
            plural(dropped, "challenge", "challenges")
        );
    }
    message.push_str(&completed_lines(&evaluation.completed));
    Ok(Out::new(message, evaluation))
}

/// Lists completed challenges and the total points earned.
pub async fn points(config: Config) -> Result<Out<PointsSummary>> {
    let engine = engine(&config);
    let completed = engine.completed().await?;
    let total_points = engine.total_points().await?;

    let mut message = format!(
        "Total points: {total_points} from {}",
        plural(completed.len(), "completed challenge", "completed challenges")
    );
    for c in &completed {
        let _ = write!(
            message,
            "\n  {} {} on {} (+{})",
            c.definition().badge(),
            c.definition().title(),
            c.completed_date(),
            c.points()
        );
    }
    Ok(Out::new(
        message,
        PointsSummary {
            completed,
            total_points,
        },
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repo::MemoryRepository;
    use crate::test::{date, expense, repo_with, DownRepository, TestEnv};

    #[tokio::test]
    async fn test_start_and_list() {
        let env = TestEnv::new().await;
        let repo = MemoryRepository::new();
        let today = date("2025-03-01");

        let out = start_challenge(env.config(), &repo, "no-eating-out-7", today)
            .await
            .unwrap();
        assert!(out.message().contains("Started 🍽️ No Eating Out"));
        assert_eq!(out.structure().unwrap().start_date(), today);

        let out = list_challenges(env.config(), &repo, date("2025-03-03"))
            .await
            .unwrap();
        let board = out.structure().unwrap();
        assert_eq!(board.active.len(), 1);
        assert_eq!(board.active[0].days_elapsed(), 2);
        assert_eq!(board.available.len(), 3);
        assert_eq!(board.total_points, 0);
        assert!(out.message().contains("day 2 of 7"));
    }

    #[tokio::test]
    async fn test_start_twice_is_already_active() {
        let env = TestEnv::new().await;
        let repo = MemoryRepository::new();
        let today = date("2025-03-01");
        start_challenge(env.config(), &repo, "budget-saver", today)
            .await
            .unwrap();
        let err = start_challenge(env.config(), &repo, "budget-saver", today)
            .await
            .unwrap_err();
        assert_eq!(err.error_type(), ErrorType::AlreadyActive);
    }

    #[tokio::test]
    async fn test_start_unknown() {
        let env = TestEnv::new().await;
        let err = start_challenge(env.config(), &MemoryRepository::new(), "nope", date("2025-03-01"))
            .await
            .unwrap_err();
        assert_eq!(err.error_type(), ErrorType::UnknownChallenge);
    }

    #[tokio::test]
    async fn test_start_survives_backend_outage() {
        let env = TestEnv::new().await;
        let out = start_challenge(env.config(), &DownRepository, "no-shopping-14", date("2025-03-01"))
            .await
            .unwrap();
        assert_eq!(out.structure().unwrap().id(), "no-shopping-14");
        assert_eq!(engine(&env.config()).active().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_check_requires_backend() {
        let env = TestEnv::new().await;
        let err = check_challenges(env.config(), &DownRepository, date("2025-03-01"))
            .await
            .unwrap_err();
        assert_eq!(err.error_type(), ErrorType::Repository);
    }

    #[tokio::test]
    async fn test_check_completes_and_drops() {
        let env = TestEnv::new().await;
        let start = date("2025-03-01");
        let empty = MemoryRepository::new();
        start_challenge(env.config(), &empty, "no-eating-out-7", start)
            .await
            .unwrap();
        start_challenge(env.config(), &empty, "no-entertainment-7", start)
            .await
            .unwrap();

        let repo = repo_with(vec![expense("Movie", "300", "Entertainment", "2025-03-04")]);
        let out = check_challenges(env.config(), &repo, date("2025-03-08"))
            .await
            .unwrap();
        let evaluation = out.structure().unwrap();
        assert!(evaluation.active.is_empty());
        assert_eq!(evaluation.completed.len(), 1);
        assert!(out.message().contains("1 challenge ended without success"));
        assert!(out.message().contains("Challenge completed: 🍽️ No Eating Out (+100 points)"));

        let out = points(env.config()).await.unwrap();
        assert_eq!(out.structure().unwrap().total_points, 100);
        assert!(out.message().contains("on 2025-03-08"));
    }

    #[tokio::test]
    async fn test_cancel() {
        let env = TestEnv::new().await;
        let repo = MemoryRepository::new();
        let today = date("2025-03-01");
        start_challenge(env.config(), &repo, "no-shopping-14", today)
            .await
            .unwrap();

        let out = cancel_challenge(env.config(), &repo, "no-eating-out-7", today)
            .await
            .unwrap();
        assert!(out.structure().unwrap().is_none());
        assert!(out.message().contains("nothing to cancel"));

        let out = cancel_challenge(env.config(), &repo, "no-shopping-14", today)
            .await
            .unwrap();
        assert_eq!(out.structure().unwrap().as_ref().unwrap().id(), "no-shopping-14");
        assert!(engine(&env.config()).active().await.unwrap().is_empty());
        assert_eq!(points(env.config()).await.unwrap().structure().unwrap().total_points, 0);
    }
}
