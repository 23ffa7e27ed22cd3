//! Favorites command handlers.

use crate::args::AddFavoriteArgs;
use crate::commands::challenges::{completed_lines, refresh_after_change};
use crate::commands::expenses::ExpenseChange;
use crate::commands::{plural, Out};
use crate::favorites::Favorites;
use crate::model::Favorite;
use crate::repo::ExpenseRepository;
use crate::store::SqliteStore;
use crate::{Config, Result};
use chrono::NaiveDate;
use std::fmt::Write;

fn favorites(config: &Config) -> Favorites<SqliteStore> {
    Favorites::new(config.store().clone())
}

/// Lists saved favorites.
pub async fn list_favorites(config: Config) -> Result<Out<Vec<Favorite>>> {
    let list = favorites(&config).list().await?;
    let mut message = plural(list.len(), "favorite", "favorites");
    for f in &list {
        let _ = write!(
            message,
            "\n  {} {}: {}{} ({}) [{}]",
            f.emoji(),
            f.title(),
            config.currency_symbol(),
            f.amount(),
            f.category(),
            f.id()
        );
    }
    Ok(Out::new(message, list))
}

/// Saves a new favorite.
pub async fn add_favorite(config: Config, args: AddFavoriteArgs) -> Result<Out<Favorite>> {
    let favorite = favorites(&config)
        .add(args.title(), args.amount(), args.category(), args.emoji())
        .await?;
    let message = format!(
        "Saved favorite {} {} with id {}",
        favorite.emoji(),
        favorite.title(),
        favorite.id()
    );
    Ok(Out::new(message, favorite))
}

/// Deletes the favorite `id`. Removing a favorite that does not exist does nothing.
pub async fn remove_favorite(config: Config, id: &str) -> Result<Out<Option<Favorite>>> {
    let removed = favorites(&config).remove(id).await?;
    let message = match &removed {
        Some(f) => format!("Removed favorite {} {}", f.emoji(), f.title()),
        None => format!("There is no favorite with the id '{id}', nothing to remove"),
    };
    Ok(Out::new(message, removed))
}

/// Adds an expense dated `today` from the favorite `id`, then re-evaluates challenges.
pub async fn use_favorite(
    config: Config,
    repo: &dyn ExpenseRepository,
    id: &str,
    today: NaiveDate,
) -> Result<Out<ExpenseChange>> {
    let expense = favorites(&config).quick_add(id, repo, today).await?;
    let completed = refresh_after_change(&config, repo, today).await;
    let message = format!(
        "Added {}: {}{}{}",
        expense.title(),
        config.currency_symbol(),
        expense.amount(),
        completed_lines(&completed)
    );
    Ok(Out::new(message, ExpenseChange { expense, completed }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorType;
    use crate::model::Amount;
    use crate::repo::MemoryRepository;
    use crate::test::{date, TestEnv};
    use std::str::FromStr;

    #[tokio::test]
    async fn test_favorites_flow() {
        let env = TestEnv::new().await;
        let repo = MemoryRepository::new();
        let args = AddFavoriteArgs::new(
            "Coffee",
            Amount::from_str("90").unwrap(),
            "Food",
            Some("☕".to_string()),
        );
        let saved = add_favorite(env.config(), args).await.unwrap();
        let fav = saved.structure().unwrap().clone();

        let out = list_favorites(env.config()).await.unwrap();
        assert!(out.message().starts_with("1 favorite"));
        assert!(out.message().contains("☕ Coffee: ₹90.00 (Food)"));

        let today = date("2025-03-03");
        let out = use_favorite(env.config(), &repo, fav.id(), today)
            .await
            .unwrap();
        let change = out.structure().unwrap();
        assert_eq!(change.expense.date(), today);
        assert_eq!(change.expense.description(), Some("Quick add: ☕ Coffee"));
        assert_eq!(repo.list_all().await.unwrap().len(), 1);

        let out = remove_favorite(env.config(), fav.id()).await.unwrap();
        assert!(out.structure().unwrap().is_some());
        let out = remove_favorite(env.config(), fav.id()).await.unwrap();
        assert!(out.structure().unwrap().is_none());
    }

    #[tokio::test]
    async fn test_use_missing_favorite() {
        let env = TestEnv::new().await;
        let err = use_favorite(
            env.config(),
            &MemoryRepository::new(),
            "missing",
            date("2025-03-03"),
        )
        .await
        .unwrap_err();
        assert_eq!(err.error_type(), ErrorType::Validation);
    }
}
