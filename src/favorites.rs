//! Saved expense templates ("quick add").

use crate::error::{Error, ErrorType, IntoResult};
use crate::model::{Amount, Expense, Favorite, DEFAULT_EMOJI};
use crate::repo::ExpenseRepository;
use crate::store::{self, Store, FAVORITES};
use crate::Result;
use anyhow::Context;
use chrono::NaiveDate;
use tracing::debug;
use uuid::Uuid;

/// The favorites list in a `Store`.
#[derive(Debug, Clone)]
pub struct Favorites<S> {
    store: S,
}

impl<S> Favorites<S>
where
    S: Store,
{
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// All favorites, in the order they were added.
    pub async fn list(&self) -> Result<Vec<Favorite>> {
        store::load_list(&self.store, FAVORITES)
            .await
            .pub_result(ErrorType::Store)
    }

    /// Saves a new favorite. `emoji` defaults to ⚡ when `None` or blank.
    ///
    /// # Errors
    /// `ErrorType::Validation` if `title` or `category` is blank or `amount` is not positive.
    pub async fn add(
        &self,
        title: &str,
        amount: Amount,
        category: &str,
        emoji: Option<&str>,
    ) -> Result<Favorite> {
        let title = title.trim();
        let category = category.trim();
        if title.is_empty() || category.is_empty() {
            return Err(Error::msg(
                ErrorType::Validation,
                "A favorite needs a title and a category",
            ));
        }
        if !amount.is_positive() {
            return Err(Error::msg(
                ErrorType::Validation,
                format!("A favorite needs a positive amount, got {amount}"),
            ));
        }
        let emoji = emoji
            .map(str::trim)
            .filter(|e| !e.is_empty())
            .unwrap_or(DEFAULT_EMOJI);

        let favorite = Favorite {
            id: Uuid::new_v4().to_string(),
            title: title.to_string(),
            amount,
            category: category.to_string(),
            emoji: emoji.to_string(),
        };
        let mut favorites = self.list().await?;
        favorites.push(favorite.clone());
        store::save_list(&self.store, FAVORITES, &favorites)
            .await
            .pub_result(ErrorType::Store)?;
        debug!("Saved favorite '{}' as {}", favorite.title(), favorite.id());
        Ok(favorite)
    }

    /// Removes the favorite `id`. Returns the removed favorite, or `None` if there was none.
    pub async fn remove(&self, id: &str) -> Result<Option<Favorite>> {
        let mut favorites = self.list().await?;
        let Some(ix) = favorites.iter().position(|f| f.id() == id) else {
            return Ok(None);
        };
        let removed = favorites.remove(ix);
        store::save_list(&self.store, FAVORITES, &favorites)
            .await
            .pub_result(ErrorType::Store)?;
        Ok(Some(removed))
    }

    /// Creates an expense from the favorite `id`, dated `today`.
    ///
    /// # Errors
    /// `ErrorType::Validation` if there is no such favorite or the stored favorite is missing a
    /// title, a category or a positive amount. `ErrorType::Repository` if the expense could not
    /// be created.
    pub async fn quick_add(
        &self,
        id: &str,
        repo: &dyn ExpenseRepository,
        today: NaiveDate,
    ) -> Result<Expense> {
        let favorite = self
            .list()
            .await?
            .into_iter()
            .find(|f| f.id() == id)
            .ok_or_else(|| {
                Error::msg(
                    ErrorType::Validation,
                    format!("There is no favorite with the id '{id}'"),
                )
            })?;
        let expense = Expense::new(
            favorite.title(),
            favorite.amount(),
            favorite.category(),
            today,
        )
        .with_description(favorite.quick_add_description());
        expense
            .validate()
            .with_context(|| format!("The favorite '{id}' is incomplete, please recreate it"))
            .pub_result(ErrorType::Validation)?;
        let created = repo
            .create(&expense)
            .await
            .pub_result(ErrorType::Repository)?;
        debug!("Quick-added '{}' from favorite {id}", created.title());
        Ok(created)
    }
}
