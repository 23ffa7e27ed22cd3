//! Implements the `ExpenseRepository` trait using in-memory data.
//!
//! Note: this is compiled even in the "production" version of this app so that we can run the whole
//! app, top-to-bottom, without an expense backend.

use crate::error::Res;
use crate::model::{Amount, Expense};
use crate::repo::ExpenseRepository;
use anyhow::{anyhow, bail, Context};
use chrono::{Days, NaiveDate};
use std::io::Cursor;
use std::str::FromStr;
use std::sync::Mutex;

/// An implementation of the `ExpenseRepository` trait that holds its expenses in memory. Ids are
/// assigned sequentially starting at 1.
#[derive(Debug, Default)]
pub struct MemoryRepository {
    state: Mutex<State>,
}

#[derive(Debug, Default)]
struct State {
    expenses: Vec<Expense>,
    next_id: i64,
}

impl MemoryRepository {
    /// An empty repository.
    pub fn new() -> Self {
        Self::default()
    }

    /// A repository holding `expenses`. Expenses without an id are given one.
    pub fn with_expenses(expenses: Vec<Expense>) -> Self {
        let mut state = State {
            expenses: Vec::with_capacity(expenses.len()),
            next_id: 1,
        };
        let max_id = expenses.iter().filter_map(|e| e.id()).max().unwrap_or(0);
        state.next_id = max_id + 1;
        for expense in expenses {
            let expense = match expense.id() {
                Some(_) => expense,
                None => {
                    let id = state.next_id;
                    state.next_id += 1;
                    expense.with_id(id)
                }
            };
            state.expenses.push(expense);
        }
        Self {
            state: Mutex::new(state),
        }
    }

    /// A repository seeded with a few weeks of expenses dated relative to `today`.
    pub fn seeded(today: NaiveDate) -> Res<Self> {
        Ok(Self::with_expenses(load_csv(SEED_DATA, today)?))
    }

    fn lock(&self) -> Res<std::sync::MutexGuard<'_, State>> {
        self.state
            .lock()
            .map_err(|_| anyhow!("The in-memory repository lock is poisoned"))
    }
}

#[async_trait::async_trait]
impl ExpenseRepository for MemoryRepository {
    async fn list_all(&self) -> anyhow::Result<Vec<Expense>> {
        Ok(self.lock()?.expenses.clone())
    }

    async fn get(&self, id: i64) -> anyhow::Result<Option<Expense>> {
        Ok(self
            .lock()?
            .expenses
            .iter()
            .find(|e| e.id() == Some(id))
            .cloned())
    }

    async fn create(&self, expense: &Expense) -> anyhow::Result<Expense> {
        let mut state = self.lock()?;
        let id = state.next_id.max(1);
        state.next_id = id + 1;
        let created = expense.clone().with_id(id);
        state.expenses.push(created.clone());
        Ok(created)
    }

    async fn update(&self, id: i64, expense: &Expense) -> anyhow::Result<Expense> {
        let mut state = self.lock()?;
        let Some(existing) = state.expenses.iter_mut().find(|e| e.id() == Some(id)) else {
            bail!("Expense {id} not found");
        };
        *existing = expense.clone().with_id(id);
        Ok(existing.clone())
    }

    async fn delete(&self, id: i64) -> anyhow::Result<()> {
        let mut state = self.lock()?;
        let before = state.expenses.len();
        state.expenses.retain(|e| e.id() != Some(id));
        if state.expenses.len() == before {
            bail!("Expense {id} not found");
        }
        Ok(())
    }
}

/// Loads expenses from CSV rows of `days_ago,title,amount,category,description`.
fn load_csv(csv_data: &str, today: NaiveDate) -> Res<Vec<Expense>> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_reader(Cursor::new(csv_data.as_bytes()));

    let mut expenses = Vec::new();
    for (ix, result) in rdr.records().enumerate() {
        let record = result.with_context(|| format!("Bad seed row {ix}"))?;
        let field = |i: usize| record.get(i).unwrap_or_default().trim();
        let days_ago = u64::from_str(field(0))
            .with_context(|| format!("Bad day offset in seed row {ix}"))?;
        let date = today
            .checked_sub_days(Days::new(days_ago))
            .with_context(|| format!("Seed row {ix} is dated before the calendar starts"))?;
        let amount = Amount::from_str(field(2))
            .map_err(|e| anyhow!("Bad amount in seed row {ix}: {e}"))?;
        let mut expense = Expense::new(field(1), amount, field(3), date);
        if !field(4).is_empty() {
            expense = expense.with_description(field(4));
        }
        expenses.push(expense);
    }
    Ok(expenses)
}

/// Seed expense data.
const SEED_DATA: &str = r##"days_ago,title,amount,category,description
20,Electricity bill,1450.00,Bills,October cycle
18,Groceries,820.40,Food,Weekly vegetables and milk
16,Movie night,600.00,Entertainment,Two tickets and popcorn
15,Metro card recharge,500.00,Transportation,
13,Running shoes,2499.00,Shopping,
12,Lunch with team,380.00,Food,
10,Pharmacy,215.75,Healthcare,Cold medicine
9,Bus fare,40.00,Transportation,
7,Mobile recharge,299.00,Bills,
6,Tea and snacks,60.00,Food,
5,Auto rickshaw,120.00,Transportation,
4,Book,349.00,Education,Rust programming
3,Dinner out,540.00,Food,Birthday dinner
2,Streaming subscription,199.00,Entertainment,
1,Groceries,410.25,Food,
0,Coffee,90.00,Food,
"##;

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::from_str(s).unwrap()
    }

    fn expense(title: &str) -> Expense {
        Expense::new(
            title,
            Amount::from_str("10").unwrap(),
            "Food",
            date("2025-03-01"),
        )
    }

    #[tokio::test]
    async fn test_seeded() {
        let today = date("2025-03-21");
        let repo = MemoryRepository::seeded(today).unwrap();
        let all = repo.list_all().await.unwrap();
        assert_eq!(all.len(), 16);
        assert_eq!(all[0].id(), Some(1));
        assert_eq!(all[0].date(), date("2025-03-01"));
        assert_eq!(all[0].description(), Some("October cycle"));
        assert_eq!(all.last().unwrap().date(), today);
        assert_eq!(all.last().unwrap().description(), None);
    }

    #[tokio::test]
    async fn test_create_assigns_sequential_ids() {
        let repo = MemoryRepository::new();
        let a = repo.create(&expense("a")).await.unwrap();
        let b = repo.create(&expense("b")).await.unwrap();
        assert_eq!(a.id(), Some(1));
        assert_eq!(b.id(), Some(2));
        assert_eq!(repo.get(2).await.unwrap().unwrap().title(), "b");
        assert!(repo.get(3).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_with_expenses_continues_after_max_id() {
        let repo = MemoryRepository::with_expenses(vec![expense("a").with_id(9), expense("b")]);
        let all = repo.list_all().await.unwrap();
        assert_eq!(all[1].id(), Some(10));
        let c = repo.create(&expense("c")).await.unwrap();
        assert_eq!(c.id(), Some(11));
    }

    #[tokio::test]
    async fn test_update_and_delete() {
        let repo = MemoryRepository::new();
        let created = repo.create(&expense("a")).await.unwrap();
        let id = created.id().unwrap();

        let updated = repo.update(id, &expense("renamed")).await.unwrap();
        assert_eq!(updated.id(), Some(id));
        assert_eq!(repo.get(id).await.unwrap().unwrap().title(), "renamed");

        repo.delete(id).await.unwrap();
        assert!(repo.list_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_unknown_id_is_an_error() {
        let repo = MemoryRepository::new();
        assert!(repo.update(5, &expense("x")).await.is_err());
        assert!(repo.delete(5).await.is_err());
    }
}
