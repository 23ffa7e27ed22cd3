use crate::model::Amount;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A single expense as stored by the expense backend.
///
/// The JSON shape matches the backend's `/api/expenses` resource:
/// `{"id": 1, "title": "Lunch", "amount": 250.0, "category": "Food", "date": "2025-03-01",
/// "description": "..."}`. The `id` is absent until the backend has assigned one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Expense {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(crate) id: Option<i64>,
    pub(crate) title: String,
    pub(crate) amount: Amount,
    pub(crate) category: String,
    pub(crate) date: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(crate) description: Option<String>,
}

impl Expense {
    pub fn new(
        title: impl Into<String>,
        amount: Amount,
        category: impl Into<String>,
        date: NaiveDate,
    ) -> Self {
        Self {
            id: None,
            title: title.into(),
            amount,
            category: category.into(),
            date,
            description: None,
        }
    }

    pub fn with_id(mut self, id: i64) -> Self {
        self.id = Some(id);
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn id(&self) -> Option<i64> {
        self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn amount(&self) -> Amount {
        self.amount
    }

    pub fn category(&self) -> &str {
        &self.category
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Checks the fields the backend requires before an expense is sent to it.
    pub fn validate(&self) -> anyhow::Result<()> {
        anyhow::ensure!(!self.title.trim().is_empty(), "An expense needs a title");
        anyhow::ensure!(
            !self.category.trim().is_empty(),
            "An expense needs a category"
        );
        anyhow::ensure!(
            self.amount.is_positive(),
            "An expense amount must be greater than 0, got {}",
            self.amount
        );
        Ok(())
    }
}

/// Field changes to apply to an existing expense. `None` leaves the field unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpenseUpdates {
    pub title: Option<String>,
    pub amount: Option<Amount>,
    pub category: Option<String>,
    pub date: Option<NaiveDate>,
    pub description: Option<String>,
}

impl ExpenseUpdates {
    pub fn is_empty(&self) -> bool {
        self == &ExpenseUpdates::default()
    }

    /// Returns a copy of `expense` with these updates applied.
    pub fn apply(&self, expense: &Expense) -> Expense {
        let mut updated = expense.clone();
        if let Some(title) = &self.title {
            updated.title = title.clone();
        }
        if let Some(amount) = self.amount {
            updated.amount = amount;
        }
        if let Some(category) = &self.category {
            updated.category = category.clone();
        }
        if let Some(date) = self.date {
            updated.date = date;
        }
        if let Some(description) = &self.description {
            updated.description = Some(description.clone());
        }
        updated
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::from_str(s).unwrap()
    }

    #[test]
    fn test_deserialize_backend_json() {
        let json = r#"{
            "id": 17,
            "title": "Dinner",
            "amount": 640.5,
            "category": "Food",
            "date": "2025-03-04",
            "description": null
        }"#;
        let expense: Expense = serde_json::from_str(json).unwrap();
        assert_eq!(expense.id(), Some(17));
        assert_eq!(expense.amount().to_string(), "640.50");
        assert_eq!(expense.date(), date("2025-03-04"));
        assert_eq!(expense.description(), None);
    }

    #[test]
    fn test_new_expense_omits_id() {
        let expense = Expense::new(
            "Bus",
            Amount::from_str("30").unwrap(),
            "Transportation",
            date("2025-03-05"),
        );
        let json = serde_json::to_string(&expense).unwrap();
        assert!(!json.contains("\"id\""));
        assert!(!json.contains("description"));
        assert!(json.contains("\"date\":\"2025-03-05\""));
    }

    #[test]
    fn test_validate() {
        let ok = Expense::new("Tea", Amount::from_str("20").unwrap(), "Food", date("2025-01-01"));
        assert!(ok.validate().is_ok());

        let mut no_title = ok.clone();
        no_title.title = "  ".to_string();
        assert!(no_title.validate().is_err());

        let mut negative = ok.clone();
        negative.amount = Amount::from_str("-1").unwrap();
        assert!(negative.validate().is_err());

        let mut zero = ok.clone();
        zero.amount = Amount::ZERO;
        assert!(zero.validate().is_err());
    }

    #[test]
    fn test_updates_apply() {
        let original = Expense::new("Tea", Amount::from_str("20").unwrap(), "Food", date("2025-01-01"))
            .with_id(3);
        let updates = ExpenseUpdates {
            amount: Some(Amount::from_str("25").unwrap()),
            description: Some("with snacks".to_string()),
            ..Default::default()
        };
        assert!(!updates.is_empty());
        let updated = updates.apply(&original);
        assert_eq!(updated.id(), Some(3));
        assert_eq!(updated.title(), "Tea");
        assert_eq!(updated.amount().to_string(), "25.00");
        assert_eq!(updated.description(), Some("with snacks"));
        assert!(ExpenseUpdates::default().is_empty());
    }
}
