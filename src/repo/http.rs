//! Implements the `ExpenseRepository` trait against the backend's `/api/expenses` resource.

use crate::error::Res;
use crate::model::Expense;
use crate::repo::ExpenseRepository;
use anyhow::{anyhow, bail, Context};
use reqwest::{Response, StatusCode};
use tracing::trace;
use url::Url;

/// Talks to the REST backend:
///
/// - `GET {base}` lists all expenses
/// - `GET {base}/{id}` gets one, 404 if it does not exist
/// - `POST {base}` creates one
/// - `PUT {base}/{id}` replaces one
/// - `DELETE {base}/{id}` deletes one
#[derive(Debug, Clone)]
pub struct HttpRepository {
    client: reqwest::Client,
    base: Url,
}

impl HttpRepository {
    pub fn new(base: Url) -> Res<Self> {
        if base.cannot_be_a_base() {
            bail!("The API URL '{base}' cannot be used as a base URL");
        }
        let client = reqwest::Client::builder()
            .build()
            .context("Unable to create the HTTP client")?;
        Ok(Self { client, base })
    }

    pub fn base(&self) -> &Url {
        &self.base
    }

    /// `{base}/{id}`, with or without a trailing slash on `base`.
    fn item_url(&self, id: i64) -> Res<Url> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|_| anyhow!("The API URL '{}' cannot be used as a base URL", self.base))?
            .pop_if_empty()
            .push(&id.to_string());
        Ok(url)
    }
}

#[async_trait::async_trait]
impl ExpenseRepository for HttpRepository {
    async fn list_all(&self) -> anyhow::Result<Vec<Expense>> {
        trace!("GET {}", self.base);
        let response = self
            .client
            .get(self.base.clone())
            .send()
            .await
            .with_context(|| format!("Failed to reach the expense API at {}", self.base))?;
        check(response, "Listing expenses")
            .await?
            .json()
            .await
            .context("Failed to parse the list of expenses")
    }

    async fn get(&self, id: i64) -> anyhow::Result<Option<Expense>> {
        let url = self.item_url(id)?;
        trace!("GET {url}");
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .with_context(|| format!("Failed to reach the expense API at {url}"))?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let expense = check(response, "Getting an expense")
            .await?
            .json()
            .await
            .with_context(|| format!("Failed to parse expense {id}"))?;
        Ok(Some(expense))
    }

    async fn create(&self, expense: &Expense) -> anyhow::Result<Expense> {
        trace!("POST {}", self.base);
        let response = self
            .client
            .post(self.base.clone())
            .json(expense)
            .send()
            .await
            .with_context(|| format!("Failed to reach the expense API at {}", self.base))?;
        check(response, "Creating an expense")
            .await?
            .json()
            .await
            .context("Failed to parse the created expense")
    }

    async fn update(&self, id: i64, expense: &Expense) -> anyhow::Result<Expense> {
        let url = self.item_url(id)?;
        trace!("PUT {url}");
        let response = self
            .client
            .put(url.clone())
            .json(expense)
            .send()
            .await
            .with_context(|| format!("Failed to reach the expense API at {url}"))?;
        check(response, "Updating an expense")
            .await?
            .json()
            .await
            .with_context(|| format!("Failed to parse the updated expense {id}"))
    }

    async fn delete(&self, id: i64) -> anyhow::Result<()> {
        let url = self.item_url(id)?;
        trace!("DELETE {url}");
        let response = self
            .client
            .delete(url.clone())
            .send()
            .await
            .with_context(|| format!("Failed to reach the expense API at {url}"))?;
        check(response, "Deleting an expense").await?;
        Ok(())
    }
}

/// Passes successful responses through and turns any other status into an error that carries the
/// status and the response body.
async fn check(response: Response, action: &str) -> Res<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response
        .text()
        .await
        .unwrap_or_else(|_| "Unable to read response body".to_string());
    bail!("{action} failed with status {status}: {body}")
}
