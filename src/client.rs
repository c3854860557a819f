//! Entry point of the binding: holds the credential and the blocking
//! transport, builds validated transactions and fetches existing ones.

use std::time::Duration;

use serde_json::Value;

use crate::config::{Config, DEFAULT_BASE_URL};
use crate::error::Error;
use crate::transaction::{Transaction, TransactionParams};
use crate::validation::{validate_min_installments, validate_positive_amount, validate_required};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Pagination and search parameters for the list endpoint.
#[derive(Debug, Clone, Default)]
pub struct ListQuery {
    pub page: Option<u32>,
    pub count: Option<u32>,
    pub filters: Vec<(String, String)>,
}

impl ListQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn page(mut self, page: u32) -> Self {
        self.page = Some(page);
        self
    }

    pub fn count(mut self, count: u32) -> Self {
        self.count = Some(count);
        self
    }

    /// Extra search filter passed through to the API verbatim.
    pub fn filter(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.filters.push((key.into(), value.into()));
        self
    }
}

/// Client for the Pagar.me v1 API.
#[derive(Debug, Clone)]
pub struct Client {
    api_key: String,
    base_url: String,
    http: reqwest::blocking::Client,
}

impl Client {
    pub fn new(api_key: impl Into<String>) -> Result<Self, Error> {
        Self::with_base_url(api_key, DEFAULT_BASE_URL)
    }

    /// Same as [`Client::new`] with a custom endpoint, for sandbox
    /// accounts and tests.
    pub fn with_base_url(
        api_key: impl Into<String>,
        base_url: impl Into<String>,
    ) -> Result<Self, Error> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(Error::Configuration(
                "api_key must not be empty".to_string(),
            ));
        }

        let http = reqwest::blocking::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;

        Ok(Client {
            api_key,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            http,
        })
    }

    /// Builds a client from `PAGARME_API_KEY` / `PAGARME_BASE_URL`.
    pub fn from_env() -> Result<Self, Error> {
        let config = Config::from_env()?;
        Self::with_base_url(config.api_key, config.base_url)
    }

    pub(crate) fn api_key(&self) -> &str {
        &self.api_key
    }

    pub(crate) fn base_url(&self) -> &str {
        &self.base_url
    }

    pub(crate) fn http(&self) -> &reqwest::blocking::Client {
        &self.http
    }

    /// Validates the caller's input and returns a new unsaved
    /// [`Transaction`]. No network call happens here.
    pub fn start_transaction(&self, params: TransactionParams) -> Result<Transaction, Error> {
        validate_positive_amount(params.amount)?;
        validate_required("card_hash", params.card_hash.as_deref().unwrap_or(""))?;
        validate_min_installments(params.installments)?;

        Ok(Transaction::new(self.clone(), params))
    }

    /// Fetches a single transaction by id.
    pub fn find_transaction_by_id(&self, id: i64) -> Result<Transaction, Error> {
        let mut transaction = Transaction::empty(self.clone());
        transaction.find_by_id(id)?;
        Ok(transaction)
    }

    /// Lists transactions in the order the API returns them.
    pub fn all_transactions(&self, query: &ListQuery) -> Result<Vec<Transaction>, Error> {
        let url = format!("{}/transactions", self.base_url);

        let mut params: Vec<(String, String)> =
            vec![("api_key".to_string(), self.api_key.clone())];
        if let Some(page) = query.page {
            params.push(("page".to_string(), page.to_string()));
        }
        if let Some(count) = query.count {
            params.push(("count".to_string(), count.to_string()));
        }
        params.extend(query.filters.iter().cloned());

        tracing::debug!(url = %url, "listing transactions");
        let response = self.http.get(&url).query(&params).send()?;
        let status = response.status();
        let body = response.text()?;
        tracing::debug!(status = %status, "Pagar.me responded");

        if status != reqwest::StatusCode::OK {
            let err = Error::from_api_response(status, &body);
            tracing::warn!(status = %status, error = %err, "Pagar.me reported an error");
            return Err(err);
        }

        let items: Vec<Value> = serde_json::from_str(&body)?;
        Ok(items
            .into_iter()
            .map(|data| Transaction::from_response(self.clone(), data))
            .collect())
    }
}
