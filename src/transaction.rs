//! Transaction lifecycle object.
//! One instance per logical charge; operations are single blocking round
//! trips that hydrate the instance from the API's JSON response.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::client::Client;
use crate::error::Error;
use crate::validation::{truncate_soft_descriptor, validate_transaction_id, ValidationError};

/// Payment method accepted by the transactions endpoint.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    #[default]
    CreditCard,
    Boleto,
}

impl PaymentMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::CreditCard => "credit_card",
            PaymentMethod::Boleto => "boleto",
        }
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PaymentMethod {
    type Err = ValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "credit_card" => Ok(PaymentMethod::CreditCard),
            "boleto" => Ok(PaymentMethod::Boleto),
            other => Err(ValidationError::new(
                "payment_method",
                format!("'{}' is not supported", other),
            )),
        }
    }
}

/// Caller-supplied fields for a new charge. Defaults mirror the API's:
/// credit card, single installment, empty metadata.
#[derive(Debug, Clone)]
pub struct TransactionParams {
    pub amount: Option<i64>,
    pub card_hash: Option<String>,
    pub payment_method: PaymentMethod,
    pub installments: u32,
    pub postback_url: Option<String>,
    pub metadata: Map<String, Value>,
    pub soft_descriptor: String,
}

impl Default for TransactionParams {
    fn default() -> Self {
        Self {
            amount: None,
            card_hash: None,
            payment_method: PaymentMethod::default(),
            installments: 1,
            postback_url: None,
            metadata: Map::new(),
            soft_descriptor: String::new(),
        }
    }
}

impl TransactionParams {
    pub fn new(amount: i64, card_hash: impl Into<String>) -> Self {
        Self {
            amount: Some(amount),
            card_hash: Some(card_hash.into()),
            ..Self::default()
        }
    }

    pub fn payment_method(mut self, payment_method: PaymentMethod) -> Self {
        self.payment_method = payment_method;
        self
    }

    pub fn installments(mut self, installments: u32) -> Self {
        self.installments = installments;
        self
    }

    pub fn postback_url(mut self, postback_url: impl Into<String>) -> Self {
        self.postback_url = Some(postback_url.into());
        self
    }

    pub fn metadata(mut self, metadata: Map<String, Value>) -> Self {
        self.metadata = metadata;
        self
    }

    pub fn soft_descriptor(mut self, soft_descriptor: impl Into<String>) -> Self {
        self.soft_descriptor = soft_descriptor.into();
        self
    }
}

/// A single charge against the transactions endpoint.
///
/// Starts unsaved (no id); a successful `charge` or `find_by_id` hydrates
/// id/status/card from the response, after which `refund` becomes legal.
/// A failed call leaves the instance exactly as it was.
#[derive(Debug, Clone)]
pub struct Transaction {
    client: Client,
    pub amount: Option<i64>,
    pub card_hash: Option<String>,
    pub payment_method: PaymentMethod,
    pub installments: u32,
    pub postback_url: Option<String>,
    pub metadata: Map<String, Value>,
    /// Statement descriptor, silently trimmed to 13 characters.
    pub soft_descriptor: String,
    /// Assigned by the API after a successful charge or find.
    pub id: Option<i64>,
    pub status: Option<String>,
    /// Opaque card structure as returned by the API.
    pub card: Option<Value>,
    /// Raw decoded JSON of the last successful response.
    pub response_data: Option<Value>,
}

impl Transaction {
    pub(crate) fn new(client: Client, params: TransactionParams) -> Self {
        Self {
            client,
            amount: params.amount,
            card_hash: params.card_hash,
            payment_method: params.payment_method,
            installments: params.installments,
            postback_url: params.postback_url,
            metadata: params.metadata,
            soft_descriptor: truncate_soft_descriptor(&params.soft_descriptor),
            id: None,
            status: None,
            card: None,
            response_data: None,
        }
    }

    /// Empty shell used by the find and list paths, hydrated from a
    /// response body rather than caller input.
    pub(crate) fn empty(client: Client) -> Self {
        Self::new(client, TransactionParams::default())
    }

    pub(crate) fn from_response(client: Client, data: Value) -> Self {
        let mut transaction = Self::empty(client);
        transaction.hydrate(data);
        transaction
    }

    /// Builds the outbound form pairs. Always carries the api_key; the
    /// charge fields ride along only when an amount is set, metadata only
    /// when non-empty, postback_url only when present.
    pub fn payload(&self) -> Vec<(String, String)> {
        let mut form = vec![("api_key".to_string(), self.client.api_key().to_string())];

        if let Some(amount) = self.amount {
            form.push(("amount".to_string(), amount.to_string()));
            form.push((
                "card_hash".to_string(),
                self.card_hash.clone().unwrap_or_default(),
            ));
            form.push(("installments".to_string(), self.installments.to_string()));
            form.push((
                "payment_method".to_string(),
                self.payment_method.as_str().to_string(),
            ));
            form.push((
                "soft_descriptor".to_string(),
                truncate_soft_descriptor(&self.soft_descriptor),
            ));
        }

        for (key, value) in &self.metadata {
            let rendered = match value {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            form.push((format!("metadata[{}]", key), rendered));
        }

        if let Some(postback_url) = &self.postback_url {
            form.push(("postback_url".to_string(), postback_url.clone()));
        }

        form
    }

    /// POSTs the payload to the creation endpoint and hydrates from the
    /// response. The instance is unchanged on any failure.
    pub fn charge(&mut self) -> Result<(), Error> {
        let url = format!("{}/transactions", self.client.base_url());
        tracing::debug!(url = %url, "charging transaction");

        let response = self.client.http().post(&url).form(&self.payload()).send()?;
        self.handle_response(response)
    }

    /// Fetches an existing transaction by id and hydrates from it.
    pub fn find_by_id(&mut self, id: i64) -> Result<(), Error> {
        validate_transaction_id(id)?;

        let url = format!("{}/transactions/{}", self.client.base_url(), id);
        tracing::debug!(url = %url, "fetching transaction");

        let response = self
            .client
            .http()
            .get(&url)
            .query(&[("api_key", self.client.api_key())])
            .send()?;
        self.handle_response(response)
    }

    /// POSTs to the refund sub-resource. Requires an id, so the
    /// transaction must have been charged or fetched first.
    pub fn refund(&mut self) -> Result<(), Error> {
        let id = self.id.ok_or(Error::NotPaid)?;

        let url = format!("{}/transactions/{}/refund", self.client.base_url(), id);
        tracing::debug!(url = %url, "refunding transaction");

        let response = self.client.http().post(&url).form(&self.payload()).send()?;
        self.handle_response(response)
    }

    fn handle_response(&mut self, response: reqwest::blocking::Response) -> Result<(), Error> {
        let status = response.status();
        let body = response.text()?;
        tracing::debug!(status = %status, "Pagar.me responded");

        if status != reqwest::StatusCode::OK {
            let err = Error::from_api_response(status, &body);
            tracing::warn!(status = %status, error = %err, "Pagar.me reported an error");
            return Err(err);
        }

        let data: Value = serde_json::from_str(&body)?;
        self.hydrate(data);
        Ok(())
    }

    fn hydrate(&mut self, data: Value) {
        self.id = data.get("id").and_then(Value::as_i64);
        self.status = data
            .get("status")
            .and_then(Value::as_str)
            .map(str::to_string);
        self.card = data.get("card").filter(|card| !card.is_null()).cloned();
        self.postback_url = data
            .get("postback_url")
            .and_then(Value::as_str)
            .map(str::to_string);
        if let Some(amount) = data.get("amount").and_then(Value::as_i64) {
            self.amount = Some(amount);
        }
        if let Some(metadata) = data.get("metadata").and_then(Value::as_object) {
            self.metadata = metadata.clone();
        }
        self.response_data = Some(data);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn client() -> Client {
        Client::new("keydeteste").unwrap()
    }

    fn form_value<'a>(form: &'a [(String, String)], key: &str) -> Option<&'a str> {
        form.iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    #[test]
    fn test_payment_method_from_str() {
        assert_eq!(
            "credit_card".parse::<PaymentMethod>().unwrap(),
            PaymentMethod::CreditCard
        );
        assert_eq!(
            "boleto".parse::<PaymentMethod>().unwrap(),
            PaymentMethod::Boleto
        );
        assert!("rice_bag".parse::<PaymentMethod>().is_err());
    }

    #[test]
    fn test_params_defaults() {
        let params = TransactionParams::new(314, "hashcard");
        assert_eq!(params.amount, Some(314));
        assert_eq!(params.card_hash.as_deref(), Some("hashcard"));
        assert_eq!(params.payment_method, PaymentMethod::CreditCard);
        assert_eq!(params.installments, 1);
        assert!(params.metadata.is_empty());
    }

    #[test]
    fn test_payload_minimal() {
        let transaction = Transaction::new(client(), TransactionParams::new(314, "hashcard"));
        let form = transaction.payload();

        assert_eq!(form_value(&form, "api_key"), Some("keydeteste"));
        assert_eq!(form_value(&form, "amount"), Some("314"));
        assert_eq!(form_value(&form, "card_hash"), Some("hashcard"));
        assert_eq!(form_value(&form, "installments"), Some("1"));
        assert_eq!(form_value(&form, "payment_method"), Some("credit_card"));
        assert_eq!(form_value(&form, "soft_descriptor"), Some(""));
        assert!(form_value(&form, "postback_url").is_none());
        assert!(form.iter().all(|(k, _)| !k.starts_with("metadata")));
    }

    #[test]
    fn test_payload_without_amount_carries_only_api_key() {
        let transaction = Transaction::empty(client());
        let form = transaction.payload();

        assert_eq!(form.len(), 1);
        assert_eq!(form_value(&form, "api_key"), Some("keydeteste"));
    }

    #[test]
    fn test_payload_optional_fields() {
        let mut metadata = Map::new();
        metadata.insert("order_id".to_string(), json!("abc-1"));
        metadata.insert("retries".to_string(), json!(2));

        let params = TransactionParams::new(1000, "hashcard")
            .payment_method(PaymentMethod::Boleto)
            .installments(3)
            .postback_url("https://example.com/postback")
            .metadata(metadata);
        let transaction = Transaction::new(client(), params);
        let form = transaction.payload();

        assert_eq!(form_value(&form, "payment_method"), Some("boleto"));
        assert_eq!(form_value(&form, "installments"), Some("3"));
        assert_eq!(
            form_value(&form, "postback_url"),
            Some("https://example.com/postback")
        );
        assert_eq!(form_value(&form, "metadata[order_id]"), Some("abc-1"));
        assert_eq!(form_value(&form, "metadata[retries]"), Some("2"));
    }

    #[test]
    fn test_soft_descriptor_truncated_in_payload() {
        let params =
            TransactionParams::new(314, "hashcard").soft_descriptor("my very long shop name");
        let transaction = Transaction::new(client(), params);

        assert_eq!(transaction.soft_descriptor.chars().count(), 13);
        assert_eq!(
            form_value(&transaction.payload(), "soft_descriptor"),
            Some("my very long ")
        );
    }

    #[test]
    fn test_hydrate_populates_fields_from_response() {
        let mut transaction = Transaction::new(client(), TransactionParams::new(314, "hashcard"));
        transaction.hydrate(json!({
            "id": 194,
            "status": "paid",
            "card": {"id": "card_ci6l9fx8f0042rt16rtb477gj", "brand": "visa"},
            "postback_url": "https://example.com/postback",
            "metadata": {"order_id": "abc-1"},
            "amount": 314
        }));

        assert_eq!(transaction.id, Some(194));
        assert_eq!(transaction.status.as_deref(), Some("paid"));
        assert_eq!(transaction.card.as_ref().unwrap()["brand"], "visa");
        assert_eq!(
            transaction.postback_url.as_deref(),
            Some("https://example.com/postback")
        );
        assert_eq!(transaction.metadata["order_id"], "abc-1");
        assert_eq!(transaction.response_data.as_ref().unwrap()["id"], 194);
    }

    #[test]
    fn test_refund_without_id_fails_before_any_request() {
        let mut transaction = Transaction::new(client(), TransactionParams::new(314, "hashcard"));
        let err = transaction.refund().unwrap_err();

        assert!(matches!(err, Error::NotPaid));
        assert!(transaction.response_data.is_none());
    }

    #[test]
    fn test_find_by_id_rejects_non_positive_id() {
        let mut transaction = Transaction::empty(client());

        assert!(matches!(
            transaction.find_by_id(0),
            Err(Error::Validation(_))
        ));
        assert!(matches!(
            transaction.find_by_id(-7),
            Err(Error::Validation(_))
        ));
    }
}
