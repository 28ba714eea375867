//! Transient checkout data: form snapshots, billing details, backend and
//! processor answers, and display money.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{CheckoutError, Result};

/// Name of the hidden CSRF input rendered into every form.
pub const CSRF_FIELD: &str = "csrfmiddlewaretoken";

/// Field carrying the tokenized card on subscription requests.
pub const PAYMENT_METHOD_FIELD: &str = "payment_method_id";

/// Status Stripe reports for a completed PaymentIntent.
pub const STATUS_SUCCEEDED: &str = "succeeded";

/// The `(name, value)` pairs of a form, captured at submit time.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FormSnapshot {
    fields: Vec<(String, String)>,
}

impl FormSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a field, keeping earlier values with the same name.
    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.push(name, value);
        self
    }

    pub fn push(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.fields.push((name.into(), value.into()));
    }

    /// First value submitted under `name`.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    /// Like [`get`](Self::get), with a missing field read as empty.
    pub fn value(&self, name: &str) -> &str {
        self.get(name).unwrap_or_default()
    }

    pub fn csrf_token(&self) -> &str {
        self.value(CSRF_FIELD)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Full billing details for a one-time card confirmation.
    pub fn billing_details(&self, email: &str) -> BillingDetails {
        BillingDetails {
            name: self.value("full_name").to_string(),
            email: email.to_string(),
            address: BillingAddress {
                line1: self.value("address").to_string(),
                city: self.value("city").to_string(),
                postal_code: self.value("postcode").to_string(),
                country: self.value("country").to_string(),
            },
        }
    }

    /// Name and email used when tokenizing a card for a subscription.
    pub fn billing_contact(&self) -> BillingContact {
        BillingContact {
            name: self.value("full_name").to_string(),
            email: self.value("email").to_string(),
        }
    }
}

impl<N: Into<String>, V: Into<String>> FromIterator<(N, V)> for FormSnapshot {
    fn from_iter<I: IntoIterator<Item = (N, V)>>(iter: I) -> Self {
        Self {
            fields: iter
                .into_iter()
                .map(|(n, v)| (n.into(), v.into()))
                .collect(),
        }
    }
}

/// `billing_details` as Stripe.js expects it on `confirmCardPayment`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct BillingDetails {
    pub name: String,
    pub email: String,
    pub address: BillingAddress,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct BillingAddress {
    pub line1: String,
    pub city: String,
    pub postal_code: String,
    pub country: String,
}

/// `billing_details` for `createPaymentMethod`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct BillingContact {
    pub name: String,
    pub email: String,
}

/// Body returned by the intent and subscription endpoints.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Eq)]
pub struct IntentResponse {
    #[serde(default)]
    pub error: Option<String>,
    #[serde(rename = "clientSecret", default)]
    pub client_secret: Option<String>,
}

impl IntentResponse {
    pub fn secret(client_secret: impl Into<String>) -> Self {
        Self {
            error: None,
            client_secret: Some(client_secret.into()),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            error: Some(message.into()),
            client_secret: None,
        }
    }

    /// The confirmation secret, or the rejection the backend reported.
    ///
    /// An empty `error` string counts as no error.
    pub fn into_client_secret(self) -> Result<String> {
        match (self.error, self.client_secret) {
            (Some(err), _) if !err.is_empty() => Err(CheckoutError::Backend(err)),
            (_, Some(secret)) if !secret.is_empty() => Ok(secret),
            _ => Err(CheckoutError::Transport(
                "response carried neither an error nor a client secret".into(),
            )),
        }
    }
}

/// What `confirmCardPayment` resolved to, once errors are split off.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ConfirmationOutcome {
    Succeeded,
    /// Any other PaymentIntent status, e.g. `requires_action` or `processing`.
    Pending(String),
}

impl ConfirmationOutcome {
    pub fn from_status(status: &str) -> Self {
        if status == STATUS_SUCCEEDED {
            ConfirmationOutcome::Succeeded
        } else {
            ConfirmationOutcome::Pending(status.to_string())
        }
    }
}

/// An amount in minor units with its display symbol.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Money {
    pub minor: u64,
    pub symbol: String,
}

impl Money {
    pub fn new(minor: u64, symbol: impl Into<String>) -> Self {
        Self {
            minor,
            symbol: symbol.into(),
        }
    }

    pub fn zero(symbol: impl Into<String>) -> Self {
        Self::new(0, symbol)
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{}.{:02}",
            self.symbol,
            self.minor / 100,
            self.minor % 100
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn checkout_form() -> FormSnapshot {
        FormSnapshot::new()
            .with_field(CSRF_FIELD, "tok123")
            .with_field("full_name", "Sam Doe")
            .with_field("address", "1 Main St")
            .with_field("city", "Dublin")
            .with_field("postcode", "D01")
            .with_field("country", "IE")
    }

    #[test]
    fn test_billing_details_from_form() {
        let billing = checkout_form().billing_details("sam@example.com");
        assert_eq!(billing.name, "Sam Doe");
        assert_eq!(billing.email, "sam@example.com");
        assert_eq!(billing.address.line1, "1 Main St");
        assert_eq!(billing.address.postal_code, "D01");

        let json = serde_json::to_value(&billing).unwrap();
        assert_eq!(json["address"]["postal_code"], "D01");
        assert_eq!(json["address"]["country"], "IE");
    }

    #[test]
    fn test_missing_fields_read_as_empty() {
        let form = FormSnapshot::new().with_field("email", "a@b.c");
        let contact = form.billing_contact();
        assert_eq!(contact.name, "");
        assert_eq!(contact.email, "a@b.c");
        assert_eq!(form.csrf_token(), "");
    }

    #[test]
    fn test_get_returns_first_value() {
        let form: FormSnapshot = [("plan", "pro"), ("plan", "team")].into_iter().collect();
        assert_eq!(form.get("plan"), Some("pro"));
        assert_eq!(form.len(), 2);
    }

    #[test]
    fn test_intent_response_error_wins() {
        let resp: IntentResponse =
            serde_json::from_str(r#"{"error":"card declined","clientSecret":"pi_1"}"#).unwrap();
        assert_eq!(
            resp.into_client_secret(),
            Err(CheckoutError::Backend("card declined".into()))
        );
    }

    #[test]
    fn test_intent_response_secret() {
        let resp: IntentResponse =
            serde_json::from_str(r#"{"clientSecret":"pi_1_secret"}"#).unwrap();
        assert_eq!(resp.into_client_secret(), Ok("pi_1_secret".to_string()));
    }

    #[test]
    fn test_intent_response_empty_error_is_ignored() {
        let resp: IntentResponse =
            serde_json::from_str(r#"{"error":"","clientSecret":"pi_2_secret"}"#).unwrap();
        assert_eq!(resp.into_client_secret(), Ok("pi_2_secret".to_string()));
    }

    #[test]
    fn test_intent_response_without_either_is_transport_error() {
        let resp: IntentResponse = serde_json::from_str("{}").unwrap();
        assert!(matches!(
            resp.into_client_secret(),
            Err(CheckoutError::Transport(_))
        ));
    }

    #[test]
    fn test_confirmation_outcome_from_status() {
        assert_eq!(
            ConfirmationOutcome::from_status("succeeded"),
            ConfirmationOutcome::Succeeded
        );
        assert_eq!(
            ConfirmationOutcome::from_status("requires_action"),
            ConfirmationOutcome::Pending("requires_action".into())
        );
    }

    #[test]
    fn test_money_display() {
        assert_eq!(Money::zero("€").to_string(), "€0.00");
        assert_eq!(Money::new(2905, "€").to_string(), "€29.05");
        assert_eq!(Money::new(100_000, "$").to_string(), "$1000.00");
    }
}
