//! Checkout error types.

use serde::Deserialize;
use thiserror::Error;

/// Result type alias
pub type Result<T> = std::result::Result<T, CheckoutError>;

/// Representation of a Stripe.js error object.
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
pub struct StripeError {
    /// Human-readable message.
    pub message: String,
    /// Stripe's error type, e.g. `"card_error"`.
    #[serde(rename = "type", default)]
    pub error_type: Option<String>,
    /// Optional Stripe error code, e.g. `"card_declined"`.
    #[serde(default)]
    pub code: Option<String>,
}

impl StripeError {
    /// Error carrying only a message, for failures raised outside Stripe.js.
    pub fn from_message(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            error_type: None,
            code: None,
        }
    }
}

/// Everything that can end a submission attempt early.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CheckoutError {
    /// The backend answered with `{ "error": ... }`
    #[error("{0}")]
    Backend(String),

    /// Stripe.js rejected tokenization or confirmation
    #[error("{}", .0.message)]
    Processor(StripeError),

    /// Request never produced a usable answer (network, bad JSON, JS exception)
    #[error("Network error: {0}")]
    Transport(String),

    /// Page configuration missing or malformed
    #[error("Configuration error: {0}")]
    Config(String),
}

impl CheckoutError {
    /// Text shown in the inline error region.
    pub fn user_message(&self) -> String {
        match self {
            CheckoutError::Backend(msg) => msg.clone(),
            CheckoutError::Processor(err) => err.message.clone(),
            CheckoutError::Transport(_) => {
                "We could not reach the payment service. Please try again.".into()
            }
            CheckoutError::Config(_) => "Checkout is not available right now.".into(),
        }
    }
}

impl From<StripeError> for CheckoutError {
    fn from(err: StripeError) -> Self {
        CheckoutError::Processor(err)
    }
}
