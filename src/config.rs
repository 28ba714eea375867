//! Page-scoped checkout configuration.
//!
//! The surrounding page injects a handful of globals (`STRIPE_PUBLIC_KEY`,
//! endpoint URLs, the signed-in user's email). They are read exactly once at
//! start-up into a [`PageConfig`] which is then handed to every component
//! that needs it.

use serde::Deserialize;
use wasm_bindgen::JsValue;
use web_sys::js_sys::{Object, Reflect};

use crate::error::{CheckoutError, Result};

/// Where the subscription flow lands after a successful payment.
pub const DEFAULT_SUBSCRIPTION_SUCCESS_URL: &str = "/subscriptions/success/";

/// Currency symbol used when the page does not provide one.
pub const DEFAULT_CURRENCY_SYMBOL: &str = "€";

/// Global names looked up on `window` by [`PageConfig::from_window`].
const GLOBAL_KEYS: [&str; 9] = [
    "STRIPE_PUBLIC_KEY",
    "CREATE_PAYMENT_INTENT_URL",
    "CREATE_SUBSCRIPTION_URL",
    "CLEAR_CART_URL",
    "CHECKOUT_SUCCESS_URL",
    "CHECKOUT_SUCCESS_MODE",
    "SUBSCRIPTION_SUCCESS_URL",
    "USER_EMAIL",
    "CURRENCY_SYMBOL",
];

/// How the one-time form finishes after a successful payment.
#[derive(Clone, Copy, Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SuccessMode {
    /// Render the success state in the page and clear the cart.
    #[default]
    InPage,
    /// Navigate to `CHECKOUT_SUCCESS_URL`.
    Redirect,
}

/// Configuration for both checkout forms.
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct PageConfig {
    /// Stripe publishable key (`pk_...`). Blank or missing disables checkout.
    #[serde(default)]
    pub stripe_public_key: Option<String>,

    #[serde(default)]
    pub create_payment_intent_url: Option<String>,

    #[serde(default)]
    pub create_subscription_url: Option<String>,

    #[serde(default)]
    pub clear_cart_url: Option<String>,

    /// Redirect target of the plain one-time variant.
    #[serde(default)]
    pub checkout_success_url: Option<String>,

    #[serde(default)]
    pub checkout_success_mode: SuccessMode,

    #[serde(default = "default_subscription_success_url")]
    pub subscription_success_url: String,

    /// Email of the signed-in customer, sent as billing email on one-time payments.
    #[serde(default)]
    pub user_email: Option<String>,

    #[serde(default = "default_currency_symbol")]
    pub currency_symbol: String,
}

fn default_subscription_success_url() -> String {
    DEFAULT_SUBSCRIPTION_SUCCESS_URL.into()
}

fn default_currency_symbol() -> String {
    DEFAULT_CURRENCY_SYMBOL.into()
}

impl Default for PageConfig {
    fn default() -> Self {
        Self {
            stripe_public_key: None,
            create_payment_intent_url: None,
            create_subscription_url: None,
            clear_cart_url: None,
            checkout_success_url: None,
            checkout_success_mode: SuccessMode::InPage,
            subscription_success_url: default_subscription_success_url(),
            user_email: None,
            currency_symbol: default_currency_symbol(),
        }
    }
}

impl PageConfig {
    /// Read the page globals off `window`.
    ///
    /// Only `var`-declared globals (or explicit `window.X = ...` assignments)
    /// are visible here; pages using `const` should call `init_checkout`
    /// with an explicit object instead.
    pub fn from_window() -> Result<Self> {
        let window = web_sys::window()
            .ok_or_else(|| CheckoutError::Config("no window".into()))?;
        let globals = Object::new();
        for key in GLOBAL_KEYS {
            let key = JsValue::from_str(key);
            let value = Reflect::get(&window, &key).unwrap_or(JsValue::UNDEFINED);
            if value.is_undefined() || value.is_null() {
                continue;
            }
            Reflect::set(&globals, &key, &value)
                .map_err(|e| CheckoutError::Config(format!("{e:?}")))?;
        }
        Self::from_js(globals.into())
    }

    /// Deserialize from a JS object shaped like the page globals.
    pub fn from_js(value: JsValue) -> Result<Self> {
        serde_wasm_bindgen::from_value(value).map_err(|e| CheckoutError::Config(e.to_string()))
    }

    /// The publishable key, if present and non-blank.
    pub fn public_key(&self) -> Option<&str> {
        non_blank(&self.stripe_public_key)
    }

    /// Checkout is wired only when a publishable key is configured.
    pub fn is_enabled(&self) -> bool {
        self.public_key().is_some()
    }

    pub fn payment_intent_url(&self) -> Option<&str> {
        non_blank(&self.create_payment_intent_url)
    }

    pub fn subscription_url(&self) -> Option<&str> {
        non_blank(&self.create_subscription_url)
    }

    pub fn cart_clear_url(&self) -> Option<&str> {
        non_blank(&self.clear_cart_url)
    }

    pub fn success_url(&self) -> Option<&str> {
        non_blank(&self.checkout_success_url)
    }

    pub fn email(&self) -> &str {
        non_blank(&self.user_email).unwrap_or_default()
    }
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}
