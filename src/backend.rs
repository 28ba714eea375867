//! Shop backend over `gloo-net`.
//!
//! Every state-changing request is a `POST` carrying the form as
//! `multipart/form-data` and the CSRF token in `X-CSRFToken`.

use async_trait::async_trait;
use gloo_net::http::{Request, Response};
use web_sys::FormData;

use crate::config::PageConfig;
use crate::error::{CheckoutError, Result};
use crate::model::{FormSnapshot, IntentResponse};
use crate::ports::PaymentBackend;

pub const CSRF_HEADER: &str = "X-CSRFToken";

/// The intent, subscription and cart-clear endpoints of the page.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct HttpBackend {
    payment_intent_url: Option<String>,
    subscription_url: Option<String>,
    clear_cart_url: Option<String>,
}

impl HttpBackend {
    pub fn from_config(config: &PageConfig) -> Self {
        Self {
            payment_intent_url: config.payment_intent_url().map(str::to_string),
            subscription_url: config.subscription_url().map(str::to_string),
            clear_cart_url: config.cart_clear_url().map(str::to_string),
        }
    }

    async fn post_form(&self, url: Option<&str>, form: &FormSnapshot) -> Result<IntentResponse> {
        let Some(url) = url else {
            return Err(CheckoutError::Config("endpoint URL not configured".into()));
        };
        let body = to_form_data(form)?;
        let response = Request::post(url)
            .header(CSRF_HEADER, form.csrf_token())
            .body(body)
            .map_err(|e| CheckoutError::Transport(e.to_string()))?
            .send()
            .await
            .map_err(|e| CheckoutError::Transport(e.to_string()))?;
        read_intent_response(response).await
    }
}

#[async_trait(?Send)]
impl PaymentBackend for HttpBackend {
    async fn create_payment_intent(&self, form: &FormSnapshot) -> Result<IntentResponse> {
        self.post_form(self.payment_intent_url.as_deref(), form).await
    }

    async fn create_subscription(&self, form: &FormSnapshot) -> Result<IntentResponse> {
        self.post_form(self.subscription_url.as_deref(), form).await
    }

    fn clear_cart(&self, csrf_token: &str) {
        let Some(url) = self.clear_cart_url.clone() else {
            tracing::warn!("CLEAR_CART_URL not configured, cart left as is");
            return;
        };
        let token = csrf_token.to_string();
        wasm_bindgen_futures::spawn_local(async move {
            if let Err(err) = Request::post(&url).header(CSRF_HEADER, &token).send().await {
                tracing::warn!("clearing cart failed: {err}");
            }
        });
    }
}

/// Error bodies come with 4xx/5xx statuses, so the body is parsed whatever
/// the status; only an unparseable body is a transport failure.
pub async fn read_intent_response(response: Response) -> Result<IntentResponse> {
    let status = response.status();
    response
        .json::<IntentResponse>()
        .await
        .map_err(|e| unexpected_response(status, e))
}

fn unexpected_response(status: u16, err: gloo_net::Error) -> CheckoutError {
    CheckoutError::Transport(format!("unexpected response (HTTP {status}): {err}"))
}

fn to_form_data(form: &FormSnapshot) -> Result<FormData> {
    let data = FormData::new().map_err(|e| CheckoutError::Transport(format!("{e:?}")))?;
    for (name, value) in form.iter() {
        data.append_with_str(name, value)
            .map_err(|e| CheckoutError::Transport(format!("{e:?}")))?;
    }
    Ok(data)
}
