use hmac::{Hmac, Mac};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use subtle::ConstantTimeEq;

use crate::config::RazorpayConfig;
use crate::error::{AppError, Result};

use super::PaymentIntent;

type HmacSha256 = Hmac<Sha256>;

#[derive(Debug, Serialize)]
struct CreateOrderRequest<'a> {
    amount: u64,
    currency: &'a str,
    receipt: &'a str,
}

#[derive(Debug, Deserialize)]
struct CreateOrderResponse {
    id: String,
    amount: u64,
    currency: String,
}

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    description: Option<String>,
}

/// Razorpay client. Built once at startup and shared through `AppState`.
#[derive(Clone)]
pub struct RazorpayClient {
    client: Client,
    api_base: String,
    key_id: String,
    key_secret: String,
}

impl std::fmt::Debug for RazorpayClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RazorpayClient")
            .field("api_base", &self.api_base)
            .field("key_id", &self.key_id)
            .field("key_secret", &"[REDACTED]")
            .finish()
    }
}

impl RazorpayClient {
    pub fn new(config: &RazorpayConfig) -> Self {
        Self {
            client: Client::new(),
            api_base: config.api_base.trim_end_matches('/').to_string(),
            key_id: config.key_id.clone(),
            key_secret: config.key_secret.clone(),
        }
    }

    /// Public key id; the checkout widget in the browser needs it.
    pub fn key_id(&self) -> &str {
        &self.key_id
    }

    /// Create a gateway order for `amount` minor units.
    pub async fn create_order(
        &self,
        amount: u64,
        currency: &str,
        receipt: &str,
    ) -> Result<PaymentIntent> {
        let request = CreateOrderRequest {
            amount,
            currency,
            receipt,
        };

        let response = self
            .client
            .post(format!("{}/v1/orders", self.api_base))
            .basic_auth(&self.key_id, Some(&self.key_secret))
            .json(&request)
            .send()
            .await
            .map_err(|e| AppError::Internal(format!("Razorpay API error: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            let detail = serde_json::from_str::<ErrorResponse>(&body)
                .ok()
                .and_then(|e| e.error.description.or(e.error.code))
                .unwrap_or(body);
            return Err(AppError::Internal(format!(
                "Razorpay API error ({}): {}",
                status, detail
            )));
        }

        let order: CreateOrderResponse = response
            .json()
            .await
            .map_err(|e| AppError::Internal(format!("Failed to parse Razorpay response: {}", e)))?;

        tracing::info!(order_id = %order.id, amount = order.amount, "Razorpay order created");

        Ok(PaymentIntent {
            id: order.id,
            amount: order.amount,
            currency: order.currency,
        })
    }

    /// Check the signature the checkout widget hands back after payment.
    pub fn verify_payment_signature(
        &self,
        order_id: &str,
        payment_id: &str,
        signature: &str,
    ) -> Result<bool> {
        let expected = payment_signature(&self.key_secret, order_id, payment_id)?;
        Ok(expected.as_bytes().ct_eq(signature.as_bytes()).into())
    }
}

/// Lowercase hex HMAC-SHA256 of `"<order_id>|<payment_id>"` keyed by the
/// gateway secret.
pub fn payment_signature(secret: &str, order_id: &str, payment_id: &str) -> Result<String> {
    hmac_sha256_hex(secret, &format!("{}|{}", order_id, payment_id))
}

pub fn hmac_sha256_hex(secret: &str, message: &str) -> Result<String> {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .map_err(|_| AppError::Internal("Invalid payment gateway secret".into()))?;
    mac.update(message.as_bytes());
    Ok(hex::encode(mac.finalize().into_bytes()))
}
