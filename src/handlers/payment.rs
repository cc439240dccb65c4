use axum::{extract::State, http::StatusCode};
use serde::{Deserialize, Serialize};

use crate::checkout::{self, Verification, VerifyPaymentRequest};
use crate::db::AppState;
use crate::error::{AppError, Result};
use crate::extractors::Json;
use crate::payments::{CURRENCY, receipt_label};

const INITIATION_FAILED: &str = "Server Error during payment initiation";

#[derive(Debug, Deserialize)]
pub struct CreateOrderRequest {
    /// Minor units (paise)
    #[serde(default)]
    pub amount: Option<u64>,
}

#[derive(Debug, Serialize)]
pub struct CreateOrderResponse {
    pub id: String,
    pub currency: String,
    pub amount: u64,
    /// Public key id for the checkout widget
    pub key: String,
}

#[derive(Debug, Serialize)]
pub struct VerifyPaymentResponse {
    pub status: &'static str,
    pub message: &'static str,
}

pub async fn create_order(
    State(state): State<AppState>,
    Json(request): Json<CreateOrderRequest>,
) -> Result<Json<CreateOrderResponse>> {
    let amount = request
        .amount
        .filter(|a| *a > 0)
        .ok_or_else(|| AppError::BadRequest("Amount is required".into()))?;

    let gateway = state.payments.as_ref().ok_or_else(|| AppError::Upstream {
        message: INITIATION_FAILED.into(),
        detail: "Payment gateway is not configured".into(),
    })?;

    let intent = gateway
        .create_order(amount, CURRENCY, &receipt_label())
        .await
        .map_err(|e| AppError::Upstream {
            message: INITIATION_FAILED.into(),
            detail: e.to_string(),
        })?;

    Ok(Json(CreateOrderResponse {
        id: intent.id,
        currency: intent.currency,
        amount: intent.amount,
        key: gateway.key_id().to_string(),
    }))
}

/// Verify the signed confirmation and record the order.
///
/// A valid signature always answers success, whatever happened to the order
/// write or the emails afterwards.
pub async fn verify_payment(
    State(state): State<AppState>,
    Json(request): Json<VerifyPaymentRequest>,
) -> Result<(StatusCode, Json<VerifyPaymentResponse>)> {
    let verification = checkout::verify_and_capture(&state, &request)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "Payment verification error");
            AppError::Internal("Server Error".into())
        })?;

    match verification {
        Verification::Rejected => Ok((
            StatusCode::BAD_REQUEST,
            Json(VerifyPaymentResponse {
                status: "failure",
                message: "Invalid signature",
            }),
        )),
        Verification::Captured(report) => {
            tracing::info!(
                payment_id = %request.razorpay_payment_id,
                order_saved = report.order.completed().is_some(),
                admin_email = ?report.admin_email,
                customer_email = ?report.customer_email,
                "Payment verified"
            );
            Ok((
                StatusCode::OK,
                Json(VerifyPaymentResponse {
                    status: "success",
                    message: "Payment verified and Order Saved",
                }),
            ))
        }
    }
}
