//! Payment verification and order capture.
//!
//! Once the gateway signature checks out the payment is final, so everything
//! after that point (saving the order, emailing admin and customer) is best
//! effort: each step records its own outcome in a [`CaptureReport`] and none
//! of them can turn the verification into a failure.

use serde::Deserialize;

use crate::db::{AppState, queries};
use crate::email::{EmailSendResult, OrderSummary};
use crate::error::{AppError, Result};
use crate::models::{
    CartItem, CustomerDetails, NewOrder, ORDER_STATUS_PAID, Order, PAYMENT_STATUS_CAPTURED,
    PaymentInfo,
};
use crate::models::lenient;
use crate::payments::minor_to_major;

/// What the storefront posts after the checkout widget reports success.
///
/// Every field is read leniently: a body that carries a valid signature must
/// reach signature verification even when the cart or form data is oddly typed.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct VerifyPaymentRequest {
    #[serde(default, deserialize_with = "lenient::text")]
    pub razorpay_order_id: String,
    #[serde(default, deserialize_with = "lenient::text")]
    pub razorpay_payment_id: String,
    #[serde(default, deserialize_with = "lenient::text")]
    pub razorpay_signature: String,
    #[serde(default, rename = "customerDetails", deserialize_with = "lenient::record")]
    pub customer_details: Option<CustomerDetails>,
    /// Minor units (paise)
    #[serde(default, deserialize_with = "lenient::amount")]
    pub amount: Option<u64>,
    #[serde(default, deserialize_with = "lenient::records")]
    pub items: Option<Vec<CartItem>>,
}

impl VerifyPaymentRequest {
    fn items(&self) -> &[CartItem] {
        self.items.as_deref().unwrap_or_default()
    }
}

/// Outcome of one best-effort step.
#[derive(Debug, Clone, PartialEq)]
pub enum SideEffect<T> {
    Completed(T),
    Failed(String),
    /// Preconditions for the step were not met, so it never ran
    Skipped,
}

impl<T> SideEffect<T> {
    pub fn completed(&self) -> Option<&T> {
        match self {
            SideEffect::Completed(value) => Some(value),
            _ => None,
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, SideEffect::Failed(_))
    }
}

impl<T> From<Result<T>> for SideEffect<T> {
    fn from(result: Result<T>) -> Self {
        match result {
            Ok(value) => SideEffect::Completed(value),
            Err(e) => SideEffect::Failed(e.to_string()),
        }
    }
}

#[derive(Debug, Clone)]
pub struct CaptureReport {
    pub order: SideEffect<Order>,
    pub admin_email: SideEffect<EmailSendResult>,
    pub customer_email: SideEffect<EmailSendResult>,
}

#[derive(Debug, Clone)]
pub enum Verification {
    /// Signature mismatch. Nothing was stored or sent.
    Rejected,
    Captured(CaptureReport),
}

/// Verify the gateway signature and, if it matches, capture the order.
///
/// Errors only when verification itself cannot run (no gateway configured).
pub async fn verify_and_capture(
    state: &AppState,
    request: &VerifyPaymentRequest,
) -> Result<Verification> {
    let gateway = state
        .payments
        .as_ref()
        .ok_or_else(|| AppError::Internal("Payment gateway is not configured".into()))?;

    let valid = gateway.verify_payment_signature(
        &request.razorpay_order_id,
        &request.razorpay_payment_id,
        &request.razorpay_signature,
    )?;

    if !valid {
        tracing::warn!(
            order_id = %request.razorpay_order_id,
            payment_id = %request.razorpay_payment_id,
            "Rejected payment confirmation with invalid signature"
        );
        return Ok(Verification::Rejected);
    }

    let order = persist_order(state, request);
    let order_id = order.completed().map(|o| o.id.as_str());

    let (admin_email, customer_email) = match &request.customer_details {
        Some(customer) => {
            let summary = OrderSummary {
                order_id,
                payment_id: &request.razorpay_payment_id,
                amount: request.amount,
                items: request.items(),
                customer,
            };
            let (admin, receipt) = tokio::join!(
                state.email.send_admin_notification(&summary),
                state.email.send_customer_confirmation(&summary),
            );
            (
                log_email_outcome("admin", &request.razorpay_payment_id, admin),
                log_email_outcome("customer", &request.razorpay_payment_id, receipt),
            )
        }
        None => (SideEffect::Skipped, SideEffect::Skipped),
    };

    Ok(Verification::Captured(CaptureReport {
        order,
        admin_email,
        customer_email,
    }))
}

/// Shape the order record from the verified request.
pub fn build_order(request: &VerifyPaymentRequest) -> std::result::Result<NewOrder, String> {
    let customer_details = request
        .customer_details
        .clone()
        .ok_or_else(|| "customer details are missing".to_string())?;

    let missing = customer_details.missing_fields();
    if !missing.is_empty() {
        return Err(format!("customer details are missing: {}", missing.join(", ")));
    }

    let order_items = request
        .items()
        .iter()
        .map(CartItem::to_order_item)
        .collect::<std::result::Result<Vec<_>, _>>()?;

    Ok(NewOrder {
        customer_details,
        order_items,
        payment_info: PaymentInfo {
            id: request.razorpay_payment_id.clone(),
            status: PAYMENT_STATUS_CAPTURED.to_string(),
        },
        total_amount: request.amount.map(minor_to_major).unwrap_or(0.0),
        status: ORDER_STATUS_PAID.to_string(),
    })
}

/// Save the order. The payment has already been taken, so a failure here is
/// logged for manual follow-up and reported, never raised.
fn persist_order(state: &AppState, request: &VerifyPaymentRequest) -> SideEffect<Order> {
    let new_order = match build_order(request) {
        Ok(order) => order,
        Err(reason) => {
            tracing::error!(
                payment_id = %request.razorpay_payment_id,
                reason = %reason,
                "Verified payment has an invalid order record, order not saved"
            );
            return SideEffect::Failed(reason);
        }
    };

    let result = state
        .db
        .get()
        .map_err(AppError::from)
        .and_then(|conn| queries::create_order(&conn, &new_order));

    match &result {
        Ok(order) => tracing::info!(
            order_id = %order.id,
            payment_id = %request.razorpay_payment_id,
            total_amount = order.total_amount,
            "Order saved"
        ),
        Err(e) => tracing::error!(
            error = %e,
            payment_id = %request.razorpay_payment_id,
            "Failed to save order for verified payment"
        ),
    }

    result.into()
}

fn log_email_outcome(
    recipient: &'static str,
    payment_id: &str,
    result: Result<EmailSendResult>,
) -> SideEffect<EmailSendResult> {
    if let Err(e) = &result {
        tracing::error!(error = %e, recipient, payment_id = %payment_id, "Failed to send order email");
    }
    result.into()
}
