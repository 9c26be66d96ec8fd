//! Payment processing for subscription plans.
//!
//! [`PaymentProcessor`] is the single seam the client charges through.
//! [`RestPaymentProcessor`] talks to the subscription endpoints (card intents,
//! M-Pesa STK push); [`MockPaymentProcessor`] approves everything locally and
//! is selected by `payment.mode = "mock"`.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{info, warn};
use uuid::Uuid;

use crate::api::transport::{ApiRequest, Transport};
use crate::types::errors::{ApiError, PaymentError};
use crate::types::payment::{Currency, MpesaStatus, PaymentMethod, PaymentQuery, PaymentReceipt, PaymentRequest};
use crate::types::session::Session;

/// Charges customers and reports payment history.
#[async_trait]
pub trait PaymentProcessor: Send + Sync {
    async fn process_payment(
        &self,
        session: Option<&Session>,
        request: &PaymentRequest,
    ) -> Result<PaymentReceipt, PaymentError>;

    /// Polls the status of an STK push started by `process_payment`.
    async fn verify_mpesa(
        &self,
        session: Option<&Session>,
        checkout_request_id: &str,
    ) -> Result<MpesaStatus, PaymentError>;

    async fn query_payments(
        &self,
        session: Option<&Session>,
        query: &PaymentQuery,
    ) -> Result<Vec<Value>, PaymentError>;
}

/// Normalizes a Kenyan mobile number to `2547XXXXXXXX` / `2541XXXXXXXX`.
pub fn normalize_msisdn(raw: &str) -> Result<String, PaymentError> {
    let digits: String = raw
        .chars()
        .filter(|c| !matches!(c, ' ' | '-' | '+' | '(' | ')'))
        .collect();
    if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
        return Err(PaymentError::InvalidPhone(raw.to_string()));
    }
    let national = if let Some(rest) = digits.strip_prefix("254") {
        rest
    } else if let Some(rest) = digits.strip_prefix('0') {
        rest
    } else {
        digits.as_str()
    };
    if national.len() == 9 && (national.starts_with('7') || national.starts_with('1')) {
        Ok(format!("254{}", national))
    } else {
        Err(PaymentError::InvalidPhone(raw.to_string()))
    }
}

/// Checks what every processor requires before charging.
pub fn validate_request(session: Option<&Session>, request: &PaymentRequest) -> Result<(), PaymentError> {
    if session.is_none() {
        return Err(PaymentError::Unauthenticated);
    }
    if !request.amount.is_finite() || request.amount <= 0.0 {
        return Err(PaymentError::InvalidAmount(request.amount));
    }
    if let PaymentMethod::Mpesa { phone_number } = &request.method {
        normalize_msisdn(phone_number)?;
        if request.currency != Currency::Kes {
            return Err(PaymentError::Declined("M-Pesa only accepts KES".to_string()));
        }
        if request.plan_name.as_deref().map(str::trim).unwrap_or("").is_empty() {
            return Err(PaymentError::InvalidPlan("M-Pesa payments need a plan".to_string()));
        }
    }
    Ok(())
}

fn bearer(session: Option<&Session>) -> Result<&str, PaymentError> {
    session.map(Session::bearer).ok_or(PaymentError::Unauthenticated)
}

// === REST ===

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PaymentIntent {
    id: String,
    #[serde(default)]
    client_secret: Option<String>,
}

#[derive(Debug, Deserialize)]
struct StkPush {
    #[serde(rename = "checkoutRequestID")]
    checkout_request_id: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct MpesaQueryReply {
    result_code: Value,
    #[serde(default)]
    result_desc: String,
    #[serde(default)]
    mpesa_receipt_number: Option<String>,
}

#[derive(Debug, Deserialize)]
struct PaymentHistory {
    #[serde(default)]
    payments: Vec<Value>,
}

/// Processor backed by the subscription endpoints.
pub struct RestPaymentProcessor {
    transport: Arc<dyn Transport>,
}

impl RestPaymentProcessor {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self { transport }
    }

    async fn post<T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        body: Value,
        token: &str,
    ) -> Result<T, ApiError> {
        let request = ApiRequest::post(path, body).with_bearer(Some(token));
        self.transport.send(request).await?.into_result()?.decode()
    }

    async fn pay_by_card(
        &self,
        token: &str,
        request: &PaymentRequest,
        payment_method_id: Option<&str>,
    ) -> Result<PaymentReceipt, PaymentError> {
        let intent: PaymentIntent = self
            .post("subscription/payment-intent", json!({ "amount": request.amount }), token)
            .await?;
        let _: Value = self
            .post("subscription/intent-success", json!({ "id": intent.id }), token)
            .await?;

        if let (Some(method_id), Some(plan)) = (payment_method_id, request.plan_name.as_deref()) {
            let _: Value = self
                .post(
                    "subscription/create-subscription",
                    json!({ "paymentMethodId": method_id, "plan": plan }),
                    token,
                )
                .await?;
        }

        info!(transaction = %intent.id, amount = request.amount, currency = %request.currency, "card payment processed");
        Ok(PaymentReceipt {
            transaction_id: intent.id,
            message: "Payment processed successfully".to_string(),
            client_secret: intent.client_secret,
            pending: false,
        })
    }

    async fn pay_by_mpesa(
        &self,
        token: &str,
        request: &PaymentRequest,
        phone: &str,
    ) -> Result<PaymentReceipt, PaymentError> {
        let phone_number = normalize_msisdn(phone)?;
        let push: StkPush = self
            .post(
                "subscription/pay",
                json!({ "phoneNumber": phone_number, "planName": request.plan_name }),
                token,
            )
            .await?;
        info!(checkout = %push.checkout_request_id, "M-Pesa STK push initiated");
        Ok(PaymentReceipt {
            transaction_id: push.checkout_request_id,
            message: "M-Pesa STK push initiated. Please check your phone.".to_string(),
            client_secret: None,
            pending: true,
        })
    }
}

#[async_trait]
impl PaymentProcessor for RestPaymentProcessor {
    async fn process_payment(
        &self,
        session: Option<&Session>,
        request: &PaymentRequest,
    ) -> Result<PaymentReceipt, PaymentError> {
        validate_request(session, request)?;
        let token = bearer(session)?;
        let result = match &request.method {
            PaymentMethod::Card { payment_method_id } => {
                self.pay_by_card(token, request, payment_method_id.as_deref()).await
            }
            PaymentMethod::Mpesa { phone_number } => self.pay_by_mpesa(token, request, phone_number).await,
        };
        if let Err(e) = &result {
            warn!(method = request.method.label(), error = %e, "payment failed");
        }
        result
    }

    async fn verify_mpesa(
        &self,
        session: Option<&Session>,
        checkout_request_id: &str,
    ) -> Result<MpesaStatus, PaymentError> {
        let token = bearer(session)?;
        let reply: MpesaQueryReply = self
            .post("api/mpesa/query", json!({ "checkoutRequestID": checkout_request_id }), token)
            .await?;
        let code = match &reply.result_code {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        };
        Ok(MpesaStatus {
            success: code == "0",
            message: reply.result_desc,
            receipt_number: reply.mpesa_receipt_number,
        })
    }

    async fn query_payments(
        &self,
        session: Option<&Session>,
        query: &PaymentQuery,
    ) -> Result<Vec<Value>, PaymentError> {
        let token = bearer(session)?;
        let params: Vec<(String, String)> = serde_json::to_value(query)
            .ok()
            .and_then(|v| v.as_object().cloned())
            .map(|map| {
                map.into_iter()
                    .filter_map(|(k, v)| v.as_str().map(|s| (k, s.to_string())))
                    .collect()
            })
            .unwrap_or_default();
        let request = ApiRequest::get("api/payments")
            .with_query(&params)
            .with_bearer(Some(token));
        let history: PaymentHistory = self.transport.send(request).await?.into_result()?.decode()?;
        Ok(history.payments)
    }
}

// === Mock ===

/// Processor that approves every valid payment without network access.
#[derive(Default)]
pub struct MockPaymentProcessor {
    history: Mutex<Vec<Value>>,
}

impl MockPaymentProcessor {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PaymentProcessor for MockPaymentProcessor {
    async fn process_payment(
        &self,
        session: Option<&Session>,
        request: &PaymentRequest,
    ) -> Result<PaymentReceipt, PaymentError> {
        validate_request(session, request)?;
        let pending = matches!(request.method, PaymentMethod::Mpesa { .. });
        let transaction_id = format!("mock_{}", Uuid::new_v4().simple());
        self.history
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(json!({
                "transactionId": transaction_id,
                "amount": request.amount,
                "currency": request.currency.code(),
                "method": request.method.label(),
                "plan": request.plan_name,
                "status": "completed",
                "createdAt": chrono::Utc::now().to_rfc3339(),
            }));
        info!(transaction = %transaction_id, "mock payment approved");
        Ok(PaymentReceipt {
            client_secret: (!pending).then(|| format!("{}_secret", transaction_id)),
            transaction_id,
            message: "Payment processed successfully".to_string(),
            pending,
        })
    }

    async fn verify_mpesa(
        &self,
        session: Option<&Session>,
        checkout_request_id: &str,
    ) -> Result<MpesaStatus, PaymentError> {
        bearer(session)?;
        Ok(MpesaStatus {
            success: true,
            message: "The service request is processed successfully.".to_string(),
            receipt_number: Some(format!("MOCK-{}", checkout_request_id)),
        })
    }

    async fn query_payments(
        &self,
        session: Option<&Session>,
        query: &PaymentQuery,
    ) -> Result<Vec<Value>, PaymentError> {
        bearer(session)?;
        let history = self.history.lock().unwrap_or_else(|e| e.into_inner());
        Ok(history
            .iter()
            .filter(|p| {
                query
                    .method
                    .as_deref()
                    .map(|m| p.get("method").and_then(Value::as_str) == Some(m))
                    .unwrap_or(true)
                    && query
                        .status
                        .as_deref()
                        .map(|s| p.get("status").and_then(Value::as_str) == Some(s))
                        .unwrap_or(true)
            })
            .cloned()
            .collect())
    }
}
