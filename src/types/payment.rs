use std::fmt;

use serde::{Deserialize, Serialize};

/// Billing currency.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    Usd,
    Kes,
}

impl Currency {
    pub fn code(&self) -> &'static str {
        match self {
            Currency::Usd => "USD",
            Currency::Kes => "KES",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_uppercase().as_str() {
            "USD" => Some(Currency::Usd),
            "KES" => Some(Currency::Kes),
            _ => None,
        }
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// How the customer pays.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PaymentMethod {
    /// Card payment; `payment_method_id` is the token produced by the card SDK.
    Card {
        #[serde(default)]
        payment_method_id: Option<String>,
    },
    /// M-Pesa STK push to the given phone number.
    Mpesa { phone_number: String },
}

impl PaymentMethod {
    pub fn label(&self) -> &'static str {
        match self {
            PaymentMethod::Card { .. } => "card",
            PaymentMethod::Mpesa { .. } => "mpesa",
        }
    }
}

/// What is being bought, sent alongside the amount.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PaymentRequest {
    pub method: PaymentMethod,
    pub amount: f64,
    pub currency: Currency,
    #[serde(default)]
    pub plan_name: Option<String>,
}

/// Successful outcome of a payment attempt.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PaymentReceipt {
    pub transaction_id: String,
    pub message: String,
    #[serde(default)]
    pub client_secret: Option<String>,
    /// `true` when the provider still has to confirm (M-Pesa STK push).
    #[serde(default)]
    pub pending: bool,
}

/// Filters for the payment history query.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PaymentQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub method: Option<String>,
}

/// Billing period of a plan.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum BillingCycle {
    Monthly,
    Annual,
}

/// A subscription plan on the pricing page.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Plan {
    pub name: String,
    pub subtitle: String,
    /// Price in USD for the selected cycle.
    pub price: f64,
    /// Suffix such as `/month`; empty for one-off plans.
    pub period: String,
    pub features: Vec<String>,
    pub popular: bool,
    pub annual_only: bool,
}

/// Outcome of an M-Pesa status query.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MpesaStatus {
    /// `true` only when the provider reports result code `0`.
    pub success: bool,
    pub message: String,
    #[serde(default)]
    pub receipt_number: Option<String>,
}
