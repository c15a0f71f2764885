use serde::{Deserialize, Serialize};
use std::fmt;

/// Envelope returned by every action of the admin endpoint.
///
/// Mirrors the `{ success, message?, data?, timestamp }` shape the dashboard
/// client expects. `message` is set for mutations and failures, `data` for reads.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiResponse<T = serde_json::Value> {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    /// Time the response was produced (RFC 3339)
    pub timestamp: String,
}

impl<T> ApiResponse<T> {
    /// Successful read carrying a payload
    pub fn data(data: T) -> Self {
        Self {
            success: true,
            message: None,
            data: Some(data),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }

    /// Message-only response; `success` reports the outcome
    pub fn message(success: bool, message: impl Into<String>) -> Self {
        Self {
            success,
            message: Some(message.into()),
            data: None,
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self::message(false, message)
    }
}

/// Which records contribute to the membership-cost total on the dashboard
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum DateRangeMode {
    /// No date filter
    #[default]
    All,
    /// Current calendar month
    Monthly,
    /// Caller-supplied inclusive range
    Custom,
}

impl fmt::Display for DateRangeMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DateRangeMode::All => write!(f, "all"),
            DateRangeMode::Monthly => write!(f, "monthly"),
            DateRangeMode::Custom => write!(f, "custom"),
        }
    }
}

impl std::str::FromStr for DateRangeMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "" | "all" => Ok(DateRangeMode::All),
            "monthly" => Ok(DateRangeMode::Monthly),
            "custom" => Ok(DateRangeMode::Custom),
            other => Err(format!("Unknown date range '{}'", other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub active_members: u32,
    pub activation_pending: u32,
    pub expiring_soon: u32,
    pub total_membership_cost: f64,
}

/// Active member whose membership ends within the alert window
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpiringMember {
    pub name: String,
    pub phone: String,
    pub days_left: i64,
    /// Canonical M/D/YYYY
    pub end_date: String,
}

/// Customer that registered but has not been activated yet
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PendingActivation {
    pub name: String,
    pub phone: String,
    pub special_notes: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct PendingActivations {
    pub count: u32,
    pub list: Vec<PendingActivation>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentDue {
    pub name: String,
    pub phone: String,
    pub amount: f64,
    pub days_until_payment: i64,
    /// Canonical M/D/YYYY
    pub payment_due_date: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct PaymentsDue {
    pub count: u32,
    pub total_amount: f64,
    pub list: Vec<PaymentDue>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct DashboardData {
    pub stats: DashboardStats,
    pub expiring_members: Vec<ExpiringMember>,
    pub pending_activations: PendingActivations,
    pub payments: PaymentsDue,
}

/// Row of the expired-members report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpiredMember {
    pub name: String,
    pub phone: String,
    pub membership_type: String,
    pub duration: String,
    pub start_date: String,
    pub end_date: String,
    pub days_expired: i64,
    pub status: String,
}

/// Full member record as shown by the member lookup panel.
///
/// Blank strings stand for unset cells; amounts are `None` when never filled.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberDetails {
    pub timestamp: String,
    pub name: String,
    pub phone_number: String,
    pub membership_type: String,
    pub duration: String,
    pub start_date: String,
    pub end_date: String,
    pub status: String,
    pub membership_fees: Option<f64>,
    pub payment_type: String,
    pub next_payment: Option<f64>,
    pub payment_due_date: String,
    pub last_payment_date: String,
    pub special_notes: String,
    pub total_paid: f64,
}
