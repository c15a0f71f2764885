//! Domain-level command and query types.
//!
//! These are what the services consume. The REST layer parses raw request
//! parameters into them, so every field here is already typed.

pub mod members {
    use chrono::{DateTime, NaiveDate, Utc};

    use crate::domain::models::{MembershipDuration, MembershipType, PaymentType};

    /// Payment terms chosen when a membership is sold.
    #[derive(Debug, Clone, PartialEq)]
    pub enum PaymentTerms {
        /// Paid up front; the next payment equals the fee and falls due at the end date
        Full,
        /// Paid in part; the outstanding amount and its due date come from the desk
        Partial {
            next_payment: Option<f64>,
            payment_due_date: Option<NaiveDate>,
        },
    }

    impl PaymentTerms {
        pub fn payment_type(&self) -> PaymentType {
            match self {
                PaymentTerms::Full => PaymentType::Full,
                PaymentTerms::Partial { .. } => PaymentType::Partial,
            }
        }
    }

    /// Input for creating a fully specified member.
    #[derive(Debug, Clone)]
    pub struct AddMemberCommand {
        pub name: String,
        pub phone: String,
        pub membership_type: MembershipType,
        pub duration_months: u32,
        pub membership_fees: f64,
        pub terms: PaymentTerms,
        pub timestamp: Option<DateTime<Utc>>,
    }

    /// Input for a self-registered customer awaiting activation.
    #[derive(Debug, Clone)]
    pub struct AddCustomerCommand {
        pub name: String,
        pub phone: String,
        pub special_notes: String,
        pub timestamp: Option<DateTime<Utc>>,
    }

    /// Input for activating (or re-activating) an existing record.
    #[derive(Debug, Clone)]
    pub struct ActivateMemberCommand {
        pub phone: String,
        pub membership_type: MembershipType,
        pub duration: MembershipDuration,
        pub membership_fees: f64,
        pub terms: PaymentTerms,
    }

    /// When a payment was received.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub enum PaymentDate {
        Today,
        On(NaiveDate),
    }

    impl PaymentDate {
        pub fn resolve(self, today: NaiveDate) -> NaiveDate {
            match self {
                PaymentDate::Today => today,
                PaymentDate::On(date) => date,
            }
        }
    }

    #[derive(Debug, Clone)]
    pub struct ExtendMembershipCommand {
        pub phone: String,
        pub additional_months: u32,
        pub payment_date: Option<PaymentDate>,
    }

    #[derive(Debug, Clone)]
    pub struct MarkPaymentPaidCommand {
        pub phone: String,
        pub payment_date: PaymentDate,
    }

    /// Result of a successful mutation.
    #[derive(Debug, Clone)]
    pub struct MutationResult {
        pub success_message: String,
    }

    impl MutationResult {
        pub fn new(message: impl Into<String>) -> Self {
            Self {
                success_message: message.into(),
            }
        }
    }
}

pub mod dashboard {
    use chrono::NaiveDate;

    /// Window applied to the membership-cost total.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub enum DateWindow {
        All,
        CurrentMonth,
        /// Inclusive on both ends
        Between(NaiveDate, NaiveDate),
    }

    #[derive(Debug, Clone, Copy)]
    pub struct DashboardQuery {
        pub window: DateWindow,
    }

    #[derive(Debug, Clone, PartialEq)]
    pub struct ExpiringEntry {
        pub name: String,
        pub phone: String,
        pub days_left: i64,
        pub end_date: NaiveDate,
    }

    #[derive(Debug, Clone, PartialEq)]
    pub struct PendingEntry {
        pub name: String,
        pub phone: String,
        pub special_notes: String,
    }

    #[derive(Debug, Clone, PartialEq)]
    pub struct PaymentDueEntry {
        pub name: String,
        pub phone: String,
        pub amount: f64,
        pub days_until_payment: i64,
        pub payment_due_date: NaiveDate,
    }

    /// Everything the dashboard shows, gathered in one scan.
    #[derive(Debug, Clone, Default, PartialEq)]
    pub struct DashboardReport {
        pub active_members: u32,
        pub activation_pending: u32,
        /// Full count, not limited by the list truncation
        pub expiring_soon: u32,
        pub total_membership_cost: f64,
        /// Most urgent first, truncated to the configured limit
        pub expiring: Vec<ExpiringEntry>,
        pub pending: Vec<PendingEntry>,
        /// Most urgent first
        pub payments_due: Vec<PaymentDueEntry>,
        pub payments_total: f64,
    }

    #[derive(Debug, Clone, PartialEq)]
    pub struct ExpiredEntry {
        pub record: crate::domain::models::MemberRecord,
        pub end_date: NaiveDate,
        pub days_expired: i64,
    }
}
