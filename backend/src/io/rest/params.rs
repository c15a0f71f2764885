//! # Request Parameters
//!
//! The admin endpoint takes flat string parameters, either in the query
//! string or as a form body. [`ActionParams`] collects them and the
//! `to_*_command` methods turn them into typed domain commands, rejecting
//! anything malformed with a validation error.

use chrono::{DateTime, NaiveDate, Utc};
use serde::Deserialize;
use shared::DateRangeMode;
use std::fmt;
use std::str::FromStr;

use crate::domain::commands::dashboard::{DashboardQuery, DateWindow};
use crate::domain::commands::members::{
    ActivateMemberCommand, AddCustomerCommand, AddMemberCommand, ExtendMembershipCommand,
    MarkPaymentPaidCommand, PaymentDate, PaymentTerms,
};
use crate::domain::date_utils::parse_iso_date;
use crate::domain::errors::{MembershipError, MembershipResult};
use crate::domain::models::{MembershipDuration, MembershipType, PaymentType};

/// Operations selected by the `action` parameter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    AddMember,
    AddCustomer,
    ActivateMember,
    ExtendMembership,
    AddDailyPass,
    MarkPaymentPaid,
    CheckNumber,
    GetDashboardData,
    GetExpiredMembers,
    GetMemberDetails,
}

impl Action {
    /// Prefix put in front of unexpected failures, e.g. "Error adding member: ..."
    pub fn failure_prefix(&self) -> &'static str {
        match self {
            Action::AddMember => "Error adding member",
            Action::AddCustomer => "Error adding customer",
            Action::ActivateMember => "Error activating member",
            Action::ExtendMembership => "Error extending membership",
            Action::AddDailyPass => "Error adding daily pass",
            Action::MarkPaymentPaid => "Error marking payment as paid",
            Action::CheckNumber => "Error checking number",
            Action::GetDashboardData => "Error getting dashboard data",
            Action::GetExpiredMembers => "Error getting expired members",
            Action::GetMemberDetails => "Error getting member details",
        }
    }
}

impl FromStr for Action {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "addMember" => Ok(Action::AddMember),
            "addCustomer" => Ok(Action::AddCustomer),
            "activateMember" => Ok(Action::ActivateMember),
            "extendMembership" => Ok(Action::ExtendMembership),
            "addDailyPass" => Ok(Action::AddDailyPass),
            "markPaymentPaid" => Ok(Action::MarkPaymentPaid),
            "checkNumber" => Ok(Action::CheckNumber),
            "getDashboardData" => Ok(Action::GetDashboardData),
            "getExpiredMembers" => Ok(Action::GetExpiredMembers),
            "getMemberDetails" => Ok(Action::GetMemberDetails),
            other => Err(format!("Unknown action '{}'", other)),
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Action::AddMember => "addMember",
            Action::AddCustomer => "addCustomer",
            Action::ActivateMember => "activateMember",
            Action::ExtendMembership => "extendMembership",
            Action::AddDailyPass => "addDailyPass",
            Action::MarkPaymentPaid => "markPaymentPaid",
            Action::CheckNumber => "checkNumber",
            Action::GetDashboardData => "getDashboardData",
            Action::GetExpiredMembers => "getExpiredMembers",
            Action::GetMemberDetails => "getMemberDetails",
        };
        write!(f, "{}", name)
    }
}

/// Raw parameters of an admin request. Every field is optional here;
/// each action checks the ones it needs.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionParams {
    pub action: Option<String>,
    pub name: Option<String>,
    pub number: Option<String>,
    pub membership_type: Option<String>,
    pub duration: Option<String>,
    pub membership_fees: Option<String>,
    pub payment_type: Option<String>,
    pub next_payment: Option<String>,
    pub payment_due_date: Option<String>,
    pub timestamp: Option<String>,
    pub payment_date: Option<String>,
    pub date_range: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub special_notes: Option<String>,
}

/// Non-blank trimmed value of a parameter
fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

fn required<'a>(value: &'a Option<String>, label: &str) -> MembershipResult<&'a str> {
    present(value).ok_or_else(|| MembershipError::validation(format!("{} is required", label)))
}

fn parse_amount(text: &str, label: &str) -> MembershipResult<f64> {
    text.parse::<f64>()
        .ok()
        .filter(|v| v.is_finite() && *v >= 0.0)
        .ok_or_else(|| MembershipError::validation(format!("{} must be a non-negative amount", label)))
}

fn parse_months(text: &str) -> MembershipResult<u32> {
    text.parse::<u32>()
        .map_err(|_| MembershipError::validation(format!("Invalid duration '{}'", text)))
}

fn parse_date(text: &str, label: &str) -> MembershipResult<NaiveDate> {
    parse_iso_date(text)
        .ok_or_else(|| MembershipError::validation(format!("Invalid {} '{}'", label, text)))
}

fn parse_payment_date(text: &str) -> MembershipResult<PaymentDate> {
    if text.eq_ignore_ascii_case("today") {
        return Ok(PaymentDate::Today);
    }
    parse_iso_date(text)
        .map(PaymentDate::On)
        .ok_or_else(|| MembershipError::validation("Invalid payment date"))
}

impl ActionParams {
    /// Combine query-string and form parameters; form values win
    pub fn merge(self, form: ActionParams) -> ActionParams {
        ActionParams {
            action: form.action.or(self.action),
            name: form.name.or(self.name),
            number: form.number.or(self.number),
            membership_type: form.membership_type.or(self.membership_type),
            duration: form.duration.or(self.duration),
            membership_fees: form.membership_fees.or(self.membership_fees),
            payment_type: form.payment_type.or(self.payment_type),
            next_payment: form.next_payment.or(self.next_payment),
            payment_due_date: form.payment_due_date.or(self.payment_due_date),
            timestamp: form.timestamp.or(self.timestamp),
            payment_date: form.payment_date.or(self.payment_date),
            date_range: form.date_range.or(self.date_range),
            start_date: form.start_date.or(self.start_date),
            end_date: form.end_date.or(self.end_date),
            special_notes: form.special_notes.or(self.special_notes),
        }
    }

    /// `None` when no action (or an unknown one) was requested
    pub fn action(&self) -> Option<Action> {
        present(&self.action).and_then(|a| a.parse().ok())
    }

    pub fn phone(&self) -> MembershipResult<&str> {
        required(&self.number, "Phone number")
    }

    fn membership_type(&self) -> MembershipResult<MembershipType> {
        required(&self.membership_type, "Membership type")?
            .parse()
            .map_err(MembershipError::Validation)
    }

    fn membership_fees(&self) -> MembershipResult<f64> {
        parse_amount(required(&self.membership_fees, "Membership fees")?, "Membership fees")
    }

    fn timestamp(&self) -> MembershipResult<Option<DateTime<Utc>>> {
        present(&self.timestamp)
            .map(|raw| {
                DateTime::parse_from_rfc3339(raw)
                    .map(|dt| dt.with_timezone(&Utc))
                    .map_err(|_| MembershipError::validation(format!("Invalid timestamp '{}'", raw)))
            })
            .transpose()
    }

    /// Full unless "Partial" is asked for; a partial sale may carry the
    /// outstanding amount and its due date.
    fn payment_terms(&self) -> MembershipResult<PaymentTerms> {
        let payment_type = match present(&self.payment_type) {
            None => PaymentType::Full,
            Some(raw) => raw.parse().map_err(MembershipError::Validation)?,
        };
        if payment_type != PaymentType::Partial {
            return Ok(PaymentTerms::Full);
        }

        Ok(PaymentTerms::Partial {
            next_payment: present(&self.next_payment)
                .map(|raw| parse_amount(raw, "Next payment"))
                .transpose()?,
            payment_due_date: present(&self.payment_due_date)
                .map(|raw| parse_date(raw, "payment due date"))
                .transpose()?,
        })
    }

    pub fn to_add_member_command(&self) -> MembershipResult<AddMemberCommand> {
        Ok(AddMemberCommand {
            name: required(&self.name, "Name")?.to_string(),
            phone: self.phone()?.to_string(),
            membership_type: self.membership_type()?,
            duration_months: parse_months(required(&self.duration, "Duration")?)?,
            membership_fees: self.membership_fees()?,
            terms: self.payment_terms()?,
            timestamp: self.timestamp()?,
        })
    }

    pub fn to_add_customer_command(&self) -> MembershipResult<AddCustomerCommand> {
        Ok(AddCustomerCommand {
            name: required(&self.name, "Name")?.to_string(),
            phone: self.phone()?.to_string(),
            special_notes: present(&self.special_notes).unwrap_or_default().to_string(),
            timestamp: self.timestamp()?,
        })
    }

    pub fn to_activate_member_command(&self) -> MembershipResult<ActivateMemberCommand> {
        let raw_duration = required(&self.duration, "Duration")?;
        let duration = if raw_duration.eq_ignore_ascii_case("daily") {
            MembershipDuration::Daily
        } else {
            MembershipDuration::Months(parse_months(raw_duration)?)
        };

        Ok(ActivateMemberCommand {
            phone: self.phone()?.to_string(),
            membership_type: self.membership_type()?,
            duration,
            membership_fees: self.membership_fees()?,
            terms: self.payment_terms()?,
        })
    }

    pub fn to_extend_membership_command(&self) -> MembershipResult<ExtendMembershipCommand> {
        Ok(ExtendMembershipCommand {
            phone: self.phone()?.to_string(),
            additional_months: parse_months(required(&self.duration, "Duration")?)?,
            payment_date: present(&self.payment_date).map(parse_payment_date).transpose()?,
        })
    }

    pub fn to_mark_payment_paid_command(&self) -> MembershipResult<MarkPaymentPaidCommand> {
        Ok(MarkPaymentPaidCommand {
            phone: self.phone()?.to_string(),
            payment_date: present(&self.payment_date)
                .map(parse_payment_date)
                .transpose()?
                .unwrap_or(PaymentDate::Today),
        })
    }

    pub fn to_dashboard_query(&self) -> MembershipResult<DashboardQuery> {
        let mode = present(&self.date_range)
            .unwrap_or_default()
            .parse::<DateRangeMode>()
            .map_err(MembershipError::Validation)?;

        let window = match mode {
            DateRangeMode::All => DateWindow::All,
            DateRangeMode::Monthly => DateWindow::CurrentMonth,
            DateRangeMode::Custom => {
                let start = parse_date(required(&self.start_date, "Start date")?, "start date")?;
                let end = parse_date(required(&self.end_date, "End date")?, "end date")?;
                if start > end {
                    return Err(MembershipError::validation(
                        "Start date must not be after end date",
                    ));
                }
                DateWindow::Between(start, end)
            }
        };

        Ok(DashboardQuery { window })
    }
}
