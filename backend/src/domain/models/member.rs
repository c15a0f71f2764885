use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Strip whitespace, hyphens and parentheses so differently formatted
/// numbers compare equal.
pub fn normalize_phone(phone: &str) -> String {
    phone
        .chars()
        .filter(|c| !c.is_whitespace() && !matches!(c, '-' | '(' | ')'))
        .collect()
}

/// Lookup key for the phone-number identity of a record.
///
/// Two numbers are the same member when their normalized forms are equal once
/// the gym's own country code prefix (e.g. `+91`) is dropped, so
/// "+91 98765 43210" and "98765-43210" match while "+1 555-0100" keeps its prefix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhoneKey {
    canonical: String,
    country_code: Option<String>,
}

impl PhoneKey {
    pub fn new(raw: &str, country_code: Option<&str>) -> Self {
        let country_code = country_code
            .map(normalize_phone)
            .filter(|cc| !cc.is_empty());
        Self {
            canonical: canonicalize(raw, country_code.as_deref()),
            country_code,
        }
    }

    pub fn as_str(&self) -> &str {
        &self.canonical
    }

    /// Does a phone number as stored in a row refer to this key?
    pub fn matches(&self, stored_phone: &str) -> bool {
        canonicalize(stored_phone, self.country_code.as_deref()) == self.canonical
    }
}

impl fmt::Display for PhoneKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.canonical)
    }
}

fn canonicalize(raw: &str, country_code: Option<&str>) -> String {
    let normalized = normalize_phone(raw);
    match country_code {
        Some(cc) if normalized.len() > cc.len() && normalized.starts_with(cc) => {
            normalized[cc.len()..].to_string()
        }
        _ => normalized,
    }
}

/// Stored lifecycle state. "Expired" is derived from the end date and never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MemberStatus {
    Pending,
    Active,
}

impl fmt::Display for MemberStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MemberStatus::Pending => write!(f, "Pending"),
            MemberStatus::Active => write!(f, "Active"),
        }
    }
}

impl FromStr for MemberStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pending" => Ok(MemberStatus::Pending),
            "active" => Ok(MemberStatus::Active),
            other => Err(format!("Unknown member status '{}'", other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PaymentType {
    Full,
    Partial,
    /// Hand-entered sheet value, kept verbatim
    Other(String),
}

impl PaymentType {
    /// Lenient parse of a stored cell. Blank means "never activated".
    pub fn from_stored(text: &str) -> Option<Self> {
        let text = text.trim();
        if text.is_empty() {
            return None;
        }
        Some(text.parse().unwrap_or_else(|_| PaymentType::Other(text.to_string())))
    }
}

impl fmt::Display for PaymentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PaymentType::Full => write!(f, "Full"),
            PaymentType::Partial => write!(f, "Partial"),
            PaymentType::Other(label) => write!(f, "{}", label),
        }
    }
}

impl FromStr for PaymentType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "full" => Ok(PaymentType::Full),
            "partial" => Ok(PaymentType::Partial),
            other => Err(format!("Payment type must be Full or Partial, got '{}'", other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum MembershipType {
    Basic,
    Premium,
    #[serde(rename = "VIP")]
    Vip,
    Student,
    Corporate,
    Pro,
    /// Plan name typed into the sheet by hand
    Other(String),
}

impl MembershipType {
    pub const ALL: [MembershipType; 6] = [
        MembershipType::Basic,
        MembershipType::Premium,
        MembershipType::Vip,
        MembershipType::Student,
        MembershipType::Corporate,
        MembershipType::Pro,
    ];

    /// Stored cells accept any label; requests are limited to [`Self::ALL`]
    pub fn from_stored(text: &str) -> Option<Self> {
        let text = text.trim();
        if text.is_empty() {
            return None;
        }
        Some(text.parse().unwrap_or_else(|_| MembershipType::Other(text.to_string())))
    }
}

impl fmt::Display for MembershipType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            MembershipType::Basic => "Basic",
            MembershipType::Premium => "Premium",
            MembershipType::Vip => "VIP",
            MembershipType::Student => "Student",
            MembershipType::Corporate => "Corporate",
            MembershipType::Pro => "Pro",
            MembershipType::Other(label) => label.as_str(),
        };
        write!(f, "{}", label)
    }
}

impl FromStr for MembershipType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Self::ALL
            .into_iter()
            .find(|t| t.to_string().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| format!("Unknown membership type '{}'", wanted))
    }
}

/// Membership length: a single-visit plan or a number of calendar months
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MembershipDuration {
    Daily,
    Months(u32),
}

impl MembershipDuration {
    /// Months counted towards extension; a daily plan counts as zero
    pub fn months(&self) -> u32 {
        match self {
            MembershipDuration::Daily => 0,
            MembershipDuration::Months(n) => *n,
        }
    }

    /// Lenient parse of a stored cell: "Daily", "3 Month(s)", "3".
    /// Digits are collected from the whole text.
    pub fn from_stored(text: &str) -> Option<Self> {
        let text = text.trim();
        if text.is_empty() {
            return None;
        }
        if text.eq_ignore_ascii_case("daily") {
            return Some(MembershipDuration::Daily);
        }
        let digits: String = text.chars().filter(|c| c.is_ascii_digit()).collect();
        digits.parse().ok().map(MembershipDuration::Months)
    }
}

impl fmt::Display for MembershipDuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MembershipDuration::Daily => write!(f, "Daily"),
            MembershipDuration::Months(n) => write!(f, "{} Month(s)", n),
        }
    }
}

/// One row of the member table, keyed by phone number
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemberRecord {
    pub timestamp: Option<DateTime<Utc>>,
    pub name: String,
    /// Phone as entered; identity is its normalized form
    pub phone: String,
    pub membership_type: Option<MembershipType>,
    pub duration: Option<MembershipDuration>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub status: MemberStatus,
    pub membership_fees: Option<f64>,
    /// `None` means the record was never activated
    pub payment_type: Option<PaymentType>,
    pub next_payment: Option<f64>,
    pub payment_due_date: Option<NaiveDate>,
    pub last_payment_date: Option<NaiveDate>,
    pub special_notes: String,
    pub total_paid: f64,
}

impl MemberRecord {
    /// Skeleton row for a self-registered customer awaiting activation
    pub fn pending(name: String, phone: String, special_notes: String, timestamp: DateTime<Utc>) -> Self {
        Self {
            timestamp: Some(timestamp),
            name,
            phone,
            membership_type: None,
            duration: None,
            start_date: None,
            end_date: None,
            status: MemberStatus::Pending,
            membership_fees: None,
            payment_type: None,
            next_payment: None,
            payment_due_date: None,
            last_payment_date: None,
            special_notes,
            total_paid: 0.0,
        }
    }

    pub fn is_activation_pending(&self) -> bool {
        self.payment_type.is_none()
    }

    /// Active and activated; a stored "Active" without a payment type does not count
    pub fn is_active_member(&self) -> bool {
        self.status == MemberStatus::Active && self.payment_type.is_some()
    }

    /// Date used to place membership fees inside a reporting window
    pub fn relevant_payment_date(&self) -> Option<NaiveDate> {
        self.last_payment_date.or(self.start_date)
    }
}

/// Partial update applied to a single record inside one store write.
///
/// `Option<Option<T>>` fields distinguish "leave alone" (`None`) from
/// "clear the cell" (`Some(None)`). Amount credits are added to the stored
/// value rather than replacing it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MemberPatch {
    pub membership_type: Option<Option<MembershipType>>,
    pub duration: Option<Option<MembershipDuration>>,
    pub start_date: Option<Option<NaiveDate>>,
    pub end_date: Option<Option<NaiveDate>>,
    pub status: Option<MemberStatus>,
    pub membership_fees: Option<Option<f64>>,
    pub payment_type: Option<Option<PaymentType>>,
    pub next_payment: Option<Option<f64>>,
    pub payment_due_date: Option<Option<NaiveDate>>,
    pub last_payment_date: Option<Option<NaiveDate>>,
    pub fees_credit: Option<f64>,
    pub total_paid_credit: Option<f64>,
}

impl MemberPatch {
    pub fn is_empty(&self) -> bool {
        *self == MemberPatch::default()
    }

    pub fn apply(&self, record: &mut MemberRecord) {
        if let Some(value) = &self.membership_type {
            record.membership_type = value.clone();
        }
        if let Some(value) = self.duration {
            record.duration = value;
        }
        if let Some(value) = self.start_date {
            record.start_date = value;
        }
        if let Some(value) = self.end_date {
            record.end_date = value;
        }
        if let Some(value) = self.status {
            record.status = value;
        }
        if let Some(value) = self.membership_fees {
            record.membership_fees = value;
        }
        if let Some(value) = &self.payment_type {
            record.payment_type = value.clone();
        }
        if let Some(value) = self.next_payment {
            record.next_payment = value;
        }
        if let Some(value) = self.payment_due_date {
            record.payment_due_date = value;
        }
        if let Some(value) = self.last_payment_date {
            record.last_payment_date = value;
        }
        if let Some(credit) = self.fees_credit {
            record.membership_fees = Some(record.membership_fees.unwrap_or(0.0) + credit);
        }
        if let Some(credit) = self.total_paid_credit {
            record.total_paid += credit.max(0.0);
        }
    }
}
