//! Membership service: every mutation of the member table.
//!
//! Each handler resolves the member by phone, computes the new field values
//! from the stored record and "today", and hands the store a single
//! [`MemberPatch`] so the row is rewritten once.

use chrono::NaiveDate;
use std::sync::Arc;
use tracing::{info, warn};

use crate::config::MembershipRules;
use crate::domain::clock::Clock;
use crate::domain::commands::members::{
    ActivateMemberCommand, AddCustomerCommand, AddMemberCommand, ExtendMembershipCommand,
    MarkPaymentPaidCommand, MutationResult, PaymentTerms,
};
use crate::domain::date_utils::add_months;
use crate::domain::errors::{MembershipError, MembershipResult};
use crate::domain::models::{
    normalize_phone, MemberPatch, MemberRecord, MemberStatus, MembershipDuration, PaymentType,
    PhoneKey,
};
use crate::storage::MemberStorage;

const MAX_NAME_LENGTH: usize = 100;
const MAX_DURATION_MONTHS: u32 = 120;

#[derive(Clone)]
pub struct MembershipService {
    storage: Arc<dyn MemberStorage>,
    clock: Arc<dyn Clock>,
    rules: MembershipRules,
}

impl MembershipService {
    pub fn new(storage: Arc<dyn MemberStorage>, clock: Arc<dyn Clock>, rules: MembershipRules) -> Self {
        Self {
            storage,
            clock,
            rules,
        }
    }

    fn phone_key(&self, phone: &str) -> MembershipResult<PhoneKey> {
        validate_phone(phone)?;
        Ok(PhoneKey::new(phone, self.rules.country_code()))
    }

    async fn find_existing(&self, key: &PhoneKey) -> MembershipResult<MemberRecord> {
        self.storage
            .find_by_phone(key)
            .await?
            .ok_or_else(|| MembershipError::NotFound {
                phone: key.to_string(),
            })
    }

    async fn apply_patch(&self, key: &PhoneKey, patch: &MemberPatch) -> MembershipResult<MemberRecord> {
        self.storage
            .update(key, patch)
            .await?
            .ok_or_else(|| MembershipError::NotFound {
                phone: key.to_string(),
            })
    }

    /// Does any record carry this phone number?
    pub async fn check_phone_number(&self, phone: &str) -> MembershipResult<bool> {
        if phone.trim().is_empty() {
            return Err(MembershipError::validation("Phone number is required"));
        }
        let key = PhoneKey::new(phone, self.rules.country_code());
        let exists = self.storage.find_by_phone(&key).await?.is_some();
        info!("Phone lookup for {}: {}", key, if exists { "exists" } else { "not found" });
        Ok(exists)
    }

    /// Full record for the member-lookup panel
    pub async fn get_member_details(&self, phone: &str) -> MembershipResult<MemberRecord> {
        if phone.trim().is_empty() {
            return Err(MembershipError::validation("Phone number is required"));
        }
        let key = PhoneKey::new(phone, self.rules.country_code());
        self.find_existing(&key).await
    }

    /// Create a fully specified, active member starting today.
    pub async fn add_member(&self, command: AddMemberCommand) -> MembershipResult<MutationResult> {
        let name = validate_name(&command.name)?;
        let key = self.phone_key(&command.phone)?;
        validate_months(command.duration_months)?;
        validate_amount("Membership fees", command.membership_fees)?;
        validate_terms(&command.terms)?;

        let start_date = self.clock.today();
        let end_date = add_months(start_date, command.duration_months);
        let (next_payment, payment_due_date, total_paid) =
            payment_fields(&command.terms, command.membership_fees, Some(end_date));

        let record = MemberRecord {
            timestamp: Some(command.timestamp.unwrap_or_else(|| self.clock.now())),
            name,
            phone: command.phone.trim().to_string(),
            membership_type: Some(command.membership_type.clone()),
            duration: Some(MembershipDuration::Months(command.duration_months)),
            start_date: Some(start_date),
            end_date: Some(end_date),
            status: MemberStatus::Active,
            membership_fees: Some(command.membership_fees),
            payment_type: Some(command.terms.payment_type()),
            next_payment,
            payment_due_date,
            last_payment_date: Some(start_date),
            special_notes: String::new(),
            total_paid,
        };

        if !self.storage.append(&key, &record).await? {
            warn!("Refusing to add member {}: number already registered", key);
            return Err(MembershipError::DuplicateKey {
                phone: key.to_string(),
            });
        }
        info!(
            "✅ Added member {} ({}, {} month(s), {} payment)",
            key,
            command.membership_type,
            command.duration_months,
            command.terms.payment_type()
        );
        Ok(MutationResult::new("Member added successfully"))
    }

    /// Register a walk-in customer as a pending record awaiting activation.
    pub async fn add_customer(&self, command: AddCustomerCommand) -> MembershipResult<MutationResult> {
        let name = validate_name(&command.name)?;
        let key = self.phone_key(&command.phone)?;

        let record = MemberRecord::pending(
            name,
            command.phone.trim().to_string(),
            command.special_notes.trim().to_string(),
            command.timestamp.unwrap_or_else(|| self.clock.now()),
        );
        if !self.storage.append(&key, &record).await? {
            warn!("Refusing to register customer {}: number already registered", key);
            return Err(MembershipError::DuplicateKey {
                phone: key.to_string(),
            });
        }

        info!("📝 Registered customer {} pending activation", key);
        Ok(MutationResult::new("Customer information submitted successfully"))
    }

    /// Turn an existing record into an active membership starting today.
    ///
    /// Daily plans carry no start, end or last-payment date. The amount paid
    /// now is credited on top of whatever the member has paid before.
    pub async fn activate_member(&self, command: ActivateMemberCommand) -> MembershipResult<MutationResult> {
        let key = self.phone_key(&command.phone)?;
        if let MembershipDuration::Months(months) = command.duration {
            validate_months(months)?;
        }
        validate_amount("Membership fees", command.membership_fees)?;
        validate_terms(&command.terms)?;

        self.find_existing(&key).await?;

        let today = self.clock.today();
        let (start_date, end_date, last_payment_date) = match command.duration {
            MembershipDuration::Daily => (None, None, None),
            MembershipDuration::Months(months) => (Some(today), Some(add_months(today, months)), Some(today)),
        };
        let (next_payment, payment_due_date, paid_now) =
            payment_fields(&command.terms, command.membership_fees, end_date);

        let patch = MemberPatch {
            membership_type: Some(Some(command.membership_type.clone())),
            duration: Some(Some(command.duration)),
            start_date: Some(start_date),
            end_date: Some(end_date),
            status: Some(MemberStatus::Active),
            membership_fees: Some(Some(command.membership_fees)),
            payment_type: Some(Some(command.terms.payment_type())),
            next_payment: Some(next_payment),
            payment_due_date: Some(payment_due_date),
            last_payment_date: Some(last_payment_date),
            total_paid_credit: Some(paid_now),
            ..Default::default()
        };
        self.apply_patch(&key, &patch).await?;

        info!("✅ Activated member {} ({}, {})", key, command.membership_type, command.duration);
        Ok(MutationResult::new("Member activated successfully"))
    }

    /// Push the end date out by whole months.
    ///
    /// The new end is counted from the current end date when there is one,
    /// otherwise from the start date (or today) over the combined duration.
    /// Amounts owed and paid are left untouched.
    pub async fn extend_membership(&self, command: ExtendMembershipCommand) -> MembershipResult<MutationResult> {
        let key = self.phone_key(&command.phone)?;
        validate_months(command.additional_months)?;

        let record = self.find_existing(&key).await?;
        let today = self.clock.today();

        let current_months = record.duration.map(|d| d.months()).unwrap_or(0);
        let total_months = current_months.saturating_add(command.additional_months);

        let new_end_date = match (record.end_date, record.start_date) {
            (Some(end), _) => add_months(end, command.additional_months),
            (None, Some(start)) => add_months(start, total_months),
            (None, None) => add_months(today, total_months),
        };

        let patch = MemberPatch {
            duration: Some(Some(MembershipDuration::Months(total_months))),
            end_date: Some(Some(new_end_date)),
            payment_due_date: Some(Some(new_end_date)),
            last_payment_date: command.payment_date.map(|date| Some(date.resolve(today))),
            ..Default::default()
        };
        self.apply_patch(&key, &patch).await?;

        info!(
            "📅 Extended membership {} by {} month(s), now ends {}",
            key, command.additional_months, new_end_date
        );
        Ok(MutationResult::new("Membership extended successfully"))
    }

    /// Record one daily visit: the pass fee is added to both the fees and the total paid.
    pub async fn add_daily_pass(&self, phone: &str) -> MembershipResult<MutationResult> {
        let key = self.phone_key(phone)?;
        let fee = self.rules.daily_pass_fee;

        let patch = MemberPatch {
            fees_credit: Some(fee),
            total_paid_credit: Some(fee),
            ..Default::default()
        };
        let updated = self.apply_patch(&key, &patch).await?;

        info!(
            "🎟️ Daily pass for {}: fees now {}, total paid {}",
            key,
            updated.membership_fees.unwrap_or(0.0),
            updated.total_paid
        );
        Ok(MutationResult::new(format!(
            "Daily pass added successfully. ₹{} added to membership fees.",
            fee
        )))
    }

    /// Record receipt of the outstanding payment and roll the schedule forward.
    ///
    /// The amount credited is the stored next payment, or the membership fee
    /// when no next payment is recorded. Repeating the call credits again.
    pub async fn mark_payment_paid(&self, command: MarkPaymentPaidCommand) -> MembershipResult<MutationResult> {
        let key = self.phone_key(&command.phone)?;
        let record = self.find_existing(&key).await?;
        let payment_date = command.payment_date.resolve(self.clock.today());

        let credited = match record.next_payment {
            Some(amount) if amount != 0.0 => amount,
            _ => record.membership_fees.unwrap_or(0.0),
        };

        let patch = MemberPatch {
            payment_type: Some(Some(PaymentType::Full)),
            next_payment: Some(Some(record.membership_fees.unwrap_or(0.0))),
            payment_due_date: Some(record.end_date),
            last_payment_date: Some(Some(payment_date)),
            total_paid_credit: Some(credited),
            ..Default::default()
        };
        let updated = self.apply_patch(&key, &patch).await?;

        info!(
            "💰 Payment of {} recorded for {} on {}, total paid {}",
            credited, key, payment_date, updated.total_paid
        );
        Ok(MutationResult::new("Payment marked as paid successfully"))
    }
}

/// Next payment, its due date and the amount paid right now for the chosen terms
fn payment_fields(
    terms: &PaymentTerms,
    membership_fees: f64,
    end_date: Option<NaiveDate>,
) -> (Option<f64>, Option<NaiveDate>, f64) {
    match terms {
        PaymentTerms::Full => (Some(membership_fees), end_date, membership_fees),
        PaymentTerms::Partial {
            next_payment,
            payment_due_date,
        } => (*next_payment, *payment_due_date, 0.0),
    }
}

fn validate_name(name: &str) -> MembershipResult<String> {
    let name = name.trim();
    if name.is_empty() {
        return Err(MembershipError::validation("Name is required"));
    }
    if name.chars().count() > MAX_NAME_LENGTH {
        return Err(MembershipError::validation(format!(
            "Name cannot exceed {} characters",
            MAX_NAME_LENGTH
        )));
    }
    Ok(name.to_string())
}

fn validate_phone(phone: &str) -> MembershipResult<()> {
    let normalized: String = normalize_phone(phone).chars().filter(|c| *c != '.').collect();
    if normalized.is_empty() {
        return Err(MembershipError::validation("Phone number is required"));
    }
    let digits = normalized.strip_prefix('+').unwrap_or(&normalized);
    let valid = (5..=15).contains(&digits.len()) && digits.chars().all(|c| c.is_ascii_digit());
    if !valid {
        return Err(MembershipError::validation(format!(
            "Invalid phone number '{}'",
            phone.trim()
        )));
    }
    Ok(())
}

fn validate_months(months: u32) -> MembershipResult<()> {
    if months == 0 || months > MAX_DURATION_MONTHS {
        return Err(MembershipError::validation(format!(
            "Duration must be between 1 and {} months",
            MAX_DURATION_MONTHS
        )));
    }
    Ok(())
}

fn validate_amount(label: &str, amount: f64) -> MembershipResult<()> {
    if !amount.is_finite() || amount < 0.0 {
        return Err(MembershipError::validation(format!(
            "{} must be a non-negative amount",
            label
        )));
    }
    Ok(())
}

fn validate_terms(terms: &PaymentTerms) -> MembershipResult<()> {
    if let PaymentTerms::Partial {
        next_payment: Some(amount),
        ..
    } = terms
    {
        validate_amount("Next payment", *amount)?;
    }
    Ok(())
}
