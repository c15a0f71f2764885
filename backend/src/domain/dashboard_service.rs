//! Dashboard aggregation over the member table.
//!
//! Both queries are a single scan: every record is classified against
//! "today" and the requested reporting window, then the lists are sorted
//! most-urgent first.

use chrono::NaiveDate;
use std::sync::Arc;
use tracing::{debug, info};

use crate::config::MembershipRules;
use crate::domain::clock::Clock;
use crate::domain::commands::dashboard::{
    DashboardQuery, DashboardReport, DateWindow, ExpiredEntry, ExpiringEntry, PaymentDueEntry,
    PendingEntry,
};
use crate::domain::date_utils::{days_between, month_bounds};
use crate::domain::errors::MembershipResult;
use crate::domain::models::MemberRecord;
use crate::storage::MemberStorage;

#[derive(Clone)]
pub struct DashboardService {
    storage: Arc<dyn MemberStorage>,
    clock: Arc<dyn Clock>,
    rules: MembershipRules,
}

impl DashboardService {
    pub fn new(storage: Arc<dyn MemberStorage>, clock: Arc<dyn Clock>, rules: MembershipRules) -> Self {
        Self {
            storage,
            clock,
            rules,
        }
    }

    pub async fn get_dashboard_data(&self, query: DashboardQuery) -> MembershipResult<DashboardReport> {
        let records = self.storage.scan_all().await?;
        let today = self.clock.today();
        let window = resolve_window(query.window, today);
        let alert_days = self.rules.alert_window_days;

        let mut report = DashboardReport::default();

        for record in &records {
            if record.is_activation_pending() {
                report.activation_pending += 1;
                report.pending.push(PendingEntry {
                    name: record.name.clone(),
                    phone: record.phone.clone(),
                    special_notes: record.special_notes.clone(),
                });
            }

            if !record.is_active_member() {
                continue;
            }
            report.active_members += 1;

            if let Some(fees) = record.membership_fees.filter(|fees| *fees > 0.0) {
                if fees_in_window(record, window) {
                    report.total_membership_cost += fees;
                }
            }

            let mut expiring = false;
            if let Some(end_date) = record.end_date {
                let days_left = days_between(today, end_date);
                if (1..=alert_days).contains(&days_left) {
                    expiring = true;
                    report.expiring_soon += 1;
                    report.expiring.push(ExpiringEntry {
                        name: record.name.clone(),
                        phone: record.phone.clone(),
                        days_left,
                        end_date,
                    });
                }
            }

            // An expiring membership is reported once, as expiring, not also as a payment
            if expiring {
                continue;
            }
            if let Some(due_date) = record.payment_due_date {
                if record.end_date == Some(due_date) {
                    continue;
                }
                let days_until_payment = days_between(today, due_date);
                if (0..=alert_days).contains(&days_until_payment) {
                    let amount = record.next_payment.unwrap_or(0.0);
                    if amount > 0.0 {
                        report.payments_total += amount;
                    }
                    report.payments_due.push(PaymentDueEntry {
                        name: record.name.clone(),
                        phone: record.phone.clone(),
                        amount,
                        days_until_payment,
                        payment_due_date: due_date,
                    });
                }
            }
        }

        report.expiring.sort_by_key(|entry| entry.days_left);
        report.expiring.truncate(self.rules.expiring_list_limit);
        report.payments_due.sort_by_key(|entry| entry.days_until_payment);

        debug!("Dashboard scan covered {} rows", records.len());
        info!(
            "📊 Dashboard: {} active, {} pending, {} expiring, {} payments due",
            report.active_members,
            report.activation_pending,
            report.expiring_soon,
            report.payments_due.len()
        );
        Ok(report)
    }

    /// Records whose end date is today or earlier, most recently expired first.
    pub async fn get_expired_members(&self) -> MembershipResult<Vec<ExpiredEntry>> {
        let records = self.storage.scan_all().await?;
        let today = self.clock.today();

        let mut expired: Vec<ExpiredEntry> = records
            .into_iter()
            .filter_map(|record| {
                let end_date = record.end_date?;
                let days_expired = days_between(end_date, today);
                (days_expired >= 0).then_some(ExpiredEntry {
                    record,
                    end_date,
                    days_expired,
                })
            })
            .collect();
        expired.sort_by_key(|entry| entry.days_expired);

        info!("Found {} expired memberships", expired.len());
        Ok(expired)
    }
}

/// Concrete inclusive bounds for a window; `None` means unbounded
fn resolve_window(window: DateWindow, today: NaiveDate) -> Option<(NaiveDate, NaiveDate)> {
    match window {
        DateWindow::All => None,
        DateWindow::CurrentMonth => Some(month_bounds(today)),
        DateWindow::Between(start, end) => Some((start, end)),
    }
}

/// Records without a usable payment or start date only count when unfiltered
fn fees_in_window(record: &MemberRecord, window: Option<(NaiveDate, NaiveDate)>) -> bool {
    match window {
        None => true,
        Some((start, end)) => record
            .relevant_payment_date()
            .is_some_and(|date| date >= start && date <= end),
    }
}
