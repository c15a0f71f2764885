use shared::{
    DashboardData, DashboardStats, ExpiredMember, ExpiringMember, MemberDetails, PaymentDue,
    PaymentsDue, PendingActivation, PendingActivations,
};

use crate::domain::commands::dashboard::{DashboardReport, ExpiredEntry};
use crate::domain::date_utils::{format_date, format_optional_date};
use crate::domain::models::MemberRecord;

/// Placeholder shown for rows saved without a name
const UNKNOWN_NAME: &str = "Unknown";

fn display_name(name: &str) -> String {
    if name.trim().is_empty() {
        UNKNOWN_NAME.to_string()
    } else {
        name.to_string()
    }
}

/// Mapper from domain member records and reports to shared DTOs.
pub struct MemberMapper;

impl MemberMapper {
    pub fn to_details_dto(record: MemberRecord) -> MemberDetails {
        MemberDetails {
            timestamp: record.timestamp.map(|t| t.to_rfc3339()).unwrap_or_default(),
            name: record.name,
            phone_number: record.phone,
            membership_type: record.membership_type.map(|t| t.to_string()).unwrap_or_default(),
            duration: record.duration.map(|d| d.to_string()).unwrap_or_default(),
            start_date: format_optional_date(record.start_date),
            end_date: format_optional_date(record.end_date),
            status: record.status.to_string(),
            membership_fees: record.membership_fees,
            payment_type: record.payment_type.map(|p| p.to_string()).unwrap_or_default(),
            next_payment: record.next_payment,
            payment_due_date: format_optional_date(record.payment_due_date),
            last_payment_date: format_optional_date(record.last_payment_date),
            special_notes: record.special_notes,
            total_paid: record.total_paid,
        }
    }

    pub fn to_dashboard_dto(report: DashboardReport) -> DashboardData {
        DashboardData {
            stats: DashboardStats {
                active_members: report.active_members,
                activation_pending: report.activation_pending,
                expiring_soon: report.expiring_soon,
                total_membership_cost: report.total_membership_cost,
            },
            expiring_members: report
                .expiring
                .into_iter()
                .map(|entry| ExpiringMember {
                    name: display_name(&entry.name),
                    phone: entry.phone,
                    days_left: entry.days_left,
                    end_date: format_date(entry.end_date),
                })
                .collect(),
            pending_activations: PendingActivations {
                count: report.activation_pending,
                list: report
                    .pending
                    .into_iter()
                    .map(|entry| PendingActivation {
                        name: display_name(&entry.name),
                        phone: entry.phone,
                        special_notes: entry.special_notes,
                    })
                    .collect(),
            },
            payments: PaymentsDue {
                count: report.payments_due.len() as u32,
                total_amount: report.payments_total,
                list: report
                    .payments_due
                    .into_iter()
                    .map(|entry| PaymentDue {
                        name: display_name(&entry.name),
                        phone: entry.phone,
                        amount: entry.amount,
                        days_until_payment: entry.days_until_payment,
                        payment_due_date: format_date(entry.payment_due_date),
                    })
                    .collect(),
            },
        }
    }

    pub fn to_expired_dto(entry: ExpiredEntry) -> ExpiredMember {
        let record = entry.record;
        ExpiredMember {
            name: display_name(&record.name),
            phone: record.phone,
            membership_type: record.membership_type.map(|t| t.to_string()).unwrap_or_default(),
            duration: record.duration.map(|d| d.to_string()).unwrap_or_default(),
            start_date: format_optional_date(record.start_date),
            end_date: format_date(entry.end_date),
            days_expired: entry.days_expired,
            status: record.status.to_string(),
        }
    }

    pub fn to_expired_list_dto(entries: Vec<ExpiredEntry>) -> Vec<ExpiredMember> {
        entries.into_iter().map(Self::to_expired_dto).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::commands::dashboard::{ExpiringEntry, PaymentDueEntry, PendingEntry};
    use crate::domain::models::{MemberStatus, MembershipDuration, MembershipType, PaymentType};
    use chrono::{NaiveDate, Utc};

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_details_use_canonical_dates() {
        let mut record = MemberRecord::pending("Ira".to_string(), "555 0100".to_string(), "VIP locker".to_string(), Utc::now());
        record.membership_type = Some(MembershipType::Vip);
        record.duration = Some(MembershipDuration::Months(12));
        record.start_date = Some(ymd(2025, 1, 5));
        record.end_date = Some(ymd(2026, 1, 5));
        record.status = MemberStatus::Active;
        record.payment_type = Some(PaymentType::Full);

        let dto = MemberMapper::to_details_dto(record);
        assert_eq!(dto.phone_number, "555 0100");
        assert_eq!(dto.membership_type, "VIP");
        assert_eq!(dto.duration, "12 Month(s)");
        assert_eq!(dto.start_date, "1/5/2025");
        assert_eq!(dto.end_date, "1/5/2026");
        assert_eq!(dto.payment_due_date, "");
        assert_eq!(dto.status, "Active");
        assert_eq!(dto.payment_type, "Full");
    }

    #[test]
    fn test_dashboard_dto_counts() {
        let report = DashboardReport {
            active_members: 4,
            activation_pending: 1,
            expiring_soon: 1,
            total_membership_cost: 5000.0,
            expiring: vec![ExpiringEntry {
                name: "".to_string(),
                phone: "5550001".to_string(),
                days_left: 2,
                end_date: ymd(2025, 6, 17),
            }],
            pending: vec![PendingEntry {
                name: "New".to_string(),
                phone: "5550002".to_string(),
                special_notes: String::new(),
            }],
            payments_due: vec![PaymentDueEntry {
                name: "Owes".to_string(),
                phone: "5550003".to_string(),
                amount: 700.0,
                days_until_payment: 0,
                payment_due_date: ymd(2025, 6, 15),
            }],
            payments_total: 700.0,
        };

        let dto = MemberMapper::to_dashboard_dto(report);
        assert_eq!(dto.stats.active_members, 4);
        assert_eq!(dto.expiring_members[0].name, "Unknown");
        assert_eq!(dto.expiring_members[0].end_date, "6/17/2025");
        assert_eq!(dto.pending_activations.count, 1);
        assert_eq!(dto.payments.count, 1);
        assert_eq!(dto.payments.total_amount, 700.0);
        assert_eq!(dto.payments.list[0].payment_due_date, "6/15/2025");
    }
}
