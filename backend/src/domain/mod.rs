//! # Domain Module
//!
//! Membership bookkeeping for the gym admin backend.
//!
//! This module owns the rules for how member records are created, activated,
//! extended and paid for, and how the dashboard summarises them. It is written
//! against the [`MemberStorage`](crate::storage::MemberStorage) trait and a
//! [`Clock`](clock::Clock), so it knows nothing about CSV files or HTTP.
//!
//! ## Module Organization
//!
//! - **models**: member record, enums and the partial-update patch
//! - **commands**: typed inputs and outputs of the services
//! - **membership_service**: every mutation of the member table
//! - **dashboard_service**: dashboard statistics and the expired list
//! - **date_utils**: flexible date parsing, month arithmetic, canonical formatting
//! - **clock**: source of "today"
//! - **errors**: the error taxonomy surfaced to the REST layer
//!
//! ## Business Rules
//!
//! - A phone number identifies exactly one record; duplicates are refused on create
//! - A record with no payment type is awaiting activation
//! - Only active records with a payment type count as members
//! - Total paid never decreases
//! - Expiry is computed from the end date, never stored

pub mod clock;
pub mod commands;
pub mod dashboard_service;
pub mod date_utils;
pub mod errors;
pub mod membership_service;
pub mod models;

pub use clock::{Clock, FixedClock, SystemClock};
pub use dashboard_service::DashboardService;
pub use errors::{MembershipError, MembershipResult};
pub use membership_service::MembershipService;
