//! # IO Module
//!
//! Adapters between the outside world and the domain. Currently only the
//! REST endpoint used by the admin dashboard.

pub mod rest;

pub use rest::*;
