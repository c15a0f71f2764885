//! Spreadsheet-style persistence: one CSV file per sheet, one header row,
//! one row per member.

pub mod connection;
pub mod member_repository;

#[cfg(test)]
pub mod test_utils;

pub use connection::{CsvConnection, MEMBER_COLUMNS};
pub use member_repository::CsvMemberRepository;
