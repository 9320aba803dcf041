//! Domain records and their repositories.

pub mod company;
pub mod job;
