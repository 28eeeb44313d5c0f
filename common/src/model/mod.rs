//! Domain models for the point ledger

pub mod point;
