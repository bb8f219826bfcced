//! Recurrence evaluation: rule normalization, lazy occurrence generation, enumeration queries
//! and rule-set composition.

pub mod error;
pub mod recurrence;
