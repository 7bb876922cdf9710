//! The structural type algebra and its comparison engine.
//!
//! Types are interned per module in a [`type_set::TypeSet`] and addressed by
//! [`types::TypeId`] handles. Two types with the same shape always get the same
//! handle inside one set. The comparison engine ([`compare::compare`]) answers
//! whether one type can stand in for another under a [`compare::ComparisonMode`],
//! and returns the diagnosis for the caller to report.
//!
//! - types: elementary kinds and the `Type` shapes
//! - type_set: interning, rendering and linearization
//! - conversion: the numeric conversion table
//! - compare: the comparison engine, mismatch reasons and conversion warnings

pub mod compare;
pub mod conversion;
pub mod type_set;
pub mod types;

#[cfg(test)]
mod tests;
