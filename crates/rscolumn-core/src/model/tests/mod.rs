//! Integration tests for the model module.
//!
//! These tests verify building a model from a process tree, the two-phase step,
//! tendency aggregation and the error policies.

#[cfg(test)]
mod basic;
#[cfg(test)]
mod error_policy;
