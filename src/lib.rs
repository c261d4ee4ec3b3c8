//! SenseCard - Hypothesis group annotation retrieval and card mapping.
//!
//! Retrieves every annotation in a sense.tw Hypothesis group and converts
//! each one into a normalized card record for the card-management system.

pub mod cli;
pub mod hypothesis;
pub mod models;
