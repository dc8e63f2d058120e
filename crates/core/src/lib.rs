//! Core business logic for Procura.
//!
//! This crate contains pure business logic with ZERO web or database dependencies.
//! All domain types, validation rules, and state transitions live here.
//!
//! # Modules
//!
//! - `workflow` - Purchase request lifecycle state machine and authorization policy
//! - `request` - Purchase request input types and validation
//! - `extraction` - Optional document extraction hook

pub mod extraction;
pub mod request;
pub mod workflow;
