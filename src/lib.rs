//! Advisorly - Consultation Booking Platform
//!
//! This crate implements the reservation and payment orchestration core
//! for a consultation-booking service: clients book fixed one-hour slots
//! with advisors, pay through an external gateway, and cancel under
//! time- and payment-state-dependent rules.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
