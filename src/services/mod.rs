// src/services/mod.rs
pub mod calculations;
pub mod calculator;
pub mod form;
pub mod gate;
pub mod notifier;
pub mod reference_data;
pub mod sessions;
pub mod valuation;
