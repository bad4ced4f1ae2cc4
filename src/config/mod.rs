//! Configuration loading and management for the Payroll Engine.
//!
//! This module loads a tenant's configuration from YAML files: the versioned
//! salary component set, the holiday calendar, and the payment schedule used
//! for projections.
//!
//! # Example
//!
//! ```no_run
//! use payroll_engine::config::ConfigLoader;
//!
//! let config = ConfigLoader::load("./config/default").unwrap();
//! println!("Loaded component set version {}", config.version());
//! ```

mod loader;
mod types;

pub use loader::ConfigLoader;
pub use types::{
    HolidaysConfig, PaymentDayRule, PaymentFrequency, PayrollConfig, ProjectionConfig,
};
