//! Payroll Computation & Projection Engine
//!
//! This crate computes per-employee payroll results from tenant-configured
//! salary components and projects upcoming payment obligations.
//!
//! Components are validated and ordered once per configuration version with
//! [`calculation::resolve_components`]. Each run then evaluates every component
//! through a fixed pipeline (evaluate, prorate, round, cap), isolating failures
//! to the failing component and its dependents. Runs are pure functions of
//! their inputs, so batches fan out across a worker pool and projections reuse
//! the same orchestrator.
//!
//! # Example
//!
//! ```no_run
//! use payroll_engine::calculation::{run_batch, BatchOptions};
//! use payroll_engine::config::ConfigLoader;
//! # use payroll_engine::models::{Employee, PayrollPeriod};
//! # fn roster() -> (Vec<Employee>, PayrollPeriod) { unimplemented!() }
//!
//! let config = ConfigLoader::load("./config/default").unwrap();
//! let (employees, period) = roster();
//!
//! let report = run_batch(&employees, &period, config.resolved(), &BatchOptions::default()).unwrap();
//! println!("{} complete, {} failed", report.completed, report.failed);
//! ```

#![warn(missing_docs)]

pub mod calculation;
pub mod config;
pub mod error;
pub mod models;
