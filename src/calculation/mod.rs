//! Calculation logic for the Payroll Engine.
//!
//! This module contains the business-day resolver, the formula evaluator,
//! dependency resolution, proration, the per-component pipeline (evaluate,
//! prorate, round, cap), the single-employee run orchestrator, parallel batch
//! runs and the payment projection.

mod batch;
mod business_day;
mod component;
mod dependency;
mod formula;
mod payroll_run;
mod projection;
mod proration;
mod rounding;

pub use batch::{
    BatchOptions, BatchReport, CancellationFlag, EmployeeOutcome, NotProcessedReason, run_batch,
};
pub use business_day::{
    MAX_BUSINESS_DAY_SCAN, business_days_between, is_business_day, resolve_business_day,
};
pub use component::{ComponentValue, calculate};
pub use dependency::{CompiledComponent, ResolvedComponents, resolve_components};
pub use formula::{
    BinaryOp, CompiledCalc, Expr, Formula, Function, MAX_FORMULA_TOKENS, MAX_NESTING_DEPTH,
    RESERVED_VARIABLES, VariableScope, evaluate,
};
pub use payroll_run::{
    WARNING_CAP_APPLIED, WARNING_COMPONENT_FAILED, WARNING_PARTIAL_PERIOD, run,
};
pub use projection::{last_day_of_month, project, synthesize_period};
pub use proration::{ProrationFactor, proration_factor};
pub use rounding::{CapOutcome, MAX_ROUNDING_DECIMALS, apply_caps, apply_rounding};
