//! Core data models for the Payroll Engine.
//!
//! This module contains all the domain models used throughout the engine.

mod advance;
mod component;
mod employee;
mod pay_result;
mod period;
mod projection;

pub use advance::{AdvanceStatus, Installment, InstallmentStatus, SalaryAdvance};
pub use component::{
    ApplyTo, BaseVariable, CalcType, ComponentSet, ComponentType, RoundingMode,
    SalaryComponentDefinition,
};
pub use employee::Employee;
pub use pay_result::{
    AuditStep, AuditWarning, ComponentLine, ComponentStatus, PayComputationResult, PayTotals,
    RunStatus,
};
pub use period::{Holiday, HolidayCalendar, PayrollPeriod, PeriodType};
pub use projection::{
    AlertKind, NextPayment, PendingAdvance, ProjectedPayment, ProjectionAlert, ProjectionSummary,
};
