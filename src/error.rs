//! Error types for the Payroll Engine.
//!
//! This module provides strongly-typed errors using the `thiserror` crate.
//! [`EngineError`] covers configuration and precondition failures that stop a
//! run or a whole batch, while [`EvaluationError`] covers failures that are local
//! to a single salary component and get recorded on the result instead.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use thiserror::Error;

/// The main error type for the Payroll Engine.
///
/// # Example
///
/// ```
/// use payroll_engine::error::EngineError;
///
/// let error = EngineError::UnknownDependency {
///     component: "PRESENTISMO".to_string(),
///     dependency: "BASIC".to_string(),
/// };
/// assert_eq!(
///     error.to_string(),
///     "Component 'PRESENTISMO' depends on unknown component 'BASIC'"
/// );
/// assert!(error.is_configuration_error());
/// ```
#[derive(Debug, Error)]
pub enum EngineError {
    /// Configuration file was not found at the specified path.
    #[error("Configuration file not found: {path}")]
    ConfigNotFound {
        /// The path that was not found.
        path: String,
    },

    /// Configuration file could not be parsed.
    #[error("Failed to parse configuration file '{path}': {message}")]
    ConfigParseError {
        /// The path to the file that failed to parse.
        path: String,
        /// A description of the parse error.
        message: String,
    },

    /// Two components share the same code.
    #[error("Duplicate component code: {code}")]
    DuplicateComponent {
        /// The duplicated code.
        code: String,
    },

    /// A component code shadows a built-in formula variable.
    #[error("Component code '{code}' is reserved for a built-in variable")]
    ReservedComponentCode {
        /// The offending code.
        code: String,
    },

    /// A component depends on a code that is not part of the configured set.
    #[error("Component '{component}' depends on unknown component '{dependency}'")]
    UnknownDependency {
        /// The component declaring the dependency.
        component: String,
        /// The missing dependency code.
        dependency: String,
    },

    /// The dependency graph contains a cycle.
    #[error("Cyclic dependency between components: {}", cycle.join(" -> "))]
    CyclicDependency {
        /// The codes forming the cycle, with the first code repeated at the end.
        cycle: Vec<String>,
    },

    /// `cap_min` is greater than `cap_max`.
    #[error("Component '{component}' has cap_min {min} greater than cap_max {max}")]
    InvalidCapRange {
        /// The component code.
        component: String,
        /// The configured minimum.
        min: Decimal,
        /// The configured maximum.
        max: Decimal,
    },

    /// Rounding decimals beyond what a decimal value can carry.
    #[error("Component '{component}' has invalid rounding decimals {decimals}")]
    InvalidRoundingDecimals {
        /// The component code.
        component: String,
        /// The configured number of decimals.
        decimals: u32,
    },

    /// A FIXED, PERCENTAGE or DAYS_BASED component has no `calc_value`.
    #[error("Component '{component}' requires a calc_value")]
    MissingCalcValue {
        /// The component code.
        component: String,
    },

    /// A FORMULA component has no `calc_formula`.
    #[error("Component '{component}' requires a calc_formula")]
    MissingFormula {
        /// The component code.
        component: String,
    },

    /// Component code was not found in the configuration.
    #[error("Component not found: {code}")]
    ComponentNotFound {
        /// The component code that was not found.
        code: String,
    },

    /// The projection configuration is inconsistent.
    #[error("Invalid projection configuration: {message}")]
    InvalidProjectionConfig {
        /// A description of the problem.
        message: String,
    },

    /// A business-day walk did not find a business day within the scan limit.
    #[error("No business day found within {max_days} days of {date}")]
    CalendarConfiguration {
        /// The date the walk started from.
        date: NaiveDate,
        /// The scan limit that was exhausted.
        max_days: u32,
    },

    /// The period is closed and cannot receive new results.
    #[error("Payroll period {period} is closed")]
    PeriodClosed {
        /// A label identifying the period.
        period: String,
    },

    /// A period record was invalid or contained inconsistent data.
    #[error("Invalid period '{period}': {message}")]
    InvalidPeriod {
        /// A label identifying the period.
        period: String,
        /// A description of what made the period invalid.
        message: String,
    },

    /// An employee record was invalid or contained inconsistent data.
    #[error("Invalid employee '{employee_id}': {message}")]
    InvalidEmployee {
        /// The ID of the invalid employee.
        employee_id: String,
        /// A description of what made the record invalid.
        message: String,
    },

    /// The batch worker pool could not be created.
    #[error("Worker pool error: {message}")]
    WorkerPool {
        /// A description of the failure.
        message: String,
    },
}

impl EngineError {
    /// Returns true for errors detected while validating a component
    /// configuration. These block every run for the configuration.
    pub fn is_configuration_error(&self) -> bool {
        matches!(
            self,
            EngineError::ConfigNotFound { .. }
                | EngineError::ConfigParseError { .. }
                | EngineError::DuplicateComponent { .. }
                | EngineError::ReservedComponentCode { .. }
                | EngineError::UnknownDependency { .. }
                | EngineError::CyclicDependency { .. }
                | EngineError::InvalidCapRange { .. }
                | EngineError::InvalidRoundingDecimals { .. }
                | EngineError::MissingCalcValue { .. }
                | EngineError::MissingFormula { .. }
                | EngineError::InvalidProjectionConfig { .. }
        )
    }
}

/// A type alias for Results that return EngineError.
pub type EngineResult<T> = Result<T, EngineError>;

/// A failure while evaluating a single component.
///
/// These never abort a run. They are recorded against the failing component
/// and propagated to the components that depend on it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EvaluationError {
    /// The formula text could not be parsed.
    #[error("Syntax error at position {position}: {message}")]
    Syntax {
        /// Character offset of the error.
        position: usize,
        /// A description of the problem.
        message: String,
    },

    /// The formula references a name that is not in scope.
    #[error("Unknown variable: {name}")]
    UnknownVariable {
        /// The unresolved identifier.
        name: String,
    },

    /// The formula calls a function the evaluator does not provide.
    #[error("Unknown function: {name}")]
    UnknownFunction {
        /// The unresolved function name.
        name: String,
    },

    /// A function received an argument it cannot use.
    #[error("Invalid argument to {function}: {message}")]
    InvalidArgument {
        /// The function name.
        function: String,
        /// A description of the problem.
        message: String,
    },

    /// A division had a zero divisor.
    #[error("Division by zero")]
    DivisionByZero,

    /// An arithmetic operation overflowed the decimal range.
    #[error("Arithmetic overflow in {operation}")]
    Overflow {
        /// The operation that overflowed.
        operation: String,
    },
}
