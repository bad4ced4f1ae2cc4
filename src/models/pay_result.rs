//! Pay computation result models.
//!
//! This module contains the [`PayComputationResult`] type and its associated
//! structures: per-component line items, totals, and the audit trace of every
//! component evaluated during a run.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::ComponentType;

/// Lifecycle of one employee's run within a period.
///
/// Runs move `Pending -> Evaluating -> Complete | Failed`. A batch may also
/// report `NotProcessed` for employees it never started.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RunStatus {
    /// Not started.
    Pending,
    /// Components are being evaluated.
    Evaluating,
    /// All mandatory components succeeded (optional ones may have failed).
    Complete,
    /// A mandatory component failed or was skipped.
    Failed,
    /// Never started because the batch was cancelled or ran out of time.
    NotProcessed,
}

impl RunStatus {
    /// Returns true if moving from `self` to `next` is a legal transition.
    ///
    /// # Example
    ///
    /// ```
    /// use payroll_engine::models::RunStatus;
    ///
    /// assert!(RunStatus::Pending.can_transition_to(RunStatus::Evaluating));
    /// assert!(RunStatus::Evaluating.can_transition_to(RunStatus::Failed));
    /// assert!(!RunStatus::Complete.can_transition_to(RunStatus::Evaluating));
    /// ```
    pub fn can_transition_to(self, next: RunStatus) -> bool {
        matches!(
            (self, next),
            (RunStatus::Pending, RunStatus::Evaluating)
                | (RunStatus::Pending, RunStatus::NotProcessed)
                | (RunStatus::Evaluating, RunStatus::Complete)
                | (RunStatus::Evaluating, RunStatus::Failed)
        )
    }

    /// Returns true for states a run never leaves.
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            RunStatus::Complete | RunStatus::Failed | RunStatus::NotProcessed
        )
    }
}

/// Outcome of a single component within a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ComponentStatus {
    /// Evaluated successfully.
    Complete,
    /// Evaluation failed.
    Failed {
        /// Why evaluation failed.
        reason: String,
    },
    /// Not evaluated because a component it depends on failed.
    SkippedDueToDependencyFailure {
        /// The dependency that failed or was skipped.
        failed_dependency: String,
    },
    /// The component's population filter excludes this employee.
    NotApplicable,
}

impl ComponentStatus {
    /// Returns true for `Failed` and `SkippedDueToDependencyFailure`.
    pub fn is_failure(&self) -> bool {
        matches!(
            self,
            ComponentStatus::Failed { .. } | ComponentStatus::SkippedDueToDependencyFailure { .. }
        )
    }
}

/// One component's values within a run.
///
/// Values are `None` when the component did not evaluate. The four values are
/// the pipeline stages in order: evaluation, proration, rounding, caps.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComponentLine {
    /// The component code.
    pub component_code: String,
    /// Earning or deduction.
    pub component_type: ComponentType,
    /// Value produced by the calc type.
    pub raw_value: Option<Decimal>,
    /// Value after proration.
    pub prorated_value: Option<Decimal>,
    /// Value after rounding.
    pub rounded_value: Option<Decimal>,
    /// Final value after caps; this is the component's contribution.
    pub capped_value: Option<Decimal>,
    /// Outcome of the component.
    pub status: ComponentStatus,
}

/// Aggregated totals for a run.
///
/// # Example
///
/// ```
/// use payroll_engine::models::PayTotals;
/// use rust_decimal::Decimal;
///
/// let totals = PayTotals::zero();
/// assert_eq!(totals.net_total, Decimal::ZERO);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayTotals {
    /// Sum of completed earnings.
    pub gross_total: Decimal,
    /// Sum of completed deductions.
    pub deductions_total: Decimal,
    /// `gross_total - deductions_total`.
    pub net_total: Decimal,
    /// Sum of completed taxable earnings.
    pub taxable_total: Decimal,
}

impl PayTotals {
    /// All totals at zero.
    pub fn zero() -> Self {
        Self {
            gross_total: Decimal::ZERO,
            deductions_total: Decimal::ZERO,
            net_total: Decimal::ZERO,
            taxable_total: Decimal::ZERO,
        }
    }
}

/// A single step in the audit trace, one per evaluated component.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditStep {
    /// The sequential step number.
    pub step_number: u32,
    /// The component evaluated in this step.
    pub component_code: String,
    /// The inputs used for this step.
    pub input: serde_json::Value,
    /// The values produced by this step.
    pub output: serde_json::Value,
    /// Human-readable explanation.
    pub reasoning: String,
}

/// A warning generated during a run.
///
/// Warnings flag conditions that do not stop a run but deserve review.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditWarning {
    /// A code identifying the type of warning.
    pub code: String,
    /// A human-readable description.
    pub message: String,
    /// The component the warning concerns, if any.
    pub component_code: Option<String>,
}

/// The complete result of one employee's run in one period.
///
/// Results are created fresh on every run and carry no timestamps or random
/// identifiers, so the same inputs always serialize to the same bytes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayComputationResult {
    /// The employee the result is for.
    pub employee_id: String,
    /// Label of the period (see [`crate::models::PayrollPeriod::label`]).
    pub period: String,
    /// Final state of the run.
    pub status: RunStatus,
    /// Active days over period days.
    pub proration_factor: Decimal,
    /// Component lines in evaluation order.
    pub lines: Vec<ComponentLine>,
    /// Totals; all zero when the run failed.
    pub totals: PayTotals,
    /// One step per evaluated component.
    pub audit_trace: Vec<AuditStep>,
    /// Non-fatal findings.
    pub warnings: Vec<AuditWarning>,
}

impl PayComputationResult {
    /// Finds the line for a component code.
    pub fn line(&self, component_code: &str) -> Option<&ComponentLine> {
        self.lines.iter().find(|l| l.component_code == component_code)
    }

    /// Codes of the components that failed or were skipped.
    pub fn failed_components(&self) -> Vec<&str> {
        self.lines
            .iter()
            .filter(|l| l.status.is_failure())
            .map(|l| l.component_code.as_str())
            .collect()
    }

    /// Returns true if the run completed.
    pub fn is_complete(&self) -> bool {
        self.status == RunStatus::Complete
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn create_line(code: &str, status: ComponentStatus) -> ComponentLine {
        let value = if status == ComponentStatus::Complete {
            Some(dec("1000.00"))
        } else {
            None
        };
        ComponentLine {
            component_code: code.to_string(),
            component_type: ComponentType::Earning,
            raw_value: value,
            prorated_value: value,
            rounded_value: value,
            capped_value: value,
            status,
        }
    }

    fn create_result(lines: Vec<ComponentLine>) -> PayComputationResult {
        PayComputationResult {
            employee_id: "emp_001".to_string(),
            period: "2026-01 MONTHLY".to_string(),
            status: RunStatus::Complete,
            proration_factor: Decimal::ONE,
            lines,
            totals: PayTotals::zero(),
            audit_trace: vec![],
            warnings: vec![],
        }
    }

    #[test]
    fn test_run_status_transitions() {
        assert!(RunStatus::Pending.can_transition_to(RunStatus::Evaluating));
        assert!(RunStatus::Pending.can_transition_to(RunStatus::NotProcessed));
        assert!(RunStatus::Evaluating.can_transition_to(RunStatus::Complete));
        assert!(!RunStatus::Pending.can_transition_to(RunStatus::Complete));
        assert!(!RunStatus::Failed.can_transition_to(RunStatus::Complete));
        assert!(!RunStatus::NotProcessed.can_transition_to(RunStatus::Evaluating));
    }

    #[test]
    fn test_terminal_states() {
        assert!(RunStatus::Complete.is_terminal());
        assert!(RunStatus::Failed.is_terminal());
        assert!(RunStatus::NotProcessed.is_terminal());
        assert!(!RunStatus::Evaluating.is_terminal());
    }

    #[test]
    fn test_component_status_serialization() {
        let json = serde_json::to_string(&ComponentStatus::SkippedDueToDependencyFailure {
            failed_dependency: "X".to_string(),
        })
        .unwrap();
        assert_eq!(
            json,
            r#"{"kind":"SKIPPED_DUE_TO_DEPENDENCY_FAILURE","failed_dependency":"X"}"#
        );

        let json = serde_json::to_string(&ComponentStatus::Complete).unwrap();
        assert_eq!(json, r#"{"kind":"COMPLETE"}"#);
    }

    #[test]
    fn test_component_status_failure_classification() {
        assert!(
            ComponentStatus::Failed {
                reason: "Division by zero".to_string()
            }
            .is_failure()
        );
        assert!(!ComponentStatus::Complete.is_failure());
        assert!(!ComponentStatus::NotApplicable.is_failure());
    }

    #[test]
    fn test_line_lookup_and_failed_components() {
        let result = create_result(vec![
            create_line("BASICO", ComponentStatus::Complete),
            create_line(
                "X",
                ComponentStatus::Failed {
                    reason: "Unknown variable: foo".to_string(),
                },
            ),
            create_line(
                "Y",
                ComponentStatus::SkippedDueToDependencyFailure {
                    failed_dependency: "X".to_string(),
                },
            ),
        ]);

        assert_eq!(
            result.line("BASICO").unwrap().capped_value,
            Some(dec("1000.00"))
        );
        assert!(result.line("MISSING").is_none());
        assert_eq!(result.failed_components(), vec!["X", "Y"]);
        assert!(result.is_complete());
    }

    #[test]
    fn test_pay_totals_serialize_as_strings() {
        let totals = PayTotals {
            gross_total: dec("55000.00"),
            deductions_total: dec("6050.00"),
            net_total: dec("48950.00"),
            taxable_total: dec("55000.00"),
        };
        let json = serde_json::to_string(&totals).unwrap();
        assert!(json.contains("\"gross_total\":\"55000.00\""));
        assert!(json.contains("\"net_total\":\"48950.00\""));
    }

    #[test]
    fn test_result_round_trips_through_json() {
        let result = create_result(vec![create_line("BASICO", ComponentStatus::Complete)]);
        let json = serde_json::to_string(&result).unwrap();
        let parsed: PayComputationResult = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, result);
    }
}
