//! Payroll run orchestration for a single employee.
//!
//! A run walks the resolved components in evaluation order, threading the
//! running accumulators (`gross`, `base`, `net`) through each component's
//! scope. Evaluation failures stay local: the failing component and its
//! transitive dependents are marked, every other component still evaluates.

use std::collections::{BTreeMap, HashMap};

use rust_decimal::Decimal;
use serde_json::json;
use tracing::{debug, instrument, warn};

use crate::error::{EngineError, EngineResult, EvaluationError};
use crate::models::{
    AuditStep, AuditWarning, ComponentLine, ComponentStatus, ComponentType, Employee,
    PayComputationResult, PayTotals, PayrollPeriod, RunStatus,
};

use super::component::{ComponentValue, calculate};
use super::dependency::{CompiledComponent, ResolvedComponents};
use super::formula::{
    VAR_ACTIVE_DAYS, VAR_BASE, VAR_BASE_VALUE, VAR_BUSINESS_DAYS, VAR_GROSS, VAR_GROSS_SALARY,
    VAR_NET, VAR_PERIOD_DAYS, VariableScope,
};
use super::proration::{ProrationFactor, proration_factor};

/// Warning code for a value clamped by `cap_min` or `cap_max`.
pub const WARNING_CAP_APPLIED: &str = "CAP_APPLIED";
/// Warning code for an employee active for only part of the period.
pub const WARNING_PARTIAL_PERIOD: &str = "PARTIAL_PERIOD";
/// Warning code for a non-mandatory component that failed or was skipped.
pub const WARNING_COMPONENT_FAILED: &str = "COMPONENT_FAILED";

/// Running totals visible to formulas and reported on the result.
#[derive(Debug, Clone, Copy)]
struct Accumulators {
    gross: Decimal,
    base: Decimal,
    net: Decimal,
    deductions: Decimal,
    earnings_seen: bool,
}

impl Accumulators {
    fn new(gross_salary: Decimal) -> Self {
        Self {
            gross: gross_salary,
            base: Decimal::ZERO,
            net: Decimal::ZERO,
            deductions: Decimal::ZERO,
            earnings_seen: false,
        }
    }

    /// The totals after adding a component's contribution.
    ///
    /// Fails with [`EvaluationError::Overflow`] naming the total that left the
    /// decimal range; `self` is unchanged in that case.
    fn add(
        &self,
        component_type: ComponentType,
        is_taxable: bool,
        value: Decimal,
    ) -> Result<Self, EvaluationError> {
        let mut next = *self;
        match component_type {
            ComponentType::Earning => {
                // gross holds the nominal salary until the first earning lands
                next.gross = if self.earnings_seen {
                    checked(self.gross.checked_add(value), "gross total")?
                } else {
                    value
                };
                next.earnings_seen = true;
                if is_taxable {
                    next.base = checked(self.base.checked_add(value), "taxable total")?;
                }
                next.net = checked(self.net.checked_add(value), "net total")?;
            }
            ComponentType::Deduction => {
                next.deductions =
                    checked(self.deductions.checked_add(value), "deductions total")?;
                next.net = checked(self.net.checked_sub(value), "net total")?;
            }
        }
        Ok(next)
    }

    fn get(&self, name: &str) -> Decimal {
        match name {
            VAR_GROSS => self.gross,
            VAR_BASE => self.base,
            _ => self.net,
        }
    }

    fn totals(&self) -> PayTotals {
        PayTotals {
            gross_total: if self.earnings_seen {
                self.gross
            } else {
                Decimal::ZERO
            },
            deductions_total: self.deductions,
            net_total: self.net,
            taxable_total: self.base,
        }
    }
}

fn checked(value: Option<Decimal>, total: &str) -> Result<Decimal, EvaluationError> {
    value.ok_or_else(|| EvaluationError::Overflow {
        operation: total.to_string(),
    })
}

/// Outcome of one component inside a run, as seen by its dependents.
#[derive(Debug, Clone)]
enum Outcome {
    Value(Decimal),
    NotApplicable,
    Failed,
}

fn check_preconditions(employee: &Employee, period: &PayrollPeriod) -> EngineResult<()> {
    if period.is_closed {
        return Err(EngineError::PeriodClosed {
            period: period.label(),
        });
    }

    if period.period_end < period.period_start {
        return Err(EngineError::InvalidPeriod {
            period: period.label(),
            message: format!(
                "period_end {} is before period_start {}",
                period.period_end, period.period_start
            ),
        });
    }

    if let Some(termination) = employee.termination_date {
        if termination < employee.hire_date {
            return Err(EngineError::InvalidEmployee {
                employee_id: employee.id.clone(),
                message: format!(
                    "termination_date {} is before hire_date {}",
                    termination, employee.hire_date
                ),
            });
        }
    }

    Ok(())
}

fn build_scope(
    component: &CompiledComponent,
    employee: &Employee,
    period: &PayrollPeriod,
    factor: ProrationFactor,
    totals: &Accumulators,
    outcomes: &HashMap<&str, Outcome>,
) -> VariableScope {
    let mut scope = VariableScope::new()
        .with(VAR_GROSS_SALARY, employee.gross_salary)
        .with(VAR_GROSS, totals.gross)
        .with(VAR_BASE, totals.base)
        .with(VAR_NET, totals.net)
        .with(
            VAR_BASE_VALUE,
            totals.get(component.definition.base_variable.variable_name()),
        )
        .with(VAR_ACTIVE_DAYS, Decimal::from(factor.active_days))
        .with(VAR_PERIOD_DAYS, Decimal::from(factor.period_days))
        .with(VAR_BUSINESS_DAYS, Decimal::from(period.business_days));

    for dependency in &component.definition.depends_on {
        if let Some(Outcome::Value(value)) = outcomes.get(dependency.as_str()) {
            scope.set(dependency.clone(), *value);
        } else {
            scope.set(dependency.clone(), Decimal::ZERO);
        }
    }

    scope
}

fn empty_line(component: &CompiledComponent, status: ComponentStatus) -> ComponentLine {
    ComponentLine {
        component_code: component.code().to_string(),
        component_type: component.definition.component_type,
        raw_value: None,
        prorated_value: None,
        rounded_value: None,
        capped_value: None,
        status,
    }
}

fn value_line(component: &CompiledComponent, value: &ComponentValue) -> ComponentLine {
    ComponentLine {
        component_code: component.code().to_string(),
        component_type: component.definition.component_type,
        raw_value: Some(value.raw),
        prorated_value: Some(value.prorated),
        rounded_value: Some(value.rounded),
        capped_value: Some(value.capped),
        status: ComponentStatus::Complete,
    }
}

fn transition(current: RunStatus, next: RunStatus) -> RunStatus {
    debug_assert!(
        current.can_transition_to(next),
        "illegal run transition {:?} -> {:?}",
        current,
        next
    );
    next
}

/// Computes one employee's pay for one period.
///
/// Components are evaluated in the resolved order. Each component sees the
/// nominal salary, the running accumulators, its own base value, the period's
/// day counts and the values of the components it declares in `depends_on`.
///
/// The result is a pure function of its inputs: the same employee, period and
/// resolved components always serialize to the same bytes.
///
/// # Errors
///
/// - [`EngineError::PeriodClosed`] if the period is closed.
/// - [`EngineError::InvalidPeriod`] if the period ends before it starts.
/// - [`EngineError::InvalidEmployee`] if the employee is terminated before hire.
///
/// Component evaluation failures are not errors; they are recorded on the
/// result's lines and reflected in its status.
///
/// # Example
///
/// ```
/// use payroll_engine::calculation::{resolve_components, run};
/// use payroll_engine::models::{ComponentSet, Employee, PayrollPeriod, PeriodType, RunStatus};
/// use chrono::NaiveDate;
/// use rust_decimal::Decimal;
///
/// let set: ComponentSet = serde_yaml::from_str(r#"
/// version: "1"
/// components:
///   - code: BASICO
///     type: EARNING
///     calc_type: FIXED
///     calc_value: "50000"
///   - code: PRESENTISMO
///     type: EARNING
///     calc_type: PERCENTAGE
///     calc_value: "10"
///     depends_on: [BASICO]
/// "#).unwrap();
/// let resolved = resolve_components(&set).unwrap();
///
/// let employee = Employee {
///     id: "emp_001".to_string(),
///     gross_salary: Decimal::new(60000, 0),
///     hire_date: NaiveDate::from_ymd_opt(2020, 1, 1).unwrap(),
///     termination_date: None,
///     is_active: true,
///     cost_center_id: None,
/// };
/// let period = PayrollPeriod {
///     period_type: PeriodType::Monthly,
///     year: 2026,
///     month: 1,
///     period_start: NaiveDate::from_ymd_opt(2026, 1, 1).unwrap(),
///     period_end: NaiveDate::from_ymd_opt(2026, 1, 31).unwrap(),
///     payment_date: NaiveDate::from_ymd_opt(2026, 1, 30).unwrap(),
///     business_days: 22,
///     is_closed: false,
/// };
///
/// let result = run(&employee, &period, &resolved).unwrap();
/// assert_eq!(result.status, RunStatus::Complete);
/// assert_eq!(result.line("PRESENTISMO").unwrap().capped_value, Some(Decimal::new(5000, 0)));
/// assert_eq!(result.totals.gross_total, Decimal::new(55000, 0));
/// ```
#[instrument(skip_all, fields(employee_id = %employee.id, period = %period.label()))]
pub fn run(
    employee: &Employee,
    period: &PayrollPeriod,
    components: &ResolvedComponents,
) -> EngineResult<PayComputationResult> {
    check_preconditions(employee, period)?;

    let mut status = transition(RunStatus::Pending, RunStatus::Evaluating);

    let factor = proration_factor(employee, period);
    let mut totals = Accumulators::new(employee.gross_salary);
    let mut outcomes: HashMap<&str, Outcome> = HashMap::with_capacity(components.len());
    let mut lines = Vec::with_capacity(components.len());
    let mut audit_trace = Vec::with_capacity(components.len());
    let mut warnings = Vec::new();
    let mut mandatory_failure: Option<String> = None;

    if factor.is_partial() {
        warnings.push(AuditWarning {
            code: WARNING_PARTIAL_PERIOD.to_string(),
            message: format!(
                "Employee active {} of {} days in the period",
                factor.active_days, factor.period_days
            ),
            component_code: None,
        });
    }

    for (position, component) in components.in_order().enumerate() {
        let step_number = position as u32 + 1;
        let definition = &component.definition;
        let code = component.code();

        if !definition.apply_to.includes(employee) {
            outcomes.insert(code, Outcome::NotApplicable);
            lines.push(empty_line(component, ComponentStatus::NotApplicable));
            audit_trace.push(AuditStep {
                step_number,
                component_code: code.to_string(),
                input: json!({ "apply_to": definition.apply_to }),
                output: json!({ "status": "NOT_APPLICABLE" }),
                reasoning: format!("{} does not apply to employee {}", code, employee.id),
            });
            continue;
        }

        let failed_dependency = definition
            .depends_on
            .iter()
            .find(|dep| matches!(outcomes.get(dep.as_str()), Some(Outcome::Failed)));

        let status_line = if let Some(dependency) = failed_dependency {
            debug!(component = code, dependency = %dependency, "Skipping component");
            outcomes.insert(code, Outcome::Failed);
            lines.push(empty_line(
                component,
                ComponentStatus::SkippedDueToDependencyFailure {
                    failed_dependency: dependency.clone(),
                },
            ));
            audit_trace.push(AuditStep {
                step_number,
                component_code: code.to_string(),
                input: json!({ "depends_on": definition.depends_on }),
                output: json!({ "status": "SKIPPED_DUE_TO_DEPENDENCY_FAILURE" }),
                reasoning: format!("{} skipped: dependency {} did not complete", code, dependency),
            });
            Some(format!("dependency {} did not complete", dependency))
        } else {
            let scope = build_scope(component, employee, period, factor, &totals, &outcomes);

            let evaluated = calculate(component, &scope, factor).and_then(|value| {
                let next =
                    totals.add(definition.component_type, definition.is_taxable, value.capped)?;
                Ok((value, next))
            });

            match evaluated {
                Ok((value, next)) => {
                    debug!(component = code, value = %value.capped, "Component evaluated");
                    totals = next;

                    if let Some(bound) = value.cap_applied {
                        warnings.push(AuditWarning {
                            code: WARNING_CAP_APPLIED.to_string(),
                            message: format!(
                                "{} clamped from {} to {}",
                                code,
                                value.rounded.normalize(),
                                bound.normalize()
                            ),
                            component_code: Some(code.to_string()),
                        });
                    }

                    outcomes.insert(code, Outcome::Value(value.capped));
                    lines.push(value_line(component, &value));
                    audit_trace.push(AuditStep {
                        step_number,
                        component_code: code.to_string(),
                        input: json!({
                            "calc_type": definition.calc_type.to_string(),
                            "scope": scope
                                .iter()
                                .map(|(name, v)| (name.to_string(), v.normalize().to_string()))
                                .collect::<BTreeMap<_, _>>(),
                            "proration": {
                                "applied": value.prorated != value.raw,
                                "active_days": factor.active_days,
                                "period_days": factor.period_days
                            }
                        }),
                        output: json!({
                            "raw": value.raw.normalize().to_string(),
                            "prorated": value.prorated.normalize().to_string(),
                            "rounded": value.rounded.normalize().to_string(),
                            "capped": value.capped.normalize().to_string()
                        }),
                        reasoning: format!(
                            "{} {}: raw {} -> prorated {} -> rounded {} -> capped {}",
                            code,
                            definition.calc_type,
                            value.raw.normalize(),
                            value.prorated.normalize(),
                            value.rounded.normalize(),
                            value.capped.normalize()
                        ),
                    });
                    None
                }
                Err(err) => {
                    warn!(component = code, error = %err, "Component evaluation failed");
                    outcomes.insert(code, Outcome::Failed);
                    lines.push(empty_line(
                        component,
                        ComponentStatus::Failed {
                            reason: err.to_string(),
                        },
                    ));
                    audit_trace.push(AuditStep {
                        step_number,
                        component_code: code.to_string(),
                        input: json!({ "calc_type": definition.calc_type.to_string() }),
                        output: json!({ "status": "FAILED", "error": err.to_string() }),
                        reasoning: format!("{} failed: {}", code, err),
                    });
                    Some(err.to_string())
                }
            }
        };

        if let Some(reason) = status_line {
            if definition.mandatory {
                mandatory_failure.get_or_insert_with(|| code.to_string());
            } else {
                warnings.push(AuditWarning {
                    code: WARNING_COMPONENT_FAILED.to_string(),
                    message: format!("{} excluded from totals: {}", code, reason),
                    component_code: Some(code.to_string()),
                });
            }
        }
    }

    let pay = match mandatory_failure {
        Some(code) => {
            warn!(component = %code, "Mandatory component did not complete");
            status = transition(status, RunStatus::Failed);
            PayTotals::zero()
        }
        None => {
            status = transition(status, RunStatus::Complete);
            totals.totals()
        }
    };
    debug_assert!(status.is_terminal());

    Ok(PayComputationResult {
        employee_id: employee.id.clone(),
        period: period.label(),
        status,
        proration_factor: factor.fraction(),
        lines,
        totals: pay,
        audit_trace,
        warnings,
    })
}
