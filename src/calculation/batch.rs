//! Batch payroll runs.
//!
//! A batch computes every employee of a roster for one period on a rayon
//! worker pool. Employees are independent, so the only shared state is the
//! immutable [`ResolvedComponents`] and a cooperative cancellation flag.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use rayon::ThreadPoolBuilder;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use crate::error::{EngineError, EngineResult};
use crate::models::{Employee, PayComputationResult, PayrollPeriod, RunStatus};

use super::dependency::ResolvedComponents;
use super::payroll_run::run;

/// A shared flag that asks a running batch to stop.
///
/// Cancellation is checked before each employee starts; an employee already
/// being computed always finishes.
///
/// # Example
///
/// ```
/// use payroll_engine::calculation::CancellationFlag;
///
/// let flag = CancellationFlag::new();
/// let handle = flag.clone();
/// handle.cancel();
/// assert!(flag.is_cancelled());
/// ```
#[derive(Debug, Clone, Default)]
pub struct CancellationFlag(Arc<AtomicBool>);

impl CancellationFlag {
    /// A flag that has not been raised.
    pub fn new() -> Self {
        Self::default()
    }

    /// Raises the flag.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    /// Returns true once the flag has been raised.
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Options for [`run_batch`].
#[derive(Debug, Clone, Default)]
pub struct BatchOptions {
    /// Worker threads; defaults to the number of CPUs.
    pub max_workers: Option<usize>,
    /// Time budget for the whole batch, measured from the call. A budget too
    /// large to represent as an instant is treated as no deadline.
    pub timeout: Option<Duration>,
    /// Cooperative cancellation.
    pub cancellation: CancellationFlag,
}

impl BatchOptions {
    /// Sets the number of worker threads.
    pub fn with_max_workers(mut self, workers: usize) -> Self {
        self.max_workers = Some(workers);
        self
    }

    /// Sets the batch time budget.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Uses an existing cancellation flag.
    pub fn with_cancellation(mut self, cancellation: CancellationFlag) -> Self {
        self.cancellation = cancellation;
        self
    }

    fn worker_count(&self) -> usize {
        self.max_workers.unwrap_or_else(num_cpus::get).max(1)
    }
}

/// Why an employee was never started.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NotProcessedReason {
    /// The batch was cancelled.
    Cancelled,
    /// The batch time budget ran out.
    DeadlineExceeded,
}

/// What happened to one employee in a batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EmployeeOutcome {
    /// The run finished; its status may still be `Failed`.
    Computed {
        /// The run result.
        result: Box<PayComputationResult>,
    },
    /// The employee record was rejected before running.
    Rejected {
        /// The employee ID.
        employee_id: String,
        /// Why the record was rejected.
        error: String,
    },
    /// The employee was never started.
    NotProcessed {
        /// The employee ID.
        employee_id: String,
        /// Why the employee was not started.
        reason: NotProcessedReason,
    },
}

impl EmployeeOutcome {
    /// The employee this outcome is for.
    pub fn employee_id(&self) -> &str {
        match self {
            EmployeeOutcome::Computed { result } => &result.employee_id,
            EmployeeOutcome::Rejected { employee_id, .. }
            | EmployeeOutcome::NotProcessed { employee_id, .. } => employee_id,
        }
    }

    /// The run status implied by this outcome.
    pub fn status(&self) -> RunStatus {
        match self {
            EmployeeOutcome::Computed { result } => result.status,
            EmployeeOutcome::Rejected { .. } => RunStatus::Failed,
            EmployeeOutcome::NotProcessed { .. } => RunStatus::NotProcessed,
        }
    }

    /// The run result, if the employee was computed.
    pub fn result(&self) -> Option<&PayComputationResult> {
        match self {
            EmployeeOutcome::Computed { result } => Some(result.as_ref()),
            _ => None,
        }
    }
}

/// Result of a batch run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchReport {
    /// Correlation ID for logs; not part of any employee result.
    pub run_id: Uuid,
    /// Label of the period computed.
    pub period: String,
    /// One outcome per employee, in roster order.
    pub outcomes: Vec<EmployeeOutcome>,
    /// Employees whose run completed.
    pub completed: usize,
    /// Employees whose run failed or whose record was rejected.
    pub failed: usize,
    /// Employees never started.
    pub not_processed: usize,
}

impl BatchReport {
    /// Finds the outcome for an employee.
    pub fn outcome(&self, employee_id: &str) -> Option<&EmployeeOutcome> {
        self.outcomes.iter().find(|o| o.employee_id() == employee_id)
    }
}

/// Computes a period for every employee in a roster.
///
/// # Errors
///
/// - [`EngineError::PeriodClosed`] if the period is closed; nothing is computed.
/// - [`EngineError::WorkerPool`] if the worker pool cannot be created.
///
/// Per-employee problems are reported in the outcomes instead.
///
/// # Example
///
/// ```
/// use payroll_engine::calculation::{resolve_components, run_batch, BatchOptions};
/// use payroll_engine::models::{ComponentSet, Employee, PayrollPeriod, PeriodType};
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
/// "#).unwrap();
/// let resolved = resolve_components(&set).unwrap();
///
/// let employees: Vec<Employee> = (1..=3)
///     .map(|i| Employee {
///         id: format!("emp_{:03}", i),
///         gross_salary: Decimal::new(50000, 0),
///         hire_date: NaiveDate::from_ymd_opt(2020, 1, 1).unwrap(),
///         termination_date: None,
///         is_active: true,
///         cost_center_id: None,
///     })
///     .collect();
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
/// let report = run_batch(&employees, &period, &resolved, &BatchOptions::default().with_max_workers(2)).unwrap();
/// assert_eq!(report.completed, 3);
/// assert_eq!(report.outcomes[0].employee_id(), "emp_001");
/// ```
pub fn run_batch(
    employees: &[Employee],
    period: &PayrollPeriod,
    components: &ResolvedComponents,
    options: &BatchOptions,
) -> EngineResult<BatchReport> {
    if period.is_closed {
        return Err(EngineError::PeriodClosed {
            period: period.label(),
        });
    }

    let run_id = Uuid::new_v4();
    let workers = options.worker_count();
    // a budget past the end of the clock means no deadline
    let deadline = options
        .timeout
        .and_then(|timeout| Instant::now().checked_add(timeout));

    info!(
        run_id = %run_id,
        period = %period.label(),
        employees = employees.len(),
        workers,
        "Starting payroll batch"
    );

    let pool = ThreadPoolBuilder::new()
        .num_threads(workers)
        .build()
        .map_err(|e| EngineError::WorkerPool {
            message: e.to_string(),
        })?;

    let outcomes: Vec<EmployeeOutcome> = pool.install(|| {
        employees
            .par_iter()
            .map(|employee| {
                if let Some(reason) = stop_reason(options, deadline) {
                    return EmployeeOutcome::NotProcessed {
                        employee_id: employee.id.clone(),
                        reason,
                    };
                }
                match run(employee, period, components) {
                    Ok(result) => EmployeeOutcome::Computed {
                        result: Box::new(result),
                    },
                    Err(err) => {
                        warn!(run_id = %run_id, employee_id = %employee.id, error = %err, "Employee rejected");
                        EmployeeOutcome::Rejected {
                            employee_id: employee.id.clone(),
                            error: err.to_string(),
                        }
                    }
                }
            })
            .collect()
    });

    let mut report = BatchReport {
        run_id,
        period: period.label(),
        outcomes,
        completed: 0,
        failed: 0,
        not_processed: 0,
    };
    for outcome in &report.outcomes {
        match outcome.status() {
            RunStatus::Complete => report.completed += 1,
            RunStatus::NotProcessed => report.not_processed += 1,
            _ => report.failed += 1,
        }
    }

    info!(
        run_id = %run_id,
        completed = report.completed,
        failed = report.failed,
        not_processed = report.not_processed,
        "Payroll batch finished"
    );

    Ok(report)
}

fn stop_reason(options: &BatchOptions, deadline: Option<Instant>) -> Option<NotProcessedReason> {
    if options.cancellation.is_cancelled() {
        return Some(NotProcessedReason::Cancelled);
    }
    if deadline.is_some_and(|d| Instant::now() >= d) {
        return Some(NotProcessedReason::DeadlineExceeded);
    }
    None
}
