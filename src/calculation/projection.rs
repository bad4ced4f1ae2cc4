//! Payment projection.
//!
//! Projects upcoming payroll payments from the current roster: which dates
//! money leaves, how much, and which advance installments ride along. The
//! projection only reads its inputs and never closes or alters a period.

use std::collections::HashMap;

use chrono::{Datelike, Months, NaiveDate};
use rust_decimal::Decimal;
use tracing::{debug, info, instrument, warn};

use crate::config::{PaymentFrequency, ProjectionConfig};
use crate::error::EngineResult;
use crate::models::{
    AlertKind, Employee, HolidayCalendar, NextPayment, PayrollPeriod, PendingAdvance, PeriodType,
    ProjectedPayment, ProjectionAlert, ProjectionSummary, SalaryAdvance,
};

use super::business_day::{business_days_between, resolve_business_day};
use super::dependency::ResolvedComponents;
use super::payroll_run::run;

/// Last day of the given month, if the month is representable.
pub fn last_day_of_month(year: i32, month: u32) -> Option<u32> {
    NaiveDate::from_ymd_opt(year, month, 1)?
        .checked_add_months(Months::new(1))?
        .pred_opt()
        .map(|d| d.day())
}

/// Builds the period a payment slot pays for when none was supplied.
///
/// QUINCENA_1 covers days 1 to 15, QUINCENA_2 day 16 to month end and MONTHLY
/// the whole month. The payment date is `payment_day` clamped to month end.
pub fn synthesize_period(
    year: i32,
    month: u32,
    period_type: PeriodType,
    payment_day: u32,
    holidays: &HolidayCalendar,
) -> Option<PayrollPeriod> {
    let last = last_day_of_month(year, month)?;
    let (first_day, last_day) = match period_type {
        PeriodType::Quincena1 => (1, 15.min(last)),
        PeriodType::Quincena2 => (16, last),
        PeriodType::Monthly => (1, last),
    };

    let period_start = NaiveDate::from_ymd_opt(year, month, first_day)?;
    let period_end = NaiveDate::from_ymd_opt(year, month, last_day)?;
    let payment_date = NaiveDate::from_ymd_opt(year, month, payment_day.clamp(1, last))?;

    Some(PayrollPeriod {
        period_type,
        year,
        month,
        period_start,
        period_end,
        payment_date,
        business_days: business_days_between(period_start, period_end, holidays),
        is_closed: false,
    })
}

#[derive(Debug, Clone, Copy)]
struct PaymentSlot {
    year: i32,
    month: u32,
    period_type: PeriodType,
    payment_day: u32,
}

fn payment_slots(config: &ProjectionConfig, as_of: NaiveDate) -> Vec<PaymentSlot> {
    let Some(first_of_month) = as_of.with_day(1) else {
        return Vec::new();
    };

    (0..config.horizon_months)
        .filter_map(|offset| first_of_month.checked_add_months(Months::new(offset)))
        .flat_map(|month| {
            let slot = |period_type, payment_day| PaymentSlot {
                year: month.year(),
                month: month.month(),
                period_type,
                payment_day,
            };
            match (config.payment_frequency, config.second_payment_day) {
                (PaymentFrequency::Biweekly, Some(second)) => vec![
                    slot(PeriodType::Quincena1, config.first_payment_day),
                    slot(PeriodType::Quincena2, second),
                ],
                _ => vec![slot(PeriodType::Monthly, config.first_payment_day)],
            }
        })
        .collect()
}

/// An installment due on or after the projection date, bounded by the
/// advance's remaining balance.
///
/// Each one rides along with the first projected payment whose period ends on
/// or after its due date, so an installment whose own slot was dropped is
/// carried into the next payment.
#[derive(Debug, Clone, Copy)]
struct ScheduledInstallment {
    due_date: NaiveDate,
    amount: Decimal,
}

fn schedule_installments(
    advances: &[SalaryAdvance],
    as_of: NaiveDate,
    alerts: &mut Vec<ProjectionAlert>,
) -> Vec<ScheduledInstallment> {
    let mut scheduled = Vec::new();

    for advance in advances.iter().filter(|a| a.is_outstanding()) {
        let mut remaining = advance.remaining_amount;
        for installment in advance.pending_installments() {
            if installment.amount < Decimal::ZERO {
                alerts.push(ProjectionAlert {
                    kind: AlertKind::InvalidInstallment,
                    message: format!(
                        "Installment {} of advance {} for employee {} has negative amount {}",
                        installment.number,
                        advance.id,
                        advance.employee_id,
                        installment.amount.normalize()
                    ),
                });
                continue;
            }
            if installment.due_date < as_of {
                alerts.push(ProjectionAlert {
                    kind: AlertKind::OverdueInstallment,
                    message: format!(
                        "Installment {} of advance {} for employee {} was due {} and is still pending",
                        installment.number, advance.id, advance.employee_id, installment.due_date
                    ),
                });
                continue;
            }

            let amount = installment.amount.min(remaining);
            remaining -= amount;
            if amount > Decimal::ZERO {
                scheduled.push(ScheduledInstallment {
                    due_date: installment.due_date,
                    amount,
                });
            }
        }
    }

    scheduled.sort_by_key(|i| i.due_date);
    scheduled
}

fn pending_advances(advances: &[SalaryAdvance]) -> Vec<PendingAdvance> {
    advances
        .iter()
        .filter(|a| a.is_outstanding())
        .filter_map(|advance| {
            let next = advance.next_pending_installment()?;
            Some(PendingAdvance {
                employee_id: advance.employee_id.clone(),
                advance_id: advance.id.clone(),
                next_installment_amount: next.amount.min(advance.remaining_amount),
                next_installment_date: next.due_date,
                remaining_amount: advance.remaining_amount,
            })
        })
        .collect()
}

fn is_payable(employee: &Employee, period: &PayrollPeriod) -> bool {
    let first_day = employee.hire_date.max(period.period_start);
    (employee.is_active || employee.termination_date.is_some())
        && first_day <= period.period_end
        && employee.is_employed_on(first_day)
}

/// Projects upcoming payments.
///
/// Payment slots are generated for `horizon_months` months starting with the
/// month of `as_of`. Each slot pays one period: the supplied period with the
/// same year, month and type when there is one, otherwise a synthesized one.
/// Closed periods are skipped. Payment dates are moved onto business days by
/// the configured rule, and slots paying before `as_of` are dropped.
///
/// Problems that do not prevent a projection are reported as alerts:
/// unresolvable payment dates, failed employee runs, overdue installments,
/// outflow above the configured share of gross, and an empty schedule.
///
/// # Errors
///
/// Returns [`crate::error::EngineError::InvalidProjectionConfig`] if the
/// configuration does not validate.
#[instrument(skip_all, fields(as_of = %as_of, employees = employees.len()))]
pub fn project(
    employees: &[Employee],
    components: &ResolvedComponents,
    periods: &[PayrollPeriod],
    config: &ProjectionConfig,
    holidays: &HolidayCalendar,
    advances: &[SalaryAdvance],
    as_of: NaiveDate,
) -> EngineResult<ProjectionSummary> {
    config.validate()?;

    let mut alerts = Vec::new();
    let installments = schedule_installments(advances, as_of, &mut alerts);
    let mut upcoming_installments = installments.iter().peekable();
    let supplied: HashMap<(i32, u32, PeriodType), &PayrollPeriod> = periods
        .iter()
        .map(|p| ((p.year, p.month, p.period_type), p))
        .collect();

    let mut projection = Vec::new();

    for slot in payment_slots(config, as_of) {
        let period = match supplied.get(&(slot.year, slot.month, slot.period_type)) {
            Some(period) if period.is_closed => {
                debug!(period = %period.label(), "Skipping closed period");
                continue;
            }
            Some(period) => (*period).clone(),
            None => match synthesize_period(
                slot.year,
                slot.month,
                slot.period_type,
                slot.payment_day,
                holidays,
            ) {
                Some(period) => period,
                None => continue,
            },
        };

        let payment_date =
            match resolve_business_day(period.payment_date, config.payment_day_rule, holidays) {
                Ok(date) => date,
                Err(err) => {
                    warn!(period = %period.label(), error = %err, "Payment date unresolvable");
                    alerts.push(ProjectionAlert {
                        kind: AlertKind::UnresolvablePaymentDate,
                        message: format!("{}: {}", period.label(), err),
                    });
                    continue;
                }
            };

        if payment_date < as_of {
            continue;
        }

        let mut payroll_outflow = Decimal::ZERO;
        let mut gross = Decimal::ZERO;
        let mut employee_count = 0;
        let mut failures: Vec<&str> = Vec::new();

        for employee in employees.iter().filter(|e| is_payable(e, &period)) {
            employee_count += 1;
            match run(employee, &period, components) {
                Ok(result) if result.is_complete() => {
                    match (
                        payroll_outflow.checked_add(result.totals.net_total),
                        gross.checked_add(result.totals.gross_total),
                    ) {
                        (Some(outflow), Some(total)) => {
                            payroll_outflow = outflow;
                            gross = total;
                        }
                        _ => failures.push(&employee.id),
                    }
                }
                Ok(_) | Err(_) => failures.push(&employee.id),
            }
        }

        if !failures.is_empty() {
            alerts.push(ProjectionAlert {
                kind: AlertKind::ComputationFailed,
                message: format!(
                    "{}: computation failed for {} employee(s): {}",
                    period.label(),
                    failures.len(),
                    failures.join(", ")
                ),
            });
        }

        let mut advance_outflow = Some(Decimal::ZERO);
        while let Some(installment) =
            upcoming_installments.next_if(|i| i.due_date <= period.period_end)
        {
            if !period.contains_date(installment.due_date) {
                debug!(
                    period = %period.label(),
                    due_date = %installment.due_date,
                    "Carrying installment from a skipped payment"
                );
            }
            advance_outflow = advance_outflow.and_then(|total| total.checked_add(installment.amount));
        }

        let Some((advance_outflow, expected_outflow)) = advance_outflow
            .and_then(|advance| Some((advance, payroll_outflow.checked_add(advance)?)))
        else {
            warn!(period = %period.label(), "Projected outflow overflowed");
            alerts.push(ProjectionAlert {
                kind: AlertKind::ComputationFailed,
                message: format!(
                    "{}: expected outflow exceeds the representable range",
                    period.label()
                ),
            });
            continue;
        };

        let limit = gross.checked_mul(config.outflow_alert_ratio);
        if limit.is_some_and(|limit| expected_outflow > limit) {
            alerts.push(ProjectionAlert {
                kind: AlertKind::OutflowExceedsGross,
                message: format!(
                    "{}: expected outflow {} exceeds gross {} x {}",
                    period.label(),
                    expected_outflow.normalize(),
                    gross.normalize(),
                    config.outflow_alert_ratio.normalize()
                ),
            });
        }

        projection.push(ProjectedPayment {
            year: period.year,
            month: period.month,
            period_type: period.period_type,
            nominal_date: period.payment_date,
            payment_date,
            payroll_outflow,
            advance_outflow,
            expected_outflow,
            employee_count,
        });
    }

    projection.sort_by_key(|p| (p.payment_date, p.year, p.month, p.period_type));

    let next_payment = projection.first().map(|p| NextPayment {
        date: p.payment_date,
        expected_outflow: p.expected_outflow,
    });
    if next_payment.is_none() {
        alerts.push(ProjectionAlert {
            kind: AlertKind::NoUpcomingPayment,
            message: format!(
                "No payment within {} month(s) of {}",
                config.horizon_months, as_of
            ),
        });
    }

    info!(
        payments = projection.len(),
        alerts = alerts.len(),
        "Projection complete"
    );

    Ok(ProjectionSummary {
        as_of,
        next_payment,
        monthly_projection: projection,
        pending_advances: pending_advances(advances),
        alerts,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calculation::resolve_components;
    use crate::config::PaymentDayRule;
    use crate::error::EngineError;
    use crate::models::{
        AdvanceStatus, ComponentSet, Holiday, Installment, InstallmentStatus,
    };
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn create_test_employee(id: &str) -> Employee {
        Employee {
            id: id.to_string(),
            gross_salary: dec("60000"),
            hire_date: date(2020, 1, 1),
            termination_date: None,
            is_active: true,
            cost_center_id: None,
        }
    }

    fn create_components(basico_formula: &str) -> ResolvedComponents {
        let yaml = format!(
            r#"
version: "test"
components:
  - code: BASICO
    type: EARNING
    calc_type: FORMULA
    calc_formula: "{}"
    mandatory: true
  - code: JUBILACION
    type: DEDUCTION
    calc_type: PERCENTAGE
    calc_value: "11"
    depends_on: [BASICO]
"#,
            basico_formula
        );
        let set: ComponentSet = serde_yaml::from_str(&yaml).unwrap();
        resolve_components(&set).unwrap()
    }

    fn biweekly() -> ProjectionConfig {
        ProjectionConfig {
            payment_frequency: PaymentFrequency::Biweekly,
            first_payment_day: 15,
            second_payment_day: Some(31),
            payment_day_rule: PaymentDayRule::PreviousBusinessDay,
            horizon_months: 1,
            outflow_alert_ratio: dec("1.10"),
        }
    }

    fn create_advance(remaining: &str, installments: Vec<(u32, NaiveDate, &str)>) -> SalaryAdvance {
        SalaryAdvance {
            id: "adv_001".to_string(),
            employee_id: "emp_001".to_string(),
            amount: dec("10000"),
            remaining_amount: dec(remaining),
            status: AdvanceStatus::Active,
            installments: installments
                .into_iter()
                .map(|(number, due_date, amount)| Installment {
                    number,
                    amount: dec(amount),
                    due_date,
                    status: InstallmentStatus::Pending,
                })
                .collect(),
        }
    }

    fn project_simple(
        config: &ProjectionConfig,
        periods: &[PayrollPeriod],
        holidays: &HolidayCalendar,
        advances: &[SalaryAdvance],
        as_of: NaiveDate,
    ) -> ProjectionSummary {
        project(
            &[create_test_employee("emp_001"), create_test_employee("emp_002")],
            &create_components("grossSalary / 2"),
            periods,
            config,
            holidays,
            advances,
            as_of,
        )
        .unwrap()
    }

    /// PJ-001: quincena payments resolve to business days
    #[test]
    fn test_biweekly_schedule_for_one_month() {
        let summary = project_simple(&biweekly(), &[], &HolidayCalendar::default(), &[], date(2026, 1, 10));

        assert_eq!(summary.monthly_projection.len(), 2);
        let q1 = &summary.monthly_projection[0];
        assert_eq!(q1.period_type, PeriodType::Quincena1);
        assert_eq!(q1.payment_date, date(2026, 1, 15));
        // net per employee: 30000 - 11% = 26700
        assert_eq!(q1.payroll_outflow, dec("53400"));
        assert_eq!(q1.employee_count, 2);

        // Jan 31 2026 is a Saturday
        let q2 = &summary.monthly_projection[1];
        assert_eq!(q2.nominal_date, date(2026, 1, 31));
        assert_eq!(q2.payment_date, date(2026, 1, 30));

        assert_eq!(
            summary.next_payment,
            Some(NextPayment {
                date: date(2026, 1, 15),
                expected_outflow: dec("53400"),
            })
        );
        assert!(summary.alerts.is_empty());
    }

    #[test]
    fn test_payment_already_made_is_skipped() {
        let summary = project_simple(&biweekly(), &[], &HolidayCalendar::default(), &[], date(2026, 1, 16));

        assert_eq!(summary.monthly_projection.len(), 1);
        assert_eq!(summary.next_payment.unwrap().date, date(2026, 1, 30));
    }

    #[test]
    fn test_second_day_clamped_to_short_month() {
        let summary = project_simple(&biweekly(), &[], &HolidayCalendar::default(), &[], date(2026, 2, 1));

        // Feb 15 2026 is a Sunday, Feb 28 a Saturday
        let dates: Vec<NaiveDate> = summary
            .monthly_projection
            .iter()
            .map(|p| p.payment_date)
            .collect();
        assert_eq!(dates, vec![date(2026, 2, 13), date(2026, 2, 27)]);
        assert_eq!(summary.monthly_projection[1].nominal_date, date(2026, 2, 28));
    }

    #[test]
    fn test_monthly_horizon() {
        let config = ProjectionConfig {
            payment_frequency: PaymentFrequency::Monthly,
            first_payment_day: 31,
            second_payment_day: None,
            payment_day_rule: PaymentDayRule::NextBusinessDay,
            horizon_months: 3,
            outflow_alert_ratio: dec("1.10"),
        };
        let summary = project(
            &[create_test_employee("emp_001")],
            &create_components("grossSalary"),
            &[],
            &config,
            &HolidayCalendar::default(),
            &[],
            date(2026, 1, 1),
        )
        .unwrap();

        let dates: Vec<NaiveDate> = summary
            .monthly_projection
            .iter()
            .map(|p| p.payment_date)
            .collect();
        // Jan 31 Sat -> Feb 2, Feb 28 Sat -> Mar 2, Mar 31 Tue
        assert_eq!(dates, vec![date(2026, 2, 2), date(2026, 3, 2), date(2026, 3, 31)]);
        assert_eq!(summary.monthly_projection[0].payroll_outflow, dec("53400"));
    }

    #[test]
    fn test_closed_period_is_skipped() {
        let mut closed = synthesize_period(2026, 1, PeriodType::Quincena1, 15, &HolidayCalendar::default()).unwrap();
        closed.is_closed = true;

        let summary = project_simple(&biweekly(), &[closed], &HolidayCalendar::default(), &[], date(2026, 1, 10));

        assert_eq!(summary.monthly_projection.len(), 1);
        assert_eq!(summary.monthly_projection[0].period_type, PeriodType::Quincena2);
    }

    #[test]
    fn test_supplied_period_payment_date_is_used() {
        let mut period = synthesize_period(2026, 1, PeriodType::Quincena1, 15, &HolidayCalendar::default()).unwrap();
        period.payment_date = date(2026, 1, 14);

        let summary = project_simple(&biweekly(), &[period], &HolidayCalendar::default(), &[], date(2026, 1, 10));
        assert_eq!(summary.monthly_projection[0].payment_date, date(2026, 1, 14));
    }

    #[test]
    fn test_unresolvable_payment_date_alert() {
        let holidays = HolidayCalendar::new(date(2026, 1, 1).iter_days().take(20).map(|d| Holiday {
            date: d,
            name: "Shutdown".to_string(),
            is_national: false,
        }));

        let summary = project_simple(&biweekly(), &[], &holidays, &[], date(2026, 1, 1));

        assert!(summary.has_alert(AlertKind::UnresolvablePaymentDate));
        assert_eq!(summary.monthly_projection.len(), 1);
        assert_eq!(summary.monthly_projection[0].period_type, PeriodType::Quincena2);
    }

    #[test]
    fn test_no_upcoming_payment_alert() {
        let summary = project_simple(&biweekly(), &[], &HolidayCalendar::default(), &[], date(2026, 1, 31));

        assert!(summary.next_payment.is_none());
        assert!(summary.has_alert(AlertKind::NoUpcomingPayment));
    }

    #[test]
    fn test_failed_runs_raise_alert() {
        let summary = project(
            &[create_test_employee("emp_001")],
            &create_components("grossSalary / 0"),
            &[],
            &biweekly(),
            &HolidayCalendar::default(),
            &[],
            date(2026, 1, 10),
        )
        .unwrap();

        assert!(summary.has_alert(AlertKind::ComputationFailed));
        assert_eq!(summary.monthly_projection[0].payroll_outflow, Decimal::ZERO);
    }

    #[test]
    fn test_employee_hired_later_is_not_paid() {
        let mut late = create_test_employee("emp_late");
        late.hire_date = date(2026, 1, 20);

        let summary = project(
            &[create_test_employee("emp_001"), late],
            &create_components("grossSalary / 2"),
            &[],
            &biweekly(),
            &HolidayCalendar::default(),
            &[],
            date(2026, 1, 10),
        )
        .unwrap();

        assert_eq!(summary.monthly_projection[0].employee_count, 1);
        assert_eq!(summary.monthly_projection[1].employee_count, 2);
    }

    /// PJ-002: installments are added to the period they fall in, bounded by the balance
    #[test]
    fn test_advance_installments_bounded_by_remaining() {
        let mut config = biweekly();
        config.horizon_months = 2;
        let advance = create_advance(
            "8000",
            vec![(1, date(2026, 1, 20), "5000"), (2, date(2026, 2, 5), "5000")],
        );

        let summary = project_simple(&config, &[], &HolidayCalendar::default(), &[advance], date(2026, 1, 10));

        let advance_outflow: Vec<Decimal> = summary
            .monthly_projection
            .iter()
            .map(|p| p.advance_outflow)
            .collect();
        assert_eq!(
            advance_outflow,
            vec![dec("0"), dec("5000"), dec("3000"), dec("0")]
        );
        assert_eq!(summary.monthly_projection[1].expected_outflow, dec("58400"));

        assert_eq!(summary.pending_advances.len(), 1);
        assert_eq!(summary.pending_advances[0].next_installment_date, date(2026, 1, 20));
        assert_eq!(summary.pending_advances[0].remaining_amount, dec("8000"));
    }

    #[test]
    fn test_overdue_installment_alert() {
        let advance = create_advance(
            "10000",
            vec![(1, date(2026, 1, 5), "5000"), (2, date(2026, 1, 20), "5000")],
        );

        let summary = project_simple(&biweekly(), &[], &HolidayCalendar::default(), &[advance], date(2026, 1, 10));

        assert!(summary.has_alert(AlertKind::OverdueInstallment));
        assert_eq!(summary.monthly_projection[1].advance_outflow, dec("5000"));
    }

    /// PJ-003: an installment inside a payment already made moves to the next payment
    #[test]
    fn test_installment_from_skipped_slot_is_carried_forward() {
        let mut config = biweekly();
        config.horizon_months = 2;
        // Jan 31 is a Saturday, so the second January payment went out on Jan 30
        let advance = create_advance("5000", vec![(1, date(2026, 1, 31), "5000")]);

        let summary = project_simple(&config, &[], &HolidayCalendar::default(), &[advance], date(2026, 1, 31));

        let dates: Vec<NaiveDate> = summary
            .monthly_projection
            .iter()
            .map(|p| p.payment_date)
            .collect();
        assert_eq!(dates, vec![date(2026, 2, 13), date(2026, 2, 27)]);
        assert_eq!(summary.monthly_projection[0].advance_outflow, dec("5000"));
        assert_eq!(summary.monthly_projection[1].advance_outflow, Decimal::ZERO);
        assert!(!summary.has_alert(AlertKind::OverdueInstallment));
    }

    #[test]
    fn test_installment_in_closed_period_is_carried_forward() {
        let mut closed = synthesize_period(2026, 1, PeriodType::Quincena1, 15, &HolidayCalendar::default()).unwrap();
        closed.is_closed = true;
        let advance = create_advance("5000", vec![(1, date(2026, 1, 12), "5000")]);

        let summary = project_simple(&biweekly(), &[closed], &HolidayCalendar::default(), &[advance], date(2026, 1, 10));

        assert_eq!(summary.monthly_projection.len(), 1);
        assert_eq!(summary.monthly_projection[0].advance_outflow, dec("5000"));
    }

    #[test]
    fn test_negative_installment_raises_alert() {
        let advance = create_advance(
            "10000",
            vec![(1, date(2026, 1, 20), "-500"), (2, date(2026, 1, 22), "5000")],
        );

        let summary = project_simple(&biweekly(), &[], &HolidayCalendar::default(), &[advance], date(2026, 1, 10));

        assert!(summary.has_alert(AlertKind::InvalidInstallment));
        assert_eq!(summary.monthly_projection[1].advance_outflow, dec("5000"));
    }

    #[test]
    fn test_outflow_overflow_is_reported_not_panicked() {
        // each net is 44.5e27; two of them exceed the decimal range
        let mut first = create_test_employee("emp_001");
        first.gross_salary = dec("50000000000000000000000000000");
        let mut second = first.clone();
        second.id = "emp_002".to_string();

        let summary = project(
            &[first, second],
            &create_components("grossSalary"),
            &[],
            &biweekly(),
            &HolidayCalendar::default(),
            &[],
            date(2026, 1, 10),
        )
        .unwrap();

        assert!(summary.has_alert(AlertKind::ComputationFailed));
        assert_eq!(
            summary.monthly_projection[0].payroll_outflow,
            dec("44500000000000000000000000000")
        );
    }

    #[test]
    fn test_rejected_advance_is_ignored() {
        let mut advance = create_advance("10000", vec![(1, date(2026, 1, 20), "5000")]);
        advance.status = AdvanceStatus::Rejected;

        let summary = project_simple(&biweekly(), &[], &HolidayCalendar::default(), &[advance], date(2026, 1, 10));

        assert_eq!(summary.total_expected_outflow(), dec("106800"));
        assert!(summary.pending_advances.is_empty());
    }

    #[test]
    fn test_outflow_exceeds_gross_alert() {
        // gross 60000 for the quincena, ratio 1.10 allows 66000
        let advance = create_advance("20000", vec![(1, date(2026, 1, 20), "20000")]);

        let summary = project_simple(&biweekly(), &[], &HolidayCalendar::default(), &[advance], date(2026, 1, 10));

        // 53400 + 20000 = 73400 > 66000
        assert!(summary.has_alert(AlertKind::OutflowExceedsGross));
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let mut config = biweekly();
        config.second_payment_day = None;

        let result = project(
            &[],
            &create_components("grossSalary"),
            &[],
            &config,
            &HolidayCalendar::default(),
            &[],
            date(2026, 1, 10),
        );
        assert!(matches!(result, Err(EngineError::InvalidProjectionConfig { .. })));
    }

    #[test]
    fn test_synthesized_quincenas() {
        let holidays = HolidayCalendar::default();
        let q1 = synthesize_period(2026, 2, PeriodType::Quincena1, 15, &holidays).unwrap();
        let q2 = synthesize_period(2026, 2, PeriodType::Quincena2, 31, &holidays).unwrap();

        assert_eq!(q1.period_start, date(2026, 2, 1));
        assert_eq!(q1.period_end, date(2026, 2, 15));
        assert_eq!(q2.period_start, date(2026, 2, 16));
        assert_eq!(q2.period_end, date(2026, 2, 28));
        assert_eq!(q2.payment_date, date(2026, 2, 28));
        assert_eq!(q1.business_days + q2.business_days, 20);
    }

    #[test]
    fn test_last_day_of_month() {
        assert_eq!(last_day_of_month(2026, 2), Some(28));
        assert_eq!(last_day_of_month(2028, 2), Some(29));
        assert_eq!(last_day_of_month(2026, 12), Some(31));
        assert_eq!(last_day_of_month(2026, 13), None);
    }
}
