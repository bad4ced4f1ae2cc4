//! Salary advance and installment models.
//!
//! Advances are read by the projection generator only; the payroll run never
//! touches them.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Lifecycle status of a salary advance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AdvanceStatus {
    /// Requested, awaiting approval.
    Pending,
    /// Approved, not yet disbursed.
    Approved,
    /// Disbursed and being repaid.
    Active,
    /// Fully repaid.
    Paid,
    /// Rejected by an approver.
    Rejected,
    /// Withdrawn before disbursement.
    Cancelled,
}

/// Status of a single installment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum InstallmentStatus {
    /// Not yet settled.
    Pending,
    /// Settled.
    Paid,
    /// Will not be collected.
    Cancelled,
}

/// One scheduled repayment of an advance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Installment {
    /// Position in the schedule, starting at 1.
    pub number: u32,
    /// Scheduled amount.
    pub amount: Decimal,
    /// Scheduled date.
    pub due_date: NaiveDate,
    /// Settlement status.
    pub status: InstallmentStatus,
}

/// A salary advance with its repayment schedule.
///
/// # Example
///
/// ```
/// use payroll_engine::models::{AdvanceStatus, Installment, InstallmentStatus, SalaryAdvance};
/// use chrono::NaiveDate;
/// use rust_decimal::Decimal;
///
/// let advance = SalaryAdvance {
///     id: "adv_001".to_string(),
///     employee_id: "emp_001".to_string(),
///     amount: Decimal::new(30000, 0),
///     remaining_amount: Decimal::new(20000, 0),
///     status: AdvanceStatus::Active,
///     installments: vec![
///         Installment {
///             number: 1,
///             amount: Decimal::new(10000, 0),
///             due_date: NaiveDate::from_ymd_opt(2026, 1, 31).unwrap(),
///             status: InstallmentStatus::Paid,
///         },
///         Installment {
///             number: 2,
///             amount: Decimal::new(10000, 0),
///             due_date: NaiveDate::from_ymd_opt(2026, 2, 28).unwrap(),
///             status: InstallmentStatus::Pending,
///         },
///     ],
/// };
///
/// assert!(advance.is_outstanding());
/// assert_eq!(advance.next_pending_installment().unwrap().number, 2);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SalaryAdvance {
    /// Unique identifier of the advance.
    pub id: String,
    /// The employee who received the advance.
    pub employee_id: String,
    /// Original advance amount.
    pub amount: Decimal,
    /// Amount still to be repaid.
    pub remaining_amount: Decimal,
    /// Lifecycle status.
    pub status: AdvanceStatus,
    /// Repayment schedule, ordered by installment number.
    #[serde(default)]
    pub installments: Vec<Installment>,
}

impl SalaryAdvance {
    /// Returns true if the advance is approved or active with a balance left.
    pub fn is_outstanding(&self) -> bool {
        matches!(self.status, AdvanceStatus::Approved | AdvanceStatus::Active)
            && self.remaining_amount > Decimal::ZERO
    }

    /// The first installment, by number, that is still pending.
    pub fn next_pending_installment(&self) -> Option<&Installment> {
        self.pending_installments().next()
    }

    /// All pending installments in schedule order.
    pub fn pending_installments(&self) -> impl Iterator<Item = &Installment> {
        let mut pending: Vec<&Installment> = self
            .installments
            .iter()
            .filter(|i| i.status == InstallmentStatus::Pending)
            .collect();
        pending.sort_by_key(|i| (i.number, i.due_date));
        pending.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn installment(number: u32, month: u32, status: InstallmentStatus) -> Installment {
        Installment {
            number,
            amount: Decimal::new(5000, 0),
            due_date: NaiveDate::from_ymd_opt(2026, month, 15).unwrap(),
            status,
        }
    }

    fn create_advance(status: AdvanceStatus, remaining: i64) -> SalaryAdvance {
        SalaryAdvance {
            id: "adv_001".to_string(),
            employee_id: "emp_001".to_string(),
            amount: Decimal::new(15000, 0),
            remaining_amount: Decimal::new(remaining, 0),
            status,
            installments: vec![
                installment(3, 3, InstallmentStatus::Pending),
                installment(1, 1, InstallmentStatus::Paid),
                installment(2, 2, InstallmentStatus::Pending),
            ],
        }
    }

    #[test]
    fn test_outstanding_requires_balance() {
        assert!(create_advance(AdvanceStatus::Active, 10000).is_outstanding());
        assert!(create_advance(AdvanceStatus::Approved, 10000).is_outstanding());
        assert!(!create_advance(AdvanceStatus::Active, 0).is_outstanding());
    }

    #[test]
    fn test_closed_statuses_are_not_outstanding() {
        for status in [
            AdvanceStatus::Pending,
            AdvanceStatus::Paid,
            AdvanceStatus::Rejected,
            AdvanceStatus::Cancelled,
        ] {
            assert!(!create_advance(status, 10000).is_outstanding());
        }
    }

    #[test]
    fn test_pending_installments_in_schedule_order() {
        let advance = create_advance(AdvanceStatus::Active, 10000);
        let numbers: Vec<u32> = advance.pending_installments().map(|i| i.number).collect();
        assert_eq!(numbers, vec![2, 3]);
        assert_eq!(advance.next_pending_installment().unwrap().number, 2);
    }

    #[test]
    fn test_deserialize_advance() {
        let json = r#"{
            "id": "adv_009",
            "employee_id": "emp_004",
            "amount": "12000",
            "remaining_amount": "12000",
            "status": "APPROVED",
            "installments": [
                {"number": 1, "amount": "6000", "due_date": "2026-02-15", "status": "PENDING"}
            ]
        }"#;
        let advance: SalaryAdvance = serde_json::from_str(json).unwrap();
        assert_eq!(advance.status, AdvanceStatus::Approved);
        assert_eq!(advance.installments.len(), 1);
        assert_eq!(advance.installments[0].status, InstallmentStatus::Pending);
    }
}
