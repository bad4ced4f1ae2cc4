//! Employee model.
//!
//! This module defines the Employee struct used to seed a payroll run and to
//! compute each period's active-day fraction.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Represents an employee on the payroll roster.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Employee {
    /// Unique identifier for the employee.
    pub id: String,
    /// Nominal reference salary for a full period.
    pub gross_salary: Decimal,
    /// The first day of employment.
    pub hire_date: NaiveDate,
    /// The last day of employment, if the employee has left.
    #[serde(default)]
    pub termination_date: Option<NaiveDate>,
    /// Whether the employee is currently active.
    #[serde(default = "default_active")]
    pub is_active: bool,
    /// Optional cost center assignment.
    #[serde(default)]
    pub cost_center_id: Option<String>,
}

fn default_active() -> bool {
    true
}

impl Employee {
    /// Returns true if the employee was employed on the given date.
    ///
    /// # Examples
    ///
    /// ```
    /// use payroll_engine::models::Employee;
    /// use chrono::NaiveDate;
    /// use rust_decimal::Decimal;
    ///
    /// let employee = Employee {
    ///     id: "emp_001".to_string(),
    ///     gross_salary: Decimal::new(50000, 0),
    ///     hire_date: NaiveDate::from_ymd_opt(2026, 1, 16).unwrap(),
    ///     termination_date: None,
    ///     is_active: true,
    ///     cost_center_id: None,
    /// };
    /// assert!(employee.is_employed_on(NaiveDate::from_ymd_opt(2026, 1, 16).unwrap()));
    /// assert!(!employee.is_employed_on(NaiveDate::from_ymd_opt(2026, 1, 15).unwrap()));
    /// ```
    pub fn is_employed_on(&self, date: NaiveDate) -> bool {
        date >= self.hire_date && self.termination_date.is_none_or(|end| date <= end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_employee() -> Employee {
        Employee {
            id: "emp_001".to_string(),
            gross_salary: Decimal::new(50000, 0),
            hire_date: NaiveDate::from_ymd_opt(2023, 6, 1).unwrap(),
            termination_date: None,
            is_active: true,
            cost_center_id: None,
        }
    }

    #[test]
    fn test_deserialize_employee() {
        let json = r#"{
            "id": "emp_001",
            "gross_salary": "850000.00",
            "hire_date": "2023-06-01",
            "cost_center_id": "cc_ops"
        }"#;

        let employee: Employee = serde_json::from_str(json).unwrap();
        assert_eq!(employee.id, "emp_001");
        assert_eq!(employee.gross_salary, Decimal::new(85000000, 2));
        assert_eq!(
            employee.hire_date,
            NaiveDate::from_ymd_opt(2023, 6, 1).unwrap()
        );
        assert_eq!(employee.termination_date, None);
        assert!(employee.is_active);
        assert_eq!(employee.cost_center_id.as_deref(), Some("cc_ops"));
    }

    #[test]
    fn test_serialize_employee() {
        let employee = create_test_employee();
        let json = serde_json::to_string(&employee).unwrap();
        assert!(json.contains("\"gross_salary\":\"50000\""));
        assert!(json.contains("\"hire_date\":\"2023-06-01\""));
    }

    #[test]
    fn test_employed_before_termination() {
        let mut employee = create_test_employee();
        employee.termination_date = NaiveDate::from_ymd_opt(2026, 1, 10);

        assert!(employee.is_employed_on(NaiveDate::from_ymd_opt(2026, 1, 10).unwrap()));
        assert!(!employee.is_employed_on(NaiveDate::from_ymd_opt(2026, 1, 11).unwrap()));
    }

    #[test]
    fn test_not_employed_before_hire() {
        let employee = create_test_employee();
        assert!(!employee.is_employed_on(NaiveDate::from_ymd_opt(2023, 5, 31).unwrap()));
    }
}
