//! Configuration types for payroll computation and projection.
//!
//! This module contains the strongly-typed configuration structures that
//! are deserialized from YAML configuration files.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};
use crate::models::{ComponentSet, Holiday, HolidayCalendar};

/// How often salaries are paid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentFrequency {
    /// Once a month, on `first_payment_day`.
    Monthly,
    /// Twice a month, on `first_payment_day` and `second_payment_day`.
    Biweekly,
}

/// How a payment date falling on a non-business day is moved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentDayRule {
    /// Walk back to the closest earlier business day.
    PreviousBusinessDay,
    /// Walk forward to the closest later business day.
    NextBusinessDay,
    /// Keep the date as is.
    Exact,
}

impl std::fmt::Display for PaymentDayRule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PaymentDayRule::PreviousBusinessDay => write!(f, "PREVIOUS_BUSINESS_DAY"),
            PaymentDayRule::NextBusinessDay => write!(f, "NEXT_BUSINESS_DAY"),
            PaymentDayRule::Exact => write!(f, "EXACT"),
        }
    }
}

fn default_horizon_months() -> u32 {
    3
}

fn default_outflow_alert_ratio() -> Decimal {
    Decimal::new(110, 2)
}

/// Projection configuration from projection.yaml.
///
/// # Example
///
/// ```
/// use payroll_engine::config::{PaymentDayRule, PaymentFrequency, ProjectionConfig};
///
/// let yaml = r#"
/// payment_frequency: BIWEEKLY
/// first_payment_day: 15
/// second_payment_day: 31
/// payment_day_rule: PREVIOUS_BUSINESS_DAY
/// "#;
/// let config: ProjectionConfig = serde_yaml::from_str(yaml).unwrap();
/// assert_eq!(config.payment_frequency, PaymentFrequency::Biweekly);
/// assert_eq!(config.payment_day_rule, PaymentDayRule::PreviousBusinessDay);
/// assert_eq!(config.horizon_months, 3);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectionConfig {
    /// Payment frequency.
    pub payment_frequency: PaymentFrequency,
    /// Day of month of the first (or only) payment.
    pub first_payment_day: u32,
    /// Day of month of the second payment; required for BIWEEKLY.
    #[serde(default)]
    pub second_payment_day: Option<u32>,
    /// How non-business payment days are moved.
    pub payment_day_rule: PaymentDayRule,
    /// Number of months projected, starting with the as-of month.
    #[serde(default = "default_horizon_months")]
    pub horizon_months: u32,
    /// Outflow above `gross * ratio` raises an alert.
    #[serde(default = "default_outflow_alert_ratio")]
    pub outflow_alert_ratio: Decimal,
}

impl ProjectionConfig {
    /// Checks the payment days and the alert ratio.
    pub fn validate(&self) -> EngineResult<()> {
        let invalid = |message: String| EngineError::InvalidProjectionConfig { message };

        if !(1..=31).contains(&self.first_payment_day) {
            return Err(invalid(format!(
                "first_payment_day must be between 1 and 31, got {}",
                self.first_payment_day
            )));
        }

        match (self.payment_frequency, self.second_payment_day) {
            (PaymentFrequency::Biweekly, None) => {
                return Err(invalid(
                    "second_payment_day is required for BIWEEKLY payments".to_string(),
                ));
            }
            (_, Some(day)) if !(1..=31).contains(&day) => {
                return Err(invalid(format!(
                    "second_payment_day must be between 1 and 31, got {}",
                    day
                )));
            }
            (PaymentFrequency::Biweekly, Some(day)) if day <= self.first_payment_day => {
                return Err(invalid(
                    "second_payment_day must come after first_payment_day".to_string(),
                ));
            }
            _ => {}
        }

        if self.outflow_alert_ratio <= Decimal::ZERO {
            return Err(invalid(format!(
                "outflow_alert_ratio must be positive, got {}",
                self.outflow_alert_ratio
            )));
        }

        Ok(())
    }
}

/// Holiday configuration file structure.
#[derive(Debug, Clone, Deserialize)]
pub struct HolidaysConfig {
    /// The holidays of the calendar.
    #[serde(default)]
    pub holidays: Vec<Holiday>,
}

/// The complete tenant configuration loaded from YAML files.
#[derive(Debug, Clone)]
pub struct PayrollConfig {
    /// Versioned component definitions.
    components: ComponentSet,
    /// Holiday calendar.
    holidays: HolidayCalendar,
    /// Projection settings.
    projection: ProjectionConfig,
}

impl PayrollConfig {
    /// Creates a new PayrollConfig from its component parts.
    pub fn new(
        components: ComponentSet,
        holidays: HolidayCalendar,
        projection: ProjectionConfig,
    ) -> Self {
        Self {
            components,
            holidays,
            projection,
        }
    }

    /// Returns the component definitions.
    pub fn components(&self) -> &ComponentSet {
        &self.components
    }

    /// Returns the holiday calendar.
    pub fn holidays(&self) -> &HolidayCalendar {
        &self.holidays
    }

    /// Returns the projection configuration.
    pub fn projection(&self) -> &ProjectionConfig {
        &self.projection
    }
}
