//! Salary component definitions.
//!
//! A [`SalaryComponentDefinition`] is a tenant-configured line of the payslip:
//! how its value is computed, how it is rounded and capped, and which other
//! components it reads.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::Employee;

/// Whether a component adds to or subtracts from net pay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ComponentType {
    /// Adds to gross and net.
    Earning,
    /// Subtracts from net.
    Deduction,
}

/// The evaluation strategy of a component.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CalcType {
    /// `calc_value` verbatim.
    Fixed,
    /// `calc_value` percent of the base variable.
    Percentage,
    /// An arithmetic expression in `calc_formula`.
    Formula,
    /// `calc_value` scaled by the active-day fraction of the period.
    DaysBased,
}

impl std::fmt::Display for CalcType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CalcType::Fixed => write!(f, "FIXED"),
            CalcType::Percentage => write!(f, "PERCENTAGE"),
            CalcType::Formula => write!(f, "FORMULA"),
            CalcType::DaysBased => write!(f, "DAYS_BASED"),
        }
    }
}

/// The running accumulator a PERCENTAGE or FORMULA component measures against.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BaseVariable {
    /// Running earnings total (seeded with the nominal gross salary).
    #[default]
    Gross,
    /// Running taxable earnings total.
    Base,
    /// Running earnings minus deductions.
    Net,
}

impl BaseVariable {
    /// The formula variable name bound to this accumulator.
    pub fn variable_name(&self) -> &'static str {
        match self {
            BaseVariable::Gross => "gross",
            BaseVariable::Base => "base",
            BaseVariable::Net => "net",
        }
    }
}

/// How a component value is rounded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RoundingMode {
    /// Round to nearest, ties away from zero.
    #[default]
    HalfUp,
    /// Truncate toward zero.
    Down,
    /// Round away from zero.
    Up,
    /// Keep full precision.
    None,
}

/// The population a component applies to.
///
/// # Example
///
/// ```
/// use payroll_engine::models::ApplyTo;
///
/// let filter: ApplyTo = serde_json::from_str(r#"{"scope": "COST_CENTERS", "ids": ["cc_ops"]}"#).unwrap();
/// assert_eq!(filter, ApplyTo::CostCenters { ids: vec!["cc_ops".to_string()] });
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "scope", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ApplyTo {
    /// Every employee.
    #[default]
    All,
    /// Employees assigned to one of the listed cost centers.
    CostCenters {
        /// Cost center identifiers.
        ids: Vec<String>,
    },
    /// The listed employees only.
    Employees {
        /// Employee identifiers.
        ids: Vec<String>,
    },
}

impl ApplyTo {
    /// Returns true if the filter selects the employee.
    pub fn includes(&self, employee: &Employee) -> bool {
        match self {
            ApplyTo::All => true,
            ApplyTo::CostCenters { ids } => employee
                .cost_center_id
                .as_ref()
                .is_some_and(|cc| ids.contains(cc)),
            ApplyTo::Employees { ids } => ids.contains(&employee.id),
        }
    }
}

fn default_rounding_decimals() -> u32 {
    2
}

fn default_true() -> bool {
    true
}

/// A configured salary component.
///
/// # Example
///
/// ```
/// use payroll_engine::models::{CalcType, ComponentType, SalaryComponentDefinition};
///
/// let yaml = r#"
/// code: PRESENTISMO
/// type: EARNING
/// calc_type: PERCENTAGE
/// calc_value: "10"
/// depends_on: [BASICO]
/// "#;
/// let component: SalaryComponentDefinition = serde_yaml::from_str(yaml).unwrap();
/// assert_eq!(component.component_type, ComponentType::Earning);
/// assert_eq!(component.calc_type, CalcType::Percentage);
/// assert_eq!(component.rounding_decimals, 2);
/// assert!(component.is_taxable);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SalaryComponentDefinition {
    /// Unique code within the tenant (e.g., "BASICO").
    pub code: String,
    /// Display name.
    #[serde(default)]
    pub name: String,
    /// Earning or deduction.
    #[serde(rename = "type")]
    pub component_type: ComponentType,
    /// Evaluation strategy.
    pub calc_type: CalcType,
    /// Amount, percentage or daily base depending on `calc_type`.
    #[serde(default)]
    pub calc_value: Option<Decimal>,
    /// Expression text for FORMULA components.
    #[serde(default)]
    pub calc_formula: Option<String>,
    /// Accumulator used by PERCENTAGE and FORMULA components.
    #[serde(default)]
    pub base_variable: BaseVariable,
    /// Codes of the components this one reads.
    #[serde(default)]
    pub depends_on: Vec<String>,
    /// Rounding strategy.
    #[serde(default)]
    pub rounding_mode: RoundingMode,
    /// Number of decimals kept by rounding.
    #[serde(default = "default_rounding_decimals")]
    pub rounding_decimals: u32,
    /// Lower bound applied after rounding.
    #[serde(default)]
    pub cap_min: Option<Decimal>,
    /// Upper bound applied after rounding.
    #[serde(default)]
    pub cap_max: Option<Decimal>,
    /// Whether an earning adds to the taxable `base` accumulator.
    #[serde(default = "default_true")]
    pub is_taxable: bool,
    /// Population filter.
    #[serde(default)]
    pub apply_to: ApplyTo,
    /// Whether the value is scaled by the proration factor on partial periods.
    #[serde(default)]
    pub prorate_on_partial: bool,
    /// Whether a failure here fails the whole employee result.
    #[serde(default)]
    pub mandatory: bool,
    /// Tie-break for evaluation and display order.
    #[serde(default)]
    pub order: i32,
}

impl SalaryComponentDefinition {
    /// Returns true if this component's raw value is scaled by the proration
    /// factor. DAYS_BASED components carry their own proration and are never
    /// scaled a second time.
    pub fn is_prorated(&self) -> bool {
        self.prorate_on_partial && self.calc_type != CalcType::DaysBased
    }
}

/// A versioned set of component definitions for one tenant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComponentSet {
    /// Configuration version label.
    pub version: String,
    /// The component definitions, in declaration order.
    pub components: Vec<SalaryComponentDefinition>,
}
