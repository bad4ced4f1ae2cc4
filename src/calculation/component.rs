//! Component calculation pipeline.
//!
//! A component's value goes through four steps in a fixed order:
//! evaluate, prorate, round once, cap. Each intermediate value is kept so the
//! result line and audit trace can show how the final amount was reached.

use rust_decimal::Decimal;

use crate::error::EvaluationError;

use super::dependency::CompiledComponent;
use super::formula::{CompiledCalc, VariableScope, evaluate};
use super::proration::ProrationFactor;
use super::rounding::{apply_caps, apply_rounding};

/// Intermediate and final values of one component.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ComponentValue {
    /// The value produced by the calc type.
    pub raw: Decimal,
    /// The value after proration; equal to `raw` when not prorated.
    pub prorated: Decimal,
    /// The value after rounding.
    pub rounded: Decimal,
    /// The final value after caps.
    pub capped: Decimal,
    /// The bound that was applied by caps, if any.
    pub cap_applied: Option<Decimal>,
}

/// Computes a component's value.
///
/// Proration applies only when the component is prorate-eligible and the
/// factor is partial. DAYS_BASED components already scale by active days and
/// are never prorated a second time.
///
/// # Example
///
/// ```
/// use payroll_engine::calculation::{calculate, resolve_components, ProrationFactor, VariableScope};
/// use payroll_engine::models::ComponentSet;
/// use rust_decimal::Decimal;
///
/// let set: ComponentSet = serde_yaml::from_str(r#"
/// version: "1"
/// components:
///   - code: BASICO
///     type: EARNING
///     calc_type: FIXED
///     calc_value: "50000"
///     prorate_on_partial: true
/// "#).unwrap();
/// let resolved = resolve_components(&set).unwrap();
/// let basico = resolved.get("BASICO").unwrap();
///
/// let half = ProrationFactor { active_days: 15, period_days: 30 };
/// let value = calculate(basico, &VariableScope::new(), half).unwrap();
/// assert_eq!(value.capped, Decimal::new(25000, 0));
/// ```
pub fn calculate(
    component: &CompiledComponent,
    scope: &VariableScope,
    factor: ProrationFactor,
) -> Result<ComponentValue, EvaluationError> {
    let definition = &component.definition;
    let raw = evaluate(&component.calc, scope, factor)?;

    let prorated = if prorates(component) && factor.is_partial() {
        raw.checked_mul(factor.fraction())
            .ok_or_else(|| EvaluationError::Overflow {
                operation: "proration".to_string(),
            })?
    } else {
        raw
    };

    let rounded = apply_rounding(
        prorated,
        definition.rounding_mode,
        definition.rounding_decimals,
    );
    let cap = apply_caps(rounded, definition.cap_min, definition.cap_max);

    Ok(ComponentValue {
        raw,
        prorated,
        rounded,
        capped: cap.value,
        cap_applied: cap.applied,
    })
}

fn prorates(component: &CompiledComponent) -> bool {
    component.definition.is_prorated() && !matches!(component.calc, CompiledCalc::DaysBased { .. })
}
