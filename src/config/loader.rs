//! Configuration loading functionality.
//!
//! This module provides the [`ConfigLoader`] type for loading a tenant's
//! payroll configuration from YAML files.

use std::fs;
use std::path::Path;

use tracing::info;

use crate::calculation::{ResolvedComponents, resolve_components};
use crate::error::{EngineError, EngineResult};
use crate::models::{ComponentSet, HolidayCalendar, SalaryComponentDefinition};

use super::types::{HolidaysConfig, PayrollConfig, ProjectionConfig};

/// Loads, validates and provides access to a tenant configuration.
///
/// Loading resolves the component set, so a loader that exists always holds
/// an acyclic, fully validated component order.
///
/// # Directory Structure
///
/// ```text
/// config/default/
/// ├── components.yaml   # Version and salary component definitions
/// ├── holidays.yaml     # Holiday calendar
/// └── projection.yaml   # Payment schedule for projections
/// ```
///
/// # Example
///
/// ```no_run
/// use payroll_engine::config::ConfigLoader;
///
/// let loader = ConfigLoader::load("./config/default").unwrap();
/// let basico = loader.get_component("BASICO").unwrap();
/// println!("{}: {}", basico.code, basico.name);
/// println!("Evaluation order: {:?}", loader.resolved().codes_in_order());
/// ```
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    config: PayrollConfig,
    resolved: ResolvedComponents,
}

impl ConfigLoader {
    /// Loads configuration from the specified directory.
    ///
    /// # Errors
    ///
    /// - [`EngineError::ConfigNotFound`] if a required file is missing.
    /// - [`EngineError::ConfigParseError`] if a file is not valid YAML for its type.
    /// - Any component validation error from
    ///   [`resolve_components`](crate::calculation::resolve_components).
    /// - [`EngineError::InvalidProjectionConfig`] for an inconsistent schedule.
    pub fn load<P: AsRef<Path>>(path: P) -> EngineResult<Self> {
        let path = path.as_ref();

        let components = Self::load_yaml::<ComponentSet>(&path.join("components.yaml"))?;
        let holidays = Self::load_yaml::<HolidaysConfig>(&path.join("holidays.yaml"))?;
        let projection = Self::load_yaml::<ProjectionConfig>(&path.join("projection.yaml"))?;

        let loader = Self::from_config(PayrollConfig::new(
            components,
            HolidayCalendar::new(holidays.holidays),
            projection,
        ))?;

        info!(
            path = %path.display(),
            version = %loader.version(),
            components = loader.resolved.len(),
            holidays = loader.config.holidays().len(),
            "Loaded payroll configuration"
        );

        Ok(loader)
    }

    /// Validates an in-memory configuration.
    pub fn from_config(config: PayrollConfig) -> EngineResult<Self> {
        config.projection().validate()?;
        let resolved = resolve_components(config.components())?;
        Ok(Self { config, resolved })
    }

    /// Loads and parses a YAML file.
    fn load_yaml<T: serde::de::DeserializeOwned>(path: &Path) -> EngineResult<T> {
        let path_str = path.display().to_string();

        let content = fs::read_to_string(path).map_err(|_| EngineError::ConfigNotFound {
            path: path_str.clone(),
        })?;

        serde_yaml::from_str(&content).map_err(|e| EngineError::ConfigParseError {
            path: path_str,
            message: e.to_string(),
        })
    }

    /// Returns the underlying configuration.
    pub fn config(&self) -> &PayrollConfig {
        &self.config
    }

    /// Returns the configuration version.
    pub fn version(&self) -> &str {
        self.resolved.version()
    }

    /// Returns the resolved component order.
    pub fn resolved(&self) -> &ResolvedComponents {
        &self.resolved
    }

    /// Returns the holiday calendar.
    pub fn holidays(&self) -> &HolidayCalendar {
        self.config.holidays()
    }

    /// Returns the projection configuration.
    pub fn projection(&self) -> &ProjectionConfig {
        self.config.projection()
    }

    /// Gets a component definition by its code.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::ComponentNotFound`] for an unknown code.
    pub fn get_component(&self, code: &str) -> EngineResult<&SalaryComponentDefinition> {
        self.resolved
            .get(code)
            .map(|c| &c.definition)
            .ok_or_else(|| EngineError::ComponentNotFound {
                code: code.to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{PaymentDayRule, PaymentFrequency};
    use crate::models::CalcType;
    use chrono::NaiveDate;
    use rust_decimal::Decimal;
    use std::str::FromStr;

    fn config_path() -> &'static str {
        "./config/default"
    }

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_load_valid_configuration() {
        let result = ConfigLoader::load(config_path());
        assert!(result.is_ok(), "Failed to load config: {:?}", result.err());

        let loader = result.unwrap();
        assert_eq!(loader.version(), "2026.1");
    }

    #[test]
    fn test_get_component() {
        let loader = ConfigLoader::load(config_path()).unwrap();

        let basico = loader.get_component("BASICO").unwrap();
        assert_eq!(basico.calc_type, CalcType::Formula);
        assert_eq!(basico.calc_formula.as_deref(), Some("grossSalary / 2"));
        assert!(basico.mandatory);

        let presentismo = loader.get_component("PRESENTISMO").unwrap();
        assert_eq!(presentismo.calc_value, Some(dec("10")));
    }

    #[test]
    fn test_get_component_unknown_returns_error() {
        let loader = ConfigLoader::load(config_path()).unwrap();

        match loader.get_component("UNKNOWN") {
            Err(EngineError::ComponentNotFound { code }) => assert_eq!(code, "UNKNOWN"),
            other => panic!("Expected ComponentNotFound error, got {:?}", other),
        }
    }

    #[test]
    fn test_dependencies_ordered() {
        let loader = ConfigLoader::load(config_path()).unwrap();
        let order = loader.resolved().codes_in_order();

        let position = |code: &str| order.iter().position(|c| *c == code).unwrap();
        assert!(position("BASICO") < position("PRESENTISMO"));
        assert!(position("PRESENTISMO") < position("JUBILACION"));
        assert!(position("PRESENTISMO") < position("OBRA_SOCIAL"));
    }

    #[test]
    fn test_holidays_loaded() {
        let loader = ConfigLoader::load(config_path()).unwrap();
        let new_year = NaiveDate::from_ymd_opt(2026, 1, 1).unwrap();

        assert!(loader.holidays().is_holiday(new_year));
        assert!(loader.holidays().get(new_year).unwrap().is_national);
    }

    #[test]
    fn test_projection_loaded() {
        let loader = ConfigLoader::load(config_path()).unwrap();
        let projection = loader.projection();

        assert_eq!(projection.payment_frequency, PaymentFrequency::Biweekly);
        assert_eq!(projection.first_payment_day, 15);
        assert_eq!(projection.second_payment_day, Some(31));
        assert_eq!(projection.payment_day_rule, PaymentDayRule::PreviousBusinessDay);
    }

    #[test]
    fn test_load_missing_directory_returns_error() {
        let result = ConfigLoader::load("/nonexistent/path");

        match result {
            Err(EngineError::ConfigNotFound { path }) => {
                assert!(path.contains("components.yaml"));
            }
            other => panic!("Expected ConfigNotFound error, got {:?}", other),
        }
    }

    #[test]
    fn test_from_config_rejects_cycle() {
        let components: ComponentSet = serde_yaml::from_str(
            r#"
version: "broken"
components:
  - code: A
    type: EARNING
    calc_type: FORMULA
    calc_formula: "B"
    depends_on: [B]
  - code: B
    type: EARNING
    calc_type: FORMULA
    calc_formula: "A"
    depends_on: [A]
"#,
        )
        .unwrap();
        let loaded = ConfigLoader::load(config_path()).unwrap();
        let config = PayrollConfig::new(
            components,
            loaded.holidays().clone(),
            loaded.projection().clone(),
        );

        let result = ConfigLoader::from_config(config);
        assert!(matches!(result, Err(EngineError::CyclicDependency { .. })));
    }
}
