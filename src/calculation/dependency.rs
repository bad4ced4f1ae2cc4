//! Dependency resolution for salary components.
//!
//! A [`ComponentSet`] is validated and ordered once per configuration version.
//! The resulting [`ResolvedComponents`] is immutable and shared by every run
//! and projection that uses that version.

use std::collections::{BTreeSet, HashMap};

use tracing::{debug, warn};

use crate::error::{EngineError, EngineResult};
use crate::models::{ComponentSet, SalaryComponentDefinition};

use super::formula::{CompiledCalc, RESERVED_VARIABLES};
use super::rounding::MAX_ROUNDING_DECIMALS;

/// A validated component with its calc inputs compiled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompiledComponent {
    /// The component as configured.
    pub definition: SalaryComponentDefinition,
    /// The compiled calc type.
    pub calc: CompiledCalc,
}

impl CompiledComponent {
    /// The component code.
    pub fn code(&self) -> &str {
        &self.definition.code
    }
}

/// A component set in a valid evaluation order.
///
/// Every component appears after all of its dependencies. Among components
/// whose dependencies are satisfied, lower `order` comes first, then code.
#[derive(Debug, Clone)]
pub struct ResolvedComponents {
    version: String,
    components: Vec<CompiledComponent>,
    order: Vec<usize>,
    dependents: Vec<Vec<usize>>,
    index: HashMap<String, usize>,
}

impl ResolvedComponents {
    /// The configuration version this set was resolved from.
    pub fn version(&self) -> &str {
        &self.version
    }

    /// Number of components.
    pub fn len(&self) -> usize {
        self.components.len()
    }

    /// Returns true if the set has no components.
    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    /// Components in evaluation order.
    pub fn in_order(&self) -> impl Iterator<Item = &CompiledComponent> {
        self.order.iter().map(|i| &self.components[*i])
    }

    /// Component codes in evaluation order.
    pub fn codes_in_order(&self) -> Vec<&str> {
        self.in_order().map(CompiledComponent::code).collect()
    }

    /// Looks up a component by code.
    pub fn get(&self, code: &str) -> Option<&CompiledComponent> {
        self.index.get(code).map(|i| &self.components[*i])
    }

    /// Codes of the components that declare `code` as a dependency.
    pub fn dependents_of(&self, code: &str) -> Vec<&str> {
        self.index
            .get(code)
            .map(|i| {
                self.dependents[*i]
                    .iter()
                    .map(|d| self.components[*d].code())
                    .collect()
            })
            .unwrap_or_default()
    }
}

fn validate(component: &SalaryComponentDefinition) -> EngineResult<()> {
    if RESERVED_VARIABLES.contains(&component.code.as_str()) {
        return Err(EngineError::ReservedComponentCode {
            code: component.code.clone(),
        });
    }

    if let (Some(min), Some(max)) = (component.cap_min, component.cap_max) {
        if min > max {
            return Err(EngineError::InvalidCapRange {
                component: component.code.clone(),
                min,
                max,
            });
        }
    }

    if component.rounding_decimals > MAX_ROUNDING_DECIMALS {
        return Err(EngineError::InvalidRoundingDecimals {
            component: component.code.clone(),
            decimals: component.rounding_decimals,
        });
    }

    Ok(())
}

/// Formula variables that are neither reserved nor declared in `depends_on`.
///
/// A formula only sees the components it declares, so each of these fails
/// the component with an unknown variable on every run.
fn undeclared_references<'a>(
    component: &SalaryComponentDefinition,
    calc: &'a CompiledCalc,
) -> Vec<&'a str> {
    let CompiledCalc::Formula { formula: Ok(formula) } = calc else {
        return Vec::new();
    };

    formula
        .variables()
        .into_iter()
        .filter(|name| !RESERVED_VARIABLES.contains(name))
        .filter(|name| !component.depends_on.iter().any(|d| d == name))
        .collect()
}

/// Validates a component set and computes its evaluation order.
///
/// # Errors
///
/// - [`EngineError::DuplicateComponent`] when two components share a code.
/// - [`EngineError::ReservedComponentCode`], [`EngineError::InvalidCapRange`],
///   [`EngineError::InvalidRoundingDecimals`], [`EngineError::MissingCalcValue`]
///   or [`EngineError::MissingFormula`] for an invalid component.
/// - [`EngineError::UnknownDependency`] when a dependency is not in the set.
/// - [`EngineError::CyclicDependency`] naming the cycle's members.
///
/// # Example
///
/// ```
/// use payroll_engine::calculation::resolve_components;
/// use payroll_engine::models::ComponentSet;
///
/// let set: ComponentSet = serde_yaml::from_str(r#"
/// version: "2026.1"
/// components:
///   - code: PRESENTISMO
///     type: EARNING
///     calc_type: FORMULA
///     calc_formula: "BASICO * 0.0833"
///     depends_on: [BASICO]
///   - code: BASICO
///     type: EARNING
///     calc_type: FIXED
///     calc_value: "50000"
/// "#).unwrap();
///
/// let resolved = resolve_components(&set).unwrap();
/// assert_eq!(resolved.codes_in_order(), vec!["BASICO", "PRESENTISMO"]);
/// ```
pub fn resolve_components(set: &ComponentSet) -> EngineResult<ResolvedComponents> {
    let mut index: HashMap<String, usize> = HashMap::with_capacity(set.components.len());
    for (i, component) in set.components.iter().enumerate() {
        if index.insert(component.code.clone(), i).is_some() {
            return Err(EngineError::DuplicateComponent {
                code: component.code.clone(),
            });
        }
    }

    let mut components = Vec::with_capacity(set.components.len());
    let mut dependencies: Vec<BTreeSet<usize>> = Vec::with_capacity(set.components.len());
    for component in &set.components {
        validate(component)?;
        let calc = CompiledCalc::compile(component)?;
        for name in undeclared_references(component, &calc) {
            warn!(
                component = %component.code,
                variable = name,
                "Formula references a variable missing from depends_on; the component will fail"
            );
        }

        let mut deps = BTreeSet::new();
        for dependency in &component.depends_on {
            let dep = index
                .get(dependency)
                .ok_or_else(|| EngineError::UnknownDependency {
                    component: component.code.clone(),
                    dependency: dependency.clone(),
                })?;
            deps.insert(*dep);
        }

        dependencies.push(deps);
        components.push(CompiledComponent {
            definition: component.clone(),
            calc,
        });
    }

    let mut dependents: Vec<Vec<usize>> = vec![Vec::new(); components.len()];
    for (i, deps) in dependencies.iter().enumerate() {
        for dep in deps {
            dependents[*dep].push(i);
        }
    }

    let order = topological_order(&components, &dependencies, &dependents)?;

    debug!(
        version = %set.version,
        components = components.len(),
        "Resolved component evaluation order"
    );

    Ok(ResolvedComponents {
        version: set.version.clone(),
        components,
        order,
        dependents,
        index,
    })
}

/// Kahn's algorithm with the ready set ordered by `(order, code)`.
fn topological_order(
    components: &[CompiledComponent],
    dependencies: &[BTreeSet<usize>],
    dependents: &[Vec<usize>],
) -> EngineResult<Vec<usize>> {
    let key = |i: usize| (components[i].definition.order, components[i].code(), i);

    let mut in_degree: Vec<usize> = dependencies.iter().map(BTreeSet::len).collect();
    let mut ready: BTreeSet<(i32, &str, usize)> = (0..components.len())
        .filter(|i| in_degree[*i] == 0)
        .map(key)
        .collect();

    let mut order = Vec::with_capacity(components.len());
    while let Some((_, _, current)) = ready.pop_first() {
        order.push(current);
        for dependent in &dependents[current] {
            in_degree[*dependent] -= 1;
            if in_degree[*dependent] == 0 {
                ready.insert(key(*dependent));
            }
        }
    }

    if order.len() == components.len() {
        return Ok(order);
    }

    Err(EngineError::CyclicDependency {
        cycle: find_cycle(components, dependencies, &in_degree),
    })
}

/// Walks unresolved dependencies from the lowest unresolved code until a
/// component repeats. Every unresolved component has an unresolved dependency,
/// so the walk always closes a cycle.
fn find_cycle(
    components: &[CompiledComponent],
    dependencies: &[BTreeSet<usize>],
    in_degree: &[usize],
) -> Vec<String> {
    let unresolved = |i: &usize| in_degree[*i] > 0;
    let by_code = |i: &usize| components[*i].code();

    let Some(mut current) = (0..components.len()).filter(unresolved).min_by_key(by_code) else {
        return Vec::new();
    };

    let mut path: Vec<usize> = Vec::new();
    loop {
        if let Some(start) = path.iter().position(|p| *p == current) {
            let mut cycle: Vec<String> = path[start..]
                .iter()
                .map(|i| components[*i].code().to_string())
                .collect();
            cycle.push(components[current].code().to_string());
            return cycle;
        }
        path.push(current);

        match dependencies[current]
            .iter()
            .copied()
            .filter(unresolved)
            .min_by_key(by_code)
        {
            Some(next) => current = next,
            None => {
                return path
                    .iter()
                    .map(|i| components[*i].code().to_string())
                    .collect();
            }
        }
    }
}
