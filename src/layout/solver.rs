//! Constraint solver integration for the in-memory view tree
//!
//! This module provides a wrapper around the kasuari Cassowary constraint solver,
//! translating constraint specs into the solver's format and extracting solutions.

use std::collections::HashMap;

use kasuari::{
    Expression, Solver as KasuariSolver, Strength, Variable as KasuariVariable,
    WeightedRelation::*,
};
use thiserror::Error;

use super::tree::ViewId;
use super::types::{Attribute, ConstraintSpec, Insets, Priority, Relation};

/// Base properties every view contributes to the system
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LayoutProperty {
    X,
    Y,
    Width,
    Height,
}

/// A variable in the constraint system
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LayoutVariable {
    pub view: ViewId,
    pub property: LayoutProperty,
}

impl LayoutVariable {
    pub fn new(view: ViewId, property: LayoutProperty) -> Self {
        Self { view, property }
    }

    pub fn x(view: ViewId) -> Self {
        Self::new(view, LayoutProperty::X)
    }

    pub fn y(view: ViewId) -> Self {
        Self::new(view, LayoutProperty::Y)
    }

    pub fn width(view: ViewId) -> Self {
        Self::new(view, LayoutProperty::Width)
    }

    pub fn height(view: ViewId) -> Self {
        Self::new(view, LayoutProperty::Height)
    }
}

/// Errors from the constraint solver
#[derive(Debug, Error)]
pub enum SolverError {
    #[error("Unsatisfiable constraint {constraint}: {reason}")]
    Unsatisfiable { constraint: String, reason: String },

    #[error("Internal solver error: {0}")]
    Internal(String),
}

/// Map a native priority onto a Cassowary strength
pub fn strength_for(priority: Priority) -> Strength {
    let value = priority.value();
    if priority.is_required() {
        Strength::REQUIRED
    } else if value >= Priority::HIGH.value() {
        Strength::STRONG
    } else if value >= Priority::LOW.value() {
        Strength::MEDIUM
    } else {
        Strength::WEAK
    }
}

/// Wrapper around kasuari solver
pub struct ConstraintSolver {
    solver: KasuariSolver,
    /// Maps our variables to kasuari variables
    variables: HashMap<LayoutVariable, KasuariVariable>,
    margins: HashMap<ViewId, Insets>,
}

impl ConstraintSolver {
    pub fn new() -> Self {
        Self {
            solver: KasuariSolver::new(),
            variables: HashMap::new(),
            margins: HashMap::new(),
        }
    }

    fn get_or_create_var(&mut self, var: LayoutVariable) -> KasuariVariable {
        *self.variables.entry(var).or_insert_with(KasuariVariable::new)
    }

    /// Layout margins used by the `*_margin` attributes of `view`
    pub fn set_margins(&mut self, view: ViewId, margins: Insets) {
        self.margins.insert(view, margins);
    }

    /// Express an attribute in terms of the view's base variables
    fn expression(&mut self, view: ViewId, attribute: Attribute) -> Expression {
        let margins = self.margins.get(&view).copied().unwrap_or_default();
        let x: Expression = self.get_or_create_var(LayoutVariable::x(view)).into();
        let y: Expression = self.get_or_create_var(LayoutVariable::y(view)).into();
        let width: Expression = self.get_or_create_var(LayoutVariable::width(view)).into();
        let height: Expression = self.get_or_create_var(LayoutVariable::height(view)).into();

        match attribute {
            Attribute::Width => width,
            Attribute::Height => height,
            Attribute::Left | Attribute::Leading => x,
            Attribute::Right | Attribute::Trailing => x + width,
            Attribute::CenterX => x + width * 0.5,
            Attribute::Top | Attribute::FirstBaseline => y,
            Attribute::Bottom | Attribute::Baseline => y + height,
            Attribute::CenterY => y + height * 0.5,
            Attribute::LeftMargin | Attribute::LeadingMargin => x + margins.leading,
            Attribute::RightMargin | Attribute::TrailingMargin => x + width - margins.trailing,
            Attribute::TopMargin => y + margins.top,
            Attribute::BottomMargin => y + height - margins.bottom,
        }
    }
}

impl Default for ConstraintSolver {
    fn default() -> Self {
        Self::new()
    }
}

impl ConstraintSolver {
    /// Convert a kasuari error to a SolverError with context
    fn convert_kasuari_error(e: kasuari::AddConstraintError, constraint_desc: &str) -> SolverError {
        match e {
            kasuari::AddConstraintError::UnsatisfiableConstraint => SolverError::Unsatisfiable {
                constraint: constraint_desc.to_string(),
                reason: "conflicts with existing constraints".to_string(),
            },
            kasuari::AddConstraintError::DuplicateConstraint => {
                SolverError::Internal(format!("Duplicate constraint: {}", constraint_desc))
            }
            kasuari::AddConstraintError::InternalSolverError(msg) => SolverError::Internal(
                format!("Internal solver error for {}: {}", constraint_desc, msg),
            ),
        }
    }

    /// Add a constraint to the solver
    pub fn add_constraint(&mut self, spec: &ConstraintSpec<ViewId>) -> Result<(), SolverError> {
        let lhs = self.expression(spec.first, spec.first_attribute);
        let strength = strength_for(spec.priority);
        let relation = match spec.relation {
            Relation::Equal => EQ(strength),
            Relation::LessOrEqual => LE(strength),
            Relation::GreaterOrEqual => GE(strength),
        };
        let constraint = match spec.second {
            Some((view, attribute)) => {
                let rhs = self.expression(view, attribute);
                lhs | relation | rhs * spec.multiplier + spec.constant
            }
            None => lhs | relation | spec.constant,
        };
        self.solver
            .add_constraint(constraint)
            .map_err(|e| Self::convert_kasuari_error(e, &spec.describe()))
    }

    /// Add an edit variable with suggested value (for anchoring the system)
    pub fn suggest_value(
        &mut self,
        var: LayoutVariable,
        value: f64,
        strength: Strength,
    ) -> Result<(), SolverError> {
        let kvar = self.get_or_create_var(var);
        self.solver
            .add_edit_variable(kvar, strength)
            .map_err(|e| SolverError::Internal(format!("Failed to add edit variable: {}", e)))?;
        self.solver
            .suggest_value(kvar, value)
            .map_err(|e| SolverError::Internal(format!("Failed to suggest value: {}", e)))?;
        Ok(())
    }
}

/// Solution from the constraint solver
pub struct Solution {
    pub values: HashMap<LayoutVariable, f64>,
}

impl Solution {
    /// Value of a variable; variables the solver never moved sit at zero
    pub fn get(&self, var: LayoutVariable) -> f64 {
        self.values.get(&var).copied().unwrap_or(0.0)
    }
}

impl ConstraintSolver {
    /// Solve the constraint system
    pub fn solve(&mut self) -> Solution {
        // Fetch changes from kasuari
        let changes = self.solver.fetch_changes();

        let mut values = HashMap::new();
        for (kvar, value) in changes {
            for (our_var, &k) in &self.variables {
                if k == *kvar {
                    values.insert(*our_var, *value);
                    break;
                }
            }
        }

        Solution { values }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spec(
        first: (ViewId, Attribute),
        relation: Relation,
        second: Option<(ViewId, Attribute)>,
        constant: f64,
    ) -> ConstraintSpec<ViewId> {
        ConstraintSpec {
            first: first.0,
            first_attribute: first.1,
            relation,
            second,
            multiplier: 1.0,
            constant,
            priority: Priority::REQUIRED,
        }
    }

    #[test]
    fn test_fixed_dimension() {
        let mut solver = ConstraintSolver::new();
        let view = ViewId(0);
        solver
            .add_constraint(&spec((view, Attribute::Width), Relation::Equal, None, 100.0))
            .unwrap();
        solver
            .suggest_value(LayoutVariable::width(view), 10.0, Strength::WEAK)
            .unwrap();

        let solution = solver.solve();
        assert!((solution.get(LayoutVariable::width(view)) - 100.0).abs() < 0.001);
    }

    #[test]
    fn test_edge_offset() {
        let mut solver = ConstraintSolver::new();
        let (a, b) = (ViewId(0), ViewId(1));
        // a.top = b.bottom + 8
        solver
            .add_constraint(&spec(
                (a, Attribute::Top),
                Relation::Equal,
                Some((b, Attribute::Bottom)),
                8.0,
            ))
            .unwrap();
        solver
            .suggest_value(LayoutVariable::y(b), 20.0, Strength::STRONG)
            .unwrap();
        solver
            .suggest_value(LayoutVariable::height(b), 30.0, Strength::STRONG)
            .unwrap();

        let solution = solver.solve();
        assert!((solution.get(LayoutVariable::y(a)) - 58.0).abs() < 0.001);
    }

    #[test]
    fn test_margin_attributes() {
        let mut solver = ConstraintSolver::new();
        let (parent, child) = (ViewId(0), ViewId(1));
        solver.set_margins(parent, Insets::uniform(16.0));
        solver
            .add_constraint(&spec(
                (child, Attribute::Left),
                Relation::Equal,
                Some((parent, Attribute::LeftMargin)),
                0.0,
            ))
            .unwrap();
        solver
            .suggest_value(LayoutVariable::x(parent), 100.0, Strength::STRONG)
            .unwrap();

        let solution = solver.solve();
        assert!((solution.get(LayoutVariable::x(child)) - 116.0).abs() < 0.001);
    }

    #[test]
    fn test_inequality_wins_over_weak_suggestion() {
        let mut solver = ConstraintSolver::new();
        let view = ViewId(0);
        solver
            .add_constraint(&spec(
                (view, Attribute::Width),
                Relation::GreaterOrEqual,
                None,
                50.0,
            ))
            .unwrap();
        solver
            .suggest_value(LayoutVariable::width(view), 30.0, Strength::WEAK)
            .unwrap();

        let solution = solver.solve();
        assert!(solution.get(LayoutVariable::width(view)) >= 50.0 - 0.001);
    }

    #[test]
    fn test_conflicting_constraints_error() {
        let mut solver = ConstraintSolver::new();
        let view = ViewId(0);
        solver
            .add_constraint(&spec((view, Attribute::Width), Relation::Equal, None, 100.0))
            .unwrap();
        let result =
            solver.add_constraint(&spec((view, Attribute::Width), Relation::Equal, None, 200.0));

        match result.unwrap_err() {
            SolverError::Unsatisfiable { constraint, reason } => {
                assert!(constraint.contains("width = 200"));
                assert!(reason.contains("conflicts"));
            }
            other => panic!("Expected Unsatisfiable error, got: {:?}", other),
        }
    }

    #[test]
    fn test_priority_mapping() {
        assert_eq!(strength_for(Priority::REQUIRED), Strength::REQUIRED);
        assert_eq!(strength_for(Priority::HIGH), Strength::STRONG);
        assert_eq!(strength_for(Priority::LOW), Strength::MEDIUM);
        assert_eq!(strength_for(Priority::FITTING), Strength::WEAK);
    }
}
