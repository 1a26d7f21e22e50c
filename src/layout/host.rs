//! The native layout engine as seen by this crate
//!
//! A host owns views and constraints. This crate only asks it to create
//! constraints, toggle them, and resolve pending geometry; the solver itself
//! stays behind this trait.

use std::fmt::Debug;
use std::hash::Hash;

use super::hierarchy::ViewHierarchy;
use super::types::ConstraintSpec;

/// A constraint-based layout engine
///
/// Hosts come in two flavours. Hosts answering `true` from
/// [`supports_active_flag`](LayoutHost::supports_active_flag) toggle
/// constraints with a bulk flag; the others require every constraint to be
/// installed on (and uninstalled from) an owning view. Hosts implement both
/// sets of operations; callers pick one per process.
pub trait LayoutHost: ViewHierarchy {
    /// Opaque, identity-compared handle to one native constraint
    type Constraint: Copy + Eq + Hash + Debug;

    /// Capability query: can constraints be toggled through an active flag?
    fn supports_active_flag(&self) -> bool;

    /// Create a constraint. New constraints are neither active nor installed.
    fn create_constraint(&mut self, spec: ConstraintSpec<Self::View>) -> Self::Constraint;

    /// Destroy a constraint the caller no longer needs. The host may reuse
    /// its handle for a later [`create_constraint`](LayoutHost::create_constraint).
    fn remove_constraint(&mut self, constraint: Self::Constraint);

    /// The view on the left-hand side of the equation
    fn first_item(&self, constraint: Self::Constraint) -> Self::View;

    /// The view on the right-hand side, if the equation relates two views
    fn second_item(&self, constraint: Self::Constraint) -> Option<Self::View>;

    fn activate_constraints(&mut self, constraints: &[Self::Constraint]);

    fn deactivate_constraints(&mut self, constraints: &[Self::Constraint]);

    fn is_constraint_active(&self, constraint: Self::Constraint) -> bool;

    /// Add `constraint` to the installed set of `view`
    fn install(&mut self, view: Self::View, constraint: Self::Constraint);

    /// Remove `constraint` from the installed set of `view`
    fn uninstall(&mut self, view: Self::View, constraint: Self::Constraint);

    fn is_installed(&self, view: Self::View, constraint: Self::Constraint) -> bool;

    /// Resolve pending layout for `view` and its subviews immediately
    fn layout_if_needed(&mut self, view: Self::View);
}
