//! In-memory view tree implementing [`LayoutHost`]
//!
//! `ViewTree` stands in for a platform layout engine: views form a forest,
//! constraints are created inert and become effective when they are either
//! flagged active or installed on a view. Refreshing a view solves every
//! effective constraint with Cassowary and writes the frames of that view's
//! subtree. Removed constraints go on a free list and their slots are
//! reused by later creations.

use kasuari::Strength;

use super::hierarchy::{ancestors, ViewHierarchy};
use super::host::LayoutHost;
use super::solver::{ConstraintSolver, LayoutVariable};
use super::types::{ConstraintSpec, Frame, Insets};

/// Handle to a view in a [`ViewTree`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ViewId(pub(crate) u32);

/// Handle to a constraint in a [`ViewTree`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConstraintId(pub(crate) u32);

impl ViewId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl ConstraintId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

#[derive(Debug, Clone)]
struct ViewNode {
    name: String,
    superview: Option<ViewId>,
    frame: Frame,
    margins: Insets,
    installed: Vec<ConstraintId>,
}

#[derive(Debug, Clone)]
struct ConstraintNode {
    spec: ConstraintSpec<ViewId>,
    active: bool,
    installed_on: Option<ViewId>,
    released: bool,
}

/// Arena-backed view forest with a Cassowary-solved layout pass
#[derive(Debug, Clone)]
pub struct ViewTree {
    views: Vec<ViewNode>,
    constraints: Vec<ConstraintNode>,
    free: Vec<ConstraintId>,
    supports_active_flag: bool,
    refresh_log: Vec<ViewId>,
    unsatisfied: Vec<ConstraintId>,
}

impl Default for ViewTree {
    fn default() -> Self {
        Self::new()
    }
}

impl ViewTree {
    /// A tree whose constraints can be toggled with an active flag
    pub fn new() -> Self {
        Self {
            views: Vec::new(),
            constraints: Vec::new(),
            free: Vec::new(),
            supports_active_flag: true,
            refresh_log: Vec::new(),
            unsatisfied: Vec::new(),
        }
    }

    /// A tree that only supports installing constraints on views
    pub fn without_active_flag() -> Self {
        Self {
            supports_active_flag: false,
            ..Self::new()
        }
    }

    /// Add a view as the last subview of `superview`, or as a new root
    pub fn add_view(&mut self, name: impl Into<String>, superview: Option<ViewId>) -> ViewId {
        let id = ViewId(self.views.len() as u32);
        self.views.push(ViewNode {
            name: name.into(),
            superview,
            frame: Frame::default(),
            margins: Insets::default(),
            installed: Vec::new(),
        });
        id
    }

    /// Detach `view` from its superview, making it a root.
    ///
    /// Constraints installed on the old ancestors stay where they are; like
    /// a platform engine, the tree leaves cleaning them up to the caller.
    pub fn remove_from_superview(&mut self, view: ViewId) {
        self.views[view.index()].superview = None;
    }

    pub fn len(&self) -> usize {
        self.views.len()
    }

    pub fn is_empty(&self) -> bool {
        self.views.is_empty()
    }

    /// All views in creation order
    pub fn views(&self) -> impl Iterator<Item = ViewId> + '_ {
        (0..self.views.len() as u32).map(ViewId)
    }

    /// Find a view by name
    pub fn find(&self, name: &str) -> Option<ViewId> {
        self.views().find(|&id| self.name(id) == name)
    }

    pub fn name(&self, view: ViewId) -> &str {
        &self.views[view.index()].name
    }

    pub fn subviews(&self, view: ViewId) -> impl Iterator<Item = ViewId> + '_ {
        self.views()
            .filter(move |&id| self.views[id.index()].superview == Some(view))
    }

    pub fn frame(&self, view: ViewId) -> Frame {
        self.views[view.index()].frame
    }

    /// Set the frame a view keeps unless constraints move it
    pub fn set_frame(&mut self, view: ViewId, frame: Frame) {
        self.views[view.index()].frame = frame;
    }

    pub fn margins(&self, view: ViewId) -> Insets {
        self.views[view.index()].margins
    }

    pub fn set_margins(&mut self, view: ViewId, margins: Insets) {
        self.views[view.index()].margins = margins;
    }

    /// Constraints currently installed on `view`, in installation order
    pub fn installed_constraints(&self, view: ViewId) -> &[ConstraintId] {
        &self.views[view.index()].installed
    }

    pub fn spec(&self, constraint: ConstraintId) -> &ConstraintSpec<ViewId> {
        &self.constraints[constraint.index()].spec
    }

    /// Number of live constraints: created and not yet removed
    pub fn constraint_count(&self) -> usize {
        self.constraints.len() - self.free.len()
    }

    /// Constraints that take part in layout
    pub fn effective_constraints(&self) -> impl Iterator<Item = ConstraintId> + '_ {
        self.constraints
            .iter()
            .enumerate()
            .filter(|(_, c)| !c.released && (c.active || c.installed_on.is_some()))
            .map(|(i, _)| ConstraintId(i as u32))
    }

    /// Views passed to `layout_if_needed`, oldest first
    pub fn refresh_log(&self) -> &[ViewId] {
        &self.refresh_log
    }

    pub fn take_refresh_log(&mut self) -> Vec<ViewId> {
        std::mem::take(&mut self.refresh_log)
    }

    /// Constraints the last refresh had to drop because they conflicted
    pub fn unsatisfied(&self) -> &[ConstraintId] {
        &self.unsatisfied
    }

    /// Flip the active flag, which a tree built without one does not have
    fn set_flags(&mut self, constraints: &[ConstraintId], active: bool) {
        if !self.supports_active_flag {
            log::error!(
                "ignoring active flag on {} constraint(s): tree only supports installation",
                constraints.len()
            );
            return;
        }
        for c in constraints {
            let node = &mut self.constraints[c.index()];
            if node.released {
                log::warn!("ignoring active flag on removed constraint {:?}", c);
                continue;
            }
            node.active = active;
        }
    }

    fn is_descendant_or_self(&self, view: ViewId, ancestor: ViewId) -> bool {
        ancestors(self, view).any(|v| v == ancestor)
    }

    fn build_solver(&mut self) -> ConstraintSolver {
        let mut solver = ConstraintSolver::new();
        for id in 0..self.views.len() {
            let view = ViewId(id as u32);
            let node = &self.views[id];
            solver.set_margins(view, node.margins);

            // roots hold their frame firmly, subviews give way to constraints
            let strength = if node.superview.is_none() {
                Strength::STRONG
            } else {
                Strength::WEAK
            };
            let anchors = [
                (LayoutVariable::x(view), node.frame.x),
                (LayoutVariable::y(view), node.frame.y),
                (LayoutVariable::width(view), node.frame.width),
                (LayoutVariable::height(view), node.frame.height),
            ];
            for (var, value) in anchors {
                if let Err(e) = solver.suggest_value(var, value, strength) {
                    log::warn!("could not anchor {:?}: {}", var, e);
                }
            }
        }

        self.unsatisfied.clear();
        let effective: Vec<ConstraintId> = self.effective_constraints().collect();
        for id in effective {
            if let Err(e) = solver.add_constraint(self.spec(id)) {
                log::warn!("dropping constraint {:?}: {}", id, e);
                self.unsatisfied.push(id);
            }
        }
        solver
    }
}

impl ViewHierarchy for ViewTree {
    type View = ViewId;

    fn superview(&self, view: ViewId) -> Option<ViewId> {
        self.views.get(view.index()).and_then(|node| node.superview)
    }
}

impl LayoutHost for ViewTree {
    type Constraint = ConstraintId;

    fn supports_active_flag(&self) -> bool {
        self.supports_active_flag
    }

    fn create_constraint(&mut self, spec: ConstraintSpec<ViewId>) -> ConstraintId {
        let node = ConstraintNode {
            spec,
            active: false,
            installed_on: None,
            released: false,
        };
        match self.free.pop() {
            Some(id) => {
                self.constraints[id.index()] = node;
                id
            }
            None => {
                let id = ConstraintId(self.constraints.len() as u32);
                self.constraints.push(node);
                id
            }
        }
    }

    fn remove_constraint(&mut self, constraint: ConstraintId) {
        let node = &mut self.constraints[constraint.index()];
        if node.released {
            return;
        }
        node.active = false;
        node.released = true;
        if let Some(view) = node.installed_on {
            self.uninstall(view, constraint);
        }
        self.free.push(constraint);
    }

    fn first_item(&self, constraint: ConstraintId) -> ViewId {
        self.spec(constraint).first
    }

    fn second_item(&self, constraint: ConstraintId) -> Option<ViewId> {
        self.spec(constraint).second.map(|(view, _)| view)
    }

    fn activate_constraints(&mut self, constraints: &[ConstraintId]) {
        self.set_flags(constraints, true);
    }

    fn deactivate_constraints(&mut self, constraints: &[ConstraintId]) {
        self.set_flags(constraints, false);
    }

    fn is_constraint_active(&self, constraint: ConstraintId) -> bool {
        self.constraints[constraint.index()].active
    }

    fn install(&mut self, view: ViewId, constraint: ConstraintId) {
        if let Some(previous) = self.constraints[constraint.index()].installed_on {
            self.uninstall(previous, constraint);
        }
        self.views[view.index()].installed.push(constraint);
        self.constraints[constraint.index()].installed_on = Some(view);
    }

    fn uninstall(&mut self, view: ViewId, constraint: ConstraintId) {
        self.views[view.index()].installed.retain(|&c| c != constraint);
        let node = &mut self.constraints[constraint.index()];
        if node.installed_on == Some(view) {
            node.installed_on = None;
        }
    }

    fn is_installed(&self, view: ViewId, constraint: ConstraintId) -> bool {
        self.views[view.index()].installed.contains(&constraint)
    }

    fn layout_if_needed(&mut self, view: ViewId) {
        self.refresh_log.push(view);
        let solution = self.build_solver().solve();
        for id in 0..self.views.len() {
            let target = ViewId(id as u32);
            if !self.is_descendant_or_self(target, view) {
                continue;
            }
            self.views[id].frame = Frame::new(
                solution.get(LayoutVariable::x(target)),
                solution.get(LayoutVariable::y(target)),
                solution.get(LayoutVariable::width(target)),
                solution.get(LayoutVariable::height(target)),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::types::{Attribute, Priority, Relation};

    fn pin(
        tree: &mut ViewTree,
        first: (ViewId, Attribute),
        second: Option<(ViewId, Attribute)>,
        constant: f64,
    ) -> ConstraintId {
        tree.create_constraint(ConstraintSpec {
            first: first.0,
            first_attribute: first.1,
            relation: Relation::Equal,
            second,
            multiplier: 1.0,
            constant,
            priority: Priority::REQUIRED,
        })
    }

    fn assert_frame(actual: Frame, expected: Frame) {
        let close = |a: f64, b: f64| (a - b).abs() < 0.001;
        assert!(
            close(actual.x, expected.x)
                && close(actual.y, expected.y)
                && close(actual.width, expected.width)
                && close(actual.height, expected.height),
            "expected {}, got {}",
            expected,
            actual
        );
    }

    #[test]
    fn test_new_constraints_are_inert() {
        let mut tree = ViewTree::new();
        let root = tree.add_view("root", None);
        let c = pin(&mut tree, (root, Attribute::Width), None, 10.0);
        assert!(!tree.is_constraint_active(c));
        assert!(!tree.is_installed(root, c));
        assert_eq!(tree.effective_constraints().count(), 0);
    }

    #[test]
    fn test_install_moves_between_views() {
        let mut tree = ViewTree::without_active_flag();
        let root = tree.add_view("root", None);
        let child = tree.add_view("child", Some(root));
        let c = pin(&mut tree, (child, Attribute::Width), None, 10.0);

        tree.install(child, c);
        tree.install(root, c);
        assert!(tree.installed_constraints(child).is_empty());
        assert_eq!(tree.installed_constraints(root), &[c]);
    }

    #[test]
    fn test_refresh_solves_installed_constraints() {
        let mut tree = ViewTree::without_active_flag();
        let root = tree.add_view("root", None);
        tree.set_frame(root, Frame::new(0.0, 0.0, 320.0, 480.0));
        let child = tree.add_view("child", Some(root));

        let constraints = [
            pin(&mut tree, (child, Attribute::Top), Some((root, Attribute::Top)), 20.0),
            pin(&mut tree, (child, Attribute::Left), Some((root, Attribute::Left)), 10.0),
            pin(&mut tree, (child, Attribute::Width), None, 100.0),
            pin(&mut tree, (child, Attribute::Height), None, 40.0),
        ];
        for c in constraints {
            tree.install(root, c);
        }
        tree.layout_if_needed(root);

        assert_frame(tree.frame(root), Frame::new(0.0, 0.0, 320.0, 480.0));
        assert_frame(tree.frame(child), Frame::new(10.0, 20.0, 100.0, 40.0));
        assert_eq!(tree.refresh_log(), &[root]);
    }

    #[test]
    fn test_refresh_only_touches_subtree() {
        let mut tree = ViewTree::new();
        let root = tree.add_view("root", None);
        let left = tree.add_view("left", Some(root));
        let right = tree.add_view("right", Some(root));
        let a = pin(&mut tree, (left, Attribute::Width), None, 50.0);
        let b = pin(&mut tree, (right, Attribute::Width), None, 70.0);
        tree.activate_constraints(&[a, b]);

        tree.layout_if_needed(left);
        assert!((tree.frame(left).width - 50.0).abs() < 0.001);
        assert_eq!(tree.frame(right).width, 0.0);
    }

    #[test]
    fn test_conflicts_are_dropped_and_recorded() {
        let mut tree = ViewTree::new();
        let root = tree.add_view("root", None);
        let a = pin(&mut tree, (root, Attribute::Width), None, 50.0);
        let b = pin(&mut tree, (root, Attribute::Width), None, 60.0);
        tree.activate_constraints(&[a, b]);

        tree.layout_if_needed(root);
        assert_eq!(tree.unsatisfied(), &[b]);
        assert!((tree.frame(root).width - 50.0).abs() < 0.001);
    }

    #[test]
    fn test_find_and_subviews() {
        let mut tree = ViewTree::new();
        let root = tree.add_view("root", None);
        let a = tree.add_view("a", Some(root));
        let b = tree.add_view("b", Some(root));
        assert_eq!(tree.find("b"), Some(b));
        assert_eq!(tree.find("zzz"), None);
        assert_eq!(tree.subviews(root).collect::<Vec<_>>(), vec![a, b]);

        tree.remove_from_superview(b);
        assert_eq!(tree.superview(b), None);
        assert_eq!(tree.subviews(root).collect::<Vec<_>>(), vec![a]);
    }

    #[test]
    fn test_flagless_tree_ignores_active_flag() {
        let mut tree = ViewTree::without_active_flag();
        let root = tree.add_view("root", None);
        let c = pin(&mut tree, (root, Attribute::Width), None, 10.0);

        tree.activate_constraints(&[c]);
        assert!(!tree.is_constraint_active(c));
        assert_eq!(tree.effective_constraints().count(), 0);
    }

    #[test]
    fn test_removed_slots_are_reused() {
        let mut tree = ViewTree::without_active_flag();
        let root = tree.add_view("root", None);
        let child = tree.add_view("child", Some(root));
        let a = pin(&mut tree, (child, Attribute::Width), None, 10.0);
        let b = pin(&mut tree, (child, Attribute::Height), None, 20.0);
        tree.install(root, a);

        tree.remove_constraint(a);
        tree.remove_constraint(a);
        assert!(tree.installed_constraints(root).is_empty());
        assert_eq!(tree.constraint_count(), 1);

        let c = pin(&mut tree, (child, Attribute::Width), None, 30.0);
        assert_eq!(c, a);
        assert_ne!(c, b);
        assert_eq!(tree.spec(c).constant, 30.0);
        assert!(!tree.is_installed(root, c));
        assert_eq!(tree.constraint_count(), 2);
    }
}
