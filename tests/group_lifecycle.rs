//! Integration tests for constraint group activation, ordering and replace
//! semantics, run against a host that journals every call it receives.

use layout_dsl::layout::{
    replace, Attribute, ConstraintGroup, ConstraintId, ConstraintSpec, LayoutHost, Priority,
    Relation, StorageMode, ViewHierarchy, ViewId, ViewTree,
};
use pretty_assertions::assert_eq;

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

#[derive(Debug, Clone, PartialEq)]
enum Op {
    Activate(Vec<ConstraintId>),
    Deactivate(Vec<ConstraintId>),
    Install(ViewId, ConstraintId),
    Uninstall(ViewId, ConstraintId),
    Remove(ConstraintId),
    Layout(ViewId),
}

/// Delegates to a [`ViewTree`] and records every mutating call
struct Journal {
    tree: ViewTree,
    ops: Vec<Op>,
}

impl Journal {
    fn new(tree: ViewTree) -> Self {
        Self {
            tree,
            ops: Vec::new(),
        }
    }

    fn relate(&mut self, a: ViewId, b: Option<ViewId>) -> ConstraintId {
        self.create_constraint(ConstraintSpec {
            first: a,
            first_attribute: Attribute::Leading,
            relation: Relation::Equal,
            second: b.map(|b| (b, Attribute::Leading)),
            multiplier: 1.0,
            constant: 0.0,
            priority: Priority::REQUIRED,
        })
    }
}

impl ViewHierarchy for Journal {
    type View = ViewId;

    fn superview(&self, view: ViewId) -> Option<ViewId> {
        self.tree.superview(view)
    }
}

impl LayoutHost for Journal {
    type Constraint = ConstraintId;

    fn supports_active_flag(&self) -> bool {
        self.tree.supports_active_flag()
    }

    fn create_constraint(&mut self, spec: ConstraintSpec<ViewId>) -> ConstraintId {
        self.tree.create_constraint(spec)
    }

    fn remove_constraint(&mut self, constraint: ConstraintId) {
        self.ops.push(Op::Remove(constraint));
        self.tree.remove_constraint(constraint);
    }

    fn first_item(&self, constraint: ConstraintId) -> ViewId {
        self.tree.first_item(constraint)
    }

    fn second_item(&self, constraint: ConstraintId) -> Option<ViewId> {
        self.tree.second_item(constraint)
    }

    fn activate_constraints(&mut self, constraints: &[ConstraintId]) {
        self.ops.push(Op::Activate(constraints.to_vec()));
        self.tree.activate_constraints(constraints);
    }

    fn deactivate_constraints(&mut self, constraints: &[ConstraintId]) {
        self.ops.push(Op::Deactivate(constraints.to_vec()));
        self.tree.deactivate_constraints(constraints);
    }

    fn is_constraint_active(&self, constraint: ConstraintId) -> bool {
        self.tree.is_constraint_active(constraint)
    }

    fn install(&mut self, view: ViewId, constraint: ConstraintId) {
        self.ops.push(Op::Install(view, constraint));
        self.tree.install(view, constraint);
    }

    fn uninstall(&mut self, view: ViewId, constraint: ConstraintId) {
        self.ops.push(Op::Uninstall(view, constraint));
        self.tree.uninstall(view, constraint);
    }

    fn is_installed(&self, view: ViewId, constraint: ConstraintId) -> bool {
        self.tree.is_installed(view, constraint)
    }

    fn layout_if_needed(&mut self, view: ViewId) {
        self.ops.push(Op::Layout(view));
        self.tree.layout_if_needed(view);
    }
}

fn tree_for(mode: StorageMode) -> ViewTree {
    match mode {
        StorageMode::Direct => ViewTree::new(),
        StorageMode::Tracked => ViewTree::without_active_flag(),
    }
}

/// p -> (a, b -> c)
fn family(tree: ViewTree) -> (Journal, [ViewId; 4]) {
    let mut tree = tree;
    let p = tree.add_view("p", None);
    let a = tree.add_view("a", Some(p));
    let b = tree.add_view("b", Some(p));
    let c = tree.add_view("c", Some(b));
    (Journal::new(tree), [p, a, b, c])
}

#[test]
fn test_attachment_point_owns_installation() {
    init_logging();
    let (mut host, [p, a, b, _]) = family(ViewTree::without_active_flag());
    let handle = host.relate(a, Some(b));

    let mut group = ConstraintGroup::pinned(&host, StorageMode::Tracked).unwrap();
    group.append(&host, handle).unwrap();
    assert_eq!(group.attachment_point(0), Some(p));

    group.activate(&mut host, false);
    assert!(host.tree.installed_constraints(p).contains(&handle));
    assert!(host.tree.installed_constraints(a).is_empty());
}

#[test]
fn test_iteration_follows_append_order() {
    for mode in [StorageMode::Direct, StorageMode::Tracked] {
        let (mut host, [p, a, b, c]) = family(tree_for(mode));
        let handles = [
            host.relate(c, Some(a)),
            host.relate(b, None),
            host.relate(p, Some(c)),
            host.relate(a, Some(b)),
        ];

        let mut group = ConstraintGroup::pinned(&host, mode).unwrap();
        group.append(&host, handles[0]).unwrap();
        group.extend(&host, handles[1..3].iter().copied()).unwrap();
        group.append(&host, handles[3]).unwrap();

        assert_eq!(group.iter().collect::<Vec<_>>(), handles.to_vec(), "{:?}", mode);
        assert_eq!((&group).into_iter().len(), 4);
    }
}

#[test]
fn test_double_activation_installs_once() {
    let (mut host, [p, a, _, c]) = family(ViewTree::without_active_flag());
    let handles = [host.relate(a, Some(c)), host.relate(c, None)];
    let mut group = ConstraintGroup::pinned(&host, StorageMode::Tracked).unwrap();
    group.extend(&host, handles).unwrap();

    group.activate(&mut host, false);
    group.activate(&mut host, false);
    assert!(group.is_active(&host));
    assert_eq!(host.tree.installed_constraints(p), &[handles[0]]);
    assert_eq!(host.tree.installed_constraints(c), &[handles[1]]);

    host.ops.clear();
    group.deactivate(&mut host, false);
    group.deactivate(&mut host, false);
    assert!(!group.is_active(&host));
    assert_eq!(
        host.ops,
        vec![Op::Uninstall(p, handles[0]), Op::Uninstall(c, handles[1])]
    );
}

#[test]
fn test_direct_activation_reasserts_flag() {
    let (mut host, [_, a, b, _]) = family(ViewTree::new());
    let handle = host.relate(a, Some(b));
    let mut group = ConstraintGroup::pinned(&host, StorageMode::Direct).unwrap();
    group.append(&host, handle).unwrap();

    group.activate(&mut host, false);
    // switched off behind the group's back
    host.tree.deactivate_constraints(&[handle]);
    assert!(!group.is_active(&host));

    group.activate(&mut host, false);
    assert!(group.is_active(&host));
    assert_eq!(
        host.ops,
        vec![Op::Activate(vec![handle]), Op::Activate(vec![handle])]
    );
}

#[test]
fn test_refresh_runs_on_distinct_ancestors() {
    let (mut host, [p, a, b, c]) = family(ViewTree::new());
    let handles = [
        host.relate(a, Some(b)),
        host.relate(c, Some(a)),
        host.relate(c, Some(b)),
    ];
    let mut group = ConstraintGroup::pinned(&host, StorageMode::Direct).unwrap();
    group.extend(&host, handles).unwrap();

    group.activate(&mut host, true);
    assert_eq!(
        host.ops,
        vec![Op::Activate(handles.to_vec()), Op::Layout(p), Op::Layout(b)]
    );
}

#[test]
fn test_replace_toggles_before_refreshing() {
    for mode in [StorageMode::Direct, StorageMode::Tracked] {
        let (mut host, [p, a, b, c]) = family(tree_for(mode));
        let old_handle = host.relate(a, Some(b));
        let new_handle = host.relate(c, None);

        let mut old = ConstraintGroup::pinned(&host, mode).unwrap();
        old.append(&host, old_handle).unwrap();
        let mut new = ConstraintGroup::pinned(&host, mode).unwrap();
        new.append(&host, new_handle).unwrap();

        old.activate(&mut host, false);
        host.ops.clear();

        replace(&mut host, &old, &new, true);

        assert!(!old.is_active(&host), "{:?}", mode);
        assert!(new.is_active(&host), "{:?}", mode);

        let first_layout = host
            .ops
            .iter()
            .position(|op| matches!(op, Op::Layout(_)))
            .unwrap();
        assert!(host.ops[first_layout..]
            .iter()
            .all(|op| matches!(op, Op::Layout(_))));
        assert_eq!(&host.ops[first_layout..], &[Op::Layout(p), Op::Layout(c)]);
    }
}

#[test]
fn test_empty_groups() {
    let (mut host, _) = family(ViewTree::new());
    let group: ConstraintGroup<ViewId, ConstraintId> = ConstraintGroup::new(&host).unwrap();
    assert!(group.is_empty());
    assert!(group.is_active(&host));
    group.deactivate(&mut host, true);
    // an empty group is still vacuously active, and has nothing to refresh
    assert!(group.is_active(&host));
    assert!(host.tree.refresh_log().is_empty());
}

#[test]
fn test_group_must_match_host_mode() {
    let (host, _) = family(ViewTree::without_active_flag());
    let err = ConstraintGroup::<ViewId, ConstraintId>::pinned(&host, StorageMode::Direct).unwrap_err();
    assert_eq!(
        err.to_string(),
        "storage mode 'direct' does not match the host, which supports 'tracked'"
    );
}

#[test]
fn test_release_deactivates_before_removing() {
    let (mut host, [p, a, b, _]) = family(ViewTree::without_active_flag());
    let handles = [host.relate(a, Some(b)), host.relate(b, None)];
    let mut group = ConstraintGroup::pinned(&host, StorageMode::Tracked).unwrap();
    group.extend(&host, handles).unwrap();
    group.activate(&mut host, false);
    host.ops.clear();

    group.release(&mut host);
    assert_eq!(
        host.ops,
        vec![
            Op::Uninstall(p, handles[0]),
            Op::Uninstall(b, handles[1]),
            Op::Remove(handles[0]),
            Op::Remove(handles[1]),
        ]
    );
    assert_eq!(host.tree.constraint_count(), 0);
}
