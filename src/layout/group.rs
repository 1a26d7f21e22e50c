//! Constraint groups: the unit of activation
//!
//! A group remembers every constraint one declaration produced and toggles
//! them together. How it remembers them depends on the process-wide
//! [`StorageMode`]; the public behaviour is the same in both modes.

use std::fmt::Debug;
use std::hash::Hash;

use indexmap::IndexSet;

use super::error::LayoutError;
use super::hierarchy::closest_common_ancestor;
use super::host::LayoutHost;
use super::storage::StorageMode;

/// A constraint together with the view that owns its installation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConstraintRecord<V, C> {
    /// Attachment point: closest common ancestor of the related views
    pub view: V,
    pub constraint: C,
}

#[derive(Debug, Clone, PartialEq)]
enum Storage<V, C> {
    Direct(Vec<C>),
    Tracked(Vec<ConstraintRecord<V, C>>),
}

/// An ordered set of constraints activated and deactivated as one
#[derive(Debug, Clone, PartialEq)]
pub struct ConstraintGroup<V, C> {
    storage: Storage<V, C>,
}

/// Group type for a particular host
pub type HostGroup<H> =
    ConstraintGroup<<H as super::hierarchy::ViewHierarchy>::View, <H as LayoutHost>::Constraint>;

impl<V, C> ConstraintGroup<V, C>
where
    V: Copy + Eq + Hash + Debug,
    C: Copy + Eq + Hash + Debug,
{
    /// Create an empty group in the process-wide storage mode.
    ///
    /// Fails with [`LayoutError::UnsupportedMode`] when the process already
    /// selected a mode this host cannot honour.
    pub fn new<H>(host: &H) -> Result<Self, LayoutError>
    where
        H: LayoutHost<View = V, Constraint = C> + ?Sized,
    {
        StorageMode::resolve(host, None).map(Self::with_mode)
    }

    /// Create an empty group in an explicit storage mode, which must be the
    /// one `host` supports
    pub fn pinned<H>(host: &H, mode: StorageMode) -> Result<Self, LayoutError>
    where
        H: LayoutHost<View = V, Constraint = C> + ?Sized,
    {
        StorageMode::resolve(host, Some(mode)).map(Self::with_mode)
    }

    pub(crate) fn with_mode(mode: StorageMode) -> Self {
        let storage = match mode {
            StorageMode::Direct => Storage::Direct(Vec::new()),
            StorageMode::Tracked => Storage::Tracked(Vec::new()),
        };
        Self { storage }
    }

    pub fn mode(&self) -> StorageMode {
        match self.storage {
            Storage::Direct(_) => StorageMode::Direct,
            Storage::Tracked(_) => StorageMode::Tracked,
        }
    }

    pub fn len(&self) -> usize {
        match &self.storage {
            Storage::Direct(constraints) => constraints.len(),
            Storage::Tracked(records) => records.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Constraint at `index`, in insertion order
    pub fn get(&self, index: usize) -> Option<C> {
        match &self.storage {
            Storage::Direct(constraints) => constraints.get(index).copied(),
            Storage::Tracked(records) => records.get(index).map(|r| r.constraint),
        }
    }

    /// Constraints in insertion order, whatever the storage mode
    pub fn iter(&self) -> Constraints<'_, V, C> {
        let inner = match &self.storage {
            Storage::Direct(constraints) => ConstraintsInner::Direct(constraints.iter()),
            Storage::Tracked(records) => ConstraintsInner::Tracked(records.iter()),
        };
        Constraints { inner }
    }

    /// Attachment records; `None` in direct mode, which keeps no attachment points
    pub fn records(&self) -> Option<&[ConstraintRecord<V, C>]> {
        match &self.storage {
            Storage::Direct(_) => None,
            Storage::Tracked(records) => Some(records.as_slice()),
        }
    }

    /// Attachment point of the constraint at `index` (tracked mode only)
    pub fn attachment_point(&self, index: usize) -> Option<V> {
        self.records()
            .and_then(|records| records.get(index))
            .map(|r| r.view)
    }

    pub fn reserve(&mut self, additional: usize) {
        match &mut self.storage {
            Storage::Direct(constraints) => constraints.reserve(additional),
            Storage::Tracked(records) => records.reserve(additional),
        }
    }

    /// Add a constraint to the group.
    ///
    /// In tracked mode the attachment point is the closest common ancestor of
    /// the constraint's two views; views in disconnected trees fail with
    /// [`LayoutError::NoCommonAncestor`].
    pub fn append<H>(&mut self, host: &H, constraint: C) -> Result<(), LayoutError>
    where
        H: LayoutHost<View = V, Constraint = C> + ?Sized,
    {
        match &mut self.storage {
            Storage::Direct(constraints) => constraints.push(constraint),
            Storage::Tracked(records) => {
                let first = host.first_item(constraint);
                let view = match host.second_item(constraint) {
                    Some(second) => closest_common_ancestor(host, Some(first), Some(second))
                        .ok_or_else(|| LayoutError::no_common_ancestor(first, second))?,
                    None => first,
                };
                records.push(ConstraintRecord { view, constraint });
            }
        }
        Ok(())
    }

    /// Append every constraint in order. A failure leaves the earlier ones in
    /// the group; there is no rollback.
    pub fn extend<H, I>(&mut self, host: &H, constraints: I) -> Result<(), LayoutError>
    where
        H: LayoutHost<View = V, Constraint = C> + ?Sized,
        I: IntoIterator<Item = C>,
    {
        let constraints = constraints.into_iter();
        self.reserve(constraints.size_hint().0);
        for constraint in constraints {
            self.append(host, constraint)?;
        }
        Ok(())
    }

    /// True if every member is live in the host. Empty groups are active.
    pub fn is_active<H>(&self, host: &H) -> bool
    where
        H: LayoutHost<View = V, Constraint = C> + ?Sized,
    {
        match &self.storage {
            Storage::Direct(constraints) => {
                constraints.iter().all(|&c| host.is_constraint_active(c))
            }
            Storage::Tracked(records) => records
                .iter()
                .all(|r| host.is_installed(r.view, r.constraint)),
        }
    }

    pub fn activate<H>(&self, host: &mut H, perform_layout: bool)
    where
        H: LayoutHost<View = V, Constraint = C> + ?Sized,
    {
        self.set_active(host, true);
        if perform_layout {
            let targets = self.refresh_targets(host);
            refresh(host, targets);
        }
    }

    pub fn deactivate<H>(&self, host: &mut H, perform_layout: bool)
    where
        H: LayoutHost<View = V, Constraint = C> + ?Sized,
    {
        self.set_active(host, false);
        if perform_layout {
            let targets = self.refresh_targets(host);
            refresh(host, targets);
        }
    }

    /// Toggle every member without refreshing
    pub(crate) fn set_active<H>(&self, host: &mut H, active: bool)
    where
        H: LayoutHost<View = V, Constraint = C> + ?Sized,
    {
        log::debug!(
            "{} {} constraint(s) in {} mode",
            if active { "activating" } else { "deactivating" },
            self.len(),
            self.mode().name()
        );
        match &self.storage {
            Storage::Direct(constraints) if active => host.activate_constraints(constraints),
            Storage::Direct(constraints) => host.deactivate_constraints(constraints),
            Storage::Tracked(records) => {
                for record in records {
                    let installed = host.is_installed(record.view, record.constraint);
                    if active && !installed {
                        host.install(record.view, record.constraint);
                    } else if !active && installed {
                        host.uninstall(record.view, record.constraint);
                    }
                }
            }
        }
    }

    /// Deactivate the group and hand its constraints back to the host.
    /// Copies of the group must not be used afterwards.
    pub fn release<H>(self, host: &mut H)
    where
        H: LayoutHost<View = V, Constraint = C> + ?Sized,
    {
        self.set_active(host, false);
        log::debug!("releasing {} constraint(s)", self.len());
        for constraint in self.iter() {
            host.remove_constraint(constraint);
        }
    }

    /// Views whose layout a refresh of this group must resolve, deduplicated
    /// in first-seen order
    pub(crate) fn refresh_targets<H>(&self, host: &H) -> IndexSet<V>
    where
        H: LayoutHost<View = V, Constraint = C> + ?Sized,
    {
        match &self.storage {
            Storage::Direct(constraints) => constraints
                .iter()
                .filter_map(|&c| {
                    closest_common_ancestor(host, Some(host.first_item(c)), host.second_item(c))
                })
                .collect(),
            Storage::Tracked(records) => records.iter().map(|r| r.view).collect(),
        }
    }
}

/// Run `layout_if_needed` on each view in order
pub(crate) fn refresh<H, I>(host: &mut H, views: I)
where
    H: LayoutHost + ?Sized,
    I: IntoIterator<Item = H::View>,
{
    for view in views {
        log::trace!("layout_if_needed({:?})", view);
        host.layout_if_needed(view);
    }
}

/// Iterator over the constraints of a group
pub struct Constraints<'a, V, C> {
    inner: ConstraintsInner<'a, V, C>,
}

enum ConstraintsInner<'a, V, C> {
    Direct(std::slice::Iter<'a, C>),
    Tracked(std::slice::Iter<'a, ConstraintRecord<V, C>>),
}

impl<V, C: Copy> Iterator for Constraints<'_, V, C> {
    type Item = C;

    fn next(&mut self) -> Option<C> {
        match &mut self.inner {
            ConstraintsInner::Direct(iter) => iter.next().copied(),
            ConstraintsInner::Tracked(iter) => iter.next().map(|r| r.constraint),
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        match &self.inner {
            ConstraintsInner::Direct(iter) => iter.size_hint(),
            ConstraintsInner::Tracked(iter) => iter.size_hint(),
        }
    }
}

impl<V, C: Copy> ExactSizeIterator for Constraints<'_, V, C> {}

impl<'a, V, C> IntoIterator for &'a ConstraintGroup<V, C>
where
    V: Copy + Eq + Hash + Debug,
    C: Copy + Eq + Hash + Debug,
{
    type Item = C;
    type IntoIter = Constraints<'a, V, C>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::tree::{ConstraintId, ViewId, ViewTree};
    use crate::layout::types::{Attribute, ConstraintSpec, Priority, Relation};

    fn relate(tree: &mut ViewTree, a: ViewId, b: Option<ViewId>) -> ConstraintId {
        tree.create_constraint(ConstraintSpec {
            first: a,
            first_attribute: Attribute::Top,
            relation: Relation::Equal,
            second: b.map(|b| (b, Attribute::Top)),
            multiplier: 1.0,
            constant: 0.0,
            priority: Priority::REQUIRED,
        })
    }

    /// root -> (left -> leaf), right
    fn family(tree: &mut ViewTree) -> (ViewId, ViewId, ViewId, ViewId) {
        let root = tree.add_view("root", None);
        let left = tree.add_view("left", Some(root));
        let right = tree.add_view("right", Some(root));
        let leaf = tree.add_view("leaf", Some(left));
        (root, left, right, leaf)
    }

    #[test]
    fn test_tracked_append_uses_closest_common_ancestor() {
        let mut tree = ViewTree::without_active_flag();
        let (root, left, right, leaf) = family(&mut tree);
        let across = relate(&mut tree, leaf, Some(right));
        let inside = relate(&mut tree, leaf, Some(left));
        let single = relate(&mut tree, leaf, None);

        let mut group = ConstraintGroup::with_mode(StorageMode::Tracked);
        group.extend(&tree, [across, inside, single]).unwrap();

        assert_eq!(group.attachment_point(0), Some(root));
        assert_eq!(group.attachment_point(1), Some(left));
        assert_eq!(group.attachment_point(2), Some(leaf));
    }

    #[test]
    fn test_tracked_append_fails_across_trees() {
        let mut tree = ViewTree::without_active_flag();
        let a = tree.add_view("a", None);
        let b = tree.add_view("b", None);
        let c = relate(&mut tree, a, Some(b));

        let mut group = ConstraintGroup::with_mode(StorageMode::Tracked);
        let err = group.append(&tree, c).unwrap_err();
        assert!(err.is_structural());
        assert!(group.is_empty());
    }

    #[test]
    fn test_extend_keeps_earlier_members_on_failure() {
        let mut tree = ViewTree::without_active_flag();
        let (_, left, right, _) = family(&mut tree);
        let stranger = tree.add_view("stranger", None);
        let ok = relate(&mut tree, left, Some(right));
        let bad = relate(&mut tree, left, Some(stranger));
        let never = relate(&mut tree, right, None);

        let mut group = ConstraintGroup::with_mode(StorageMode::Tracked);
        assert!(group.extend(&tree, [ok, bad, never]).is_err());
        assert_eq!(group.iter().collect::<Vec<_>>(), vec![ok]);
    }

    #[test]
    fn test_direct_mode_has_no_records() {
        let mut tree = ViewTree::new();
        let (_, left, right, _) = family(&mut tree);
        let c = relate(&mut tree, left, Some(right));

        let mut group = ConstraintGroup::with_mode(StorageMode::Direct);
        group.append(&tree, c).unwrap();
        assert!(group.records().is_none());
        assert_eq!(group.attachment_point(0), None);
        assert_eq!(group.get(0), Some(c));
    }

    fn tree_for(mode: StorageMode) -> ViewTree {
        match mode {
            StorageMode::Direct => ViewTree::new(),
            StorageMode::Tracked => ViewTree::without_active_flag(),
        }
    }

    #[test]
    fn test_activation_toggles_both_modes() {
        for mode in [StorageMode::Direct, StorageMode::Tracked] {
            let mut tree = tree_for(mode);
            let (_, left, right, leaf) = family(&mut tree);
            let a = relate(&mut tree, left, Some(right));
            let b = relate(&mut tree, leaf, None);

            let mut group = ConstraintGroup::with_mode(mode);
            group.extend(&tree, [a, b]).unwrap();
            assert!(!group.is_active(&tree), "{:?}", mode);

            group.activate(&mut tree, false);
            assert!(group.is_active(&tree), "{:?}", mode);

            group.deactivate(&mut tree, false);
            assert!(!group.is_active(&tree), "{:?}", mode);
        }
    }

    #[test]
    fn test_empty_group_is_active() {
        let tree = ViewTree::without_active_flag();
        let group: ConstraintGroup<ViewId, ConstraintId> =
            ConstraintGroup::with_mode(StorageMode::Tracked);
        assert!(group.is_active(&tree));
    }

    #[test]
    fn test_tracked_activation_is_idempotent() {
        let mut tree = ViewTree::without_active_flag();
        let (root, _, right, leaf) = family(&mut tree);
        let c = relate(&mut tree, leaf, Some(right));

        let mut group = ConstraintGroup::with_mode(StorageMode::Tracked);
        group.append(&tree, c).unwrap();
        group.activate(&mut tree, false);
        group.activate(&mut tree, false);

        assert_eq!(tree.installed_constraints(root), &[c]);
        group.deactivate(&mut tree, false);
        group.deactivate(&mut tree, false);
        assert!(tree.installed_constraints(root).is_empty());
        assert!(!group.is_active(&tree));
    }

    #[test]
    fn test_refresh_targets_are_deduplicated() {
        for mode in [StorageMode::Direct, StorageMode::Tracked] {
            let mut tree = tree_for(mode);
            let (root, left, right, leaf) = family(&mut tree);
            let a = relate(&mut tree, left, Some(right));
            let b = relate(&mut tree, leaf, Some(right));
            let c = relate(&mut tree, leaf, None);

            let mut group = ConstraintGroup::with_mode(mode);
            group.extend(&tree, [a, b, c]).unwrap();
            group.activate(&mut tree, true);

            assert_eq!(tree.refresh_log(), &[root, leaf], "{:?}", mode);
        }
    }

    #[test]
    fn test_pinned_group_rejects_unsupported_mode() {
        let tree = ViewTree::without_active_flag();
        let err = ConstraintGroup::pinned(&tree, StorageMode::Direct).unwrap_err();
        assert_eq!(
            err,
            LayoutError::unsupported_mode(StorageMode::Direct, StorageMode::Tracked)
        );
        let group = ConstraintGroup::pinned(&tree, StorageMode::Tracked).unwrap();
        assert_eq!(group.mode(), StorageMode::Tracked);
    }

    #[test]
    fn test_release_returns_constraints_to_host() {
        for mode in [StorageMode::Direct, StorageMode::Tracked] {
            let mut tree = tree_for(mode);
            let (_, left, right, leaf) = family(&mut tree);
            let a = relate(&mut tree, left, Some(right));
            let b = relate(&mut tree, leaf, None);

            let mut group = ConstraintGroup::with_mode(mode);
            group.extend(&tree, [a, b]).unwrap();
            group.activate(&mut tree, false);
            assert_eq!(tree.constraint_count(), 2);

            group.release(&mut tree);
            assert_eq!(tree.constraint_count(), 0, "{:?}", mode);
            assert_eq!(tree.effective_constraints().count(), 0, "{:?}", mode);
        }
    }
}
