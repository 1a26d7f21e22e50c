//! Parent-pointer view hierarchy queries
//!
//! The hierarchy is owned by the host; this module only walks it. A
//! well-formed hierarchy is a forest without cycles, so every ancestor chain
//! ends at a root.

use std::collections::HashSet;
use std::fmt::Debug;
use std::hash::Hash;

/// A tree of views that can be walked upwards
pub trait ViewHierarchy {
    /// Opaque, identity-compared view handle
    type View: Copy + Eq + Hash + Debug;

    /// Immediate parent of `view`, or `None` for a root
    fn superview(&self, view: Self::View) -> Option<Self::View>;
}

/// Lazy walk from a view up to its root, starting with the view itself
///
/// Cloning restarts nothing: a clone continues from the same position, while
/// calling [`ancestors`] again starts a fresh walk.
pub struct Ancestors<'a, H: ViewHierarchy + ?Sized> {
    hierarchy: &'a H,
    next: Option<H::View>,
}

impl<H: ViewHierarchy + ?Sized> Clone for Ancestors<'_, H> {
    fn clone(&self) -> Self {
        Self {
            hierarchy: self.hierarchy,
            next: self.next,
        }
    }
}

impl<H: ViewHierarchy + ?Sized> Iterator for Ancestors<'_, H> {
    type Item = H::View;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next?;
        self.next = self.hierarchy.superview(current);
        Some(current)
    }
}

/// Walk `view` and all of its ancestors, nearest first
pub fn ancestors<H: ViewHierarchy + ?Sized>(hierarchy: &H, view: H::View) -> Ancestors<'_, H> {
    Ancestors {
        hierarchy,
        next: Some(view),
    }
}

/// Find the closest view that is an ancestor of (or equal to) both inputs.
///
/// A missing input is neutral: the other input is returned unchanged. `None`
/// with two present inputs means the views live in disconnected trees.
pub fn closest_common_ancestor<H: ViewHierarchy + ?Sized>(
    hierarchy: &H,
    a: Option<H::View>,
    b: Option<H::View>,
) -> Option<H::View> {
    let (a, b) = match (a, b) {
        (None, other) | (other, None) => return other,
        (Some(a), Some(b)) => (a, b),
    };

    if a == b {
        return Some(a);
    }

    let (a_super, b_super) = (hierarchy.superview(a), hierarchy.superview(b));

    if b_super == Some(a) {
        return Some(a);
    }
    if a_super == Some(b) {
        return Some(b);
    }
    if a_super.is_some() && a_super == b_super {
        return a_super;
    }

    let chain_of_b: HashSet<H::View> = ancestors(hierarchy, b).collect();
    ancestors(hierarchy, a).find(|ancestor| chain_of_b.contains(ancestor))
}

#[cfg(test)]
mod tests {
    use super::*;

    /// parents[i] is the parent of view i
    struct Parents(Vec<Option<usize>>);

    impl ViewHierarchy for Parents {
        type View = usize;

        fn superview(&self, view: usize) -> Option<usize> {
            self.0.get(view).copied().flatten()
        }
    }

    //        0         5
    //      /   \       |
    //     1     2      6
    //    / \     \
    //   3   4     7
    fn forest() -> Parents {
        Parents(vec![
            None,
            Some(0),
            Some(0),
            Some(1),
            Some(1),
            None,
            Some(5),
            Some(2),
        ])
    }

    #[test]
    fn test_ancestors_includes_self_and_ends_at_root() {
        let tree = forest();
        let chain: Vec<_> = ancestors(&tree, 3).collect();
        assert_eq!(chain, vec![3, 1, 0]);
    }

    #[test]
    fn test_ancestors_restartable() {
        let tree = forest();
        let walk = ancestors(&tree, 4);
        assert_eq!(walk.clone().count(), 3);
        assert_eq!(walk.last(), Some(0));
    }

    #[test]
    fn test_absent_inputs_are_neutral() {
        let tree = forest();
        assert_eq!(closest_common_ancestor(&tree, Some(3), None), Some(3));
        assert_eq!(closest_common_ancestor(&tree, None, Some(3)), Some(3));
        assert_eq!(closest_common_ancestor(&tree, None, None), None);
    }

    #[test]
    fn test_same_view() {
        let tree = forest();
        assert_eq!(closest_common_ancestor(&tree, Some(4), Some(4)), Some(4));
    }

    #[test]
    fn test_parent_and_child() {
        let tree = forest();
        assert_eq!(closest_common_ancestor(&tree, Some(1), Some(3)), Some(1));
        assert_eq!(closest_common_ancestor(&tree, Some(3), Some(1)), Some(1));
    }

    #[test]
    fn test_siblings() {
        let tree = forest();
        assert_eq!(closest_common_ancestor(&tree, Some(3), Some(4)), Some(1));
    }

    #[test]
    fn test_distant_relatives() {
        let tree = forest();
        assert_eq!(closest_common_ancestor(&tree, Some(3), Some(7)), Some(0));
        assert_eq!(closest_common_ancestor(&tree, Some(0), Some(7)), Some(0));
    }

    #[test]
    fn test_disconnected_trees() {
        let tree = forest();
        assert_eq!(closest_common_ancestor(&tree, Some(3), Some(6)), None);
        // two unrelated roots share no parent even though both parents are None
        assert_eq!(closest_common_ancestor(&tree, Some(0), Some(5)), None);
    }
}
