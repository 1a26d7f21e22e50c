//! Layout DSL - declarative constraint groups over a native layout engine
//!
//! This library turns layout statements ("edge A equals edge B plus offset")
//! into native constraints, activates and deactivates them as one group, and
//! swaps an old group for a new one atomically. The native engine is any
//! [`LayoutHost`]; [`ViewTree`] is an in-memory host solved with Cassowary.
//!
//! # Example
//!
//! ```rust
//! use layout_dsl::{layout, Frame, ViewTree};
//!
//! let mut tree = ViewTree::new();
//! let root = tree.add_view("root", None);
//! tree.set_frame(root, Frame::new(0.0, 0.0, 320.0, 480.0));
//! let card = tree.add_view("card", Some(root));
//!
//! let group = layout(&mut tree, card, |card| {
//!     let root = card.superview().unwrap();
//!     card.edges().inset(root.edges(), 8.0);
//! })
//! .unwrap();
//!
//! assert!(group.is_active(&tree));
//! assert_eq!(tree.frame(card).to_string(), "x=8.0 y=8.0 w=304.0 h=464.0");
//! ```

pub mod error;
pub mod layout;
pub mod parser;
pub mod scene;

pub use error::ParseError;
pub use layout::{
    clear_constraints, clear_layout, closest_common_ancestor, constrain, layout, replace,
    resolve_statements, Attribute, ConstraintGroup, ConstraintIndex, ConstraintSpec, Declaration,
    Frame, HostGroup, Insets, LayoutError, LayoutHost, LayoutProxy, LayoutSession, Priority,
    Relation, SessionConfig, StorageMode, ViewHierarchy, ViewId, ViewTree,
};
pub use parser::{parse, Document};
pub use scene::{Scene, SceneError, SceneReport};
