//! Constraint groups, layout sessions and the hosts they drive
//!
//! This module owns the engine proper (closest-common-ancestor lookup,
//! constraint groups, sessions) and turns parsed statements into
//! declarations that a session can replay against its proxies.

pub mod config;
pub mod error;
pub mod group;
pub mod hierarchy;
pub mod host;
pub mod proxy;
pub mod session;
pub mod solver;
pub mod storage;
pub mod tree;
pub mod types;

pub use config::SessionConfig;
pub use error::LayoutError;
pub use group::{ConstraintGroup, ConstraintRecord, Constraints, HostGroup};
pub use hierarchy::{ancestors, closest_common_ancestor, Ancestors, ViewHierarchy};
pub use host::LayoutHost;
pub use proxy::{
    ConstraintIndex, Context, Dimension, DimensionExpression, Edge, EdgeExpression, Edges,
    LayoutProxy, Point, Size, Term,
};
pub use session::{clear_constraints, clear_layout, constrain, layout, replace, LayoutSession};
pub use storage::StorageMode;
pub use tree::{ConstraintId, ViewId, ViewTree};
pub use types::*;

use indexmap::IndexMap;

use crate::parser::ast::{Document, Expression, Property, PropertyRef, Statement, ViewPath};
use crate::parser::Spanned;

/// A view named in a statement: the view itself or one of its ancestors
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewRef {
    pub name: String,
    pub superviews: usize,
}

impl ViewRef {
    /// Proxy for the referenced view, following `superview` hops
    pub fn proxy<'c, H>(
        &self,
        proxies: &IndexMap<String, LayoutProxy<'c, H>>,
    ) -> Option<LayoutProxy<'c, H>>
    where
        H: LayoutHost + ?Sized,
    {
        let mut proxy = *proxies.get(&self.name)?;
        for _ in 0..self.superviews {
            proxy = proxy.superview()?;
        }
        Some(proxy)
    }

    fn bind<'c, H>(
        &self,
        proxies: &IndexMap<String, LayoutProxy<'c, H>>,
    ) -> Result<LayoutProxy<'c, H>, LayoutError>
    where
        H: LayoutHost + ?Sized,
    {
        self.proxy(proxies).ok_or_else(|| {
            let mut name = self.name.clone();
            for _ in 0..self.superviews {
                name.push_str(".superview");
            }
            LayoutError::UnboundView(name)
        })
    }
}

/// A validated statement, ready to be replayed inside a session
#[derive(Debug, Clone, PartialEq)]
pub enum Declaration {
    /// One attribute against another attribute of the same axis, or a dimension against a constant
    Attribute {
        view: ViewRef,
        attribute: Attribute,
        relation: Relation,
        target: Option<(ViewRef, Attribute)>,
        multiplier: f64,
        constant: f64,
        priority: Priority,
    },
    Size {
        view: ViewRef,
        relation: Relation,
        target: ViewRef,
        multiplier: f64,
        constant: f64,
        priority: Priority,
    },
    Center {
        view: ViewRef,
        relation: Relation,
        target: ViewRef,
        offset: f64,
        priority: Priority,
    },
    /// `edges = target.edges inset n`; either side may use the margin edges
    Edges {
        view: ViewRef,
        margins: bool,
        target: ViewRef,
        target_margins: bool,
        inset: f64,
        priority: Priority,
    },
}

impl Declaration {
    /// Record the constraints of this declaration in the proxies' context.
    ///
    /// Fails with [`LayoutError::UnboundView`] when a referenced view has no
    /// proxy, in which case nothing is recorded.
    pub fn declare<H>(
        &self,
        proxies: &IndexMap<String, LayoutProxy<'_, H>>,
    ) -> Result<Vec<ConstraintIndex>, LayoutError>
    where
        H: LayoutHost + ?Sized,
    {
        let declared = match self {
            Declaration::Attribute {
                view,
                attribute,
                relation,
                target,
                multiplier,
                constant,
                priority,
            } => {
                let lhs = view.bind(proxies)?;
                let rhs = match target {
                    Some((target, attribute)) => Some(target.bind(proxies)?.attribute(*attribute)),
                    None => None,
                };
                match (lhs.attribute(*attribute), rhs) {
                    (Term::Edge(edge), Some(Term::Edge(other))) => {
                        vec![edge.relate(
                            *relation,
                            (other * *multiplier + *constant).at_priority(*priority),
                        )]
                    }
                    (Term::Dimension(dimension), Some(Term::Dimension(other))) => {
                        vec![dimension.relate(
                            *relation,
                            (other * *multiplier + *constant).at_priority(*priority),
                        )]
                    }
                    (Term::Dimension(dimension), None) => vec![dimension.relate(
                        *relation,
                        DimensionExpression::constant(*constant).at_priority(*priority),
                    )],
                    _ => Vec::new(),
                }
            }
            Declaration::Size {
                view,
                relation,
                target,
                multiplier,
                constant,
                priority,
            } => {
                let (lhs, rhs) = (view.bind(proxies)?, target.bind(proxies)?);
                let (size, other) = (lhs.size(), rhs.size());
                vec![
                    size.width.relate(
                        *relation,
                        (other.width * *multiplier + *constant).at_priority(*priority),
                    ),
                    size.height.relate(
                        *relation,
                        (other.height * *multiplier + *constant).at_priority(*priority),
                    ),
                ]
            }
            Declaration::Center {
                view,
                relation,
                target,
                offset,
                priority,
            } => {
                let (lhs, rhs) = (view.bind(proxies)?, target.bind(proxies)?);
                let (center, other) = (lhs.center(), rhs.center());
                vec![
                    center
                        .x
                        .relate(*relation, (other.x + *offset).at_priority(*priority)),
                    center
                        .y
                        .relate(*relation, (other.y + *offset).at_priority(*priority)),
                ]
            }
            Declaration::Edges {
                view,
                margins,
                target,
                target_margins,
                inset,
                priority,
            } => {
                let (lhs, rhs) = (view.bind(proxies)?, target.bind(proxies)?);
                let edges = if *margins {
                    lhs.edges_within_margins()
                } else {
                    lhs.edges()
                };
                let other = if *target_margins {
                    rhs.edges_within_margins()
                } else {
                    rhs.edges()
                };
                if priority.is_required() {
                    return Ok(edges.inset(other, *inset).to_vec());
                }
                vec![
                    edges.top.equal((other.top + *inset).at_priority(*priority)),
                    edges
                        .leading
                        .equal((other.leading + *inset).at_priority(*priority)),
                    edges
                        .bottom
                        .equal((other.bottom - *inset).at_priority(*priority)),
                    edges
                        .trailing
                        .equal((other.trailing - *inset).at_priority(*priority)),
                ]
            }
        };
        Ok(declared)
    }
}

/// Validate a parsed document against the views of a host and turn every
/// statement into a [`Declaration`].
///
/// Names are looked up in `views`; undefined names come back with
/// suggestions, and `superview` hops must exist in `host`.
pub fn resolve_statements<H>(
    host: &H,
    views: &IndexMap<String, H::View>,
    doc: &Document,
) -> Result<Vec<Declaration>, LayoutError>
where
    H: ViewHierarchy + ?Sized,
{
    doc.statements
        .iter()
        .map(|stmt| resolve_statement(host, views, stmt))
        .collect()
}

fn resolve_statement<H>(
    host: &H,
    views: &IndexMap<String, H::View>,
    stmt: &Spanned<Statement>,
) -> Result<Declaration, LayoutError>
where
    H: ViewHierarchy + ?Sized,
{
    let Statement {
        left,
        relation,
        right,
        priority,
    } = &stmt.node;
    let view = resolve_path(host, views, &left.path)?;
    let relation = relation.node;
    let priority = priority
        .as_ref()
        .map(|p| Priority::new(p.node as f32))
        .unwrap_or_default();
    let property = left.property.node;

    let invalid = |reason: String| LayoutError::invalid(reason, stmt.span.clone());

    match (property, &right.node) {
        (Property::Attribute(attribute), Expression::Constant(constant)) => {
            if !attribute.is_dimension() {
                return Err(invalid(format!(
                    "'{}' is an edge and must be related to another edge",
                    attribute
                )));
            }
            Ok(Declaration::Attribute {
                view,
                attribute,
                relation,
                target: None,
                multiplier: 1.0,
                constant: *constant,
                priority,
            })
        }
        (
            Property::Attribute(attribute),
            Expression::Property {
                target,
                multiplier,
                constant,
            },
        ) => {
            let Property::Attribute(other) = target.property.node else {
                return Err(invalid(format!(
                    "cannot relate '{}' to composite '{}'",
                    attribute,
                    target.property.node.name()
                )));
            };
            if attribute.axis() != other.axis() {
                return Err(invalid(format!(
                    "cannot relate '{}' to '{}' across axes",
                    attribute, other
                )));
            }
            let target = resolve_path(host, views, &target.path)?;
            Ok(Declaration::Attribute {
                view,
                attribute,
                relation,
                target: Some((target, other)),
                multiplier: *multiplier,
                constant: *constant,
                priority,
            })
        }
        (
            Property::Size,
            Expression::Property {
                target,
                multiplier,
                constant,
            },
        ) if target.property.node == Property::Size => Ok(Declaration::Size {
            view,
            relation,
            target: resolve_path(host, views, &target.path)?,
            multiplier: *multiplier,
            constant: *constant,
            priority,
        }),
        (
            Property::Center,
            Expression::Property {
                target,
                multiplier,
                constant,
            },
        ) if target.property.node == Property::Center => {
            if *multiplier != 1.0 {
                return Err(invalid("'center' cannot be scaled".to_string()));
            }
            Ok(Declaration::Center {
                view,
                relation,
                target: resolve_path(host, views, &target.path)?,
                offset: *constant,
                priority,
            })
        }
        (Property::Edges | Property::EdgesWithinMargins, expression) => {
            if relation != Relation::Equal {
                return Err(invalid(format!(
                    "'{}' can only be related with '='",
                    property.name()
                )));
            }
            let (target, inset) = edges_operand(expression).ok_or_else(|| {
                invalid(format!(
                    "'{}' must be related to edges, optionally with 'inset'",
                    property.name()
                ))
            })?;
            Ok(Declaration::Edges {
                view,
                margins: property == Property::EdgesWithinMargins,
                target: resolve_path(host, views, &target.path)?,
                target_margins: target.property.node == Property::EdgesWithinMargins,
                inset,
                priority,
            })
        }
        (_, Expression::Inset { .. }) => Err(invalid(format!(
            "'inset' applies to edges, not '{}'",
            property.name()
        ))),
        (_, _) => Err(invalid(format!(
            "'{}' must be related to another '{}'",
            property.name(),
            property.name()
        ))),
    }
}

/// Right-hand side of an edges statement: `t.edges` or `t.edges inset n`
fn edges_operand(expression: &Expression) -> Option<(&PropertyRef, f64)> {
    let is_edges = |target: &PropertyRef| {
        matches!(
            target.property.node,
            Property::Edges | Property::EdgesWithinMargins
        )
    };
    match expression {
        Expression::Inset { target, inset } if is_edges(target) => Some((target, *inset)),
        Expression::Property {
            target,
            multiplier,
            constant,
        } if is_edges(target) && *multiplier == 1.0 && *constant == 0.0 => Some((target, 0.0)),
        _ => None,
    }
}

fn resolve_path<H>(
    host: &H,
    views: &IndexMap<String, H::View>,
    path: &Spanned<ViewPath>,
) -> Result<ViewRef, LayoutError>
where
    H: ViewHierarchy + ?Sized,
{
    let name = path.node.view.node.as_str();
    let Some(&view) = views.get(name) else {
        return Err(LayoutError::undefined(
            name,
            path.node.view.span.clone(),
            find_similar(views.keys(), name, 2),
        ));
    };
    let mut current = view;
    for _ in 0..path.node.superviews {
        current = host
            .superview(current)
            .ok_or_else(|| LayoutError::no_superview(path.node.to_string(), path.span.clone()))?;
    }
    Ok(ViewRef {
        name: name.to_string(),
        superviews: path.node.superviews,
    })
}

/// Compute Levenshtein edit distance between two strings
fn levenshtein_distance(a: &str, b: &str) -> usize {
    let a_chars: Vec<char> = a.chars().collect();
    let b_chars: Vec<char> = b.chars().collect();
    let (m, n) = (a_chars.len(), b_chars.len());

    if m == 0 {
        return n;
    }
    if n == 0 {
        return m;
    }

    // single rolling row
    let mut row: Vec<usize> = (0..=n).collect();
    for i in 1..=m {
        let mut diagonal = row[0];
        row[0] = i;
        for j in 1..=n {
            let cost = usize::from(a_chars[i - 1] != b_chars[j - 1]);
            let next = (row[j] + 1).min(row[j - 1] + 1).min(diagonal + cost);
            diagonal = row[j];
            row[j] = next;
        }
    }
    row[n]
}

/// Find similar names within a maximum edit distance, closest first
fn find_similar<'a>(
    defined: impl IntoIterator<Item = &'a String>,
    target: &str,
    max_distance: usize,
) -> Vec<String> {
    let mut candidates: Vec<(&String, usize)> = defined
        .into_iter()
        .map(|name| (name, levenshtein_distance(name, target)))
        .filter(|&(_, dist)| dist <= max_distance && dist > 0)
        .collect();

    candidates.sort_by_key(|&(_, d)| d);
    candidates
        .into_iter()
        .map(|(name, _)| name.clone())
        .take(3)
        .collect()
}
