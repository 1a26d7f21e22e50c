//! Abstract Syntax Tree types for layout statements

use crate::layout::types::{Attribute, Relation};

/// Byte range in source text
pub type Span = std::ops::Range<usize>;

/// AST node with source location
#[derive(Debug, Clone, PartialEq)]
pub struct Spanned<T> {
    pub node: T,
    pub span: Span,
}

impl<T> Spanned<T> {
    pub fn new(node: T, span: Span) -> Self {
        Self { node, span }
    }
}

/// Valid identifier (alphanumeric + underscore, starts with letter/_)
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Identifier(pub String);

impl Identifier {
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Identifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A parsed statement list
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub statements: Vec<Spanned<Statement>>,
}

/// `left relation right [@ priority]`
#[derive(Debug, Clone, PartialEq)]
pub struct Statement {
    pub left: PropertyRef,
    pub relation: Spanned<Relation>,
    pub right: Spanned<Expression>,
    pub priority: Option<Spanned<f64>>,
}

/// A view name followed by zero or more `superview` hops
#[derive(Debug, Clone, PartialEq)]
pub struct ViewPath {
    pub view: Spanned<Identifier>,
    pub superviews: usize,
}

impl std::fmt::Display for ViewPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.view.node)?;
        for _ in 0..self.superviews {
            write!(f, ".superview")?;
        }
        Ok(())
    }
}

/// Property that a statement can relate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Property {
    Attribute(Attribute),
    Size,
    Center,
    Edges,
    EdgesWithinMargins,
}

impl Property {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "size" => Some(Self::Size),
            "center" => Some(Self::Center),
            "edges" => Some(Self::Edges),
            "edges_within_margins" => Some(Self::EdgesWithinMargins),
            _ => Attribute::from_name(name).map(Self::Attribute),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Attribute(attribute) => attribute.name(),
            Self::Size => "size",
            Self::Center => "center",
            Self::Edges => "edges",
            Self::EdgesWithinMargins => "edges_within_margins",
        }
    }

    /// True for properties that expand to several constraints
    pub fn is_composite(self) -> bool {
        !matches!(self, Self::Attribute(_))
    }
}

/// `path.property`
#[derive(Debug, Clone, PartialEq)]
pub struct PropertyRef {
    pub path: Spanned<ViewPath>,
    pub property: Spanned<Property>,
}

/// Right-hand side of a statement
#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    /// `100`
    Constant(f64),
    /// `b.width * 0.5 + 10`
    Property {
        target: PropertyRef,
        multiplier: f64,
        constant: f64,
    },
    /// `b.edges inset 8`
    Inset { target: PropertyRef, inset: f64 },
}
