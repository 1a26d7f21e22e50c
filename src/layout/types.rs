//! Core value types shared by the layout engine
//!
//! These describe a single native constraint request independently of the
//! host that eventually turns it into a live constraint.

use std::fmt;

/// A named geometric quantity of a view
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Attribute {
    Width,
    Height,
    Top,
    Left,
    Bottom,
    Right,
    Leading,
    Trailing,
    CenterX,
    CenterY,
    Baseline,
    FirstBaseline,
    TopMargin,
    LeftMargin,
    BottomMargin,
    RightMargin,
    LeadingMargin,
    TrailingMargin,
}

/// Which way an attribute measures
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    /// Sizes (width, height) are not positions on either axis
    Dimension,
    Horizontal,
    Vertical,
}

impl Attribute {
    /// Every attribute, in declaration order
    pub const ALL: [Attribute; 18] = [
        Self::Width,
        Self::Height,
        Self::Top,
        Self::Left,
        Self::Bottom,
        Self::Right,
        Self::Leading,
        Self::Trailing,
        Self::CenterX,
        Self::CenterY,
        Self::Baseline,
        Self::FirstBaseline,
        Self::TopMargin,
        Self::LeftMargin,
        Self::BottomMargin,
        Self::RightMargin,
        Self::LeadingMargin,
        Self::TrailingMargin,
    ];

    /// Name used by the statement language
    pub fn name(self) -> &'static str {
        match self {
            Self::Width => "width",
            Self::Height => "height",
            Self::Top => "top",
            Self::Left => "left",
            Self::Bottom => "bottom",
            Self::Right => "right",
            Self::Leading => "leading",
            Self::Trailing => "trailing",
            Self::CenterX => "center_x",
            Self::CenterY => "center_y",
            Self::Baseline => "baseline",
            Self::FirstBaseline => "first_baseline",
            Self::TopMargin => "top_margin",
            Self::LeftMargin => "left_margin",
            Self::BottomMargin => "bottom_margin",
            Self::RightMargin => "right_margin",
            Self::LeadingMargin => "leading_margin",
            Self::TrailingMargin => "trailing_margin",
        }
    }

    /// Look up an attribute by its statement-language name
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|attr| attr.name() == name)
    }

    pub fn axis(self) -> Axis {
        match self {
            Self::Width | Self::Height => Axis::Dimension,
            Self::Left
            | Self::Right
            | Self::Leading
            | Self::Trailing
            | Self::CenterX
            | Self::LeftMargin
            | Self::RightMargin
            | Self::LeadingMargin
            | Self::TrailingMargin => Axis::Horizontal,
            Self::Top
            | Self::Bottom
            | Self::CenterY
            | Self::Baseline
            | Self::FirstBaseline
            | Self::TopMargin
            | Self::BottomMargin => Axis::Vertical,
        }
    }

    pub fn is_dimension(self) -> bool {
        self.axis() == Axis::Dimension
    }
}

impl fmt::Display for Attribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Relation between the two sides of a constraint equation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Relation {
    Equal,
    LessOrEqual,
    GreaterOrEqual,
}

impl Relation {
    pub fn symbol(self) -> &'static str {
        match self {
            Self::Equal => "=",
            Self::LessOrEqual => "<=",
            Self::GreaterOrEqual => ">=",
        }
    }
}

/// Constraint priority in the native 1..=1000 range
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct Priority(f32);

impl Priority {
    pub const REQUIRED: Priority = Priority(1000.0);
    pub const HIGH: Priority = Priority(750.0);
    pub const LOW: Priority = Priority(250.0);
    pub const FITTING: Priority = Priority(50.0);

    /// Create a priority, clamped into 1..=1000
    pub fn new(value: f32) -> Self {
        Self(value.clamp(1.0, 1000.0))
    }

    pub fn value(self) -> f32 {
        self.0
    }

    pub fn is_required(self) -> bool {
        self.0 >= Self::REQUIRED.0
    }
}

impl Default for Priority {
    fn default() -> Self {
        Self::REQUIRED
    }
}

/// Everything a host needs to create one native constraint:
/// `first.attribute (relation) second.attribute * multiplier + constant`
#[derive(Debug, Clone, PartialEq)]
pub struct ConstraintSpec<V> {
    pub first: V,
    pub first_attribute: Attribute,
    pub relation: Relation,
    pub second: Option<(V, Attribute)>,
    pub multiplier: f64,
    pub constant: f64,
    pub priority: Priority,
}

impl<V: fmt::Debug> ConstraintSpec<V> {
    /// Human-readable equation, used in logs and solver errors
    pub fn describe(&self) -> String {
        let lhs = format!("{:?}.{}", self.first, self.first_attribute);
        let rhs = match &self.second {
            Some((view, attr)) if self.multiplier == 1.0 => format!("{:?}.{}", view, attr),
            Some((view, attr)) => format!("{:?}.{} * {}", view, attr, self.multiplier),
            None => String::new(),
        };
        let equation = match (rhs.is_empty(), self.constant) {
            (true, c) => format!("{} {} {}", lhs, self.relation.symbol(), c),
            (false, c) if c == 0.0 => format!("{} {} {}", lhs, self.relation.symbol(), rhs),
            (false, c) if c < 0.0 => format!("{} {} {} - {}", lhs, self.relation.symbol(), rhs, -c),
            (false, c) => format!("{} {} {} + {}", lhs, self.relation.symbol(), rhs, c),
        };
        if self.priority.is_required() {
            equation
        } else {
            format!("{} @ {}", equation, self.priority.value())
        }
    }
}

/// Per-edge distances, used for layout margins and `inset`
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Insets {
    pub top: f64,
    pub leading: f64,
    pub bottom: f64,
    pub trailing: f64,
}

impl Insets {
    pub fn new(top: f64, leading: f64, bottom: f64, trailing: f64) -> Self {
        Self {
            top,
            leading,
            bottom,
            trailing,
        }
    }

    /// Same distance on every edge
    pub fn uniform(value: f64) -> Self {
        Self::new(value, value, value, value)
    }
}

impl From<f64> for Insets {
    fn from(value: f64) -> Self {
        Self::uniform(value)
    }
}

/// Solved geometry of a view, in the coordinate space of its tree
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Frame {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Frame {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Get the right edge (x + width).
    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    /// Get the bottom edge (y + height).
    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    pub fn center_x(&self) -> f64 {
        self.x + self.width / 2.0
    }

    pub fn center_y(&self) -> f64 {
        self.y + self.height / 2.0
    }
}

impl fmt::Display for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // solver noise must not print as "-0.0"
        let tidy = |v: f64| (v * 10.0).round() / 10.0 + 0.0;
        write!(
            f,
            "x={:.1} y={:.1} w={:.1} h={:.1}",
            tidy(self.x),
            tidy(self.y),
            tidy(self.width),
            tidy(self.height)
        )
    }
}
