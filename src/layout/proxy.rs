//! Attribute accessors used inside layout declarations
//!
//! A [`LayoutProxy`] stands for one view during a layout pass. Its accessors
//! hand out [`Edge`] and [`Dimension`] values; relating those records a
//! constraint request in the pass's shared [`Context`].
//!
//! ```rust
//! use layout_dsl::{LayoutSession, ViewTree};
//!
//! let mut tree = ViewTree::new();
//! let root = tree.add_view("root", None);
//! let card = tree.add_view("card", Some(root));
//!
//! let group = LayoutSession::full(&mut tree)
//!     .pair(root, card, |root, card| {
//!         card.top().equal(root.top() + 20.0);
//!         card.center_x().equal(root.center_x());
//!         card.width().equal(root.width() * 0.5);
//!         card.height().greater_or_equal(44.0);
//!     })
//!     .unwrap();
//! assert_eq!(group.len(), 4);
//! ```

use std::cell::RefCell;
use std::ops::{Add, Div, Mul, Sub};

use super::host::LayoutHost;
use super::types::{Attribute, ConstraintSpec, Insets, Priority, Relation};

/// Position of a declared constraint in the group a session returns
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConstraintIndex(pub usize);

/// Shared recorder for one layout pass
pub struct Context<'c, H: LayoutHost + ?Sized> {
    host: &'c H,
    requests: RefCell<Vec<ConstraintSpec<H::View>>>,
}

impl<'c, H: LayoutHost + ?Sized> Context<'c, H> {
    pub(crate) fn new(host: &'c H) -> Self {
        Self {
            host,
            requests: RefCell::new(Vec::new()),
        }
    }

    /// Number of constraints declared so far
    pub fn len(&self) -> usize {
        self.requests.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn request(&self, spec: ConstraintSpec<H::View>) -> ConstraintIndex {
        let mut requests = self.requests.borrow_mut();
        requests.push(spec);
        ConstraintIndex(requests.len() - 1)
    }

    pub(crate) fn into_requests(self) -> Vec<ConstraintSpec<H::View>> {
        self.requests.into_inner()
    }
}

/// One view as seen by a layout declaration
pub struct LayoutProxy<'c, H: LayoutHost + ?Sized> {
    context: &'c Context<'c, H>,
    view: H::View,
}

impl<H: LayoutHost + ?Sized> Clone for LayoutProxy<'_, H> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<H: LayoutHost + ?Sized> Copy for LayoutProxy<'_, H> {}

impl<'c, H: LayoutHost + ?Sized> LayoutProxy<'c, H> {
    pub fn new(context: &'c Context<'c, H>, view: H::View) -> Self {
        Self { context, view }
    }

    /// The view this proxy stands for
    pub fn view(&self) -> H::View {
        self.view
    }

    /// The superview of the view, if it exists.
    pub fn superview(&self) -> Option<LayoutProxy<'c, H>> {
        self.context
            .host
            .superview(self.view)
            .map(|view| LayoutProxy::new(self.context, view))
    }

    fn edge(&self, attribute: Attribute) -> Edge<'c, H> {
        Edge {
            context: self.context,
            view: self.view,
            attribute,
        }
    }

    fn dimension(&self, attribute: Attribute) -> Dimension<'c, H> {
        Dimension {
            context: self.context,
            view: self.view,
            attribute,
        }
    }

    /// The width of the view.
    pub fn width(&self) -> Dimension<'c, H> {
        self.dimension(Attribute::Width)
    }

    /// The height of the view.
    pub fn height(&self) -> Dimension<'c, H> {
        self.dimension(Attribute::Height)
    }

    /// Width and height together
    pub fn size(&self) -> Size<'c, H> {
        Size {
            width: self.width(),
            height: self.height(),
        }
    }

    pub fn top(&self) -> Edge<'c, H> {
        self.edge(Attribute::Top)
    }

    pub fn right(&self) -> Edge<'c, H> {
        self.edge(Attribute::Right)
    }

    pub fn bottom(&self) -> Edge<'c, H> {
        self.edge(Attribute::Bottom)
    }

    pub fn left(&self) -> Edge<'c, H> {
        self.edge(Attribute::Left)
    }

    pub fn leading(&self) -> Edge<'c, H> {
        self.edge(Attribute::Leading)
    }

    pub fn trailing(&self) -> Edge<'c, H> {
        self.edge(Attribute::Trailing)
    }

    /// Top, leading, bottom and trailing edges together
    pub fn edges(&self) -> Edges<'c, H> {
        Edges {
            top: self.top(),
            leading: self.leading(),
            bottom: self.bottom(),
            trailing: self.trailing(),
        }
    }

    pub fn center_x(&self) -> Edge<'c, H> {
        self.edge(Attribute::CenterX)
    }

    pub fn center_y(&self) -> Edge<'c, H> {
        self.edge(Attribute::CenterY)
    }

    /// Horizontal and vertical center together
    pub fn center(&self) -> Point<'c, H> {
        Point {
            x: self.center_x(),
            y: self.center_y(),
        }
    }

    pub fn baseline(&self) -> Edge<'c, H> {
        self.edge(Attribute::Baseline)
    }

    pub fn first_baseline(&self) -> Edge<'c, H> {
        self.edge(Attribute::FirstBaseline)
    }

    pub fn top_margin(&self) -> Edge<'c, H> {
        self.edge(Attribute::TopMargin)
    }

    pub fn left_margin(&self) -> Edge<'c, H> {
        self.edge(Attribute::LeftMargin)
    }

    pub fn bottom_margin(&self) -> Edge<'c, H> {
        self.edge(Attribute::BottomMargin)
    }

    pub fn right_margin(&self) -> Edge<'c, H> {
        self.edge(Attribute::RightMargin)
    }

    pub fn leading_margin(&self) -> Edge<'c, H> {
        self.edge(Attribute::LeadingMargin)
    }

    pub fn trailing_margin(&self) -> Edge<'c, H> {
        self.edge(Attribute::TrailingMargin)
    }

    /// The edges inset by the view's layout margins
    pub fn edges_within_margins(&self) -> Edges<'c, H> {
        Edges {
            top: self.top_margin(),
            leading: self.leading_margin(),
            bottom: self.bottom_margin(),
            trailing: self.trailing_margin(),
        }
    }

    /// Look up a single attribute by value
    pub fn attribute(&self, attribute: Attribute) -> Term<'c, H> {
        if attribute.is_dimension() {
            Term::Dimension(self.dimension(attribute))
        } else {
            Term::Edge(self.edge(attribute))
        }
    }
}

/// Either kind of single attribute
pub enum Term<'c, H: LayoutHost + ?Sized> {
    Edge(Edge<'c, H>),
    Dimension(Dimension<'c, H>),
}

/// A position attribute of one view
pub struct Edge<'c, H: LayoutHost + ?Sized> {
    context: &'c Context<'c, H>,
    view: H::View,
    attribute: Attribute,
}

impl<H: LayoutHost + ?Sized> Clone for Edge<'_, H> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<H: LayoutHost + ?Sized> Copy for Edge<'_, H> {}

/// A size attribute of one view
pub struct Dimension<'c, H: LayoutHost + ?Sized> {
    context: &'c Context<'c, H>,
    view: H::View,
    attribute: Attribute,
}

impl<H: LayoutHost + ?Sized> Clone for Dimension<'_, H> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<H: LayoutHost + ?Sized> Copy for Dimension<'_, H> {}

/// Right-hand side for an edge: `edge * multiplier + constant`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EdgeExpression<V> {
    view: V,
    attribute: Attribute,
    multiplier: f64,
    constant: f64,
    priority: Priority,
}

/// Right-hand side for a dimension: `dimension * multiplier + constant`, or a constant
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DimensionExpression<V> {
    target: Option<(V, Attribute)>,
    multiplier: f64,
    constant: f64,
    priority: Priority,
}

impl<V> EdgeExpression<V> {
    /// Give the resulting constraint a priority other than required
    pub fn at_priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }
}

impl<V> DimensionExpression<V> {
    pub fn at_priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }

    pub fn constant(value: f64) -> Self {
        Self {
            target: None,
            multiplier: 1.0,
            constant: value,
            priority: Priority::REQUIRED,
        }
    }
}

impl<H: LayoutHost + ?Sized> From<Edge<'_, H>> for EdgeExpression<H::View> {
    fn from(edge: Edge<'_, H>) -> Self {
        Self {
            view: edge.view,
            attribute: edge.attribute,
            multiplier: 1.0,
            constant: 0.0,
            priority: Priority::REQUIRED,
        }
    }
}

impl<H: LayoutHost + ?Sized> From<Dimension<'_, H>> for DimensionExpression<H::View> {
    fn from(dimension: Dimension<'_, H>) -> Self {
        Self {
            target: Some((dimension.view, dimension.attribute)),
            multiplier: 1.0,
            constant: 0.0,
            priority: Priority::REQUIRED,
        }
    }
}

impl<V> From<f64> for DimensionExpression<V> {
    fn from(value: f64) -> Self {
        Self::constant(value)
    }
}

impl<V> Add<f64> for EdgeExpression<V> {
    type Output = Self;

    fn add(mut self, rhs: f64) -> Self {
        self.constant += rhs;
        self
    }
}

impl<V> Sub<f64> for EdgeExpression<V> {
    type Output = Self;

    fn sub(mut self, rhs: f64) -> Self {
        self.constant -= rhs;
        self
    }
}

impl<V> Mul<f64> for EdgeExpression<V> {
    type Output = Self;

    fn mul(mut self, rhs: f64) -> Self {
        self.multiplier *= rhs;
        self.constant *= rhs;
        self
    }
}

impl<V> Add<f64> for DimensionExpression<V> {
    type Output = Self;

    fn add(mut self, rhs: f64) -> Self {
        self.constant += rhs;
        self
    }
}

impl<V> Sub<f64> for DimensionExpression<V> {
    type Output = Self;

    fn sub(mut self, rhs: f64) -> Self {
        self.constant -= rhs;
        self
    }
}

impl<V> Mul<f64> for DimensionExpression<V> {
    type Output = Self;

    fn mul(mut self, rhs: f64) -> Self {
        self.multiplier *= rhs;
        self.constant *= rhs;
        self
    }
}

impl<V> Div<f64> for DimensionExpression<V> {
    type Output = Self;

    fn div(self, rhs: f64) -> Self {
        self * (1.0 / rhs)
    }
}

impl<H: LayoutHost + ?Sized> Add<f64> for Edge<'_, H> {
    type Output = EdgeExpression<H::View>;

    fn add(self, rhs: f64) -> Self::Output {
        EdgeExpression::from(self) + rhs
    }
}

impl<H: LayoutHost + ?Sized> Sub<f64> for Edge<'_, H> {
    type Output = EdgeExpression<H::View>;

    fn sub(self, rhs: f64) -> Self::Output {
        EdgeExpression::from(self) - rhs
    }
}

impl<H: LayoutHost + ?Sized> Mul<f64> for Edge<'_, H> {
    type Output = EdgeExpression<H::View>;

    fn mul(self, rhs: f64) -> Self::Output {
        EdgeExpression::from(self) * rhs
    }
}

impl<H: LayoutHost + ?Sized> Add<f64> for Dimension<'_, H> {
    type Output = DimensionExpression<H::View>;

    fn add(self, rhs: f64) -> Self::Output {
        DimensionExpression::from(self) + rhs
    }
}

impl<H: LayoutHost + ?Sized> Sub<f64> for Dimension<'_, H> {
    type Output = DimensionExpression<H::View>;

    fn sub(self, rhs: f64) -> Self::Output {
        DimensionExpression::from(self) - rhs
    }
}

impl<H: LayoutHost + ?Sized> Mul<f64> for Dimension<'_, H> {
    type Output = DimensionExpression<H::View>;

    fn mul(self, rhs: f64) -> Self::Output {
        DimensionExpression::from(self) * rhs
    }
}

impl<H: LayoutHost + ?Sized> Div<f64> for Dimension<'_, H> {
    type Output = DimensionExpression<H::View>;

    fn div(self, rhs: f64) -> Self::Output {
        DimensionExpression::from(self) / rhs
    }
}

impl<'c, H: LayoutHost + ?Sized> Edge<'c, H> {
    pub fn view(&self) -> H::View {
        self.view
    }

    pub fn attribute(&self) -> Attribute {
        self.attribute
    }

    pub fn at_priority(self, priority: Priority) -> EdgeExpression<H::View> {
        EdgeExpression::from(self).at_priority(priority)
    }

    pub fn equal(self, rhs: impl Into<EdgeExpression<H::View>>) -> ConstraintIndex {
        self.relate(Relation::Equal, rhs.into())
    }

    pub fn less_or_equal(self, rhs: impl Into<EdgeExpression<H::View>>) -> ConstraintIndex {
        self.relate(Relation::LessOrEqual, rhs.into())
    }

    pub fn greater_or_equal(self, rhs: impl Into<EdgeExpression<H::View>>) -> ConstraintIndex {
        self.relate(Relation::GreaterOrEqual, rhs.into())
    }

    pub fn relate(self, relation: Relation, rhs: EdgeExpression<H::View>) -> ConstraintIndex {
        self.context.request(ConstraintSpec {
            first: self.view,
            first_attribute: self.attribute,
            relation,
            second: Some((rhs.view, rhs.attribute)),
            multiplier: rhs.multiplier,
            constant: rhs.constant,
            priority: rhs.priority,
        })
    }
}

impl<'c, H: LayoutHost + ?Sized> Dimension<'c, H> {
    pub fn view(&self) -> H::View {
        self.view
    }

    pub fn attribute(&self) -> Attribute {
        self.attribute
    }

    pub fn at_priority(self, priority: Priority) -> DimensionExpression<H::View> {
        DimensionExpression::from(self).at_priority(priority)
    }

    pub fn equal(self, rhs: impl Into<DimensionExpression<H::View>>) -> ConstraintIndex {
        self.relate(Relation::Equal, rhs.into())
    }

    pub fn less_or_equal(self, rhs: impl Into<DimensionExpression<H::View>>) -> ConstraintIndex {
        self.relate(Relation::LessOrEqual, rhs.into())
    }

    pub fn greater_or_equal(
        self,
        rhs: impl Into<DimensionExpression<H::View>>,
    ) -> ConstraintIndex {
        self.relate(Relation::GreaterOrEqual, rhs.into())
    }

    pub fn relate(
        self,
        relation: Relation,
        rhs: DimensionExpression<H::View>,
    ) -> ConstraintIndex {
        self.context.request(ConstraintSpec {
            first: self.view,
            first_attribute: self.attribute,
            relation,
            second: rhs.target,
            multiplier: rhs.multiplier,
            constant: rhs.constant,
            priority: rhs.priority,
        })
    }
}

/// Width and height of one view
pub struct Size<'c, H: LayoutHost + ?Sized> {
    pub width: Dimension<'c, H>,
    pub height: Dimension<'c, H>,
}

impl<'c, H: LayoutHost + ?Sized> Size<'c, H> {
    /// Relate both dimensions to the other size as
    /// `self = other * multiplier + constant`
    pub fn relate(
        self,
        relation: Relation,
        other: Size<'_, H>,
        multiplier: f64,
        constant: f64,
    ) -> [ConstraintIndex; 2] {
        [
            self.width
                .relate(relation, DimensionExpression::from(other.width) * multiplier + constant),
            self.height.relate(
                relation,
                DimensionExpression::from(other.height) * multiplier + constant,
            ),
        ]
    }

    pub fn equal(self, other: Size<'_, H>) -> [ConstraintIndex; 2] {
        self.relate(Relation::Equal, other, 1.0, 0.0)
    }

    pub fn less_or_equal(self, other: Size<'_, H>) -> [ConstraintIndex; 2] {
        self.relate(Relation::LessOrEqual, other, 1.0, 0.0)
    }

    pub fn greater_or_equal(self, other: Size<'_, H>) -> [ConstraintIndex; 2] {
        self.relate(Relation::GreaterOrEqual, other, 1.0, 0.0)
    }

    /// Fix both dimensions to constants
    pub fn equal_to(self, width: f64, height: f64) -> [ConstraintIndex; 2] {
        [self.width.equal(width), self.height.equal(height)]
    }
}

/// Horizontal and vertical center of one view
pub struct Point<'c, H: LayoutHost + ?Sized> {
    pub x: Edge<'c, H>,
    pub y: Edge<'c, H>,
}

impl<'c, H: LayoutHost + ?Sized> Point<'c, H> {
    pub fn relate(
        self,
        relation: Relation,
        other: Point<'_, H>,
        dx: f64,
        dy: f64,
    ) -> [ConstraintIndex; 2] {
        [
            self.x.relate(relation, EdgeExpression::from(other.x) + dx),
            self.y.relate(relation, EdgeExpression::from(other.y) + dy),
        ]
    }

    pub fn equal(self, other: Point<'_, H>) -> [ConstraintIndex; 2] {
        self.relate(Relation::Equal, other, 0.0, 0.0)
    }

    /// `self.x = other.x + dx`, `self.y = other.y + dy`
    pub fn equal_offset(self, other: Point<'_, H>, dx: f64, dy: f64) -> [ConstraintIndex; 2] {
        self.relate(Relation::Equal, other, dx, dy)
    }
}

/// Top, leading, bottom and trailing edges of one view
pub struct Edges<'c, H: LayoutHost + ?Sized> {
    pub top: Edge<'c, H>,
    pub leading: Edge<'c, H>,
    pub bottom: Edge<'c, H>,
    pub trailing: Edge<'c, H>,
}

impl<'c, H: LayoutHost + ?Sized> Edges<'c, H> {
    pub fn equal(self, other: Edges<'_, H>) -> [ConstraintIndex; 4] {
        self.inset(other, Insets::default())
    }

    /// Pin each edge inside `other`, moved inwards by `insets`
    pub fn inset(self, other: Edges<'_, H>, insets: impl Into<Insets>) -> [ConstraintIndex; 4] {
        let insets = insets.into();
        [
            self.top.equal(other.top + insets.top),
            self.leading.equal(other.leading + insets.leading),
            self.bottom.equal(other.bottom - insets.bottom),
            self.trailing.equal(other.trailing - insets.trailing),
        ]
    }
}
