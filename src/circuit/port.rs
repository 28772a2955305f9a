//! Ports, port handles and element geometry.
//!
//! A [`Port`] lives inside its owning element's input or output vector and
//! is never referenced by address. Everything outside the element names a
//! port through a [`PortRef`]: (element id, direction, index). Handles stay
//! valid across moves, resizes and reordering of the element list.

use std::fmt;
use std::str::FromStr;
use serde::{Serialize, Deserialize};
use crate::ternary::Trit;

/// Element identifier, unique within a scheme.
pub type ElementId = u32;

/// Hit-test tolerance for [`crate::circuit::Element::port_at`].
pub const PORT_HIT_TOLERANCE: i32 = 5;

/// Signal direction of a port.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    Input,
    Output,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Input => write!(f, "in"),
            Direction::Output => write!(f, "out"),
        }
    }
}

/// Stable handle to a port: owning element, direction and role index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PortRef {
    pub element: ElementId,
    pub direction: Direction,
    pub index: usize,
}

impl PortRef {
    pub const fn input(element: ElementId, index: usize) -> Self {
        Self { element, direction: Direction::Input, index }
    }

    pub const fn output(element: ElementId, index: usize) -> Self {
        Self { element, direction: Direction::Output, index }
    }
}

impl fmt::Display for PortRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}.{}{}", self.element, self.direction, self.index)
    }
}

/// A point in editor coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// An axis-aligned bounding box in editor coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl Rect {
    pub const fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self { x, y, width, height }
    }

    /// Check whether a point lies inside (edges included).
    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.x && p.x <= self.right() && p.y >= self.y && p.y <= self.bottom()
    }

    /// Right edge, clamped to the coordinate range.
    pub fn right(&self) -> i32 {
        self.x.saturating_add(self.width)
    }

    /// Bottom edge, clamped to the coordinate range.
    pub fn bottom(&self) -> i32 {
        self.y.saturating_add(self.height)
    }

    /// Absolute point at the given fractions of width and height.
    pub fn at(&self, rel_x: f64, rel_y: f64) -> Point {
        Point {
            x: self.x.saturating_add((rel_x * self.width as f64).round() as i32),
            y: self.y.saturating_add((rel_y * self.height as f64).round() as i32),
        }
    }

    /// Smallest rectangle covering both.
    pub fn union(&self, other: &Rect) -> Rect {
        let left = self.x.min(other.x);
        let top = self.y.min(other.y);
        let right = self.right().max(other.right());
        let bottom = self.bottom().max(other.bottom());
        Rect::new(left, top, right.saturating_sub(left), bottom.saturating_sub(top))
    }
}

/// Wire drawing hint carried with a port. Has no effect on simulation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum LineStyle {
    #[default]
    Solid,
    Dashed,
    Dotted,
}

impl LineStyle {
    pub const fn as_str(self) -> &'static str {
        match self {
            LineStyle::Solid => "solid",
            LineStyle::Dashed => "dashed",
            LineStyle::Dotted => "dotted",
        }
    }
}

impl FromStr for LineStyle {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "solid" | "0" => Ok(LineStyle::Solid),
            "dashed" | "1" => Ok(LineStyle::Dashed),
            "dotted" | "2" => Ok(LineStyle::Dotted),
            other => Err(format!("unknown line style '{}'", other)),
        }
    }
}

/// A connection point on an element.
#[derive(Debug, Clone, PartialEq)]
pub struct Port {
    direction: Direction,
    /// Current signal value.
    pub value: Trit,
    rel_x: f64,
    rel_y: f64,
    position: Point,
    /// Drawing hint only.
    pub line_style: LineStyle,
}

impl Port {
    /// Create a port at a relative location within the owner's bounds.
    pub fn new(direction: Direction, rel_x: f64, rel_y: f64) -> Self {
        Self {
            direction,
            value: Trit::O,
            rel_x: rel_x.clamp(0.0, 1.0),
            rel_y: rel_y.clamp(0.0, 1.0),
            position: Point::default(),
            line_style: LineStyle::Solid,
        }
    }

    /// Lay out `count` ports evenly along the edge for `direction`.
    ///
    /// Inputs sit on the left edge, outputs on the right.
    pub fn column(direction: Direction, count: usize) -> Vec<Port> {
        let rel_x = match direction {
            Direction::Input => 0.0,
            Direction::Output => 1.0,
        };
        (0..count)
            .map(|i| Port::new(direction, rel_x, (i + 1) as f64 / (count + 1) as f64))
            .collect()
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    /// Relative location as (x, y) fractions of the owner's bounds.
    pub fn relative(&self) -> (f64, f64) {
        (self.rel_x, self.rel_y)
    }

    /// Replace the relative location. Takes effect on the next [`Port::place`].
    pub fn set_relative(&mut self, rel_x: f64, rel_y: f64) {
        self.rel_x = rel_x.clamp(0.0, 1.0);
        self.rel_y = rel_y.clamp(0.0, 1.0);
    }

    /// Absolute location, valid after the owner last placed its ports.
    pub fn position(&self) -> Point {
        self.position
    }

    /// Recompute the absolute location from the owner's bounds.
    pub fn place(&mut self, bounds: &Rect) {
        self.position = bounds.at(self.rel_x, self.rel_y);
    }

    /// Hit-test with [`PORT_HIT_TOLERANCE`].
    pub fn hit(&self, p: Point) -> bool {
        let reach = PORT_HIT_TOLERANCE.unsigned_abs();
        self.position.x.abs_diff(p.x) <= reach && self.position.y.abs_diff(p.y) <= reach
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_column_layout_is_unique() {
        let ports = Port::column(Direction::Input, 3);
        assert_eq!(ports[0].relative(), (0.0, 0.25));
        assert_eq!(ports[1].relative(), (0.0, 0.5));
        assert_eq!(ports[2].relative(), (0.0, 0.75));

        let outs = Port::column(Direction::Output, 1);
        assert_eq!(outs[0].relative(), (1.0, 0.5));
    }

    #[test]
    fn test_place_follows_bounds() {
        let mut port = Port::new(Direction::Output, 1.0, 0.5);
        port.place(&Rect::new(10, 20, 60, 40));
        assert_eq!(port.position(), Point::new(70, 40));

        port.place(&Rect::new(0, 0, 100, 10));
        assert_eq!(port.position(), Point::new(100, 5));
        assert!(port.hit(Point::new(97, 8)));
        assert!(!port.hit(Point::new(90, 5)));
    }

    #[test]
    fn test_rect_union() {
        let a = Rect::new(0, 0, 10, 10);
        let b = Rect::new(20, 5, 10, 20);
        assert_eq!(a.union(&b), Rect::new(0, 0, 30, 25));
        assert!(a.contains(Point::new(10, 10)));
        assert!(!a.contains(Point::new(11, 0)));
    }

    #[test]
    fn test_rect_edges_clamp() {
        let far = Rect::new(i32::MAX, i32::MAX - 5, 60, 40);
        assert_eq!(far.right(), i32::MAX);
        assert_eq!(far.bottom(), i32::MAX);
        assert_eq!(far.at(1.0, 0.5), Point::new(i32::MAX, i32::MAX));
        assert!(far.contains(Point::new(i32::MAX, i32::MAX)));

        let wide = Rect::new(i32::MIN, 0, 10, 10).union(&Rect::new(i32::MAX - 10, 0, 10, 10));
        assert_eq!(wide.x, i32::MIN);
        assert_eq!(wide.width, i32::MAX);
    }

    #[test]
    fn test_line_style_parse() {
        for style in [LineStyle::Solid, LineStyle::Dashed, LineStyle::Dotted] {
            assert_eq!(style.as_str().parse::<LineStyle>().unwrap(), style);
        }
        assert!("wavy".parse::<LineStyle>().is_err());
    }
}
