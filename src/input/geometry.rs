//! Screen geometry used for cursor targets
//!
//! Screen coordinates are unsigned pixels with the origin in the top-left
//! corner; `y` grows downwards.

use serde::{Deserialize, Serialize};

/// A pixel position on the screen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Point {
    /// X coordinate
    pub x: u32,
    /// Y coordinate
    pub y: u32,
}

impl Point {
    /// Creates a new point
    ///
    /// # Example
    ///
    /// ```rust
    /// use ki_input_emulator::input::Point;
    ///
    /// let p = Point::new(10, 20);
    /// assert_eq!(p.x, 10);
    /// assert_eq!(p.y, 20);
    /// ```
    pub fn new(x: u32, y: u32) -> Self {
        Self { x, y }
    }

    /// Calculates the Euclidean distance to another point
    ///
    /// ```rust
    /// use ki_input_emulator::input::Point;
    ///
    /// let a = Point::new(0, 0);
    /// let b = Point::new(3, 4);
    /// assert_eq!(a.distance_to(&b), 5.0);
    /// ```
    pub fn distance_to(&self, other: &Point) -> f64 {
        let dx = other.x as f64 - self.x as f64;
        let dy = other.y as f64 - self.y as f64;
        dx.hypot(dy)
    }

    /// Angle towards another point in radians, measured from the positive
    /// y axis, so that `sin` gives the horizontal and `cos` the vertical share.
    pub fn direction_to(&self, other: &Point) -> f64 {
        let dx = other.x as f64 - self.x as f64;
        let dy = other.y as f64 - self.y as f64;
        dx.atan2(dy)
    }
}

impl std::fmt::Display for Point {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// An axis aligned area on the screen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Rectangle {
    /// Left edge
    pub x: u32,
    /// Top edge
    pub y: u32,
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
}

impl Rectangle {
    /// Creates a new rectangle from its top-left corner and size
    pub fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Returns the center of the rectangle, rounded towards the top-left
    ///
    /// ```rust
    /// use ki_input_emulator::input::{Point, Rectangle};
    ///
    /// let area = Rectangle::new(50, 100, 100, 150);
    /// assert_eq!(area.center(), Point::new(100, 175));
    /// ```
    pub fn center(&self) -> Point {
        Point::new(
            self.x.saturating_add(self.width / 2),
            self.y.saturating_add(self.height / 2),
        )
    }

    /// Right-most column still inside the rectangle
    pub fn right(&self) -> u32 {
        self.x.saturating_add(self.width.saturating_sub(1))
    }

    /// Bottom-most row still inside the rectangle
    pub fn bottom(&self) -> u32 {
        self.y.saturating_add(self.height.saturating_sub(1))
    }

    /// Checks whether the point lies inside the rectangle
    ///
    /// An empty rectangle encloses only its own corner.
    pub fn encloses(&self, point: &Point) -> bool {
        point.x >= self.x && point.x <= self.right() && point.y >= self.y && point.y <= self.bottom()
    }

    /// Clamps a point into the rectangle
    pub fn clamp(&self, point: Point) -> Point {
        Point::new(
            point.x.clamp(self.x, self.right()),
            point.y.clamp(self.y, self.bottom()),
        )
    }
}

impl std::fmt::Display for Rectangle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{}+{}+{}", self.width, self.height, self.x, self.y)
    }
}
