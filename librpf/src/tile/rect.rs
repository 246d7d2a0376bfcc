/// Axis-aligned pixel rectangle with inclusive bounds.
///
/// Inclusive corners mirror how frame and subframe extents are written in the
/// product standards; a 256-pixel subframe at the origin is `(0, 0)..(255, 255)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PixelRect {
    min_x: i64,
    min_y: i64,
    max_x: i64,
    max_y: i64,
}

impl PixelRect {
    /// Builds a rectangle from inclusive corners.
    ///
    /// # Panics
    ///
    /// Panics in debug builds when the corners are inverted.
    #[must_use]
    pub const fn new(min_x: i64, min_y: i64, max_x: i64, max_y: i64) -> Self {
        debug_assert!(min_x <= max_x && min_y <= max_y);
        Self {
            min_x,
            min_y,
            max_x,
            max_y,
        }
    }

    /// Builds a rectangle from its top-left corner and positive dimensions
    #[must_use]
    pub const fn from_size(min_x: i64, min_y: i64, width: i64, height: i64) -> Self {
        Self::new(min_x, min_y, min_x + width - 1, min_y + height - 1)
    }

    /// Leftmost column
    #[must_use]
    pub const fn min_x(&self) -> i64 {
        self.min_x
    }

    /// Topmost row
    #[must_use]
    pub const fn min_y(&self) -> i64 {
        self.min_y
    }

    /// Rightmost column, inclusive
    #[must_use]
    pub const fn max_x(&self) -> i64 {
        self.max_x
    }

    /// Bottommost row, inclusive
    #[must_use]
    pub const fn max_y(&self) -> i64 {
        self.max_y
    }

    /// Width in pixels, always positive
    #[must_use]
    pub const fn width(&self) -> i64 {
        self.max_x - self.min_x + 1
    }

    /// Height in pixels, always positive
    #[must_use]
    pub const fn height(&self) -> i64 {
        self.max_y - self.min_y + 1
    }

    /// Pixel count
    #[must_use]
    pub const fn area(&self) -> i64 {
        self.width() * self.height()
    }

    /// Returns `true` if `(x, y)` falls inside the rectangle
    #[must_use]
    pub const fn contains(&self, x: i64, y: i64) -> bool {
        x >= self.min_x && x <= self.max_x && y >= self.min_y && y <= self.max_y
    }

    /// The overlapping region of two rectangles, if any
    #[must_use]
    pub fn intersect(&self, other: &Self) -> Option<Self> {
        let min_x = self.min_x.max(other.min_x);
        let min_y = self.min_y.max(other.min_y);
        let max_x = self.max_x.min(other.max_x);
        let max_y = self.max_y.min(other.max_y);
        (min_x <= max_x && min_y <= max_y).then(|| Self::new(min_x, min_y, max_x, max_y))
    }

    /// The same rectangle shifted by `(dx, dy)`
    #[must_use]
    pub const fn translated(&self, dx: i64, dy: i64) -> Self {
        Self::new(
            self.min_x + dx,
            self.min_y + dy,
            self.max_x + dx,
            self.max_y + dy,
        )
    }
}
