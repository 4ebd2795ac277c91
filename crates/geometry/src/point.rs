use geo::Coord;

/// A point in world coordinates (`x` east, `y` north, both in `[-180, 180]`).
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PointD {
    pub x: f64,
    pub y: f64,
}

impl PointD {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    #[must_use]
    pub fn squared_length_to(&self, other: &PointD) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        dx * dx + dy * dy
    }

    #[must_use]
    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

impl From<(f64, f64)> for PointD {
    fn from((x, y): (f64, f64)) -> Self {
        Self { x, y }
    }
}

impl From<PointD> for (f64, f64) {
    fn from(p: PointD) -> Self {
        (p.x, p.y)
    }
}

impl From<Coord<f64>> for PointD {
    fn from(c: Coord<f64>) -> Self {
        Self { x: c.x, y: c.y }
    }
}

impl From<PointD> for Coord<f64> {
    fn from(p: PointD) -> Self {
        Coord { x: p.x, y: p.y }
    }
}

/// Axis-aligned rectangle. A freshly created rect is empty until a point is added.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RectD {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl Default for RectD {
    fn default() -> Self {
        Self::empty()
    }
}

impl RectD {
    pub const fn new(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Self {
        Self {
            min_x,
            min_y,
            max_x,
            max_y,
        }
    }

    pub const fn empty() -> Self {
        Self {
            min_x: f64::INFINITY,
            min_y: f64::INFINITY,
            max_x: f64::NEG_INFINITY,
            max_y: f64::NEG_INFINITY,
        }
    }

    /// Bounding rect of `points`; empty if there are none.
    pub fn from_points<'a, I: IntoIterator<Item = &'a PointD>>(points: I) -> Self {
        let mut r = Self::empty();
        for p in points {
            r.add(*p);
        }
        r
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        !(self.min_x <= self.max_x && self.min_y <= self.max_y)
    }

    pub fn add(&mut self, p: PointD) {
        self.min_x = self.min_x.min(p.x);
        self.min_y = self.min_y.min(p.y);
        self.max_x = self.max_x.max(p.x);
        self.max_y = self.max_y.max(p.y);
    }

    pub fn add_rect(&mut self, other: &RectD) {
        if other.is_empty() {
            return;
        }
        self.add(PointD::new(other.min_x, other.min_y));
        self.add(PointD::new(other.max_x, other.max_y));
    }

    #[must_use]
    pub fn size_x(&self) -> f64 {
        if self.is_empty() {
            0.0
        } else {
            self.max_x - self.min_x
        }
    }

    #[must_use]
    pub fn size_y(&self) -> f64 {
        if self.is_empty() {
            0.0
        } else {
            self.max_y - self.min_y
        }
    }

    #[must_use]
    pub fn center(&self) -> PointD {
        PointD::new(
            (self.min_x + self.max_x) / 2.0,
            (self.min_y + self.max_y) / 2.0,
        )
    }

    #[must_use]
    pub fn contains(&self, p: PointD) -> bool {
        p.x >= self.min_x && p.x <= self.max_x && p.y >= self.min_y && p.y <= self.max_y
    }
}
