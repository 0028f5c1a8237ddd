use std::fmt;

/// An axis-aligned rectangle in integer world units. Fundamental unit for
/// entity bounds, tree regions and partition cells. Width and height are
/// expected to be non-negative; nothing enforces it.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Square {
    pub x: i32,
    pub y: i32,
    pub w: i32,
    pub h: i32,
}

impl Square {
    pub fn new(x: i32, y: i32, w: i32, h: i32) -> Self {
        Self { x, y, w, h }
    }

    /// A square with equal width and height.
    pub fn with_dim(x: i32, y: i32, dim: i32) -> Self {
        Self {
            x,
            y,
            w: dim,
            h: dim,
        }
    }

    pub fn right(&self) -> i32 {
        self.x + self.w
    }

    pub fn bottom(&self) -> i32 {
        self.y + self.h
    }

    /// Edge-inclusive point containment.
    pub fn contains_point(&self, px: i32, py: i32) -> bool {
        px >= self.x && px <= self.x + self.w && py >= self.y && py <= self.y + self.h
    }
}

impl fmt::Display for Square {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {}, {})", self.x, self.y, self.w, self.h)
    }
}

/// Collider geometry. Shaped exactly like [`Square`] but kept as its own
/// type: a collider is usually an offset rectangle inset within the
/// entity's visual bounds rather than the bounds themselves.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Hash)]
pub struct EntityShape {
    pub x: i32,
    pub y: i32,
    pub w: i32,
    pub h: i32,
}

impl EntityShape {
    pub fn new(x: i32, y: i32, w: i32, h: i32) -> Self {
        Self { x, y, w, h }
    }
}

/// A cell of the uniform spatial-partition grid.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MapArea(pub Square);

impl MapArea {
    pub fn new(x: i32, y: i32, dim: i32) -> Self {
        MapArea(Square::with_dim(x, y, dim))
    }

    pub fn as_entity_shape(&self) -> EntityShape {
        EntityShape::new(self.0.x, self.0.y, self.0.w, self.0.h)
    }

    pub fn contains_point(&self, px: i32, py: i32) -> bool {
        self.0.contains_point(px, py)
    }
}
