use smallvec::SmallVec;

use crate::ids::EntityId;
use crate::shapes::{EntityShape, MapArea, Square};

/// How an entity reacts to a detected collision. Governs the default
/// response only, never detection itself.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub enum CollisionPolicy {
    #[default]
    Solid,
    Bouncy,
    Sticky,
    Ethereal,
}

/// Spatial-partition cells an entity currently occupies. Populated and
/// cleared exclusively by the registry's partition index; read-only to
/// everything else.
pub type Areas = SmallVec<[MapArea; 4]>;

/// The simulate-able body record attached to every entity: position,
/// velocity, collider geometry and collision policy, plus the bookkeeping
/// the registry needs to keep its spatial index in sync.
///
/// Position and velocity mutations go through the setters so the
/// location-changed flag stays truthful; the registry clears the flag once
/// it has re-synced the entity's partition membership.
#[derive(Debug, Clone)]
pub struct EntityProperties {
    id: EntityId,
    bounds: Square,
    z: i32,
    xvel: f32,
    yvel: f32,
    collidable: bool,
    dead: bool,
    location_changed: bool,
    policy: CollisionPolicy,
    collider_shape: EntityShape,
    current_areas: Areas,
}

impl EntityProperties {
    /// Create a body record. The collider defaults to the full bounds.
    pub fn new(id: EntityId, x: i32, y: i32, w: i32, h: i32) -> Self {
        Self {
            id,
            bounds: Square::new(x, y, w, h),
            z: 0,
            xvel: 0.0,
            yvel: 0.0,
            collidable: false,
            dead: false,
            location_changed: false,
            policy: CollisionPolicy::default(),
            collider_shape: EntityShape::new(0, 0, w, h),
            current_areas: Areas::new(),
        }
    }

    pub fn with_dim(id: EntityId, x: i32, y: i32, dim: i32) -> Self {
        Self::new(id, x, y, dim, dim)
    }

    pub fn id(&self) -> EntityId {
        self.id
    }

    pub fn bounding_box(&self) -> Square {
        self.bounds
    }

    pub fn x_pos(&self) -> i32 {
        self.bounds.x
    }

    pub fn y_pos(&self) -> i32 {
        self.bounds.y
    }

    pub fn width(&self) -> i32 {
        self.bounds.w
    }

    pub fn height(&self) -> i32 {
        self.bounds.h
    }

    pub fn set_x_pos(&mut self, pos: i32) {
        self.bounds.x = pos;
        self.location_changed = true;
    }

    pub fn set_y_pos(&mut self, pos: i32) {
        self.bounds.y = pos;
        self.location_changed = true;
    }

    pub fn increment_x_pos(&mut self, dx: i32) {
        self.bounds.x += dx;
        if dx != 0 {
            self.location_changed = true;
        }
    }

    pub fn increment_y_pos(&mut self, dy: i32) {
        self.bounds.y += dy;
        if dy != 0 {
            self.location_changed = true;
        }
    }

    pub fn x_vel(&self) -> f32 {
        self.xvel
    }

    pub fn y_vel(&self) -> f32 {
        self.yvel
    }

    pub fn set_x_vel(&mut self, vel: f32) {
        self.xvel = vel;
        if vel != 0.0 {
            self.location_changed = true;
        }
    }

    pub fn set_y_vel(&mut self, vel: f32) {
        self.yvel = vel;
        if vel != 0.0 {
            self.location_changed = true;
        }
    }

    /// Render depth, for parallax. Irrelevant to collision math.
    pub fn depth(&self) -> i32 {
        self.z
    }

    pub fn set_depth(&mut self, depth: i32) {
        self.z = depth;
    }

    pub fn is_collidable(&self) -> bool {
        self.collidable
    }

    /// Entities that are not collidable are excluded from the spatial
    /// index and all detection.
    pub fn set_collidable(&mut self, collidable: bool) {
        self.collidable = collidable;
    }

    pub fn is_dead(&self) -> bool {
        self.dead
    }

    /// Dead entities are reaped at the end of the next move pass.
    pub fn set_dead(&mut self, dead: bool) {
        self.dead = dead;
    }

    pub fn collision_policy(&self) -> CollisionPolicy {
        self.policy
    }

    pub fn set_collision_policy(&mut self, policy: CollisionPolicy) {
        self.policy = policy;
    }

    /// Set the collider as an offset rectangle within the bounds: a
    /// collider starting at the top-left corner has x, y = 0, 0.
    pub fn set_collider_shape(&mut self, shape: EntityShape) {
        self.collider_shape = shape;
    }

    /// The collider in world coordinates.
    pub fn collider_shape(&self) -> EntityShape {
        EntityShape::new(
            self.bounds.x + self.collider_shape.x,
            self.bounds.y + self.collider_shape.y,
            self.collider_shape.w,
            self.collider_shape.h,
        )
    }

    fn velocity_expanded_shape(&self, dx: f32, dy: f32) -> EntityShape {
        let shape = self.collider_shape();
        let mut expanded = EntityShape::default();
        if dx > 0.0 {
            expanded.x = shape.x;
            expanded.w = shape.w + dx as i32;
        } else {
            expanded.x = shape.x + dx as i32;
            expanded.w = shape.w - dx as i32;
        }
        if dy > 0.0 {
            expanded.y = shape.y;
            expanded.h = shape.h + dy as i32;
        } else {
            expanded.y = shape.y + dy as i32;
            expanded.h = shape.h - dy as i32;
        }
        expanded
    }

    /// The collider grown along the direction of travel by one frame's
    /// displacement. Moving entities collide with whatever they would
    /// sweep through this tick, not just what they touch now.
    pub fn velocity_collider_shape(&self, delta_time: f32) -> EntityShape {
        self.velocity_expanded_shape(self.xvel * delta_time, self.yvel * delta_time)
    }

    /// The collider grown by the X displacement only.
    pub fn x_velocity_collider_shape(&self, delta_time: f32) -> EntityShape {
        self.velocity_expanded_shape(self.xvel * delta_time, 0.0)
    }

    /// The collider grown by the Y displacement only.
    pub fn y_velocity_collider_shape(&self, delta_time: f32) -> EntityShape {
        self.velocity_expanded_shape(0.0, self.yvel * delta_time)
    }

    /// Distance between the bounds' left edge and the collider's.
    pub fn collider_left_offset(&self) -> i32 {
        self.collider_shape.x
    }

    pub fn collider_right_offset(&self) -> i32 {
        self.bounds.w - (self.collider_shape.x + self.collider_shape.w)
    }

    pub fn collider_top_offset(&self) -> i32 {
        self.collider_shape.y
    }

    pub fn collider_bottom_offset(&self) -> i32 {
        self.bounds.h - (self.collider_shape.y + self.collider_shape.h)
    }

    pub fn is_moving(&self) -> bool {
        self.xvel != 0.0 || self.yvel != 0.0
    }

    /// Advance position by velocity over the elapsed time, truncated to
    /// whole pixels.
    pub fn advance(&mut self, delta_time: f32) {
        let dx = (self.xvel * delta_time) as i32;
        let dy = (self.yvel * delta_time) as i32;
        self.increment_x_pos(dx);
        self.increment_y_pos(dy);
    }

    pub fn contains_point(&self, px: i32, py: i32) -> bool {
        self.bounds.contains_point(px, py)
    }

    pub fn current_areas(&self) -> &Areas {
        &self.current_areas
    }

    /// Mutable access to the partition membership list. This is a
    /// back-reference owned by the registry's partition index; game code
    /// must never touch it.
    pub fn current_areas_mut(&mut self) -> &mut Areas {
        &mut self.current_areas
    }

    pub fn has_location_changed(&self) -> bool {
        self.location_changed
    }

    /// Cleared by the registry once the spatial index has re-synced.
    pub fn set_location_changed(&mut self, changed: bool) {
        self.location_changed = changed;
    }
}
