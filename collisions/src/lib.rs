pub mod response;

use common::properties::EntityProperties;
use common::shapes::EntityShape;

/// Axis-aligned overlap test, separating-axis form. Edge-inclusive:
/// rectangles that exactly touch count as overlapping. Symmetric in its
/// arguments.
pub fn aabb(a: &EntityShape, b: &EntityShape) -> bool {
    !(a.x > b.x + b.w) && !(a.x + a.w < b.x) && !(a.y > b.y + b.h) && !(a.y + a.h < b.y)
}

/// Result of a swept AABB test. `time` is the fraction of this frame's
/// displacement travelled before impact; 1.0 means no collision this
/// frame, in which case the normal is zero.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct SweptImpact {
    pub time: f32,
    pub normal_x: f32,
    pub normal_y: f32,
}

impl SweptImpact {
    fn miss() -> Self {
        SweptImpact {
            time: 1.0,
            normal_x: 0.0,
            normal_y: 0.0,
        }
    }
}

/// Swept AABB time-of-impact estimate for `props` moving against a
/// stationary `obstacle` over one frame: per-axis entry/exit distance
/// ratios over the frame displacement, impact time = the larger of the two
/// entry times. A zero-velocity axis never constrains the result.
///
/// Secondary API; the per-axis resolution in the detector does not use it.
pub fn swept_aabb(
    props: &EntityProperties,
    obstacle: &EntityProperties,
    delta_time: f32,
) -> SweptImpact {
    let b1 = props.collider_shape();
    let b2 = obstacle.collider_shape();

    let xvel = props.x_vel() * delta_time;
    let yvel = props.y_vel() * delta_time;

    // Signed distances until the boxes start and stop overlapping, per
    // axis, relative to the travel direction.
    let (x_inv_entry, x_inv_exit) = if xvel > 0.0 {
        (
            (b2.x - (b1.x + b1.w)) as f32,
            ((b2.x + b2.w) - b1.x) as f32,
        )
    } else {
        (
            ((b2.x + b2.w) - b1.x) as f32,
            (b2.x - (b1.x + b1.w)) as f32,
        )
    };
    let (y_inv_entry, y_inv_exit) = if yvel > 0.0 {
        (
            (b2.y - (b1.y + b1.h)) as f32,
            ((b2.y + b2.h) - b1.y) as f32,
        )
    } else {
        (
            ((b2.y + b2.h) - b1.y) as f32,
            (b2.y - (b1.y + b1.h)) as f32,
        )
    };

    let (x_entry, x_exit) = if xvel == 0.0 {
        (f32::NEG_INFINITY, f32::INFINITY)
    } else {
        (x_inv_entry / xvel, x_inv_exit / xvel)
    };
    let (y_entry, y_exit) = if yvel == 0.0 {
        (f32::NEG_INFINITY, f32::INFINITY)
    } else {
        (y_inv_entry / yvel, y_inv_exit / yvel)
    };

    let entry_time = x_entry.max(y_entry);
    let exit_time = x_exit.min(y_exit);

    if entry_time > exit_time
        || (x_entry < 0.0 && y_entry < 0.0)
        || x_entry > 1.0
        || y_entry > 1.0
    {
        return SweptImpact::miss();
    }

    let (normal_x, normal_y) = if x_entry > y_entry {
        if x_inv_entry < 0.0 {
            (1.0, 0.0)
        } else {
            (-1.0, 0.0)
        }
    } else if y_inv_entry < 0.0 {
        (0.0, 1.0)
    } else {
        (0.0, -1.0)
    };

    SweptImpact {
        time: entry_time,
        normal_x,
        normal_y,
    }
}
