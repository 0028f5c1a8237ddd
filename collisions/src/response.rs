use common::properties::{CollisionPolicy, EntityProperties};
use common::shapes::EntityShape;

/// Velocity drained from a bouncy impact on every rebound.
const BOUNCE_DAMPING: f32 = 50.0;

/// Rebounds at or below this magnitude come to rest instead of
/// micro-bouncing forever.
const BOUNCE_REST_THRESHOLD: f32 = 300.0;

/// Apply the mover's default horizontal response against a stationary
/// obstacle collider. The mover must have nonzero X velocity.
pub fn resolve_horizontal(props: &mut EntityProperties, obstacle: &EntityShape) {
    debug_assert!(props.x_vel() != 0.0);

    match props.collision_policy() {
        CollisionPolicy::Bouncy => horizontal_bouncy(props, obstacle),
        CollisionPolicy::Sticky => horizontal_sticky(props, obstacle),
        CollisionPolicy::Ethereal => {}
        CollisionPolicy::Solid => horizontal_solid(props, obstacle),
    }
}

/// Apply the mover's default vertical response against a stationary
/// obstacle collider. The mover must have nonzero Y velocity.
pub fn resolve_vertical(props: &mut EntityProperties, obstacle: &EntityShape) {
    debug_assert!(props.y_vel() != 0.0);

    match props.collision_policy() {
        CollisionPolicy::Bouncy => vertical_bouncy(props, obstacle),
        CollisionPolicy::Sticky => vertical_sticky(props, obstacle),
        CollisionPolicy::Ethereal => {}
        CollisionPolicy::Solid => vertical_solid(props, obstacle),
    }
}

// Clamp the bounds so the collider sits one pixel clear of the obstacle on
// the colliding side. The collider offsets translate collider space back
// into bounds space. The pixel of clearance keeps the resolved pair from
// re-colliding under the edge-inclusive overlap convention.
fn horizontal_solid(props: &mut EntityProperties, obstacle: &EntityShape) {
    if props.x_vel() > 0.0 {
        props.set_x_pos(obstacle.x - props.width() - 1 + props.collider_right_offset());
    } else {
        props.set_x_pos(obstacle.x + obstacle.w + 1 - props.collider_left_offset());
    }
    props.set_x_vel(0.0);
}

fn vertical_solid(props: &mut EntityProperties, obstacle: &EntityShape) {
    if props.y_vel() > 0.0 {
        props.set_y_pos(obstacle.y - props.height() - 1 + props.collider_bottom_offset());
    } else {
        props.set_y_pos(obstacle.y + obstacle.h + 1 - props.collider_top_offset());
    }
    props.set_y_vel(0.0);
}

fn damped_rebound(vel: f32) -> f32 {
    let magnitude = vel.abs() - BOUNCE_DAMPING;
    if magnitude <= BOUNCE_REST_THRESHOLD {
        0.0
    } else {
        -vel.signum() * magnitude
    }
}

fn horizontal_bouncy(props: &mut EntityProperties, obstacle: &EntityShape) {
    let xvel = props.x_vel();
    horizontal_solid(props, obstacle);
    props.set_x_vel(damped_rebound(xvel));
}

fn vertical_bouncy(props: &mut EntityProperties, obstacle: &EntityShape) {
    let yvel = props.y_vel();
    vertical_solid(props, obstacle);
    props.set_y_vel(damped_rebound(yvel));
}

// Sticky entities latch onto the obstacle's collider edge directly, with
// no offset compensation, and stop on both axes.
fn horizontal_sticky(props: &mut EntityProperties, obstacle: &EntityShape) {
    if props.x_vel() > 0.0 {
        props.set_x_pos(obstacle.x);
    } else {
        props.set_x_pos(obstacle.x + obstacle.w - props.width());
    }
    props.set_x_vel(0.0);
    props.set_y_vel(0.0);
}

fn vertical_sticky(props: &mut EntityProperties, obstacle: &EntityShape) {
    if props.y_vel() > 0.0 {
        props.set_y_pos(obstacle.y);
    } else {
        props.set_y_pos(obstacle.y + obstacle.h - props.height());
    }
    props.set_x_vel(0.0);
    props.set_y_vel(0.0);
}
