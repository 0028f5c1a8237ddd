use log::trace;

use collisions::{aabb, response};

use crate::container::{EntityContainer, EntityKey};
use crate::entity::SimContext;

/// Broad-phase driver: pulls collision candidates out of the container's
/// spatial partitions and resolves each potential pair per axis. Stateless;
/// all narrow-phase math lives in the `collisions` crate.
#[derive(Debug, Default)]
pub struct CollisionDetector;

impl CollisionDetector {
    pub fn new() -> Self {
        CollisionDetector
    }

    /// Handle every possible collision for one moving, collidable entity
    /// this tick.
    pub fn handle_possible_collisions_for(
        &self,
        container: &mut EntityContainer,
        key: EntityKey,
        ctx: &SimContext,
    ) {
        for candidate in container.collidable_neighbours(key) {
            let overlaps = {
                let (Some(entity), Some(other)) = (container.get(key), container.get(candidate))
                else {
                    continue;
                };
                // Recomputed per candidate: a response earlier in this loop
                // may already have clamped the velocity.
                let broadphase = entity
                    .properties()
                    .velocity_collider_shape(ctx.delta_time);
                aabb(&broadphase, &other.properties().collider_shape())
            };
            if overlaps {
                self.handle_possible_collision(container, key, candidate, ctx);
            }
        }
    }

    /// Resolve one candidate pair, each axis independently: a diagonal
    /// mover may collide both horizontally and vertically with the same
    /// obstacle in one tick. The mover's callbacks run first; if neither
    /// reports the collision handled, the default policy response is
    /// applied. The obstacle's callbacks fire afterwards, outcome ignored.
    /// Returns whether any collision registered.
    pub fn handle_possible_collision(
        &self,
        container: &mut EntityContainer,
        a: EntityKey,
        b: EntityKey,
        ctx: &SimContext,
    ) -> bool {
        let Some([ea, eb]) = container.objects.get_disjoint_mut([a, b]) else {
            return false;
        };
        if ea.id() == eb.id() {
            return false;
        }

        let dt = ctx.delta_time;
        let obstacle = eb.properties().collider_shape();
        let mut collided = false;

        let xvel = ea.properties().x_vel() * dt;
        if xvel != 0.0 && aabb(&ea.properties().x_velocity_collider_shape(dt), &obstacle) {
            if !ea.on_collision(eb.as_mut(), ctx) && !ea.on_horizontal_collision(eb.as_mut(), ctx)
            {
                response::resolve_horizontal(ea.properties_mut(), &obstacle);
            }
            eb.on_collision(ea.as_mut(), ctx);
            eb.on_horizontal_collision(ea.as_mut(), ctx);
            collided = true;
        }

        let yvel = ea.properties().y_vel() * dt;
        if yvel != 0.0 && aabb(&ea.properties().y_velocity_collider_shape(dt), &obstacle) {
            if !ea.on_collision(eb.as_mut(), ctx) && !ea.on_vertical_collision(eb.as_mut(), ctx) {
                response::resolve_vertical(ea.properties_mut(), &obstacle);
            }
            eb.on_collision(ea.as_mut(), ctx);
            eb.on_vertical_collision(ea.as_mut(), ctx);
            collided = true;
        }

        if collided {
            trace!("collision between {} and {}", ea.id(), eb.id());
        }
        collided
    }
}
