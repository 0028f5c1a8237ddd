use common::ids::EntityId;
use common::properties::EntityProperties;

/// Read-only per-tick context handed to entity hooks.
#[derive(Debug, Copy, Clone)]
pub struct SimContext {
    /// Seconds elapsed since the previous tick.
    pub delta_time: f32,
}

/// A simulated game object.
///
/// Implementors supply the body record and override only the hooks they
/// care about; every hook defaults to a no-op and every collision callback
/// to "not handled". Two entities are the same entity exactly when their
/// ids match.
pub trait Entity {
    fn properties(&self) -> &EntityProperties;
    fn properties_mut(&mut self) -> &mut EntityProperties;

    fn id(&self) -> EntityId {
        self.properties().id()
    }

    /// Dead entities keep moving and rendering until the reap sweep at the
    /// end of the current move pass removes them.
    fn is_dead(&self) -> bool {
        self.properties().is_dead()
    }

    fn set_dead(&mut self, dead: bool) {
        self.properties_mut().set_dead(dead);
    }

    /// Entities that answer true are handed to
    /// [`EntityContainer::handle_objects`](crate::EntityContainer::handle_objects)
    /// closures.
    fn is_input_handler(&self) -> bool {
        false
    }

    /// One-time setup, fired by the registry's initiation sweep on the
    /// first tick after registration.
    fn init(&mut self, _ctx: &SimContext) {}

    fn pre_move(&mut self, _ctx: &SimContext) {}

    fn post_move(&mut self, _ctx: &SimContext) {}

    /// Fired for every detected collision, before the axis-specific
    /// callback. Return true to report the collision handled and suppress
    /// the default policy response.
    fn on_collision(&mut self, _other: &mut dyn Entity, _ctx: &SimContext) -> bool {
        false
    }

    fn on_horizontal_collision(&mut self, _other: &mut dyn Entity, _ctx: &SimContext) -> bool {
        false
    }

    fn on_vertical_collision(&mut self, _other: &mut dyn Entity, _ctx: &SimContext) -> bool {
        false
    }
}
