use std::collections::BTreeMap;

use fxhash::{FxHashMap, FxHashSet};
use log::{debug, trace};
use slotmap::{new_key_type, SlotMap};

use common::ids::EntityId;
use common::properties::Areas;
use common::shapes::{EntityShape, MapArea};

use crate::detector::CollisionDetector;
use crate::entity::{Entity, SimContext};

new_key_type! {
    /// Stable arena handle for a registered entity.
    pub struct EntityKey;
}

/// Render/update layer identifier. Layers control render ordering only;
/// physics iterates the full entity set regardless of layer.
pub type Layer = i32;

/// The layer every entity lands on unless told otherwise.
pub const DEFAULT_LAYER: Layer = -1;

const DEFAULT_PARTITION_DIMENSION: i32 = 100;

/// Owns every registered entity and drives per-tick movement, collision
/// handling and lifecycle sequencing.
///
/// Entities live in a slot-map arena. Every auxiliary structure (the id
/// map, layer buckets, collidable and input-handler sets, and the uniform
/// grid of spatial partitions) stores copyable ids and keys only, so
/// nothing dangles across reaps. Registration takes ownership;
/// [`unregister`](Self::unregister) gives it back.
pub struct EntityContainer {
    pub(crate) objects: SlotMap<EntityKey, Box<dyn Entity>>,
    ids: BTreeMap<EntityId, EntityKey>,
    layers: BTreeMap<Layer, FxHashSet<EntityId>>,
    collidables: FxHashSet<EntityId>,
    input_handlers: FxHashSet<EntityId>,
    uninitiated: FxHashSet<EntityId>,
    partitions: FxHashMap<MapArea, FxHashSet<EntityId>>,
    partition_dimension: i32,
    delta_time: f32,
}

impl EntityContainer {
    pub fn new() -> Self {
        let mut layers = BTreeMap::new();
        layers.insert(DEFAULT_LAYER, FxHashSet::default());
        EntityContainer {
            objects: SlotMap::with_key(),
            ids: BTreeMap::new(),
            layers,
            collidables: FxHashSet::default(),
            input_handlers: FxHashSet::default(),
            uninitiated: FxHashSet::default(),
            partitions: FxHashMap::default(),
            partition_dimension: DEFAULT_PARTITION_DIMENSION,
            delta_time: 1.0,
        }
    }

    /// Add a layer that entities can then be registered to. Adding the
    /// same layer twice has no effect.
    pub fn add_layer(&mut self, layer: Layer) {
        self.layers.entry(layer).or_default();
    }

    pub fn layer_keys(&self) -> Vec<Layer> {
        self.layers.keys().copied().collect()
    }

    /// Register an entity on the default layer. See
    /// [`register_on_layer`](Self::register_on_layer).
    pub fn register(&mut self, entity: Box<dyn Entity>) -> Option<Box<dyn Entity>> {
        self.register_on_layer(entity, DEFAULT_LAYER)
    }

    /// Register an entity, taking ownership. Registration is silently
    /// rejected, with the entity handed straight back, when its id is
    /// already registered or the layer was never added.
    pub fn register_on_layer(
        &mut self,
        entity: Box<dyn Entity>,
        layer: Layer,
    ) -> Option<Box<dyn Entity>> {
        let id = entity.id();
        if self.ids.contains_key(&id) || !self.layers.contains_key(&layer) {
            return Some(entity);
        }

        let collidable = entity.properties().is_collidable();
        let input_handler = entity.is_input_handler();

        let key = self.objects.insert(entity);
        self.ids.insert(id, key);
        self.uninitiated.insert(id);
        if let Some(bucket) = self.layers.get_mut(&layer) {
            bucket.insert(id);
        }
        if input_handler {
            self.input_handlers.insert(id);
        }
        if collidable {
            self.collidables.insert(id);
        }
        self.register_to_partitions(key);

        debug!("registered entity {} on layer {}", id, layer);
        None
    }

    /// Remove an entity from every structure and return it; the caller
    /// owns disposal. Unregistering a non-member is a no-op.
    pub fn unregister(&mut self, id: EntityId) -> Option<Box<dyn Entity>> {
        let key = self.ids.remove(&id)?;
        self.input_handlers.remove(&id);
        self.uninitiated.remove(&id);
        self.collidables.remove(&id);
        self.clear_from_partitions(key);
        for bucket in self.layers.values_mut() {
            bucket.remove(&id);
        }

        debug!("unregistered entity {}", id);
        self.objects.remove(key)
    }

    /// Drop every registered entity and reset the layer map.
    pub fn unregister_all(&mut self) {
        self.objects.clear();
        self.ids.clear();
        self.collidables.clear();
        self.input_handlers.clear();
        self.uninitiated.clear();
        self.partitions.clear();
        self.layers.clear();
        self.layers.insert(DEFAULT_LAYER, FxHashSet::default());
    }

    /// Drop every entity registered to one layer.
    pub fn unregister_all_on_layer(&mut self, layer: Layer) {
        let ids: Vec<EntityId> = match self.layers.get_mut(&layer) {
            Some(bucket) => bucket.drain().collect(),
            None => return,
        };
        for id in ids {
            if let Some(key) = self.ids.remove(&id) {
                self.input_handlers.remove(&id);
                self.uninitiated.remove(&id);
                self.collidables.remove(&id);
                self.clear_from_partitions(key);
                self.objects.remove(key);
            }
        }
    }

    pub fn object_count(&self) -> usize {
        self.objects.len()
    }

    pub fn object_count_on_layer(&self, layer: Layer) -> usize {
        self.layers.get(&layer).map_or(0, |bucket| bucket.len())
    }

    pub fn collidables_count(&self) -> usize {
        self.collidables.len()
    }

    /// Number of spatial-partition cells created so far.
    pub fn partition_count(&self) -> usize {
        self.partitions.len()
    }

    /// Cell size of the spatial-partition grid. Defaults to 100 units.
    pub fn set_partition_dimension(&mut self, dimension: i32) {
        self.partition_dimension = dimension;
    }

    pub fn key_of(&self, id: EntityId) -> Option<EntityKey> {
        self.ids.get(&id).copied()
    }

    pub fn get(&self, key: EntityKey) -> Option<&dyn Entity> {
        self.objects.get(key).map(|entity| entity.as_ref())
    }

    pub fn get_mut(&mut self, key: EntityKey) -> Option<&mut (dyn Entity + 'static)> {
        self.objects.get_mut(key).map(|entity| entity.as_mut())
    }

    /// Re-derive the collidable set, picking up entities whose collidable
    /// flag changed after registration.
    pub fn repopulate_collidables(&mut self) {
        self.collidables.clear();
        for entity in self.objects.values() {
            if entity.properties().is_collidable() {
                self.collidables.insert(entity.id());
            }
        }
    }

    /// Fire the init hook on every entity registered since the last sweep
    /// and mark it initiated. Uninitiated entities are skipped by the
    /// movement and input passes.
    pub fn initiate_entities(&mut self, ctx: &SimContext) {
        let pending: Vec<EntityId> = self.uninitiated.drain().collect();
        for id in pending {
            if let Some(&key) = self.ids.get(&id) {
                if let Some(entity) = self.objects.get_mut(key) {
                    entity.init(ctx);
                }
            }
        }
    }

    /// Drive every initiated input handler with a game-supplied closure.
    /// The core carries no event type; feed whatever the platform layer
    /// produced through the closure.
    pub fn handle_objects<F: FnMut(&mut dyn Entity)>(&mut self, mut f: F) {
        let handlers: Vec<EntityKey> = self
            .input_handlers
            .iter()
            .filter(|id| !self.uninitiated.contains(*id))
            .filter_map(|id| self.ids.get(id).copied())
            .collect();
        for key in handlers {
            if let Some(entity) = self.objects.get_mut(key) {
                f(entity.as_mut());
            }
        }
    }

    /// Run one simulation tick over every initiated entity, in id order:
    /// pre-move hook, collision handling for moving collidables, movement,
    /// post-move hook, re-syncing partition membership after each step
    /// that can dirty it. Dead entities are reaped once the full pass is
    /// done.
    pub fn move_objects(&mut self, detector: &CollisionDetector, delta_time: f32) {
        self.delta_time = delta_time;
        let ctx = SimContext { delta_time };

        let keys: Vec<EntityKey> = self.ids.values().copied().collect();
        for key in keys {
            let id = match self.objects.get(key) {
                Some(entity) => entity.id(),
                None => continue,
            };
            if self.uninitiated.contains(&id) {
                continue;
            }

            if let Some(entity) = self.objects.get_mut(key) {
                entity.pre_move(&ctx);
            }
            self.sync_partitions(key);

            let (moving, collidable) = match self.objects.get(key) {
                Some(entity) => {
                    let props = entity.properties();
                    (props.is_moving(), props.is_collidable())
                }
                None => continue,
            };
            if moving {
                if collidable {
                    detector.handle_possible_collisions_for(self, key, &ctx);
                }
                if let Some(entity) = self.objects.get_mut(key) {
                    entity.properties_mut().advance(delta_time);
                }
                self.sync_partitions(key);
            }

            if let Some(entity) = self.objects.get_mut(key) {
                entity.post_move(&ctx);
            }
            self.sync_partitions(key);
        }

        self.clear_dead_objects();
    }

    /// Visit every collidable sharing a spatial partition with the given
    /// entity, nearest first.
    pub fn iterate_collidables_for<F: FnMut(&mut dyn Entity)>(&mut self, key: EntityKey, mut f: F) {
        for other in self.collidable_neighbours(key) {
            if let Some(entity) = self.objects.get_mut(other) {
                f(entity.as_mut());
            }
        }
    }

    /// First entity matching the predicate, scanning every registered
    /// object in id order.
    pub fn check_all_objects<F>(&self, mut f: F) -> Option<&dyn Entity>
    where
        F: FnMut(&dyn Entity) -> bool,
    {
        for key in self.ids.values() {
            if let Some(entity) = self.objects.get(*key) {
                if f(entity.as_ref()) {
                    return Some(entity.as_ref());
                }
            }
        }
        None
    }

    /// First collidable matching the predicate.
    pub fn check_all_collidables<F>(&self, mut f: F) -> Option<&dyn Entity>
    where
        F: FnMut(&dyn Entity) -> bool,
    {
        for key in self.ids.values() {
            if let Some(entity) = self.objects.get(*key) {
                if entity.properties().is_collidable() && f(entity.as_ref()) {
                    return Some(entity.as_ref());
                }
            }
        }
        None
    }

    /// First collidable within the entity's partitions matching the
    /// predicate.
    pub fn check_collidables_for<F>(&self, key: EntityKey, mut f: F) -> Option<&dyn Entity>
    where
        F: FnMut(&dyn Entity) -> bool,
    {
        for other in self.collidable_neighbours(key) {
            if let Some(entity) = self.objects.get(other) {
                if f(entity.as_ref()) {
                    return Some(entity.as_ref());
                }
            }
        }
        None
    }

    /// Collidable entities sharing a partition cell with `key`, sorted by
    /// distance between collider centers (id as tiebreak), self excluded,
    /// deduped across cells.
    pub(crate) fn collidable_neighbours(&self, key: EntityKey) -> Vec<EntityKey> {
        let Some(entity) = self.objects.get(key) else {
            return Vec::new();
        };
        let props = entity.properties();
        let source_id = props.id();
        let shape = props.collider_shape();
        let sx = (shape.x + shape.w / 2) as f32;
        let sy = (shape.y + shape.h / 2) as f32;

        let mut seen: FxHashSet<EntityId> = FxHashSet::default();
        let mut candidates: Vec<(f32, EntityId, EntityKey)> = Vec::new();
        for area in props.current_areas() {
            let Some(cell) = self.partitions.get(area) else {
                continue;
            };
            for &other_id in cell {
                if other_id == source_id || !seen.insert(other_id) {
                    continue;
                }
                let Some(&other_key) = self.ids.get(&other_id) else {
                    continue;
                };
                let Some(other) = self.objects.get(other_key) else {
                    continue;
                };
                let other_props = other.properties();
                if !other_props.is_collidable() {
                    continue;
                }

                let target = other_props.collider_shape();
                let tx = (target.x + target.w / 2) as f32;
                let ty = (target.y + target.h / 2) as f32;
                let distance = ((sx - tx).powi(2) + (sy - ty).powi(2)).sqrt();
                candidates.push((distance, other_id, other_key));
            }
        }

        candidates.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)));
        candidates.into_iter().map(|(_, _, key)| key).collect()
    }

    /// Re-sync the entity's partition membership if its location-changed
    /// flag is set, then clear the flag.
    pub(crate) fn sync_partitions(&mut self, key: EntityKey) {
        let changed = match self.objects.get(key) {
            Some(entity) => entity.properties().has_location_changed(),
            None => false,
        };
        if !changed {
            return;
        }

        self.clear_from_partitions(key);
        self.register_to_partitions(key);
        if let Some(entity) = self.objects.get_mut(key) {
            entity.properties_mut().set_location_changed(false);
            trace!("resynced partitions for entity {}", entity.id());
        }
    }

    fn bounding_box_for(&self, key: EntityKey) -> Option<(EntityId, EntityShape)> {
        let entity = self.objects.get(key)?;
        let props = entity.properties();
        if !props.is_collidable() {
            return None;
        }
        Some((props.id(), props.velocity_collider_shape(self.delta_time)))
    }

    /// Index a collidable entity into every grid cell its velocity-expanded
    /// collider overlaps, computed as the exact inclusive cell range, so
    /// recorded membership always equals the true overlap set.
    fn register_to_partitions(&mut self, key: EntityKey) {
        let Some((id, bounds)) = self.bounding_box_for(key) else {
            return;
        };

        let dim = self.partition_dimension;
        let min_cx = bounds.x.div_euclid(dim);
        let max_cx = (bounds.x + bounds.w).div_euclid(dim);
        let min_cy = bounds.y.div_euclid(dim);
        let max_cy = (bounds.y + bounds.h).div_euclid(dim);

        let mut areas = Areas::new();
        for cy in min_cy..=max_cy {
            for cx in min_cx..=max_cx {
                let area = MapArea::new(cx * dim, cy * dim, dim);
                self.partitions.entry(area).or_default().insert(id);
                areas.push(area);
            }
        }

        if let Some(entity) = self.objects.get_mut(key) {
            let props = entity.properties_mut();
            *props.current_areas_mut() = areas;
            props.set_location_changed(false);
        }
    }

    fn clear_from_partitions(&mut self, key: EntityKey) {
        let Some(entity) = self.objects.get_mut(key) else {
            return;
        };
        let id = entity.properties().id();
        let areas = std::mem::take(entity.properties_mut().current_areas_mut());
        for area in areas {
            if let Some(cell) = self.partitions.get_mut(&area) {
                cell.remove(&id);
            }
        }
    }

    fn clear_dead_objects(&mut self) {
        let dead: Vec<EntityId> = self
            .objects
            .values()
            .filter(|entity| entity.is_dead())
            .map(|entity| entity.id())
            .collect();
        for id in dead {
            if let Some(key) = self.ids.remove(&id) {
                self.collidables.remove(&id);
                self.input_handlers.remove(&id);
                self.uninitiated.remove(&id);
                for bucket in self.layers.values_mut() {
                    bucket.remove(&id);
                }
                self.clear_from_partitions(key);
                self.objects.remove(key);
                debug!("reaped dead entity {}", id);
            }
        }
    }
}

impl Default for EntityContainer {
    fn default() -> Self {
        Self::new()
    }
}
