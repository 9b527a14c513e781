//! Game state and core simulation types
//!
//! Entities are fixed-capacity arenas of parts linked by parent indices;
//! a part whose `parent_index` is its own index is the entity's anchor.
//! All containers are bounded and overflow is fatal.

use std::sync::{Arc, Mutex};

use glam::Vec2;
use rand::Rng;
use rand::SeedableRng;
use rand_pcg::Pcg32;

use crate::consts::*;
use crate::tuning::Tuning;

/// What an entity is, for collision rules and AI
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EntityKind {
    #[default]
    None,
    /// Driven by the input snapshot
    Player,
    /// Sprouts into food when it touches water
    Seed,
    /// Anchor plus a handful of droplet parts
    Water,
    /// Eaten by the worm
    Food,
    /// AI-driven, grows a tail part per meal
    Worm,
}

/// One mass point in an entity's tree of parts
#[derive(Debug, Clone)]
pub struct Part {
    /// Slot within the owning entity, kept in sync by compaction
    pub index: usize,
    /// Rest length of the spring to the parent
    pub length: f32,
    /// Collision/render box side length, centered on `p`
    pub size: f32,
    /// Drawn size; usually `size`
    pub render_size: f32,
    /// Palette index
    pub color: u16,
    /// Parent slot; self-reference marks the anchor
    pub parent_index: usize,
    pub mass: f32,
    pub p: Vec2,
    pub v: Vec2,
    pub a: Vec2,
    /// Collision impulses accumulate here and become acceleration next frame
    pub force: Vec2,
    /// Marked for removal; compacted out by the next pruning pass
    pub disposed: bool,
    /// Excluded from new event triggers for the rest of the frame
    pub suspended: bool,
}

impl Part {
    /// New part with mass defaulted to `size * size`
    pub fn new(index: usize, parent_index: usize, length: f32, size: f32, color: u16) -> Self {
        Self {
            index,
            length,
            size,
            render_size: size,
            color,
            parent_index,
            mass: size * size,
            p: Vec2::ZERO,
            v: Vec2::ZERO,
            a: Vec2::ZERO,
            force: Vec2::ZERO,
            disposed: false,
            suspended: false,
        }
    }

    /// Whether this part is its entity's anchor
    #[inline]
    pub fn is_root(&self) -> bool {
        self.parent_index == self.index
    }
}

/// A bounded tree of parts with a type tag
#[derive(Debug, Clone)]
pub struct Entity {
    /// Stable id, monotonic, never reused
    pub id: u32,
    /// Current slot in the world; changes on compaction
    pub index: usize,
    pub kind: EntityKind,
    pub parts: Vec<Part>,
    /// Whether parts of this entity collide with each other
    pub internal_collisions: bool,
    pub disposed: bool,
    pub suspended: bool,

    // Worm AI
    pub target: Vec2,
    pub target_entity_id: u32,
    pub target_entity_index: usize,
    pub has_target: bool,
    pub next_target_check_t: f32,
}

impl Entity {
    pub fn new(id: u32, index: usize, kind: EntityKind) -> Self {
        Self {
            id,
            index,
            kind,
            parts: Vec::with_capacity(MAX_PARTS),
            internal_collisions: false,
            disposed: false,
            suspended: false,
            target: Vec2::ZERO,
            target_entity_id: 0,
            target_entity_index: 0,
            has_target: false,
            next_target_check_t: 0.0,
        }
    }

    /// Append a part; the slot index is assigned here. Fatal past capacity.
    pub fn push_part(&mut self, mut part: Part) -> usize {
        assert!(
            self.parts.len() < MAX_PARTS,
            "entity {} exceeded part capacity",
            self.id
        );
        let index = self.parts.len();
        part.index = index;
        if part.parent_index == usize::MAX {
            part.parent_index = index;
        }
        self.parts.push(part);
        index
    }

    /// Room for one more part?
    #[inline]
    pub fn has_part_capacity(&self) -> bool {
        self.parts.len() < MAX_PARTS
    }

    /// The anchor part. Entities always have at least one part.
    #[inline]
    pub fn root(&self) -> &Part {
        &self.parts[0]
    }

    /// Live (non-disposed) part count
    pub fn live_parts(&self) -> usize {
        self.parts.iter().filter(|p| !p.disposed).count()
    }
}

/// Marker for "no parent yet"; `push_part` rewrites it to a self-reference
pub const SELF_PARENT: usize = usize::MAX;

/// Semantic collision, produced during the pairwise pass and applied once
/// after integration. Indices are world/entity slots valid for this frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameEvent {
    SeedTouchesWater {
        seed_entity: usize,
        water_entity: usize,
        water_part: usize,
    },
    WormEatsFood {
        worm_entity: usize,
        food_entity: usize,
    },
}

/// One oscillator descriptor
#[derive(Debug, Clone, Copy, Default)]
pub struct Voice {
    pub freq: f32,
    pub amp: f32,
}

/// The two oscillator banks shared with the audio mixer.
///
/// Writers and readers both hold the surrounding mutex so a reader can
/// never observe a torn bank/count pair.
#[derive(Debug, Default)]
pub struct WaveBanks {
    pub sine: Vec<Voice>,
    pub saw: Vec<Voice>,
}

/// Handle shared between the simulation and the audio callback
pub type SharedWaves = Arc<Mutex<WaveBanks>>;

/// Complete world state
#[derive(Debug)]
pub struct GameState {
    /// Elapsed seconds, fed from the host clock
    pub time: f32,

    // Level clock
    pub last_level_end_t: f32,
    pub tunnel_begin_t: f32,
    pub level_begin_t: f32,
    pub level_end_t: f32,
    /// Transition radius the renderer reads; derived every frame
    pub tunnel_size: f32,
    pub current_level: u32,

    // Note sequencer
    pub next_note_t: f32,
    pub note: f32,

    pub entities: Vec<Entity>,
    /// Cleared at the start of every frame
    pub events: Vec<GameEvent>,

    pub tuning: Tuning,
    pub rng: Pcg32,
    pub waves: SharedWaves,

    next_id: u32,
}

impl GameState {
    pub fn new(seed: u64) -> Self {
        Self::with_tuning(seed, Tuning::default())
    }

    pub fn with_tuning(seed: u64, tuning: Tuning) -> Self {
        let mut state = Self {
            time: 0.0,
            last_level_end_t: 0.0,
            tunnel_begin_t: 0.0,
            level_begin_t: 0.0,
            level_end_t: tuning.level_secs,
            tunnel_size: 0.0,
            current_level: 0,
            next_note_t: tuning.note_step_secs,
            note: 40.0,
            entities: Vec::with_capacity(MAX_ENTITIES),
            events: Vec::with_capacity(MAX_EVENTS),
            tuning,
            rng: Pcg32::seed_from_u64(seed),
            waves: Arc::new(Mutex::new(WaveBanks::default())),
            next_id: 1,
        };

        state.spawn_player(Vec2::new(WORLD_W * 0.25, WORLD_H * 0.5));
        state.spawn_worm(Vec2::new(WORLD_W * 0.75, WORLD_H * 0.5));
        state.populate_level();

        state
    }

    /// Allocate a stable entity id
    pub fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Push a fresh entity and return its slot. Fatal past capacity.
    pub fn alloc_entity(&mut self, kind: EntityKind) -> usize {
        assert!(
            self.entities.len() < MAX_ENTITIES,
            "entity capacity exceeded"
        );
        let id = self.next_entity_id();
        let index = self.entities.len();
        self.entities.push(Entity::new(id, index, kind));
        index
    }

    /// Queue an event for end-of-frame application. Fatal past capacity.
    pub fn push_event(&mut self, event: GameEvent) {
        assert!(self.events.len() < MAX_EVENTS, "event queue overflow");
        self.events.push(event);
    }

    /// Total live parts across all live entities, in traversal order
    pub fn live_part_count(&self) -> usize {
        self.entities
            .iter()
            .filter(|e| !e.disposed)
            .map(Entity::live_parts)
            .sum()
    }

    // === Spawn constructors ===

    /// The player creature: a large anchor with two trailing limb chains.
    pub fn spawn_player(&mut self, pos: Vec2) -> usize {
        let index = self.alloc_entity(EntityKind::Player);
        let entity = &mut self.entities[index];

        entity.push_part(Part::new(0, SELF_PARENT, 0.0, 50.0, 1));
        entity.push_part(Part::new(0, 0, 100.0, 25.0, 2));

        // First limb
        entity.push_part(Part::new(0, 0, 50.0, 25.0, 2));
        entity.push_part(Part::new(0, 2, 50.0, 20.0, 4));
        entity.push_part(Part::new(0, 3, 50.0, 20.0, 5));
        entity.push_part(Part::new(0, 4, 50.0, 20.0, 6));

        // Second limb
        entity.push_part(Part::new(0, 0, 60.0, 25.0, 2));
        entity.push_part(Part::new(0, 6, 60.0, 20.0, 4));
        entity.push_part(Part::new(0, 7, 60.0, 20.0, 5));
        entity.push_part(Part::new(0, 8, 60.0, 20.0, 6));

        place_parts(entity, pos);
        index
    }

    /// The worm: a head that hunts food and a tail that grows per meal.
    pub fn spawn_worm(&mut self, pos: Vec2) -> usize {
        let index = self.alloc_entity(EntityKind::Worm);
        let entity = &mut self.entities[index];

        entity.push_part(Part::new(0, SELF_PARENT, 0.0, 22.0, 5));
        for (i, size) in [18.0f32, 16.0, 14.0, 12.0].into_iter().enumerate() {
            entity.push_part(Part::new(0, i, 25.0, size, 6));
        }

        place_parts(entity, pos);
        index
    }

    /// A single-part seed
    pub fn spawn_seed(&mut self, pos: Vec2) -> usize {
        let index = self.alloc_entity(EntityKind::Seed);
        let entity = &mut self.entities[index];
        entity.push_part(Part::new(0, SELF_PARENT, 0.0, 14.0, 4));
        place_parts(entity, pos);
        index
    }

    /// A water cluster: an anchor and five loosely tethered droplets
    pub fn spawn_water(&mut self, pos: Vec2) -> usize {
        let index = self.alloc_entity(EntityKind::Water);
        let entity = &mut self.entities[index];
        entity.push_part(Part::new(0, SELF_PARENT, 0.0, 10.0, 1));
        for _ in 0..5 {
            entity.push_part(Part::new(0, 0, 30.0, 8.0, 6));
        }
        place_parts(entity, pos);
        index
    }

    /// A single-part food morsel
    pub fn spawn_food(&mut self, pos: Vec2) -> usize {
        let index = self.alloc_entity(EntityKind::Food);
        init_food(&mut self.entities[index], pos);
        index
    }

    /// Dispose leftover garden content and scatter fresh seeds and water.
    ///
    /// Player and worm persist across levels.
    pub fn populate_level(&mut self) {
        for entity in &mut self.entities {
            if matches!(
                entity.kind,
                EntityKind::Seed | EntityKind::Water | EntityKind::Food
            ) {
                entity.disposed = true;
            }
        }

        let margin = 80.0;
        for _ in 0..3 {
            let pos = self.random_world_pos(margin);
            self.spawn_seed(pos);
        }
        let pos = self.random_world_pos(margin);
        self.spawn_water(pos);

        log::debug!(
            "level {} populated, {} entities live",
            self.current_level,
            self.entities.iter().filter(|e| !e.disposed).count()
        );
    }

    fn random_world_pos(&mut self, margin: f32) -> Vec2 {
        Vec2::new(
            self.rng.random_range(margin..WORLD_W - margin),
            self.rng.random_range(margin..WORLD_H - margin),
        )
    }
}

/// (Re)initialize an entity in place as food. Used by `spawn_food` and by
/// the sprout transformation so both produce the same layout.
pub fn init_food(entity: &mut Entity, pos: Vec2) {
    entity.kind = EntityKind::Food;
    entity.internal_collisions = false;
    entity.disposed = false;
    entity.suspended = false;
    entity.has_target = false;
    entity.parts.clear();
    let mut morsel = Part::new(0, SELF_PARENT, 0.0, 16.0, 2);
    morsel.render_size = 20.0; // drawn plumper than its hitbox
    entity.push_part(morsel);
    place_parts(entity, pos);
}

/// Drop an entity's parts around `pos`: the anchor lands on it and children
/// fan out slightly so the springs settle instead of dividing by zero.
fn place_parts(entity: &mut Entity, pos: Vec2) {
    for part in &mut entity.parts {
        let spread = part.index as f32 * 6.0;
        part.p = if part.is_root() {
            pos
        } else {
            pos + Vec2::new(-spread, spread)
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_are_monotonic_and_unreused() {
        let mut state = GameState::new(7);
        let before = state.entities.iter().map(|e| e.id).collect::<Vec<_>>();
        let a = state.spawn_seed(Vec2::new(100.0, 100.0));
        let b = state.spawn_seed(Vec2::new(200.0, 100.0));
        assert!(state.entities[b].id > state.entities[a].id);
        assert!(before.iter().all(|&id| id < state.entities[a].id));
    }

    #[test]
    fn test_part_mass_defaults_to_size_squared() {
        let part = Part::new(0, SELF_PARENT, 0.0, 14.0, 4);
        assert_eq!(part.mass, 14.0 * 14.0);
    }

    #[test]
    fn test_anchor_is_self_parented() {
        let mut state = GameState::new(7);
        let idx = state.spawn_water(Vec2::new(300.0, 300.0));
        let water = &state.entities[idx];
        assert!(water.root().is_root());
        assert!(water.parts[1..].iter().all(|p| p.parent_index == 0));
    }

    #[test]
    fn test_food_initializer_matches_spawn() {
        let mut state = GameState::new(7);
        let spawned = state.spawn_food(Vec2::new(50.0, 60.0));
        let seed = state.spawn_seed(Vec2::new(50.0, 60.0));

        let (left, right) = state.entities.split_at_mut(seed);
        init_food(&mut right[0], Vec2::new(50.0, 60.0));

        let a = &left[spawned];
        let b = &right[0];
        assert_eq!(b.kind, EntityKind::Food);
        assert_eq!(a.parts.len(), b.parts.len());
        assert_eq!(a.parts[0].size, b.parts[0].size);
        assert_eq!(a.parts[0].color, b.parts[0].color);
        assert_eq!(a.parts[0].mass, b.parts[0].mass);
    }

    #[test]
    fn test_populate_level_disposes_garden_only() {
        let mut state = GameState::new(7);
        state.populate_level();
        for entity in &state.entities {
            match entity.kind {
                EntityKind::Player | EntityKind::Worm => assert!(!entity.disposed),
                _ => {}
            }
        }
        // Fresh content was spawned on top of the disposed batch
        let live_seeds = state
            .entities
            .iter()
            .filter(|e| e.kind == EntityKind::Seed && !e.disposed)
            .count();
        assert_eq!(live_seeds, 3);
    }
}
