//! Semantic collision rules and event application
//!
//! Rules fire during the pairwise collision pass and queue events; the
//! queue is applied once after integration and cleared at the next frame
//! start. Participants are suspended the moment a rule fires so the same
//! contact cannot queue twice within a frame.

use glam::Vec2;

use super::state::{init_food, EntityKind, GameEvent, GameState, Part};
use crate::consts::MAX_PARTS;

/// Evaluate the interaction rules for a colliding pair, in both orderings.
pub fn check_pair(state: &mut GameState, e1: usize, p1: usize, e2: usize, p2: usize) {
    {
        let a = &state.entities[e1];
        let b = &state.entities[e2];
        if a.suspended || b.suspended || a.parts[p1].suspended || b.parts[p2].suspended {
            return;
        }
    }

    if try_rule(state, e1, p1, e2, p2) {
        return;
    }
    try_rule(state, e2, p2, e1, p1);
}

fn try_rule(state: &mut GameState, ea: usize, pa: usize, eb: usize, pb: usize) -> bool {
    let ka = state.entities[ea].kind;
    let kb = state.entities[eb].kind;

    match (ka, kb) {
        // Droplets only; the cluster anchor is not consumable
        (EntityKind::Seed, EntityKind::Water) if pb != 0 => {
            state.push_event(GameEvent::SeedTouchesWater {
                seed_entity: ea,
                water_entity: eb,
                water_part: pb,
            });
            state.entities[ea].suspended = true;
            state.entities[eb].parts[pb].suspended = true;
            true
        }
        // Only the worm's head eats
        (EntityKind::Worm, EntityKind::Food) if pa == 0 => {
            state.push_event(GameEvent::WormEatsFood {
                worm_entity: ea,
                food_entity: eb,
            });
            state.entities[eb].suspended = true;
            true
        }
        _ => false,
    }
}

/// Apply and drain the frame's queued events.
pub fn apply_events(state: &mut GameState) {
    let mut queue = std::mem::take(&mut state.events);
    for event in queue.drain(..) {
        match event {
            GameEvent::SeedTouchesWater {
                seed_entity,
                water_entity,
                water_part,
            } => {
                state.entities[water_entity].parts[water_part].disposed = true;
                let pos = state.entities[seed_entity].root().p;
                init_food(&mut state.entities[seed_entity], pos);
                log::debug!("seed sprouted at ({:.0}, {:.0})", pos.x, pos.y);
            }
            GameEvent::WormEatsFood {
                worm_entity,
                food_entity,
            } => {
                state.entities[food_entity].disposed = true;
                grow_worm(state, worm_entity);
                log::debug!(
                    "worm ate food, {} parts now",
                    state.entities[worm_entity].parts.len()
                );
            }
        }
    }
    // Hand the (empty) buffer back so its capacity survives
    state.events = queue;
}

/// Append one tail part to the worm, 25 units past the current tail tip.
/// Silently skipped once the worm is at capacity.
fn grow_worm(state: &mut GameState, worm_entity: usize) {
    let cap = state.tuning.worm_max_parts.min(MAX_PARTS);
    let entity = &mut state.entities[worm_entity];
    if entity.parts.len() >= cap || !entity.has_part_capacity() {
        return;
    }

    let last = entity.parts.len() - 1;
    let tip = &entity.parts[last];
    let size = (tip.size - 1.0).max(6.0);
    let along = (tip.p - entity.parts[tip.parent_index].p).normalize_or_zero();
    let along = if along == Vec2::ZERO {
        Vec2::new(0.0, 1.0)
    } else {
        along
    };
    let pos = tip.p + along * 25.0;

    let mut part = Part::new(0, last, 25.0, size, 6);
    part.p = pos;
    entity.push_part(part);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::state::EntityKind;

    fn garden_state() -> GameState {
        let mut state = GameState::new(3);
        state.entities.clear();
        state
    }

    #[test]
    fn test_seed_water_rule_fires_once_per_frame() {
        let mut state = garden_state();
        let seed = state.spawn_seed(Vec2::new(100.0, 100.0));
        let water = state.spawn_water(Vec2::new(100.0, 100.0));

        check_pair(&mut state, seed, 0, water, 1);
        assert_eq!(state.events.len(), 1);
        assert!(state.entities[seed].suspended);
        assert!(state.entities[water].parts[1].suspended);

        // Same seed against another droplet is gated by the suspension
        check_pair(&mut state, seed, 0, water, 2);
        assert_eq!(state.events.len(), 1);
    }

    #[test]
    fn test_rule_is_symmetric() {
        let mut state = garden_state();
        let seed = state.spawn_seed(Vec2::new(100.0, 100.0));
        let water = state.spawn_water(Vec2::new(100.0, 100.0));

        // Water listed first still triggers the sprout
        check_pair(&mut state, water, 3, seed, 0);
        assert_eq!(state.events.len(), 1);
        assert!(matches!(
            state.events[0],
            GameEvent::SeedTouchesWater { water_part: 3, .. }
        ));
    }

    #[test]
    fn test_worm_tail_does_not_eat() {
        let mut state = garden_state();
        let worm = state.spawn_worm(Vec2::new(100.0, 100.0));
        let food = state.spawn_food(Vec2::new(120.0, 100.0));

        check_pair(&mut state, worm, 2, food, 0);
        assert!(state.events.is_empty());

        check_pair(&mut state, worm, 0, food, 0);
        assert_eq!(state.events.len(), 1);
    }

    #[test]
    fn test_sprout_transforms_seed_and_disposes_droplet() {
        let mut state = garden_state();
        let seed = state.spawn_seed(Vec2::new(100.0, 100.0));
        let water = state.spawn_water(Vec2::new(100.0, 100.0));
        let reference = state.spawn_food(Vec2::new(500.0, 500.0));

        check_pair(&mut state, seed, 0, water, 2);
        apply_events(&mut state);

        assert!(state.entities[water].parts[2].disposed);
        let sprouted = &state.entities[seed];
        let food = &state.entities[reference];
        assert_eq!(sprouted.kind, EntityKind::Food);
        assert_eq!(sprouted.parts.len(), food.parts.len());
        assert_eq!(sprouted.parts[0].size, food.parts[0].size);
        assert_eq!(sprouted.parts[0].color, food.parts[0].color);
        assert!(state.events.is_empty());
    }

    #[test]
    fn test_worm_grows_one_part_per_meal() {
        let mut state = garden_state();
        let worm = state.spawn_worm(Vec2::new(100.0, 100.0));
        let food = state.spawn_food(Vec2::new(120.0, 100.0));
        let before = state.entities[worm].parts.len();

        check_pair(&mut state, worm, 0, food, 0);
        apply_events(&mut state);

        let grown = &state.entities[worm];
        assert_eq!(grown.parts.len(), before + 1);
        let tail = grown.parts.last().unwrap();
        assert_eq!(tail.parent_index, before - 1);
        assert_eq!(tail.length, 25.0);
        assert_eq!(tail.mass, tail.size * tail.size);
        assert!(state.entities[food].disposed);
    }

    #[test]
    fn test_full_worm_skips_growth() {
        let mut state = garden_state();
        let worm = state.spawn_worm(Vec2::new(100.0, 100.0));
        let cap = state.tuning.worm_max_parts;
        while state.entities[worm].parts.len() < cap {
            let food = state.spawn_food(Vec2::new(120.0, 100.0));
            check_pair(&mut state, worm, 0, food, 0);
            apply_events(&mut state);
            state.entities.truncate(1); // drop the eaten food slot
        }

        let food = state.spawn_food(Vec2::new(120.0, 100.0));
        check_pair(&mut state, worm, 0, food, 0);
        apply_events(&mut state);
        assert_eq!(state.entities[worm].parts.len(), cap);
        assert!(state.entities[food].disposed);
    }
}
