//! Spring constraints, integration and the pairwise collision pass
//!
//! Parts chase the point at rest length along the line to their parent;
//! the reaction pushes the parent back, weighted by both masses. Collision
//! impulses are banked in each part's `force` accumulator and only become
//! acceleration on the following frame.

use glam::Vec2;

use super::collision::test_box_collision;
use super::events;
use super::state::GameState;
use crate::consts::{WORLD_H, WORLD_W};

/// Clear per-frame flags and seed accelerations from the impulses banked
/// last frame. Runs before AI and input so both add on top.
pub fn begin_frame(state: &mut GameState) {
    for entity in &mut state.entities {
        entity.suspended = false;
        for part in &mut entity.parts {
            part.suspended = false;
            part.a = part.force / part.mass;
            part.force = Vec2::ZERO;
        }
    }
}

/// Accumulate spring accelerations toward each part's ideal anchor, the
/// mass-weighted reaction on the parent, and velocity damping on every
/// part. Anchors (self-parented parts) get only the damping term.
pub fn accumulate_springs(state: &mut GameState) {
    let spring_k = state.tuning.spring_k;
    let damping = state.tuning.damping;

    for entity in &mut state.entities {
        for i in 0..entity.parts.len() {
            let part = &entity.parts[i];
            let damp = part.v * -damping;
            entity.parts[i].a += damp;

            let part = &entity.parts[i];
            if part.is_root() {
                continue;
            }

            let parent_index = part.parent_index;
            let parent = &entity.parts[parent_index];
            let offset = part.p - parent.p;
            let ideal = parent.p + offset.normalize_or_zero() * part.length;
            let force = (ideal - part.p) * spring_k;

            let mass = part.mass;
            let parent_mass = parent.mass;
            entity.parts[i].a += force / mass;
            entity.parts[parent_index].a -= force / parent_mass;
        }
    }
}

/// Rescale `v` onto the speed cap, keeping its direction.
#[inline]
pub fn clamp_speed(v: Vec2, max: f32) -> Vec2 {
    let speed = v.length();
    if speed > max { v * (max / speed) } else { v }
}

/// Integrate every part semi-implicitly and resolve collisions against all
/// other parts in slot order.
///
/// The candidate position/velocity mutate in place through the obstacle
/// loop, so simultaneous contacts compose sequentially; the first
/// processed pair wins where they disagree. The edge response's velocity
/// change is discarded in favor of a banked impulse pair along the final
/// swept direction.
pub fn integrate_and_collide(state: &mut GameState) {
    let max_speed = state.tuning.max_speed;
    let normal_damping = state.tuning.normal_damping;
    let restitution = state.tuning.wall_restitution;

    let entity_count = state.entities.len();
    for ei in 0..entity_count {
        let part_count = state.entities[ei].parts.len();
        for pi in 0..part_count {
            let (p, v, a, size) = {
                let part = &state.entities[ei].parts[pi];
                (part.p, part.v, part.a, part.size)
            };

            let mut new_v = clamp_speed(v + a, max_speed);
            let mut new_p = p + new_v;

            let internal = state.entities[ei].internal_collisions;
            for oj in 0..entity_count {
                if oj == ei && !internal {
                    continue;
                }
                let obstacle_count = state.entities[oj].parts.len();
                for oq in 0..obstacle_count {
                    if oj == ei && oq == pi {
                        continue;
                    }
                    let (ob_p, ob_size) = {
                        let ob = &state.entities[oj].parts[oq];
                        (ob.p, ob.size)
                    };

                    let orig_new_v = new_v;
                    if !test_box_collision(
                        ob_p,
                        ob_size,
                        size,
                        p,
                        &mut new_p,
                        &mut new_v,
                        normal_damping,
                    ) {
                        continue;
                    }

                    events::check_pair(state, ei, pi, oj, oq);

                    // Keep the position correction, drop the velocity one;
                    // momentum is exchanged through the force accumulators
                    // instead and lands next frame.
                    new_v = orig_new_v;
                    let dir = new_v.normalize_or_zero();

                    let m1 = state.entities[ei].parts[pi].mass;
                    let m2 = state.entities[oj].parts[oq].mass;
                    let v1 = new_v.dot(dir);
                    let v2 = state.entities[oj].parts[oq].v.dot(dir);
                    let dv = v1 - v2;
                    let f1 = -dv * m2 / (m1 + m2) * 2.0;
                    let f2 = dv * m1 / (m1 + m2) * 2.0;
                    state.entities[ei].parts[pi].force += dir * f1;
                    state.entities[oj].parts[oq].force += dir * f2;
                }
            }

            new_v = clamp_speed(new_v, max_speed);

            if new_p.x.is_nan() {
                new_p.x = 0.0;
            }
            if new_p.y.is_nan() {
                new_p.y = 0.0;
            }

            // Inelastic rebound off the level bounds
            let mut new_a = a;
            if new_p.x < 0.0 {
                new_p.x = 0.0;
                new_v.x = -new_v.x * restitution;
                new_a.x = 0.0;
            } else if new_p.x > WORLD_W {
                new_p.x = WORLD_W;
                new_v.x = -new_v.x * restitution;
                new_a.x = 0.0;
            }
            if new_p.y < 0.0 {
                new_p.y = 0.0;
                new_v.y = -new_v.y * restitution;
                new_a.y = 0.0;
            } else if new_p.y > WORLD_H {
                new_p.y = WORLD_H;
                new_v.y = -new_v.y * restitution;
                new_a.y = 0.0;
            }

            let part = &mut state.entities[ei].parts[pi];
            part.p = new_p;
            part.v = new_v;
            part.a = new_a;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::state::{EntityKind, Part, SELF_PARENT};
    use proptest::prelude::*;

    fn empty_state() -> GameState {
        let mut state = GameState::new(1);
        state.entities.clear();
        state
    }

    fn two_part_entity(state: &mut GameState, root_p: Vec2, child_p: Vec2) -> usize {
        let idx = state.alloc_entity(EntityKind::None);
        let entity = &mut state.entities[idx];
        entity.push_part(Part::new(0, SELF_PARENT, 0.0, 40.0, 1));
        entity.push_part(Part::new(0, 0, 50.0, 20.0, 2));
        entity.parts[0].p = root_p;
        entity.parts[1].p = child_p;
        idx
    }

    #[test]
    fn test_spring_pulls_toward_ideal_anchor() {
        let mut state = empty_state();
        // Child stretched to 100 units, rest length 50
        let idx = two_part_entity(&mut state, Vec2::new(200.0, 200.0), Vec2::new(300.0, 200.0));
        accumulate_springs(&mut state);

        let child = &state.entities[idx].parts[1];
        let toward_parent = Vec2::new(-1.0, 0.0);
        assert!(child.a.dot(toward_parent) > 0.0);
        // Reaction pushes the parent the other way
        let root = &state.entities[idx].parts[0];
        assert!(root.a.dot(toward_parent) < 0.0);
    }

    #[test]
    fn test_spring_skips_anchor_and_survives_coincident_parts() {
        let mut state = empty_state();
        // Child exactly on top of its parent: normalize must not blow up
        let idx = two_part_entity(&mut state, Vec2::new(200.0, 200.0), Vec2::new(200.0, 200.0));
        accumulate_springs(&mut state);

        for part in &state.entities[idx].parts {
            assert!(part.a.x.is_finite() && part.a.y.is_finite());
        }
        assert_eq!(state.entities[idx].parts[0].a, Vec2::ZERO);
    }

    #[test]
    fn test_banked_force_becomes_acceleration_next_frame() {
        let mut state = empty_state();
        let idx = two_part_entity(&mut state, Vec2::new(200.0, 200.0), Vec2::new(250.0, 200.0));
        let mass = state.entities[idx].parts[0].mass;
        state.entities[idx].parts[0].force = Vec2::new(3.0 * mass, 0.0);

        begin_frame(&mut state);
        assert_eq!(state.entities[idx].parts[0].a, Vec2::new(3.0, 0.0));
        assert_eq!(state.entities[idx].parts[0].force, Vec2::ZERO);
    }

    #[test]
    fn test_bounds_rebound_is_inelastic() {
        let mut state = empty_state();
        let idx = two_part_entity(&mut state, Vec2::new(2.0, 200.0), Vec2::new(52.0, 200.0));
        state.entities[idx].parts[0].v = Vec2::new(-8.0, 0.0);

        integrate_and_collide(&mut state);

        let root = &state.entities[idx].parts[0];
        assert_eq!(root.p.x, 0.0);
        assert!((root.v.x - 8.0 * state.tuning.wall_restitution).abs() < 1e-4);
        assert_eq!(root.a.x, 0.0);
    }

    #[test]
    fn test_nan_position_resets_to_origin() {
        let mut state = empty_state();
        let idx = two_part_entity(&mut state, Vec2::new(200.0, 200.0), Vec2::new(250.0, 200.0));
        state.entities[idx].parts[1].p = Vec2::new(f32::NAN, 200.0);

        integrate_and_collide(&mut state);

        let child = &state.entities[idx].parts[1];
        assert_eq!(child.p.x, 0.0);
        assert!(child.p.y.is_finite());
    }

    proptest! {
        #[test]
        fn prop_speed_never_exceeds_cap(
            ax in -100.0f32..100.0,
            ay in -100.0f32..100.0,
            vx in -50.0f32..50.0,
            vy in -50.0f32..50.0,
        ) {
            let mut state = empty_state();
            let idx = two_part_entity(
                &mut state,
                Vec2::new(400.0, 300.0),
                Vec2::new(450.0, 300.0),
            );
            state.entities[idx].parts[0].v = Vec2::new(vx, vy);
            state.entities[idx].parts[0].a = Vec2::new(ax, ay);

            integrate_and_collide(&mut state);

            let max = state.tuning.max_speed;
            for part in &state.entities[idx].parts {
                prop_assert!(part.v.length() <= max * (1.0 + 1e-4));
            }
        }

        #[test]
        fn prop_clamp_preserves_direction(vx in -1000.0f32..1000.0, vy in -1000.0f32..1000.0) {
            let v = Vec2::new(vx, vy);
            let clamped = clamp_speed(v, 10.0);
            prop_assert!(clamped.length() <= 10.0 * (1.0 + 1e-4));
            if v.length() > 1e-3 {
                let cos = clamped.normalize_or_zero().dot(v.normalize_or_zero());
                prop_assert!(cos > 0.999);
            }
        }
    }
}
