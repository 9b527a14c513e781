//! Swept collision tests for moving mass points
//!
//! Movement over a frame is treated as a line segment from the current
//! position to the candidate position. Obstacles are axis-aligned boxes
//! inflated by the moving part's extent (a Minkowski sum), so every test
//! reduces to segment-vs-segment intersection. Part sizes are full side
//! lengths; boxes are centered, so the inflated half-extent is
//! `(obstacle.size + part.size) / 2`.

use glam::Vec2;

/// Parametric result of intersecting two segments.
///
/// `t1`/`t2` are the parameters along the first and second segment; the
/// segments touch iff both lie in [0, 1]. Parallel or degenerate input
/// produces non-finite parameters, which fail that range check.
#[derive(Debug, Clone, Copy)]
pub struct SegmentHit {
    pub t1: f32,
    pub t2: f32,
    pub hit: bool,
}

/// Solve the 2x2 system for the crossing of segments `p1..p2` and `p3..p4`.
pub fn intersect_segments(p1: Vec2, p2: Vec2, p3: Vec2, p4: Vec2) -> SegmentHit {
    let d1 = p2 - p1;
    let d2 = p4 - p3;
    let diff = p3 - p1;

    let denom = d1.x * d2.y - d1.y * d2.x;
    let t1 = (diff.x * d2.y - diff.y * d2.x) / denom;
    let t2 = (diff.x * d1.y - diff.y * d1.x) / denom;

    // NaN/Inf parameters compare false here, so degenerate input misses
    let hit = (0.0..=1.0).contains(&t1) && (0.0..=1.0).contains(&t2);
    SegmentHit { t1, t2, hit }
}

/// Test the swept move `p -> new_p` against the wall segment `w1..w2`.
///
/// On a hit the candidate velocity keeps its tangential component and gets
/// a damped, reflected normal component; the candidate position is placed
/// at the crossing, one unit out along `normal`. A secondary probe one
/// unit along `normal` catches points that already sit just past the wall.
pub fn test_line_collision(
    p: Vec2,
    w1: Vec2,
    w2: Vec2,
    normal: Vec2,
    new_p: &mut Vec2,
    new_v: &mut Vec2,
    normal_damping: f32,
) -> bool {
    let tangent = (w2 - w1).normalize_or_zero();

    let sweep = intersect_segments(p, *new_p, w1, w2);
    if sweep.hit {
        let vt = tangent * new_v.dot(tangent);
        let vn = normal * new_v.dot(normal) * -normal_damping;
        *new_v = vt + vn;
        *new_p = p + (*new_p - p) * sweep.t1 + normal;
        return true;
    }

    let probe = intersect_segments(*new_p, *new_p + normal, w1, w2);
    if probe.hit {
        let vt = tangent * new_v.dot(tangent);
        let vn = normal * new_v.dot(normal) * -normal_damping;
        *new_v = vt + vn;
        *new_p += normal * (probe.t1 + 1.0);
        return true;
    }

    false
}

/// Test the swept move of a part of size `part_size` against the box
/// obstacle at `center` of size `obstacle_size` (both full side lengths).
///
/// Only one edge response is ever applied: edges are tried top, bottom,
/// left, right and the first crossing wins. A point already inside the
/// inflated box is pushed out through the nearer of the top/bottom faces
/// (ties favor the top); points farther than the summed sizes on either
/// axis are culled outright.
pub fn test_box_collision(
    center: Vec2,
    obstacle_size: f32,
    part_size: f32,
    p: Vec2,
    new_p: &mut Vec2,
    new_v: &mut Vec2,
    normal_damping: f32,
) -> bool {
    let sum = obstacle_size + part_size;
    let half = sum / 2.0;

    let dx = p.x - center.x;
    let dy = p.y - center.y;
    if dx.abs() > sum || dy.abs() > sum {
        return false;
    }

    if dx.abs() < half && dy.abs() < half {
        let dist_top = dy + half;
        let dist_bottom = half - dy;
        if dist_top <= dist_bottom {
            new_p.y = center.y - half;
        } else {
            new_p.y = center.y + half;
        }
        return true;
    }

    let min = center - Vec2::splat(half);
    let max = center + Vec2::splat(half);

    let top = (Vec2::new(min.x, min.y), Vec2::new(max.x, min.y), Vec2::new(0.0, -1.0));
    let bottom = (Vec2::new(min.x, max.y), Vec2::new(max.x, max.y), Vec2::new(0.0, 1.0));
    let left = (Vec2::new(min.x, min.y), Vec2::new(min.x, max.y), Vec2::new(-1.0, 0.0));
    let right = (Vec2::new(max.x, min.y), Vec2::new(max.x, max.y), Vec2::new(1.0, 0.0));

    for (w1, w2, normal) in [top, bottom, left, right] {
        if test_line_collision(p, w1, w2, normal, new_p, new_v, normal_damping) {
            return true;
        }
    }

    false
}
