//! Priority scoring and scheduling of the computed tile set
//!
//! Lower scores load sooner. The default score grows with distance from the
//! predicted center; motion and drag alignment pull tiles ahead of the
//! viewport forward in the queue, and visible tiles always beat off-screen
//! ones outside load-all mode.

use crate::core::config::PriorityConfig;
use crate::core::grid::Point;
use crate::input::motion::MotionSnapshot;
use crate::tiles::set::TileDescriptor;

/// Scores, orders, and truncates the descriptor list in place.
///
/// `predicted` is the predicted center in fractional tile coordinates, the
/// same point the window was built around. Ordering is total: score ties
/// break on the tile key so two passes over identical state agree exactly.
pub fn schedule(
    descriptors: &mut Vec<TileDescriptor>,
    predicted: Point,
    motion: &MotionSnapshot,
    load_all: bool,
    config: &PriorityConfig,
) {
    for descriptor in descriptors.iter_mut() {
        descriptor.priority = score(descriptor, predicted, motion, load_all, config);
    }

    descriptors.sort_by(|a, b| {
        a.priority
            .partial_cmp(&b.priority)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.key.cmp(&b.key))
    });
    descriptors.truncate(config.budget);
}

fn score(
    descriptor: &TileDescriptor,
    predicted: Point,
    motion: &MotionSnapshot,
    load_all: bool,
    config: &PriorityConfig,
) -> f64 {
    if load_all {
        // Flat score: load-all deliberately has no preferential ordering.
        return config.load_all_flat;
    }

    let offset = Point::new(
        descriptor.key.gx as f64 - predicted.x,
        descriptor.key.gy as f64 - predicted.y,
    );
    let mut priority = (1.0 + offset.magnitude()).log10();

    if motion.moving {
        priority -= config.motion_weight * sign_alignment(&offset, &motion.movement_vector);
    }
    if motion.dragging && motion.drag_distance > config.drag_activation_px {
        priority -= config.drag_weight * sign_alignment(&offset, &motion.drag_velocity);
    }
    if descriptor.visible {
        priority += config.visible_boost;
    }

    priority
}

/// Per-axis sign agreement between a tile offset and a motion vector:
/// 0.5 per matching axis, so 0.0, 0.5, or 1.0.
fn sign_alignment(offset: &Point, motion: &Point) -> f64 {
    let mut alignment = 0.0;
    if offset.x != 0.0 && motion.x != 0.0 && offset.x.signum() == motion.x.signum() {
        alignment += 0.5;
    }
    if offset.y != 0.0 && motion.y != 0.0 && offset.y.signum() == motion.y.signum() {
        alignment += 0.5;
    }
    alignment
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::grid::{ScreenRect, TileKey};

    fn descriptor(gx: i32, gy: i32, visible: bool) -> TileDescriptor {
        TileDescriptor {
            key: TileKey::new(3, gx, gy),
            screen: ScreenRect::new(0.0, 0.0, 512.0, 512.0),
            priority: 0.0,
            visible,
            url: format!("http://t/3/{}/{}.jpg", gx, gy),
        }
    }

    #[test]
    fn test_center_sorts_before_distant_tile() {
        let config = PriorityConfig::default();
        let predicted = Point::new(25.0, 25.0);
        let motion = MotionSnapshot::default();

        let mut tiles = vec![descriptor(35, 25, false), descriptor(25, 25, false)];
        schedule(&mut tiles, predicted, &motion, false, &config);
        assert_eq!(tiles[0].key.gx, 25);

        // Load-all flattens scores; the key tie-break still puts the center
        // tile first.
        let mut tiles = vec![descriptor(35, 25, false), descriptor(25, 25, false)];
        schedule(&mut tiles, predicted, &motion, true, &config);
        assert_eq!(tiles[0].key.gx, 25);
        assert!(tiles.iter().all(|t| t.priority == 0.1));
    }

    #[test]
    fn test_visible_tiles_always_load_first() {
        let config = PriorityConfig::default();
        let predicted = Point::new(25.0, 25.0);
        let motion = MotionSnapshot::default();

        // A visible tile far from center still beats a hidden one at center.
        let mut tiles = vec![descriptor(25, 25, false), descriptor(33, 25, true)];
        schedule(&mut tiles, predicted, &motion, false, &config);
        assert_eq!(tiles[0].key.gx, 33);
        assert!(tiles[0].priority < -90.0);
    }

    #[test]
    fn test_motion_alignment_pulls_tiles_forward() {
        let config = PriorityConfig::default();
        let predicted = Point::new(25.0, 25.0);
        let mut motion = MotionSnapshot::default();
        motion.moving = true;
        motion.movement_vector = Point::new(6.0, 0.0);

        // Equidistant tiles east and west of center; east agrees with the
        // motion sign and must score lower.
        let mut tiles = vec![descriptor(20, 25, false), descriptor(30, 25, false)];
        schedule(&mut tiles, predicted, &motion, false, &config);
        assert_eq!(tiles[0].key.gx, 30);
        // One matching axis: reduction = 0.5 weight * 0.5 alignment.
        assert!((tiles[0].priority - (tiles[1].priority - 0.25)).abs() < 1e-9);
    }

    #[test]
    fn test_drag_alignment_needs_activation_distance() {
        let config = PriorityConfig::default();
        let predicted = Point::new(25.0, 25.0);
        let mut motion = MotionSnapshot::default();
        motion.dragging = true;
        motion.drag_velocity = Point::new(0.0, -4.0);
        motion.drag_distance = 50.0;

        let mut short_drag = vec![descriptor(25, 20, false), descriptor(25, 30, false)];
        schedule(&mut short_drag, predicted, &motion, false, &config);
        let short_priorities: Vec<f64> = short_drag.iter().map(|t| t.priority).collect();

        motion.drag_distance = 150.0;
        let mut long_drag = vec![descriptor(25, 20, false), descriptor(25, 30, false)];
        schedule(&mut long_drag, predicted, &motion, false, &config);

        // Past 100px of travel the northern tile (matching the drag sign)
        // gains the 0.8 reduction.
        assert_eq!(long_drag[0].key.gy, 20);
        assert!(long_drag[0].priority < short_priorities[0]);
    }

    #[test]
    fn test_budget_truncation() {
        let config = PriorityConfig::default();
        let predicted = Point::new(0.0, 0.0);
        let motion = MotionSnapshot::default();

        let mut tiles: Vec<TileDescriptor> = (0..12)
            .flat_map(|gx| (0..12).map(move |gy| descriptor(gx, gy, false)))
            .collect();
        schedule(&mut tiles, predicted, &motion, false, &config);
        assert_eq!(tiles.len(), config.budget);
    }
}
