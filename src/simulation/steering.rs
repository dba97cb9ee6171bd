//! Steering primitives on the ground plane
//!
//! Small pure functions composed by weighted summation in the AI system.

use glam::Vec2;

/// Below this separation two agents are treated as coincident
const MIN_SEPARATION: f32 = 1e-4;

/// Desired velocity straight at `target` at full speed
pub fn seek(position: Vec2, target: Vec2, max_speed: f32) -> Vec2 {
    (target - position).normalize_or_zero() * max_speed
}

/// Average repulsion from neighbors, each weighted by inverse distance
///
/// Coincident neighbors carry no direction and are skipped.
pub fn separate(position: Vec2, neighbors: impl IntoIterator<Item = Vec2>) -> Vec2 {
    let mut sum = Vec2::ZERO;
    let mut count = 0u32;

    for neighbor in neighbors {
        let offset = position - neighbor;
        let distance = offset.length();
        if distance < MIN_SEPARATION {
            continue;
        }
        sum += offset / (distance * distance);
        count += 1;
    }

    if count == 0 {
        Vec2::ZERO
    } else {
        sum / count as f32
    }
}

/// Cruise along `heading` (radians, measured from +x toward +z)
pub fn wander(heading: f32, speed: f32) -> Vec2 {
    Vec2::from_angle(heading) * speed
}

/// Cap the length of `velocity` at `max_speed`
pub fn clamp_speed(velocity: Vec2, max_speed: f32) -> Vec2 {
    velocity.clamp_length_max(max_speed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seek_points_at_target() {
        let v = seek(Vec2::ZERO, Vec2::new(3.0, 4.0), 10.0);
        assert!((v - Vec2::new(6.0, 8.0)).length() < 1e-5);
    }

    #[test]
    fn test_seek_on_target_is_zero() {
        assert_eq!(seek(Vec2::ONE, Vec2::ONE, 5.0), Vec2::ZERO);
    }

    #[test]
    fn test_separation_pushes_away_and_weakens_with_distance() {
        let near = separate(Vec2::ZERO, [Vec2::new(1.0, 0.0)]);
        let far = separate(Vec2::ZERO, [Vec2::new(4.0, 0.0)]);
        assert!(near.x < 0.0);
        assert!(near.length() > far.length());
    }

    #[test]
    fn test_separation_is_averaged() {
        let single = separate(Vec2::ZERO, [Vec2::new(2.0, 0.0)]);
        let doubled = separate(Vec2::ZERO, [Vec2::new(2.0, 0.0), Vec2::new(2.0, 0.0)]);
        assert!((single - doubled).length() < 1e-6);
    }

    #[test]
    fn test_separation_ignores_coincident() {
        assert_eq!(separate(Vec2::ONE, [Vec2::ONE]), Vec2::ZERO);
    }

    #[test]
    fn test_clamp_speed() {
        assert!((clamp_speed(Vec2::new(30.0, 40.0), 5.0).length() - 5.0).abs() < 1e-5);
        assert_eq!(clamp_speed(Vec2::new(1.0, 0.0), 5.0), Vec2::new(1.0, 0.0));
    }

    #[test]
    fn test_wander_follows_heading() {
        let v = wander(std::f32::consts::FRAC_PI_2, 2.0);
        assert!(v.x.abs() < 1e-5 && (v.y - 2.0).abs() < 1e-5);
    }
}
