//! Player control step
//!
//! Turns one tick of normalized input into the player's velocity before the
//! AI and physics passes run. Throwing spawns a snowball projectile that is
//! integrated like any other entity.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::core::config::PlayerConfig;
use crate::core::types::EntityId;
use crate::ecs::entity::{EntityBlueprint, PlayerForm};
use crate::ecs::store::EntityStore;
use crate::simulation::events::{Cue, TickReport};
use crate::world::height_field::HeightField;

/// Normalized input for one tick
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PlayerInput {
    /// Lateral steer in [-1, 1]
    pub horizontal: f32,
    pub jump: bool,
    pub action: bool,
}

impl PlayerInput {
    pub fn steer(horizontal: f32) -> Self {
        Self {
            horizontal,
            ..Self::default()
        }
    }
}

/// Apply input to the player entity
///
/// Returns the projectile spawned by a throw, if any. A missing player is
/// ignored.
pub fn apply(
    store: &mut EntityStore,
    player_id: EntityId,
    input: &PlayerInput,
    field: &HeightField,
    config: &PlayerConfig,
    report: &mut TickReport,
) -> Option<EntityId> {
    let player = store.get_mut(player_id)?;
    let form = player.player_form()?;

    let forward = match form {
        PlayerForm::Kitten => config.kitten_speed,
        PlayerForm::Snowman => config.snowman_speed,
    };
    let horizontal = input.horizontal.clamp(-1.0, 1.0);

    // Hold the player inside the run corridor
    if player.position.x.abs() > config.lateral_limit {
        player.position.x = player.position.x.clamp(-config.lateral_limit, config.lateral_limit);
    }
    let at_edge = (player.position.x >= config.lateral_limit && horizontal > 0.0)
        || (player.position.x <= -config.lateral_limit && horizontal < 0.0);
    let lateral = if at_edge { 0.0 } else { horizontal * config.lateral_speed };

    let position = player.position;
    let grounded = position.y - field.ground_at(position.x, position.z) <= config.ground_tolerance;
    let jumped = input.jump && form == PlayerForm::Kitten && grounded;

    let velocity = player.velocity_mut()?;
    velocity.x = lateral;
    velocity.z = forward;
    if jumped {
        velocity.y = config.jump_velocity;
    }
    let velocity = *velocity;

    if jumped {
        report.cue(Cue::Jump);
    }

    if !input.action {
        return None;
    }

    let reach = config.radius + config.projectile_radius;
    let shot = EntityBlueprint::projectile(
        position + Vec3::new(0.0, config.radius, reach),
        Vec3::new(velocity.x, config.projectile_lift, velocity.z + config.projectile_speed),
        config.projectile_radius,
    );
    report.cue(Cue::Throw);
    Some(store.add(shot))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::TerrainConfig;
    use crate::ecs::entity::EntityKind;
    use crate::ecs::store::Query;

    fn flat_field() -> HeightField {
        HeightField::with_seed(
            TerrainConfig {
                octaves: vec![],
                slope_coefficient: 0.0,
                ..TerrainConfig::default()
            },
            1,
        )
    }

    fn setup() -> (EntityStore, EntityId, HeightField, PlayerConfig) {
        let mut store = EntityStore::new();
        let player = store.add(EntityBlueprint::player(Vec3::ZERO, 1.0));
        (store, player, flat_field(), PlayerConfig::default())
    }

    #[test]
    fn test_forward_speed_depends_on_form() {
        let (mut store, player, field, config) = setup();
        let mut report = TickReport::new(0);

        apply(&mut store, player, &PlayerInput::default(), &field, &config, &mut report);
        assert_eq!(store.get(player).unwrap().velocity().unwrap().z, config.kitten_speed);

        store.get_mut(player).unwrap().set_player_form(PlayerForm::Snowman);
        apply(&mut store, player, &PlayerInput::default(), &field, &config, &mut report);
        assert_eq!(store.get(player).unwrap().velocity().unwrap().z, config.snowman_speed);
    }

    #[test]
    fn test_jump_needs_ground_and_kitten_form() {
        let (mut store, player, field, config) = setup();
        let jump = PlayerInput {
            jump: true,
            ..PlayerInput::default()
        };

        let mut report = TickReport::new(0);
        apply(&mut store, player, &jump, &field, &config, &mut report);
        assert_eq!(store.get(player).unwrap().velocity().unwrap().y, config.jump_velocity);
        assert_eq!(report.cues, vec![Cue::Jump]);

        // Airborne: no second jump
        store.get_mut(player).unwrap().position.y = 5.0;
        let mut report = TickReport::new(1);
        apply(&mut store, player, &jump, &field, &config, &mut report);
        assert!(report.cues.is_empty());

        store.get_mut(player).unwrap().position.y = 0.0;
        store.get_mut(player).unwrap().set_player_form(PlayerForm::Snowman);
        let mut report = TickReport::new(2);
        apply(&mut store, player, &jump, &field, &config, &mut report);
        assert!(report.cues.is_empty());
    }

    #[test]
    fn test_lateral_movement_stops_at_edge() {
        let (mut store, player, field, config) = setup();
        store.get_mut(player).unwrap().position.x = 25.0;

        let mut report = TickReport::new(0);
        apply(&mut store, player, &PlayerInput::steer(1.0), &field, &config, &mut report);

        let entity = store.get(player).unwrap();
        assert_eq!(entity.position.x, config.lateral_limit);
        assert_eq!(entity.velocity().unwrap().x, 0.0);

        apply(&mut store, player, &PlayerInput::steer(-1.0), &field, &config, &mut report);
        assert_eq!(store.get(player).unwrap().velocity().unwrap().x, -config.lateral_speed);
    }

    #[test]
    fn test_throw_spawns_projectile_ahead() {
        let (mut store, player, field, config) = setup();
        let throw = PlayerInput {
            action: true,
            ..PlayerInput::default()
        };

        let mut report = TickReport::new(0);
        let shot = apply(&mut store, player, &throw, &field, &config, &mut report).unwrap();

        assert_eq!(store.count(Query::kind(EntityKind::Projectile)), 1);
        let projectile = store.get(shot).unwrap();
        assert!(projectile.position.z > 0.0);
        assert!(projectile.velocity().unwrap().z > config.kitten_speed);
        assert_eq!(report.cues, vec![Cue::Throw]);
    }

    #[test]
    fn test_missing_player_is_ignored() {
        let (mut store, player, field, config) = setup();
        store.remove(player);
        let mut report = TickReport::new(0);
        assert!(apply(&mut store, player, &PlayerInput::default(), &field, &config, &mut report).is_none());
    }
}
