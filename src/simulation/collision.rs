//! Collision resolution
//!
//! Three passes in a fixed order: player vs enemies, player vs collectibles,
//! projectiles vs enemies. An entity removed by an earlier pass is gone for
//! the later ones, so nothing resolves twice. Effects leave as events.

use crate::core::config::SimulationConfig;
use crate::core::rng::SeededRng;
use crate::ecs::entity::{CollectibleKind, Components, EnemyKind, Entity, EntityKind, PlayerForm};
use crate::ecs::store::{EntityStore, Query};
use crate::simulation::events::{Cue, DefeatCause, SimulationEvent, TickReport};

/// Circle test on the two entities' radii (missing radius counts as zero)
#[inline]
pub fn overlaps(a: &Entity, b: &Entity) -> bool {
    let reach = a.radius().unwrap_or(0.0) + b.radius().unwrap_or(0.0);
    a.position.distance(b.position) < reach
}

/// Resolve every overlap for this tick
pub fn update(store: &mut EntityStore, rng: &mut SeededRng, config: &SimulationConfig, report: &mut TickReport) {
    if let Some(player_id) = store.first(Query::kind(EntityKind::Player).with(Components::RADIUS)) {
        if let Some(player) = store.get(player_id).cloned() {
            let form = player.player_form().unwrap_or_default();
            player_vs_enemies(store, &player, form, rng, config, report);
            player_vs_collectibles(store, &player, form, config, report);
        }
    }
    projectiles_vs_enemies(store, config, report);
}

fn player_vs_enemies(
    store: &mut EntityStore,
    player: &Entity,
    form: PlayerForm,
    rng: &mut SeededRng,
    config: &SimulationConfig,
    report: &mut TickReport,
) {
    let combat = &config.combat;

    for id in store.query(Query::kind(EntityKind::Enemy).with(Components::RADIUS)) {
        let Some(enemy) = store.get(id) else {
            continue;
        };
        if !overlaps(player, enemy) {
            continue;
        }
        let Some(kind) = enemy.enemy().map(|e| e.kind) else {
            continue;
        };
        store.remove(id);

        if form.is_empowered() {
            report.emit(SimulationEvent::ScoreDelta { amount: combat.crush_score });
            report.emit(SimulationEvent::EnemyDefeated { kind, cause: DefeatCause::Crushed });
        } else {
            report.emit(SimulationEvent::DamageDelta { amount: combat.contact_damage });
            report.emit(SimulationEvent::EnemyDefeated { kind, cause: DefeatCause::Contact });
            if kind == EnemyKind::Snowman && rng.chance(combat.form_change_chance) {
                report.emit(SimulationEvent::PlayerFormChanged { form: PlayerForm::Snowman });
            }
        }
        report.cue(Cue::Hit);
    }
}

fn player_vs_collectibles(
    store: &mut EntityStore,
    player: &Entity,
    form: PlayerForm,
    config: &SimulationConfig,
    report: &mut TickReport,
) {
    let combat = &config.combat;

    for id in store.query(Query::kind(EntityKind::Collectible).with(Components::RADIUS)) {
        let Some(item) = store.get(id) else {
            continue;
        };
        if !overlaps(player, item) {
            continue;
        }
        let Some(kind) = item.collectible_kind() else {
            continue;
        };
        store.remove(id);

        match kind {
            CollectibleKind::Cocoa => {
                report.emit(SimulationEvent::PickupApplied { kind, amount: combat.cocoa_warmth });
                if form.is_empowered() {
                    report.emit(SimulationEvent::PlayerFormChanged { form: PlayerForm::Kitten });
                    report.emit(SimulationEvent::ScoreDelta { amount: combat.revert_bonus });
                }
            }
            CollectibleKind::Film => {
                report.emit(SimulationEvent::PickupApplied { kind, amount: combat.film_rolls });
            }
        }
        report.emit(SimulationEvent::ScoreDelta { amount: combat.pickup_score });
        report.cue(Cue::Pickup);
    }
}

fn projectiles_vs_enemies(store: &mut EntityStore, config: &SimulationConfig, report: &mut TickReport) {
    let enemies = store.query(Query::kind(EntityKind::Enemy).with(Components::RADIUS));

    for projectile_id in store.query(Query::kind(EntityKind::Projectile).with(Components::RADIUS)) {
        let Some(projectile) = store.get(projectile_id) else {
            continue;
        };

        let hit = enemies.iter().copied().find_map(|enemy_id| {
            let enemy = store.get(enemy_id)?;
            let kind = enemy.enemy()?.kind;
            overlaps(projectile, enemy).then_some((enemy_id, kind))
        });

        // At most one kill per projectile per tick
        if let Some((enemy_id, kind)) = hit {
            store.remove(enemy_id);
            store.remove(projectile_id);
            report.emit(SimulationEvent::ScoreDelta { amount: config.enemy_stats(kind).score });
            report.emit(SimulationEvent::EnemyDefeated { kind, cause: DefeatCause::Projectile });
        }
    }
}
