//! Entity layout
//!
//! Every entity carries a position. The rest is kind-specific: `Body` is a
//! tagged variant keyed by `EntityKind`, and the optional physics components
//! follow these invariants:
//!
//! - gravity-enabled entities always carry a velocity
//! - collision participants carry a non-negative radius
//! - enemies always carry an AI agent
//!
//! The optional components are fixed at spawn time so the store's signature
//! index never goes stale; only their values change.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::core::types::EntityId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EntityKind {
    Player,
    Enemy,
    Collectible,
    Projectile,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EnemyKind {
    /// Common ground enemy; contact may turn the player into a snowman
    Snowman,
    /// Heavy, slower to turn but hits the widest area
    PolarBear,
    /// Rare, fast and erratic; wanders off on patrol
    GlitchImp,
}

impl EnemyKind {
    pub const ALL: [EnemyKind; 3] = [EnemyKind::Snowman, EnemyKind::PolarBear, EnemyKind::GlitchImp];
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CollectibleKind {
    Cocoa,
    Film,
}

/// Player shape. Snowman is the empowered form that crushes enemies.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PlayerForm {
    #[default]
    Kitten,
    Snowman,
}

impl PlayerForm {
    pub fn is_empowered(&self) -> bool {
        matches!(self, PlayerForm::Snowman)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AiState {
    #[default]
    Idle,
    Chase,
    Patrol,
}

/// Per-enemy steering controller state
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct AiAgent {
    pub state: AiState,
    /// Wander heading on the ground plane (radians)
    pub heading: f32,
    /// Ticks spent in the current patrol
    pub patrol_ticks: u32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EnemyData {
    pub kind: EnemyKind,
    pub ai: AiAgent,
}

/// Kind-specific payload
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Body {
    Player { form: PlayerForm },
    Enemy(EnemyData),
    Collectible(CollectibleKind),
    Projectile,
}

impl Body {
    pub fn kind(&self) -> EntityKind {
        match self {
            Body::Player { .. } => EntityKind::Player,
            Body::Enemy(_) => EntityKind::Enemy,
            Body::Collectible(_) => EntityKind::Collectible,
            Body::Projectile => EntityKind::Projectile,
        }
    }
}

/// Bit set of optional components an entity carries
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Components(u8);

impl Components {
    pub const NONE: Components = Components(0);
    pub const POSITION: Components = Components(1);
    pub const VELOCITY: Components = Components(1 << 1);
    pub const RADIUS: Components = Components(1 << 2);
    pub const GRAVITY: Components = Components(1 << 3);
    pub const AI: Components = Components(1 << 4);

    pub fn contains(self, other: Components) -> bool {
        self.0 & other.0 == other.0
    }
}

impl std::ops::BitOr for Components {
    type Output = Self;
    fn bitor(self, rhs: Self) -> Self {
        Components(self.0 | rhs.0)
    }
}

impl std::ops::BitOrAssign for Components {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

/// Everything needed to add an entity to the store
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EntityBlueprint {
    pub position: Vec3,
    pub velocity: Option<Vec3>,
    pub radius: Option<f32>,
    pub gravity: bool,
    pub body: Body,
}

impl EntityBlueprint {
    pub fn player(position: Vec3, radius: f32) -> Self {
        Self {
            position,
            velocity: Some(Vec3::ZERO),
            radius: Some(radius),
            gravity: true,
            body: Body::Player { form: PlayerForm::Kitten },
        }
    }

    pub fn enemy(kind: EnemyKind, position: Vec3, radius: f32) -> Self {
        Self {
            position,
            velocity: Some(Vec3::ZERO),
            radius: Some(radius),
            gravity: true,
            body: Body::Enemy(EnemyData { kind, ai: AiAgent::default() }),
        }
    }

    pub fn collectible(kind: CollectibleKind, position: Vec3, radius: f32) -> Self {
        Self {
            position,
            velocity: None,
            radius: Some(radius),
            gravity: false,
            body: Body::Collectible(kind),
        }
    }

    pub fn projectile(position: Vec3, velocity: Vec3, radius: f32) -> Self {
        Self {
            position,
            velocity: Some(velocity),
            radius: Some(radius),
            gravity: true,
            body: Body::Projectile,
        }
    }

    pub fn kind(&self) -> EntityKind {
        self.body.kind()
    }
}

/// A live simulation entity
#[derive(Debug, Clone, PartialEq)]
pub struct Entity {
    id: EntityId,
    pub position: Vec3,
    velocity: Option<Vec3>,
    radius: Option<f32>,
    gravity: bool,
    body: Body,
}

impl Entity {
    pub(crate) fn from_blueprint(id: EntityId, blueprint: EntityBlueprint) -> Self {
        debug_assert!(
            !blueprint.gravity || blueprint.velocity.is_some(),
            "gravity-enabled entity without velocity"
        );
        debug_assert!(blueprint.radius.map_or(true, |r| r >= 0.0), "negative radius");

        Self {
            id,
            position: blueprint.position,
            velocity: blueprint.velocity,
            radius: blueprint.radius,
            gravity: blueprint.gravity,
            body: blueprint.body,
        }
    }

    pub fn id(&self) -> EntityId {
        self.id
    }

    pub fn kind(&self) -> EntityKind {
        self.body.kind()
    }

    pub fn body(&self) -> &Body {
        &self.body
    }

    pub fn velocity(&self) -> Option<Vec3> {
        self.velocity
    }

    pub fn velocity_mut(&mut self) -> Option<&mut Vec3> {
        self.velocity.as_mut()
    }

    pub fn radius(&self) -> Option<f32> {
        self.radius
    }

    pub fn gravity_enabled(&self) -> bool {
        self.gravity
    }

    pub fn enemy(&self) -> Option<&EnemyData> {
        match &self.body {
            Body::Enemy(data) => Some(data),
            _ => None,
        }
    }

    pub fn enemy_mut(&mut self) -> Option<&mut EnemyData> {
        match &mut self.body {
            Body::Enemy(data) => Some(data),
            _ => None,
        }
    }

    pub fn collectible_kind(&self) -> Option<CollectibleKind> {
        match self.body {
            Body::Collectible(kind) => Some(kind),
            _ => None,
        }
    }

    pub fn player_form(&self) -> Option<PlayerForm> {
        match self.body {
            Body::Player { form } => Some(form),
            _ => None,
        }
    }

    /// Returns false when the entity is not the player
    pub fn set_player_form(&mut self, new_form: PlayerForm) -> bool {
        match &mut self.body {
            Body::Player { form } => {
                *form = new_form;
                true
            }
            _ => false,
        }
    }

    /// Component signature used by the store's secondary index
    pub fn components(&self) -> Components {
        let mut set = Components::POSITION;
        if self.velocity.is_some() {
            set |= Components::VELOCITY;
        }
        if self.radius.is_some() {
            set |= Components::RADIUS;
        }
        if self.gravity {
            set |= Components::GRAVITY;
        }
        if matches!(self.body, Body::Enemy(_)) {
            set |= Components::AI;
        }
        set
    }
}
