//! Session state and core simulation types

use glam::Vec3;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use crate::consts::*;

/// Current phase of a play session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GamePhase {
    /// Active gameplay
    Running,
    /// Session is paused; nothing advances
    Paused,
    /// Session ended; `GameState::score` holds the final score
    GameOver,
}

/// The three obstacle kinds. They share one update/collision implementation
/// and differ only in their effect on the session and their colors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObstacleKind {
    /// Collectible: mowing it raises the score
    Rabbit,
    /// Penalty: hitting it lowers the score
    Gnome,
    /// Hazard: hitting it costs health
    Stone,
}

impl ObstacleKind {
    /// All kinds, in spawn-pool order
    pub const ALL: [ObstacleKind; 3] = [ObstacleKind::Rabbit, ObstacleKind::Gnome, ObstacleKind::Stone];

    /// Score change applied when this kind is hit
    pub fn score_delta(self) -> i32 {
        match self {
            ObstacleKind::Rabbit => RABBIT_SCORE,
            ObstacleKind::Gnome => -GNOME_PENALTY,
            ObstacleKind::Stone => 0,
        }
    }

    /// Health lost when this kind is hit
    pub fn damage(self) -> i32 {
        match self {
            ObstacleKind::Stone => STONE_DAMAGE,
            _ => 0,
        }
    }

    /// Body color used by the renderer
    pub fn color(self) -> [f32; 3] {
        match self {
            ObstacleKind::Rabbit => [1.0, 1.0, 1.0],
            ObstacleKind::Gnome => [0.8, 0.2, 0.6],
            ObstacleKind::Stone => [0.5, 0.5, 0.5],
        }
    }

    /// Color of the particle burst spawned when this kind is hit
    pub fn burst_color(self) -> [f32; 3] {
        match self {
            ObstacleKind::Rabbit => [1.0, 0.0, 0.0],
            ObstacleKind::Gnome => [1.0, 0.5, 1.0],
            ObstacleKind::Stone => [1.0, 1.0, 0.0],
        }
    }
}

/// An obstacle scrolling toward the player in one lane
#[derive(Debug, Clone, PartialEq)]
pub struct Obstacle {
    pub kind: ObstacleKind,
    /// Lane x-coordinate (one of `consts::LANES`)
    pub lane: f32,
    /// Forward position along the scroll axis; grows toward the player
    pub z: f32,
    /// Set once the collision effect has fired. A resolved obstacle keeps
    /// scrolling until pruned but no longer collides or renders.
    pub resolved: bool,
}

impl Obstacle {
    pub fn new(kind: ObstacleKind, lane: f32, z: f32) -> Self {
        Self {
            kind,
            lane,
            z,
            resolved: false,
        }
    }

    /// Advance along the scroll axis. Pruning is the caller's responsibility.
    pub fn advance(&mut self, distance: f32) {
        self.z += distance;
    }

    /// Collision against the player's lane. Fires at most once per obstacle:
    /// returns true and marks the obstacle resolved iff it is unresolved, has
    /// reached the trigger position, and sits within the lane tolerance.
    /// Every later call is a no-op returning false.
    pub fn check_collision(&mut self, player_lane: f32) -> bool {
        if !self.resolved
            && self.z >= COLLISION_TRIGGER_Z
            && (self.lane - player_lane).abs() < LANE_TOLERANCE
        {
            self.resolved = true;
            return true;
        }
        false
    }

    /// World position of the obstacle's body (and of its collision burst)
    pub fn position(&self) -> Vec3 {
        Vec3::new(self.lane, 0.5, self.z)
    }
}

/// A single point particle of a collision burst
#[derive(Debug, Clone, PartialEq)]
pub struct Particle {
    pub pos: Vec3,
    pub vel: Vec3,
    /// Remaining updates before the particle expires
    pub life: u32,
}

/// A short-lived cosmetic burst spawned where an obstacle was hit
#[derive(Debug, Clone, PartialEq)]
pub struct ParticleBurst {
    pub color: [f32; 3],
    pub particles: Vec<Particle>,
}

impl ParticleBurst {
    /// Spawn a burst at `origin`: a fixed particle count with randomized
    /// sideways drift and upward kick, all sharing one lifetime counter.
    pub fn new<R: Rng>(origin: Vec3, color: [f32; 3], rng: &mut R) -> Self {
        let particles = (0..BURST_PARTICLES)
            .map(|_| Particle {
                pos: origin,
                vel: Vec3::new(
                    rng.random_range(-0.1..0.1),
                    rng.random_range(0.05..0.2),
                    rng.random_range(-0.1..0.1),
                ),
                life: PARTICLE_LIFETIME,
            })
            .collect();
        Self { color, particles }
    }

    /// Integrate every particle by one step and drop the expired ones.
    /// Not time-scaled: bursts are frame-cosmetic and tick once per update.
    pub fn update(&mut self) {
        for p in &mut self.particles {
            p.pos += p.vel;
            p.vel.y -= PARTICLE_GRAVITY;
            p.life -= 1;
        }
        self.particles.retain(|p| p.life > 0);
    }

    /// The burst is discarded by the caller once every particle has expired
    pub fn is_expired(&self) -> bool {
        self.particles.is_empty()
    }
}

/// Complete session state, owned by one play-through and reset per session
#[derive(Debug, Clone)]
pub struct GameState {
    /// Session seed for reproducibility
    pub seed: u64,
    pub(crate) rng: Pcg32,
    pub phase: GamePhase,
    /// Player lane x-coordinate
    pub player_lane: f32,
    /// Unbounded; may go negative
    pub score: i32,
    /// Decremented unclamped; the session ends on the first frame this is <= 0
    pub health: i32,
    /// Simulation tick counter
    pub time_ticks: u64,
    /// All active obstacles, every kind together
    pub obstacles: Vec<Obstacle>,
    /// Active collision bursts
    pub bursts: Vec<ParticleBurst>,
    /// Forward position where the next wave will spawn
    pub next_wave_z: f32,
    /// Seconds until the next lane change is accepted
    pub move_cooldown: f32,
}

impl GameState {
    /// Create a fresh session with the given seed
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            rng: Pcg32::seed_from_u64(seed),
            phase: GamePhase::Running,
            player_lane: 0.0,
            score: 0,
            health: MAX_HEALTH,
            time_ticks: 0,
            obstacles: Vec::new(),
            bursts: Vec::new(),
            next_wave_z: FIRST_WAVE_Z,
            move_cooldown: 0.0,
        }
    }
}
