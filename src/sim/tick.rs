//! Per-frame session update
//!
//! Core loop that advances one play session deterministically. The caller
//! measures elapsed time and passes it in; nothing here reads a clock.

use rand::Rng;

use super::state::{GamePhase, GameState, Obstacle, ObstacleKind, ParticleBurst};
use crate::consts::*;
use crate::{leftmost_lane, rightmost_lane};

/// Input commands for a single frame
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Move-left key held this frame
    pub move_left: bool,
    /// Move-right key held this frame
    pub move_right: bool,
    /// Pause toggle (edge-triggered)
    pub pause: bool,
    /// End the session immediately
    pub quit: bool,
}

/// Advance the session by one frame of `dt` seconds
pub fn tick(state: &mut GameState, input: &TickInput, dt: f32) {
    if input.quit && state.phase != GamePhase::GameOver {
        log::info!("session quit with score {}", state.score);
        state.phase = GamePhase::GameOver;
        return;
    }

    // Handle pause toggle
    if input.pause {
        match state.phase {
            GamePhase::Running => {
                state.phase = GamePhase::Paused;
                return;
            }
            GamePhase::Paused => state.phase = GamePhase::Running,
            GamePhase::GameOver => {}
        }
    }

    // Don't advance if paused or over
    match state.phase {
        GamePhase::Paused | GamePhase::GameOver => return,
        GamePhase::Running => {}
    }

    state.time_ticks += 1;

    // Lane changes: one lane per accepted press, clamped to the outer lanes,
    // gated so a held key can't jump several lanes in a burst
    state.move_cooldown = (state.move_cooldown - dt).max(0.0);
    if state.move_cooldown <= 0.0 {
        if input.move_left && state.player_lane > leftmost_lane() {
            state.player_lane -= LANE_SPACING;
            state.move_cooldown = MOVE_COOLDOWN;
        } else if input.move_right && state.player_lane < rightmost_lane() {
            state.player_lane += LANE_SPACING;
            state.move_cooldown = MOVE_COOLDOWN;
        }
    }

    // Spawn the next wave once the furthest obstacle is already near the
    // player (vacuously on the first frame)
    if state.obstacles.iter().all(|o| o.z > SPAWN_NEAR_Z) {
        let wave = generate_wave(state.next_wave_z, &mut state.rng);
        log::debug!("wave spawned at z {}", state.next_wave_z);
        state.obstacles.extend(wave);
        state.next_wave_z -= WAVE_STEP;
    }

    // Scroll distance for this frame, frame-duration independent
    let travel = SCROLL_SPEED * dt;

    // Advance and collide every obstacle against the player's lane
    let mut hits: Vec<(glam::Vec3, ObstacleKind)> = Vec::new();
    for obstacle in &mut state.obstacles {
        obstacle.advance(travel);
        if obstacle.check_collision(state.player_lane) {
            hits.push((obstacle.position(), obstacle.kind));
        }
    }
    for (pos, kind) in hits {
        state.score += kind.score_delta();
        state.health -= kind.damage();
        let burst = ParticleBurst::new(pos, kind.burst_color(), &mut state.rng);
        state.bursts.push(burst);
    }

    // Prune obstacles that have scrolled past the player
    state.obstacles.retain(|o| o.z < DESPAWN_Z);

    // Animate bursts and drop the spent ones
    for burst in &mut state.bursts {
        burst.update();
    }
    state.bursts.retain(|b| !b.is_expired());

    if state.health <= 0 {
        log::info!("game over with score {}", state.score);
        state.phase = GamePhase::GameOver;
    }
}

/// Generate one wave at forward position `z`: each obstacle kind exactly once,
/// each at a distinct lane, both drawn without replacement from `rng`.
pub fn generate_wave<R: Rng>(z: f32, rng: &mut R) -> Vec<Obstacle> {
    let mut lanes = LANES.to_vec();
    let mut kinds = ObstacleKind::ALL.to_vec();
    let mut wave = Vec::with_capacity(kinds.len());
    while !kinds.is_empty() {
        let kind = kinds.swap_remove(rng.random_range(0..kinds.len()));
        let lane = lanes.swap_remove(rng.random_range(0..lanes.len()));
        wave.push(Obstacle::new(kind, lane, z));
    }
    wave
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    #[test]
    fn test_first_wave_spawns_immediately() {
        let mut state = GameState::new(12345);
        assert!(state.obstacles.is_empty());

        tick(&mut state, &TickInput::default(), FRAME_DT);
        assert_eq!(state.obstacles.len(), 3);
        assert_eq!(state.next_wave_z, FIRST_WAVE_Z - WAVE_STEP);
    }

    #[test]
    fn test_wave_composition() {
        let mut rng = Pcg32::seed_from_u64(99);
        let wave = generate_wave(-10.0, &mut rng);

        assert_eq!(wave.len(), 3);
        for kind in ObstacleKind::ALL {
            assert_eq!(wave.iter().filter(|o| o.kind == kind).count(), 1);
        }
        let mut lanes: Vec<f32> = wave.iter().map(|o| o.lane).collect();
        lanes.sort_by(|a, b| a.partial_cmp(b).expect("lane is never NaN"));
        assert_eq!(lanes, LANES.to_vec());
        assert!(wave.iter().all(|o| o.z == -10.0));
    }

    #[test]
    fn test_scroll_is_dt_scaled() {
        let mut slow = GameState::new(7);
        let mut fast = GameState::new(7);

        tick(&mut slow, &TickInput::default(), FRAME_DT);
        tick(&mut fast, &TickInput::default(), 2.0 * FRAME_DT);

        // Both spawned the same first wave; the longer frame scrolled twice as far
        assert_eq!(slow.obstacles[0].z, FIRST_WAVE_Z + SCROLL_SPEED * FRAME_DT);
        assert_eq!(fast.obstacles[0].z, FIRST_WAVE_Z + SCROLL_SPEED * (2.0 * FRAME_DT));
    }

    #[test]
    fn test_tick_pause_freezes_session() {
        let mut state = GameState::new(12345);
        for _ in 0..5 {
            tick(&mut state, &TickInput::default(), FRAME_DT);
        }

        let pause = TickInput {
            pause: true,
            ..Default::default()
        };
        tick(&mut state, &pause, FRAME_DT);
        assert_eq!(state.phase, GamePhase::Paused);

        let snapshot = state.clone();
        for _ in 0..10 {
            tick(&mut state, &TickInput::default(), FRAME_DT);
        }
        assert_eq!(state.phase, GamePhase::Paused);
        assert_eq!(state.time_ticks, snapshot.time_ticks);
        assert_eq!(state.score, snapshot.score);
        assert_eq!(state.health, snapshot.health);
        assert_eq!(state.player_lane, snapshot.player_lane);
        assert_eq!(state.obstacles, snapshot.obstacles);

        // Unpause resumes: that frame advances again
        tick(&mut state, &pause, FRAME_DT);
        assert_eq!(state.phase, GamePhase::Running);
        assert_eq!(state.time_ticks, snapshot.time_ticks + 1);
    }

    #[test]
    fn test_quit_ends_session_from_running_and_paused() {
        let quit = TickInput {
            quit: true,
            ..Default::default()
        };

        let mut state = GameState::new(1);
        tick(&mut state, &TickInput::default(), FRAME_DT);
        tick(&mut state, &quit, FRAME_DT);
        assert_eq!(state.phase, GamePhase::GameOver);

        let mut state = GameState::new(1);
        let pause = TickInput {
            pause: true,
            ..Default::default()
        };
        tick(&mut state, &pause, FRAME_DT);
        assert_eq!(state.phase, GamePhase::Paused);
        tick(&mut state, &quit, FRAME_DT);
        assert_eq!(state.phase, GamePhase::GameOver);
    }

    #[test]
    fn test_hazard_collision_costs_health_and_bursts() {
        let mut state = GameState::new(42);
        state.health = 30;
        state.obstacles.push(Obstacle::new(ObstacleKind::Stone, 0.0, -0.5));

        tick(&mut state, &TickInput::default(), FRAME_DT);
        assert_eq!(state.health, 20);
        assert_eq!(state.phase, GamePhase::Running);
        assert!(!state.bursts.is_empty());
    }

    #[test]
    fn test_game_over_on_first_depleted_frame() {
        let mut state = GameState::new(42);
        state.health = STONE_DAMAGE; // one stone from death

        // Healthy frames never end the session
        tick(&mut state, &TickInput::default(), FRAME_DT);
        assert_eq!(state.phase, GamePhase::Running);

        state.obstacles.push(Obstacle::new(ObstacleKind::Stone, 0.0, -0.5));
        tick(&mut state, &TickInput::default(), FRAME_DT);
        assert!(state.health <= 0);
        assert_eq!(state.phase, GamePhase::GameOver);
    }

    #[test]
    fn test_score_goes_negative_on_penalties() {
        let mut state = GameState::new(42);
        state.obstacles.push(Obstacle::new(ObstacleKind::Gnome, 0.0, -0.5));

        tick(&mut state, &TickInput::default(), FRAME_DT);
        assert_eq!(state.score, -GNOME_PENALTY);
        assert_eq!(state.health, MAX_HEALTH);
    }

    #[test]
    fn test_resolved_obstacles_still_scroll_and_prune() {
        let mut state = GameState::new(42);
        let mut spent = Obstacle::new(ObstacleKind::Rabbit, 2.0, 4.9);
        spent.resolved = true;
        state.obstacles.push(spent);

        tick(&mut state, &TickInput::default(), FRAME_DT);
        assert!(!state.obstacles.iter().any(|o| o.resolved));
        // No effect was re-applied on the way out
        assert_eq!(state.score, 0);
    }

    #[test]
    fn test_movement_clamps_and_respects_cooldown() {
        let mut state = GameState::new(42);
        let left = TickInput {
            move_left: true,
            ..Default::default()
        };

        tick(&mut state, &left, FRAME_DT);
        assert_eq!(state.player_lane, -LANE_SPACING);

        // Held key is gated by the cooldown
        tick(&mut state, &left, FRAME_DT);
        assert_eq!(state.player_lane, -LANE_SPACING);

        // After the cooldown expires the outer lane clamps further movement
        for _ in 0..10 {
            tick(&mut state, &left, FRAME_DT);
        }
        assert_eq!(state.player_lane, leftmost_lane());

        let right = TickInput {
            move_right: true,
            ..Default::default()
        };
        for _ in 0..40 {
            tick(&mut state, &right, FRAME_DT);
        }
        assert_eq!(state.player_lane, rightmost_lane());
    }

    #[test]
    fn test_determinism() {
        // Two sessions with the same seed and inputs stay identical
        let mut a = GameState::new(99999);
        let mut b = GameState::new(99999);

        let inputs = [
            TickInput::default(),
            TickInput {
                move_left: true,
                ..Default::default()
            },
            TickInput::default(),
            TickInput {
                move_right: true,
                ..Default::default()
            },
        ];

        for _ in 0..60 {
            for input in &inputs {
                tick(&mut a, input, FRAME_DT);
                tick(&mut b, input, FRAME_DT);
            }
        }

        assert_eq!(a.time_ticks, b.time_ticks);
        assert_eq!(a.score, b.score);
        assert_eq!(a.health, b.health);
        assert_eq!(a.player_lane, b.player_lane);
        assert_eq!(a.obstacles, b.obstacles);
    }

    proptest! {
        #[test]
        fn wave_is_always_a_full_permutation(seed in any::<u64>(), z in -100.0f32..0.0) {
            let mut rng = Pcg32::seed_from_u64(seed);
            let wave = generate_wave(z, &mut rng);

            prop_assert_eq!(wave.len(), 3);
            for kind in ObstacleKind::ALL {
                prop_assert_eq!(wave.iter().filter(|o| o.kind == kind).count(), 1);
            }
            let mut lanes: Vec<f32> = wave.iter().map(|o| o.lane).collect();
            lanes.sort_by(|a, b| a.partial_cmp(b).expect("lane is never NaN"));
            prop_assert_eq!(lanes, LANES.to_vec());
            prop_assert!(wave.iter().all(|o| o.z == z));
        }

        #[test]
        fn collision_fires_at_most_once(seed in any::<u64>(), steps in 1usize..200) {
            let mut rng = Pcg32::seed_from_u64(seed);
            let mut obstacle = Obstacle::new(ObstacleKind::Rabbit, 0.0, -50.0);
            let mut hits = 0;
            for _ in 0..steps {
                obstacle.advance(rng.random_range(0.0..5.0));
                if obstacle.check_collision(0.0) {
                    hits += 1;
                }
            }
            prop_assert!(hits <= 1);
        }
    }
}
