//! Scene description
//!
//! The simulation never draws; each frame it is flattened into this plain
//! data structure and handed to the renderer. Resolved obstacles are omitted
//! here - they still exist in the session until pruned, but never render.

use glam::Vec3;

use crate::app::{App, AppPhase};
use crate::consts::{MAX_HEALTH, PLAYER_Z};
use crate::display_health;
use crate::mesh::MeshId;
use crate::sim::{GamePhase, ObstacleKind};

/// One model instance to draw
#[derive(Debug, Clone, PartialEq)]
pub struct Prop {
    pub mesh: MeshId,
    pub position: Vec3,
    pub color: [f32; 3],
}

/// A batch of same-colored points (one particle burst)
#[derive(Debug, Clone, PartialEq)]
pub struct PointSet {
    pub color: [f32; 3],
    pub points: Vec<Vec3>,
}

/// HUD values; health is already clamped for display
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Hud {
    pub score: i32,
    pub health: i32,
    pub max_health: i32,
}

/// Which full-screen overlay to draw on top of the frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Overlay {
    None,
    Menu,
    Paused,
    GameOver,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Scene {
    pub props: Vec<Prop>,
    pub points: Vec<PointSet>,
    pub hud: Option<Hud>,
    pub overlay: Overlay,
}

impl Scene {
    fn empty(overlay: Overlay) -> Self {
        Self {
            props: Vec::new(),
            points: Vec::new(),
            hud: None,
            overlay,
        }
    }
}

fn mesh_for(kind: ObstacleKind) -> MeshId {
    match kind {
        ObstacleKind::Rabbit => MeshId::Rabbit,
        ObstacleKind::Gnome => MeshId::Gnome,
        ObstacleKind::Stone => MeshId::Stone,
    }
}

/// Flatten the application state into one frame's scene
pub fn compose(app: &App) -> Scene {
    match app.phase {
        AppPhase::Menu | AppPhase::Exit => Scene::empty(Overlay::Menu),
        AppPhase::GameOver => {
            let mut scene = Scene::empty(Overlay::GameOver);
            scene.hud = Some(Hud {
                score: app.final_score,
                health: 0,
                max_health: MAX_HEALTH,
            });
            scene
        }
        AppPhase::Playing => {
            let Some(session) = app.session.as_ref() else {
                return Scene::empty(Overlay::Menu);
            };

            // The pause screen blanks the field behind the panel
            if session.phase == GamePhase::Paused {
                return Scene::empty(Overlay::Paused);
            }

            let mut scene = Scene::empty(Overlay::None);

            scene.props.push(Prop {
                mesh: MeshId::Ground,
                position: Vec3::new(0.0, -0.25, 0.0),
                color: [0.25, 0.55, 0.2],
            });
            scene.props.push(Prop {
                mesh: MeshId::Mower,
                position: Vec3::new(session.player_lane, 0.0, PLAYER_Z),
                color: [1.0, 0.0, 0.0],
            });
            for obstacle in session.obstacles.iter().filter(|o| !o.resolved) {
                scene.props.push(Prop {
                    mesh: mesh_for(obstacle.kind),
                    position: obstacle.position(),
                    color: obstacle.kind.color(),
                });
            }

            for burst in &session.bursts {
                scene.points.push(PointSet {
                    color: burst.color,
                    points: burst.particles.iter().map(|p| p.pos).collect(),
                });
            }

            scene.hud = Some(Hud {
                score: session.score,
                health: display_health(session.health),
                max_health: MAX_HEALTH,
            });

            scene
        }
    }
}
