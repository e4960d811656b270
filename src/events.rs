use nalgebra::Vector2;
use serde::{Deserialize, Serialize};

pub const SOUND_DOCK_CONFIRM: i32 = 10;
pub const SOUND_FLAK_FIRE: i32 = 23;
pub const SOUND_JUMP_CONFIRM: i32 = 25;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Comm {
    pub sender: String,
    pub text: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Particle {
    pub kind: i32,
    pub position: Vector2<f64>,
    pub velocity: Vector2<f64>,
    pub rotation: f64,
    pub scale: f64,
}

/// Fire-and-forget side-effect sinks. Consumers (HUD, audio, renderer) drain
/// these after each step; nothing at this layer acknowledges or retries.
#[derive(Debug, Default)]
pub struct SimEvents {
    pub notifications: Vec<String>,
    pub comms: Vec<Comm>,
    pub sounds: Vec<i32>,
    pub particles: Vec<Particle>,
}

impl SimEvents {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn clear(&mut self) {
        self.notifications.clear();
        self.comms.clear();
        self.sounds.clear();
        self.particles.clear();
    }
}
