use crate::object::{RadarVisible, WorldObject};
use crate::simulation::Simulation;
use nalgebra::{vector, Rotation2, Vector2};
use serde::{Deserialize, Serialize};
use std::sync::Mutex;

/// Opaque handle referencing a live instance in the registry.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Serialize, Deserialize)]
pub struct InstanceId(pub u32);

#[derive(Clone, Debug)]
pub struct ShipData {
    pub name: String,
    pub radar_class: String,
    pub max_acceleration: f64,
    pub hit_pts: f64,
    pub shield_pts: f64,
}

impl Default for ShipData {
    fn default() -> ShipData {
        ShipData {
            name: "ship".to_string(),
            radar_class: "fighter".to_string(),
            max_acceleration: 60.0,
            hit_pts: 100.0,
            shield_pts: 100.0,
        }
    }
}

pub fn fighter() -> ShipData {
    ShipData::default()
}

#[derive(Clone, Debug)]
pub(crate) struct ShipState {
    pub position: Vector2<f64>,
    pub velocity: Vector2<f64>,
    pub heading: f64,
    pub throttle: f64,
    pub hit_pts: f64,
    pub shield_pts: f64,
}

/// A registered ship. Mutable state lives behind the per-instance lock so
/// buoys, the physics step, and interaction calls can touch it from
/// different threads.
pub struct Ship {
    id: InstanceId,
    data: ShipData,
    state: Mutex<ShipState>,
}

impl Ship {
    pub(crate) fn new(
        id: InstanceId,
        position: Vector2<f64>,
        velocity: Vector2<f64>,
        heading: f64,
        data: ShipData,
    ) -> Ship {
        let state = ShipState {
            position,
            velocity,
            heading,
            throttle: 0.0,
            hit_pts: data.hit_pts,
            shield_pts: data.shield_pts,
        };
        Ship {
            id,
            data,
            state: Mutex::new(state),
        }
    }

    pub fn data(&self) -> &ShipData {
        &self.data
    }

    pub fn position(&self) -> Vector2<f64> {
        self.state.lock().unwrap().position
    }

    pub fn velocity(&self) -> Vector2<f64> {
        self.state.lock().unwrap().velocity
    }

    pub fn heading(&self) -> f64 {
        self.state.lock().unwrap().heading
    }

    pub fn throttle(&self) -> f64 {
        self.state.lock().unwrap().throttle
    }

    pub fn hit_pts(&self) -> f64 {
        self.state.lock().unwrap().hit_pts
    }

    pub fn shield_pts(&self) -> f64 {
        self.state.lock().unwrap().shield_pts
    }

    pub fn set_throttle(&self, throttle: f64) {
        self.state.lock().unwrap().throttle = throttle.clamp(0.0, 1.0);
    }

    pub fn set_velocity(&self, velocity: Vector2<f64>) {
        self.state.lock().unwrap().velocity = velocity;
    }

    pub fn set_heading(&self, heading: f64) {
        self.state.lock().unwrap().heading = heading;
    }

    /// Shields absorb their argument first; hull takes the remainder once
    /// shields are down. Both floored at zero.
    pub fn inflict_damage(&self, hull: f64, shield: f64) {
        let mut state = self.state.lock().unwrap();
        if state.shield_pts > 0.0 {
            state.shield_pts = (state.shield_pts - shield).max(0.0);
        } else {
            state.hit_pts = (state.hit_pts - hull).max(0.0);
        }
    }

    /// Integrate one physics step: thrust along the heading, then advance
    /// position from velocity.
    pub(crate) fn physics_tick(&self, delta: f64) {
        let mut state = self.state.lock().unwrap();
        let thrust = state.throttle * self.data.max_acceleration;
        let accel = Rotation2::new(state.heading).transform_vector(&vector![thrust, 0.0]);
        let velocity = state.velocity + accel * delta;
        state.velocity = velocity;
        state.position += velocity * delta;
    }
}

impl WorldObject for Ship {
    fn id(&self) -> InstanceId {
        self.id
    }

    fn position(&self) -> Vector2<f64> {
        Ship::position(self)
    }
}

impl RadarVisible for Ship {
    fn radar_class(&self) -> &str {
        &self.data.radar_class
    }
}

/// Registers a ship with the simulation and returns its handle.
pub fn create(
    sim: &Simulation,
    position: Vector2<f64>,
    velocity: Vector2<f64>,
    heading: f64,
    data: ShipData,
) -> InstanceId {
    sim.add_ship(position, velocity, heading, data)
}
