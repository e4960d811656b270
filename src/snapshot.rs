use crate::ship::InstanceId;
use nalgebra::Vector2;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Snapshot {
    pub tick: u32,
    pub ships: Vec<ShipSnapshot>,
    pub buoys: Vec<BuoySnapshot>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ShipSnapshot {
    pub id: InstanceId,
    pub radar_class: String,
    pub position: Vector2<f64>,
    pub velocity: Vector2<f64>,
    pub heading: f64,
    pub hit_pts: f64,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct BuoySnapshot {
    pub id: InstanceId,
    pub radar_class: String,
    pub position: Vector2<f64>,
    pub used: bool,
}
