use crate::ship::InstanceId;
use nalgebra::Vector2;

/// Identity and placement, the minimal surface every placed instance offers.
pub trait WorldObject {
    fn id(&self) -> InstanceId;
    fn position(&self) -> Vector2<f64>;
}

/// Instances that show up as radar contacts.
pub trait RadarVisible {
    fn radar_class(&self) -> &str;
}
