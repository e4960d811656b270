use crate::ship::Ship;
use nalgebra::Vector2;

/// Orients a ship's heading directly at a world-space point. Used while a
/// buoy is servicing an interactor to line it up for docking or departure.
pub fn aim_at_point(ship: &Ship, target: Vector2<f64>) {
    let offset = target - ship.position();
    if offset.magnitude() < f64::EPSILON {
        return;
    }
    ship.set_heading(offset.y.atan2(offset.x));
}
