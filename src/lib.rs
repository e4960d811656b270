pub mod ai;
pub mod attitude;
pub mod buoy;
pub mod events;
pub mod object;
pub mod rng;
pub mod ship;
pub mod simulation;
pub mod snapshot;
pub mod transition;
