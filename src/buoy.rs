use crate::ai;
use crate::attitude::{Attitude, AttitudeSet};
use crate::events::{SOUND_DOCK_CONFIRM, SOUND_FLAK_FIRE, SOUND_JUMP_CONFIRM};
use crate::object::{RadarVisible, WorldObject};
use crate::ship::InstanceId;
use crate::simulation::Simulation;
use crate::transition::{BaseId, SectorId, TransitionRequest};
use nalgebra::{vector, Rotation2, Vector2};
use rand::Rng;
use std::f64::consts::PI;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, RwLock};

pub const INTERACT_RANGE: f64 = 750.0;
pub const LAND_COUNTDOWN: f64 = 2.5;
pub const JUMP_COUNTDOWN: f64 = 10.0;
pub const ACCEL_COUNTDOWN: f64 = 5.6;
/// Sentinel the countdown is pinned to after the transition fires, large
/// enough that it never goes negative again.
pub const COUNTDOWN_PINNED: f64 = 1_000_000.0;
const VELOCITY_DAMPING: f64 = 0.99;
const JUMP_EXIT_SPEED: f64 = 20000.0;

pub const FLAK_RANGE: f64 = 2500.0;
pub const FLAK_INITIAL_COUNTDOWN: f64 = 10.0;
pub const FLAK_REPEAT_INTERVAL: f64 = 0.5;
const FLAK_BURST_PARTICLES: usize = 20;
const FLAK_PARTICLE_KIND: i32 = 4;
const FLAK_SCATTER_RADIUS: f64 = 750.0;

#[derive(Clone, Debug)]
pub enum BuoyClass {
    Landing {
        target_base: Option<BaseId>,
    },
    Jump {
        destination_sector: SectorId,
        destination_position: Vector2<f64>,
    },
}

#[derive(Clone, Debug)]
pub struct CreationParameters {
    pub name: String,
    pub radar_class: String,
    pub position: Vector2<f64>,
    pub class: BuoyClass,
    pub attitudes: AttitudeSet,
}

pub fn landing_buoy(name: &str, position: Vector2<f64>, target_base: Option<BaseId>) -> CreationParameters {
    CreationParameters {
        name: name.to_string(),
        radar_class: "buoy".to_string(),
        position,
        class: BuoyClass::Landing { target_base },
        attitudes: AttitudeSet::default(),
    }
}

pub fn jump_buoy(
    name: &str,
    position: Vector2<f64>,
    destination_sector: SectorId,
    destination_position: Vector2<f64>,
) -> CreationParameters {
    CreationParameters {
        name: name.to_string(),
        radar_class: "buoy".to_string(),
        position,
        class: BuoyClass::Jump {
            destination_sector,
            destination_position,
        },
        attitudes: AttitudeSet::default(),
    }
}

#[derive(Debug)]
struct BuoyFields {
    used: bool,
    interactor: Option<InstanceId>,
    transition_countdown: f64,
    accel_countdown: f64,
    flak_countdown: f64,
    warned_player: bool,
}

/// A stationary interactive object that docks a ship at a base (landing
/// class) or sends it to another sector (jump class).
///
/// The engine may run `alive_tick`, `physics_tick`, `collision_callback`,
/// and `interact` for the same instance from different threads. All mutable
/// state sits behind the per-instance field lock; lookups on other instances
/// (ship positions, the registry) take only those instances' own locks, so
/// no two buoy locks are ever held together.
pub struct Buoy {
    id: InstanceId,
    name: String,
    radar_class: String,
    position: Vector2<f64>,
    class: BuoyClass,
    attitudes: RwLock<AttitudeSet>,
    fields: Mutex<BuoyFields>,
    ticks_alive: AtomicU64,
}

impl Buoy {
    pub fn new(id: InstanceId, params: CreationParameters) -> Buoy {
        let (transition_countdown, accel_countdown) = match params.class {
            BuoyClass::Landing { .. } => (LAND_COUNTDOWN, 0.0),
            BuoyClass::Jump { .. } => (JUMP_COUNTDOWN, ACCEL_COUNTDOWN),
        };
        Buoy {
            id,
            name: params.name,
            radar_class: params.radar_class,
            position: params.position,
            class: params.class,
            attitudes: RwLock::new(params.attitudes),
            fields: Mutex::new(BuoyFields {
                used: false,
                interactor: None,
                transition_countdown,
                accel_countdown,
                flak_countdown: FLAK_INITIAL_COUNTDOWN,
                warned_player: false,
            }),
            ticks_alive: AtomicU64::new(0),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn class(&self) -> &BuoyClass {
        &self.class
    }

    pub fn used(&self) -> bool {
        self.fields.lock().unwrap().used
    }

    pub fn interactor(&self) -> Option<InstanceId> {
        self.fields.lock().unwrap().interactor
    }

    pub fn transition_countdown(&self) -> f64 {
        self.fields.lock().unwrap().transition_countdown
    }

    pub fn flak_countdown(&self) -> f64 {
        self.fields.lock().unwrap().flak_countdown
    }

    pub fn warned_player(&self) -> bool {
        self.fields.lock().unwrap().warned_player
    }

    pub fn set_attitude(&self, id: InstanceId, attitude: Attitude) {
        self.attitudes.write().unwrap().set_attitude(id, attitude);
    }

    /// Attempts to claim the buoy for `interactor`. Rejections emit a single
    /// notification and leave the state untouched; a second call after a
    /// successful claim is a no-op.
    pub fn interact(&self, sim: &Simulation, interactor: InstanceId) {
        let mut fields = self.fields.lock().unwrap();

        if fields.used {
            return;
        }

        if sim.get_string_variable("docking_enabled").as_deref() == Some("n") {
            sim.send_notification(match self.class {
                BuoyClass::Landing { .. } => "You may not dock at this time",
                BuoyClass::Jump { .. } => "You may not jump at this time",
            });
            return;
        }

        let Some(ship) = sim.ship(interactor) else {
            // Interactor vanished between the request and this call.
            return;
        };

        if (ship.position() - self.position).magnitude() < INTERACT_RANGE {
            if let BuoyClass::Landing { .. } = self.class {
                if self.attitudes.read().unwrap().get_attitude(interactor) < Attitude::Cold {
                    sim.send_notification("Dock access denied.");
                    return;
                }
            }

            fields.used = true;
            fields.interactor = Some(interactor);
            sim.enable_input(false);
            sim.play_sound(match self.class {
                BuoyClass::Landing { .. } => SOUND_DOCK_CONFIRM,
                BuoyClass::Jump { .. } => SOUND_JUMP_CONFIRM,
            });
            sim.send_notification(match self.class {
                BuoyClass::Landing { .. } => "Docking...",
                BuoyClass::Jump { .. } => "Jumping...",
            });

            // Carry the ship's health across the pending scene transition.
            sim.set_player_health(ship.hit_pts());

            log::debug!("{} claimed by instance {:?}", self.name, interactor);
        } else {
            sim.send_notification("Too far to interact");
        }
    }

    pub fn alive_tick(&self, sim: &Simulation, delta: f64) {
        let mut fields = self.fields.lock().unwrap();

        if fields.used {
            let interactor_ship = fields.interactor.and_then(|id| sim.ship(id));

            // A destroyed interactor skips steering for this step; the
            // countdown keeps progressing regardless.
            if let Some(ship) = &interactor_ship {
                match self.class {
                    BuoyClass::Landing { .. } => {
                        ship.set_throttle(0.0);
                        ship.set_velocity(ship.velocity() * VELOCITY_DAMPING);
                        ai::aim_at_point(ship, self.position);
                    }
                    BuoyClass::Jump { .. } => {
                        ai::aim_at_point(ship, vector![0.0, 100000.0]);

                        if fields.accel_countdown < 0.0 {
                            ship.set_velocity(vector![0.0, JUMP_EXIT_SPEED]);
                        } else {
                            ship.set_throttle(0.0);
                            ship.set_velocity(ship.velocity() * VELOCITY_DAMPING);
                            fields.accel_countdown -= delta;
                        }
                    }
                }
            }

            if fields.transition_countdown < 0.0 {
                sim.request_transition(match self.class {
                    BuoyClass::Landing { target_base } => TransitionRequest::Dock { base: target_base },
                    BuoyClass::Jump {
                        destination_sector,
                        destination_position,
                    } => TransitionRequest::SectorJump {
                        sector: destination_sector,
                        position: destination_position,
                    },
                });
                fields.transition_countdown = COUNTDOWN_PINNED;
            } else {
                fields.transition_countdown -= delta;
            }
        }

        // If our attitude towards the player is hostile and it's within
        // range, trigger the defensive flak screen.
        if let BuoyClass::Landing { target_base } = self.class {
            self.flak_tick(sim, delta, target_base, &mut fields);
        }

        drop(fields);
        self.base_alive_tick();
    }

    fn flak_tick(
        &self,
        sim: &Simulation,
        delta: f64,
        target_base: Option<BaseId>,
        fields: &mut BuoyFields,
    ) {
        let Some(player_id) = sim.player() else {
            return;
        };
        if self.attitudes.read().unwrap().get_attitude(player_id) > Attitude::Hostile {
            return;
        }
        let Some(player_ship) = sim.ship(player_id) else {
            return;
        };
        let player_position = player_ship.position();
        if (player_position - self.position).magnitude() >= FLAK_RANGE {
            return;
        }

        fields.flak_countdown -= delta;

        if !fields.warned_player {
            if let Some(base_name) = target_base.and_then(|id| sim.base_name(id)) {
                sim.send_comm(&base_name, "This is a restricted area.\nPlease leave at once.");
            }
            // Latches even when no base was available to attribute the comm
            // to; the warning is simply skipped in that case.
            fields.warned_player = true;
        }

        if fields.flak_countdown < 0.0 {
            sim.play_sound(SOUND_FLAK_FIRE);

            let damage = {
                let mut rng = sim.rng.lock().unwrap();
                for _ in 0..FLAK_BURST_PARTICLES {
                    let radius = rng.gen_range(0.0..FLAK_SCATTER_RADIUS);
                    let rot = Rotation2::new(rng.gen_range(-PI..PI));
                    let offset = rot.transform_vector(&vector![radius, 0.0]);
                    sim.add_particle(
                        FLAK_PARTICLE_KIND,
                        player_position + offset,
                        vector![0.0, 0.0],
                        0.0,
                        0.0,
                    );
                }
                rng.gen_range(10.0..50.0)
            };
            player_ship.inflict_damage(damage, damage);

            fields.flak_countdown = FLAK_REPEAT_INTERVAL;
        }
    }

    /// Generic per-object upkeep shared by every placed instance.
    fn base_alive_tick(&self) {
        self.ticks_alive.fetch_add(1, Ordering::Relaxed);
    }

    /// Reserved extension point. The lock bracket stays: the other tick
    /// methods rely on this lock for mutual exclusion, and a future physics
    /// handler must serialize the same way.
    pub fn physics_tick(&self, _delta: f64) {
        let _fields = self.fields.lock().unwrap();
    }

    /// Reserved extension point; serializes against concurrent field
    /// mutation like the tick methods.
    pub fn collision_callback(&self, _other: InstanceId) {
        let _fields = self.fields.lock().unwrap();
    }
}

impl WorldObject for Buoy {
    fn id(&self) -> InstanceId {
        self.id
    }

    fn position(&self) -> Vector2<f64> {
        self.position
    }
}

impl RadarVisible for Buoy {
    fn radar_class(&self) -> &str {
        &self.radar_class
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::ship;
    use crate::simulation::Simulation;
    use nalgebra::vector;
    use test_log::test;

    fn ship_at(sim: &Simulation, position: Vector2<f64>) -> InstanceId {
        ship::create(sim, position, vector![0.0, 0.0], 0.0, ship::fighter())
    }

    #[test]
    fn test_claim() {
        let sim = Simulation::new(0);
        let buoy = sim.add_buoy(landing_buoy("Outpost buoy", vector![0.0, 0.0], Some(1)));
        let id = ship_at(&sim, vector![100.0, 0.0]);

        assert!(!buoy.used());
        buoy.interact(&sim, id);
        assert!(buoy.used());
        assert_eq!(buoy.interactor(), Some(id));
        assert!(!sim.input_enabled());
        assert_eq!(sim.player_health(), Some(100.0));
        assert_eq!(sim.events().notifications, vec!["Docking...".to_string()]);
        assert_eq!(sim.events().sounds, vec![crate::events::SOUND_DOCK_CONFIRM]);
    }

    #[test]
    fn test_claim_idempotent() {
        let sim = Simulation::new(0);
        let buoy = sim.add_buoy(landing_buoy("Outpost buoy", vector![0.0, 0.0], Some(1)));
        let first = ship_at(&sim, vector![100.0, 0.0]);
        let second = ship_at(&sim, vector![50.0, 0.0]);

        buoy.interact(&sim, first);
        let notifications = sim.events().notifications.len();
        let sounds = sim.events().sounds.len();

        buoy.interact(&sim, second);
        buoy.interact(&sim, first);

        assert_eq!(buoy.interactor(), Some(first));
        assert_eq!(sim.events().notifications.len(), notifications);
        assert_eq!(sim.events().sounds.len(), sounds);
    }

    #[test]
    fn test_range_gate() {
        let sim = Simulation::new(0);
        let buoy = sim.add_buoy(landing_buoy("Outpost buoy", vector![0.0, 0.0], Some(1)));
        let id = ship_at(&sim, vector![INTERACT_RANGE, 0.0]);

        buoy.interact(&sim, id);
        assert!(!buoy.used());
        assert!(buoy.interactor().is_none());
        assert_eq!(
            sim.events().notifications,
            vec!["Too far to interact".to_string()]
        );
    }

    #[test]
    fn test_attitude_gate() {
        let sim = Simulation::new(0);
        let buoy = sim.add_buoy(landing_buoy("Outpost buoy", vector![0.0, 0.0], Some(1)));
        let id = ship_at(&sim, vector![100.0, 0.0]);
        buoy.set_attitude(id, Attitude::Hostile);

        buoy.interact(&sim, id);
        assert!(!buoy.used());
        assert_eq!(
            sim.events().notifications,
            vec!["Dock access denied.".to_string()]
        );

        // Cold is exactly at the threshold and passes.
        buoy.set_attitude(id, Attitude::Cold);
        buoy.interact(&sim, id);
        assert!(buoy.used());
    }

    #[test]
    fn test_jump_has_no_attitude_gate() {
        let sim = Simulation::new(0);
        let buoy = sim.add_buoy(jump_buoy("Jump buoy", vector![0.0, 0.0], 2, vector![0.0, 0.0]));
        let id = ship_at(&sim, vector![100.0, 0.0]);
        buoy.set_attitude(id, Attitude::Hostile);

        buoy.interact(&sim, id);
        assert!(buoy.used());
        assert_eq!(sim.events().notifications, vec!["Jumping...".to_string()]);
    }

    #[test]
    fn test_disabled_flag() {
        let sim = Simulation::new(0);
        sim.set_string_variable("docking_enabled", "n");

        let landing = sim.add_buoy(landing_buoy("Outpost buoy", vector![0.0, 0.0], Some(1)));
        let jump = sim.add_buoy(jump_buoy("Jump buoy", vector![5000.0, 0.0], 2, vector![0.0, 0.0]));
        let id = ship_at(&sim, vector![100.0, 0.0]);

        landing.interact(&sim, id);
        jump.interact(&sim, id);
        assert!(!landing.used());
        assert!(!jump.used());
        assert_eq!(
            sim.events().notifications,
            vec![
                "You may not dock at this time".to_string(),
                "You may not jump at this time".to_string(),
            ]
        );

        sim.set_string_variable("docking_enabled", "y");
        landing.interact(&sim, id);
        assert!(landing.used());
    }

    #[test]
    fn test_missing_interactor_rejected_silently() {
        let sim = Simulation::new(0);
        let buoy = sim.add_buoy(landing_buoy("Outpost buoy", vector![0.0, 0.0], Some(1)));

        buoy.interact(&sim, InstanceId(999));
        assert!(!buoy.used());
        assert!(sim.events().notifications.is_empty());
    }

    #[test]
    fn test_countdown_fires_once() {
        let sim = Simulation::new(0);
        let buoy = sim.add_buoy(landing_buoy("Outpost buoy", vector![0.0, 0.0], Some(7)));
        let id = ship_at(&sim, vector![100.0, 0.0]);
        buoy.interact(&sim, id);

        // 2.5s countdown at 1s steps goes negative after 3 ticks and fires
        // on the following tick.
        for _ in 0..3 {
            buoy.alive_tick(&sim, 1.0);
            assert!(sim.drain_transitions().is_empty());
        }
        buoy.alive_tick(&sim, 1.0);
        assert_eq!(
            sim.drain_transitions(),
            vec![TransitionRequest::Dock { base: Some(7) }]
        );

        // Pinned; never fires again.
        for _ in 0..100 {
            buoy.alive_tick(&sim, 1.0);
        }
        assert!(sim.drain_transitions().is_empty());
        assert!(buoy.transition_countdown() > 0.0);
    }

    #[test]
    fn test_countdown_survives_vanished_interactor() {
        let sim = Simulation::new(0);
        let buoy = sim.add_buoy(landing_buoy("Outpost buoy", vector![0.0, 0.0], Some(7)));
        let id = ship_at(&sim, vector![100.0, 0.0]);
        buoy.interact(&sim, id);
        sim.remove_ship(id);

        for _ in 0..4 {
            buoy.alive_tick(&sim, 1.0);
        }
        assert_eq!(sim.drain_transitions().len(), 1);
    }

    #[test]
    fn test_docking_deceleration() {
        let sim = Simulation::new(0);
        let buoy = sim.add_buoy(landing_buoy("Outpost buoy", vector![0.0, 0.0], Some(1)));
        let id = ship::create(
            &sim,
            vector![300.0, 400.0],
            vector![100.0, 0.0],
            0.0,
            ship::fighter(),
        );
        buoy.interact(&sim, id);

        buoy.alive_tick(&sim, 1.0 / 60.0);
        let ship = sim.ship(id).unwrap();
        approx::assert_abs_diff_eq!(ship.velocity().x, 99.0, epsilon = 1e-9);
        approx::assert_abs_diff_eq!(ship.throttle(), 0.0);
        // Aimed back at the buoy.
        approx::assert_abs_diff_eq!(
            ship.heading(),
            (-400.0f64).atan2(-300.0),
            epsilon = 1e-9
        );
    }

    #[test]
    fn test_jump_acceleration_phases() {
        let sim = Simulation::new(0);
        let buoy = sim.add_buoy(jump_buoy("Jump buoy", vector![0.0, 0.0], 4, vector![1.0, 2.0]));
        let id = ship::create(
            &sim,
            vector![100.0, 0.0],
            vector![50.0, 0.0],
            0.0,
            ship::fighter(),
        );
        buoy.interact(&sim, id);
        let ship = sim.ship(id).unwrap();

        // Pre-acceleration: damped drift, aimed straight ahead.
        for _ in 0..6 {
            buoy.alive_tick(&sim, 1.0);
            assert!(ship.velocity().norm() < 50.0);
        }
        // Aimed at the fixed far-ahead departure point.
        approx::assert_abs_diff_eq!(ship.heading(), std::f64::consts::FRAC_PI_2, epsilon = 0.01);

        // 5.6s at 1s steps goes negative after 6 ticks; the next tick snaps
        // to the outbound burst vector.
        buoy.alive_tick(&sim, 1.0);
        approx::assert_abs_diff_eq!(ship.velocity().y, 20000.0);

        // 10s jump countdown goes negative after 11 ticks and fires on the
        // tick after that.
        for _ in 0..5 {
            buoy.alive_tick(&sim, 1.0);
        }
        assert_eq!(
            sim.drain_transitions(),
            vec![TransitionRequest::SectorJump {
                sector: 4,
                position: vector![1.0, 2.0],
            }]
        );
    }

    #[test]
    fn test_physics_tick_and_collision_are_noops() {
        let sim = Simulation::new(0);
        let buoy = sim.add_buoy(landing_buoy("Outpost buoy", vector![0.0, 0.0], Some(1)));
        let id = ship_at(&sim, vector![100.0, 0.0]);

        buoy.physics_tick(1.0);
        buoy.collision_callback(id);
        assert!(!buoy.used());
        assert!(sim.events().notifications.is_empty());
    }
}
