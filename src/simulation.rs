use crate::buoy::{Buoy, CreationParameters};
use crate::events::{Particle, SimEvents};
use crate::object::{RadarVisible, WorldObject};
use crate::rng;
use crate::ship::{InstanceId, Ship, ShipData};
use crate::snapshot::{BuoySnapshot, ShipSnapshot, Snapshot};
use crate::transition::{BaseId, TransitionQueue, TransitionRequest};
use nalgebra::Vector2;
use rand_chacha::ChaCha8Rng;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, RwLock};

pub const PHYSICS_TICK_LENGTH: f64 = 1.0 / 60.0;

#[derive(Clone, Debug)]
pub struct Base {
    pub id: BaseId,
    pub name: String,
}

/// Player state that survives scene transitions.
#[derive(Clone, Debug, Default)]
pub struct PlayerRecord {
    pub health: Option<f64>,
}

/// The world container. Every method takes `&self`; interior mutability lets
/// a fixed-step simulation thread and an event-driven interaction thread
/// drive the same instances concurrently. Each entity guards its own fields;
/// no operation holds two entity locks of the same kind at once.
pub struct Simulation {
    ships: RwLock<HashMap<InstanceId, Arc<Ship>>>,
    buoys: RwLock<Vec<Arc<Buoy>>>,
    bases: RwLock<HashMap<BaseId, Base>>,
    player: RwLock<Option<InstanceId>>,
    variables: RwLock<HashMap<String, String>>,
    input_enabled: AtomicBool,
    player_record: Mutex<PlayerRecord>,
    events: Mutex<SimEvents>,
    transitions: TransitionQueue,
    pub(crate) rng: Mutex<ChaCha8Rng>,
    next_instance_id: AtomicU32,
    tick: AtomicU32,
}

impl Simulation {
    pub fn new(seed: u32) -> Simulation {
        log::info!("seed {seed}");
        Simulation {
            ships: RwLock::new(HashMap::new()),
            buoys: RwLock::new(Vec::new()),
            bases: RwLock::new(HashMap::new()),
            player: RwLock::new(None),
            variables: RwLock::new(HashMap::new()),
            input_enabled: AtomicBool::new(true),
            player_record: Mutex::new(PlayerRecord::default()),
            events: Mutex::new(SimEvents::new()),
            transitions: TransitionQueue::new(),
            rng: Mutex::new(rng::new_rng(seed)),
            next_instance_id: AtomicU32::new(1),
            tick: AtomicU32::new(0),
        }
    }

    pub fn tick(&self) -> u32 {
        self.tick.load(Ordering::Relaxed)
    }

    pub fn time(&self) -> f64 {
        self.tick() as f64 * PHYSICS_TICK_LENGTH
    }

    /// Advances the world one fixed step: buoy alive/physics ticks, then
    /// ship motion integration.
    pub fn step(&self) {
        self.events.lock().unwrap().clear();

        let buoys: Vec<Arc<Buoy>> = self.buoys.read().unwrap().iter().cloned().collect();
        for buoy in &buoys {
            buoy.alive_tick(self, PHYSICS_TICK_LENGTH);
        }
        for buoy in &buoys {
            buoy.physics_tick(PHYSICS_TICK_LENGTH);
        }

        let ships: Vec<Arc<Ship>> = self.ships.read().unwrap().values().cloned().collect();
        for ship in &ships {
            ship.physics_tick(PHYSICS_TICK_LENGTH);
        }

        self.tick.fetch_add(1, Ordering::Relaxed);
    }

    // Instance registry.

    pub(crate) fn add_ship(
        &self,
        position: Vector2<f64>,
        velocity: Vector2<f64>,
        heading: f64,
        data: ShipData,
    ) -> InstanceId {
        let id = InstanceId(self.next_instance_id.fetch_add(1, Ordering::Relaxed));
        let ship = Arc::new(Ship::new(id, position, velocity, heading, data));
        self.ships.write().unwrap().insert(id, ship);
        id
    }

    pub fn ship(&self, id: InstanceId) -> Option<Arc<Ship>> {
        self.ships.read().unwrap().get(&id).cloned()
    }

    pub fn remove_ship(&self, id: InstanceId) {
        self.ships.write().unwrap().remove(&id);
    }

    pub fn add_buoy(&self, params: CreationParameters) -> Arc<Buoy> {
        let id = InstanceId(self.next_instance_id.fetch_add(1, Ordering::Relaxed));
        let buoy = Arc::new(Buoy::new(id, params));
        self.buoys.write().unwrap().push(buoy.clone());
        buoy
    }

    pub fn set_player(&self, id: InstanceId) {
        *self.player.write().unwrap() = Some(id);
    }

    pub fn player(&self) -> Option<InstanceId> {
        *self.player.read().unwrap()
    }

    // Universe data.

    pub fn register_base(&self, id: BaseId, name: &str) {
        self.bases.write().unwrap().insert(
            id,
            Base {
                id,
                name: name.to_string(),
            },
        );
    }

    pub fn base_name(&self, id: BaseId) -> Option<String> {
        self.bases.read().unwrap().get(&id).map(|b| b.name.clone())
    }

    // Config variable store.

    pub fn set_string_variable(&self, key: &str, value: &str) {
        self.variables
            .write()
            .unwrap()
            .insert(key.to_string(), value.to_string());
    }

    pub fn get_string_variable(&self, key: &str) -> Option<String> {
        self.variables.read().unwrap().get(key).cloned()
    }

    // Global input gate.

    pub fn enable_input(&self, enabled: bool) {
        self.input_enabled.store(enabled, Ordering::Relaxed);
    }

    pub fn input_enabled(&self) -> bool {
        self.input_enabled.load(Ordering::Relaxed)
    }

    // Persisted player record.

    pub fn set_player_health(&self, health: f64) {
        self.player_record.lock().unwrap().health = Some(health);
    }

    pub fn player_health(&self) -> Option<f64> {
        self.player_record.lock().unwrap().health
    }

    // Side-effect sinks.

    pub fn events(&self) -> MutexGuard<'_, SimEvents> {
        self.events.lock().unwrap()
    }

    pub fn send_notification(&self, text: &str) {
        self.events.lock().unwrap().notifications.push(text.to_string());
    }

    pub fn send_comm(&self, sender: &str, text: &str) {
        log::debug!("comm from {sender}: {text:?}");
        self.events.lock().unwrap().comms.push(crate::events::Comm {
            sender: sender.to_string(),
            text: text.to_string(),
        });
    }

    pub fn play_sound(&self, id: i32) {
        self.events.lock().unwrap().sounds.push(id);
    }

    pub fn add_particle(
        &self,
        kind: i32,
        position: Vector2<f64>,
        velocity: Vector2<f64>,
        rotation: f64,
        scale: f64,
    ) {
        self.events.lock().unwrap().particles.push(Particle {
            kind,
            position,
            velocity,
            rotation,
            scale,
        });
    }

    // Deferred world-state transitions.

    pub fn request_transition(&self, request: TransitionRequest) {
        self.transitions.request_transition(request);
    }

    pub fn drain_transitions(&self) -> Vec<TransitionRequest> {
        self.transitions.drain()
    }

    pub fn snapshot(&self) -> Snapshot {
        let mut snapshot = Snapshot {
            tick: self.tick(),
            ships: vec![],
            buoys: vec![],
        };

        for ship in self.ships.read().unwrap().values() {
            snapshot.ships.push(ShipSnapshot {
                id: ship.id(),
                radar_class: ship.radar_class().to_string(),
                position: WorldObject::position(ship.as_ref()),
                velocity: ship.velocity(),
                heading: ship.heading(),
                hit_pts: ship.hit_pts(),
            });
        }

        for buoy in self.buoys.read().unwrap().iter() {
            snapshot.buoys.push(BuoySnapshot {
                id: buoy.id(),
                radar_class: buoy.radar_class().to_string(),
                position: WorldObject::position(buoy.as_ref()),
                used: buoy.used(),
            });
        }

        snapshot
    }
}
