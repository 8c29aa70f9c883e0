use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use super::navigation::{NavigationState, NavigationStep, Route};
use crate::position::{Coordinate, GpsFix};
use crate::vision::{PathStatus, SignalLightState};

/// Strict state delta. This is the ONLY way shared state mutates.
#[derive(Debug, Clone)]
pub enum StateDelta {
    /// Latest parsed fix; coordinates are kept only when it is valid
    Fix(GpsFix),
    SignalLight(SignalLightState),
    /// Latest ultrasonic range; None when nothing answered in time
    Range(Option<u32>),
    Path(PathStatus),
    /// Obstacle distance seen by the camera; None when none is present
    VisionObstacle(Option<u32>),
    RouteStarted(Route),
    StepAdvanced,
    NavigationCleared,
}

/// Everything shared between tasks.
#[derive(Debug, Clone, Default)]
pub struct SharedState {
    fix: Option<GpsFix>,
    last_known_position: Option<Coordinate>,
    signal_light: SignalLightState,
    navigation: NavigationState,
    last_range_cm: Option<u32>,
    path: PathStatus,
    vision_obstacle_cm: Option<u32>,
    /// Monotonic, bumped on every delta
    version: u64,
}

impl SharedState {
    /// Pure reduction: State + Delta -> Mutated State
    pub fn reduce(&mut self, delta: StateDelta) {
        self.version += 1;

        match delta {
            StateDelta::Fix(fix) => {
                if let Some(position) = fix.coordinate() {
                    self.last_known_position = Some(position);
                }
                self.fix = Some(fix);
            }
            StateDelta::SignalLight(light) => self.signal_light = light,
            StateDelta::Range(range) => self.last_range_cm = range,
            StateDelta::Path(path) => self.path = path,
            StateDelta::VisionObstacle(distance) => self.vision_obstacle_cm = distance,
            StateDelta::RouteStarted(route) => self.navigation = NavigationState::start(route),
            StateDelta::StepAdvanced => {
                self.navigation.advance();
            }
            StateDelta::NavigationCleared => self.navigation.clear(),
        }
    }

    pub fn snapshot(&self) -> StateSnapshot {
        StateSnapshot {
            fix: self.fix.clone(),
            last_known_position: self.last_known_position,
            signal_light: self.signal_light,
            navigation: self.navigation.clone(),
            last_range_cm: self.last_range_cm,
            path: self.path,
            vision_obstacle_cm: self.vision_obstacle_cm,
            version: self.version,
        }
    }
}

/// Copy-out view of the shared state; never a live reference.
#[derive(Debug, Clone, PartialEq)]
pub struct StateSnapshot {
    pub fix: Option<GpsFix>,
    pub last_known_position: Option<Coordinate>,
    pub signal_light: SignalLightState,
    pub navigation: NavigationState,
    pub last_range_cm: Option<u32>,
    pub path: PathStatus,
    pub vision_obstacle_cm: Option<u32>,
    pub version: u64,
}

/// The single shared mutable region of the device.
///
/// The lock is held for one delta or one snapshot copy and never across an
/// await point. A poisoned lock is recovered: a panicked writer must not take
/// every other task down with it.
#[derive(Debug, Clone, Default)]
pub struct SharedStateStore {
    inner: Arc<Mutex<SharedState>>,
}

impl SharedStateStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn apply(&self, delta: StateDelta) {
        self.lock().reduce(delta);
    }

    pub fn snapshot(&self) -> StateSnapshot {
        self.lock().snapshot()
    }

    pub fn last_range_cm(&self) -> Option<u32> {
        self.lock().last_range_cm
    }

    pub fn signal_light(&self) -> SignalLightState {
        self.lock().signal_light
    }

    pub fn fix(&self) -> Option<GpsFix> {
        self.lock().fix.clone()
    }

    pub fn last_known_position(&self) -> Option<Coordinate> {
        self.lock().last_known_position
    }

    pub fn navigation(&self) -> NavigationState {
        self.lock().navigation.clone()
    }

    /// Advances navigation and returns the new current step, atomically.
    pub fn advance_step(&self) -> Option<NavigationStep> {
        let mut state = self.lock();
        state.reduce(StateDelta::StepAdvanced);
        state.navigation.current_step().cloned()
    }

    fn lock(&self) -> MutexGuard<'_, SharedState> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
