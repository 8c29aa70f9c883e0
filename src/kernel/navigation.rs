use serde::{Deserialize, Serialize};

/// One instruction of a walking route.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NavigationStep {
    pub instruction: String,
    pub orientation: String,
    pub road_name: String,
    pub distance_m: u32,
}

impl NavigationStep {
    pub fn new(instruction: impl Into<String>, distance_m: u32) -> Self {
        Self {
            instruction: instruction.into(),
            orientation: String::new(),
            road_name: String::new(),
            distance_m,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Route {
    pub steps: Vec<NavigationStep>,
    pub total_distance_m: u32,
    pub total_duration_s: u32,
}

/// In-progress route guidance.
///
/// While `active`, `current_step_index < route.steps.len()`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NavigationState {
    route: Route,
    current_step_index: usize,
    active: bool,
}

impl NavigationState {
    /// Replaces any route in progress. An empty route leaves navigation inactive.
    pub fn start(route: Route) -> Self {
        let active = !route.steps.is_empty();
        Self {
            route,
            current_step_index: 0,
            active,
        }
    }

    pub fn route(&self) -> &Route {
        &self.route
    }

    pub fn current_step_index(&self) -> usize {
        self.current_step_index
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn current_step(&self) -> Option<&NavigationStep> {
        if self.active {
            self.route.steps.get(self.current_step_index)
        } else {
            None
        }
    }

    /// Moves to the next step. Past the last step navigation finishes.
    pub fn advance(&mut self) -> Option<&NavigationStep> {
        if !self.active {
            return None;
        }
        if self.current_step_index + 1 < self.route.steps.len() {
            self.current_step_index += 1;
            self.route.steps.get(self.current_step_index)
        } else {
            self.active = false;
            None
        }
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }
}
