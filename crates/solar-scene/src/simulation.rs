//! Shared simulation controls owned by the frame loop.

/// Bounds and rate for the orbit speed multiplier.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SimulationLimits {
    pub min_speed_multiplier: f32,
    pub max_speed_multiplier: f32,
    /// Multiplier change per second while a speed key is held.
    pub speed_change_rate: f32,
}

impl Default for SimulationLimits {
    fn default() -> Self {
        Self {
            min_speed_multiplier: 0.01,
            max_speed_multiplier: 5.0,
            speed_change_rate: 2.0,
        }
    }
}

/// Pause flag, speed multiplier, follow mode and target, and elapsed time.
///
/// Every body reads this during [`crate::SolarSystem::advance`]; only input
/// handling writes it.
#[derive(Clone, Debug, PartialEq)]
pub struct SimulationState {
    pub paused: bool,
    speed_multiplier: f32,
    limits: SimulationLimits,
    pub follow: bool,
    target: usize,
    /// Seconds since start. Keeps running while paused.
    pub elapsed: f32,
}

impl Default for SimulationState {
    fn default() -> Self {
        Self::new(1.0, SimulationLimits::default())
    }
}

impl SimulationState {
    pub fn new(speed_multiplier: f32, limits: SimulationLimits) -> Self {
        let (lo, hi) = ordered(limits.min_speed_multiplier, limits.max_speed_multiplier);
        let limits = SimulationLimits {
            min_speed_multiplier: lo,
            max_speed_multiplier: hi,
            ..limits
        };
        Self {
            paused: false,
            speed_multiplier: speed_multiplier.clamp(lo, hi),
            limits,
            follow: false,
            target: 0,
            elapsed: 0.0,
        }
    }

    pub fn pause(&mut self) {
        self.paused = true;
    }

    pub fn resume(&mut self) {
        self.paused = false;
    }

    pub fn speed_multiplier(&self) -> f32 {
        self.speed_multiplier
    }

    pub fn limits(&self) -> SimulationLimits {
        self.limits
    }

    /// Nudge the multiplier by `direction * speed_change_rate * dt`, clamped to the limits.
    pub fn change_speed(&mut self, direction: f32, dt: f32) {
        let delta = direction * self.limits.speed_change_rate * dt.max(0.0);
        self.speed_multiplier = (self.speed_multiplier + delta).clamp(
            self.limits.min_speed_multiplier,
            self.limits.max_speed_multiplier,
        );
    }

    /// Angle scale for this step: zero when paused.
    pub fn kinematic_dt(&self, dt: f32) -> f32 {
        if self.paused {
            0.0
        } else {
            dt * self.speed_multiplier
        }
    }

    pub fn target(&self) -> usize {
        self.target
    }

    /// Select a follow target and switch follow mode on. Indices past the
    /// last planet clamp to it.
    pub fn select_target(&mut self, index: usize, planet_count: usize) {
        self.target = clamp_target(index, planet_count);
        self.follow = true;
    }

    /// Re-clamp the current target, e.g. after loading a configured default.
    pub fn set_target(&mut self, index: usize, planet_count: usize) {
        self.target = clamp_target(index, planet_count);
    }

    /// Advance the wall clock used by the light orbit and follow camera.
    pub fn tick(&mut self, dt: f32) {
        self.elapsed += dt.max(0.0);
    }
}

fn clamp_target(index: usize, planet_count: usize) -> usize {
    index.min(planet_count.saturating_sub(1))
}

fn ordered(a: f32, b: f32) -> (f32, f32) {
    if a <= b { (a, b) } else { (b, a) }
}
