use log::debug;

use crate::config::{GraphConfig, TransitionMode};
use crate::graph::functions::FunctionName;
use crate::math::hash11;

/// Timing of which function a graph shows and when it morphs.
///
/// A function is held for `function_duration` seconds, then the graph
/// morphs from it to the next one over `transition_duration` seconds.
/// Leftover time is carried over instead of being dropped, so the rhythm
/// does not drift with the frame rate.
#[derive(Clone, Debug)]
pub struct FunctionSchedule {
    function: FunctionName,
    transition_function: FunctionName,
    function_duration: f32,
    transition_duration: f32,
    mode: TransitionMode,
    duration: f32,
    transitioning: bool,
    seed: f32,
    draws: u32,
}

impl FunctionSchedule {
    /// `seed` drives the `Random` mode; equal seeds give equal sequences.
    pub fn new(config: &GraphConfig, seed: u32) -> Self {
        Self {
            function: config.function,
            transition_function: config.function,
            function_duration: config.function_duration.max(0.0),
            transition_duration: config.transition_duration.max(0.0),
            mode: config.transition_mode,
            duration: 0.0,
            transitioning: false,
            seed: (seed % 4096) as f32,
            draws: 0,
        }
    }

    /// Function shown now, or the target of the running transition.
    pub fn function(&self) -> FunctionName {
        self.function
    }

    /// Function the running transition started from.
    pub fn transition_function(&self) -> FunctionName {
        self.transition_function
    }

    pub fn is_transitioning(&self) -> bool {
        self.transitioning
    }

    pub fn mode(&self) -> TransitionMode {
        self.mode
    }

    pub fn set_mode(&mut self, mode: TransitionMode) {
        self.mode = mode;
    }

    /// Jump straight to `function`, cancelling any running transition.
    pub fn set_function(&mut self, function: FunctionName) {
        self.function = function;
        self.transition_function = function;
        self.transitioning = false;
        self.duration = 0.0;
    }

    /// Linear progress of the running transition in `[0, 1]`. A zero-length
    /// transition is already complete.
    pub fn progress(&self) -> f32 {
        if !self.transitioning {
            return 0.0;
        }
        if self.transition_duration <= 0.0 {
            return 1.0;
        }
        (self.duration / self.transition_duration).clamp(0.0, 1.0)
    }

    /// Advance the clock by `delta_time` seconds.
    pub fn advance(&mut self, delta_time: f32) {
        self.duration += delta_time.max(0.0);
        if self.transitioning {
            if self.duration >= self.transition_duration {
                self.duration -= self.transition_duration;
                self.transitioning = false;
            }
        } else if self.duration >= self.function_duration {
            self.duration -= self.function_duration;
            self.transitioning = true;
            self.transition_function = self.function;
            self.function = self.pick_next();
            debug!(
                "graph transition {:?} -> {:?}",
                self.transition_function, self.function
            );
        }
    }

    fn pick_next(&mut self) -> FunctionName {
        match self.mode {
            TransitionMode::Cycle => self.function.next(),
            TransitionMode::Random => {
                self.draws = self.draws.wrapping_add(1);
                let r = hash11(self.seed * 97.0 + (self.draws % 65536) as f32 * 1.618);
                self.function.random_other_than(r)
            }
        }
    }
}
