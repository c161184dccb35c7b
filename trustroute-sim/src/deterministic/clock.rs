//! Simulated time.

use std::time::Duration;

use super::SimulationError;

/// Simulated clock measured from the start of the run.
///
/// Time only moves forward and has no relation to wall-clock time.
#[derive(Debug, Clone, Default)]
pub struct DeterministicClock {
    now: Duration,
}

impl DeterministicClock {
    /// Creates a clock at simulation time zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current simulation time.
    pub fn now(&self) -> Duration {
        self.now
    }

    /// Moves the clock to `target`.
    ///
    /// # Errors
    ///
    /// - `SimulationError::InvalidEventScheduling` - `target` is in the past
    pub fn advance_to(&mut self, target: Duration) -> Result<(), SimulationError> {
        if target < self.now {
            return Err(SimulationError::InvalidEventScheduling {
                reason: format!(
                    "cannot move clock backwards from {:?} to {target:?}",
                    self.now
                ),
            });
        }
        self.now = target;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clock_only_moves_forward() {
        let mut clock = DeterministicClock::new();
        clock.advance_to(Duration::from_secs(3)).unwrap();
        clock.advance_to(Duration::from_secs(3)).unwrap();
        assert_eq!(clock.now(), Duration::from_secs(3));

        let result = clock.advance_to(Duration::from_secs(1));
        assert!(matches!(
            result,
            Err(SimulationError::InvalidEventScheduling { .. })
        ));
        assert_eq!(clock.now(), Duration::from_secs(3));
    }
}
