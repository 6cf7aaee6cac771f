//! One bounded motor move per invocation.
//!
//! The motion trigger maps the active selection's step count onto the
//! stepper primitive: energize, move to the absolute target, block until
//! reached, re-zero the logical position, release. Because the position
//! is reset after every move, each run is the same fixed-length motion.
//!
//! The trigger never mutates the selection; the controller decides when
//! to fire based on the run input.

use crate::traits::StepperDriver;

/// Run one bounded move of `steps` steps.
///
/// Blocking: returns only once the motor has physically reached the
/// target (or never, on a mechanical stall; that condition is left to a
/// hardware watchdog). A step count of 0 is a safe no-op and does not
/// energize the motor.
///
/// Returns `true` when a move was performed.
///
/// # Example
///
/// ```rust
/// use stepfill::hal::MockStepper;
///
/// let mut stepper = MockStepper::new();
/// assert!(stepfill::motion::run_steps(&mut stepper, 6400).unwrap());
/// assert_eq!(stepper.moves.as_slice(), [6400]);
/// assert_eq!(stepper.position, 0);
/// ```
pub fn run_steps<S: StepperDriver>(stepper: &mut S, steps: u32) -> Result<bool, S::Error> {
    if steps == 0 {
        return Ok(false);
    }
    stepper.set_enabled(true)?;
    stepper.move_to(steps as i64)?;
    stepper.run_to_position()?;
    stepper.set_current_position(0)?;
    stepper.set_enabled(false)?;
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hal::MockStepper;

    #[test]
    fn one_move_then_position_reset() {
        let mut stepper = MockStepper::new();
        assert!(run_steps(&mut stepper, 6400).unwrap());

        assert_eq!(stepper.moves.as_slice(), [6400]);
        assert_eq!(stepper.position, 0);
        assert!(!stepper.enabled);
    }

    #[test]
    fn zero_steps_never_energizes() {
        let mut stepper = MockStepper::new();
        assert!(!run_steps(&mut stepper, 0).unwrap());

        assert!(stepper.moves.is_empty());
        assert_eq!(stepper.enable_calls, 0);
    }

    #[test]
    fn repeated_runs_are_identical_motions() {
        let mut stepper = MockStepper::new();
        run_steps(&mut stepper, 3200).unwrap();
        run_steps(&mut stepper, 3200).unwrap();
        run_steps(&mut stepper, 3200).unwrap();

        assert_eq!(stepper.moves.as_slice(), [3200, 3200, 3200]);
        assert_eq!(stepper.position, 0);
    }

    #[test]
    fn motor_released_between_runs() {
        let mut stepper = MockStepper::new();
        run_steps(&mut stepper, 100).unwrap();

        // enable then disable, once each per run
        assert_eq!(stepper.enable_calls, 2);
        assert!(!stepper.enabled);
    }
}
