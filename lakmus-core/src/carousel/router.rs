//! Minimum-step route planning between carousel positions

use super::position::{Direction, TubeSlot};

/// A planned carousel move: direction and number of steps.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct StepPlan {
    pub direction: Direction,
    pub steps: u8,
}

/// Plan the shortest route from `current` to `target`.
///
/// Both distances are computed with `u8` wraparound arithmetic (the
/// mechanical period is at most 256 steps). The clockwise route wins ties.
pub fn plan_route(current: u8, target: u8) -> StepPlan {
    let clockwise = target.wrapping_sub(current);
    let counter_clockwise = current.wrapping_sub(target);

    if clockwise <= counter_clockwise {
        StepPlan {
            direction: Direction::Clockwise,
            steps: clockwise,
        }
    } else {
        StepPlan {
            direction: Direction::CounterClockwise,
            steps: counter_clockwise,
        }
    }
}

/// Plan the shortest route from `current` to a tube slot's seat.
pub fn plan_route_to_slot(current: u8, slot: TubeSlot) -> StepPlan {
    plan_route(current, slot.target_position())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_forward_route() {
        let plan = plan_route(50, 96);
        assert_eq!(plan.direction, Direction::Clockwise);
        assert_eq!(plan.steps, 46);
    }

    #[test]
    fn test_backward_route() {
        let plan = plan_route(96, 50);
        assert_eq!(plan.direction, Direction::CounterClockwise);
        assert_eq!(plan.steps, 46);
    }

    #[test]
    fn test_wraparound_route() {
        // 250 -> 10 is 16 steps forward across the wrap, not 240 back.
        let plan = plan_route(250, 10);
        assert_eq!(plan.direction, Direction::Clockwise);
        assert_eq!(plan.steps, 16);
    }

    #[test]
    fn test_already_at_target() {
        let plan = plan_route(129, 129);
        assert_eq!(plan.steps, 0);
        assert_eq!(plan.direction, Direction::Clockwise);
    }

    #[test]
    fn test_tie_prefers_clockwise() {
        let plan = plan_route(0, 128);
        assert_eq!(plan.direction, Direction::Clockwise);
        assert_eq!(plan.steps, 128);
    }

    #[test]
    fn test_route_to_slot() {
        let slot = TubeSlot::new(3).unwrap();
        let plan = plan_route_to_slot(50, slot);
        assert_eq!(plan.direction, Direction::Clockwise);
        assert_eq!(plan.steps, 46);
    }

    proptest! {
        #[test]
        fn plan_lands_on_target(current: u8, target: u8) {
            let plan = plan_route(current, target);

            let mut position = current;
            for _ in 0..plan.steps {
                position = match plan.direction {
                    Direction::Clockwise => position.wrapping_add(1),
                    Direction::CounterClockwise => position.wrapping_sub(1),
                };
            }
            prop_assert_eq!(position, target);
        }

        #[test]
        fn plan_is_minimal(current: u8, target: u8) {
            // The shorter of the two ways around never exceeds half the period.
            let plan = plan_route(current, target);
            prop_assert!(plan.steps <= 128);
        }
    }
}
