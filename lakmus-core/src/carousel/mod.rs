//! Carousel position model and route planning
//!
//! The six-tube sample carousel is driven by a four-phase stepper. This
//! module holds the pure position state and the math that plans a move;
//! the hardware-facing drive lives in `lakmus-drivers`.

pub mod position;
pub mod router;

pub use position::{Carousel, Direction, DrivePhase, TubeSlot, CAROUSEL_SLOTS, SLOT_POSITIONS};
pub use router::{plan_route, plan_route_to_slot, StepPlan};
