pub mod booking_flow;
pub mod monitor;
pub mod step;

pub use booking_flow::BookingFlow;
pub use step::StepKind;
