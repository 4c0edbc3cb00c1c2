//! Runtime mode state: the state machine and the idle reverter feeding it

pub mod idle;
pub mod machine;

pub use idle::{IdleReverter, RevertRequest, REVERT_CHANNEL_CAPACITY};
pub use machine::{Classification, ModeStateMachine, RevertOutcome, RuntimeState, ScanEvent};
