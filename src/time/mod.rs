//! Clock abstractions shared by the scheduler and its tests.

pub mod source;

pub use source::{RealTimeSource, SimulatedTimeSource, TimeSource};
