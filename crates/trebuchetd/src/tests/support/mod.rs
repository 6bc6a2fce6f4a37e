//! Test harness utilities shared by the unit and behavioural suites.

mod components;
mod reporter;
mod world;

pub use components::{FailingComponent, RecordingComponent, free_port};
pub use reporter::{HealthEvent, RecordingHealthReporter};
pub use world::{TestWorld, world};
