//! Records exchanged with the serving-management API.

mod experiment;
mod instance;
pub mod timestamp;

pub use experiment::*;
pub use instance::*;
