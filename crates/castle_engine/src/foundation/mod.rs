//! Foundation module
//!
//! Small building blocks shared by the simulation and the action layer:
//! vector math, keyed collections, frame timing and logger setup.

pub mod collections;
pub mod logging;
pub mod math;
pub mod time;
