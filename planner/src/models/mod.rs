//! Core domain models for target planning.
//!
//! Altitude samples and horizons feed the circumstance solver, projects and
//! targets feed the scoring rules, and plan instructions flow through the
//! dither injector.

pub mod altitude;
pub mod horizon;
pub mod instruction;
pub mod location;
pub mod target;

pub use altitude::*;
pub use horizon::*;
pub use instruction::*;
pub use location::*;
pub use target::*;
