//! Post-processing of a target's instruction sequence before execution.

pub mod dither;

pub use dither::DitherInjector;
