//! Helper functions, macros and diagnostic rendering

#[macro_use]
pub mod misc;
pub mod diag;
