//! Core domain models for minici
//!
//! This module defines the fundamental data structures that represent
//! events, triggers, jobs, and run results.

pub mod config;
pub mod event;
pub mod job;
pub mod outcome;
pub mod trigger;

pub use event::*;
pub use job::*;
pub use outcome::*;
pub use trigger::*;
