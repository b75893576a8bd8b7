//! # Logging Module
//!
//! Structured logging for the intersection control plane.
//!
//! This module provides hierarchical logging levels and structured event
//! tracking using the `tracing` crate with JSON output format.
//!
//! **Most of time end-developer should not use this module directly, except
//! for setting the global logging level and using logging macros.**
//!
//! ## Components
//!
//! - [`VerboseLevel`] - Hierarchical debug levels (None → Main → Additional → Detailed → All)
//! - [`verbose_log`] - Global logging functions
//! - Event constants - Predefined event types for controller phases
//! - Macros - `log_main!`, `log_additional!`, `log_detailed!`, `log_all!`
//!
//! ## Quick Start
//!
//! ```rust
//! use intersection_control_core::verbose::{set_verbose_level, VerboseLevel, EVENT_PHASE_TRANSITION};
//! use intersection_control_core::log_main;
//!
//! // Set global logging level
//! set_verbose_level(VerboseLevel::Main);
//!
//! // Log controller events
//! log_main!(EVENT_PHASE_TRANSITION, "advancing to next phase", next_idx = 2);
//! ```
//!
//! ## Logging Levels
//!
//! - `None` - No logging
//! - `Main` - Major controller phases only (SET_UP complete, phase transitions, state changes)
//! - `Additional` - Strategy-level decisions (extension granted, RFID validated)
//! - `Detailed` - Per-event dispatch and timer arming
//! - `All` - Everything (trace level)
//!
//! **Note**: this module tracks the rest of the crate closely and may be
//! refactored alongside it.
pub mod verbose;

pub use self::verbose::*;

// Initialize logger when module is loaded
use std::sync::Once;

static INIT: Once = Once::new();

pub fn ensure_logger_init() {
    INIT.call_once(|| {
        init_logger();
    });
}