//! Domain models
//!
//! This module contains all domain models used throughout the application.

pub mod checkin;
pub mod group;
pub mod judge;
pub mod outcome;
pub mod participant;
pub mod score;

pub use checkin::*;
pub use group::*;
pub use judge::*;
pub use outcome::*;
pub use participant::*;
pub use score::*;
