// src/core/modules/mod.rs
//! A collection of status module implementations.

pub mod battery;
pub mod disk;
pub mod net;
pub mod time;
pub mod volume;
