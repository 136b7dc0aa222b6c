// src/core/mod.rs

pub mod config;
pub mod config_loader;
pub mod engine;
pub mod format;
pub mod module;
pub mod modules;
pub mod output;
pub mod parse;
pub mod registry;
pub mod sampler;
