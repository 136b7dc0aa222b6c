// src/core/module.rs

use crate::core::format::ColorState;
use anyhow::Result;

// One rendered status block, produced by a module on each tick.
// The color state is resolved to a concrete color by the output sink.
#[derive(Debug, Clone, PartialEq)]
pub struct Block {
    pub name: String,
    pub instance: Option<String>,
    pub full_text: String,
    pub state: ColorState,
}

impl Block {
    pub fn new(name: &str, instance: Option<&str>, full_text: String, state: ColorState) -> Self {
        Block {
            name: name.to_string(),
            instance: instance.map(str::to_string),
            full_text,
            state,
        }
    }
}

// Core trait for a status module.
//
// Each module must:
// 1. provide its type `name()` and configured `instance()` for identification;
// 2. produce a fresh `Block` via `sample()` when the sampler ticks.
//
// `sample` takes `&mut self` so modules can keep state between ticks
// (previous counters, cached handles).
pub trait Module {
    // The module type, e.g. "disk" or "battery"
    fn name(&self) -> &'static str;

    // The configured instance qualifier, e.g. "/" or "all"
    fn instance(&self) -> Option<&str>;

    // Refresh the module's value and render it into a block
    fn sample(&mut self) -> Result<Block>;
}
