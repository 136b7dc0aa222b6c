// src/core/modules/time.rs
//
// A status block showing the current local time, formatted with a
// strftime pattern.

use crate::core::config::TimeConfig;
use crate::core::format::ColorState;
use crate::core::module::{Block, Module};
use anyhow::Result;
use chrono::Local;
use std::fmt::Write;

pub struct TimeModule {
    instance: String,
    format: String,
}

impl TimeModule {
    pub fn new(instance: &str, cfg: &TimeConfig) -> Self {
        TimeModule {
            instance: instance.to_string(),
            format: cfg.format.clone(),
        }
    }
}

impl Module for TimeModule {
    fn name(&self) -> &'static str {
        "tztime"
    }

    fn instance(&self) -> Option<&str> {
        Some(&self.instance)
    }

    fn sample(&mut self) -> Result<Block> {
        let mut text = String::with_capacity(32);
        // chrono's DelayedFormat surfaces bad specifiers as a fmt error
        write!(text, "{}", Local::now().format(&self.format))
            .map_err(|_| anyhow::anyhow!("Invalid time format `{}`", self.format))?;
        Ok(Block::new(
            self.name(),
            Some(&self.instance),
            text,
            ColorState::Neutral,
        ))
    }
}
