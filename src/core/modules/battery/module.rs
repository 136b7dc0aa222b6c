// src/core/modules/battery/module.rs

use super::backend::{BatteryBackend, BatteryBackendKind, BatteryReading, BatteryStatus};
use super::sysfs_backend::SysfsBackend;
use super::upower_backend::UpowerBackend;
use crate::core::config::BatteryConfig;
use crate::core::format::{ColorState, FormatTemplate};
use crate::core::module::{Block, Module};
use anyhow::Result;
use std::time::Duration;
use tracing::warn;

pub struct BatteryModule {
    instance: String,
    format: FormatTemplate,
    format_down: FormatTemplate,
    status_chr: String,
    status_bat: String,
    status_full: String,
    status_unk: String,
    low_threshold: i64,
    backend: Box<dyn BatteryBackend>,
}

impl BatteryModule {
    pub fn new(instance: &str, cfg: &BatteryConfig) -> Result<Self> {
        let backend: Box<dyn BatteryBackend> = match cfg.backend {
            BatteryBackendKind::Upower => Box::new(UpowerBackend::new(cfg)?),
            BatteryBackendKind::Sysfs => Box::new(SysfsBackend::discover(instance)?),
        };

        Ok(Self {
            instance: instance.to_string(),
            format: FormatTemplate::parse(&cfg.format),
            format_down: FormatTemplate::parse(&cfg.format_down),
            status_chr: cfg.status_chr.clone(),
            status_bat: cfg.status_bat.clone(),
            status_full: cfg.status_full.clone(),
            status_unk: cfg.status_unk.clone(),
            low_threshold: cfg.low_threshold,
            backend,
        })
    }

    fn status_text(&self, status: BatteryStatus) -> &str {
        match status {
            BatteryStatus::Charging => &self.status_chr,
            BatteryStatus::Discharging => &self.status_bat,
            BatteryStatus::Full => &self.status_full,
            BatteryStatus::Unknown => &self.status_unk,
        }
    }

    fn state_for(&self, reading: &BatteryReading) -> ColorState {
        match reading.status {
            BatteryStatus::Charging | BatteryStatus::Full => ColorState::Good,
            BatteryStatus::Discharging
                if (reading.percentage as i64) < self.low_threshold =>
            {
                ColorState::Bad
            }
            _ => ColorState::Neutral,
        }
    }
}

impl Module for BatteryModule {
    fn name(&self) -> &'static str {
        "battery"
    }

    fn instance(&self) -> Option<&str> {
        Some(&self.instance)
    }

    fn sample(&mut self) -> Result<Block> {
        let reading = match self.backend.read() {
            Ok(reading) => reading,
            // a battery that vanished at runtime renders as down rather
            // than killing the module
            Err(e) => {
                warn!(instance = %self.instance, error = %e, "Battery read failed");
                return Ok(Block::new(
                    self.name(),
                    Some(&self.instance),
                    self.format_down.render(&[]),
                    ColorState::Bad,
                ));
            }
        };

        let vars = [
            ("status", self.status_text(reading.status).to_string()),
            ("percentage", format!("{}%", reading.percentage)),
            (
                "remaining",
                reading
                    .remaining
                    .map(format_remaining)
                    .unwrap_or_default(),
            ),
        ];
        let text = self.format.render(&vars).trim_end().to_string();

        Ok(Block::new(
            self.name(),
            Some(&self.instance),
            text,
            self.state_for(&reading),
        ))
    }
}

// "H:MM" like the hardware tools print it
fn format_remaining(remaining: Duration) -> String {
    let minutes = remaining.as_secs() / 60;
    format!("{}:{:02}", minutes / 60, minutes % 60)
}
