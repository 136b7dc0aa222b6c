// src/core/modules/disk.rs
//
// Disk usage for a single mount point. Space figures come from sysinfo's
// mounted-filesystem list, re-scanned on every sample so (un)mounts are
// picked up. sysinfo exposes one "available" figure, so %free and %avail
// render the same value.

use crate::core::config::{DiskConfig, DiskThresholdType};
use crate::core::format::{ColorState, FormatTemplate};
use crate::core::module::{Block, Module};
use anyhow::{Context, Result};
use std::path::Path;
use sysinfo::Disks;

const BYTES_PER_GIB: f64 = 1024.0 * 1024.0 * 1024.0;

pub struct DiskModule {
    instance: String,
    format: FormatTemplate,
    low_threshold: i64,
    threshold_type: DiskThresholdType,
    disks: Disks,
}

impl DiskModule {
    pub fn new(instance: &str, cfg: &DiskConfig) -> Self {
        DiskModule {
            instance: instance.to_string(),
            format: FormatTemplate::parse(&cfg.format),
            low_threshold: cfg.low_threshold,
            threshold_type: cfg.threshold_type,
            disks: Disks::new_with_refreshed_list(),
        }
    }
}

impl Module for DiskModule {
    fn name(&self) -> &'static str {
        "disk"
    }

    fn instance(&self) -> Option<&str> {
        Some(&self.instance)
    }

    fn sample(&mut self) -> Result<Block> {
        self.disks.refresh_list();
        let disk = self
            .disks
            .iter()
            .find(|d| d.mount_point() == Path::new(&self.instance))
            .with_context(|| format!("No filesystem mounted at {}", self.instance))?;

        let total = disk.total_space();
        let avail = disk.available_space();
        let used = total.saturating_sub(avail);

        let vars = [
            ("free", humanize_bytes(avail)),
            ("avail", humanize_bytes(avail)),
            ("used", humanize_bytes(used)),
            ("total", humanize_bytes(total)),
            ("percentage_free", format_percentage(avail, total)),
            ("percentage_avail", format_percentage(avail, total)),
            ("percentage_used", format_percentage(used, total)),
        ];

        let state = if below_threshold(self.threshold_type, self.low_threshold, total, avail) {
            ColorState::Bad
        } else {
            ColorState::Neutral
        };

        Ok(Block::new(
            self.name(),
            Some(&self.instance),
            self.format.render(&vars),
            state,
        ))
    }
}

// A low_threshold of 0 disables the check
fn below_threshold(kind: DiskThresholdType, low: i64, total: u64, avail: u64) -> bool {
    if low <= 0 || total == 0 {
        return false;
    }
    let value = match kind {
        DiskThresholdType::PercentageAvail | DiskThresholdType::PercentageFree => {
            avail as f64 * 100.0 / total as f64
        }
        DiskThresholdType::GbytesAvail => avail as f64 / BYTES_PER_GIB,
    };
    value < low as f64
}

fn format_percentage(part: u64, total: u64) -> String {
    if total == 0 {
        return "0.0%".to_string();
    }
    format!("{:.1}%", part as f64 * 100.0 / total as f64)
}

fn humanize_bytes(bytes: u64) -> String {
    const UNITS: &[&str] = &["B", "KiB", "MiB", "GiB", "TiB", "PiB"];
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    format!("{value:.1} {}", UNITS[unit])
}

#[cfg(test)]
mod tests {
    use super::{below_threshold, format_percentage, humanize_bytes};
    use crate::core::config::DiskThresholdType;

    const GIB: u64 = 1024 * 1024 * 1024;

    #[test]
    fn humanizes_byte_counts() {
        assert_eq!(humanize_bytes(0), "0.0 B");
        assert_eq!(humanize_bytes(512), "512.0 B");
        assert_eq!(humanize_bytes(1536), "1.5 KiB");
        assert_eq!(humanize_bytes(42 * GIB + GIB / 2), "42.5 GiB");
    }

    #[test]
    fn percentage_formatting() {
        assert_eq!(format_percentage(25 * GIB, 100 * GIB), "25.0%");
        assert_eq!(format_percentage(0, 0), "0.0%");
    }

    #[test]
    fn percentage_threshold() {
        // 5% available, threshold 10% -> below
        assert!(below_threshold(
            DiskThresholdType::PercentageAvail,
            10,
            100 * GIB,
            5 * GIB
        ));
        assert!(!below_threshold(
            DiskThresholdType::PercentageAvail,
            10,
            100 * GIB,
            20 * GIB
        ));
    }

    #[test]
    fn gbytes_threshold() {
        assert!(below_threshold(
            DiskThresholdType::GbytesAvail,
            10,
            100 * GIB,
            3 * GIB
        ));
        assert!(!below_threshold(
            DiskThresholdType::GbytesAvail,
            10,
            100 * GIB,
            30 * GIB
        ));
    }

    #[test]
    fn zero_threshold_disables_check() {
        assert!(!below_threshold(
            DiskThresholdType::PercentageAvail,
            0,
            100 * GIB,
            0
        ));
    }
}
