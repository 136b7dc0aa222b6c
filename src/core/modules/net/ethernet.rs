// src/core/modules/net/ethernet.rs
//
// Wired link state: operstate and negotiated speed from sysfs, address
// from sysinfo.

use super::{interface_ip, link_is_up, resolve_interface};
use crate::core::config::EthernetConfig;
use crate::core::format::{ColorState, FormatTemplate};
use crate::core::module::{Block, Module};
use anyhow::Result;
use std::fs;
use std::path::Path;
use sysinfo::Networks;
use tracing::debug;

pub struct EthernetModule {
    instance: String,
    format_up: FormatTemplate,
    format_down: FormatTemplate,
    networks: Networks,
}

impl EthernetModule {
    pub fn new(instance: &str, cfg: &EthernetConfig) -> Self {
        EthernetModule {
            instance: instance.to_string(),
            format_up: FormatTemplate::parse(&cfg.format_up),
            format_down: FormatTemplate::parse(&cfg.format_down),
            networks: Networks::new_with_refreshed_list(),
        }
    }

    fn down_block(&self) -> Block {
        Block::new(
            self.name(),
            Some(&self.instance),
            self.format_down.render(&[]),
            ColorState::Bad,
        )
    }
}

impl Module for EthernetModule {
    fn name(&self) -> &'static str {
        "ethernet"
    }

    fn instance(&self) -> Option<&str> {
        Some(&self.instance)
    }

    fn sample(&mut self) -> Result<Block> {
        let iface = match resolve_interface(&self.instance, false) {
            Ok(iface) => iface,
            Err(e) => {
                debug!(error = %e, "No wired interface");
                return Ok(self.down_block());
            }
        };
        if !link_is_up(&iface) {
            return Ok(self.down_block());
        }

        self.networks.refresh_list();
        let ip = interface_ip(&self.networks, &iface);
        let state = if ip.is_some() {
            ColorState::Good
        } else {
            ColorState::Degraded
        };
        let vars = [
            ("ip", ip.unwrap_or_else(|| "no IP".to_string())),
            ("speed", read_speed(&iface)),
        ];

        Ok(Block::new(
            self.name(),
            Some(&self.instance),
            self.format_up.render(&vars),
            state,
        ))
    }
}

fn read_speed(iface: &str) -> String {
    speed_from(&super::class_net_base(), iface)
}

// sysfs reports the negotiated speed in Mbit/s; -1 or a missing file means
// the driver doesn't know (common for virtual interfaces)
fn speed_from(base: &Path, iface: &str) -> String {
    let raw = fs::read_to_string(base.join(iface).join("speed")).unwrap_or_default();
    match raw.trim().parse::<i64>() {
        Ok(mbit) if mbit > 0 => {
            if mbit >= 1000 && mbit % 1000 == 0 {
                format!("{} Gbit/s", mbit / 1000)
            } else {
                format!("{mbit} Mbit/s")
            }
        }
        _ => "?".to_string(),
    }
}
