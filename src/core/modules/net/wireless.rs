// src/core/modules/net/wireless.rs
//
// Wireless link state: operstate from sysfs, link quality from
// /proc/net/wireless, ESSID from `iwgetid`, address from sysinfo.

use super::{interface_ip, link_is_up, resolve_interface};
use crate::core::config::WirelessConfig;
use crate::core::format::{ColorState, FormatTemplate};
use crate::core::module::{Block, Module};
use anyhow::Result;
use std::path::PathBuf;
use std::process::Command;
use sysinfo::Networks;
use tracing::debug;

// The kernel reports link quality out of 70
const QUALITY_MAX: f64 = 70.0;

pub struct WirelessModule {
    instance: String,
    format_up: FormatTemplate,
    format_down: FormatTemplate,
    networks: Networks,
}

impl WirelessModule {
    pub fn new(instance: &str, cfg: &WirelessConfig) -> Self {
        WirelessModule {
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

impl Module for WirelessModule {
    fn name(&self) -> &'static str {
        "wireless"
    }

    fn instance(&self) -> Option<&str> {
        Some(&self.instance)
    }

    fn sample(&mut self) -> Result<Block> {
        // `_first_` is re-resolved on every tick so hotplugged adapters
        // are picked up without a restart
        let iface = match resolve_interface(&self.instance, true) {
            Ok(iface) => iface,
            Err(e) => {
                debug!(error = %e, "No wireless interface");
                return Ok(self.down_block());
            }
        };
        if !link_is_up(&iface) {
            return Ok(self.down_block());
        }

        self.networks.refresh_list();
        let ip = interface_ip(&self.networks, &iface);
        let quality = read_quality(&iface)
            .map(|q| format!("{q}%"))
            .unwrap_or_else(|| "?".to_string());
        let essid = read_essid(&iface).unwrap_or_default();

        let state = if ip.is_some() {
            ColorState::Good
        } else {
            // link up but unconfigured
            ColorState::Degraded
        };
        let vars = [
            ("quality", quality),
            ("essid", essid),
            ("ip", ip.unwrap_or_else(|| "no IP".to_string())),
        ];

        Ok(Block::new(
            self.name(),
            Some(&self.instance),
            self.format_up.render(&vars),
            state,
        ))
    }
}

fn proc_net_wireless() -> PathBuf {
    std::env::var_os("PROC_NET_WIRELESS")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("/proc/net/wireless"))
}

fn read_quality(iface: &str) -> Option<u8> {
    let text = std::fs::read_to_string(proc_net_wireless()).ok()?;
    quality_from(&text, iface)
}

// Parses the kernel's wireless statistics table. The first two lines are
// headers; data lines look like
// ` wlan0: 0000   61.  -49.  -256        0      0      0      0      0        0`
fn quality_from(text: &str, iface: &str) -> Option<u8> {
    for line in text.lines().skip(2) {
        let mut fields = line.split_whitespace();
        let Some(name) = fields.next() else { continue };
        if name.trim_end_matches(':') != iface {
            continue;
        }
        let link = fields.nth(1)?;
        let link: f64 = link.trim_end_matches('.').parse().ok()?;
        let percent = (link / QUALITY_MAX * 100.0).round().clamp(0.0, 100.0);
        return Some(percent as u8);
    }
    None
}

fn read_essid(iface: &str) -> Option<String> {
    let output = Command::new("iwgetid").arg("-r").arg(iface).output().ok()?;
    if !output.status.success() {
        return None;
    }
    let essid = String::from_utf8_lossy(&output.stdout).trim().to_string();
    (!essid.is_empty()).then_some(essid)
}

#[cfg(test)]
mod tests {
    use super::quality_from;

    const PROC: &str = "\
Inter-| sta-|   Quality        |   Discarded packets               | Missed | WE
 face | tus | link level noise |  nwid  crypt   frag  retry   misc | beacon | 22
 wlan0: 0000   61.  -49.  -256        0      0      0      0      0        0
 wlan1: 0000   35.  -75.  -256        0      0      0      0      0        0
";

    #[test]
    fn parses_link_quality() {
        assert_eq!(quality_from(PROC, "wlan0"), Some(87));
        assert_eq!(quality_from(PROC, "wlan1"), Some(50));
    }

    #[test]
    fn unknown_interface_has_no_quality() {
        assert_eq!(quality_from(PROC, "wlan9"), None);
    }

    #[test]
    fn header_only_table() {
        let headers: String = PROC.lines().take(2).collect::<Vec<_>>().join("\n");
        assert_eq!(quality_from(&headers, "wlan0"), None);
    }
}
