// src/core/modules/net/mod.rs

//! Network link modules and their shared sysfs plumbing.

pub mod ethernet;
pub mod wireless;

pub use ethernet::EthernetModule;
pub use wireless::WirelessModule;

use anyhow::{Context, Result};
use std::fs;
use std::net::IpAddr;
use std::path::{Path, PathBuf};
use sysinfo::Networks;

fn class_net_base() -> PathBuf {
    std::env::var_os("SYS_CLASS_NET_BASE")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("/sys/class/net"))
}

fn is_wireless(base: &Path, iface: &str) -> bool {
    base.join(iface).join("wireless").is_dir()
}

// Resolve an instance qualifier to a concrete interface name. `_first_`
// picks the alphabetically first non-loopback interface of the wanted
// flavor, matching the behavior users expect from the config shorthand.
pub(crate) fn resolve_interface(instance: &str, wireless: bool) -> Result<String> {
    resolve_interface_in(&class_net_base(), instance, wireless)
}

pub(crate) fn resolve_interface_in(
    base: &Path,
    instance: &str,
    wireless: bool,
) -> Result<String> {
    if instance != "_first_" {
        return Ok(instance.to_string());
    }

    let mut names = Vec::new();
    for entry in fs::read_dir(base).with_context(|| format!("Reading {}", base.display()))? {
        let name = entry?.file_name().to_string_lossy().into_owned();
        if name != "lo" {
            names.push(name);
        }
    }
    names.sort();

    names
        .into_iter()
        .find(|name| is_wireless(base, name) == wireless)
        .ok_or_else(|| {
            anyhow::anyhow!(
                "No {} interface found under {}",
                if wireless { "wireless" } else { "wired" },
                base.display()
            )
        })
}

pub(crate) fn operstate(iface: &str) -> Result<String> {
    operstate_in(&class_net_base(), iface)
}

pub(crate) fn operstate_in(base: &Path, iface: &str) -> Result<String> {
    let path = base.join(iface).join("operstate");
    let state = fs::read_to_string(&path)
        .with_context(|| format!("Reading {}", path.display()))?;
    Ok(state.trim().to_string())
}

pub(crate) fn link_is_up(iface: &str) -> bool {
    operstate(iface).map(|s| s == "up").unwrap_or(false)
}

// First address of the interface, preferring IPv4
pub(crate) fn interface_ip(networks: &Networks, iface: &str) -> Option<String> {
    let (_, data) = networks.iter().find(|(name, _)| name.as_str() == iface)?;
    let addrs = data.ip_networks();
    addrs
        .iter()
        .find(|net| matches!(net.addr, IpAddr::V4(_)))
        .or_else(|| addrs.first())
        .map(|net| net.addr.to_string())
}

#[cfg(test)]
mod tests {
    use super::{operstate_in, resolve_interface_in};
    use std::fs;
    use tempfile::TempDir;

    fn fake_class_net() -> TempDir {
        let td = TempDir::new().unwrap();
        for iface in ["lo", "eth0", "wlan0"] {
            fs::create_dir_all(td.path().join(iface)).unwrap();
        }
        fs::create_dir_all(td.path().join("wlan0").join("wireless")).unwrap();
        fs::write(td.path().join("eth0").join("operstate"), "up\n").unwrap();
        fs::write(td.path().join("wlan0").join("operstate"), "down\n").unwrap();
        td
    }

    #[test]
    fn first_resolves_by_flavor() {
        let td = fake_class_net();
        assert_eq!(
            resolve_interface_in(td.path(), "_first_", true).unwrap(),
            "wlan0"
        );
        assert_eq!(
            resolve_interface_in(td.path(), "_first_", false).unwrap(),
            "eth0"
        );
    }

    #[test]
    fn explicit_instance_passes_through() {
        let td = fake_class_net();
        assert_eq!(
            resolve_interface_in(td.path(), "wlp2s0", true).unwrap(),
            "wlp2s0"
        );
    }

    #[test]
    fn loopback_is_never_picked() {
        let td = TempDir::new().unwrap();
        fs::create_dir_all(td.path().join("lo")).unwrap();
        assert!(resolve_interface_in(td.path(), "_first_", false).is_err());
    }

    #[test]
    fn reads_operstate() {
        let td = fake_class_net();
        assert_eq!(operstate_in(td.path(), "eth0").unwrap(), "up");
        assert_eq!(operstate_in(td.path(), "wlan0").unwrap(), "down");
        assert!(operstate_in(td.path(), "missing0").is_err());
    }
}
