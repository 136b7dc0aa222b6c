// src/core/modules/battery/upower_backend.rs

use super::backend::{BatteryBackend, BatteryReading, BatteryStatus};
use crate::core::config::BatteryConfig;
use anyhow::{Context, Result};
use std::convert::TryFrom;
use std::time::Duration;
use zbus::blocking::{Connection, Proxy};
use zbus::zvariant::OwnedObjectPath;

/// UPower constants
const UPOWER_SERVICE: &str = "org.freedesktop.UPower";
const UPOWER_PATH: &str = "/org/freedesktop/UPower";
const UPOWER_IFACE: &str = "org.freedesktop.UPower";
const DEVICE_IFACE: &str = "org.freedesktop.UPower.Device";
const DEVICE_TYPE_BATTERY: u32 = 2;

// A `BatteryBackend` that talks to the system D-Bus UPower service
pub struct UpowerBackend {
    device: Proxy<'static>,
}

impl UpowerBackend {
    pub fn new(cfg: &BatteryConfig) -> Result<Self> {
        let conn = Connection::system().context("Failed to connect to the D‑Bus")?;

        // enumerate all devices once
        let proxy = Proxy::new::<_, _, &str>(
            &conn,
            UPOWER_SERVICE,
            OwnedObjectPath::try_from(UPOWER_PATH)?,
            UPOWER_IFACE,
        )?;
        let paths: Vec<OwnedObjectPath> = proxy.call("EnumerateDevices", &())?;

        // filter only batteries
        let mut batteries = Vec::new();
        for path in paths {
            let dev = Proxy::new(&conn, UPOWER_SERVICE, path.clone(), DEVICE_IFACE)?;
            if dev.get_property::<u32>("Type")? == DEVICE_TYPE_BATTERY {
                batteries.push((path.clone(), dev));
            }
        }
        if batteries.is_empty() {
            anyhow::bail!("No battery devices found via UPower");
        }

        // if user specified one, pick that; otherwise pick the first
        let device_proxy = if let Some(ref want) = cfg.device {
            // try to match either the object path or the "native path" property
            batteries
                .into_iter()
                .find_map(|(path, dev)| {
                    let native: String = dev.get_property("NativePath").ok()?;
                    if &path.to_string() == want || &native == want {
                        Some(dev)
                    } else {
                        None
                    }
                })
                .ok_or_else(|| anyhow::anyhow!("No UPower device matching '{}'", want))?
        } else {
            // default
            batteries.into_iter().next().unwrap().1
        };

        Ok(Self {
            device: device_proxy,
        })
    }
}

impl BatteryBackend for UpowerBackend {
    fn read(&self) -> Result<BatteryReading> {
        let pct: f64 = self
            .device
            .get_property("Percentage")
            .context("Getting UPower Percentage")?;
        let state: u32 = self
            .device
            .get_property("State")
            .context("Getting UPower state")?;

        let status = match state {
            1 => BatteryStatus::Charging,
            2 => BatteryStatus::Discharging,
            3 => BatteryStatus::Discharging, // empty
            4 => BatteryStatus::Full,
            _ => BatteryStatus::Unknown,
        };

        // UPower reports 0 when it has no estimate
        let remaining = match status {
            BatteryStatus::Discharging => self
                .device
                .get_property::<i64>("TimeToEmpty")
                .ok()
                .filter(|&s| s > 0)
                .map(|s| Duration::from_secs(s as u64)),
            BatteryStatus::Charging => self
                .device
                .get_property::<i64>("TimeToFull")
                .ok()
                .filter(|&s| s > 0)
                .map(|s| Duration::from_secs(s as u64)),
            _ => None,
        };

        Ok(BatteryReading {
            percentage: pct as u8,
            status,
            remaining,
        })
    }
}
