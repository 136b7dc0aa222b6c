// src/core/registry.rs

use super::config::{Config, ModuleKind};
use super::module::Module;
use super::modules::battery::BatteryModule;
use super::modules::disk::DiskModule;
use super::modules::net::{EthernetModule, WirelessModule};
use super::modules::time::TimeModule;
use super::modules::volume::VolumeModule;
use anyhow::Result;
use tracing::warn;

// A module together with its resolved refresh rate in seconds
pub struct RegisteredModule {
    pub module: Box<dyn Module>,
    pub interval: u32,
}

// Manages the set of modules for the status line
pub struct ModuleRegistry {
    modules: Vec<RegisteredModule>,
}

impl ModuleRegistry {
    // Builds all modules in the order specified by the config. A module
    // whose backend cannot be initialised is skipped with a warning; one
    // broken module shouldn't keep the rest of the line from rendering.
    pub fn load(config: &Config) -> Self {
        let mut modules = Vec::new();
        let global = config.general.interval;

        for mref in &config.order {
            let instance = mref.instance.as_str();
            let built: Result<(Box<dyn Module>, Option<u32>)> = match mref.kind {
                ModuleKind::Disk => {
                    let cfg = config.disk(instance);
                    Ok((Box::new(DiskModule::new(instance, &cfg)), cfg.interval))
                }
                ModuleKind::Wireless => {
                    let cfg = config.wireless(instance);
                    Ok((Box::new(WirelessModule::new(instance, &cfg)), cfg.interval))
                }
                ModuleKind::Ethernet => {
                    let cfg = config.ethernet(instance);
                    Ok((Box::new(EthernetModule::new(instance, &cfg)), cfg.interval))
                }
                ModuleKind::Battery => {
                    let cfg = config.battery(instance);
                    BatteryModule::new(instance, &cfg)
                        .map(|m| (Box::new(m) as Box<dyn Module>, cfg.interval))
                }
                ModuleKind::Volume => {
                    let cfg = config.volume(instance);
                    VolumeModule::new(instance, &cfg)
                        .map(|m| (Box::new(m) as Box<dyn Module>, cfg.interval))
                }
                ModuleKind::Time => {
                    let cfg = config.time(instance);
                    Ok((Box::new(TimeModule::new(instance, &cfg)), cfg.interval))
                }
            };

            match built {
                Ok((module, interval)) => modules.push(RegisteredModule {
                    module,
                    interval: interval.unwrap_or(global),
                }),
                Err(e) => {
                    warn!(
                        module = mref.kind.name(),
                        instance = %mref.instance,
                        error = %e,
                        "Failed to initialise module, skipping"
                    );
                }
            }
        }

        ModuleRegistry { modules }
    }

    pub fn modules(&self) -> &[RegisteredModule] {
        &self.modules
    }

    pub fn into_modules(self) -> Vec<RegisteredModule> {
        self.modules
    }

    pub fn len(&self) -> usize {
        self.modules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }
}
