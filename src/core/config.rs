// src/core/config.rs

use anyhow::{Context, Result};
use std::collections::HashMap;
use std::fs;

use tracing::{info, warn};

use super::config_loader::config_paths;
use super::modules::battery::BatteryBackendKind;
use super::modules::volume::MixerCommand;
use super::parse::{ConfigTree, Section, Value};

// Module types the registry knows how to build
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ModuleKind {
    Disk,
    Wireless,
    Ethernet,
    Battery,
    Volume,
    Time,
}

impl ModuleKind {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "disk" => Some(ModuleKind::Disk),
            "wireless" => Some(ModuleKind::Wireless),
            "ethernet" => Some(ModuleKind::Ethernet),
            "battery" => Some(ModuleKind::Battery),
            "volume" => Some(ModuleKind::Volume),
            // "time" is accepted as an alias for the local-timezone clock
            "tztime" | "time" => Some(ModuleKind::Time),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            ModuleKind::Disk => "disk",
            ModuleKind::Wireless => "wireless",
            ModuleKind::Ethernet => "ethernet",
            ModuleKind::Battery => "battery",
            ModuleKind::Volume => "volume",
            ModuleKind::Time => "tztime",
        }
    }

    // Instance used when an `order +=` entry or block omits the qualifier
    pub fn default_instance(&self) -> &'static str {
        match self {
            ModuleKind::Disk => "/",
            ModuleKind::Wireless => "_first_",
            ModuleKind::Ethernet => "_first_",
            ModuleKind::Battery => "0",
            ModuleKind::Volume => "master",
            ModuleKind::Time => "local",
        }
    }
}

// One resolved `order +=` entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleRef {
    pub kind: ModuleKind,
    pub instance: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    I3bar,
    Term,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GeneralConfig {
    pub colors: bool,
    // Global refresh interval in seconds for modules that don't override it
    pub interval: u32,
    pub color_good: String,
    pub color_degraded: String,
    pub color_bad: String,
    pub separator: String,
    pub output_format: OutputFormat,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        GeneralConfig {
            colors: true,
            interval: default_interval(),
            color_good: "#00FF00".to_string(),
            color_degraded: "#FFFF00".to_string(),
            color_bad: "#FF0000".to_string(),
            separator: " | ".to_string(),
            output_format: OutputFormat::I3bar,
        }
    }
}

impl GeneralConfig {
    fn apply(&mut self, section: &Section) {
        for (key, value) in &section.entries {
            match key.as_str() {
                "colors" => set_bool(&mut self.colors, value, "general", key),
                "interval" => set_u32(&mut self.interval, value, "general", key),
                "color_good" => set_string(&mut self.color_good, value, "general", key),
                "color_degraded" => set_string(&mut self.color_degraded, value, "general", key),
                "color_bad" => set_string(&mut self.color_bad, value, "general", key),
                "separator" => set_string(&mut self.separator, value, "general", key),
                "output_format" => match value.as_str() {
                    Some("i3bar") => self.output_format = OutputFormat::I3bar,
                    Some("term") => self.output_format = OutputFormat::Term,
                    _ => warn!(?value, "Unknown output_format, keeping default"),
                },
                other => warn!(section = "general", key = %other, "Unknown key, ignoring"),
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DiskThresholdType {
    #[default]
    PercentageAvail,
    PercentageFree,
    GbytesAvail,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DiskConfig {
    pub format: String,
    // 0 disables the threshold entirely
    pub low_threshold: i64,
    pub threshold_type: DiskThresholdType,
    pub interval: Option<u32>,
}

impl Default for DiskConfig {
    fn default() -> Self {
        DiskConfig {
            format: "%avail".to_string(),
            low_threshold: 0,
            threshold_type: DiskThresholdType::PercentageAvail,
            interval: None,
        }
    }
}

impl DiskConfig {
    fn apply(&mut self, section: &Section) {
        for (key, value) in &section.entries {
            match key.as_str() {
                "format" => set_string(&mut self.format, value, "disk", key),
                "low_threshold" => set_i64(&mut self.low_threshold, value, "disk", key),
                "threshold_type" => match value.as_str() {
                    Some("percentage_avail") => {
                        self.threshold_type = DiskThresholdType::PercentageAvail
                    }
                    Some("percentage_free") => {
                        self.threshold_type = DiskThresholdType::PercentageFree
                    }
                    Some("gbytes_avail") => self.threshold_type = DiskThresholdType::GbytesAvail,
                    _ => warn!(?value, "Unknown disk threshold_type, keeping default"),
                },
                "interval" => set_opt_u32(&mut self.interval, value, "disk", key),
                other => warn!(section = "disk", key = %other, "Unknown key, ignoring"),
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct WirelessConfig {
    pub format_up: String,
    pub format_down: String,
    pub interval: Option<u32>,
}

impl Default for WirelessConfig {
    fn default() -> Self {
        WirelessConfig {
            format_up: "W: (%quality at %essid) %ip".to_string(),
            format_down: "W: down".to_string(),
            interval: None,
        }
    }
}

impl WirelessConfig {
    fn apply(&mut self, section: &Section) {
        for (key, value) in &section.entries {
            match key.as_str() {
                "format_up" => set_string(&mut self.format_up, value, "wireless", key),
                "format_down" => set_string(&mut self.format_down, value, "wireless", key),
                "interval" => set_opt_u32(&mut self.interval, value, "wireless", key),
                other => warn!(section = "wireless", key = %other, "Unknown key, ignoring"),
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct EthernetConfig {
    pub format_up: String,
    pub format_down: String,
    pub interval: Option<u32>,
}

impl Default for EthernetConfig {
    fn default() -> Self {
        EthernetConfig {
            format_up: "E: %ip (%speed)".to_string(),
            format_down: "E: down".to_string(),
            interval: None,
        }
    }
}

impl EthernetConfig {
    fn apply(&mut self, section: &Section) {
        for (key, value) in &section.entries {
            match key.as_str() {
                "format_up" => set_string(&mut self.format_up, value, "ethernet", key),
                "format_down" => set_string(&mut self.format_down, value, "ethernet", key),
                "interval" => set_opt_u32(&mut self.interval, value, "ethernet", key),
                other => warn!(section = "ethernet", key = %other, "Unknown key, ignoring"),
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BatteryConfig {
    pub backend: BatteryBackendKind,
    // UPower object or native path to match, if the user pins one
    pub device: Option<String>,
    pub format: String,
    pub format_down: String,
    pub status_chr: String,
    pub status_bat: String,
    pub status_full: String,
    pub status_unk: String,
    // Percentage below which a discharging battery renders Bad
    pub low_threshold: i64,
    pub interval: Option<u32>,
}

impl Default for BatteryConfig {
    fn default() -> Self {
        BatteryConfig {
            backend: BatteryBackendKind::Sysfs,
            device: None,
            format: "%status %percentage %remaining".to_string(),
            format_down: "No battery".to_string(),
            status_chr: "CHR".to_string(),
            status_bat: "BAT".to_string(),
            status_full: "FULL".to_string(),
            status_unk: "UNK".to_string(),
            low_threshold: 30,
            interval: None,
        }
    }
}

impl BatteryConfig {
    fn apply(&mut self, section: &Section) {
        for (key, value) in &section.entries {
            match key.as_str() {
                "backend" => match value.as_str() {
                    Some("sysfs") => self.backend = BatteryBackendKind::Sysfs,
                    Some("upower") => self.backend = BatteryBackendKind::Upower,
                    _ => warn!(?value, "Unknown battery backend, keeping default"),
                },
                "device" => set_opt_string(&mut self.device, value, "battery", key),
                "format" => set_string(&mut self.format, value, "battery", key),
                "format_down" => set_string(&mut self.format_down, value, "battery", key),
                "status_chr" => set_string(&mut self.status_chr, value, "battery", key),
                "status_bat" => set_string(&mut self.status_bat, value, "battery", key),
                "status_full" => set_string(&mut self.status_full, value, "battery", key),
                "status_unk" => set_string(&mut self.status_unk, value, "battery", key),
                "low_threshold" => set_i64(&mut self.low_threshold, value, "battery", key),
                "interval" => set_opt_u32(&mut self.interval, value, "battery", key),
                other => warn!(section = "battery", key = %other, "Unknown key, ignoring"),
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct VolumeConfig {
    pub format: String,
    pub format_muted: String,
    // Mixer backend: pactl or amixer; auto-detected when unset
    pub command: Option<MixerCommand>,
    pub device: Option<String>,
    pub mixer: String,
    pub low_threshold: i64,
    pub degraded_threshold: i64,
    pub interval: Option<u32>,
}

impl Default for VolumeConfig {
    fn default() -> Self {
        VolumeConfig {
            format: "♪: %volume".to_string(),
            format_muted: "♪: muted (%volume)".to_string(),
            command: None,
            device: None,
            mixer: "Master".to_string(),
            low_threshold: 20,
            degraded_threshold: 50,
            interval: None,
        }
    }
}

impl VolumeConfig {
    fn apply(&mut self, section: &Section) {
        for (key, value) in &section.entries {
            match key.as_str() {
                "format" => set_string(&mut self.format, value, "volume", key),
                "format_muted" => set_string(&mut self.format_muted, value, "volume", key),
                "command" => match value.as_str() {
                    Some("pactl") => self.command = Some(MixerCommand::Pactl),
                    Some("amixer") => self.command = Some(MixerCommand::Amixer),
                    _ => warn!(?value, "Unknown volume command, keeping auto-detection"),
                },
                "device" => set_opt_string(&mut self.device, value, "volume", key),
                "mixer" => set_string(&mut self.mixer, value, "volume", key),
                "low_threshold" => set_i64(&mut self.low_threshold, value, "volume", key),
                "degraded_threshold" => {
                    set_i64(&mut self.degraded_threshold, value, "volume", key)
                }
                "interval" => set_opt_u32(&mut self.interval, value, "volume", key),
                other => warn!(section = "volume", key = %other, "Unknown key, ignoring"),
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TimeConfig {
    pub format: String,
    pub interval: Option<u32>,
}

impl Default for TimeConfig {
    fn default() -> Self {
        TimeConfig {
            format: "%Y-%m-%d %H:%M:%S".to_string(),
            interval: None,
        }
    }
}

impl TimeConfig {
    fn apply(&mut self, section: &Section) {
        for (key, value) in &section.entries {
            match key.as_str() {
                "format" => set_string(&mut self.format, value, "tztime", key),
                "interval" => set_opt_u32(&mut self.interval, value, "tztime", key),
                other => warn!(section = "tztime", key = %other, "Unknown key, ignoring"),
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Config {
    pub general: GeneralConfig,

    // Display order of module instances
    pub order: Vec<ModuleRef>,

    // Module blocks, keyed by instance qualifier
    disk: HashMap<String, DiskConfig>,
    wireless: HashMap<String, WirelessConfig>,
    ethernet: HashMap<String, EthernetConfig>,
    battery: HashMap<String, BatteryConfig>,
    volume: HashMap<String, VolumeConfig>,
    time: HashMap<String, TimeConfig>,
}

impl Config {
    // Loads the user config if present, falling back to the system default
    pub fn load() -> Result<Self> {
        let (system, user) = config_paths();
        info!(system = ?system, user = ?user, "Loading configuration paths");

        let path = if user.exists() { &user } else { &system };
        info!(path = ?path, "Reading configuration");
        let text = fs::read_to_string(path)
            .with_context(|| format!("Reading configuration at {path:?}"))?;
        let cfg = Self::parse(&text).with_context(|| format!("Parsing {path:?}"))?;

        info!(?cfg, "Configuration loaded successfully");
        Ok(cfg)
    }

    pub fn parse(input: &str) -> Result<Self> {
        let tree = ConfigTree::parse(input)?;
        Self::from_tree(&tree)
    }

    pub fn from_tree(tree: &ConfigTree) -> Result<Self> {
        let mut cfg = Config::default();

        for section in &tree.sections {
            if section.name == "general" {
                cfg.general.apply(section);
                continue;
            }
            let Some(kind) = ModuleKind::from_name(&section.name) else {
                warn!(section = %section.name, "Unknown section in config, ignoring");
                continue;
            };
            let instance = section
                .instance
                .clone()
                .unwrap_or_else(|| kind.default_instance().to_string());
            match kind {
                ModuleKind::Disk => cfg.disk.entry(instance).or_default().apply(section),
                ModuleKind::Wireless => cfg.wireless.entry(instance).or_default().apply(section),
                ModuleKind::Ethernet => cfg.ethernet.entry(instance).or_default().apply(section),
                ModuleKind::Battery => cfg.battery.entry(instance).or_default().apply(section),
                ModuleKind::Volume => cfg.volume.entry(instance).or_default().apply(section),
                ModuleKind::Time => cfg.time.entry(instance).or_default().apply(section),
            }
        }

        for (name, instance) in &tree.order {
            let Some(kind) = ModuleKind::from_name(name) else {
                warn!(module = %name, "Unknown module in order, skipping");
                continue;
            };
            let instance = instance
                .clone()
                .unwrap_or_else(|| kind.default_instance().to_string());
            cfg.order.push(ModuleRef { kind, instance });
        }

        // Validate config values
        if cfg.general.interval == 0 {
            Err(anyhow::anyhow!("general interval must be at least 1"))?
        }

        // Fill in missing per-module refresh rates from the global interval
        let global = cfg.general.interval;
        cfg.fill_default_interval(global);

        Ok(cfg)
    }

    // Block lookups used by the registry: a missing block yields the module
    // type's documented defaults.
    pub fn disk(&self, instance: &str) -> DiskConfig {
        self.lookup(&self.disk, instance)
    }

    pub fn wireless(&self, instance: &str) -> WirelessConfig {
        self.lookup(&self.wireless, instance)
    }

    pub fn ethernet(&self, instance: &str) -> EthernetConfig {
        self.lookup(&self.ethernet, instance)
    }

    pub fn battery(&self, instance: &str) -> BatteryConfig {
        self.lookup(&self.battery, instance)
    }

    pub fn volume(&self, instance: &str) -> VolumeConfig {
        self.lookup(&self.volume, instance)
    }

    pub fn time(&self, instance: &str) -> TimeConfig {
        self.lookup(&self.time, instance)
    }

    fn lookup<T: Clone + Default + Refreshable>(
        &self,
        map: &HashMap<String, T>,
        instance: &str,
    ) -> T {
        map.get(instance).cloned().unwrap_or_else(|| {
            let mut cfg = T::default();
            cfg.fill_default_interval(self.general.interval);
            cfg
        })
    }
}

// Default to 1 second if not specified
fn default_interval() -> u32 {
    1
}

pub trait Refreshable {
    // Fills the module's refresh rate from the global one unless overridden
    fn fill_default_interval(&mut self, global: u32);
}

impl Refreshable for DiskConfig {
    fn fill_default_interval(&mut self, global: u32) {
        self.interval = self.interval.or(Some(global));
    }
}

impl Refreshable for WirelessConfig {
    fn fill_default_interval(&mut self, global: u32) {
        self.interval = self.interval.or(Some(global));
    }
}

impl Refreshable for EthernetConfig {
    fn fill_default_interval(&mut self, global: u32) {
        self.interval = self.interval.or(Some(global));
    }
}

impl Refreshable for BatteryConfig {
    fn fill_default_interval(&mut self, global: u32) {
        self.interval = self.interval.or(Some(global));
    }
}

impl Refreshable for VolumeConfig {
    fn fill_default_interval(&mut self, global: u32) {
        self.interval = self.interval.or(Some(global));
    }
}

impl Refreshable for TimeConfig {
    fn fill_default_interval(&mut self, global: u32) {
        self.interval = self.interval.or(Some(global));
    }
}

impl Refreshable for Config {
    fn fill_default_interval(&mut self, global: u32) {
        for cfg in self.disk.values_mut() {
            cfg.fill_default_interval(global);
        }
        for cfg in self.wireless.values_mut() {
            cfg.fill_default_interval(global);
        }
        for cfg in self.ethernet.values_mut() {
            cfg.fill_default_interval(global);
        }
        for cfg in self.battery.values_mut() {
            cfg.fill_default_interval(global);
        }
        for cfg in self.volume.values_mut() {
            cfg.fill_default_interval(global);
        }
        for cfg in self.time.values_mut() {
            cfg.fill_default_interval(global);
        }
    }
}

// Typed setters with a warn-and-keep-default policy for mismatched values
fn set_string(slot: &mut String, value: &Value, section: &str, key: &str) {
    match value.as_str() {
        Some(s) => *slot = s.to_string(),
        None => warn!(section, key = %key, ?value, "Expected a string value, ignoring"),
    }
}

fn set_opt_string(slot: &mut Option<String>, value: &Value, section: &str, key: &str) {
    match value.as_str() {
        Some(s) => *slot = Some(s.to_string()),
        None => warn!(section, key = %key, ?value, "Expected a string value, ignoring"),
    }
}

fn set_bool(slot: &mut bool, value: &Value, section: &str, key: &str) {
    match value.as_bool() {
        Some(b) => *slot = b,
        None => warn!(section, key = %key, ?value, "Expected a boolean value, ignoring"),
    }
}

fn set_i64(slot: &mut i64, value: &Value, section: &str, key: &str) {
    match value.as_int() {
        Some(n) => *slot = n,
        None => warn!(section, key = %key, ?value, "Expected an integer value, ignoring"),
    }
}

fn set_u32(slot: &mut u32, value: &Value, section: &str, key: &str) {
    match value.as_int().and_then(|n| u32::try_from(n).ok()) {
        Some(n) => *slot = n,
        None => warn!(section, key = %key, ?value, "Expected a non-negative integer, ignoring"),
    }
}

fn set_opt_u32(slot: &mut Option<u32>, value: &Value, section: &str, key: &str) {
    match value.as_int().and_then(|n| u32::try_from(n).ok()) {
        Some(n) => *slot = Some(n),
        None => warn!(section, key = %key, ?value, "Expected a non-negative integer, ignoring"),
    }
}
