// src/core/modules/volume.rs
//
// Playback volume via the system mixer tools. The backend is `pactl`
// when PulseAudio/PipeWire is around, otherwise `amixer`; an explicit
// `command` key in the config pins one.

use crate::core::config::VolumeConfig;
use crate::core::format::{ColorState, FormatTemplate};
use crate::core::module::{Block, Module};
use anyhow::{Context, Result};
use once_cell::sync::OnceCell;
use std::process::Command;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MixerCommand {
    Pactl,
    Amixer,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MixerReading {
    pub volume: u8,
    pub muted: bool,
}

pub trait MixerBackend {
    fn read(&self) -> Result<MixerReading>;
}

static DETECTED: OnceCell<Option<MixerCommand>> = OnceCell::new();

fn command_available(cmd: &str) -> bool {
    Command::new(cmd)
        .arg("--version")
        .output()
        .map(|out| out.status.success())
        .unwrap_or(false)
}

// Probed once per process; both tools print a version banner cheaply
fn detect_command() -> Result<MixerCommand> {
    DETECTED
        .get_or_init(|| {
            if command_available("pactl") {
                Some(MixerCommand::Pactl)
            } else if command_available("amixer") {
                Some(MixerCommand::Amixer)
            } else {
                None
            }
        })
        .ok_or_else(|| anyhow::anyhow!("No mixer binary available (tried pactl, amixer)"))
}

fn command_output(cmd: &str, args: &[&str]) -> Result<String> {
    let output = Command::new(cmd)
        .args(args)
        .output()
        .with_context(|| format!("Running {cmd}"))?;
    if !output.status.success() {
        anyhow::bail!("{cmd} {} failed: {}", args.join(" "), output.status);
    }
    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}

struct PactlBackend {
    device: String,
}

impl MixerBackend for PactlBackend {
    fn read(&self) -> Result<MixerReading> {
        let vol_out = command_output("pactl", &["get-sink-volume", &self.device])?;
        let mute_out = command_output("pactl", &["get-sink-mute", &self.device])?;
        let volume = parse_pactl_volume(&vol_out)
            .with_context(|| format!("No volume in pactl output: {vol_out:?}"))?;
        let muted = parse_pactl_mute(&mute_out)
            .with_context(|| format!("No mute state in pactl output: {mute_out:?}"))?;
        Ok(MixerReading { volume, muted })
    }
}

struct AmixerBackend {
    device: String,
    mixer: String,
}

impl MixerBackend for AmixerBackend {
    fn read(&self) -> Result<MixerReading> {
        let out = command_output("amixer", &["-D", &self.device, "get", &self.mixer])?;
        parse_amixer(&out).with_context(|| format!("No volume in amixer output: {out:?}"))
    }
}

// `Volume: front-left: 39321 /  60% / -13.31 dB, ...`
fn parse_pactl_volume(out: &str) -> Option<u8> {
    out.split_whitespace()
        .find_map(|tok| tok.strip_suffix('%'))
        .and_then(|n| n.parse().ok())
}

// `Mute: yes`
fn parse_pactl_mute(out: &str) -> Option<bool> {
    let state = out.split_whitespace().nth(1)?;
    match state {
        "yes" => Some(true),
        "no" => Some(false),
        _ => None,
    }
}

// ALSA's catch-all `default` device has no pactl equivalent; no sink is
// actually named that, so it maps to the default-sink alias instead
fn pactl_device(device: Option<&str>) -> String {
    match device {
        None | Some("default") => "@DEFAULT_SINK@".to_string(),
        Some(name) => name.to_string(),
    }
}

// Last line carries e.g. `  Mono: Playback 39 [60%] [on]`
fn parse_amixer(out: &str) -> Option<MixerReading> {
    let line = out.lines().rev().find(|l| l.contains('['))?;
    let volume = line
        .split('[')
        .find_map(|part| part.split(']').next()?.strip_suffix('%'))
        .and_then(|n| n.parse().ok())?;
    let muted = line.contains("[off]");
    Some(MixerReading { volume, muted })
}

pub struct VolumeModule {
    instance: String,
    format: FormatTemplate,
    format_muted: FormatTemplate,
    low_threshold: i64,
    degraded_threshold: i64,
    backend: Box<dyn MixerBackend>,
}

impl VolumeModule {
    pub fn new(instance: &str, cfg: &VolumeConfig) -> Result<Self> {
        let command = match cfg.command {
            Some(command) => command,
            None => detect_command()?,
        };
        let backend: Box<dyn MixerBackend> = match command {
            MixerCommand::Pactl => Box::new(PactlBackend {
                device: pactl_device(cfg.device.as_deref()),
            }),
            MixerCommand::Amixer => Box::new(AmixerBackend {
                device: cfg.device.clone().unwrap_or_else(|| "default".to_string()),
                mixer: cfg.mixer.clone(),
            }),
        };

        Ok(Self {
            instance: instance.to_string(),
            format: FormatTemplate::parse(&cfg.format),
            format_muted: FormatTemplate::parse(&cfg.format_muted),
            low_threshold: cfg.low_threshold,
            degraded_threshold: cfg.degraded_threshold,
            backend,
        })
    }

    fn state_for(&self, reading: MixerReading) -> ColorState {
        if reading.muted {
            return ColorState::Bad;
        }
        let volume = reading.volume as i64;
        if volume < self.low_threshold {
            ColorState::Bad
        } else if volume < self.degraded_threshold {
            ColorState::Degraded
        } else {
            ColorState::Good
        }
    }
}

impl Module for VolumeModule {
    fn name(&self) -> &'static str {
        "volume"
    }

    fn instance(&self) -> Option<&str> {
        Some(&self.instance)
    }

    fn sample(&mut self) -> Result<Block> {
        let reading = self.backend.read()?;
        let template = if reading.muted {
            &self.format_muted
        } else {
            &self.format
        };
        let vars = [("volume", format!("{}%", reading.volume))];
        Ok(Block::new(
            self.name(),
            Some(&self.instance),
            template.render(&vars),
            self.state_for(reading),
        ))
    }
}
