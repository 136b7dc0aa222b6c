// src/core/engine.rs

use anyhow::{Context, Result};
use std::io;

use tracing::{info, warn};

use super::config::{Config, OutputFormat};
use super::format::Palette;
use super::output::{I3barSink, TermSink};
use super::registry::ModuleRegistry;
use super::sampler::Sampler;

// Ties config, registry, sampler, and sink together
pub struct Engine {
    config: Config,
}

impl Engine {
    // Initialises the engine from the on-disk configuration
    pub fn new() -> Result<Self> {
        info!("Initialising engine");
        let config = Config::load().context("Loading status-line configuration")?;
        Ok(Engine { config })
    }

    pub fn with_config(config: Config) -> Self {
        Engine { config }
    }

    // Builds the module set and drives the sampler loop forever
    pub fn run(&self) -> Result<()> {
        let registry = ModuleRegistry::load(&self.config);
        info!(
            num_modules = registry.len(),
            "Loaded modules from config"
        );
        if registry.is_empty() {
            warn!("No modules in order; the status line will be empty");
        }

        let palette = self.palette();
        let interval = self.config.general.interval;

        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .context("Building tokio runtime")?;

        match self.config.general.output_format {
            OutputFormat::I3bar => {
                let sink = I3barSink::new(io::stdout(), palette);
                runtime.block_on(Sampler::new(registry, sink, interval).run())
            }
            OutputFormat::Term => {
                let sink = TermSink::new(
                    io::stdout(),
                    palette,
                    self.config.general.separator.clone(),
                );
                runtime.block_on(Sampler::new(registry, sink, interval).run())
            }
        }
    }

    fn palette(&self) -> Palette {
        let general = &self.config.general;
        Palette {
            enabled: general.colors,
            good: general.color_good.clone(),
            degraded: general.color_degraded.clone(),
            bad: general.color_bad.clone(),
        }
    }
}
