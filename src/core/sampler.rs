// src/core/sampler.rs

//! The fixed-interval loop driving the status line. Every tick advances
//! each module's countdown; due modules are re-sampled, the rest reuse
//! their last block, and the whole line goes to the sink. SIGUSR1 forces
//! an immediate refresh of everything, so external scripts can poke the
//! bar right after changing volume or brightness.

use super::format::ColorState;
use super::module::Block;
use super::output::OutputSink;
use super::registry::{ModuleRegistry, RegisteredModule};
use anyhow::{Context, Result};
use std::time::Duration;
use tokio::signal::unix::{SignalKind, signal};
use tokio::time::MissedTickBehavior;
use tracing::{info, warn};

struct Slot {
    module: Box<dyn super::module::Module>,
    interval: u32,
    countdown: u32,
    last: Option<Block>,
}

pub struct Sampler<S: OutputSink> {
    slots: Vec<Slot>,
    sink: S,
    tick_secs: u32,
}

impl<S: OutputSink> Sampler<S> {
    pub fn new(registry: ModuleRegistry, sink: S, tick_secs: u32) -> Self {
        let slots = registry
            .into_modules()
            .into_iter()
            .map(|RegisteredModule { module, interval }| Slot {
                module,
                interval,
                // due on the very first tick
                countdown: 0,
                last: None,
            })
            .collect();
        Sampler {
            slots,
            sink,
            tick_secs,
        }
    }

    pub async fn run(mut self) -> Result<()> {
        self.sink.begin()?;

        let mut ticker = tokio::time::interval(Duration::from_secs(self.tick_secs as u64));
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        let mut refresh =
            signal(SignalKind::user_defined1()).context("Installing SIGUSR1 handler")?;

        loop {
            let force = tokio::select! {
                _ = ticker.tick() => false,
                _ = refresh.recv() => {
                    info!("SIGUSR1 received, forcing refresh");
                    true
                }
            };
            let blocks = self.collect(force);
            self.sink.write_status(&blocks)?;
        }
    }

    // Re-sample due (or all, when forced) modules and compose the line.
    // A failing module renders a placeholder instead of tearing the bar
    // down.
    fn collect(&mut self, force: bool) -> Vec<Block> {
        let mut blocks = Vec::with_capacity(self.slots.len());
        for slot in &mut self.slots {
            if force || slot.countdown == 0 {
                match slot.module.sample() {
                    Ok(block) => slot.last = Some(block),
                    Err(e) => {
                        warn!(
                            module = slot.module.name(),
                            error = %e,
                            "Module sample failed"
                        );
                        slot.last = Some(Block::new(
                            slot.module.name(),
                            slot.module.instance(),
                            format!("{}: n/a", slot.module.name()),
                            ColorState::Bad,
                        ));
                    }
                }
                slot.countdown = slot.interval;
            }
            slot.countdown = slot.countdown.saturating_sub(self.tick_secs);
            if let Some(block) = &slot.last {
                blocks.push(block.clone());
            }
        }
        blocks
    }
}

#[cfg(test)]
mod tests {
    use super::{Sampler, Slot};
    use crate::core::format::ColorState;
    use crate::core::module::{Block, Module};
    use crate::core::output::OutputSink;
    use anyhow::Result;
    use std::cell::Cell;
    use std::rc::Rc;

    struct CountingModule {
        samples: Rc<Cell<u32>>,
    }

    impl Module for CountingModule {
        fn name(&self) -> &'static str {
            "counting"
        }
        fn instance(&self) -> Option<&str> {
            None
        }
        fn sample(&mut self) -> Result<Block> {
            self.samples.set(self.samples.get() + 1);
            Ok(Block::new(
                "counting",
                None,
                format!("#{}", self.samples.get()),
                ColorState::Neutral,
            ))
        }
    }

    struct FailingModule;

    impl Module for FailingModule {
        fn name(&self) -> &'static str {
            "failing"
        }
        fn instance(&self) -> Option<&str> {
            Some("x")
        }
        fn sample(&mut self) -> Result<Block> {
            anyhow::bail!("backend went away")
        }
    }

    struct NullSink;
    impl OutputSink for NullSink {
        fn begin(&mut self) -> Result<()> {
            Ok(())
        }
        fn write_status(&mut self, _blocks: &[Block]) -> Result<()> {
            Ok(())
        }
    }

    fn sampler_with(slots: Vec<Slot>, tick_secs: u32) -> Sampler<NullSink> {
        Sampler {
            slots,
            sink: NullSink,
            tick_secs,
        }
    }

    fn slot(module: Box<dyn Module>, interval: u32) -> Slot {
        Slot {
            module,
            interval,
            countdown: 0,
            last: None,
        }
    }

    #[test]
    fn slower_module_reuses_last_block() {
        let samples = Rc::new(Cell::new(0));
        let module = CountingModule {
            samples: Rc::clone(&samples),
        };
        // module refreshes every 3s, the bar ticks every 1s
        let mut sampler = sampler_with(vec![slot(Box::new(module), 3)], 1);

        let first = sampler.collect(false);
        assert_eq!(first[0].full_text, "#1");
        // two more ticks reuse the cached block
        assert_eq!(sampler.collect(false)[0].full_text, "#1");
        assert_eq!(sampler.collect(false)[0].full_text, "#1");
        // fourth tick is due again
        assert_eq!(sampler.collect(false)[0].full_text, "#2");
        assert_eq!(samples.get(), 2);
    }

    #[test]
    fn force_refresh_samples_everything() {
        let samples = Rc::new(Cell::new(0));
        let module = CountingModule {
            samples: Rc::clone(&samples),
        };
        let mut sampler = sampler_with(vec![slot(Box::new(module), 60)], 1);

        sampler.collect(false);
        sampler.collect(true);
        assert_eq!(samples.get(), 2);
    }

    #[test]
    fn failing_module_renders_placeholder() {
        let mut sampler = sampler_with(vec![slot(Box::new(FailingModule), 1)], 1);
        let blocks = sampler.collect(false);
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].full_text, "failing: n/a");
        assert_eq!(blocks[0].state, ColorState::Bad);
        assert_eq!(blocks[0].instance.as_deref(), Some("x"));
    }
}
