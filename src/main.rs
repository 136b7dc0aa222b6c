// src/main.rs
extern crate anyhow;
extern crate statusline_rs;

use anyhow::Result;
use statusline_rs::core::engine::Engine;
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    // Logs go to stderr; stdout carries the status-line protocol
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    // Build the engine (loads config) and run the sampler loop
    let engine = Engine::new()?;
    engine.run()?;
    Ok(())
}
