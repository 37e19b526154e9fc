//! Headless driver for the simulation kernel.
//!
//! Loads content, feeds the kernel a scripted action batch, steps the world
//! and reports what happened. When `AXIOM_SAVE_PATH` is set the run finishes
//! with a save/load round trip through the filesystem and checks that the
//! restored kernel has the same state digest.
//!
//! ```bash
//! AXIOM_SCENARIO=sweep AXIOM_TICKS=120 cargo run -p axiom-headless
//! ```
mod config;
mod scenario;

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use axiom_core::{ContentParams, CreateParams, Kernel, OwnedActionBatch, Snapshot};
use config::HeadlessConfig;
use scenario::demo_content;
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    // Load .env file if it exists (silently ignore if not found)
    let _ = dotenvy::dotenv();

    setup_logging();

    let config = HeadlessConfig::from_env();
    tracing::info!("Starting headless run: {:?}", config);

    run(&config)
}

/// Setup logging to stderr, filtered by `RUST_LOG` (default: info).
fn setup_logging() {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run(config: &HeadlessConfig) -> Result<()> {
    let mut kernel =
        Kernel::create(Some(&CreateParams::default())).context("Failed to create kernel")?;
    let diagnostics = kernel.diagnostics();
    tracing::info!("{}", diagnostics);

    let content = match &config.content_dir {
        Some(dir) => axiom_content::load_content(dir)?,
        None => {
            tracing::info!("No content directory configured, using demo content");
            demo_content()
        }
    };
    kernel
        .load_content(Some(&content))
        .context("Kernel rejected content")?;

    let actions = config.scenario.actions(&content, kernel.config(), config.ticks)?;
    let batch = OwnedActionBatch::from_actions(&actions);
    kernel
        .submit_actions(Some(&batch.as_batch()))
        .with_context(|| format!("Failed to submit {} scenario", config.scenario))?;
    tracing::info!("Submitted {} actions ({})", actions.len(), config.scenario);

    for _ in 0..config.ticks {
        kernel.step_ticks(1)?;
        for event in kernel.events() {
            tracing::debug!(
                "tick {} {} actor={} secondary={} value={}",
                kernel.tick(),
                event.kind,
                event.actor,
                event.secondary,
                event.value
            );
        }
    }

    report(&kernel)?;

    if let Some(path) = &config.save_path {
        verify_round_trip(&mut kernel, &content, path)?;
    }

    Kernel::destroy(Some(kernel));
    Ok(())
}

fn report(kernel: &Kernel) -> Result<()> {
    let blob = kernel.snapshot_vec()?;
    let snapshot = Snapshot::parse(&blob)?;

    tracing::info!(
        "Snapshot tick={} entities={} events={} size={}",
        snapshot.tick,
        snapshot.entities.len(),
        snapshot.events.len(),
        blob.len()
    );
    for entity in &snapshot.entities {
        tracing::info!(
            "  entity {} hp={} dead={} pos=({:.2}, {:.2}, {:.2})",
            entity.id,
            entity.hp,
            entity.is_dead(),
            entity.position.x,
            entity.position.y,
            entity.position.z
        );
    }
    if let Some(weapon) = &snapshot.weapon {
        tracing::info!(
            "  weapon {} mag={} reserve={} reloading={} progress={:.2}",
            weapon.weapon_id,
            weapon.ammo_in_mag,
            weapon.ammo_reserve,
            weapon.is_reloading(),
            weapon.reload_progress
        );
    }

    Ok(())
}

/// Writes a save to `path` and loads it into a fresh kernel. Events are not
/// persisted, so both kernels advance one idle tick before digests are compared.
fn verify_round_trip(kernel: &mut Kernel, content: &ContentParams, path: &Path) -> Result<()> {
    let mut size = 0;
    kernel.save_bytes(None, &mut size)?;
    let mut blob = vec![0u8; size as usize];
    kernel.save_bytes(Some(blob.as_mut_slice()), &mut size)?;

    fs::write(path, &blob).with_context(|| format!("Failed to write save {}", path.display()))?;
    tracing::info!("Wrote save {} ({} bytes)", path.display(), blob.len());

    let read_back =
        fs::read(path).with_context(|| format!("Failed to read save {}", path.display()))?;

    let mut restored = Kernel::create(Some(&CreateParams::default()))?;
    restored.load_content(Some(content))?;
    restored
        .load_save_bytes(Some(read_back.as_slice()))
        .with_context(|| format!("Failed to load save {}", path.display()))?;

    kernel.step_ticks(1)?;
    restored.step_ticks(1)?;
    let expected = hex::encode(kernel.state_digest()?);
    let actual = hex::encode(restored.state_digest()?);
    if expected != actual {
        anyhow::bail!("State digest changed across save/load: {} != {}", expected, actual);
    }
    tracing::info!("Save round trip verified, digest {}", actual);

    Ok(())
}
