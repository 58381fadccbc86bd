//! Wheel command-line driver
//!
//! Usage:
//!   wheel spin [--count N] [--seed S] [--turbo] [--store DIR] [--wav PATH]
//!   wheel stats [--spins N] [--seed S] [--store DIR]
//!   wheel layout [--store DIR]

use std::collections::BTreeMap;
use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use rf_core::{Partition, default_partitions};
use rf_wheel::{
    FileStore, HeadlessWheel, RenderSync, SpinConfig, SpinMachine, SpinOutcome, SpinTarget,
    WheelConfig, WheelStore, label_font_size, layout,
};
use serde::Serialize;

#[derive(Parser)]
#[command(name = "wheel", about = "Partitioned prize wheel")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Spin the wheel and print the winners
    Spin {
        /// Number of spins
        #[arg(short, long, default_value_t = 1)]
        count: u32,
        /// RNG seed for reproducible spins
        #[arg(short, long)]
        seed: Option<u64>,
        /// Use turbo timing
        #[arg(long)]
        turbo: bool,
        /// Directory holding the saved wheel
        #[arg(long)]
        store: Option<PathBuf>,
        /// Bounce the last spin's audio to a WAV file
        #[arg(long)]
        wav: Option<PathBuf>,
    },
    /// Winner distribution over many spins, as JSON
    Stats {
        #[arg(short = 'n', long, default_value_t = 10_000)]
        spins: u32,
        #[arg(short, long)]
        seed: Option<u64>,
        #[arg(long)]
        store: Option<PathBuf>,
    },
    /// Slice geometry, as JSON
    Layout {
        #[arg(long)]
        store: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Spin {
            count,
            seed,
            turbo,
            store,
            wav,
        } => run_spins(count, seed, turbo, store, wav),
        Commands::Stats { spins, seed, store } => print_stats(spins, seed, store),
        Commands::Layout { store } => print_layout(store),
    }
}

fn load_partitions(store: Option<&PathBuf>) -> Vec<Partition> {
    match store {
        Some(dir) => WheelStore::new(FileStore::new(dir)).load_partitions(),
        None => default_partitions(),
    }
}

fn run_spins(
    count: u32,
    seed: Option<u64>,
    turbo: bool,
    store: Option<PathBuf>,
    wav: Option<PathBuf>,
) -> Result<()> {
    if count == 0 {
        bail!("--count must be at least 1");
    }
    let mut config = if turbo {
        WheelConfig::turbo()
    } else {
        WheelConfig::normal()
    };
    config.spin.seed = seed;

    let persisted = store.as_ref().map(|dir| WheelStore::new(FileStore::new(dir)));
    let partitions = load_partitions(store.as_ref());
    let session = persisted
        .as_ref()
        .map(|s| s.load_session())
        .unwrap_or_default();
    let mut wheel = HeadlessWheel::with_session(config, partitions, session);

    for n in 1..=count {
        match wheel.spin_once() {
            Some(SpinOutcome::Winner(p)) => {
                let icon = p.icon.as_deref().unwrap_or("");
                println!(
                    "#{n} {icon} {} ({:.0}°){}",
                    p.label,
                    wheel.session().rotation_degrees,
                    p.description.map(|d| format!(": {d}")).unwrap_or_default()
                );
            }
            Some(SpinOutcome::NoWinner) => println!("#{n} no winner (empty wheel)"),
            None => bail!("spin {n} did not complete"),
        }
    }

    if let Some(store) = &persisted {
        store
            .save_session(wheel.session())
            .context("Failed to save session")?;
    }
    if let Some(path) = wav {
        wheel
            .recorder()
            .write_wav(&path)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        println!("Wrote {}", path.display());
    }
    Ok(())
}

/// Render side that completes instantly
struct InstantRender;

impl RenderSync for InstantRender {
    fn animate_to(&mut self, _target: &SpinTarget) {}
}

#[derive(Serialize)]
struct Stats {
    spins: u32,
    counts: BTreeMap<String, u32>,
    shares: BTreeMap<String, f64>,
}

fn print_stats(spins: u32, seed: Option<u64>, store: Option<PathBuf>) -> Result<()> {
    let partitions = load_partitions(store.as_ref());
    let mut machine = SpinMachine::new(SpinConfig {
        seed,
        ..SpinConfig::default()
    });
    let mut counts: BTreeMap<String, u32> = partitions
        .iter()
        .map(|p| (p.label.clone(), 0))
        .collect();

    for _ in 0..spins {
        machine.request_spin(&partitions, &mut InstantRender);
        if let Some(SpinOutcome::Winner(p)) = machine.on_animation_complete(&partitions) {
            *counts.entry(p.label).or_default() += 1;
        }
    }

    let shares = counts
        .iter()
        .map(|(label, n)| (label.clone(), f64::from(*n) / f64::from(spins.max(1))))
        .collect();
    let stats = Stats {
        spins,
        counts,
        shares,
    };
    println!("{}", serde_json::to_string_pretty(&stats)?);
    Ok(())
}

#[derive(Serialize)]
struct SliceView<'a> {
    id: &'a str,
    label: &'a str,
    start_degrees: f64,
    end_degrees: f64,
    label_rotation_degrees: f64,
}

fn print_layout(store: Option<PathBuf>) -> Result<()> {
    let partitions = load_partitions(store.as_ref());
    let slices = layout(&partitions);
    let view: Vec<SliceView> = slices
        .iter()
        .zip(&partitions)
        .map(|(slice, p)| SliceView {
            id: &p.id,
            label: &p.label,
            start_degrees: slice.start_angle.to_degrees(),
            end_degrees: slice.end_angle.to_degrees(),
            label_rotation_degrees: slice.label_rotation_degrees(),
        })
        .collect();
    println!("{}", serde_json::to_string_pretty(&view)?);
    println!("font size: {}", label_font_size(partitions.len()));
    Ok(())
}
