use clap::Parser;
use anyhow::Context;
use colored::Colorize;
use log::{info, warn};
use phi_core::{
    DetectorConfig, INCREASE_FACTOR, INITIAL_HEARTBEAT_INTERVAL, MAX_HEARTBEAT_INTERVAL,
    MAX_VARIANCE, MIN_HEARTBEAT_INTERVAL, PHI_THRESHOLD, WINDOW_SIZE,
};
use phi_detector::PhiDetector;
use phi_std::LogSink;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::sync::{Arc, atomic::{AtomicBool, Ordering}};

mod sim;
use sim::{Scenario, Timeline};

#[derive(Parser)]
#[command(about = "Drive a phi accrual detector with a simulated heartbeat stream")]
struct Cli {
    #[arg(long, default_value_t = 1000)] iterations: u64,
    /// Upper bound of the random pause between iterations.
    #[arg(long, default_value_t = 50)] max_sleep_ms: u64,
    /// Report a random loss count on every Nth iteration (0 = never).
    #[arg(long, default_value_t = 4)] loss_every: u64,
    #[arg(long, default_value_t = 9)] max_missed: u32,
    #[arg(long)] seed: Option<u64>,
    /// Advance a virtual clock instead of sleeping.
    #[arg(long)] virtual_time: bool,

    #[arg(long, default_value_t = PHI_THRESHOLD)] phi_threshold: f64,
    #[arg(long, default_value_t = WINDOW_SIZE)] window_size: usize,
    #[arg(long, default_value_t = INITIAL_HEARTBEAT_INTERVAL)] initial_interval: f64,
    #[arg(long, default_value_t = MIN_HEARTBEAT_INTERVAL)] min_interval: f64,
    #[arg(long, default_value_t = MAX_HEARTBEAT_INTERVAL)] max_interval: f64,
    #[arg(long, default_value_t = INCREASE_FACTOR)] increase_factor: f64,
    #[arg(long, default_value_t = MAX_VARIANCE)] max_variance: f64,
}

impl Cli {
    fn config(&self) -> DetectorConfig {
        DetectorConfig {
            phi_threshold: self.phi_threshold,
            window_size: self.window_size,
            initial_interval: self.initial_interval,
            min_interval: self.min_interval,
            max_interval: self.max_interval,
            increase_factor: self.increase_factor,
            max_variance: self.max_variance,
        }
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let config = cli.config();
    let mut detector = PhiDetector::new(config, LogSink).context("invalid detector configuration")?;

    let rng = match cli.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let timeline = if cli.virtual_time { Timeline::virtual_from(0.0) } else { Timeline::real() };

    let running = Arc::new(AtomicBool::new(true));
    let r = running.clone();
    ctrlc::set_handler(move || {
        warn!("Signal received. Stopping...");
        r.store(false, Ordering::SeqCst);
    })?;

    info!(
        "phi-sim: {} iterations, threshold {:.2}, window {}{}",
        cli.iterations,
        config.phi_threshold,
        config.window_size,
        if cli.virtual_time { " (virtual time)" } else { "" }
    );

    let scenario = Scenario {
        iterations: cli.iterations,
        max_sleep_ms: cli.max_sleep_ms,
        loss_every: cli.loss_every,
        max_missed: cli.max_missed,
    };
    let summary = scenario.run(&mut detector, &timeline, rng, &running);

    let est = detector.estimate();
    println!("{}", "phi-sim summary".bold());
    println!("  iterations   {}", summary.iterations);
    println!("  sent         {}", summary.sent.to_string().green());
    println!("  suppressed   {}", summary.suppressed.to_string().yellow());
    println!("  missed total {}", summary.missed.to_string().red());
    println!("  mean         {:.4}s", est.mean);
    println!("  variance     {:.4}", est.variance);
    if summary.interrupted {
        println!("  {}", "interrupted".red());
    }
    Ok(())
}
