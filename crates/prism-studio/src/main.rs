use anyhow::{Context, Result};
use clap::Parser;
use winit::dpi::LogicalSize;

use prism_ambient::AnimatorConfig;
use prism_engine::device::GpuInit;
use prism_engine::logging::{LoggingConfig, init_logging};
use prism_engine::window::{Runtime, RuntimeConfig};

mod host;
mod layer;
mod shell;

use shell::Shell;

/// `prism-studio` - a window with the ambient geometry layer mounted at its root.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Number of shapes (8..=15).
    #[arg(long, env = "PRISM_POPULATION", default_value_t = 12)]
    population: usize,

    /// Seed for a reproducible population. Random when omitted.
    #[arg(long, env = "PRISM_SEED")]
    seed: Option<u64>,

    /// Initial window width in logical pixels.
    #[arg(long, env = "PRISM_WIDTH", default_value_t = 1280.0)]
    width: f64,

    /// Initial window height in logical pixels.
    #[arg(long, env = "PRISM_HEIGHT", default_value_t = 720.0)]
    height: f64,

    /// Log filter in `env_logger` syntax, e.g. `prism_ambient=debug`.
    #[arg(long, env = "PRISM_LOG")]
    log: Option<String>,
}

impl Args {
    fn animator_config(&self) -> AnimatorConfig {
        let config = AnimatorConfig::default().with_population(self.population);
        match self.seed {
            Some(seed) => config.with_seed(seed),
            None => config,
        }
    }
}

fn main() -> Result<()> {
    let args = Args::parse();

    init_logging(LoggingConfig {
        env_filter: args.log.clone(),
        ..LoggingConfig::default()
    });

    let animator = args.animator_config();
    animator
        .validate()
        .context("invalid ambient layer configuration")?;

    let runtime = RuntimeConfig {
        title: "prism".to_string(),
        initial_size: LogicalSize::new(args.width, args.height),
        transparent: true,
    };

    log::info!(
        "starting prism: {} shapes, seed {:?}",
        animator.population,
        animator.seed
    );

    Runtime::run(runtime, GpuInit::default(), Shell::new(animator))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_ambient_defaults() {
        let args = Args::try_parse_from(["prism-studio"]).unwrap();
        assert_eq!(args.population, 12);
        assert_eq!(args.seed, None);
        assert_eq!(args.animator_config(), AnimatorConfig::default());
    }

    #[test]
    fn flags_reach_the_animator_config() {
        let args = Args::try_parse_from([
            "prism-studio",
            "--population",
            "9",
            "--seed",
            "42",
            "--width",
            "640",
        ])
        .unwrap();
        let config = args.animator_config();
        assert_eq!(config.population, 9);
        assert_eq!(config.seed, Some(42));
        assert_eq!(args.width, 640.0);
    }

    #[test]
    fn out_of_range_population_fails_validation() {
        let args = Args::try_parse_from(["prism-studio", "--population", "40"]).unwrap();
        assert!(args.animator_config().validate().is_err());
    }
}
