use ik_negotiation::config::{config_path, unknown_flags};
use ik_negotiation::ik::{LogGizmos, NegotiationSolver, RotationOutcome};
use ik_negotiation::{Config, ConfigError};
use std::process::ExitCode;

fn load_config(args: &[String]) -> Result<Config, ConfigError> {
    let mut config = match config_path(args) {
        Some(path) => Config::from_file(path)?,
        None => Config::demo_arm(),
    };
    config.apply_args(args)?;
    Ok(config)
}

fn run(config: &Config) -> Result<(), ConfigError> {
    let mut chain = config.build_chain()?;
    let delta_time = config.simulation.delta_time;
    let mut previous: Vec<RotationOutcome> = Vec::new();
    let mut first_reached = None;

    for _ in 0..config.simulation.frames {
        let result = NegotiationSolver::step(&mut chain, delta_time);
        chain.draw_gizmos(&mut LogGizmos);

        if result.outcomes != previous {
            log::info!("frame {}: {:?}", result.frame, result.outcomes);
            previous = result.outcomes;
        }
        if result.tip_reached && first_reached.is_none() {
            first_reached = Some(result.frame);
        }
    }

    let tip = chain.tip();
    let distance = tip.target().map(|t| tip.extent_point().distance(t));
    match first_reached {
        Some(frame) => log::info!("{} first reached the target on frame {frame}", tip.name()),
        None => log::info!("{} did not reach the target", tip.name()),
    }
    if let Some(distance) = distance {
        log::info!("final extent distance to target: {distance:.3}");
    }
    for bone in chain.bones() {
        log::info!(
            "{}: {:.1} degrees from rest, signal {:?}",
            bone.name(),
            bone.rotation_from_rest(),
            bone.signal().state()
        );
    }
    Ok(())
}

fn main() -> ExitCode {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let config = load_config(&args);

    let level = config
        .as_ref()
        .map(|c| c.logging.level.clone())
        .unwrap_or_else(|_| "info".to_string());
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    for flag in unknown_flags(&args) {
        log::warn!("ignoring unknown flag {flag}");
    }

    let result = config.and_then(|config| run(&config));
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{e}");
            ExitCode::FAILURE
        }
    }
}
