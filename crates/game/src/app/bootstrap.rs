use engine::{LoopConfig, Scene};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use super::gameplay;

const TARGET_TPS_ENV_VAR: &str = "AWAKENED_TARGET_TPS";

pub(crate) struct AppWiring {
    pub(crate) config: LoopConfig,
    pub(crate) scene: Box<dyn Scene>,
}

pub(crate) fn build_app() -> AppWiring {
    init_tracing();
    info!(version = env!("CARGO_PKG_VERSION"), "=== Awakened Room Startup ===");

    let defaults = LoopConfig::default();
    let target_tps = target_tps_from_env(defaults.target_tps);
    let config = LoopConfig {
        target_tps,
        ..defaults
    };
    info!(target_tps = config.target_tps, "loop_config");

    AppWiring {
        config,
        scene: gameplay::build_scene(),
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_names(true)
        .compact()
        .init();
}

fn target_tps_from_env(default: u32) -> u32 {
    match std::env::var(TARGET_TPS_ENV_VAR) {
        Ok(raw) => parse_target_tps(&raw).unwrap_or_else(|| {
            warn!(
                var = TARGET_TPS_ENV_VAR,
                value = %raw,
                fallback = default,
                "invalid_target_tps"
            );
            default
        }),
        Err(_) => default,
    }
}

fn parse_target_tps(raw: &str) -> Option<u32> {
    raw.trim().parse::<u32>().ok().filter(|tps| *tps > 0)
}

#[cfg(test)]
mod tests {
    use super::parse_target_tps;

    #[test]
    fn target_tps_accepts_positive_integers() {
        assert_eq!(parse_target_tps("120"), Some(120));
        assert_eq!(parse_target_tps(" 30 "), Some(30));
    }

    #[test]
    fn target_tps_rejects_zero_and_garbage() {
        assert_eq!(parse_target_tps("0"), None);
        assert_eq!(parse_target_tps("fast"), None);
        assert_eq!(parse_target_tps("-5"), None);
        assert_eq!(parse_target_tps(""), None);
    }
}
