use env_logger::Env;
use neon_knots::{DemoConfig, NeonKnotsApp};

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let config = DemoConfig::from_env();
    if let Some(seed) = config.seed {
        log::info!("Using knot seed {}", seed);
    }

    NeonKnotsApp::new(config)?.run()
}
