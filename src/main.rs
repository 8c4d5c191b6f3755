use aloha_sim::{simulate, ConfigError, Mode, SimConfig, Strategy};
use tracing_subscriber::EnvFilter;

const NUM_STATIONS: usize = 50;
const OFFERED_LOAD: f64 = 1.0;
const SIMULATION_TIME: f64 = 100.0;
const MAX_BACKOFF: u32 = 15;
const SEED: u64 = 42;

fn main() -> Result<(), ConfigError> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    tracing::info!("ALOHA simulator is started");

    for mode in [Mode::Pure, Mode::Slotted] {
        for strategy in [Strategy::EventDriven, Strategy::TimeDriven] {
            let config = SimConfig::builder()
                .mode(mode)
                .strategy(strategy)
                .offered_load(OFFERED_LOAD)
                .num_stations(NUM_STATIONS)
                .horizon(SIMULATION_TIME)
                .max_backoff(MAX_BACKOFF)
                .seed(SEED)
                .build()?;
            let result = simulate(&config)?;
            match serde_json::to_string(&result) {
                Ok(line) => println!("{line}"),
                Err(err) => tracing::error!(%err, "failed to encode run result"),
            }
        }
    }
    Ok(())
}
