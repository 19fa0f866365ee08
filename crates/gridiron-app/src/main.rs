// Gridiron season runner.
//
// Startup sequence:
// 1. Load config (copying defaults on first run)
// 2. Initialize tracing (log file unless configured for stderr)
// 3. Generate the league
// 4. Play the configured number of seasons
// 5. Write the JSON snapshot, if configured

use gridiron_app::config::{self, LoggingConfig};
use gridiron_app::season;
use gridiron_core::sim::RatingSimulator;
use gridiron_core::League;

use anyhow::Context;
use chrono::Datelike;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing::info;

fn main() -> anyhow::Result<()> {
    let config = config::load_config().context("failed to load configuration")?;
    init_tracing(&config.logging)?;

    let base_year = config
        .league
        .base_year
        .unwrap_or_else(|| chrono::Local::now().year());
    let seed = config
        .league
        .seed
        .unwrap_or_else(|| chrono::Utc::now().timestamp_millis() as u64);
    info!(
        "Starting {} in {} (seed {}, {} seasons)",
        config.league.name, base_year, seed, config.league.seasons
    );

    let mut league = League::generate(config.settings.clone(), base_year, seed)
        .context("failed to generate league")?;
    let mut rng = ChaCha8Rng::seed_from_u64(seed);

    let summaries = season::run_seasons(&mut league, &RatingSimulator, config.league.seasons, &mut rng)
        .context("season simulation failed")?;

    for s in &summaries {
        println!(
            "{}: champion {} | best record {} {}",
            s.season, s.champion_name, s.best_team, s.best_record
        );
    }

    if let Some(path) = &config.league.snapshot_path {
        season::write_snapshot(std::path::Path::new(path), &league, &summaries)?;
    }

    info!("Done after {} seasons", summaries.len());
    Ok(())
}

fn init_tracing(logging: &LoggingConfig) -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("gridiron=info,warn"));

    if logging.log_to_stderr {
        let subscriber = fmt::Subscriber::builder()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .with_target(true)
            .finish();
        tracing::subscriber::set_global_default(subscriber)
            .context("failed to set tracing subscriber")?;
        return Ok(());
    }

    let log_dir = std::env::current_dir()?.join("logs");
    std::fs::create_dir_all(&log_dir)?;

    let log_file = std::fs::File::create(log_dir.join("gridiron.log"))?;

    let subscriber = fmt::Subscriber::builder()
        .with_env_filter(filter)
        .with_writer(log_file)
        .with_ansi(false)
        .with_target(true)
        .with_thread_ids(true)
        .with_line_number(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .context("failed to set tracing subscriber")?;

    Ok(())
}
