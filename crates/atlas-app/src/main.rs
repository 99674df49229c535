// ATLAS binary: balances one tournament's registrations into teams.

use anyhow::Context;
use atlas_app::config;
use atlas_app::evidence::EvidenceSource;
use atlas_app::repository::FileRepository;
use atlas_app::runner::Runner;
use chrono::Utc;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. Initialize tracing (log to file, not terminal)
    init_tracing()?;
    info!("ATLAS starting up");

    // 2. Load config
    let config = config::load_config().context("failed to load configuration")?;
    info!(
        "Config loaded: {} teams of {}, {:?} weighting",
        config.balance.teams.count, config.balance.teams.capacity, config.balance.weighting.mode
    );

    let tournament_id = std::env::args()
        .nth(1)
        .or_else(|| config.run.tournament_id.clone())
        .context("no tournament id: pass one as the first argument or set [run].tournament_id")?;
    let as_of = config.run.as_of.unwrap_or_else(Utc::now);

    // 3. Open the file repository and pick an evidence source
    let data_dir = config.storage.data_dir.clone();
    let repo = FileRepository::new(&data_dir);
    let evidence = EvidenceSource::from_config(config.run.evidence_enabled, &data_dir);
    info!(
        "Repository at {} (evidence {})",
        data_dir.display(),
        if evidence.is_active() { "enabled" } else { "disabled" }
    );

    // 4. Run
    let runner = Runner::new(repo, evidence, config);
    let report = runner
        .run(&tournament_id, as_of)
        .await
        .with_context(|| format!("failed to balance tournament `{tournament_id}`"))?;

    let global = &report.balance_analysis.global;
    println!(
        "{}: {} teams, spread {} ({:?}), {} players excluded",
        tournament_id,
        report.teams.len(),
        global.spread,
        global.quality_tier,
        report.excluded.len()
    );
    for team in &report.teams {
        println!("  {:<8} {:>5} pts  {} players", team.name, team.total_points, team.len());
    }
    for note in &report.notes {
        println!("  note: {note}");
    }

    info!("ATLAS finished");
    Ok(())
}

fn init_tracing() -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::EnvFilter;

    let log_dir = std::env::current_dir()?.join("logs");
    std::fs::create_dir_all(&log_dir)?;

    let log_file = std::fs::File::create(log_dir.join("atlas.log"))?;

    let subscriber = fmt::Subscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("atlas_app=info,atlas_core=info,warn")),
        )
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
