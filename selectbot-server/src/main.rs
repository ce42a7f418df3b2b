use clap::Parser;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info};
use tracing_subscriber::{fmt, EnvFilter};

use selectbot_common::traits::repository_traits::SchedulerJobRepository;
use selectbot_core::platforms::telegram::TelegramClient;
use selectbot_core::repositories::postgres::{
    PostgresChannelRepository, PostgresGiveawayRepository, PostgresSchedulerJobRepository,
    PostgresWinnerStatsRepository,
};
use selectbot_core::scheduler::Scheduler;
use selectbot_core::services::giveaway::GiveawayService;
use selectbot_core::utils::links::DeepLinks;
use selectbot_core::{Database, Error};

#[derive(Parser, Debug, Clone)]
#[command(name = "selectbot")]
#[command(author, version, about = "SelectBot - scheduled giveaway campaigns for Telegram channels")]
struct Args {
    /// Postgres connection URL.
    #[arg(long, default_value = "postgres://selectbot@localhost:5432/selectbot")]
    db_url: String,

    /// Scheduler poll interval in seconds.
    #[arg(long, default_value_t = 5)]
    poll_secs: u64,

    /// Bot username used in campaign deep links.
    #[arg(long, default_value = "iselectbot")]
    bot_username: String,
}

fn init_tracing() {
    let filter = EnvFilter::from_default_env()
        .add_directive("selectbot=info".parse().unwrap_or_default());
    let sub = fmt().with_env_filter(filter).finish();
    tracing::subscriber::set_global_default(sub)
        .expect("Failed to set global subscriber");
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv::dotenv().ok();
    init_tracing();
    let args = Args::parse();
    info!(
        "SelectBot starting. db={}, poll={}s, bot=@{}",
        args.db_url, args.poll_secs, args.bot_username
    );

    if let Err(e) = run_server(args).await {
        error!("Server error: {:?}", e);
    }
    info!("Main finished. Goodbye!");
    Ok(())
}

async fn run_server(args: Args) -> Result<(), Error> {
    // 1) Connect to Postgres and apply migrations.
    let db = Database::new(&args.db_url).await?;
    db.migrate().await?;

    // 2) Telegram client; the token never goes on the command line.
    let token = std::env::var("TELEGRAM_BOT_TOKEN")
        .map_err(|_| Error::Parse("TELEGRAM_BOT_TOKEN is not set".into()))?;
    let api = Arc::new(TelegramClient::new(&token));

    // 3) Repositories.
    let giveaways = Arc::new(PostgresGiveawayRepository::new(db.pool().clone()));
    let channels = Arc::new(PostgresChannelRepository::new(db.pool().clone()));
    let winner_stats = Arc::new(PostgresWinnerStatsRepository::new(db.pool().clone()));
    let jobs = Arc::new(PostgresSchedulerJobRepository::new(db.pool().clone()));

    // 4) Giveaway service and the scheduler that drives it. Jobs armed
    //    before a restart are still in the store and fire on the first tick.
    let service = Arc::new(GiveawayService::new(
        api,
        giveaways,
        channels,
        winner_stats,
        DeepLinks::new(args.bot_username.clone()),
    ));
    let scheduler = Arc::new(Scheduler::new(
        jobs.clone(),
        service.clone(),
        Duration::from_secs(args.poll_secs),
    ));

    let pending = jobs.pending_count().await?;
    info!("{} scheduled job(s) pending in the store", pending);

    let scheduler_handle = scheduler.clone().spawn();

    // 5) Ctrl-C triggers a graceful scheduler shutdown.
    let sched = scheduler.clone();
    tokio::spawn(async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to listen for Ctrl-C: {:?}", e);
        }
        info!("Ctrl-C detected; shutting down scheduler...");
        sched.shutdown();
    });

    // 6) Run until the scheduler loop exits.
    if let Err(e) = scheduler_handle.await {
        error!("Scheduler task join error: {:?}", e);
    }
    Ok(())
}
