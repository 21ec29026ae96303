use clap::Parser;
use fiberbot::{
    Bot, Config, Driver,
    driver::interrupt,
    measure::CloudflareSpeedTest,
    publish::{DryRunPoster, StatusPoster, TwitterClient},
};
use tracing::{info, level_filters::LevelFilter, trace};
use tracing_subscriber::{filter, fmt::time::ChronoLocal, layer::SubscriberExt, util::SubscriberInitExt};

const TIME_FORMAT: &str = "%d/%m/%Y %I:%M:%S %p";

#[derive(Debug, Clone, Parser)]
#[command(version, about)]
struct Args {
    /// Run a single cycle and exit
    #[arg(long)]
    once: bool,

    /// Log the status instead of posting it
    #[arg(long)]
    dry_run: bool,

    /// More logging (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn init(verbose: u8) {
    let level = match verbose {
        0 => LevelFilter::INFO,
        1 => LevelFilter::DEBUG,
        _ => LevelFilter::TRACE,
    };
    let filter = filter::Targets::new().with_targets(vec![("fiberbot", level)]);
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_timer(ChronoLocal::new(TIME_FORMAT.to_string()))
                .with_target(false)
                .compact()
                .with_ansi(false),
        )
        .with(filter)
        .init();
}

async fn run<P: StatusPoster>(config: Config, poster: P, once: bool) -> anyhow::Result<()> {
    let measurer = CloudflareSpeedTest::new(config.measurement.clone())?;
    let driver = Driver::new(Bot::new(config, measurer, poster));

    if once {
        let outcome = driver.run_once().await?;
        trace!("cycle finished: {outcome:?}");
    } else {
        driver.run(interrupt()).await;
    }

    Ok(())
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    let args = Args::parse();
    init(args.verbose);
    trace!("started with args: {args:?}");

    let config = Config::from_env();

    if args.dry_run {
        info!("dry run, nothing will be posted");
        run(config, DryRunPoster, args.once).await
    } else {
        let poster = TwitterClient::new(config.credentials.clone())?;
        run(config, poster, args.once).await
    }
}
