use autobak::backup::backup_config::BackupConfig;
use autobak::backup::notifications::Reporter;
use autobak::backup::observer::TracingObserver;
use autobak::backup::result_error::error::Error;
use autobak::backup::result_error::result::Result;
use autobak::backup::result_error::ErrorContext;
use autobak::backup::runner::BackupRunner;
use autobak::backup::schedule::Schedule;
use clap::Parser;
use std::fs::OpenOptions;
use std::path::PathBuf;
use std::process::exit;
use std::sync::Mutex;
use tracing::{error, info};
use tracing_subscriber::fmt::writer::MakeWriterExt;

/// Back up directories into timestamped, optionally encrypted archives
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Location of config file
    #[arg(short, long, default_value = "backup_config.yml")]
    config: PathBuf,
    /// Check that every source exists without archiving anything
    #[arg(long, conflicts_with_all = ["init", "daemon"])]
    dry_run: bool,
    /// Write a default config file and exit
    #[arg(long, conflicts_with = "daemon")]
    init: bool,
    /// Run at every tick of `general.cron` until killed
    #[arg(long)]
    daemon: bool,
}

fn init_logging(config: Option<&BackupConfig>) -> Result<()> {
    let log_file = config.and_then(|c| c.general.log_file());
    match log_file {
        Some(path) => {
            if let Some(dir) = path.parent() {
                std::fs::create_dir_all(dir)?;
            }
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(&path)
                .map_err(Error::from)
                .with_msg(format!("Cannot open log file {:?}", path))?;
            tracing_subscriber::fmt()
                .with_ansi(false)
                .with_writer(std::io::stdout.and(Mutex::new(file)))
                .init();
        }
        None => tracing_subscriber::fmt::init(),
    }
    Ok(())
}

fn dry_run(config: &BackupConfig) -> bool {
    let mut all_present = true;
    for check in config.sources.check() {
        if check.exists {
            println!("✓ {}: {}", check.source.name(), check.path().display());
        } else {
            all_present = false;
            println!("✗ {}: {} does not exist", check.source.name(), check.path().display());
        }
    }
    all_present
}

fn run_once(config: &BackupConfig) -> Result<bool> {
    let encryptor = config.encryption.tool.build_encryptor();
    let report = BackupRunner::builder()
        .config(config)
        .encryptor(encryptor.as_ref())
        .maybe_reporter(config.notification.reporter().map(|r| r as &dyn Reporter))
        .observer(&TracingObserver)
        .build()
        .run_backup()?;
    Ok(!report.has_failures())
}

fn run(args: Args) -> Result<bool> {
    if args.init {
        tracing_subscriber::fmt::init();
        BackupConfig::write_template(&args.config)?;
        println!("Default configuration written to {:?}", args.config);
        return Ok(true);
    }

    let config = BackupConfig::load(&args.config);
    if let Err(e) = init_logging(config.as_ref().ok()) {
        tracing_subscriber::fmt::init();
        return Err(e);
    }
    let config = config?;

    if args.dry_run {
        return Ok(dry_run(&config));
    }

    if args.daemon {
        let cron = config
            .general
            .cron
            .as_deref()
            .ok_or_else(|| Error::invalid_cron("general.cron is required by --daemon"))?;
        let schedule = Schedule::new(cron)?;
        info!("Starting backup daemon with schedule {:?}", cron);
        schedule.run_forever(|| {
            if let Err(e) = run_once(&config) {
                error!("{e}");
            }
        })?;
        error!("Loop should never break without error");
        return Ok(false);
    }

    run_once(&config)
}

fn main() {
    let args = Args::parse();

    match run(args) {
        Ok(true) => {}
        Ok(false) => exit(1),
        Err(e) => {
            error!("{e}");
            exit(1);
        }
    }
}
