// crates/tl_cli/src/main.rs
//
// `tierlist` binary: parse flags, install logging, run one command against a
// JSON-directory store, map failures to exit codes.

mod args;

mod exitcodes {
    pub const OK: u8 = 0;
    pub const VALIDATION: u8 = 2;
    pub const IO: u8 = 4;
}

use std::process::ExitCode;

use clap::Parser;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use args::{Args, Command, Format};
use tl_core::ScopeConfig;
use tl_io::canonical_json::read_json_opt;
use tl_io::{Catalog, IoError, JsonDirStore};
use tl_pipeline::{Aggregator, PipelineError};

/// Failure buckets for exit-code mapping.
#[derive(Debug)]
enum MainError {
    /// Bad input: malformed documents, invalid config, scope not set up, empty catalog
    Validation(String),
    /// Filesystem failures
    Io(String),
}

impl std::fmt::Display for MainError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MainError::Validation(m) | MainError::Io(m) => f.write_str(m),
        }
    }
}

impl From<IoError> for MainError {
    fn from(e: IoError) -> Self {
        match e {
            IoError::Path(_) => MainError::Io(e.to_string()),
            IoError::Json { .. } | IoError::Invalid(_) => {
                MainError::Validation(e.to_string())
            }
        }
    }
}

impl From<PipelineError> for MainError {
    fn from(e: PipelineError) -> Self {
        match e {
            PipelineError::Io(io) => io.into(),
            PipelineError::Core(_) | PipelineError::NotSetUp(_) | PipelineError::EmptyCatalog => {
                MainError::Validation(e.to_string())
            }
        }
    }
}

fn main() -> ExitCode {
    dotenvy::dotenv().ok();

    let args = match Args::try_parse() {
        Ok(a) => a,
        Err(e) => {
            let _ = e.print();
            return ExitCode::from(if e.use_stderr() { exitcodes::VALIDATION } else { exitcodes::OK });
        }
    };

    let _log_guard = init_tracing(&args);

    match run(&args) {
        Ok(()) => ExitCode::from(exitcodes::OK),
        Err(e) => {
            tracing::error!(error = %e, "command failed");
            eprintln!("tierlist: error: {e}");
            ExitCode::from(map_error(&e))
        }
    }
}

fn map_error(e: &MainError) -> u8 {
    match e {
        MainError::Validation(_) => exitcodes::VALIDATION,
        MainError::Io(_) => exitcodes::IO,
    }
}

/// `RUST_LOG` wins; otherwise `info` (`warn` with `--quiet`). The returned
/// guard flushes the file writer on drop and must live until exit.
fn init_tracing(args: &Args) -> Option<WorkerGuard> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(if args.quiet { "warn" } else { "info" }));
    let stderr_layer = fmt::layer().with_writer(std::io::stderr).with_target(false);

    match &args.log_dir {
        Some(dir) => {
            let (writer, guard) =
                tracing_appender::non_blocking(tracing_appender::rolling::daily(dir, "tierlist.log"));
            let _ = tracing_subscriber::registry()
                .with(filter)
                .with(stderr_layer)
                .with(fmt::layer().with_ansi(false).with_writer(writer))
                .try_init();
            Some(guard)
        }
        None => {
            let _ = tracing_subscriber::registry().with(filter).with(stderr_layer).try_init();
            None
        }
    }
}

fn run(args: &Args) -> Result<(), MainError> {
    let agg = Aggregator::new(JsonDirStore::open(&args.data_dir)?);

    match &args.command {
        Command::Vote { scope, voter, item, tier } => {
            match agg.register_vote(voter, scope, item, *tier)? {
                None => println!("{voter} rated {item}: {tier}"),
                Some(prev) if prev == *tier => println!("{voter} rated {item}: {tier} (unchanged)"),
                Some(prev) => println!("{voter} rated {item}: {prev} -> {tier}"),
            }
        }

        Command::Show { scope, format, fresh } => {
            if *fresh {
                agg.recompute_if_stale(scope)?;
            }
            let buckets = agg.tier_view(scope)?;
            let out = match format {
                Format::Text => tl_report::render_text(&buckets),
                Format::Csv => tl_report::render_csv(&buckets),
                Format::Json => tl_report::render_json(&tl_report::build_model(scope.as_str(), &buckets))
                    .map_err(|e| MainError::Validation(e.to_string()))?,
            };
            println!("{out}");
        }

        Command::Recompute { scope: Some(scope) } => {
            let buckets = agg.recompute(scope)?;
            println!("{scope}: {} items placed", buckets.len());
        }

        Command::Recompute { scope: None } => {
            let report = agg.recompute_all()?;
            for s in &report.updated {
                println!("{s}: updated");
            }
            for s in &report.fresh {
                println!("{s}: up to date");
            }
            for (s, err) in &report.failed {
                println!("{s}: failed: {err}");
            }
            if !report.failed.is_empty() {
                return Err(MainError::Io(format!("{} scope(s) failed to recompute", report.failed.len())));
            }
        }

        Command::Setup { scope, channel, role, post_time } => {
            let setup = agg.setup_scope(scope, channel.clone(), role.clone(), *post_time)?;
            println!("channel:   {}", setup.channel.as_deref().unwrap_or("-"));
            println!("role:      {}", setup.role.as_deref().unwrap_or("-"));
            println!(
                "post time: {}",
                setup.post_time.map(|t| t.to_string()).unwrap_or_else(|| "-".into())
            );
        }

        Command::Config { scope, set } => {
            if let Some(path) = set {
                let config: ScopeConfig = read_json_opt(path)?.ok_or_else(|| {
                    MainError::Io(format!("config file not found: {}", path.display()))
                })?;
                agg.set_config(scope, config)?;
            }
            let config = agg.effective_config(scope)?;
            let text = serde_json::to_string_pretty(&config)
                .map_err(|e| MainError::Validation(e.to_string()))?;
            println!("{text}");
        }

        Command::Next { scope, catalog } => {
            let catalog = Catalog::load(catalog)?;
            let item = agg.next_item(scope, &catalog)?;
            println!("{item}");
            if let Some(meta) = catalog.get(&item) {
                if let Some(eng) = &meta.english_title {
                    println!("  {eng}");
                }
                if let Some(url) = &meta.video_url {
                    println!("  {url}");
                }
            }
        }

        Command::Revotable { scope } => {
            for item in agg.voted_items(scope)? {
                println!("{item}");
            }
        }
    }
    Ok(())
}
