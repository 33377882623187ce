use clap::Parser;
use fintrack::args::{Args, CategoryCommand, Command, ReportCommand, TransactionCommand};
use fintrack::{commands, Config, Result};
use std::process::ExitCode;
use tracing::{debug, error, trace};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();
    let log_level = args.common().log_level();
    init_logger(log_level);
    debug!("Log level set to {}", log_level.to_string().to_lowercase());

    match main_inner(args).await {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            error!("Exiting with error: {e}");
            ExitCode::FAILURE
        }
    }
}

pub async fn main_inner(args: Args) -> Result<()> {
    trace!("{args:?}");
    let home = args.common().home().path();

    // Route to appropriate command handler
    let _: () = match args.command() {
        Command::Init => commands::init(home).await?.print(),

        Command::Category(command) => {
            let config = Config::load(home).await?;
            let result = category(config.clone(), command).await;
            config.db().close().await;
            result?
        }

        Command::Transaction(command) => {
            let config = Config::load(home).await?;
            let result = transaction(config.clone(), command).await;
            config.db().close().await;
            result?
        }

        Command::Report(command) => {
            let config = Config::load(home).await?;
            let result = report(config.clone(), command).await;
            config.db().close().await;
            result?
        }
    };
    Ok(())
}

async fn category(config: Config, command: &CategoryCommand) -> Result<()> {
    match command {
        CategoryCommand::Add(args) => commands::add_category(config, args.clone()).await?.print(),
        CategoryCommand::Delete(args) => commands::delete_category(config, args.clone())
            .await?
            .print(),
        CategoryCommand::List(args) => commands::list_categories(config, args.clone())
            .await?
            .print(),
    }
    Ok(())
}

async fn transaction(config: Config, command: &TransactionCommand) -> Result<()> {
    match command {
        TransactionCommand::Add(args) => commands::add_transaction(config, args.clone())
            .await?
            .print(),
        TransactionCommand::Update(args) => commands::update_transaction(config, args.clone())
            .await?
            .print(),
        TransactionCommand::Delete(args) => commands::delete_transaction(config, args.clone())
            .await?
            .print(),
        TransactionCommand::List(args) => commands::list_transactions(config, args.clone())
            .await?
            .print(),
    }
    Ok(())
}

async fn report(config: Config, command: &ReportCommand) -> Result<()> {
    match command {
        ReportCommand::Monthly(args) => commands::monthly(config, args.clone()).await?.print(),
        ReportCommand::Breakdown(args) => commands::breakdown(config, args.clone()).await?.print(),
        ReportCommand::Balance => commands::balance(config).await?.print(),
    }
    Ok(())
}

/// Initializes the tracing subscriber.
pub fn init_logger(level: LevelFilter) {
    let filter = match std::env::var("RUST_LOG").ok() {
        Some(_) => {
            // RUST_LOG exists; use it.
            EnvFilter::from_default_env()
        }
        None => {
            // RUST_LOG does not exist; use default log level for this crate only.
            EnvFilter::new(format!(
                "{}={},{}={}",
                env!("CARGO_CRATE_NAME"),
                level,
                env!("CARGO_BIN_NAME"),
                level
            ))
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
