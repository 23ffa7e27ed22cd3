use chrono::Local;
use clap::Parser;
use spendwise::args::{
    Args, ChallengesSubcommand, Command, ExpensesSubcommand, FavoritesSubcommand,
};
use spendwise::{commands, repo, Config, Mode, Result};
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
    let today = Local::now().date_naive();

    // This allows for running the program without an expense backend. When SPEND_IN_TEST_MODE is
    // set and non-zero in length, then the mode will be Mode::Test, otherwise it will be
    // Mode::Http.
    let mode = Mode::from_env();

    if let Command::Init(init_args) = args.command() {
        commands::init(home, init_args.api_url()).await?.print();
        return Ok(());
    }

    let config = Config::load(home).await?;

    // Route to appropriate command handler
    let _: () = match args.command() {
        Command::Init(_) => {}

        Command::Challenges(challenge_args) => {
            let repo = repo::repository(&config, mode, today)?;
            match challenge_args.action() {
                ChallengesSubcommand::List => {
                    commands::list_challenges(config, repo.as_ref(), today)
                        .await?
                        .print()
                }
                ChallengesSubcommand::Start(id) => {
                    commands::start_challenge(config, repo.as_ref(), id.id(), today)
                        .await?
                        .print()
                }
                ChallengesSubcommand::Cancel(id) => {
                    commands::cancel_challenge(config, repo.as_ref(), id.id(), today)
                        .await?
                        .print()
                }
                ChallengesSubcommand::Check => {
                    commands::check_challenges(config, repo.as_ref(), today)
                        .await?
                        .print()
                }
                ChallengesSubcommand::Points => commands::points(config).await?.print(),
            }
        }

        Command::Expenses(expense_args) => {
            let repo = repo::repository(&config, mode, today)?;
            match expense_args.action() {
                ExpensesSubcommand::List => {
                    commands::list_expenses(config, repo.as_ref()).await?.print()
                }
                ExpensesSubcommand::Add(args) => {
                    commands::add_expense(config, repo.as_ref(), args.clone(), today)
                        .await?
                        .print()
                }
                ExpensesSubcommand::Update(args) => {
                    commands::update_expense(config, repo.as_ref(), args.clone(), today)
                        .await?
                        .print()
                }
                ExpensesSubcommand::Delete(id) => {
                    commands::delete_expense(config, repo.as_ref(), id.id(), today)
                        .await?
                        .print()
                }
            }
        }

        Command::Favorites(favorite_args) => match favorite_args.action() {
            FavoritesSubcommand::List => commands::list_favorites(config).await?.print(),
            FavoritesSubcommand::Add(args) => {
                commands::add_favorite(config, args.clone()).await?.print()
            }
            FavoritesSubcommand::Remove(id) => {
                commands::remove_favorite(config, id.id()).await?.print()
            }
            FavoritesSubcommand::Use(id) => {
                let repo = repo::repository(&config, mode, today)?;
                commands::use_favorite(config, repo.as_ref(), id.id(), today)
                    .await?
                    .print()
            }
        },

        Command::Status => {
            let repo = repo::repository(&config, mode, today)?;
            commands::status(config, repo.as_ref(), mode).await?.print()
        }

        Command::Report(report_args) => {
            let repo = repo::repository(&config, mode, today)?;
            commands::report(config, repo.as_ref(), report_args.clone(), today)
                .await?
                .print_document()
        }
    };
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
            // RUST_LOG does not exist; use default log level for the library and binary only.
            EnvFilter::new(format!(
                "spendwise={},{}={}",
                level,
                env!("CARGO_CRATE_NAME"),
                level
            ))
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
