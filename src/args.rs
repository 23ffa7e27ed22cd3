//! These structs provide the CLI interface for the spend CLI.

use crate::model::{Amount, ExpenseUpdates};
use crate::report::{ReportFormat, ReportRange};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use std::convert::Infallible;
use std::fmt::{Display, Formatter};
use std::ops::Deref;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::error;
use tracing_subscriber::filter::LevelFilter;

/// spend: A command-line tool for tracking expenses and taking on spending challenges.
///
/// Expenses are kept by the expense backend (see --api-url on `spend init`). Challenges,
/// favorites and earned points are kept locally in the spendwise home directory.
///
/// Challenges are evaluated against your expenses every time you change an expense, start or
/// cancel a challenge, or run `spend challenges check`. A challenge that reaches the end of its
/// window is either completed, earning its points, or dropped.
///
/// Set SPEND_IN_TEST_MODE to any non-empty value to use seeded in-memory expenses instead of the
/// backend.
#[derive(Debug, Parser, Clone)]
pub struct Args {
    #[clap(flatten)]
    common: Common,

    #[command(subcommand)]
    command: Command,
}

impl Args {
    pub fn new(common: Common, command: Command) -> Self {
        Self { common, command }
    }

    pub fn common(&self) -> &Common {
        &self.common
    }

    pub fn command(&self) -> &Command {
        &self.command
    }
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Create the data directory and initialize the configuration file and local store.
    ///
    /// This is the first command you should run. By default the data directory is
    /// $HOME/spendwise; pass --home or set SPEND_HOME to put it somewhere else.
    Init(InitArgs),
    /// List, start, cancel and check spending challenges.
    Challenges(ChallengesArgs),
    /// List, add, update and delete expenses.
    Expenses(ExpensesArgs),
    /// Manage saved expense templates and add expenses from them.
    Favorites(FavoritesArgs),
    /// Print or save a shareable report of your expenses.
    Report(ReportArgs),
    /// Check that the expense backend can be reached and count its expenses.
    Status,
}

/// Arguments common to all subcommands.
#[derive(Debug, Parser, Clone)]
pub struct Common {
    /// The logging verbosity. One of, from least to most verbose:
    /// off, error, warn, info, debug, trace
    ///
    /// This can be overridden by RUST_LOG.
    #[arg(long, default_value_t = LevelFilter::INFO)]
    log_level: LevelFilter,

    /// The directory where spendwise data and configuration is held. Defaults to ~/spendwise
    #[arg(long, env = "SPEND_HOME", default_value_t = default_spend_home())]
    home: DisplayPath,
}

impl Common {
    pub fn new(log_level: LevelFilter, home: PathBuf) -> Self {
        Self {
            log_level,
            home: home.into(),
        }
    }

    pub fn log_level(&self) -> LevelFilter {
        self.log_level
    }

    pub fn home(&self) -> &DisplayPath {
        &self.home
    }
}

/// (Not shown): Args for the `spend init` command.
#[derive(Debug, Parser, Clone)]
pub struct InitArgs {
    /// The URL of the expense backend's expenses resource, e.g.
    /// http://localhost:8080/api/expenses (the default)
    #[arg(long)]
    api_url: Option<String>,
}

impl InitArgs {
    pub fn new(api_url: Option<String>) -> Self {
        Self { api_url }
    }

    pub fn api_url(&self) -> Option<&str> {
        self.api_url.as_deref()
    }
}

/// (Not shown): Args for the `spend challenges` command.
#[derive(Debug, Parser, Clone)]
pub struct ChallengesArgs {
    #[command(subcommand)]
    action: ChallengesSubcommand,
}

impl ChallengesArgs {
    pub fn new(action: ChallengesSubcommand) -> Self {
        Self { action }
    }

    pub fn action(&self) -> &ChallengesSubcommand {
        &self.action
    }
}

#[derive(Subcommand, Debug, Clone)]
pub enum ChallengesSubcommand {
    /// Show active challenges with their progress and the challenges you can start.
    List,
    /// Start a challenge from the catalog, e.g. `no-eating-out-7`.
    Start(ChallengeIdArgs),
    /// Stop an active challenge without earning its points.
    Cancel(ChallengeIdArgs),
    /// Evaluate the active challenges against your expenses now.
    Check,
    /// Show completed challenges and your total points.
    Points,
}

/// (Not shown): The challenge id for `start` and `cancel`.
#[derive(Debug, Parser, Clone)]
pub struct ChallengeIdArgs {
    /// The challenge id, as shown by `spend challenges list`.
    id: String,
}

impl ChallengeIdArgs {
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }

    pub fn id(&self) -> &str {
        &self.id
    }
}

/// (Not shown): Args for the `spend expenses` command.
#[derive(Debug, Parser, Clone)]
pub struct ExpensesArgs {
    #[command(subcommand)]
    action: ExpensesSubcommand,
}

impl ExpensesArgs {
    pub fn new(action: ExpensesSubcommand) -> Self {
        Self { action }
    }

    pub fn action(&self) -> &ExpensesSubcommand {
        &self.action
    }
}

#[derive(Subcommand, Debug, Clone)]
pub enum ExpensesSubcommand {
    /// List all expenses.
    List,
    /// Record a new expense.
    Add(AddExpenseArgs),
    /// Change fields of an existing expense.
    Update(UpdateExpenseArgs),
    /// Delete an expense.
    Delete(ExpenseIdArgs),
}

/// (Not shown): Args for `spend expenses add`.
#[derive(Debug, Parser, Clone)]
pub struct AddExpenseArgs {
    /// What the money was spent on.
    #[arg(long)]
    title: String,

    /// The amount, e.g. 250 or 1,250.50. A leading currency symbol is ignored.
    #[arg(long)]
    amount: Amount,

    /// The category, e.g. Food, Transportation, Entertainment, Shopping, Bills.
    #[arg(long)]
    category: String,

    /// The date of the expense as YYYY-MM-DD. Defaults to today.
    #[arg(long)]
    date: Option<NaiveDate>,

    /// An optional note.
    #[arg(long)]
    description: Option<String>,
}

impl AddExpenseArgs {
    pub fn new(
        title: impl Into<String>,
        amount: Amount,
        category: impl Into<String>,
        date: Option<NaiveDate>,
        description: Option<String>,
    ) -> Self {
        Self {
            title: title.into(),
            amount,
            category: category.into(),
            date,
            description,
        }
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn amount(&self) -> Amount {
        self.amount
    }

    pub fn category(&self) -> &str {
        &self.category
    }

    pub fn date(&self) -> Option<NaiveDate> {
        self.date
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }
}

/// (Not shown): Args for `spend expenses update`. Fields that are not given are left unchanged.
#[derive(Debug, Parser, Clone)]
pub struct UpdateExpenseArgs {
    /// The id of the expense to update.
    id: i64,

    #[arg(long)]
    title: Option<String>,

    #[arg(long)]
    amount: Option<Amount>,

    #[arg(long)]
    category: Option<String>,

    /// YYYY-MM-DD
    #[arg(long)]
    date: Option<NaiveDate>,

    #[arg(long)]
    description: Option<String>,
}

impl UpdateExpenseArgs {
    pub fn new(id: i64, updates: ExpenseUpdates) -> Self {
        Self {
            id,
            title: updates.title,
            amount: updates.amount,
            category: updates.category,
            date: updates.date,
            description: updates.description,
        }
    }

    pub fn id(&self) -> i64 {
        self.id
    }

    /// The requested changes.
    pub fn updates(&self) -> ExpenseUpdates {
        ExpenseUpdates {
            title: self.title.clone(),
            amount: self.amount,
            category: self.category.clone(),
            date: self.date,
            description: self.description.clone(),
        }
    }
}

/// (Not shown): The expense id for `spend expenses delete`.
#[derive(Debug, Parser, Clone)]
pub struct ExpenseIdArgs {
    id: i64,
}

impl ExpenseIdArgs {
    pub fn new(id: i64) -> Self {
        Self { id }
    }

    pub fn id(&self) -> i64 {
        self.id
    }
}

/// (Not shown): Args for the `spend favorites` command.
#[derive(Debug, Parser, Clone)]
pub struct FavoritesArgs {
    #[command(subcommand)]
    action: FavoritesSubcommand,
}

impl FavoritesArgs {
    pub fn new(action: FavoritesSubcommand) -> Self {
        Self { action }
    }

    pub fn action(&self) -> &FavoritesSubcommand {
        &self.action
    }
}

#[derive(Subcommand, Debug, Clone)]
pub enum FavoritesSubcommand {
    /// List saved favorites.
    List,
    /// Save a new favorite.
    Add(AddFavoriteArgs),
    /// Delete a favorite.
    Remove(FavoriteIdArgs),
    /// Add an expense dated today from a favorite.
    Use(FavoriteIdArgs),
}

/// (Not shown): Args for `spend favorites add`.
#[derive(Debug, Parser, Clone)]
pub struct AddFavoriteArgs {
    #[arg(long)]
    title: String,

    #[arg(long)]
    amount: Amount,

    #[arg(long)]
    category: String,

    /// Shown next to the favorite. Defaults to ⚡
    #[arg(long)]
    emoji: Option<String>,
}

impl AddFavoriteArgs {
    pub fn new(
        title: impl Into<String>,
        amount: Amount,
        category: impl Into<String>,
        emoji: Option<String>,
    ) -> Self {
        Self {
            title: title.into(),
            amount,
            category: category.into(),
            emoji,
        }
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn amount(&self) -> Amount {
        self.amount
    }

    pub fn category(&self) -> &str {
        &self.category
    }

    pub fn emoji(&self) -> Option<&str> {
        self.emoji.as_deref()
    }
}

/// (Not shown): The favorite id for `remove` and `use`.
#[derive(Debug, Parser, Clone)]
pub struct FavoriteIdArgs {
    id: String,
}

impl FavoriteIdArgs {
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }

    pub fn id(&self) -> &str {
        &self.id
    }
}

/// (Not shown): Args for the `spend report` command.
#[derive(Debug, Parser, Clone)]
pub struct ReportArgs {
    /// The shape of the report.
    #[arg(long, value_enum, default_value_t = ReportFormat::Summary)]
    format: ReportFormat,

    /// Which expenses to include.
    #[arg(long, value_enum, default_value_t = ReportRange::All)]
    range: ReportRange,

    /// Write the report to this file instead of printing it.
    #[arg(long)]
    output: Option<PathBuf>,
}

impl ReportArgs {
    pub fn new(format: ReportFormat, range: ReportRange, output: Option<PathBuf>) -> Self {
        Self {
            format,
            range,
            output,
        }
    }

    pub fn format(&self) -> ReportFormat {
        self.format
    }

    pub fn range(&self) -> ReportRange {
        self.range
    }

    pub fn output(&self) -> Option<&Path> {
        self.output.as_deref()
    }
}

fn default_spend_home() -> DisplayPath {
    DisplayPath(match dirs::home_dir() {
        Some(home) => home.join("spendwise"),
        None => {
            error!(
                "There was an error when trying to get your home directory. You can get around \
                this by providing --home or SPEND_HOME instead of relying on the default \
                spendwise home directory. If you continue using the program right now, you may \
                have problems!",
            );
            PathBuf::from("spendwise")
        }
    })
}

#[derive(Debug, Default, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct DisplayPath(PathBuf);

impl From<PathBuf> for DisplayPath {
    fn from(value: PathBuf) -> Self {
        DisplayPath(value)
    }
}

impl Deref for DisplayPath {
    type Target = Path;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl AsRef<Path> for DisplayPath {
    fn as_ref(&self) -> &Path {
        &self.0
    }
}

impl Display for DisplayPath {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.to_string_lossy())
    }
}

impl FromStr for DisplayPath {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(PathBuf::from(s)))
    }
}

impl DisplayPath {
    pub fn new(path: PathBuf) -> Self {
        Self(path)
    }

    pub fn path(&self) -> &Path {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Args {
        let mut full = vec!["spend", "--home", "/tmp/spend-test"];
        full.extend_from_slice(args);
        Args::try_parse_from(full).unwrap()
    }

    #[test]
    fn test_parse_challenges_start() {
        let args = parse(&["challenges", "start", "no-shopping-14"]);
        assert_eq!(args.common().home().path(), Path::new("/tmp/spend-test"));
        match args.command() {
            Command::Challenges(c) => match c.action() {
                ChallengesSubcommand::Start(id) => assert_eq!(id.id(), "no-shopping-14"),
                other => panic!("unexpected {other:?}"),
            },
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_parse_expenses_add() {
        let args = parse(&[
            "expenses",
            "add",
            "--title",
            "Lunch",
            "--amount",
            "₹1,250.50",
            "--category",
            "Food",
            "--date",
            "2025-03-01",
        ]);
        let Command::Expenses(e) = args.command() else {
            panic!("expected expenses");
        };
        let ExpensesSubcommand::Add(add) = e.action() else {
            panic!("expected add");
        };
        assert_eq!(add.amount().to_string(), "1250.50");
        assert_eq!(add.date(), Some(NaiveDate::from_str("2025-03-01").unwrap()));
        assert_eq!(add.description(), None);
    }

    #[test]
    fn test_parse_expenses_update() {
        let args = parse(&["expenses", "update", "12", "--category", "Bills"]);
        let Command::Expenses(e) = args.command() else {
            panic!("expected expenses");
        };
        let ExpensesSubcommand::Update(update) = e.action() else {
            panic!("expected update");
        };
        assert_eq!(update.id(), 12);
        let updates = update.updates();
        assert_eq!(updates.category.as_deref(), Some("Bills"));
        assert!(updates.title.is_none());
    }

    #[test]
    fn test_parse_report_defaults() {
        let args = parse(&["report"]);
        let Command::Report(report) = args.command() else {
            panic!("expected report");
        };
        assert_eq!(report.format(), ReportFormat::Summary);
        assert_eq!(report.range(), ReportRange::All);
        assert!(report.output().is_none());

        let args = parse(&["report", "--format", "csv", "--range", "week"]);
        let Command::Report(report) = args.command() else {
            panic!("expected report");
        };
        assert_eq!(report.format(), ReportFormat::Csv);
        assert_eq!(report.range(), ReportRange::Week);
    }

    #[test]
    fn test_parse_status() {
        let args = parse(&["status"]);
        assert!(matches!(args.command(), Command::Status));
    }

    #[test]
    fn test_bad_amount_is_rejected() {
        let result = Args::try_parse_from([
            "spend",
            "favorites",
            "add",
            "--title",
            "x",
            "--amount",
            "lots",
            "--category",
            "Food",
        ]);
        assert!(result.is_err());
    }
}
