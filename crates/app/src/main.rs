use std::path::PathBuf;

use clap::{Parser, Subcommand};
use engine::{Activity, ActivityBook, ActivityId, Amount, Expense, ParticipantId};

use crate::error::{AppError, Result};

mod error;
mod settings;

#[derive(Parser, Debug)]
#[command(name = "tabshare")]
#[command(about = "Settle shared expenses of the activities in a book")]
struct Cli {
    /// Optional settings file path (TOML).
    #[arg(long)]
    config: Option<PathBuf>,
    /// Override the activity book path.
    #[arg(long)]
    book: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List the activities in the book.
    List,
    /// Print who pays whom to settle an activity.
    Settle { activity: ActivityId },
    /// Record an expense paid by a participant and save the book.
    AddExpense {
        activity: ActivityId,
        payer: ParticipantId,
        /// Decimal amount, `.` or `,` as separator (e.g. `12,50`).
        amount: String,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let mut settings = settings::Settings::new(cli.config.as_deref())?;
    if let Some(book) = cli.book {
        settings.book.path = book;
    }

    tracing_subscriber::fmt()
        .with_env_filter(format!(
            "tabshare={level},engine={level}",
            level = settings.app.level
        ))
        .init();

    let mut book = load_book(&settings.book.path)?;
    match cli.command {
        Command::List => {
            for activity in book.activities() {
                println!("{}", describe(activity));
            }
        }
        Command::Settle { activity } => {
            let activity = book.activity_mut(activity)?;
            println!("{activity}");
            let transfers = activity.settlement();
            if transfers.is_empty() {
                println!("  nothing to settle");
            }
            for transfer in transfers {
                println!(
                    "  {} pays {} {:.2}",
                    transfer.from, transfer.to, transfer.amount
                );
            }
        }
        Command::AddExpense {
            activity,
            payer,
            amount,
        } => {
            record_expense(&mut book, activity, payer, &amount)?;
            save_book(&settings.book.path, &book)?;
            println!("{}", describe(book.activity(activity)?));
        }
    }

    Ok(())
}

fn record_expense(
    book: &mut ActivityBook,
    activity: ActivityId,
    payer: ParticipantId,
    raw_amount: &str,
) -> Result<()> {
    let amount: Amount = raw_amount.parse()?;
    book.activity_mut(activity)?
        .add_expense([Expense::new(payer, amount)])?;
    Ok(())
}

fn save_book(path: &str, book: &ActivityBook) -> Result<()> {
    let json = book.to_json()?;
    std::fs::write(path, json).map_err(|source| AppError::Io {
        path: path.to_string(),
        source,
    })?;
    tracing::info!(path, activities = book.activities().len(), "saved book");
    Ok(())
}

fn load_book(path: &str) -> Result<ActivityBook> {
    match std::fs::read_to_string(path) {
        Ok(json) => {
            let book = ActivityBook::from_json(&json)?;
            tracing::info!(path, activities = book.activities().len(), "loaded book");
            Ok(book)
        }
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            tracing::warn!(path, "book not found, starting empty");
            Ok(ActivityBook::new())
        }
        Err(source) => Err(AppError::Io {
            path: path.to_string(),
            source,
        }),
    }
}

fn describe(activity: &Activity) -> String {
    format!(
        "#{} {} ({} participants, {} expenses, {} deleted)",
        activity.primary_key(),
        activity.title(),
        activity.participants().len(),
        activity.expenses().len(),
        activity.expenses().len() - activity.active_expenses().count()
    )
}
