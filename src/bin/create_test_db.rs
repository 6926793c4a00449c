use std::error::Error;
use std::path::Path;
use std::process::exit;

use clap::Parser;
use rusqlite::Connection;
use time::{Duration, OffsetDateTime};

use expense_tracker::{
    Budget, Card, CardType, Email, Goal, PasswordHash, RecurrenceFrequency, SavingsFrequency,
    Transaction, TransactionType, ValidatedPassword, create_budget, create_card, create_goal,
    create_transaction, create_user, initialize_db,
};

/// A utility for creating a test database for the expense tracker.
///
/// The database has one user, "test@example.com" with the password "test",
/// and a month of sample data.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// File path to save the SQLite database to.
    #[arg(long, short)]
    output_path: String,
}

/// Create and populate a database for manual testing.
fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();

    let output_path = Path::new(&args.output_path);

    match output_path.extension() {
        None => {
            eprintln!("Output path must include a file extension (e.g., 'my_database.db').");
            exit(1);
        }
        Some(extension) if extension.is_empty() => {
            eprintln!("Output path must include a file extension (e.g., 'my_database.db').");
            exit(1);
        }
        _ => {}
    }

    if output_path.is_file() {
        eprintln!("File already exists at {output_path:#?}!");
        exit(1);
    }

    println!("Creating database at {output_path:#?}");
    let conn = Connection::open(output_path)?;

    initialize_db(&conn)?;

    println!("Creating test user...");

    let password_hash = PasswordHash::new(
        ValidatedPassword::new_unchecked("test"),
        PasswordHash::DEFAULT_COST,
    )?;
    let user = create_user(
        &Email::new("test@example.com")?,
        "Test User",
        password_hash,
        &conn,
    )?;

    println!("Creating sample data...");

    let today = OffsetDateTime::now_utc().date();
    let days_ago = |days: i64| today - Duration::days(days);

    let card = create_card(
        user.id,
        Card::build("Everyday", "4111111111111234", CardType::Visa)
            .balance(320.0)
            .spending_limit(2000.0)
            .due_date(Some(today + Duration::days(10))),
        &conn,
    )?;

    create_transaction(
        user.id,
        Transaction::build(TransactionType::Income, 3200.0, days_ago(14), "Salary")
            .description("Pay day")
            .payment_method("Bank Transfer")
            .recurring(Some(RecurrenceFrequency::Monthly)),
        &conn,
    )?;

    let expenses = [
        (85.40, 1, "Groceries", "Weekly shop"),
        (12.50, 2, "Food", "Lunch"),
        (60.00, 4, "Transport", "Fuel"),
        (24.99, 6, "Entertainment", "Movie night"),
        (140.00, 9, "Utilities", "Power bill"),
        (9.80, 12, "Food", "Coffee and muffin"),
    ];

    for (index, (amount, age, category, description)) in expenses.into_iter().enumerate() {
        let builder =
            Transaction::build(TransactionType::Expense, amount, days_ago(age), category)
                .description(description);
        let builder = if index % 2 == 0 {
            builder.payment_method("Credit Card").card_id(Some(card.id))
        } else {
            builder.payment_method("Cash")
        };

        create_transaction(user.id, builder, &conn)?;
    }

    create_budget(
        user.id,
        Budget::build("Food", 400.0, days_ago(14), today + Duration::days(16)),
        &conn,
    )?;
    create_budget(
        user.id,
        Budget::build("Transport", 150.0, days_ago(14), today + Duration::days(16)),
        &conn,
    )?;

    create_goal(
        user.id,
        Goal::build("Holiday", 2500.0)
            .start_amount(300.0)
            .target_date(Some(today + Duration::days(120)))
            .frequency(Some(SavingsFrequency::Weekly)),
        &conn,
    )?;
    create_goal(user.id, Goal::build("Emergency fund", 5000.0), &conn)?;

    println!("Success!");

    Ok(())
}
