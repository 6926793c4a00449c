use std::{
    error::Error,
    io::{self},
    path::Path,
    process::exit,
};

use clap::Parser;
use rusqlite::Connection;

use expense_tracker::{
    Email, PasswordHash, User, ValidatedPassword, get_user_by_email, update_password,
};

/// A utility for changing the password for a registered user.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// File path to the application SQLite database.
    #[arg(long)]
    db_path: String,

    /// The email address of the user whose password should be changed.
    #[arg(long)]
    email: String,
}

/// Set a new password for a registered user.
fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();
    let db_path = Path::new(&args.db_path);
    validate_db_path(db_path);

    let email = match Email::new(&args.email) {
        Ok(email) => email,
        Err(error) => {
            print_error(error);
            exit(1);
        }
    };

    println!("Loading user from {db_path:#?}");
    let conn = Connection::open(db_path)?;
    let user = match get_user_by_email(&email, &conn) {
        Ok(user) => user,
        Err(error) => {
            print_error(format!("Could not find a user with the email {email}: {error}"));
            exit(1);
        }
    };
    println!("Resetting password for {}", user.email);

    let password_hash = match get_new_password_hash(&user) {
        Some(password_hash) => password_hash,
        None => return Ok(()),
    };
    update_password(user.id, &password_hash, &conn)?;

    println!("Password updated successfully!");

    Ok(())
}

fn validate_db_path(db_path: &Path) {
    match db_path.extension() {
        None => {
            print_error("Database path must include a file extension (e.g., 'my_database.db').");
            exit(1);
        }
        Some(extension) if extension.is_empty() => {
            print_error("Database path must include a file extension (e.g., 'my_database.db').");
            exit(1);
        }
        _ => {}
    }

    if !db_path.is_file() {
        eprintln!("File does not exist at {db_path:#?}!");
        exit(1);
    }
}

fn get_new_password_hash(user: &User) -> Option<PasswordHash> {
    let user_inputs = [user.email.as_str(), user.full_name.as_str()];

    loop {
        println!();

        let first_password = match rpassword::prompt_password("Enter a new password: ") {
            Ok(string) => string,
            Err(error) if error.kind() == io::ErrorKind::UnexpectedEof => {
                return None;
            }
            Err(error) => {
                print_error(format!("Could not read password from stdin: {error}"));
                return None;
            }
        };

        if let Err(error) = ValidatedPassword::new(&first_password, &user_inputs) {
            print_error(error);
            continue;
        }

        let second_password = match rpassword::prompt_password("Enter the same password again: ") {
            Ok(string) => string,
            Err(error) if error.kind() == io::ErrorKind::UnexpectedEof => {
                return None;
            }
            Err(error) => {
                print_error(format!("Could not read password from stdin: {error}"));
                return None;
            }
        };

        if first_password != second_password {
            print_error("Passwords must match, try again.");
            continue;
        }

        let password_hash = match PasswordHash::from_raw_password(
            &first_password,
            PasswordHash::DEFAULT_COST,
        ) {
            Ok(password_hash) => password_hash,
            Err(error) => {
                print_error(format!("Could not hash password: {error}. Try again."));
                continue;
            }
        };

        return Some(password_hash);
    }
}

fn print_error(error: impl ToString) {
    eprintln!(
        "\x1b[31;1m{}\x1b[0m",
        capitalise_first_char(&error.to_string())
    )
}

/// From https://crates.io/crates/capitalize
fn capitalise_first_char(string: &str) -> String {
    let mut chars = string.chars();
    let Some(first) = chars.next() else {
        return String::with_capacity(0);
    };
    first.to_uppercase().chain(chars).collect()
}
