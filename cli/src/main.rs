mod config;
mod history;
mod logging;
mod tui;

use std::io::{self, BufRead, Write};

use anyhow::{anyhow, Result};
use chrono::Local;
use clap::Parser;
use tracing::info;
use workoutlog_core::{
    draft_from_input, parse_args, parse_log_date, patch_from_input, AuthError, AuthService, DayKey,
    FileIdentityProvider, FileLogStore, FileProfileStore, LogBook, LogId, ProfilePatch,
    SignInForm, SignUpForm,
};

use crate::config::Config;

#[derive(Parser)]
#[command(name = "workoutlog")]
#[command(about = "Log workouts on a calendar", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(clap::Subcommand)]
enum Commands {
    /// Create an account and sign in
    Signup {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        /// Read from stdin when omitted
        #[arg(long)]
        password: Option<String>,
    },
    /// Sign in to an existing account
    Login {
        #[arg(long)]
        email: String,
        /// Read from stdin when omitted
        #[arg(long)]
        password: Option<String>,
    },
    /// Sign out
    Logout,
    /// Show the signed-in account
    Whoami,
    /// Show or edit your profile
    Profile {
        #[command(subcommand)]
        action: Option<ProfileAction>,
    },
    /// Log a workout (usage: add Morning run dur:30 cal:250 date:2024-05-01 18:30 notes:felt good)
    Add {
        /// Workout name followed by key:value fields
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        args: Vec<String>,
    },
    /// List the workouts of one day (default: today)
    List {
        /// YYYY-MM-DD, today, yest, -3d, -1w
        #[arg(long)]
        day: Option<String>,
    },
    /// Change a logged workout (usage: edit <id> [new name] dur:45 notes:…)
    Edit {
        /// Full id or a unique prefix
        id: String,
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        args: Vec<String>,
    },
    /// Delete a logged workout
    Delete {
        /// Full id or a unique prefix
        id: String,
    },
    /// Weekly history of all logged workouts
    History,
    /// Open the calendar view
    Tui,
}

#[derive(clap::Subcommand)]
enum ProfileAction {
    /// Show your profile
    Show,
    /// Change name or bio
    Edit {
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        bio: Option<String>,
    },
}

type Auth = AuthService<FileIdentityProvider, FileProfileStore>;

fn auth_service(config: &Config) -> Result<Auth> {
    let dir = Some(config.data_dir.clone());
    Ok(AuthService::new(
        FileIdentityProvider::new(dir.clone())?,
        FileProfileStore::new(dir)?,
    ))
}

/// Opens and loads the log book of the signed-in user.
pub(crate) fn open_log_book(config: &Config) -> Result<LogBook<FileLogStore>> {
    let user = match auth_service(config)?.require_user() {
        Ok(user) => user,
        Err(AuthError::NotSignedIn) => {
            return Err(anyhow!("Not signed in. Run `workoutlog login` first."))
        }
        Err(e) => return Err(e.into()),
    };
    let store = FileLogStore::new(Some(config.data_dir.clone()))?;
    let mut book = LogBook::new(store, user);
    let count = book.load().map_err(|e| anyhow!(e.user_message()))?;
    info!(user = %book.user(), count, "opened log book");
    Ok(book)
}

pub(crate) fn short_id(id: &LogId) -> &str {
    let s = id.as_str();
    s.get(..8).unwrap_or(s)
}

/// Resolves a full id or unique id prefix against the loaded logs.
fn resolve_id(book: &LogBook<FileLogStore>, prefix: &str) -> Result<(LogId, DayKey)> {
    let index = book.index().ok_or_else(|| anyhow!("Logs are not loaded"))?;
    let matches: Vec<_> = index
        .iter()
        .flat_map(|(_, bucket)| bucket.iter())
        .filter(|log| log.id.as_str().starts_with(prefix))
        .collect();
    match matches.as_slice() {
        [log] => Ok((log.id.clone(), log.day())),
        [] => Err(anyhow!("No workout with id '{}'", prefix)),
        _ => Err(anyhow!("Id '{}' matches {} workouts", prefix, matches.len())),
    }
}

fn read_secret(prompt: &str) -> Result<String> {
    eprint!("{}", prompt);
    io::stderr().flush()?;
    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}

fn print_day(book: &LogBook<FileLogStore>, day: DayKey) {
    let logs = book.lookup(day);
    println!("{} ({})", day, day.date().format("%a"));
    if logs.is_empty() {
        println!("No workouts logged.");
        return;
    }
    println!("{:<10} {:<24} {:>6} {:>6}  {}", "ID", "Workout", "Min", "kcal", "Notes");
    println!("{:-<10} {:-<24} {:->6} {:->6}  {:-<20}", "", "", "", "", "");
    for log in logs {
        println!(
            "{:<10} {:<24} {:>6} {:>6}  {}",
            short_id(&log.id),
            log.name,
            log.duration,
            log.calories,
            log.notes
        );
    }
    if let Some(index) = book.index() {
        let totals = index.day_totals(day);
        println!("Total: {} min, {} kcal", totals.minutes, totals.calories);
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = Config::from_env()?;
    logging::init(&config)?;
    info!(data_dir = %config.data_dir.display(), "starting");

    match cli.command {
        Some(Commands::Signup {
            name,
            email,
            password,
        }) => {
            let (password, confirm_password) = match password {
                Some(p) => (p.clone(), p),
                None => (read_secret("Password: ")?, read_secret("Confirm password: ")?),
            };
            let profile = auth_service(&config)?.sign_up(&SignUpForm {
                name,
                email,
                password,
                confirm_password,
            })?;
            println!("Welcome, {}! You are signed in as {}.", profile.name, profile.email);
        }
        Some(Commands::Login { email, password }) => {
            let password = match password {
                Some(p) => p,
                None => read_secret("Password: ")?,
            };
            let auth = auth_service(&config)?;
            auth.sign_in(&SignInForm { email, password })?;
            let profile = auth.profile()?;
            println!("Signed in as {} ({}).", profile.name, profile.email);
        }
        Some(Commands::Logout) => {
            auth_service(&config)?.sign_out()?;
            println!("Signed out.");
        }
        Some(Commands::Whoami) => match auth_service(&config)?.profile() {
            Ok(profile) => println!("{} <{}>", profile.name, profile.email),
            Err(AuthError::NotSignedIn) => println!("Not signed in."),
            Err(e) => return Err(e.into()),
        },
        Some(Commands::Profile { action }) => {
            let auth = auth_service(&config)?;
            let profile = match action {
                None | Some(ProfileAction::Show) => auth.profile()?,
                Some(ProfileAction::Edit { name, bio }) => {
                    auth.update_profile(&ProfilePatch { name, bio })?
                }
            };
            println!("Name:    {}", profile.name);
            println!("Email:   {}", profile.email);
            println!("Bio:     {}", if profile.bio.is_empty() { "-" } else { profile.bio.as_str() });
            println!("Joined:  {}", profile.created_at.with_timezone(&Local).format("%Y-%m-%d"));
        }
        Some(Commands::Add { args }) => {
            let draft = draft_from_input(parse_args(&args), Local::now().naive_local())?;
            let mut book = open_log_book(&config)?;
            let created = book.add(draft).map_err(|e| anyhow!(e.user_message()))?;
            println!("Workout logged: {} (ID: {})", created.name, created.id);
            println!("  Date: {}", created.date.format("%Y-%m-%d %H:%M"));
            println!("  {} min, {} kcal", created.duration, created.calories);
        }
        Some(Commands::List { day }) => {
            let day = match day {
                Some(d) => DayKey::of(&parse_log_date(&d)?),
                None => DayKey::today(),
            };
            let book = open_log_book(&config)?;
            print_day(&book, day);
        }
        Some(Commands::Edit { id, args }) => {
            let patch = patch_from_input(parse_args(&args))?;
            if patch.is_empty() {
                return Err(anyhow!("Nothing to change"));
            }
            let mut book = open_log_book(&config)?;
            let (id, _) = resolve_id(&book, &id)?;
            let updated = book
                .update(&id, patch)
                .map_err(|e| anyhow!(e.user_message()))?;
            println!(
                "Updated {}: {} min, {} kcal",
                updated.name, updated.duration, updated.calories
            );
        }
        Some(Commands::Delete { id }) => {
            let mut book = open_log_book(&config)?;
            let (id, day) = resolve_id(&book, &id)?;
            match book.delete(&id, day).map_err(|e| anyhow!(e.user_message()))? {
                Some(removed) => println!("Deleted {} from {}.", removed.name, day),
                None => println!("Nothing to delete."),
            }
        }
        Some(Commands::History) => {
            let book = open_log_book(&config)?;
            if let Some(index) = book.index() {
                history::show_history(index);
            }
        }
        Some(Commands::Tui) | None => {
            let book = open_log_book(&config)?;
            tui::run(book)?;
        }
    }
    Ok(())
}
