use anyhow::Context;
use chrono::NaiveTime;
use clap::{ArgAction, Parser, Subcommand};
use inquire::{CustomType, InquireError, Password, PasswordDisplayMode, Select, Text};
use std::fmt;

use weatherlens_core::{Advisor, Config, EventKind, EventQuery, Session, Units};

use crate::render;

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "weatherlens", version, about = "Weather comfort and outing advisor")]
pub struct Cli {
    /// Increase log verbosity (-v, -vv). RUST_LOG takes precedence.
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Store the OpenWeather API key and display preferences.
    Configure,

    /// Show the forecast summary for a location.
    Show {
        /// City name or "lat,lon".
        location: String,

        /// Also print the per-slot forecast table.
        #[arg(long)]
        details: bool,
    },

    /// Decide whether an event today should go ahead.
    Check {
        /// City name or "lat,lon".
        location: String,

        /// Event start time today, e.g. "18:30" or "06:30 PM".
        #[arg(long, value_parser = parse_time)]
        at: NaiveTime,

        /// Event type: outdoor or indoor.
        #[arg(long, default_value_t = EventKind::Outdoor)]
        kind: EventKind,

        /// Also print the per-slot forecast table.
        #[arg(long)]
        details: bool,
    },

    /// Fetch a location, then run several checks against it.
    Interactive,
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        match self.command {
            Command::Configure => configure(),
            Command::Show { location, details } => {
                let session = fetch(&advisor()?, &location).await?;
                print_session(&session, details);
                Ok(())
            }
            Command::Check {
                location,
                at,
                kind,
                details,
            } => {
                let session = fetch(&advisor()?, &location).await?;
                print_session(&session, details);

                let decision = session.check_now(&EventQuery::new(at, kind));
                println!();
                print!("{}", render::decision(&decision, &session));
                Ok(())
            }
            Command::Interactive => interactive(advisor()?).await,
        }
    }
}

/// Accepts 24-hour "HH:MM" or 12-hour "HH:MM AM".
pub fn parse_time(s: &str) -> Result<NaiveTime, String> {
    let s = s.trim();
    ["%H:%M", "%I:%M %p", "%I:%M%p", "%H:%M:%S"]
        .iter()
        .find_map(|fmt| NaiveTime::parse_from_str(&s.to_uppercase(), fmt).ok())
        .ok_or_else(|| format!("'{s}' is not a time of day (expected HH:MM or HH:MM AM/PM)"))
}

fn advisor() -> anyhow::Result<Advisor> {
    let config = Config::load()?;
    tracing::debug!(
        units = %config.units,
        offset = config.utc_offset_minutes,
        "Loaded configuration"
    );
    Ok(Advisor::from_config(&config)?)
}

async fn fetch(advisor: &Advisor, location: &str) -> anyhow::Result<Session> {
    advisor
        .fetch(location)
        .await
        .with_context(|| format!("Could not fetch weather for '{location}'"))
}

fn print_session(session: &Session, details: bool) {
    print!("{}", render::snapshot(session));
    if details {
        println!();
        print!("{}", render::details(session));
    }
}

fn configure() -> anyhow::Result<()> {
    // Read the file alone so an environment key never ends up saved.
    let path = Config::config_file_path()?;
    let mut config = Config::load_from(&path)?;

    let api_key = Password::new("OpenWeather API key:")
        .with_display_mode(PasswordDisplayMode::Masked)
        .without_confirmation()
        .with_help_message("Leave empty to keep the current key")
        .prompt()?;
    if !api_key.trim().is_empty() {
        config.api_key = Some(api_key.trim().to_string());
    }

    let cursor = Units::all().iter().position(|u| *u == config.units).unwrap_or(0);
    config.units = Select::new("Units:", Units::all().to_vec())
        .with_starting_cursor(cursor)
        .prompt()?;

    config.utc_offset_minutes = CustomType::<i32>::new("Display offset (minutes east of UTC):")
        .with_default(config.utc_offset_minutes)
        .with_error_message("Please enter a whole number of minutes, e.g. 330 or -300")
        .prompt()?;

    config.validate()?;
    config.save_to(&path)?;
    println!("Saved configuration to {}", path.display());
    Ok(())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Action {
    Fetch,
    Check,
    Details,
    Quit,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Action::Fetch => "Fetch weather for a location",
            Action::Check => "Check an event",
            Action::Details => "View forecast details",
            Action::Quit => "Quit",
        })
    }
}

/// `Ok(None)` when the user cancels the prompt.
fn prompt<T>(result: Result<T, InquireError>) -> anyhow::Result<Option<T>> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(InquireError::OperationCanceled | InquireError::OperationInterrupted) => Ok(None),
        Err(err) => Err(err.into()),
    }
}

async fn interactive(advisor: Advisor) -> anyhow::Result<()> {
    let mut session: Option<Session> = None;

    loop {
        let actions = if session.is_some() {
            vec![Action::Fetch, Action::Check, Action::Details, Action::Quit]
        } else {
            vec![Action::Fetch, Action::Quit]
        };

        let Some(action) = prompt(Select::new("What next?", actions).prompt())? else {
            break;
        };

        match action {
            Action::Quit => break,
            Action::Fetch => {
                let Some(location) = prompt(
                    Text::new("Location:")
                        .with_default("New Delhi")
                        .with_help_message("City name or lat,lon")
                        .prompt(),
                )?
                else {
                    continue;
                };

                match fetch(&advisor, &location).await {
                    Ok(fresh) => {
                        println!();
                        print!("{}", render::snapshot(&fresh));
                        println!();
                        session = Some(fresh);
                    }
                    Err(err) => eprintln!("Error: {err:#}"),
                }
            }
            Action::Check => {
                let Some(current) = session.as_ref() else {
                    eprintln!("Fetch a location first.");
                    continue;
                };
                let Some(at) = prompt(
                    CustomType::<NaiveTime>::new("Event start time:")
                        .with_parser(&|s| parse_time(s).map_err(|_| ()))
                        .with_formatter(&|t| t.format("%H:%M").to_string())
                        .with_error_message("Expected HH:MM or HH:MM AM/PM")
                        .prompt(),
                )?
                else {
                    continue;
                };
                let kinds = vec![EventKind::Outdoor, EventKind::Indoor];
                let Some(kind) = prompt(Select::new("Event type:", kinds).prompt())?
                else {
                    continue;
                };

                let decision = current.check_now(&EventQuery::new(at, kind));
                println!();
                print!("{}", render::decision(&decision, current));
                println!();
            }
            Action::Details => match session.as_ref() {
                Some(current) => {
                    print!("{}", render::details(current));
                    println!();
                }
                None => eprintln!("Fetch a location first."),
            },
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_24_and_12_hour_times() {
        assert_eq!(parse_time("18:30"), Ok(NaiveTime::from_hms_opt(18, 30, 0).unwrap()));
        assert_eq!(parse_time("06:30 PM"), Ok(NaiveTime::from_hms_opt(18, 30, 0).unwrap()));
        assert_eq!(parse_time("7:05am"), Ok(NaiveTime::from_hms_opt(7, 5, 0).unwrap()));
        assert!(parse_time("noon").is_err());
        assert!(parse_time("25:00").is_err());
    }

    #[test]
    fn check_command_parses_flags() {
        let cli = Cli::parse_from([
            "weatherlens", "check", "New Delhi", "--at", "17:00", "--kind", "indoor",
        ]);
        match cli.command {
            Command::Check { location, at, kind, details } => {
                assert_eq!(location, "New Delhi");
                assert_eq!(at, NaiveTime::from_hms_opt(17, 0, 0).unwrap());
                assert_eq!(kind, EventKind::Indoor);
                assert!(!details);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn kind_defaults_to_outdoor() {
        let cli = Cli::parse_from(["weatherlens", "-v", "check", "28.6,77.2", "--at", "09:00"]);
        assert_eq!(cli.verbose, 1);
        assert!(matches!(cli.command, Command::Check { kind: EventKind::Outdoor, .. }));
    }

    #[test]
    fn cli_definition_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
