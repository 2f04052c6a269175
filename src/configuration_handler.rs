use crate::{catalog::Category, configuration::Configuration, types::parse_time};
use chrono::{NaiveDate, NaiveTime};
use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Debug, Clone, Parser)]
#[command(name = "vet-agenda", version, about = "Agenda y perfil del veterinario desde la terminal")]
pub struct ConfigurationHandler {
    /// Root of the web application.
    #[arg(long, env = "VET_AGENDA_BASE_URL", default_value = "http://localhost:8000")]
    base_url: String,
    #[arg(long, env = "VET_AGENDA_CSRF_TOKEN", default_value = "", hide_env_values = true)]
    csrf_token: String,
    #[arg(long, env = "VET_AGENDA_VET_ID")]
    vet_id: Option<i64>,
    #[arg(short, long, global = true)]
    yes: bool,
    #[command(subcommand)]
    pub command: Command,
}

impl ConfigurationHandler {
    /// Command line first, then the environment, then `.env`.
    pub fn parse_arguments() -> Self {
        dotenvy::dotenv().ok();
        Self::parse()
    }
}

impl Configuration for ConfigurationHandler {
    fn base_url(&self) -> String {
        self.base_url.clone()
    }

    fn csrf_token(&self) -> String {
        self.csrf_token.clone()
    }

    fn vet_id(&self) -> Option<i64> {
        self.vet_id
    }

    fn assume_yes(&self) -> bool {
        self.yes
    }
}

fn time_arg(raw: &str) -> Result<NaiveTime, String> {
    parse_time(raw).map_err(|err| format!("{raw}: {err}"))
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Availability slots.
    #[command(subcommand)]
    Slots(SlotsCommand),
    /// Service management.
    #[command(subcommand)]
    Services(ServicesCommand),
    /// Appointment booking on a veterinarian's agenda.
    #[command(subcommand)]
    Book(BookCommand),
    #[command(subcommand)]
    Profile(ProfileCommand),
    /// Product listing.
    Catalog {
        #[arg(long, default_value = "all")]
        filter: Category,
        #[arg(long, conflicts_with = "json")]
        html: bool,
        #[arg(long)]
        json: bool,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum CloneMode {
    #[value(name = "siguiente")]
    NextDay,
    #[value(name = "semana")]
    NextWeek,
    #[value(name = "especifico")]
    SpecificDate,
}

#[derive(Debug, Clone, Subcommand)]
pub enum SlotsCommand {
    List {
        date: NaiveDate,
    },
    Add {
        date: NaiveDate,
        #[arg(value_parser = time_arg)]
        start: NaiveTime,
        #[arg(value_parser = time_arg)]
        end: NaiveTime,
    },
    Delete {
        id: i64,
        /// Day whose list is refreshed afterwards.
        date: NaiveDate,
    },
    Clone {
        date: NaiveDate,
        #[arg(long, value_enum, default_value = "siguiente")]
        mode: CloneMode,
        #[arg(long, required_if_eq("mode", "especifico"))]
        target_date: Option<NaiveDate>,
    },
    /// Delete every slot of a day.
    Clear {
        date: NaiveDate,
    },
    /// Days that carry events in the calendar feed.
    Events,
}

#[derive(Debug, Clone, Subcommand)]
pub enum ServicesCommand {
    List,
    Show {
        id: i64,
    },
    Create {
        name: String,
        kind: String,
    },
    Edit {
        id: i64,
        name: String,
        kind: String,
    },
    Toggle {
        id: i64,
        #[arg(action = ArgAction::Set)]
        active: bool,
    },
    /// Own price for a service.
    Price {
        id: i64,
        price: f64,
        #[arg(long)]
        inactive: bool,
        #[arg(long)]
        notes: Option<String>,
    },
}

#[derive(Debug, Clone, Subcommand)]
pub enum BookCommand {
    Services,
    Windows {
        date: NaiveDate,
        #[arg(long)]
        service: Option<i64>,
    },
    Confirm {
        service: i64,
        date: NaiveDate,
        window: i64,
    },
}

#[derive(Debug, Clone, Subcommand)]
pub enum ProfileCommand {
    Update {
        /// Nine digits, without country code.
        phone: String,
        description: String,
        /// Hide the profile from searches, after confirmation.
        #[arg(long)]
        inactive: bool,
    },
    Image {
        path: PathBuf,
    },
}
