//! Command-line interface parsing for the provider console
//!
//! This module defines the clap command tree and turns parsed arguments into
//! connection settings and typed filters.

use clap::{Args, Parser, Subcommand};
use thiserror::Error;

use crate::config::{Config, API_URL_ENV};
use crate::data::users::UserStatus;
use crate::data::{FetchMode, RecordStatus};

/// Environment variable supplying a bearer token
pub const TOKEN_ENV: &str = "PROVIDER_TOKEN";

/// Error types for CLI argument handling
#[derive(Debug, Error)]
pub enum CliError {
    /// The specified status is not recognized
    #[error("Invalid status: '{0}'. Valid statuses: active, inactive")]
    InvalidStatus(String),

    /// The specified user status is not recognized
    #[error("Invalid user status: '{0}'. Valid statuses: active, inactive, pending_password_set")]
    InvalidUserStatus(String),

    /// A command needs a token but none was given or saved
    #[error("Not logged in. Run `provider-console login` or pass --token")]
    NotLoggedIn,
}

/// Provider console - manage doctors, staff, departments, payers, specialties and tariffs
#[derive(Parser, Debug)]
#[command(name = "provider-console")]
#[command(about = "Hospital provider administration from the command line")]
#[command(version)]
pub struct Cli {
    /// Base URL of the provider API
    #[arg(long, global = true, env = API_URL_ENV, value_name = "URL")]
    pub api_url: Option<String>,

    /// Bearer token to use instead of the saved session
    #[arg(long, global = true, env = TOKEN_ENV, value_name = "TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// Skip cached responses and fetch fresh data
    #[arg(long, global = true)]
    pub refresh: bool,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Command {
    /// Sign in and save the session
    Login {
        /// Account email
        #[arg(long)]
        email: String,
        /// Account password
        #[arg(long, env = "PROVIDER_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Remove the saved session
    Logout,
    /// Check the current token with the server
    Whoami,
    /// Show the signed-in user's profile
    Profile,
    /// List doctors
    Doctors(DoctorArgs),
    /// List non-doctor staff
    Staff {
        /// Only staff in this department
        #[arg(long)]
        department: Option<String>,
        /// Only staff with this status (active, inactive)
        #[arg(long)]
        status: Option<String>,
    },
    /// List departments
    Departments(PageArgs),
    /// List hospital user accounts
    Users {
        /// Only users with this status (active, inactive, pending_password_set)
        #[arg(long)]
        status: Option<String>,
        /// Only users with this role
        #[arg(long)]
        role: Option<String>,
    },
    /// Specialty catalogue and affiliations
    #[command(subcommand)]
    Specialties(SpecialtyCommand),
    /// Payer directory and affiliations
    #[command(subcommand)]
    Payers(PayerCommand),
    /// Tariffs and tariff reference lists
    #[command(subcommand)]
    Tariffs(TariffCommand),
    /// TDS mappings and deduction calculation
    #[command(subcommand)]
    Tds(TdsCommand),
    /// Hospital dashboard summary
    Summary,
    /// Load all reference lists at once
    Reference,
}

#[derive(Args, Debug, Clone, Default, PartialEq, Eq)]
pub struct DoctorArgs {
    /// Only doctors with this specialty
    #[arg(long)]
    pub specialty: Option<String>,
    /// Only doctors in this department
    #[arg(long)]
    pub department: Option<String>,
    /// Only doctors with this status (active, inactive)
    #[arg(long)]
    pub status: Option<String>,
}

#[derive(Args, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PageArgs {
    /// Page number
    #[arg(long)]
    pub page: Option<u32>,
    /// Items per page
    #[arg(long)]
    pub limit: Option<u32>,
    /// Include inactive records
    #[arg(long)]
    pub include_inactive: bool,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum SpecialtyCommand {
    /// Specialties the hospital can affiliate with
    Available,
    /// Names of affiliated specialties
    Affiliated,
    /// The full affiliation record
    Affiliation,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum PayerCommand {
    /// Payers the hospital can affiliate with
    Available,
    /// Existing payer affiliations
    Affiliations {
        /// Only affiliations with this status (active, inactive)
        #[arg(long)]
        status: Option<String>,
        /// Only affiliations with this payer type
        #[arg(long)]
        payer_type: Option<String>,
    },
    /// Payer directory filtered by type
    ByType {
        /// Payer type, e.g. TPA
        payer_type: Option<String>,
    },
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum TariffCommand {
    /// List tariffs
    List(PageArgs),
    /// Show one tariff
    Show {
        tariff_id: String,
    },
    /// Aggregate tariff counts
    Stats,
    /// Payer types used in tariff mapping
    PayerTypes,
    /// Payers that can be mapped onto a tariff
    Payers,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum TdsCommand {
    /// List TDS mappings
    List {
        /// Only mappings for this payer
        #[arg(long)]
        payer: Option<String>,
        /// Only mappings with this status (active, inactive)
        #[arg(long)]
        status: Option<String>,
        /// Page number
        #[arg(long)]
        page: Option<u32>,
        /// Mappings per page
        #[arg(long)]
        per_page: Option<u32>,
    },
    /// Work out the deduction on an amount
    Calculate {
        /// Provider name
        #[arg(long)]
        provider: String,
        /// Payer name
        #[arg(long)]
        payer: String,
        /// Gross amount
        #[arg(long)]
        amount: f64,
        /// Date the mapping must be effective on (YYYY-MM-DD)
        #[arg(long)]
        date: Option<String>,
    },
    /// Payer names available for mapping
    Payers,
    /// Provider names available for mapping
    Providers,
}

/// Parses a status argument into a `RecordStatus`.
///
/// # Arguments
/// * `s` - The status string from the command line
///
/// # Returns
/// * `Ok(RecordStatus)` for `active` or `inactive`, in any case
/// * `Err(CliError::InvalidStatus)` otherwise
pub fn parse_status_arg(s: &str) -> Result<RecordStatus, CliError> {
    RecordStatus::from_str(s).ok_or_else(|| CliError::InvalidStatus(s.to_string()))
}

/// Parses an optional status argument
pub fn parse_optional_status(s: Option<&str>) -> Result<Option<RecordStatus>, CliError> {
    s.map(parse_status_arg).transpose()
}

/// Parses an optional hospital user status argument
pub fn parse_user_status(s: Option<&str>) -> Result<Option<UserStatus>, CliError> {
    s.map(|s| UserStatus::from_str(s).ok_or_else(|| CliError::InvalidUserStatus(s.to_string())))
        .transpose()
}

/// Connection settings derived from CLI arguments
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    /// API connection settings
    pub config: Config,
    /// Token given on the command line or in the environment
    pub token: Option<String>,
    /// Whether cacheable reads may use the cache
    pub mode: FetchMode,
}

impl Settings {
    /// Creates Settings from parsed CLI arguments.
    ///
    /// An `--api-url` (or `PROVIDER_API_URL`) replaces the default base URL;
    /// blank values are ignored.
    pub fn from_cli(cli: &Cli) -> Self {
        let config = match cli.api_url.as_deref().map(str::trim) {
            Some(url) if !url.is_empty() => Config::default().with_api_url(url),
            _ => Config::default(),
        };
        let token = cli
            .token
            .as_deref()
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .map(str::to_string);
        let mode = if cli.refresh {
            FetchMode::Refresh
        } else {
            FetchMode::Cached
        };

        Settings { config, token, mode }
    }
}

impl PageArgs {
    /// `None` when the flag is absent so the server default applies
    pub fn include_inactive(&self) -> Option<bool> {
        self.include_inactive.then_some(true)
    }
}
