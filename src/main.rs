//! Provider Console - manage hospital provider data from the terminal
//!
//! Parses the command line, restores the saved session, runs one command
//! against the provider API and prints the response as JSON.

use std::error::Error;
use std::process::ExitCode;

use clap::Parser;
use serde::Serialize;
use tracing::{debug, warn};

use provider_console::app::Console;
use provider_console::cli::{
    parse_optional_status, parse_user_status, Cli, CliError, Command, PayerCommand, Settings,
    SpecialtyCommand, TariffCommand, TdsCommand,
};
use provider_console::data::departments::DepartmentFilters;
use provider_console::data::doctors::DoctorFilters;
use provider_console::data::payers::PayerAffiliationFilters;
use provider_console::data::staff::StaffFilters;
use provider_console::data::tariffs::TariffFilters;
use provider_console::data::tds::{TdsCalculationRequest, TdsMappingFilters};
use provider_console::data::users::HospitalUserFilters;
use provider_console::data::{ApiError, FetchMode};
use provider_console::session::{Session, SessionError, SessionStore};

/// Sets up stderr logging; `RUST_LOG` wins over the verbosity flag
fn init_tracing(verbose: u8) {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(verbose >= 2),
        )
        .init();
}

fn print_json<T: Serialize>(value: &T) -> Result<(), serde_json::Error> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Where the bearer token for this run came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TokenSource {
    Flag,
    Session,
}

async fn run(cli: Cli, store: Option<&SessionStore>) -> Result<(), Box<dyn Error>> {
    let settings = Settings::from_cli(&cli);
    let mode = settings.mode;

    match &cli.command {
        Command::Login { email, password } => {
            let store = store.ok_or(SessionError::NoDataDir)?;
            let console = Console::new(&settings.config, None)?;
            let response = console.auth.login(email, password).await?;
            store.save(&Session::new(response.access_token.clone(), response.user.clone()))?;
            print_json(&response.user)?;
            return Ok(());
        }
        Command::Logout => {
            if let Some(store) = store {
                store.clear()?;
            }
            println!("Logged out");
            return Ok(());
        }
        _ => {}
    }

    let session_token = store.and_then(SessionStore::load).map(|session| session.token);
    let (token, source) = match (settings.token.clone(), session_token) {
        (Some(token), _) => (token, TokenSource::Flag),
        (None, Some(token)) => (token, TokenSource::Session),
        (None, None) => return Err(CliError::NotLoggedIn.into()),
    };
    debug!(?source, "using bearer token");

    let console = Console::new(&settings.config, Some(token))?;
    let result = dispatch(&console, cli.command, mode).await;

    if let Err(err) = &result {
        let unauthorized = err
            .downcast_ref::<ApiError>()
            .is_some_and(ApiError::is_unauthorized);
        if unauthorized && source == TokenSource::Session {
            warn!("saved session was rejected; clearing it");
            if let Some(store) = store {
                store.clear()?;
            }
        }
    }

    result
}

async fn dispatch(
    console: &Console,
    command: Command,
    mode: FetchMode,
) -> Result<(), Box<dyn Error>> {
    match command {
        Command::Login { .. } | Command::Logout => {}
        Command::Whoami => print_json(&console.auth.validate_token().await?)?,
        Command::Profile => print_json(&console.auth.profile().await?)?,
        Command::Doctors(args) => {
            let filters = DoctorFilters {
                specialty_name: args.specialty,
                department_name: args.department,
                status: parse_optional_status(args.status.as_deref())?,
            };
            print_json(&console.doctors.list(&filters).await?)?;
        }
        Command::Staff { department, status } => {
            let filters = StaffFilters {
                department_name: department,
                status: parse_optional_status(status.as_deref())?,
            };
            print_json(&console.staff.list(&filters).await?)?;
        }
        Command::Users { status, role } => {
            let filters = HospitalUserFilters {
                status: parse_user_status(status.as_deref())?,
                role,
            };
            print_json(&console.users.list(&filters).await?)?;
        }
        Command::Departments(page) => {
            let filters = DepartmentFilters {
                page: page.page,
                limit: page.limit,
                include_inactive: page.include_inactive(),
            };
            print_json(&console.departments.list(filters, mode).await?)?;
        }
        Command::Specialties(SpecialtyCommand::Available) => {
            print_json(&console.specialties.available_specialties(mode).await?)?
        }
        Command::Specialties(SpecialtyCommand::Affiliated) => {
            print_json(&console.specialties.affiliated_names(mode).await?)?
        }
        Command::Specialties(SpecialtyCommand::Affiliation) => {
            print_json(&console.specialties.affiliation(mode).await?)?
        }
        Command::Payers(PayerCommand::Available) => {
            print_json(&console.payers.available_payers(mode).await?)?
        }
        Command::Payers(PayerCommand::Affiliations { status, payer_type }) => {
            let filters = PayerAffiliationFilters {
                status: parse_optional_status(status.as_deref())?,
                payer_type,
            };
            print_json(&console.payers.list(&filters).await?)?;
        }
        Command::Payers(PayerCommand::ByType { payer_type }) => {
            print_json(&console.payers.payers_by_type(payer_type.as_deref(), mode).await?)?
        }
        Command::Tariffs(TariffCommand::List(page)) => {
            let filters = TariffFilters {
                page: page.page,
                limit: page.limit,
                include_inactive: page.include_inactive(),
            };
            print_json(&console.tariffs.list(filters, mode).await?)?;
        }
        Command::Tariffs(TariffCommand::Show { tariff_id }) => {
            print_json(&console.tariffs.get(&tariff_id).await?)?
        }
        Command::Tariffs(TariffCommand::Stats) => {
            print_json(&console.tariffs.statistics(mode).await?)?
        }
        Command::Tariffs(TariffCommand::PayerTypes) => {
            print_json(&console.tariffs.payer_types(mode).await?)?
        }
        Command::Tariffs(TariffCommand::Payers) => {
            print_json(&console.tariffs.available_payers(mode).await?)?
        }
        Command::Tds(TdsCommand::List {
            payer,
            status,
            page,
            per_page,
        }) => {
            let filters = TdsMappingFilters {
                payer_name: payer,
                status: parse_optional_status(status.as_deref())?,
                page,
                per_page,
            };
            print_json(&console.tds.list(&filters).await?)?;
        }
        Command::Tds(TdsCommand::Calculate {
            provider,
            payer,
            amount,
            date,
        }) => {
            let request = TdsCalculationRequest {
                provider_name: provider,
                payer_name: payer,
                amount,
                calculation_date: date,
            };
            print_json(&console.tds.calculate(&request).await?)?;
        }
        Command::Tds(TdsCommand::Payers) => print_json(&console.tds.payer_names().await?)?,
        Command::Tds(TdsCommand::Providers) => print_json(&console.tds.provider_names().await?)?,
        Command::Summary => print_json(&console.summary.fetch().await?)?,
        Command::Reference => print_json(&console.load_reference_data(mode).await?)?,
    }
    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let store = SessionStore::new();
    match run(cli, store.as_ref()).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {}", err);
            ExitCode::FAILURE
        }
    }
}
