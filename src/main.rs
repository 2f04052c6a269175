use std::process::ExitCode;

use clap::{error::ErrorKind, CommandFactory};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;
use vet_agenda::{
    availability::{AvailabilityController, CloneTarget, SlotForm},
    batch::BatchReport,
    booking::BookingController,
    calendar::CalendarHandle,
    catalog::{filter as filter_products, format_price, Catalog, Category, PRODUCTS},
    configuration::Configuration,
    configuration_handler::{
        BookCommand, CloneMode, Command, ConfigurationHandler, ProfileCommand, ServicesCommand,
        SlotsCommand,
    },
    error::{ClientError, ValidationError},
    http::HttpApi,
    presenter::Presenter,
    profile::{ProfileController, ProfileForm},
    services::{PriceForm, ServicesController},
    terminal::TerminalPresenter,
    types::ImageUpload,
};

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let configuration = ConfigurationHandler::parse_arguments();
    let api = match HttpApi::from_configuration(&configuration) {
        Ok(api) => api,
        Err(err) => {
            error!(?err, "Failed to set up HTTP client");
            return ExitCode::FAILURE;
        }
    };
    info!(base_url = %configuration.base_url(), "Using application server");
    let presenter = TerminalPresenter::new(configuration.assume_yes());

    let result = match configuration.command.clone() {
        Command::Slots(command) => slots(command, api, presenter).await,
        Command::Services(command) => services(command, &configuration, api, presenter).await,
        Command::Book(command) => book(command, &configuration, api, presenter).await,
        Command::Profile(command) => profile(command, api, presenter).await,
        Command::Catalog { filter, html, json } => catalog(filter, html, json),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!(%err, "Command failed");
            ExitCode::FAILURE
        }
    }
}

fn require_vet_id(configuration: &ConfigurationHandler) -> i64 {
    match configuration.vet_id() {
        Some(vet_id) => vet_id,
        None => ConfigurationHandler::command()
            .error(
                ErrorKind::MissingRequiredArgument,
                "--vet-id (or VET_AGENDA_VET_ID) is required for this command",
            )
            .exit(),
    }
}

/// A batch that left items behind still fails the command.
fn batch_outcome(report: Option<BatchReport<i64>>) -> Result<(), ClientError> {
    match report {
        Some(report) if !report.is_complete() => Err(ClientError::Server(format!(
            "{} de {} operaciones fallaron",
            report.failed.len(),
            report.total()
        ))),
        _ => Ok(()),
    }
}

async fn slots<P: Presenter>(
    command: SlotsCommand,
    api: HttpApi,
    presenter: P,
) -> Result<(), ClientError> {
    let calendar = CalendarHandle::default();
    let mut availability = AvailabilityController::new(api.clone(), presenter, calendar.clone());

    match command {
        SlotsCommand::List { date } => {
            availability.select_date(date).await?;
        }
        SlotsCommand::Add { date, start, end } => {
            availability
                .submit_slot(SlotForm {
                    date: Some(date),
                    start_time: start,
                    end_time: end,
                })
                .await?;
        }
        SlotsCommand::Delete { id, date } => {
            availability.delete_slot(id, date).await?;
        }
        SlotsCommand::Clone {
            date,
            mode,
            target_date,
        } => {
            let target = match (mode, target_date) {
                (CloneMode::NextDay, _) => CloneTarget::NextDay,
                (CloneMode::NextWeek, _) => CloneTarget::NextWeek,
                (CloneMode::SpecificDate, Some(target_date)) => {
                    CloneTarget::SpecificDate(target_date)
                }
                (CloneMode::SpecificDate, None) => return Err(ValidationError::MissingDate.into()),
            };
            batch_outcome(availability.clone_day(date, target).await?)?;
        }
        SlotsCommand::Clear { date } => {
            batch_outcome(availability.clear_day(date).await?)?;
        }
        SlotsCommand::Events => {
            let count = calendar.refetch(&api).await?;
            info!(count, "Calendar events loaded");
            for day in calendar.days_with_events() {
                println!("{day}");
            }
        }
    }
    Ok(())
}

async fn services<P: Presenter>(
    command: ServicesCommand,
    configuration: &ConfigurationHandler,
    api: HttpApi,
    presenter: P,
) -> Result<(), ClientError> {
    match command {
        ServicesCommand::List => {
            let booking = BookingController::new(api, presenter, require_vet_id(configuration));
            booking.load_services().await?;
        }
        ServicesCommand::Show { id } => {
            let service = ServicesController::new(api, presenter)
                .load_for_edit(id)
                .await?;
            println!("#{} {} ({})", service.id, service.name, service.kind);
        }
        ServicesCommand::Create { name, kind } => {
            ServicesController::new(api, presenter)
                .create(&name, &kind)
                .await?;
        }
        ServicesCommand::Edit { id, name, kind } => {
            ServicesController::new(api, presenter)
                .edit(id, &name, &kind)
                .await?;
        }
        ServicesCommand::Toggle { id, active } => {
            let state = ServicesController::new(api, presenter)
                .toggle(id, active)
                .await;
            if state != active {
                return Err(ClientError::Server(
                    "El estado del servicio no cambió".into(),
                ));
            }
        }
        ServicesCommand::Price {
            id,
            price,
            inactive,
            notes,
        } => {
            ServicesController::new(api, presenter)
                .update_price(&PriceForm {
                    service_id: id,
                    price,
                    active: !inactive,
                    notes,
                })
                .await?;
        }
    }
    Ok(())
}

async fn book<P: Presenter>(
    command: BookCommand,
    configuration: &ConfigurationHandler,
    api: HttpApi,
    presenter: P,
) -> Result<(), ClientError> {
    let booking = BookingController::new(api, presenter, require_vet_id(configuration));
    match command {
        BookCommand::Services => {
            booking.load_services().await?;
        }
        BookCommand::Windows { date, service } => {
            booking.load_windows(service, date).await?;
        }
        BookCommand::Confirm {
            service,
            date,
            window,
        } => booking.confirm(service, date, window).await?,
    }
    Ok(())
}

async fn profile<P: Presenter>(
    command: ProfileCommand,
    api: HttpApi,
    presenter: P,
) -> Result<(), ClientError> {
    let profile = ProfileController::new(api, presenter);
    match command {
        ProfileCommand::Update {
            phone,
            description,
            inactive,
        } => {
            let active = if inactive {
                profile.confirm_active_toggle(false)
            } else {
                true
            };
            profile
                .submit_profile(&ProfileForm {
                    phone,
                    description,
                    active,
                })
                .await?;
        }
        ProfileCommand::Image { path } => {
            let image = ImageUpload::from_path(&path)?;
            profile.upload_image(&image).await?;
        }
    }
    Ok(())
}

fn catalog(filter: Category, html: bool, json: bool) -> Result<(), ClientError> {
    let mut catalog = Catalog::default();
    let markup = catalog.select(filter);
    if let Category::Only(species) = catalog.active() {
        info!(%species, "Catalog filtered");
    }

    if html {
        println!("{markup}");
        return Ok(());
    }
    if json {
        let products = filter_products(&PRODUCTS, filter);
        let rendered = serde_json::to_string_pretty(&products)
            .map_err(|err| ClientError::Decode(err.to_string()))?;
        println!("{rendered}");
        return Ok(());
    }

    for card in catalog.cards() {
        let original = card
            .original_price
            .map(|price| format!(" (antes {})", format_price(price)))
            .unwrap_or_default();
        println!(
            "{:<22} {:>9}{original} {}",
            card.name,
            format_price(card.final_price),
            card.badge.unwrap_or_default()
        );
    }
    Ok(())
}
