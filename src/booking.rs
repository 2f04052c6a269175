use crate::{
    backend::VetApi,
    error::{ClientError, ValidationError},
    presenter::{Notice, Presenter},
    types::{ApiResponse, BookingRequest, Service, TimeWindow},
};
use chrono::NaiveDate;
use tracing::{error, info};

pub const BOOKING_MODAL: &str = "agendarModal";

/// Appointment booking from a veterinarian's public agenda.
pub struct BookingController<A: VetApi, P: Presenter> {
    api: A,
    presenter: P,
    vet_id: i64,
}

impl<A: VetApi, P: Presenter> BookingController<A, P> {
    pub fn new(api: A, presenter: P, vet_id: i64) -> Self {
        Self {
            api,
            presenter,
            vet_id,
        }
    }

    pub async fn load_services(&self) -> Result<Vec<Service>, ClientError> {
        match self.api.vet_services(self.vet_id).await {
            Ok(services) => {
                self.presenter.render_services(&services);
                Ok(services)
            }
            Err(err) => {
                error!(?err, vet_id = self.vet_id, "Failed to load services");
                self.presenter.notify(
                    Notice::Error,
                    "Error",
                    "No se pudieron cargar los servicios",
                );
                Err(err)
            }
        }
    }

    /// Free windows for `date`. Without a selected service nothing is requested.
    pub async fn load_windows(
        &self,
        service_id: Option<i64>,
        date: NaiveDate,
    ) -> Result<Vec<TimeWindow>, ClientError> {
        let Some(service_id) = service_id else {
            let err = ValidationError::MissingService;
            self.presenter
                .notify(Notice::Warning, "Error", &err.to_string());
            return Err(err.into());
        };

        match self.api.vet_windows(self.vet_id, date, service_id).await {
            Ok(windows) => {
                self.presenter.render_windows(&windows);
                Ok(windows)
            }
            Err(err) => {
                error!(?err, vet_id = self.vet_id, %date, service_id, "Failed to load windows");
                self.presenter.notify(
                    Notice::Error,
                    "Error",
                    "No se pudieron cargar los horarios disponibles",
                );
                Err(err)
            }
        }
    }

    pub async fn confirm(
        &self,
        service_id: i64,
        date: NaiveDate,
        window_id: i64,
    ) -> Result<(), ClientError> {
        let request = BookingRequest {
            vet_id: self.vet_id,
            service_id,
            date,
            window_id,
        };
        match self
            .api
            .book_appointment(&request)
            .await
            .and_then(ApiResponse::into_result)
        {
            Ok(_) => {
                info!(?request, "Appointment booked");
                self.presenter
                    .notify(Notice::Success, "¡Éxito!", "Tu cita ha sido agendada");
                self.presenter.close_modal(BOOKING_MODAL);
                Ok(())
            }
            Err(err) => {
                error!(?err, ?request, "Failed to book appointment");
                self.presenter.notify(
                    Notice::Error,
                    "Error",
                    &err.user_message("Error al agendar la cita"),
                );
                Err(err)
            }
        }
    }
}
