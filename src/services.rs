use crate::{
    backend::VetApi,
    error::ClientError,
    presenter::{Notice, Presenter},
    types::{ApiResponse, CustomServiceUpdate, Service, ServiceAction},
    validation::{first_failure, price_rule},
};
use tracing::{error, info};
use validator::Validate;

/// A veterinarian's own price for a catalog service.
#[derive(Debug, Clone, PartialEq, Validate)]
pub struct PriceForm {
    pub service_id: i64,
    #[validate(custom(function = "price_rule"))]
    pub price: f64,
    pub active: bool,
    pub notes: Option<String>,
}

impl From<&PriceForm> for CustomServiceUpdate {
    fn from(form: &PriceForm) -> Self {
        CustomServiceUpdate {
            service_id: form.service_id,
            price: form.price,
            active: Some(form.active),
            notes: form.notes.clone(),
        }
    }
}

pub struct ServicesController<A: VetApi, P: Presenter> {
    api: A,
    presenter: P,
}

impl<A: VetApi, P: Presenter> ServicesController<A, P> {
    pub fn new(api: A, presenter: P) -> Self {
        Self { api, presenter }
    }

    async fn send(&self, action: ServiceAction) -> Result<ApiResponse, ClientError> {
        self.api
            .manage_service(&action)
            .await
            .and_then(ApiResponse::into_result)
            .map_err(|err| {
                error!(?err, ?action, "Service management request failed");
                self.presenter
                    .notify(Notice::Error, "Error", &err.user_message("Error al procesar el servicio"));
                err
            })
    }

    pub async fn create(&self, name: &str, kind: &str) -> Result<(), ClientError> {
        self.send(ServiceAction::Create {
            name: name.trim().into(),
            kind: kind.into(),
        })
        .await?;
        info!(name, kind, "Service created");
        self.presenter
            .notify(Notice::Success, "¡Éxito!", "Servicio creado correctamente");
        self.presenter.reload_page();
        Ok(())
    }

    pub async fn edit(&self, service_id: i64, name: &str, kind: &str) -> Result<(), ClientError> {
        self.send(ServiceAction::Edit {
            service_id,
            name: name.trim().into(),
            kind: kind.into(),
        })
        .await?;
        info!(service_id, name, kind, "Service edited");
        self.presenter.notify(
            Notice::Success,
            "¡Éxito!",
            "Servicio actualizado correctamente",
        );
        self.presenter.reload_page();
        Ok(())
    }

    /// Fills the edit form.
    pub async fn load_for_edit(&self, service_id: i64) -> Result<Service, ClientError> {
        self.api.service_details(service_id).await.map_err(|err| {
            error!(?err, service_id, "Failed to load service");
            self.presenter.notify(
                Notice::Error,
                "Error",
                &err.user_message("No se pudo cargar la información del servicio"),
            );
            err
        })
    }

    /// Returns the state the switch ends up in: `requested` on success, the
    /// previous state otherwise.
    pub async fn toggle(&self, service_id: i64, requested: bool) -> bool {
        match self
            .send(ServiceAction::ToggleState {
                service_id,
                active: requested,
            })
            .await
        {
            Ok(_) => {
                self.presenter
                    .notify(Notice::Success, "¡Estado actualizado!", "");
                requested
            }
            Err(_) => !requested,
        }
    }

    pub async fn update_price(&self, form: &PriceForm) -> Result<(), ClientError> {
        if let Err(errors) = form.validate() {
            if let Some(err) = first_failure(&errors, &["price"]) {
                self.presenter
                    .notify(Notice::Error, "Error", &err.to_string());
                return Err(err.into());
            }
        }

        match self
            .api
            .update_custom_service(&form.into())
            .await
            .and_then(ApiResponse::into_result)
        {
            Ok(_) => {
                info!(service_id = form.service_id, price = form.price, "Custom price saved");
                self.presenter.notify(
                    Notice::Success,
                    "¡Éxito!",
                    "Servicio actualizado correctamente",
                );
                Ok(())
            }
            Err(err) => {
                error!(?err, service_id = form.service_id, "Failed to save custom price");
                self.presenter.notify(
                    Notice::Error,
                    "Error",
                    &err.user_message("Error al actualizar el precio"),
                );
                Err(err)
            }
        }
    }
}
