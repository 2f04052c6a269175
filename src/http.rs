use crate::backend::VetApi;
use crate::configuration::Configuration;
use crate::error::ClientError;
use crate::types::{
    ApiResponse, BookingRequest, CalendarEvent, CloneRequest, CustomServiceUpdate, ImageUpload,
    NewSlot, ProfileSubmission, Service, ServiceAction, Slot, TimeWindow,
};
use chrono::NaiveDate;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, error};

const CSRF_HEADER: &str = "X-CSRFToken";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// `reqwest` implementation of [`VetApi`] against the application server.
#[derive(Debug, Clone)]
pub struct HttpApi {
    client: Client,
    base_url: String,
    csrf_token: String,
}

#[derive(Debug, Deserialize)]
struct ServiceEnvelope {
    servicio: Option<Service>,
}

impl HttpApi {
    pub fn new(base_url: &str, csrf_token: &str) -> Result<Self, ClientError> {
        let client = Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            csrf_token: csrf_token.to_string(),
        })
    }

    pub fn from_configuration<C: Configuration>(configuration: &C) -> Result<Self, ClientError> {
        Self::new(&configuration.base_url(), &configuration.csrf_token())
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn get(&self, path: &str) -> RequestBuilder {
        debug!(path, "GET");
        self.client.get(self.url(path))
    }

    /// Mutating requests always carry the CSRF token.
    fn post(&self, path: &str) -> RequestBuilder {
        debug!(path, "POST");
        self.client
            .post(self.url(path))
            .header(CSRF_HEADER, &self.csrf_token)
    }

    fn delete(&self, path: &str) -> RequestBuilder {
        debug!(path, "DELETE");
        self.client
            .delete(self.url(path))
            .header(CSRF_HEADER, &self.csrf_token)
    }
}

fn failure_from_body(status: StatusCode, body: &[u8]) -> ClientError {
    match serde_json::from_slice::<ApiResponse>(body) {
        Ok(ApiResponse {
            error: Some(message),
            ..
        }) => ClientError::Server(message),
        _ => {
            error!(%status, "Request failed without an error message");
            ClientError::Status(status.as_u16())
        }
    }
}

async fn read_json<T: DeserializeOwned>(response: Response) -> Result<T, ClientError> {
    let status = response.status();
    let body = response.bytes().await?;
    if !status.is_success() {
        return Err(failure_from_body(status, &body));
    }
    serde_json::from_slice(&body).map_err(|err| ClientError::Decode(err.to_string()))
}

/// Acknowledgement of a mutating call. An empty 2xx body is a plain success.
async fn read_ack(response: Response) -> Result<ApiResponse, ClientError> {
    let status = response.status();
    let body = response.bytes().await?;
    if !status.is_success() {
        return Err(failure_from_body(status, &body));
    }
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(ApiResponse::default());
    }
    serde_json::from_slice(&body).map_err(|err| ClientError::Decode(err.to_string()))
}

impl VetApi for HttpApi {
    async fn slots_for_date(&self, date: NaiveDate) -> Result<Vec<Slot>, ClientError> {
        let response = self
            .get("/api/disponibilidad/")
            .query(&[("fecha", date.to_string())])
            .send()
            .await?;
        read_json(response).await
    }

    async fn create_slot(&self, slot: &NewSlot) -> Result<ApiResponse, ClientError> {
        let response = self.post("/api/disponibilidad/").json(slot).send().await?;
        read_ack(response).await
    }

    async fn delete_slot(&self, id: i64) -> Result<ApiResponse, ClientError> {
        let response = self
            .delete(&format!("/api/disponibilidad/{id}/"))
            .send()
            .await?;
        read_ack(response).await
    }

    async fn clone_slot(&self, request: &CloneRequest) -> Result<ApiResponse, ClientError> {
        let response = self
            .post("/api/disponibilidad/clonar/")
            .json(request)
            .send()
            .await?;
        read_ack(response).await
    }

    async fn calendar_events(&self) -> Result<Vec<CalendarEvent>, ClientError> {
        let response = self.get("/api/disponibilidad/eventos/").send().await?;
        read_json(response).await
    }

    async fn vet_services(&self, vet_id: i64) -> Result<Vec<Service>, ClientError> {
        let response = self
            .get(&format!("/api/veterinarios/{vet_id}/servicios/"))
            .send()
            .await?;
        read_json(response).await
    }

    async fn vet_windows(
        &self,
        vet_id: i64,
        date: NaiveDate,
        service_id: i64,
    ) -> Result<Vec<TimeWindow>, ClientError> {
        let response = self
            .get(&format!("/api/veterinarios/{vet_id}/disponibilidad/"))
            .query(&[("fecha", date.to_string()), ("servicio", service_id.to_string())])
            .send()
            .await?;
        read_json(response).await
    }

    async fn book_appointment(&self, request: &BookingRequest) -> Result<ApiResponse, ClientError> {
        let response = self.post("/api/citas/agendar/").json(request).send().await?;
        read_ack(response).await
    }

    async fn manage_service(&self, action: &ServiceAction) -> Result<ApiResponse, ClientError> {
        let response = self.post("/api/servicios/gestion/").json(action).send().await?;
        read_ack(response).await
    }

    async fn service_details(&self, service_id: i64) -> Result<Service, ClientError> {
        let response = self
            .get("/api/servicios/gestion/")
            .query(&[("id", service_id)])
            .send()
            .await?;
        let envelope: ServiceEnvelope = read_json(response).await?;
        envelope.servicio.ok_or_else(|| {
            ClientError::Server("No se pudo cargar la información del servicio".into())
        })
    }

    async fn update_custom_service(
        &self,
        update: &CustomServiceUpdate,
    ) -> Result<ApiResponse, ClientError> {
        let response = self
            .post("/api/servicios/personalizado/")
            .json(update)
            .send()
            .await?;
        read_ack(response).await
    }

    async fn upload_profile_image(&self, image: &ImageUpload) -> Result<ApiResponse, ClientError> {
        let part = Part::bytes(image.bytes.clone())
            .file_name(image.file_name.clone())
            .mime_str(&image.mime)?;
        let form = Form::new().part("imagen_perfil", part);

        let response = self
            .post("/api/veterinario/actualizar-imagen/")
            .multipart(form)
            .send()
            .await?;
        read_ack(response).await
    }

    async fn update_profile(&self, profile: &ProfileSubmission) -> Result<ApiResponse, ClientError> {
        let mut form = Form::new()
            .text("telefono", profile.phone.clone())
            .text("descripcion", profile.description.clone());
        // checkbox semantics: the field is only present when checked
        if profile.active {
            form = form.text("esta_activo", "on");
        }

        let response = self
            .post("/veterinario/perfil/actualizar/")
            .header("X-Requested-With", "XMLHttpRequest")
            .multipart(form)
            .send()
            .await?;
        read_ack(response).await
    }
}
