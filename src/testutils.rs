use std::{
    collections::{HashMap, HashSet},
    sync::{
        atomic::{AtomicBool, AtomicI64, AtomicU64, Ordering},
        Arc, Mutex,
    },
};

use axum::{
    body::Bytes,
    extract::{Multipart, Path, Query, State},
    http::{HeaderMap, Method, StatusCode},
    response::{IntoResponse, Response},
    routing::{any, get, post},
    Json, Router,
};
use chrono::{Duration, NaiveDate, NaiveTime};
use serde_json::{json, Value};
use tokio::{net::TcpListener, task::JoinHandle};

use crate::{
    backend::VetApi,
    error::ClientError,
    types::{
        parse_time, ApiResponse, BookingRequest, CalendarEvent, CloneKind, CloneRequest,
        CustomServiceUpdate, ImageUpload, NewSlot, ProfileSubmission, Service, ServiceAction,
        Slot, SlotState, TimeWindow,
    },
};

pub const TEST_CSRF_TOKEN: &str = "test-csrf-token";

pub fn slot(id: i64, date: NaiveDate, start_hour: u32, end_hour: u32) -> Slot {
    Slot {
        id,
        date: Some(date),
        start_time: NaiveTime::from_hms_opt(start_hour, 0, 0).unwrap(),
        end_time: NaiveTime::from_hms_opt(end_hour, 0, 0).unwrap(),
        state: SlotState::Available,
    }
}

pub fn service(id: i64, name: &str, active: bool) -> Service {
    Service {
        id,
        name: name.into(),
        kind: "consulta".into(),
        price: Some(15000.0),
        active,
    }
}

// In-process stand-in for the API, counting every call.

pub struct MockApiInner {
    pub success: AtomicBool,
    pub slots_unavailable: AtomicBool,
    pub calls_to_slots_for_date: AtomicU64,
    pub calls_to_create_slot: AtomicU64,
    pub calls_to_delete_slot: AtomicU64,
    pub calls_to_clone_slot: AtomicU64,
    pub calls_to_calendar_events: AtomicU64,
    pub calls_to_vet_services: AtomicU64,
    pub calls_to_vet_windows: AtomicU64,
    pub calls_to_book_appointment: AtomicU64,
    pub calls_to_manage_service: AtomicU64,
    pub calls_to_service_details: AtomicU64,
    pub calls_to_update_custom_service: AtomicU64,
    pub calls_to_upload_profile_image: AtomicU64,
    pub calls_to_update_profile: AtomicU64,
    pub slots: Mutex<Vec<Slot>>,
    pub events: Mutex<Vec<CalendarEvent>>,
    pub services: Mutex<Vec<Service>>,
    pub windows: Mutex<Vec<TimeWindow>>,
    /// Slot ids whose clone or delete request fails at transport level.
    pub failing_ids: Mutex<HashSet<i64>>,
    pub created: Mutex<Vec<NewSlot>>,
    pub cloned: Mutex<Vec<CloneRequest>>,
    pub bookings: Mutex<Vec<BookingRequest>>,
    pub service_actions: Mutex<Vec<ServiceAction>>,
    pub custom_updates: Mutex<Vec<CustomServiceUpdate>>,
    pub profiles: Mutex<Vec<ProfileSubmission>>,
    pub images: Mutex<Vec<ImageUpload>>,
}

#[derive(Clone)]
pub struct MockApi(pub Arc<MockApiInner>);

impl MockApiInner {
    fn new() -> Self {
        Self {
            success: AtomicBool::new(true),
            slots_unavailable: AtomicBool::new(false),
            calls_to_slots_for_date: AtomicU64::default(),
            calls_to_create_slot: AtomicU64::default(),
            calls_to_delete_slot: AtomicU64::default(),
            calls_to_clone_slot: AtomicU64::default(),
            calls_to_calendar_events: AtomicU64::default(),
            calls_to_vet_services: AtomicU64::default(),
            calls_to_vet_windows: AtomicU64::default(),
            calls_to_book_appointment: AtomicU64::default(),
            calls_to_manage_service: AtomicU64::default(),
            calls_to_service_details: AtomicU64::default(),
            calls_to_update_custom_service: AtomicU64::default(),
            calls_to_upload_profile_image: AtomicU64::default(),
            calls_to_update_profile: AtomicU64::default(),
            slots: Mutex::default(),
            events: Mutex::default(),
            services: Mutex::default(),
            windows: Mutex::default(),
            failing_ids: Mutex::default(),
            created: Mutex::default(),
            cloned: Mutex::default(),
            bookings: Mutex::default(),
            service_actions: Mutex::default(),
            custom_updates: Mutex::default(),
            profiles: Mutex::default(),
            images: Mutex::default(),
        }
    }
}

impl MockApi {
    pub fn new() -> Self {
        Self(Arc::new(MockApiInner::new()))
    }

    pub fn with_slots(slots: Vec<Slot>) -> Self {
        let api = Self::new();
        *api.0.slots.lock().unwrap() = slots;
        api
    }

    pub fn fail_server_side(&self) {
        self.0.success.store(false, Ordering::SeqCst);
    }

    pub fn fail_slot_loading(&self) {
        self.0.slots_unavailable.store(true, Ordering::SeqCst);
    }

    pub fn fail_id(&self, id: i64) {
        self.0.failing_ids.lock().unwrap().insert(id);
    }

    fn result(&self) -> Result<ApiResponse, ClientError> {
        match self.0.success.load(Ordering::SeqCst) {
            true => Ok(ApiResponse::ok()),
            false => Ok(ApiResponse::failed("Supposed to fail")),
        }
    }

    fn check_failing(&self, id: i64) -> Result<(), ClientError> {
        if self.0.failing_ids.lock().unwrap().contains(&id) {
            return Err(ClientError::Status(503));
        }
        Ok(())
    }
}

impl VetApi for MockApi {
    async fn slots_for_date(&self, date: NaiveDate) -> Result<Vec<Slot>, ClientError> {
        self.0.calls_to_slots_for_date.fetch_add(1, Ordering::SeqCst);
        if self.0.slots_unavailable.load(Ordering::SeqCst) {
            return Err(ClientError::Status(500));
        }
        let slots = self.0.slots.lock().unwrap();
        Ok(slots
            .iter()
            .filter(|slot| slot.date == Some(date))
            .cloned()
            .collect())
    }

    async fn create_slot(&self, slot: &NewSlot) -> Result<ApiResponse, ClientError> {
        self.0.calls_to_create_slot.fetch_add(1, Ordering::SeqCst);
        self.0.created.lock().unwrap().push(slot.clone());
        self.result()
    }

    async fn delete_slot(&self, id: i64) -> Result<ApiResponse, ClientError> {
        self.0.calls_to_delete_slot.fetch_add(1, Ordering::SeqCst);
        self.check_failing(id)?;
        let response = self.result()?;
        if response.success == Some(true) {
            self.0.slots.lock().unwrap().retain(|slot| slot.id != id);
        }
        Ok(response)
    }

    async fn clone_slot(&self, request: &CloneRequest) -> Result<ApiResponse, ClientError> {
        self.0.calls_to_clone_slot.fetch_add(1, Ordering::SeqCst);
        self.check_failing(request.slot_id)?;
        self.0.cloned.lock().unwrap().push(request.clone());
        self.result()
    }

    async fn calendar_events(&self) -> Result<Vec<CalendarEvent>, ClientError> {
        self.0.calls_to_calendar_events.fetch_add(1, Ordering::SeqCst);
        Ok(self.0.events.lock().unwrap().clone())
    }

    async fn vet_services(&self, _vet_id: i64) -> Result<Vec<Service>, ClientError> {
        self.0.calls_to_vet_services.fetch_add(1, Ordering::SeqCst);
        Ok(self.0.services.lock().unwrap().clone())
    }

    async fn vet_windows(
        &self,
        _vet_id: i64,
        _date: NaiveDate,
        _service_id: i64,
    ) -> Result<Vec<TimeWindow>, ClientError> {
        self.0.calls_to_vet_windows.fetch_add(1, Ordering::SeqCst);
        Ok(self.0.windows.lock().unwrap().clone())
    }

    async fn book_appointment(&self, request: &BookingRequest) -> Result<ApiResponse, ClientError> {
        self.0.calls_to_book_appointment.fetch_add(1, Ordering::SeqCst);
        self.0.bookings.lock().unwrap().push(request.clone());
        self.result()
    }

    async fn manage_service(&self, action: &ServiceAction) -> Result<ApiResponse, ClientError> {
        self.0.calls_to_manage_service.fetch_add(1, Ordering::SeqCst);
        self.0.service_actions.lock().unwrap().push(action.clone());
        self.result()
    }

    async fn service_details(&self, service_id: i64) -> Result<Service, ClientError> {
        self.0.calls_to_service_details.fetch_add(1, Ordering::SeqCst);
        self.0
            .services
            .lock()
            .unwrap()
            .iter()
            .find(|service| service.id == service_id)
            .cloned()
            .ok_or_else(|| ClientError::Server("No se pudo cargar la información del servicio".into()))
    }

    async fn update_custom_service(
        &self,
        update: &CustomServiceUpdate,
    ) -> Result<ApiResponse, ClientError> {
        self.0
            .calls_to_update_custom_service
            .fetch_add(1, Ordering::SeqCst);
        self.0.custom_updates.lock().unwrap().push(update.clone());
        self.result()
    }

    async fn upload_profile_image(&self, image: &ImageUpload) -> Result<ApiResponse, ClientError> {
        self.0
            .calls_to_upload_profile_image
            .fetch_add(1, Ordering::SeqCst);
        self.0.images.lock().unwrap().push(image.clone());
        let mut response = self.result()?;
        if response.success == Some(true) {
            response.image_url = Some(format!("/media/perfiles/{}", image.file_name));
        }
        Ok(response)
    }

    async fn update_profile(&self, profile: &ProfileSubmission) -> Result<ApiResponse, ClientError> {
        self.0.calls_to_update_profile.fetch_add(1, Ordering::SeqCst);
        self.0.profiles.lock().unwrap().push(profile.clone());
        self.result()
    }
}

// HTTP fake of the application server, for exercising the real client.

#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: String,
    pub path: String,
    pub csrf_token: Option<String>,
    pub body: Value,
}

#[derive(Default)]
pub struct FakeStateInner {
    pub slots: Mutex<Vec<Slot>>,
    pub next_id: AtomicI64,
    pub requests: Mutex<Vec<RecordedRequest>>,
    pub profile_fields: Mutex<HashMap<String, String>>,
}

#[derive(Clone, Default)]
pub struct FakeState(pub Arc<FakeStateInner>);

pub struct FakeServer {
    pub base_url: String,
    pub state: FakeState,
    handle: JoinHandle<()>,
}

impl FakeServer {
    pub fn shutdown(self) {
        self.handle.abort();
    }
}

pub async fn spawn_fake_server() -> FakeServer {
    let state = FakeState::default();
    let app = Router::new()
        .route("/api/disponibilidad/", get(list_slots).post(create_slot))
        .route("/api/disponibilidad/:segment/", any(slot_item))
        .route("/api/veterinarios/:vet_id/servicios/", get(vet_services))
        .route("/api/veterinarios/:vet_id/disponibilidad/", get(vet_windows))
        .route("/api/citas/agendar/", post(book_appointment))
        .route(
            "/api/servicios/gestion/",
            get(service_details).post(acknowledge),
        )
        .route("/api/servicios/personalizado/", post(acknowledge))
        .route("/api/veterinario/actualizar-imagen/", post(upload_image))
        .route("/veterinario/perfil/actualizar/", post(update_profile))
        .with_state(state.clone());

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let address = listener.local_addr().unwrap();
    let handle = tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    FakeServer {
        base_url: format!("http://{address}"),
        state,
        handle,
    }
}

fn record(
    state: &FakeState,
    method: &str,
    path: &str,
    headers: &HeaderMap,
    body: Value,
) -> Result<(), Response> {
    let csrf_token = headers
        .get("x-csrftoken")
        .and_then(|value| value.to_str().ok())
        .map(str::to_string);
    if csrf_token.as_deref() != Some(TEST_CSRF_TOKEN) {
        return Err((
            StatusCode::FORBIDDEN,
            Json(json!({"success": false, "error": "CSRF token inválido"})),
        )
            .into_response());
    }
    state.0.requests.lock().unwrap().push(RecordedRequest {
        method: method.into(),
        path: path.into(),
        csrf_token,
        body,
    });
    Ok(())
}

fn not_found() -> Response {
    (
        StatusCode::NOT_FOUND,
        Json(json!({"success": false, "error": "Horario no encontrado"})),
    )
        .into_response()
}

async fn list_slots(
    State(state): State<FakeState>,
    Query(query): Query<HashMap<String, String>>,
) -> Json<Vec<Slot>> {
    let date = query
        .get("fecha")
        .and_then(|date| date.parse::<NaiveDate>().ok());
    let slots = state
        .0
        .slots
        .lock()
        .unwrap()
        .iter()
        .filter(|slot| date.is_some() && slot.date == date)
        .cloned()
        .collect();
    Json(slots)
}

async fn create_slot(
    State(state): State<FakeState>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    if let Err(response) = record(&state, "POST", "/api/disponibilidad/", &headers, body.clone()) {
        return response;
    }

    let parsed = (|| {
        let date = body["fecha"].as_str()?.parse::<NaiveDate>().ok()?;
        let start_time = parse_time(body["horario_inicio"].as_str()?).ok()?;
        let end_time = parse_time(body["horario_fin"].as_str()?).ok()?;
        Some((date, start_time, end_time))
    })();
    let Some((date, start_time, end_time)) = parsed else {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({"success": false, "error": "Datos inválidos"})),
        )
            .into_response();
    };

    let mut slots = state.0.slots.lock().unwrap();
    if slots
        .iter()
        .any(|slot| slot.date == Some(date) && slot.start_time == start_time)
    {
        return Json(ApiResponse::failed("Ya existe un horario en ese rango")).into_response();
    }
    let id = state.0.next_id.fetch_add(1, Ordering::SeqCst) + 1;
    slots.push(Slot {
        id,
        date: Some(date),
        start_time,
        end_time,
        state: SlotState::Available,
    });
    Json(json!({"success": true, "message": "Horario guardado"})).into_response()
}

async fn slot_item(
    State(state): State<FakeState>,
    method: Method,
    Path(segment): Path<String>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let path = format!("/api/disponibilidad/{segment}/");
    match (method.as_str(), segment.as_str()) {
        ("GET", "eventos") => {
            let events: Vec<Value> = state
                .0
                .slots
                .lock()
                .unwrap()
                .iter()
                .filter_map(|slot| {
                    let date = slot.date?;
                    Some(json!({
                        "id": slot.id,
                        "title": "Disponible",
                        "start": format!("{}T{}", date, slot.start_time.format("%H:%M")),
                        "end": format!("{}T{}", date, slot.end_time.format("%H:%M")),
                    }))
                })
                .collect();
            Json(events).into_response()
        }
        ("POST", "clonar") => {
            let body: Value = serde_json::from_slice(&body).unwrap_or(Value::Null);
            if let Err(response) = record(&state, "POST", &path, &headers, body.clone()) {
                return response;
            }
            let Ok(request) = serde_json::from_value::<CloneRequest>(body) else {
                return StatusCode::BAD_REQUEST.into_response();
            };

            let mut slots = state.0.slots.lock().unwrap();
            let Some(original) = slots.iter().find(|slot| slot.id == request.slot_id).cloned()
            else {
                // unknown ids are acknowledged silently, like the real endpoint
                return Json(json!({"success": true})).into_response();
            };
            let target = match (request.kind, original.date) {
                (CloneKind::NextDay, Some(date)) => Some(date + Duration::days(1)),
                (CloneKind::NextWeek, Some(date)) => Some(date + Duration::days(7)),
                (CloneKind::SpecificDate, _) => request.target_date,
                _ => None,
            };
            let id = state.0.next_id.fetch_add(1, Ordering::SeqCst) + 1;
            slots.push(Slot {
                id,
                date: target,
                ..original
            });
            Json(json!({"success": true})).into_response()
        }
        ("DELETE", id) => {
            if let Err(response) = record(&state, "DELETE", &path, &headers, Value::Null) {
                return response;
            }
            let Ok(id) = id.parse::<i64>() else {
                return not_found();
            };
            let mut slots = state.0.slots.lock().unwrap();
            let before = slots.len();
            slots.retain(|slot| slot.id != id);
            if slots.len() == before {
                return not_found();
            }
            Json(json!({"success": true})).into_response()
        }
        _ => StatusCode::METHOD_NOT_ALLOWED.into_response(),
    }
}

async fn vet_services(Path(_vet_id): Path<i64>) -> Json<Value> {
    Json(json!([
        {"id": 1, "nombre": "Consulta general", "tipo": "consulta", "precio": "15000.00"},
        {"id": 2, "nombre": "Vacunación", "tipo": "preventivo", "precio": 12000}
    ]))
}

async fn vet_windows(
    Path(_vet_id): Path<i64>,
    Query(query): Query<HashMap<String, String>>,
) -> Response {
    if !query.contains_key("fecha") || !query.contains_key("servicio") {
        return StatusCode::BAD_REQUEST.into_response();
    }
    Json(json!([
        {"id": 10, "hora_inicio": "09:00:00", "hora_fin": "10:00:00"},
        {"id": 11, "hora_inicio": "10:00:00", "hora_fin": "11:00:00"}
    ]))
    .into_response()
}

async fn book_appointment(
    State(state): State<FakeState>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    if let Err(response) = record(&state, "POST", "/api/citas/agendar/", &headers, body) {
        return response;
    }
    (StatusCode::CREATED, "").into_response()
}

async fn service_details(Query(query): Query<HashMap<String, String>>) -> Json<Value> {
    match query.get("id").map(String::as_str) {
        Some("1") => Json(json!({
            "servicio": {"id": 1, "nombre": "Consulta general", "tipo": "consulta", "esta_activo": true}
        })),
        _ => Json(json!({})),
    }
}

async fn acknowledge(
    State(state): State<FakeState>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    if let Err(response) = record(&state, "POST", "/api/servicios/", &headers, body) {
        return response;
    }
    Json(json!({"success": true})).into_response()
}

async fn upload_image(
    State(state): State<FakeState>,
    headers: HeaderMap,
    mut multipart: Multipart,
) -> Response {
    let path = "/api/veterinario/actualizar-imagen/";
    if let Err(response) = record(&state, "POST", path, &headers, Value::Null) {
        return response;
    }
    while let Ok(Some(field)) = multipart.next_field().await {
        if field.name() == Some("imagen_perfil") {
            let file_name = field.file_name().unwrap_or("imagen").to_string();
            return Json(json!({
                "success": true,
                "image_url": format!("/media/perfiles/{file_name}"),
            }))
            .into_response();
        }
    }
    Json(json!({"success": false, "error": "No se proporcionó ninguna imagen"})).into_response()
}

async fn update_profile(
    State(state): State<FakeState>,
    headers: HeaderMap,
    mut multipart: Multipart,
) -> Response {
    if let Err(response) = record(&state, "POST", "/veterinario/perfil/actualizar/", &headers, Value::Null) {
        return response;
    }
    let mut fields = HashMap::new();
    while let Ok(Some(field)) = multipart.next_field().await {
        let name = field.name().unwrap_or_default().to_string();
        let value = field.text().await.unwrap_or_default();
        fields.insert(name, value);
    }
    let phone_ok = fields
        .get("telefono")
        .is_some_and(|phone| phone.starts_with("+56"));
    *state.0.profile_fields.lock().unwrap() = fields;

    if !phone_ok {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({"success": false, "error": "Teléfono inválido"})),
        )
            .into_response();
    }
    Json(json!({"success": true})).into_response()
}
