use crate::{
    error::{ClientError, ValidationError},
    validation::MAX_IMAGE_BYTES,
};
use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Deserializer, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SlotState {
    #[default]
    #[serde(rename = "disponible")]
    Available,
    #[serde(rename = "reservado")]
    Booked,
    #[serde(rename = "expirado")]
    Expired,
    #[serde(rename = "cancelado")]
    Cancelled,
}

/// Bookable window of a veterinarian on one day, as returned by the server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Slot {
    pub id: i64,
    #[serde(rename = "fecha", default, skip_serializing_if = "Option::is_none")]
    pub date: Option<NaiveDate>,
    #[serde(rename = "horario_inicio", alias = "HorarioInicio", with = "wire_time")]
    pub start_time: NaiveTime,
    #[serde(rename = "horario_fin", alias = "HorarioFin", with = "wire_time")]
    pub end_time: NaiveTime,
    #[serde(rename = "estado", default)]
    pub state: SlotState,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewSlot {
    #[serde(rename = "fecha")]
    pub date: NaiveDate,
    #[serde(rename = "horario_inicio", with = "wire_time")]
    pub start_time: NaiveTime,
    #[serde(rename = "horario_fin", with = "wire_time")]
    pub end_time: NaiveTime,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CloneKind {
    #[serde(rename = "siguiente")]
    NextDay,
    #[serde(rename = "semana")]
    NextWeek,
    #[serde(rename = "especifico")]
    SpecificDate,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CloneRequest {
    #[serde(rename = "horario_id")]
    pub slot_id: i64,
    #[serde(rename = "tipo_clon")]
    pub kind: CloneKind,
    #[serde(rename = "fecha_destino", default, skip_serializing_if = "Option::is_none")]
    pub target_date: Option<NaiveDate>,
}

/// Generic `{success, message?, error?}` acknowledgement of a mutating call.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ApiResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub success: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

impl ApiResponse {
    pub fn ok() -> Self {
        Self {
            success: Some(true),
            ..Self::default()
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            success: Some(false),
            error: Some(error.into()),
            ..Self::default()
        }
    }

    /// A missing `success` flag counts as success; only an explicit `false`
    /// is a server-reported failure.
    pub fn into_result(self) -> Result<Self, ClientError> {
        match self.success {
            Some(false) => Err(ClientError::Server(
                self.error
                    .unwrap_or_else(|| "La operación no pudo completarse".into()),
            )),
            _ => Ok(self),
        }
    }
}

/// Entry of the calendar widget's event feed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalendarEvent {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<serde_json::Value>,
    #[serde(default)]
    pub title: String,
    pub start: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Service {
    pub id: i64,
    #[serde(rename = "nombre")]
    pub name: String,
    #[serde(rename = "tipo", default)]
    pub kind: String,
    #[serde(
        rename = "precio",
        default,
        deserialize_with = "lenient_price",
        skip_serializing_if = "Option::is_none"
    )]
    pub price: Option<f64>,
    #[serde(rename = "esta_activo", default = "active_by_default")]
    pub active: bool,
}

fn active_by_default() -> bool {
    true
}

/// Open window of a veterinarian as offered to pet owners.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeWindow {
    pub id: i64,
    #[serde(rename = "hora_inicio", with = "wire_time")]
    pub start_time: NaiveTime,
    #[serde(rename = "hora_fin", with = "wire_time")]
    pub end_time: NaiveTime,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookingRequest {
    #[serde(rename = "veterinario_id")]
    pub vet_id: i64,
    #[serde(rename = "servicio_id")]
    pub service_id: i64,
    #[serde(rename = "fecha")]
    pub date: NaiveDate,
    #[serde(rename = "horario_id")]
    pub window_id: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "accion")]
pub enum ServiceAction {
    #[serde(rename = "crear")]
    Create {
        #[serde(rename = "nombre")]
        name: String,
        #[serde(rename = "tipo")]
        kind: String,
    },
    #[serde(rename = "editar")]
    Edit {
        #[serde(rename = "servicio_id")]
        service_id: i64,
        #[serde(rename = "nombre")]
        name: String,
        #[serde(rename = "tipo")]
        kind: String,
    },
    #[serde(rename = "toggle_estado")]
    ToggleState {
        #[serde(rename = "servicio_id")]
        service_id: i64,
        #[serde(rename = "estado")]
        active: bool,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomServiceUpdate {
    #[serde(rename = "servicio_id")]
    pub service_id: i64,
    #[serde(rename = "precio")]
    pub price: f64,
    #[serde(rename = "esta_activo", default, skip_serializing_if = "Option::is_none")]
    pub active: Option<bool>,
    #[serde(rename = "notas", default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// Profile fields sent as multipart form data, phone already normalized.
#[derive(Debug, Clone, PartialEq)]
pub struct ProfileSubmission {
    pub phone: String,
    pub description: String,
    pub active: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ImageUpload {
    pub file_name: String,
    pub mime: String,
    pub bytes: Vec<u8>,
}

impl ImageUpload {
    /// Reads the file at `path`. Files over the upload limit are rejected
    /// before their contents are read.
    pub fn from_path(path: &Path) -> Result<Self, ClientError> {
        if std::fs::metadata(path)?.len() > MAX_IMAGE_BYTES as u64 {
            return Err(ValidationError::ImageTooLarge.into());
        }
        let bytes = std::fs::read(path)?;
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "imagen".into());
        let extension = path
            .extension()
            .map(|ext| ext.to_string_lossy().to_lowercase())
            .unwrap_or_default();
        let mime = match extension.as_str() {
            "jpg" | "jpeg" => "image/jpeg",
            "png" => "image/png",
            "webp" => "image/webp",
            "gif" => "image/gif",
            _ => "application/octet-stream",
        };
        Ok(Self {
            file_name,
            mime: mime.into(),
            bytes,
        })
    }
}

pub fn parse_time(raw: &str) -> Result<NaiveTime, chrono::ParseError> {
    NaiveTime::parse_from_str(raw, "%H:%M:%S%.f").or_else(|_| NaiveTime::parse_from_str(raw, "%H:%M"))
}

fn lenient_price<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Number(f64),
        Text(String),
    }

    match Option::<Raw>::deserialize(deserializer)? {
        None => Ok(None),
        Some(Raw::Number(value)) => Ok(Some(value)),
        Some(Raw::Text(text)) => text
            .trim()
            .parse::<f64>()
            .map(Some)
            .map_err(serde::de::Error::custom),
    }
}

/// Times travel as `HH:MM`; the server may answer with seconds attached.
mod wire_time {
    use chrono::NaiveTime;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(time: &NaiveTime, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&time.format("%H:%M").to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveTime, D::Error> {
        let raw = String::deserialize(deserializer)?;
        super::parse_time(&raw).map_err(serde::de::Error::custom)
    }
}
