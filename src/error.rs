use thiserror::Error;

/// Rejection of user input before anything is sent to the server.
///
/// The `Display` text is shown to the user as-is.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Debes seleccionar una fecha")]
    MissingDate,
    #[error("No puedes agregar horarios en fechas pasadas")]
    PastDate,
    #[error("La hora de inicio debe ser posterior a la hora actual")]
    StartBeforeNow,
    #[error("El horario debe tener como mínimo una hora de duración")]
    TooShort,
    #[error("El horario no puede exceder las 12 horas")]
    TooLong,
    #[error("El número debe comenzar con 9 (celular) o 22 (fijo) seguido de 8 o 7 dígitos respectivamente")]
    InvalidPhone,
    #[error("La descripción debe tener al menos 50 caracteres")]
    DescriptionTooShort,
    #[error("El RUT debe tener al menos 7 números")]
    InvalidRut,
    #[error("Por favor seleccione una imagen en formato JPG, PNG o WEBP")]
    UnsupportedImageType,
    #[error("La imagen no debe superar los 5MB")]
    ImageTooLarge,
    #[error("Primero seleccione un servicio")]
    MissingService,
    #[error("El precio debe ser mayor a cero")]
    InvalidPrice,
}

#[derive(Error, Debug)]
pub enum ClientError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("Unexpected status code {0}")]
    Status(u16),
    /// Logical failure reported by the server, message kept verbatim.
    #[error("{0}")]
    Server(String),
    #[error("Malformed response: {0}")]
    Decode(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ClientError {
    /// Text for the error dialog. Server and validation messages are shown
    /// verbatim, everything else collapses into `fallback`.
    pub fn user_message(&self, fallback: &str) -> String {
        match self {
            ClientError::Validation(err) => err.to_string(),
            ClientError::Server(message) => message.clone(),
            _ => fallback.to_string(),
        }
    }
}
