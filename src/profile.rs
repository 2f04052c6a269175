use crate::{
    backend::VetApi,
    error::{ClientError, ValidationError},
    presenter::{Notice, Presenter},
    types::{ApiResponse, ImageUpload, ProfileSubmission},
    validation::{description_rule, first_failure, normalize_phone, phone_rule, validate_image},
};
use tracing::{error, info};
use validator::Validate;

pub const PROFILE_MODAL: &str = "editProfileModal";

/// Values of the profile edit form, phone without country code.
#[derive(Debug, Clone, PartialEq, Validate)]
pub struct ProfileForm {
    #[validate(custom(function = "phone_rule"))]
    pub phone: String,
    #[validate(custom(function = "description_rule"))]
    pub description: String,
    pub active: bool,
}

impl ProfileForm {
    /// Phone first, then description, the order the form reports them in.
    pub fn check(&self) -> Result<(), ValidationError> {
        match self.validate() {
            Ok(()) => Ok(()),
            Err(errors) => match first_failure(&errors, &["phone", "description"]) {
                Some(err) => Err(err),
                None => Ok(()),
            },
        }
    }

    pub fn to_submission(&self) -> Result<ProfileSubmission, ValidationError> {
        self.check()?;
        Ok(ProfileSubmission {
            phone: normalize_phone(&self.phone)?,
            description: self.description.trim().to_string(),
            active: self.active,
        })
    }
}

pub struct ProfileController<A: VetApi, P: Presenter> {
    api: A,
    presenter: P,
}

impl<A: VetApi, P: Presenter> ProfileController<A, P> {
    pub fn new(api: A, presenter: P) -> Self {
        Self { api, presenter }
    }

    pub async fn submit_profile(&self, form: &ProfileForm) -> Result<(), ClientError> {
        let submission = match form.to_submission() {
            Ok(submission) => submission,
            Err(err) => {
                self.presenter
                    .notify(Notice::Error, "Error", &err.to_string());
                return Err(err.into());
            }
        };

        match self
            .api
            .update_profile(&submission)
            .await
            .and_then(ApiResponse::into_result)
        {
            Ok(response) => {
                info!(phone = %submission.phone, active = submission.active, "Profile updated");
                let text = response
                    .message
                    .unwrap_or_else(|| "Perfil actualizado correctamente".into());
                self.presenter.notify(Notice::Success, "¡Éxito!", &text);
                self.presenter.close_modal(PROFILE_MODAL);
                self.presenter.reload_page();
                Ok(())
            }
            Err(err) => {
                error!(?err, "Failed to update profile");
                self.presenter.notify(
                    Notice::Error,
                    "Error",
                    &err.user_message("Error al actualizar el perfil"),
                );
                Err(err)
            }
        }
    }

    /// Returns the URL of the new image.
    pub async fn upload_image(&self, image: &ImageUpload) -> Result<String, ClientError> {
        if let Err(err) = validate_image(&image.mime, image.bytes.len()) {
            self.presenter
                .notify(Notice::Error, "Error", &err.to_string());
            return Err(err.into());
        }

        let result = self
            .api
            .upload_profile_image(image)
            .await
            .and_then(ApiResponse::into_result)
            .and_then(|response| {
                response
                    .image_url
                    .ok_or_else(|| ClientError::Decode("missing image_url".into()))
            });
        match result {
            Ok(url) => {
                info!(file = %image.file_name, %url, "Profile image replaced");
                self.presenter.set_profile_image(&url);
                self.presenter.notify(
                    Notice::Success,
                    "¡Éxito!",
                    "Imagen de perfil actualizada",
                );
                Ok(url)
            }
            Err(err) => {
                error!(?err, file = %image.file_name, "Failed to upload profile image");
                self.presenter.notify(
                    Notice::Error,
                    "Error",
                    &err.user_message("Error al actualizar la imagen"),
                );
                Err(err)
            }
        }
    }

    /// Asks before flipping the "active" switch. Returns the state the switch
    /// ends up in.
    pub fn confirm_active_toggle(&self, requested: bool) -> bool {
        let text = if requested {
            "¿Estás seguro de que quieres activar tu perfil? Aparecerás en las búsquedas de veterinarios."
        } else {
            "¿Estás seguro de que quieres desactivar tu perfil? Ya no aparecerás en las búsquedas de veterinarios."
        };
        if self.presenter.confirm("¿Estás seguro?", text) {
            requested
        } else {
            !requested
        }
    }
}
