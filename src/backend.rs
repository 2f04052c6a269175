use crate::error::ClientError;
use crate::types::{
    ApiResponse, BookingRequest, CalendarEvent, CloneRequest, CustomServiceUpdate, ImageUpload,
    NewSlot, ProfileSubmission, Service, ServiceAction, Slot, TimeWindow,
};
use chrono::NaiveDate;

/// Remote side of the application. Every call is one HTTP request; the
/// server stays the authority over slots, services and profiles.
#[allow(async_fn_in_trait)]
pub trait VetApi: Clone + Send + Sync + 'static {
    async fn slots_for_date(&self, date: NaiveDate) -> Result<Vec<Slot>, ClientError>;
    async fn create_slot(&self, slot: &NewSlot) -> Result<ApiResponse, ClientError>;
    async fn delete_slot(&self, id: i64) -> Result<ApiResponse, ClientError>;
    async fn clone_slot(&self, request: &CloneRequest) -> Result<ApiResponse, ClientError>;
    async fn calendar_events(&self) -> Result<Vec<CalendarEvent>, ClientError>;

    async fn vet_services(&self, vet_id: i64) -> Result<Vec<Service>, ClientError>;
    async fn vet_windows(
        &self,
        vet_id: i64,
        date: NaiveDate,
        service_id: i64,
    ) -> Result<Vec<TimeWindow>, ClientError>;
    async fn book_appointment(&self, request: &BookingRequest) -> Result<ApiResponse, ClientError>;

    async fn manage_service(&self, action: &ServiceAction) -> Result<ApiResponse, ClientError>;
    async fn service_details(&self, service_id: i64) -> Result<Service, ClientError>;
    async fn update_custom_service(
        &self,
        update: &CustomServiceUpdate,
    ) -> Result<ApiResponse, ClientError>;

    async fn upload_profile_image(&self, image: &ImageUpload) -> Result<ApiResponse, ClientError>;
    async fn update_profile(&self, profile: &ProfileSubmission) -> Result<ApiResponse, ClientError>;
}
