pub trait Configuration: Clone + Send + Sync + 'static {
    fn base_url(&self) -> String;
    fn csrf_token(&self) -> String;
    /// Veterinarian whose services and agenda are addressed, if any.
    fn vet_id(&self) -> Option<i64>;
    /// Answer every confirmation with yes.
    fn assume_yes(&self) -> bool;
}
