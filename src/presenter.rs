use crate::types::{Service, Slot, TimeWindow};
use chrono::NaiveDate;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Notice {
    Success,
    Error,
    Warning,
    Info,
}

/// Everything the controllers need from the user interface: dialogs,
/// confirmations and the few regions they re-render.
#[cfg_attr(test, mockall::automock)]
pub trait Presenter {
    fn notify(&self, kind: Notice, title: &str, text: &str);
    /// Blocks until the user accepted or dismissed the question.
    fn confirm(&self, title: &str, text: &str) -> bool;

    fn render_slots(&self, date: NaiveDate, slots: &[Slot]);
    fn render_no_slots(&self, date: NaiveDate);
    fn render_slots_error(&self, date: NaiveDate);

    fn render_services(&self, services: &[Service]);
    fn render_windows(&self, windows: &[TimeWindow]);

    fn set_profile_image(&self, url: &str);
    fn close_modal(&self, modal: &str);
    fn reload_page(&self);
}
