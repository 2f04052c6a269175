use crate::{
    catalog::format_price,
    presenter::{Notice, Presenter},
    types::{Service, Slot, SlotState, TimeWindow},
    validation::format_time,
};
use chrono::NaiveDate;
use std::io::{self, BufRead, Write};
use tracing::debug;

/// Plain stdout/stdin rendition of the dialogs and lists.
#[derive(Debug, Clone)]
pub struct TerminalPresenter {
    assume_yes: bool,
}

impl TerminalPresenter {
    pub fn new(assume_yes: bool) -> Self {
        Self { assume_yes }
    }
}

fn state_label(state: SlotState) -> &'static str {
    match state {
        SlotState::Available => "disponible",
        SlotState::Booked => "reservado",
        SlotState::Expired => "expirado",
        SlotState::Cancelled => "cancelado",
    }
}

pub fn is_affirmative(answer: &str) -> bool {
    matches!(
        answer.trim().to_lowercase().as_str(),
        "s" | "si" | "sí" | "y" | "yes"
    )
}

impl Presenter for TerminalPresenter {
    fn notify(&self, kind: Notice, title: &str, text: &str) {
        let label = match kind {
            Notice::Success => "OK",
            Notice::Error => "ERROR",
            Notice::Warning => "AVISO",
            Notice::Info => "INFO",
        };
        match (kind, text.is_empty()) {
            (Notice::Error, _) => eprintln!("[{label}] {title}: {text}"),
            (_, true) => println!("[{label}] {title}"),
            (_, false) => println!("[{label}] {title}: {text}"),
        }
    }

    fn confirm(&self, title: &str, text: &str) -> bool {
        if self.assume_yes {
            return true;
        }
        print!("{title} {text} [s/N] ");
        if io::stdout().flush().is_err() {
            return false;
        }
        let mut answer = String::new();
        match io::stdin().lock().read_line(&mut answer) {
            Ok(_) => is_affirmative(&answer),
            Err(_) => false,
        }
    }

    fn render_slots(&self, date: NaiveDate, slots: &[Slot]) {
        println!("Horarios del {date}:");
        for slot in slots {
            println!(
                "  #{:<6} {} - {}  {}",
                slot.id,
                format_time(slot.start_time),
                format_time(slot.end_time),
                state_label(slot.state)
            );
        }
    }

    fn render_no_slots(&self, date: NaiveDate) {
        println!("No hay horarios disponibles para el {date}");
    }

    fn render_slots_error(&self, date: NaiveDate) {
        eprintln!("Error al cargar los horarios del {date}");
    }

    fn render_services(&self, services: &[Service]) {
        for service in services {
            let price = service
                .price
                .map(|price| format_price(price.round() as u32))
                .unwrap_or_else(|| "-".into());
            let state = if service.active { "activo" } else { "inactivo" };
            println!(
                "  #{:<6} {:<30} {:<15} {:>10}  {state}",
                service.id, service.name, service.kind, price
            );
        }
    }

    fn render_windows(&self, windows: &[TimeWindow]) {
        if windows.is_empty() {
            println!("No hay horarios disponibles");
        }
        for window in windows {
            println!(
                "  #{:<6} {} - {}",
                window.id,
                format_time(window.start_time),
                format_time(window.end_time)
            );
        }
    }

    fn set_profile_image(&self, url: &str) {
        println!("Imagen de perfil: {url}");
    }

    fn close_modal(&self, modal: &str) {
        debug!(modal, "Modal closed");
    }

    fn reload_page(&self) {
        debug!("Page reload requested");
    }
}
