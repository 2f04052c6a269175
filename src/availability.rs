use crate::{
    backend::VetApi,
    batch::{run_sequential, BatchReport},
    calendar::CalendarHandle,
    error::{ClientError, ValidationError},
    presenter::{Notice, Presenter},
    types::{ApiResponse, CloneKind, CloneRequest, NewSlot, Slot},
    validation::{validate_selectable_date, validate_slot_window},
};
use chrono::{Local, NaiveDate, NaiveTime};
use tracing::{error, info};

/// Values of the "new slot" form.
#[derive(Debug, Clone, PartialEq)]
pub struct SlotForm {
    pub date: Option<NaiveDate>,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloneTarget {
    NextDay,
    NextWeek,
    SpecificDate(NaiveDate),
}

impl CloneTarget {
    fn kind(&self) -> CloneKind {
        match self {
            CloneTarget::NextDay => CloneKind::NextDay,
            CloneTarget::NextWeek => CloneKind::NextWeek,
            CloneTarget::SpecificDate(_) => CloneKind::SpecificDate,
        }
    }

    fn target_date(&self) -> Option<NaiveDate> {
        match self {
            CloneTarget::SpecificDate(date) => Some(*date),
            _ => None,
        }
    }

    fn success_text(&self) -> &'static str {
        match self {
            CloneTarget::NextDay => "Horarios clonados al siguiente día",
            CloneTarget::NextWeek => "Horarios clonados a la semana",
            CloneTarget::SpecificDate(_) => "Horarios clonados correctamente",
        }
    }
}

/// Drives the availability page: day selection, slot creation, deletion and
/// the bulk clone / clear operations.
pub struct AvailabilityController<A: VetApi, P: Presenter> {
    api: A,
    presenter: P,
    calendar: CalendarHandle,
    selected_date: Option<NaiveDate>,
}

impl<A: VetApi, P: Presenter> AvailabilityController<A, P> {
    pub fn new(api: A, presenter: P, calendar: CalendarHandle) -> Self {
        Self {
            api,
            presenter,
            calendar,
            selected_date: None,
        }
    }

    pub fn selected_date(&self) -> Option<NaiveDate> {
        self.selected_date
    }

    pub fn calendar(&self) -> &CalendarHandle {
        &self.calendar
    }

    fn today() -> NaiveDate {
        Local::now().date_naive()
    }

    fn reject(&self, err: ValidationError) -> ClientError {
        self.presenter
            .notify(Notice::Error, "Error", &err.to_string());
        err.into()
    }

    /// Calendar click on a day.
    pub async fn select_date(&mut self, date: NaiveDate) -> Result<Vec<Slot>, ClientError> {
        if let Err(err) = validate_selectable_date(date, Self::today()) {
            return Err(self.reject(err));
        }
        self.selected_date = Some(date);
        self.load_day(date).await
    }

    /// Fetches and renders the slots of `date`.
    pub async fn load_day(&self, date: NaiveDate) -> Result<Vec<Slot>, ClientError> {
        match self.api.slots_for_date(date).await {
            Ok(slots) => {
                if slots.is_empty() {
                    self.presenter.render_no_slots(date);
                } else {
                    self.presenter.render_slots(date, &slots);
                }
                Ok(slots)
            }
            Err(err) => {
                error!(?err, %date, "Failed to load slots");
                self.presenter.render_slots_error(date);
                Err(err)
            }
        }
    }

    async fn refresh_calendar(&self) {
        if let Err(err) = self.calendar.refetch(&self.api).await {
            error!(?err, "Failed to refresh calendar events");
        }
    }

    /// After a mutation both the day list and the calendar are reloaded.
    async fn refresh(&self, date: NaiveDate) {
        // load failures are already rendered into the list
        let _ = self.load_day(date).await;
        self.refresh_calendar().await;
    }

    pub async fn submit_slot(&mut self, form: SlotForm) -> Result<(), ClientError> {
        let now = Local::now().naive_local();
        if let Err(err) = validate_slot_window(form.date, form.start_time, form.end_time, now) {
            return Err(self.reject(err));
        }
        let date = form.date.ok_or(ValidationError::MissingDate)?;

        let new_slot = NewSlot {
            date,
            start_time: form.start_time,
            end_time: form.end_time,
        };
        match self
            .api
            .create_slot(&new_slot)
            .await
            .and_then(ApiResponse::into_result)
        {
            Ok(_) => {
                info!(%date, start = %form.start_time, end = %form.end_time, "Slot created");
                self.presenter.notify(
                    Notice::Success,
                    "¡Éxito!",
                    "Horario guardado correctamente",
                );
                self.selected_date = Some(date);
                self.refresh(date).await;
                Ok(())
            }
            Err(err) => {
                error!(?err, "Failed to create slot");
                self.presenter.notify(
                    Notice::Error,
                    "Error",
                    &err.user_message("Error al guardar el horario"),
                );
                Err(err)
            }
        }
    }

    /// Returns `Ok(false)` when the user backed out of the confirmation.
    pub async fn delete_slot(&self, id: i64, date: NaiveDate) -> Result<bool, ClientError> {
        if !self
            .presenter
            .confirm("¿Eliminar horario?", "Esta acción no se puede deshacer")
        {
            return Ok(false);
        }

        match self
            .api
            .delete_slot(id)
            .await
            .and_then(ApiResponse::into_result)
        {
            Ok(_) => {
                info!(id, "Slot deleted");
                self.presenter.notify(
                    Notice::Success,
                    "Eliminado",
                    "El horario ha sido eliminado",
                );
                self.refresh(date).await;
                Ok(true)
            }
            Err(err) => {
                error!(?err, id, "Failed to delete slot");
                self.presenter.notify(
                    Notice::Error,
                    "Error",
                    &err.user_message("Error al eliminar"),
                );
                Err(err)
            }
        }
    }

    async fn slots_to_process(&self, date: NaiveDate) -> Result<Vec<Slot>, ClientError> {
        self.api.slots_for_date(date).await.map_err(|err| {
            error!(?err, %date, "Failed to load slots for bulk operation");
            self.presenter.notify(
                Notice::Error,
                "Error",
                &err.user_message("Error al obtener los horarios"),
            );
            err
        })
    }

    fn report_batch(&self, report: &BatchReport<i64>, done: &str, verb: &str) {
        if report.is_complete() {
            self.presenter.notify(Notice::Success, "¡Éxito!", done);
        } else if report.is_partial() {
            let text = format!(
                "Se {verb} {} de {} horarios. Fallaron: {}",
                report.succeeded.len(),
                report.total(),
                report
                    .failed
                    .iter()
                    .map(|(id, _)| id.to_string())
                    .collect::<Vec<_>>()
                    .join(", ")
            );
            self.presenter
                .notify(Notice::Warning, "Operación incompleta", &text);
        } else {
            self.presenter.notify(
                Notice::Error,
                "Error",
                "No se pudo completar la operación para ningún horario",
            );
        }
    }

    /// Copies every slot of `date` to the day picked by `target`, one request
    /// per slot. `Ok(None)` means there was nothing to clone.
    pub async fn clone_day(
        &self,
        date: NaiveDate,
        target: CloneTarget,
    ) -> Result<Option<BatchReport<i64>>, ClientError> {
        if let Some(target_date) = target.target_date() {
            if let Err(err) = validate_selectable_date(target_date, Self::today()) {
                return Err(self.reject(err));
            }
        }

        let slots = self.slots_to_process(date).await?;
        if slots.is_empty() {
            self.presenter.notify(
                Notice::Warning,
                "Error",
                "No hay horarios para clonar en este día",
            );
            return Ok(None);
        }

        let api = &self.api;
        let report = run_sequential(
            "clone",
            &slots,
            |slot| slot.id,
            |slot| {
                let request = CloneRequest {
                    slot_id: slot.id,
                    kind: target.kind(),
                    target_date: target.target_date(),
                };
                async move {
                    api.clone_slot(&request)
                        .await
                        .and_then(ApiResponse::into_result)
                        .map(|_| ())
                }
            },
        )
        .await;

        self.report_batch(&report, target.success_text(), "clonaron");
        self.refresh_calendar().await;
        Ok(Some(report))
    }

    /// Deletes every slot of `date` after one confirmation. `Ok(None)` when
    /// there was nothing to delete or the user cancelled.
    pub async fn clear_day(&self, date: NaiveDate) -> Result<Option<BatchReport<i64>>, ClientError> {
        let slots = self.slots_to_process(date).await?;
        if slots.is_empty() {
            self.presenter.notify(
                Notice::Info,
                "Info",
                "No hay horarios para eliminar en este día",
            );
            return Ok(None);
        }

        let question = format!(
            "Se eliminarán {} horarios del día {date}. Esta acción no se puede deshacer.",
            slots.len()
        );
        if !self
            .presenter
            .confirm("¿Eliminar todos los horarios?", &question)
        {
            return Ok(None);
        }

        let api = &self.api;
        let report = run_sequential(
            "clear",
            &slots,
            |slot| slot.id,
            |slot| {
                let id = slot.id;
                async move {
                    api.delete_slot(id)
                        .await
                        .and_then(ApiResponse::into_result)
                        .map(|_| ())
                }
            },
        )
        .await;

        self.report_batch(
            &report,
            "Todos los horarios han sido eliminados",
            "eliminaron",
        );
        self.refresh(date).await;
        Ok(Some(report))
    }
}
