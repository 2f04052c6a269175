use crate::{backend::VetApi, error::ClientError, types::CalendarEvent};
use chrono::NaiveDate;
use std::{
    collections::BTreeSet,
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc,
    },
};
use tokio::sync::watch::{self, Sender};
use tokio_stream::wrappers::WatchStream;
use tracing::{debug, info};

pub const DISABLED_DAY_CLASS: &str = "fc-day-disabled";
pub const HAS_EVENTS_CLASS: &str = "has-events";

/// Owned handle on the availability calendar's event feed.
///
/// Every refetch is numbered when it starts. A feed that resolves after a
/// newer one was already published is dropped, so the calendar always shows
/// the answer to the latest request.
#[derive(Debug, Clone)]
pub struct CalendarHandle {
    sender: Arc<Sender<Vec<CalendarEvent>>>,
    started: Arc<AtomicU64>,
    published: Arc<AtomicU64>,
}

impl Default for CalendarHandle {
    fn default() -> Self {
        let (sender, _) = watch::channel(vec![]);
        Self {
            sender: Arc::new(sender),
            started: Arc::default(),
            published: Arc::default(),
        }
    }
}

impl CalendarHandle {
    pub fn event_stream(&self) -> WatchStream<Vec<CalendarEvent>> {
        WatchStream::new(self.sender.subscribe())
    }

    pub fn events(&self) -> Vec<CalendarEvent> {
        self.sender.borrow().clone()
    }

    pub async fn refetch<A: VetApi>(&self, api: &A) -> Result<usize, ClientError> {
        let generation = self.started.fetch_add(1, Ordering::SeqCst) + 1;
        let events = api.calendar_events().await?;
        let count = events.len();
        self.publish(generation, events);
        Ok(count)
    }

    fn publish(&self, generation: u64, events: Vec<CalendarEvent>) -> bool {
        let latest = self.published.fetch_max(generation, Ordering::SeqCst);
        if latest > generation {
            debug!(generation, latest, "Discarding stale calendar feed");
            return false;
        }
        info!(generation, events = events.len(), "Calendar feed refreshed");
        self.sender.send_replace(events);
        true
    }

    /// Days that carry at least one event, read from the `start` prefix.
    pub fn days_with_events(&self) -> BTreeSet<NaiveDate> {
        self.sender
            .borrow()
            .iter()
            .filter_map(|event| event.start.get(..10)?.parse::<NaiveDate>().ok())
            .collect()
    }

    pub fn day_cell_classes(&self, date: NaiveDate, today: NaiveDate) -> Vec<&'static str> {
        let mut classes = Vec::new();
        if !is_selectable(date, today) {
            classes.push(DISABLED_DAY_CLASS);
        }
        if self.days_with_events().contains(&date) {
            classes.push(HAS_EVENTS_CLASS);
        }
        classes
    }
}

/// Days before today can't be picked.
pub fn is_selectable(date: NaiveDate, today: NaiveDate) -> bool {
    date >= today
}
