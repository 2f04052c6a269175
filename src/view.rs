use std::{
    collections::{HashMap, HashSet},
    hash::Hash,
    time::Duration,
};

use tokio::{
    sync::watch::{self, Sender},
    time::{interval_at, Instant, MissedTickBehavior},
};
use tokio_stream::wrappers::WatchStream;
use tracing::debug;

/// Share of an element that has to be on screen before it is revealed.
pub const REVEAL_THRESHOLD: f64 = 0.1;
pub const CAROUSEL_INTERVAL: Duration = Duration::from_millis(5000);
/// Scroll offset below which the navbar always stays visible.
pub const NAVBAR_HIDE_OFFSET: f64 = 100.0;

/// One-shot "visible" marking of animated elements.
#[derive(Debug)]
pub struct RevealTracker<K> {
    observed: HashSet<K>,
    revealed: HashSet<K>,
}

impl<K> Default for RevealTracker<K> {
    fn default() -> Self {
        Self {
            observed: HashSet::new(),
            revealed: HashSet::new(),
        }
    }
}

impl<K: Eq + Hash + Clone> RevealTracker<K> {
    pub fn observe(&mut self, element: K) {
        if !self.revealed.contains(&element) {
            self.observed.insert(element);
        }
    }

    /// Returns true when this report revealed the element. Once revealed an
    /// element is no longer observed.
    pub fn on_intersection(&mut self, element: &K, ratio: f64) -> bool {
        if ratio < REVEAL_THRESHOLD || !self.observed.remove(element) {
            return false;
        }
        self.revealed.insert(element.clone());
        true
    }

    pub fn is_visible(&self, element: &K) -> bool {
        self.revealed.contains(element)
    }

    pub fn observed(&self) -> usize {
        self.observed.len()
    }
}

/// Images whose real source sits in `data-src` until they scroll into view.
#[derive(Debug)]
pub struct LazyImages<K> {
    pending: HashMap<K, String>,
}

impl<K> Default for LazyImages<K> {
    fn default() -> Self {
        Self {
            pending: HashMap::new(),
        }
    }
}

impl<K: Eq + Hash> LazyImages<K> {
    pub fn register(&mut self, image: K, data_src: impl Into<String>) {
        self.pending.insert(image, data_src.into());
    }

    /// The source to load, handed out exactly once per image.
    pub fn on_intersection(&mut self, image: &K, is_intersecting: bool) -> Option<String> {
        if !is_intersecting {
            return None;
        }
        self.pending.remove(image)
    }

    pub fn pending(&self) -> usize {
        self.pending.len()
    }
}

/// Auto-rotating hero carousel, paused while the pointer is over it.
#[derive(Debug)]
pub struct Carousel {
    slide_count: usize,
    active: Sender<usize>,
    hovered: Sender<bool>,
}

impl Carousel {
    pub fn new(slide_count: usize) -> Self {
        let (active, _) = watch::channel(0);
        let (hovered, _) = watch::channel(false);
        Self {
            slide_count,
            active,
            hovered,
        }
    }

    pub fn active(&self) -> usize {
        *self.active.borrow()
    }

    pub fn slide_stream(&self) -> WatchStream<usize> {
        WatchStream::new(self.active.subscribe())
    }

    pub fn set_hovered(&self, hovered: bool) {
        self.hovered.send_replace(hovered);
    }

    pub fn advance(&self) -> usize {
        if self.slide_count == 0 {
            return 0;
        }
        let next = (self.active() + 1) % self.slide_count;
        self.active.send_replace(next);
        debug!(slide = next, "Carousel advanced");
        next
    }

    /// Rotates every `period` until the task is dropped. Leaving the carousel
    /// restarts the full period.
    pub async fn run(&self, period: Duration) {
        let mut hovered = self.hovered.subscribe();
        let mut ticker = interval_at(Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    if !*hovered.borrow() {
                        self.advance();
                    }
                }
                changed = hovered.changed() => {
                    if changed.is_err() {
                        return;
                    }
                    if !*hovered.borrow_and_update() {
                        ticker.reset();
                    }
                }
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavbarPosition {
    Shown,
    Hidden,
}

#[derive(Debug, Default)]
pub struct NavbarScroll {
    last_offset: f64,
}

impl NavbarScroll {
    /// Hidden while scrolling down past the offset, shown on any upward scroll.
    pub fn on_scroll(&mut self, offset: f64) -> NavbarPosition {
        let position = if offset > self.last_offset && offset > NAVBAR_HIDE_OFFSET {
            NavbarPosition::Hidden
        } else {
            NavbarPosition::Shown
        };
        self.last_offset = offset;
        position
    }
}

#[derive(Debug, Default)]
pub struct MobileMenu {
    open: bool,
}

impl MobileMenu {
    /// Toggler click; returns whether the menu is now open.
    pub fn toggle(&mut self) -> bool {
        self.open = !self.open;
        self.open
    }

    pub fn is_open(&self) -> bool {
        self.open
    }
}
