//! Carousel navigation controller.
//!
//! Computes which window of an ordered list is visible and moves it in
//! response to autoplay ticks, arrow keys, navigation buttons and pointer
//! drags. The controller only ever sees a list length; it never looks at
//! or changes the products it is showing.
//!
//! Invariants after every transition:
//! - `max_index == item_count.saturating_sub(visible_items)`
//! - `current_index <= max_index`
//! - a timer is live iff autoplay is on and `item_count > visible_items`

use crate::timer::{Scheduler, TimerToken};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, trace};

/// Pointer displacement is scaled by this factor while dragging.
pub const DRAG_MULTIPLIER: f64 = 2.0;

/// Autoplay interval used when none is configured, in milliseconds.
pub const DEFAULT_AUTOPLAY_SPEED_MS: u64 = 5000;

/// Responsive width class of the viewport.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewportClass {
    Xs,
    Sm,
    Md,
    #[default]
    Lg,
    Xl,
}

impl ViewportClass {
    /// Classify a width in CSS pixels (breakpoints 600, 900, 1200, 1536).
    pub fn from_width(width: u32) -> Self {
        match width {
            0..=599 => ViewportClass::Xs,
            600..=899 => ViewportClass::Sm,
            900..=1199 => ViewportClass::Md,
            1200..=1535 => ViewportClass::Lg,
            _ => ViewportClass::Xl,
        }
    }

    /// How many items fit side by side.
    pub fn visible_items(self) -> usize {
        match self {
            ViewportClass::Xs => 1,
            ViewportClass::Sm => 2,
            ViewportClass::Md => 3,
            ViewportClass::Lg | ViewportClass::Xl => 4,
        }
    }
}

/// Inputs that decide how the carousel behaves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CarouselConfig {
    pub item_count: usize,
    pub auto_play: bool,
    /// Autoplay interval in milliseconds
    pub auto_play_speed: u64,
}

impl Default for CarouselConfig {
    fn default() -> Self {
        Self {
            item_count: 0,
            auto_play: true,
            auto_play_speed: DEFAULT_AUTOPLAY_SPEED_MS,
        }
    }
}

impl CarouselConfig {
    pub fn new(item_count: usize) -> Self {
        Self {
            item_count,
            ..Self::default()
        }
    }

    pub fn with_auto_play(mut self, auto_play: bool) -> Self {
        self.auto_play = auto_play;
        self
    }

    pub fn with_speed(mut self, ms: u64) -> Self {
        self.auto_play_speed = ms;
        self
    }

    /// The autoplay interval, never shorter than one millisecond.
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.auto_play_speed.max(1))
    }
}

/// Where a drag started.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DragOrigin {
    pub pointer_x: f64,
    pub scroll_offset: f64,
}

/// Everything the presentation layer needs to render the carousel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CarouselState {
    pub item_count: usize,
    pub current_index: usize,
    pub visible_items: usize,
    pub max_index: usize,
    pub viewport: ViewportClass,
    pub is_dragging: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub drag_origin: Option<DragOrigin>,
    /// Rendered scroll position in pixels
    pub scroll_offset: f64,
}

/// Keys the carousel reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    ArrowLeft,
    ArrowRight,
    Other,
}

impl Key {
    /// Map a DOM-style key name.
    pub fn from_name(name: &str) -> Self {
        match name {
            "ArrowLeft" | "Left" | "left" => Key::ArrowLeft,
            "ArrowRight" | "Right" | "right" => Key::ArrowRight,
            _ => Key::Other,
        }
    }
}

/// Input events, as delivered by a host that talks JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CarouselEvent {
    Next,
    Prev,
    StartDrag {
        #[serde(rename = "pointerX")]
        pointer_x: f64,
    },
    MoveDrag {
        #[serde(rename = "pointerX")]
        pointer_x: f64,
    },
    EndDrag,
    Key {
        key: String,
    },
    Configure(CarouselConfig),
    Viewport {
        width: u32,
    },
    Settle {
        index: usize,
    },
    Scroll {
        offset: f64,
    },
}

// The values a live timer was started for. Any change means cancel and
// start again.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct TimerInputs {
    auto_play: bool,
    speed: u64,
    item_count: usize,
    visible_items: usize,
}

#[derive(Debug, Clone, Copy)]
struct LiveTimer {
    token: TimerToken,
    inputs: TimerInputs,
}

/// The carousel state machine.
pub struct CarouselController<S: Scheduler> {
    config: CarouselConfig,
    state: CarouselState,
    scheduler: S,
    timer: Option<LiveTimer>,
}

impl<S: Scheduler> CarouselController<S> {
    /// Controller over `config` at the given viewport. Starts autoplay if
    /// the configuration calls for it.
    pub fn new(config: CarouselConfig, viewport: ViewportClass, scheduler: S) -> Self {
        let mut controller = Self {
            config,
            state: CarouselState {
                item_count: config.item_count,
                current_index: 0,
                visible_items: viewport.visible_items(),
                max_index: 0,
                viewport,
                is_dragging: false,
                drag_origin: None,
                scroll_offset: 0.0,
            },
            scheduler,
            timer: None,
        };
        controller.reclamp();
        controller.sync_timer();
        controller
    }

    pub fn state(&self) -> &CarouselState {
        &self.state
    }

    /// Owned copy of the state for rendering.
    pub fn snapshot(&self) -> CarouselState {
        self.state.clone()
    }

    pub fn config(&self) -> &CarouselConfig {
        &self.config
    }

    pub fn current_index(&self) -> usize {
        self.state.current_index
    }

    pub fn visible_items(&self) -> usize {
        self.state.visible_items
    }

    pub fn max_index(&self) -> usize {
        self.state.max_index
    }

    pub fn is_dragging(&self) -> bool {
        self.state.is_dragging
    }

    pub fn scheduler(&self) -> &S {
        &self.scheduler
    }

    pub fn scheduler_mut(&mut self) -> &mut S {
        &mut self.scheduler
    }

    /// Token of the live autoplay timer, if any.
    pub fn timer_token(&self) -> Option<TimerToken> {
        self.timer.map(|t| t.token)
    }

    // Rendering helpers

    /// Whether a "previous" control should be shown.
    pub fn can_prev(&self) -> bool {
        self.state.current_index > 0
    }

    /// Whether a "next" control should be shown.
    pub fn can_next(&self) -> bool {
        self.state.current_index < self.state.max_index
    }

    /// Indices of the items currently in view.
    pub fn visible_range(&self) -> std::ops::Range<usize> {
        let start = self.state.current_index.min(self.state.item_count);
        let end = (start + self.state.visible_items).min(self.state.item_count);
        start..end
    }

    /// Horizontal translation of the track, in percent of its width.
    pub fn translate_percent(&self) -> f64 {
        self.state.current_index as f64 * (100.0 / self.state.visible_items as f64)
    }

    // Navigation

    /// Move one item forward, stopping at the last window.
    pub fn next(&mut self) {
        self.state.current_index = (self.state.current_index + 1).min(self.state.max_index);
        trace!(index = self.state.current_index, "Carousel next");
    }

    /// Move one item back, stopping at the first window.
    pub fn prev(&mut self) {
        self.state.current_index = self.state.current_index.saturating_sub(1);
        trace!(index = self.state.current_index, "Carousel prev");
    }

    pub fn on_key(&mut self, key: Key) {
        match key {
            Key::ArrowLeft => self.prev(),
            Key::ArrowRight => self.next(),
            Key::Other => {}
        }
    }

    /// Commit a window position chosen by the host, e.g. after a drag.
    pub fn settle(&mut self, index: usize) {
        self.state.current_index = index.min(self.state.max_index);
    }

    // Drag scrubbing

    pub fn start_drag(&mut self, pointer_x: f64) {
        self.state.is_dragging = true;
        self.state.drag_origin = Some(DragOrigin {
            pointer_x,
            scroll_offset: self.state.scroll_offset,
        });
    }

    /// Scrub while dragging. Returns the new scroll offset, or `None` when
    /// no drag is in progress.
    pub fn move_drag(&mut self, pointer_x: f64) -> Option<f64> {
        if !self.state.is_dragging {
            return None;
        }
        let origin = self.state.drag_origin?;
        let walk = (pointer_x - origin.pointer_x) * DRAG_MULTIPLIER;
        self.state.scroll_offset = clamp_offset(origin.scroll_offset - walk);
        Some(self.state.scroll_offset)
    }

    pub fn end_drag(&mut self) {
        self.state.is_dragging = false;
        self.state.drag_origin = None;
    }

    /// Record a scroll position reported by the host.
    pub fn set_scroll_offset(&mut self, offset: f64) {
        self.state.scroll_offset = clamp_offset(offset);
    }

    // Configuration

    /// Replace the configuration, re-clamping the window and restarting the
    /// autoplay timer if any of its inputs changed.
    pub fn configure(&mut self, config: CarouselConfig) {
        self.config = config;
        self.state.item_count = config.item_count;
        self.reclamp();
        self.sync_timer();
    }

    pub fn set_item_count(&mut self, item_count: usize) {
        self.configure(CarouselConfig {
            item_count,
            ..self.config
        });
    }

    pub fn set_auto_play(&mut self, auto_play: bool) {
        self.configure(CarouselConfig {
            auto_play,
            ..self.config
        });
    }

    pub fn set_viewport(&mut self, viewport: ViewportClass) {
        self.state.viewport = viewport;
        self.state.visible_items = viewport.visible_items();
        self.reclamp();
        self.sync_timer();
    }

    pub fn set_viewport_width(&mut self, width: u32) {
        self.set_viewport(ViewportClass::from_width(width));
    }

    // Autoplay

    /// Deliver a timer firing. Returns whether it moved the window; firings
    /// from cancelled timers are ignored.
    pub fn on_timer(&mut self, token: TimerToken) -> bool {
        match self.timer {
            Some(live) if live.token == token => {
                self.state.current_index = if self.state.current_index >= self.state.max_index {
                    0
                } else {
                    self.state.current_index + 1
                };
                trace!(index = self.state.current_index, "Carousel autoplay");
                true
            }
            _ => {
                debug!(%token, "Ignoring tick from stale timer");
                false
            }
        }
    }

    /// Apply a JSON-level event.
    pub fn handle(&mut self, event: CarouselEvent) {
        match event {
            CarouselEvent::Next => self.next(),
            CarouselEvent::Prev => self.prev(),
            CarouselEvent::StartDrag { pointer_x } => self.start_drag(pointer_x),
            CarouselEvent::MoveDrag { pointer_x } => {
                self.move_drag(pointer_x);
            }
            CarouselEvent::EndDrag => self.end_drag(),
            CarouselEvent::Key { key } => self.on_key(Key::from_name(&key)),
            CarouselEvent::Configure(config) => self.configure(config),
            CarouselEvent::Viewport { width } => self.set_viewport_width(width),
            CarouselEvent::Settle { index } => self.settle(index),
            CarouselEvent::Scroll { offset } => self.set_scroll_offset(offset),
        }
    }

    /// Stop autoplay for good. Also runs on drop.
    pub fn teardown(&mut self) {
        if let Some(live) = self.timer.take() {
            self.scheduler.cancel(live.token);
            debug!(token = %live.token, "Carousel timer cancelled on teardown");
        }
    }

    fn reclamp(&mut self) {
        self.state.max_index = self
            .state
            .item_count
            .saturating_sub(self.state.visible_items);
        self.state.current_index = self.state.current_index.min(self.state.max_index);
    }

    fn sync_timer(&mut self) {
        let inputs = TimerInputs {
            auto_play: self.config.auto_play,
            speed: self.config.auto_play_speed,
            item_count: self.state.item_count,
            visible_items: self.state.visible_items,
        };

        if self.timer.is_some_and(|live| live.inputs == inputs) {
            return;
        }

        if let Some(live) = self.timer.take() {
            self.scheduler.cancel(live.token);
        }

        if inputs.auto_play && inputs.item_count > inputs.visible_items {
            let token = self.scheduler.start(self.config.interval());
            debug!(%token, interval_ms = self.config.interval().as_millis() as u64, "Carousel timer started");
            self.timer = Some(LiveTimer { token, inputs });
        }
    }
}

impl<S: Scheduler> Drop for CarouselController<S> {
    fn drop(&mut self) {
        self.teardown();
    }
}

fn clamp_offset(offset: f64) -> f64 {
    if offset.is_nan() {
        0.0
    } else {
        offset.max(0.0)
    }
}
