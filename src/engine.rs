//! The annotation interaction engine.
//!
//! Owns the rectangle store, the select/place state machine and the pending
//! placement. Input arrives as screen-space pointer positions plus a
//! [`ScreenToWorld`] mapping supplied by whatever draws the canvas, so the
//! engine itself never knows about pan or zoom.

use std::path::PathBuf;
use std::time::Instant;

use crate::config::AnnotatorConfig;
use crate::geometry::{normalize_rect, Point, Rect};
use crate::gesture::{Gesture, GestureClassifier};
use crate::payload::{Detection, DetectionPayload};
use crate::stats::{AreaGate, AreaStatistics};
use crate::store::{RectId, RectangleStore};
use crate::warning::WarningBanner;

/// Maps a viewport position to image coordinates under the current pan/zoom.
pub trait ScreenToWorld {
    fn to_world(&self, screen: Point) -> Point;
}

/// Screen and world coincide. Handy for tests and unscaled canvases.
#[derive(Clone, Copy, Debug, Default)]
pub struct Identity;

impl ScreenToWorld for Identity {
    fn to_world(&self, screen: Point) -> Point {
        screen
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum InteractionMode {
    Select,
    /// `pending` is the first corner once it has been clicked.
    Place { pending: Option<Point> },
}

impl InteractionMode {
    pub fn is_place(&self) -> bool {
        matches!(self, Self::Place { .. })
    }

    pub fn pending(&self) -> Option<Point> {
        match *self {
            Self::Place { pending } => pending,
            Self::Select => None,
        }
    }
}

/// Keyboard input after key-binding resolution.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum KeyCommand {
    EnterPlace,
    EnterSelect,
    Delete,
    Other,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum CornerOutcome {
    FirstCorner,
    Added(RectId),
    Rejected { area: f32 },
    /// Not in place mode.
    Ignored,
}

/// Notifications for the presentation layer, drained with
/// [`AnnotationEngine::drain_events`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum EngineEvent {
    CountChanged(usize),
    AreaRejected { area: f32 },
}

pub struct AnnotationEngine {
    store: RectangleStore,
    stats: Option<AreaStatistics>,
    gate: AreaGate,
    mode: InteractionMode,
    preview: Option<Rect>,
    gesture: GestureClassifier,
    warning: WarningBanner,
    events: Vec<EngineEvent>,
}

impl AnnotationEngine {
    /// Builds a session from a resolved detection payload. Detections go in
    /// unchecked; only they feed the area statistics.
    pub fn new(payload: &DetectionPayload, config: &AnnotatorConfig) -> Self {
        let mut store = RectangleStore::new();
        for detection in &payload.rects {
            store.insert(detection.to_rect());
        }
        let stats =
            AreaStatistics::from_rects(store.iter().map(|r| &r.rect), &config.area_gate);
        match stats {
            Some(s) => log::debug!(
                "area gate: average {:.1}, admitting [{:.1}, {:.1}]",
                s.average,
                s.lower_bound,
                s.upper_bound
            ),
            None => log::debug!("no detections, area gate disabled"),
        }

        Self {
            store,
            stats,
            gate: config.area_gate,
            mode: InteractionMode::Select,
            preview: None,
            gesture: GestureClassifier::new(config.click_threshold),
            warning: WarningBanner::new(config.warning_duration()),
            events: vec![EngineEvent::CountChanged(payload.rects.len())],
        }
    }

    pub fn mode(&self) -> InteractionMode {
        self.mode
    }

    pub fn store(&self) -> &RectangleStore {
        &self.store
    }

    pub fn stats(&self) -> Option<&AreaStatistics> {
        self.stats.as_ref()
    }

    /// Statistics that are actually enforced: `None` if the gate is switched
    /// off or the detection set gave no usable average.
    pub fn active_gate(&self) -> Option<&AreaStatistics> {
        self.stats.as_ref().filter(|_| self.gate.enabled)
    }

    pub fn preview(&self) -> Option<Rect> {
        self.preview
    }

    pub fn selected(&self) -> Option<RectId> {
        self.store.selected()
    }

    pub fn rect_count(&self) -> usize {
        self.store.len()
    }

    // ── Mode state machine ──────────────────────────────────────────────

    pub fn enter_place(&mut self) {
        self.store.select(None);
        self.preview = None;
        self.mode = InteractionMode::Place { pending: None };
        log::debug!("mode: place");
    }

    pub fn enter_select(&mut self) {
        self.preview = None;
        self.mode = InteractionMode::Select;
        log::debug!("mode: select");
    }

    /// Drops the pending corner and preview. Stays in place mode.
    pub fn cancel_placement(&mut self) {
        if let InteractionMode::Place { pending } = &mut self.mode {
            if pending.take().is_some() {
                log::debug!("placement cancelled");
            }
        }
        self.preview = None;
    }

    pub fn handle_key(&mut self, key: KeyCommand) {
        if self.mode.is_place() {
            self.cancel_placement();
        }
        match key {
            KeyCommand::EnterPlace => self.enter_place(),
            KeyCommand::EnterSelect => self.enter_select(),
            KeyCommand::Delete => {
                if self.mode == InteractionMode::Select {
                    if let Some(id) = self.store.selected() {
                        self.delete_rectangle(id);
                    }
                }
            }
            KeyCommand::Other => {}
        }
    }

    // ── Pointer input ───────────────────────────────────────────────────

    pub fn pointer_down(&mut self, screen: Point) {
        self.gesture.pointer_down(screen);
    }

    /// Classifies the release and, for a click, routes it by mode.
    pub fn pointer_up(
        &mut self,
        screen: Point,
        view: &impl ScreenToWorld,
        now: Instant,
    ) -> Option<Gesture> {
        let gesture = self.gesture.pointer_up(screen)?;
        if gesture == Gesture::Click {
            self.click(view.to_world(screen), now);
        }
        Some(gesture)
    }

    pub fn pointer_moved(&mut self, screen: Point, view: &impl ScreenToWorld) {
        if let Some(first) = self.mode.pending() {
            self.preview = Some(normalize_rect(first, view.to_world(screen)));
        }
    }

    /// Secondary button: cancels a placement in progress.
    pub fn secondary_pressed(&mut self) {
        if self.mode.is_place() {
            self.cancel_placement();
        }
    }

    /// A click already converted to world space.
    pub fn click(&mut self, world: Point, now: Instant) {
        match self.mode {
            InteractionMode::Select => {
                // Empty space keeps the current selection.
                if let Some(id) = self.store.hit_test(world) {
                    self.select_rectangle(Some(id));
                }
            }
            InteractionMode::Place { .. } => {
                self.commit_corner(world, now);
            }
        }
    }

    // ── Placement workflow ──────────────────────────────────────────────

    pub fn commit_corner(&mut self, world: Point, now: Instant) -> CornerOutcome {
        let InteractionMode::Place { pending } = &mut self.mode else {
            return CornerOutcome::Ignored;
        };
        let Some(first) = pending.take() else {
            *pending = Some(world);
            return CornerOutcome::FirstCorner;
        };
        self.preview = None;

        let rect = normalize_rect(first, world);
        let area = rect.area();
        if let Some(stats) = self.active_gate().copied() {
            if !stats.admits(area) {
                log::debug!(
                    "rejected {area:.1} px² outside [{:.1}, {:.1}]",
                    stats.lower_bound,
                    stats.upper_bound
                );
                self.warning.raise(now);
                self.events.push(EngineEvent::AreaRejected { area });
                return CornerOutcome::Rejected { area };
            }
        }

        let id = self.store.insert(rect);
        log::info!("placed rectangle {} ({} total)", id.raw(), self.store.len());
        self.events.push(EngineEvent::CountChanged(self.store.len()));
        CornerOutcome::Added(id)
    }

    // ── Selection / deletion ────────────────────────────────────────────

    pub fn select_rectangle(&mut self, id: Option<RectId>) {
        self.store.select(id);
    }

    /// Returns `false` for an id that is not stored.
    pub fn delete_rectangle(&mut self, id: RectId) -> bool {
        let removed = self.store.remove(id);
        if removed {
            log::info!("deleted rectangle {} ({} left)", id.raw(), self.store.len());
            self.events.push(EngineEvent::CountChanged(self.store.len()));
        }
        removed
    }

    // ── Notifications ───────────────────────────────────────────────────

    pub fn drain_events(&mut self) -> Vec<EngineEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn warning_visible(&self, now: Instant) -> bool {
        self.warning.is_visible(now)
    }

    pub fn warning(&self) -> &WarningBanner {
        &self.warning
    }

    pub fn expire_warning(&mut self, now: Instant) -> bool {
        self.warning.expire(now)
    }

    // ── Export ──────────────────────────────────────────────────────────

    /// Current rectangles as `(x, y, w, h)`, in store order.
    pub fn export(&self) -> Vec<Detection> {
        self.store.iter().map(|r| Detection::from(r.rect)).collect()
    }

    pub fn export_payload(&self, filename: impl Into<PathBuf>) -> DetectionPayload {
        DetectionPayload::new(filename, self.export())
    }
}
