//! Ordered rectangle storage with stable handles and a single selection.

use crate::geometry::{Point, Rect};

/// Opaque handle to a stored rectangle.
///
/// Ids are handed out from a counter and never reused by the same store, so a
/// handle stays valid (or harmlessly dangling) no matter how the backing
/// vector shifts around.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RectId(u64);

impl RectId {
    pub fn raw(self) -> u64 {
        self.0
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Rectangle {
    id: RectId,
    pub rect: Rect,
    selected: bool,
}

impl Rectangle {
    pub fn id(&self) -> RectId {
        self.id
    }

    pub fn is_selected(&self) -> bool {
        self.selected
    }
}

/// Rectangles in insertion order: detections first, then user placements.
#[derive(Debug, Default)]
pub struct RectangleStore {
    rects: Vec<Rectangle>,
    selected: Option<RectId>,
    next_id: u64,
}

impl RectangleStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an unselected rectangle.
    pub fn insert(&mut self, rect: Rect) -> RectId {
        let id = RectId(self.next_id);
        self.next_id += 1;
        self.rects.push(Rectangle {
            id,
            rect,
            selected: false,
        });
        log::trace!("stored rectangle {id:?} at {rect:?}");
        id
    }

    /// Removes `id`, clearing the selection if it pointed there.
    /// Returns `false` when the id is not (or no longer) stored.
    pub fn remove(&mut self, id: RectId) -> bool {
        let Some(index) = self.position(id) else {
            return false;
        };
        if self.selected == Some(id) {
            self.select(None);
        }
        self.rects.remove(index);
        true
    }

    /// Moves the highlight to `id`. Unknown ids clear the selection.
    pub fn select(&mut self, id: Option<RectId>) {
        if let Some(prev) = self.selected.take() {
            if let Some(r) = self.get_mut(prev) {
                r.selected = false;
            }
        }
        if let Some(next) = id {
            if let Some(r) = self.get_mut(next) {
                r.selected = true;
                self.selected = Some(next);
            }
        }
    }

    pub fn selected(&self) -> Option<RectId> {
        self.selected
    }

    pub fn get(&self, id: RectId) -> Option<&Rectangle> {
        self.rects.iter().find(|r| r.id == id)
    }

    fn get_mut(&mut self, id: RectId) -> Option<&mut Rectangle> {
        self.rects.iter_mut().find(|r| r.id == id)
    }

    fn position(&self, id: RectId) -> Option<usize> {
        self.rects.iter().position(|r| r.id == id)
    }

    pub fn contains(&self, id: RectId) -> bool {
        self.position(id).is_some()
    }

    /// Topmost (most recently inserted) rectangle containing `p`.
    pub fn hit_test(&self, p: Point) -> Option<RectId> {
        self.rects
            .iter()
            .rev()
            .find(|r| r.rect.contains(p))
            .map(|r| r.id)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Rectangle> {
        self.rects.iter()
    }

    pub fn len(&self) -> usize {
        self.rects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rects.is_empty()
    }
}

impl<'a> IntoIterator for &'a RectangleStore {
    type Item = &'a Rectangle;
    type IntoIter = std::slice::Iter<'a, Rectangle>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
