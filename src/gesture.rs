use crate::geometry::Point;

/// Screen-space distance (per axis) under which a press/release counts as a click.
pub const DEFAULT_CLICK_THRESHOLD: f32 = 6.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Gesture {
    Click,
    Drag,
}

/// Tells clicks apart from drags using the press and release positions.
#[derive(Clone, Debug)]
pub struct GestureClassifier {
    threshold: f32,
    pressed_at: Option<Point>,
}

impl Default for GestureClassifier {
    fn default() -> Self {
        Self::new(DEFAULT_CLICK_THRESHOLD)
    }
}

impl GestureClassifier {
    pub fn new(threshold: f32) -> Self {
        Self {
            threshold,
            pressed_at: None,
        }
    }

    pub fn pointer_down(&mut self, screen: Point) {
        self.pressed_at = Some(screen);
    }

    /// Classifies the gesture ending at `screen`.
    ///
    /// Returns `None` when there was no matching press.
    pub fn pointer_up(&mut self, screen: Point) -> Option<Gesture> {
        let start = self.pressed_at.take()?;
        let dx = (screen.x - start.x).abs();
        let dy = (screen.y - start.y).abs();
        if dx < self.threshold && dy < self.threshold {
            Some(Gesture::Click)
        } else {
            Some(Gesture::Drag)
        }
    }
}
