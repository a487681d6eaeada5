//! World/screen points and axis-aligned rectangles.

use serde::{Deserialize, Serialize};

/// A 2D point. Whether it is in screen or world space depends on who produced it.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

impl From<(f32, f32)> for Point {
    fn from((x, y): (f32, f32)) -> Self {
        Self { x, y }
    }
}

/// Axis-aligned rectangle stored as top-left corner plus extents.
///
/// `width` and `height` are never negative when built through
/// [`normalize_rect`] or from a validated detection.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    /// Builds a rectangle from a detector tuple `(x, y, w, h)`.
    ///
    /// The extents are taken as given, so they must already be non-negative
    /// (payload validation guarantees this).
    pub fn from_detection(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self {
            x,
            y,
            width: w,
            height: h,
        }
    }

    pub fn area(&self) -> f32 {
        area(self)
    }

    pub fn min(&self) -> Point {
        Point::new(self.x, self.y)
    }

    pub fn max(&self) -> Point {
        Point::new(self.x + self.width, self.y + self.height)
    }

    /// Edges count as inside.
    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.x
            && p.x <= self.x + self.width
            && p.y >= self.y
            && p.y <= self.y + self.height
    }
}

/// Turns two arbitrary corners into a top-left anchored rectangle.
pub fn normalize_rect(p1: Point, p2: Point) -> Rect {
    Rect {
        x: p1.x.min(p2.x),
        y: p1.y.min(p2.y),
        width: (p1.x - p2.x).abs(),
        height: (p1.y - p2.y).abs(),
    }
}

pub fn area(rect: &Rect) -> f32 {
    rect.width * rect.height
}

#[cfg(test)]
mod tests {
    use super::*;

    const CORNERS: [(f32, f32); 6] = [
        (0.0, 0.0),
        (10.0, 10.0),
        (-5.0, 7.5),
        (3.0, -12.0),
        (100.25, 0.5),
        (-40.0, -40.0),
    ];

    #[test]
    fn normalized_extents_are_never_negative() {
        for a in CORNERS {
            for b in CORNERS {
                let r = normalize_rect(a.into(), b.into());
                assert!(r.width >= 0.0 && r.height >= 0.0, "{a:?} {b:?} -> {r:?}");
            }
        }
    }

    #[test]
    fn corner_order_does_not_matter() {
        for a in CORNERS {
            for b in CORNERS {
                assert_eq!(
                    normalize_rect(a.into(), b.into()),
                    normalize_rect(b.into(), a.into())
                );
            }
        }
    }

    #[test]
    fn area_is_product_of_axis_distances() {
        for a in CORNERS {
            for b in CORNERS {
                let expected = (a.0 - b.0).abs() * (a.1 - b.1).abs();
                assert_eq!(area(&normalize_rect(a.into(), b.into())), expected);
            }
        }
    }

    #[test]
    fn bottom_right_to_top_left() {
        let r = normalize_rect(Point::new(10.0, 20.0), Point::new(2.0, 4.0));
        assert_eq!(
            r,
            Rect {
                x: 2.0,
                y: 4.0,
                width: 8.0,
                height: 16.0
            }
        );
    }

    #[test]
    fn identical_points_give_empty_rect() {
        let p = Point::new(3.0, 3.0);
        let r = normalize_rect(p, p);
        assert_eq!(r.area(), 0.0);
        assert!(r.contains(p));
    }

    #[test]
    fn contains_includes_edges() {
        let r = Rect::from_detection(0.0, 0.0, 10.0, 5.0);
        assert!(r.contains(Point::new(0.0, 0.0)));
        assert!(r.contains(Point::new(10.0, 5.0)));
        assert!(r.contains(Point::new(4.0, 2.0)));
        assert!(!r.contains(Point::new(10.1, 2.0)));
        assert!(!r.contains(Point::new(4.0, -0.1)));
    }

    #[test]
    fn detection_extents_are_kept_far_from_origin() {
        let r = Rect::from_detection(16_777_217.0, 3.0, 3.0, 5.0);
        assert_eq!((r.width, r.height), (3.0, 5.0));
        let r = Rect::from_detection(1e8, 0.0, 3.0, 3.0);
        assert_eq!(r.width, 3.0);
    }
}
