use eframe::egui;

use crate::engine::ScreenToWorld;
use crate::geometry::{Point, Rect};

pub const MIN_ZOOM: f32 = 0.1;
pub const MAX_ZOOM: f32 = 10.0;

/// Pan/zoom view of the image, centred in the canvas.
#[derive(Clone, Copy, Debug)]
pub struct Camera {
    pub image_size: egui::Vec2,
    pub pan: egui::Vec2,
    pub zoom: f32,
    /// Screen rect of the canvas this frame.
    pub canvas: egui::Rect,
}

impl Camera {
    pub fn new(image_size: egui::Vec2) -> Self {
        Self {
            image_size,
            pan: egui::Vec2::ZERO,
            zoom: 1.0,
            canvas: egui::Rect::ZERO,
        }
    }

    /// Image-space to screen-space
    pub fn image_to_screen(&self, img_pos: egui::Pos2) -> egui::Pos2 {
        self.canvas.center() + self.pan + (img_pos.to_vec2() - self.image_size * 0.5) * self.zoom
    }

    /// Screen-space to image-space
    pub fn screen_to_image(&self, screen_pos: egui::Pos2) -> egui::Pos2 {
        let rel = screen_pos - self.canvas.center() - self.pan;
        egui::pos2(
            rel.x / self.zoom + self.image_size.x * 0.5,
            rel.y / self.zoom + self.image_size.y * 0.5,
        )
    }

    pub fn image_rect_on_screen(&self) -> egui::Rect {
        egui::Rect::from_min_max(
            self.image_to_screen(egui::Pos2::ZERO),
            self.image_to_screen(self.image_size.to_pos2()),
        )
    }

    pub fn rect_to_screen(&self, rect: &Rect) -> egui::Rect {
        let min = rect.min();
        let max = rect.max();
        egui::Rect::from_min_max(
            self.image_to_screen(egui::pos2(min.x, min.y)),
            self.image_to_screen(egui::pos2(max.x, max.y)),
        )
    }

    pub fn pan_by(&mut self, delta: egui::Vec2) {
        self.pan += delta;
    }

    /// Zooms by `factor`, keeping the image point under `cursor` fixed.
    pub fn zoom_at(&mut self, cursor: egui::Pos2, factor: f32) {
        let new_zoom = (self.zoom * factor).clamp(MIN_ZOOM, MAX_ZOOM);
        let cursor_rel = cursor - self.canvas.center() - self.pan;
        self.pan -= cursor_rel * (new_zoom / self.zoom - 1.0);
        self.zoom = new_zoom;
    }

    /// Largest zoom (up to 1.0) at which the whole image fits the canvas.
    pub fn fit(&mut self) {
        self.pan = egui::Vec2::ZERO;
        let size = self.canvas.size();
        if self.image_size.x > 0.0 && self.image_size.y > 0.0 && size.x > 0.0 && size.y > 0.0 {
            let fit = (size.x / self.image_size.x).min(size.y / self.image_size.y);
            self.zoom = fit.clamp(MIN_ZOOM, 1.0);
        }
    }
}

impl ScreenToWorld for Camera {
    fn to_world(&self, screen: Point) -> Point {
        let p = self.screen_to_image(egui::pos2(screen.x, screen.y));
        Point::new(p.x, p.y)
    }
}
