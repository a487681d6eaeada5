//! The eframe front-end: draws the photo and rectangles, and feeds pointer and
//! keyboard input into the [`AnnotationEngine`].

use eframe::egui;
use std::path::PathBuf;
use std::sync::mpsc::{self, Receiver};
use std::time::Instant;

use crate::camera::Camera;
use crate::config::{AnnotatorConfig, KeyBindings};
use crate::detector::{self, DetectorError};
use crate::engine::{AnnotationEngine, EngineEvent, KeyCommand};
use crate::geometry::Point;
use crate::payload::{self, DetectionPayload, PayloadError};

const PLACE_GUIDE: egui::Color32 = egui::Color32::from_rgba_premultiplied(51, 51, 51, 102);
const WARNING_TEXT: &str = "Selection size differs too much from the detected parts";

#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("cannot open image {path}: {source}")]
    Image {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
    #[error(transparent)]
    Payload(#[from] PayloadError),
    #[error(transparent)]
    Detector(#[from] DetectorError),
}

/// Where the session's inputs and output live.
#[derive(Clone, Debug)]
pub struct SessionPaths {
    pub image: PathBuf,
    pub detections: PathBuf,
    pub output: PathBuf,
}

impl SessionPaths {
    pub fn new(image: PathBuf, detections: Option<PathBuf>, output: Option<PathBuf>) -> Self {
        let detections = detections.unwrap_or_else(|| payload::detections_path(&image));
        let output = output.unwrap_or_else(|| detections.clone());
        Self {
            image,
            detections,
            output,
        }
    }
}

struct Loaded {
    image: image::RgbaImage,
    payload: DetectionPayload,
}

/// Reads the detections file, or runs the detector when there is none yet.
pub fn load_detections(
    paths: &SessionPaths,
    config: &AnnotatorConfig,
) -> Result<DetectionPayload, LoadError> {
    if paths.detections.exists() {
        return Ok(payload::load(&paths.detections)?);
    }
    if config.detector.program.is_some() {
        return Ok(detector::run(&config.detector, &paths.image)?);
    }
    log::warn!(
        "{} not found and no detector configured, starting empty",
        paths.detections.display()
    );
    Ok(DetectionPayload::new(&paths.image, Vec::new()))
}

fn load(paths: &SessionPaths, config: &AnnotatorConfig) -> Result<Loaded, LoadError> {
    let image = image::open(&paths.image)
        .map_err(|source| LoadError::Image {
            path: paths.image.clone(),
            source,
        })?
        .to_rgba8();
    let payload = load_detections(paths, config)?;
    Ok(Loaded { image, payload })
}

// ── Key bindings ────────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Keymap {
    pub place: egui::Key,
    pub select: egui::Key,
    pub delete: egui::Key,
}

impl Keymap {
    pub fn from_bindings(bindings: &KeyBindings) -> Self {
        fn resolve(name: &str, fallback: egui::Key) -> egui::Key {
            egui::Key::from_name(name).unwrap_or_else(|| {
                log::warn!("unknown key name {name:?}, using {}", fallback.name());
                fallback
            })
        }
        Self {
            place: resolve(&bindings.place, egui::Key::P),
            select: resolve(&bindings.select, egui::Key::S),
            delete: resolve(&bindings.delete, egui::Key::X),
        }
    }

    pub fn command(&self, key: egui::Key) -> KeyCommand {
        if key == self.place {
            KeyCommand::EnterPlace
        } else if key == self.select {
            KeyCommand::EnterSelect
        } else if key == self.delete {
            KeyCommand::Delete
        } else {
            KeyCommand::Other
        }
    }
}

// ── App ─────────────────────────────────────────────────────────────────────

struct Session {
    engine: AnnotationEngine,
    texture: egui::TextureHandle,
    camera: Camera,
    fitted: bool,
    part_count: usize,
}

enum State {
    Loading(Receiver<Result<Loaded, LoadError>>),
    Ready(Box<Session>),
    Failed(String),
}

pub struct AnnotateApp {
    paths: SessionPaths,
    config: AnnotatorConfig,
    keymap: Keymap,
    state: State,
    status: Option<String>,
}

impl AnnotateApp {
    /// Starts loading in the background; input is only handled once that finishes.
    pub fn new(ctx: &egui::Context, paths: SessionPaths, config: AnnotatorConfig) -> Self {
        let (tx, rx) = mpsc::channel();
        let ctx = ctx.clone();
        let job_paths = paths.clone();
        let job_config = config.clone();
        std::thread::spawn(move || {
            let result = load(&job_paths, &job_config);
            if tx.send(result).is_ok() {
                ctx.request_repaint();
            }
        });

        Self {
            keymap: Keymap::from_bindings(&config.keys),
            paths,
            config,
            state: State::Loading(rx),
            status: None,
        }
    }

    pub fn run(
        mut options: eframe::NativeOptions,
        paths: SessionPaths,
        config: AnnotatorConfig,
    ) -> Result<(), eframe::Error> {
        let title = format!(
            "partmark - {}",
            paths
                .image
                .file_name()
                .unwrap_or_default()
                .to_string_lossy()
        );
        options.viewport = options.viewport.with_title(&title);
        eframe::run_native(
            &title,
            options,
            Box::new(move |cc| Ok(Box::new(Self::new(&cc.egui_ctx, paths, config)))),
        )
    }

    fn poll_loading(&mut self, ctx: &egui::Context) {
        let State::Loading(rx) = &self.state else {
            return;
        };
        let result = match rx.try_recv() {
            Ok(result) => result,
            Err(mpsc::TryRecvError::Empty) => return,
            Err(mpsc::TryRecvError::Disconnected) => {
                self.state = State::Failed("loader thread exited".to_owned());
                return;
            }
        };
        self.state = match result {
            Ok(loaded) => State::Ready(Box::new(self.start_session(ctx, loaded))),
            Err(err) => {
                log::error!("{err}");
                State::Failed(err.to_string())
            }
        };
    }

    fn start_session(&self, ctx: &egui::Context, loaded: Loaded) -> Session {
        let size = [loaded.image.width() as usize, loaded.image.height() as usize];
        let pixels = loaded.image.as_flat_samples();
        let color_image = egui::ColorImage::from_rgba_unmultiplied(size, pixels.as_slice());
        let texture = ctx.load_texture("parts", color_image, egui::TextureOptions::LINEAR);
        let engine = AnnotationEngine::new(&loaded.payload, &self.config);
        log::info!(
            "session ready: {}x{} image, {} rects",
            size[0],
            size[1],
            engine.rect_count()
        );
        Session {
            part_count: engine.rect_count(),
            engine,
            texture,
            camera: Camera::new(egui::vec2(size[0] as f32, size[1] as f32)),
            fitted: false,
        }
    }

    fn save(&mut self) {
        let State::Ready(session) = &self.state else {
            return;
        };
        let payload = session.engine.export_payload(&self.paths.image);
        self.status = Some(match payload::save(&self.paths.output, &payload) {
            Ok(()) => format!(
                "Saved {} parts to {}",
                payload.rects.len(),
                self.paths.output.display()
            ),
            Err(err) => {
                log::error!("{err}");
                format!("Save failed: {err}")
            }
        });
    }
}

fn to_point(p: egui::Pos2) -> Point {
    Point::new(p.x, p.y)
}

impl Session {
    /// Returns `true` when the save shortcut was pressed.
    fn handle_input(
        &mut self,
        ctx: &egui::Context,
        response: &egui::Response,
        keymap: &Keymap,
    ) -> bool {
        let now = Instant::now();
        let mut save = false;
        let canvas = response.rect;
        let events = ctx.input(|i| i.events.clone());
        for event in events {
            match event {
                egui::Event::Key {
                    key,
                    pressed: true,
                    repeat: false,
                    modifiers,
                    ..
                } => {
                    if modifiers.command && key == egui::Key::S {
                        save = true;
                    } else {
                        self.engine.handle_key(keymap.command(key));
                    }
                }
                egui::Event::PointerButton {
                    pos,
                    button,
                    pressed,
                    ..
                } if canvas.contains(pos) || !pressed => match (button, pressed) {
                    (egui::PointerButton::Primary, true) => self.engine.pointer_down(to_point(pos)),
                    (egui::PointerButton::Primary, false) => {
                        self.engine.pointer_up(to_point(pos), &self.camera, now);
                    }
                    (egui::PointerButton::Secondary, true) => self.engine.secondary_pressed(),
                    _ => {}
                },
                _ => {}
            }
        }

        // Drag to pan. Releases that moved this far are drags and never reach the engine.
        if response.dragged_by(egui::PointerButton::Primary)
            || response.dragged_by(egui::PointerButton::Middle)
        {
            self.camera.pan_by(response.drag_delta());
        }

        let scroll = ctx.input(|i| i.smooth_scroll_delta.y);
        if scroll != 0.0 && response.hovered() {
            if let Some(cursor) = response.hover_pos() {
                self.camera.zoom_at(cursor, 1.0 + scroll * 0.002);
            }
        }

        if let Some(pos) = response.hover_pos() {
            self.engine.pointer_moved(to_point(pos), &self.camera);
        }

        for event in self.engine.drain_events() {
            match event {
                EngineEvent::CountChanged(n) => self.part_count = n,
                EngineEvent::AreaRejected { area } => {
                    log::info!("placement rejected, area {area:.0} px²");
                }
            }
        }
        self.engine.expire_warning(now);
        if let Some(left) = self.engine.warning().remaining(now) {
            ctx.request_repaint_after(left);
        }
        save
    }

    fn draw(&self, painter: &egui::Painter, response: &egui::Response) {
        let canvas = response.rect;
        painter.rect_filled(canvas, 0.0, egui::Color32::from_gray(40));
        painter.image(
            self.texture.id(),
            self.camera.image_rect_on_screen(),
            egui::Rect::from_min_max(egui::pos2(0.0, 0.0), egui::pos2(1.0, 1.0)),
            egui::Color32::WHITE,
        );

        let stroke = egui::Stroke::new((4.0 * self.camera.zoom).max(1.0), egui::Color32::BLACK);
        for rect in self.engine.store() {
            let fill = if rect.is_selected() {
                egui::Color32::from_rgba_unmultiplied(0, 255, 0, 128)
            } else {
                egui::Color32::from_rgba_unmultiplied(0, 0, 255, 128)
            };
            let screen = self.camera.rect_to_screen(&rect.rect);
            painter.rect_filled(screen, 0.0, fill);
            painter.rect_stroke(screen, 0.0, stroke, egui::StrokeKind::Middle);
        }

        if !self.engine.mode().is_place() {
            return;
        }
        if let Some(preview) = self.engine.preview() {
            painter.rect_stroke(
                self.camera.rect_to_screen(&preview),
                0.0,
                egui::Stroke::new(stroke.width, egui::Color32::from_black_alpha(191)),
                egui::StrokeKind::Middle,
            );
        }
        if let Some(pos) = response.hover_pos() {
            let guide = egui::Stroke::new(6.0, PLACE_GUIDE);
            painter.line_segment(
                [egui::pos2(pos.x, canvas.top()), egui::pos2(pos.x, canvas.bottom())],
                guide,
            );
            painter.line_segment(
                [egui::pos2(canvas.left(), pos.y), egui::pos2(canvas.right(), pos.y)],
                guide,
            );
        }
    }
}

// ── eframe App impl ────────────────────────────────────────────────────────

impl eframe::App for AnnotateApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.poll_loading(ctx);

        egui::TopBottomPanel::top("toolbar").show(ctx, |ui| {
            ui.horizontal(|ui| match &mut self.state {
                State::Ready(session) => {
                    let place = session.engine.mode().is_place();
                    if ui
                        .selectable_label(!place, format!("Select [{}]", self.keymap.select.name()))
                        .clicked()
                    {
                        session.engine.enter_select();
                    }
                    if ui
                        .selectable_label(place, format!("Place [{}]", self.keymap.place.name()))
                        .clicked()
                    {
                        session.engine.enter_place();
                    }
                    ui.separator();
                    ui.label(format!("Parts: {}", session.part_count));
                    ui.separator();
                    ui.label(format!("Zoom: {:.0}%", session.camera.zoom * 100.0));
                    ui.separator();
                    if session.engine.warning_visible(Instant::now()) {
                        ui.colored_label(egui::Color32::from_rgb(220, 60, 60), WARNING_TEXT);
                    } else if let Some(status) = &self.status {
                        ui.label(status);
                    }
                }
                State::Loading(_) => {
                    ui.spinner();
                    ui.label(format!("Loading {}", self.paths.image.display()));
                }
                State::Failed(_) => {
                    ui.label("Load failed");
                }
            });
        });

        let mut save_requested = false;
        egui::CentralPanel::default().show(ctx, |ui| match &mut self.state {
            State::Ready(session) => {
                let (response, painter) =
                    ui.allocate_painter(ui.available_size(), egui::Sense::click_and_drag());
                session.camera.canvas = response.rect;
                if !session.fitted {
                    session.camera.fit();
                    session.fitted = true;
                }
                save_requested = session.handle_input(ctx, &response, &self.keymap);
                session.draw(&painter, &response);
            }
            State::Loading(_) => {
                ui.centered_and_justified(|ui| ui.spinner());
            }
            State::Failed(message) => {
                ui.centered_and_justified(|ui| {
                    ui.colored_label(egui::Color32::from_rgb(220, 60, 60), message.as_str())
                });
            }
        });

        if save_requested {
            self.save();
        }
    }
}

/// The image to annotate when none was given on the command line.
pub fn pick_image() -> Option<PathBuf> {
    rfd::FileDialog::new()
        .set_title("Open parts photo")
        .add_filter("Images", &["jpg", "jpeg", "png", "bmp", "tif", "tiff"])
        .pick_file()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_keymap_matches_shortcuts() {
        let keymap = Keymap::from_bindings(&KeyBindings::default());
        assert_eq!(keymap.command(egui::Key::P), KeyCommand::EnterPlace);
        assert_eq!(keymap.command(egui::Key::S), KeyCommand::EnterSelect);
        assert_eq!(keymap.command(egui::Key::X), KeyCommand::Delete);
        assert_eq!(keymap.command(egui::Key::Q), KeyCommand::Other);
    }

    #[test]
    fn rebinding_and_bad_names() {
        let bindings = KeyBindings {
            place: "A".to_owned(),
            select: "not a key".to_owned(),
            delete: "Delete".to_owned(),
        };
        let keymap = Keymap::from_bindings(&bindings);
        assert_eq!(keymap.command(egui::Key::A), KeyCommand::EnterPlace);
        assert_eq!(keymap.command(egui::Key::S), KeyCommand::EnterSelect);
        assert_eq!(keymap.command(egui::Key::Delete), KeyCommand::Delete);
        assert_eq!(keymap.command(egui::Key::P), KeyCommand::Other);
    }

    #[test]
    fn default_paths_follow_the_image() {
        let paths = SessionPaths::new(PathBuf::from("up/a.jpg"), None, None);
        assert_eq!(paths.detections, PathBuf::from("up/a.json"));
        assert_eq!(paths.output, PathBuf::from("up/a.json"));
        let paths = SessionPaths::new(
            PathBuf::from("up/a.jpg"),
            Some(PathBuf::from("d.json")),
            Some(PathBuf::from("o.json")),
        );
        assert_eq!(paths.detections, PathBuf::from("d.json"));
        assert_eq!(paths.output, PathBuf::from("o.json"));
    }
}
