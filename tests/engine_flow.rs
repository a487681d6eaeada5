use std::time::{Duration, Instant};

use eframe::egui;
use partmark::camera::Camera;
use partmark::engine::Identity;
use partmark::gesture::Gesture;
use partmark::{
    AnnotationEngine, AnnotatorConfig, CornerOutcome, Detection, DetectionPayload, EngineEvent,
    InteractionMode, KeyCommand, Point, Rect,
};

fn detections() -> DetectionPayload {
    DetectionPayload::new(
        "parts.jpg",
        vec![
            Detection(0.0, 0.0, 10.0, 10.0),
            Detection(0.0, 0.0, 20.0, 20.0),
        ],
    )
}

fn click(e: &mut AnnotationEngine, x: f32, y: f32, now: Instant) -> Option<Gesture> {
    e.pointer_down(Point::new(x, y));
    e.pointer_up(Point::new(x + 1.0, y + 1.0), &Identity, now)
}

#[test]
fn gate_uses_detection_average() {
    let mut e = AnnotationEngine::new(&detections(), &AnnotatorConfig::default());
    let stats = e.stats().copied().unwrap();
    assert_eq!(
        (stats.average, stats.lower_bound, stats.upper_bound),
        (250.0, 125.0, 500.0)
    );

    e.handle_key(KeyCommand::EnterPlace);
    let now = Instant::now();
    e.commit_corner(Point::new(0.0, 0.0), now);
    assert_eq!(
        e.commit_corner(Point::new(10.0, 10.0), now),
        CornerOutcome::Rejected { area: 100.0 }
    );
    e.commit_corner(Point::new(0.0, 0.0), now);
    assert!(matches!(
        e.commit_corner(Point::new(10.0, 20.0), now),
        CornerOutcome::Added(_)
    ));
    assert_eq!(e.rect_count(), 3);
}

#[test]
fn full_review_session() {
    let mut e = AnnotationEngine::new(&detections(), &AnnotatorConfig::default());
    let now = Instant::now();

    // The later, larger detection sits on top of the smaller one.
    click(&mut e, 5.0, 5.0, now);
    let picked = e.selected().unwrap();
    assert_eq!(
        e.store().get(picked).unwrap().rect,
        Rect::from_detection(0.0, 0.0, 20.0, 20.0)
    );

    e.handle_key(KeyCommand::Delete);
    assert_eq!(e.rect_count(), 1);
    assert_eq!(e.selected(), None);

    // Two clicks; releases land one pixel off, giving a 12x12 part.
    e.handle_key(KeyCommand::EnterPlace);
    click(&mut e, 100.0, 100.0, now);
    e.pointer_moved(Point::new(120.0, 120.0), &Identity);
    assert!(e.preview().is_some());
    click(&mut e, 112.0, 112.0, now);
    assert_eq!(e.preview(), None);
    assert_eq!(e.rect_count(), 2);

    e.handle_key(KeyCommand::EnterSelect);
    assert_eq!(e.mode(), InteractionMode::Select);
    let exported = e.export();
    assert_eq!(
        exported,
        vec![
            Detection(0.0, 0.0, 10.0, 10.0),
            Detection(101.0, 101.0, 12.0, 12.0)
        ]
    );
    let counts: Vec<_> = e
        .drain_events()
        .into_iter()
        .filter_map(|ev| match ev {
            EngineEvent::CountChanged(n) => Some(n),
            EngineEvent::AreaRejected { .. } => None,
        })
        .collect();
    assert_eq!(counts, vec![2, 1, 2]);
}

#[test]
fn export_reimports_to_the_same_store() {
    let mut e = AnnotationEngine::new(&detections(), &AnnotatorConfig::default());
    e.enter_place();
    let now = Instant::now();
    e.commit_corner(Point::new(40.0, 30.0), now);
    e.commit_corner(Point::new(25.0, 45.0), now);

    let exported = e.export_payload("parts.jpg");
    let json = serde_json::to_string(&exported).unwrap();
    let reread: DetectionPayload = serde_json::from_str(&json).unwrap();
    let again = AnnotationEngine::new(&reread, &AnnotatorConfig::default());

    assert_eq!(again.export(), e.export());
    assert_eq!(again.rect_count(), 3);
    assert!(again.store().iter().all(|r| !r.is_selected()));
}

#[test]
fn drag_pans_instead_of_placing() {
    let mut e = AnnotationEngine::new(&detections(), &AnnotatorConfig::default());
    e.enter_place();
    e.pointer_down(Point::new(100.0, 100.0));
    let g = e.pointer_up(Point::new(100.0, 160.0), &Identity, Instant::now());
    assert_eq!(g, Some(Gesture::Drag));
    assert_eq!(e.mode(), InteractionMode::Place { pending: None });
}

#[test]
fn clicks_are_mapped_through_the_camera() {
    let payload = DetectionPayload::new("p.jpg", vec![Detection(10.0, 10.0, 20.0, 20.0)]);
    let mut e = AnnotationEngine::new(&payload, &AnnotatorConfig::default());
    let mut camera = Camera::new(egui::vec2(100.0, 100.0));
    camera.canvas = egui::Rect::from_min_size(egui::Pos2::ZERO, egui::vec2(100.0, 100.0));
    camera.zoom_at(egui::pos2(50.0, 50.0), 2.0);

    // At 2x about the centre, screen (30, 30) is image (40, 40).
    e.pointer_down(Point::new(30.0, 30.0));
    e.pointer_up(Point::new(30.0, 30.0), &camera, Instant::now());
    assert!(e.selected().is_none());

    // Screen (-10, -10) is image (20, 20), inside the rectangle.
    e.pointer_down(Point::new(-10.0, -10.0));
    e.pointer_up(Point::new(-10.0, -10.0), &camera, Instant::now());
    assert!(e.selected().is_some());
}

#[test]
fn warning_clears_after_its_duration() {
    let config = AnnotatorConfig {
        warning_duration_ms: 250,
        ..AnnotatorConfig::default()
    };
    let mut e = AnnotationEngine::new(&detections(), &config);
    e.enter_place();
    let t0 = Instant::now();
    e.commit_corner(Point::new(0.0, 0.0), t0);
    e.commit_corner(Point::new(1.0, 1.0), t0);
    assert!(e.warning_visible(t0 + Duration::from_millis(200)));
    assert!(!e.warning_visible(t0 + Duration::from_millis(250)));
    assert!(e.expire_warning(t0 + Duration::from_millis(300)));
}

#[test]
fn far_coordinates_survive_import_and_export() {
    let rects = vec![
        Detection(16_777_217.0, 3.0, 3.0, 5.0),
        Detection(1e8, 0.0, 3.0, 3.0),
    ];
    let e = AnnotationEngine::new(
        &DetectionPayload::new("parts.jpg", rects.clone()),
        &AnnotatorConfig::default(),
    );
    assert_eq!(e.export(), rects);
}

#[test]
fn configured_click_threshold_is_honoured() {
    let config = AnnotatorConfig {
        click_threshold: 2.0,
        ..AnnotatorConfig::default()
    };
    let mut e = AnnotationEngine::new(&detections(), &config);
    e.pointer_down(Point::new(5.0, 5.0));
    assert_eq!(
        e.pointer_up(Point::new(8.0, 5.0), &Identity, Instant::now()),
        Some(Gesture::Drag)
    );
    assert_eq!(e.selected(), None);

    let mut e = AnnotationEngine::new(&detections(), &AnnotatorConfig::default());
    e.pointer_down(Point::new(5.0, 5.0));
    assert_eq!(
        e.pointer_up(Point::new(8.0, 5.0), &Identity, Instant::now()),
        Some(Gesture::Click)
    );
    assert!(e.selected().is_some());
}
