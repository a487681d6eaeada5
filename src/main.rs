use eframe::egui;
use clap::Parser;
use partmark::cli::Args;
use partmark::{AnnotateApp, AnnotatorConfig, SessionPaths};

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();

    let config = match AnnotatorConfig::load_or_default(args.config.as_deref()) {
        Ok(config) => config,
        Err(err) => {
            log::error!("{err}");
            std::process::exit(1);
        }
    };

    let Some(image_path) = args.image.or_else(partmark::app::pick_image) else {
        log::error!("no image selected");
        std::process::exit(1);
    };
    if !image_path.exists() {
        eprintln!("File not found: {}", image_path.display());
        std::process::exit(1);
    }

    let paths = SessionPaths::new(image_path, args.detections, args.output);
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default().with_inner_size([1200.0, 800.0]),
        ..Default::default()
    };

    if let Err(err) = AnnotateApp::run(options, paths, config) {
        log::error!("{err}");
        std::process::exit(1);
    }
}
