use clap::Parser;
use std::path::PathBuf;

#[derive(Clone, Debug, Default, PartialEq, Eq, Parser)]
#[command(name = "partmark")]
#[command(about = "Review and correct detected part rectangles over a photo")]
pub struct Args {
    /// Photo to annotate. A file dialog opens when omitted.
    #[arg(value_name = "IMAGE")]
    pub image: Option<PathBuf>,
    /// Detection payload to start from (default: the image path with `.json`).
    #[arg(short, long, value_name = "FILE")]
    pub detections: Option<PathBuf>,
    /// JSON settings file.
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,
    /// Where Ctrl+S writes the rectangles (default: the detections path).
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,
}
