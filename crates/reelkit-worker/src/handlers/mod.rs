//! Job handlers, one per `JobKind`.

pub mod generate_clip;
pub mod generate_subtitles;
pub mod process_video;

pub use generate_clip::GenerateClipHandler;
pub use generate_subtitles::GenerateSubtitlesHandler;
pub use process_video::ProcessVideoHandler;
