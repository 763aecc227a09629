pub mod events;
pub mod image;
pub mod language;
pub mod loaders;
pub mod plan;
pub mod session;

pub use events::{EventSender, PipelineEvent};
pub use image::{ImageEntry, PageType, ScanMode};
pub use language::{available_languages, LangOption};
pub use loaders::{apply_front_matter, load_images_from_folder, reassociate_classifications};
pub use plan::RenamePlanEntry;
pub use session::{BatchSession, OcrSettings};
