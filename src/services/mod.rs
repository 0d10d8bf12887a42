pub mod artifact_store;
pub mod llm_service;
pub mod media_service;
pub mod outline_synthesizer;
pub mod slide_renderer;

pub use artifact_store::ArtifactStore;
pub use llm_service::LlmService;
pub use media_service::MediaService;
pub use outline_synthesizer::{CourseFormat, OutlineSynthesizer};
pub use slide_renderer::SlideRenderer;
