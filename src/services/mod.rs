pub mod content_repair;
pub mod fallback_content;
pub mod flashcard_service;
pub mod model_service;
pub mod prompt_builder;
pub mod response_extractor;
pub mod single_flight;
pub mod study_content_service;

pub use study_content_service::StudyContentService;
