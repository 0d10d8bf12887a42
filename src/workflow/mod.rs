pub mod lesson_flow;
pub mod slide_flow;

pub use lesson_flow::{LessonFlow, LessonOutcome};
pub use slide_flow::{RenderedSlide, SlideFlow};
