pub mod course;
pub mod preview;
pub mod slide;

pub use course::{
    CourseDocument, CourseOutline, CourseResult, GeneratedLesson, GeneratedVideo, LessonPayload,
    LessonSpec, Quiz, QuizQuestion,
};
pub use slide::{ImprovedScript, Slide, SlideDeck};
