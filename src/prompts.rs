//! Fixed instructional prompts sent with every quiz request.
//!
//! The prompt is not configurable over HTTP. Two wordings exist because the
//! model sees either a set of page images or one PDF document, and the prompt
//! refers to the material the way it will actually arrive.

use crate::config::AttachmentMode;

/// Prompt used when the pages are attached as PNG images.
pub const PAGE_IMAGES_PROMPT: &str = r#"Analyze these educational materials and determine the appropriate grade level (elementary, middle school, high school, or college).
Then generate 5 multiple-choice questions with 4 options each and provide the correct answers.
The questions should be appropriate for the identified grade level, using vocabulary and concepts suitable for that age group. Focus on diagrams, charts, and exact visual information in the images.
[IMPORTANT] For each question that references a visual element, always describe that element and its details for better understanding of the question.
[IMPORTANT] Always give a detailed description of visual elements rather than referencing them."#;

/// Prompt used when the PDF itself is attached.
pub const RAW_DOCUMENT_PROMPT: &str = r#"Analyze this educational PDF material and determine the appropriate grade level (elementary, middle school, high school, or college).
Then generate 5 multiple-choice questions with 4 options each and provide the correct answers.
The questions should be appropriate for the identified grade level, using vocabulary and concepts suitable for that age group. Focus on diagrams, charts, and exact visual information in the document.
[IMPORTANT] For each question that references a visual element, always describe that element and its details for better understanding of the question.
[IMPORTANT] Always give a detailed description of visual elements rather than referencing them."#;

/// The prompt matching an attachment mode.
pub fn quiz_prompt(mode: AttachmentMode) -> &'static str {
    match mode {
        AttachmentMode::PageImages => PAGE_IMAGES_PROMPT,
        AttachmentMode::RawDocument => RAW_DOCUMENT_PROMPT,
    }
}
