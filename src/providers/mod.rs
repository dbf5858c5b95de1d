//! Model clients implementing [`crate::pipeline::inference::QuizModel`].
//!
//! * [`gemini`] talks to the Gemini REST API directly (default).
//! * [`llm`] adapts any edgequake-llm vision provider.

pub mod gemini;
pub mod llm;
