//! Outfit advice generation for Stylecast
//!
//! Wraps the Gemini `generateContent` API behind the [`AdviceClient`] trait.

pub mod client;
pub mod error;
pub mod outfit;
pub mod prompt;

pub use client::{AdviceClient, GeminiClient};
pub use error::AdviceError;
pub use outfit::{parse_outfit, MemberProfile, OutfitRecommendation};
pub use prompt::PromptContext;
