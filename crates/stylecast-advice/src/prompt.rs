//! Prompt rendering for temperature-based outfit advice.

use serde::Serialize;

/// What the advice prompt is built from.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PromptContext {
    /// Current temperature in Celsius
    pub temperature: f64,
    /// Place name as it should appear in the prompt
    pub location_name: String,
}

impl PromptContext {
    pub fn new(temperature: f64, location_name: impl Into<String>) -> Self {
        Self {
            temperature,
            location_name: location_name.into(),
        }
    }

    /// Stylist prompt: three lines at most, friendly tone, aimed at a man in
    /// his twenties.
    pub fn render(&self) -> String {
        format!(
            "현재 {} 기온이 섭씨 {}도야. 이 날씨에 어울리는 한국의 20대 남성 옷차림을 3줄 이내로 간결하게 추천해줘. 말투는 친근한 스타일리스트처럼 해줘.",
            self.location_name, self.temperature
        )
    }
}
