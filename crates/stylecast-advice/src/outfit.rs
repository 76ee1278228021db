//! Structured outfit recommendations for a team member profile.

use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::client::GeminiClient;
use crate::error::AdviceError;

/// Profile details the recommendation is tailored to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemberProfile {
    pub location: String,
    pub style: String,
    pub gender: String,
}

impl MemberProfile {
    pub fn render_prompt(&self) -> String {
        format!(
            r#"사용자 정보:
- 거주지: {}
- 선호 스타일: {}
- 성별: {}

위 정보를 바탕으로 오늘 입기 좋은 패션 아이템 4가지를 추천해줘.
반드시 아래의 JSON 형식으로만 응답해줘. 다른 설명은 생략해.
JSON 예시:
{{
  "top": "상의 아이템 이름",
  "bottom": "하의 아이템 이름",
  "shoes": "신발 이름",
  "accessory": "액세서리 이름",
  "comment": "한 줄 스타일링 팁"
}}"#,
            self.location, self.style, self.gender
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutfitRecommendation {
    pub top: String,
    pub bottom: String,
    pub shoes: String,
    pub accessory: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

/// Parse model output into a recommendation, tolerating Markdown code fences
/// around the JSON object.
pub fn parse_outfit(text: &str) -> Result<OutfitRecommendation, AdviceError> {
    let cleaned = text.replace("```json", "").replace("```", "");
    let cleaned = cleaned.trim();
    if cleaned.is_empty() {
        return Err(AdviceError::EmptyResponse);
    }
    serde_json::from_str(cleaned).map_err(|e| AdviceError::Malformed(e.to_string()))
}

impl GeminiClient {
    /// Ask for a four-item outfit for the given member.
    #[instrument(skip(self, profile), level = "info")]
    pub async fn recommend_outfit(
        &self,
        profile: &MemberProfile,
    ) -> Result<OutfitRecommendation, AdviceError> {
        let text = self.generate_text(&profile.render_prompt()).await?;
        parse_outfit(&text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_plain_json() {
        let outfit = parse_outfit(
            r#"{"top":"니트","bottom":"슬랙스","shoes":"로퍼","accessory":"시계"}"#,
        )
        .unwrap();
        assert_eq!(outfit.top, "니트");
        assert_eq!(outfit.accessory, "시계");
        assert!(outfit.comment.is_none());
    }

    #[test]
    fn test_parse_fenced_json() {
        let text = "```json\n{\"top\":\"셔츠\",\"bottom\":\"청바지\",\"shoes\":\"스니커즈\",\"accessory\":\"모자\",\"comment\":\"가볍게\"}\n```";
        let outfit = parse_outfit(text).unwrap();
        assert_eq!(outfit.shoes, "스니커즈");
        assert_eq!(outfit.comment.as_deref(), Some("가볍게"));
    }

    #[test]
    fn test_parse_prose_is_malformed() {
        let err = parse_outfit("오늘은 코트를 입으세요").unwrap_err();
        assert!(matches!(err, AdviceError::Malformed(_)));
    }

    #[test]
    fn test_parse_only_fences_is_empty() {
        let err = parse_outfit("```json\n```").unwrap_err();
        assert!(matches!(err, AdviceError::EmptyResponse));
    }

    #[test]
    fn test_prompt_mentions_profile() {
        let prompt = MemberProfile {
            location: "서울".into(),
            style: "미니멀".into(),
            gender: "여성".into(),
        }
        .render_prompt();
        assert!(prompt.contains("거주지: 서울"));
        assert!(prompt.contains("선호 스타일: 미니멀"));
        assert!(prompt.contains("\"accessory\""));
    }
}
