//! `ReadingOracle` backed by an `LlmProvider`.

use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::error::GenerationError;
use crate::llm::{ChatMessage, CompletionRequest, FinishReason, ImagePart, LlmProvider};
use crate::quiz::model::Profile;
use crate::quiz::reading::{ChartReading, PalmReading};
use crate::quiz::zodiac::ZodiacSign;

use super::ReadingOracle;
use super::prompts::{
    CHART_SYSTEM_PROMPT, PALM_SYSTEM_PROMPT, PALM_USER_PROMPT, chart_prompt, chart_schema,
    palm_schema,
};

/// Sampling settings for reading generation.
#[derive(Debug, Clone)]
pub struct OracleConfig {
    pub temperature: f32,
    /// Output cap. `None` leaves it to the model.
    pub max_tokens: Option<u32>,
}

impl Default for OracleConfig {
    fn default() -> Self {
        Self {
            temperature: 0.9,
            max_tokens: None,
        }
    }
}

pub struct LlmOracle {
    llm: Arc<dyn LlmProvider>,
    config: OracleConfig,
}

impl LlmOracle {
    pub fn new(llm: Arc<dyn LlmProvider>, config: OracleConfig) -> Self {
        Self { llm, config }
    }

    async fn complete_json(
        &self,
        reading: &'static str,
        messages: Vec<ChatMessage>,
        schema: serde_json::Value,
    ) -> Result<String, GenerationError> {
        let mut request = CompletionRequest::new(messages)
            .with_temperature(self.config.temperature)
            .with_response_schema(schema);
        if let Some(max) = self.config.max_tokens {
            request = request.with_max_tokens(max);
        }

        let response = self.llm.complete(request).await?;
        debug!(
            reading,
            input_tokens = response.input_tokens,
            output_tokens = response.output_tokens,
            "Reading generation returned"
        );

        // Cut-off output is rejected even if a prefix happens to parse.
        if response.finish_reason == FinishReason::Length {
            return Err(GenerationError::Truncated { reading });
        }
        if response.content.trim().is_empty() {
            return Err(GenerationError::EmptyResponse { reading });
        }
        Ok(extract_json_object(&response.content))
    }
}

#[async_trait]
impl ReadingOracle for LlmOracle {
    async fn generate_chart(&self, profile: &Profile) -> Result<ChartReading, GenerationError> {
        info!(model = self.llm.model_name(), "Generating birth chart");

        let json = self
            .complete_json(
                "chart",
                vec![
                    ChatMessage::system(CHART_SYSTEM_PROMPT),
                    ChatMessage::user(chart_prompt(profile)),
                ],
                chart_schema(),
            )
            .await?;

        let payload: ChartPayload =
            serde_json::from_str(&json).map_err(|e| GenerationError::Malformed {
                reading: "chart",
                reason: e.to_string(),
            })?;

        payload.into_reading(&profile.birth_date)
    }

    async fn analyze_palm(&self, image: &str) -> Result<PalmReading, GenerationError> {
        info!(model = self.llm.model_name(), "Analyzing palm photo");

        let image = split_data_url(image);
        if image.data.is_empty() {
            return Err(GenerationError::Invalid {
                reading: "palm",
                reason: "image payload is empty".to_string(),
            });
        }

        let json = self
            .complete_json(
                "palm",
                vec![
                    ChatMessage::system(PALM_SYSTEM_PROMPT),
                    ChatMessage::user(PALM_USER_PROMPT).with_image(image),
                ],
                palm_schema(),
            )
            .await?;

        let payload: PalmPayload =
            serde_json::from_str(&json).map_err(|e| GenerationError::Malformed {
                reading: "palm",
                reason: e.to_string(),
            })?;

        payload.into_reading()
    }
}

/// Chart as the model returns it, before checks.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ChartPayload {
    sun_sign: String,
    moon_sign: String,
    ascendant: String,
    prediction: String,
    power_word: String,
    lucky_color: String,
    compatibility_note: String,
}

impl ChartPayload {
    fn into_reading(self, birth_date: &str) -> Result<ChartReading, GenerationError> {
        for (field, value) in [
            ("moonSign", &self.moon_sign),
            ("ascendant", &self.ascendant),
            ("prediction", &self.prediction),
            ("powerWord", &self.power_word),
        ] {
            require_text("chart", field, value)?;
        }

        // The calendar is authoritative; the model's answer only matters when
        // the date itself is unusable.
        let sun_sign = match ZodiacSign::for_date_str(birth_date) {
            Some(sign) => sign,
            None => self
                .sun_sign
                .parse()
                .map_err(|reason| GenerationError::Invalid {
                    reading: "chart",
                    reason,
                })?,
        };

        Ok(ChartReading {
            sun_sign,
            moon_sign: self.moon_sign.trim().to_string(),
            ascendant: self.ascendant.trim().to_string(),
            prediction: self.prediction.trim().to_string(),
            power_word: self.power_word.trim().to_string(),
            lucky_color: self.lucky_color.trim().to_string(),
            compatibility_note: self.compatibility_note.trim().to_string(),
        })
    }
}

/// Palm reading as the model returns it. Scores are wide so out-of-range
/// values are reported as such instead of as a parse error.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PalmPayload {
    love_score: i64,
    health_score: i64,
    wisdom_score: i64,
    career_score: i64,
    love_text: String,
    health_text: String,
    wisdom_text: String,
    career_text: String,
    summary: String,
    #[serde(default)]
    dominant_hand_prediction: String,
}

impl PalmPayload {
    fn into_reading(self) -> Result<PalmReading, GenerationError> {
        for (field, value) in [
            ("loveText", &self.love_text),
            ("healthText", &self.health_text),
            ("wisdomText", &self.wisdom_text),
            ("careerText", &self.career_text),
            ("summary", &self.summary),
        ] {
            require_text("palm", field, value)?;
        }

        if self.dominant_hand_prediction.trim().is_empty() {
            warn!("Palm reading has no dominant hand prediction");
        }

        Ok(PalmReading {
            love_score: score("loveScore", self.love_score)?,
            health_score: score("healthScore", self.health_score)?,
            wisdom_score: score("wisdomScore", self.wisdom_score)?,
            career_score: score("careerScore", self.career_score)?,
            love_text: self.love_text,
            health_text: self.health_text,
            wisdom_text: self.wisdom_text,
            career_text: self.career_text,
            summary: self.summary,
            dominant_hand_prediction: self.dominant_hand_prediction,
        })
    }
}

fn require_text(reading: &'static str, field: &str, value: &str) -> Result<(), GenerationError> {
    if value.trim().is_empty() {
        return Err(GenerationError::Invalid {
            reading,
            reason: format!("{field} is empty"),
        });
    }
    Ok(())
}

fn score(field: &str, value: i64) -> Result<u8, GenerationError> {
    if !(0..=100).contains(&value) {
        return Err(GenerationError::Invalid {
            reading: "palm",
            reason: format!("{field} out of range: {value}"),
        });
    }
    Ok(value as u8)
}

/// Split `data:<mime>;base64,<payload>` into its parts. Bare base64 is
/// assumed to be JPEG.
pub fn split_data_url(image: &str) -> ImagePart {
    let image = image.trim();
    if let Some(rest) = image.strip_prefix("data:")
        && let Some((meta, data)) = rest.split_once(',')
    {
        let mime_type = meta
            .split(';')
            .next()
            .filter(|m| !m.is_empty())
            .unwrap_or("image/jpeg");
        return ImagePart {
            mime_type: mime_type.to_string(),
            data: data.to_string(),
        };
    }
    ImagePart {
        mime_type: "image/jpeg".to_string(),
        data: image.to_string(),
    }
}

/// Pull a JSON object out of model output that may be fenced or padded.
fn extract_json_object(text: &str) -> String {
    let trimmed = text.trim();

    if trimmed.starts_with('{') {
        return trimmed.to_string();
    }

    if let Some(start) = trimmed.find("```") {
        let fenced = &trimmed[start + 3..];
        let fenced = fenced.strip_prefix("json").unwrap_or(fenced);
        if let Some(end) = fenced.find("```")
            && fenced[..end].trim().starts_with('{')
        {
            return fenced[..end].trim().to_string();
        }
    }

    if let (Some(start), Some(end)) = (trimmed.find('{'), trimmed.rfind('}'))
        && end > start
    {
        return trimmed[start..=end].to_string();
    }

    trimmed.to_string()
}
