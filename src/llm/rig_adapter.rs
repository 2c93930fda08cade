//! Bridges rig's `CompletionModel` to our `LlmProvider` trait.

use async_trait::async_trait;
use rig::OneOrMany;
use rig::completion::{AssistantContent, CompletionError, CompletionModel, Message};
use rig::message::{ImageMediaType, UserContent};
use serde_json::{Value, json};

use crate::error::LlmError;

use super::provider::{
    ChatMessage, CompletionRequest, CompletionResponse, FinishReason, ImagePart, LlmProvider, Role,
};

/// Wraps any rig completion model behind `LlmProvider`.
pub struct RigAdapter<M: CompletionModel> {
    model: M,
    model_name: String,
    provider: &'static str,
}

impl<M: CompletionModel> RigAdapter<M> {
    pub fn new(model: M, model_name: &str, provider: &'static str) -> Self {
        Self {
            model,
            model_name: model_name.to_string(),
            provider,
        }
    }
}

#[async_trait]
impl<M: CompletionModel + 'static> LlmProvider for RigAdapter<M> {
    fn model_name(&self) -> &str {
        &self.model_name
    }

    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, LlmError> {
        let (preamble, mut history) = convert_messages(&request.messages, self.provider)?;
        let prompt = history.pop().ok_or_else(|| LlmError::RequestFailed {
            provider: self.provider.to_string(),
            reason: "completion request has no user message".to_string(),
        })?;

        let mut builder = self.model.completion_request(prompt).messages(history);
        if let Some(preamble) = preamble {
            builder = builder.preamble(preamble);
        }
        if let Some(t) = request.temperature {
            builder = builder.temperature(f64::from(t));
        }
        if let Some(max) = request.max_tokens {
            builder = builder.max_tokens(u64::from(max));
        }
        if let Some(params) = generation_config(&request) {
            builder = builder.additional_params(params);
        }

        tracing::debug!(model = %self.model_name, "Sending completion request");
        let response = builder
            .send()
            .await
            .map_err(|e| map_completion_error(self.provider, e))?;

        let content: String = response
            .choice
            .into_iter()
            .filter_map(|c| match c {
                AssistantContent::Text(text) => Some(text.text),
                _ => None,
            })
            .collect();

        let output_tokens = saturate(response.usage.output_tokens);
        Ok(CompletionResponse {
            content,
            input_tokens: saturate(response.usage.input_tokens),
            output_tokens,
            finish_reason: finish_reason(output_tokens, request.max_tokens),
        })
    }
}

/// Split out system text as the preamble and convert the rest, in order.
fn convert_messages(
    messages: &[ChatMessage],
    provider: &str,
) -> Result<(Option<String>, Vec<Message>), LlmError> {
    let system: Vec<&str> = messages
        .iter()
        .filter(|m| m.role == Role::System)
        .map(|m| m.content.as_str())
        .collect();
    let preamble = (!system.is_empty()).then(|| system.join("\n\n"));

    let mut converted = Vec::new();
    for message in messages.iter().filter(|m| m.role == Role::User) {
        converted.push(if message.images.is_empty() {
            Message::user(message.content.clone())
        } else {
            user_with_images(message, provider)?
        });
    }
    Ok((preamble, converted))
}

fn user_with_images(message: &ChatMessage, provider: &str) -> Result<Message, LlmError> {
    let mut parts: Vec<UserContent> = message
        .images
        .iter()
        .map(|img| UserContent::image_base64(img.data.clone(), Some(media_type(img)), None))
        .collect();
    if !message.content.is_empty() {
        parts.push(UserContent::text(message.content.clone()));
    }
    let content = OneOrMany::many(parts).map_err(|e| LlmError::RequestFailed {
        provider: provider.to_string(),
        reason: e.to_string(),
    })?;
    Ok(Message::User { content })
}

fn media_type(image: &ImagePart) -> ImageMediaType {
    match image.mime_type.as_str() {
        "image/png" => ImageMediaType::PNG,
        "image/webp" => ImageMediaType::WEBP,
        "image/gif" => ImageMediaType::GIF,
        "image/heic" => ImageMediaType::HEIC,
        _ => ImageMediaType::JPEG,
    }
}

/// Gemini reads JSON mode from `generationConfig` in the extra params.
fn generation_config(request: &CompletionRequest) -> Option<Value> {
    let schema = request.response_schema.as_ref()?;
    let mut config = json!({
        "responseMimeType": "application/json",
        "responseSchema": schema,
    });
    if let Some(t) = request.temperature {
        config["temperature"] = json!(t);
    }
    if let Some(max) = request.max_tokens {
        config["maxOutputTokens"] = json!(max);
    }
    Some(json!({ "generationConfig": config }))
}

/// rig does not surface the stop reason generically; a response that used
/// the whole token budget is treated as cut off.
fn finish_reason(output_tokens: u32, max_tokens: Option<u32>) -> FinishReason {
    match max_tokens {
        Some(max) if output_tokens >= max => FinishReason::Length,
        _ => FinishReason::Stop,
    }
}

fn saturate(tokens: u64) -> u32 {
    u32::try_from(tokens).unwrap_or(u32::MAX)
}

/// Map a rig failure onto our error kinds. Provider errors carry the HTTP
/// body, so auth and quota failures are recognised from its text.
fn map_completion_error(provider: &str, error: CompletionError) -> LlmError {
    let provider = provider.to_string();
    match error {
        CompletionError::JsonError(e) => LlmError::InvalidResponse {
            provider,
            reason: e.to_string(),
        },
        CompletionError::ProviderError(body) | CompletionError::ResponseError(body) => {
            classify_provider_error(provider, body)
        }
        other => LlmError::RequestFailed {
            provider,
            reason: other.to_string(),
        },
    }
}

fn classify_provider_error(provider: String, body: String) -> LlmError {
    let lower = body.to_ascii_lowercase();
    if lower.contains("401")
        || lower.contains("403")
        || lower.contains("permission_denied")
        || lower.contains("unauthenticated")
        || lower.contains("api key not valid")
    {
        LlmError::AuthFailed { provider }
    } else if lower.contains("429") || lower.contains("resource_exhausted") {
        LlmError::RateLimited {
            provider,
            retry_after: None,
        }
    } else {
        LlmError::RequestFailed {
            provider,
            reason: body.chars().take(300).collect(),
        }
    }
}
