//! Prompts and response schemas for the two generation calls.

use serde_json::{Value, json};

use crate::quiz::model::Profile;

pub const CHART_SYSTEM_PROMPT: &str = "\
You are a warm, mystical astrologer. You answer only with JSON matching the \
given schema. Keep predictions to two sentences.";

pub const PALM_SYSTEM_PROMPT: &str = "\
You are an experienced palm reader. You answer only with JSON matching the \
given schema. Scores are integers from 0 to 100.";

pub const PALM_USER_PROMPT: &str = "\
Analyze this palm for palmistry. Identify the major lines (Heart, Head, Life, Fate). \
Provide scores and brief mystical interpretations for Love, Health, Wisdom, and Career, \
an overall two sentence summary, and a short prediction drawn from the dominant hand.";

/// Build the user prompt for a birth chart from the profile snapshot.
pub fn chart_prompt(profile: &Profile) -> String {
    let gender = profile
        .gender
        .map(|g| g.to_string())
        .unwrap_or_else(|| "person".to_string());
    let time = profile.birth_time.as_deref().unwrap_or("Unknown Time");
    let goals = if profile.goals.is_empty() {
        "None given".to_string()
    } else {
        profile
            .goals
            .iter()
            .map(|g| g.to_string())
            .collect::<Vec<_>>()
            .join(", ")
    };
    let relationship = profile
        .relationship_status
        .map(|r| r.to_string())
        .unwrap_or_else(|| "Not given".to_string());
    let element = profile
        .element
        .map(|e| e.to_string())
        .unwrap_or_else(|| "Not given".to_string());
    let color = profile
        .favorite_color
        .map(|c| c.to_string())
        .unwrap_or_else(|| "Not given".to_string());

    format!(
        "Generate a birth chart summary for a {gender} born on {date} at {time} in {place}.\n\
         Goals: {goals}.\n\
         Relationship status: {relationship}.\n\
         Element preference: {element}.\n\
         Favorite color: {color}.\n\n\
         Provide the Sun, Moon, and Ascendant signs (calculate accurately if possible, \
         otherwise estimate based on date and time). Provide a short personalized prediction, \
         a single power word for their current cosmic energy, a lucky color, and a one \
         sentence compatibility note.",
        date = profile.birth_date,
        place = profile.birth_place,
    )
}

pub fn chart_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "sunSign": { "type": "STRING" },
            "moonSign": { "type": "STRING" },
            "ascendant": { "type": "STRING" },
            "prediction": { "type": "STRING", "description": "A mystical 2-sentence prediction based on the user data" },
            "powerWord": { "type": "STRING", "description": "A single word representing their current cosmic energy" },
            "luckyColor": { "type": "STRING" },
            "compatibilityNote": { "type": "STRING", "description": "One sentence on who they match best with" }
        },
        "required": ["sunSign", "moonSign", "ascendant", "prediction", "powerWord", "luckyColor", "compatibilityNote"]
    })
}

pub fn palm_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "loveScore": { "type": "INTEGER", "description": "Score from 0-100 for love line" },
            "healthScore": { "type": "INTEGER", "description": "Score from 0-100 for health/life line" },
            "wisdomScore": { "type": "INTEGER", "description": "Score from 0-100 for wisdom/head line" },
            "careerScore": { "type": "INTEGER", "description": "Score from 0-100 for career/fate line" },
            "loveText": { "type": "STRING", "description": "Short interpretation of love line" },
            "healthText": { "type": "STRING", "description": "Short interpretation of health line" },
            "wisdomText": { "type": "STRING", "description": "Short interpretation of head line" },
            "careerText": { "type": "STRING", "description": "Short interpretation of fate line" },
            "summary": { "type": "STRING", "description": "Overall 2 sentence summary of the palm reading" },
            "dominantHandPrediction": { "type": "STRING", "description": "Short prediction from the dominant hand" }
        },
        "required": ["loveScore", "healthScore", "wisdomScore", "careerScore", "loveText", "healthText", "wisdomText", "careerText", "summary", "dominantHandPrediction"]
    })
}
