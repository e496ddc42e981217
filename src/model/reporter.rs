use log::{debug, info};
use reqwest::Client;
use serde_json::{json, Value};

use crate::error::ReportError;
use crate::triage::vocabulary::{lesion_label, UNKNOWN_LESION};
use crate::triage::{LocationCode, Sex};
use crate::web::models::{Message, Role};

pub const DEFAULT_MAX_TOKENS: u32 = 150;

const SYSTEM_PROMPT: &str = "You are a friendly and helpful dermatology assistant. \
You explain skin cancer results in a concise, calm, simple language that's easy for anyone to understand. \
You avoid medical jargon, speak with warmth, and gently guide the patient on what to do next. \
Limit to 150 words.";

/// Patient context for one explanation report.
#[derive(Debug, Clone)]
pub struct ReportRequest<'a> {
    pub top_class: &'a str,
    pub age: u32,
    pub sex: Sex,
    pub location: LocationCode,
    pub lifestyle_work: &'a str,
}

impl ReportRequest<'_> {
    /// Readable lesion name, or the "Unknown Lesion" placeholder.
    pub fn lesion_name(&self) -> &'static str {
        lesion_label(&self.top_class.to_lowercase()).unwrap_or(UNKNOWN_LESION)
    }

    pub fn prompt(&self) -> String {
        format!(
            "A dermatology AI model predicted: {lesion}\n\
             \n\
             Patient details:\n\
             - Age: {age}\n\
             - Sex: {sex}\n\
             - Lesion Location: {location}\n\
             - Lifestyle/Work Type: {lifestyle}\n\
             \n\
             Please explain in a friendly and concise manner, why it might appear at this age, body location, and sex, \
             how the person's lifestyle or work may affect it, and what they should do next.",
            lesion = self.lesion_name(),
            age = self.age,
            sex = self.sex,
            location = self.location,
            lifestyle = self.lifestyle_work,
        )
    }
}

// A wrapper for an OpenAI-compatible chat completion API
pub struct Reporter {
    base_url: String,
    api_key: String,
    model: String,
    client: Client,
}

impl Reporter {
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        model: impl Into<String>,
        client: Client,
    ) -> Self {
        let base_url = base_url.into();
        let model = model.into();
        info!("Using language model {} at: {}", model, base_url);
        Self {
            base_url,
            api_key: api_key.into(),
            model,
            client,
        }
    }

    /// Ask the language model for a patient-friendly explanation.
    ///
    /// Returns the first completion verbatim.
    pub async fn compose(
        &self,
        request: &ReportRequest<'_>,
        max_tokens: u32,
    ) -> Result<String, ReportError> {
        let url = format!("{}/v1/chat/completions", self.base_url.trim_end_matches('/'));

        let messages = vec![
            Message {
                role: Role::System,
                content: SYSTEM_PROMPT.to_string(),
            },
            Message {
                role: Role::User,
                content: request.prompt(),
            },
        ];

        let payload = json!({
            "model": self.model,
            "messages": messages,
            "max_tokens": max_tokens
        });

        info!(
            "Requesting report for {} with max_tokens: {}",
            request.lesion_name(),
            max_tokens
        );
        debug!("Payload: {}", payload);

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&payload)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await?;
            return Err(ReportError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let response_json: Value = response.json().await?;
        debug!("Response JSON: {}", response_json);

        let content = response_json
            .get("choices")
            .and_then(|choices| choices.get(0))
            .and_then(|choice| choice.get("message"))
            .and_then(|message| message.get("content"))
            .and_then(|content| content.as_str())
            .ok_or(ReportError::MissingContent)?;

        info!("Report length: {} characters", content.len());
        Ok(content.to_string())
    }
}
