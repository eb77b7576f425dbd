//! OpenRouter chat-completion client for article enrichment.
//!
//! Each article gets two independent enrichment calls: one producing a short
//! summary, one producing a topic tag list. Both follow the same shape: build
//! a Portuguese prompt around the article body, POST it to OpenRouter, pull
//! `choices[0].message.content` out of the chat-completion envelope, and
//! re-parse that content as JSON: the model is instructed to answer with a
//! JSON object encoded as text, so the payload needs a second parse pass.
//!
//! Every failure mode (transport, HTTP status, empty envelope, malformed
//! payload, model-signalled error) is a [`EnrichmentError`] variant returned
//! to the caller; nothing is swallowed. There is deliberately no retry and
//! no schema coercion: a non-compliant model answer skips the article.

use crate::utils::truncate_for_log;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, instrument};

const OPENROUTER_URL: &str = "https://openrouter.ai/api/v1/chat/completions";

/// Institutional boilerplate appended to the tag prompt so the model tags
/// articles in the right context.
const FCV_CONTEXT: &str = "A Fundação Cristiano Varella é uma instituição sem fins \
lucrativos, localizada em Muriaé, Minas Gerais, que se dedica ao combate ao câncer. \
Fundada em 1995, a FCV mantém o Hospital do Câncer de Muriaé, um dos maiores e mais \
completos centros de tratamento oncológico do país.";

/// Failure modes of an enrichment call.
#[derive(Debug, Error)]
pub enum EnrichmentError {
    /// The HTTP request itself failed (DNS, connection, body read).
    #[error("enrichment request failed: {0}")]
    Http(#[from] reqwest::Error),
    /// The API answered with a non-success status.
    #[error("enrichment API returned HTTP {0}")]
    Status(reqwest::StatusCode),
    /// The chat-completion envelope carried no choices.
    #[error("enrichment response carried no choices")]
    EmptyResponse,
    /// The nested payload was not valid JSON. Carries a truncated preview of
    /// the offending content so the failure is diagnosable from the log.
    #[error("model returned a malformed payload ({source}); content: {content}")]
    MalformedPayload {
        source: serde_json::Error,
        content: String,
    },
    /// The payload parsed but carried an `erro` field.
    #[error("model signalled an error: {0}")]
    Model(String),
    /// The payload parsed but the expected field was absent or empty.
    #[error("model payload is missing `{0}`")]
    MissingField(&'static str),
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<Message<'a>>,
}

#[derive(Debug, Serialize)]
struct Message<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: String,
}

/// Nested payload of the summary call: `{"resumo": "..."}`.
#[derive(Debug, Deserialize)]
struct ResumoPayload {
    resumo: Option<String>,
    erro: Option<String>,
}

/// Nested payload of the tag call: `{"noticiaID": 1301, "tags": [...]}`.
#[derive(Debug, Deserialize)]
struct TagsPayload {
    #[serde(rename = "noticiaID")]
    #[allow(dead_code)]
    noticia_id: Option<i64>,
    tags: Option<Vec<String>>,
    erro: Option<String>,
}

/// Client for the two enrichment operations.
///
/// Holds the shared HTTP client, the bearer token, and the model identifier.
/// The token is injected at startup; a missing token aborts the program
/// before this type is ever constructed.
#[derive(Debug)]
pub struct EnrichmentClient {
    http: reqwest::Client,
    api_key: String,
    model: String,
}

impl EnrichmentClient {
    pub fn new(api_key: String, model: String) -> Result<Self, reqwest::Error> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("fcv_news/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            http,
            api_key,
            model,
        })
    }

    /// Generate a short summary for an article body.
    #[instrument(level = "info", skip_all)]
    pub async fn summarize(&self, conteudo: &str) -> Result<String, EnrichmentError> {
        let content = self.chat(&summary_prompt(conteudo)).await?;
        summary_from_content(&content)
    }

    /// Generate topic tags for an article body.
    #[instrument(level = "info", skip_all, fields(%id))]
    pub async fn generate_tags(
        &self,
        id: u32,
        conteudo: &str,
    ) -> Result<Vec<String>, EnrichmentError> {
        let content = self.chat(&tags_prompt(id, conteudo)).await?;
        tags_from_content(&content)
    }

    /// One chat-completion round trip; returns the raw message content.
    async fn chat(&self, prompt: &str) -> Result<String, EnrichmentError> {
        let request = ChatRequest {
            model: &self.model,
            messages: vec![Message {
                role: "user",
                content: prompt,
            }],
        };

        let response = self
            .http
            .post(OPENROUTER_URL)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(EnrichmentError::Status(status));
        }

        let envelope: ChatResponse = response.json().await?;
        let content = content_of(envelope)?;
        debug!(bytes = content.len(), "Received enrichment content");
        Ok(content)
    }
}

fn summary_prompt(conteudo: &str) -> String {
    format!(
        "\n{conteudo}\n\nGere um resumo de no máximo 4 linhas sobre o texto acima, \
         apenas me retorne um json: {{\"resumo\": \"...\"}}\n"
    )
}

fn tags_prompt(id: u32, conteudo: &str) -> String {
    format!(
        "NoticiaID: {id} :\n\n{conteudo}\n\n----\n\ngere tags baseado nesse texto acima \
         e me retorne em json string: {{\"noticiaID\": {id}, \"tags\": [\"etc..\", \"etc..\"]}}, \
         não me retorne mais nada, além do json.\n\ncontexto:\n\n{FCV_CONTEXT}"
    )
}

/// Pull `choices[0].message.content` out of the chat-completion envelope.
fn content_of(envelope: ChatResponse) -> Result<String, EnrichmentError> {
    envelope
        .choices
        .into_iter()
        .next()
        .map(|choice| choice.message.content)
        .ok_or(EnrichmentError::EmptyResponse)
}

fn malformed(source: serde_json::Error, content: &str) -> EnrichmentError {
    EnrichmentError::MalformedPayload {
        source,
        content: truncate_for_log(content, 300),
    }
}

/// Second parse pass for the summary payload.
fn summary_from_content(content: &str) -> Result<String, EnrichmentError> {
    let payload: ResumoPayload =
        serde_json::from_str(content).map_err(|e| malformed(e, content))?;
    if let Some(erro) = payload.erro {
        return Err(EnrichmentError::Model(erro));
    }
    match payload.resumo {
        Some(resumo) if !resumo.trim().is_empty() => Ok(resumo),
        _ => Err(EnrichmentError::MissingField("resumo")),
    }
}

/// Second parse pass for the tag payload. The article keeps the `tags` list
/// alone; the echoed `noticiaID` is ignored.
fn tags_from_content(content: &str) -> Result<Vec<String>, EnrichmentError> {
    let payload: TagsPayload =
        serde_json::from_str(content).map_err(|e| malformed(e, content))?;
    if let Some(erro) = payload.erro {
        return Err(EnrichmentError::Model(erro));
    }
    match payload.tags {
        Some(tags) if !tags.is_empty() => Ok(tags),
        _ => Err(EnrichmentError::MissingField("tags")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_of_first_choice() {
        let envelope: ChatResponse = serde_json::from_str(
            r#"{
                "choices": [
                    {"message": {"role": "assistant", "content": "{\"resumo\": \"Resumo curto\"}"}},
                    {"message": {"role": "assistant", "content": "ignored"}}
                ]
            }"#,
        )
        .unwrap();

        let content = content_of(envelope).unwrap();
        assert_eq!(content, "{\"resumo\": \"Resumo curto\"}");
    }

    #[test]
    fn test_content_of_empty_choices() {
        let envelope: ChatResponse = serde_json::from_str(r#"{"choices": []}"#).unwrap();
        assert!(matches!(
            content_of(envelope),
            Err(EnrichmentError::EmptyResponse)
        ));
    }

    #[test]
    fn test_summary_payload_parses() {
        let resumo = summary_from_content(r#"{"resumo": "Resumo curto"}"#).unwrap();
        assert_eq!(resumo, "Resumo curto");
    }

    #[test]
    fn test_summary_payload_malformed() {
        let err = summary_from_content("Aqui está o resumo: ...").unwrap_err();
        assert!(matches!(err, EnrichmentError::MalformedPayload { .. }));
    }

    #[test]
    fn test_summary_payload_with_model_error() {
        let err = summary_from_content(r#"{"erro": "sem conteudo"}"#).unwrap_err();
        assert!(matches!(err, EnrichmentError::Model(_)));
    }

    #[test]
    fn test_summary_payload_missing_resumo() {
        let err = summary_from_content(r#"{"resumo": "  "}"#).unwrap_err();
        assert!(matches!(err, EnrichmentError::MissingField("resumo")));
    }

    #[test]
    fn test_tags_payload_parses() {
        let tags =
            tags_from_content(r#"{"noticiaID": 1301, "tags": ["saude", "oncologia"]}"#).unwrap();
        assert_eq!(tags, vec!["saude".to_string(), "oncologia".to_string()]);
    }

    #[test]
    fn test_tags_payload_without_list() {
        let err = tags_from_content(r#"{"noticiaID": 1301}"#).unwrap_err();
        assert!(matches!(err, EnrichmentError::MissingField("tags")));
    }

    #[test]
    fn test_tags_payload_truncated() {
        let err = tags_from_content(r#"{"noticiaID": 1301, "tags": ["sau"#).unwrap_err();
        assert!(matches!(err, EnrichmentError::MalformedPayload { .. }));
    }

    #[test]
    fn test_summary_prompt_embeds_body() {
        let prompt = summary_prompt("Corpo de teste");
        assert!(prompt.contains("Corpo de teste"));
        assert!(prompt.contains("resumo"));
    }

    #[test]
    fn test_tags_prompt_embeds_id_body_and_context() {
        let prompt = tags_prompt(1301, "Corpo de teste");
        assert!(prompt.contains("NoticiaID: 1301"));
        assert!(prompt.contains("Corpo de teste"));
        assert!(prompt.contains("Fundação Cristiano Varella"));
    }
}
