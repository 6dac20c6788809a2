use anyhow::{Context, Result};
use async_trait::async_trait;
use ollama_rs::models::ModelOptions;
use reqwest::Client;
use serde_json::json;

use super::GenerationParams;

#[async_trait]
pub trait LLMProvider: Send + Sync {
    async fn generate(&self, prompt: String, params: &GenerationParams) -> Result<String>;
}

pub struct OllamaProvider {
    client: ollama_rs::Ollama,
}

impl OllamaProvider {
    pub fn new(client: ollama_rs::Ollama) -> Self {
        Self { client }
    }
}

#[async_trait]
impl LLMProvider for OllamaProvider {
    async fn generate(&self, prompt: String, params: &GenerationParams) -> Result<String> {
        use ollama_rs::generation::chat::{request::ChatMessageRequest, ChatMessage};

        // Ollama has no minimum-length knob; min_length is advisory here.
        let options = ModelOptions::default()
            .temperature(params.temperature)
            .top_p(params.top_p)
            .repeat_penalty(params.repetition_penalty)
            .num_predict(params.max_length as i32);

        let request = ChatMessageRequest::new(params.model.clone(), vec![ChatMessage::user(prompt)])
            .options(options);

        let res = self
            .client
            .send_chat_messages(request)
            .await
            .context("Ollama chat request failed")?;

        Ok(res.message.content)
    }
}

/// Multiplicative repetition penalty (1.0 = off) as an OpenAI additive
/// frequency penalty, which is limited to [-2, 2].
fn frequency_penalty(repetition_penalty: f32) -> f32 {
    (repetition_penalty - 1.0).clamp(-2.0, 2.0)
}

pub struct OpenAICompatibleProvider {
    client: Client,
    base_url: String,
    api_key: Option<String>,
}

impl OpenAICompatibleProvider {
    pub fn new(base_url: String, api_key: Option<String>) -> Self {
        Self {
            client: Client::new(),
            base_url,
            api_key,
        }
    }
}

#[async_trait]
impl LLMProvider for OpenAICompatibleProvider {
    async fn generate(&self, prompt: String, params: &GenerationParams) -> Result<String> {
        let body = json!({
            "model": params.model,
            "messages": [{ "role": "user", "content": prompt }],
            "temperature": params.temperature,
            "top_p": params.top_p,
            "max_tokens": params.max_length,
            "frequency_penalty": frequency_penalty(params.repetition_penalty),
        });

        let mut request = self
            .client
            .post(format!("{}/chat/completions", self.base_url.trim_end_matches('/')))
            .json(&body);

        if let Some(ref key) = self.api_key {
            request = request.bearer_auth(key);
        }

        let res = request.send().await?.error_for_status()?;
        let json: serde_json::Value = res.json().await?;

        let content = json["choices"][0]["message"]["content"]
            .as_str()
            .context("Failed to parse content from OpenAI response")?;

        Ok(content.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{routing::post, Json, Router};
    use serde_json::Value;

    async fn echo_completion(Json(body): Json<Value>) -> Json<Value> {
        let reply = format!(
            "{} tokens at {}, penalty {:.2}",
            body["max_tokens"],
            body["messages"][0]["content"].as_str().unwrap_or_default(),
            body["frequency_penalty"].as_f64().unwrap_or(f64::NAN)
        );
        Json(json!({ "choices": [{ "message": { "role": "assistant", "content": reply } }] }))
    }

    async fn echo_ollama_chat(Json(body): Json<Value>) -> Json<Value> {
        let reply = format!(
            "{} at {}, repeat {:.1}",
            body["options"]["num_predict"],
            body["messages"][0]["content"].as_str().unwrap_or_default(),
            body["options"]["repeat_penalty"].as_f64().unwrap_or(f64::NAN)
        );
        Json(json!({
            "model": body["model"],
            "created_at": "2024-01-01T00:00:00Z",
            "message": { "role": "assistant", "content": reply },
            "done": true,
            "total_duration": 1,
            "load_duration": 1,
            "prompt_eval_count": 1,
            "prompt_eval_duration": 1,
            "eval_count": 1,
            "eval_duration": 1
        }))
    }

    #[tokio::test]
    async fn test_openai_compatible_sends_params() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let app = Router::new().route("/v1/chat/completions", post(echo_completion));
        tokio::spawn(async move { axum::serve(listener, app).await });

        let provider = OpenAICompatibleProvider::new(format!("http://{}/v1/", addr), Some("sk-test".into()));
        let reply = provider
            .generate("Write a summary".to_string(), &GenerationParams::default())
            .await
            .unwrap();
        assert_eq!(reply, "300 tokens at Write a summary, penalty 0.20");
    }

    #[test]
    fn test_frequency_penalty_mapping() {
        assert_eq!(frequency_penalty(1.0), 0.0);
        assert!((frequency_penalty(1.2) - 0.2).abs() < 1e-6);
        assert_eq!(frequency_penalty(5.0), 2.0);
        assert_eq!(frequency_penalty(-3.0), -2.0);
    }

    #[tokio::test]
    async fn test_ollama_sends_options() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        let app = Router::new().route("/api/chat", post(echo_ollama_chat));
        tokio::spawn(async move { axum::serve(listener, app).await });

        let provider = OllamaProvider::new(ollama_rs::Ollama::new("http://127.0.0.1".to_string(), port));
        let reply = provider
            .generate("Write a summary".to_string(), &GenerationParams::default())
            .await
            .unwrap();
        assert_eq!(reply, "300 at Write a summary, repeat 1.2");
    }

    #[tokio::test]
    async fn test_ollama_server_error_is_reported() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        let app = Router::new().route(
            "/api/chat",
            post(|| async { (axum::http::StatusCode::NOT_FOUND, Json(json!({ "error": "model not found" }))) }),
        );
        tokio::spawn(async move { axum::serve(listener, app).await });

        let provider = OllamaProvider::new(ollama_rs::Ollama::new("http://127.0.0.1".to_string(), port));
        let err = provider
            .generate("hi".to_string(), &GenerationParams::default())
            .await
            .unwrap_err();
        assert!(err.to_string().contains("Ollama chat request failed"));
    }

    #[tokio::test]
    async fn test_openai_compatible_rejects_empty_choices() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let app = Router::new().route(
            "/chat/completions",
            post(|| async { Json(json!({ "choices": [] })) }),
        );
        tokio::spawn(async move { axum::serve(listener, app).await });

        let provider = OpenAICompatibleProvider::new(format!("http://{}", addr), None);
        let err = provider
            .generate("hi".to_string(), &GenerationParams::default())
            .await
            .unwrap_err();
        assert!(err.to_string().contains("Failed to parse content"));
    }
}
