//! Runtime configuration
//!
//! Read from `PROPOSAL_*` environment variables (a `.env` file is loaded
//! first by the binary). Every setting has a default, so an empty
//! environment gives a working local setup.

use std::env;
use std::path::PathBuf;
use std::str::FromStr;

use anyhow::{bail, Context, Result};

/// Which text-generation backend the writing agent talks to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LlmBackend {
    Ollama,
    OpenAi,
    /// No service: proposals use the template text
    Disabled,
}

impl FromStr for LlmBackend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "ollama" => Ok(LlmBackend::Ollama),
            "openai" => Ok(LlmBackend::OpenAi),
            "none" | "off" | "disabled" => Ok(LlmBackend::Disabled),
            other => bail!("Unknown LLM backend '{}' (expected ollama, openai or none)", other),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ProposalConfig {
    pub pricing_rules_path: PathBuf,
    pub case_studies_path: PathBuf,
    pub template_path: PathBuf,
    pub history_path: PathBuf,
    pub llm_backend: LlmBackend,
    pub llm_model: String,
    pub ollama_host: String,
    pub ollama_port: u16,
    pub openai_url: String,
    pub openai_api_key: Option<String>,
    pub enable_embeddings: bool,
    pub webdriver_url: Option<String>,
    pub top_k: usize,
    pub company_name: String,
    pub port: u16,
}

impl Default for ProposalConfig {
    fn default() -> Self {
        Self {
            pricing_rules_path: PathBuf::from("data/pricing_rules.json"),
            case_studies_path: PathBuf::from("data/case_studies.json"),
            template_path: PathBuf::from("data/templates/proposal_template.html"),
            history_path: PathBuf::from("proposal_history.json"),
            llm_backend: LlmBackend::Ollama,
            llm_model: "llama3.2:3b".to_string(),
            ollama_host: "http://localhost".to_string(),
            ollama_port: 11434,
            openai_url: "https://api.openai.com/v1".to_string(),
            openai_api_key: None,
            enable_embeddings: true,
            webdriver_url: None,
            top_k: crate::agent::case_study::DEFAULT_TOP_K,
            company_name: crate::agent::template::DEFAULT_COMPANY_NAME.to_string(),
            port: 8080,
        }
    }
}

fn var(name: &str) -> Option<String> {
    env::var(format!("PROPOSAL_{}", name))
        .ok()
        .filter(|v| !v.trim().is_empty())
}

fn parsed<T>(name: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    var(name)
        .map(|v| {
            v.trim()
                .parse::<T>()
                .map_err(|e| anyhow::anyhow!("{}", e))
                .with_context(|| format!("Invalid value for PROPOSAL_{}: '{}'", name, v))
        })
        .transpose()
}

fn flag(value: &str) -> bool {
    matches!(value.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on")
}

impl ProposalConfig {
    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();

        Ok(Self {
            pricing_rules_path: var("PRICING_RULES").map(PathBuf::from).unwrap_or(defaults.pricing_rules_path),
            case_studies_path: var("CASE_STUDIES").map(PathBuf::from).unwrap_or(defaults.case_studies_path),
            template_path: var("TEMPLATE").map(PathBuf::from).unwrap_or(defaults.template_path),
            history_path: var("HISTORY").map(PathBuf::from).unwrap_or(defaults.history_path),
            llm_backend: parsed("LLM_BACKEND")?.unwrap_or(defaults.llm_backend),
            llm_model: var("LLM_MODEL").unwrap_or(defaults.llm_model),
            ollama_host: var("OLLAMA_HOST").unwrap_or(defaults.ollama_host),
            ollama_port: parsed("OLLAMA_PORT")?.unwrap_or(defaults.ollama_port),
            openai_url: var("OPENAI_URL").unwrap_or(defaults.openai_url),
            openai_api_key: var("OPENAI_API_KEY"),
            enable_embeddings: var("ENABLE_EMBEDDINGS").map_or(defaults.enable_embeddings, |v| flag(&v)),
            webdriver_url: var("WEBDRIVER_URL"),
            top_k: parsed("TOP_K")?.unwrap_or(defaults.top_k),
            company_name: var("COMPANY_NAME").unwrap_or(defaults.company_name),
            port: parsed("PORT")?.unwrap_or(defaults.port),
        })
    }
}
