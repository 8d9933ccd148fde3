//! Configuração do parsesmith carregada a partir de `parsesmith.toml`.
//!
//! A struct [`AgentConfig`] contém todos os parâmetros configuráveis.
//! Valores não presentes no arquivo usam defaults sensíveis.
//! A variável de ambiente `GROQ_API_KEY` tem precedência sobre o arquivo.

use anyhow::{Context, Result, bail};
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::groq::client::API_URL;

pub const CONFIG_FILE: &str = "parsesmith.toml";
pub const API_KEY_ENV: &str = "GROQ_API_KEY";

/// Configuração de nível superior carregada de `parsesmith.toml`.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AgentConfig {
    /// Chave da API Groq.
    pub api_key: String,

    /// Modelo usado para gerar o parser.
    pub model: String,

    /// Temperatura de amostragem enviada ao backend.
    pub temperature: f32,

    /// Limite de tokens da resposta.
    pub max_tokens: u32,

    /// URL completa do endpoint de chat completions.
    pub api_url: String,

    /// Diretório onde os parsers gerados são gravados.
    pub artifact_dir: PathBuf,

    /// Comando do oráculo de verificação (programa seguido de argumentos).
    pub oracle_command: Vec<String>,

    /// Teto rígido de entradas em GENERATE por execução.
    pub step_limit: u32,

    /// Anexa o fim do relatório do oráculo ao erro enviado na próxima geração.
    pub feedback_report: bool,

    /// Quantidade máxima de caracteres do relatório anexados ao erro.
    pub feedback_report_limit: usize,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            model: "llama-3.1-8b-instant".to_string(),
            temperature: 0.0,
            max_tokens: 4096,
            api_url: API_URL.to_string(),
            artifact_dir: PathBuf::from("custom_parser"),
            oracle_command: vec!["pytest".to_string(), "tests/test_parser.py".to_string()],
            step_limit: 10,
            feedback_report: false,
            feedback_report_limit: 2000,
        }
    }
}

impl AgentConfig {
    /// Carrega a configuração de `parsesmith.toml` no diretório atual.
    /// Usa valores padrão se o arquivo não existir.
    pub fn load() -> Result<Self> {
        let mut config = Self::load_from(Path::new(CONFIG_FILE))?;

        // Variável de ambiente tem precedência sobre o arquivo para a chave API.
        if let Ok(key) = std::env::var(API_KEY_ENV)
            && !key.is_empty()
        {
            config.api_key = key;
        }

        config.validate()?;
        Ok(config)
    }

    /// Lê um arquivo específico, sem aplicar variáveis de ambiente.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("read {}", path.display()))?;
        toml::from_str::<AgentConfig>(&contents).with_context(|| format!("parse {}", path.display()))
    }

    pub fn validate(&self) -> Result<()> {
        if self.step_limit == 0 {
            bail!("step_limit must be at least 1");
        }
        if self.oracle_command.first().is_none_or(|program| program.is_empty()) {
            bail!("oracle_command must name a program");
        }
        if !(0.0..=2.0).contains(&self.temperature) {
            bail!("temperature must be between 0.0 and 2.0, got {}", self.temperature);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_values() {
        let config = AgentConfig::default();
        assert_eq!(config.model, "llama-3.1-8b-instant");
        assert_eq!(config.temperature, 0.0);
        assert_eq!(config.step_limit, 10);
        assert_eq!(config.artifact_dir, PathBuf::from("custom_parser"));
        assert_eq!(config.oracle_command, vec!["pytest", "tests/test_parser.py"]);
        assert!(!config.feedback_report);
        assert!(config.api_key.is_empty());
    }

    #[test]
    fn deserialize_partial_toml() {
        let toml_str = r#"
            api_key = "gsk-test-123"
            step_limit = 5
            oracle_command = ["python", "-m", "pytest", "-q"]
        "#;
        let config: AgentConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.api_key, "gsk-test-123");
        assert_eq!(config.step_limit, 5);
        assert_eq!(config.oracle_command.len(), 4);
        assert_eq!(config.model, "llama-3.1-8b-instant");
    }

    #[test]
    fn load_from_missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = AgentConfig::load_from(&dir.path().join(CONFIG_FILE)).unwrap();
        assert_eq!(config.step_limit, 10);
    }

    #[test]
    fn load_from_reports_malformed_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        std::fs::write(&path, "step_limit = \"many\"").unwrap();
        let err = AgentConfig::load_from(&path).unwrap_err();
        assert!(format!("{err:#}").contains("parse"));
    }

    #[test]
    fn validate_rejects_bad_values() {
        let zero_steps = AgentConfig {
            step_limit: 0,
            ..AgentConfig::default()
        };
        assert!(zero_steps.validate().is_err());

        let no_oracle = AgentConfig {
            oracle_command: Vec::new(),
            ..AgentConfig::default()
        };
        assert!(no_oracle.validate().is_err());

        let hot = AgentConfig {
            temperature: 3.5,
            ..AgentConfig::default()
        };
        assert!(hot.validate().is_err());

        assert!(AgentConfig::default().validate().is_ok());
    }
}
