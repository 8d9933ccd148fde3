//! Tipos de erro para o cliente da API de chat completions da Groq.
//!
//! Define [`GroqError`] com variantes para chave ausente, rate limiting,
//! erros da API e erros de rede. Usa `thiserror` para derivar `Display` e
//! `Error` a partir dos atributos `#[error(...)]`.

use thiserror::Error;

/// Erros que podem ocorrer ao interagir com a API da Groq.
///
/// - [`MissingApiKey`](GroqError::MissingApiKey) — nenhuma credencial configurada
/// - [`RateLimited`](GroqError::RateLimited) — o servidor retornou HTTP 429
/// - [`ApiError`](GroqError::ApiError) — qualquer outro erro HTTP (4xx/5xx)
/// - [`NetworkError`](GroqError::NetworkError) — falha na camada de rede
#[derive(Debug, Error)]
pub enum GroqError {
    /// `GROQ_API_KEY` não definida e nenhuma `api_key` no arquivo de configuração.
    /// A requisição nem chega a ser enviada.
    #[error("missing API key (set GROQ_API_KEY)")]
    MissingApiKey,

    /// O servidor retornou HTTP 429 (rate limit).
    #[error("rate limited, retry after {retry_after_ms}ms")]
    RateLimited { retry_after_ms: u64 },

    /// Erro retornado pela API (ex.: 401 chave inválida, 500 erro interno).
    #[error("API error (status {status}): {message}")]
    ApiError { status: u16, message: String },

    /// Falha de rede subjacente (DNS, conexão recusada, timeout).
    #[error("network error: {0}")]
    NetworkError(#[from] reqwest::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rate_limited_display() {
        let err = GroqError::RateLimited {
            retry_after_ms: 5000,
        };
        assert_eq!(err.to_string(), "rate limited, retry after 5000ms");
    }

    #[test]
    fn api_error_display() {
        let err = GroqError::ApiError {
            status: 401,
            message: "Invalid API Key".into(),
        };
        assert_eq!(err.to_string(), "API error (status 401): Invalid API Key");
    }

    #[test]
    fn missing_key_mentions_env_var() {
        assert!(GroqError::MissingApiKey.to_string().contains("GROQ_API_KEY"));
    }

    #[test]
    fn error_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<GroqError>();
    }
}
