//! Tipos de dados para requisições e respostas do endpoint de chat completions.
//!
//! A Groq expõe uma API compatível com a da OpenAI em
//! `/openai/v1/chat/completions`; as structs abaixo seguem esse formato JSON.

use serde::{Deserialize, Serialize};

/// Corpo da requisição para o endpoint de chat completions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatRequest {
    /// Identificador do modelo (ex.: "llama-3.1-8b-instant").
    pub model: String,
    /// Mensagens compondo a conversa.
    pub messages: Vec<Message>,
    /// Temperatura de amostragem; 0.0 para saída o mais determinística possível.
    pub temperature: f32,
    /// Número máximo de tokens na resposta.
    pub max_tokens: u32,
}

/// Uma única mensagem em uma conversa.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    /// Papel do remetente: "system", "user" ou "assistant".
    pub role: String,
    /// Conteúdo textual da mensagem.
    pub content: String,
}

impl Message {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".into(),
            content: content.into(),
        }
    }
}

/// Resposta retornada pelo endpoint de chat completions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatResponse {
    /// Identificador único da resposta.
    pub id: String,
    /// Modelo que gerou a resposta.
    pub model: String,
    /// Alternativas geradas; pedimos sempre uma só.
    pub choices: Vec<Choice>,
    /// Estatísticas de uso de tokens, quando informadas.
    #[serde(default)]
    pub usage: Option<Usage>,
}

impl ChatResponse {
    /// Texto da primeira alternativa, se houver.
    pub fn text(&self) -> Option<&str> {
        self.choices
            .first()
            .and_then(|choice| choice.message.content.as_deref())
    }
}

/// Uma alternativa gerada pelo modelo.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Choice {
    pub index: u32,
    pub message: ResponseMessage,
    /// Motivo da parada (ex.: "stop", "length").
    pub finish_reason: Option<String>,
}

/// Mensagem do assistente dentro de uma [`Choice`]. O conteúdo pode vir nulo.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResponseMessage {
    pub role: String,
    pub content: Option<String>,
}

/// Estatísticas de consumo de tokens para uma chamada.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Usage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}
