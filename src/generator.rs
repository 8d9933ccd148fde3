//! Generator client: turns a target plus prior failure into parser source.

use tracing::{debug, instrument, warn};

use crate::config::AgentConfig;
use crate::error::GenerationError;
use crate::groq::{ChatRequest, ChatSender, Message};
use crate::target::Target;

pub trait CodeGenerator {
    /// Produce candidate parser source for `target`. `prior_error` is the
    /// previous attempt's failure, forwarded to the backend verbatim.
    async fn generate(
        &self,
        target: &Target,
        prior_error: Option<&str>,
    ) -> Result<String, GenerationError>;
}

/// Chat-completion backed generator. Holds its backend and sampling
/// settings explicitly; there is no shared client.
pub struct ParserGenerator<S> {
    sender: S,
    model: String,
    temperature: f32,
    max_tokens: u32,
}

impl<S: ChatSender> ParserGenerator<S> {
    pub fn new(sender: S, model: impl Into<String>, temperature: f32, max_tokens: u32) -> Self {
        Self {
            sender,
            model: model.into(),
            temperature,
            max_tokens,
        }
    }

    pub fn from_config(sender: S, config: &AgentConfig) -> Self {
        Self::new(sender, &config.model, config.temperature, config.max_tokens)
    }

    fn request_for(&self, target: &Target, prior_error: Option<&str>) -> ChatRequest {
        ChatRequest {
            model: self.model.clone(),
            messages: vec![Message::user(build_prompt(target, prior_error))],
            temperature: self.temperature,
            max_tokens: self.max_tokens,
        }
    }
}

impl<S: ChatSender> CodeGenerator for ParserGenerator<S> {
    #[instrument(skip_all, fields(target = %target, feedback = prior_error.is_some()))]
    async fn generate(
        &self,
        target: &Target,
        prior_error: Option<&str>,
    ) -> Result<String, GenerationError> {
        let req = self.request_for(target, prior_error);
        let resp = self.sender.send_chat(&req).await?;
        if let Some(usage) = &resp.usage {
            debug!(
                prompt_tokens = usage.prompt_tokens,
                completion_tokens = usage.completion_tokens,
                "generation usage"
            );
        }

        let code = strip_fences(resp.text().unwrap_or_default());
        if code.is_empty() {
            warn!(response_id = %resp.id, "backend returned empty content");
            return Err(GenerationError::EmptyResponse);
        }
        Ok(code.to_string())
    }
}

/// Remove the markdown fence a model tends to wrap code in, then trim.
/// Only the outermost markers go; fences inside the body are kept.
pub fn strip_fences(raw: &str) -> &str {
    let mut code = raw.trim();
    for opener in ["```python", "```py", "```"] {
        if let Some(rest) = code.strip_prefix(opener) {
            code = rest;
            break;
        }
    }
    if let Some(rest) = code.strip_suffix("```") {
        code = rest;
    }
    code.trim()
}

/// Build the full instruction payload for one generation attempt.
pub fn build_prompt(target: &Target, prior_error: Option<&str>) -> String {
    let feedback = match prior_error {
        Some(err) => {
            format!("\n- You must fix the following error from the previous attempt: {err}\n")
        }
        None => String::new(),
    };

    format!(
        r#"You are an expert Python code generation tool. Your only job is to write clean, runnable Python code for the task below.

TASK:
Write the complete Python code for a function that parses a '{target}' bank statement PDF. The returned DataFrame MUST pass a `pd.testing.assert_frame_equal()` check against the provided ground-truth CSV.

# --- PARSING STRATEGY --- #
Statement tables mix header rows with transaction rows whose cells contain embedded newlines. Follow these steps:
1.  Open the file with `pdfplumber.open(pdf_path)` and iterate over every page (`for page in pdf.pages:`).
2.  On each page call `page.extract_tables()`.
3.  Collect transactions in a list of rows.
4.  Iterate over every `row` of every extracted table.
5.  ROW FILTERING: a row is a transaction only if its first cell starts with a date in 'DD-MM-YYYY' format. Check it with `re.match(r'\d{{2}}-\d{{2}}-\d{{4}}', str(row[0]))` and skip everything else.
6.  Wrap the processing of each valid row in a `try`/`except` block and `continue` on malformed rows.
7.  Inside the `try` block, replace newline characters (`'\n'`) in each cell with a space.
8.  DATA CLEANING: 'Debit Amt' and 'Credit Amt' may be empty. An empty cleaned value becomes `None` (NaN in pandas). Otherwise remove commas and convert to `float`. Do NOT default empty values to `0.0`.
9.  Remove commas from 'Balance' and convert it to `float`.

# --- SPECIFICATIONS --- #
- The function signature must be exactly: `def parse(pdf_path: str) -> pd.DataFrame`
- The DataFrame must have exactly these columns in this order, matching `result.csv`: `['Date', 'Description', 'Debit Amt', 'Credit Amt', 'Balance']`.
{feedback}
# --- OUTPUT REQUIREMENTS --- #
- Respond with ONLY the raw Python code.
- Do NOT include markdown fences (like ```python) or explanations.
- The response must start with `import pandas as pd`.
"#
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::groq::GroqError;
    use crate::groq::types::{ChatResponse, Choice, ResponseMessage};
    use std::sync::Mutex;

    /// Returns a fixed reply and remembers every request it saw.
    struct RecordingSender {
        reply: Result<Option<String>, u16>,
        seen: Mutex<Vec<ChatRequest>>,
    }

    impl RecordingSender {
        fn replying(text: &str) -> Self {
            Self {
                reply: Ok(Some(text.to_string())),
                seen: Mutex::new(Vec::new()),
            }
        }

        fn failing(status: u16) -> Self {
            Self {
                reply: Err(status),
                seen: Mutex::new(Vec::new()),
            }
        }

        fn last_prompt(&self) -> String {
            let seen = self.seen.lock().unwrap();
            seen.last().unwrap().messages[0].content.clone()
        }
    }

    impl ChatSender for RecordingSender {
        async fn send_chat(&self, req: &ChatRequest) -> Result<ChatResponse, GroqError> {
            self.seen.lock().unwrap().push(req.clone());
            match &self.reply {
                Ok(content) => Ok(ChatResponse {
                    id: "mock".into(),
                    model: req.model.clone(),
                    choices: vec![Choice {
                        index: 0,
                        message: ResponseMessage {
                            role: "assistant".into(),
                            content: content.clone(),
                        },
                        finish_reason: Some("stop".into()),
                    }],
                    usage: None,
                }),
                Err(status) => Err(GroqError::ApiError {
                    status: *status,
                    message: "mock error".into(),
                }),
            }
        }
    }

    fn icici() -> Target {
        Target::parse("icici").unwrap()
    }

    #[test]
    fn strip_fences_removes_outer_markers_only() {
        let raw = "```python\nimport pandas as pd\ns = '```'\n```\n";
        assert_eq!(strip_fences(raw), "import pandas as pd\ns = '```'");
    }

    #[test]
    fn strip_fences_handles_bare_and_missing_fences() {
        assert_eq!(strip_fences("```\nx = 1\n```"), "x = 1");
        assert_eq!(strip_fences("  x = 1  \n"), "x = 1");
        assert_eq!(strip_fences("```python\n```"), "");
    }

    #[test]
    fn prompt_names_target_and_contract() {
        let prompt = build_prompt(&icici(), None);
        assert!(prompt.contains("parses a 'icici' bank statement PDF"));
        assert!(prompt.contains("def parse(pdf_path: str) -> pd.DataFrame"));
        assert!(prompt.contains(r"\d{2}-\d{2}-\d{4}"));
        assert!(!prompt.contains("previous attempt"));
    }

    #[test]
    fn prompt_carries_prior_error() {
        let prompt = build_prompt(&icici(), Some("Parser test failed"));
        assert!(prompt.contains(
            "You must fix the following error from the previous attempt: Parser test failed"
        ));
    }

    #[tokio::test]
    async fn generate_sends_prior_error_to_backend() {
        let sender = RecordingSender::replying("import pandas as pd");
        let generator = ParserGenerator::new(sender, "llama-3.1-8b-instant", 0.0, 1024);

        generator
            .generate(&icici(), Some("KeyError: 'Balance'"))
            .await
            .unwrap();

        assert!(generator.sender.last_prompt().contains("KeyError: 'Balance'"));
    }

    #[tokio::test]
    async fn generate_uses_configured_sampling() {
        let sender = RecordingSender::replying("import pandas as pd");
        let config = AgentConfig {
            model: "llama-3.3-70b-versatile".into(),
            temperature: 0.2,
            max_tokens: 2048,
            ..AgentConfig::default()
        };
        let generator = ParserGenerator::from_config(sender, &config);

        generator.generate(&icici(), None).await.unwrap();

        let seen = generator.sender.seen.lock().unwrap();
        assert_eq!(seen[0].model, "llama-3.3-70b-versatile");
        assert_eq!(seen[0].temperature, 0.2);
        assert_eq!(seen[0].max_tokens, 2048);
    }

    #[tokio::test]
    async fn generate_strips_fences_from_reply() {
        let generator = ParserGenerator::new(
            RecordingSender::replying("```python\nimport pandas as pd\n```"),
            "m",
            0.0,
            1024,
        );
        let code = generator.generate(&icici(), None).await.unwrap();
        assert_eq!(code, "import pandas as pd");
    }

    #[tokio::test]
    async fn empty_reply_is_a_generation_error() {
        let generator =
            ParserGenerator::new(RecordingSender::replying("```\n\n```"), "m", 0.0, 1024);
        let err = generator.generate(&icici(), None).await.unwrap_err();
        assert!(matches!(err, GenerationError::EmptyResponse));
    }

    #[tokio::test]
    async fn backend_failure_is_a_generation_error() {
        let generator = ParserGenerator::new(RecordingSender::failing(503), "m", 0.0, 1024);
        let err = generator.generate(&icici(), None).await.unwrap_err();
        assert!(matches!(
            err,
            GenerationError::Backend(GroqError::ApiError { status: 503, .. })
        ));
    }
}
