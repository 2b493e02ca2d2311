//! Gemini generateContent wire format.
//!
//! Request: `{ contents: [{ role, parts: [{ text }] }], generationConfig: { temperature } }`.
//! Response: `candidates[0].content.parts[*].text`, with `finishReason` and
//! `usageMetadata` alongside. Errors come back as
//! `{ error: { code, message, status, details: [{ reason }] } }`.

use serde_json::Value;

use crate::error::{Error, ErrorContext};
use crate::error_code::ErrorKind;

use super::{GenerateRequest, GenerateResponse, UsageInfo};

/// Builds the JSON body for a single-turn text prompt.
pub fn build_body(request: &GenerateRequest) -> Value {
    let mut body = serde_json::json!({
        "contents": [{
            "role": "user",
            "parts": [{ "text": request.prompt }],
        }],
    });

    let mut gen_config = serde_json::json!({});
    if let Some(t) = request.config.temperature {
        gen_config["temperature"] = serde_json::json!(t);
    }
    if gen_config != serde_json::json!({}) {
        body["generationConfig"] = gen_config;
    }

    body
}

/// Extracts the generated text from a successful response body.
///
/// All text parts of the first candidate are concatenated. A response without
/// any text (blocked prompt, empty candidate list) is malformed from the
/// caller's point of view.
pub fn parse_response(body: &Value) -> Result<GenerateResponse, Error> {
    let text: String = body
        .pointer("/candidates/0/content/parts")
        .and_then(|p| p.as_array())
        .map(|parts| {
            parts
                .iter()
                .filter_map(|p| p.get("text").and_then(|t| t.as_str()))
                .collect()
        })
        .unwrap_or_default();

    let finish_reason = body
        .pointer("/candidates/0/finishReason")
        .and_then(|v| v.as_str())
        .map(|r| match r {
            "STOP" => "stop".to_string(),
            "MAX_TOKENS" => "length".to_string(),
            "SAFETY" | "RECITATION" => "content_filter".to_string(),
            other => other.to_lowercase(),
        });

    if text.trim().is_empty() {
        let mut ctx = ErrorContext::new().with_source("gemini_response");
        if let Some(reason) = body
            .pointer("/promptFeedback/blockReason")
            .and_then(|v| v.as_str())
        {
            ctx = ctx.with_details(format!("prompt blocked: {}", reason));
        } else if let Some(ref reason) = finish_reason {
            ctx = ctx.with_details(format!("finish reason: {}", reason));
        }
        return Err(Error::malformed_with_context(
            "response contained no text",
            ctx,
        ));
    }

    let usage = body.get("usageMetadata").map(|u| UsageInfo {
        prompt_tokens: u["promptTokenCount"].as_u64().unwrap_or(0),
        completion_tokens: u["candidatesTokenCount"].as_u64().unwrap_or(0),
        total_tokens: u["totalTokenCount"].as_u64().unwrap_or(0),
    });

    Ok(GenerateResponse {
        text,
        finish_reason,
        usage,
    })
}

/// Turns a non-2xx response into [`Error::Remote`].
///
/// The body is usually Gemini's JSON error envelope; anything else is kept
/// verbatim (truncated) as the message.
pub fn parse_error(status: u16, body: &str) -> Error {
    let parsed: Option<Value> = serde_json::from_str(body).ok();
    let error = parsed.as_ref().and_then(|v| v.get("error"));

    let message = error
        .and_then(|e| e.get("message"))
        .and_then(|m| m.as_str())
        .map(String::from)
        .unwrap_or_else(|| {
            let trimmed = body.trim();
            if trimmed.is_empty() {
                format!("HTTP {}", status)
            } else {
                trimmed.chars().take(300).collect()
            }
        });

    // `details[].reason` is more specific than `status` for key problems.
    let reason = error
        .and_then(|e| e.get("details"))
        .and_then(|d| d.as_array())
        .and_then(|details| {
            details
                .iter()
                .find_map(|d| d.get("reason").and_then(|r| r.as_str()))
        })
        .filter(|r| ErrorKind::from_provider_status(r).is_some());
    let provider_status = reason.or_else(|| {
        error
            .and_then(|e| e.get("status"))
            .and_then(|s| s.as_str())
    });

    Error::Remote {
        status,
        kind: ErrorKind::classify(status, provider_status),
        message,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gemini::GenerationConfig;

    fn request(temperature: Option<f64>) -> GenerateRequest {
        GenerateRequest {
            model: "gemini-2.5-flash".into(),
            prompt: "Hello".into(),
            config: GenerationConfig { temperature },
        }
    }

    #[test]
    fn body_carries_prompt_and_temperature() {
        let body = build_body(&request(Some(0.8)));
        assert_eq!(body["contents"][0]["role"], "user");
        assert_eq!(body["contents"][0]["parts"][0]["text"], "Hello");
        assert_eq!(body["generationConfig"]["temperature"], 0.8);
    }

    #[test]
    fn body_omits_empty_generation_config() {
        let body = build_body(&request(None));
        assert!(body.get("generationConfig").is_none());
    }

    #[test]
    fn response_parts_are_concatenated() {
        let body = serde_json::json!({
            "candidates": [{
                "content": { "parts": [{"text": "A: Hi\n"}, {"text": "B: Hey"}], "role": "model" },
                "finishReason": "STOP"
            }],
            "usageMetadata": {
                "promptTokenCount": 5,
                "candidatesTokenCount": 3,
                "totalTokenCount": 8
            }
        });
        let resp = parse_response(&body).unwrap();
        assert_eq!(resp.text, "A: Hi\nB: Hey");
        assert_eq!(resp.finish_reason.as_deref(), Some("stop"));
        assert_eq!(resp.usage.unwrap().total_tokens, 8);
    }

    #[test]
    fn blocked_prompt_is_malformed() {
        let body = serde_json::json!({ "promptFeedback": { "blockReason": "SAFETY" } });
        let err = parse_response(&body).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MalformedResponse);
        assert!(err.to_string().contains("prompt blocked: SAFETY"));
    }

    #[test]
    fn error_envelope_is_classified() {
        let body = r#"{"error":{"code":429,"message":"quota exceeded","status":"RESOURCE_EXHAUSTED"}}"#;
        match parse_error(429, body) {
            Error::Remote {
                status,
                kind,
                message,
            } => {
                assert_eq!(status, 429);
                assert_eq!(kind, ErrorKind::QuotaExhausted);
                assert_eq!(message, "quota exceeded");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn invalid_key_reason_wins_over_status() {
        let body = r#"{"error":{"code":400,"message":"API key not valid.","status":"INVALID_ARGUMENT",
            "details":[{"@type":"type.googleapis.com/google.rpc.ErrorInfo","reason":"API_KEY_INVALID"}]}}"#;
        assert_eq!(parse_error(400, body).kind(), ErrorKind::Authentication);
    }

    #[test]
    fn non_json_error_body_is_kept() {
        let err = parse_error(502, "<html>Bad Gateway</html>");
        assert_eq!(err.kind(), ErrorKind::Overloaded);
        assert!(err.to_string().contains("Bad Gateway"));
        assert!(parse_error(500, "").to_string().contains("HTTP 500"));
    }
}
