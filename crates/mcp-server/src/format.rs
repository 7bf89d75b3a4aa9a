//! Response text returned to the agent

use reqwest::{Response, StatusCode};
use serde_json::Value;

/// Prefix of transport failures in standard tools
pub const ERROR_CALLING_API: &str = "Error calling API: ";

/// Prefix of body parse/serialization failures
pub const ERROR_FORMATTING_RESPONSE: &str = "Error formatting response: ";

/// Prefix of failures in the markdown tool
pub const ERROR_RETRIEVING_MARKDOWN: &str = "Error retrieving markdown: ";

/// Format a completed response: status error first, then fenced JSON
pub async fn format_response(response: Response) -> String {
    let status = response.status();
    match response.text().await {
        Ok(body) => format_body(status, &body),
        Err(e) => format!("{}{}", ERROR_FORMATTING_RESPONSE, e),
    }
}

/// Format a status and body.
///
/// Non-2xx gives `Error: <code> <reason>\nBody: <body>`; a 2xx JSON body is
/// re-serialized with two-space indentation inside a ```` ```json ```` fence.
pub fn format_body(status: StatusCode, body: &str) -> String {
    if !status.is_success() {
        return format!(
            "Error: {} {}\nBody: {}",
            status.as_u16(),
            status.canonical_reason().unwrap_or(""),
            body
        );
    }

    let pretty = serde_json::from_str::<Value>(body).and_then(|data| serde_json::to_string_pretty(&data));
    match pretty {
        Ok(json) => format!("```json\n{}\n```", json),
        Err(e) => format!("{}{}", ERROR_FORMATTING_RESPONSE, e),
    }
}

/// One character window of a markdown document.
///
/// Offsets count characters, not bytes. Negative `offset`/`limit` clamp to
/// zero and an `offset` past the end clamps to the document length.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkdownPage {
    pub offset: usize,
    pub end: usize,
    pub total: usize,
    pub chunk: String,
}

impl MarkdownPage {
    /// Cut `[offset, min(offset + limit, total))` out of `text`
    pub fn slice(text: &str, offset: i64, limit: i64) -> Self {
        let total = text.chars().count();
        let offset = usize::try_from(offset.max(0)).unwrap_or(usize::MAX).min(total);
        let limit = usize::try_from(limit.max(0)).unwrap_or(usize::MAX);
        let end = offset.saturating_add(limit).min(total);

        let chunk = text.chars().skip(offset).take(end - offset).collect();

        Self {
            offset,
            end,
            total,
            chunk,
        }
    }

    /// Whether content remains after this window
    pub fn is_truncated(&self) -> bool {
        self.end < self.total
    }

    /// Header line, optional continuation warning, blank line, content
    pub fn render(&self) -> String {
        let mut out = format!(
            "--- MARKDOWN CONTENT (Chars {} to {} of {}) ---\n",
            self.offset, self.end, self.total
        );
        if self.is_truncated() {
            out.push_str(&format!(
                "--- WARNING: Content truncated. Call this tool again with offset={} to continue. ---\n",
                self.end
            ));
        }
        out.push('\n');
        out.push_str(&self.chunk);
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_success_is_fenced_pretty_json() {
        let text = format_body(StatusCode::OK, r#"{"b":1,"a":[true,null]}"#);
        assert_eq!(
            text,
            "```json\n{\n  \"b\": 1,\n  \"a\": [\n    true,\n    null\n  ]\n}\n```"
        );
    }

    #[test]
    fn test_format_error_status() {
        let text = format_body(StatusCode::NOT_FOUND, r#"{"detail":"Not found."}"#);
        assert_eq!(text, "Error: 404 Not Found\nBody: {\"detail\":\"Not found.\"}");
        assert!(!text.contains("```json"));
    }

    #[test]
    fn test_format_error_status_never_fenced() {
        for code in [301u16, 400, 401, 429, 500, 502] {
            let status = StatusCode::from_u16(code).unwrap();
            let text = format_body(status, "{}");
            assert!(text.starts_with(&format!("Error: {} ", code)), "{}", text);
            assert!(!text.contains("```"));
        }
    }

    #[test]
    fn test_format_non_json_body() {
        let text = format_body(StatusCode::OK, "<html>");
        assert!(text.starts_with(ERROR_FORMATTING_RESPONSE), "{}", text);
    }

    #[test]
    fn test_page_first_window_of_large_document() {
        let doc = "x".repeat(120_000);
        let page = MarkdownPage::slice(&doc, 0, 50_000);

        assert_eq!(page.chunk.chars().count(), 50_000);
        assert_eq!(page.end, 50_000);
        let text = page.render();
        assert!(text.starts_with("--- MARKDOWN CONTENT (Chars 0 to 50000 of 120000) ---\n"));
        assert!(text.contains("Call this tool again with offset=50000 to continue."));
    }

    #[test]
    fn test_page_last_window_has_no_warning() {
        let doc = "y".repeat(30_000);
        let page = MarkdownPage::slice(&doc, 20_000, 50_000);

        assert_eq!(page.end, 30_000);
        assert_eq!(page.chunk.len(), 10_000);
        assert!(!page.is_truncated());
        assert!(!page.render().contains("WARNING"));
    }

    #[test]
    fn test_page_window_arithmetic() {
        let doc: String = ('a'..='z').cycle().take(1000).collect();
        for offset in [0i64, 1, 499, 999, 1000] {
            for limit in [0i64, 1, 250, 1000, 5000] {
                let page = MarkdownPage::slice(&doc, offset, limit);
                let expected_end = (offset + limit).min(1000) as usize;
                assert_eq!(page.end, expected_end);
                assert_eq!(page.chunk.chars().count(), expected_end - offset as usize);
                assert_eq!(page.is_truncated(), expected_end < 1000);
                assert_eq!(page.render().contains("WARNING"), expected_end < 1000);
            }
        }
    }

    #[test]
    fn test_page_counts_characters_not_bytes() {
        let doc = "äöü€😀abc";
        let page = MarkdownPage::slice(doc, 3, 2);
        assert_eq!(page.total, 8);
        assert_eq!(page.chunk, "€😀");
    }

    #[test]
    fn test_page_clamps_out_of_range() {
        let page = MarkdownPage::slice("hello", -3, 2);
        assert_eq!((page.offset, page.end, page.chunk.as_str()), (0, 2, "he"));

        let page = MarkdownPage::slice("hello", 2, -1);
        assert_eq!((page.offset, page.end, page.chunk.as_str()), (2, 2, ""));
        assert!(page.is_truncated());

        let page = MarkdownPage::slice("hello", 99, 10);
        assert_eq!((page.offset, page.end, page.chunk.as_str()), (5, 5, ""));
        assert!(!page.is_truncated());

        let page = MarkdownPage::slice("hello", 1, i64::MAX);
        assert_eq!(page.end, 5);
    }

    #[test]
    fn test_render_layout() {
        let page = MarkdownPage::slice("abc", 0, 10);
        assert_eq!(page.render(), "--- MARKDOWN CONTENT (Chars 0 to 3 of 3) ---\n\nabc");
    }
}
