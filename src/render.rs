//! HTML output.
//!
//! The model answers in a small Markdown dialect (headings, rules, bold,
//! inline code, bullet lists). [`markdown_to_html`] covers exactly that and
//! escapes everything else, so model output can never inject markup.

use std::fmt::Write;

use crate::app::{
    Notice, NoticeLevel, Page, BUTTON_LABEL, HEADING, INPUT_LABEL, LESSON_HEADING, PAGE_TITLE,
    SPINNER_TEXT,
};
use crate::text::is_rule;

/// Escapes text for use in HTML element content and quoted attributes.
pub fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Inline markup: `` `code` `` and `**bold**`. Unpaired markers stay literal.
fn render_inline(s: &str) -> String {
    let mut out = String::new();
    for segment in split_paired(s, "`") {
        match segment {
            Segment::Marked(code) => {
                let _ = write!(out, "<code>{}</code>", escape_html(code));
            }
            Segment::Plain(text) => {
                for part in split_paired(text, "**") {
                    match part {
                        Segment::Marked(bold) => {
                            let _ = write!(out, "<strong>{}</strong>", escape_html(bold));
                        }
                        Segment::Plain(plain) => out.push_str(&escape_html(plain)),
                    }
                }
            }
        }
    }
    out
}

#[derive(Debug, PartialEq)]
enum Segment<'a> {
    Plain(&'a str),
    Marked(&'a str),
}

/// Splits `s` on `marker`, pairing markers left to right. A trailing unpaired
/// marker is folded back into the plain text.
fn split_paired<'a>(s: &'a str, marker: &str) -> Vec<Segment<'a>> {
    let mut out = Vec::new();
    let mut rest = s;
    let mut plain_start = 0usize;
    let mut offset = 0usize;

    while let Some(open) = rest.find(marker) {
        let after_open = &rest[open + marker.len()..];
        let Some(close) = after_open.find(marker) else {
            break;
        };
        if close == 0 {
            // Empty span (`****`): treat as literal text.
            let skip = open + 2 * marker.len();
            offset += skip;
            rest = &rest[skip..];
            continue;
        }
        let abs_open = offset + open;
        if abs_open > plain_start {
            out.push(Segment::Plain(&s[plain_start..abs_open]));
        }
        out.push(Segment::Marked(&after_open[..close]));
        let consumed = open + marker.len() + close + marker.len();
        offset += consumed;
        plain_start = offset;
        rest = &rest[consumed..];
    }

    if plain_start < s.len() {
        out.push(Segment::Plain(&s[plain_start..]));
    }
    out
}

fn heading(line: &str) -> Option<(usize, &str)> {
    let t = line.trim_start();
    let level = t.chars().take_while(|&c| c == '#').count();
    if (1..=6).contains(&level) && t[level..].starts_with(' ') {
        Some((level, t[level..].trim()))
    } else {
        None
    }
}

fn list_item(line: &str) -> Option<&str> {
    let t = line.trim_start();
    t.strip_prefix("- ").or_else(|| t.strip_prefix("* "))
}

/// Renders the Markdown subset used by lessons.
///
/// Consecutive text lines form one paragraph with explicit line breaks, so a
/// dialogue keeps one speaker per line.
pub fn markdown_to_html(md: &str) -> String {
    let mut out = String::new();
    let mut paragraph: Vec<&str> = Vec::new();
    let mut list: Vec<&str> = Vec::new();

    fn flush_paragraph(out: &mut String, paragraph: &mut Vec<&str>) {
        if paragraph.is_empty() {
            return;
        }
        let lines: Vec<String> = paragraph.iter().map(|l| render_inline(l.trim())).collect();
        let _ = write!(out, "<p>{}</p>", lines.join("<br>\n"));
        paragraph.clear();
    }

    fn flush_list(out: &mut String, list: &mut Vec<&str>) {
        if list.is_empty() {
            return;
        }
        out.push_str("<ul>");
        for item in list.iter() {
            let _ = write!(out, "<li>{}</li>", render_inline(item.trim()));
        }
        out.push_str("</ul>");
        list.clear();
    }

    for line in md.lines() {
        if line.trim().is_empty() {
            flush_paragraph(&mut out, &mut paragraph);
            flush_list(&mut out, &mut list);
        } else if is_rule(line) {
            flush_paragraph(&mut out, &mut paragraph);
            flush_list(&mut out, &mut list);
            out.push_str("<hr>");
        } else if let Some((level, text)) = heading(line) {
            flush_paragraph(&mut out, &mut paragraph);
            flush_list(&mut out, &mut list);
            let _ = write!(out, "<h{level}>{}</h{level}>", render_inline(text));
        } else if let Some(item) = list_item(line) {
            flush_paragraph(&mut out, &mut paragraph);
            list.push(item);
        } else {
            flush_list(&mut out, &mut list);
            paragraph.push(line);
        }
    }
    flush_paragraph(&mut out, &mut paragraph);
    flush_list(&mut out, &mut list);

    out
}

fn notice_class(level: NoticeLevel) -> &'static str {
    match level {
        NoticeLevel::Info => "notice info",
        NoticeLevel::Success => "notice success",
        NoticeLevel::Warning => "notice warning",
        NoticeLevel::Error => "notice error",
    }
}

fn render_notice(out: &mut String, notice: &Notice) {
    let _ = writeln!(
        out,
        r#"<div class="{}" role="status">{}</div>"#,
        notice_class(notice.level),
        escape_html(&notice.text)
    );
}

const STYLE: &str = r#"
body { font-family: system-ui, sans-serif; max-width: 46rem; margin: 2rem auto; padding: 0 1rem; color: #262730; }
hr { border: none; border-top: 1px solid #e6e6e6; margin: 1.5rem 0; }
.notice { padding: .75rem 1rem; border-radius: .5rem; margin: .75rem 0; }
.info { background: #e8f0fe; } .success { background: #e6f4ea; }
.warning { background: #fef7e0; } .error { background: #fce8e6; }
input[type=password] { width: 100%; padding: .5rem; box-sizing: border-box; }
button { background: #ff4b4b; color: #fff; border: none; border-radius: .5rem; padding: .6rem 1.2rem; cursor: pointer; }
button:disabled { opacity: .6; cursor: progress; }
.spinner { display: none; margin-top: .75rem; }
form.busy .spinner { display: block; }
.lesson { margin-top: 1.5rem; }
"#;

/// Renders a full HTML document for `page`.
pub fn render_page(page: &Page) -> String {
    let mut out = String::new();
    let _ = write!(
        out,
        "<!DOCTYPE html>\n<html lang=\"ko\">\n<head>\n<meta charset=\"utf-8\">\n\
         <meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n\
         <title>{}</title>\n<style>{}</style>\n</head>\n<body>\n",
        escape_html(PAGE_TITLE),
        STYLE
    );
    let _ = writeln!(out, "<h1>{}</h1>\n<hr>", escape_html(HEADING));

    if page.show_key_input {
        let placeholder = if page.configured { "••••••••" } else { "" };
        let _ = writeln!(
            out,
            r#"<form method="post" action="/credential">
<label for="api_key">{}</label>
<input type="password" id="api_key" name="api_key" autocomplete="off" placeholder="{}" onchange="this.form.submit()">
</form>"#,
            escape_html(INPUT_LABEL),
            placeholder
        );
    }

    for notice in &page.notices {
        render_notice(&mut out, notice);
    }

    if page.show_generate_button() {
        let _ = writeln!(
            out,
            r#"<hr>
<form method="post" action="/generate" onsubmit="this.classList.add('busy'); this.querySelector('button').disabled = true;">
<button type="submit">{}</button>
<div class="spinner">⏳ {}</div>
</form>"#,
            escape_html(BUTTON_LABEL),
            escape_html(SPINNER_TEXT)
        );
    }

    if let Some(lesson) = &page.lesson {
        let _ = writeln!(
            out,
            "<section class=\"lesson\">\n<h2>{}</h2>\n{}\n</section>",
            escape_html(LESSON_HEADING),
            markdown_to_html(lesson.markdown())
        );
    }

    out.push_str("</body>\n</html>\n");
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialogue::Lesson;

    #[test]
    fn escapes_markup() {
        assert_eq!(
            escape_html(r#"<script>"x" & 'y'</script>"#),
            "&lt;script&gt;&quot;x&quot; &amp; &#39;y&#39;&lt;/script&gt;"
        );
    }

    #[test]
    fn bold_and_code_spans() {
        assert_eq!(
            render_inline("**문맥**: say `hi` <now>"),
            "<strong>문맥</strong>: say <code>hi</code> &lt;now&gt;"
        );
    }

    #[test]
    fn unpaired_markers_stay_literal() {
        assert_eq!(render_inline("2 ** 3"), "2 ** 3");
        assert_eq!(render_inline("****"), "****");
        assert_eq!(render_inline("a **b** c **d"), "a <strong>b</strong> c **d");
    }

    #[test]
    fn lesson_layout_keeps_one_speaker_per_line() {
        let md = "🎬 대화:\nA: Hi!\nB: Hey.\n\n📝 해설:\n**문맥**: 인사\n**핵심 표현**: Hey - 안녕";
        let html = markdown_to_html(md);
        assert_eq!(
            html,
            "<p>🎬 대화:<br>\nA: Hi!<br>\nB: Hey.</p>\
             <p>📝 해설:<br>\n<strong>문맥</strong>: 인사<br>\n<strong>핵심 표현</strong>: Hey - 안녕</p>"
        );
    }

    #[test]
    fn headings_rules_and_lists() {
        let html = markdown_to_html("## Title\n---\n- one\n- **two**\ntext");
        assert_eq!(
            html,
            "<h2>Title</h2><hr><ul><li>one</li><li><strong>two</strong></li></ul><p>text</p>"
        );
        assert_eq!(markdown_to_html("#hashtag"), "<p>#hashtag</p>");
    }

    #[test]
    fn page_hides_input_in_secret_mode() {
        let page = Page {
            show_key_input: false,
            configured: true,
            notices: vec![],
            lesson: None,
        };
        let html = render_page(&page);
        assert!(!html.contains(r#"type="password""#));
        assert!(html.contains(BUTTON_LABEL));
    }

    #[test]
    fn page_without_client_has_no_button() {
        let page = Page {
            show_key_input: true,
            configured: false,
            notices: vec![],
            lesson: None,
        };
        let html = render_page(&page);
        assert!(html.contains(r#"type="password""#));
        assert!(!html.contains(BUTTON_LABEL));
    }

    #[test]
    fn lesson_is_rendered_under_heading() {
        let page = Page {
            show_key_input: true,
            configured: true,
            notices: vec![],
            lesson: Some(Lesson::from_raw("  A: <b>hi</b>\n  B: yo")),
        };
        let html = render_page(&page);
        assert!(html.contains(LESSON_HEADING));
        assert!(html.contains("A: &lt;b&gt;hi&lt;/b&gt;<br>\nB: yo"));
    }
}
