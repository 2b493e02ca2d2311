//! Text clean-up applied to model output before it is rendered.

/// Removes the longest run of leading spaces and tabs shared by every
/// non-blank line.
///
/// Lines made only of spaces and tabs are emptied and do not take part in the
/// margin computation. Tabs and spaces are not considered equivalent, so
/// `"  a\n\tb"` has no common margin.
pub fn dedent(text: &str) -> String {
    let margin = common_margin(text);
    let mut out = String::with_capacity(text.len());

    for line in text.split_inclusive('\n') {
        let (body, newline) = match line.strip_suffix('\n') {
            Some(body) => (body, "\n"),
            None => (line, ""),
        };
        if !is_blank(body) {
            // Every non-blank line starts with the margin.
            out.push_str(&body[margin..]);
        }
        out.push_str(newline);
    }

    out
}

/// Dedents, then strips leading and trailing whitespace.
pub fn tidy(text: &str) -> String {
    dedent(text).trim().to_string()
}

/// Drops horizontal rules and blank lines from both ends of `text`.
pub fn strip_outer_rules(text: &str) -> String {
    let lines: Vec<&str> = text.lines().collect();
    let is_edge = |line: &&str| line.trim().is_empty() || is_rule(line);

    let Some(start) = lines.iter().position(|l| !is_edge(l)) else {
        return String::new();
    };
    let end = lines.iter().rposition(|l| !is_edge(l)).unwrap_or(start);
    lines[start..=end].join("\n")
}

/// A Markdown thematic break: three or more of `-`, `*` or `_`.
pub(crate) fn is_rule(line: &str) -> bool {
    let t = line.trim();
    t.len() >= 3
        && (t.chars().all(|c| c == '-') || t.chars().all(|c| c == '*') || t.chars().all(|c| c == '_'))
}

fn is_blank(line: &str) -> bool {
    line.bytes().all(|b| b == b' ' || b == b'\t')
}

fn indent_of(line: &str) -> &str {
    let end = line
        .bytes()
        .position(|b| b != b' ' && b != b'\t')
        .unwrap_or(line.len());
    &line[..end]
}

/// Byte length of the shared indentation. Indentation is ASCII only, so any
/// byte offset inside it is a char boundary.
fn common_margin(text: &str) -> usize {
    let mut margin: Option<&str> = None;

    for line in text.split('\n') {
        if is_blank(line) {
            continue;
        }
        let indent = indent_of(line);
        margin = Some(match margin {
            None => indent,
            Some(current) => {
                let shared = current
                    .bytes()
                    .zip(indent.bytes())
                    .take_while(|(a, b)| a == b)
                    .count();
                &current[..shared]
            }
        });
        if margin == Some("") {
            break;
        }
    }

    margin.map(str::len).unwrap_or(0)
}
