//! Source code pane rendering with syntax highlighting
//!
//! This module renders the source code pane, which displays the Go program
//! being traced with basic syntax highlighting and the line of the current
//! step.
//!
//! # Features
//!
//! - Syntax highlighting for Go keywords, types, strings, numbers and comments
//! - Current line highlighting
//! - The current line stays at a fixed visual row while stepping
//! - Line numbering
//!
//! # Rendering
//!
//! The pane uses a simple character-by-character tokenizer to apply syntax
//! highlighting styles without requiring a full lexer.

use super::pane_block;
use crate::ui::theme::DEFAULT_THEME;
use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

const TYPE_NAMES: &[&str] = &[
    "int", "int8", "int16", "int32", "int64", "uint", "uint8", "uint16", "uint32", "uint64", "byte",
    "rune", "float32", "float64", "string", "bool", "map",
];

const KEYWORDS: &[&str] = &[
    "package", "import", "func", "return", "if", "else", "for", "range", "break", "continue", "var",
    "const", "switch", "case", "default", "defer", "go", "type", "struct",
];

fn collect_span(chars: &[char]) -> String {
    chars.iter().collect()
}

/// Simple syntax highlighting for one line of Go
fn highlight_source_code(line: &str) -> Line<'static> {
    let mut spans = Vec::new();
    let mut current_word = String::new();

    let chars: Vec<char> = line.chars().collect();
    let mut i = 0;

    let flush = |word: &mut String, spans: &mut Vec<Span<'static>>, is_func: bool| {
        if !word.is_empty() {
            let style = get_keyword_style(word, is_func);
            spans.push(Span::styled(std::mem::take(word), style));
        }
    };

    while i < chars.len() {
        let c = chars[i];

        // Comments run to the end of the line
        if c == '/' && chars.get(i + 1) == Some(&'/') {
            flush(&mut current_word, &mut spans, false);
            spans.push(Span::styled(
                collect_span(&chars[i..]),
                Style::default().fg(DEFAULT_THEME.comment),
            ));
            break;
        }

        // Interpreted, raw and rune literals
        if c == '"' || c == '`' || c == '\'' {
            flush(&mut current_word, &mut spans, false);
            let mut end = i + 1;
            while end < chars.len() && chars[end] != c {
                if chars[end] == '\\' && c != '`' {
                    end += 2;
                } else {
                    end += 1;
                }
            }
            let end = (end + 1).min(chars.len());
            spans.push(Span::styled(
                collect_span(&chars[i..end]),
                Style::default().fg(DEFAULT_THEME.string),
            ));
            i = end;
            continue;
        }

        if !c.is_alphanumeric() && c != '_' {
            flush(&mut current_word, &mut spans, c == '(');

            let style = match c {
                '{' | '}' | '(' | ')' | '[' | ']' => Style::default().fg(DEFAULT_THEME.primary),
                _ => Style::default().fg(DEFAULT_THEME.fg),
            };
            spans.push(Span::styled(c.to_string(), style));
            i += 1;
            continue;
        }

        current_word.push(c);
        i += 1;
    }

    flush(&mut current_word, &mut spans, false);
    Line::from(spans)
}

fn get_keyword_style(word: &str, is_function: bool) -> Style {
    if TYPE_NAMES.contains(&word) {
        Style::default().fg(DEFAULT_THEME.type_name)
    } else if KEYWORDS.contains(&word) {
        Style::default()
            .fg(DEFAULT_THEME.keyword)
            .add_modifier(Modifier::BOLD)
    } else if matches!(word, "true" | "false" | "nil") {
        Style::default().fg(DEFAULT_THEME.boolean)
    } else if word.starts_with(|c: char| c.is_ascii_digit()) {
        Style::default().fg(DEFAULT_THEME.number)
    } else if is_function {
        Style::default().fg(DEFAULT_THEME.function)
    } else {
        Style::default().fg(DEFAULT_THEME.fg)
    }
}

/// Scroll state for the source pane
#[derive(Debug, Default)]
pub struct SourceScrollState {
    pub offset: usize,
    pub target_line_row: Option<usize>,
}

/// Render the source code pane.
///
/// `current_line` is 1-based; 0 means no step is selected.
pub fn render_source_pane(
    frame: &mut Frame,
    area: Rect,
    source_code: &str,
    current_line: usize,
    is_focused: bool,
    scroll_state: &mut SourceScrollState,
) {
    let block = pane_block(" Source Code ", is_focused);

    let lines: Vec<&str> = source_code.lines().collect();
    let total_lines = lines.len();

    let visible_height = area.height.saturating_sub(2).max(1) as usize;

    // Start with the current line centred
    let target_row = scroll_state
        .target_line_row
        .unwrap_or(visible_height / 2)
        .min(visible_height.saturating_sub(1));
    scroll_state.target_line_row = Some(target_row);

    if current_line > 0 && current_line <= total_lines {
        scroll_state.offset = (current_line - 1).saturating_sub(target_row);
        super::clamp_scroll(&mut scroll_state.offset, total_lines, visible_height);
    }

    let visible_lines: Vec<Line> = lines
        .iter()
        .enumerate()
        .skip(scroll_state.offset)
        .take(visible_height)
        .map(|(idx, line)| {
            let line_num = idx + 1;
            let is_current = line_num == current_line;

            let num_style = if is_current {
                Style::default()
                    .fg(DEFAULT_THEME.secondary)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(DEFAULT_THEME.comment)
            };

            let mut content_line = highlight_source_code(line);
            if is_current {
                let background = Style::default().bg(DEFAULT_THEME.current_line_bg);
                for span in &mut content_line.spans {
                    span.style = span.style.patch(background);
                }
            }

            let marker = if is_current { "▶" } else { " " };
            let mut final_spans = vec![Span::styled(format!("{}{:4} ", marker, line_num), num_style)];
            final_spans.extend(content_line.spans);
            Line::from(final_spans)
        })
        .collect();

    frame.render_widget(Paragraph::new(visible_lines).block(block), area);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn words(line: &Line) -> Vec<String> {
        line.spans.iter().map(|s| s.content.to_string()).collect()
    }

    #[test]
    fn test_highlight_keeps_text() {
        let source = "\tx := fmt.Sprintf(\"%d é\", n) // done";
        let line = highlight_source_code(source);
        let joined: String = words(&line).concat();
        assert_eq!(joined, source);
    }

    #[test]
    fn test_highlight_styles() {
        let line = highlight_source_code("for i := 0; i < n; i++ {");
        assert_eq!(line.spans[0].content, "for");
        assert_eq!(line.spans[0].style.fg, Some(DEFAULT_THEME.keyword));

        let line = highlight_source_code("s := `raw \\ text`");
        let raw = line.spans.iter().find(|s| s.content.starts_with('`')).unwrap();
        assert_eq!(raw.content, "`raw \\ text`");
        assert_eq!(raw.style.fg, Some(DEFAULT_THEME.string));

        let line = highlight_source_code("add(1, 2)");
        assert_eq!(line.spans[0].style.fg, Some(DEFAULT_THEME.function));
    }
}
