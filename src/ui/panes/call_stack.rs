//! Call stack pane rendering
//!
//! Shows the active calls of the current step, innermost first, followed by
//! the step's statement, its kind and the loop iteration when it has one.

use super::{clamp_scroll, pane_block};
use crate::snapshot::Step;
use crate::ui::theme::DEFAULT_THEME;
use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{List, ListItem, Paragraph},
    Frame,
};

fn step_lines(step: &Step) -> Vec<Line<'static>> {
    let mut lines = Vec::new();

    for (depth, name) in step.call_stack.iter().enumerate().rev() {
        let is_current = depth + 1 == step.call_stack.len();
        let (marker, style) = if is_current {
            (
                "▸ ",
                Style::default()
                    .fg(DEFAULT_THEME.function)
                    .add_modifier(Modifier::BOLD),
            )
        } else {
            ("↪ ", Style::default().fg(DEFAULT_THEME.muted_function))
        };
        lines.push(Line::from(vec![
            Span::styled(marker, Style::default().fg(DEFAULT_THEME.secondary)),
            Span::styled(format!("[{}] ", depth), Style::default().fg(DEFAULT_THEME.comment)),
            Span::styled(format!("{}()", name), style),
        ]));
    }

    lines.push(Line::from(""));
    lines.push(Line::from(vec![
        Span::styled(
            format!("{} ", step.statement_type),
            Style::default()
                .fg(DEFAULT_THEME.keyword)
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(format!("line {}", step.line), Style::default().fg(DEFAULT_THEME.comment)),
    ]));
    lines.push(Line::from(Span::styled(
        format!("  {}", step.statement),
        Style::default().fg(DEFAULT_THEME.fg),
    )));

    if let Some(iteration) = &step.loop_iteration {
        lines.push(Line::from(vec![
            Span::styled("  ⟳ ", Style::default().fg(DEFAULT_THEME.secondary)),
            Span::styled(
                format!("{} iteration {}", iteration.loop_id, iteration.iteration),
                Style::default().fg(DEFAULT_THEME.number),
            ),
        ]));
    }

    lines
}

/// Render the call stack pane for `step`
pub fn render_call_stack_pane(
    frame: &mut Frame,
    area: Rect,
    step: Option<&Step>,
    is_focused: bool,
    scroll_offset: &mut usize,
) {
    let block = pane_block(" Call Stack ", is_focused);

    let Some(step) = step else {
        let paragraph = Paragraph::new("(no steps recorded)")
            .block(block)
            .style(Style::default().fg(DEFAULT_THEME.comment));
        frame.render_widget(paragraph, area);
        return;
    };

    let lines = step_lines(step);
    let visible_height = area.height.saturating_sub(2).max(1) as usize;
    clamp_scroll(scroll_offset, lines.len(), visible_height);

    let items: Vec<ListItem> = lines
        .into_iter()
        .skip(*scroll_offset)
        .take(visible_height)
        .map(ListItem::new)
        .collect();
    frame.render_widget(List::new(items).block(block), area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interpreter::Limits;
    use crate::trace_source;

    #[test]
    fn test_innermost_call_listed_first() {
        let trace = trace_source(
            "package main\nfunc inner() {\n\tx := 1\n}\nfunc main() {\n\tinner()\n}\n",
            Limits::default(),
        )
        .unwrap();
        let step = trace.steps.iter().find(|s| s.function_name == "inner").unwrap();

        let text: Vec<String> = step_lines(step)
            .iter()
            .map(|line| line.spans.iter().map(|s| s.content.as_ref()).collect())
            .collect();
        assert_eq!(text[0], "▸ [1] inner()");
        assert_eq!(text[1], "↪ [0] main()");
    }
}
