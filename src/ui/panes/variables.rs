//! Variables pane rendering
//!
//! Lists every binding visible at the current step as
//! `name type = value`, grouped under the scope label that introduced it.
//! Bindings that are new or hold a different value than at the previous step
//! are highlighted.

use super::{clamp_scroll, pane_block};
use crate::snapshot::{RecordedValue, Step, Variable};
use crate::ui::theme::DEFAULT_THEME;
use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{List, ListItem, Paragraph},
    Frame,
};

fn value_style(value: &RecordedValue) -> Style {
    let color = match value {
        RecordedValue::Int(_) | RecordedValue::Float(_) => DEFAULT_THEME.number,
        RecordedValue::Str(_) => DEFAULT_THEME.string,
        RecordedValue::Bool(_) => DEFAULT_THEME.boolean,
        RecordedValue::Absent => DEFAULT_THEME.comment,
        RecordedValue::Slice(_) | RecordedValue::Map(_) => DEFAULT_THEME.fg,
    };
    Style::default().fg(color)
}

/// `%v` text, with strings quoted so empty strings stay visible
fn display_value(value: &RecordedValue) -> String {
    match value {
        RecordedValue::Str(s) => format!("{:?}", s),
        other => other.to_string(),
    }
}

pub(crate) fn is_changed(variable: &Variable, previous: Option<&Step>) -> bool {
    match previous {
        Some(step) => step
            .variable(&variable.name)
            .map_or(true, |before| before.value != variable.value),
        None => true,
    }
}

fn variable_line(variable: &Variable, changed: bool) -> Line<'static> {
    let name_style = if changed {
        Style::default()
            .fg(DEFAULT_THEME.changed)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(DEFAULT_THEME.fg)
    };

    Line::from(vec![
        Span::raw("  "),
        Span::styled(variable.name.clone(), name_style),
        Span::raw(" "),
        Span::styled(
            variable.type_label.clone(),
            Style::default().fg(DEFAULT_THEME.type_name),
        ),
        Span::styled(" = ", Style::default().fg(DEFAULT_THEME.comment)),
        Span::styled(display_value(&variable.value), value_style(&variable.value)),
    ])
}

/// Render the variables pane for `step`, diffing against `previous`
pub fn render_variables_pane(
    frame: &mut Frame,
    area: Rect,
    step: Option<&Step>,
    previous: Option<&Step>,
    is_focused: bool,
    scroll_offset: &mut usize,
) {
    let block = pane_block(" Variables ", is_focused);

    let Some(step) = step.filter(|s| !s.variables.is_empty()) else {
        let paragraph = Paragraph::new("(no variables)")
            .block(block)
            .style(Style::default().fg(DEFAULT_THEME.comment));
        frame.render_widget(paragraph, area);
        return;
    };

    let mut items = Vec::new();
    for scope in &step.scope_stack {
        let bindings: Vec<&Variable> = step.variables.iter().filter(|v| &v.scope == scope).collect();
        if bindings.is_empty() {
            continue;
        }
        items.push(ListItem::new(Line::from(vec![
            Span::styled("▸ ", Style::default().fg(DEFAULT_THEME.secondary)),
            Span::styled(
                scope.clone(),
                Style::default()
                    .fg(DEFAULT_THEME.function)
                    .add_modifier(Modifier::BOLD),
            ),
        ])));
        for variable in bindings {
            items.push(ListItem::new(variable_line(variable, is_changed(variable, previous))));
        }
    }

    let visible_height = area.height.saturating_sub(2).max(1) as usize;
    clamp_scroll(scroll_offset, items.len(), visible_height);

    let visible_items: Vec<ListItem> = items.into_iter().skip(*scroll_offset).take(visible_height).collect();
    frame.render_widget(List::new(visible_items).block(block), area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::snapshot::StatementKind;

    fn step_with(vars: &[(&str, RecordedValue)]) -> Step {
        Step {
            step_index: 0,
            line: 1,
            statement: String::new(),
            statement_type: StatementKind::Assign,
            variables: vars
                .iter()
                .map(|(name, value)| Variable {
                    name: name.to_string(),
                    type_label: "int".to_string(),
                    value: value.clone(),
                    scope: "main".to_string(),
                })
                .collect(),
            scope_stack: vec!["main".to_string()],
            output: None,
            loop_iteration: None,
            call_stack: vec!["main".to_string()],
            function_name: "main".to_string(),
        }
    }

    #[test]
    fn test_change_detection() {
        let before = step_with(&[("x", RecordedValue::Int(1))]);
        let after = step_with(&[("x", RecordedValue::Int(2)), ("y", RecordedValue::Int(0))]);
        let same = step_with(&[("x", RecordedValue::Int(1))]);

        assert!(is_changed(&after.variables[0], Some(&before)));
        assert!(is_changed(&after.variables[1], Some(&before)));
        assert!(!is_changed(&same.variables[0], Some(&before)));
        assert!(is_changed(&same.variables[0], None));
    }

    #[test]
    fn test_strings_are_quoted() {
        assert_eq!(display_value(&RecordedValue::Str(String::new())), "\"\"");
        assert_eq!(display_value(&RecordedValue::Absent), "<nil>");
    }
}
