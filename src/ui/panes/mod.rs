//! TUI pane rendering modules
//!
//! Every pane renders one aspect of the step under the playback cursor.
//!
//! # Pane Modules
//!
//! - [`source`]: Source code with Go syntax highlighting and the current line
//! - [`variables`]: Visible bindings with type labels, values and scopes
//! - [`call_stack`]: Active calls plus the current statement and loop iteration
//! - [`output`]: Program output produced up to the current step
//! - [`status`]: Status bar with keybindings and playback position
//!
//! Each pane module exports one `render_*` function taking the frame, its
//! area, the data to show, focus and a scroll offset.

pub mod call_stack;
pub mod output;
pub mod source;
pub mod status;
pub mod variables;

pub use call_stack::render_call_stack_pane;
pub use output::render_output_pane;
pub use source::{render_source_pane, SourceScrollState};
pub use status::render_status_bar;
pub use variables::render_variables_pane;

use crate::ui::theme::DEFAULT_THEME;
use ratatui::style::{Modifier, Style};
use ratatui::widgets::{Block, Borders};

/// Bordered block with the focus-dependent border colour
pub(crate) fn pane_block(title: &str, is_focused: bool) -> Block<'_> {
    let border_style = if is_focused {
        Style::default()
            .fg(DEFAULT_THEME.border_focused)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(DEFAULT_THEME.border_normal)
    };

    Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(border_style)
}

/// Clamp a list scroll offset so the last page stays full
pub(crate) fn clamp_scroll(offset: &mut usize, total_items: usize, visible_height: usize) {
    if total_items > visible_height {
        *offset = (*offset).min(total_items - visible_height);
    } else {
        *offset = 0;
    }
}
