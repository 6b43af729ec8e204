use std::error::Error as StdError;

use anyhow::Error;
use ratatui::layout::{Constraint, Direction, Layout, Rect};

/// Placeholder shown on board buttons that have no clip behind them.
pub(crate) const EMPTY_LABEL: &str = "*****";

/// Shorten a title to fit a board button. Titles longer than `width` keep
/// their first `width - 2` characters followed by an ellipsis.
pub(crate) fn shorten_label(title: &str, width: usize) -> String {
    if title.chars().count() <= width {
        return title.to_string();
    }
    let mut shortened: String = title.chars().take(width.saturating_sub(2)).collect();
    shortened.push_str("...");
    shortened
}

/// Produce a rectangle centered within `area` that spans the requested percent
/// of the width and height. Used for modal dialogs.
pub(crate) fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let horizontal = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(area);

    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(horizontal[1]);

    vertical[1]
}

/// Split `area` into `count` equally sized strips along `direction`.
pub(crate) fn split_even(area: Rect, direction: Direction, count: usize) -> Vec<Rect> {
    let count = count.max(1) as u32;
    Layout::default()
        .direction(direction)
        .constraints(vec![Constraint::Ratio(1, count); count as usize])
        .split(area)
        .to_vec()
}

/// Extract the most relevant error message from a chained error.
pub(crate) fn surface_error(err: &Error) -> String {
    err.chain()
        .last()
        .map(|cause| cause.to_string())
        .unwrap_or_else(|| err.to_string())
}

/// Render a store failure together with its causes, e.g.
/// `failed to move audio file to ...: No such file or directory`.
pub(crate) fn describe(err: &(dyn StdError + 'static)) -> String {
    let mut message = err.to_string();
    let mut cause = err.source();
    while let Some(inner) = cause {
        message.push_str(": ");
        message.push_str(&inner.to_string());
        cause = inner.source();
    }
    message
}
