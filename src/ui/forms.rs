use std::path::PathBuf;

use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};

/// Separator between source paths typed into the "Add" prompt.
const PATH_SEPARATOR: char = ';';

/// Single-line text input used by the add and rename dialogs.
#[derive(Default, Clone)]
pub(crate) struct TextPrompt {
    pub(crate) value: String,
    pub(crate) error: Option<String>,
}

impl TextPrompt {
    /// Seed the prompt with an existing value, e.g. the current title.
    pub(crate) fn with_value(value: &str) -> Self {
        Self {
            value: value.to_string(),
            error: None,
        }
    }

    /// Append a character, ignoring control input.
    pub(crate) fn push_char(&mut self, ch: char) -> bool {
        if ch.is_control() {
            return false;
        }
        self.value.push(ch);
        self.error = None;
        true
    }

    pub(crate) fn backspace(&mut self) {
        self.value.pop();
    }

    /// Render the prompt as `label: value`, dimming an empty value.
    pub(crate) fn build_line(&self, label: &str, placeholder: &str) -> Line<'static> {
        let (display, style) = if self.value.is_empty() {
            (placeholder.to_string(), Style::default().fg(Color::DarkGray))
        } else {
            (self.value.clone(), Style::default().fg(Color::Yellow))
        };

        Line::from(vec![Span::raw(format!("{label}: ")), Span::styled(display, style)])
    }

    pub(crate) fn value_len(&self) -> usize {
        self.value.chars().count()
    }
}

/// Split the add prompt into source paths. Blank segments are dropped and a
/// pair of surrounding quotes, as left by pasting from a file manager, is
/// removed. An empty result means the user cancelled.
pub(crate) fn parse_source_paths(input: &str) -> Vec<PathBuf> {
    input
        .split(PATH_SEPARATOR)
        .map(str::trim)
        .map(strip_quotes)
        .filter(|segment| !segment.is_empty())
        .map(PathBuf::from)
        .collect()
}

fn strip_quotes(segment: &str) -> &str {
    for quote in ['"', '\''] {
        if let Some(inner) = segment
            .strip_prefix(quote)
            .and_then(|rest| rest.strip_suffix(quote))
        {
            return inner.trim();
        }
    }
    segment
}

/// Pending delete awaiting a yes/no answer.
#[derive(Clone)]
pub(crate) struct ConfirmDelete {
    pub(crate) title: String,
    pub(crate) filename: String,
    pub(crate) delete_asset: bool,
}

impl ConfirmDelete {
    pub(crate) fn new(title: String, filename: String) -> Self {
        Self {
            title,
            filename,
            delete_asset: false,
        }
    }

    pub(crate) fn toggle_asset(&mut self) {
        self.delete_asset = !self.delete_asset;
    }
}
