use std::mem;

use anyhow::{Context, Result};
use crossterm::event::KeyCode;
use open::that as open_path;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Wrap};
use ratatui::Frame;

use crate::config::Settings;
use crate::playback::Player;
use crate::store::{page_count, RecordStore};

use super::forms::{parse_source_paths, ConfirmDelete, TextPrompt};
use super::helpers::{
    centered_rect, describe, shorten_label, split_even, surface_error, EMPTY_LABEL,
};
use super::screens::{last_page, page_of, BoardPage, EditorPage};

/// Footer space reserved for status messages and instructions.
const FOOTER_HEIGHT: u16 = 3;
/// Header line showing the page number and loop state.
const HEADER_HEIGHT: u16 = 1;

/// Which page of the app is showing.
#[derive(Clone, Copy, PartialEq, Eq)]
enum Screen {
    Board,
    Editor,
}

/// Dialogs layered over the current screen.
enum Mode {
    Normal,
    Adding(TextPrompt),
    Renaming { title: String, prompt: TextPrompt },
    ConfirmDelete(ConfirmDelete),
}

/// Holds the footer message text plus its severity.
struct StatusMessage {
    text: String,
    kind: StatusKind,
}

/// Severity levels shown in the footer.
enum StatusKind {
    Info,
    Error,
}

impl StatusKind {
    fn style(&self) -> Style {
        match self {
            StatusKind::Info => Style::default().fg(Color::Green),
            StatusKind::Error => Style::default().fg(Color::Red),
        }
    }
}

/// Central application state shared across the TUI.
pub struct App {
    store: RecordStore,
    player: Box<dyn Player>,
    settings: Settings,
    screen: Screen,
    mode: Mode,
    board: BoardPage,
    editor: EditorPage,
    looping: bool,
    status: Option<StatusMessage>,
}

impl App {
    pub fn new(store: RecordStore, player: Box<dyn Player>, settings: Settings) -> Self {
        let board = BoardPage::load(&store, 0, settings.board_page_size());
        let editor = EditorPage::load(&store, 0, settings.editor_page_size);
        Self {
            store,
            player,
            settings,
            screen: Screen::Board,
            mode: Mode::Normal,
            board,
            editor,
            looping: false,
            status: None,
        }
    }

    /// Process one key press. Returns `true` when the app should exit.
    pub fn handle_key(&mut self, code: KeyCode) -> Result<bool> {
        let mut exit = false;
        let mode = mem::replace(&mut self.mode, Mode::Normal);

        self.mode = match mode {
            Mode::Normal => match self.screen {
                Screen::Board => self.handle_board_key(code, &mut exit)?,
                Screen::Editor => self.handle_editor_key(code, &mut exit)?,
            },
            Mode::Adding(prompt) => self.handle_add(code, prompt)?,
            Mode::Renaming { title, prompt } => self.handle_rename(code, title, prompt)?,
            Mode::ConfirmDelete(confirm) => self.handle_confirm_delete(code, confirm)?,
        };

        if exit {
            self.player.stop()?;
        }
        Ok(exit)
    }

    fn handle_board_key(&mut self, code: KeyCode, exit: &mut bool) -> Result<Mode> {
        let columns = self.settings.board_columns as isize;
        match code {
            KeyCode::Char('q') | KeyCode::Esc => *exit = true,
            KeyCode::Left => self.board.move_selection(-1),
            KeyCode::Right => self.board.move_selection(1),
            KeyCode::Up => self.board.move_selection(-columns),
            KeyCode::Down => self.board.move_selection(columns),
            KeyCode::Enter | KeyCode::Char(' ') => self.play_selected(),
            KeyCode::Char('s') | KeyCode::Char('S') => match self.player.stop() {
                Ok(()) => self.set_status("Stopped.", StatusKind::Info),
                Err(err) => self.set_status(surface_error(&err), StatusKind::Error),
            },
            KeyCode::Char('l') | KeyCode::Char('L') => {
                self.looping = !self.looping;
                let text = if self.looping { "Loop on." } else { "Loop off." };
                self.set_status(text, StatusKind::Info);
            }
            KeyCode::Char(']') | KeyCode::PageDown => self.next_board_page(),
            KeyCode::Char('[') | KeyCode::PageUp => self.prev_board_page(),
            KeyCode::Char('e') | KeyCode::Char('E') => {
                self.clear_status();
                self.editor = EditorPage::load(&self.store, 0, self.settings.editor_page_size);
                self.screen = Screen::Editor;
            }
            _ => {}
        }
        Ok(Mode::Normal)
    }

    fn handle_editor_key(&mut self, code: KeyCode, exit: &mut bool) -> Result<Mode> {
        match code {
            KeyCode::Char('q') => *exit = true,
            KeyCode::Esc | KeyCode::Char('b') | KeyCode::Char('B') => {
                self.clear_status();
                self.board = BoardPage::load(&self.store, 0, self.settings.board_page_size());
                self.screen = Screen::Board;
            }
            KeyCode::Up => self.editor.move_selection(-1),
            KeyCode::Down => self.editor.move_selection(1),
            KeyCode::Char(']') | KeyCode::PageDown => self.next_editor_page(),
            KeyCode::Char('[') | KeyCode::PageUp => self.prev_editor_page(),
            KeyCode::Char('a') | KeyCode::Char('A') => {
                self.clear_status();
                return Ok(Mode::Adding(TextPrompt::default()));
            }
            KeyCode::Char('r') | KeyCode::Char('R') => {
                if let Some(record) = self.editor.current() {
                    let title = record.title.clone();
                    let prompt = TextPrompt::with_value(&title);
                    self.clear_status();
                    return Ok(Mode::Renaming { title, prompt });
                }
                self.set_status("No entry selected to rename.", StatusKind::Error);
            }
            KeyCode::Char('d') | KeyCode::Char('D') | KeyCode::Delete => {
                if let Some(record) = self.editor.current() {
                    let confirm = ConfirmDelete::new(record.title.clone(), record.filename.clone());
                    self.clear_status();
                    return Ok(Mode::ConfirmDelete(confirm));
                }
                self.set_status("No entry selected to delete.", StatusKind::Error);
            }
            KeyCode::Char('K') => self.move_selected(true),
            KeyCode::Char('J') => self.move_selected(false),
            KeyCode::Char('o') | KeyCode::Char('O') => {
                let dir = self.store.paths().asset_dir.clone();
                match open_path(&dir).with_context(|| format!("failed to open {}", dir.display()))
                {
                    Ok(()) => self.set_status("Opened the audio folder.", StatusKind::Info),
                    Err(err) => self.set_status(surface_error(&err), StatusKind::Error),
                }
            }
            _ => {}
        }
        Ok(Mode::Normal)
    }

    fn handle_add(&mut self, code: KeyCode, mut prompt: TextPrompt) -> Result<Mode> {
        match code {
            KeyCode::Esc => {
                self.set_status("Add cancelled.", StatusKind::Info);
                Ok(Mode::Normal)
            }
            KeyCode::Backspace => {
                prompt.backspace();
                Ok(Mode::Adding(prompt))
            }
            KeyCode::Enter => {
                let sources = parse_source_paths(&prompt.value);
                if sources.is_empty() {
                    self.set_status("No files selected; nothing added.", StatusKind::Info);
                    return Ok(Mode::Normal);
                }

                let before = self.store.len();
                let result = self.store.add(&sources);
                let added = self.store.len().saturating_sub(before);
                self.reload_editor(None);

                match result {
                    Ok(()) => {
                        let last = self.store.len().saturating_sub(1);
                        self.show_editor_index(last);
                        self.set_status(format!("Added {added} clip(s)."), StatusKind::Info);
                        Ok(Mode::Normal)
                    }
                    Err(err) => {
                        let message = describe(&err);
                        let remaining: Vec<_> = sources[added.min(sources.len())..]
                            .iter()
                            .map(|path| path.display().to_string())
                            .collect();
                        prompt.value = remaining.join("; ");
                        prompt.error = Some(message.clone());
                        self.set_status(
                            format!("Added {added} clip(s) before an error: {message}"),
                            StatusKind::Error,
                        );
                        Ok(Mode::Adding(prompt))
                    }
                }
            }
            KeyCode::Char(ch) => {
                prompt.push_char(ch);
                Ok(Mode::Adding(prompt))
            }
            _ => Ok(Mode::Adding(prompt)),
        }
    }

    fn handle_rename(&mut self, code: KeyCode, title: String, mut prompt: TextPrompt) -> Result<Mode> {
        match code {
            KeyCode::Esc => {
                self.set_status("Rename cancelled.", StatusKind::Info);
                Ok(Mode::Normal)
            }
            KeyCode::Backspace => {
                prompt.backspace();
                Ok(Mode::Renaming { title, prompt })
            }
            KeyCode::Enter => match self.store.rename(&title, &prompt.value) {
                Ok(()) => {
                    let new_title = prompt.value.trim().to_string();
                    self.reload_editor(Some(&new_title));
                    self.set_status(format!("Renamed to {new_title}."), StatusKind::Info);
                    Ok(Mode::Normal)
                }
                Err(err) => {
                    let message = describe(&err);
                    prompt.error = Some(message.clone());
                    self.set_status(message, StatusKind::Error);
                    Ok(Mode::Renaming { title, prompt })
                }
            },
            KeyCode::Char(ch) => {
                prompt.push_char(ch);
                Ok(Mode::Renaming { title, prompt })
            }
            _ => Ok(Mode::Renaming { title, prompt }),
        }
    }

    fn handle_confirm_delete(&mut self, code: KeyCode, mut confirm: ConfirmDelete) -> Result<Mode> {
        match code {
            KeyCode::Esc | KeyCode::Char('n') | KeyCode::Char('N') => {
                self.set_status(
                    format!("{} has NOT been deleted.", confirm.title),
                    StatusKind::Info,
                );
                Ok(Mode::Normal)
            }
            KeyCode::Char('f') | KeyCode::Char('F') => {
                confirm.toggle_asset();
                Ok(Mode::ConfirmDelete(confirm))
            }
            KeyCode::Enter | KeyCode::Char('y') | KeyCode::Char('Y') => {
                let result = self.store.delete(&confirm.title, confirm.delete_asset);
                self.reload_editor(None);
                match result {
                    Ok(()) => {
                        self.set_status(format!("Deleted {}.", confirm.title), StatusKind::Info);
                    }
                    Err(err) => {
                        // A failed audio file removal still leaves the row deleted.
                        self.set_status(describe(&err), StatusKind::Error);
                    }
                }
                Ok(Mode::Normal)
            }
            _ => Ok(Mode::ConfirmDelete(confirm)),
        }
    }

    fn play_selected(&mut self) {
        let Some(title) = self.board.current_title().map(str::to_string) else {
            self.set_status("No clip on this button.", StatusKind::Error);
            return;
        };

        let result = match self.store.asset_path(&title) {
            Ok(path) => self.player.play(&path, self.looping),
            Err(err) => Err(err.into()),
        };
        match result {
            Ok(()) => {
                let suffix = if self.looping { " (looping)" } else { "" };
                self.set_status(format!("Playing {title}{suffix}."), StatusKind::Info);
            }
            Err(err) => self.set_status(format!("{err:#}"), StatusKind::Error),
        }
    }

    fn move_selected(&mut self, upward: bool) {
        let Some(title) = self.editor.current().map(|record| record.title.clone()) else {
            return;
        };
        let result = if upward {
            self.store.move_up(&title)
        } else {
            self.store.move_down(&title)
        };
        match result {
            Ok(()) => {
                if let Some(index) = self.store.position(&title) {
                    self.show_editor_index(index);
                }
                let direction = if upward { "up" } else { "down" };
                self.set_status(format!("Moved {title} {direction}."), StatusKind::Info);
            }
            Err(err) => {
                self.reload_editor(None);
                self.set_status(describe(&err), StatusKind::Error);
            }
        }
    }

    fn next_board_page(&mut self) {
        let size = self.settings.board_page_size();
        let next = BoardPage::load(&self.store, self.board.page + 1, size);
        if !next.titles.is_empty() {
            self.board = next;
        }
    }

    fn prev_board_page(&mut self) {
        let page = self.board.page.saturating_sub(1);
        self.board = BoardPage::load(&self.store, page, self.settings.board_page_size());
    }

    fn next_editor_page(&mut self) {
        let size = self.settings.editor_page_size;
        let next = EditorPage::load(&self.store, self.editor.page + 1, size);
        if !next.rows.is_empty() {
            self.editor = next;
        }
    }

    fn prev_editor_page(&mut self) {
        let page = self.editor.page.saturating_sub(1);
        self.editor = EditorPage::load(&self.store, page, self.settings.editor_page_size);
    }

    /// Rebuild the editor page after a mutation, stepping back a page if the
    /// current one emptied out.
    fn reload_editor(&mut self, focus: Option<&str>) {
        let size = self.settings.editor_page_size;
        let page = self.editor.page.min(last_page(self.store.len(), size));
        let selected = self.editor.selected;
        self.editor = EditorPage::load(&self.store, page, size);
        self.editor.selected = selected;
        self.editor.clamp_selection();
        if let Some(title) = focus {
            if !self.editor.focus(title) {
                if let Some(index) = self.store.position(title) {
                    self.show_editor_index(index);
                }
            }
        }
    }

    /// Jump the editor to whichever page holds entry `index` and select it.
    fn show_editor_index(&mut self, index: usize) {
        let size = self.settings.editor_page_size;
        self.editor = EditorPage::load(&self.store, page_of(index, size), size);
        self.editor.selected = index % size;
        self.editor.clamp_selection();
    }

    fn set_status<S: Into<String>>(&mut self, text: S, kind: StatusKind) {
        self.status = Some(StatusMessage {
            text: text.into(),
            kind,
        });
    }

    fn clear_status(&mut self) {
        self.status = None;
    }

    pub(crate) fn draw(&self, frame: &mut Frame) {
        let area = frame.area();
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(HEADER_HEIGHT),
                Constraint::Min(0),
                Constraint::Length(FOOTER_HEIGHT),
            ])
            .split(area);

        self.draw_header(frame, chunks[0]);
        match self.screen {
            Screen::Board => self.draw_board(frame, chunks[1]),
            Screen::Editor => self.draw_editor(frame, chunks[1]),
        }
        self.draw_footer(frame, chunks[2]);

        match &self.mode {
            Mode::Adding(prompt) => self.draw_prompt(
                frame,
                area,
                "Add Audio",
                "Files",
                "/path/to/clip.wav; /path/to/other.wav",
                prompt,
            ),
            Mode::Renaming { title, prompt } => self.draw_prompt(
                frame,
                area,
                &format!("Rename {title}"),
                "Title",
                "<required>",
                prompt,
            ),
            Mode::ConfirmDelete(confirm) => self.draw_confirm_delete(frame, area, confirm),
            Mode::Normal => {}
        }
    }

    fn draw_header(&self, frame: &mut Frame, area: Rect) {
        let (name, page, size) = match self.screen {
            Screen::Board => ("Soundboard", self.board.page, self.settings.board_page_size()),
            Screen::Editor => ("Edit Audio Files", self.editor.page, self.settings.editor_page_size),
        };
        let pages = page_count(self.store.len(), size);

        let mut spans = vec![
            Span::styled(name, Style::default().add_modifier(Modifier::BOLD)),
            Span::raw(format!("   Page: {}/{pages}", page + 1)),
        ];
        if self.looping {
            spans.push(Span::styled("   LOOP", Style::default().fg(Color::Red)));
        }
        frame.render_widget(Paragraph::new(Line::from(spans)), area);
    }

    fn draw_board(&self, frame: &mut Frame, area: Rect) {
        let columns = self.settings.board_columns;
        let rows = split_even(area, Direction::Vertical, self.settings.board_rows);
        for (row_idx, row_area) in rows.into_iter().enumerate() {
            let cells = split_even(row_area, Direction::Horizontal, columns);
            for (col_idx, cell) in cells.into_iter().enumerate() {
                let index = row_idx * columns + col_idx;
                let title = self.board.titles.get(index);
                let label = title
                    .map(|title| shorten_label(title, self.settings.label_width))
                    .unwrap_or_else(|| EMPTY_LABEL.to_string());

                let mut block = Block::default().borders(Borders::ALL);
                let mut style = Style::default();
                if title.is_none() {
                    style = style.fg(Color::DarkGray);
                } else if index == self.board.selected {
                    block = block.style(Style::default().fg(Color::Yellow));
                    style = style.add_modifier(Modifier::BOLD);
                }

                let button = Paragraph::new(Span::styled(label, style))
                    .alignment(Alignment::Center)
                    .wrap(Wrap { trim: true })
                    .block(block);
                frame.render_widget(button, cell);
            }
        }
    }

    fn draw_editor(&self, frame: &mut Frame, area: Rect) {
        let block = Block::default().borders(Borders::ALL).title("Audio Files");
        if self.editor.rows.is_empty() {
            let message = Paragraph::new(
                "No audio files are available.\nPress 'a' to add one.",
            )
            .alignment(Alignment::Center)
            .block(block);
            frame.render_widget(message, area);
            return;
        }

        let items: Vec<ListItem> = self
            .editor
            .rows
            .iter()
            .map(|record| {
                ListItem::new(Line::from(vec![
                    Span::raw(record.title.clone()),
                    Span::styled(
                        format!("  ({})", record.filename),
                        Style::default().fg(Color::DarkGray),
                    ),
                ]))
            })
            .collect();

        let list = List::new(items)
            .block(block)
            .highlight_style(Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD))
            .highlight_symbol("> ");
        let mut state = ListState::default();
        state.select(Some(self.editor.selected));
        frame.render_stateful_widget(list, area, &mut state);
    }

    fn draw_footer(&self, frame: &mut Frame, area: Rect) {
        let block = Block::default().borders(Borders::TOP);
        frame.render_widget(block.clone(), area);
        let inner = block.inner(area);

        let status_line = if let Some(status) = &self.status {
            Line::from(vec![Span::styled(status.text.clone(), status.kind.style())])
        } else {
            Line::from("")
        };

        let paragraph = Paragraph::new(vec![status_line, self.footer_instructions()])
            .wrap(Wrap { trim: true });
        frame.render_widget(paragraph, inner);
    }

    fn footer_instructions(&self) -> Line<'static> {
        let key_style = Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD);
        let keys: &'static [(&'static str, &'static str)] = match (&self.mode, self.screen) {
            (Mode::Adding(_), _) | (Mode::Renaming { .. }, _) => {
                &[("[Enter]", "Save"), ("[Esc]", "Cancel")]
            }
            (Mode::ConfirmDelete(_), _) => &[
                ("[Y]", "Delete"),
                ("[F]", "Toggle audio file"),
                ("[N/Esc]", "Keep"),
            ],
            (Mode::Normal, Screen::Board) => &[
                ("[Arrows]", "Select"),
                ("[Enter]", "Play"),
                ("[S]", "Stop"),
                ("[L]", "Loop"),
                ("[ [ ] ]", "Page"),
                ("[E]", "Edit"),
                ("[Q]", "Quit"),
            ],
            (Mode::Normal, Screen::Editor) => &[
                ("[A]", "Add"),
                ("[R]", "Rename"),
                ("[D]", "Delete"),
                ("[K/J]", "Move up/down"),
                ("[O]", "Open folder"),
                ("[ [ ] ]", "Page"),
                ("[Esc]", "Back"),
            ],
        };

        let mut spans = Vec::with_capacity(keys.len() * 2);
        for (key, action) in keys {
            spans.push(Span::styled(*key, key_style));
            spans.push(Span::raw(format!(" {action}   ")));
        }
        Line::from(spans)
    }

    fn draw_prompt(
        &self,
        frame: &mut Frame,
        area: Rect,
        title: &str,
        label: &str,
        placeholder: &str,
        prompt: &TextPrompt,
    ) {
        let popup_area = centered_rect(70, 30, area);
        frame.render_widget(Clear, popup_area);

        let block = Block::default().title(title.to_string()).borders(Borders::ALL);
        frame.render_widget(block.clone(), popup_area);
        let inner = block.inner(popup_area);

        let mut lines = vec![prompt.build_line(label, placeholder), Line::from("")];
        if let Some(error) = &prompt.error {
            lines.push(Line::from(Span::styled(
                error.clone(),
                Style::default().fg(Color::Red),
            )));
        } else {
            lines.push(Line::from(Span::styled(
                "Enter to save, Esc to cancel",
                Style::default().fg(Color::Gray),
            )));
        }
        frame.render_widget(Paragraph::new(lines).wrap(Wrap { trim: true }), inner);

        let prefix = format!("{label}: ").len() as u16;
        let cursor_x = inner.x + prefix + prompt.value_len() as u16;
        frame.set_cursor_position((cursor_x.min(inner.right().saturating_sub(1)), inner.y));
    }

    fn draw_confirm_delete(&self, frame: &mut Frame, area: Rect, confirm: &ConfirmDelete) {
        let popup_area = centered_rect(60, 30, area);
        frame.render_widget(Clear, popup_area);

        let block = Block::default()
            .title(format!("Delete {}", confirm.title))
            .borders(Borders::ALL);
        frame.render_widget(block.clone(), popup_area);
        let inner = block.inner(popup_area);

        let asset_line = if confirm.delete_asset {
            Line::from(Span::styled(
                format!("The audio file {} will be deleted too.", confirm.filename),
                Style::default().fg(Color::Red),
            ))
        } else {
            Line::from(format!("The audio file {} will be kept.", confirm.filename))
        };

        let lines = vec![
            Line::from(format!("Are you sure you want to delete {}?", confirm.title)),
            asset_line,
            Line::from(""),
            Line::from(Span::styled(
                "Press Y to confirm, F to toggle the audio file, N / Esc to cancel.",
                Style::default().fg(Color::Gray),
            )),
        ];

        let paragraph = Paragraph::new(lines)
            .alignment(Alignment::Left)
            .wrap(Wrap { trim: true });
        frame.render_widget(paragraph, inner);
    }
}
