use crate::models::Record;
use crate::store::{page_count, RecordStore};

/// One page of the board grid. Titles are copied out of the store when the
/// page is built, so every button keeps the clip it was drawn with even after
/// the page number moves on.
#[derive(Default)]
pub(crate) struct BoardPage {
    pub(crate) page: usize,
    pub(crate) titles: Vec<String>,
    pub(crate) selected: usize,
}

impl BoardPage {
    pub(crate) fn load(store: &RecordStore, page: usize, page_size: usize) -> Self {
        let titles = store
            .enumerate(page * page_size, page_size)
            .map(str::to_string)
            .collect();
        Self {
            page,
            titles,
            selected: 0,
        }
    }

    pub(crate) fn current_title(&self) -> Option<&str> {
        self.titles.get(self.selected).map(String::as_str)
    }

    /// Move across the grid, staying on occupied buttons.
    pub(crate) fn move_selection(&mut self, offset: isize) {
        if self.titles.is_empty() {
            return;
        }
        let target = self.selected as isize + offset;
        if (0..self.titles.len() as isize).contains(&target) {
            self.selected = target as usize;
        }
    }
}

/// One page of the editor list, holding full records so filenames can be
/// shown alongside titles.
#[derive(Default)]
pub(crate) struct EditorPage {
    pub(crate) page: usize,
    pub(crate) rows: Vec<Record>,
    pub(crate) selected: usize,
}

impl EditorPage {
    pub(crate) fn load(store: &RecordStore, page: usize, page_size: usize) -> Self {
        // Sliced by position, not looked up by title, so duplicate titles
        // from a hand-edited file still show their own filenames.
        let rows = store
            .records()
            .iter()
            .skip(page.saturating_mul(page_size))
            .take(page_size)
            .cloned()
            .collect();
        Self {
            page,
            rows,
            selected: 0,
        }
    }

    pub(crate) fn current(&self) -> Option<&Record> {
        self.rows.get(self.selected)
    }

    pub(crate) fn move_selection(&mut self, offset: isize) {
        if self.rows.is_empty() {
            return;
        }
        let last = self.rows.len() as isize - 1;
        self.selected = (self.selected as isize + offset).clamp(0, last) as usize;
    }

    /// Select the row with this title if it is on the page.
    pub(crate) fn focus(&mut self, title: &str) -> bool {
        match self.rows.iter().position(|record| record.title == title) {
            Some(index) => {
                self.selected = index;
                true
            }
            None => false,
        }
    }

    pub(crate) fn clamp_selection(&mut self) {
        self.selected = self.selected.min(self.rows.len().saturating_sub(1));
    }
}

/// Page that holds the entry at `index`.
pub(crate) fn page_of(index: usize, page_size: usize) -> usize {
    index / page_size.max(1)
}

/// Last page that still has entries, or page zero for an empty store.
pub(crate) fn last_page(len: usize, page_size: usize) -> usize {
    page_count(len, page_size) - 1
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::StorePaths;
    use std::fs;

    fn store_with(n: usize) -> (RecordStore, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let paths = StorePaths::under(dir.path());
        let content: String = (0..n).map(|i| format!("clip{i},clip{i}.wav\n")).collect();
        fs::write(&paths.content_file, content).unwrap();
        (RecordStore::open(paths).unwrap(), dir)
    }

    #[test]
    fn board_page_captures_its_window() {
        let (store, _dir) = store_with(30);
        let page = BoardPage::load(&store, 1, 25);
        assert_eq!(page.titles, ["clip25", "clip26", "clip27", "clip28", "clip29"]);
        assert_eq!(page.current_title(), Some("clip25"));
    }

    #[test]
    fn board_selection_stays_on_occupied_buttons() {
        let (store, _dir) = store_with(7);
        let mut page = BoardPage::load(&store, 0, 25);
        page.move_selection(5);
        assert_eq!(page.current_title(), Some("clip5"));
        page.move_selection(5);
        assert_eq!(page.current_title(), Some("clip5"));
        page.move_selection(-1);
        assert_eq!(page.current_title(), Some("clip4"));
    }

    #[test]
    fn editor_page_carries_filenames() {
        let (store, _dir) = store_with(3);
        let mut page = EditorPage::load(&store, 0, 13);
        assert_eq!(page.rows[2], Record::new("clip2", "clip2.wav"));
        assert!(page.focus("clip1"));
        page.move_selection(10);
        assert_eq!(page.selected, 2);
        assert!(!page.focus("missing"));
    }

    #[test]
    fn editor_rows_keep_their_own_filenames() {
        let dir = tempfile::tempdir().unwrap();
        let paths = StorePaths::under(dir.path());
        fs::create_dir_all(&paths.asset_dir).unwrap();
        fs::write(&paths.content_file, "horn,horn.wav\nhorn,horn-2.wav\nbell,bell.wav\n").unwrap();
        let store = RecordStore::open(paths).unwrap();

        let page = EditorPage::load(&store, 0, 2);
        assert_eq!(
            page.rows,
            [Record::new("horn", "horn.wav"), Record::new("horn", "horn-2.wav")]
        );
        assert_eq!(EditorPage::load(&store, 1, 2).rows, [Record::new("bell", "bell.wav")]);
    }

    #[test]
    fn page_arithmetic() {
        assert_eq!(page_of(12, 13), 0);
        assert_eq!(page_of(13, 13), 1);
        assert_eq!(last_page(0, 13), 0);
        assert_eq!(last_page(26, 13), 1);
        assert_eq!(last_page(27, 13), 2);
    }
}
