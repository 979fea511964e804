use ropey::Rope;
use std::cmp;
use tagmark::TagKind;

/// Selection in the buffer, in chars. `anchor == head` is a plain caret.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Caret {
    pub anchor: usize,
    pub head: usize,
}

impl Caret {
    pub fn at(pos: usize) -> Self {
        Self {
            anchor: pos,
            head: pos,
        }
    }

    /// A selection from `start` to `end`.
    pub fn new(start: usize, end: usize) -> Self {
        Self {
            anchor: start,
            head: end,
        }
    }

    pub fn start(&self) -> usize {
        cmp::min(self.anchor, self.head)
    }

    pub fn end(&self) -> usize {
        cmp::max(self.anchor, self.head)
    }

    pub fn is_collapsed(&self) -> bool {
        self.anchor == self.head
    }

    fn clamped(self, len: usize) -> Self {
        Self {
            anchor: self.anchor.min(len),
            head: self.head.min(len),
        }
    }
}

#[derive(Clone)]
pub struct Editor {
    rope: Rope,
    caret: Option<Caret>,
    focused: bool,
    modified: bool,
    // Undo/Redo support
    history: Vec<EditorState>,
    history_index: usize,
    history_limit: usize,
    /// History entry that matches the last save, if it is still reachable.
    saved_index: Option<usize>,
}

#[derive(Clone)]
struct EditorState {
    content: String,
    caret: Option<Caret>,
}

pub const DEFAULT_HISTORY_LIMIT: usize = 100;

impl Editor {
    pub fn new() -> Self {
        Self::from_text("")
    }

    /// Buffer seeded with `initial`, unmodified, caret unknown.
    pub fn from_text(initial: &str) -> Self {
        Self {
            rope: Rope::from_str(initial),
            caret: None,
            focused: false,
            modified: false,
            history: vec![EditorState {
                content: initial.to_string(),
                caret: None,
            }],
            history_index: 0,
            history_limit: DEFAULT_HISTORY_LIMIT,
            saved_index: Some(0),
        }
    }

    pub fn set_history_limit(&mut self, limit: usize) {
        self.history_limit = limit.max(1);
    }

    /// Replace the buffer with a fresh document and drop the undo history.
    pub fn load(&mut self, content: &str) {
        let limit = self.history_limit;
        *self = Self::from_text(content);
        self.history_limit = limit;
    }

    /// Replace the buffer wholesale as an edit. The caret moves to the end.
    pub fn set_text(&mut self, content: &str) {
        self.rope = Rope::from_str(content);
        self.caret = Some(Caret::at(self.rope.len_chars()));
        self.modified = true;
        self.save_state();
    }

    pub fn text(&self) -> String {
        self.rope.to_string()
    }

    pub fn len_chars(&self) -> usize {
        self.rope.len_chars()
    }

    pub fn is_empty(&self) -> bool {
        self.rope.len_chars() == 0
    }

    pub fn line_count(&self) -> usize {
        self.rope.len_lines()
    }

    pub fn line(&self, idx: usize) -> Option<String> {
        self.rope
            .get_line(idx)
            .map(|line| line.to_string().trim_end_matches('\n').to_string())
    }

    pub fn is_modified(&self) -> bool {
        self.modified
    }

    pub fn mark_saved(&mut self) {
        self.modified = false;
        self.saved_index = Some(self.history_index);
    }

    pub fn is_focused(&self) -> bool {
        self.focused
    }

    pub fn focus(&mut self) {
        self.focused = true;
    }

    pub fn blur(&mut self) {
        self.focused = false;
    }

    /// Last known caret, if the buffer has had one.
    pub fn caret(&self) -> Option<Caret> {
        self.caret
    }

    pub fn set_caret(&mut self, start: usize, end: usize) {
        self.caret = Some(Caret::new(start, end).clamped(self.rope.len_chars()));
    }

    pub fn selected_text(&self) -> String {
        match self.caret {
            Some(caret) if !caret.is_collapsed() => {
                let caret = caret.clamped(self.rope.len_chars());
                self.rope.slice(caret.start()..caret.end()).to_string()
            }
            _ => String::new(),
        }
    }

    /// Splice `fragment` over the current selection.
    ///
    /// Without a known caret the fragment is appended. The caret collapses
    /// right after the fragment and that position is returned.
    pub fn insert_at_caret(&mut self, fragment: &str) -> usize {
        let len = self.rope.len_chars();
        let (start, end) = match self.caret {
            Some(caret) => {
                let caret = caret.clamped(len);
                (caret.start(), caret.end())
            }
            None => (len, len),
        };

        if start < end {
            self.rope.remove(start..end);
        }
        self.rope.insert(start, fragment);

        let pos = start + fragment.chars().count();
        self.caret = Some(Caret::at(pos));
        self.focused = true;
        self.modified = true;
        self.save_state();
        pos
    }

    /// Toolbar action for `kind`.
    ///
    /// Plain kinds wrap the selection, or insert an empty pair and leave the
    /// caret between the tags. Valued kinds insert a sample tag whose label is
    /// the selection when there is one.
    pub fn wrap_selection_or_insert_placeholder(&mut self, kind: TagKind) -> usize {
        let selected = self.selected_text();

        if let Some((url, label)) = kind.sample() {
            let label = if selected.is_empty() { label } else { selected.as_str() };
            return self.insert_at_caret(&kind.wrap(Some(url), label));
        }

        if !selected.is_empty() {
            return self.insert_at_caret(&kind.wrap(None, &selected));
        }

        let after = self.insert_at_caret(&kind.placeholder());
        let inside = after - kind.close_tag().chars().count();
        self.caret = Some(Caret::at(inside));
        inside
    }

    pub fn insert_char(&mut self, c: char) {
        let mut buf = [0u8; 4];
        self.insert_at_caret(c.encode_utf8(&mut buf));
    }

    pub fn insert_newline(&mut self) {
        self.insert_char('\n');
    }

    pub fn delete_char_backward(&mut self) {
        let len = self.rope.len_chars();
        let caret = self.caret.unwrap_or(Caret::at(len)).clamped(len);
        let (start, end) = if caret.is_collapsed() {
            if caret.head == 0 {
                return;
            }
            (caret.head - 1, caret.head)
        } else {
            (caret.start(), caret.end())
        };
        self.rope.remove(start..end);
        self.caret = Some(Caret::at(start));
        self.modified = true;
        self.save_state();
    }

    pub fn delete_char_forward(&mut self) {
        let len = self.rope.len_chars();
        let caret = self.caret.unwrap_or(Caret::at(len)).clamped(len);
        let (start, end) = if caret.is_collapsed() {
            if caret.head >= len {
                return;
            }
            (caret.head, caret.head + 1)
        } else {
            (caret.start(), caret.end())
        };
        self.rope.remove(start..end);
        self.caret = Some(Caret::at(start));
        self.modified = true;
        self.save_state();
    }

    fn head(&self) -> usize {
        let len = self.rope.len_chars();
        self.caret.map_or(len, |c| c.head.min(len))
    }

    fn move_head(&mut self, pos: usize, extend: bool) {
        let pos = pos.min(self.rope.len_chars());
        self.caret = Some(match (self.caret, extend) {
            (Some(caret), true) => Caret::new(caret.anchor, pos),
            _ => Caret::at(pos),
        });
    }

    /// Line and column (in chars) of the caret head.
    pub fn cursor_line_col(&self) -> (usize, usize) {
        let pos = self.head();
        let line = self.rope.char_to_line(pos);
        (line, pos - self.rope.line_to_char(line))
    }

    /// Char offset of the first char on `line`.
    pub fn line_start(&self, line: usize) -> usize {
        self.rope.line_to_char(line.min(self.rope.len_lines()))
    }

    fn line_len(&self, line: usize) -> usize {
        match self.rope.get_line(line) {
            Some(slice) => {
                let len = slice.len_chars();
                if len > 0 && slice.char(len - 1) == '\n' {
                    len - 1
                } else {
                    len
                }
            }
            None => 0,
        }
    }

    pub fn move_cursor_left(&mut self, extend: bool) {
        let head = self.head();
        self.move_head(head.saturating_sub(1), extend);
    }

    pub fn move_cursor_right(&mut self, extend: bool) {
        let head = self.head();
        self.move_head(head + 1, extend);
    }

    pub fn move_cursor_up(&mut self, extend: bool) {
        let (line, col) = self.cursor_line_col();
        if line == 0 {
            return self.move_head(0, extend);
        }
        let target = line - 1;
        let pos = self.rope.line_to_char(target) + cmp::min(col, self.line_len(target));
        self.move_head(pos, extend);
    }

    pub fn move_cursor_down(&mut self, extend: bool) {
        let (line, col) = self.cursor_line_col();
        if line + 1 >= self.rope.len_lines() {
            return self.move_head(self.rope.len_chars(), extend);
        }
        let target = line + 1;
        let pos = self.rope.line_to_char(target) + cmp::min(col, self.line_len(target));
        self.move_head(pos, extend);
    }

    pub fn move_to_line_start(&mut self) {
        let (line, _) = self.cursor_line_col();
        self.move_head(self.rope.line_to_char(line), false);
    }

    pub fn move_to_line_end(&mut self) {
        let (line, _) = self.cursor_line_col();
        self.move_head(self.rope.line_to_char(line) + self.line_len(line), false);
    }

    pub fn select_all(&mut self) {
        self.caret = Some(Caret::new(0, self.rope.len_chars()));
    }

    fn save_state(&mut self) {
        let current_state = EditorState {
            content: self.rope.to_string(),
            caret: self.caret,
        };

        // Don't save if the content hasn't changed from current history state
        if let Some(last_state) = self.history.get(self.history_index) {
            if last_state.content == current_state.content {
                return;
            }
        }

        self.history.truncate(self.history_index + 1);
        if self.saved_index.is_some_and(|saved| saved > self.history_index) {
            self.saved_index = None;
        }
        self.history.push(current_state);
        self.history_index += 1;

        while self.history.len() > self.history_limit {
            self.history.remove(0);
            self.history_index -= 1;
            self.saved_index = self.saved_index.and_then(|saved| saved.checked_sub(1));
        }
    }

    fn restore(&mut self, index: usize) {
        let state = &self.history[index];
        self.rope = Rope::from_str(&state.content);
        self.caret = state.caret;
        self.history_index = index;
        self.modified = self.saved_index != Some(index);
    }

    pub fn undo(&mut self) -> bool {
        if self.history_index > 0 {
            self.restore(self.history_index - 1);
            true
        } else {
            false
        }
    }

    pub fn redo(&mut self) -> bool {
        if self.history_index + 1 < self.history.len() {
            self.restore(self.history_index + 1);
            true
        } else {
            false
        }
    }
}

impl Default for Editor {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_editor_creation() {
        let editor = Editor::new();
        assert!(editor.is_empty());
        assert!(editor.caret().is_none());
        assert_eq!(editor.line_count(), 1);
        assert!(!editor.is_modified());
    }

    #[test]
    fn test_insert_at_caret_splices_fragment() {
        let mut editor = Editor::from_text("abcdef");
        editor.set_caret(3, 3);

        let caret = editor.insert_at_caret("[list][/list]");

        assert_eq!(editor.text(), "abc[list][/list]def");
        assert_eq!(caret, 3 + "[list][/list]".len());
        assert_eq!(editor.caret(), Some(Caret::at(16)));
        assert!(editor.is_focused());
        assert!(editor.is_modified());
    }

    #[test]
    fn test_insert_without_caret_appends() {
        let mut editor = Editor::from_text("abc");
        let caret = editor.insert_at_caret("!");
        assert_eq!(editor.text(), "abc!");
        assert_eq!(caret, 4);
    }

    #[test]
    fn test_insert_replaces_selection() {
        let mut editor = Editor::from_text("hello world");
        editor.set_caret(6, 11);
        let caret = editor.insert_at_caret("temple");
        assert_eq!(editor.text(), "hello temple");
        assert_eq!(caret, 12);
    }

    #[test]
    fn test_out_of_range_caret_is_clamped() {
        let mut editor = Editor::from_text("ab");
        editor.set_caret(10, 20);
        assert_eq!(editor.insert_at_caret("c"), 3);
        assert_eq!(editor.text(), "abc");
    }

    #[test]
    fn test_caret_counts_chars_not_bytes() {
        let mut editor = Editor::from_text("해인사");
        editor.set_caret(1, 1);
        let caret = editor.insert_at_caret("[bold]");
        assert_eq!(editor.text(), "해[bold]인사");
        assert_eq!(caret, 7);
    }

    #[test]
    fn test_placeholder_leaves_caret_between_tags() {
        let mut editor = Editor::from_text("ab");
        editor.set_caret(1, 1);
        let caret = editor.wrap_selection_or_insert_placeholder(TagKind::Bold);
        assert_eq!(editor.text(), "a[bold][/bold]b");
        assert_eq!(caret, 7);

        editor.insert_char('x');
        assert_eq!(editor.text(), "a[bold]x[/bold]b");
    }

    #[test]
    fn test_wrap_selection() {
        let mut editor = Editor::from_text("say hi now");
        editor.set_caret(4, 6);
        let caret = editor.wrap_selection_or_insert_placeholder(TagKind::Italic);
        assert_eq!(editor.text(), "say [italic]hi[/italic] now");
        assert_eq!(caret, 4 + "[italic]hi[/italic]".len());
    }

    #[test]
    fn test_valued_placeholder() {
        let mut editor = Editor::new();
        editor.wrap_selection_or_insert_placeholder(TagKind::Link);
        assert_eq!(editor.text(), "[link=https://example.com]링크 텍스트[/link]");
    }

    #[test]
    fn test_valued_placeholder_uses_selection_as_label() {
        let mut editor = Editor::from_text("see guide");
        editor.set_caret(4, 9);
        editor.wrap_selection_or_insert_placeholder(TagKind::File);
        assert_eq!(
            editor.text(),
            "see [file=https://example.com/document.pdf]guide[/file]"
        );
    }

    #[test]
    fn test_set_text_is_an_edit() {
        let mut editor = Editor::from_text("old");
        editor.set_text("new text");
        assert_eq!(editor.text(), "new text");
        assert_eq!(editor.caret(), Some(Caret::at(8)));
        assert!(editor.is_modified());
        assert!(editor.undo());
        assert_eq!(editor.text(), "old");
    }

    #[test]
    fn test_backspace_and_delete() {
        let mut editor = Editor::from_text("abc");
        editor.set_caret(2, 2);
        editor.delete_char_backward();
        assert_eq!(editor.text(), "ac");
        editor.delete_char_forward();
        assert_eq!(editor.text(), "a");
        editor.delete_char_forward();
        assert_eq!(editor.text(), "a");
    }

    #[test]
    fn test_backspace_without_caret_deletes_last_char() {
        let mut editor = Editor::from_text("abc");
        editor.delete_char_backward();
        assert_eq!(editor.text(), "ab");
    }

    #[test]
    fn test_vertical_movement_clamps_column() {
        let mut editor = Editor::from_text("long line\nab\nthird");
        editor.set_caret(7, 7);
        editor.move_cursor_down(false);
        assert_eq!(editor.cursor_line_col(), (1, 2));
        editor.move_cursor_down(false);
        assert_eq!(editor.cursor_line_col(), (2, 2));
        editor.move_cursor_up(false);
        editor.move_cursor_up(false);
        assert_eq!(editor.cursor_line_col(), (0, 2));
    }

    #[test]
    fn test_shift_movement_extends_selection() {
        let mut editor = Editor::from_text("temple");
        editor.set_caret(0, 0);
        editor.move_cursor_right(true);
        editor.move_cursor_right(true);
        assert_eq!(editor.selected_text(), "te");
        editor.move_cursor_right(false);
        assert_eq!(editor.selected_text(), "");
    }

    #[test]
    fn test_line_start_and_end() {
        let mut editor = Editor::from_text("one\ntwo");
        editor.set_caret(5, 5);
        editor.move_to_line_start();
        assert_eq!(editor.cursor_line_col(), (1, 0));
        editor.move_to_line_end();
        assert_eq!(editor.cursor_line_col(), (1, 3));
    }

    #[test]
    fn test_undo_redo() {
        let mut editor = Editor::new();
        assert!(!editor.undo());

        editor.insert_char('H');
        editor.insert_char('i');
        assert!(editor.undo());
        assert_eq!(editor.text(), "H");
        assert!(editor.redo());
        assert_eq!(editor.text(), "Hi");
        assert!(!editor.redo());
    }

    #[test]
    fn test_history_limit() {
        let mut editor = Editor::new();
        editor.set_history_limit(10);
        for _ in 0..30 {
            editor.insert_char('a');
        }
        assert!(editor.history.len() <= 10);
        let mut undos = 0;
        while editor.undo() {
            undos += 1;
        }
        assert_eq!(undos, 9);
    }

    #[test]
    fn test_load_resets_history() {
        let mut editor = Editor::new();
        editor.insert_char('x');
        editor.load("fresh");
        assert_eq!(editor.text(), "fresh");
        assert!(!editor.is_modified());
        assert!(!editor.undo());
    }

    #[test]
    fn test_undo_back_to_saved_state_is_unmodified() {
        let mut editor = Editor::from_text("a");
        editor.insert_at_caret("b");
        editor.mark_saved();
        editor.insert_at_caret("c");
        assert!(editor.is_modified());

        assert!(editor.undo());
        assert_eq!(editor.text(), "ab");
        assert!(!editor.is_modified());

        assert!(editor.undo());
        assert!(editor.is_modified());
        assert!(editor.redo());
        assert!(!editor.is_modified());
    }

    #[test]
    fn test_branching_edit_forgets_saved_state() {
        let mut editor = Editor::from_text("a");
        editor.insert_at_caret("b");
        editor.mark_saved();
        editor.undo();
        editor.insert_at_caret("x");
        assert!(editor.is_modified());
        editor.undo();
        assert_eq!(editor.text(), "a");
        editor.redo();
        assert_eq!(editor.text(), "ax");
        assert!(editor.is_modified());
    }

    #[test]
    fn test_undo_to_unsaved_initial_text() {
        let mut editor = Editor::from_text("");
        editor.insert_char('x');
        assert!(editor.undo());
        assert!(!editor.is_modified());
    }

    #[test]
    fn test_select_all() {
        let mut editor = Editor::from_text("[bold]x[/bold]");
        editor.select_all();
        assert_eq!(editor.selected_text(), "[bold]x[/bold]");
    }
}
