use tagmark::TagKind;

use crate::config::Config;
use crate::editor::Editor;
use crate::image_upload::{ImageUploader, SelectedFile, UploadOutcome};

/// Alt text given to images attached through the uploader.
pub const IMAGE_ALT_PLACEHOLDER: &str = "이미지 설명";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditorTab {
    Edit,
    Preview,
}

/// The editing widget a page embeds: buffer, toolbar actions, preview and
/// image attachments. The page owns the committed content and receives it
/// through the `on_save` callback.
pub struct ContentEditor {
    editor: Editor,
    uploader: ImageUploader,
    preview: String,
    tab: EditorTab,
    sanitize: bool,
}

impl ContentEditor {
    pub fn new(initial: &str, config: &Config) -> Self {
        let mut editor = Editor::from_text(initial);
        editor.set_history_limit(config.editor.history_limit);
        let sanitize = config.editor.sanitize_preview;
        Self {
            editor,
            uploader: ImageUploader::new(&config.upload),
            preview: render_preview(initial, sanitize),
            tab: EditorTab::Edit,
            sanitize,
        }
    }

    pub fn editor(&self) -> &Editor {
        &self.editor
    }

    pub fn editor_mut(&mut self) -> &mut Editor {
        &mut self.editor
    }

    pub fn uploader(&self) -> &ImageUploader {
        &self.uploader
    }

    pub fn uploader_mut(&mut self) -> &mut ImageUploader {
        &mut self.uploader
    }

    pub fn tab(&self) -> EditorTab {
        self.tab
    }

    pub fn set_tab(&mut self, tab: EditorTab) {
        self.tab = tab;
        if tab == EditorTab::Edit {
            self.editor.focus();
        } else {
            self.editor.blur();
        }
    }

    /// Re-render the preview from the buffer and switch to it.
    pub fn preview(&mut self) -> &str {
        self.preview = render_preview(&self.editor.text(), self.sanitize);
        self.set_tab(EditorTab::Preview);
        &self.preview
    }

    /// The preview as of the last [`ContentEditor::preview`] call.
    pub fn rendered(&self) -> &str {
        &self.preview
    }

    /// Toolbar button for `kind`.
    pub fn apply_tag(&mut self, kind: TagKind) -> usize {
        self.set_tab(EditorTab::Edit);
        self.editor.wrap_selection_or_insert_placeholder(kind)
    }

    pub fn attach_image(&mut self, url: &str) -> usize {
        self.editor.insert_at_caret(&image_tag(url))
    }

    /// Upload `file` and, once done, insert an image tag pointing at it.
    pub async fn attach_file(&mut self, file: SelectedFile) -> UploadOutcome {
        let editor = &mut self.editor;
        self.uploader
            .upload(file, |url| {
                editor.insert_at_caret(&image_tag(url));
            })
            .await
    }

    /// Hand the current content to the page.
    pub fn save<F>(&mut self, on_save: F)
    where
        F: FnOnce(String),
    {
        on_save(self.editor.text());
        self.editor.mark_saved();
    }

    pub fn is_modified(&self) -> bool {
        self.editor.is_modified()
    }
}

fn image_tag(url: &str) -> String {
    TagKind::Image.wrap(Some(url), IMAGE_ALT_PLACEHOLDER)
}

fn render_preview(raw: &str, sanitize: bool) -> String {
    if sanitize {
        tagmark::render_sanitized(raw)
    } else {
        tagmark::render(raw)
    }
}
