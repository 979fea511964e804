use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Tabs, Wrap},
    Frame,
};
use unicode_width::UnicodeWidthStr;

use crate::app::{App, Mode};
use crate::config::Theme;
use crate::content_editor::EditorTab;
use crate::notifications::ToastKind;

const TOOLBAR_HINT: &str =
    " ^B 굵게  ^T 기울임  ^L 목록  ^K 링크  ^G 이미지  ^F 파일  ^P 미리보기  ^S 저장  ? 도움말";

const HELP_LINES: &[&str] = &[
    "입력 모드",
    "  Ctrl+B/T/L/K/G/F   태그 삽입 (선택 영역을 감쌉니다)",
    "  Shift+방향키        선택 영역 확장",
    "  Ctrl+Z / Ctrl+Y     되돌리기 / 다시 실행",
    "  Ctrl+S              저장    Ctrl+P  미리보기 전환",
    "  Esc                 일반 모드",
    "",
    "일반 모드",
    "  i 입력   p 미리보기   e 편집   u 되돌리기   : 명령   q 종료",
    "",
    "명령",
    "  :w  :q  :q!  :wq  :preview  :edit  :undo  :redo",
    "  :bold :italic :list :link :image :file",
    "  :attach <경로>         이미지 첨부",
    "  :login <사용자> <비밀번호>   :logout   :whoami",
    "  :notice|faq <제목>     저장된 내용으로 게시글 등록",
    "  :event|dharma <날짜> <시간|-> <제목>",
    "  :popup <시작일> <종료일> <제목>   :popup-toggle <id>",
    "  :popup-edit <id> <시작일> <종료일> <제목>",
    "  :notice-remove|event-remove|popup-remove <id>",
    "  :notify <제목>",
    "",
    "사찰 소개",
    "  :section                목록   :section <항목>  편집   :section close  취소",
    "  :info                   운영 시간, 문화재, 입장료",
    "  :programs   :program-toggle <id>",
    "  :reservations   :reservation <id> <confirm|pending|cancel>",
];

struct Palette {
    accent: Color,
    status_background: Color,
    preview_foreground: Color,
}

impl Palette {
    fn from_theme(theme: &Theme) -> Self {
        Self {
            accent: parse_color(theme.accent_color.as_deref(), Color::Yellow),
            status_background: parse_color(theme.status_background.as_deref(), Color::DarkGray),
            preview_foreground: parse_color(theme.preview_foreground.as_deref(), Color::White),
        }
    }
}

fn parse_color(value: Option<&str>, fallback: Color) -> Color {
    value
        .and_then(|value| value.parse::<Color>().ok())
        .unwrap_or(fallback)
}

pub fn draw(f: &mut Frame, app: &mut App) {
    let palette = Palette::from_theme(&app.config.theme);
    let toast_height = app.toasts.len() as u16;

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Min(3),
            Constraint::Length(toast_height),
            Constraint::Length(1),
            Constraint::Length(1),
        ])
        .split(f.size());

    let toolbar = Paragraph::new(TOOLBAR_HINT).style(Style::default().fg(palette.accent));
    f.render_widget(toolbar, chunks[0]);

    draw_tabs(f, app, &palette, chunks[1]);
    match app.content.tab() {
        EditorTab::Edit => draw_editor(f, app, &palette, chunks[2]),
        EditorTab::Preview => draw_preview(f, app, &palette, chunks[2]),
    }
    draw_toasts(f, app, chunks[3]);
    draw_status(f, app, &palette, chunks[4]);
    draw_command_line(f, app, chunks[5]);

    if app.mode == Mode::Help {
        draw_help(f, &palette);
    }
}

fn draw_tabs(f: &mut Frame, app: &App, palette: &Palette, area: Rect) {
    let selected = match app.content.tab() {
        EditorTab::Edit => 0,
        EditorTab::Preview => 1,
    };
    let tabs = Tabs::new(vec!["편집", "미리보기"])
        .select(selected)
        .highlight_style(
            Style::default()
                .fg(palette.accent)
                .add_modifier(Modifier::BOLD),
        );
    f.render_widget(tabs, area);
}

fn draw_editor(f: &mut Frame, app: &mut App, palette: &Palette, area: Rect) {
    let block = Block::default().borders(Borders::ALL).title("내용");
    let inner = block.inner(area);
    let height = inner.height as usize;

    let editor = app.content.editor();
    let (cursor_line, cursor_col) = editor.cursor_line_col();
    if cursor_line < app.scroll_offset {
        app.scroll_offset = cursor_line;
    } else if height > 0 && cursor_line >= app.scroll_offset + height {
        app.scroll_offset = cursor_line + 1 - height;
    }

    let editor = app.content.editor();
    let selection = editor
        .caret()
        .filter(|caret| !caret.is_collapsed())
        .map(|caret| (caret.start(), caret.end()));
    let selected_style = Style::default().bg(palette.accent).fg(Color::Black);

    let lines: Vec<Line> = (app.scroll_offset..editor.line_count())
        .take(height)
        .filter_map(|idx| {
            let text = editor.line(idx)?;
            let start = editor.line_start(idx);
            Some(match selection {
                Some(range) => highlight_line(&text, start, range, selected_style),
                None => Line::from(text),
            })
        })
        .collect();

    f.render_widget(Paragraph::new(lines).block(block), area);

    if app.mode == Mode::Insert && editor.is_focused() {
        let prefix: String = editor
            .line(cursor_line)
            .unwrap_or_default()
            .chars()
            .take(cursor_col)
            .collect();
        let x = inner.x + (prefix.width() as u16).min(inner.width.saturating_sub(1));
        let y = inner.y + (cursor_line - app.scroll_offset) as u16;
        f.set_cursor(x, y);
    }
}

/// Split `text` into plain and selected spans. `start` is the char offset of
/// the line within the buffer.
fn highlight_line(text: &str, start: usize, range: (usize, usize), style: Style) -> Line<'static> {
    let len = text.chars().count();
    let from = range.0.saturating_sub(start).min(len);
    let to = range.1.saturating_sub(start).min(len);
    if from >= to {
        return Line::from(text.to_string());
    }

    let before: String = text.chars().take(from).collect();
    let selected: String = text.chars().skip(from).take(to - from).collect();
    let after: String = text.chars().skip(to).collect();
    Line::from(vec![
        Span::raw(before),
        Span::styled(selected, style),
        Span::raw(after),
    ])
}

fn draw_preview(f: &mut Frame, app: &App, palette: &Palette, area: Rect) {
    let lines: Vec<Line> = app
        .content
        .rendered()
        .split(tagmark::render::LINE_BREAK)
        .map(|line| Line::from(line.to_string()))
        .collect();
    let preview = Paragraph::new(lines)
        .block(Block::default().borders(Borders::ALL).title("미리보기 (HTML)"))
        .style(Style::default().fg(palette.preview_foreground))
        .wrap(Wrap { trim: false });
    f.render_widget(preview, area);
}

fn draw_toasts(f: &mut Frame, app: &App, area: Rect) {
    if area.height == 0 {
        return;
    }
    let lines: Vec<Line> = app
        .toasts
        .iter()
        .map(|toast| {
            let color = match toast.kind {
                ToastKind::Info => Color::Cyan,
                ToastKind::Success => Color::Green,
                ToastKind::Warning => Color::Yellow,
                ToastKind::Error => Color::Red,
            };
            Line::from(Span::styled(
                format!(" {}", toast.text),
                Style::default().fg(color),
            ))
        })
        .collect();
    f.render_widget(Paragraph::new(lines), area);
}

fn draw_status(f: &mut Frame, app: &App, palette: &Palette, area: Rect) {
    let mode = match app.mode {
        Mode::Normal => "일반",
        Mode::Insert => "입력",
        Mode::Command => "명령",
        Mode::Help => "도움말",
    };
    let user = match &app.session {
        Some(session) => format!("{} @ {}", session.user.username, session.user.temple.name),
        None => String::from("로그인 안 됨"),
    };
    let (line, col) = app.content.editor().cursor_line_col();
    let modified = if app.is_modified() { " [수정됨]" } else { "" };
    let section = match app.temple.editing() {
        Some(section) => format!(" | {}", section.title()),
        None => String::new(),
    };

    let status = format!(
        " {} | {}{}{} | {}:{} ",
        mode,
        user,
        section,
        modified,
        line + 1,
        col + 1
    );
    let paragraph = Paragraph::new(status).style(
        Style::default()
            .bg(palette.status_background)
            .fg(Color::White),
    );
    f.render_widget(paragraph, area);
}

fn draw_command_line(f: &mut Frame, app: &App, area: Rect) {
    if app.mode != Mode::Command {
        return;
    }
    let text = format!(":{}", app.command_buffer);
    let x = area.x + (text.width() as u16).min(area.width.saturating_sub(1));
    f.render_widget(Paragraph::new(text), area);
    f.set_cursor(x, area.y);
}

fn draw_help(f: &mut Frame, palette: &Palette) {
    let area = centered_rect(70, 80, f.size());
    let lines: Vec<Line> = HELP_LINES.iter().map(|line| Line::from(*line)).collect();
    let help = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .title("도움말 (아무 키나 누르면 닫힘)")
            .border_style(Style::default().fg(palette.accent)),
    );
    f.render_widget(Clear, area);
    f.render_widget(help, area);
}

fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);
    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1])[1]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::session_store::SessionStore;
    use ratatui::{backend::TestBackend, Terminal};
    use tempfile::TempDir;

    fn buffer_text(terminal: &Terminal<TestBackend>) -> String {
        let buffer = terminal.backend().buffer();
        buffer
            .content
            .iter()
            .map(|cell| cell.symbol())
            .collect::<String>()
    }

    #[test]
    fn test_parse_color() {
        assert_eq!(parse_color(Some("#ff0000"), Color::White), Color::Rgb(255, 0, 0));
        assert_eq!(parse_color(Some("not a color"), Color::White), Color::White);
        assert_eq!(parse_color(None, Color::Cyan), Color::Cyan);
    }

    #[test]
    fn test_highlight_line_splits_selection() {
        let style = Style::default().bg(Color::Red);
        let line = highlight_line("abcdef", 10, (12, 14), style);
        let parts: Vec<&str> = line.spans.iter().map(|span| span.content.as_ref()).collect();
        assert_eq!(parts, vec!["ab", "cd", "ef"]);
        assert_eq!(line.spans[1].style, style);
    }

    #[test]
    fn test_highlight_line_outside_selection() {
        let line = highlight_line("abc", 10, (0, 5), Style::default());
        assert_eq!(line.spans.len(), 1);
    }

    #[test]
    fn test_draw_edit_and_preview() {
        let dir = TempDir::new().unwrap();
        let mut config = Config::default();
        config.editor.sanitize_preview = false;
        let mut app = App::with(config, SessionStore::at(dir.path()), None, "[bold]hi[/bold]");
        let mut terminal = Terminal::new(TestBackend::new(80, 20)).unwrap();

        terminal.draw(|f| draw(f, &mut app)).unwrap();
        assert!(buffer_text(&terminal).contains("[bold]hi[/bold]"));

        app.content.preview();
        terminal.draw(|f| draw(f, &mut app)).unwrap();
        assert!(buffer_text(&terminal).contains("<strong>hi</strong>"));
    }

    fn buffer_rows(terminal: &Terminal<TestBackend>) -> Vec<String> {
        let buffer = terminal.backend().buffer();
        let width = buffer.area.width as usize;
        buffer
            .content
            .chunks(width)
            .map(|row| row.iter().map(|cell| cell.symbol()).collect::<String>())
            .collect()
    }

    #[test]
    fn test_sanitized_preview_keeps_lines_apart() {
        let dir = TempDir::new().unwrap();
        let mut app = App::with(
            Config::default(),
            SessionStore::at(dir.path()),
            None,
            "one\n[bold]two[/bold]\nthree",
        );
        app.content.preview();
        let mut terminal = Terminal::new(TestBackend::new(60, 20)).unwrap();
        terminal.draw(|f| draw(f, &mut app)).unwrap();

        let rows = buffer_rows(&terminal);
        assert!(!rows.iter().any(|row| row.contains("<br")));
        let row_of = |needle: &str| rows.iter().position(|row| row.contains(needle));
        let one = row_of("one").expect("first line drawn");
        let two = row_of("<strong>two</strong>").expect("second line drawn");
        let three = row_of("three").expect("third line drawn");
        assert_eq!(two, one + 1);
        assert_eq!(three, two + 1);
    }

    #[test]
    fn test_status_names_open_section() {
        let dir = TempDir::new().unwrap();
        let mut app = App::with(Config::default(), SessionStore::at(dir.path()), None, "");
        app.open_section(crate::temple_page::TempleSection::AbbotMessage)
            .unwrap();
        let mut terminal = Terminal::new(TestBackend::new(80, 20)).unwrap();
        terminal.draw(|f| draw(f, &mut app)).unwrap();

        let rows = buffer_rows(&terminal);
        // Wide glyphs leave a blank continuation cell behind them.
        let status = rows[rows.len() - 2].replace(' ', "");
        assert!(status.contains("주지스님인사말"));
    }

    #[test]
    fn test_scroll_follows_cursor() {
        let dir = TempDir::new().unwrap();
        let text: String = (0..30).map(|i| format!("line {}\n", i)).collect();
        let mut app = App::with(Config::default(), SessionStore::at(dir.path()), None, &text);
        app.content.editor_mut().set_caret(text.chars().count(), text.chars().count());
        let mut terminal = Terminal::new(TestBackend::new(40, 15)).unwrap();

        terminal.draw(|f| draw(f, &mut app)).unwrap();
        assert!(app.scroll_offset > 0);
        assert!(buffer_text(&terminal).contains("line 29"));
    }
}
