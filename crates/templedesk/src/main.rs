use anyhow::Result;
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use log::LevelFilter;
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Terminal,
};
use std::{env, io, time::Duration};

use templedesk::{ui, App};

#[tokio::main]
async fn main() -> Result<()> {
    let mut logger = env_logger::Builder::from_default_env();
    if std::env::var_os("RUST_LOG").is_none() {
        logger.filter_level(LevelFilter::Info);
        logger.filter_module("templedesk", LevelFilter::Debug);
    }
    logger.init();

    // Restore the terminal before the default hook prints the panic.
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        let _ = restore_terminal();
        original_hook(panic_info);
    }));

    let mut app = match App::new().await {
        Ok(app) => app,
        Err(e) => {
            eprintln!("앱을 시작할 수 없습니다: {}", e);
            return Err(e);
        }
    };

    if let Some(path) = env::args().nth(1) {
        match tokio::fs::read_to_string(&path).await {
            Ok(content) => {
                app.load_content(&content);
                app.toasts.info(format!("불러왔습니다: {}", path));
                log::info!("Loaded initial content from {}", path);
            }
            Err(e) => {
                app.toasts.error(format!("파일을 읽을 수 없습니다: {}", e));
                log::error!("Failed to read '{}': {}", path, e);
            }
        }
    }
    if app.session.is_none() {
        app.toasts.info("저장하려면 :login <사용자> <비밀번호> 로 로그인하세요");
    }

    if let Err(e) = enable_raw_mode() {
        eprintln!("터미널을 초기화할 수 없습니다: {}", e);
        return Err(e.into());
    }
    let mut stdout = io::stdout();
    if let Err(e) = execute!(stdout, EnterAlternateScreen) {
        let _ = disable_raw_mode();
        eprintln!("터미널을 설정할 수 없습니다: {}", e);
        return Err(e.into());
    }
    let mut terminal = Terminal::new(CrosstermBackend::new(stdout))?;

    let res = run_app(&mut terminal, app).await;
    restore_terminal()?;

    if let Err(err) = res {
        log::error!("Application error: {}", err);
        eprintln!("실행 중 오류가 발생했습니다: {}", err);
    }
    Ok(())
}

async fn run_app<B: Backend>(terminal: &mut Terminal<B>, mut app: App) -> Result<()> {
    loop {
        if let Err(e) = terminal.draw(|f| ui::draw(f, &mut app)) {
            log::error!("Terminal draw error: {}", e);
        }

        app.update_status();
        if app.should_quit() {
            log::info!("Application shutdown requested");
            break;
        }

        if event::poll(Duration::from_millis(100))? {
            match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => {
                    if key.code == KeyCode::Char('c')
                        && key.modifiers.contains(KeyModifiers::CONTROL)
                    {
                        log::info!("Exit requested via Ctrl+C");
                        app.quit();
                        continue;
                    }
                    if let Err(e) = app.handle_key_event(key).await {
                        log::error!("Key event handling error: {}", e);
                        app.toasts.error(e.to_string());
                    }
                }
                Event::Resize(_, _) => log::debug!("Terminal resized"),
                _ => {}
            }
        }
    }
    Ok(())
}

fn restore_terminal() -> Result<()> {
    disable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, LeaveAlternateScreen)?;
    let _ = execute!(stdout, crossterm::cursor::Show);
    Ok(())
}
