mod app;
mod layout;

use anyhow::{Context, Result};
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use markdown_apps_config::Config;
use markdown_apps_engine::render::DEFAULT_MARKER_CLASS;
use markdown_apps_engine::{EditQueue, Page, Registry, RenderContext, io, to_html};
use ratatui::{
    Frame, Terminal,
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, Paragraph},
};
use std::{
    env,
    fs::OpenOptions,
    io::{Stdout, stdout},
    path::{Path, PathBuf},
    process,
};

use app::App;

fn main() -> Result<()> {
    let args: Vec<String> = env::args().collect();
    let config_path = Config::config_path();
    let config = match Config::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: Failed to load config file: {e}");
            process::exit(1);
        }
    };
    let marker_class = config
        .as_ref()
        .map_or(DEFAULT_MARKER_CLASS.to_string(), |c| c.marker_class.clone());

    if args.len() == 3 && args[1] == "--html" {
        init_logging(config.as_ref(), log::LevelFilter::Warn)?;
        return print_html(&PathBuf::from(&args[2]), marker_class);
    }

    let pages_path;
    let from_config;

    if args.len() == 2 && !args[1].starts_with('-') {
        pages_path = PathBuf::from(&args[1]);
        from_config = false;
    } else if args.len() == 1 {
        match &config {
            Some(config) => {
                pages_path = config.pages_path.clone();
                from_config = true;
            }
            None => {
                eprintln!("Error: No pages path provided and no config file found");
                eprintln!("Usage: {} <pages-folder-path>", args[0]);
                eprintln!("Or create a config file at {}", config_path.display());
                process::exit(1);
            }
        }
    } else {
        eprintln!("Usage: {} [pages-folder-path]", args[0]);
        eprintln!("       {} --html <page.md>", args[0]);
        process::exit(1);
    };

    if let Err(e) = io::validate_pages_dir(&pages_path) {
        let source = if from_config {
            format!(" from config file '{}'", config_path.display())
        } else {
            String::new()
        };
        eprintln!(
            "Error: Pages path '{}'{} is invalid: {e}",
            pages_path.display(),
            source
        );
        process::exit(1);
    }

    // Logging to the terminal would draw over the UI
    init_logging(config.as_ref(), log::LevelFilter::Off)?;

    let mut app = App::new(pages_path, marker_class)?;

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = run_app(&mut terminal, &mut app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        println!("{err:?}");
    }

    Ok(())
}

/// Log to the configured file when there is one; otherwise to stderr at `fallback`.
fn init_logging(config: Option<&Config>, fallback: log::LevelFilter) -> Result<()> {
    let mut builder = env_logger::Builder::from_default_env();

    match config.and_then(|c| c.log_file.as_ref()) {
        Some(log_file) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(log_file)
                .with_context(|| format!("Failed to open log file {}", log_file.display()))?;
            builder
                .filter_level(log::LevelFilter::Info)
                .target(env_logger::Target::Pipe(Box::new(file)));
        }
        None => {
            builder.filter_level(fallback);
        }
    }

    builder.init();
    Ok(())
}

fn print_html(path: &Path, marker_class: String) -> Result<()> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let page = Page::from_text(&text);
    let queue = EditQueue::new();
    let context =
        RenderContext::new(Registry::global(), queue.callback()).with_marker_class(marker_class);
    let rendered = page.render(&context)?;
    println!("{}", to_html(&rendered));
    Ok(())
}

fn run_app(terminal: &mut Terminal<CrosstermBackend<Stdout>>, app: &mut App) -> Result<()> {
    loop {
        terminal.draw(|f| ui(f, app))?;

        if let Event::Key(key) = event::read()?
            && key.kind == KeyEventKind::Press
        {
            app.handle_key(key);
            if app.should_quit {
                return Ok(());
            }
        }
    }
}

fn ui(f: &mut Frame, app: &mut App) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(2)].as_ref())
        .split(f.area());

    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(25), Constraint::Percentage(75)].as_ref())
        .split(rows[0]);

    // Page list panel
    let page_items: Vec<ListItem> = app
        .pages
        .iter()
        .map(|page| ListItem::new(Line::from(vec![Span::raw(format!("📄 {page}"))])))
        .collect();

    let pages_list = List::new(page_items)
        .block(Block::default().borders(Borders::ALL).title("Pages"))
        .highlight_style(Style::default().bg(Color::Yellow).fg(Color::Black));

    f.render_stateful_widget(pages_list, chunks[0], &mut app.page_list_state);

    // Page panel
    let (title, lines, focus_line) = match app.open.as_ref() {
        Some(open) => match open.view.as_ref() {
            Some(view) => {
                let laid_out = layout::layout(view, app.focus);
                (open.path.to_string(), laid_out.lines, laid_out.focus_line)
            }
            None => (open.path.to_string(), vec![Line::from(app.status.clone())], None),
        },
        None => (
            "Page".to_string(),
            vec![Line::from("Select a page with PageUp/PageDown")],
            None,
        ),
    };

    // Keep the focused line in view
    let height = chunks[1].height.saturating_sub(2) as usize;
    let scroll = focus_line
        .filter(|line| *line >= height)
        .map_or(0, |line| line + 1 - height);

    let content = Paragraph::new(lines)
        .block(Block::default().borders(Borders::ALL).title(title))
        .scroll((u16::try_from(scroll).unwrap_or(u16::MAX), 0));

    f.render_widget(content, chunks[1]);

    let mode = if app.drag_source.is_some() {
        Span::styled(
            " DRAG ",
            Style::default().bg(Color::Green).add_modifier(Modifier::BOLD),
        )
    } else {
        Span::raw("")
    };
    let help = Paragraph::new(vec![
        Line::from(vec![mode, Span::raw(app.status.clone())]),
        Line::from(vec![Span::styled(
            "Tab/Shift-Tab: Focus | Enter: Activate/Drop | Ctrl-D: Drag | Esc: Cancel | PgUp/PgDn: Page | Ctrl-Q: Quit",
            Style::default().fg(Color::DarkGray),
        )]),
    ]);

    f.render_widget(help, rows[1]);
}
