use anyhow::Result;
use blockedit_config::Config;
use blockedit_engine::{io, BindingSet, BlockKind, Cmd, Document, Key, KeyInput};
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout},
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame, Terminal,
};
use std::{env, io::stdout, path::PathBuf, process};

struct App {
    document: Document,
    bindings: BindingSet,
    document_path: PathBuf,
    placeholder: String,
    dirty: bool,
    status: String,
}

impl App {
    fn new(document_path: PathBuf, placeholder: String) -> Result<Self> {
        let (document, status) = if document_path.exists() {
            (
                io::read_document(&document_path)?,
                format!("opened {}", document_path.display()),
            )
        } else {
            (
                Document::new(),
                format!("new document {}", document_path.display()),
            )
        };

        Ok(Self {
            document,
            bindings: BindingSet::standard(),
            document_path,
            placeholder,
            dirty: false,
            status,
        })
    }

    fn cursor(&self) -> usize {
        self.document.selection().start
    }

    fn set_cursor(&mut self, offset: usize) {
        self.document.set_selection(offset..offset);
    }

    /// Run a keystroke through the policy bindings first. Returns whether
    /// the default handling should still run; any applied override marks
    /// the document dirty.
    fn dispatch(&mut self, key: Key, shift: bool) -> bool {
        let version = self.document.version();
        let propagate = self
            .bindings
            .dispatch(&mut self.document, KeyInput { key, shift });
        if self.document.version() != version {
            self.dirty = true;
        }
        propagate
    }

    fn insert_text(&mut self, text: &str) {
        let selection = self.document.selection();
        if selection.start < selection.end {
            self.document.apply(Cmd::DeleteRange { range: selection });
        }
        let at = self.document.selection().start;
        self.document.apply(Cmd::InsertText {
            at,
            text: text.to_string(),
        });
        self.dirty = true;
    }

    fn delete_backward(&mut self) {
        let selection = self.document.selection();
        if selection.start < selection.end {
            self.document.apply(Cmd::DeleteRange { range: selection });
            self.dirty = true;
            return;
        }
        let cursor = selection.start;
        if cursor == 0 {
            return;
        }
        let (line, offset_in_line) = self.document.line_at(cursor);
        let start = if offset_in_line == 0 {
            // Start of line: remove the previous line's newline.
            cursor - 1
        } else {
            let mut start = cursor - 1;
            while !line.text.is_char_boundary(start - line.start) {
                start -= 1;
            }
            start
        };
        self.document.apply(Cmd::DeleteRange {
            range: start..cursor,
        });
        self.dirty = true;
    }

    fn move_left(&mut self) {
        let cursor = self.cursor();
        if cursor == 0 {
            return;
        }
        let (line, offset_in_line) = self.document.line_at(cursor);
        if offset_in_line == 0 {
            self.set_cursor(cursor - 1);
            return;
        }
        let mut target = cursor - 1;
        while !line.text.is_char_boundary(target - line.start) {
            target -= 1;
        }
        self.set_cursor(target);
    }

    fn move_right(&mut self) {
        let cursor = self.cursor();
        let last = self.document.len() - 1;
        if cursor >= last {
            return;
        }
        let (line, _) = self.document.line_at(cursor);
        let mut target = cursor + 1;
        while target - line.start < line.text.len()
            && !line.text.is_char_boundary(target - line.start)
        {
            target += 1;
        }
        self.set_cursor(target.min(last));
    }

    fn move_up(&mut self) {
        let (line, offset_in_line) = self.document.line_at(self.cursor());
        if line.index == 0 {
            self.set_cursor(0);
            return;
        }
        if let Some(previous) = self.document.line(line.index - 1) {
            let mut column = offset_in_line.min(previous.text.len());
            while !previous.text.is_char_boundary(column) {
                column -= 1;
            }
            self.set_cursor(previous.start + column);
        }
    }

    fn move_down(&mut self) {
        let (line, offset_in_line) = self.document.line_at(self.cursor());
        if let Some(next) = self.document.line(line.index + 1) {
            let mut column = offset_in_line.min(next.text.len());
            while !next.text.is_char_boundary(column) {
                column -= 1;
            }
            self.set_cursor(next.start + column);
        } else {
            self.set_cursor(self.document.len() - 1);
        }
    }

    fn format_current_line(&mut self, kind: BlockKind) {
        let cursor = self.cursor();
        self.document.apply(Cmd::FormatLines {
            range: cursor..cursor,
            kind,
        });
        self.dirty = true;
        self.status = format!("formatted line as {}", kind.name());
    }

    fn save(&mut self) {
        match io::write_document(&self.document, &self.document_path) {
            Ok(()) => {
                self.dirty = false;
                self.status = format!("saved {}", self.document_path.display());
            }
            Err(e) => {
                self.status = format!("save failed: {e}");
            }
        }
    }
}

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

    let document_path = if args.len() == 2 {
        PathBuf::from(&args[1])
    } else if args.len() == 1 {
        match &config {
            Some(config) => config.document_path.clone(),
            None => {
                eprintln!("Error: No document path provided and no config file found");
                eprintln!("Usage: {} <document.json>", args[0]);
                eprintln!("Or create a config file at {}", config_path.display());
                process::exit(1);
            }
        }
    } else {
        eprintln!("Usage: {} [document.json]", args[0]);
        process::exit(1);
    };

    let placeholder = config
        .as_ref()
        .map(|config| config.placeholder().to_string())
        .unwrap_or_else(|| blockedit_config::DEFAULT_PLACEHOLDER.to_string());

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Create app
    let mut app = App::new(document_path, placeholder)?;

    // Main loop
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

fn run_app<B: ratatui::backend::Backend>(terminal: &mut Terminal<B>, app: &mut App) -> Result<()>
where
    <B as ratatui::backend::Backend>::Error: Send + Sync + 'static,
{
    loop {
        terminal.draw(|f| ui(f, app))?;

        if let Event::Key(key) = event::read()? {
            let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
            let shift = key.modifiers.contains(KeyModifiers::SHIFT);
            match key.code {
                KeyCode::Esc => return Ok(()),
                KeyCode::Char('s') if ctrl => app.save(),
                KeyCode::Char('q') if ctrl => app.format_current_line(BlockKind::Blockquote),
                KeyCode::Char('e') if ctrl => app.format_current_line(BlockKind::Spoiler),
                KeyCode::Char('k') if ctrl => app.format_current_line(BlockKind::CodeBlock),
                KeyCode::Char('p') if ctrl => app.format_current_line(BlockKind::Paragraph),
                KeyCode::Enter => {
                    if app.dispatch(Key::Enter, shift) {
                        app.insert_text("\n");
                    }
                }
                KeyCode::Backspace => {
                    if app.dispatch(Key::Backspace, shift) {
                        app.delete_backward();
                    }
                }
                KeyCode::Up => {
                    if app.dispatch(Key::Up, shift) {
                        app.move_up();
                    }
                }
                KeyCode::Down => {
                    if app.dispatch(Key::Down, shift) {
                        app.move_down();
                    }
                }
                KeyCode::Left => {
                    if app.dispatch(Key::Left, shift) {
                        app.move_left();
                    }
                }
                KeyCode::Right => {
                    if app.dispatch(Key::Right, shift) {
                        app.move_right();
                    }
                }
                KeyCode::Char(c) if !ctrl => {
                    app.insert_text(&c.to_string());
                }
                _ => {}
            }
        }
    }
}

fn line_prefix(kind: BlockKind) -> (&'static str, Style) {
    match kind {
        BlockKind::Paragraph => ("", Style::default()),
        BlockKind::Blockquote => ("> ", Style::default().fg(Color::Green)),
        BlockKind::Spoiler => ("| ", Style::default().fg(Color::Magenta)),
        BlockKind::CodeBlock => ("    ", Style::default().fg(Color::Yellow)),
    }
}

fn ui(f: &mut Frame, app: &mut App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints([Constraint::Min(0), Constraint::Length(3)].as_ref())
        .split(f.area());

    // Editor panel
    let mut lines: Vec<Line> = Vec::new();
    if app.document.is_blank() {
        lines.push(Line::from(Span::styled(
            app.placeholder.clone(),
            Style::default().fg(Color::DarkGray),
        )));
    } else {
        for index in 0..app.document.line_count() {
            if let Some(line) = app.document.line(index) {
                let (prefix, style) = line_prefix(line.kind);
                lines.push(Line::from(vec![
                    Span::styled(prefix, style),
                    Span::styled(line.text.clone(), style),
                ]));
            }
        }
    }

    let title = format!(
        "{}{}",
        app.document_path.display(),
        if app.dirty { " [+]" } else { "" }
    );
    let editor = Paragraph::new(lines).block(Block::default().borders(Borders::ALL).title(title));
    f.render_widget(editor, chunks[0]);

    // Terminal cursor over the logical cursor position
    let (line, offset_in_line) = app.document.line_at(app.cursor());
    let (prefix, _) = line_prefix(line.kind);
    let inner_x = chunks[0].x + 1;
    let inner_y = chunks[0].y + 1;
    let cursor_x = inner_x + (prefix.len() + offset_in_line) as u16;
    let cursor_y = inner_y + line.index as u16;
    if cursor_y < chunks[0].y + chunks[0].height - 1 {
        f.set_cursor_position((cursor_x, cursor_y));
    }

    // Status + key help
    let status_text = vec![
        Line::from(Span::raw(format!(
            "{} | line {} ({}) | offset {}",
            app.status,
            line.index + 1,
            line.kind.name(),
            app.cursor(),
        ))),
        Line::from(Span::raw(
            "Esc: Quit | Ctrl-S: Save | Ctrl-Q: Quote | Ctrl-E: Spoiler | Ctrl-K: Code | Ctrl-P: Paragraph",
        )),
    ];
    let status = Paragraph::new(status_text).block(Block::default().borders(Borders::ALL));
    f.render_widget(status, chunks[1]);
}
