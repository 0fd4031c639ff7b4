use anyhow::Result;
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState},
    Frame, Terminal,
};
use sa_id_validator::{Reason, Validator, Verdict};
use std::io;

/// Longest input the field accepts
const MAX_INPUT: usize = 20;

/// Oldest history rows fall off past this
const MAX_HISTORY: usize = 100;

pub struct App {
    pub validator: Validator,
    pub input: String,
    pub verdict: Option<Verdict>,
    pub history: Vec<(String, Verdict)>,
    pub history_state: TableState,
}

impl App {
    pub fn new(validator: Validator) -> Self {
        Self {
            validator,
            input: String::new(),
            verdict: None,
            history: Vec::new(),
            history_state: TableState::default(),
        }
    }

    /// Revalidate after every edit, like the form did on each keystroke
    fn revalidate(&mut self) {
        let input = self.input.trim();
        self.verdict = if input.is_empty() {
            None
        } else {
            Some(self.validator.validate(input))
        };
    }

    pub fn push_char(&mut self, c: char) {
        if self.input.chars().count() < MAX_INPUT {
            self.input.push(c);
            self.revalidate();
        }
    }

    pub fn backspace(&mut self) {
        self.input.pop();
        self.revalidate();
    }

    pub fn clear(&mut self) {
        self.input.clear();
        self.revalidate();
    }

    /// Move the current input into the history and start over
    pub fn submit(&mut self) {
        if let Some(verdict) = self.verdict.take() {
            self.history.insert(0, (std::mem::take(&mut self.input), verdict));
            self.history.truncate(MAX_HISTORY);
            self.history_state.select(Some(0));
        }
    }

    /// Returns true when the app should quit
    pub fn handle_key(&mut self, key: KeyEvent) -> bool {
        match key.code {
            KeyCode::Esc => return true,
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => return true,
            KeyCode::Char('u') if key.modifiers.contains(KeyModifiers::CONTROL) => self.clear(),
            KeyCode::Char(c) => self.push_char(c),
            KeyCode::Backspace => self.backspace(),
            KeyCode::Enter => self.submit(),
            KeyCode::Down => self.next(),
            KeyCode::Up => self.previous(),
            _ => {}
        }
        false
    }

    pub fn next(&mut self) {
        if self.history.is_empty() {
            return;
        }
        let i = match self.history_state.selected() {
            Some(i) if i + 1 < self.history.len() => i + 1,
            _ => 0,
        };
        self.history_state.select(Some(i));
    }

    pub fn previous(&mut self) {
        if self.history.is_empty() {
            return;
        }
        let i = match self.history_state.selected() {
            Some(0) | None => self.history.len() - 1,
            Some(i) => i - 1,
        };
        self.history_state.select(Some(i));
    }
}

pub fn run_ui(app: &mut App) -> Result<()> {
    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Run the app
    let res = run_app(&mut terminal, app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        println!("Error: {:?}", err);
    }

    Ok(())
}

fn run_app<B: ratatui::backend::Backend>(terminal: &mut Terminal<B>, app: &mut App) -> Result<()> {
    loop {
        terminal.draw(|f| ui(f, app))?;

        if let Event::Key(key) = event::read()? {
            // Windows reports releases too
            if key.kind != KeyEventKind::Press {
                continue;
            }
            if app.handle_key(key) {
                return Ok(());
            }
        }
    }
}

fn ui(f: &mut Frame, app: &mut App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Input
            Constraint::Length(5), // Result
            Constraint::Min(0),    // History
            Constraint::Length(3), // Status bar
        ])
        .split(f.size());

    render_input(f, chunks[0], app);
    render_result(f, chunks[1], app);
    render_history(f, chunks[2], app);
    render_status_bar(f, chunks[3], app);
}

fn verdict_color(verdict: Option<&Verdict>) -> Color {
    match verdict.map(|v| v.reason()) {
        None => Color::White,
        Some(Reason::Ok) => Color::Green,
        Some(Reason::NotThirteenDigits) => Color::Yellow,
        Some(_) => Color::Red,
    }
}

fn render_input(f: &mut Frame, area: Rect, app: &App) {
    let color = verdict_color(app.verdict.as_ref());

    let input = Paragraph::new(Line::from(vec![
        Span::styled(app.input.clone(), Style::default().fg(color).add_modifier(Modifier::BOLD)),
        Span::styled("█", Style::default().fg(Color::DarkGray)),
    ]))
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(color))
            .title(format!(" ID Number ({}/13) ", app.input.chars().count())),
    );

    f.render_widget(input, area);
}

fn render_result(f: &mut Frame, area: Rect, app: &App) {
    let label = Style::default().fg(Color::Cyan);

    let lines = match &app.verdict {
        None => vec![Line::from(Span::styled(
            "Type a 13-digit South African ID number",
            Style::default().fg(Color::DarkGray),
        ))],
        Some(verdict) => {
            let color = verdict_color(Some(verdict));
            let dob = verdict
                .date_of_birth()
                .map(|d| d.iso())
                .unwrap_or_else(|| "-".to_string());
            let gender = verdict
                .gender()
                .map(|g| g.to_string())
                .unwrap_or_else(|| "-".to_string());

            vec![
                Line::from(Span::styled(verdict.message(), Style::default().fg(color))),
                Line::from(vec![
                    Span::styled("Date of birth: ", label),
                    Span::raw(dob),
                ]),
                Line::from(vec![Span::styled("Gender:        ", label), Span::raw(gender)]),
            ]
        }
    };

    let result = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::White))
            .title(" Result "),
    );

    f.render_widget(result, area);
}

fn render_history(f: &mut Frame, area: Rect, app: &mut App) {
    let header_cells = ["ID Number", "Reason", "Date of Birth", "Gender"]
        .iter()
        .map(|h| {
            Cell::from(*h).style(
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD),
            )
        });

    let header = Row::new(header_cells)
        .style(Style::default().bg(Color::DarkGray))
        .height(1);

    let rows = app.history.iter().map(|(input, verdict)| {
        let color = verdict_color(Some(verdict));

        let cells = vec![
            Cell::from(input.clone()),
            Cell::from(verdict.reason().code()).style(Style::default().fg(color)),
            Cell::from(verdict.date_of_birth().map(|d| d.iso()).unwrap_or_default()),
            Cell::from(verdict.gender().map(|g| g.to_string()).unwrap_or_default()),
        ];

        Row::new(cells).height(1)
    });

    let table = Table::new(
        rows,
        [
            Constraint::Length(22),
            Constraint::Length(22),
            Constraint::Length(14),
            Constraint::Length(8),
        ],
    )
    .header(header)
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::White))
            .title(" History "),
    )
    .highlight_style(
        Style::default()
            .bg(Color::DarkGray)
            .add_modifier(Modifier::BOLD),
    )
    .highlight_symbol("→ ");

    f.render_stateful_widget(table, area, &mut app.history_state);
}

fn render_status_bar(f: &mut Frame, area: Rect, app: &App) {
    let reference = match app.validator.reference_year() {
        Some(year) => format!(" Reference year: {} ", year),
        None => " Reference year: today ".to_string(),
    };

    let status_spans = vec![
        Span::styled(reference, Style::default().fg(Color::Cyan)),
        Span::raw(" | "),
        Span::styled("Enter", Style::default().fg(Color::Yellow)),
        Span::raw(" Keep | "),
        Span::styled("Ctrl+U", Style::default().fg(Color::Yellow)),
        Span::raw(" Clear | "),
        Span::styled("↑/↓", Style::default().fg(Color::Yellow)),
        Span::raw(" History | "),
        Span::styled("Esc", Style::default().fg(Color::Red)),
        Span::raw(" Quit"),
    ];

    let status_bar = Paragraph::new(Line::from(status_spans)).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::White)),
    );

    f.render_widget(status_bar, area);
}
