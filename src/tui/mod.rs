//! Ratatui-based terminal form.
//!
//! The form has two numeric fields (density, TS) and a grade selector. The
//! selected grade's titre is recomputed on every change and shown as a metric
//! card next to the model's response curve over the suggested density range.

use std::io;
use std::time::Duration;

use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{
    Terminal,
    backend::CrosstermBackend,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Wrap},
};

use crate::config::{Settings, parse_decimal};
use crate::domain::{Grade, InputBounds, MeasurementInput};
use crate::error::AppError;
use crate::models::{model_for, predict};
use crate::report::{self, Evaluation};

mod plotters_chart;

use plotters_chart::TitrePlottersChart;

/// Number of samples on the response curve.
const CURVE_POINTS: usize = 200;

/// Start the TUI.
pub fn run(settings: Settings) -> Result<(), AppError> {
    let _guard = TerminalGuard::new()?;

    let backend = CrosstermBackend::new(io::stdout());
    let mut terminal =
        Terminal::new(backend).map_err(|e| AppError::runtime(format!("Failed to initialize terminal: {e}")))?;

    tracing::info!(grade = %settings.grade, "starting form");
    let mut form = FormState::new(&settings);
    event_loop(&mut form, &mut terminal)?;
    tracing::info!("form closed");
    Ok(())
}

/// Ensures the terminal is restored (raw mode, alternate screen) on exit.
struct TerminalGuard;

impl TerminalGuard {
    fn new() -> Result<Self, AppError> {
        enable_raw_mode().map_err(|e| AppError::runtime(format!("Failed to enable raw mode: {e}")))?;
        if let Err(e) = execute!(io::stdout(), EnterAlternateScreen) {
            let _ = disable_raw_mode();
            return Err(AppError::runtime(format!("Failed to enter alternate screen: {e}")));
        }
        Ok(Self)
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
    }
}

fn event_loop<B: ratatui::backend::Backend>(form: &mut FormState, terminal: &mut Terminal<B>) -> Result<(), AppError> {
    let mut needs_redraw = true;
    loop {
        if needs_redraw {
            terminal
                .draw(|f| draw(f, form))
                .map_err(|e| AppError::runtime(format!("Terminal draw error: {e}")))?;
            needs_redraw = false;
        }

        if !event::poll(Duration::from_millis(100)).map_err(|e| AppError::runtime(format!("Event poll error: {e}")))? {
            continue;
        }

        match event::read().map_err(|e| AppError::runtime(format!("Event read error: {e}")))? {
            Event::Key(key) => {
                if key.kind != KeyEventKind::Press {
                    continue;
                }
                if form.handle_key(key) {
                    break;
                }
                needs_redraw = true;
            }
            Event::Resize(_, _) => {
                needs_redraw = true;
            }
            _ => {}
        }
    }
    Ok(())
}

/// Form fields, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormField {
    Density,
    Ts,
    Grade,
}

impl FormField {
    const ALL: [FormField; 3] = [FormField::Density, FormField::Ts, FormField::Grade];

    fn index(self) -> usize {
        match self {
            FormField::Density => 0,
            FormField::Ts => 1,
            FormField::Grade => 2,
        }
    }
}

/// Terminal-independent form state.
#[derive(Debug, Clone)]
pub struct FormState {
    pub input: MeasurementInput,
    pub grade: Grade,
    pub selected: FormField,
    /// Text being typed into the selected numeric field, if editing.
    pub editing: Option<String>,
    pub show_equations: bool,
    pub status: String,
    bounds: InputBounds,
    initial: MeasurementInput,
    initial_grade: Grade,
}

impl FormState {
    pub fn new(settings: &Settings) -> Self {
        Self {
            input: settings.defaults,
            grade: settings.grade,
            selected: FormField::Density,
            editing: None,
            show_equations: false,
            status: "Ready.".to_string(),
            bounds: settings.bounds,
            initial: settings.defaults,
            initial_grade: settings.grade,
        }
    }

    /// Current evaluation of the selected grade.
    ///
    /// Does not log: this runs on every redraw and stderr output would land on
    /// the alternate screen.
    pub fn evaluation(&self) -> Evaluation {
        Evaluation {
            result: predict(self.grade, &self.input),
            notes: self.bounds.check(&self.input),
        }
    }

    /// Apply a key press. Returns `true` when the form should close.
    pub fn handle_key(&mut self, key: KeyEvent) -> bool {
        if self.editing.is_some() {
            self.handle_edit_key(key.code);
            return false;
        }

        let factor = if key.modifiers.contains(KeyModifiers::SHIFT) { 10.0 } else { 1.0 };
        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => return true,
            KeyCode::Up => self.move_selection(-1),
            KeyCode::Down => self.move_selection(1),
            KeyCode::Left => self.step(-factor),
            KeyCode::Right => self.step(factor),
            KeyCode::Tab | KeyCode::Char('g') => {
                self.grade = self.grade.toggle();
                self.status = format!("grade: {}", self.grade.label());
            }
            KeyCode::Enter => match self.selected {
                FormField::Density | FormField::Ts => {
                    self.editing = Some(String::new());
                    self.status = "Type a value. Enter to apply, Esc to cancel.".to_string();
                }
                FormField::Grade => {
                    self.grade = self.grade.toggle();
                    self.status = format!("grade: {}", self.grade.label());
                }
            },
            KeyCode::Char('e') => {
                self.show_equations = !self.show_equations;
            }
            KeyCode::Char('r') => {
                self.input = self.initial;
                self.grade = self.initial_grade;
                self.status = "Reset to defaults.".to_string();
            }
            _ => {}
        }
        false
    }

    fn handle_edit_key(&mut self, code: KeyCode) {
        let Some(buffer) = self.editing.as_mut() else {
            return;
        };
        match code {
            KeyCode::Esc => {
                self.editing = None;
                self.status = "Edit canceled.".to_string();
            }
            KeyCode::Enter => {
                let text = buffer.trim().to_string();
                self.editing = None;
                self.apply_text(&text);
            }
            KeyCode::Backspace => {
                buffer.pop();
            }
            KeyCode::Char(c) if c.is_ascii_digit() || matches!(c, '.' | ',' | '-') => {
                buffer.push(c);
            }
            _ => {}
        }
    }

    fn apply_text(&mut self, text: &str) {
        if text.is_empty() {
            self.status = "Edit canceled.".to_string();
            return;
        }
        let Some(value) = parse_decimal(text) else {
            self.status = format!("Invalid number '{text}'.");
            return;
        };
        match self.selected {
            FormField::Density => self.input.density = value,
            FormField::Ts => self.input.ts = value,
            FormField::Grade => return,
        }
        self.refresh_status();
    }

    fn move_selection(&mut self, delta: isize) {
        let last = FormField::ALL.len() - 1;
        let idx = self.selected.index().saturating_add_signed(delta).min(last);
        self.selected = FormField::ALL[idx];
    }

    fn step(&mut self, direction: f64) {
        match self.selected {
            FormField::Density => {
                self.input.density = step_value(self.input.density, direction, self.bounds.density_step);
            }
            FormField::Ts => {
                self.input.ts = step_value(self.input.ts, direction, self.bounds.ts_step);
            }
            FormField::Grade => {
                self.grade = self.grade.toggle();
                self.status = format!("grade: {}", self.grade.label());
                return;
            }
        }
        self.refresh_status();
    }

    fn refresh_status(&mut self) {
        let notes = self.bounds.check(&self.input);
        self.status = match notes.first() {
            Some(note) => note.to_string(),
            None => report::format_inputs(&self.input),
        };
    }
}

/// Move `value` by `direction` steps.
///
/// Values already on the step grid are snapped back onto it so repeated ±0.01
/// steps don't accumulate float noise; typed off-grid values keep their offset.
fn step_value(value: f64, direction: f64, step: f64) -> f64 {
    let next = value + direction * step;
    if !(step > 0.0 && value.is_finite()) {
        return next;
    }
    let units = value / step;
    if (units - units.round()).abs() < 1e-6 {
        (next / step).round() * step
    } else {
        next
    }
}

/// Response curve of `grade` over the suggested density range at fixed TS.
pub fn response_series(grade: Grade, ts: f64, bounds: &InputBounds) -> (Vec<(f64, f64)>, [f64; 2], [f64; 2]) {
    let model = model_for(grade);
    let x_bounds = [bounds.density_min, bounds.density_max];

    let mut curve = Vec::with_capacity(CURVE_POINTS);
    for i in 0..CURVE_POINTS {
        let u = i as f64 / (CURVE_POINTS as f64 - 1.0);
        let d = x_bounds[0] + u * (x_bounds[1] - x_bounds[0]);
        curve.push((d, model.eval(d, ts)));
    }

    let (mut y_min, mut y_max) = (f64::INFINITY, f64::NEG_INFINITY);
    for &(_, y) in &curve {
        y_min = y_min.min(y);
        y_max = y_max.max(y);
    }
    if !y_min.is_finite() || !y_max.is_finite() || y_max <= y_min {
        y_min = 0.0;
        y_max = 100.0;
    }
    let pad = ((y_max - y_min).abs() * 0.05).max(1e-9);

    (curve, x_bounds, [y_min - pad, y_max + pad])
}

fn draw(frame: &mut ratatui::Frame<'_>, form: &FormState) {
    let eval = form.evaluation();
    let footer_height = 3;
    let eq_height = if form.show_equations { 6 } else { 0 };
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(4),
            Constraint::Min(0),
            Constraint::Length(eq_height),
            Constraint::Length(footer_height),
        ])
        .split(frame.area());

    draw_header(frame, chunks[0]);
    draw_body(frame, chunks[1], form, &eval);
    if form.show_equations {
        draw_equations(frame, chunks[2]);
    }
    draw_footer(frame, chunks[3], form);
}

fn draw_header(frame: &mut ratatui::Frame<'_>, area: Rect) {
    let lines = vec![
        Line::from(vec![
            Span::styled("titre", Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)),
            Span::raw(" - P2O5 titre prediction"),
        ]),
        Line::from(Span::styled(
            format!(
                "Estimate %P2O5 from density and %TS ({} quoted precision) for 29% and 54% acid grades.",
                report::QUOTED_PRECISION
            ),
            Style::default().fg(Color::Gray),
        )),
    ];
    let p = Paragraph::new(Text::from(lines)).block(Block::default().borders(Borders::ALL));
    frame.render_widget(p, area);
}

fn draw_body(frame: &mut ratatui::Frame<'_>, area: Rect, form: &FormState, eval: &Evaluation) {
    let cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(36), Constraint::Min(0)])
        .split(area);
    let left = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(5), Constraint::Min(0)])
        .split(cols[0]);

    draw_fields(frame, left[0], form);
    draw_metric(frame, left[1], eval);
    draw_chart(frame, cols[1], form, eval);
}

fn draw_fields(frame: &mut ratatui::Frame<'_>, area: Rect, form: &FormState) {
    let field_text = |field: FormField, value: String| -> String {
        match (&form.editing, form.selected == field) {
            (Some(buffer), true) => format!("{buffer}_"),
            _ => value,
        }
    };

    let items = vec![
        ListItem::new(format!(
            "Density (kg/m³): {}",
            field_text(FormField::Density, format!("{:.1}", form.input.density))
        )),
        ListItem::new(format!(
            "TS (%):          {}",
            field_text(FormField::Ts, format!("{:.2}", form.input.ts))
        )),
        ListItem::new(format!("Display:         {}", form.grade.label())),
    ];

    let list = List::new(items)
        .block(Block::default().title("Inputs").borders(Borders::ALL))
        .highlight_style(Style::default().fg(Color::Black).bg(Color::White))
        .highlight_symbol("» ");

    let mut state = ListState::default();
    state.select(Some(form.selected.index()));
    frame.render_stateful_widget(list, area, &mut state);
}

fn draw_metric(frame: &mut ratatui::Frame<'_>, area: Rect, eval: &Evaluation) {
    let value_style = if eval.result.value.is_finite() {
        Style::default().fg(Color::White).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::Red).add_modifier(Modifier::BOLD)
    };

    let mut lines = vec![
        Line::from(Span::styled(eval.result.label, Style::default().fg(Color::Gray))),
        Line::from(Span::styled(report::format_value(eval.result.value), value_style)),
    ];
    for note in &eval.notes {
        lines.push(Line::from(Span::styled(
            format!("{} out of suggested range", note.field.display_name()),
            Style::default().fg(Color::Yellow),
        )));
    }

    let p = Paragraph::new(Text::from(lines))
        .alignment(Alignment::Center)
        .block(Block::default().title("Result").borders(Borders::ALL));
    frame.render_widget(p, area);
}

fn draw_chart(frame: &mut ratatui::Frame<'_>, area: Rect, form: &FormState, eval: &Evaluation) {
    let block = Block::default()
        .title(format!("{} vs density (TS = {:.2} %)", form.grade.label(), form.input.ts))
        .borders(Borders::ALL);
    let inner = block.inner(area);
    frame.render_widget(block, area);
    frame.render_widget(Clear, inner);

    let (curve, x_bounds, y_bounds) = response_series(form.grade, form.input.ts, &form.bounds);
    let value = eval.result.value;
    let marker = (form.input.density.is_finite()
        && value.is_finite()
        && (x_bounds[0]..=x_bounds[1]).contains(&form.input.density)
        && (y_bounds[0]..=y_bounds[1]).contains(&value))
    .then_some((form.input.density, value));

    let widget = TitrePlottersChart {
        curve: &curve,
        marker,
        x_bounds,
        y_bounds,
        x_label: "density (kg/m³)",
        y_label: "titre (%)",
    };
    frame.render_widget(widget, inner);
}

fn draw_equations(frame: &mut ratatui::Frame<'_>, area: Rect) {
    let lines: Vec<Line> = Grade::ALL
        .iter()
        .map(|g| Line::from(report::format_equation(*g)))
        .collect();
    let p = Paragraph::new(Text::from(lines))
        .wrap(Wrap { trim: true })
        .block(Block::default().title("Equations").borders(Borders::ALL));
    frame.render_widget(p, area);
}

fn draw_footer(frame: &mut ratatui::Frame<'_>, area: Rect, form: &FormState) {
    let help = "↑/↓ select  ←/→ adjust (Shift ×10)  Enter edit  Tab grade  e equations  r reset  q quit";
    let line = Line::from(vec![
        Span::styled(help, Style::default().fg(Color::Gray)),
        Span::raw(" | "),
        Span::styled(form.status.as_str(), Style::default().fg(Color::Yellow)),
    ]);
    let p = Paragraph::new(line).block(Block::default().borders(Borders::ALL));
    frame.render_widget(p, area);
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use ratatui::backend::TestBackend;
    use ratatui::buffer::Buffer;
    use ratatui::widgets::Widget;

    use super::*;

    /// In-memory log sink for a scoped subscriber.
    #[derive(Clone, Default)]
    struct Captured(Arc<Mutex<Vec<u8>>>);

    impl io::Write for Captured {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl Captured {
        fn text(&self) -> String {
            String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
        }
    }

    fn buffer_text(buf: &Buffer) -> String {
        buf.content().iter().map(|c| c.symbol()).collect()
    }

    fn render(form: &FormState) -> String {
        let mut terminal = Terminal::new(TestBackend::new(120, 40)).unwrap();
        terminal.draw(|f| draw(f, form)).unwrap();
        buffer_text(terminal.backend().buffer())
    }

    fn press(form: &mut FormState, code: KeyCode) -> bool {
        form.handle_key(KeyEvent::new(code, KeyModifiers::NONE))
    }

    fn form() -> FormState {
        FormState::new(&Settings::default())
    }

    #[test]
    fn arrows_step_selected_field() {
        let mut f = form();
        press(&mut f, KeyCode::Right);
        assert_eq!(f.input.density, 1291.0);
        f.handle_key(KeyEvent::new(KeyCode::Left, KeyModifiers::SHIFT));
        assert_eq!(f.input.density, 1281.0);

        press(&mut f, KeyCode::Down);
        assert_eq!(f.selected, FormField::Ts);
        for _ in 0..3 {
            press(&mut f, KeyCode::Right);
        }
        assert!((f.input.ts - 0.93).abs() < 1e-12);
    }

    #[test]
    fn selection_is_clamped() {
        let mut f = form();
        press(&mut f, KeyCode::Up);
        assert_eq!(f.selected, FormField::Density);
        for _ in 0..5 {
            press(&mut f, KeyCode::Down);
        }
        assert_eq!(f.selected, FormField::Grade);
    }

    #[test]
    fn tab_toggles_grade_and_result() {
        let mut f = form();
        assert_eq!(report::format_value(f.evaluation().result.value), "25.80 %");
        press(&mut f, KeyCode::Tab);
        assert_eq!(f.grade, Grade::G54);
        assert_eq!(report::format_value(f.evaluation().result.value), "38.44 %");
    }

    #[test]
    fn typed_value_is_applied_even_out_of_range() {
        let mut f = form();
        press(&mut f, KeyCode::Enter);
        assert!(f.editing.is_some());
        for c in "1800".chars() {
            press(&mut f, KeyCode::Char(c));
        }
        press(&mut f, KeyCode::Enter);
        assert_eq!(f.editing, None);
        assert_eq!(f.input.density, 1800.0);
        assert!(f.status.contains("outside the suggested range"));
        assert_eq!(f.evaluation().notes.len(), 1);
    }

    #[test]
    fn invalid_or_cancelled_edit_keeps_value() {
        let mut f = form();
        press(&mut f, KeyCode::Enter);
        press(&mut f, KeyCode::Char('-'));
        press(&mut f, KeyCode::Char('-'));
        press(&mut f, KeyCode::Enter);
        assert_eq!(f.input.density, 1290.0);
        assert!(f.status.starts_with("Invalid number"));

        press(&mut f, KeyCode::Enter);
        press(&mut f, KeyCode::Char('9'));
        press(&mut f, KeyCode::Esc);
        assert_eq!(f.input.density, 1290.0);
        assert_eq!(f.editing, None);
    }

    #[test]
    fn reset_and_quit() {
        let mut f = form();
        press(&mut f, KeyCode::Right);
        press(&mut f, KeyCode::Char('g'));
        press(&mut f, KeyCode::Char('e'));
        assert!(f.show_equations);
        press(&mut f, KeyCode::Char('r'));
        assert_eq!(f.input, MeasurementInput::default());
        assert_eq!(f.grade, Grade::G29);
        assert!(press(&mut f, KeyCode::Char('q')));
    }

    #[test]
    fn response_series_spans_density_range() {
        let (curve, x, y) = response_series(Grade::G54, 0.9, &InputBounds::STANDARD);
        assert_eq!(curve.len(), CURVE_POINTS);
        assert_eq!(x, [1220.0, 1700.0]);
        assert_eq!(curve[0].0, 1220.0);
        assert_eq!(curve[CURVE_POINTS - 1].0, 1700.0);
        assert!(curve.iter().all(|&(_, v)| v > y[0] && v < y[1]));
    }

    #[test]
    fn response_series_falls_back_on_non_finite_ts() {
        let (_, _, y) = response_series(Grade::G29, f64::NAN, &InputBounds::STANDARD);
        assert!(y[0].is_finite() && y[1].is_finite() && y[1] > y[0]);
    }

    #[test]
    fn stepping_keeps_typed_offset() {
        let mut f = form();
        press(&mut f, KeyCode::Enter);
        for c in "1290.5".chars() {
            press(&mut f, KeyCode::Char(c));
        }
        press(&mut f, KeyCode::Enter);
        press(&mut f, KeyCode::Right);
        assert_eq!(f.input.density, 1291.5);
        press(&mut f, KeyCode::Left);
        assert_eq!(f.input.density, 1290.5);
    }

    #[test]
    fn redraw_emits_no_log_events() {
        let captured = Captured::default();
        let sink = captured.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::TRACE)
            .with_ansi(false)
            .with_writer(move || sink.clone())
            .finish();

        let mut f = form();
        f.input.density = 1800.0;
        tracing::subscriber::with_default(subscriber, || {
            render(&f);
            assert_eq!(captured.text(), "");

            report::evaluate(f.grade, &f.input, &f.bounds);
        });

        let logged = captured.text();
        assert!(logged.contains("input outside suggested range"), "{logged}");
        assert!(logged.contains("evaluated titre"), "{logged}");
    }

    #[test]
    fn form_renders_result_chart_and_equations() {
        let mut f = form();
        f.show_equations = true;
        let screen = render(&f);
        assert!(screen.contains("Titre 29%"));
        assert!(screen.contains("25.80 %"));
        assert!(screen.contains("Titre 29% vs density"));
        assert!(screen.contains("Equations"));
        assert!(screen.contains("Density (kg/m³): 1290.0"));

        f.grade = Grade::G54;
        f.show_equations = false;
        let screen = render(&f);
        assert!(screen.contains("38.44 %"));
        assert!(!screen.contains("Equations"));
    }

    #[test]
    fn chart_reports_tiny_area() {
        let area = Rect::new(0, 0, 12, 4);
        let mut buf = Buffer::empty(area);
        TitrePlottersChart {
            curve: &[],
            marker: None,
            x_bounds: [0.0, 1.0],
            y_bounds: [0.0, 1.0],
            x_label: "x",
            y_label: "y",
        }
        .render(area, &mut buf);
        assert!(buffer_text(&buf).starts_with("Chart area"));
    }
}
