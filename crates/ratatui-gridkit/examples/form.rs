use std::io;
use std::time::Duration;

use crossterm::terminal::EnterAlternateScreen;
use crossterm::terminal::LeaveAlternateScreen;
use crossterm::terminal::disable_raw_mode;
use crossterm::terminal::enable_raw_mode;
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use ratatui::text::Span;
use ratatui::widgets::Block;
use ratatui::widgets::Borders;
use ratatui_gridkit::crossterm_input::input_event_from_crossterm;
use ratatui_gridkit::form::field::FieldSpec;
use ratatui_gridkit::form::rules::Rule;
use ratatui_gridkit::form::view::FormAction;
use ratatui_gridkit::form::view::FormEvent;
use ratatui_gridkit::form::view::FormView;
use ratatui_gridkit::theme::Theme;

fn main() -> io::Result<()> {
    let mut stdout = io::stdout();
    enable_raw_mode()?;
    crossterm::execute!(stdout, EnterAlternateScreen)?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    let theme = Theme::default();

    let mut form = FormView::new(vec![
        FieldSpec::text("name", "Name").required().rule(Rule::MinLen(2)),
        FieldSpec::number("age", "Age").rule(Rule::Min(0.0)).rule(Rule::Max(130.0)),
        FieldSpec::select(
            "plan",
            "Plan",
            vec!["free".into(), "pro".into(), "team".into()],
        )
        .initial("free"),
        FieldSpec::checkbox("invoice", "Company invoice"),
        FieldSpec::text("vat_id", "VAT id")
            .required()
            .visible_when("invoice", true),
    ])
    .expect("field specs are valid");

    let res = run(&mut terminal, &theme, &mut form);

    disable_raw_mode()?;
    crossterm::execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    res
}

fn run<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    theme: &Theme,
    form: &mut FormView,
) -> io::Result<()> {
    let mut status = String::from("Tab/↑↓ move · Space toggles · Enter submits · Esc quits");
    loop {
        terminal.draw(|f| {
            let area = f.area();
            let block = Block::default().title("FormView").borders(Borders::ALL);
            let inner = block.inner(area);
            f.render_widget(block, area);

            let buf = f.buffer_mut();
            let form_area = ratatui::layout::Rect::new(
                inner.x,
                inner.y,
                inner.width,
                inner.height.saturating_sub(1),
            );
            form.render(form_area, buf, theme);
            let span = Span::styled(status.as_str(), theme.text_muted);
            buf.set_span(inner.x, inner.y + form_area.height, &span, inner.width);
        })?;

        if crossterm::event::poll(Duration::from_millis(50))? {
            let ev = crossterm::event::read()?;
            if let crossterm::event::Event::Key(key) = &ev
                && matches!(key.code, crossterm::event::KeyCode::Esc)
            {
                return Ok(());
            }
            if let Some(input) = input_event_from_crossterm(ev)
                && let FormAction::Event(event) = form.handle_event(input)
            {
                status = match event {
                    FormEvent::Submitted { values } => format!("submitted: {values:?}"),
                    FormEvent::SubmitRejected { errors } => {
                        format!("rejected: {} invalid field(s)", errors.len())
                    }
                    FormEvent::ValueChanged { field, .. } => format!("changed: {field}"),
                };
            }
        }
    }
}
