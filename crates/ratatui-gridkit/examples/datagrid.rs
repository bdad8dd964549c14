use std::io;
use std::time::Duration;

use crossterm::terminal::EnterAlternateScreen;
use crossterm::terminal::LeaveAlternateScreen;
use crossterm::terminal::disable_raw_mode;
use crossterm::terminal::enable_raw_mode;
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use ratatui::layout::Alignment;
use ratatui::layout::Rect;
use ratatui::text::Span;
use ratatui::widgets::Block;
use ratatui::widgets::Borders;
use ratatui_gridkit::crossterm_input::input_event_from_crossterm;
use ratatui_gridkit::datagrid::column::CellType;
use ratatui_gridkit::datagrid::column::ColumnSet;
use ratatui_gridkit::datagrid::column::GridColumn;
use ratatui_gridkit::datagrid::column::PinSide;
use ratatui_gridkit::datagrid::selection::SelectionMode;
use ratatui_gridkit::datagrid::view::DataGridOptions;
use ratatui_gridkit::datagrid::view::DataGridView;
use ratatui_gridkit::datagrid::view::GridAction;
use ratatui_gridkit::theme::Theme;
use ratatui_gridkit::value::Record;

fn main() -> io::Result<()> {
    let mut stdout = io::stdout();
    enable_raw_mode()?;
    crossterm::execute!(
        stdout,
        EnterAlternateScreen,
        crossterm::event::EnableMouseCapture
    )?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let theme = Theme::default();

    let columns = ColumnSet::new(vec![
        GridColumn::new("id", "ID").fixed(5).pinned(PinSide::Left),
        GridColumn::new("name", "Name").flex(12).editable(true),
        GridColumn::new("role", "Role")
            .fixed(12)
            .editable(true)
            .cell_type(CellType::Select(vec![
                "engineer".into(),
                "designer".into(),
                "manager".into(),
            ])),
        GridColumn::new("age", "Age")
            .fixed(6)
            .align(Alignment::Right)
            .editable(true)
            .cell_type(CellType::Number),
        GridColumn::new("active", "Active")
            .fixed(8)
            .editable(true)
            .cell_type(CellType::Checkbox),
    ])
    .expect("column keys are unique");

    let records: Vec<Record> = (1..=200i64)
        .map(|i| {
            Record::with_key(i)
                .set("id", i)
                .set("name", format!("person {i:03}"))
                .set(
                    "role",
                    ["engineer", "designer", "manager"][(i % 3) as usize],
                )
                .set("age", 20 + (i * 7) % 45)
                .set("active", i % 4 != 0)
        })
        .collect();

    let mut grid = DataGridView::with_options(
        columns,
        DataGridOptions {
            striped: true,
            ..Default::default()
        },
    );
    grid.set_records(records);
    grid.set_page_size(25).expect("page size is positive");
    grid.set_selection_mode(SelectionMode::Multiple);

    let res = run(&mut terminal, &theme, &mut grid);

    disable_raw_mode()?;
    crossterm::execute!(
        terminal.backend_mut(),
        crossterm::event::DisableMouseCapture,
        LeaveAlternateScreen
    )?;
    terminal.show_cursor()?;
    res
}

fn run<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    theme: &Theme,
    grid: &mut DataGridView<Record>,
) -> io::Result<()> {
    let mut last_event = String::new();
    loop {
        terminal.draw(|f| {
            let area = f.area();
            let block = Block::default()
                .title("DataGridView (s sort · Space select · a all · e edit · [/] pages · q quit)")
                .borders(Borders::ALL);
            let inner = block.inner(area);
            f.render_widget(block, area);

            let buf = f.buffer_mut();
            let grid_area = Rect::new(
                inner.x,
                inner.y,
                inner.width,
                inner.height.saturating_sub(1),
            );
            grid.render(grid_area, buf, theme);

            let status = Rect::new(inner.x, inner.y + grid_area.height, inner.width, 1);
            let span = Span::styled(last_event.as_str(), theme.text_muted);
            buf.set_span(status.x, status.y, &span, status.width);
        })?;

        if crossterm::event::poll(Duration::from_millis(50))? {
            let ev = crossterm::event::read()?;
            if let crossterm::event::Event::Key(key) = &ev
                && matches!(key.code, crossterm::event::KeyCode::Char('q'))
            {
                return Ok(());
            }
            if let Some(input) = input_event_from_crossterm(ev)
                && let GridAction::Event(event) = grid.handle_event(input)
            {
                last_event = format!("{event:?}");
            }
        }
    }
}
