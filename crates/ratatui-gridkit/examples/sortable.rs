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
use ratatui_gridkit::sortable::SortableAction;
use ratatui_gridkit::sortable::SortableEvent;
use ratatui_gridkit::sortable::SortableItem;
use ratatui_gridkit::sortable::SortableList;
use ratatui_gridkit::splitpane::SplitAxis;
use ratatui_gridkit::splitpane::SplitPane;
use ratatui_gridkit::tabs::Tab;
use ratatui_gridkit::tabs::TabsPanel;
use ratatui_gridkit::theme::Theme;

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

    let mut tabs = TabsPanel::new(vec![
        Tab::new("Queue"),
        Tab::new("Archive").disabled(),
        Tab::new("Settings"),
    ]);
    let mut split = SplitPane::new(SplitAxis::Horizontal, 24);
    let mut list = SortableList::new(vec![
        SortableItem::new("deploy", "Deploy to staging"),
        SortableItem::new("migrate", "Run migrations"),
        SortableItem::new("backup", "Backup database").disabled(),
        SortableItem::new("notify", "Notify the team"),
        SortableItem::new("verify", "Verify health checks"),
    ]);

    let res = run(&mut terminal, &theme, &mut tabs, &mut split, &mut list);

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
    tabs: &mut TabsPanel,
    split: &mut SplitPane,
    list: &mut SortableList,
) -> io::Result<()> {
    let mut status = String::from("drag items to reorder · Shift+↑↓ moves · q quits");
    loop {
        terminal.draw(|f| {
            let area = f.area();
            let block = Block::default()
                .title("SortableList / SplitPane / TabsPanel")
                .borders(Borders::ALL);
            let inner = block.inner(area);
            f.render_widget(block, area);

            let buf = f.buffer_mut();
            let tab_area = ratatui::layout::Rect::new(inner.x, inner.y, inner.width, 1);
            tabs.render(tab_area, buf, theme);

            let below = ratatui::layout::Rect::new(
                inner.x,
                inner.y + 1,
                inner.width,
                inner.height.saturating_sub(2),
            );
            let (left, right) = split.layout(below);
            list.render(left, buf, theme);
            split.render_divider(buf, theme);

            let order = list.order().join(" → ");
            let span = Span::styled(order.as_str(), theme.text_muted);
            buf.set_span(right.x + 1, right.y, &span, right.width.saturating_sub(1));

            let status_span = Span::styled(status.as_str(), theme.text_muted);
            buf.set_span(
                inner.x,
                inner.y + inner.height.saturating_sub(1),
                &status_span,
                inner.width,
            );
        })?;

        if crossterm::event::poll(Duration::from_millis(50))? {
            let ev = crossterm::event::read()?;
            if let crossterm::event::Event::Key(key) = &ev
                && matches!(key.code, crossterm::event::KeyCode::Char('q'))
            {
                return Ok(());
            }
            if let Some(input) = input_event_from_crossterm(ev) {
                tabs.handle_event(input.clone());
                split.handle_event(input.clone());
                if let SortableAction::Event(SortableEvent::OrderChanged { order }) =
                    list.handle_event(input)
                {
                    status = format!("new order: {}", order.join(", "));
                }
            }
        }
    }
}
