//! End-to-end fixtures for the grid pipeline, selection, resize, and
//! reorder behavior.

use pretty_assertions::assert_eq;

use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui_gridkit::datagrid::column::ColumnSet;
use ratatui_gridkit::datagrid::column::GridColumn;
use ratatui_gridkit::datagrid::filter::Filter;
use ratatui_gridkit::datagrid::filter::FilterOp;
use ratatui_gridkit::datagrid::page::PageState;
use ratatui_gridkit::datagrid::pipeline::derive;
use ratatui_gridkit::datagrid::pipeline::SortSpec;
use ratatui_gridkit::datagrid::selection::SelectionMode;
use ratatui_gridkit::value::GridRecord;
use ratatui_gridkit::datagrid::selection::SelectionState;
use ratatui_gridkit::datagrid::view::DataGridView;
use ratatui_gridkit::datagrid::view::GridEvent;
use ratatui_gridkit::input::InputEvent;
use ratatui_gridkit::input::MouseEvent;
use ratatui_gridkit::sortable::SortableEvent;
use ratatui_gridkit::sortable::SortableItem;
use ratatui_gridkit::sortable::SortableList;
use ratatui_gridkit::theme::Theme;
use ratatui_gridkit::value::CellValue;
use ratatui_gridkit::value::Record;
use ratatui_gridkit::value::RowKey;

fn people() -> Vec<Record> {
    vec![
        Record::with_key(1i64).set("id", 1).set("age", 30),
        Record::with_key(2i64).set("id", 2).set("age", 20),
        Record::with_key(3i64).set("id", 3).set("age", 20),
    ]
}

fn visible_ids(records: &[Record], view: &ratatui_gridkit::datagrid::pipeline::DerivedView) -> Vec<i64> {
    view.visible()
        .iter()
        .map(|h| match records[h.index].field("id") {
            CellValue::Int(n) => n,
            other => panic!("unexpected id {other:?}"),
        })
        .collect()
}

// Scenario A: sort by age ascending; ties keep original relative order.
#[test]
fn sort_by_age_is_stable() {
    let records = people();
    let mut page = PageState::new(10).unwrap();
    let view = derive(&records, &[], Some(&SortSpec::asc("age")), &mut page);
    assert_eq!(visible_ids(&records, &view), vec![2, 3, 1]);
}

// Scenario B: filter age >= 25 leaves only row 1.
#[test]
fn filter_age_gte_25() {
    let records = people();
    let mut page = PageState::new(10).unwrap();
    let filters = [Filter::new("age", FilterOp::Gte, 25)];
    let view = derive(&records, &filters, None, &mut page);
    assert_eq!(visible_ids(&records, &view), vec![1]);
}

// Scenario C: 25 rows, page size 10, page 3 renders rows 21..=25.
#[test]
fn partial_trailing_page_renders_five_rows() {
    let records: Vec<Record> = (1..=25i64)
        .map(|i| Record::with_key(i).set("id", i))
        .collect();
    let mut page = PageState::new(10).unwrap();
    page.set_total(25);
    page.set_page(3);
    let view = derive(&records, &[], None, &mut page);
    assert_eq!(view.visible_len(), 5);
    assert_eq!(visible_ids(&records, &view), vec![21, 22, 23, 24, 25]);
}

// Scenario D: single-select, select row 2 then row 5.
#[test]
fn single_select_keeps_only_latest() {
    let mut selection = SelectionState::new(SelectionMode::Single);
    selection.click(RowKey::Int(2));
    selection.click(RowKey::Int(5));
    let keys: Vec<RowKey> = selection.keys().iter().cloned().collect();
    assert_eq!(keys, vec![RowKey::Int(5)]);
}

// Scenario E: resize from width 100, drag +50 with max 120, commit at 120.
#[test]
fn resize_commits_clamped_width() {
    let columns = ColumnSet::new(vec![
        GridColumn::new("a", "A").fixed(100).resize_bounds(10, 120),
        GridColumn::new("b", "B").fixed(20),
    ])
    .unwrap();
    let mut grid: DataGridView<Record> = DataGridView::new(columns);
    grid.set_records(people());

    let mut buf = Buffer::empty(Rect::new(0, 0, 160, 10));
    grid.render(Rect::new(0, 0, 160, 10), &mut buf, &Theme::default());

    // Column "a" spans 0..100; its boundary gap cell is at x=100.
    grid.handle_event(InputEvent::Mouse(MouseEvent::down(100, 3)));
    grid.handle_event(InputEvent::Mouse(MouseEvent::drag(150, 3)));
    let action = grid.handle_event(InputEvent::Mouse(MouseEvent::up(150, 3)));
    match action {
        ratatui_gridkit::datagrid::view::GridAction::Event(GridEvent::ColumnResized {
            column,
            width,
        }) => {
            assert_eq!(column, "a");
            assert_eq!(width, 120);
        }
        other => panic!("expected resize commit, got {other:?}"),
    }
    assert_eq!(grid.column_width("a"), Some(120));
}

// Scenario F: drag item 0 to index 2 in a 4-item list.
#[test]
fn reorder_moves_head_to_index_two() {
    let mut list = SortableList::new(vec![
        SortableItem::new("0", "zero"),
        SortableItem::new("1", "one"),
        SortableItem::new("2", "two"),
        SortableItem::new("3", "three"),
    ]);
    let mut buf = Buffer::empty(Rect::new(0, 0, 20, 6));
    list.render(Rect::new(0, 0, 20, 6), &mut buf, &Theme::default());

    list.handle_event(InputEvent::Mouse(MouseEvent::down(1, 0)));
    list.handle_event(InputEvent::Mouse(MouseEvent::drag(1, 2)));
    let action = list.handle_event(InputEvent::Mouse(MouseEvent::up(1, 2)));
    match action {
        ratatui_gridkit::sortable::SortableAction::Event(SortableEvent::OrderChanged {
            order,
        }) => {
            assert_eq!(order, vec!["1", "2", "0", "3"]);
        }
        other => panic!("expected order change, got {other:?}"),
    }
}

#[test]
fn derivation_is_deterministic_and_idempotent() {
    let records = people();
    let filters = [Filter::new("age", FilterOp::Lte, 30)];
    let sort = SortSpec::desc("age");
    let mut page_a = PageState::new(2).unwrap();
    let mut page_b = PageState::new(2).unwrap();
    let a = derive(&records, &filters, Some(&sort), &mut page_a);
    let b = derive(&records, &filters, Some(&sort), &mut page_b);
    assert_eq!(a.visible(), b.visible());
    assert_eq!(a.total(), b.total());
    assert_eq!(page_a, page_b);
}

// The pipeline order is filter → sort → paginate; swapping sort and
// pagination must change the result when distinct values span pages.
#[test]
fn sort_before_paginate_is_not_commutative() {
    let records: Vec<Record> = (1..=9i64)
        .map(|i| Record::with_key(i).set("id", i).set("rank", 10 - i))
        .collect();
    let mut page = PageState::new(3).unwrap();
    let view = derive(&records, &[], Some(&SortSpec::asc("rank")), &mut page);
    // Sorted by rank ascending, page 1 holds ids 9, 8, 7.
    assert_eq!(visible_ids(&records, &view), vec![9, 8, 7]);

    // Paginate-first would slice ids 1..=3 and then sort within the page.
    let paginate_first = vec![3, 2, 1];
    assert_ne!(visible_ids(&records, &view), paginate_first);
}

#[test]
fn single_mode_never_exceeds_one_under_any_sequence() {
    let mut selection = SelectionState::new(SelectionMode::Single);
    let clicks = [5i64, 5, 2, 9, 9, 9, 1];
    for n in clicks {
        selection.click(RowKey::Int(n));
        assert!(selection.len() <= 1);
    }
}

#[test]
fn page_invariant_holds_across_filter_and_size_changes() {
    let records: Vec<Record> = (1..=100i64)
        .map(|i| Record::with_key(i).set("id", i).set("age", i % 40))
        .collect();
    let columns = ColumnSet::new(vec![
        GridColumn::new("id", "ID").fixed(6),
        GridColumn::new("age", "Age").fixed(6),
    ])
    .unwrap();
    let mut grid = DataGridView::new(columns);
    grid.set_records(records);
    grid.set_page_size(10).unwrap();
    grid.goto_page(10);
    assert_eq!(grid.page().page(), 10);

    // A filter that shrinks the set must pull the page back into range.
    grid.set_filters(vec![Filter::new("age", FilterOp::Lt, 5)])
        .unwrap();
    let pages = grid.page().page_count();
    assert!(grid.page().page() >= 1 && grid.page().page() <= pages);

    grid.set_page_size(200).unwrap();
    assert_eq!(grid.page().page(), 1);
}

#[test]
fn events_carry_full_state_slices() {
    let columns = ColumnSet::new(vec![GridColumn::new("id", "ID").fixed(6)]).unwrap();
    let mut grid = DataGridView::new(columns);
    grid.set_records(people());
    grid.set_selection_mode(SelectionMode::Multiple);

    use std::cell::RefCell;
    use std::rc::Rc;
    let log: Rc<RefCell<Vec<GridEvent>>> = Rc::default();
    let sink = log.clone();
    grid.subscribe(move |e| sink.borrow_mut().push(e.clone()));

    grid.set_sort(Some(SortSpec::desc("id"))).unwrap();
    grid.set_filters(vec![Filter::new("id", FilterOp::Gte, 2)])
        .unwrap();

    let events = log.borrow();
    assert!(matches!(
        events[0],
        GridEvent::SortChanged(Some(ref s)) if s.column == "id"
    ));
    assert!(matches!(
        events[1],
        GridEvent::FiltersChanged(ref f) if f.len() == 1
    ));
}
