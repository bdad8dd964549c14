use crate::datagrid::filter::Filter;
use crate::datagrid::page::PageState;
use crate::value::GridRecord;
use crate::value::RowKey;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SortDirection {
    Ascending,
    Descending,
}

/// The single active sort descriptor: column key plus direction. Stable
/// single-column sort; ties keep their pre-sort relative order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SortSpec {
    pub column: String,
    pub direction: SortDirection,
}

impl SortSpec {
    pub fn asc(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            direction: SortDirection::Ascending,
        }
    }

    pub fn desc(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            direction: SortDirection::Descending,
        }
    }
}

/// Position-independent handle to one source row: its index in the
/// caller-supplied data plus its resolved stable key.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RowHandle {
    pub index: usize,
    pub key: RowKey,
}

/// Output of the derivation pipeline.
///
/// `all` is the full filtered-and-sorted row sequence; `start..end` is the
/// slice the current page renders. Selection's select-all targets `all`,
/// rendering targets `visible()`.
#[derive(Clone, Debug, Default)]
pub struct DerivedView {
    all: Vec<RowHandle>,
    start: usize,
    end: usize,
}

impl DerivedView {
    /// Rows on the current page.
    pub fn visible(&self) -> &[RowHandle] {
        &self.all[self.start..self.end]
    }

    /// Every row that passed the filters, in sorted order.
    pub fn filtered(&self) -> &[RowHandle] {
        &self.all
    }

    /// Post-filter, pre-pagination row count.
    pub fn total(&self) -> usize {
        self.all.len()
    }

    pub fn is_empty(&self) -> bool {
        self.all.is_empty()
    }

    pub fn visible_len(&self) -> usize {
        self.end - self.start
    }
}

/// Compute the derived view: filter, then stable sort, then paginate, in
/// that fixed order. Reordering the stages would change which rows land on
/// a given page.
///
/// `page.total` is updated (re-clamping the current page) as part of the
/// derivation; everything else is read-only. Calling this twice with the
/// same inputs yields the same output.
pub fn derive<R: GridRecord>(
    records: &[R],
    filters: &[Filter],
    sort: Option<&SortSpec>,
    page: &mut PageState,
) -> DerivedView {
    let mut rows: Vec<RowHandle> = records
        .iter()
        .enumerate()
        .filter(|(_, record)| {
            filters
                .iter()
                .all(|f| f.matches(&record.field(&f.column)))
        })
        .map(|(index, record)| RowHandle {
            index,
            key: record.record_key().unwrap_or(RowKey::Index(index)),
        })
        .collect();

    if let Some(spec) = sort {
        rows.sort_by(|a, b| {
            let va = records[a.index].field(&spec.column);
            let vb = records[b.index].field(&spec.column);
            let ord = va.compare(&vb);
            match spec.direction {
                SortDirection::Ascending => ord,
                SortDirection::Descending => ord.reverse(),
            }
        });
    }

    page.set_total(rows.len());
    let (start, end) = page.slice_bounds();
    log::trace!(
        "derived view: {} of {} rows after {} filter(s), page {}/{}",
        end - start,
        rows.len(),
        filters.len(),
        page.page(),
        page.page_count()
    );

    DerivedView {
        all: rows,
        start,
        end,
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::datagrid::filter::FilterOp;
    use crate::value::Record;

    fn people() -> Vec<Record> {
        vec![
            Record::with_key(1i64).set("id", 1).set("age", 30),
            Record::with_key(2i64).set("id", 2).set("age", 20),
            Record::with_key(3i64).set("id", 3).set("age", 20),
        ]
    }

    fn keys(rows: &[RowHandle]) -> Vec<i64> {
        rows.iter()
            .map(|r| match &r.key {
                RowKey::Int(n) => *n,
                other => panic!("unexpected key {other:?}"),
            })
            .collect()
    }

    #[test]
    fn sort_is_stable_on_ties() {
        let records = people();
        let mut page = PageState::new(10).unwrap();
        let view = derive(&records, &[], Some(&SortSpec::asc("age")), &mut page);
        // Ages 20, 20, 30: rows 2 and 3 tie and keep input order.
        assert_eq!(keys(view.visible()), vec![2, 3, 1]);
    }

    #[test]
    fn filter_runs_before_sort_and_pagination() {
        let records = people();
        let mut page = PageState::new(10).unwrap();
        let filters = [Filter::new("age", FilterOp::Gte, 25)];
        let view = derive(&records, &filters, None, &mut page);
        assert_eq!(keys(view.visible()), vec![1]);
        assert_eq!(view.total(), 1);
    }

    #[test]
    fn derivation_is_idempotent() {
        let records = people();
        let mut page = PageState::new(2).unwrap();
        let filters = [Filter::new("age", FilterOp::Lte, 30)];
        let sort = SortSpec::desc("age");
        let a = derive(&records, &filters, Some(&sort), &mut page);
        let b = derive(&records, &filters, Some(&sort), &mut page);
        assert_eq!(a.visible(), b.visible());
        assert_eq!(a.total(), b.total());
    }

    #[test]
    fn pagination_slices_after_sort() {
        // 25 rows, page size 10, page 3 holds rows 21..=25.
        let records: Vec<Record> = (1..=25i64)
            .map(|i| Record::with_key(i).set("n", i))
            .collect();
        let mut page = PageState::new(10).unwrap();
        page.set_total(25);
        page.set_page(3);
        let view = derive(&records, &[], Some(&SortSpec::asc("n")), &mut page);
        assert_eq!(view.visible_len(), 5);
        assert_eq!(keys(view.visible()), vec![21, 22, 23, 24, 25]);
    }

    #[test]
    fn swapping_sort_and_pagination_would_differ() {
        // With enough distinct values per page, paginate-then-sort disagrees
        // with sort-then-paginate: the pipeline must sort first.
        let records: Vec<Record> = (1..=6i64)
            .map(|i| Record::with_key(i).set("n", 7 - i))
            .collect();
        let mut page = PageState::new(3).unwrap();

        let view = derive(&records, &[], Some(&SortSpec::asc("n")), &mut page);
        // Sorted ascending by n: keys 6,5,4 land on page 1.
        assert_eq!(keys(view.visible()), vec![6, 5, 4]);

        // Paginate-first would have kept keys 1,2,3 and sorted them to
        // 3,2,1, a different set entirely.
        let paginate_first: Vec<i64> = {
            let mut first_page: Vec<i64> = vec![1, 2, 3];
            first_page.sort_by_key(|i| 7 - i);
            first_page
        };
        assert_ne!(keys(view.visible()), paginate_first);
    }

    #[test]
    fn empty_filter_result_is_an_empty_view() {
        let records = people();
        let mut page = PageState::new(10).unwrap();
        let filters = [Filter::new("age", FilterOp::Gt, 100)];
        let view = derive(&records, &filters, None, &mut page);
        assert!(view.is_empty());
        assert_eq!(page.page(), 1);
    }
}
