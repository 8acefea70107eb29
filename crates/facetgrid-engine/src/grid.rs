use crate::accessor::{display_text, resolve};
use crate::columns::{ColumnSet, ColumnStateManager};
use crate::filter::CompiledFilters;
use crate::normalize::{CurrencyFormat, parse_currency};
use crate::similarity::SimilarityMatcher;
use crate::sort::sort_indices;
use facetgrid_types::{
    ColumnDefinition, DEFAULT_PAGE_SIZE, FacetOption, FilterKind, FilterState, FilterValue,
    GridError, GridState, GridView, PageSelection, Pagination, Result, Row, SelectionState,
    SimilarityFacet, SortDirection, SortEntry, SortState,
};
use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq)]
pub struct GridOptions {
    pub page_size: usize,
    pub matcher: SimilarityMatcher,
    /// Build the similarity facet synchronously on every new epoch. Hosts
    /// that run the matcher in the background turn this off and call
    /// [`GridEngine::install_facet`] instead.
    pub compute_facet_inline: bool,
    pub currency: CurrencyFormat,
}

impl Default for GridOptions {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            matcher: SimilarityMatcher::default(),
            compute_facet_inline: true,
            currency: CurrencyFormat::default(),
        }
    }
}

/// Single-owner grid over an in-memory row set.
///
/// Every mutation recomputes the [`GridView`] before returning: global
/// filter, column filters, stable sort, then the page slice. Callers only
/// ever observe complete views.
pub struct GridEngine {
    columns: ColumnSet,
    rows: Arc<[Row]>,
    epoch: u64,
    facet: Option<Arc<SimilarityFacet>>,
    options: GridOptions,

    filters: FilterState,
    sort: SortState,
    pagination: Pagination,
    column_state: ColumnStateManager,
    selection: SelectionState,

    /// Row indices that pass every filter, in sorted order.
    filtered: Vec<usize>,
    view: GridView,
}

impl GridEngine {
    pub fn new(
        columns: Vec<ColumnDefinition>,
        rows: impl Into<Arc<[Row]>>,
        options: GridOptions,
    ) -> Result<Self> {
        options.matcher.validate()?;
        if options.page_size == 0 {
            return Err(GridError::InvalidPageSize);
        }

        let columns = ColumnSet::new(columns)?;
        let column_state = ColumnStateManager::new(&columns);
        let rows = rows.into();
        let pagination = Pagination {
            page_index: 0,
            page_size: options.page_size,
        };

        let mut engine = Self {
            columns,
            rows,
            epoch: 1,
            facet: None,
            options,
            filters: FilterState::default(),
            sort: SortState::default(),
            pagination,
            column_state,
            selection: SelectionState::default(),
            filtered: Vec::new(),
            view: GridView::default(),
        };
        engine.refresh_facet();
        engine.recompute();
        Ok(engine)
    }

    // ---- rows and facets ----

    /// Replace the row set. A different allocation starts a new epoch and
    /// drops the current facet; handing back the same `Arc` is a no-op.
    pub fn set_rows(&mut self, rows: impl Into<Arc<[Row]>>) -> bool {
        let rows = rows.into();
        if Arc::ptr_eq(&self.rows, &rows) {
            return false;
        }

        self.rows = rows;
        self.epoch += 1;
        tracing::debug!(epoch = self.epoch, rows = self.rows.len(), "new row epoch");

        self.refresh_facet();
        self.recompute();
        true
    }

    fn refresh_facet(&mut self) {
        self.facet = if self.options.compute_facet_inline {
            Some(Arc::new(
                self.options.matcher.build_facet(self.epoch, &self.rows),
            ))
        } else {
            None
        };
    }

    /// Install a facet computed elsewhere. Facets from any epoch other than
    /// the current one are discarded.
    pub fn install_facet(&mut self, facet: Arc<SimilarityFacet>) -> bool {
        if facet.epoch != self.epoch {
            tracing::debug!(
                facet_epoch = facet.epoch,
                epoch = self.epoch,
                "discarding stale similarity facet"
            );
            return false;
        }

        self.facet = Some(facet);
        self.recompute();
        true
    }

    // ---- filters ----

    pub fn set_global_filter(&mut self, query: impl Into<String>) {
        self.filters.global = query.into();
        self.recompute();
    }

    /// Set one column's filter. An empty value removes the entry.
    pub fn set_column_filter(&mut self, column: &str, value: FilterValue) -> Result<()> {
        let index = self.columns.index_of(column)?;
        let expected = self.columns.get(index).map(|c| c.filter_kind).unwrap_or_default();
        if expected == FilterKind::None {
            return Err(GridError::NotFilterable(column.to_string()));
        }
        if value.kind() != expected {
            return Err(GridError::FilterKindMismatch {
                column: column.to_string(),
                expected,
                found: value.kind(),
            });
        }

        if value.is_empty() {
            self.filters.columns.remove(column);
        } else {
            self.filters.columns.insert(column.to_string(), value);
        }
        self.recompute();
        Ok(())
    }

    pub fn clear_column_filter(&mut self, column: &str) -> bool {
        let removed = self.filters.columns.remove(column).is_some();
        if removed {
            self.recompute();
        }
        removed
    }

    /// Clears the global search and every column filter.
    pub fn clear_filters(&mut self) {
        self.filters = FilterState::default();
        self.recompute();
    }

    // ---- sorting ----

    /// Replace the sort. Repeated columns keep their first entry.
    pub fn set_sort(&mut self, entries: Vec<SortEntry>) -> Result<()> {
        let mut seen = HashSet::new();
        let mut checked = Vec::with_capacity(entries.len());
        for entry in entries {
            self.check_sortable(&entry.column)?;
            if seen.insert(entry.column.clone()) {
                checked.push(entry);
            }
        }

        self.sort = SortState { entries: checked };
        self.recompute();
        Ok(())
    }

    /// Cycle a column through ascending, descending and unsorted. With
    /// `multi` the other entries are kept and a new column is appended as
    /// the lowest-priority key; otherwise the column becomes the only key.
    pub fn toggle_sort(&mut self, column: &str, multi: bool) -> Result<Option<SortDirection>> {
        self.check_sortable(column)?;

        let next = match self.sort.direction_of(column) {
            None => Some(SortDirection::Asc),
            Some(SortDirection::Asc) => Some(SortDirection::Desc),
            Some(SortDirection::Desc) => None,
        };

        if multi {
            let position = self.sort.entries.iter().position(|e| e.column == column);
            match (position, next) {
                (Some(pos), Some(direction)) => self.sort.entries[pos].direction = direction,
                (Some(pos), None) => {
                    self.sort.entries.remove(pos);
                }
                (None, Some(direction)) => self.sort.entries.push(SortEntry {
                    column: column.to_string(),
                    direction,
                }),
                (None, None) => {}
            }
        } else {
            self.sort.entries = next
                .map(|direction| {
                    vec![SortEntry {
                        column: column.to_string(),
                        direction,
                    }]
                })
                .unwrap_or_default();
        }

        self.recompute();
        Ok(next)
    }

    pub fn clear_sort(&mut self) {
        self.sort = SortState::default();
        self.recompute();
    }

    fn check_sortable(&self, column: &str) -> Result<()> {
        let index = self.columns.index_of(column)?;
        match self.columns.get(index) {
            Some(definition) if definition.sortable => Ok(()),
            _ => Err(GridError::NotSortable(column.to_string())),
        }
    }

    // ---- pagination ----

    /// Out-of-range indices are clamped to the last page.
    pub fn set_page_index(&mut self, page_index: usize) {
        self.pagination.page_index = page_index;
        self.project();
    }

    /// Change the page size, keeping the first row of the current page on
    /// screen.
    pub fn set_page_size(&mut self, page_size: usize) -> Result<()> {
        if page_size == 0 {
            return Err(GridError::InvalidPageSize);
        }
        let top_row = self.pagination.page_index * self.pagination.page_size;
        self.pagination = Pagination {
            page_index: top_row / page_size,
            page_size,
        };
        self.project();
        Ok(())
    }

    pub fn next_page(&mut self) -> bool {
        if !self.view.has_next_page() {
            return false;
        }
        self.set_page_index(self.pagination.page_index + 1);
        true
    }

    pub fn previous_page(&mut self) -> bool {
        if !self.view.has_previous_page() {
            return false;
        }
        self.set_page_index(self.pagination.page_index - 1);
        true
    }

    // ---- columns ----

    pub fn set_visibility(&mut self, column: &str, visible: bool) -> Result<bool> {
        let applied = self.column_state.set_visibility(&self.columns, column, visible)?;
        self.project();
        Ok(applied)
    }

    pub fn set_all_visible(&mut self, visible: bool) {
        self.column_state.set_all_visible(&self.columns, visible);
        self.project();
    }

    pub fn set_order<S: AsRef<str>>(&mut self, order: &[S]) {
        self.column_state.set_order(&self.columns, order);
        self.project();
    }

    pub fn move_column(&mut self, column: &str, before: Option<&str>) -> Result<()> {
        self.column_state.move_column(&self.columns, column, before)?;
        self.project();
        Ok(())
    }

    pub fn set_width(&mut self, column: &str, width: f64) -> Result<f64> {
        let stored = self.column_state.set_width(&self.columns, column, width)?;
        self.project();
        Ok(stored)
    }

    pub fn reset_width(&mut self, column: &str) -> Result<f64> {
        let stored = self.column_state.reset_width(&self.columns, column)?;
        self.project();
        Ok(stored)
    }

    // ---- selection ----

    /// Returns whether the row is selected afterwards.
    pub fn toggle_selected(&mut self, row_id: &str) -> bool {
        let selected = self.selection.toggle(row_id);
        self.project();
        selected
    }

    pub fn select_all_on_page<I, S>(&mut self, row_ids: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for id in row_ids {
            self.selection.insert(id);
        }
        self.project();
    }

    /// Select every row of the current page.
    pub fn select_current_page(&mut self) {
        let ids: Vec<String> = self.view.page_rows.iter().map(|row| row.id.clone()).collect();
        self.select_all_on_page(ids);
    }

    pub fn deselect_rows<I, S>(&mut self, row_ids: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for id in row_ids {
            self.selection.remove(id.as_ref());
        }
        self.project();
    }

    pub fn clear_selection(&mut self) {
        self.selection.clear();
        self.project();
    }

    // ---- resets ----

    /// Back to the initial state: no filters, no sort, first page at the
    /// configured size, default columns, nothing selected. Rows, epoch and
    /// facet are kept.
    pub fn reset(&mut self) {
        self.filters = FilterState::default();
        self.sort = SortState::default();
        self.pagination = Pagination {
            page_index: 0,
            page_size: self.options.page_size,
        };
        self.column_state.reset(&self.columns);
        self.selection.clear();
        self.recompute();
    }

    pub fn reset_filters(&mut self) {
        self.clear_filters();
    }

    pub fn reset_columns(&mut self) {
        self.column_state.reset(&self.columns);
        self.project();
    }

    // ---- state ----

    pub fn state(&self) -> GridState {
        GridState {
            filters: self.filters.clone(),
            sort: self.sort.clone(),
            pagination: self.pagination,
            columns: self.column_state.snapshot(&self.columns),
            selection: self.selection.clone(),
        }
    }

    /// Apply a saved state. Entries that no longer fit the column set
    /// (unknown columns, wrong filter kind, unsortable columns) are dropped
    /// with a warning; a zero page size falls back to the configured one.
    pub fn restore(&mut self, state: GridState) {
        let GridState {
            filters,
            sort,
            pagination,
            columns,
            selection,
        } = state;

        self.filters = FilterState {
            global: filters.global,
            columns: filters
                .columns
                .into_iter()
                .filter(|(id, value)| {
                    let kind = self.columns.get_by_id(id).map(|c| c.filter_kind);
                    let keep = kind == Some(value.kind()) && !value.is_empty();
                    if !keep {
                        tracing::warn!(column = id.as_str(), "dropping saved filter");
                    }
                    keep
                })
                .collect(),
        };

        let mut seen = HashSet::new();
        self.sort = SortState {
            entries: sort
                .entries
                .into_iter()
                .filter(|entry| {
                    let keep = self.check_sortable(&entry.column).is_ok();
                    if !keep {
                        tracing::warn!(column = entry.column.as_str(), "dropping saved sort entry");
                    }
                    keep && seen.insert(entry.column.clone())
                })
                .collect(),
        };

        self.pagination = Pagination {
            page_index: pagination.page_index,
            page_size: if pagination.page_size == 0 {
                self.options.page_size
            } else {
                pagination.page_size
            },
        };
        self.column_state.restore(&self.columns, &columns);
        self.selection = selection;
        self.recompute();
    }

    // ---- facet options ----

    /// Distinct values of a column with their row counts, over the rows that
    /// pass every filter except the column's own. Sorted by value; rows
    /// without a text form are not counted.
    pub fn facet_values(&self, column: &str) -> Result<Vec<FacetOption>> {
        let definition = self.column(column)?;
        let facet = self.facet.as_deref();

        let mut counts: BTreeMap<String, usize> = BTreeMap::new();
        for row in self.rows_except(column) {
            if let Some(text) = display_text(&resolve(&definition.accessor, row, facet)) {
                *counts.entry(text).or_default() += 1;
            }
        }

        Ok(counts
            .into_iter()
            .map(|(value, count)| FacetOption { value, count })
            .collect())
    }

    /// Smallest and largest parsed value of a column over the rows that pass
    /// every filter except the column's own.
    pub fn facet_range(&self, column: &str) -> Result<Option<(f64, f64)>> {
        let definition = self.column(column)?;
        let facet = self.facet.as_deref();

        Ok(self
            .rows_except(column)
            .filter_map(|row| parse_currency(&resolve(&definition.accessor, row, facet)))
            .fold(None, |bounds, value| match bounds {
                None => Some((value, value)),
                Some((min, max)) => Some((f64::min(min, value), f64::max(max, value))),
            }))
    }

    fn column(&self, column: &str) -> Result<&ColumnDefinition> {
        self.columns
            .get_by_id(column)
            .ok_or_else(|| GridError::UnknownColumn(column.to_string()))
    }

    fn rows_except<'a>(&'a self, column: &'a str) -> impl Iterator<Item = &'a Row> + 'a {
        let compiled = CompiledFilters::new(&self.filters, &self.columns, Some(column));
        let facet = self.facet.as_deref();
        self.rows
            .iter()
            .filter(move |row| compiled.matches(row, facet))
    }

    // ---- reads ----

    pub fn view(&self) -> &GridView {
        &self.view
    }

    pub fn facet(&self) -> Option<&SimilarityFacet> {
        self.facet.as_deref()
    }

    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    pub fn columns(&self) -> &ColumnSet {
        &self.columns
    }

    pub fn rows(&self) -> &Arc<[Row]> {
        &self.rows
    }

    pub fn options(&self) -> &GridOptions {
        &self.options
    }

    pub fn selection(&self) -> &SelectionState {
        &self.selection
    }

    /// Selected rows present in the current row set, in input order.
    pub fn selected_rows(&self) -> Vec<&Row> {
        self.rows
            .iter()
            .filter(|row| self.selection.contains(&row.id))
            .collect()
    }

    /// Ids of every row that passes the filters, in sorted order.
    pub fn filtered_row_ids(&self) -> Vec<&str> {
        self.filtered
            .iter()
            .map(|&index| self.rows[index].id.as_str())
            .collect()
    }

    // ---- pipeline ----

    fn recompute(&mut self) {
        let facet = self.facet.as_deref();
        let compiled = CompiledFilters::new(&self.filters, &self.columns, None);

        let mut indices: Vec<usize> = (0..self.rows.len())
            .filter(|&index| compiled.matches_global(&self.rows[index]))
            .filter(|&index| compiled.matches_columns(&self.rows[index], facet))
            .collect();
        sort_indices(&mut indices, &self.rows, &self.sort, &self.columns, facet);

        self.filtered = indices;
        self.project();
    }

    /// Rebuild the view from the cached filtered indices.
    fn project(&mut self) {
        let filtered_count = self.filtered.len();
        let page_size = self.pagination.page_size;
        let page_count = filtered_count.div_ceil(page_size);

        let page_index = self.pagination.page_index.min(page_count.saturating_sub(1));
        if page_index != self.pagination.page_index {
            tracing::debug!(
                requested = self.pagination.page_index,
                clamped = page_index,
                "clamping page index"
            );
            self.pagination.page_index = page_index;
        }

        let start = (page_index * page_size).min(filtered_count);
        let end = (start + page_size).min(filtered_count);
        let page_rows: Vec<Row> = self.filtered[start..end]
            .iter()
            .map(|&index| self.rows[index].clone())
            .collect();

        let selected_on_page = page_rows
            .iter()
            .filter(|row| self.selection.contains(&row.id))
            .count();
        let page_selection = match selected_on_page {
            0 => PageSelection::None,
            n if n == page_rows.len() => PageSelection::All,
            _ => PageSelection::Partial,
        };
        let all_filtered_selected = !self.filtered.is_empty()
            && self
                .filtered
                .iter()
                .all(|&index| self.selection.contains(&self.rows[index].id));

        let columns = self.column_state.snapshot(&self.columns);
        let visible_columns = self
            .column_state
            .visible_order()
            .filter_map(|index| self.columns.get(index))
            .map(|column| column.id.clone())
            .collect();

        self.view = GridView {
            page_rows,
            total_count: self.rows.len(),
            filtered_count,
            selected_count: self.selection.len(),
            page_index,
            page_count,
            page_size,
            column_order: columns.order,
            column_visibility: columns.visibility,
            column_widths: columns.sizing,
            visible_columns,
            page_selection,
            all_filtered_selected,
            epoch: self.epoch,
            facet_ready: self.facet.is_some(),
        };

        tracing::debug!(
            total = self.view.total_count,
            filtered = filtered_count,
            page = page_index,
            pages = page_count,
            "grid view recomputed"
        );
    }
}
