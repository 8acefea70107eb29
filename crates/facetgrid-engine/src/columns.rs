use facetgrid_types::{ColumnDefinition, ColumnViewState, GridError, Result};
use std::collections::{BTreeMap, HashMap, HashSet};

/// Validated, immutable column definitions addressed by index.
#[derive(Debug, Clone)]
pub struct ColumnSet {
    columns: Vec<ColumnDefinition>,
    by_id: HashMap<String, usize>,
}

impl ColumnSet {
    /// Fails on the first structural defect: empty or duplicate id, or width
    /// bounds that do not contain the default width.
    pub fn new(columns: Vec<ColumnDefinition>) -> Result<Self> {
        let mut by_id = HashMap::with_capacity(columns.len());
        for (index, column) in columns.iter().enumerate() {
            column.validate()?;
            if by_id.insert(column.id.clone(), index).is_some() {
                return Err(GridError::DuplicateColumn(column.id.clone()));
            }
        }
        Ok(Self { columns, by_id })
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&ColumnDefinition> {
        self.columns.get(index)
    }

    pub fn get_by_id(&self, id: &str) -> Option<&ColumnDefinition> {
        self.by_id.get(id).map(|&index| &self.columns[index])
    }

    pub fn index_of(&self, id: &str) -> Result<usize> {
        self.by_id
            .get(id)
            .copied()
            .ok_or_else(|| GridError::UnknownColumn(id.to_string()))
    }

    pub fn iter(&self) -> impl Iterator<Item = &ColumnDefinition> {
        self.columns.iter()
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|column| column.id.as_str())
    }
}

/// Visibility, order and width, stored per column index.
///
/// `order` is a permutation of `0..columns.len()`; reordering splices that
/// index array and never touches the definitions.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnStateManager {
    order: Vec<usize>,
    visible: Vec<bool>,
    widths: Vec<f64>,
}

impl ColumnStateManager {
    pub fn new(columns: &ColumnSet) -> Self {
        Self {
            order: (0..columns.len()).collect(),
            visible: vec![true; columns.len()],
            widths: columns.iter().map(|column| column.default_width).collect(),
        }
    }

    pub fn reset(&mut self, columns: &ColumnSet) {
        *self = Self::new(columns);
    }

    /// Returns whether the column ends up in the requested state. Hiding a
    /// non-hideable column is refused.
    pub fn set_visibility(&mut self, columns: &ColumnSet, id: &str, visible: bool) -> Result<bool> {
        let index = columns.index_of(id)?;
        if !visible && !columns.columns[index].hideable {
            tracing::warn!(column = id, "ignoring request to hide a non-hideable column");
            return Ok(false);
        }
        self.visible[index] = visible;
        Ok(true)
    }

    pub fn is_visible(&self, index: usize) -> bool {
        self.visible.get(index).copied().unwrap_or(false)
    }

    /// Show every column, or hide every hideable one.
    pub fn set_all_visible(&mut self, columns: &ColumnSet, visible: bool) {
        for (index, column) in columns.iter().enumerate() {
            self.visible[index] = visible || !column.hideable;
        }
    }

    /// Replace the order. Unknown and repeated ids are dropped; columns the
    /// permutation leaves out are appended in definition order.
    pub fn set_order<S: AsRef<str>>(&mut self, columns: &ColumnSet, ids: &[S]) {
        let mut seen = HashSet::with_capacity(columns.len());
        let mut order = Vec::with_capacity(columns.len());

        for id in ids {
            match columns.index_of(id.as_ref()) {
                Ok(index) => {
                    if seen.insert(index) {
                        order.push(index);
                    }
                }
                Err(_) => {
                    tracing::warn!(column = id.as_ref(), "dropping unknown column from order");
                }
            }
        }
        order.extend((0..columns.len()).filter(|index| !seen.contains(index)));

        self.order = order;
    }

    /// Move `id` in front of `before`, or to the end when `before` is
    /// `None`.
    pub fn move_column(&mut self, columns: &ColumnSet, id: &str, before: Option<&str>) -> Result<()> {
        let moving = columns.index_of(id)?;
        let anchor = before.map(|before| columns.index_of(before)).transpose()?;
        if anchor == Some(moving) {
            return Ok(());
        }

        let from = self.position(moving);
        self.order.remove(from);
        let to = match anchor {
            Some(anchor) => self.position(anchor),
            None => self.order.len(),
        };
        self.order.insert(to, moving);
        Ok(())
    }

    fn position(&self, index: usize) -> usize {
        self.order
            .iter()
            .position(|&candidate| candidate == index)
            .unwrap_or(self.order.len())
    }

    /// Clamp to the column's bounds and store; returns the stored width.
    pub fn set_width(&mut self, columns: &ColumnSet, id: &str, width: f64) -> Result<f64> {
        let index = columns.index_of(id)?;
        let clamped = columns.columns[index].clamp_width(width);
        self.widths[index] = clamped;
        Ok(clamped)
    }

    pub fn reset_width(&mut self, columns: &ColumnSet, id: &str) -> Result<f64> {
        let index = columns.index_of(id)?;
        self.widths[index] = columns.columns[index].default_width;
        Ok(self.widths[index])
    }

    pub fn width(&self, index: usize) -> Option<f64> {
        self.widths.get(index).copied()
    }

    pub fn order(&self) -> &[usize] {
        &self.order
    }

    /// Visible column indices in display order.
    pub fn visible_order(&self) -> impl Iterator<Item = usize> + '_ {
        self.order.iter().copied().filter(|&index| self.visible[index])
    }

    pub fn snapshot(&self, columns: &ColumnSet) -> ColumnViewState {
        let id = |index: usize| columns.columns[index].id.clone();
        ColumnViewState {
            visibility: (0..columns.len())
                .map(|index| (id(index), self.visible[index]))
                .collect::<BTreeMap<_, _>>(),
            order: self.order.iter().map(|&index| id(index)).collect(),
            sizing: (0..columns.len())
                .map(|index| (id(index), self.widths[index]))
                .collect::<BTreeMap<_, _>>(),
        }
    }

    /// Apply a previously captured state. Unknown ids are ignored, widths
    /// are clamped, and the order is normalized like [`set_order`](Self::set_order).
    pub fn restore(&mut self, columns: &ColumnSet, state: &ColumnViewState) {
        self.reset(columns);
        for (id, &visible) in &state.visibility {
            let _ = self.set_visibility(columns, id, visible);
        }
        for (id, &width) in &state.sizing {
            let _ = self.set_width(columns, id, width);
        }
        if !state.order.is_empty() {
            self.set_order(columns, &state.order);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn columns() -> ColumnSet {
        ColumnSet::new(vec![
            ColumnDefinition::field("name").hideable(false),
            ColumnDefinition::field("sku"),
            ColumnDefinition::field("price").width(120.0, 80.0, 240.0),
            ColumnDefinition::field("brand"),
        ])
        .unwrap()
    }

    fn order_ids(manager: &ColumnStateManager, columns: &ColumnSet) -> Vec<String> {
        manager.snapshot(columns).order
    }

    #[test]
    fn test_duplicate_column_rejected() {
        let err = ColumnSet::new(vec![
            ColumnDefinition::field("sku"),
            ColumnDefinition::field("sku"),
        ])
        .unwrap_err();
        assert_eq!(err, GridError::DuplicateColumn("sku".to_string()));
    }

    #[test]
    fn test_hidden_columns_stay_in_order() {
        let columns = columns();
        let mut manager = ColumnStateManager::new(&columns);
        assert!(manager.set_visibility(&columns, "sku", false).unwrap());

        assert_eq!(order_ids(&manager, &columns), vec!["name", "sku", "price", "brand"]);
        assert_eq!(manager.visible_order().collect::<Vec<_>>(), vec![0, 2, 3]);
    }

    #[test]
    fn test_non_hideable_column_cannot_be_hidden() {
        let columns = columns();
        let mut manager = ColumnStateManager::new(&columns);
        assert!(!manager.set_visibility(&columns, "name", false).unwrap());
        assert!(manager.is_visible(0));

        manager.set_all_visible(&columns, false);
        assert_eq!(manager.visible_order().collect::<Vec<_>>(), vec![0]);
    }

    #[test]
    fn test_unknown_column() {
        let columns = columns();
        let mut manager = ColumnStateManager::new(&columns);
        assert_eq!(
            manager.set_width(&columns, "ean", 10.0),
            Err(GridError::UnknownColumn("ean".to_string()))
        );
    }

    #[test]
    fn test_set_order_normalizes() {
        let columns = columns();
        let mut manager = ColumnStateManager::new(&columns);
        manager.set_order(&columns, &["price", "ean", "price", "name"]);
        assert_eq!(order_ids(&manager, &columns), vec!["price", "name", "sku", "brand"]);
    }

    #[test]
    fn test_move_column_before_anchor() {
        let columns = columns();
        let mut manager = ColumnStateManager::new(&columns);

        manager.move_column(&columns, "brand", Some("sku")).unwrap();
        assert_eq!(order_ids(&manager, &columns), vec!["name", "brand", "sku", "price"]);

        manager.move_column(&columns, "name", Some("price")).unwrap();
        assert_eq!(order_ids(&manager, &columns), vec!["brand", "sku", "name", "price"]);

        manager.move_column(&columns, "brand", None).unwrap();
        assert_eq!(order_ids(&manager, &columns), vec!["sku", "name", "price", "brand"]);

        manager.move_column(&columns, "sku", Some("sku")).unwrap();
        assert_eq!(order_ids(&manager, &columns), vec!["sku", "name", "price", "brand"]);
    }

    #[test]
    fn test_width_is_clamped() {
        let columns = columns();
        let mut manager = ColumnStateManager::new(&columns);
        assert_eq!(manager.set_width(&columns, "price", 10.0).unwrap(), 80.0);
        assert_eq!(manager.set_width(&columns, "price", 999.0).unwrap(), 240.0);
        assert_eq!(manager.set_width(&columns, "price", 200.0).unwrap(), 200.0);
        assert_eq!(manager.reset_width(&columns, "price").unwrap(), 120.0);
    }

    #[test]
    fn test_snapshot_restore() {
        let columns = columns();
        let mut manager = ColumnStateManager::new(&columns);
        manager.set_visibility(&columns, "brand", false).unwrap();
        manager.set_width(&columns, "sku", 300.0).unwrap();
        manager.move_column(&columns, "price", Some("name")).unwrap();

        let snapshot = manager.snapshot(&columns);
        let mut restored = ColumnStateManager::new(&columns);
        restored.restore(&columns, &snapshot);
        assert_eq!(restored, manager);
    }
}
