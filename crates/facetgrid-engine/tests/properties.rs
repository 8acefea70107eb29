use facetgrid_engine::{GridEngine, GridOptions};
use facetgrid_testing::fixtures::{catalog_rows, numbered_rows, sample_columns};
use facetgrid_types::{FilterValue, PageSelection, SortEntry};

fn catalog() -> GridEngine {
    GridEngine::new(sample_columns(), catalog_rows(), GridOptions::default()).unwrap()
}

fn numbered(n: usize, page_size: usize) -> GridEngine {
    let options = GridOptions {
        page_size,
        ..GridOptions::default()
    };
    GridEngine::new(sample_columns(), numbered_rows(n), options).unwrap()
}

#[test]
fn test_adding_filters_never_grows_result() {
    let mut engine = catalog();
    let mut previous = engine.view().filtered_count;

    engine.set_global_filter("e");
    let steps: Vec<(&str, FilterValue)> = vec![
        ("material", FilterValue::one_of(["Silber", "Gold"])),
        ("price", FilterValue::range(10.0, 60.0)),
        ("brand", FilterValue::one_of(["Pandora", "Thomas Sabo"])),
        ("name", FilterValue::Text("kette".to_string())),
    ];

    for (column, filter) in steps {
        let before = engine.view().filtered_count;
        assert!(before <= previous);
        engine.set_column_filter(column, filter).unwrap();
        assert!(
            engine.view().filtered_count <= before,
            "filter on {column} grew the result"
        );
        previous = before;
    }
    assert_eq!(engine.view().page_ids(), vec!["1", "2"]);
}

#[test]
fn test_multi_select_ors_within_column() {
    let mut engine = catalog();
    engine
        .set_column_filter("material", FilterValue::one_of(["Gold", "Rosegold"]))
        .unwrap();
    assert_eq!(engine.view().page_ids(), vec!["2", "4", "6"]);
}

#[test]
fn test_equal_keys_keep_input_order() {
    let mut engine = catalog();
    engine.set_sort(vec![SortEntry::asc("brand")]).unwrap();
    assert_eq!(engine.view().page_ids(), vec!["1", "2", "5", "6", "3", "4"]);

    engine.set_sort(vec![SortEntry::desc("brand")]).unwrap();
    assert_eq!(engine.view().page_ids(), vec!["3", "4", "5", "6", "1", "2"]);
}

#[test]
fn test_empty_result_clamps_to_first_page() {
    let mut engine = numbered(25, 10);
    engine.set_page_index(2);
    assert_eq!(engine.view().page_index, 2);

    engine.set_global_filter("no such item");
    let view = engine.view();
    assert_eq!(view.filtered_count, 0);
    assert_eq!(view.total_count, 25);
    assert_eq!(view.page_index, 0);
    assert_eq!(view.page_count, 0);
    assert!(view.is_empty());

    engine.set_global_filter("");
    assert_eq!(engine.view().page_index, 0);
}

#[test]
fn test_shrinking_result_clamps_to_last_page() {
    let mut engine = numbered(25, 10);
    engine.set_page_index(2);
    engine
        .set_column_filter("price", FilterValue::range(1.0, 12.0))
        .unwrap();
    assert_eq!(engine.view().page_index, 1);
    assert_eq!(engine.view().page_ids(), vec!["11", "12"]);
}

#[test]
fn test_column_order_is_always_a_full_permutation() {
    let mut engine = catalog();
    engine.set_visibility("sku", false).unwrap();
    engine.set_visibility("material", false).unwrap();
    engine.move_column("compare", Some("name")).unwrap();
    engine.set_order(&["price", "bogus", "price"]);

    let view = engine.view();
    assert_eq!(
        view.column_order,
        vec!["price", "name", "sku", "brand", "material", "compare"]
    );
    assert_eq!(view.visible_columns, vec!["price", "name", "brand", "compare"]);
    assert_eq!(view.column_visibility.get("sku"), Some(&false));

    let mut sorted = view.column_order.clone();
    sorted.sort();
    let mut ids: Vec<String> = engine.columns().ids().map(str::to_string).collect();
    ids.sort();
    assert_eq!(sorted, ids);
}

#[test]
fn test_widths_clamp_and_reset() {
    let mut engine = catalog();
    assert_eq!(engine.set_width("price", 5.0).unwrap(), 80.0);
    assert_eq!(engine.view().column_widths["price"], 80.0);
    assert_eq!(engine.set_width("price", f64::NAN).unwrap(), 120.0);
    engine.set_width("name", 400.0).unwrap();
    engine.reset_columns();
    assert_eq!(engine.view().column_widths["name"], 150.0);
}

#[test]
fn test_select_all_filtered_across_pages() {
    let mut engine = numbered(12, 5);
    engine.select_current_page();
    assert_eq!(engine.view().page_selection, PageSelection::All);
    assert!(!engine.view().all_filtered_selected);

    let ids: Vec<String> = engine
        .filtered_row_ids()
        .into_iter()
        .map(str::to_string)
        .collect();
    engine.select_all_on_page(ids);
    assert!(engine.view().all_filtered_selected);
    assert_eq!(engine.view().selected_count, 12);

    engine.next_page();
    engine.deselect_rows(["7"]);
    assert_eq!(engine.view().page_selection, PageSelection::Partial);
    assert!(!engine.view().all_filtered_selected);
}
