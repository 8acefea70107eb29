use facetgrid_runtime::{GridConfig, GridSession};
use facetgrid_testing::fixtures::{catalog_rows, sample_columns, scenario_rows};
use facetgrid_types::SortEntry;
use std::time::Duration;

fn start() -> GridSession {
    GridSession::start(sample_columns(), scenario_rows(), &GridConfig::default())
        .expect("sample columns are valid")
}

#[tokio::test]
async fn test_facet_installed_in_background() {
    let session = start();

    let epoch = session.facet_settled().await.unwrap();
    assert_eq!(epoch, 1);

    let view = session.view();
    assert!(view.facet_ready);
    assert_eq!(view.epoch, 1);

    session
        .with_engine(|engine| engine.set_sort(vec![SortEntry::asc("compare")]))
        .unwrap();
    assert_eq!(session.view().page_ids(), vec!["3", "1", "2"]);

    session.shutdown().await;
}

#[tokio::test]
async fn test_replacing_rows_recomputes_facet() {
    let session = start();
    session.facet_settled().await.unwrap();

    let epoch = session.replace_rows(catalog_rows());
    assert_eq!(epoch, 2);
    assert!(!session.view().facet_ready);

    assert_eq!(session.facet_settled().await.unwrap(), 2);
    let counts = session.with_engine(|engine| engine.facet().map(|f| f.counts.clone()));
    let counts = counts.expect("facet for epoch 2");
    assert_eq!(counts.len(), 6);
    assert_eq!(counts["1"], 1);
    assert_eq!(counts["3"], 0);

    session.shutdown().await;
}

#[tokio::test]
async fn test_rows_set_through_engine_get_a_facet() {
    let session = start();
    session.facet_settled().await.unwrap();

    assert!(session.with_engine(|engine| engine.set_rows(catalog_rows())));
    assert_eq!(session.facet_settled().await.unwrap(), 2);

    let view = session.view();
    assert!(view.facet_ready);
    let counts = session.with_engine(|engine| engine.facet().map(|f| f.counts.len()));
    assert_eq!(counts, Some(6));

    session.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn test_search_is_debounced() {
    let session = start();

    session.search("hals").unwrap();
    session.search("geo gold").unwrap();
    assert_eq!(session.view().filtered_count, 3);

    tokio::time::sleep(Duration::from_millis(400)).await;
    assert_eq!(session.view().page_ids(), vec!["2"]);

    session.search("").unwrap();
    session.shutdown().await;
}

#[tokio::test]
async fn test_invalid_config_rejected() {
    let config = GridConfig {
        page_size: 0,
        ..GridConfig::default()
    };
    assert!(GridSession::start(sample_columns(), scenario_rows(), &config).is_err());
}
