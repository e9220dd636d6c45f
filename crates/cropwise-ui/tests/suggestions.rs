//! Debounce and latest-wins behaviour of the suggestion fetcher.
//! Time is paused, so sleeps and scripted delays are deterministic.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

mod common;

use std::sync::Arc;

use common::{connection_refused, ms, suggestion, FakeApi};
use cropwise_core::FetchTag;
use cropwise_ui::SuggestionFetcher;
use tokio::runtime::Handle;

fn fetcher(api: &Arc<FakeApi>) -> SuggestionFetcher {
    SuggestionFetcher::new(api.clone(), Handle::current(), ms(250))
}

fn labels(fetcher: &SuggestionFetcher) -> Vec<&str> {
    fetcher
        .suggestions()
        .iter()
        .map(|s| s.label.as_str())
        .collect()
}

#[tokio::test(start_paused = true)]
async fn test_only_last_stable_query_is_dispatched() {
    let api = Arc::new(FakeApi::new());
    api.on_lookup(
        "Lanc",
        ms(20),
        Ok(vec![suggestion("Lancaster, Pennsylvania, US", 40.04, -76.31)]),
    );
    let mut fetcher = fetcher(&api);

    for text in ["L", "La", "Lan", "Lanc"] {
        fetcher.input(text);
        tokio::time::sleep(ms(100)).await;
        fetcher.try_process();
    }
    assert!(api.calls().is_empty(), "No lookup before the input is quiet");

    fetcher.settle().await;

    assert_eq!(api.lookup_queries(), vec!["Lanc"]);
    assert_eq!(fetcher.last_dispatched(), Some("Lanc"));
    assert_eq!(labels(&fetcher), vec!["Lancaster, Pennsylvania, US"]);
    assert_eq!(fetcher.state_tag(), FetchTag::Ready);
}

#[tokio::test(start_paused = true)]
async fn test_dispatched_query_is_trimmed() {
    let api = Arc::new(FakeApi::new());
    api.on_lookup("Berlin", ms(5), Ok(vec![suggestion("Berlin, DE", 52.52, 13.405)]));
    let mut fetcher = fetcher(&api);

    fetcher.input("  Berlin ");
    fetcher.settle().await;

    assert_eq!(fetcher.query(), "  Berlin ");
    assert_eq!(api.lookup_queries(), vec!["Berlin"]);
    assert_eq!(labels(&fetcher), vec!["Berlin, DE"]);
}

#[tokio::test(start_paused = true)]
async fn test_whitespace_clears_without_network() {
    let api = Arc::new(FakeApi::new());
    let mut fetcher = fetcher(&api);

    fetcher.input("   ");
    assert!(fetcher.suggestions().is_empty());
    assert!(!fetcher.is_pending());

    tokio::time::sleep(ms(1_000)).await;
    fetcher.try_process();
    assert!(api.calls().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_clearing_empties_list_synchronously() {
    let api = Arc::new(FakeApi::new());
    api.on_lookup("Ber", ms(5), Ok(vec![suggestion("Berlin, DE", 52.52, 13.405)]));
    let mut fetcher = fetcher(&api);

    fetcher.input("Ber");
    fetcher.settle().await;
    assert_eq!(labels(&fetcher), vec!["Berlin, DE"]);

    fetcher.input("");
    assert!(fetcher.suggestions().is_empty());
    assert_eq!(fetcher.state_tag(), FetchTag::Ready);
    assert_eq!(api.calls().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_superseded_response_arriving_late_is_discarded() {
    let api = Arc::new(FakeApi::new());
    api.on_lookup("Spring", ms(500), Ok(vec![suggestion("Spring, TX", 30.08, -95.42)]));
    api.on_lookup(
        "Springfield",
        ms(10),
        Ok(vec![suggestion("Springfield, IL", 39.78, -89.65)]),
    );
    let mut fetcher = fetcher(&api);

    fetcher.input("Spring");
    // Quiet interval elapses; "Spring" is dispatched.
    fetcher.process_next().await;
    assert_eq!(fetcher.last_dispatched(), Some("Spring"));

    fetcher.input("Springfield");
    fetcher.settle().await;
    assert_eq!(labels(&fetcher), vec!["Springfield, IL"]);

    tokio::time::sleep(ms(1_000)).await;
    fetcher.try_process();

    assert_eq!(api.lookup_queries(), vec!["Spring", "Springfield"]);
    assert_eq!(labels(&fetcher), vec!["Springfield, IL"]);
}

#[tokio::test(start_paused = true)]
async fn test_superseded_response_arriving_early_is_discarded() {
    let api = Arc::new(FakeApi::new());
    api.on_lookup("Spring", ms(50), Ok(vec![suggestion("Spring, TX", 30.08, -95.42)]));
    api.on_lookup(
        "Springfield",
        ms(10),
        Ok(vec![suggestion("Springfield, IL", 39.78, -89.65)]),
    );
    let mut fetcher = fetcher(&api);

    fetcher.input("Spring");
    fetcher.process_next().await;
    fetcher.input("Springfield");

    // "Spring" answers while "Springfield" is still waiting for quiet.
    tokio::time::sleep(ms(100)).await;
    assert!(!fetcher.try_process());
    assert!(fetcher.suggestions().is_empty());
    assert_eq!(fetcher.state_tag(), FetchTag::Loading);

    fetcher.settle().await;
    assert_eq!(labels(&fetcher), vec!["Springfield, IL"]);
}

#[tokio::test(start_paused = true)]
async fn test_clearing_discards_in_flight_lookup() {
    let api = Arc::new(FakeApi::new());
    api.on_lookup("Paris", ms(500), Ok(vec![suggestion("Paris, FR", 48.85, 2.35)]));
    let mut fetcher = fetcher(&api);

    fetcher.input("Paris");
    fetcher.process_next().await;
    fetcher.input(" ");

    tokio::time::sleep(ms(1_000)).await;
    fetcher.try_process();

    assert_eq!(api.lookup_queries(), vec!["Paris"]);
    assert!(fetcher.suggestions().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_previous_list_visible_while_pending() {
    let api = Arc::new(FakeApi::new());
    api.on_lookup("Ber", ms(5), Ok(vec![suggestion("Berlin, DE", 52.52, 13.405)]));
    api.on_lookup("Bern", ms(5), Ok(vec![suggestion("Bern, CH", 46.95, 7.45)]));
    let mut fetcher = fetcher(&api);

    fetcher.input("Ber");
    fetcher.settle().await;

    fetcher.input("Bern");
    assert_eq!(fetcher.state_tag(), FetchTag::Loading);
    assert_eq!(labels(&fetcher), vec!["Berlin, DE"]);

    fetcher.settle().await;
    assert_eq!(labels(&fetcher), vec!["Bern, CH"]);
}

#[tokio::test(start_paused = true)]
async fn test_lookup_failure_yields_empty_list() {
    let api = Arc::new(FakeApi::new());
    api.on_lookup("Atlantis", ms(5), Err(connection_refused()));
    let mut fetcher = fetcher(&api);

    fetcher.input("Atlantis");
    fetcher.settle().await;

    assert!(fetcher.suggestions().is_empty());
    assert_eq!(fetcher.state_tag(), FetchTag::Ready);
}

#[tokio::test(start_paused = true)]
async fn test_select_by_label() {
    let api = Arc::new(FakeApi::new());
    api.on_lookup(
        "Lancaster",
        ms(5),
        Ok(vec![
            suggestion("Lancaster, Pennsylvania, US", 40.04, -76.31),
            suggestion("Lancaster, England, GB", 54.05, -2.8),
        ]),
    );
    let mut fetcher = fetcher(&api);

    fetcher.input("Lancaster");
    fetcher.settle().await;

    let chosen = fetcher.select("Lancaster, England, GB").unwrap();
    assert_eq!(chosen.lat, 54.05);
    assert!(fetcher.select("Lancaster, CA").is_none());
}
