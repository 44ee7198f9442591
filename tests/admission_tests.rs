mod support;

use chrono::{Duration, TimeZone, Utc};
use livebook::application::{AdmissionManager, AdmissionPolicy, PendingWrites};
use livebook::port::TimeRange;
use livebook::testkit::domain::{catalogue, event_id, events, market_id};
use livebook::testkit::exchange::{transient, ScriptedExchange};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use support::engine::policy;

#[tokio::test]
async fn discovery_queries_upcoming_soccer_events() {
    let exchange = ScriptedExchange::new();
    exchange.push_events(Ok(events(0..3)));
    let manager = AdmissionManager::new(AdmissionPolicy::default());
    let now = Utc.with_ymd_and_hms(2026, 3, 14, 13, 0, 0).unwrap();

    manager.discover(&exchange, now).await.unwrap();

    let filters = exchange.event_filters();
    assert_eq!(filters.len(), 1);
    assert_eq!(filters[0].event_type_ids, vec!["1".to_string()]);
    assert_eq!(filters[0].market_betting_types, vec!["ODDS".to_string()]);
    assert_eq!(filters[0].turn_in_play_enabled, Some(true));
    assert_eq!(filters[0].in_play_only, Some(false));
    assert_eq!(
        filters[0].market_start_time,
        Some(TimeRange::starting_at(now, Duration::minutes(120)))
    );

    let (catalogue_filter, max_results) = &exchange.catalogue_requests()[0];
    assert_eq!(catalogue_filter.market_type_codes, vec!["MATCH_ODDS".to_string()]);
    assert_eq!(catalogue_filter.event_ids.len(), 3);
    assert_eq!(*max_results, 100);
}

#[tokio::test]
async fn discovery_caps_event_ids_per_request() {
    let exchange = ScriptedExchange::new();
    exchange.push_events(Ok(events(0..45)));
    let manager = AdmissionManager::new(AdmissionPolicy::default());

    manager.discover(&exchange, Utc::now()).await.unwrap();

    let (filter, _) = &exchange.catalogue_requests()[0];
    assert_eq!(filter.event_ids.len(), 30);
    assert_eq!(filter.event_ids[0], event_id(0));
    assert_eq!(filter.event_ids[29], event_id(29));
}

#[tokio::test]
async fn no_events_means_no_catalogue_request() {
    let exchange = ScriptedExchange::new();
    exchange.push_events(Ok(Vec::new()));
    let manager = AdmissionManager::new(AdmissionPolicy::default());

    let candidates = manager.discover(&exchange, Utc::now()).await.unwrap();

    assert!(candidates.is_empty());
    assert!(exchange.catalogue_requests().is_empty());
}

#[tokio::test]
async fn discovery_failure_is_propagated() {
    let exchange = ScriptedExchange::new();
    exchange.push_events(Err(transient("timeout")));
    let manager = AdmissionManager::new(AdmissionPolicy::default());

    assert!(manager.discover(&exchange, Utc::now()).await.is_err());
}

#[tokio::test]
async fn discovered_markets_fill_slots_by_volume() {
    let exchange = ScriptedExchange::new();
    exchange.push_events(Ok(events(0..15)));
    exchange.push_catalogues(Ok((0..15)
        .map(|n| catalogue(n, Decimal::from(1000 + n * 100)))
        .collect()));
    let mut manager = AdmissionManager::new(policy(10));
    let mut pending = PendingWrites::default();

    let candidates = manager.discover(&exchange, Utc::now()).await.unwrap();
    let admitted = manager.admit(candidates, &mut pending);

    assert_eq!(admitted, 10);
    assert_eq!(manager.available(), 0);
    // The five lowest-volume markets lose out.
    for n in 0..5 {
        assert!(!manager.is_tracked(&market_id(n)));
    }
    for n in 5..15 {
        assert!(manager.is_tracked(&market_id(n)));
    }
    // Every considered event is blacklisted, admitted or not.
    assert_eq!(manager.blacklist().len(), 15);
}

#[tokio::test]
async fn low_volume_markets_are_never_admitted() {
    let exchange = ScriptedExchange::new();
    exchange.push_events(Ok(events(0..3)));
    exchange.push_catalogues(Ok(vec![
        catalogue(1, dec!(100)),
        catalogue(2, dec!(100.01)),
        catalogue(3, dec!(5)),
    ]));
    let mut manager = AdmissionManager::new(AdmissionPolicy::default());
    let mut pending = PendingWrites::default();

    let candidates = manager.discover(&exchange, Utc::now()).await.unwrap();
    manager.admit(candidates, &mut pending);

    assert_eq!(manager.tracked_ids(), vec![market_id(2)]);
    assert_eq!(pending.open().market_info.len(), 1);
}
