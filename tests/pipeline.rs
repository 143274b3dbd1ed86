// tests/pipeline.rs
mod common;

use std::sync::{Arc, Mutex};

use common::FakeSource;
use rust_decimal_macros::dec;

use fipe_history::models::{ReferencePeriod, VehicleQuery};
use fipe_history::services::cache::CachedSource;
use fipe_history::services::drilldown::{
    collect_prices, price_history, resolve_vehicle, ModelMatching, DEFAULT_HISTORY_MONTHS,
};
use fipe_history::services::resolver::DEFAULT_SIMILARITY_CUTOFF;
use fipe_history::services::source::{CatalogSource, VehicleCodes};
use fipe_history::FipeError;

fn corolla() -> VehicleQuery {
    VehicleQuery::new("toyota", "corolla", "2012")
}

#[tokio::test]
async fn resolves_first_substring_match() {
    let source = FakeSource::toyota();
    let vehicle = resolve_vehicle(&source, &corolla(), ModelMatching::Substring)
        .await
        .unwrap();

    assert_eq!(vehicle.brand.code, "56");
    assert_eq!(vehicle.model.code, "4827");
    assert_eq!(vehicle.year.code, "2012-1");
    assert_eq!(source.calls(), vec!["brands", "models 56", "years 56 4827"]);
}

#[tokio::test]
async fn approximate_matching_picks_closest_model() {
    let source = FakeSource::toyota();
    let query = VehicleQuery::new("Toyota", "Corolla XEi 2.0 Flex", "2012");
    let vehicle = resolve_vehicle(
        &source,
        &query,
        ModelMatching::Approximate { cutoff: DEFAULT_SIMILARITY_CUTOFF },
    )
    .await
    .unwrap();

    assert_eq!(vehicle.model.name, "Corolla XEi 2.0 Flex 16V Aut.");
}

#[tokio::test]
async fn missing_brand_short_circuits() {
    let source = FakeSource::toyota();
    let query = VehicleQuery::new("Ferrari", "corolla", "2012");
    let err = price_history(&source, &query, DEFAULT_HISTORY_MONTHS, ModelMatching::Substring)
        .await
        .unwrap_err();

    assert!(matches!(err, FipeError::BrandNotFound(ref b) if b == "Ferrari"));
    assert_eq!(source.calls(), vec!["brands"]);
}

#[tokio::test]
async fn upstream_error_aborts_pipeline() {
    let source = FakeSource {
        fail_brands: true,
        ..FakeSource::toyota()
    };
    let err = price_history(&source, &corolla(), DEFAULT_HISTORY_MONTHS, ModelMatching::Substring)
        .await
        .unwrap_err();

    assert!(matches!(err, FipeError::Status { status: 503, .. }));
    assert_eq!(source.count("models"), 0);
    assert_eq!(source.count("years"), 0);
    assert_eq!(source.count("price"), 0);
}

#[tokio::test]
async fn missing_model_or_year_stops_before_prices() {
    let source = FakeSource::toyota();
    let err = price_history(
        &source,
        &VehicleQuery::new("toyota", "hilux", "2012"),
        DEFAULT_HISTORY_MONTHS,
        ModelMatching::Substring,
    )
    .await
    .unwrap_err();
    assert!(matches!(err, FipeError::ModelNotFound(_)));
    assert_eq!(source.count("years"), 0);

    let source = FakeSource::toyota();
    let err = price_history(
        &source,
        &VehicleQuery::new("toyota", "corolla", "1999"),
        DEFAULT_HISTORY_MONTHS,
        ModelMatching::Substring,
    )
    .await
    .unwrap_err();
    assert!(matches!(err, FipeError::YearNotFound(_)));
    assert_eq!(source.count("references"), 0);
    assert_eq!(source.count("price"), 0);
}

#[tokio::test]
async fn builds_history_over_window_plus_seed() {
    let source = FakeSource::toyota();
    let found = price_history(&source, &corolla(), 3, ModelMatching::Substring)
        .await
        .unwrap();

    // Newest four references: 306..=303, priced 160..=130.
    assert_eq!(source.count("price"), 4);
    assert_eq!(found.history.seed.reference, 303);
    let refs: Vec<u32> = found.history.changes.iter().map(|c| c.reference).collect();
    assert_eq!(refs, vec![304, 305, 306]);
    assert_eq!(found.history.deltas(), vec![dec!(10), dec!(10), dec!(10)]);
    assert_eq!(found.history.current_price, dec!(160));
    assert_eq!(found.history.cumulative_change, dec!(30));
}

#[tokio::test]
async fn skips_missing_and_malformed_prices() {
    let mut source = FakeSource::toyota();
    source.prices.remove(&305);
    source.prices.insert(304, "sob consulta".into());

    let codes = VehicleCodes {
        brand: "56".into(),
        model: "4827".into(),
        year: "2012-1".into(),
    };
    let points = collect_prices(&source, &codes, 3).await.unwrap();
    let refs: Vec<u32> = points.iter().map(|p| p.reference).collect();
    assert_eq!(refs, vec![306, 303]);
    assert_eq!(points[0].price, dec!(160));
}

#[tokio::test]
async fn single_price_is_insufficient() {
    let mut source = FakeSource::toyota();
    source.prices.retain(|code, _| *code == 306);

    let err = price_history(&source, &corolla(), DEFAULT_HISTORY_MONTHS, ModelMatching::Substring)
        .await
        .unwrap_err();
    assert!(matches!(err, FipeError::InsufficientData { points: 1 }));
}

#[tokio::test]
async fn no_references_is_reported() {
    let mut source = FakeSource::toyota();
    source.references.clear();

    let err = price_history(&source, &corolla(), DEFAULT_HISTORY_MONTHS, ModelMatching::Substring)
        .await
        .unwrap_err();
    assert!(matches!(err, FipeError::NoReferences));
    assert!(err.is_not_found());
}

#[tokio::test]
async fn cached_source_answers_repeat_calls_from_memory() {
    let cached = Arc::new(CachedSource::new(FakeSource::toyota()));

    for _ in 0..2 {
        price_history(cached.as_ref(), &corolla(), 2, ModelMatching::Substring)
            .await
            .unwrap();
    }

    let inner = cached.inner();
    assert_eq!(inner.count("brands"), 1);
    assert_eq!(inner.count("models"), 1);
    assert_eq!(inner.count("years"), 1);
    assert_eq!(inner.count("references"), 1);
    assert_eq!(inner.count("price"), 3);
}

#[tokio::test]
async fn cached_source_does_not_remember_errors() {
    let cached = CachedSource::new(FakeSource {
        fail_brands: true,
        ..FakeSource::toyota()
    });

    assert!(cached.brands().await.is_err());
    assert!(cached.brands().await.is_err());
    assert_eq!(cached.inner().count("brands"), 2);
}

#[tokio::test]
async fn cached_source_asks_again_for_missing_prices() {
    let cached = CachedSource::new(FakeSource {
        blank_prices: Mutex::new(1),
        ..FakeSource::toyota()
    });
    let vehicle = VehicleCodes {
        brand: "56".into(),
        model: "4828".into(),
        year: "2012-1".into(),
    };
    let reference = ReferencePeriod::new(306, "month 306");

    assert_eq!(cached.price(&vehicle, &reference).await.unwrap(), None);
    assert_eq!(
        cached.price(&vehicle, &reference).await.unwrap(),
        Some("R$ 160,00".to_string())
    );
    assert_eq!(
        cached.price(&vehicle, &reference).await.unwrap(),
        Some("R$ 160,00".to_string())
    );
    assert_eq!(cached.inner().count("price"), 2);
}
