mod common;

use chrono::{Duration, Utc};
use rust_decimal::Decimal;

use polyledger::db::{alert_repo, position_repo, trade_repo, trader_repo};
use polyledger::ingestion::{apply_trade, ApplyOutcome};

const MAX_ATTEMPTS: u32 = 3;

#[tokio::test]
async fn test_apply_trade_creates_position_and_stats() {
    let pool = common::setup_test_db().await;

    let trade = common::make_trade("t-create-1", "0xALICE", "mkt-create", "Yes", 5_000, "0.40");
    let outcome = apply_trade(&pool, &trade, MAX_ATTEMPTS)
        .await
        .expect("apply should succeed");

    let ApplyOutcome::Applied(applied) = outcome else {
        panic!("first application must not be a duplicate");
    };

    assert_eq!(applied.position.shares, Decimal::from(12_500));
    assert_eq!(applied.position.avg_price, Decimal::new(40, 2));
    assert_eq!(applied.position.status, "open");
    assert!(applied.position.realized_pnl.is_none());

    let stat = trader_repo::get_by_address(&pool, "0xALICE")
        .await
        .expect("query should succeed")
        .expect("stat row should exist");
    assert_eq!(stat.total_bets, 1);
    assert_eq!(stat.total_volume, Decimal::from(5_000));
    assert!(stat.last_activity_at.is_some());

    let fact = trade_repo::get_by_external_id(&pool, "t-create-1")
        .await
        .expect("query should succeed")
        .expect("trade fact should exist");
    assert_eq!(fact.market_id, "mkt-create");
}

#[tokio::test]
async fn test_duplicate_trade_is_noop() {
    let pool = common::setup_test_db().await;

    let trade = common::make_trade("t-dup-1", "0xBOB", "mkt-dup", "Yes", 2_000, "0.50");

    let first = apply_trade(&pool, &trade, MAX_ATTEMPTS).await.unwrap();
    assert!(matches!(first, ApplyOutcome::Applied(_)));

    let second = apply_trade(&pool, &trade, MAX_ATTEMPTS).await.unwrap();
    let ApplyOutcome::Duplicate { prior } = second else {
        panic!("same external id must be a duplicate");
    };
    assert_eq!(prior.expect("prior fact returned").external_id, "t-dup-1");

    // Ledger state is identical to a single application.
    let positions = position_repo::get_by_trader(&pool, "0xBOB").await.unwrap();
    assert_eq!(positions.len(), 1);
    assert_eq!(positions[0].shares, Decimal::from(4_000));
    assert_eq!(positions[0].avg_price, Decimal::new(50, 2));

    let stat = trader_repo::get_by_address(&pool, "0xBOB")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stat.total_bets, 1);
    assert_eq!(stat.total_volume, Decimal::from(2_000));
}

#[tokio::test]
async fn test_weighted_average_accumulation() {
    let pool = common::setup_test_db().await;

    // 5000 @ 0.40 then 3000 @ 0.60 on the same outcome.
    let t1 = common::make_trade("t-wac-1", "0xCAROL", "mkt-wac", "Yes", 5_000, "0.40");
    let t2 = common::make_trade("t-wac-2", "0xCAROL", "mkt-wac", "Yes", 3_000, "0.60");

    apply_trade(&pool, &t1, MAX_ATTEMPTS).await.unwrap();
    let out = apply_trade(&pool, &t2, MAX_ATTEMPTS).await.unwrap();

    let ApplyOutcome::Applied(applied) = out else {
        panic!("second fill is not a duplicate");
    };

    assert_eq!(applied.position.shares, Decimal::from(17_500));
    // (12500·0.40 + 5000·0.60) / 17500 = 8000/17500
    let expected = Decimal::from(8_000) / Decimal::from(17_500);
    let diff = (applied.position.avg_price - expected).abs();
    assert!(
        diff < Decimal::new(1, 10),
        "avg_price {} != {}",
        applied.position.avg_price,
        expected
    );

    // Still one open position for the key.
    let positions = position_repo::get_by_trader(&pool, "0xCAROL").await.unwrap();
    assert_eq!(positions.len(), 1);
}

#[tokio::test]
async fn test_mega_whale_alert_emitted_exactly_once() {
    let pool = common::setup_test_db().await;

    let trade = common::make_trade("t-mega-1", "0xDAVE", "mkt-mega", "Yes", 50_000, "0.50");

    let out = apply_trade(&pool, &trade, MAX_ATTEMPTS).await.unwrap();
    let ApplyOutcome::Applied(applied) = out else {
        panic!("not a duplicate");
    };
    let alert = applied.alert.expect("50k notional must alert");
    assert_eq!(alert.kind, "mega_whale");
    assert_eq!(alert.trade_id, "t-mega-1");
    assert_eq!(alert.amount, Decimal::from(50_000));

    // Resubmitting the identical trade produces zero additional alerts.
    apply_trade(&pool, &trade, MAX_ATTEMPTS).await.unwrap();

    let alerts = alert_repo::get_by_trade_id(&pool, "t-mega-1").await.unwrap();
    assert_eq!(alerts.len(), 1);
}

#[tokio::test]
async fn test_whale_alert_tier() {
    let pool = common::setup_test_db().await;

    let trade = common::make_trade("t-whale-1", "0xERIN", "mkt-whale", "No", 10_000, "0.25");
    let out = apply_trade(&pool, &trade, MAX_ATTEMPTS).await.unwrap();

    let ApplyOutcome::Applied(applied) = out else {
        panic!("not a duplicate");
    };
    assert_eq!(applied.alert.expect("10k notional must alert").kind, "whale");
}

#[tokio::test]
async fn test_dust_trade_ingested_without_alert() {
    let pool = common::setup_test_db().await;

    let trade = common::make_trade("t-dust-1", "0xFRANK", "mkt-dust", "Yes", 50, "0.50");
    let out = apply_trade(&pool, &trade, MAX_ATTEMPTS).await.unwrap();

    let ApplyOutcome::Applied(applied) = out else {
        panic!("dust trades are still ingested");
    };
    assert!(applied.alert.is_none());
    assert_eq!(applied.position.shares, Decimal::from(100));

    // The trade still counts toward trader aggregates.
    let stat = trader_repo::get_by_address(&pool, "0xFRANK")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stat.total_bets, 1);
}

#[tokio::test]
async fn test_stats_accumulate_and_activity_is_monotonic() {
    let pool = common::setup_test_db().await;

    let now = Utc::now();
    let earlier = now - Duration::hours(6);

    let t1 = common::make_trade_at("t-acc-1", "0xGINA", "mkt-a", "Yes", 1_000, "0.50", now);
    // Late-delivered older trade must not move last_activity_at backwards.
    let t2 = common::make_trade_at("t-acc-2", "0xGINA", "mkt-b", "No", 3_000, "0.30", earlier);

    apply_trade(&pool, &t1, MAX_ATTEMPTS).await.unwrap();
    apply_trade(&pool, &t2, MAX_ATTEMPTS).await.unwrap();

    let stat = trader_repo::get_by_address(&pool, "0xGINA")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stat.total_bets, 2);
    assert_eq!(stat.total_volume, Decimal::from(4_000));

    let last = stat.last_activity_at.expect("activity recorded");
    assert!((last - now).num_seconds().abs() < 2);

    // Distinct (market, outcome) keys produce distinct positions.
    let positions = position_repo::get_by_trader(&pool, "0xGINA").await.unwrap();
    assert_eq!(positions.len(), 2);
}
