mod common;

use rust_decimal::Decimal;

use polyledger::db::{position_repo, trader_repo};
use polyledger::errors::LedgerError;
use polyledger::ingestion::{apply_trade, settle_market, ApplyOutcome, SettlementOutcome};

const MAX_ATTEMPTS: u32 = 3;

#[tokio::test]
async fn test_settle_market_realizes_win_and_loss() {
    let pool = common::setup_test_db().await;
    common::seed_market(&pool, "mkt-settle", &["Yes", "No"]).await;

    // Winner: 5000 @ 0.40 on Yes → 12500 shares.
    let win = common::make_trade("t-s-1", "0xWIN", "mkt-settle", "Yes", 5_000, "0.40");
    // Loser: 3000 @ 0.60 on No → 5000 shares.
    let lose = common::make_trade("t-s-2", "0xLOSE", "mkt-settle", "No", 3_000, "0.60");

    apply_trade(&pool, &win, MAX_ATTEMPTS).await.unwrap();
    apply_trade(&pool, &lose, MAX_ATTEMPTS).await.unwrap();

    let outcome = settle_market(&pool, "mkt-settle", Some("Yes")).await.unwrap();
    assert_eq!(
        outcome,
        SettlementOutcome::Settled {
            positions_settled: 2,
            traders_updated: 2
        }
    );

    // Winner: 12500 · (1 − 0.40) = 7500.
    let winner_positions = position_repo::get_by_trader(&pool, "0xWIN").await.unwrap();
    let winner_pos = &winner_positions[0];
    assert_eq!(winner_pos.status, "settled");
    assert_eq!(winner_pos.realized_pnl, Some(Decimal::from(7_500)));
    assert!(winner_pos.settled_at.is_some());

    // Loser: −(5000 · 0.60) = −3000; loss capped at stake.
    let loser_positions = position_repo::get_by_trader(&pool, "0xLOSE").await.unwrap();
    let loser_pos = &loser_positions[0];
    assert_eq!(loser_pos.status, "settled");
    assert_eq!(loser_pos.realized_pnl, Some(Decimal::from(-3_000)));

    // Aggregates recomputed from settled positions.
    let win_stat = trader_repo::get_by_address(&pool, "0xWIN").await.unwrap().unwrap();
    assert_eq!(win_stat.wins, 1);
    assert_eq!(win_stat.losses, 0);
    assert_eq!(win_stat.profit_loss, Decimal::from(7_500));

    let lose_stat = trader_repo::get_by_address(&pool, "0xLOSE").await.unwrap().unwrap();
    assert_eq!(lose_stat.wins, 0);
    assert_eq!(lose_stat.losses, 1);
    assert_eq!(lose_stat.profit_loss, Decimal::from(-3_000));
}

#[tokio::test]
async fn test_settlement_is_idempotent() {
    let pool = common::setup_test_db().await;
    common::seed_market(&pool, "mkt-idem", &["Yes", "No"]).await;

    let trade = common::make_trade("t-i-1", "0xHANK", "mkt-idem", "Yes", 1_000, "0.50");
    apply_trade(&pool, &trade, MAX_ATTEMPTS).await.unwrap();

    let first = settle_market(&pool, "mkt-idem", Some("Yes")).await.unwrap();
    assert_eq!(
        first,
        SettlementOutcome::Settled {
            positions_settled: 1,
            traders_updated: 1
        }
    );

    let stat_before = trader_repo::get_by_address(&pool, "0xHANK").await.unwrap().unwrap();
    let pos_before = position_repo::get_by_trader(&pool, "0xHANK").await.unwrap();

    // Re-invoking settles nothing further and changes no value.
    let second = settle_market(&pool, "mkt-idem", Some("Yes")).await.unwrap();
    assert_eq!(
        second,
        SettlementOutcome::Settled {
            positions_settled: 0,
            traders_updated: 0
        }
    );

    let stat_after = trader_repo::get_by_address(&pool, "0xHANK").await.unwrap().unwrap();
    assert_eq!(stat_after.wins, stat_before.wins);
    assert_eq!(stat_after.losses, stat_before.losses);
    assert_eq!(stat_after.profit_loss, stat_before.profit_loss);
    assert_eq!(stat_after.total_bets, stat_before.total_bets);

    let pos_after = position_repo::get_by_trader(&pool, "0xHANK").await.unwrap();
    assert_eq!(pos_after.len(), pos_before.len());
    assert_eq!(pos_after[0].realized_pnl, pos_before[0].realized_pnl);
    assert_eq!(pos_after[0].settled_at, pos_before[0].settled_at);
}

#[tokio::test]
async fn test_unrecognized_winner_refuses_settlement() {
    let pool = common::setup_test_db().await;
    common::seed_market(&pool, "mkt-bad", &["Yes", "No"]).await;

    let trade = common::make_trade("t-b-1", "0xIVAN", "mkt-bad", "Yes", 1_000, "0.50");
    apply_trade(&pool, &trade, MAX_ATTEMPTS).await.unwrap();

    let err = settle_market(&pool, "mkt-bad", Some("Maybe")).await.unwrap_err();
    assert!(matches!(
        err,
        LedgerError::ResolutionInconsistent { .. }
    ));

    // Positions remain open rather than settled against an unknown label.
    let positions = position_repo::get_by_trader(&pool, "0xIVAN").await.unwrap();
    assert_eq!(positions[0].status, "open");
    assert!(positions[0].realized_pnl.is_none());
}

#[tokio::test]
async fn test_resolution_without_winner_settles_nothing() {
    let pool = common::setup_test_db().await;
    common::seed_market(&pool, "mkt-nowin", &["Yes", "No"]).await;

    let trade = common::make_trade("t-n-1", "0xJUDY", "mkt-nowin", "No", 2_000, "0.40");
    apply_trade(&pool, &trade, MAX_ATTEMPTS).await.unwrap();

    let outcome = settle_market(&pool, "mkt-nowin", None).await.unwrap();
    assert_eq!(outcome, SettlementOutcome::NoWinner);

    let positions = position_repo::get_by_trader(&pool, "0xJUDY").await.unwrap();
    assert_eq!(positions[0].status, "open");
}

#[tokio::test]
async fn test_post_resolution_trade_opens_new_position() {
    let pool = common::setup_test_db().await;
    common::seed_market(&pool, "mkt-late", &["Yes", "No"]).await;

    let early = common::make_trade("t-l-1", "0xKATE", "mkt-late", "Yes", 1_000, "0.50");
    apply_trade(&pool, &early, MAX_ATTEMPTS).await.unwrap();

    settle_market(&pool, "mkt-late", Some("Yes")).await.unwrap();

    // A trade arriving after settlement must not reopen the settled row.
    let late = common::make_trade("t-l-2", "0xKATE", "mkt-late", "Yes", 500, "0.80");
    let out = apply_trade(&pool, &late, MAX_ATTEMPTS).await.unwrap();
    let ApplyOutcome::Applied(applied) = out else {
        panic!("late trade is new, not a duplicate");
    };

    assert_eq!(applied.position.status, "open");
    assert_eq!(applied.position.shares, Decimal::from(625));
    assert_eq!(applied.position.avg_price, Decimal::new(80, 2));

    let positions = position_repo::get_by_trader(&pool, "0xKATE").await.unwrap();
    assert_eq!(positions.len(), 2);

    let settled: Vec<_> = positions.iter().filter(|p| p.status == "settled").collect();
    assert_eq!(settled.len(), 1);
    assert_eq!(settled[0].shares, Decimal::from(2_000));
}

#[tokio::test]
async fn test_leaderboard_filters_on_settled_markets() {
    let pool = common::setup_test_db().await;

    // 0xVET settles three markets, 0xNEWBIE only one.
    for (i, market) in ["mkt-lb-1", "mkt-lb-2", "mkt-lb-3"].iter().enumerate() {
        common::seed_market(&pool, market, &["Yes", "No"]).await;
        let id = format!("t-vet-{i}");
        let trade = common::make_trade(&id, "0xVET", market, "Yes", 1_000, "0.50");
        apply_trade(&pool, &trade, MAX_ATTEMPTS).await.unwrap();
    }
    let newbie = common::make_trade("t-newbie-1", "0xNEWBIE", "mkt-lb-1", "Yes", 9_000, "0.10");
    apply_trade(&pool, &newbie, MAX_ATTEMPTS).await.unwrap();

    for market in ["mkt-lb-1", "mkt-lb-2", "mkt-lb-3"] {
        settle_market(&pool, market, Some("Yes")).await.unwrap();
    }

    let board = trader_repo::leaderboard(&pool, 3, 50).await.unwrap();
    let addresses: Vec<_> = board.iter().map(|t| t.trader_address.as_str()).collect();
    assert!(addresses.contains(&"0xVET"));
    assert!(
        !addresses.contains(&"0xNEWBIE"),
        "one settled market is below the leaderboard minimum"
    );

    // Exclusion is read-time only: the row itself is settled and updated.
    let newbie_stat = trader_repo::get_by_address(&pool, "0xNEWBIE")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(newbie_stat.wins, 1);
    assert!(newbie_stat.profit_loss > Decimal::ZERO);
}
