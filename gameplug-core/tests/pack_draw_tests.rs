// File: gameplug-core/tests/pack_draw_tests.rs

use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use rand::SeedableRng;
use rand::rngs::StdRng;
use serde_json::json;
use uuid::Uuid;

use gameplug_common::models::loyalty::{Tier, TierRequirement, TransactionSource, TransactionType};
use gameplug_common::models::pack::{
    DropRarity, DropType, Pack, PackDrop, PackListing,
};
use gameplug_common::traits::repository_traits::PackRepository;
use gameplug_core::Error;
use gameplug_core::services::pack_service::select_drop;
use gameplug_core::services::{LedgerService, PackService};
use gameplug_core::test_utils::memory::{
    InMemoryLedgerRepository, InMemoryLoyaltyConfigRepository, InMemoryPackRepository,
    NullNotificationSink,
};

fn drop_of(drop_type: DropType, weight: i32, points_amount: i64, label: &str) -> PackDrop {
    PackDrop {
        drop_type,
        rarity: DropRarity::Common,
        weight,
        points_amount,
        discount_percent: 0,
        discount_amount: 0,
        product_id: None,
        label: label.to_string(),
    }
}

fn pack_of(points_cost: i64, tier_required: TierRequirement, drops: Vec<PackDrop>) -> Pack {
    let now = Utc::now();
    Pack {
        pack_id: Uuid::new_v4(),
        name: "Test Pack".to_string(),
        description: String::new(),
        image: String::new(),
        points_cost,
        enabled: true,
        tier_required,
        drops,
        created_at: now,
        updated_at: now,
    }
}

struct Setup {
    ledger_repo: Arc<InMemoryLedgerRepository>,
    pack_repo: Arc<InMemoryPackRepository>,
    ledger: Arc<LedgerService>,
    packs: PackService,
}

fn setup() -> Setup {
    let ledger_repo = Arc::new(InMemoryLedgerRepository::new());
    let pack_repo = Arc::new(InMemoryPackRepository::new());
    let ledger = Arc::new(LedgerService::new(
        ledger_repo.clone(),
        Arc::new(InMemoryLoyaltyConfigRepository::new()),
        Arc::new(NullNotificationSink),
    ));
    let packs = PackService::new(pack_repo.clone(), ledger.clone());
    Setup {
        ledger_repo,
        pack_repo,
        ledger,
        packs,
    }
}

async fn fund(ledger: &LedgerService, user: Uuid, amount: i64) -> Result<(), Error> {
    ledger
        .add_points(
            user,
            amount,
            TransactionType::Bonus,
            TransactionSource::AdminGrant,
            "test funding",
            json!({}),
        )
        .await?;
    Ok(())
}

#[test]
fn draw_frequencies_converge_to_weights() {
    let drops = vec![
        drop_of(DropType::Points, 50, 20, "a"),
        drop_of(DropType::Points, 30, 50, "b"),
        drop_of(DropType::Coupon, 15, 0, "c"),
        drop_of(DropType::Coupon, 4, 0, "d"),
        drop_of(DropType::Nothing, 1, 0, "e"),
    ];

    let mut rng = StdRng::seed_from_u64(0xC0FFEE);
    let mut counts: HashMap<String, u64> = HashMap::new();
    const DRAWS: u64 = 100_000;
    for _ in 0..DRAWS {
        let selected = select_drop(&drops, &mut rng).expect("non-empty table");
        *counts.entry(selected.label.clone()).or_insert(0) += 1;
    }

    for drop in &drops {
        let observed = *counts.get(&drop.label).unwrap_or(&0) as f64 / DRAWS as f64;
        let expected = f64::from(drop.weight) / 100.0;
        assert!(
            (observed - expected).abs() < 0.01,
            "drop {} observed {observed:.4}, expected {expected:.4}",
            drop.label
        );
    }
}

#[test]
fn zero_weight_drops_are_never_selected() {
    let drops = vec![
        drop_of(DropType::Points, 0, 10, "never"),
        drop_of(DropType::Points, 1, 20, "always"),
        drop_of(DropType::Points, 0, 30, "also never"),
    ];

    let mut rng = StdRng::seed_from_u64(7);
    for _ in 0..1_000 {
        let selected = select_drop(&drops, &mut rng).expect("non-empty table");
        assert_eq!(selected.label, "always");
    }
}

#[test]
fn empty_or_massless_tables_select_nothing() {
    let mut rng = StdRng::seed_from_u64(7);
    assert!(select_drop(&[], &mut rng).is_none());

    let drops = vec![drop_of(DropType::Points, 0, 10, "x")];
    assert!(select_drop(&drops, &mut rng).is_none());
}

#[test]
fn listing_hides_drop_weights() {
    let pack = pack_of(
        100,
        TierRequirement::None,
        vec![drop_of(DropType::Points, 50, 20, "20 Points")],
    );
    let listing = PackListing::from(pack);

    let value = serde_json::to_value(&listing).expect("serializable");
    let drops = value.get("drops").and_then(|d| d.as_array()).expect("drops");
    assert_eq!(drops.len(), 1);
    assert!(drops[0].get("weight").is_none());
    assert_eq!(drops[0].get("label"), Some(&json!("20 Points")));
}

#[tokio::test]
async fn open_pack_charges_cost_and_grants_points_drop() -> Result<(), Error> {
    let s = setup();
    let user = Uuid::new_v4();
    fund(&s.ledger, user, 500).await?;

    let pack = pack_of(
        100,
        TierRequirement::None,
        vec![drop_of(DropType::Points, 1, 50, "50 Points")],
    );
    s.pack_repo.create_pack(&pack).await?;

    let result = s.packs.open_pack(user, pack.pack_id).await?;
    assert_eq!(result.result.drop_type, DropType::Points);
    assert_eq!(result.result.value, json!(50));
    // 500 - 100 cost + 50 drop.
    assert_eq!(result.new_balance, 450);

    let openings = s.pack_repo.list_openings_for_user(user, 10).await?;
    assert_eq!(openings.len(), 1);
    assert_eq!(openings[0].points_spent, 100);

    // Ledger saw the spend and the drop credit.
    let transactions = s.ledger_repo.transactions_for(user).await;
    let spend = transactions
        .iter()
        .find(|t| t.source == TransactionSource::PackOpen && t.amount < 0)
        .expect("spend recorded");
    assert_eq!(spend.amount, -100);
    Ok(())
}

#[tokio::test]
async fn open_pack_coupon_drop_issues_code() -> Result<(), Error> {
    let s = setup();
    let user = Uuid::new_v4();
    fund(&s.ledger, user, 200).await?;

    let mut drop = drop_of(DropType::Coupon, 1, 0, "5% Coupon");
    drop.discount_percent = 5;
    let pack = pack_of(100, TierRequirement::None, vec![drop]);
    s.pack_repo.create_pack(&pack).await?;

    let result = s.packs.open_pack(user, pack.pack_id).await?;
    let code = result
        .result
        .value
        .get("code")
        .and_then(|c| c.as_str())
        .expect("coupon code");
    assert!(code.starts_with("GP-"));
    assert_eq!(code.len(), 11);
    assert!(code[3..].chars().all(|c| c.is_ascii_hexdigit()));
    assert_eq!(result.result.value.get("discount_percent"), Some(&json!(5)));
    assert_eq!(result.new_balance, 100);
    Ok(())
}

#[tokio::test]
async fn open_pack_nothing_drop_grants_no_payout() -> Result<(), Error> {
    let s = setup();
    let user = Uuid::new_v4();
    fund(&s.ledger, user, 150).await?;

    let pack = pack_of(
        100,
        TierRequirement::None,
        vec![drop_of(DropType::Nothing, 1, 0, "")],
    );
    s.pack_repo.create_pack(&pack).await?;

    let result = s.packs.open_pack(user, pack.pack_id).await?;
    assert_eq!(result.result.drop_type, DropType::Nothing);
    assert_eq!(result.result.label, "Better luck next time!");
    assert!(result.result.value.is_null());
    assert_eq!(result.new_balance, 50);
    Ok(())
}

#[tokio::test]
async fn open_pack_requires_sufficient_points() -> Result<(), Error> {
    let s = setup();
    let user = Uuid::new_v4();
    fund(&s.ledger, user, 10).await?;

    let pack = pack_of(
        100,
        TierRequirement::None,
        vec![drop_of(DropType::Points, 1, 50, "x")],
    );
    s.pack_repo.create_pack(&pack).await?;

    let err = s
        .packs
        .open_pack(user, pack.pack_id)
        .await
        .expect_err("broke user");
    assert!(matches!(err, Error::InsufficientPoints { .. }));

    // Nothing spent, nothing recorded.
    assert_eq!(s.ledger.get_balance(user).await?.points, 10);
    assert!(s.pack_repo.list_openings_for_user(user, 10).await?.is_empty());
    Ok(())
}

#[tokio::test]
async fn open_pack_enforces_tier_gate() -> Result<(), Error> {
    let s = setup();
    let user = Uuid::new_v4();
    fund(&s.ledger, user, 1000).await?;

    let pack = pack_of(
        100,
        TierRequirement::Silver,
        vec![drop_of(DropType::Points, 1, 50, "x")],
    );
    s.pack_repo.create_pack(&pack).await?;

    let err = s
        .packs
        .open_pack(user, pack.pack_id)
        .await
        .expect_err("free tier");
    assert!(matches!(err, Error::Forbidden(_)));

    // Silver clears the gate; gold clears a silver gate too.
    s.ledger_repo.seed_tier(user, Tier::Silver).await;
    s.packs.open_pack(user, pack.pack_id).await?;
    s.ledger_repo.seed_tier(user, Tier::Gold).await;
    s.packs.open_pack(user, pack.pack_id).await?;
    Ok(())
}

#[tokio::test]
async fn open_pack_rejects_missing_or_disabled_pack() -> Result<(), Error> {
    let s = setup();
    let user = Uuid::new_v4();
    fund(&s.ledger, user, 1000).await?;

    let err = s
        .packs
        .open_pack(user, Uuid::new_v4())
        .await
        .expect_err("missing pack");
    assert!(matches!(err, Error::NotFound(_)));

    let mut pack = pack_of(
        100,
        TierRequirement::None,
        vec![drop_of(DropType::Points, 1, 50, "x")],
    );
    pack.enabled = false;
    s.pack_repo.create_pack(&pack).await?;
    let err = s
        .packs
        .open_pack(user, pack.pack_id)
        .await
        .expect_err("disabled pack");
    assert!(matches!(err, Error::NotFound(_)));
    Ok(())
}

#[tokio::test]
async fn open_pack_rejects_massless_table_before_spending() -> Result<(), Error> {
    let s = setup();
    let user = Uuid::new_v4();
    fund(&s.ledger, user, 1000).await?;

    let pack = pack_of(
        100,
        TierRequirement::None,
        vec![drop_of(DropType::Points, 0, 50, "x")],
    );
    s.pack_repo.create_pack(&pack).await?;

    let err = s
        .packs
        .open_pack(user, pack.pack_id)
        .await
        .expect_err("broken table");
    assert!(matches!(err, Error::InvalidInput(_)));
    assert_eq!(s.ledger.get_balance(user).await?.points, 1000);
    Ok(())
}

#[tokio::test]
async fn points_drop_earns_respect_tier_multiplier() -> Result<(), Error> {
    let s = setup();
    let user = Uuid::new_v4();
    fund(&s.ledger, user, 100).await?;
    s.ledger_repo.seed_tier(user, Tier::Gold).await;

    let pack = pack_of(
        100,
        TierRequirement::None,
        vec![drop_of(DropType::Points, 1, 50, "50 Points")],
    );
    s.pack_repo.create_pack(&pack).await?;

    let result = s.packs.open_pack(user, pack.pack_id).await?;
    // 100 - 100 cost + 50 * 2 gold multiplier.
    assert_eq!(result.new_balance, 100);
    Ok(())
}
