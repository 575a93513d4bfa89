// File: gameplug-core/tests/reward_tests.rs

use std::sync::Arc;

use chrono::Utc;
use serde_json::json;
use uuid::Uuid;

use gameplug_common::models::loyalty::{Tier, TierRequirement, TransactionSource, TransactionType};
use gameplug_common::models::reward::{Reward, RewardType};
use gameplug_common::traits::repository_traits::RewardRepository;
use gameplug_core::Error;
use gameplug_core::services::{LedgerService, RewardService};
use gameplug_core::test_utils::memory::{
    InMemoryLedgerRepository, InMemoryLoyaltyConfigRepository, InMemoryRewardRepository,
    NullNotificationSink,
};
use gameplug_core::utils::generate_coupon_code;

fn reward_of(reward_type: RewardType, points_cost: i64, stock: i32) -> Reward {
    let now = Utc::now();
    Reward {
        reward_id: Uuid::new_v4(),
        name: "Test Reward".to_string(),
        description: String::new(),
        reward_type,
        points_cost,
        discount_percent: 10,
        discount_amount: 0,
        product_id: None,
        image: String::new(),
        stock,
        enabled: true,
        tier_required: TierRequirement::None,
        created_at: now,
        updated_at: now,
    }
}

struct Setup {
    ledger_repo: Arc<InMemoryLedgerRepository>,
    reward_repo: Arc<InMemoryRewardRepository>,
    ledger: Arc<LedgerService>,
    rewards: RewardService,
}

fn setup() -> Setup {
    let ledger_repo = Arc::new(InMemoryLedgerRepository::new());
    let reward_repo = Arc::new(InMemoryRewardRepository::new());
    let ledger = Arc::new(LedgerService::new(
        ledger_repo.clone(),
        Arc::new(InMemoryLoyaltyConfigRepository::new()),
        Arc::new(NullNotificationSink),
    ));
    let rewards = RewardService::new(reward_repo.clone(), ledger.clone());
    Setup {
        ledger_repo,
        reward_repo,
        ledger,
        rewards,
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

#[tokio::test]
async fn silver_user_redeems_coupon_reward() -> Result<(), Error> {
    let s = setup();
    let user = Uuid::new_v4();
    fund(&s.ledger, user, 150).await?;
    s.ledger_repo.seed_tier(user, Tier::Silver).await;

    let reward = reward_of(RewardType::Coupon, 100, -1);
    s.reward_repo.create_reward(&reward).await?;

    let result = s.rewards.redeem_reward(user, reward.reward_id).await?;
    assert_eq!(result.new_balance, 50);
    assert_eq!(result.redemption.points_spent, 100);

    let code = result.coupon_code.expect("coupon type issues a code");
    assert!(code.starts_with("GP-"));
    assert_eq!(code.len(), 11);
    assert!(code[3..].chars().all(|c| c.is_ascii_hexdigit()));

    // The redemption snapshots the reward name/type.
    assert_eq!(
        result.redemption.metadata.get("reward_name"),
        Some(&json!("Test Reward"))
    );
    assert_eq!(
        result.redemption.metadata.get("reward_type"),
        Some(&json!("coupon"))
    );

    let history = s.rewards.redemption_history(user).await?;
    assert_eq!(history.len(), 1);
    Ok(())
}

#[tokio::test]
async fn product_rewards_get_no_coupon_code() -> Result<(), Error> {
    let s = setup();
    let user = Uuid::new_v4();
    fund(&s.ledger, user, 200).await?;

    let reward = reward_of(RewardType::Product, 100, -1);
    s.reward_repo.create_reward(&reward).await?;

    let result = s.rewards.redeem_reward(user, reward.reward_id).await?;
    assert!(result.coupon_code.is_none());
    assert!(result.redemption.coupon_code.is_none());
    Ok(())
}

#[tokio::test]
async fn redemption_requires_sufficient_points() -> Result<(), Error> {
    let s = setup();
    let user = Uuid::new_v4();
    fund(&s.ledger, user, 30).await?;

    let reward = reward_of(RewardType::Coupon, 100, -1);
    s.reward_repo.create_reward(&reward).await?;

    let err = s
        .rewards
        .redeem_reward(user, reward.reward_id)
        .await
        .expect_err("under-funded");
    match err {
        Error::InsufficientPoints { required, current } => {
            assert_eq!(required, 100);
            assert_eq!(current, 30);
        }
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(s.ledger.get_balance(user).await?.points, 30);
    Ok(())
}

#[tokio::test]
async fn redemption_enforces_tier_gate() -> Result<(), Error> {
    let s = setup();
    let user = Uuid::new_v4();
    fund(&s.ledger, user, 500).await?;

    let mut reward = reward_of(RewardType::Coupon, 100, -1);
    reward.tier_required = TierRequirement::Gold;
    s.reward_repo.create_reward(&reward).await?;

    let err = s
        .rewards
        .redeem_reward(user, reward.reward_id)
        .await
        .expect_err("free tier");
    assert!(matches!(err, Error::Forbidden(_)));

    s.ledger_repo.seed_tier(user, Tier::Gold).await;
    s.rewards.redeem_reward(user, reward.reward_id).await?;
    Ok(())
}

#[tokio::test]
async fn stock_of_one_allows_exactly_one_redemption() -> Result<(), Error> {
    let s = setup();
    let first = Uuid::new_v4();
    let second = Uuid::new_v4();
    fund(&s.ledger, first, 200).await?;
    fund(&s.ledger, second, 200).await?;

    let reward = reward_of(RewardType::GiftCard, 100, 1);
    s.reward_repo.create_reward(&reward).await?;

    s.rewards.redeem_reward(first, reward.reward_id).await?;

    let err = s
        .rewards
        .redeem_reward(second, reward.reward_id)
        .await
        .expect_err("stock exhausted");
    assert!(matches!(err, Error::OutOfStock(_)));

    // The failed redemption refunded its spend.
    assert_eq!(s.ledger.get_balance(second).await?.points, 200);

    // The refund is visible in the transaction log, not silently absorbed.
    let transactions = s.ledger_repo.transactions_for(second).await;
    assert!(
        transactions
            .iter()
            .any(|t| t.source == TransactionSource::Refund && t.amount == 100)
    );
    Ok(())
}

#[tokio::test]
async fn unlimited_stock_never_runs_out() -> Result<(), Error> {
    let s = setup();
    let user = Uuid::new_v4();
    fund(&s.ledger, user, 1000).await?;

    let reward = reward_of(RewardType::Coupon, 100, -1);
    s.reward_repo.create_reward(&reward).await?;

    for _ in 0..5 {
        s.rewards.redeem_reward(user, reward.reward_id).await?;
    }
    let stored = s
        .reward_repo
        .get_reward(reward.reward_id)
        .await?
        .expect("reward exists");
    assert_eq!(stored.stock, -1);
    Ok(())
}

#[tokio::test]
async fn missing_or_disabled_rewards_are_not_found() -> Result<(), Error> {
    let s = setup();
    let user = Uuid::new_v4();
    fund(&s.ledger, user, 500).await?;

    let err = s
        .rewards
        .redeem_reward(user, Uuid::new_v4())
        .await
        .expect_err("missing reward");
    assert!(matches!(err, Error::NotFound(_)));

    let mut reward = reward_of(RewardType::Coupon, 100, -1);
    reward.enabled = false;
    s.reward_repo.create_reward(&reward).await?;
    let err = s
        .rewards
        .redeem_reward(user, reward.reward_id)
        .await
        .expect_err("disabled reward");
    assert!(matches!(err, Error::NotFound(_)));
    Ok(())
}

#[tokio::test]
async fn enabled_rewards_list_cheapest_first() -> Result<(), Error> {
    let s = setup();

    let mut expensive = reward_of(RewardType::Coupon, 900, -1);
    expensive.name = "expensive".to_string();
    let mut cheap = reward_of(RewardType::Coupon, 100, -1);
    cheap.name = "cheap".to_string();
    let mut hidden = reward_of(RewardType::Coupon, 50, -1);
    hidden.enabled = false;

    s.reward_repo.create_reward(&expensive).await?;
    s.reward_repo.create_reward(&cheap).await?;
    s.reward_repo.create_reward(&hidden).await?;

    let listed = s.rewards.list_rewards().await?;
    assert_eq!(listed.len(), 2);
    assert_eq!(listed[0].name, "cheap");
    assert_eq!(listed[1].name, "expensive");
    Ok(())
}

#[test]
fn coupon_codes_follow_the_fixed_format() {
    for _ in 0..50 {
        let code = generate_coupon_code().expect("entropy available");
        assert!(code.starts_with("GP-"));
        assert_eq!(code.len(), 11);
        assert!(code[3..].chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_lowercase()));
    }
}
