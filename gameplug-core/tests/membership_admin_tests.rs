// File: gameplug-core/tests/membership_admin_tests.rs

use std::sync::Arc;

use chrono::Utc;
use serde_json::json;
use uuid::Uuid;

use gameplug_common::models::loyalty::{Tier, TransactionSource, TransactionType};
use gameplug_common::models::membership::Membership;
use gameplug_common::traits::repository_traits::{
    LoyaltyConfigRepository, MembershipRepository, PackRepository, QuestRepository,
    RewardRepository,
};
use gameplug_core::Error;
use gameplug_core::services::admin_service::{MembershipInput, RewardInput};
use gameplug_core::services::{AdminService, LedgerService, MembershipService};
use gameplug_core::test_utils::memory::{
    InMemoryLedgerRepository, InMemoryLoyaltyConfigRepository, InMemoryMembershipRepository,
    InMemoryPackRepository, InMemoryQuestRepository, InMemoryRewardRepository,
    NullNotificationSink,
};

fn membership_of(tier: Tier, price: i64) -> Membership {
    let now = Utc::now();
    Membership {
        tier,
        name: format!("GamePlus {}", tier.as_str()),
        price,
        yearly_price: price * 10,
        points_multiplier: tier.multiplier(),
        perks: vec![],
        enabled: true,
        created_at: now,
        updated_at: now,
    }
}

struct Setup {
    ledger_repo: Arc<InMemoryLedgerRepository>,
    membership_repo: Arc<InMemoryMembershipRepository>,
    reward_repo: Arc<InMemoryRewardRepository>,
    quest_repo: Arc<InMemoryQuestRepository>,
    pack_repo: Arc<InMemoryPackRepository>,
    config_repo: Arc<InMemoryLoyaltyConfigRepository>,
    ledger: Arc<LedgerService>,
    memberships: MembershipService,
    admin: AdminService,
}

fn setup() -> Setup {
    let ledger_repo = Arc::new(InMemoryLedgerRepository::new());
    let membership_repo = Arc::new(InMemoryMembershipRepository::new());
    let reward_repo = Arc::new(InMemoryRewardRepository::new());
    let quest_repo = Arc::new(InMemoryQuestRepository::new());
    let pack_repo = Arc::new(InMemoryPackRepository::new());
    let config_repo = Arc::new(InMemoryLoyaltyConfigRepository::new());

    let ledger = Arc::new(LedgerService::new(
        ledger_repo.clone(),
        config_repo.clone(),
        Arc::new(NullNotificationSink),
    ));
    let memberships = MembershipService::new(membership_repo.clone(), ledger.clone());
    let admin = AdminService::new(
        reward_repo.clone(),
        quest_repo.clone(),
        pack_repo.clone(),
        membership_repo.clone(),
        config_repo.clone(),
        ledger.clone(),
    );

    Setup {
        ledger_repo,
        membership_repo,
        reward_repo,
        quest_repo,
        pack_repo,
        config_repo,
        ledger,
        memberships,
        admin,
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
async fn upgrade_charges_points_and_sets_tier() -> Result<(), Error> {
    let s = setup();
    let user = Uuid::new_v4();
    fund(&s.ledger, user, 600).await?;
    s.membership_repo.upsert(&membership_of(Tier::Silver, 500)).await?;

    let result = s.memberships.upgrade_tier(user, Tier::Silver).await?;
    assert_eq!(result.tier, Tier::Silver);
    assert_eq!(result.new_balance, 100);
    let expires = result.expires_at.expect("expiry set");
    assert!(expires > Utc::now());

    // The spend shows up in the log under tier_bonus.
    let transactions = s.ledger_repo.transactions_for(user).await;
    assert!(
        transactions
            .iter()
            .any(|t| t.source == TransactionSource::TierBonus && t.amount == -500)
    );
    Ok(())
}

#[tokio::test]
async fn upgrade_requires_sufficient_points() -> Result<(), Error> {
    let s = setup();
    let user = Uuid::new_v4();
    fund(&s.ledger, user, 100).await?;
    s.membership_repo.upsert(&membership_of(Tier::Silver, 500)).await?;

    let err = s
        .memberships
        .upgrade_tier(user, Tier::Silver)
        .await
        .expect_err("under-funded");
    assert!(matches!(err, Error::InsufficientPoints { .. }));

    // Tier untouched on failure.
    assert_eq!(s.ledger.get_balance(user).await?.tier, Tier::Free);
    Ok(())
}

#[tokio::test]
async fn upgrade_rejects_free_and_unknown_tiers() -> Result<(), Error> {
    let s = setup();
    let user = Uuid::new_v4();
    fund(&s.ledger, user, 5000).await?;

    let err = s
        .memberships
        .upgrade_tier(user, Tier::Free)
        .await
        .expect_err("free tier");
    assert!(matches!(err, Error::InvalidInput(_)));

    // No membership row configured for gold.
    let err = s
        .memberships
        .upgrade_tier(user, Tier::Gold)
        .await
        .expect_err("missing membership");
    assert!(matches!(err, Error::NotFound(_)));
    Ok(())
}

#[tokio::test]
async fn overview_reports_current_tier_and_catalog() -> Result<(), Error> {
    let s = setup();
    let user = Uuid::new_v4();
    s.membership_repo.upsert(&membership_of(Tier::Silver, 500)).await?;
    s.membership_repo.upsert(&membership_of(Tier::Gold, 1200)).await?;

    let overview = s.memberships.overview(user).await?;
    assert_eq!(overview.current_tier, Tier::Free);
    assert!(overview.tier_expires_at.is_none());
    assert_eq!(overview.tiers.len(), 2);
    assert_eq!(overview.tiers[0].tier, Tier::Silver);
    Ok(())
}

#[tokio::test]
async fn seed_defaults_is_idempotent() -> Result<(), Error> {
    let s = setup();

    s.admin.seed_defaults().await?;
    assert_eq!(s.quest_repo.count().await?, 6);
    assert_eq!(s.reward_repo.count().await?, 5);
    assert_eq!(s.pack_repo.count().await?, 3);
    assert_eq!(s.membership_repo.count().await?, 2);
    assert_eq!(s.config_repo.list_all().await?.len(), 3);

    // A second run changes nothing.
    s.admin.seed_defaults().await?;
    assert_eq!(s.quest_repo.count().await?, 6);
    assert_eq!(s.reward_repo.count().await?, 5);
    assert_eq!(s.pack_repo.count().await?, 3);
    assert_eq!(s.membership_repo.count().await?, 2);

    // The seeded starter pack carries the canonical 100-mass drop table.
    let packs = s.pack_repo.list_all().await?;
    let starter = packs
        .iter()
        .find(|p| p.name == "Starter Pack")
        .expect("starter pack seeded");
    assert_eq!(starter.total_weight(), 100);
    assert_eq!(starter.points_cost, 100);

    let config = s.config_repo.get_value("points_per_euro").await?;
    assert_eq!(config, Some(json!(10)));
    Ok(())
}

#[tokio::test]
async fn admin_reward_crud_round_trip() -> Result<(), Error> {
    let s = setup();

    let created = s
        .admin
        .create_reward(RewardInput {
            name: Some("20% Coupon".to_string()),
            reward_type: Some(gameplug_common::models::reward::RewardType::Coupon),
            points_cost: Some(800),
            discount_percent: Some(20),
            ..Default::default()
        })
        .await?;
    assert_eq!(created.points_cost, 800);
    assert!(created.enabled);
    assert_eq!(created.stock, -1);

    let updated = s
        .admin
        .update_reward(
            created.reward_id,
            RewardInput {
                points_cost: Some(700),
                enabled: Some(false),
                ..Default::default()
            },
        )
        .await?;
    assert_eq!(updated.points_cost, 700);
    assert!(!updated.enabled);
    // Untouched fields survive the partial update.
    assert_eq!(updated.name, "20% Coupon");
    assert_eq!(updated.discount_percent, 20);

    s.admin.delete_reward(created.reward_id).await?;
    assert!(s.reward_repo.get_reward(created.reward_id).await?.is_none());

    let err = s
        .admin
        .create_reward(RewardInput::default())
        .await
        .expect_err("missing required fields");
    assert!(matches!(err, Error::InvalidInput(_)));
    Ok(())
}

#[tokio::test]
async fn admin_membership_upsert_merges_partial_input() -> Result<(), Error> {
    let s = setup();

    let created = s
        .admin
        .upsert_membership(MembershipInput {
            tier: Tier::Silver,
            name: Some("GamePlus Silver".to_string()),
            price: Some(500),
            yearly_price: None,
            points_multiplier: Some(1.5),
            perks: None,
            enabled: None,
        })
        .await?;
    assert_eq!(created.price, 500);
    assert!(created.enabled);

    let updated = s
        .admin
        .upsert_membership(MembershipInput {
            tier: Tier::Silver,
            name: None,
            price: Some(450),
            yearly_price: None,
            points_multiplier: None,
            perks: None,
            enabled: None,
        })
        .await?;
    assert_eq!(updated.price, 450);
    assert_eq!(updated.name, "GamePlus Silver");
    assert_eq!(s.membership_repo.count().await?, 1);
    Ok(())
}

#[tokio::test]
async fn config_set_and_read_back() -> Result<(), Error> {
    let s = setup();

    s.admin
        .set_config("daily_login_points", &json!(25), "raised for launch week")
        .await?;
    assert_eq!(
        s.config_repo.get_value("daily_login_points").await?,
        Some(json!(25))
    );

    let err = s
        .admin
        .set_config("", &json!(1), "")
        .await
        .expect_err("empty key");
    assert!(matches!(err, Error::InvalidInput(_)));
    Ok(())
}
