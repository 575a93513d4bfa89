// File: gameplug-core/tests/daily_login_tests.rs

use std::sync::Arc;

use chrono::{Days, Utc};
use uuid::Uuid;

use gameplug_common::models::loyalty::Tier;
use gameplug_common::traits::repository_traits::LedgerRepository;
use gameplug_core::Error;
use gameplug_core::services::LedgerService;
use gameplug_core::test_utils::memory::{
    InMemoryLedgerRepository, InMemoryLoyaltyConfigRepository, NullNotificationSink,
};

fn setup() -> (Arc<InMemoryLedgerRepository>, LedgerService) {
    let ledger_repo = Arc::new(InMemoryLedgerRepository::new());
    let service = LedgerService::new(
        ledger_repo.clone(),
        Arc::new(InMemoryLoyaltyConfigRepository::new()),
        Arc::new(NullNotificationSink),
    );
    (ledger_repo, service)
}

fn day(offset_back: u64) -> String {
    let today = Utc::now().date_naive();
    today
        .checked_sub_days(Days::new(offset_back))
        .unwrap_or(today)
        .format("%Y-%m-%d")
        .to_string()
}

#[tokio::test]
async fn first_claim_starts_streak_at_one() -> Result<(), Error> {
    let (_, service) = setup();
    let user = Uuid::new_v4();

    let result = service.daily_login(user).await?;
    assert_eq!(result.streak_days, 1);
    // Base 10 plus 1 * 5 streak bonus.
    assert_eq!(result.points, 15);
    assert_eq!(result.new_balance, 15);
    Ok(())
}

#[tokio::test]
async fn second_claim_same_day_is_rejected() -> Result<(), Error> {
    let (_, service) = setup();
    let user = Uuid::new_v4();

    service.daily_login(user).await?;
    let err = service.daily_login(user).await.expect_err("double claim");
    assert!(matches!(err, Error::AlreadyClaimed(_)));

    // Only the first claim credited anything.
    let balance = service.get_balance(user).await?;
    assert_eq!(balance.points, 15);
    Ok(())
}

#[tokio::test]
async fn consecutive_days_extend_the_streak() -> Result<(), Error> {
    let (ledger_repo, _) = setup();
    let user = Uuid::new_v4();

    let b = ledger_repo.claim_daily_login(user, "2031-03-01", "2031-02-28").await?;
    assert_eq!(b.streak_days, 1);
    let b = ledger_repo.claim_daily_login(user, "2031-03-02", "2031-03-01").await?;
    assert_eq!(b.streak_days, 2);
    let b = ledger_repo.claim_daily_login(user, "2031-03-03", "2031-03-02").await?;
    assert_eq!(b.streak_days, 3);
    Ok(())
}

#[tokio::test]
async fn skipped_day_resets_streak_to_one() -> Result<(), Error> {
    let (ledger_repo, _) = setup();
    let user = Uuid::new_v4();

    // Claim day 1, skip day 2, claim day 3: streak resets instead of
    // counting to 2.
    let b = ledger_repo.claim_daily_login(user, "2031-03-01", "2031-02-28").await?;
    assert_eq!(b.streak_days, 1);
    let b = ledger_repo.claim_daily_login(user, "2031-03-03", "2031-03-02").await?;
    assert_eq!(b.streak_days, 1);
    Ok(())
}

#[tokio::test]
async fn streak_bonus_caps_at_fifty() -> Result<(), Error> {
    let (ledger_repo, service) = setup();
    let user = Uuid::new_v4();

    // Build a 10-day streak ending yesterday, then claim today through the
    // service.
    for i in (1..=10u64).rev() {
        ledger_repo
            .claim_daily_login(user, &day(i), &day(i + 1))
            .await?;
    }

    let result = service.daily_login(user).await?;
    assert_eq!(result.streak_days, 11);
    // Base 10 plus min(11 * 5, 50).
    assert_eq!(result.points, 60);
    Ok(())
}

#[tokio::test]
async fn tier_multiplier_applies_on_top_of_streak_bonus() -> Result<(), Error> {
    let (ledger_repo, service) = setup();
    let user = Uuid::new_v4();
    ledger_repo.seed_tier(user, Tier::Gold).await;

    let result = service.daily_login(user).await?;
    // The reported award is the pre-multiplier total...
    assert_eq!(result.points, 15);
    // ...but the credited balance reflects the gold 2x earn multiplier.
    assert_eq!(result.new_balance, 30);

    let transactions = ledger_repo.transactions_for(user).await;
    assert_eq!(transactions.len(), 1);
    assert_eq!(transactions[0].amount, 30);
    Ok(())
}
