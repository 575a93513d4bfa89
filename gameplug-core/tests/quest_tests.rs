// File: gameplug-core/tests/quest_tests.rs

use std::sync::Arc;

use chrono::Utc;
use serde_json::json;
use uuid::Uuid;

use gameplug_common::models::loyalty::Tier;
use gameplug_common::models::quest::Quest;
use gameplug_common::traits::repository_traits::QuestRepository;
use gameplug_core::Error;
use gameplug_core::services::{LedgerService, QuestService};
use gameplug_core::test_utils::memory::{
    InMemoryLedgerRepository, InMemoryLoyaltyConfigRepository, InMemoryQuestRepository,
    NullNotificationSink,
};

fn quest_of(title: &str, reward_points: i64, sort_order: i32) -> Quest {
    let now = Utc::now();
    Quest {
        quest_id: Uuid::new_v4(),
        title: title.to_string(),
        description: String::new(),
        quest_type: "custom".to_string(),
        reward_points,
        icon: String::new(),
        enabled: true,
        sort_order,
        metadata: json!({}),
        created_at: now,
        updated_at: now,
    }
}

struct Setup {
    ledger_repo: Arc<InMemoryLedgerRepository>,
    quest_repo: Arc<InMemoryQuestRepository>,
    ledger: Arc<LedgerService>,
    quests: QuestService,
}

fn setup() -> Setup {
    let ledger_repo = Arc::new(InMemoryLedgerRepository::new());
    let quest_repo = Arc::new(InMemoryQuestRepository::new());
    let ledger = Arc::new(LedgerService::new(
        ledger_repo.clone(),
        Arc::new(InMemoryLoyaltyConfigRepository::new()),
        Arc::new(NullNotificationSink),
    ));
    let quests = QuestService::new(quest_repo.clone(), ledger.clone());
    Setup {
        ledger_repo,
        quest_repo,
        ledger,
        quests,
    }
}

#[tokio::test]
async fn completing_a_quest_awards_its_points() -> Result<(), Error> {
    let s = setup();
    let user = Uuid::new_v4();

    let quest = quest_of("Write a Review", 75, 1);
    s.quest_repo.create_quest(&quest).await?;

    let result = s.quests.complete_quest(user, quest.quest_id).await?;
    assert_eq!(result.earned, 75);
    assert_eq!(result.new_balance, 75);
    Ok(())
}

#[tokio::test]
async fn quest_completion_is_one_shot() -> Result<(), Error> {
    let s = setup();
    let user = Uuid::new_v4();

    let quest = quest_of("First Purchase", 100, 1);
    s.quest_repo.create_quest(&quest).await?;

    s.quests.complete_quest(user, quest.quest_id).await?;
    let err = s
        .quests
        .complete_quest(user, quest.quest_id)
        .await
        .expect_err("repeat completion");
    assert!(matches!(err, Error::AlreadyCompleted(_)));

    // No double credit.
    assert_eq!(s.ledger.get_balance(user).await?.points, 100);

    // A different user can still complete the same quest.
    let other = Uuid::new_v4();
    s.quests.complete_quest(other, quest.quest_id).await?;
    Ok(())
}

#[tokio::test]
async fn quest_rewards_respect_tier_multiplier() -> Result<(), Error> {
    let s = setup();
    let user = Uuid::new_v4();
    s.ledger_repo.seed_tier(user, Tier::Gold).await;

    let quest = quest_of("Share a Product", 50, 1);
    s.quest_repo.create_quest(&quest).await?;

    let result = s.quests.complete_quest(user, quest.quest_id).await?;
    assert_eq!(result.earned, 100);
    assert_eq!(result.new_balance, 100);
    Ok(())
}

#[tokio::test]
async fn missing_or_disabled_quests_are_not_found() -> Result<(), Error> {
    let s = setup();
    let user = Uuid::new_v4();

    let err = s
        .quests
        .complete_quest(user, Uuid::new_v4())
        .await
        .expect_err("missing quest");
    assert!(matches!(err, Error::NotFound(_)));

    let mut quest = quest_of("Hidden", 10, 1);
    quest.enabled = false;
    s.quest_repo.create_quest(&quest).await?;
    let err = s
        .quests
        .complete_quest(user, quest.quest_id)
        .await
        .expect_err("disabled quest");
    assert!(matches!(err, Error::NotFound(_)));
    Ok(())
}

#[tokio::test]
async fn listing_merges_user_progress() -> Result<(), Error> {
    let s = setup();
    let user = Uuid::new_v4();

    let done = quest_of("Done Quest", 50, 1);
    let fresh = quest_of("Fresh Quest", 50, 2);
    let disabled = {
        let mut q = quest_of("Disabled Quest", 50, 3);
        q.enabled = false;
        q
    };
    s.quest_repo.create_quest(&done).await?;
    s.quest_repo.create_quest(&fresh).await?;
    s.quest_repo.create_quest(&disabled).await?;

    s.quests.complete_quest(user, done.quest_id).await?;

    let listed = s.quests.list_with_progress(user).await?;
    assert_eq!(listed.len(), 2);

    let first = &listed[0];
    assert_eq!(first.quest.title, "Done Quest");
    assert!(first.user_progress.completed);
    assert_eq!(first.user_progress.progress, 100);
    assert!(first.user_progress.completed_at.is_some());

    let second = &listed[1];
    assert_eq!(second.quest.title, "Fresh Quest");
    assert!(!second.user_progress.completed);
    assert_eq!(second.user_progress.progress, 0);

    // Progress is per-user: another caller sees a clean slate.
    let other = Uuid::new_v4();
    let listed = s.quests.list_with_progress(other).await?;
    assert!(listed.iter().all(|q| !q.user_progress.completed));
    Ok(())
}
