use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::{Value, json};
use tracing::warn;
use uuid::Uuid;

use gameplug_common::models::loyalty::{
    LoyaltyBalance, PointsTransaction, Tier, TransactionPage, TransactionSource, TransactionType,
};
use gameplug_common::models::notification::NewNotification;
use gameplug_common::traits::repository_traits::{
    LedgerRepository, LoyaltyConfigRepository, NotificationSink,
};

use crate::Error;
use crate::utils::{today_string, yesterday_string};

/// Tunable constants, read from loyalty_config with these fallbacks.
const POINTS_PER_EURO_KEY: &str = "points_per_euro";
const POINTS_PER_EURO_DEFAULT: i64 = 10;
const SIGNUP_BONUS_KEY: &str = "signup_bonus_points";
const SIGNUP_BONUS_DEFAULT: i64 = 100;
const DAILY_LOGIN_KEY: &str = "daily_login_points";
const DAILY_LOGIN_DEFAULT: i64 = 10;

/// Streak bonus: +5 points per consecutive day, capped at 50.
const STREAK_BONUS_PER_DAY: i64 = 5;
const STREAK_BONUS_CAP: i64 = 50;

/// Applies the earn-side tier multiplier, rounding to the nearest point.
pub fn apply_tier_multiplier(amount: i64, multiplier: f64) -> i64 {
    (amount as f64 * multiplier).round() as i64
}

#[derive(Debug, Clone, Serialize)]
pub struct DailyLoginResult {
    pub points: i64,
    pub streak_days: i32,
    pub new_balance: i64,
    pub message: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct EarnResult {
    pub earned: i64,
    pub new_balance: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct SignupBonusResult {
    pub earned: i64,
    pub new_balance: i64,
    pub message: String,
}

/// The single source of truth for point mutations. Every earn or spend in
/// the system goes through here, so the tier multiplier and the
/// transaction log stay consistent no matter which flow triggered it.
pub struct LedgerService {
    ledger_repo: Arc<dyn LedgerRepository + Send + Sync>,
    config_repo: Arc<dyn LoyaltyConfigRepository + Send + Sync>,
    notifier: Arc<dyn NotificationSink + Send + Sync>,
}

impl LedgerService {
    pub fn new(
        ledger_repo: Arc<dyn LedgerRepository + Send + Sync>,
        config_repo: Arc<dyn LoyaltyConfigRepository + Send + Sync>,
        notifier: Arc<dyn NotificationSink + Send + Sync>,
    ) -> Self {
        Self {
            ledger_repo,
            config_repo,
            notifier,
        }
    }

    pub async fn get_balance(&self, user_id: Uuid) -> Result<LoyaltyBalance, Error> {
        self.ledger_repo.get_or_create_balance(user_id).await
    }

    /// Credits or debits points. Earn-type amounts get the caller's tier
    /// multiplier applied (and that final amount is what the transaction
    /// records); all other types pass through unmodified. The balance
    /// floors at zero rather than rejecting an overdraw — callers that
    /// need a hard sufficiency guarantee use `try_spend`.
    pub async fn add_points(
        &self,
        user_id: Uuid,
        amount: i64,
        tx_type: TransactionType,
        source: TransactionSource,
        description: &str,
        metadata: Value,
    ) -> Result<(LoyaltyBalance, PointsTransaction), Error> {
        let balance = self.ledger_repo.get_or_create_balance(user_id).await?;
        let final_amount = if tx_type == TransactionType::Earn {
            apply_tier_multiplier(amount, balance.tier.multiplier())
        } else {
            amount
        };

        self.ledger_repo
            .apply(user_id, final_amount, tx_type, source, description, metadata)
            .await
    }

    /// Conditional spend: fails with `InsufficientPoints` unless the
    /// balance covers the cost, atomically.
    pub async fn try_spend(
        &self,
        user_id: Uuid,
        cost: i64,
        source: TransactionSource,
        description: &str,
        metadata: Value,
    ) -> Result<(LoyaltyBalance, PointsTransaction), Error> {
        self.ledger_repo
            .try_debit(user_id, cost, source, description, metadata)
            .await
    }

    pub async fn set_tier(
        &self,
        user_id: Uuid,
        tier: Tier,
        expires_at: Option<DateTime<Utc>>,
    ) -> Result<LoyaltyBalance, Error> {
        self.ledger_repo.set_tier(user_id, tier, expires_at).await
    }

    /// Transaction history, newest first.
    pub async fn history(
        &self,
        user_id: Uuid,
        page: i64,
        limit: i64,
    ) -> Result<TransactionPage, Error> {
        let page = page.max(1);
        let limit = limit.clamp(1, 100);
        let offset = (page - 1) * limit;

        let transactions = self
            .ledger_repo
            .list_transactions(user_id, limit, offset)
            .await?;
        let total = self.ledger_repo.count_transactions(user_id).await?;
        let pages = (total + limit - 1) / limit;

        Ok(TransactionPage {
            transactions,
            total,
            page,
            pages,
        })
    }

    /// Claims today's login reward. The streak only advances when yesterday
    /// was also claimed; any gap resets it to day 1.
    pub async fn daily_login(&self, user_id: Uuid) -> Result<DailyLoginResult, Error> {
        let today = today_string();
        let yesterday = yesterday_string();

        let balance = self
            .ledger_repo
            .claim_daily_login(user_id, &today, &yesterday)
            .await?;
        let streak = balance.streak_days;

        let base = self.config_i64(DAILY_LOGIN_KEY, DAILY_LOGIN_DEFAULT).await?;
        let streak_bonus = (i64::from(streak) * STREAK_BONUS_PER_DAY).min(STREAK_BONUS_CAP);
        let total = base + streak_bonus;

        let (updated, _tx) = self
            .add_points(
                user_id,
                total,
                TransactionType::Earn,
                TransactionSource::DailyLogin,
                &format!("Daily login (Day {streak} streak)"),
                json!({ "streak_days": streak }),
            )
            .await?;

        self.dispatch_notification(NewNotification {
            user_id,
            kind: "loyalty_points".to_string(),
            title: "Daily Login Reward".to_string(),
            message: format!("+{total} points! Day {streak} streak bonus."),
            data: json!({ "points": total, "streak_days": streak }),
        });

        Ok(DailyLoginResult {
            points: total,
            streak_days: streak,
            new_balance: updated.points,
            message: format!("+{total} points! ({streak} day streak)"),
        })
    }

    /// Awards purchase points, once per (user, order). The per-order guard
    /// lives in the transaction log itself, so a duplicate call fails as
    /// `AlreadyClaimed` with nothing applied.
    pub async fn earn_from_purchase(
        &self,
        user_id: Uuid,
        order_id: &str,
        amount_eur: f64,
    ) -> Result<EarnResult, Error> {
        if order_id.is_empty() {
            return Err(Error::InvalidInput("order_id and amount required".to_string()));
        }
        if !amount_eur.is_finite() || amount_eur <= 0.0 {
            return Err(Error::InvalidInput("amount must be positive".to_string()));
        }

        let ratio = self
            .config_i64(POINTS_PER_EURO_KEY, POINTS_PER_EURO_DEFAULT)
            .await?;
        let points = (amount_eur * ratio as f64).round() as i64;

        let (balance, tx) = self
            .add_points(
                user_id,
                points,
                TransactionType::Earn,
                TransactionSource::Purchase,
                &format!("Purchase reward (€{amount_eur:.2})"),
                json!({ "order_id": order_id }),
            )
            .await?;

        self.dispatch_notification(NewNotification {
            user_id,
            kind: "loyalty_points".to_string(),
            title: "Points Earned!".to_string(),
            message: format!(
                "You earned {} points from your purchase of €{amount_eur:.2}.",
                tx.amount
            ),
            data: json!({ "points": tx.amount, "order_id": order_id }),
        });

        Ok(EarnResult {
            earned: tx.amount,
            new_balance: balance.points,
        })
    }

    /// One-time welcome bonus, guarded per user by the signup source index.
    pub async fn signup_bonus(&self, user_id: Uuid) -> Result<SignupBonusResult, Error> {
        let bonus = self.config_i64(SIGNUP_BONUS_KEY, SIGNUP_BONUS_DEFAULT).await?;

        let (balance, _tx) = self
            .add_points(
                user_id,
                bonus,
                TransactionType::Earn,
                TransactionSource::Signup,
                "Welcome bonus for signing up",
                json!({}),
            )
            .await?;

        self.dispatch_notification(NewNotification {
            user_id,
            kind: "welcome".to_string(),
            title: "Welcome to Game Plug!".to_string(),
            message: format!("You received {bonus} bonus points for signing up."),
            data: json!({ "points": bonus }),
        });

        Ok(SignupBonusResult {
            earned: bonus,
            new_balance: balance.points,
            message: format!("Welcome! You earned {bonus} bonus points!"),
        })
    }

    /// Manual admin adjustment; positive amounts count as earns (and pick
    /// up the user's multiplier), negative ones as spends.
    pub async fn grant_points(
        &self,
        user_id: Uuid,
        amount: i64,
        reason: Option<&str>,
        admin_id: Uuid,
    ) -> Result<(LoyaltyBalance, PointsTransaction), Error> {
        if amount == 0 {
            return Err(Error::InvalidInput("amount must be non-zero".to_string()));
        }

        let tx_type = if amount > 0 {
            TransactionType::Earn
        } else {
            TransactionType::Spend
        };

        self.add_points(
            user_id,
            amount,
            tx_type,
            TransactionSource::AdminGrant,
            reason.unwrap_or("Admin adjustment"),
            json!({ "admin_id": admin_id }),
        )
        .await
    }

    /// Best-effort notification: spawned off the request path, failures
    /// logged and dropped.
    pub(crate) fn dispatch_notification(&self, notification: NewNotification) {
        let sink = Arc::clone(&self.notifier);
        tokio::spawn(async move {
            if let Err(e) = sink.deliver(&notification).await {
                warn!("notification delivery failed: {}", e);
            }
        });
    }

    async fn config_i64(&self, key: &str, fallback: i64) -> Result<i64, Error> {
        let value = self.config_repo.get_value(key).await?;
        Ok(value.and_then(coerce_i64).unwrap_or(fallback))
    }
}

fn coerce_i64(value: Value) -> Option<i64> {
    match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().map(|f| f.round() as i64)),
        Value::String(s) => s.parse().ok(),
        _ => None,
    }
}
