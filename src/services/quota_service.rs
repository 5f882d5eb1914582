use crate::entities::{
    AccountType, AdStatus, ad_entity as ads, space_entity as spaces,
    subscription_assignment_entity as assignments, subscription_plan_entity as plans,
    user_entity as users,
};
use crate::error::{AppError, AppResult};
use crate::models::{DowngradeOutcome, QuotaSummary};
use chrono::Utc;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait,
    IntoActiveModel, QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};
use std::sync::Arc;

/// Entitlement accounting for accounts: how many active ads/spaces a
/// subscription allows, whether a creation is admissible right now, and the
/// reconciliation that trims usage down to a smaller plan.
///
/// Ineligibility ("no subscription", "quota exhausted", "wrong state") is an
/// ordinary outcome and comes back as `false`/`None` inside `Ok`; only
/// persistence failures surface as `Err`.
#[derive(Clone)]
pub struct QuotaService {
    pool: Arc<DatabaseConnection>,
}

impl QuotaService {
    pub fn new(pool: impl Into<Arc<DatabaseConnection>>) -> Self {
        Self { pool: pool.into() }
    }

    /// Takes an exclusive lock on the account's `users` row for the rest of
    /// the transaction. Admission checks and the mutation they guard must
    /// run behind this lock so concurrent requests for one account
    /// serialize instead of both passing the count.
    pub(crate) async fn lock_account_on<C: ConnectionTrait>(
        &self,
        conn: &C,
        user_id: i64,
    ) -> AppResult<()> {
        users::Entity::find_by_id(user_id)
            .lock_exclusive()
            .one(conn)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;
        Ok(())
    }

    /// The account's active subscription: newest assignment with `status`
    /// set and an end date in the future, together with its plan.
    pub async fn get_active_subscription(
        &self,
        user_id: i64,
    ) -> AppResult<Option<(assignments::Model, plans::Model)>> {
        self.get_active_subscription_on(self.pool.as_ref(), user_id).await
    }

    pub(crate) async fn get_active_subscription_on<C: ConnectionTrait>(
        &self,
        conn: &C,
        user_id: i64,
    ) -> AppResult<Option<(assignments::Model, plans::Model)>> {
        let assignment = assignments::Entity::find()
            .filter(assignments::Column::UserId.eq(user_id))
            .filter(assignments::Column::Status.eq(true))
            .filter(assignments::Column::EndDate.gt(Utc::now()))
            .order_by_desc(assignments::Column::StartDate)
            .one(conn)
            .await?;

        let Some(assignment) = assignment else {
            return Ok(None);
        };

        let plan = plans::Entity::find_by_id(assignment.plan_id)
            .one(conn)
            .await?
            .ok_or_else(|| {
                AppError::InternalError(format!(
                    "Subscription assignment {} references missing plan {}",
                    assignment.id, assignment.plan_id
                ))
            })?;

        Ok(Some((assignment, plan)))
    }

    /// Ads counting against the quota: everything not in the trash.
    pub async fn count_active_ads(&self, user_id: i64) -> AppResult<i64> {
        self.count_active_ads_on(self.pool.as_ref(), user_id).await
    }

    pub(crate) async fn count_active_ads_on<C: ConnectionTrait>(
        &self,
        conn: &C,
        user_id: i64,
    ) -> AppResult<i64> {
        #[derive(Debug, sea_orm::FromQueryResult)]
        struct CountRow {
            count: i64,
        }
        let count = ads::Entity::find()
            .filter(ads::Column::UserId.eq(user_id))
            .filter(ads::Column::Status.ne(AdStatus::Trash))
            .select_only()
            .column_as(Expr::val(1).count(), "count")
            .into_model::<CountRow>()
            .one(conn)
            .await?
            .map(|r| r.count)
            .unwrap_or(0);
        Ok(count)
    }

    /// Spaces only exist for agencies; every other account type counts 0.
    pub async fn count_active_spaces(&self, user: &users::Model) -> AppResult<i64> {
        self.count_active_spaces_on(self.pool.as_ref(), user).await
    }

    pub(crate) async fn count_active_spaces_on<C: ConnectionTrait>(
        &self,
        conn: &C,
        user: &users::Model,
    ) -> AppResult<i64> {
        if user.account_type != AccountType::Agency {
            return Ok(0);
        }
        #[derive(Debug, sea_orm::FromQueryResult)]
        struct CountRow {
            count: i64,
        }
        let count = spaces::Entity::find()
            .filter(spaces::Column::UserId.eq(user.id))
            .filter(spaces::Column::Status.eq(true))
            .select_only()
            .column_as(Expr::val(1).count(), "count")
            .into_model::<CountRow>()
            .one(conn)
            .await?
            .map(|r| r.count)
            .unwrap_or(0);
        Ok(count)
    }

    /// Remaining ad slots, `None` when there is no active subscription.
    pub async fn ad_quota_remaining(&self, user: &users::Model) -> AppResult<Option<i64>> {
        let Some((_, plan)) = self.get_active_subscription(user.id).await? else {
            return Ok(None);
        };
        let active = self.count_active_ads(user.id).await?;
        Ok(Some((plan.max_ads as i64 - active).max(0)))
    }

    /// Remaining space slots, `None` for non-agencies or without subscription.
    pub async fn space_quota_remaining(&self, user: &users::Model) -> AppResult<Option<i64>> {
        if user.account_type != AccountType::Agency {
            return Ok(None);
        }
        let Some((_, plan)) = self.get_active_subscription(user.id).await? else {
            return Ok(None);
        };
        let active = self.count_active_spaces(user).await?;
        Ok(Some((plan.max_spaces as i64 - active).max(0)))
    }

    /// Point-in-time admission check, not a reservation. Callers that need
    /// the check and the insert to be atomic must run both in one
    /// transaction via the `_on` variant.
    pub async fn can_create_ad(&self, user: &users::Model) -> AppResult<bool> {
        self.can_create_ad_on(self.pool.as_ref(), user).await
    }

    pub(crate) async fn can_create_ad_on<C: ConnectionTrait>(
        &self,
        conn: &C,
        user: &users::Model,
    ) -> AppResult<bool> {
        let Some((_, plan)) = self.get_active_subscription_on(conn, user.id).await? else {
            return Ok(false);
        };
        let active = self.count_active_ads_on(conn, user.id).await?;
        Ok(active < plan.max_ads as i64)
    }

    pub async fn can_create_space(&self, user: &users::Model) -> AppResult<bool> {
        self.can_create_space_on(self.pool.as_ref(), user).await
    }

    pub(crate) async fn can_create_space_on<C: ConnectionTrait>(
        &self,
        conn: &C,
        user: &users::Model,
    ) -> AppResult<bool> {
        if user.account_type != AccountType::Agency {
            return Ok(false);
        }
        let Some((_, plan)) = self.get_active_subscription_on(conn, user.id).await? else {
            return Ok(false);
        };
        let active = self.count_active_spaces_on(conn, user).await?;
        Ok(active < plan.max_spaces as i64)
    }

    /// Oldest active rows beyond what the plan allows. The tie-break is
    /// creation time ascending, then id, so reruns pick the same victims.
    fn select_surplus_victims<T, K>(items: &[T], max_allowed: i32, key: K) -> Vec<i64>
    where
        K: Fn(&T) -> (Option<chrono::DateTime<Utc>>, i64),
    {
        let surplus = items.len().saturating_sub(max_allowed.max(0) as usize);
        if surplus == 0 {
            return Vec::new();
        }
        let mut keyed: Vec<(Option<chrono::DateTime<Utc>>, i64)> =
            items.iter().map(&key).collect();
        keyed.sort();
        keyed.into_iter().take(surplus).map(|(_, id)| id).collect()
    }

    fn ad_victims(active_ads: &[ads::Model], max_ads: i32) -> Vec<i64> {
        Self::select_surplus_victims(active_ads, max_ads, |a| (a.created_at, a.id))
    }

    fn space_victims(active_spaces: &[spaces::Model], max_spaces: i32) -> Vec<i64> {
        Self::select_surplus_victims(active_spaces, max_spaces, |s| (s.created_at, s.id))
    }

    /// Trim the account's usage down to `new_plan`, oldest entries first.
    /// Runs in its own transaction; both phases commit or neither does.
    pub async fn enforce_quota_downgrade(
        &self,
        user: &users::Model,
        new_plan: &plans::Model,
    ) -> AppResult<DowngradeOutcome> {
        let txn = self.pool.begin().await?;
        let outcome = self.enforce_quota_downgrade_on(&txn, user, new_plan).await?;
        txn.commit().await?;
        Ok(outcome)
    }

    pub(crate) async fn enforce_quota_downgrade_on<C: ConnectionTrait>(
        &self,
        conn: &C,
        user: &users::Model,
        new_plan: &plans::Model,
    ) -> AppResult<DowngradeOutcome> {
        self.lock_account_on(conn, user.id).await?;

        let mut outcome = DowngradeOutcome::default();

        // Phase 1: surplus ads go to the trash.
        let active_ads = ads::Entity::find()
            .filter(ads::Column::UserId.eq(user.id))
            .filter(ads::Column::Status.ne(AdStatus::Trash))
            .all(conn)
            .await?;
        let victims = Self::ad_victims(&active_ads, new_plan.max_ads);
        for ad in active_ads
            .iter()
            .filter(|a| victims.contains(&a.id))
            .cloned()
        {
            let mut am = ad.into_active_model();
            am.status = Set(AdStatus::Trash);
            am.update(conn).await?;
            outcome.ads_trashed += 1;
        }

        // Phase 2: surplus spaces are deactivated and drag their own
        // remaining ads into the trash with them.
        if user.account_type == AccountType::Agency {
            let active_spaces = spaces::Entity::find()
                .filter(spaces::Column::UserId.eq(user.id))
                .filter(spaces::Column::Status.eq(true))
                .all(conn)
                .await?;
            let space_victims = Self::space_victims(&active_spaces, new_plan.max_spaces);
            for space in active_spaces
                .iter()
                .filter(|s| space_victims.contains(&s.id))
                .cloned()
            {
                let space_id = space.id;
                let mut am = space.into_active_model();
                am.status = Set(false);
                am.update(conn).await?;
                outcome.spaces_deactivated += 1;

                let orphaned = ads::Entity::find()
                    .filter(ads::Column::SpaceId.eq(space_id))
                    .filter(ads::Column::Status.ne(AdStatus::Trash))
                    .all(conn)
                    .await?;
                for ad in orphaned {
                    let mut am = ad.into_active_model();
                    am.status = Set(AdStatus::Trash);
                    am.update(conn).await?;
                    outcome.cascade_ads_trashed += 1;
                }
            }
        }

        if !outcome.is_noop() {
            log::info!(
                "Quota downgrade for user {} to plan '{}': {} ads trashed, {} spaces deactivated, {} ads trashed by cascade",
                user.id,
                new_plan.label,
                outcome.ads_trashed,
                outcome.spaces_deactivated,
                outcome.cascade_ads_trashed
            );
        }

        Ok(outcome)
    }

    /// Move a trashed ad back into moderation, if the owner's quota allows
    /// another active ad. Returns false without mutating on any failed
    /// precondition. The status check and the quota check both run on a
    /// fresh row behind the account lock; the caller's model may be stale.
    pub async fn reactivate_ad(&self, ad: &ads::Model) -> AppResult<bool> {
        if ad.status != AdStatus::Trash {
            return Ok(false);
        }

        let txn = self.pool.begin().await?;
        self.lock_account_on(&txn, ad.user_id).await?;
        let Some(ad) = ads::Entity::find_by_id(ad.id).one(&txn).await? else {
            return Ok(false);
        };
        if ad.status != AdStatus::Trash {
            return Ok(false);
        }
        let Some((_, plan)) = self.get_active_subscription_on(&txn, ad.user_id).await? else {
            return Ok(false);
        };
        let active = self.count_active_ads_on(&txn, ad.user_id).await?;
        if active >= plan.max_ads as i64 {
            return Ok(false);
        }

        // Reactivated ads re-enter moderation rather than skipping it.
        let mut am = ad.into_active_model();
        am.status = Set(AdStatus::Pending);
        am.update(&txn).await?;
        txn.commit().await?;
        Ok(true)
    }

    /// Turn an inactive agency space back on, subject to the space quota.
    pub async fn reactivate_space(&self, user: &users::Model, space: &spaces::Model) -> AppResult<bool> {
        if space.status {
            return Ok(false);
        }
        if user.account_type != AccountType::Agency {
            return Ok(false);
        }

        let txn = self.pool.begin().await?;
        self.lock_account_on(&txn, user.id).await?;
        let Some(space) = spaces::Entity::find_by_id(space.id).one(&txn).await? else {
            return Ok(false);
        };
        if space.status {
            return Ok(false);
        }
        let Some((_, plan)) = self.get_active_subscription_on(&txn, user.id).await? else {
            return Ok(false);
        };
        let active = self.count_active_spaces_on(&txn, user).await?;
        if active >= plan.max_spaces as i64 {
            return Ok(false);
        }

        let mut am = space.into_active_model();
        am.status = Set(true);
        am.update(&txn).await?;
        txn.commit().await?;
        Ok(true)
    }

    /// Dashboard aggregate; never mutates.
    pub async fn get_quota_info(&self, user: &users::Model) -> AppResult<QuotaSummary> {
        let Some((assignment, plan)) = self.get_active_subscription(user.id).await? else {
            return Ok(QuotaSummary::without_subscription());
        };
        let active_ads = self.count_active_ads(user.id).await?;
        let active_spaces = self.count_active_spaces(user).await?;
        Ok(QuotaSummary::from_subscription(
            &assignment,
            &plan,
            active_ads,
            active_spaces,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use sea_orm::{DatabaseBackend, MockDatabase};
    use std::collections::BTreeMap;

    fn user(id: i64, account_type: AccountType) -> users::Model {
        users::Model {
            id,
            email: format!("user{id}@example.com"),
            username: format!("user{id}"),
            password_hash: "x".to_string(),
            account_type,
            status: 1,
            created_at: None,
            updated_at: None,
        }
    }

    fn plan(max_ads: i32, max_spaces: i32) -> plans::Model {
        plans::Model {
            id: 1,
            label: "Basic".to_string(),
            max_ads,
            max_spaces,
            duration_days: 30,
            is_active: true,
            created_at: None,
            updated_at: None,
        }
    }

    fn assignment(user_id: i64, plan_id: i64) -> assignments::Model {
        let now = Utc::now();
        assignments::Model {
            id: 100,
            user_id,
            plan_id,
            start_date: now - Duration::days(1),
            end_date: now + Duration::days(29),
            status: true,
            created_at: None,
        }
    }

    fn ad(id: i64, user_id: i64, status: AdStatus, created_day: u32) -> ads::Model {
        ads::Model {
            id,
            user_id,
            space_id: None,
            title: format!("ad {id}"),
            description: None,
            price_cents: 1000,
            status,
            created_at: Some(Utc.with_ymd_and_hms(2026, 1, created_day, 0, 0, 0).unwrap()),
            updated_at: None,
        }
    }

    fn space(id: i64, user_id: i64, status: bool, created_day: u32) -> spaces::Model {
        spaces::Model {
            id,
            user_id,
            name: format!("space {id}"),
            status,
            created_at: Some(Utc.with_ymd_and_hms(2026, 1, created_day, 0, 0, 0).unwrap()),
            updated_at: None,
        }
    }

    fn count_row(count: i64) -> BTreeMap<&'static str, sea_orm::Value> {
        BTreeMap::from([("count", sea_orm::Value::from(count))])
    }

    fn ad_in_space(id: i64, user_id: i64, space_id: i64, status: AdStatus) -> ads::Model {
        ads::Model {
            space_id: Some(space_id),
            ..ad(id, user_id, status, 1)
        }
    }

    #[test]
    fn test_ad_victims_picks_oldest_surplus() {
        // 7 active ads against a max of 5: the 2 oldest go.
        let items: Vec<ads::Model> = vec![
            ad(1, 1, AdStatus::Valid, 10),
            ad(2, 1, AdStatus::Valid, 3),
            ad(3, 1, AdStatus::Pending, 7),
            ad(4, 1, AdStatus::Valid, 1),
            ad(5, 1, AdStatus::Blocked, 20),
            ad(6, 1, AdStatus::Valid, 15),
            ad(7, 1, AdStatus::Pending, 12),
        ];
        let victims = QuotaService::ad_victims(&items, 5);
        assert_eq!(victims, vec![4, 2]);
    }

    #[test]
    fn test_ad_victims_none_within_quota() {
        let items = vec![ad(1, 1, AdStatus::Valid, 1), ad(2, 1, AdStatus::Valid, 2)];
        assert!(QuotaService::ad_victims(&items, 5).is_empty());
        assert!(QuotaService::ad_victims(&items, 2).is_empty());
    }

    #[test]
    fn test_ad_victims_all_when_plan_allows_zero() {
        let items = vec![ad(1, 1, AdStatus::Valid, 2), ad(2, 1, AdStatus::Valid, 1)];
        assert_eq!(QuotaService::ad_victims(&items, 0), vec![2, 1]);
    }

    #[test]
    fn test_ad_victims_tie_break_on_id() {
        let same_day = vec![
            ad(9, 1, AdStatus::Valid, 5),
            ad(3, 1, AdStatus::Valid, 5),
            ad(6, 1, AdStatus::Valid, 5),
        ];
        assert_eq!(QuotaService::ad_victims(&same_day, 1), vec![3, 6]);
    }

    #[test]
    fn test_space_victims_oldest_first() {
        let items = vec![
            space(1, 1, true, 8),
            space(2, 1, true, 2),
            space(3, 1, true, 5),
        ];
        assert_eq!(QuotaService::space_victims(&items, 1), vec![2, 3]);
    }

    #[tokio::test]
    async fn test_get_active_subscription_none() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<assignments::Model>::new()])
            .into_connection();
        let svc = QuotaService::new(db);
        let result = svc.get_active_subscription(1).await.unwrap();
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_get_active_subscription_found() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![assignment(1, 1)]])
            .append_query_results([vec![plan(5, 2)]])
            .into_connection();
        let svc = QuotaService::new(db);
        let (a, p) = svc.get_active_subscription(1).await.unwrap().unwrap();
        assert_eq!(a.id, 100);
        assert_eq!(p.max_ads, 5);
    }

    #[tokio::test]
    async fn test_can_create_ad_below_limit() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![assignment(1, 1)]])
            .append_query_results([vec![plan(5, 2)]])
            .append_query_results([vec![count_row(4)]])
            .into_connection();
        let svc = QuotaService::new(db);
        assert!(svc.can_create_ad(&user(1, AccountType::Visitor)).await.unwrap());
    }

    #[tokio::test]
    async fn test_can_create_ad_at_limit() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![assignment(1, 1)]])
            .append_query_results([vec![plan(5, 2)]])
            .append_query_results([vec![count_row(5)]])
            .into_connection();
        let svc = QuotaService::new(db);
        assert!(!svc.can_create_ad(&user(1, AccountType::Visitor)).await.unwrap());
    }

    #[tokio::test]
    async fn test_can_create_ad_without_subscription() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<assignments::Model>::new()])
            .into_connection();
        let svc = QuotaService::new(db);
        assert!(!svc.can_create_ad(&user(1, AccountType::Visitor)).await.unwrap());
    }

    #[tokio::test]
    async fn test_can_create_space_rejects_non_agency() {
        // No queries should be needed: the account type check short-circuits.
        let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
        let svc = QuotaService::new(db);
        assert!(!svc.can_create_space(&user(1, AccountType::Visitor)).await.unwrap());
    }

    #[tokio::test]
    async fn test_count_active_spaces_zero_for_non_agency() {
        let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
        let svc = QuotaService::new(db);
        assert_eq!(
            svc.count_active_spaces(&user(1, AccountType::Employee))
                .await
                .unwrap(),
            0
        );
    }

    #[tokio::test]
    async fn test_space_quota_remaining_none_for_non_agency() {
        let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
        let svc = QuotaService::new(db);
        assert!(
            svc.space_quota_remaining(&user(1, AccountType::Admin))
                .await
                .unwrap()
                .is_none()
        );
    }

    #[tokio::test]
    async fn test_ad_quota_remaining_clamps_at_zero() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![assignment(1, 1)]])
            .append_query_results([vec![plan(5, 2)]])
            .append_query_results([vec![count_row(7)]])
            .into_connection();
        let svc = QuotaService::new(db);
        assert_eq!(
            svc.ad_quota_remaining(&user(1, AccountType::Visitor))
                .await
                .unwrap(),
            Some(0)
        );
    }

    #[tokio::test]
    async fn test_reactivate_ad_rejects_non_trash_status() {
        let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
        let svc = QuotaService::new(db);
        let valid_ad = ad(1, 1, AdStatus::Valid, 1);
        assert!(!svc.reactivate_ad(&valid_ad).await.unwrap());
    }

    #[tokio::test]
    async fn test_reactivate_ad_rejects_without_subscription() {
        let trashed = ad(1, 1, AdStatus::Trash, 1);
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![user(1, AccountType::Visitor)]])
            .append_query_results([vec![trashed.clone()]])
            .append_query_results([Vec::<assignments::Model>::new()])
            .into_connection();
        let svc = QuotaService::new(db);
        assert!(!svc.reactivate_ad(&trashed).await.unwrap());
    }

    #[tokio::test]
    async fn test_reactivate_ad_rechecks_status_on_fresh_row() {
        // The caller holds a stale trash model; the row was already
        // reactivated by a concurrent request.
        let stale = ad(1, 1, AdStatus::Trash, 1);
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![user(1, AccountType::Visitor)]])
            .append_query_results([vec![ad(1, 1, AdStatus::Pending, 1)]])
            .into_connection();
        let svc = QuotaService::new(db);
        assert!(!svc.reactivate_ad(&stale).await.unwrap());
    }

    #[tokio::test]
    async fn test_reactivate_space_rejects_active_space() {
        let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
        let svc = QuotaService::new(db);
        let active = space(1, 1, true, 1);
        assert!(
            !svc.reactivate_space(&user(1, AccountType::Agency), &active)
                .await
                .unwrap()
        );
    }

    #[tokio::test]
    async fn test_get_quota_info_without_subscription() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<assignments::Model>::new()])
            .into_connection();
        let svc = QuotaService::new(db);
        let info = svc.get_quota_info(&user(1, AccountType::Agency)).await.unwrap();
        assert!(!info.has_active_subscription);
        assert_eq!(info.active_ads, 0);
        assert_eq!(info.remaining_ads, 0);
    }

    #[tokio::test]
    async fn test_enforce_downgrade_trashes_oldest_surplus_ads() {
        // 7 active ads against a new max of 5: ads 4 and 2 (the oldest
        // two by creation time) go to the trash, nothing else moves.
        let active: Vec<ads::Model> = vec![
            ad(1, 1, AdStatus::Valid, 10),
            ad(2, 1, AdStatus::Valid, 3),
            ad(3, 1, AdStatus::Pending, 7),
            ad(4, 1, AdStatus::Valid, 1),
            ad(5, 1, AdStatus::Blocked, 20),
            ad(6, 1, AdStatus::Valid, 15),
            ad(7, 1, AdStatus::Pending, 12),
        ];
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![user(1, AccountType::Visitor)]])
            .append_query_results([active])
            .append_query_results([vec![ad(2, 1, AdStatus::Trash, 3)]])
            .append_query_results([vec![ad(4, 1, AdStatus::Trash, 1)]])
            .into_connection();
        let svc = QuotaService::new(db);
        let outcome = svc
            .enforce_quota_downgrade(&user(1, AccountType::Visitor), &plan(5, 0))
            .await
            .unwrap();
        assert_eq!(outcome.ads_trashed, 2);
        assert_eq!(outcome.spaces_deactivated, 0);
        assert_eq!(outcome.cascade_ads_trashed, 0);
    }

    #[tokio::test]
    async fn test_enforce_downgrade_noop_within_quota() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![user(1, AccountType::Visitor)]])
            .append_query_results([vec![ad(1, 1, AdStatus::Valid, 1)]])
            .into_connection();
        let svc = QuotaService::new(db);
        let outcome = svc
            .enforce_quota_downgrade(&user(1, AccountType::Visitor), &plan(5, 0))
            .await
            .unwrap();
        assert!(outcome.is_noop());
    }

    #[tokio::test]
    async fn test_enforce_downgrade_cascades_space_ads() {
        // Agency drops to a single space: the older space is deactivated
        // and its two remaining ads are trashed with it, while the ad
        // quota itself is not exceeded.
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![user(1, AccountType::Agency)]])
            .append_query_results([vec![
                ad_in_space(1, 1, 1, AdStatus::Valid),
                ad_in_space(2, 1, 1, AdStatus::Pending),
                ad_in_space(3, 1, 2, AdStatus::Valid),
            ]])
            .append_query_results([vec![space(1, 1, true, 2), space(2, 1, true, 9)]])
            .append_query_results([vec![space(1, 1, false, 2)]])
            .append_query_results([vec![
                ad_in_space(1, 1, 1, AdStatus::Valid),
                ad_in_space(2, 1, 1, AdStatus::Pending),
            ]])
            .append_query_results([vec![ad_in_space(1, 1, 1, AdStatus::Trash)]])
            .append_query_results([vec![ad_in_space(2, 1, 1, AdStatus::Trash)]])
            .into_connection();
        let svc = QuotaService::new(db);
        let outcome = svc
            .enforce_quota_downgrade(&user(1, AccountType::Agency), &plan(10, 1))
            .await
            .unwrap();
        assert_eq!(outcome.ads_trashed, 0);
        assert_eq!(outcome.spaces_deactivated, 1);
        assert_eq!(outcome.cascade_ads_trashed, 2);
    }

    #[tokio::test]
    async fn test_get_quota_info_with_subscription() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![assignment(1, 1)]])
            .append_query_results([vec![plan(10, 3)]])
            .append_query_results([vec![count_row(4)]])
            .append_query_results([vec![count_row(1)]])
            .into_connection();
        let svc = QuotaService::new(db);
        let info = svc.get_quota_info(&user(1, AccountType::Agency)).await.unwrap();
        assert!(info.has_active_subscription);
        assert_eq!(info.active_ads, 4);
        assert_eq!(info.active_spaces, 1);
        assert_eq!(info.remaining_ads, 6);
        assert_eq!(info.remaining_spaces, 2);
    }
}
