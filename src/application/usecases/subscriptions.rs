use std::sync::Arc;

use anyhow::anyhow;
use chrono::{DateTime, Utc};
use thiserror::Error;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::domain::{
    clock::Clock,
    entities::{
        plans::PlanEntity,
        subscriptions::{EditSubscriptionEntity, InsertSubscriptionEntity, SubscriptionEntity},
    },
    repositories::{plans::PlanCatalog, subscriptions::SubscriptionRepository},
    value_objects::{
        enums::{plan_durations::PlanDuration, subscription_statuses::SubscriptionStatus},
        subscriptions::{CreateSubscriptionRequest, SubscriptionView, UpdateSubscriptionRequest},
    },
};

#[derive(Debug, Error)]
pub enum SubscriptionError {
    #[error("subscription not found")]
    NotFound,
    #[error("plan not found: {0}")]
    PlanNotFound(Uuid),
    #[error("invalid plan duration: {0}")]
    InvalidPlanDuration(String),
    #[error("cannot update expired subscription")]
    Expired,
    #[error("subscription has already expired")]
    AlreadyExpired,
    #[error("subscription is not active (status {0})")]
    NotActive(SubscriptionStatus),
    #[error("can only renew cancelled subscriptions (status {0})")]
    NotCancelled(SubscriptionStatus),
    #[error("invalid request: {0}")]
    InvalidRequest(String),
    #[error(transparent)]
    Unavailable(#[from] anyhow::Error),
}

impl SubscriptionError {
    pub fn status_code(&self) -> axum::http::StatusCode {
        use axum::http::StatusCode;
        match self {
            SubscriptionError::NotFound | SubscriptionError::PlanNotFound(_) => {
                StatusCode::NOT_FOUND
            }
            SubscriptionError::InvalidPlanDuration(_) | SubscriptionError::InvalidRequest(_) => {
                StatusCode::BAD_REQUEST
            }
            SubscriptionError::Expired
            | SubscriptionError::AlreadyExpired
            | SubscriptionError::NotActive(_)
            | SubscriptionError::NotCancelled(_) => StatusCode::CONFLICT,
            SubscriptionError::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        }
    }
}

pub type UseCaseResult<T> = std::result::Result<T, SubscriptionError>;

/// Subscription lifecycle engine.
///
/// Holds no subscription state between calls: every operation re-reads the
/// row, applies lazy expiry against the clock, decides, then writes once.
/// Creation goes through an unconditional upsert, while cancel, renew and
/// plan change go through precondition-checked updates.
pub struct SubscriptionUseCase<P, S>
where
    P: PlanCatalog + Send + Sync + 'static,
    S: SubscriptionRepository + Send + Sync + 'static,
{
    plan_catalog: Arc<P>,
    subscription_repo: Arc<S>,
    clock: Arc<dyn Clock>,
}

impl<P, S> SubscriptionUseCase<P, S>
where
    P: PlanCatalog + Send + Sync + 'static,
    S: SubscriptionRepository + Send + Sync + 'static,
{
    pub fn new(plan_catalog: Arc<P>, subscription_repo: Arc<S>, clock: Arc<dyn Clock>) -> Self {
        Self {
            plan_catalog,
            subscription_repo,
            clock,
        }
    }

    /// Sets the user's desired plan. Inserts the first row, otherwise
    /// overwrites plan, status and dates whatever the previous status was.
    pub async fn create_subscription(
        &self,
        request: CreateSubscriptionRequest,
    ) -> UseCaseResult<SubscriptionView> {
        let user_id = request.user_id.trim().to_string();
        let plan_id = request.plan_id;

        if user_id.is_empty() {
            let err = SubscriptionError::InvalidRequest("user_id is required".to_string());
            warn!(
                %plan_id,
                status = err.status_code().as_u16(),
                "subscriptions: create requested without user id"
            );
            return Err(err);
        }

        info!(%user_id, %plan_id, "subscriptions: create requested");

        let plan = self.require_plan(&user_id, plan_id).await?;
        let now = self.clock.now();
        let expires_at = Self::expiry_for(&plan, now)?;

        let desired = InsertSubscriptionEntity {
            user_id: user_id.clone(),
            plan_id,
            status: SubscriptionStatus::Active.to_string(),
            start_date: now,
            expires_at,
            created_at: now,
        };

        let existing = self
            .subscription_repo
            .find_by_user_id(&user_id)
            .await
            .map_err(|err| {
                error!(
                    %user_id,
                    db_error = ?err,
                    "subscriptions: failed to load subscription before create"
                );
                SubscriptionError::Unavailable(err)
            })?;

        let subscription = match existing {
            None => match self
                .subscription_repo
                .insert(desired.clone())
                .await
                .map_err(|err| {
                    error!(
                        %user_id,
                        db_error = ?err,
                        "subscriptions: failed to insert subscription"
                    );
                    SubscriptionError::Unavailable(err)
                })? {
                Some(inserted) => {
                    info!(
                        %user_id,
                        subscription_id = %inserted.id,
                        "subscriptions: subscription created"
                    );
                    inserted
                }
                None => {
                    debug!(
                        %user_id,
                        "subscriptions: concurrent create won the insert, overwriting"
                    );
                    self.upsert(desired).await?
                }
            },
            Some(previous) => {
                info!(
                    %user_id,
                    previous_plan_id = %previous.plan_id,
                    previous_status = %previous.status,
                    "subscriptions: replacing existing subscription"
                );
                self.upsert(desired).await?
            }
        };

        Ok(SubscriptionView::new(subscription, Some(plan)))
    }

    pub async fn get_subscription(&self, user_id: &str) -> UseCaseResult<SubscriptionView> {
        debug!(%user_id, "subscriptions: get requested");

        let (subscription, _) = self.load_reconciled(user_id).await?;
        self.with_plan(subscription).await
    }

    /// Switches an active subscription to another plan. The period restarts
    /// now and the expiry follows the new plan's duration.
    pub async fn update_subscription(
        &self,
        user_id: &str,
        request: UpdateSubscriptionRequest,
    ) -> UseCaseResult<SubscriptionView> {
        let plan_id = request.plan_id;
        info!(%user_id, %plan_id, "subscriptions: plan change requested");

        let (subscription, lapsed) = self.load_reconciled(user_id).await?;
        if lapsed {
            let err = SubscriptionError::Expired;
            warn!(
                %user_id,
                status = err.status_code().as_u16(),
                "subscriptions: plan change rejected, subscription expired"
            );
            return Err(err);
        }
        Self::ensure_status(user_id, &subscription, SubscriptionStatus::Active)
            .map_err(SubscriptionError::NotActive)?;

        let plan = self.require_plan(user_id, plan_id).await?;
        let now = self.clock.now();
        let expires_at = Self::expiry_for(&plan, now)?;

        let changes = EditSubscriptionEntity {
            plan_id: Some(plan_id),
            start_date: Some(now),
            expires_at: Some(expires_at),
            ..Default::default()
        };

        let updated = self.apply(user_id, changes).await?;
        info!(
            %user_id,
            previous_plan_id = %subscription.plan_id,
            %plan_id,
            %expires_at,
            "subscriptions: plan changed"
        );

        Ok(SubscriptionView::new(updated, Some(plan)))
    }

    pub async fn cancel_subscription(&self, user_id: &str) -> UseCaseResult<SubscriptionView> {
        info!(%user_id, "subscriptions: cancel requested");

        let (subscription, lapsed) = self.load_reconciled(user_id).await?;
        if lapsed {
            let err = SubscriptionError::AlreadyExpired;
            warn!(
                %user_id,
                status = err.status_code().as_u16(),
                "subscriptions: cancel rejected, subscription expired"
            );
            return Err(err);
        }
        Self::ensure_status(user_id, &subscription, SubscriptionStatus::Active)
            .map_err(SubscriptionError::NotActive)?;

        let changes = EditSubscriptionEntity {
            status: Some(SubscriptionStatus::Cancelled.to_string()),
            ..Default::default()
        };

        let cancelled = self.apply(user_id, changes).await?;
        info!(%user_id, "subscriptions: subscription cancelled");

        self.with_plan(cancelled).await
    }

    /// Reactivates a cancelled subscription on its existing plan. The row is
    /// treated as freshly created: start, expiry and created timestamp restart.
    pub async fn renew_subscription(&self, user_id: &str) -> UseCaseResult<SubscriptionView> {
        info!(%user_id, "subscriptions: renew requested");

        let (subscription, _) = self.load_reconciled(user_id).await?;
        Self::ensure_status(user_id, &subscription, SubscriptionStatus::Cancelled)
            .map_err(SubscriptionError::NotCancelled)?;

        let plan = self.require_plan(user_id, subscription.plan_id).await?;
        let now = self.clock.now();
        let expires_at = Self::expiry_for(&plan, now)?;

        let changes = EditSubscriptionEntity {
            status: Some(SubscriptionStatus::Active.to_string()),
            start_date: Some(now),
            expires_at: Some(expires_at),
            created_at: Some(now),
            ..Default::default()
        };

        let renewed = self.apply(user_id, changes).await?;
        info!(
            %user_id,
            plan_id = %renewed.plan_id,
            %expires_at,
            "subscriptions: subscription renewed"
        );

        Ok(SubscriptionView::new(renewed, Some(plan)))
    }

    /// Administrative removal of the user's row.
    pub async fn delete_subscription(&self, user_id: &str) -> UseCaseResult<()> {
        info!(%user_id, "subscriptions: delete requested");

        let deleted = self
            .subscription_repo
            .delete_by_user_id(user_id)
            .await
            .map_err(|err| {
                error!(
                    %user_id,
                    db_error = ?err,
                    "subscriptions: failed to delete subscription"
                );
                SubscriptionError::Unavailable(err)
            })?;

        if !deleted {
            warn!(
                %user_id,
                status = SubscriptionError::NotFound.status_code().as_u16(),
                "subscriptions: nothing to delete"
            );
            return Err(SubscriptionError::NotFound);
        }

        info!(%user_id, "subscriptions: subscription deleted");
        Ok(())
    }

    /// Reads the user's row and applies lazy expiry. The returned flag is
    /// true when this call observed the ACTIVE -> EXPIRED transition.
    ///
    /// The corrective write is best-effort: a failure is logged and the
    /// returned row still reads EXPIRED.
    async fn load_reconciled(&self, user_id: &str) -> UseCaseResult<(SubscriptionEntity, bool)> {
        let mut subscription = self
            .subscription_repo
            .find_by_user_id(user_id)
            .await
            .map_err(|err| {
                error!(
                    %user_id,
                    db_error = ?err,
                    "subscriptions: failed to load subscription"
                );
                SubscriptionError::Unavailable(err)
            })?
            .ok_or_else(|| {
                warn!(
                    %user_id,
                    status = SubscriptionError::NotFound.status_code().as_u16(),
                    "subscriptions: no subscription for user"
                );
                SubscriptionError::NotFound
            })?;

        let now = self.clock.now();
        let lapsed = SubscriptionStatus::from_str(&subscription.status)
            == SubscriptionStatus::Active
            && now > subscription.expires_at;

        if lapsed {
            info!(
                %user_id,
                expires_at = %subscription.expires_at,
                "subscriptions: active subscription lapsed, marking expired"
            );
            subscription.status = SubscriptionStatus::Expired.to_string();

            let changes = EditSubscriptionEntity {
                status: Some(SubscriptionStatus::Expired.to_string()),
                ..Default::default()
            };
            match self.subscription_repo.update_by_user_id(user_id, changes).await {
                Ok(Some(_)) => {}
                Ok(None) => warn!(
                    %user_id,
                    "subscriptions: row vanished before expiry could be persisted"
                ),
                Err(err) => warn!(
                    %user_id,
                    db_error = ?err,
                    "subscriptions: failed to persist expired status"
                ),
            }
        }

        Ok((subscription, lapsed))
    }

    fn ensure_status(
        user_id: &str,
        subscription: &SubscriptionEntity,
        required: SubscriptionStatus,
    ) -> std::result::Result<(), SubscriptionStatus> {
        let current = SubscriptionStatus::from_str(&subscription.status);
        if current == required {
            return Ok(());
        }

        warn!(
            %user_id,
            current_status = %current,
            required_status = %required,
            status = axum::http::StatusCode::CONFLICT.as_u16(),
            "subscriptions: transition rejected"
        );
        Err(current)
    }

    async fn require_plan(&self, user_id: &str, plan_id: Uuid) -> UseCaseResult<PlanEntity> {
        let plan = self
            .plan_catalog
            .find_by_id(plan_id)
            .await
            .map_err(|err| {
                error!(
                    %user_id,
                    %plan_id,
                    db_error = ?err,
                    "subscriptions: failed to load plan"
                );
                SubscriptionError::Unavailable(err)
            })?;

        plan.ok_or_else(|| {
            let err = SubscriptionError::PlanNotFound(plan_id);
            warn!(
                %user_id,
                %plan_id,
                status = err.status_code().as_u16(),
                "subscriptions: plan not found"
            );
            err
        })
    }

    fn expiry_for(plan: &PlanEntity, start: DateTime<Utc>) -> UseCaseResult<DateTime<Utc>> {
        let duration = PlanDuration::from_str(&plan.duration).ok_or_else(|| {
            let err = SubscriptionError::InvalidPlanDuration(plan.duration.clone());
            warn!(
                plan_id = %plan.id,
                duration = %plan.duration,
                status = err.status_code().as_u16(),
                "subscriptions: plan has unknown duration class"
            );
            err
        })?;

        duration.expiry_from(start).ok_or_else(|| {
            SubscriptionError::Unavailable(anyhow!(
                "expiry for {start} + {duration} is out of range"
            ))
        })
    }

    async fn upsert(&self, desired: InsertSubscriptionEntity) -> UseCaseResult<SubscriptionEntity> {
        let user_id = desired.user_id.clone();
        let subscription = self
            .subscription_repo
            .upsert_by_user_id(desired)
            .await
            .map_err(|err| {
                error!(
                    %user_id,
                    db_error = ?err,
                    "subscriptions: failed to upsert subscription"
                );
                SubscriptionError::Unavailable(err)
            })?;

        info!(
            %user_id,
            subscription_id = %subscription.id,
            "subscriptions: subscription upserted"
        );
        Ok(subscription)
    }

    async fn apply(
        &self,
        user_id: &str,
        changes: EditSubscriptionEntity,
    ) -> UseCaseResult<SubscriptionEntity> {
        self.subscription_repo
            .update_by_user_id(user_id, changes)
            .await
            .map_err(|err| {
                error!(
                    %user_id,
                    db_error = ?err,
                    "subscriptions: failed to update subscription"
                );
                SubscriptionError::Unavailable(err)
            })?
            .ok_or_else(|| {
                warn!(%user_id, "subscriptions: row deleted before update was applied");
                SubscriptionError::NotFound
            })
    }

    /// Plan attributes are joined best-effort: a plan removed from the
    /// catalog, or a catalog that cannot be reached, yields a view without
    /// `plan` instead of failing a read or an already persisted transition.
    async fn with_plan(&self, subscription: SubscriptionEntity) -> UseCaseResult<SubscriptionView> {
        let user_id = subscription.user_id.clone();
        let plan_id = subscription.plan_id;

        let plan = match self.plan_catalog.find_by_id(plan_id).await {
            Ok(Some(plan)) => Some(plan),
            Ok(None) => {
                warn!(%user_id, %plan_id, "subscriptions: plan missing from catalog");
                None
            }
            Err(err) => {
                warn!(
                    %user_id,
                    %plan_id,
                    db_error = ?err,
                    "subscriptions: failed to load plan for view"
                );
                None
            }
        };

        Ok(SubscriptionView::new(subscription, plan))
    }
}
