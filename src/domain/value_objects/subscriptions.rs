use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{
    entities::{plans::PlanEntity, subscriptions::SubscriptionEntity},
    value_objects::{
        enums::subscription_statuses::SubscriptionStatus, plans::PlanView,
    },
};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateSubscriptionRequest {
    pub user_id: String,
    pub plan_id: Uuid,
}

/// The user comes from the path, not the body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateSubscriptionRequest {
    pub plan_id: Uuid,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SubscriptionView {
    pub id: Uuid,
    pub user_id: String,
    pub plan_id: Uuid,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plan: Option<PlanView>,
    pub status: SubscriptionStatus,
    pub start_date: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl SubscriptionView {
    pub fn new(subscription: SubscriptionEntity, plan: Option<PlanEntity>) -> Self {
        Self {
            id: subscription.id,
            user_id: subscription.user_id,
            plan_id: subscription.plan_id,
            plan: plan.map(PlanView::from),
            status: SubscriptionStatus::from_str(&subscription.status),
            start_date: subscription.start_date,
            expires_at: subscription.expires_at,
            created_at: subscription.created_at,
        }
    }
}
