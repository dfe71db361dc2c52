use std::sync::Arc;

use thiserror::Error;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::domain::{
    entities::plans::{EditPlanEntity, InsertPlanEntity},
    repositories::plans::PlanRepository,
    value_objects::{
        enums::plan_durations::PlanDuration,
        plans::{PlanModel, PlanView},
    },
};

#[derive(Debug, Error)]
pub enum PlanError {
    #[error("plan not found")]
    NotFound,
    #[error("invalid plan: {0}")]
    Validation(String),
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl PlanError {
    pub fn status_code(&self) -> axum::http::StatusCode {
        use axum::http::StatusCode;
        match self {
            PlanError::NotFound => StatusCode::NOT_FOUND,
            PlanError::Validation(_) => StatusCode::BAD_REQUEST,
            PlanError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

pub type PlanResult<T> = std::result::Result<T, PlanError>;

/// Catalog administration. Subscriptions only ever read plans through
/// `PlanCatalog`.
pub struct PlanUseCase<R>
where
    R: PlanRepository + Send + Sync + 'static,
{
    plan_repo: Arc<R>,
}

impl<R> PlanUseCase<R>
where
    R: PlanRepository + Send + Sync + 'static,
{
    pub fn new(plan_repo: Arc<R>) -> Self {
        Self { plan_repo }
    }

    pub async fn list_plans(&self) -> PlanResult<Vec<PlanView>> {
        let plans = self.plan_repo.list_plans().await.map_err(|err| {
            error!(db_error = ?err, "plans: failed to list plans");
            PlanError::Internal(err)
        })?;

        info!(plan_count = plans.len(), "plans: plans loaded");
        Ok(plans.into_iter().map(PlanView::from).collect())
    }

    pub async fn create_plan(&self, plan_model: PlanModel) -> PlanResult<PlanView> {
        let plan_model = Self::validate(plan_model)?;

        let created = self
            .plan_repo
            .create_plan(InsertPlanEntity {
                name: plan_model.name,
                price: plan_model.price,
                features: serde_json::json!(plan_model.features),
                duration: plan_model.duration,
            })
            .await
            .map_err(|err| {
                error!(db_error = ?err, "plans: failed to create plan");
                PlanError::Internal(err)
            })?;

        info!(plan_id = %created.id, "plans: plan created");
        Ok(created.into())
    }

    pub async fn update_plan(&self, plan_id: Uuid, plan_model: PlanModel) -> PlanResult<PlanView> {
        let plan_model = Self::validate(plan_model)?;

        let updated = self
            .plan_repo
            .update_plan(
                plan_id,
                EditPlanEntity {
                    name: plan_model.name,
                    price: plan_model.price,
                    features: serde_json::json!(plan_model.features),
                    duration: plan_model.duration,
                },
            )
            .await
            .map_err(|err| {
                error!(%plan_id, db_error = ?err, "plans: failed to update plan");
                PlanError::Internal(err)
            })?
            .ok_or_else(|| {
                warn!(%plan_id, "plans: update target not found");
                PlanError::NotFound
            })?;

        info!(%plan_id, "plans: plan updated");
        Ok(updated.into())
    }

    pub async fn delete_plan(&self, plan_id: Uuid) -> PlanResult<()> {
        let deleted = self.plan_repo.delete_plan(plan_id).await.map_err(|err| {
            error!(%plan_id, db_error = ?err, "plans: failed to delete plan");
            PlanError::Internal(err)
        })?;

        if !deleted {
            warn!(%plan_id, "plans: delete target not found");
            return Err(PlanError::NotFound);
        }

        info!(%plan_id, "plans: plan deleted");
        Ok(())
    }

    fn validate(mut plan_model: PlanModel) -> PlanResult<PlanModel> {
        plan_model.name = plan_model.name.trim().to_string();
        plan_model
            .features
            .retain(|feature| !feature.trim().is_empty());

        let problem = if plan_model.name.is_empty() {
            Some("name is required".to_string())
        } else if !plan_model.price.is_finite() || plan_model.price < 0.0 {
            Some("price must be a non-negative number".to_string())
        } else if plan_model.features.is_empty() {
            Some("at least one feature is required".to_string())
        } else if PlanDuration::from_str(&plan_model.duration).is_none() {
            Some(format!(
                "duration must be one of monthly, yearly (got {})",
                plan_model.duration
            ))
        } else {
            None
        };

        match problem {
            Some(message) => {
                warn!(reason = %message, "plans: rejected plan payload");
                Err(PlanError::Validation(message))
            }
            None => Ok(plan_model),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{entities::plans::PlanEntity, repositories::plans::MockPlanRepository};
    use mockall::predicate::eq;

    fn model(duration: &str) -> PlanModel {
        PlanModel {
            name: " Pro ".to_string(),
            price: 12.5,
            features: vec!["exports".to_string(), " ".to_string()],
            duration: duration.to_string(),
        }
    }

    #[tokio::test]
    async fn create_plan_normalizes_payload() {
        let mut plan_repo = MockPlanRepository::new();
        plan_repo
            .expect_create_plan()
            .withf(|entity| {
                entity.name == "Pro"
                    && entity.features == serde_json::json!(["exports"])
                    && entity.duration == "monthly"
            })
            .times(1)
            .returning(|entity| {
                Ok(PlanEntity {
                    id: Uuid::new_v4(),
                    name: entity.name,
                    price: entity.price,
                    features: vec!["exports".to_string()],
                    duration: entity.duration,
                })
            });

        let usecase = PlanUseCase::new(Arc::new(plan_repo));
        let view = usecase.create_plan(model("monthly")).await.unwrap();

        assert_eq!(view.name, "Pro");
        assert_eq!(view.features, vec!["exports".to_string()]);
    }

    #[tokio::test]
    async fn invalid_payloads_never_reach_the_store() {
        let usecase = PlanUseCase::new(Arc::new(MockPlanRepository::new()));

        let mut negative = model("monthly");
        negative.price = -1.0;
        let mut no_features = model("yearly");
        no_features.features.clear();
        let mut unnamed = model("yearly");
        unnamed.name = "  ".to_string();

        for payload in [model("weekly"), negative, no_features, unnamed] {
            let err = usecase.create_plan(payload).await.unwrap_err();
            assert!(matches!(err, PlanError::Validation(_)));
        }
    }

    #[tokio::test]
    async fn update_missing_plan_is_not_found() {
        let plan_id = Uuid::new_v4();
        let mut plan_repo = MockPlanRepository::new();
        plan_repo
            .expect_update_plan()
            .with(eq(plan_id), mockall::predicate::always())
            .returning(|_, _| Ok(None));

        let usecase = PlanUseCase::new(Arc::new(plan_repo));
        let err = usecase.update_plan(plan_id, model("yearly")).await.unwrap_err();

        assert!(matches!(err, PlanError::NotFound));
    }

    #[tokio::test]
    async fn delete_reports_missing_plan() {
        let plan_id = Uuid::new_v4();
        let mut plan_repo = MockPlanRepository::new();
        plan_repo
            .expect_delete_plan()
            .with(eq(plan_id))
            .returning(|_| Ok(false));

        let usecase = PlanUseCase::new(Arc::new(plan_repo));
        let err = usecase.delete_plan(plan_id).await.unwrap_err();

        assert!(matches!(err, PlanError::NotFound));
        assert_eq!(err.status_code(), axum::http::StatusCode::NOT_FOUND);
    }
}
