use anyhow::Result;
use async_trait::async_trait;
use mockall::automock;
use uuid::Uuid;

use crate::domain::entities::plans::{EditPlanEntity, InsertPlanEntity, PlanEntity};

/// Read-only catalog lookup used by the subscription lifecycle.
#[automock]
#[async_trait]
pub trait PlanCatalog {
    async fn find_by_id(&self, plan_id: Uuid) -> Result<Option<PlanEntity>>;
}

#[automock]
#[async_trait]
pub trait PlanRepository {
    async fn list_plans(&self) -> Result<Vec<PlanEntity>>;
    async fn create_plan(&self, insert_plan_entity: InsertPlanEntity) -> Result<PlanEntity>;
    async fn update_plan(
        &self,
        plan_id: Uuid,
        edit_plan_entity: EditPlanEntity,
    ) -> Result<Option<PlanEntity>>;
    async fn delete_plan(&self, plan_id: Uuid) -> Result<bool>;
}
