use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::entities::plans::PlanEntity;

/// Admin payload for creating or replacing a catalog entry.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PlanModel {
    pub name: String,
    pub price: f64,
    pub features: Vec<String>,
    pub duration: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PlanView {
    pub id: Uuid,
    pub name: String,
    pub price: f64,
    pub features: Vec<String>,
    pub duration: String,
}

impl From<PlanEntity> for PlanView {
    fn from(value: PlanEntity) -> Self {
        Self {
            id: value.id,
            name: value.name,
            price: value.price,
            features: value.features,
            duration: value.duration,
        }
    }
}
