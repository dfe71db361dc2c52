pub mod plan_durations;
pub mod subscription_statuses;
