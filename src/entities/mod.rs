pub mod ads;
pub mod spaces;
pub mod subscription_assignments;
pub mod subscription_plans;
pub mod users;

pub use ads as ad_entity;
pub use spaces as space_entity;
pub use subscription_assignments as subscription_assignment_entity;
pub use subscription_plans as subscription_plan_entity;
pub use users as user_entity;

pub use ads::AdStatus;
pub use users::AccountType;
