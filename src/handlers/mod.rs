pub mod ad;
pub mod admin;
pub mod auth;
pub mod plan;
pub mod space;
pub mod subscription;

pub use ad::ad_config;
pub use admin::admin_config;
pub use auth::auth_config;
pub use plan::plan_config;
pub use space::space_config;
pub use subscription::subscription_config;
