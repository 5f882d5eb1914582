pub mod ad_service;
pub mod auth_service;
pub mod plan_service;
pub mod quota_service;
pub mod space_service;
pub mod subscription_service;

pub use ad_service::*;
pub use auth_service::*;
pub use plan_service::*;
pub use quota_service::*;
pub use space_service::*;
pub use subscription_service::*;
