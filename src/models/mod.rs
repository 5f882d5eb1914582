pub mod ad;
pub mod pagination;
pub mod plan;
pub mod quota;
pub mod space;
pub mod subscription;
pub mod user;

pub use ad::*;
pub use pagination::*;
pub use plan::*;
pub use quota::*;
pub use space::*;
pub use subscription::*;
pub use user::*;
