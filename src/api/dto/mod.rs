//! Data Transfer Objects for REST request/response serialization.
//!
//! All request bodies and query strings use the camelCase wire format the
//! single-page front end sends.

pub mod ai_dto;
pub mod common_dto;
pub mod feedback_dto;
pub mod menu_dto;
pub mod order_dto;
pub mod reservation_dto;
pub mod review_dto;

pub use ai_dto::*;
pub use common_dto::*;
pub use feedback_dto::*;
pub use menu_dto::*;
pub use order_dto::*;
pub use reservation_dto::*;
pub use review_dto::*;
