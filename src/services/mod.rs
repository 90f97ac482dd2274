//! Services module containing the flashing workflow
//!
//! Plan building, single-flight execution, archive loading and device
//! reset, tied together by `FlasherSession`.

pub mod archive_service;
pub mod flash_service;
pub mod plan_builder;
pub mod reset_service;
pub mod session;

pub use archive_service::*;
pub use flash_service::*;
pub use plan_builder::*;
pub use reset_service::*;
pub use session::*;
