//! 核心层：错误、分派、统计汇总、引擎门面与构建器

pub mod builder;
pub mod dispatcher;
pub mod engine;
pub mod error;
pub mod stats;

pub use builder::EngineBuilder;
pub use dispatcher::{Assignment, Dispatcher};
pub use engine::{RoutingEngine, Triage};
pub use error::{ClassificationFailure, RouterError};
pub use stats::SystemStats;
