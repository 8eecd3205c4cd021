//! 意图分类：目录、分类器、指标

pub mod catalog;
pub mod classifier;
pub mod metrics;

pub use catalog::{
    default_intents, IntentCatalog, IntentMapping, DEFAULT_FALLBACK_TEAM, GENERAL_INTENT,
};
pub use classifier::{Classification, IntentClassifier};
pub use metrics::{ClassificationMetrics, ClassificationStats};
