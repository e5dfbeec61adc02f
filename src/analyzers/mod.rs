pub mod activity;
pub mod cohesion;
pub mod elite;
pub mod summary;

pub use activity::{ActivityAggregator, ActivityMap};
pub use cohesion::beta_cv;
pub use elite::EliteClassifier;
pub use summary::{subgroup_stats, summarize};
