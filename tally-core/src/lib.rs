pub mod config;
pub mod error;
pub mod log;
pub mod pattern;
pub mod registry;
pub mod report;
pub mod route;
pub mod window;

pub use config::TallyConfig;
pub use error::TallyError;
pub use log::{LogFilter, RequestLog, RequestRecord};
pub use registry::{ResolvedPattern, RouteRegistry};
pub use report::{UsageAggregator, UsageReport};
pub use route::{Route, Scope};
pub use window::DateWindow;
