pub mod command;
pub mod config;
pub mod insights;
pub mod response;
pub mod session;
pub mod suggestion;
pub mod test_suite;

pub use command::{Command, Verb};
pub use config::{Config, LoggingConfig, StoreBackend, StoreConfig, WorkflowConfig};
pub use insights::{Engagement, FeedbackMetrics, HitlInsights, QualityReport, Trend};
pub use response::{CommandResponse, ResponseError};
pub use session::{FeedbackEvent, FeedbackKind, Session, SessionStatus};
pub use suggestion::{Category, SuggestionRecord};
pub use test_suite::{TestCase, TestKind, TestPriority, TestSuite};
