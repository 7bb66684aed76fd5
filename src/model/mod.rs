pub mod analysis;
pub mod error;
pub mod event;
pub mod summary;
pub mod table;

pub use analysis::{analyze, MatchAnalysis, MatchInput, TeamAnalysis, TeamInput};
pub use event::{EventType, PerEvent};
pub use table::ProbabilityTable;
