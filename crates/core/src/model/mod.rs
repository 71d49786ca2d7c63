mod ids;
mod progress;
mod question;
mod score;

pub use ids::SessionId;
pub(crate) use question::normalize;
pub use progress::{Milestone, ProgressMeter};
pub use question::{Question, QuestionError, QuestionMode};
pub use score::{ScoreError, ScoreResult, evaluate};
