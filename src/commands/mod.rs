pub mod command;
pub mod dispatch;
pub mod plan;

pub use command::{Command, Created, ScoreAction};
pub use dispatch::{dispatch, DispatchReport, RetryPolicy};
pub use plan::{plan, Plan};
