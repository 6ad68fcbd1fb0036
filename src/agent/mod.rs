pub mod history;
pub mod loop_;

pub use history::History;
pub use loop_::{DispatchError, LoopLimits, ToolRunner};
