pub mod etl;
pub mod pacing;
pub mod pipeline;
pub mod resolver;

pub use crate::domain::model::{Progress, Resolution, ResolutionSummary, Sentinel, Ticker};
pub use crate::domain::ports::{ConfigProvider, Pipeline, Storage, TransformResult};
pub use crate::domain::table::{InputTable, ResultTable};
pub use crate::utils::error::Result;
