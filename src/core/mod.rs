pub mod form;
pub mod http;
pub mod output;

pub use crate::domain::model::{DateRange, MatchesPlayedDay, RangePayload};
pub use crate::domain::ports::{ConfigProvider, JsonPoster};
pub use crate::utils::error::Result;
