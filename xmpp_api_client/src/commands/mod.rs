//! Built-in commands.

mod raw;
mod register;
mod stats;
mod user;

pub use raw::RawCommand;
pub use register::{Register, RegisterResponse};
pub use stats::{Statistic, Stats, StatsResponse};
pub use user::{OfflineCount, OfflineCountResponse, UserResources, UserResourcesResponse};
