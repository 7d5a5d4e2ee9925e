mod fetch;
mod info;
mod strategies;
mod sweep;

pub use fetch::{run_fetch, FetchArgs};
pub use info::run_info;
pub use strategies::run_strategies;
pub use sweep::run_sweep;
