pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;

pub use adapters::http::RacingApiClient;
pub use config::Settings;
pub use core::dashboard::{Dashboard, Panel};
pub use domain::model::{Day, RaceQuery, RacecardsView};
pub use utils::error::{RacecardError, Result};
