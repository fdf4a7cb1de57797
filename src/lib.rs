pub mod api;
pub mod checker;
pub mod collector;
pub mod config;
pub mod connection;
pub mod database;
pub mod error;
pub mod types;
pub mod utils;

pub use api::{DrawSource, HttpDrawSource};
pub use checker::{check_response, check_ticket, check_tickets};
pub use collector::{CollectOutcome, collect_latest, latest_complete};
pub use config::Config;
pub use database::DrawRepository;
pub use error::{LottoError, Result};
pub use types::*;
