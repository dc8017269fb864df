// API endpoint modules
pub mod health;
pub mod messages;
pub mod parse;
pub mod transfer;

use std::sync::Arc;

use crate::{config::Config, db::Database, services::TransferPipeline};

#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub config: Config,
    pub http: reqwest::Client,
    pub pipeline: Arc<TransferPipeline>,
}
