pub mod scan;
pub mod serve;

use std::sync::Arc;

use anyhow::Result;

use crate::chart::ChartLoader;
use crate::config::AppConfig;
use crate::registry::DockerHub;
use crate::service::ChartService;

/// Wire the loader and registry client from configuration.
fn build_service(cfg: &AppConfig) -> Result<ChartService> {
    let client = cfg.http_client()?;
    let loader = ChartLoader::new(client.clone()).strict(cfg.strict_fetch);
    let registry = DockerHub::new(client, cfg.registry_url.clone());
    Ok(ChartService::new(loader, Arc::new(registry)))
}
