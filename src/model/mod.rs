pub mod classifier;
pub mod reporter;

use anyhow::Result;
use log::info;
use reqwest::Client;

use crate::config::AppConfig;
use classifier::Classifier;
use reporter::Reporter;

// Remote collaborators shared by every scan
pub struct ModelManager {
    pub classifier: Classifier,
    pub reporter: Reporter,
    pub max_tokens: u32,
}

impl ModelManager {
    pub fn new(config: &AppConfig) -> Result<Self> {
        info!("Initializing remote model clients");

        // One connection pool for both services
        let client = Client::builder().build()?;

        Ok(Self {
            classifier: Classifier::new(config.predict_url.clone(), client.clone()),
            reporter: Reporter::new(
                config.llm_base_url.clone(),
                config.llm_api_key.clone(),
                config.llm_model.clone(),
                client,
            ),
            max_tokens: config.report_max_tokens,
        })
    }
}
