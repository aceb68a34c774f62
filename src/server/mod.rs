pub mod api;
pub mod websocket;

use crate::cli::Args;
use crate::config::prompt;
use crate::llm::LlmConfig;
use crate::llm::chat::{ ChatClient, new_client as new_chat_client };
use crate::resolver::Resolver;
use log::{ info, warn };
use std::error::Error;
use std::sync::Arc;

pub struct Server {
    addr: String,
    resolver: Arc<dyn Resolver>,
    args: Args,
}

impl Server {
    pub fn new(addr: String, resolver: Arc<dyn Resolver>, args: Args) -> Self {
        Self { addr, resolver, args }
    }

    pub async fn run(&self) -> Result<(), Box<dyn Error + Send + Sync>> {
        if let Some(http_port) = self.args.http_port {
            self.start_http_server(http_port).await?;
        }

        self.start_ws_server().await?;

        Ok(())
    }

    async fn start_http_server(&self, http_port: u16) -> Result<(), Box<dyn Error + Send + Sync>> {
        let state = api::AppState {
            chat_client: build_chat_client(&self.args)?,
            system_prompt: prompt::load_system_prompt(self.args.prompt_path.as_deref())?,
        };
        api::start_http_server(http_port, state).await
    }

    async fn start_ws_server(&self) -> Result<(), Box<dyn Error + Send + Sync>> {
        websocket::start_ws_server(&self.addr, self.resolver.clone()).await
    }
}

fn build_chat_client(
    args: &Args
) -> Result<Option<Arc<dyn ChatClient>>, Box<dyn Error + Send + Sync>> {
    let api_key = args.openai_api_key.clone().filter(|k| !k.trim().is_empty());
    if api_key.is_none() {
        warn!("OPENAI_API_KEY is not set; the inference handler will answer with a fallback.");
        return Ok(None);
    }

    let config = LlmConfig {
        api_key,
        completion_model: Some(args.chat_model.clone()),
        base_url: args.chat_base_url.clone(),
        max_tokens: args.chat_max_tokens,
        temperature: args.chat_temperature,
    };
    let client = new_chat_client(&config)?;
    info!(
        "Chat client configured: Model={}, BaseURL={}",
        client.get_model(),
        client.get_base_url().as_deref().unwrap_or("adapter default")
    );
    Ok(Some(client))
}
