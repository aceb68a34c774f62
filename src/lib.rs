pub mod cli;
pub mod config;
pub mod history;
pub mod llm;
pub mod models;
pub mod resolver;
pub mod server;
pub mod session;

use cli::Args;
use log::info;
use resolver::{ new_resolver, ResolverConfig, ResolverKind };
use server::Server;
use std::error::Error;

pub async fn run(args: Args) -> Result<(), Box<dyn Error + Send + Sync>> {
    let kind: ResolverKind = args.resolver.parse()?;

    info!("--- Core Configuration ---");
    info!("Server Address: {}", args.server_addr);
    info!("Resolver Type: {}", kind);
    if kind == ResolverKind::Remote {
        info!("Remote Endpoint: {}", args.remote_endpoint);
    }
    match args.http_port {
        Some(port) => info!("Inference Handler Port: {}", port),
        None => info!("Inference Handler: disabled"),
    }
    info!("Chat Model: {}", args.chat_model);
    info!("Prompt Path: {}", args.prompt_path.as_deref().unwrap_or("built-in"));
    info!("-------------------------");

    let resolver = new_resolver(&ResolverConfig {
        kind,
        remote_endpoint: args.remote_endpoint.clone(),
    })?;
    let addr = args.server_addr.clone();
    info!("Starting server on: {}", addr);
    let server = Server::new(addr, resolver, args);
    server.run().await?;

    Ok(())
}
