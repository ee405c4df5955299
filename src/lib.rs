pub mod api;
pub mod capabilities;
pub mod catalog;
pub mod chat;
pub mod cli;
pub mod console;
pub mod error;
pub mod models;
pub mod session;

use capabilities::CapabilitiesController;
use catalog::CatalogController;
use chat::ChatController;
use cli::Args;
use log::info;
use std::error::Error;
use std::sync::Arc;

/// Composition root: build the API client and the three controllers, then
/// hand them to the console loop. An unusable backend URL aborts startup.
pub async fn run(args: Args) -> Result<(), Box<dyn Error + Send + Sync>> {
    info!("--- Console Configuration ---");
    info!("Backend URL: {}", args.backend_url);
    info!("API Key Auth: {}", args.api_key.as_deref().map_or(false, |k| !k.trim().is_empty()));
    if let Some(id) = &args.conversation {
        info!("Resuming Conversation: {}", id);
    }
    info!("-----------------------------");

    let api = api::new_client(&args.backend_url, args.api_key.clone())?;
    let chat = ChatController::new(Arc::clone(&api), args.conversation.clone());
    let catalog = CatalogController::new(Arc::clone(&api));
    let capabilities = CapabilitiesController::new(Arc::clone(&api));

    console::run(chat, catalog, capabilities).await
}
