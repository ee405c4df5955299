use clap::Parser;

#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Base URL of the THOR backend API (e.g., http://127.0.0.1:5000)
    #[arg(long, env = "THOR_BACKEND_URL", default_value = "http://127.0.0.1:5000")]
    pub backend_url: String,

    /// Optional API key sent as an X-API-Key header on every request.
    #[arg(long, env = "THOR_API_KEY")]
    pub api_key: Option<String>,

    /// Resume an existing conversation by its server-assigned identifier.
    #[arg(long, env = "THOR_CONVERSATION")]
    pub conversation: Option<String>,
}
