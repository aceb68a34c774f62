use clap::Parser;

#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    // --- Widget Server Args ---
    /// Host address and port for the WebSocket chat server to listen on.
    #[arg(long, env = "SERVER_ADDR", default_value = "127.0.0.1:4000")]
    pub server_addr: String,

    /// Response strategy for chat sessions (keyword, remote)
    #[arg(long, env = "RESOLVER", default_value = "keyword")]
    pub resolver: String,

    /// Inference endpoint used by the remote resolver.
    #[arg(long, env = "REMOTE_ENDPOINT", default_value = "http://127.0.0.1:4001/chat")]
    pub remote_endpoint: String,

    // --- Inference Handler Args ---
    /// Port for the HTTP inference handler. The handler is not started when unset.
    #[arg(long, env = "HTTP_PORT")]
    pub http_port: Option<u16>,

    /// API key for the chat completion provider. Without it the handler answers with a fallback.
    #[arg(long, env = "OPENAI_API_KEY")]
    pub openai_api_key: Option<String>,

    /// Model name for chat completion.
    #[arg(long, env = "CHAT_MODEL", default_value = "gpt-4o-mini")]
    pub chat_model: String,

    /// Base URL for the chat completion API (defaults to https://api.openai.com)
    #[arg(long, env = "CHAT_BASE_URL")]
    pub chat_base_url: Option<String>,

    /// Maximum number of tokens in a generated answer.
    #[arg(long, env = "CHAT_MAX_TOKENS", default_value = "500")]
    pub chat_max_tokens: u32,

    /// Sampling temperature for chat completion.
    #[arg(long, env = "CHAT_TEMPERATURE", default_value = "0.7")]
    pub chat_temperature: f32,

    /// Optional path to a text file replacing the built-in system prompt.
    #[arg(long, env = "PROMPT_PATH")]
    pub prompt_path: Option<String>,
}
