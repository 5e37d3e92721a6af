use std::sync::Arc;

use tracing::warn;

use crate::command::Command;
use crate::config::Config;
use crate::dispatch::Dispatcher;
use crate::fallback::FallbackChain;
use crate::providers::{gemini::Gemini, llama::Llama, magisterium::Magisterium, zai::Zai};
use crate::providers::{Answer, Citation, Provider, ProviderError};
use crate::sender::Sender;
use crate::transcript::TranscriptLogger;

/// Interim notice sent before a potentially slow provider call, so the user
/// sees a reaction while the upstream thinks.
pub(crate) const PROCESSING_NOTICE: &str = "Processing your question, please wait...";

/// The messaging channel mishandles overlong text, so answers are capped
/// and cut well below the limit to leave room for the marker.
const MAX_MESSAGE_LEN: usize = 4000;
const TRUNCATE_AT: usize = 3900;
const TRUNCATION_MARKER: &str = "\n\n[... answer truncated ...]";

/// Shared application state
pub struct AppState {
    pub config: Config,
    pub sender: Sender,
    pub transcript: TranscriptLogger,
    pub dispatcher: Dispatcher,
    magisterium: Arc<dyn Provider>,
    gemini: Arc<dyn Provider>,
    llama: Arc<dyn Provider>,
    chain: FallbackChain,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        let sender = Sender::new(&config.relay);
        let transcript = TranscriptLogger::new(&config.dashboard);
        let dispatcher = Dispatcher::new(config.dispatch.max_in_flight);

        let magisterium: Arc<dyn Provider> =
            Arc::new(Magisterium::new(config.providers.magisterium.clone()));
        let gemini: Arc<dyn Provider> = Arc::new(Gemini::new(config.providers.gemini.clone()));
        let llama: Arc<dyn Provider> = Arc::new(Llama::new(config.providers.llama.clone()));
        let zai: Arc<dyn Provider> = Arc::new(Zai::new(config.providers.zai.clone()));

        let mut chain_providers: Vec<Arc<dyn Provider>> = Vec::new();
        for name in &config.fallback.order {
            match name.as_str() {
                "magisterium" => chain_providers.push(magisterium.clone()),
                "gemini" => chain_providers.push(gemini.clone()),
                "llama" => chain_providers.push(llama.clone()),
                "zai" => chain_providers.push(zai.clone()),
                other => warn!("Unknown provider '{}' in fallback order, ignoring", other),
            }
        }
        let chain = FallbackChain::new(chain_providers);
        if chain.is_empty() {
            warn!("Fallback chain is empty; free-chat messages will always fail");
        }

        Self {
            config,
            sender,
            transcript,
            dispatcher,
            magisterium,
            gemini,
            llama,
            chain,
        }
    }
}

/// Handle one classified command. Runs inside a dispatched background task;
/// every path ends in an outbound send, so no failure can leave the task
/// silently.
pub async fn handle_event(state: Arc<AppState>, sender_id: String, command: Command) {
    match command {
        Command::None => {}
        Command::Usage(kind) => {
            state.sender.send_text(&sender_id, kind.usage_hint()).await;
        }
        Command::Ask(query) => {
            let provider = state.magisterium.clone();
            ask_and_reply(&state, &sender_id, &query, provider.as_ref()).await;
        }
        Command::Gemini(query) => {
            let provider = state.gemini.clone();
            ask_and_reply(&state, &sender_id, &query, provider.as_ref()).await;
        }
        Command::Llama(query) => {
            let provider = state.llama.clone();
            ask_and_reply(&state, &sender_id, &query, provider.as_ref()).await;
        }
        Command::FreeChat(query) => {
            state.sender.send_text(&sender_id, PROCESSING_NOTICE).await;
            let result = state.chain.ask(&query).await;
            deliver(&state, &sender_id, result).await;
        }
    }
}

async fn ask_and_reply(state: &AppState, sender_id: &str, query: &str, provider: &dyn Provider) {
    state.sender.send_text(sender_id, PROCESSING_NOTICE).await;
    let result = provider.ask(query).await;
    deliver(state, sender_id, result).await;
}

async fn deliver(state: &AppState, sender_id: &str, result: Result<Answer, ProviderError>) {
    match result {
        Ok(answer) => {
            state
                .sender
                .send_text(sender_id, &truncate_answer(&answer.text))
                .await;
            if !answer.citations.is_empty() {
                state
                    .sender
                    .send_text(sender_id, &format_citations(&answer.citations))
                    .await;
            }
        }
        Err(e) => {
            warn!("Provider call for {} failed: {}", sender_id, e);
            state.sender.send_text(sender_id, e.user_message()).await;
        }
    }
}

/// Cap an answer at the channel limit. Counted in chars, not bytes, since
/// answers are frequently non-ASCII.
pub fn truncate_answer(text: &str) -> String {
    if text.chars().count() <= MAX_MESSAGE_LEN {
        return text.to_string();
    }
    let mut out: String = text.chars().take(TRUNCATE_AT).collect();
    out.push_str(TRUNCATION_MARKER);
    out
}

/// Render the citations follow-up message.
pub fn format_citations(citations: &[Citation]) -> String {
    let mut out = String::from("References:\n");
    for (idx, citation) in citations.iter().enumerate() {
        let title = if citation.title.is_empty() {
            "Document"
        } else {
            &citation.title
        };
        out.push_str(&format!("\n[{}] {}", idx + 1, title));

        let mut attribution = Vec::new();
        if !citation.author.is_empty() {
            attribution.push(citation.author.as_str());
        }
        if !citation.year.is_empty() {
            attribution.push(citation.year.as_str());
        }
        if !attribution.is_empty() {
            out.push_str(&format!(" ({})", attribution.join(", ")));
        }
        if !citation.reference.is_empty() {
            out.push_str(&format!(", {}", citation.reference));
        }
        if !citation.source_url.is_empty() {
            out.push_str(&format!("\n    {}", citation.source_url));
        }
    }
    out
}
