use clap::Subcommand;
use serde_json::json;
use studyquest_core::assistant::{self, credentials};
use studyquest_core::CompletionClient;

use super::{emit, open_state, CmdResult};

#[derive(Subcommand)]
pub enum AssistantAction {
    /// Ask the study assistant a question
    Ask {
        /// Question text
        prompt: String,
    },
    /// Print the chat history
    History {
        /// Only the last N messages
        #[arg(long)]
        last: Option<usize>,
    },
    /// Clear the chat history
    Clear,
    /// Store the API key in the OS keyring
    SetKey {
        /// API key for the completion endpoint
        key: String,
    },
    /// Remove the stored API key
    ClearKey,
}

pub fn run(action: AssistantAction) -> CmdResult {
    match action {
        AssistantAction::Ask { prompt } => {
            let (mut state, config) = open_state()?;
            let client = CompletionClient::from_config(config.assistant)?;
            let rt = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()?;
            let reply = rt.block_on(assistant::ask(&client, &mut state, &prompt))?;
            emit(&mut state, &reply)
        }
        AssistantAction::History { last } => {
            let (mut state, _config) = open_state()?;
            let history = state.chat_history();
            let skip = last.map_or(0, |n| history.len().saturating_sub(n));
            let history = history[skip..].to_vec();
            emit(&mut state, &history)
        }
        AssistantAction::Clear => {
            let (mut state, _config) = open_state()?;
            state.clear_chat();
            emit(&mut state, &json!({ "cleared": true }))
        }
        AssistantAction::SetKey { key } => {
            credentials::set_api_key(key.trim())?;
            println!("api key stored");
            Ok(())
        }
        AssistantAction::ClearKey => {
            credentials::clear_api_key()?;
            println!("api key removed");
            Ok(())
        }
    }
}
