//! Telegram session loop.
//!
//! One dispatcher over inbound text messages. Each message is checked
//! against the allow-list, classified, and run through the shared turn
//! logic; the response streams into an edited placeholder message.
//! Turns for distinct chats run concurrently on the runtime, but one
//! chat's turn completes before its next message is handled.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use secrecy::ExposeSecret;
use teloxide::prelude::*;
use tracing::{debug, error, info, warn};

use charla_core::assembler::FlushPolicy;
use charla_core::command::{UserInput, classify};
use charla_core::turn::{GENERIC_FAILURE_NOTICE, describe_image, run_text_turn};
use charla_types::error::TurnError;

use crate::state::AppState;

use super::sink::EditedMessageSink;

/// Per-interaction timeout on the transport client. Local inference is
/// slow; a turn may legitimately run for minutes.
const INTERACTION_TIMEOUT: Duration = Duration::from_millis(1_000_000);

/// Run the bot until the process is stopped.
pub async fn run_bot(state: AppState) -> anyhow::Result<()> {
    let token = charla_infra::config::load_bot_token()?;
    let allowed = Arc::new(charla_infra::config::allowed_sender_set(&state.settings));
    let state = Arc::new(state);

    let client = teloxide::net::default_reqwest_settings()
        .timeout(INTERACTION_TIMEOUT)
        .build()?;
    let bot = Bot::with_client(token.expose_secret(), client);

    info!(engine = %state.engine.name(), "starting telegram bot");

    let handler = Update::filter_message().endpoint(handle_message);

    Dispatcher::builder(bot, handler)
        .dependencies(dptree::deps![state, allowed])
        .enable_ctrlc_handler()
        .build()
        .dispatch()
        .await;

    Ok(())
}

/// Membership check against the authorized-sender set.
fn is_authorized(allowed: &HashSet<String>, sender: &str) -> bool {
    allowed.contains(sender)
}

async fn handle_message(
    bot: Bot,
    message: Message,
    state: Arc<AppState>,
    allowed: Arc<HashSet<String>>,
) -> ResponseResult<()> {
    let Some(text) = message.text() else {
        return Ok(());
    };
    let chat_id = message.chat.id;
    let sender = message
        .from
        .as_ref()
        .map(|user| user.id.to_string())
        .unwrap_or_default();

    if !is_authorized(&allowed, &sender) {
        warn!(%sender, %chat_id, "unauthorized sender dropped");
        return Ok(());
    }

    debug!(%sender, %chat_id, len = text.len(), "message received");

    match classify(text) {
        UserInput::Pic(path) => handle_pic(&bot, chat_id, &state, &path).await,
        // The exit keyword only means something in the terminal loop;
        // here it is just another message.
        UserInput::Exit => handle_text(&bot, chat_id, &state, text).await,
        UserInput::Text(body) => handle_text(&bot, chat_id, &state, &body).await,
    }

    Ok(())
}

/// One `/pic` turn: no streaming, only the final description is sent.
async fn handle_pic(bot: &Bot, chat_id: ChatId, state: &AppState, path: &str) {
    match describe_image(state.vision_engine.as_ref(), path).await {
        Ok(description) => {
            if let Err(err) = bot.send_message(chat_id, description).await {
                error!(error = %err, %chat_id, "failed to send image description");
            }
        }
        Err(TurnError::Image(err)) => {
            // Propagated unrecovered: the turn is dropped without a reply.
            error!(error = %err, path, %chat_id, "image file unreadable");
        }
        Err(err) => {
            error!(error = %err, %chat_id, "image description failed");
            if let Err(err) = bot.send_message(chat_id, GENERIC_FAILURE_NOTICE).await {
                error!(error = %err, %chat_id, "failed to deliver failure notice");
            }
        }
    }
}

/// One plain text turn, streamed by editing the placeholder message.
async fn handle_text(bot: &Bot, chat_id: ChatId, state: &AppState, text: &str) {
    let mut sink = EditedMessageSink::new(bot.clone(), chat_id);

    let result = run_text_turn(
        state.engine.as_ref(),
        &state.settings.system_prompt,
        text,
        &mut sink,
        FlushPolicy::sentence_boundary(),
    )
    .await;

    match result {
        Ok(reply) => {
            debug!(%chat_id, len = reply.len(), "turn complete");
        }
        Err(err) => {
            error!(error = %err, %chat_id, "generation failed");
            sink.show_failure(GENERIC_FAILURE_NOTICE).await;
        }
    }
}
