//! Terminal session loop.
//!
//! One turn at a time: read a line, classify it, dispatch to the image
//! or text path, and come back for the next line. A failed turn is
//! logged for operators, reported generically to the user, and never
//! ends the session.

use std::time::Duration;

use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::error;

use charla_core::assembler::FlushPolicy;
use charla_core::command::{UserInput, classify};
use charla_core::turn::{GENERIC_FAILURE_NOTICE, describe_image, run_text_turn};
use charla_types::error::TurnError;

use crate::state::AppState;

use super::banner::print_welcome_banner;
use super::input::{ChatInput, InputEvent};
use super::sink::TerminalSink;

/// Run the interactive terminal chat until the user leaves.
pub async fn run_chat_loop(state: &AppState) -> anyhow::Result<()> {
    print_welcome_banner(&state.settings.engine.model_path);

    let prompt = format!("  {} ", style("You >").green().bold());
    let (mut input, _writer) = ChatInput::new(prompt)
        .map_err(|e| anyhow::anyhow!("failed to initialize input: {e}"))?;

    loop {
        let line = match input.read_line().await {
            InputEvent::Eof => break,
            InputEvent::Interrupted => {
                println!(
                    "\n  {}",
                    style("Type 'exit' or press Ctrl+D to leave.").dim()
                );
                continue;
            }
            InputEvent::Message(text) => text,
        };

        if line.is_empty() {
            continue;
        }

        match classify(&line) {
            UserInput::Exit => break,
            UserInput::Pic(path) => run_pic_turn(state, &path).await,
            UserInput::Text(text) => run_chat_turn(state, &text).await,
        }
    }

    println!("\n  {}", style("Goodbye!").cyan());
    Ok(())
}

/// One `/pic` turn. Only the final description is displayed.
async fn run_pic_turn(state: &AppState, path: &str) {
    println!("\n  {}", style(format!("Looking at {path}")).cyan());

    match describe_image(state.vision_engine.as_ref(), path).await {
        Ok(description) => {
            println!("\n  {description}\n");
        }
        Err(TurnError::Image(err)) => {
            error!(error = %err, path, "image file unreadable");
            eprintln!(
                "\n  {} Could not read '{path}'.\n",
                style("!").red().bold()
            );
        }
        Err(err) => {
            error!(error = %err, "image description failed");
            eprintln!("\n  {} {GENERIC_FAILURE_NOTICE}\n", style("!").red().bold());
        }
    }
}

/// One plain text turn, streamed to stdout as it generates.
async fn run_chat_turn(state: &AppState, text: &str) {
    let mut sink = TerminalSink::new(thinking_spinner());

    let result = run_text_turn(
        state.engine.as_ref(),
        &state.settings.system_prompt,
        text,
        &mut sink,
        FlushPolicy::EveryFragment,
    )
    .await;

    match result {
        Ok(_reply) => {
            println!();
            println!();
        }
        Err(err) => {
            sink.abort();
            error!(error = %err, "generation failed");
            eprintln!("\n  {} {GENERIC_FAILURE_NOTICE}\n", style("!").red().bold());
        }
    }
}

fn thinking_spinner() -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.cyan} {msg}")
            .unwrap(),
    );
    spinner.set_message("thinking...");
    spinner.enable_steady_tick(Duration::from_millis(80));
    spinner
}
