//! Interactive terminal chat.

use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};

use crate::services::ChatOrchestrator;

pub const GREETING: &str = "Hi! I'm here to help. How are you feeling today?";
pub const FAREWELL: &str = "It was nice talking to you! Take care and feel better soon.";
pub const APOLOGY: &str = "I'm sorry, something went wrong. Could you please try again?";
pub const LOOKING_INTO_IT: &str = "Let me look into this for you...";
pub const PROMPT: &str = "You: ";

pub fn is_exit_command(line: &str) -> bool {
    matches!(line.trim().to_lowercase().as_str(), "exit" | "quit" | "bye")
}

/// Read messages line by line until an exit word or end of input.
pub async fn run_chat_loop<R, W>(orchestrator: &ChatOrchestrator, input: R, mut output: W) -> std::io::Result<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    output.write_all(format!("{}\n", GREETING).as_bytes()).await?;

    let mut lines = input.lines();
    loop {
        output.write_all(PROMPT.as_bytes()).await?;
        output.flush().await?;

        let Some(line) = lines.next_line().await? else {
            output.write_all(b"\n").await?;
            break;
        };
        let message = line.trim();

        if message.is_empty() {
            continue;
        }
        if is_exit_command(message) {
            output.write_all(format!("{}\n", FAREWELL).as_bytes()).await?;
            break;
        }

        let symptoms = orchestrator.extract_symptoms(message).await;
        if !symptoms.is_empty() {
            output.write_all(format!("{}\n", LOOKING_INTO_IT).as_bytes()).await?;
        }

        let text = match orchestrator.respond(message, symptoms).await {
            Ok(reply) => format!("AI: {}\n", reply.text),
            Err(e) => {
                tracing::error!(error = %e, "Error in chatbot loop");
                format!("{}\n", APOLOGY)
            }
        };
        output.write_all(text.as_bytes()).await?;
    }

    output.flush().await
}
