//! Interactive talk loop on stdin/stdout.

use std::io::Write;
use std::sync::Arc;
use std::time::Duration;

use tokio::io::{AsyncBufReadExt, BufReader};

use audicare_chat::{
    ChatSession, Message, MessageId, Role, SpeechToggle, VoiceInput, VoiceUpdate,
};
use audicare_core::AudiCareConfig;

/// Longest a single voice capture may run before it is stopped.
const VOICE_TIMEOUT: Duration = Duration::from_secs(60);

const HELP: &str = "Type a message and press Enter. Commands:
  /voice      capture one utterance with the microphone
  /speak N    read message N aloud, or stop reading
  /help       show this help
  /quit       leave";

/// One line of input, interpreted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TalkCommand {
    Send(String),
    /// Blank line: send whatever the composer holds.
    SendDraft,
    Voice,
    Speak(u64),
    Help,
    Quit,
}

/// Interpret one input line.
pub fn parse_line(line: &str) -> TalkCommand {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return TalkCommand::SendDraft;
    }
    let mut parts = trimmed.splitn(2, char::is_whitespace);
    match parts.next() {
        Some("/quit") | Some("/exit") => TalkCommand::Quit,
        Some("/voice") => TalkCommand::Voice,
        Some("/help") => TalkCommand::Help,
        Some("/speak") => match parts.next().map(str::trim).map(str::parse::<u64>) {
            Some(Ok(n)) => TalkCommand::Speak(n),
            _ => TalkCommand::Help,
        },
        _ => TalkCommand::Send(line.to_string()),
    }
}

/// Render one transcript entry.
pub fn format_message(message: &Message) -> String {
    let who = match message.role() {
        Role::User => "You",
        Role::Assistant => "AudiCare",
        Role::System => "System",
    };
    format!("[{}] {}: {}", message.id().get(), who, message.text())
}

/// Run the talk loop until `/quit` or end of input.
pub async fn run(config: &AudiCareConfig, mute: bool) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = config.clone();
    if mute {
        config.speech.enabled = false;
    }

    let session = ChatSession::from_config(&config);
    let mut voice = VoiceInput::from_config(&config.voice);

    for message in session.transcript().all() {
        println!("{}", format_message(&message));
    }
    // User lines are already on screen as typed.
    session.subscribe(Arc::new(|message: &Message| {
        if message.role() != Role::User {
            println!("{}", format_message(message));
        }
    }));
    println!("(type /help for commands)");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        prompt(&session.draft());
        let Some(line) = lines.next_line().await? else {
            break;
        };

        match parse_line(&line) {
            TalkCommand::Quit => break,
            TalkCommand::Help => println!("{}", HELP),
            TalkCommand::Send(text) => {
                session.set_draft(text);
                send(&session).await;
            }
            TalkCommand::SendDraft => {
                if !session.draft().is_empty() {
                    send(&session).await;
                }
            }
            TalkCommand::Voice => capture_voice(&mut voice, &session).await,
            TalkCommand::Speak(n) => match session.toggle_speech(MessageId::from(n)) {
                Some(SpeechToggle::Started(_)) => println!("(speaking message {})", n),
                Some(SpeechToggle::Stopped) => println!("(stopped speaking)"),
                None => println!("(nothing to speak)"),
            },
        }
    }

    tracing::info!(session_id = %session.id(), messages = session.transcript().len(), "Talk session ended");
    Ok(())
}

async fn send(session: &ChatSession) {
    if let Err(e) = session.send_draft().await {
        tracing::debug!(error = %e, "Message not sent");
    }
}

async fn capture_voice(voice: &mut VoiceInput, session: &ChatSession) {
    match voice.toggle().await {
        VoiceUpdate::Alert(notice) => {
            println!("! {}", notice);
            return;
        }
        VoiceUpdate::Idle => return,
        _ => println!("(listening...)"),
    }

    let outcome = tokio::time::timeout(VOICE_TIMEOUT, async {
        while let Some(update) = voice.next_event().await {
            match update {
                VoiceUpdate::Draft(text) => {
                    println!("(heard: {} - press Enter to send)", text);
                    session.set_draft(text);
                }
                VoiceUpdate::Alert(notice) => println!("! {}", notice),
                VoiceUpdate::Idle => break,
                VoiceUpdate::Listening => {}
            }
        }
    })
    .await;

    if outcome.is_err() {
        tracing::warn!("Voice capture timed out");
        voice.stop();
    }
}

fn prompt(draft: &str) {
    print!("> {}", draft);
    let _ = std::io::stdout().flush();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_commands() {
        assert_eq!(parse_line("/quit"), TalkCommand::Quit);
        assert_eq!(parse_line("  /voice "), TalkCommand::Voice);
        assert_eq!(parse_line("/speak 3"), TalkCommand::Speak(3));
        assert_eq!(parse_line("/speak x"), TalkCommand::Help);
        assert_eq!(parse_line("/help"), TalkCommand::Help);
        assert_eq!(parse_line(""), TalkCommand::SendDraft);
        assert_eq!(parse_line("   "), TalkCommand::SendDraft);
    }

    #[test]
    fn test_parse_plain_text_is_sent_as_typed() {
        assert_eq!(
            parse_line("I have a headache"),
            TalkCommand::Send("I have a headache".to_string())
        );
        assert_eq!(parse_line("/unknown"), TalkCommand::Send("/unknown".to_string()));
    }

    #[test]
    fn test_format_greeting() {
        let session = ChatSession::new(audicare_chat::ResponseResolver::offline());
        let greeting = &session.transcript().all()[0];
        let line = format_message(greeting);
        assert!(line.starts_with("[1] AudiCare: Hi"));
    }
}
