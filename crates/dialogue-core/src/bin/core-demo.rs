//! Plays a scripted call through the engine with in-process ports and prints
//! each exchange as JSON.
//!
//! Usage: core-demo [utterance ...]

use dialogue_core::mocks::{RecordingNotifier, RecordingTransfer, ScriptedClassifier};
use dialogue_core::{DialogueEngine, PolicyConfig};
use protocol::{Intent, TurnInput};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().with_env_filter("dialogue_core=debug").init();

    let mut lines: Vec<String> = std::env::args().skip(1).collect();
    let classifier = if lines.is_empty() {
        lines = vec![
            "I'd like to book an appointment".into(),
            "I'll leave a message".into(),
            "Jean Dupont, Tuesday afternoon".into(),
            "goodbye".into(),
        ];
        ScriptedClassifier::new([Intent::Appointment, Intent::MessageRequest])
    } else {
        ScriptedClassifier::default()
    };

    let notifier = RecordingNotifier::default();
    let engine = DialogueEngine::in_memory(
        PolicyConfig::default().with_operator("+33100000000"),
        classifier,
        notifier.clone(),
        RecordingTransfer::default(),
    );

    let call_id = "CA-demo";
    let greeting = engine.start_call(call_id).await?;
    println!("{}", serde_json::to_string_pretty(&greeting)?);
    for line in lines {
        let reply = engine.handle_turn(TurnInput::new(call_id, line.as_str())).await?;
        println!("> {}", line);
        println!("{}", serde_json::to_string_pretty(&reply)?);
        if reply.is_final() {
            break;
        }
    }

    for n in notifier.sent() {
        println!("notification: {}", serde_json::to_string_pretty(&n)?);
    }
    Ok(())
}
