use dialogue_core::mocks::*;
use dialogue_core::ports::{NotificationKind, SessionStore};
use dialogue_core::{DialogueEngine, DialogueState, PolicyConfig};
use protocol::{Control, Intent, TurnInput};
use std::time::Duration;

const OPERATOR: &str = "+33100000000";

fn config() -> PolicyConfig {
    PolicyConfig::default().with_operator(OPERATOR)
}

async fn state_of<C, N, T>(engine: &DialogueEngine<C, N, T>, call_id: &str) -> Option<DialogueState>
where
    C: dialogue_core::ports::ClassifierPort,
    N: dialogue_core::ports::NotifierPort,
    T: dialogue_core::ports::TransferPort,
{
    engine.store().get(call_id).await.unwrap().map(|s| s.state)
}

/// Appointment request, message preference, details captured, notification sent.
#[tokio::test]
async fn test_appointment_round_trip() {
    let classifier = ScriptedClassifier::new([Intent::Appointment, Intent::MessageRequest]);
    let notifier = RecordingNotifier::default();
    let transfer = RecordingTransfer::default();
    let engine = DialogueEngine::in_memory(config(), classifier, notifier.clone(), transfer.clone());

    engine.start_call("CA1").await.unwrap();

    let reply = engine.handle_turn(TurnInput::new("CA1", "I'd like to book an appointment")).await.unwrap();
    assert_eq!(reply.control, Control::ContinueListening);
    assert_eq!(state_of(&engine, "CA1").await, Some(DialogueState::AppointmentChoice));
    let session = engine.store().get("CA1").await.unwrap().unwrap();
    assert_eq!(session.pending_subject.as_deref(), Some("I'd like to book an appointment"));

    engine.handle_turn(TurnInput::new("CA1", "leave a message")).await.unwrap();
    assert_eq!(state_of(&engine, "CA1").await, Some(DialogueState::AwaitingAppointmentDetails));

    let reply = engine.handle_turn(TurnInput::new("CA1", "Jean Dupont, Tuesday at 3pm")).await.unwrap();
    assert!(reply.prompt.contains("has been sent"));
    assert_eq!(reply.control, Control::ContinueListening);

    let session = engine.store().get("CA1").await.unwrap().unwrap();
    assert_eq!(session.state, DialogueState::General);
    assert!(session.pending_subject.is_none());
    assert_eq!(session.retry_count, 0);

    let sent = notifier.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].kind, NotificationKind::Appointment);
    assert_eq!(sent[0].call_id, "CA1");
    assert!(sent[0].body.contains("I'd like to book an appointment"));
    assert!(sent[0].body.contains("Jean Dupont, Tuesday at 3pm"));
    assert!(transfer.requested().is_empty());
}

#[tokio::test]
async fn test_two_empty_utterances_offer_transfer() {
    let engine = DialogueEngine::in_memory(
        config(),
        ScriptedClassifier::default(),
        RecordingNotifier::default(),
        RecordingTransfer::default(),
    );

    let first = engine.handle_turn(TurnInput::new("CA2", "")).await.unwrap();
    assert!(first.prompt.contains("repeat"));
    let second = engine.handle_turn(TurnInput::new("CA2", "   ")).await.unwrap();
    assert!(second.prompt.contains("transfer you"));
    assert_eq!(second.control, Control::ContinueListening);

    let session = engine.store().get("CA2").await.unwrap().unwrap();
    assert_eq!(session.retry_count, 2);
    assert_eq!(session.state, DialogueState::Initial);
}

#[tokio::test]
async fn test_yes_to_transfer_offer_dials_operator() {
    let transfer = RecordingTransfer::default();
    let engine = DialogueEngine::in_memory(
        config(),
        FixedClassifier(Intent::Confirmation),
        RecordingNotifier::default(),
        transfer.clone(),
    );
    engine.handle_turn(TurnInput::new("CA3", "")).await.unwrap();
    engine.handle_turn(TurnInput::new("CA3", "")).await.unwrap();

    let reply = engine.handle_turn(TurnInput::new("CA3", "yes please")).await.unwrap();
    assert_eq!(reply.control, Control::Transfer { destination: OPERATOR.into() });
    assert_eq!(transfer.requested(), vec![("CA3".to_string(), OPERATOR.to_string())]);
    assert!(engine.store().get("CA3").await.unwrap().is_none());
}

#[tokio::test]
async fn test_end_call_phrase_terminates_from_every_reachable_state() {
    let cases: Vec<(Vec<Intent>, Vec<&str>)> = vec![
        (vec![], vec![]),
        (vec![Intent::Hours], vec!["what are your opening hours"]),
        (vec![Intent::Hours, Intent::Confirmation], vec!["opening hours", "yes please"]),
        (vec![Intent::Problem], vec!["my heating is broken"]),
        (vec![Intent::Problem, Intent::MessageRequest], vec!["my heating is broken", "a message"]),
        (vec![Intent::MessageRequest], vec!["I want to leave a message"]),
        (vec![Intent::Other], vec!["something unrelated"]),
    ];

    for (i, (script, lines)) in cases.into_iter().enumerate() {
        let engine = DialogueEngine::in_memory(
            config(),
            ScriptedClassifier::new(script),
            RecordingNotifier::default(),
            RecordingTransfer::default(),
        );
        let call = format!("CA-end-{}", i);
        for line in lines {
            engine.handle_turn(TurnInput::new(call.as_str(), line)).await.unwrap();
        }
        let reply = engine.handle_turn(TurnInput::new(call.as_str(), "OK, goodbye!")).await.unwrap();
        assert_eq!(reply.control, Control::EndCall, "case {}", i);
        assert!(engine.store().get(&call).await.unwrap().is_none(), "case {} kept its session", i);
    }
}

#[tokio::test]
async fn test_bare_no_declines_instead_of_hanging_up() {
    let engine = DialogueEngine::in_memory(
        config(),
        ScriptedClassifier::new([Intent::Hours, Intent::Decline]),
        RecordingNotifier::default(),
        RecordingTransfer::default(),
    );
    engine.handle_turn(TurnInput::new("CA4", "what are your hours")).await.unwrap();
    let reply = engine.handle_turn(TurnInput::new("CA4", "no")).await.unwrap();
    assert_eq!(reply.control, Control::ContinueListening);
    assert_eq!(state_of(&engine, "CA4").await, Some(DialogueState::General));
}

#[tokio::test(start_paused = true)]
async fn test_classifier_timeout_falls_back_to_menu() {
    let config = PolicyConfig { classifier_timeout_ms: 100, ..config() };
    let menu = config.prompts.render(dialogue_core::PromptKey::Menu);
    let engine = DialogueEngine::in_memory(
        config,
        StalledClassifier,
        RecordingNotifier::default(),
        RecordingTransfer::default(),
    );
    let reply = engine.handle_turn(TurnInput::new("CA5", "I have a question")).await.unwrap();
    assert_eq!(reply.prompt, menu);
    assert_eq!(state_of(&engine, "CA5").await, Some(DialogueState::General));
}

#[tokio::test]
async fn test_classifier_error_falls_back_to_menu() {
    let engine = DialogueEngine::in_memory(
        config(),
        FailingClassifier,
        RecordingNotifier::default(),
        RecordingTransfer::default(),
    );
    let reply = engine.handle_turn(TurnInput::new("CA6", "I have a question")).await.unwrap();
    assert_eq!(reply.control, Control::ContinueListening);
    assert_eq!(state_of(&engine, "CA6").await, Some(DialogueState::General));
}

#[tokio::test]
async fn test_notifier_failure_still_advances() {
    let engine = DialogueEngine::in_memory(
        config(),
        ScriptedClassifier::new([Intent::MessageRequest]),
        FailingNotifier,
        RecordingTransfer::default(),
    );
    engine.handle_turn(TurnInput::new("CA7", "can I leave a message")).await.unwrap();
    let reply = engine.handle_turn(TurnInput::new("CA7", "please call me back")).await.unwrap();
    assert!(reply.prompt.contains("error occurred"));
    assert!(!reply.prompt.contains("has been sent"));
    assert_eq!(state_of(&engine, "CA7").await, Some(DialogueState::General));
}

#[tokio::test(start_paused = true)]
async fn test_slow_notifier_counts_as_failure() {
    let config = PolicyConfig { action_timeout_ms: 50, ..config() };
    let engine = DialogueEngine::in_memory(
        config,
        ScriptedClassifier::new([Intent::MessageRequest]),
        StalledNotifier,
        RecordingTransfer::default(),
    );
    engine.handle_turn(TurnInput::new("CA8", "leave a message")).await.unwrap();
    let reply = engine.handle_turn(TurnInput::new("CA8", "call me back")).await.unwrap();
    assert!(reply.prompt.contains("error occurred"));
}

#[tokio::test]
async fn test_transfer_request_ends_session() {
    let transfer = RecordingTransfer::default();
    let engine = DialogueEngine::in_memory(
        config(),
        FixedClassifier(Intent::TransferRequest),
        RecordingNotifier::default(),
        transfer.clone(),
    );
    let reply = engine.handle_turn(TurnInput::new("CA9", "put me through to someone")).await.unwrap();
    assert_eq!(reply.control, Control::Transfer { destination: OPERATOR.into() });
    assert!(engine.store().is_empty().await.unwrap());
    assert_eq!(transfer.requested().len(), 1);
}

#[tokio::test]
async fn test_failed_transfer_apologises_and_hangs_up() {
    let engine = DialogueEngine::in_memory(
        config(),
        FixedClassifier(Intent::TransferRequest),
        RecordingNotifier::default(),
        FailingTransfer,
    );
    let reply = engine.handle_turn(TurnInput::new("CA10", "operator please")).await.unwrap();
    assert_eq!(reply.control, Control::EndCall);
    assert!(reply.prompt.contains("could not transfer"));
    assert!(engine.store().get("CA10").await.unwrap().is_none());
}

#[tokio::test]
async fn test_usable_turn_resets_retry_count() {
    let engine = DialogueEngine::in_memory(
        config(),
        ScriptedClassifier::new([Intent::Hours]),
        RecordingNotifier::default(),
        RecordingTransfer::default(),
    );
    engine.handle_turn(TurnInput::new("CA11", "")).await.unwrap();
    assert_eq!(engine.store().get("CA11").await.unwrap().unwrap().retry_count, 1);

    engine.handle_turn(TurnInput::new("CA11", "what time do you open")).await.unwrap();
    let session = engine.store().get("CA11").await.unwrap().unwrap();
    assert_eq!(session.retry_count, 0);
    assert_eq!(session.state, DialogueState::HoursOffered);
}

#[tokio::test]
async fn test_hours_email_flow() {
    let notifier = RecordingNotifier::default();
    let engine = DialogueEngine::in_memory(
        config(),
        ScriptedClassifier::new([Intent::Hours, Intent::Confirmation]),
        notifier.clone(),
        RecordingTransfer::default(),
    );
    engine.handle_turn(TurnInput::new("CA12", "when are you open")).await.unwrap();
    engine.handle_turn(TurnInput::new("CA12", "yes")).await.unwrap();
    assert_eq!(state_of(&engine, "CA12").await, Some(DialogueState::AwaitingEmailForHours));

    engine.handle_turn(TurnInput::new("CA12", "jean.dupont@example.com")).await.unwrap();
    assert_eq!(state_of(&engine, "CA12").await, Some(DialogueState::General));
    let sent = notifier.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].kind, NotificationKind::Hours);
    assert_eq!(sent[0].metadata.get("contact").map(String::as_str), Some("jean.dupont@example.com"));
}

#[tokio::test]
async fn test_calls_are_isolated() {
    let engine = std::sync::Arc::new(DialogueEngine::in_memory(
        config(),
        FixedClassifier(Intent::Hours),
        RecordingNotifier::default(),
        RecordingTransfer::default(),
    ));

    let mut handles = Vec::new();
    for i in 0..20 {
        let engine = engine.clone();
        handles.push(tokio::spawn(async move {
            let call = format!("CA-par-{}", i);
            engine.handle_turn(TurnInput::new(call.as_str(), "your hours please")).await.unwrap();
            tokio::time::sleep(Duration::from_millis(1)).await;
            engine.handle_turn(TurnInput::new(call.as_str(), "")).await.unwrap();
        }));
    }
    for h in handles {
        h.await.unwrap();
    }

    assert_eq!(engine.store().len().await.unwrap(), 20);
    for i in 0..20 {
        let session = engine.store().get(&format!("CA-par-{}", i)).await.unwrap().unwrap();
        assert_eq!(session.state, DialogueState::HoursOffered);
        assert_eq!(session.turns, 2);
        assert_eq!(session.retry_count, 1);
    }
}
