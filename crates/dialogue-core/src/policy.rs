//! The dialogue state machine.
//!
//! [`DialoguePolicy::decide`] is a pure function of the session as it stood
//! before the turn, the caller's utterance and the classified intent. It never
//! touches the store or performs side effects; the engine executes the
//! returned [`Decision`] and only then commits the new state.
//!
//! Rule precedence, first match wins:
//! 1. unusable utterance: count a retry, re-prompt, stay;
//! 2. explicit end-call phrase: terminate, from any state;
//! 3. state-specific handling, then the intent-driven global transitions.

use protocol::phrases;
use protocol::Intent;

use crate::config::PolicyConfig;
use crate::executor::{Action, NotificationRequest};
use crate::ports::NotificationKind;
use crate::prompts::PromptKey;
use crate::session::{DialogueState, Session, Topic};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubjectUpdate {
    Keep,
    Set(String),
    Clear,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryUpdate {
    Increment,
    Reset,
}

/// Outcome of one policy step.
#[derive(Debug, Clone, PartialEq)]
pub struct Decision {
    pub next_state: DialogueState,
    pub action: Option<Action>,
    /// Spoken when the action (if any) succeeds.
    pub prompt: PromptKey,
    pub subject: SubjectUpdate,
    pub retry: RetryUpdate,
}

impl Decision {
    fn to(next_state: DialogueState, prompt: PromptKey) -> Self {
        Self {
            next_state,
            action: None,
            prompt,
            subject: SubjectUpdate::Keep,
            retry: RetryUpdate::Reset,
        }
    }

    fn with_action(mut self, action: Action) -> Self {
        self.action = Some(action);
        self
    }

    fn with_subject(mut self, subject: SubjectUpdate) -> Self {
        self.subject = subject;
        self
    }

    /// Spoken instead of `prompt` when the action fails.
    pub fn failure_prompt(&self) -> PromptKey {
        match self.action {
            Some(Action::Transfer { .. }) => PromptKey::TransferFailed,
            _ => PromptKey::NotificationFailed,
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.next_state.is_terminal()
    }
}

pub struct DialoguePolicy {
    config: PolicyConfig,
}

impl DialoguePolicy {
    pub fn new(config: PolicyConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &PolicyConfig {
        &self.config
    }

    /// Blank, or too short to carry meaning.
    pub fn is_usable(&self, utterance: &str) -> bool {
        utterance.trim().chars().count() >= self.config.min_utterance_chars.max(1)
    }

    pub fn is_end_call(&self, utterance: &str) -> bool {
        phrases::is_end_call(utterance)
    }

    pub fn decide(&self, session: &Session, utterance: &str, intent: Intent) -> Decision {
        let text = utterance.trim();

        if !self.is_usable(text) {
            let attempts = session.retry_count.saturating_add(1);
            let prompt = if attempts >= self.config.max_retries_before_transfer_offer {
                PromptKey::OfferTransfer
            } else {
                PromptKey::PleaseRepeat
            };
            return Decision {
                retry: RetryUpdate::Increment,
                ..Decision::to(session.state, prompt)
            };
        }

        if self.is_end_call(text) {
            return Decision::to(DialogueState::Terminated, PromptKey::Farewell).with_subject(SubjectUpdate::Clear);
        }

        // The re-prompt after repeated silence offered a human; a plain "yes" takes it.
        if session.retry_count >= self.config.max_retries_before_transfer_offer
            && intent == Intent::Confirmation
            && !session.state.captures_free_text()
        {
            return self.transfer();
        }

        match session.state {
            DialogueState::AwaitingEmailForHours => self.send_hours(session, Some(text)),
            DialogueState::AwaitingAppointmentDetails => self.send_details(session, Topic::Appointment, text),
            DialogueState::AwaitingProblemDetails => self.send_details(session, Topic::Problem, text),
            DialogueState::AwaitingGenericMessage => self.send_message(session, text),
            DialogueState::AppointmentChoice => self.choose(Topic::Appointment, intent),
            DialogueState::ProblemChoice => self.choose(Topic::Problem, intent),
            DialogueState::HoursOffered => match intent {
                Intent::Confirmation | Intent::MessageRequest => {
                    if self.config.require_email_capture {
                        Decision::to(DialogueState::AwaitingEmailForHours, PromptKey::AskEmailAddress)
                    } else {
                        self.send_hours(session, None)
                    }
                }
                Intent::Decline => Decision::to(DialogueState::General, PromptKey::NothingElse),
                _ => self.global(session, text, intent),
            },
            DialogueState::Initial | DialogueState::General | DialogueState::Terminated => {
                self.global(session, text, intent)
            }
        }
    }

    /// Intent-driven transitions available from any non-capturing state.
    fn global(&self, session: &Session, text: &str, intent: Intent) -> Decision {
        match intent {
            Intent::TransferRequest => self.transfer(),
            Intent::Hours => Decision::to(DialogueState::HoursOffered, PromptKey::HoursOffer),
            Intent::Appointment => self.open_topic(Topic::Appointment, text),
            Intent::Problem => self.open_topic(Topic::Problem, text),
            Intent::MessageRequest => Decision::to(DialogueState::AwaitingGenericMessage, PromptKey::AskMessage)
                .with_subject(SubjectUpdate::Set(text.to_string())),
            // The classifier thinks the caller is wrapping up but no explicit
            // end-call phrase was said: ask rather than hang up.
            Intent::EndCall => Decision::to(DialogueState::General, PromptKey::NothingElse),
            Intent::Confirmation | Intent::Decline | Intent::Other => match session.state {
                DialogueState::HoursOffered => Decision::to(DialogueState::HoursOffered, PromptKey::HoursReoffer),
                DialogueState::Initial | DialogueState::General | DialogueState::Terminated => {
                    Decision::to(DialogueState::General, PromptKey::Menu)
                }
                state => Decision::to(state, PromptKey::Menu),
            },
        }
    }

    fn transfer(&self) -> Decision {
        Decision::to(DialogueState::Terminated, PromptKey::TransferFarewell)
            .with_action(Action::Transfer { destination: self.config.operator_number.clone() })
            .with_subject(SubjectUpdate::Clear)
    }

    fn open_topic(&self, topic: Topic, text: &str) -> Decision {
        Decision::to(topic.choice_state(), PromptKey::ChoiceOffer(topic)).with_subject(SubjectUpdate::Set(text.to_string()))
    }

    fn choose(&self, topic: Topic, intent: Intent) -> Decision {
        match intent {
            Intent::TransferRequest => self.transfer(),
            Intent::MessageRequest | Intent::Confirmation => {
                Decision::to(topic.details_state(), PromptKey::AskDetails(topic))
            }
            _ => Decision::to(topic.choice_state(), PromptKey::ReaskChoice(topic)),
        }
    }

    fn send_hours(&self, session: &Session, contact: Option<&str>) -> Decision {
        let hours = &self.config.prompts.opening_hours;
        let mut request = match contact {
            Some(address) => NotificationRequest::new(
                NotificationKind::Hours,
                "Opening hours requested",
                format!("Please send our opening hours to {}.\n\nOpening hours: {}", address, hours),
            )
            .with_meta("contact", address),
            None => NotificationRequest::new(
                NotificationKind::Hours,
                "Opening hours requested",
                format!("A caller asked to receive our opening hours. No address was captured; reply to the calling number.\n\nOpening hours: {}", hours),
            ),
        };
        request = with_context(request, session);
        Decision::to(DialogueState::General, PromptKey::HoursSent)
            .with_action(Action::Notify(request))
            .with_subject(SubjectUpdate::Clear)
    }

    fn send_details(&self, session: &Session, topic: Topic, details: &str) -> Decision {
        let (kind, subject) = match topic {
            Topic::Appointment => (NotificationKind::Appointment, "Appointment request"),
            Topic::Problem => (NotificationKind::Problem, "Problem report"),
        };
        let original = session.pending_subject.as_deref().unwrap_or("(not captured)");
        let request = NotificationRequest::new(kind, subject, format!("Request: {}\nDetails: {}", original, details))
            .with_meta("topic", topic.label());
        Decision::to(DialogueState::General, PromptKey::MessageSent)
            .with_action(Action::Notify(with_context(request, session)))
            .with_subject(SubjectUpdate::Clear)
    }

    fn send_message(&self, session: &Session, message: &str) -> Decision {
        let body = match session.pending_subject.as_deref() {
            Some(original) if original != message => format!("Message: {}\nOriginal request: {}", message, original),
            _ => format!("Message: {}", message),
        };
        let request = NotificationRequest::new(NotificationKind::Message, "New phone message", body);
        Decision::to(DialogueState::General, PromptKey::MessageSent)
            .with_action(Action::Notify(with_context(request, session)))
            .with_subject(SubjectUpdate::Clear)
    }
}

fn with_context(request: NotificationRequest, session: &Session) -> NotificationRequest {
    let request = request.with_meta("state", session.state.as_str());
    match session.last_intent {
        Some(intent) => request.with_meta("last_intent", intent.as_label()),
        None => request,
    }
}
