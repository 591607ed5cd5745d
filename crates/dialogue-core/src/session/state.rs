use serde::{Deserialize, Serialize};
use std::fmt;

/// Position of a call in the dialogue state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DialogueState {
    Initial,
    General,
    HoursOffered,
    AwaitingEmailForHours,
    AppointmentChoice,
    AwaitingAppointmentDetails,
    ProblemChoice,
    AwaitingProblemDetails,
    AwaitingGenericMessage,
    /// Absorbing. A session never rests here; it is deleted on entry.
    Terminated,
}

/// The two request branches that share the "transfer now or leave a
/// message" shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Topic {
    Appointment,
    Problem,
}

impl Topic {
    pub fn choice_state(&self) -> DialogueState {
        match self {
            Topic::Appointment => DialogueState::AppointmentChoice,
            Topic::Problem => DialogueState::ProblemChoice,
        }
    }

    pub fn details_state(&self) -> DialogueState {
        match self {
            Topic::Appointment => DialogueState::AwaitingAppointmentDetails,
            Topic::Problem => DialogueState::AwaitingProblemDetails,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Topic::Appointment => "appointment",
            Topic::Problem => "problem",
        }
    }
}

impl DialogueState {
    pub const ALL: [DialogueState; 10] = [
        DialogueState::Initial,
        DialogueState::General,
        DialogueState::HoursOffered,
        DialogueState::AwaitingEmailForHours,
        DialogueState::AppointmentChoice,
        DialogueState::AwaitingAppointmentDetails,
        DialogueState::ProblemChoice,
        DialogueState::AwaitingProblemDetails,
        DialogueState::AwaitingGenericMessage,
        DialogueState::Terminated,
    ];

    pub fn is_terminal(&self) -> bool {
        matches!(self, DialogueState::Terminated)
    }

    /// States where the next usable utterance is captured verbatim as data.
    pub fn captures_free_text(&self) -> bool {
        matches!(
            self,
            DialogueState::AwaitingEmailForHours
                | DialogueState::AwaitingAppointmentDetails
                | DialogueState::AwaitingProblemDetails
                | DialogueState::AwaitingGenericMessage
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DialogueState::Initial => "INITIAL",
            DialogueState::General => "GENERAL",
            DialogueState::HoursOffered => "HOURS_OFFERED",
            DialogueState::AwaitingEmailForHours => "AWAITING_EMAIL_FOR_HOURS",
            DialogueState::AppointmentChoice => "APPOINTMENT_CHOICE",
            DialogueState::AwaitingAppointmentDetails => "AWAITING_APPOINTMENT_DETAILS",
            DialogueState::ProblemChoice => "PROBLEM_CHOICE",
            DialogueState::AwaitingProblemDetails => "AWAITING_PROBLEM_DETAILS",
            DialogueState::AwaitingGenericMessage => "AWAITING_GENERIC_MESSAGE",
            DialogueState::Terminated => "TERMINATED",
        }
    }
}

impl fmt::Display for DialogueState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
