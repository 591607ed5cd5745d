use serde::{Deserialize, Serialize};

use crate::session::Topic;

/// Everything the system can say, by meaning rather than wording.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PromptKey {
    Greeting,
    Menu,
    PleaseRepeat,
    OfferTransfer,
    Farewell,
    TransferFarewell,
    HoursOffer,
    HoursReoffer,
    AskEmailAddress,
    HoursSent,
    NothingElse,
    ChoiceOffer(Topic),
    ReaskChoice(Topic),
    AskDetails(Topic),
    AskMessage,
    MessageSent,
    NotificationFailed,
    TransferFailed,
    SystemError,
}

/// Prompt wording. `{business}` and `{hours}` are substituted on render.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PromptCatalog {
    pub business_name: String,
    pub opening_hours: String,
    pub greeting: String,
    pub menu: String,
    pub please_repeat: String,
    pub offer_transfer: String,
    pub farewell: String,
    pub transfer_farewell: String,
    pub hours_offer: String,
    pub hours_reoffer: String,
    pub ask_email_address: String,
    pub hours_sent: String,
    pub nothing_else: String,
    pub appointment_choice: String,
    pub problem_choice: String,
    pub reask_choice: String,
    pub ask_appointment_details: String,
    pub ask_problem_details: String,
    pub ask_message: String,
    pub message_sent: String,
    pub notification_failed: String,
    pub transfer_failed: String,
    pub system_error: String,
}

impl Default for PromptCatalog {
    fn default() -> Self {
        Self {
            business_name: "the office".into(),
            opening_hours: "Monday to Friday, 9 a.m. to 6 p.m.".into(),
            greeting: "Hello, you have reached {business}. How can I help you?".into(),
            menu: "I can give you our opening hours, help with an appointment, or take a message. What would you like?".into(),
            please_repeat: "Sorry, I didn't catch that. Could you please repeat?".into(),
            offer_transfer: "I'm having trouble hearing you. Would you like me to transfer you to someone? Otherwise, please repeat your request.".into(),
            farewell: "Thank you for calling {business}. Have a nice day, goodbye.".into(),
            transfer_farewell: "Thank you. I'm transferring you now, please hold.".into(),
            hours_offer: "We are open {hours}. Would you like me to send you these hours by e-mail?".into(),
            hours_reoffer: "Would you like to receive our opening hours by e-mail? Please answer yes or no.".into(),
            ask_email_address: "Sure. What e-mail address should I send them to?".into(),
            hours_sent: "Done, the opening hours are on their way. Is there anything else I can do for you?".into(),
            nothing_else: "Alright. Is there anything else I can help you with? You can also just say goodbye.".into(),
            appointment_choice: "I can transfer you now to book your appointment, or take a message. Which do you prefer?".into(),
            problem_choice: "I'm sorry to hear that. I can transfer you now to someone who can help, or take a message. Which do you prefer?".into(),
            reask_choice: "Sorry, would you like to be transferred now, or leave a message?".into(),
            ask_appointment_details: "Please tell me your name and when you would like the appointment.".into(),
            ask_problem_details: "Please describe the problem, with your name and how to reach you.".into(),
            ask_message: "Go ahead, I'm listening. Please leave your message.".into(),
            message_sent: "Thank you, your message has been sent. Is there anything else I can do for you?".into(),
            notification_failed: "I'm sorry, an error occurred and your message could not be sent. Please call back later. Is there anything else I can do for you?".into(),
            transfer_failed: "I'm sorry, I could not transfer your call. Please call back later. Goodbye.".into(),
            system_error: "Sorry, a technical problem occurred. Please try again.".into(),
        }
    }
}

impl PromptCatalog {
    pub fn template(&self, key: PromptKey) -> &str {
        match key {
            PromptKey::Greeting => &self.greeting,
            PromptKey::Menu => &self.menu,
            PromptKey::PleaseRepeat => &self.please_repeat,
            PromptKey::OfferTransfer => &self.offer_transfer,
            PromptKey::Farewell => &self.farewell,
            PromptKey::TransferFarewell => &self.transfer_farewell,
            PromptKey::HoursOffer => &self.hours_offer,
            PromptKey::HoursReoffer => &self.hours_reoffer,
            PromptKey::AskEmailAddress => &self.ask_email_address,
            PromptKey::HoursSent => &self.hours_sent,
            PromptKey::NothingElse => &self.nothing_else,
            PromptKey::ChoiceOffer(Topic::Appointment) => &self.appointment_choice,
            PromptKey::ChoiceOffer(Topic::Problem) => &self.problem_choice,
            PromptKey::ReaskChoice(_) => &self.reask_choice,
            PromptKey::AskDetails(Topic::Appointment) => &self.ask_appointment_details,
            PromptKey::AskDetails(Topic::Problem) => &self.ask_problem_details,
            PromptKey::AskMessage => &self.ask_message,
            PromptKey::MessageSent => &self.message_sent,
            PromptKey::NotificationFailed => &self.notification_failed,
            PromptKey::TransferFailed => &self.transfer_failed,
            PromptKey::SystemError => &self.system_error,
        }
    }

    pub fn render(&self, key: PromptKey) -> String {
        self.template(key)
            .replace("{business}", &self.business_name)
            .replace("{hours}", &self.opening_hours)
    }
}
