//! TwiML rendering for a turn reply.

use protocol::{Control, TurnReply};

use crate::config::SpeechSettings;

pub const CONTENT_TYPE: &str = "text/xml; charset=utf-8";

/// `ContinueListening` speaks inside a speech `<Gather>` so the caller can
/// barge in; `Transfer` speaks then dials; `EndCall` speaks then hangs up.
pub fn render(reply: &TurnReply, speech: &SpeechSettings) -> String {
    let say = say(&reply.prompt, speech);
    let body = match &reply.control {
        Control::ContinueListening => format!(
            r#"<Gather input="speech" action="{}" method="POST" timeout="{}" language="{}">{}</Gather><Redirect method="POST">{}</Redirect>"#,
            escape(&speech.action_path),
            speech.gather_timeout_secs,
            escape(&speech.language),
            say,
            escape(&speech.action_path),
        ),
        Control::Transfer { destination } => format!("{}<Dial>{}</Dial>", say, escape(destination)),
        Control::EndCall => format!("{}<Hangup/>", say),
    };
    format!(r#"<?xml version="1.0" encoding="UTF-8"?><Response>{}</Response>"#, body)
}

fn say(text: &str, speech: &SpeechSettings) -> String {
    format!(
        r#"<Say voice="{}" language="{}">{}</Say>"#,
        escape(&speech.voice),
        escape(&speech.language),
        escape(text)
    )
}

pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            c => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_listen_wraps_say_in_gather() {
        let xml = render(&TurnReply::listen("Bonjour"), &SpeechSettings::default());
        assert!(xml.starts_with("<?xml"));
        assert!(xml.contains(r#"<Gather input="speech" action="/voice""#));
        assert!(xml.contains(r#"timeout="3""#));
        assert!(xml.contains(r#"<Say voice="Polly.Celine" language="fr-FR">Bonjour</Say></Gather>"#));
        assert!(!xml.contains("<Hangup/>"));
    }

    #[test]
    fn test_transfer_dials_after_speaking() {
        let xml = render(&TurnReply::transfer("One moment", "+33100000000"), &SpeechSettings::default());
        let say = xml.find("<Say").unwrap();
        let dial = xml.find("<Dial>+33100000000</Dial>").unwrap();
        assert!(say < dial);
        assert!(!xml.contains("<Gather"));
    }

    #[test]
    fn test_end_hangs_up() {
        let xml = render(&TurnReply::end("Goodbye"), &SpeechSettings::default());
        assert!(xml.ends_with("<Hangup/></Response>"));
    }

    #[test]
    fn test_prompt_text_is_escaped() {
        let xml = render(&TurnReply::listen(r#"Smith & Sons <"open"> l'été"#), &SpeechSettings::default());
        assert!(xml.contains("Smith &amp; Sons &lt;&quot;open&quot;&gt; l&apos;été"));
    }
}
