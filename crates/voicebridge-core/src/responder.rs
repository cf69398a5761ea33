//! Responder — turns a final transcript into a reply string.
//!
//! This is intentionally the thinnest component in the pipeline: a real
//! deployment would swap this for an LLM or dialogue-manager call, but the
//! state machine around it (§4.5) doesn't care how the reply is produced,
//! only that it arrives as a `String` once per finalized utterance.

/// Produce a reply for a finalized user utterance.
#[must_use]
pub fn respond_to(final_transcript: &str) -> String {
    let trimmed = final_transcript.trim();
    if trimmed.is_empty() {
        return "I didn't catch that, could you say it again?".to_string();
    }
    format!("You said: {trimmed}. Here's my reply.")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn echoes_the_heard_transcript() {
        let reply = respond_to("what is the weather like today");
        assert!(reply.contains("what is the weather like today"));
    }

    #[test]
    fn empty_transcript_gets_a_fallback_reply() {
        let reply = respond_to("   ");
        assert_eq!(reply, "I didn't catch that, could you say it again?");
    }
}
