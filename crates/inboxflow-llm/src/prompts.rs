//! Prompt text and response cleanup shared by the clients.

use std::fmt::Write;

use inboxflow_mime::Language;

/// Characters of body text sent to the classifier per message.
pub const BODY_PREVIEW_CHARS: usize = 500;

pub const CLASSIFIER_SYSTEM: &str = "\
You are an assistant that triages inbound company email. Analyze the batch of \
messages and rate how important each one is, and decide whether it should be \
shown to the operator.

Scoring (0-100):
- 90-100 critical: production incidents, urgent bugs, customer complaints, major \
partnership proposals, anything needing an immediate reply or a tracked ticket
- 70-89 high: project status, design reviews, concrete requests with deadlines
- 50-69 medium: general discussion, meeting notes, informational updates
- 30-49 low: automatic notifications, newsletters, broadcasts needing no reply
- 0-29 unimportant: spam, marketing, unrelated content

Set visible=false for obvious spam, advertising, SEO or guest posting pitches, \
and automated notifications that need no human action (such as alerts that \
resolved themselves). Login problems and password resets stay visible with a \
low score.

Answer with JSON only, no other text:
{\"results\": [{\"id\": \"message id\", \"score\": 0, \"visible\": true}]}";

/// Builds the classifier user prompt for a batch.
pub fn classifier_batch<'a>(
    messages: impl ExactSizeIterator<Item = (&'a str, &'a str, &'a str, &'a str, &'a str)>,
) -> String {
    let mut prompt = format!("Analyze the following {} messages:\n\n", messages.len());
    for (id, from_name, from_email, subject, body) in messages {
        let preview: String = body.chars().take(BODY_PREVIEW_CHARS).collect();
        let _ = write!(
            prompt,
            "---\nID: {id}\nFrom: {from_name} <{from_email}>\nSubject: {subject}\nBody preview: {preview}\n---\n"
        );
    }
    prompt
}

pub fn reply_system(tone: &str, language: Language) -> String {
    format!(
        "You are a professional email reply assistant. Write an appropriate reply to the \
         message below.\n\
         Requirements:\n\
         - Tone: {tone}\n\
         - Write in the same language as the original message ({})\n\
         - Output only the reply body, without subject or recipient lines\n\
         - Address the specific questions and points raised in the message\n\
         - Open with a greeting such as Hi, Hello or Dear, never Hey",
        language.display_name()
    )
}

pub fn reply_user(from_name: &str, subject: &str, body: &str) -> String {
    format!("From: {from_name}\nSubject: {subject}\nBody:\n{body}")
}

pub fn translate_system(pivot: Language) -> String {
    format!(
        "You are a professional email translator. Translate the message into {pivot}.\n\
         Requirements:\n\
         - Convey the full meaning without omissions\n\
         - Keep the register and tone of the original\n\
         - Translate technical terms accurately, keeping the original term in parentheses where useful\n\
         - Keep names of people, companies and products\n\
         - Keep the paragraph structure\n\
         - If the text is already in {pivot}, return it unchanged\n\
         Output only the translation.",
        pivot = pivot.display_name()
    )
}

pub const TICKET_SYSTEM: &str = "You are an experienced project management assistant. \
Output strictly the JSON the user asks for, without markdown code fences or extra text.";

pub fn ticket_user(
    from_name: &str,
    from_email: &str,
    subject: &str,
    body: &str,
    translated_body: Option<&str>,
    pivot: Language,
) -> String {
    format!(
        "Turn the following email into a structured issue tracker ticket.\n\n\
         Requirements:\n\
         - title: concise summary of the core problem or request, at most 80 characters\n\
         - description: Markdown with two sections:\n\
         \x20 1. **Current situation**: background, the concrete problem, key facts \
         (data, dates, people, systems) and impact\n\
         \x20 2. **Proposed solution**: steps as a list, expected outcome, risks\n\
         - Write in {pivot}\n\
         - Keep important original details\n\n\
         Answer with this JSON only:\n\
         {{\"title\": \"ticket title\", \"description\": \"ticket description (Markdown)\"}}\n\n\
         From: {from_name} <{from_email}>\n\
         Subject: {subject}\n\
         Original:\n{body}\n\n\
         Translation (if any):\n{translated}",
        pivot = pivot.display_name(),
        translated = translated_body.unwrap_or("none"),
    )
}

pub const REQUIREMENT_SYSTEM: &str = "You are an experienced product manager and \
requirements analyst. Output strictly the JSON the user asks for, without markdown \
code fences or extra text.";

pub fn requirement_user(
    text: &str,
    previous: Option<(&str, &str)>,
    feedback: Option<&str>,
    pivot: Language,
) -> String {
    let mut prompt = format!(
        "Analyze the requirement below and produce a structured issue tracker ticket.\n\n\
         Requirements:\n\
         - title: concise summary of the core need, at most 80 characters\n\
         - description: Markdown with the sections **Background**, **User needs** \
         (as a list) and **Proposed solution** (implementation steps, acceptance criteria)\n\
         - Write in {pivot}\n\n\
         Answer with this JSON only:\n\
         {{\"title\": \"ticket title\", \"description\": \"ticket description (Markdown)\"}}\n\n\
         Requirement:\n{text}",
        pivot = pivot.display_name(),
    );

    if let (Some((title, description)), Some(feedback)) = (previous, feedback) {
        let _ = write!(
            prompt,
            "\n\n--- Previous result ---\nTitle: {title}\nDescription: {description}\n\n\
             --- Feedback ---\n{feedback}\n\n\
             Refine the previous result according to the feedback, using the same JSON format."
        );
    }
    prompt
}

/// Removes a surrounding markdown code fence, if any.
pub fn strip_code_fences(raw: &str) -> &str {
    let trimmed = raw.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let rest = rest
        .strip_prefix("json")
        .or_else(|| rest.strip_prefix("JSON"))
        .unwrap_or(rest);
    rest.strip_suffix("```").unwrap_or(rest).trim()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_code_fences() {
        assert_eq!(strip_code_fences("```json\n[1]\n```"), "[1]");
        assert_eq!(strip_code_fences("```\n{}\n```"), "{}");
        assert_eq!(strip_code_fences("  {\"a\":1} "), "{\"a\":1}");
        assert_eq!(strip_code_fences("```JSON {}"), "{}");
    }

    #[test]
    fn test_classifier_batch_truncates_body() {
        let body = "x".repeat(800);
        let prompt = classifier_batch(
            [("m1", "Ann", "ann@example.com", "Hi", body.as_str())].into_iter(),
        );
        assert!(prompt.starts_with("Analyze the following 1 messages"));
        assert!(prompt.contains("ID: m1"));
        assert!(prompt.contains(&"x".repeat(BODY_PREVIEW_CHARS)));
        assert!(!prompt.contains(&"x".repeat(BODY_PREVIEW_CHARS + 1)));
    }

    #[test]
    fn test_requirement_refinement_needs_both_parts() {
        let plain = requirement_user("Export to CSV", Some(("T", "D")), None, Language::Chinese);
        assert!(!plain.contains("Previous result"));

        let refined = requirement_user(
            "Export to CSV",
            Some(("CSV export", "Add a button")),
            Some("Also support Excel"),
            Language::Chinese,
        );
        assert!(refined.contains("Title: CSV export"));
        assert!(refined.contains("Also support Excel"));
    }
}
