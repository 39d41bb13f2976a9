//! Heuristics over user prompts and model replies

const EDIT_KEYWORDS: &[&str] = &[
    "qo'y",
    "qo‘y",
    "o'zgart",
    "o‘zgart",
    "tahrir",
    "joylashtir",
    "almashtir",
    "ustiga",
    "ustidan",
    "qilib ber",
    "qilib bera",
    "propors",
    "tekstura",
    "texture",
    "edit",
    "change",
    "apply",
    "replace",
    "put",
    "remove",
    "add",
];

const TOOL_CALL_MARKERS: &[&str] = &[
    "generate_image",
    "\"text_prompt\"",
    "\"image_prompt\"",
    "image_strength",
    "image_url",
];

/// Whether the user most likely wants an edited image back
///
/// Two or more images always count as an edit request.
pub fn wants_image_output(prompt: &str, image_count: usize) -> bool {
    if image_count >= 2 {
        return true;
    }
    let prompt = prompt.trim().to_lowercase();
    !prompt.is_empty() && EDIT_KEYWORDS.iter().any(|kw| prompt.contains(kw))
}

/// Whether a text reply is a tool call the model wrote instead of an image
pub fn looks_like_tool_call(text: &str) -> bool {
    let text = text.to_lowercase();
    TOOL_CALL_MARKERS.iter().any(|m| text.contains(m))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wants_image_output() {
        assert!(wants_image_output("", 2));
        assert!(wants_image_output("Fonni O‘ZGARTIR", 1));
        assert!(wants_image_output("please EDIT this", 1));
        assert!(wants_image_output("logoni ustiga qo'y", 1));
        assert!(!wants_image_output("Bu nima?", 1));
        assert!(!wants_image_output("   ", 0));
    }

    #[test]
    fn test_looks_like_tool_call() {
        assert!(looks_like_tool_call(r#"{"action": "GENERATE_IMAGE"}"#));
        assert!(looks_like_tool_call(r#"{"text_prompt": "x"}"#));
        assert!(looks_like_tool_call("see image_url"));
        assert!(!looks_like_tool_call("text_prompt without quotes"));
        assert!(!looks_like_tool_call("Rasm tayyor!"));
    }
}
