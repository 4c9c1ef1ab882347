/// Prompt construction for watermark removal requests

/// Instruction sent with every image.
pub const DEFAULT_PROMPT: &str = "Remove all watermarks, text overlays, logos, and time-stamps from this image. Fill in the removed areas seamlessly to match the surrounding background texture and lighting. Output ONLY the processed image.";

/// Build the prompt for one request.
///
/// A non-blank user instruction is appended as an extra focus clause; it
/// never replaces the default instruction.
pub fn build(instruction: Option<&str>) -> String {
    match instruction.map(str::trim).filter(|i| !i.is_empty()) {
        Some(extra) => format!("{} Additionally, focus on: {}", DEFAULT_PROMPT, extra),
        None => DEFAULT_PROMPT.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_prompt_without_instruction() {
        assert_eq!(build(None), DEFAULT_PROMPT);
        assert_eq!(build(Some("   ")), DEFAULT_PROMPT);
    }

    #[test]
    fn test_instruction_is_appended() {
        let prompt = build(Some(" the date stamp in the lower right "));
        assert!(prompt.starts_with(DEFAULT_PROMPT));
        assert!(prompt.ends_with("Additionally, focus on: the date stamp in the lower right"));
    }
}
