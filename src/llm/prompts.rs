//! Prompts sent to the capability model.

/// Instruction sent alongside the image for text extraction.
pub const OCR_INSTRUCTION: &str = "Perform OCR on this image. Extract all text content accurately. If there is Arabic text, extract it as is.";

/// Prompt template for Arabic-to-English translation.
pub const TRANSLATION_PROMPT: &str = r#"Translate the following Arabic text into English. Ensure the translation is accurate and natural. Provide only the translated English text without any additional commentary or phrases like "Here is the translation:".

Arabic Text:
"{text}"
"#;

/// Build the translation prompt for the given source text.
pub fn translation_prompt(text: &str) -> String {
    TRANSLATION_PROMPT.replace("{text}", text)
}
