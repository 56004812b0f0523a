// Prompt templates for the chat-backed capabilities. `{text}` is replaced
// with the user's input.

pub const TEXT_CORRECTION_PROMPT: &str = "\
Proofread the text below. Fix spelling, grammar and punctuation errors without \
changing its meaning or tone. Output only the corrected text.

Text:
{text}";

pub const TRANSLATE_ZH_TO_EN_PROMPT: &str = "\
Translate the following Chinese text into English.
1. Keep technical terms accurate.
2. Preserve the style and tone of the original.
3. Make sure the grammar is correct.
4. Output only the translation, nothing else.

Original:
{text}";

pub const TRANSLATE_EN_TO_ZH_PROMPT: &str = "\
Translate the following English text into Chinese.
1. The translation must read naturally to a native speaker.
2. Keep technical terms accurate.
3. Preserve the style of the original.
4. Output only the translation, nothing else.

Original:
{text}";

pub const CODE_WRITING_PROMPT: &str = "\
Write complete, runnable code that satisfies the requirements below.
1. Provide the full implementation.
2. Include the comments a reader needs.
3. Make sure the code executes.
4. If several approaches exist, give the best one.

Requirements:
{text}";

pub const STORY_EXPANSION_PROMPT: &str = "\
Expand the story below in a vivid style.
1. Keep the original style and plot consistent.
2. Add descriptive detail where it fits.
3. The result should be 50% to 100% longer than the original.
4. Keep the language fluent and natural.

Original:
{text}";

pub fn render(template: &str, text: &str) -> String {
    template.replace("{text}", text)
}
