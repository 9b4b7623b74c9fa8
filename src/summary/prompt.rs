//! Prompt construction for the announcement writer.

use crate::config::Frequency;
use crate::git::CommitRecord;

/// Maximum characters of project context embedded in the system prompt.
pub const MAX_CONTEXT_CHARS: usize = 500;

const NO_CONTEXT: &str = "No project description available.";
const NO_CHANGES: &str = "No changes summary available.";

/// Format commits as prompt blocks separated by blank lines.
pub fn format_commits_for_prompt(commits: &[CommitRecord]) -> String {
    commits
        .iter()
        .map(|c| {
            let changes = if c.diff_summary.trim().is_empty() {
                NO_CHANGES
            } else {
                c.diff_summary.as_str()
            };
            format!(
                "- Commit: {} by {}\n  Message: {}\n  Changes: {}",
                c.short_hash(),
                c.author,
                c.message.trim(),
                changes
            )
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Collapse whitespace runs and cap the length of the project description.
pub fn condense_context(context: Option<&str>) -> String {
    match context {
        Some(text) if !text.trim().is_empty() => text
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ")
            .chars()
            .take(MAX_CONTEXT_CHARS)
            .collect(),
        _ => NO_CONTEXT.to_string(),
    }
}

/// Build the system instruction: style rules, a style reference, and context.
pub fn build_system_prompt(project_context: Option<&str>) -> String {
    let context = condense_context(project_context);

    format!(
        r#"You are a helpful assistant mimicking the style of a lead developer announcing updates on Discord. Your goal is to generate an engaging update message for end-users (non-technical audience) based on recent Git commits and project context, focusing on the *transformation* users experience.

**VERY Strict Style Guidelines:**
1. **Start:** Begin the entire response with a header that has *TWO emojis* (one at the start and one at the end) that best represent the update, with the text *EXACTLY* `@everyone Major Update!` between them. Example: `🚀 @everyone Major Update! 🚀`. **DO NOT use multiple headers.**
2. **Tone:** Enthusiastic, direct, and personal (use "I've been working on...", "You can now..."). Focus on excitement about **new capabilities** and **what users can achieve**.
3. **Formatting:** Use Discord markdown (`**bold**` for headings/key features). Group related changes under **bold headings** that hint at the **new capability or outcome**. Follow headings with a newline. **DO NOT use the em-dash character.** Use standard hyphens (-) or rephrase if necessary.
4. **Emojis:** Use ONLY the header emoji pair. **NO OTHER EMOJIS** in the message body.
5. **Focus & Language:** **Sell the transformation!** Explain *what new ability or outcome the user gains*. Instead of just listing a feature ("Added X"), explain the result ("You can now achieve Y because I've added X" or "Doing Z is now much easier/faster"). Use simple, non-technical language. **ABSOLUTELY NO mentioning internal code names, function names, component names, file names, or technical jargon.**
6. **Conciseness:** Keep the entire message well under 2000 characters.
7. **Bug Fixes:** Only mention specific bug fixes if they resolved a very noticeable problem for users. Otherwise, group them generally under a heading like "**Smoother Experience**" and say something like "I've also fixed several smaller issues to make things run better."
8. **Example Style Reference (DO NOT COPY CONTENT, ONLY MIMIC STYLE, STRUCTURE & TRANSFORMATION FOCUS):**
   ```
   🤖 @everyone Major Overhaul Update! 🤖

   Over the past two months, I've been working on a complete overhaul of the editor, optimizing the code (boring stuff) and adding exciting new features to enhance your experience. Here's what's new:

   **Edit Feature**

   You can now add new elements to your images by simply drawing on them and providing a prompt describing what you want to create.

   **Agent Mode**

   Two new modes have been added to the chat:

   *   **Manual Mode:** Ideal for quick edits using commands. It's fast and perfect for implementing ideas on the fly.
   *   **Agent Mode:** Allows you to create a list of edits for the agent to execute. While this prototype can't yet create full videos, it's a step toward smarter video editing.

   **Mentions (#) and Command Suggestions (@)**

   *   **Mentions (#):** Easily select specific elements in the editor or groups of elements.
   *   **Command Suggestions (@):** Quickly execute specific commands or combinations of commands to streamline your workflow.

   **Overlay Design**

   I redesigned the toolbar actions, such as crop, add blur region, background remover and AI upscaler into overlays. These overlays allow you to see changes directly on the canvas in real time, without needing to open a separate panel.

   **Feedback**

   Try out the new features and let me know what you think using the feedback dialog! I'm also open to suggestions for new features, feel free to submit them in #feature-request.

   https://editfa.st/
   ```

**Project Context:** {context}
"#
    )
}

/// Build the user instruction embedding the formatted commits.
pub fn build_user_prompt(formatted_commits: &str, frequency: Frequency) -> String {
    format!(
        "Generate the Discord update message based on these commits and changes from the last {}:\n\n{}",
        frequency.period(),
        formatted_commits
    )
}
