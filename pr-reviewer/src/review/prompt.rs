//! Review prompts for the three modes.

const REVIEWER_PERSONA: &str = "You are a senior backend engineer reviewing a pull request. \
Review the unified diff below carefully and focus on:
1. Performance bottlenecks when processing large amounts of data.
2. Concurrency control and thread safety.
3. Database query efficiency and index usage.
4. Cache consistency problems.
5. Overall architecture and clean code.";

const JSON_CONTRACT: &str = r#"Reply with JSON only, using exactly this shape:
{
  "summary": "overall assessment of the change",
  "reviews": [
    {"path": "full/path/of/File.java", "line": 25, "body": "specific, actionable feedback"}
  ]
}
- `path` is the file path as it appears in the diff.
- `line` is the real line number in the new version of the file.
- `body` may use markdown, including suggested code."#;

/// Free-form markdown review (simple mode).
pub fn simple_prompt(diff: &str) -> String {
    format!(
        "{REVIEWER_PERSONA}\n\nBe friendly but precise, and show example code for anything \
         that should change.\n\nHere is the code diff:\n\n{diff}"
    )
}

/// Single-shot structured review (structured mode).
pub fn structured_prompt(diff: &str) -> String {
    format!(
        "{REVIEWER_PERSONA}\n\nInfer line numbers from the diff hunk headers.\n\n\
         {JSON_CONTRACT}\n\nHere is the code diff:\n\n{diff}"
    )
}

/// Tool-assisted structured review (agentic mode).
pub fn agentic_prompt(diff: &str) -> String {
    format!(
        "{REVIEWER_PERSONA}\n\nWhen the diff alone is not enough, use the tools to list \
         directories and read whole files. Read a file before commenting on it so that line \
         numbers are exact.\n\n{JSON_CONTRACT}\n\nHere is the code diff:\n\n{diff}"
    )
}
