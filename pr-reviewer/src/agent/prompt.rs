//! Seed turn for the agent loop.

use crate::tools::ToolDescriptor;

/// Initial prompt followed by the list of tools the model may call.
pub fn seed_prompt(initial_prompt: &str, tools: &[ToolDescriptor]) -> String {
    if tools.is_empty() {
        return initial_prompt.to_string();
    }

    let tool_descriptions = tools
        .iter()
        .map(|t| format!("- **{}**: {}", t.signature(), t.description))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "{initial_prompt}\n\n## Available tools\n\n{tool_descriptions}\n\n\
         Call a tool when you need more context. When you are done, reply with \
         the final answer only."
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::fs::{list_files_descriptor, read_file_descriptor};

    #[test]
    fn lists_tools_in_order() {
        let tools = [list_files_descriptor(), read_file_descriptor()];
        let seed = seed_prompt("Review the diff.", &tools);
        assert!(seed.starts_with("Review the diff."));
        let list_pos = seed.find("**list_files(directory?: string, depth?: integer)**").unwrap();
        let read_pos = seed.find("**read_file(path: string)**").unwrap();
        assert!(list_pos < read_pos);
    }

    #[test]
    fn no_tools_keeps_prompt() {
        assert_eq!(seed_prompt("p", &[]), "p");
    }
}
