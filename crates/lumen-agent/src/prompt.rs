//! System prompt assembly.

pub const SYSTEM_PROMPT: &str = "You are a helpful perioperative analytics assistant that helps \
users understand and analyze OR block utilization data.

You have access to the following tools for querying block utilization metrics:

1. **block_util_summary** - Get overall utilization metrics for a date range
2. **block_util_by_block_group** - Break down utilization by service line or block group
3. **block_util_by_surgeon** - Analyze utilization per surgeon
4. **block_util_drill_down** - Get detailed day-by-day block data

When answering questions:
- Always use the appropriate tool to fetch data before providing analysis
- Present data in a clear, organized manner
- Highlight key insights such as high/low performers, trends, and areas for improvement
- Use specific numbers and percentages when available
- If asked about a specific surgeon or service, filter the data appropriately

Common metrics you can help with:
- **Utilization Rate**: Percentage of allocated block time that was actually used
- **Prime Time Utilization**: Usage during premium OR hours (typically 7am-3pm weekdays)
- **In-Block Time**: Minutes of cases performed within allocated block
- **Out-of-Block Time**: Minutes of cases that ran beyond the allocated block (overtime)
- **Cases per Block**: Average number of surgical cases completed per block

Always be helpful and proactive in suggesting additional analyses that might be useful.";

pub const TOOL_USE_INSTRUCTIONS: &str = "When you need data to answer a question:
1. Identify which tool(s) will provide the needed information
2. Call the tool with appropriate parameters
3. Analyze the results and present findings clearly
4. Suggest follow-up analyses if relevant";

/// Builds a system prompt from blank-line separated sections.
///
/// ```rust
/// use lumen_agent::prompt::PromptBuilder;
///
/// let prompt = PromptBuilder::empty()
///     .section("Base")
///     .bulleted("Data Scope", ["Main campus only"])
///     .build();
/// assert_eq!(prompt, "Base\n\n## Data Scope:\n- Main campus only");
/// ```
#[derive(Debug, Clone)]
pub struct PromptBuilder {
    sections: Vec<String>,
}

impl Default for PromptBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl PromptBuilder {
    /// Starts with the analytics prompt and tool-use instructions.
    pub fn new() -> Self {
        Self {
            sections: vec![SYSTEM_PROMPT.to_string(), TOOL_USE_INSTRUCTIONS.to_string()],
        }
    }

    pub fn empty() -> Self {
        Self {
            sections: Vec::new(),
        }
    }

    /// Append a free-form section. Blank sections are dropped.
    pub fn section(mut self, body: impl Into<String>) -> Self {
        let body = body.into();
        if !body.trim().is_empty() {
            self.sections.push(body.trim_end().to_string());
        }
        self
    }

    /// Append `## {heading}:` followed by one bullet per item.
    /// Nothing is added when `items` is empty.
    pub fn bulleted<I, S>(mut self, heading: &str, items: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let bullets: Vec<String> = items
            .into_iter()
            .map(|item| format!("- {}", item.as_ref()))
            .collect();
        if !bullets.is_empty() {
            self.sections
                .push(format!("## {heading}:\n{}", bullets.join("\n")));
        }
        self
    }

    pub fn build(&self) -> String {
        self.sections.join("\n\n")
    }
}

/// The default prompt: analytics prompt plus tool-use instructions.
pub fn base_system_prompt() -> String {
    PromptBuilder::new().build()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_prompt_joins_with_blank_line() {
        let prompt = base_system_prompt();
        assert!(prompt.starts_with("You are a helpful perioperative analytics assistant"));
        assert!(prompt.contains("useful.\n\nWhen you need data"));
    }

    #[test]
    fn test_empty_sections_skipped() {
        let prompt = PromptBuilder::empty()
            .section("  ")
            .bulleted("Nothing", Vec::<String>::new())
            .section("Only")
            .build();
        assert_eq!(prompt, "Only");
    }

    #[test]
    fn test_bulleted_section() {
        let prompt = PromptBuilder::empty()
            .bulleted("What you CAN help with", ["Block utilization", "Surgeon metrics"])
            .build();
        assert_eq!(
            prompt,
            "## What you CAN help with:\n- Block utilization\n- Surgeon metrics"
        );
    }
}
