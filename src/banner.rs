//! Session banner and console message text.

use std::io::{self, Write};

pub const TITLE: &str = "Azure AI Question Answering Bot";
pub const FAREWELL: &str = "Bot: Goodbye! Have a great day!";
pub const NOT_FOUND: &str = "Bot: I'm sorry, I don't have an answer for that question.";
pub const NOT_FOUND_HINT: &str = "     Try asking something else!";
pub const PROMPT: &str = "You: ";

const RULE_WIDTH: usize = 40;

/// Knowledge base details shown under the title.
pub struct BannerInfo<'a> {
    pub project: &'a str,
    pub deployment: &'a str,
}

/// Print the startup banner.
pub fn print_banner(out: &mut impl Write, info: &BannerInfo) -> io::Result<()> {
    let rule = "=".repeat(RULE_WIDTH);
    writeln!(out, "{TITLE}")?;
    writeln!(out, "{rule}")?;
    writeln!(out, "Knowledge base: {} ({})", info.project, info.deployment)?;
    writeln!(out, "Type 'quit' or 'exit' to end the session")?;
    writeln!(out, "{rule}")?;
    writeln!(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render(info: &BannerInfo) -> String {
        let mut buf = Vec::new();
        print_banner(&mut buf, info).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn banner_has_title_and_quit_hint() {
        let text = render(&BannerInfo {
            project: "LearnFAQ",
            deployment: "production",
        });
        assert!(text.starts_with(TITLE));
        assert!(text.contains("Type 'quit' or 'exit' to end the session"));
        assert!(text.contains(&"=".repeat(40)));
    }

    #[test]
    fn banner_shows_knowledge_base() {
        let text = render(&BannerInfo {
            project: "HRPolicies",
            deployment: "staging",
        });
        assert!(text.contains("HRPolicies (staging)"));
    }

    #[test]
    fn banner_ends_with_blank_line() {
        let text = render(&BannerInfo {
            project: "p",
            deployment: "d",
        });
        assert!(text.ends_with("\n\n"));
    }
}
