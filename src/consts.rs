//! Project-wide constants.

/// Required: base URL of the Language resource.
pub const ENV_ENDPOINT: &str = "AI_SERVICE_ENDPOINT";
/// Required: subscription key for the Language resource.
pub const ENV_KEY: &str = "AI_SERVICE_KEY";
pub const ENV_PROJECT_NAME: &str = "QA_PROJECT_NAME";
pub const ENV_DEPLOYMENT_NAME: &str = "QA_DEPLOYMENT_NAME";
/// Log filter override, same syntax as `RUST_LOG`.
pub const ENV_LOG: &str = "QNABOT_LOG";

pub const DEFAULT_PROJECT_NAME: &str = "LearnFAQ";
pub const DEFAULT_DEPLOYMENT_NAME: &str = "production";

/// Minimum confidence a candidate needs to be returned by the service.
pub const DEFAULT_CONFIDENCE_THRESHOLD: f64 = 0.3;

/// Number of ranked candidates requested per question.
pub const DEFAULT_TOP: u32 = 3;

/// Upper bound the service accepts for `top`.
pub const MAX_TOP: u32 = 50;

/// Words that end the session, compared case-insensitively.
pub const QUIT_WORDS: &[&str] = &["quit", "exit", "bye"];

/// Format a confidence score as a whole percentage (e.g. 0.873 -> "87%").
pub fn format_confidence(confidence: f64) -> String {
    format!("{:.0}%", confidence.clamp(0.0, 1.0) * 100.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_confidence_rounds_to_whole_percent() {
        assert_eq!(format_confidence(0.873), "87%");
        assert_eq!(format_confidence(0.87), "87%");
        assert_eq!(format_confidence(0.876), "88%");
    }

    #[test]
    fn format_confidence_bounds() {
        assert_eq!(format_confidence(0.0), "0%");
        assert_eq!(format_confidence(1.0), "100%");
    }

    #[test]
    fn format_confidence_clamps_out_of_range() {
        assert_eq!(format_confidence(-0.2), "0%");
        assert_eq!(format_confidence(1.7), "100%");
    }

    #[test]
    fn quit_words_are_lowercase() {
        for word in QUIT_WORDS {
            assert_eq!(*word, word.to_lowercase());
        }
    }

    #[test]
    fn default_top_within_service_limit() {
        assert!(DEFAULT_TOP >= 1 && DEFAULT_TOP <= MAX_TOP);
    }
}
