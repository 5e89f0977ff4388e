//! Extraction of structured data from generated text.
//!
//! Two independent paths: a question-list extractor and an evaluation
//! extractor. All assumptions about the shape of generated text live here.
//!
//! The evaluation extractor never fails. Malformed text degrades to a default
//! [`Evaluation`] instead of aborting a session the user already spent time
//! answering.

use crate::model::Evaluation;

/// Feedback used when the evaluation text is entirely blank.
pub const FALLBACK_FEEDBACK: &str = "The evaluation could not be read from the response.";

/// Splits generated text into an ordered question list.
///
/// A line with a leading `<integer>.` prefix has the prefix stripped; any
/// other non-blank line is kept trimmed verbatim. The returned list is as
/// long as the number of qualifying lines — the caller must not assume it
/// matches the requested count.
pub fn parse_questions(raw: &str) -> Vec<String> {
    raw.lines()
        .filter_map(|line| {
            let trimmed = line.trim();
            if trimmed.is_empty() {
                return None;
            }
            match strip_enumeration(trimmed) {
                Some(rest) => Some(rest.trim().to_string()),
                None => Some(trimmed.to_string()),
            }
        })
        .collect()
}

// "3. What is ..." -> Some("What is ..."); returns None when the line does
// not start with digits followed by a dot.
fn strip_enumeration(line: &str) -> Option<&str> {
    let digits_end = line.find(|c: char| !c.is_ascii_digit())?;
    if digits_end == 0 {
        return None;
    }
    line[digits_end..].strip_prefix('.')
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    Preamble,
    Score,
    Strengths,
    Weaknesses,
    Recommendations,
    Feedback,
}

// Marker vocabularies for both supported locales, recognized unconditionally
// so the parser needs no locale hint.
const MARKERS: &[(Section, &[&str])] = &[
    (Section::Score, &["SCORE", "PUAN"]),
    (Section::Strengths, &["STRENGTHS", "GÜÇLÜ_YÖNLER"]),
    (Section::Weaknesses, &["WEAKNESSES", "ZAYIF_YÖNLER"]),
    (Section::Recommendations, &["RECOMMENDATIONS", "ÖNERİLER"]),
    (Section::Feedback, &["DETAILED_FEEDBACK", "DETAYLI_GERİBİLDİRİM"]),
];

// A marker line is the marker token alone or followed by a colon. Returns the
// section it opens and whatever trails the colon ("SCORE: 72" -> " 72").
fn match_marker(line: &str) -> Option<(Section, &str)> {
    for (section, tokens) in MARKERS {
        for token in *tokens {
            if let Some(rest) = line.strip_prefix(token) {
                let rest = rest.trim_start();
                if rest.is_empty() {
                    return Some((*section, ""));
                }
                if let Some(after_colon) = rest.strip_prefix(':') {
                    return Some((*section, after_colon));
                }
            }
        }
    }
    None
}

fn first_integer(text: &str) -> Option<u8> {
    let start = text.find(|c: char| c.is_ascii_digit())?;
    let digits: String = text[start..]
        .chars()
        .take_while(|c| c.is_ascii_digit())
        .collect();
    // Anything that overflows is far past the scale ceiling anyway.
    Some(digits.parse::<u32>().map_or(100, |v| v.min(100)) as u8)
}

fn strip_bullet(line: &str) -> Option<&str> {
    line.strip_prefix('-')
        .or_else(|| line.strip_prefix('*'))
        .map(str::trim)
}

/// Extracts an [`Evaluation`] from generated text.
///
/// Marker lines open sections wherever they appear; blank lines around them
/// are not required. Within a list section only bullet lines are kept. The
/// score is the first integer found in the score section, clamped to 100,
/// defaulting to 0. Blank input yields the default evaluation with
/// [`FALLBACK_FEEDBACK`].
pub fn parse_evaluation(raw: &str) -> Evaluation {
    let text = raw.trim();
    if text.is_empty() {
        return Evaluation {
            overall_score: 0,
            strengths: Vec::new(),
            weaknesses: Vec::new(),
            recommendations: Vec::new(),
            detailed_feedback: FALLBACK_FEEDBACK.to_string(),
        };
    }

    let mut score: Option<u8> = None;
    let mut strengths = Vec::new();
    let mut weaknesses = Vec::new();
    let mut recommendations = Vec::new();
    let mut feedback_lines: Vec<&str> = Vec::new();
    let mut section = Section::Preamble;

    for line in text.lines() {
        let trimmed = line.trim();
        if let Some((next, rest)) = match_marker(trimmed) {
            section = next;
            if section == Section::Score && score.is_none() {
                score = first_integer(rest);
            }
            continue;
        }
        match section {
            Section::Score => {
                if score.is_none() {
                    score = first_integer(trimmed);
                }
            }
            Section::Strengths | Section::Weaknesses | Section::Recommendations => {
                if let Some(item) = strip_bullet(trimmed) {
                    if !item.is_empty() {
                        let target = match section {
                            Section::Strengths => &mut strengths,
                            Section::Weaknesses => &mut weaknesses,
                            _ => &mut recommendations,
                        };
                        target.push(item.to_string());
                    }
                }
            }
            Section::Feedback => feedback_lines.push(line),
            Section::Preamble => {}
        }
    }

    Evaluation {
        overall_score: score.unwrap_or(0),
        strengths,
        weaknesses,
        recommendations,
        detailed_feedback: feedback_lines.join("\n").trim().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_enumerated_questions_in_order_for_every_allowed_count() {
        for count in crate::model::MIN_QUESTIONS..=crate::model::MAX_QUESTIONS {
            let raw = (1..=count)
                .map(|i| format!("{i}. Question number {i}?"))
                .collect::<Vec<_>>()
                .join("\n");
            let questions = parse_questions(&raw);
            assert_eq!(questions.len(), count);
            for (i, q) in questions.iter().enumerate() {
                assert_eq!(q, &format!("Question number {}?", i + 1));
            }
        }
    }

    #[test]
    fn shorter_response_yields_exactly_that_many_questions() {
        let questions = parse_questions("1. Only one?\n2. And a second?");
        assert_eq!(
            questions,
            vec!["Only one?".to_string(), "And a second?".to_string()]
        );
    }

    #[test]
    fn unnumbered_lines_are_kept_verbatim() {
        let questions = parse_questions("Tell me about yourself\n\n2. Why this role?\n");
        assert_eq!(
            questions,
            vec![
                "Tell me about yourself".to_string(),
                "Why this role?".to_string()
            ]
        );
    }

    #[test]
    fn multi_digit_enumeration_is_stripped() {
        let questions = parse_questions("10. Tenth question?");
        assert_eq!(questions, vec!["Tenth question?".to_string()]);
    }

    #[test]
    fn blank_input_yields_no_questions() {
        assert!(parse_questions("").is_empty());
        assert!(parse_questions("  \n\n \t ").is_empty());
    }

    const ENGLISH_EVALUATION: &str = "SCORE: 72\n\nSTRENGTHS:\n- Clear explanations\n\nWEAKNESSES:\n- Shallow depth\n\nRECOMMENDATIONS:\n- Study distributed systems\n\nDETAILED_FEEDBACK:\nSolid fundamentals.";

    #[test]
    fn parses_well_formed_english_evaluation() {
        let evaluation = parse_evaluation(ENGLISH_EVALUATION);
        assert_eq!(evaluation.overall_score, 72);
        assert_eq!(evaluation.strengths, vec!["Clear explanations"]);
        assert_eq!(evaluation.weaknesses, vec!["Shallow depth"]);
        assert_eq!(evaluation.recommendations, vec!["Study distributed systems"]);
        assert_eq!(evaluation.detailed_feedback, "Solid fundamentals.");
    }

    #[test]
    fn turkish_markers_produce_the_same_shape() {
        let turkish = "PUAN: 72\n\nGÜÇLÜ_YÖNLER:\n- Net anlatım\n\nZAYIF_YÖNLER:\n- Yüzeysel derinlik\n\nÖNERİLER:\n- Dağıtık sistemler çalış\n\nDETAYLI_GERİBİLDİRİM:\nTemeller sağlam.";
        let english = parse_evaluation(ENGLISH_EVALUATION);
        let parsed = parse_evaluation(turkish);
        assert_eq!(parsed.overall_score, english.overall_score);
        assert_eq!(parsed.strengths.len(), english.strengths.len());
        assert_eq!(parsed.weaknesses.len(), english.weaknesses.len());
        assert_eq!(parsed.recommendations.len(), english.recommendations.len());
        assert_eq!(parsed.strengths, vec!["Net anlatım"]);
        assert!(!parsed.detailed_feedback.is_empty());
    }

    #[test]
    fn blank_input_degrades_to_default_evaluation() {
        for raw in ["", "   ", "\n\n\t"] {
            let evaluation = parse_evaluation(raw);
            assert_eq!(evaluation.overall_score, 0);
            assert!(evaluation.strengths.is_empty());
            assert!(evaluation.weaknesses.is_empty());
            assert!(evaluation.recommendations.is_empty());
            assert!(!evaluation.detailed_feedback.is_empty());
        }
    }

    #[test]
    fn missing_blank_lines_between_sections_lose_nothing() {
        let cramped = "SCORE: 55\nSTRENGTHS:\n- Focused answers\nWEAKNESSES:\n- Nervous delivery\nRECOMMENDATIONS:\n- Practice aloud\nDETAILED_FEEDBACK:\nKeep practicing.";
        let evaluation = parse_evaluation(cramped);
        assert_eq!(evaluation.overall_score, 55);
        assert_eq!(evaluation.strengths, vec!["Focused answers"]);
        assert_eq!(evaluation.weaknesses, vec!["Nervous delivery"]);
        assert_eq!(evaluation.recommendations, vec!["Practice aloud"]);
        assert_eq!(evaluation.detailed_feedback, "Keep practicing.");
    }

    #[test]
    fn score_on_a_following_line_is_still_found() {
        let raw = "SCORE:\n85\n\nDETAILED_FEEDBACK:\nFine.";
        assert_eq!(parse_evaluation(raw).overall_score, 85);
    }

    #[test]
    fn missing_or_non_numeric_score_defaults_to_zero() {
        assert_eq!(parse_evaluation("DETAILED_FEEDBACK:\nNo score.").overall_score, 0);
        assert_eq!(
            parse_evaluation("SCORE: excellent\n\nDETAILED_FEEDBACK:\nDone.").overall_score,
            0
        );
    }

    #[test]
    fn out_of_range_score_is_clamped_at_parse_time() {
        assert_eq!(parse_evaluation("SCORE: 250").overall_score, 100);
        assert_eq!(parse_evaluation("SCORE: 99999999999999999999").overall_score, 100);
    }

    #[test]
    fn asterisk_bullets_are_accepted() {
        let raw = "STRENGTHS:\n* Calm under pressure\n* Good examples";
        let evaluation = parse_evaluation(raw);
        assert_eq!(
            evaluation.strengths,
            vec!["Calm under pressure", "Good examples"]
        );
    }

    #[test]
    fn non_bullet_lines_in_list_sections_are_ignored() {
        let raw = "STRENGTHS:\nThe candidate showed:\n- Curiosity";
        assert_eq!(parse_evaluation(raw).strengths, vec!["Curiosity"]);
    }

    #[test]
    fn missing_section_markers_yield_empty_lists() {
        let raw = "SCORE: 40\n\nDETAILED_FEEDBACK:\nOnly feedback here.";
        let evaluation = parse_evaluation(raw);
        assert!(evaluation.strengths.is_empty());
        assert!(evaluation.weaknesses.is_empty());
        assert!(evaluation.recommendations.is_empty());
        assert_eq!(evaluation.detailed_feedback, "Only feedback here.");
    }

    #[test]
    fn feedback_runs_to_end_of_input_and_keeps_paragraphs() {
        let raw = "DETAILED_FEEDBACK:\nFirst paragraph.\n\nSecond paragraph.";
        assert_eq!(
            parse_evaluation(raw).detailed_feedback,
            "First paragraph.\n\nSecond paragraph."
        );
    }
}
