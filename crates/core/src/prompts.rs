//! Prompt construction for the generation service.
//!
//! Both builders are pure: the same config and transcript always produce the
//! same text. The evaluation prompt pins the section markers that
//! [`crate::parser::parse_evaluation`] recognizes, localized per language.

use crate::model::{Language, QuestionAnswer, SessionConfig};

pub fn question_prompt(config: &SessionConfig) -> String {
    let difficulty = config.difficulty.prompt_label(Language::English);
    let language = config.language.label();
    let count = config.question_count;
    let profession = &config.profession;

    format!(
        r#"Generate {count} interview questions for a {profession} position.

Requirements:
- Difficulty level: {difficulty}
- Language: {language}
- Questions should be professional and relevant to the profession
- Each question should be numbered (1., 2., 3., etc.)
- Questions should test both technical skills and soft skills
- Make questions challenging but fair for the specified difficulty level

Please provide only the questions, numbered from 1 to {count}."#
    )
}

pub fn evaluation_prompt(config: &SessionConfig, transcript: &[QuestionAnswer]) -> String {
    let difficulty = config.difficulty.prompt_label(config.language);
    let profession = &config.profession;

    let qa_text = transcript
        .iter()
        .enumerate()
        .map(|(i, qa)| {
            format!(
                "Question {}: {}\nAnswer: {}\n",
                i + 1,
                qa.question,
                qa.answer
            )
        })
        .collect::<Vec<_>>()
        .join("\n");

    match config.language {
        Language::English => format!(
            r#"Evaluate the following interview answers for a {profession} position at {difficulty}.

Interview Details:
- Position: {profession}
- Difficulty: {difficulty}
- Language: English

Questions and Answers:
{qa_text}

Please provide a comprehensive evaluation in the following format:

SCORE: [0-100]

STRENGTHS:
- [Strength 1]
- [Strength 2]
- [Strength 3]

WEAKNESSES:
- [Weakness 1]
- [Weakness 2]
- [Weakness 3]

RECOMMENDATIONS:
- [Recommendation 1]
- [Recommendation 2]
- [Recommendation 3]

DETAILED_FEEDBACK:
[Provide detailed feedback about the candidate's performance, highlighting specific answers and areas for improvement. This should be 2-3 paragraphs.]

Evaluate based on:
- Technical knowledge and accuracy
- Communication skills
- Problem-solving approach
- Relevance of answers
- Depth of understanding
- Professional presentation"#
        ),
        Language::Turkish => format!(
            r#"{profession} pozisyonu için {difficulty} mülakat cevaplarını değerlendir.

Mülakat Detayları:
- Pozisyon: {profession}
- Zorluk: {difficulty}
- Dil: Türkçe

Sorular ve Cevaplar:
{qa_text}

Lütfen değerlendirmeyi aşağıdaki formatta sağlayın:

PUAN: [0-100]

GÜÇLÜ_YÖNLER:
- [Güçlü Yön 1]
- [Güçlü Yön 2]
- [Güçlü Yön 3]

ZAYIF_YÖNLER:
- [Zayıf Yön 1]
- [Zayıf Yön 2]
- [Zayıf Yön 3]

ÖNERİLER:
- [Öneri 1]
- [Öneri 2]
- [Öneri 3]

DETAYLI_GERİBİLDİRİM:
[Adayın performansı hakkında detaylı geri bildirim, özellikle cevapları ve geliştirilmesi gereken alanları vurgulayarak. Bu 2-3 paragraf olmalı.]

Şu kriterlere göre değerlendir:
- Teknik bilgi ve doğruluk
- İletişim becerileri
- Problem çözme yaklaşımı
- Cevapların konuyla ilgisi
- Konuya hakimiyet
- Profesyonel sunum"#
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Difficulty;

    fn config(language: Language) -> SessionConfig {
        SessionConfig::new("Backend Engineer", Difficulty::Intermediate, language, 4).unwrap()
    }

    #[test]
    fn question_prompt_embeds_count_difficulty_language_and_numbering() {
        let prompt = question_prompt(&config(Language::English));
        assert!(prompt.contains("Generate 4 interview questions"));
        assert!(prompt.contains("Backend Engineer"));
        assert!(prompt.contains("intermediate level"));
        assert!(prompt.contains("Language: English"));
        assert!(prompt.contains("numbered from 1 to 4"));
    }

    #[test]
    fn question_prompt_is_deterministic() {
        let config = config(Language::Turkish);
        assert_eq!(question_prompt(&config), question_prompt(&config));
    }

    #[test]
    fn evaluation_prompt_carries_english_markers() {
        let transcript = vec![QuestionAnswer::new("Q1", "A1")];
        let prompt = evaluation_prompt(&config(Language::English), &transcript);
        for marker in [
            "SCORE:",
            "STRENGTHS:",
            "WEAKNESSES:",
            "RECOMMENDATIONS:",
            "DETAILED_FEEDBACK:",
        ] {
            assert!(prompt.contains(marker), "missing marker {marker}");
        }
        assert!(prompt.contains("Question 1: Q1"));
        assert!(prompt.contains("Answer: A1"));
    }

    #[test]
    fn evaluation_prompt_carries_turkish_markers() {
        let transcript = vec![QuestionAnswer::new("S1", "C1")];
        let prompt = evaluation_prompt(&config(Language::Turkish), &transcript);
        for marker in [
            "PUAN:",
            "GÜÇLÜ_YÖNLER:",
            "ZAYIF_YÖNLER:",
            "ÖNERİLER:",
            "DETAYLI_GERİBİLDİRİM:",
        ] {
            assert!(prompt.contains(marker), "missing marker {marker}");
        }
        assert!(prompt.contains("orta seviye"));
    }

    #[test]
    fn evaluation_prompt_numbers_every_transcript_entry() {
        let transcript = vec![
            QuestionAnswer::new("first", "a"),
            QuestionAnswer::new("second", "b"),
            QuestionAnswer::new("third", "c"),
        ];
        let prompt = evaluation_prompt(&config(Language::English), &transcript);
        assert!(prompt.contains("Question 1: first"));
        assert!(prompt.contains("Question 2: second"));
        assert!(prompt.contains("Question 3: third"));
    }
}
