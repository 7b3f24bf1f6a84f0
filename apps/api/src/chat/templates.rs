//! Template answers for the offline chat backend.
//!
//! The question is classified with `QUESTION_KEYWORDS` (first matching kind wins),
//! then answered from the retrieved chunk text with the same extraction rules the
//! rule-based analyzer uses.

use crate::analysis::rules::{extract_education, extract_job_titles, extract_skills, extract_years_experience};
use crate::search::SearchResult;

pub const NO_RESULTS_ANSWER: &str = "No relevant information found in the resume.";

const EXCERPT_CHARS: usize = 300;
const MAX_SENTENCES: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuestionKind {
    WorkAuthorization,
    Education,
    Experience,
    Skills,
    WorkHistory,
    General,
}

/// Checked in order; `General` is the fallback.
pub const QUESTION_KEYWORDS: &[(QuestionKind, &[&str])] = &[
    (
        QuestionKind::WorkAuthorization,
        &[
            "visa",
            "sponsor",
            "work authorization",
            "authorized to work",
            "work permit",
            "citizen",
            "green card",
        ],
    ),
    (
        QuestionKind::Education,
        &[
            "degree",
            "education",
            "university",
            "college",
            "graduate",
            "bachelor",
            "master",
            "phd",
            "study",
            "studied",
        ],
    ),
    (
        QuestionKind::Experience,
        &[
            "how many years",
            "years of experience",
            "how long",
            "how experienced",
            "seniority",
            "experience",
            "years",
        ],
    ),
    (
        QuestionKind::Skills,
        &[
            "skill",
            "technolog",
            "familiar",
            "proficient",
            "know",
            "stack",
            "language",
            "framework",
            "tools",
        ],
    ),
    (
        QuestionKind::WorkHistory,
        &[
            "work history",
            "worked",
            "company",
            "companies",
            "employer",
            "previous",
            "job",
            "role",
            "position",
            "career",
        ],
    ),
];

/// Sentences containing any of these answer a work authorization question.
const AUTHORIZATION_TERMS: &[&str] = &[
    "visa",
    "sponsor",
    "authorized",
    "authorization",
    "citizen",
    "permit",
    "green card",
    "permanent resident",
];

const EDUCATION_TERMS: &[&str] = &["degree", "university", "college", "bachelor", "master", "phd"];

pub fn classify_question(question: &str) -> QuestionKind {
    let lower = question.to_lowercase();
    QUESTION_KEYWORDS
        .iter()
        .find(|(_, keywords)| keywords.iter().any(|k| lower.contains(k)))
        .map(|(kind, _)| *kind)
        .unwrap_or(QuestionKind::General)
}

/// Builds an answer from the retrieved chunks; `current_year` feeds the date-range fallback.
pub fn template_answer(question: &str, results: &[SearchResult], current_year: i32) -> String {
    if results.is_empty() {
        return NO_RESULTS_ANSWER.to_string();
    }
    let text = results
        .iter()
        .map(|r| r.text.as_str())
        .collect::<Vec<_>>()
        .join("\n");

    match classify_question(question) {
        QuestionKind::WorkAuthorization => answer_work_authorization(&text),
        QuestionKind::Education => answer_education(&text),
        QuestionKind::Experience => answer_experience(&text, current_year),
        QuestionKind::Skills => answer_skills(&text),
        QuestionKind::WorkHistory => answer_work_history(&text),
        QuestionKind::General => answer_general(results),
    }
}

fn answer_work_authorization(text: &str) -> String {
    let sentences = sentences_mentioning(text, AUTHORIZATION_TERMS);
    if sentences.is_empty() {
        "The resume does not mention work authorization or visa status.".to_string()
    } else {
        format!("Regarding work authorization, the resume states: {}.", sentences.join(". "))
    }
}

fn answer_education(text: &str) -> String {
    let degrees = extract_education(text);
    if !degrees.is_empty() {
        return format!("Education: {}.", degrees.join("; "));
    }
    let sentences = sentences_mentioning(text, EDUCATION_TERMS);
    if sentences.is_empty() {
        "No education details were found in the relevant resume sections.".to_string()
    } else {
        format!("Education details from the resume: {}.", sentences.join(". "))
    }
}

fn answer_experience(text: &str, current_year: i32) -> String {
    let years = extract_years_experience(text, current_year);
    let titles = extract_job_titles(text);

    let mut answer = match years {
        0 => "The resume does not state a total number of years of experience.".to_string(),
        1 => "The candidate has 1 year of experience.".to_string(),
        n => format!("The candidate has {n} years of experience."),
    };
    if !titles.is_empty() {
        answer.push_str(&format!(" Roles mentioned: {}.", titles.join(", ")));
    }
    answer
}

fn answer_skills(text: &str) -> String {
    let skills = extract_skills(text);
    if skills.is_empty() {
        format!("Relevant resume excerpt: {}", excerpt(text))
    } else {
        format!("Skills mentioned in the resume: {}.", skills.join(", "))
    }
}

fn answer_work_history(text: &str) -> String {
    let titles = extract_job_titles(text);
    if titles.is_empty() {
        format!("Relevant work history from the resume: {}", excerpt(text))
    } else {
        format!("Roles mentioned in the resume: {}.", titles.join(", "))
    }
}

fn answer_general(results: &[SearchResult]) -> String {
    format!("Based on the resume: {}", excerpt(&results[0].text))
}

fn sentences_mentioning(text: &str, terms: &[&str]) -> Vec<String> {
    text.split(['.', '\n'])
        .map(str::trim)
        .filter(|s| {
            let lower = s.to_lowercase();
            terms.iter().any(|t| lower.contains(t))
        })
        .take(MAX_SENTENCES)
        .map(String::from)
        .collect()
}

fn excerpt(text: &str) -> String {
    let trimmed = text.trim();
    if trimmed.chars().count() <= EXCERPT_CHARS {
        return trimmed.to_string();
    }
    let cut: String = trimmed.chars().take(EXCERPT_CHARS).collect();
    format!("{}...", cut.trim_end())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::documents::chunker::ChunkType;
    use crate::search::EntryMetadata;

    fn results(texts: &[&str]) -> Vec<SearchResult> {
        texts
            .iter()
            .enumerate()
            .map(|(i, text)| SearchResult {
                text: text.to_string(),
                score: 1.0,
                metadata: EntryMetadata {
                    chunk_type: ChunkType::Content,
                    chunk_index: i,
                    source: "resume".to_string(),
                    resume_id: "s1".to_string(),
                },
            })
            .collect()
    }

    #[test]
    fn test_classify_question() {
        let cases = [
            ("Does the candidate need visa sponsorship?", QuestionKind::WorkAuthorization),
            ("What degree do they hold?", QuestionKind::Education),
            ("How many years of experience do they have?", QuestionKind::Experience),
            ("Which frameworks are they proficient in?", QuestionKind::Skills),
            ("Where have they worked before?", QuestionKind::WorkHistory),
            ("Tell me about this person", QuestionKind::General),
        ];
        for (question, expected) in cases {
            assert_eq!(classify_question(question), expected, "{question}");
        }
    }

    #[test]
    fn test_bare_experience_questions_use_experience_template() {
        let cases = [
            "What experience does the candidate have?",
            "Tell me about their work experience",
            "How many years have they been coding?",
        ];
        for question in cases {
            assert_eq!(classify_question(question), QuestionKind::Experience, "{question}");
        }
        // earlier kinds still win when both match
        assert_eq!(
            classify_question("Is their degree relevant to their experience?"),
            QuestionKind::Education
        );
    }

    #[test]
    fn test_classify_question_is_case_insensitive() {
        let cases = [
            ("WHAT EXPERIENCE DO THEY HAVE?", QuestionKind::Experience),
            ("Any VISA requirements?", QuestionKind::WorkAuthorization),
        ];
        for (question, expected) in cases {
            assert_eq!(classify_question(question), expected, "{question}");
        }
    }

    #[test]
    fn test_experience_answer_contains_years() {
        let answer = template_answer(
            "How many years of experience do they have?",
            &results(&["5 years of experience in React, Node.js, AWS."]),
            2024,
        );
        assert!(answer.contains("5 years"), "{answer}");
    }

    #[test]
    fn test_experience_answer_singular() {
        let answer = template_answer("How long have they worked?", &results(&["1 year of experience"]), 2024);
        assert_eq!(answer, "The candidate has 1 year of experience.");
    }

    #[test]
    fn test_education_answer() {
        let answer = template_answer(
            "What is their education?",
            &results(&["Bachelor of Science in Computer Science. Graduated 2015."]),
            2024,
        );
        assert_eq!(answer, "Education: Bachelor of Science in Computer Science.");
    }

    #[test]
    fn test_skills_answer() {
        let answer = template_answer(
            "What skills do they have?",
            &results(&["Built services with Rust and Docker"]),
            2024,
        );
        assert_eq!(answer, "Skills mentioned in the resume: docker, rust.");
    }

    #[test]
    fn test_work_authorization_not_mentioned() {
        let answer = template_answer("Are they a US citizen?", &results(&["Rust engineer"]), 2024);
        assert!(answer.contains("does not mention work authorization"));
    }

    #[test]
    fn test_no_results() {
        assert_eq!(template_answer("Anything?", &[], 2024), NO_RESULTS_ANSWER);
    }

    #[test]
    fn test_general_answer_truncates_long_excerpt() {
        let long = "word ".repeat(200);
        let answer = template_answer("Tell me about them", &results(&[long.as_str()]), 2024);
        assert!(answer.starts_with("Based on the resume: word"));
        assert!(answer.ends_with("..."));
    }
}
