use std::collections::HashSet;

use async_graphql::{Enum, SimpleObject};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Closed set of literals a content enum accepts on the wire.
pub trait ContentEnum: Sized + Copy + 'static {
    const ALL: &'static [Self];

    fn as_str(&self) -> &'static str;

    /// Matches `raw` against the declared literals, ignoring case, whitespace and punctuation.
    fn from_loose(raw: &str) -> Option<Self> {
        let wanted = normalize_literal(raw);
        if wanted.is_empty() {
            return None;
        }
        Self::ALL
            .iter()
            .copied()
            .find(|variant| normalize_literal(variant.as_str()) == wanted)
    }
}

fn normalize_literal(raw: &str) -> String {
    raw.chars()
        .filter(|c| c.is_alphanumeric())
        .flat_map(char::to_lowercase)
        .collect()
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Deserialize, Serialize, Enum, JsonSchema)]
pub enum Importance {
    Critical,
    #[default]
    Important,
    Useful,
}

impl ContentEnum for Importance {
    const ALL: &'static [Self] = &[Self::Critical, Self::Important, Self::Useful];

    fn as_str(&self) -> &'static str {
        match self {
            Importance::Critical => "Critical",
            Importance::Important => "Important",
            Importance::Useful => "Useful",
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Deserialize, Serialize, Enum, JsonSchema)]
pub enum Memorization {
    Formula,
    #[default]
    Concept,
    Application,
    Definition,
}

impl ContentEnum for Memorization {
    const ALL: &'static [Self] = &[
        Self::Formula,
        Self::Concept,
        Self::Application,
        Self::Definition,
    ];

    fn as_str(&self) -> &'static str {
        match self {
            Memorization::Formula => "Formula",
            Memorization::Concept => "Concept",
            Memorization::Application => "Application",
            Memorization::Definition => "Definition",
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Deserialize, Serialize, Enum, JsonSchema)]
pub enum QuestionType {
    #[serde(rename = "MCQ")]
    Mcq,
    #[default]
    #[serde(rename = "Short Answer")]
    ShortAnswer,
    #[serde(rename = "Long Answer")]
    LongAnswer,
    #[serde(rename = "Problem Solving")]
    ProblemSolving,
    #[serde(rename = "True/False")]
    TrueFalse,
}

impl ContentEnum for QuestionType {
    const ALL: &'static [Self] = &[
        Self::Mcq,
        Self::ShortAnswer,
        Self::LongAnswer,
        Self::ProblemSolving,
        Self::TrueFalse,
    ];

    fn as_str(&self) -> &'static str {
        match self {
            QuestionType::Mcq => "MCQ",
            QuestionType::ShortAnswer => "Short Answer",
            QuestionType::LongAnswer => "Long Answer",
            QuestionType::ProblemSolving => "Problem Solving",
            QuestionType::TrueFalse => "True/False",
        }
    }

    fn from_loose(raw: &str) -> Option<Self> {
        match normalize_literal(raw).as_str() {
            "multiplechoice" | "multiplechoicequestion" => Some(QuestionType::Mcq),
            "truefalse" | "boolean" => Some(QuestionType::TrueFalse),
            wanted if !wanted.is_empty() => Self::ALL
                .iter()
                .copied()
                .find(|variant| normalize_literal(variant.as_str()) == wanted),
            _ => None,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Deserialize, Serialize, Enum, JsonSchema)]
pub enum Difficulty {
    Easy,
    #[default]
    Medium,
    Hard,
}

impl ContentEnum for Difficulty {
    const ALL: &'static [Self] = &[Self::Easy, Self::Medium, Self::Hard];

    fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Easy => "Easy",
            Difficulty::Medium => "Medium",
            Difficulty::Hard => "Hard",
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Deserialize, Serialize, Enum, JsonSchema)]
pub enum MnemonicType {
    Acronym,
    #[default]
    Phrase,
    Visual,
    Story,
}

impl ContentEnum for MnemonicType {
    const ALL: &'static [Self] = &[Self::Acronym, Self::Phrase, Self::Visual, Self::Story];

    fn as_str(&self) -> &'static str {
        match self {
            MnemonicType::Acronym => "Acronym",
            MnemonicType::Phrase => "Phrase",
            MnemonicType::Visual => "Visual",
            MnemonicType::Story => "Story",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize, SimpleObject, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct KeyPoint {
    pub id: String,
    pub title: String,
    pub description: String,
    pub importance: Importance,
    /// Always within 1..=10.
    pub exam_weight: u8,
    pub memorization: Memorization,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize, SimpleObject, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ConceptExplanation {
    pub id: String,
    pub concept: String,
    pub simple_explanation: String,
    pub detailed_explanation: String,
    pub real_world_example: String,
    pub common_mistakes: Vec<String>,
    pub related_concepts: Vec<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize, SimpleObject, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ExamQuestion {
    pub id: String,
    pub question: String,
    #[serde(rename = "type")]
    #[graphql(name = "type")]
    pub question_type: QuestionType,
    pub difficulty: Difficulty,
    /// Answer choices; only populated for MCQ and True/False questions.
    pub options: Vec<String>,
    pub answer: String,
    pub explanation: String,
    pub exam_tips: String,
    pub time_to_solve: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize, SimpleObject, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct PracticeProblem {
    pub id: String,
    pub problem: String,
    pub solution: String,
    pub steps: Vec<String>,
    pub skill_tested: String,
    pub variants: Vec<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize, SimpleObject, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Mnemonic {
    pub id: String,
    pub concept: String,
    pub mnemonic: String,
    pub explanation: String,
    #[serde(rename = "type")]
    #[graphql(name = "type")]
    pub mnemonic_type: MnemonicType,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize, SimpleObject, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct KeyTerm {
    pub term: String,
    pub definition: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize, SimpleObject, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct CommonFormula {
    pub name: String,
    pub formula: String,
    pub when_to_use: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize, SimpleObject, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct QuickReview {
    pub must_know: Vec<String>,
    pub formulas_to_memorize: Vec<String>,
    pub key_terms: Vec<KeyTerm>,
    pub common_formulas: Vec<CommonFormula>,
    pub last_minute_tips: Vec<String>,
}

/// Exam-ready study package for one topic. Produced whole and never patched in place.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize, SimpleObject, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct StructuredContent {
    pub summary: String,
    pub key_points: Vec<KeyPoint>,
    pub concepts: Vec<ConceptExplanation>,
    pub exam_questions: Vec<ExamQuestion>,
    pub practice_problems: Vec<PracticeProblem>,
    pub mnemonics: Vec<Mnemonic>,
    pub quick_review: QuickReview,
    pub study_tips: Vec<String>,
    pub time_to_master: String,
}

impl StructuredContent {
    /// Lists every data-contract violation found. Enum fields are checked by the type system.
    pub fn violations(&self) -> Vec<String> {
        let mut problems = Vec::new();

        if self.summary.trim().is_empty() {
            problems.push("summary is empty".to_string());
        }
        if self.key_points.is_empty() {
            problems.push("keyPoints is empty".to_string());
        }
        if self.concepts.is_empty() {
            problems.push("concepts is empty".to_string());
        }
        if self.mnemonics.is_empty() {
            problems.push("mnemonics is empty".to_string());
        }

        for point in &self.key_points {
            if !(1..=10).contains(&point.exam_weight) {
                problems.push(format!(
                    "keyPoint '{}' has examWeight {} outside 1..=10",
                    point.id, point.exam_weight
                ));
            }
        }

        check_ids("keyPoints", self.key_points.iter().map(|p| p.id.as_str()), &mut problems);
        check_ids("concepts", self.concepts.iter().map(|c| c.id.as_str()), &mut problems);
        check_ids(
            "examQuestions",
            self.exam_questions.iter().map(|q| q.id.as_str()),
            &mut problems,
        );
        check_ids(
            "practiceProblems",
            self.practice_problems.iter().map(|p| p.id.as_str()),
            &mut problems,
        );
        check_ids("mnemonics", self.mnemonics.iter().map(|m| m.id.as_str()), &mut problems);

        problems
    }
}

fn check_ids<'a>(field: &str, ids: impl Iterator<Item = &'a str>, problems: &mut Vec<String>) {
    let mut seen = HashSet::new();
    for id in ids {
        if id.trim().is_empty() {
            problems.push(format!("{field} contains an empty id"));
        } else if !seen.insert(id) {
            problems.push(format!("{field} contains duplicate id '{id}'"));
        }
    }
}
