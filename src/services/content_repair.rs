//! Turns untrusted model JSON into a [`StructuredContent`] that satisfies every data-contract rule.
//!
//! Each field has its own decoder. Values that already satisfy their type and enum
//! constraints are kept as they are; anything else is coerced or replaced by a default
//! derived from the topic. Nothing in this module can fail.

use std::collections::HashSet;

use serde_json::{Map, Value};

use crate::{
    models::domain::study_content::{
        CommonFormula, ConceptExplanation, ContentEnum, ExamQuestion, KeyPoint, KeyTerm, Mnemonic,
        PracticeProblem, QuickReview, StructuredContent,
    },
    services::fallback_content::{FallbackSynthesizer, TopicSeed},
};

pub const DEFAULT_EXAM_WEIGHT: u8 = 5;

pub struct ContentRepairer {
    synthesizer: FallbackSynthesizer,
}

impl ContentRepairer {
    pub fn new(synthesizer: FallbackSynthesizer) -> Self {
        Self { synthesizer }
    }

    pub fn repair(&self, raw: &Value, seed: &TopicSeed) -> StructuredContent {
        let empty = Map::new();
        let root = raw.as_object().unwrap_or(&empty);
        let minimums = self.synthesizer.minimums();

        let summary = repair_string(root.get("summary"))
            .unwrap_or_else(|| self.synthesizer.summary(seed));

        let mut key_points = repair_key_points(root.get("keyPoints"), seed);
        if key_points.is_empty() {
            key_points = self.synthesizer.key_points(seed, minimums.key_points.max(1));
        }

        let mut concepts = repair_concepts(root.get("concepts"), seed);
        if concepts.is_empty() {
            concepts = self.synthesizer.concepts(seed, minimums.concepts.max(1));
        }

        let mut mnemonics = repair_mnemonics(root.get("mnemonics"), seed);
        if mnemonics.is_empty() {
            mnemonics = self.synthesizer.mnemonics(seed, minimums.mnemonics.max(1));
        }

        let quick_review = repair_quick_review(root.get("quickReview"))
            .unwrap_or_else(|| self.synthesizer.quick_review(seed));

        StructuredContent {
            summary,
            key_points,
            concepts,
            exam_questions: repair_exam_questions(root.get("examQuestions")),
            practice_problems: repair_practice_problems(root.get("practiceProblems")),
            mnemonics,
            quick_review,
            study_tips: repair_string_list(root.get("studyTips")),
            time_to_master: repair_string(root.get("timeToMaster"))
                .unwrap_or_else(|| self.synthesizer.time_to_master(seed)),
        }
    }
}

/// Non-blank strings are kept verbatim; numbers and booleans are rendered as text.
pub fn repair_string(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Anything but an array becomes empty; unusable elements are dropped.
pub fn repair_string_list(value: Option<&Value>) -> Vec<String> {
    match value {
        Some(Value::Array(items)) => items.iter().filter_map(|v| repair_string(Some(v))).collect(),
        _ => Vec::new(),
    }
}

pub fn repair_enum<E: ContentEnum + Default>(value: Option<&Value>) -> E {
    value
        .and_then(Value::as_str)
        .and_then(E::from_loose)
        .unwrap_or_default()
}

/// Integer in 1..=10. Fractions are rounded, numeric strings parsed, out-of-range values clamped.
pub fn repair_exam_weight(value: Option<&Value>) -> u8 {
    let number = match value {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    match number {
        Some(n) if n.is_finite() => n.round().clamp(1.0, 10.0) as u8,
        _ => DEFAULT_EXAM_WEIGHT,
    }
}

fn objects(value: Option<&Value>) -> Vec<&Map<String, Value>> {
    match value {
        Some(Value::Array(items)) => items.iter().filter_map(Value::as_object).collect(),
        _ => Vec::new(),
    }
}

/// Keeps each first-seen id; missing or duplicate ids become `<prefix><n>` with the
/// smallest `n >= position + 1` that no other element uses.
pub fn assign_ids(prefix: &str, proposed: &[Option<String>]) -> Vec<String> {
    let mut used: HashSet<String> = HashSet::new();
    let mut keep = vec![false; proposed.len()];
    for (i, id) in proposed.iter().enumerate() {
        if let Some(id) = id {
            if used.insert(id.clone()) {
                keep[i] = true;
            }
        }
    }

    proposed
        .iter()
        .enumerate()
        .map(|(i, id)| match id {
            Some(id) if keep[i] => id.clone(),
            _ => {
                let mut n = i + 1;
                loop {
                    let candidate = format!("{prefix}{n}");
                    if used.insert(candidate.clone()) {
                        break candidate;
                    }
                    n += 1;
                }
            }
        })
        .collect()
}

fn with_ids<T>(prefix: &str, items: Vec<(Option<String>, T)>, set_id: impl Fn(&mut T, String)) -> Vec<T> {
    let proposed: Vec<Option<String>> = items.iter().map(|(id, _)| id.clone()).collect();
    let ids = assign_ids(prefix, &proposed);
    items
        .into_iter()
        .zip(ids)
        .map(|((_, mut item), id)| {
            set_id(&mut item, id);
            item
        })
        .collect()
}

pub fn repair_key_points(value: Option<&Value>, seed: &TopicSeed) -> Vec<KeyPoint> {
    let items = objects(value)
        .into_iter()
        .filter_map(|obj| {
            let title = repair_string(obj.get("title"));
            let description = repair_string(obj.get("description"));
            if title.is_none() && description.is_none() {
                return None;
            }
            let point = KeyPoint {
                id: String::new(),
                title: title.clone().unwrap_or_else(|| format!("Key point on {}", seed.topic)),
                description: description.or(title).unwrap_or_default(),
                importance: repair_enum(obj.get("importance")),
                exam_weight: repair_exam_weight(obj.get("examWeight")),
                memorization: repair_enum(obj.get("memorization")),
            };
            Some((repair_string(obj.get("id")), point))
        })
        .collect();
    with_ids("kp", items, |p, id| p.id = id)
}

pub fn repair_concepts(value: Option<&Value>, seed: &TopicSeed) -> Vec<ConceptExplanation> {
    let items = objects(value)
        .into_iter()
        .filter_map(|obj| {
            let concept = repair_string(obj.get("concept"));
            let simple = repair_string(obj.get("simpleExplanation"));
            let detailed = repair_string(obj.get("detailedExplanation"));
            if concept.is_none() && simple.is_none() && detailed.is_none() {
                return None;
            }
            let simple_explanation = simple
                .clone()
                .or_else(|| detailed.clone())
                .unwrap_or_else(|| format!("A core idea within {}.", seed.topic));
            let explanation = ConceptExplanation {
                id: String::new(),
                concept: concept.unwrap_or_else(|| seed.topic.clone()),
                detailed_explanation: detailed.unwrap_or_else(|| simple_explanation.clone()),
                simple_explanation,
                real_world_example: repair_string(obj.get("realWorldExample")).unwrap_or_else(|| {
                    format!("Look for {} in worked examples and past-paper questions.", seed.topic)
                }),
                common_mistakes: repair_string_list(obj.get("commonMistakes")),
                related_concepts: repair_string_list(obj.get("relatedConcepts")),
            };
            Some((repair_string(obj.get("id")), explanation))
        })
        .collect();
    with_ids("concept", items, |c, id| c.id = id)
}

pub fn repair_exam_questions(value: Option<&Value>) -> Vec<ExamQuestion> {
    let items = objects(value)
        .into_iter()
        .filter_map(|obj| {
            let question = repair_string(obj.get("question"))?;
            let exam_question = ExamQuestion {
                id: String::new(),
                question,
                question_type: repair_enum(obj.get("type")),
                difficulty: repair_enum(obj.get("difficulty")),
                options: repair_string_list(obj.get("options")),
                answer: repair_string(obj.get("answer")).unwrap_or_default(),
                explanation: repair_string(obj.get("explanation")).unwrap_or_default(),
                exam_tips: repair_string(obj.get("examTips")).unwrap_or_default(),
                time_to_solve: repair_string(obj.get("timeToSolve"))
                    .unwrap_or_else(|| "5 minutes".to_string()),
            };
            Some((repair_string(obj.get("id")), exam_question))
        })
        .collect();
    with_ids("eq", items, |q, id| q.id = id)
}

pub fn repair_practice_problems(value: Option<&Value>) -> Vec<PracticeProblem> {
    let items = objects(value)
        .into_iter()
        .filter_map(|obj| {
            let problem = repair_string(obj.get("problem"))?;
            let practice = PracticeProblem {
                id: String::new(),
                problem,
                solution: repair_string(obj.get("solution")).unwrap_or_default(),
                steps: repair_string_list(obj.get("steps")),
                skill_tested: repair_string(obj.get("skillTested")).unwrap_or_default(),
                variants: repair_string_list(obj.get("variants")),
            };
            Some((repair_string(obj.get("id")), practice))
        })
        .collect();
    with_ids("pp", items, |p, id| p.id = id)
}

pub fn repair_mnemonics(value: Option<&Value>, seed: &TopicSeed) -> Vec<Mnemonic> {
    let items = objects(value)
        .into_iter()
        .filter_map(|obj| {
            let mnemonic = repair_string(obj.get("mnemonic"))?;
            let entry = Mnemonic {
                id: String::new(),
                concept: repair_string(obj.get("concept")).unwrap_or_else(|| seed.topic.clone()),
                explanation: repair_string(obj.get("explanation")).unwrap_or_default(),
                mnemonic,
                mnemonic_type: repair_enum(obj.get("type")),
            };
            Some((repair_string(obj.get("id")), entry))
        })
        .collect();
    with_ids("mn", items, |m, id| m.id = id)
}

/// `None` when the value is not an object at all, so the caller can synthesize one.
pub fn repair_quick_review(value: Option<&Value>) -> Option<QuickReview> {
    let obj = value?.as_object()?;

    let key_terms = objects(obj.get("keyTerms"))
        .into_iter()
        .filter_map(|term| {
            Some(KeyTerm {
                term: repair_string(term.get("term"))?,
                definition: repair_string(term.get("definition"))?,
            })
        })
        .collect();

    let common_formulas = objects(obj.get("commonFormulas"))
        .into_iter()
        .enumerate()
        .filter_map(|(i, formula)| {
            Some(CommonFormula {
                formula: repair_string(formula.get("formula"))?,
                name: repair_string(formula.get("name"))
                    .unwrap_or_else(|| format!("Formula {}", i + 1)),
                when_to_use: repair_string(formula.get("whenToUse")).unwrap_or_default(),
            })
        })
        .collect();

    Some(QuickReview {
        must_know: repair_string_list(obj.get("mustKnow")),
        formulas_to_memorize: repair_string_list(obj.get("formulasToMemorize")),
        key_terms,
        common_formulas,
        last_minute_tips: repair_string_list(obj.get("lastMinuteTips")),
    })
}
