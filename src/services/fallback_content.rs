use crate::{
    config::ContentMinimums,
    errors::FailureKind,
    models::domain::study_content::{
        CommonFormula, ConceptExplanation, Difficulty, ExamQuestion, Importance, KeyPoint, KeyTerm,
        Memorization, Mnemonic, MnemonicType, PracticeProblem, QuestionType, QuickReview,
        StructuredContent,
    },
};

const PLACEHOLDER_TOPIC: &str = "this topic";
const MAX_DESCRIPTION_CHARS: usize = 240;

const STOP_WORDS: &[&str] = &[
    "a", "an", "and", "the", "of", "in", "on", "to", "for", "with", "by", "at", "or", "its", "is",
];

/// Broad family of subjects, used to pick phrasing and examples.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SubjectArea {
    Mathematics,
    Science,
    Computing,
    Humanities,
    Language,
    General,
}

const AREA_KEYWORDS: &[(SubjectArea, &[&str])] = &[
    (
        SubjectArea::Mathematics,
        &[
            "math", "algebra", "calculus", "geometry", "statistic", "probability", "trigonometry",
            "equation", "theorem", "integral", "derivative", "matrix", "matrices", "vector",
            "arithmetic", "fraction",
        ],
    ),
    (
        SubjectArea::Computing,
        &[
            "computer", "computing", "programming", "software", "algorithm", "data structure",
            "code", "database", "network", "sorting", "recursion", "compiler", "operating system",
            "machine learning",
        ],
    ),
    (
        SubjectArea::Science,
        &[
            "physics", "chemistry", "biology", "science", "cell", "energy", "force", "reaction",
            "atom", "molecule", "evolution", "genetic", "photosynthesis", "enzyme", "electric",
            "thermodynamic", "ecology",
        ],
    ),
    (
        SubjectArea::Humanities,
        &[
            "history", "economic", "philosophy", "politic", "geography", "sociology",
            "psychology", "legal", "war", "revolution", "empire", "government",
        ],
    ),
    (
        SubjectArea::Language,
        &[
            "language", "grammar", "literature", "english", "writing", "poetry", "vocabulary",
            "novel", "essay", "tense",
        ],
    ),
];

/// Single words match as word prefixes ("statistic" matches "statistics"); phrases match anywhere.
fn matches_keyword(haystack: &str, keyword: &str) -> bool {
    if keyword.contains(' ') {
        return haystack.contains(keyword);
    }
    haystack
        .split(|c: char| !c.is_alphanumeric())
        .any(|word| word.starts_with(keyword))
}

impl SubjectArea {
    pub fn detect(topic: &str, subject: Option<&str>) -> Self {
        let haystacks = [subject.unwrap_or_default().to_lowercase(), topic.to_lowercase()];
        // Subject wins over topic when both match something.
        for haystack in haystacks.iter().filter(|h| !h.is_empty()) {
            for (area, keywords) in AREA_KEYWORDS {
                if keywords.iter().any(|keyword| matches_keyword(haystack, keyword)) {
                    return *area;
                }
            }
        }
        SubjectArea::General
    }

    fn is_quantitative(&self) -> bool {
        matches!(
            self,
            SubjectArea::Mathematics | SubjectArea::Science | SubjectArea::Computing
        )
    }

    fn example_setting(&self) -> &'static str {
        match self {
            SubjectArea::Mathematics => "an engineer sizing a bridge support or a bank computing interest",
            SubjectArea::Science => "a laboratory experiment or an everyday process such as cooking or charging a phone",
            SubjectArea::Computing => "a production system that must stay fast and correct as its data grows",
            SubjectArea::Humanities => "a news story, a policy debate or a historical turning point",
            SubjectArea::Language => "a persuasive article, a speech or a piece of creative writing",
            SubjectArea::General => "a familiar everyday situation",
        }
    }

    fn method_word(&self) -> &'static str {
        match self {
            SubjectArea::Mathematics => "working",
            SubjectArea::Science => "reasoning",
            SubjectArea::Computing => "algorithm",
            SubjectArea::Humanities => "argument",
            SubjectArea::Language => "analysis",
            SubjectArea::General => "method",
        }
    }

    fn hours_to_master(&self) -> &'static str {
        match self {
            SubjectArea::Mathematics | SubjectArea::Computing => "4-5 hours",
            SubjectArea::Science => "3-4 hours",
            _ => "2-3 hours",
        }
    }
}

/// Everything the templates need to know about a topic.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TopicSeed {
    pub topic: String,
    pub description: Option<String>,
    pub subject: Option<String>,
    pub area: SubjectArea,
}

impl TopicSeed {
    pub fn new(topic: &str, description: Option<&str>, subject: Option<&str>) -> Self {
        let topic = topic.trim();
        let topic = if topic.is_empty() {
            PLACEHOLDER_TOPIC.to_string()
        } else {
            topic.to_string()
        };
        let description = description
            .map(first_sentence)
            .filter(|d| !d.is_empty());
        let subject = subject
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string);
        let area = SubjectArea::detect(&topic, subject.as_deref());

        Self {
            topic,
            description,
            subject,
            area,
        }
    }

    fn significant_words(&self) -> Vec<&str> {
        self.topic
            .split(|c: char| !c.is_alphanumeric())
            .filter(|w| !w.is_empty())
            .filter(|w| !STOP_WORDS.contains(&w.to_lowercase().as_str()))
            .collect()
    }

    /// Initials of the topic's significant words, when there are at least two of them.
    pub fn acronym(&self) -> Option<String> {
        let words = self.significant_words();
        if words.len() < 2 {
            return None;
        }
        Some(
            words
                .iter()
                .filter_map(|w| w.chars().next())
                .flat_map(char::to_uppercase)
                .collect(),
        )
    }

    fn in_subject(&self) -> String {
        match &self.subject {
            Some(subject) => format!(" in {subject}"),
            None => String::new(),
        }
    }
}

fn first_sentence(text: &str) -> String {
    let text = text.trim();
    let end = text
        .char_indices()
        .find(|(_, c)| matches!(c, '.' | '!' | '?' | '\n'))
        .map(|(idx, c)| idx + c.len_utf8())
        .unwrap_or(text.len());
    let sentence = text[..end].trim();
    match sentence.char_indices().nth(MAX_DESCRIPTION_CHARS) {
        Some((idx, _)) => format!("{}...", sentence[..idx].trim_end()),
        None => sentence.to_string(),
    }
}

/// User-visible note explaining why template content is being shown.
pub fn provenance_note(reason: FailureKind) -> &'static str {
    match reason {
        FailureKind::QuotaExceeded => "AI generation is temporarily unavailable because the usage quota was exceeded. These notes come from a built-in template; try again later for notes tailored to this topic.",
        FailureKind::Transport
        | FailureKind::ExtractionFailure
        | FailureKind::ParseFailure => "AI generation is temporarily unavailable. These notes come from a built-in template; regenerate later for notes tailored to this topic.",
    }
}

/// Deterministic, model-free producer of complete study content.
#[derive(Clone, Debug, Default)]
pub struct FallbackSynthesizer {
    minimums: ContentMinimums,
}

impl FallbackSynthesizer {
    pub fn new(minimums: ContentMinimums) -> Self {
        Self {
            minimums: minimums.at_least_one(),
        }
    }

    pub fn minimums(&self) -> ContentMinimums {
        self.minimums
    }

    pub fn synthesize(&self, seed: &TopicSeed, reason: Option<FailureKind>) -> StructuredContent {
        let mut study_tips = self.study_tips(seed);
        if let Some(reason) = reason {
            study_tips.insert(0, provenance_note(reason).to_string());
        }

        StructuredContent {
            summary: self.summary(seed),
            key_points: self.key_points(seed, self.minimums.key_points),
            concepts: self.concepts(seed, self.minimums.concepts),
            exam_questions: self.exam_questions(seed),
            practice_problems: self.practice_problems(seed),
            mnemonics: self.mnemonics(seed, self.minimums.mnemonics),
            quick_review: self.quick_review(seed),
            study_tips,
            time_to_master: self.time_to_master(seed),
        }
    }

    pub fn summary(&self, seed: &TopicSeed) -> String {
        let t = &seed.topic;
        let mut summary = format!("{t} is a core topic{}.", seed.in_subject());
        if let Some(description) = &seed.description {
            summary.push(' ');
            summary.push_str(description);
            if !description.ends_with(['.', '!', '?']) {
                summary.push('.');
            }
        }
        summary.push_str(&format!(
            " These notes cover what {t} is, the principles behind it, how it is applied and the misconceptions examiners look for, followed by practice questions and memory aids to lock it in."
        ));
        summary
    }

    pub fn time_to_master(&self, seed: &TopicSeed) -> String {
        seed.area.hours_to_master().to_string()
    }

    pub fn key_points(&self, seed: &TopicSeed, count: usize) -> Vec<KeyPoint> {
        let t = &seed.topic;
        let context = match &seed.description {
            Some(description) => format!(" In this course: {description}"),
            None => String::new(),
        };
        let third = match seed.area {
            SubjectArea::Mathematics | SubjectArea::Science => (
                format!("Key formulas and relationships in {t}"),
                format!("Learn the defining relationships of {t}, what each symbol means and the units or conditions under which they hold."),
                Memorization::Formula,
            ),
            SubjectArea::Computing => (
                format!("How {t} works step by step"),
                format!("Be able to trace {t} by hand on a small input and state its time and space cost."),
                Memorization::Application,
            ),
            SubjectArea::Humanities => (
                format!("Causes, context and consequences of {t}"),
                format!("Explain why {t} arose, the conditions around it and what changed because of it."),
                Memorization::Concept,
            ),
            SubjectArea::Language => (
                format!("Structure and conventions of {t}"),
                format!("Know the rules and patterns that define {t} and recognise them in unseen text."),
                Memorization::Definition,
            ),
            SubjectArea::General => (
                format!("Key components of {t}"),
                format!("Break {t} into its main parts and describe the role each part plays."),
                Memorization::Concept,
            ),
        };

        let templates = [
            (
                format!("Definition of {t}"),
                format!("State a precise definition of {t} and the problem it addresses.{context}"),
                Importance::Critical,
                9,
                Memorization::Definition,
            ),
            (
                format!("Core principles of {t}"),
                format!("Identify the rules that govern {t} and be ready to justify why each one holds."),
                Importance::Critical,
                9,
                Memorization::Concept,
            ),
            (third.0, third.1, Importance::Important, 8, third.2),
            (
                format!("Applying {t}"),
                format!("Practise using {t} on unseen questions; marks are awarded for clear {} as well as for the final answer.", seed.area.method_word()),
                Importance::Important,
                8,
                Memorization::Application,
            ),
            (
                format!("Common misconceptions about {t}"),
                format!("Know the typical errors students make with {t} and how to avoid them under exam pressure."),
                Importance::Important,
                7,
                Memorization::Concept,
            ),
            (
                format!("How {t} connects to related topics"),
                format!("Link {t} to neighbouring ideas{}; synoptic questions often reward these connections.", seed.in_subject()),
                Importance::Useful,
                5,
                Memorization::Concept,
            ),
        ];

        (0..count)
            .map(|i| {
                let (title, description, importance, exam_weight, memorization) =
                    match templates.get(i) {
                        Some(template) => template.clone(),
                        None => (
                            format!("Further aspect {} of {t}", i + 1),
                            format!("Review an additional detail of {t} and note where it appears in past papers."),
                            Importance::Useful,
                            4,
                            Memorization::Concept,
                        ),
                    };
                KeyPoint {
                    id: format!("kp{}", i + 1),
                    title,
                    description,
                    importance,
                    exam_weight,
                    memorization,
                }
            })
            .collect()
    }

    pub fn concepts(&self, seed: &TopicSeed, count: usize) -> Vec<ConceptExplanation> {
        let t = &seed.topic;
        let setting = seed.area.example_setting();
        let related_base: Vec<String> = seed.subject.iter().cloned().collect();

        let templates = [
            (
                format!("Foundations of {t}"),
                format!("{t} is about understanding what it is, why it matters and where its rules come from."),
                format!("Start from the formal definition of {t}, name each of its components and explain how they fit together. An exam answer should define terms before using them and state any assumptions explicitly."),
                format!("You meet {t} in {setting}: recognising its structure there is the first step to reasoning about it."),
                vec![
                    format!("Memorising a definition of {t} without being able to explain it in your own words"),
                    "Using key terms before defining them".to_string(),
                ],
            ),
            (
                format!("{t} in practice"),
                format!("Using {t} means following a repeatable {} from the question to the answer.", seed.area.method_word()),
                format!("When applying {t}, identify what is given, select the relevant principle, carry out each step explicitly and check the result against the original question. Showing each step earns method marks even when the final answer is wrong."),
                format!("In {setting}, {t} is applied to reach a decision or a result that can be checked."),
                vec![
                    "Skipping intermediate steps and losing method marks".to_string(),
                    "Not checking the answer against the question".to_string(),
                ],
            ),
            (
                format!("Limits and edge cases of {t}"),
                format!("Every idea has boundaries; know when {t} does not apply."),
                format!("Examiners test understanding of {t} by choosing situations near its limits. Learn the conditions that must hold, the special cases that behave differently and how to explain why."),
                format!("Edge cases of {t} appear in {setting} whenever the usual assumptions stop holding."),
                vec![
                    format!("Applying {t} outside the conditions where it holds"),
                    "Ignoring special or boundary cases".to_string(),
                ],
            ),
            (
                format!("{t} compared with related ideas"),
                format!("Understanding how {t} differs from similar ideas prevents confusion."),
                format!("Compare {t} with the ideas it is most often confused with: state what they share, where they differ and which one a given question calls for."),
                format!("Choosing between {t} and an alternative is a common decision in {setting}."),
                vec![
                    format!("Confusing {t} with a similar-sounding idea"),
                    "Listing differences without explaining their consequences".to_string(),
                ],
            ),
        ];

        let names: Vec<String> = (0..count)
            .map(|i| match templates.get(i) {
                Some(template) => template.0.clone(),
                None => format!("Advanced view {} of {t}", i + 1),
            })
            .collect();

        (0..count)
            .map(|i| {
                let (concept, simple, detailed, example, mistakes) = match templates.get(i) {
                    Some(template) => template.clone(),
                    None => (
                        names[i].clone(),
                        format!("A deeper look at one aspect of {t}."),
                        format!("Revisit {t} from a different angle and connect it to the earlier concepts; this consolidates understanding for long-answer questions."),
                        format!("Advanced uses of {t} show up in {setting}."),
                        vec!["Treating advanced material as separate from the basics".to_string()],
                    ),
                };
                let mut related_concepts = related_base.clone();
                related_concepts.extend(
                    names
                        .iter()
                        .enumerate()
                        .filter(|(j, _)| *j != i)
                        .map(|(_, name)| name.clone())
                        .take(2),
                );
                ConceptExplanation {
                    id: format!("concept{}", i + 1),
                    concept,
                    simple_explanation: simple,
                    detailed_explanation: detailed,
                    real_world_example: example,
                    common_mistakes: mistakes,
                    related_concepts,
                }
            })
            .collect()
    }

    pub fn exam_questions(&self, seed: &TopicSeed) -> Vec<ExamQuestion> {
        let t = &seed.topic;
        let method = seed.area.method_word();
        vec![
            ExamQuestion {
                id: "eq1".to_string(),
                question: format!("Which statement best describes {t}?"),
                question_type: QuestionType::Mcq,
                difficulty: Difficulty::Easy,
                options: vec![
                    "A precisely defined idea with rules that determine when and how it applies".to_string(),
                    "An informal rule of thumb with no fixed definition".to_string(),
                    "A historical curiosity with no modern use".to_string(),
                    "A term that means the same as any related idea".to_string(),
                ],
                answer: "A precisely defined idea with rules that determine when and how it applies".to_string(),
                explanation: format!("{t} has a precise definition and conditions of use; the other options describe common misconceptions."),
                exam_tips: "Eliminate options that are absolute or vague before choosing.".to_string(),
                time_to_solve: "1 minute".to_string(),
            },
            ExamQuestion {
                id: "eq2".to_string(),
                question: format!("True or false: {t} applies in every situation without conditions."),
                question_type: QuestionType::TrueFalse,
                difficulty: Difficulty::Easy,
                options: vec!["True".to_string(), "False".to_string()],
                answer: "False".to_string(),
                explanation: format!("Like most ideas, {t} holds only when its conditions are met; knowing those limits is frequently tested."),
                exam_tips: "Words such as 'every', 'always' and 'never' usually signal a false statement.".to_string(),
                time_to_solve: "1 minute".to_string(),
            },
            ExamQuestion {
                id: "eq3".to_string(),
                question: format!("Define {t} and give one example of where it is used."),
                question_type: QuestionType::ShortAnswer,
                difficulty: Difficulty::Medium,
                options: vec![],
                answer: format!("A precise definition of {t} in your own words, followed by a concrete example such as {}.", seed.area.example_setting()),
                explanation: "Full marks need both an accurate definition and a relevant, specific example.".to_string(),
                exam_tips: "Define first, then illustrate. Keep it to two or three sentences.".to_string(),
                time_to_solve: "3 minutes".to_string(),
            },
            ExamQuestion {
                id: "eq4".to_string(),
                question: format!("Explain the core principles of {t} and evaluate their limitations."),
                question_type: QuestionType::LongAnswer,
                difficulty: Difficulty::Hard,
                options: vec![],
                answer: format!("Introduce {t}, explain each principle with an example, discuss where the principles break down and conclude with a judgement on their overall usefulness."),
                explanation: "Long answers are marked on structure, accuracy and evaluation rather than length.".to_string(),
                exam_tips: "Plan for two minutes before writing: introduction, principles, limitations, conclusion.".to_string(),
                time_to_solve: "12 minutes".to_string(),
            },
            ExamQuestion {
                id: "eq5".to_string(),
                question: format!("Apply {t} to an unseen scenario and show every step of your {method}."),
                question_type: QuestionType::ProblemSolving,
                difficulty: Difficulty::Hard,
                options: vec![],
                answer: format!("Identify what is given, select the relevant principle of {t}, carry out each step and check the result against the scenario."),
                explanation: "Method marks are awarded for each correct step, so a clear structure protects your score.".to_string(),
                exam_tips: "Write down the principle you are using before you apply it.".to_string(),
                time_to_solve: "8 minutes".to_string(),
            },
        ]
    }

    pub fn practice_problems(&self, seed: &TopicSeed) -> Vec<PracticeProblem> {
        let t = &seed.topic;
        let method = seed.area.method_word();
        vec![
            PracticeProblem {
                id: "pp1".to_string(),
                problem: format!("Without notes, write a one-paragraph explanation of {t} for a classmate who has never met it."),
                solution: format!("A clear definition of {t}, the main principle behind it, one concrete example and one common mistake to avoid."),
                steps: vec![
                    format!("Write the definition of {t} from memory"),
                    "Add the single most important principle".to_string(),
                    "Illustrate with one concrete example".to_string(),
                    "Compare against your notes and correct any gaps".to_string(),
                ],
                skill_tested: "Recall and explanation".to_string(),
                variants: vec![
                    format!("Explain {t} in exactly three sentences"),
                    format!("Explain {t} using a diagram only"),
                ],
            },
            PracticeProblem {
                id: "pp2".to_string(),
                problem: format!("Choose a scenario from {} and apply {t} to it step by step.", seed.area.example_setting()),
                solution: format!("A worked {method} that states what is given, names the principle of {t} being used, applies it in order and checks the result."),
                steps: vec![
                    "List what is given and what is asked".to_string(),
                    format!("Select the relevant principle of {t}"),
                    "Apply it one step at a time, writing each step down".to_string(),
                    "Check the result makes sense in the original scenario".to_string(),
                ],
                skill_tested: "Application to unseen problems".to_string(),
                variants: vec![
                    "Change one condition of the scenario and redo the problem".to_string(),
                    format!("Find a scenario where {t} does not apply and explain why"),
                ],
            },
        ]
    }

    pub fn mnemonics(&self, seed: &TopicSeed, count: usize) -> Vec<Mnemonic> {
        let t = &seed.topic;
        let acronym = match seed.acronym() {
            Some(acronym) => (
                acronym.clone(),
                format!("{acronym} spells the initials of \"{t}\"; say each word as you write its letter to recall the full name and its parts."),
                MnemonicType::Acronym,
            ),
            None => (
                "DEAR: Define, Explain, Apply, Review".to_string(),
                format!("Work through {t} in the order Define, Explain, Apply, Review when answering any question about it."),
                MnemonicType::Acronym,
            ),
        };

        let templates = [
            acronym,
            (
                "What, Why, How, When".to_string(),
                format!("For {t}, ask what it is, why it matters, how it works and when it is used; four questions cover most exam prompts."),
                MnemonicType::Phrase,
            ),
            (
                format!("Picture {t} as a map"),
                format!("Imagine {t} at the centre of a page with its principles as roads leading out and examples as towns along them; recall the picture to rebuild your notes."),
                MnemonicType::Visual,
            ),
            (
                format!("The story of {t}"),
                format!("Tell a short story in which a student meets a problem, discovers {t}, applies it and avoids a classic mistake; the plot mirrors the order of an exam answer."),
                MnemonicType::Story,
            ),
        ];

        (0..count)
            .map(|i| {
                let (mnemonic, explanation, mnemonic_type) = match templates.get(i) {
                    Some(template) => template.clone(),
                    None => (
                        format!("Recall chain {} for {t}", i + 1),
                        format!("Link each key point of {t} to the next with a single keyword and rehearse the chain aloud."),
                        MnemonicType::Phrase,
                    ),
                };
                Mnemonic {
                    id: format!("mn{}", i + 1),
                    concept: t.clone(),
                    mnemonic,
                    explanation,
                    mnemonic_type,
                }
            })
            .collect()
    }

    pub fn quick_review(&self, seed: &TopicSeed) -> QuickReview {
        let t = &seed.topic;

        let mut formulas_to_memorize = Vec::new();
        let mut common_formulas = vec![CommonFormula {
            name: "Exam answer structure".to_string(),
            formula: "Definition -> Explanation -> Example -> Evaluation".to_string(),
            when_to_use: format!("Any long-answer question on {t}"),
        }];
        if seed.area.is_quantitative() {
            formulas_to_memorize.push(format!(
                "The defining relationship of {t}, with the meaning of every symbol"
            ));
            formulas_to_memorize.push(format!("The conditions under which the {t} relationship holds"));
            common_formulas.insert(
                0,
                CommonFormula {
                    name: format!("Core relationship of {t}"),
                    formula: "Given -> Principle -> Substitution -> Result -> Check".to_string(),
                    when_to_use: format!("Calculation or problem-solving questions on {t}"),
                },
            );
        }

        let definition = match &seed.description {
            Some(description) => description.clone(),
            None => format!("The central idea of this unit{}; define it precisely in your own words.", seed.in_subject()),
        };

        QuickReview {
            must_know: vec![
                format!("The precise definition of {t}"),
                format!("The core principles of {t} and why they hold"),
                format!("How to apply {t} step by step"),
                format!("The most common mistakes made with {t}"),
            ],
            formulas_to_memorize,
            key_terms: vec![
                KeyTerm {
                    term: t.clone(),
                    definition,
                },
                KeyTerm {
                    term: "Core principle".to_string(),
                    definition: format!("A rule that explains how {t} behaves."),
                },
                KeyTerm {
                    term: "Application".to_string(),
                    definition: format!("Using {t} to solve a concrete problem or explain a situation."),
                },
                KeyTerm {
                    term: "Edge case".to_string(),
                    definition: format!("A situation at the limits of {t} where the usual rules may not hold."),
                },
                KeyTerm {
                    term: "Command word".to_string(),
                    definition: "The verb in a question (define, explain, evaluate) that sets what the answer must do.".to_string(),
                },
            ],
            common_formulas,
            last_minute_tips: vec![
                format!("Rewrite the definition of {t} from memory one last time"),
                "Read every question twice and underline the command word".to_string(),
                "Show your working; method marks add up".to_string(),
            ],
        }
    }

    pub fn study_tips(&self, seed: &TopicSeed) -> Vec<String> {
        let t = &seed.topic;
        vec![
            format!("Start by learning the definition of {t}, then the principles, then practise applying them."),
            "Use active recall: close your notes and write down everything you remember, then check.".to_string(),
            "Space your revision over several short sessions instead of one long one.".to_string(),
            format!("Attempt past-paper questions on {t} under timed conditions."),
        ]
    }
}
