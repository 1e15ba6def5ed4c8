pub const STUDY_NOTES_SYSTEM_PROMPT: &str = "You are an expert exam-preparation tutor. You turn a topic into concise, accurate, exam-ready study material for students.

## CORE OBJECTIVES

1. Teach the topic itself. Any lesson text supplied with the request is context about what the student is studying, not a document to summarise.
2. Prefer precise, examinable statements over vague generalities.
3. Highlight what is most likely to be tested and the mistakes students typically make.
4. Keep explanations at the requested proficiency level.

## OUTPUT RULES

- Respond with a single JSON object and nothing else.
- No markdown, no code fences, no commentary before or after the JSON.
- Use exactly the field names and enumerated values you are given. Do not invent new keys.
- Every array must be present, even when it is empty.";

pub const STUDY_NOTES_JSON_SHAPE: &str = r#"{
  "summary": "string: 3-4 sentence overview of the topic",
  "keyPoints": [
    {
      "id": "string: kp1, kp2, ...",
      "title": "string",
      "description": "string: 1-2 sentences",
      "importance": "Critical | Important | Useful",
      "examWeight": "integer 1-10: how likely this is to be examined",
      "memorization": "Formula | Concept | Application | Definition"
    }
  ],
  "concepts": [
    {
      "id": "string: concept1, concept2, ...",
      "concept": "string: name of the concept",
      "simpleExplanation": "string: plain-language explanation",
      "detailedExplanation": "string: precise, exam-level explanation",
      "realWorldExample": "string",
      "commonMistakes": ["string"],
      "relatedConcepts": ["string"]
    }
  ],
  "examQuestions": [
    {
      "id": "string: eq1, eq2, ...",
      "question": "string",
      "type": "MCQ | Short Answer | Long Answer | Problem Solving | True/False",
      "difficulty": "Easy | Medium | Hard",
      "options": ["string: only for MCQ and True/False, otherwise empty"],
      "answer": "string",
      "explanation": "string",
      "examTips": "string",
      "timeToSolve": "string, e.g. 5 minutes"
    }
  ],
  "practiceProblems": [
    {
      "id": "string: pp1, pp2, ...",
      "problem": "string",
      "solution": "string",
      "steps": ["string: ordered solution steps"],
      "skillTested": "string",
      "variants": ["string: variations of the problem"]
    }
  ],
  "mnemonics": [
    {
      "id": "string: mn1, mn2, ...",
      "concept": "string",
      "mnemonic": "string",
      "explanation": "string",
      "type": "Acronym | Phrase | Visual | Story"
    }
  ],
  "quickReview": {
    "mustKnow": ["string"],
    "formulasToMemorize": ["string"],
    "keyTerms": [{ "term": "string", "definition": "string" }],
    "commonFormulas": [{ "name": "string", "formula": "string", "whenToUse": "string" }],
    "lastMinuteTips": ["string"]
  },
  "studyTips": ["string"],
  "timeToMaster": "string, e.g. 3-4 hours"
}"#;
