// ============================================
// src/questions.rs
// Static quiz content shared by every game
// ============================================

use std::collections::HashSet;
use std::fmt;

use thiserror::Error;

// --------------------------------------------------
// Record types
// --------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Subject {
    Math,
    Science,
    English,
    Social,
    General,
}

impl Subject {
    pub fn label(&self) -> &'static str {
        match self {
            Subject::Math => "Math",
            Subject::Science => "Science",
            Subject::English => "English",
            Subject::Social => "Social Studies",
            Subject::General => "General Knowledge",
        }
    }
}

/// Correct answer of a choice question: one index (MCQ) or several (MSQ).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Answer {
    Single(usize),
    Multiple(&'static [usize]),
}

#[derive(Debug, Clone, Copy)]
pub struct ChoiceQuestion {
    pub id: u32,
    pub subject: Subject,
    pub class: u8,
    pub prompt: &'static str,
    pub options: &'static [&'static str],
    pub answer: Answer,
}

impl ChoiceQuestion {
    /// Indices marked correct, in authoring order.
    pub fn correct_indices(&self) -> Vec<usize> {
        match self.answer {
            Answer::Single(index) => vec![index],
            Answer::Multiple(indices) => indices.to_vec(),
        }
    }

    /// "Science · Class 7"
    pub fn tag(&self) -> String {
        format!("{} · Class {}", self.subject.label(), self.class)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct TrueFalseItem {
    pub statement: &'static str,
    pub answer: bool,
    pub explanation: &'static str,
    pub category: &'static str,
}

#[derive(Debug, Clone, Copy)]
pub struct MatchPair {
    pub term: &'static str,
    pub definition: &'static str,
}

#[derive(Debug, Clone, Copy)]
pub struct MatchingSet {
    pub id: u32,
    pub title: &'static str,
    pub pairs: &'static [MatchPair],
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Across,
    Down,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Across => write!(f, "across"),
            Direction::Down => write!(f, "down"),
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Clue {
    pub number: u32,
    pub clue: &'static str,
    pub answer: &'static str,
    pub row: usize,
    pub col: usize,
}

impl Clue {
    pub fn len(&self) -> usize {
        self.answer.chars().count()
    }

    /// Cells covered by this clue when written in `direction`.
    pub fn cells(&self, direction: Direction) -> impl Iterator<Item = (usize, usize)> + '_ {
        (0..self.len()).map(move |i| match direction {
            Direction::Across => (self.row, self.col + i),
            Direction::Down => (self.row + i, self.col),
        })
    }
}

/// Crossword puzzle. Grid rows use `.` for blocked cells and an uppercase
/// letter for the solution of every open cell.
#[derive(Debug, Clone, Copy)]
pub struct CrosswordPuzzle {
    pub id: u32,
    pub title: &'static str,
    pub grid: &'static [&'static str],
    pub across: &'static [Clue],
    pub down: &'static [Clue],
}

impl CrosswordPuzzle {
    pub fn rows(&self) -> usize {
        self.grid.len()
    }

    pub fn cols(&self) -> usize {
        self.grid.first().map(|row| row.len()).unwrap_or(0)
    }

    /// Solution letter at a cell, `None` when blocked or outside the grid.
    pub fn solution(&self, row: usize, col: usize) -> Option<char> {
        let c = self.grid.get(row)?.as_bytes().get(col).copied()? as char;
        (c != '.').then_some(c)
    }

    pub fn is_open(&self, row: usize, col: usize) -> bool {
        self.solution(row, col).is_some()
    }

    /// Every clue paired with its direction, across first.
    pub fn clues(&self) -> impl Iterator<Item = (Direction, &'static Clue)> {
        let across = self.across.iter().map(|c| (Direction::Across, c));
        let down = self.down.iter().map(|c| (Direction::Down, c));
        across.chain(down)
    }

    pub fn clue_count(&self) -> usize {
        self.across.len() + self.down.len()
    }
}

#[derive(Debug, Clone, Copy)]
pub struct ScrambleWord {
    pub word: &'static str,
    pub hint: &'static str,
    pub category: &'static str,
}

// --------------------------------------------------
// Content
// --------------------------------------------------

/// Questions grouped by subject then class (6, 7, 8).
pub const QUESTION_SETS: &[ChoiceQuestion] = &[
    // Math
    ChoiceQuestion { id: 1, subject: Subject::Math, class: 6, prompt: "What is 15 × 8?", options: &["120", "125", "130", "115"], answer: Answer::Single(0) },
    ChoiceQuestion { id: 2, subject: Subject::Math, class: 6, prompt: "Which of the following are prime numbers?", options: &["2", "9", "11", "15"], answer: Answer::Multiple(&[0, 2]) },
    ChoiceQuestion { id: 3, subject: Subject::Math, class: 6, prompt: "What is 3/4 + 1/4?", options: &["1", "4/8", "2/4", "1/2"], answer: Answer::Single(0) },
    ChoiceQuestion { id: 4, subject: Subject::Math, class: 7, prompt: "Solve: 2x + 5 = 15", options: &["x = 5", "x = 10", "x = 7", "x = 3"], answer: Answer::Single(0) },
    ChoiceQuestion { id: 5, subject: Subject::Math, class: 7, prompt: "What is the area of a rectangle with length 8 cm and width 5 cm?", options: &["40 sq cm", "26 sq cm", "13 sq cm", "35 sq cm"], answer: Answer::Single(0) },
    ChoiceQuestion { id: 6, subject: Subject::Math, class: 8, prompt: "What is √64?", options: &["6", "7", "8", "9"], answer: Answer::Single(2) },
    ChoiceQuestion { id: 7, subject: Subject::Math, class: 8, prompt: "Which are perfect squares?", options: &["16", "20", "25", "30"], answer: Answer::Multiple(&[0, 2]) },
    // Science
    ChoiceQuestion { id: 8, subject: Subject::Science, class: 6, prompt: "What is the main source of energy for plants?", options: &["Water", "Sunlight", "Soil", "Air"], answer: Answer::Single(1) },
    ChoiceQuestion { id: 9, subject: Subject::Science, class: 6, prompt: "Which of the following are states of matter?", options: &["Solid", "Liquid", "Gas", "Energy"], answer: Answer::Multiple(&[0, 1, 2]) },
    ChoiceQuestion { id: 10, subject: Subject::Science, class: 7, prompt: "What is the chemical formula for water?", options: &["CO2", "H2O", "O2", "NaCl"], answer: Answer::Single(1) },
    ChoiceQuestion { id: 11, subject: Subject::Science, class: 8, prompt: "Which planet is closest to the Sun?", options: &["Venus", "Earth", "Mercury", "Mars"], answer: Answer::Single(2) },
    // English
    ChoiceQuestion { id: 12, subject: Subject::English, class: 6, prompt: "Choose the correct spelling:", options: &["Recieve", "Receive", "Receve", "Receeve"], answer: Answer::Single(1) },
    ChoiceQuestion { id: 13, subject: Subject::English, class: 6, prompt: "Which are nouns?", options: &["Table", "Run", "Beautiful", "Book"], answer: Answer::Multiple(&[0, 3]) },
    ChoiceQuestion { id: 14, subject: Subject::English, class: 7, prompt: "What is the past tense of 'go'?", options: &["Goed", "Went", "Gone", "Going"], answer: Answer::Single(1) },
    ChoiceQuestion { id: 15, subject: Subject::English, class: 8, prompt: "Identify the adjective in: 'The beautiful flower bloomed.'", options: &["The", "Beautiful", "Flower", "Bloomed"], answer: Answer::Single(1) },
    // Social studies
    ChoiceQuestion { id: 16, subject: Subject::Social, class: 6, prompt: "What is the capital of India?", options: &["Mumbai", "Delhi", "Kolkata", "Chennai"], answer: Answer::Single(1) },
    ChoiceQuestion { id: 17, subject: Subject::Social, class: 7, prompt: "Who was the first President of India?", options: &["Jawaharlal Nehru", "Dr. Rajendra Prasad", "Mahatma Gandhi", "Sardar Patel"], answer: Answer::Single(1) },
    ChoiceQuestion { id: 18, subject: Subject::Social, class: 8, prompt: "Which river is known as the Ganga of the South?", options: &["Krishna", "Godavari", "Kaveri", "Narmada"], answer: Answer::Single(2) },
];

/// Quick one-line questions asked when a question balloon is popped.
pub const BALLOON_QUESTIONS: &[ChoiceQuestion] = &[
    ChoiceQuestion { id: 1, subject: Subject::General, class: 0, prompt: "What is 5 + 3?", options: &["6", "7", "8", "9"], answer: Answer::Single(2) },
    ChoiceQuestion { id: 2, subject: Subject::General, class: 0, prompt: "What is the capital of France?", options: &["London", "Berlin", "Paris", "Madrid"], answer: Answer::Single(2) },
    ChoiceQuestion { id: 3, subject: Subject::General, class: 0, prompt: "What is 12 ÷ 4?", options: &["2", "3", "4", "5"], answer: Answer::Single(1) },
    ChoiceQuestion { id: 4, subject: Subject::General, class: 0, prompt: "Which planet is closest to the Sun?", options: &["Venus", "Mars", "Mercury", "Earth"], answer: Answer::Single(2) },
    ChoiceQuestion { id: 5, subject: Subject::General, class: 0, prompt: "What is 7 × 6?", options: &["36", "42", "48", "54"], answer: Answer::Single(1) },
    ChoiceQuestion { id: 6, subject: Subject::General, class: 0, prompt: "What color do you get mixing red and blue?", options: &["Green", "Purple", "Orange", "Yellow"], answer: Answer::Single(1) },
    ChoiceQuestion { id: 7, subject: Subject::General, class: 0, prompt: "How many sides does a triangle have?", options: &["2", "3", "4", "5"], answer: Answer::Single(1) },
    ChoiceQuestion { id: 8, subject: Subject::General, class: 0, prompt: "What is the largest ocean?", options: &["Atlantic", "Indian", "Pacific", "Arctic"], answer: Answer::Single(2) },
    ChoiceQuestion { id: 9, subject: Subject::General, class: 0, prompt: "What is 9 × 9?", options: &["72", "81", "90", "99"], answer: Answer::Single(1) },
    ChoiceQuestion { id: 10, subject: Subject::General, class: 0, prompt: "Which animal is known as the King of the Jungle?", options: &["Tiger", "Lion", "Elephant", "Leopard"], answer: Answer::Single(1) },
    ChoiceQuestion { id: 11, subject: Subject::General, class: 0, prompt: "What is the opposite of 'hot'?", options: &["Warm", "Cool", "Cold", "Freezing"], answer: Answer::Single(2) },
    ChoiceQuestion { id: 12, subject: Subject::General, class: 0, prompt: "How many days are in a week?", options: &["5", "6", "7", "8"], answer: Answer::Single(2) },
    ChoiceQuestion { id: 13, subject: Subject::General, class: 0, prompt: "What is H2O?", options: &["Oxygen", "Water", "Hydrogen", "Carbon"], answer: Answer::Single(1) },
    ChoiceQuestion { id: 14, subject: Subject::General, class: 0, prompt: "Which season comes after winter?", options: &["Summer", "Spring", "Autumn", "Fall"], answer: Answer::Single(1) },
    ChoiceQuestion { id: 15, subject: Subject::General, class: 0, prompt: "What is 100 ÷ 10?", options: &["5", "10", "15", "20"], answer: Answer::Single(1) },
    ChoiceQuestion { id: 16, subject: Subject::General, class: 0, prompt: "Which continent is India in?", options: &["Africa", "Asia", "Europe", "Australia"], answer: Answer::Single(1) },
    ChoiceQuestion { id: 17, subject: Subject::General, class: 0, prompt: "What do bees make?", options: &["Milk", "Honey", "Butter", "Cheese"], answer: Answer::Single(1) },
    ChoiceQuestion { id: 18, subject: Subject::General, class: 0, prompt: "How many wheels does a bicycle have?", options: &["1", "2", "3", "4"], answer: Answer::Single(1) },
    ChoiceQuestion { id: 19, subject: Subject::General, class: 0, prompt: "What is the first letter of the alphabet?", options: &["B", "A", "C", "D"], answer: Answer::Single(1) },
    ChoiceQuestion { id: 20, subject: Subject::General, class: 0, prompt: "Which is the fastest land animal?", options: &["Horse", "Cheetah", "Lion", "Tiger"], answer: Answer::Single(1) },
    ChoiceQuestion { id: 21, subject: Subject::General, class: 0, prompt: "What is 15 + 25?", options: &["30", "35", "40", "45"], answer: Answer::Single(2) },
    ChoiceQuestion { id: 22, subject: Subject::General, class: 0, prompt: "Which organ pumps blood in our body?", options: &["Brain", "Heart", "Lungs", "Liver"], answer: Answer::Single(1) },
    ChoiceQuestion { id: 23, subject: Subject::General, class: 0, prompt: "What comes after Thursday?", options: &["Wednesday", "Friday", "Saturday", "Sunday"], answer: Answer::Single(1) },
    ChoiceQuestion { id: 24, subject: Subject::General, class: 0, prompt: "How many minutes are in an hour?", options: &["50", "60", "70", "80"], answer: Answer::Single(1) },
    ChoiceQuestion { id: 25, subject: Subject::General, class: 0, prompt: "Which shape has 4 equal sides?", options: &["Triangle", "Square", "Circle", "Rectangle"], answer: Answer::Single(1) },
];

pub const TRUE_FALSE_ITEMS: &[TrueFalseItem] = &[
    TrueFalseItem { statement: "The sun is a star.", answer: true, explanation: "The sun is indeed a star - it's the closest star to Earth.", category: "Science" },
    TrueFalseItem { statement: "All birds can fly.", answer: false, explanation: "Some birds like penguins and ostriches cannot fly.", category: "Biology" },
    TrueFalseItem { statement: "Water boils at 100°C at sea level.", answer: true, explanation: "At standard atmospheric pressure, water boils at exactly 100°C (212°F).", category: "Science" },
    TrueFalseItem { statement: "There are 8 planets in our solar system.", answer: true, explanation: "Since Pluto was reclassified as a dwarf planet, there are 8 planets.", category: "Astronomy" },
    TrueFalseItem { statement: "Shakespeare wrote 'Romeo and Juliet'.", answer: true, explanation: "William Shakespeare wrote this famous tragedy in the early part of his career.", category: "Literature" },
    TrueFalseItem { statement: "Lightning never strikes the same place twice.", answer: false, explanation: "Lightning can and often does strike the same place multiple times.", category: "Science" },
    TrueFalseItem { statement: "The Great Wall of China is visible from space.", answer: false, explanation: "This is a common myth - the Great Wall is not visible from space with the naked eye.", category: "Geography" },
    TrueFalseItem { statement: "Humans have five senses.", answer: false, explanation: "Humans actually have more than five senses, including balance, temperature, and pain.", category: "Biology" },
    TrueFalseItem { statement: "The Amazon River is longer than the Nile River.", answer: true, explanation: "Recent studies suggest the Amazon is slightly longer than the Nile.", category: "Geography" },
    TrueFalseItem { statement: "Gold is heavier than silver.", answer: true, explanation: "Gold has a higher density than silver, making it heavier.", category: "Science" },
    TrueFalseItem { statement: "Antarctica is the largest continent.", answer: false, explanation: "Asia is the largest continent, not Antarctica.", category: "Geography" },
    TrueFalseItem { statement: "A triangle has 4 sides.", answer: false, explanation: "A triangle has exactly 3 sides. A shape with 4 sides is called a quadrilateral.", category: "Mathematics" },
    TrueFalseItem { statement: "The human heart has 4 chambers.", answer: true, explanation: "The heart has 4 chambers: left and right atrium, left and right ventricle.", category: "Biology" },
    TrueFalseItem { statement: "Mount Everest is the tallest mountain on Earth.", answer: true, explanation: "Mount Everest stands at 8,848.86 meters above sea level.", category: "Geography" },
    TrueFalseItem { statement: "All metals conduct electricity.", answer: false, explanation: "While most metals conduct electricity, some don't conduct it well under all conditions.", category: "Science" },
];

pub const MATCHING_SETS: &[MatchingSet] = &[
    MatchingSet {
        id: 1,
        title: "Match Scientific Terms",
        pairs: &[
            MatchPair { term: "Photosynthesis", definition: "Process by which plants make food using sunlight" },
            MatchPair { term: "Mitosis", definition: "Cell division that produces two identical cells" },
            MatchPair { term: "Gravity", definition: "Force that pulls objects toward Earth" },
            MatchPair { term: "Atom", definition: "Smallest unit of matter" },
            MatchPair { term: "Ecosystem", definition: "Community of living and non-living things" },
        ],
    },
    MatchingSet {
        id: 2,
        title: "Match Mathematical Terms",
        pairs: &[
            MatchPair { term: "Perimeter", definition: "Distance around the outside of a shape" },
            MatchPair { term: "Area", definition: "Amount of space inside a shape" },
            MatchPair { term: "Fraction", definition: "Part of a whole number" },
            MatchPair { term: "Prime Number", definition: "Number divisible only by 1 and itself" },
            MatchPair { term: "Polygon", definition: "Closed figure with straight sides" },
        ],
    },
    MatchingSet {
        id: 3,
        title: "Match Historical Events",
        pairs: &[
            MatchPair { term: "1947", definition: "India gained independence" },
            MatchPair { term: "1857", definition: "First War of Indian Independence" },
            MatchPair { term: "1930", definition: "Salt March by Mahatma Gandhi" },
            MatchPair { term: "1919", definition: "Jallianwala Bagh Massacre" },
            MatchPair { term: "1942", definition: "Quit India Movement launched" },
        ],
    },
];

pub const CROSSWORDS: &[CrosswordPuzzle] = &[
    CrosswordPuzzle {
        id: 1,
        title: "Science Crossword",
        grid: &[
            "......S",
            "..A...U",
            "WATER.N",
            "..O....",
            "..M....",
        ],
        across: &[Clue { number: 1, clue: "H2O in liquid form", answer: "WATER", row: 2, col: 0 }],
        down: &[
            Clue { number: 2, clue: "Our nearest star", answer: "SUN", row: 0, col: 6 },
            Clue { number: 3, clue: "Smallest particle of matter", answer: "ATOM", row: 1, col: 2 },
        ],
    },
    CrosswordPuzzle {
        id: 2,
        title: "Geography Crossword",
        grid: &[
            "INDIA..",
            "....S..",
            "....I..",
            "....A..",
        ],
        across: &[Clue { number: 1, clue: "Our country", answer: "INDIA", row: 0, col: 0 }],
        down: &[Clue { number: 2, clue: "Largest continent", answer: "ASIA", row: 0, col: 4 }],
    },
];

pub const SCRAMBLE_WORDS: &[ScrambleWord] = &[
    ScrambleWord { word: "elephant", hint: "A large gray mammal with a trunk", category: "Animals" },
    ScrambleWord { word: "computer", hint: "Electronic device for processing data", category: "Technology" },
    ScrambleWord { word: "rainbow", hint: "Colorful arc in the sky after rain", category: "Nature" },
    ScrambleWord { word: "library", hint: "Place where books are kept", category: "Places" },
    ScrambleWord { word: "mathematics", hint: "Subject dealing with numbers and equations", category: "Education" },
    ScrambleWord { word: "butterfly", hint: "Colorful insect with wings", category: "Animals" },
    ScrambleWord { word: "telescope", hint: "Instrument for viewing distant objects", category: "Science" },
    ScrambleWord { word: "democracy", hint: "Government by the people", category: "Social Studies" },
    ScrambleWord { word: "volcano", hint: "Mountain that can erupt lava", category: "Geography" },
    ScrambleWord { word: "symphony", hint: "Large orchestral musical composition", category: "Arts" },
    ScrambleWord { word: "molecule", hint: "Smallest unit of a chemical compound", category: "Science" },
    ScrambleWord { word: "adventure", hint: "Exciting or unusual experience", category: "General" },
    ScrambleWord { word: "architecture", hint: "Art and science of building design", category: "Arts" },
    ScrambleWord { word: "environment", hint: "Natural world around us", category: "Science" },
    ScrambleWord { word: "revolution", hint: "Complete change or overthrow", category: "History" },
];

/// Single-answer questions across every subject and class.
pub fn mcq_questions() -> Vec<&'static ChoiceQuestion> {
    QUESTION_SETS
        .iter()
        .filter(|q| matches!(q.answer, Answer::Single(_)))
        .collect()
}

/// Multi-select questions across every subject and class.
pub fn msq_questions() -> Vec<&'static ChoiceQuestion> {
    QUESTION_SETS
        .iter()
        .filter(|q| matches!(q.answer, Answer::Multiple(_)))
        .collect()
}

// --------------------------------------------------
// MARK: Validation
// --------------------------------------------------

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ContentError {
    #[error("question {id}: answer index {index} is outside its {options} options")]
    AnswerOutOfRange { id: u32, index: usize, options: usize },

    #[error("question {id}: multi-select answer must list distinct options")]
    BadMultiAnswer { id: u32 },

    #[error("matching set {id} has no pairs")]
    EmptyMatchingSet { id: u32 },

    #[error("crossword {id}: row {row} is {len} cells wide, expected {expected}")]
    RaggedGrid { id: u32, row: usize, len: usize, expected: usize },

    #[error("crossword {id}: {direction} clue {number} expects {answer} but the grid spells {found}")]
    ClueMismatch {
        id: u32,
        direction: Direction,
        number: u32,
        answer: &'static str,
        found: String,
    },

    #[error("scramble word {0:?} must be non-empty lowercase ASCII")]
    BadScrambleWord(&'static str),
}

fn validate_choice(question: &ChoiceQuestion) -> Result<(), ContentError> {
    let indices = question.correct_indices();
    if let Answer::Multiple(list) = question.answer {
        let distinct: HashSet<_> = list.iter().collect();
        if list.is_empty() || distinct.len() != list.len() {
            return Err(ContentError::BadMultiAnswer { id: question.id });
        }
    }
    for index in indices {
        if index >= question.options.len() {
            return Err(ContentError::AnswerOutOfRange {
                id: question.id,
                index,
                options: question.options.len(),
            });
        }
    }
    Ok(())
}

fn validate_crossword(puzzle: &CrosswordPuzzle) -> Result<(), ContentError> {
    let expected = puzzle.cols();
    for (row, line) in puzzle.grid.iter().enumerate() {
        if line.len() != expected {
            return Err(ContentError::RaggedGrid {
                id: puzzle.id,
                row,
                len: line.len(),
                expected,
            });
        }
    }
    for (direction, clue) in puzzle.clues() {
        let found: String = clue
            .cells(direction)
            .map(|(r, c)| puzzle.solution(r, c).unwrap_or('.'))
            .collect();
        if found != clue.answer {
            return Err(ContentError::ClueMismatch {
                id: puzzle.id,
                direction,
                number: clue.number,
                answer: clue.answer,
                found,
            });
        }
    }
    Ok(())
}

/// Checks every authoring invariant of the built-in content.
pub fn validate_catalog() -> Result<(), ContentError> {
    for question in QUESTION_SETS.iter().chain(BALLOON_QUESTIONS) {
        validate_choice(question)?;
    }
    for set in MATCHING_SETS {
        if set.pairs.is_empty() {
            return Err(ContentError::EmptyMatchingSet { id: set.id });
        }
    }
    for puzzle in CROSSWORDS {
        validate_crossword(puzzle)?;
    }
    for entry in SCRAMBLE_WORDS {
        if entry.word.is_empty() || !entry.word.bytes().all(|b| b.is_ascii_lowercase()) {
            return Err(ContentError::BadScrambleWord(entry.word));
        }
    }
    Ok(())
}
