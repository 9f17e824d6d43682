use serde::{Deserialize, Serialize};

/// A raw answer as captured by the UI: either the option text the user
/// picked or a number coerced from their input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Answer {
    Number(f64),
    Text(String),
}

impl Answer {
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Answer::Number(n) => Some(*n),
            Answer::Text(s) => parse_decimal(s),
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Answer::Text(s) => Some(s),
            Answer::Number(_) => None,
        }
    }
}

/// Parse a decimal number accepting either a comma or a dot separator
/// ("4,17" and "4.17" both yield 4.17). Returns None for anything that
/// does not parse to a finite value.
pub fn parse_decimal(s: &str) -> Option<f64> {
    let normalized = s.trim().replace(',', ".");
    match normalized.parse::<f64>() {
        Ok(n) if n.is_finite() => Some(n),
        _ => None,
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum QuestionKind {
    /// Pick exactly one of the declared options.
    Choice { options: &'static [&'static str] },
    /// Integer rating within an inclusive range.
    Scale { min: i64, max: i64 },
    /// Free-form decimal within an inclusive range.
    Number { min: f64, max: f64, step: f64 },
}

#[derive(Debug, Clone)]
pub struct QuestionDefinition {
    pub id: &'static str,
    pub section: &'static str,
    pub label: &'static str,
    pub kind: QuestionKind,
}

impl QuestionDefinition {
    /// Coerce raw UI input into an answer value. Scale and Number kinds
    /// convert numeric-looking strings to numbers; anything unparseable is
    /// kept as text so validation can reject it later.
    pub fn coerce(&self, raw: &str) -> Answer {
        match self.kind {
            QuestionKind::Choice { .. } => Answer::Text(raw.to_string()),
            QuestionKind::Scale { .. } | QuestionKind::Number { .. } => {
                match parse_decimal(raw) {
                    Some(n) => Answer::Number(n),
                    None => Answer::Text(raw.to_string()),
                }
            }
        }
    }

    /// Check an answer against this question's validity rule. The message
    /// is shown inline as a hint; it never reaches the network.
    pub fn check(&self, answer: &Answer) -> Result<(), String> {
        match self.kind {
            QuestionKind::Choice { options } => {
                let text = answer.as_text().unwrap_or_default();
                if options.iter().any(|o| *o == text) {
                    Ok(())
                } else {
                    Err("pick one of the listed options".to_string())
                }
            }
            QuestionKind::Scale { min, max } => match answer.as_number() {
                Some(n) if n.fract() == 0.0 && n >= min as f64 && n <= max as f64 => Ok(()),
                _ => Err(format!("enter a whole number between {} and {}", min, max)),
            },
            QuestionKind::Number { min, max, .. } => match answer.as_number() {
                Some(n) if n >= min && n <= max => Ok(()),
                _ => Err(format!("enter a number between {} and {}", min, max)),
            },
        }
    }

    pub fn is_valid(&self, answer: &Answer) -> bool {
        self.check(answer).is_ok()
    }
}

/// The questionnaire catalog. Order is step order; ids are stable and each
/// needs a matching entry in the payload field table.
static QUESTIONS: &[QuestionDefinition] = &[
    QuestionDefinition {
        id: "gender",
        section: "About you",
        label: "What is your gender?",
        kind: QuestionKind::Choice {
            options: &["Male", "Female", "Other"],
        },
    },
    QuestionDefinition {
        id: "hometown",
        section: "About you",
        label: "Where did you mostly live before university?",
        kind: QuestionKind::Choice {
            options: &["Village", "Town", "City", "Other"],
        },
    },
    QuestionDefinition {
        id: "income",
        section: "About you",
        label: "How would you describe your family income?",
        kind: QuestionKind::Choice {
            options: &[
                "Low (Below 15,000)",
                "Lower middle (15,000-30,000)",
                "Upper middle (30,000-50,000)",
                "High (Above 50,000)",
            ],
        },
    },
    QuestionDefinition {
        id: "ssc_grade",
        section: "School background",
        label: "Your secondary school (SSC) result, on a 0-5 scale",
        kind: QuestionKind::Number {
            min: 0.0,
            max: 5.0,
            step: 0.01,
        },
    },
    QuestionDefinition {
        id: "hsc_grade",
        section: "School background",
        label: "Your higher secondary (HSC) result, on a 0-5 scale",
        kind: QuestionKind::Number {
            min: 0.0,
            max: 5.0,
            step: 0.01,
        },
    },
    QuestionDefinition {
        id: "semester",
        section: "Current studies",
        label: "Which semester are you currently in?",
        kind: QuestionKind::Scale { min: 1, max: 10 },
    },
    QuestionDefinition {
        id: "last_gpa",
        section: "Current studies",
        label: "Your GPA in the most recent semester (0-5)",
        kind: QuestionKind::Number {
            min: 0.0,
            max: 5.0,
            step: 0.01,
        },
    },
    QuestionDefinition {
        id: "overall_gpa",
        section: "Current studies",
        label: "Your overall GPA so far (0-5)",
        kind: QuestionKind::Number {
            min: 0.0,
            max: 5.0,
            step: 0.01,
        },
    },
    QuestionDefinition {
        id: "preparation",
        section: "Habits",
        label: "How much time do you spend preparing for classes each day?",
        kind: QuestionKind::Choice {
            options: &["0-1 Hour", "2-3 Hours", "More than 3 Hours"],
        },
    },
    QuestionDefinition {
        id: "attendance",
        section: "Habits",
        label: "How often do you attend classes?",
        kind: QuestionKind::Choice {
            options: &["Below 40%", "40%-59%", "60%-79%", "80%-100%"],
        },
    },
    QuestionDefinition {
        id: "gaming",
        section: "Habits",
        label: "How much time do you spend on gaming per day?",
        kind: QuestionKind::Choice {
            options: &["0-1 Hour", "2-3 Hours", "More than 3 Hours"],
        },
    },
    QuestionDefinition {
        id: "extracurricular",
        section: "Habits",
        label: "Do you take part in extracurricular activities?",
        kind: QuestionKind::Choice {
            options: &["Yes", "No"],
        },
    },
    QuestionDefinition {
        id: "job",
        section: "Habits",
        label: "Do you currently have a part-time or full-time job?",
        kind: QuestionKind::Choice {
            options: &["Yes", "No"],
        },
    },
    QuestionDefinition {
        id: "computer_skill",
        section: "Skills",
        label: "Rate your computer skills (1-5)",
        kind: QuestionKind::Scale { min: 1, max: 5 },
    },
    QuestionDefinition {
        id: "english_skill",
        section: "Skills",
        label: "Rate your English proficiency (1-5)",
        kind: QuestionKind::Scale { min: 1, max: 5 },
    },
];

pub fn questions() -> &'static [QuestionDefinition] {
    QUESTIONS
}

pub fn question_count() -> usize {
    QUESTIONS.len()
}

pub fn question(index: usize) -> Option<&'static QuestionDefinition> {
    QUESTIONS.get(index)
}

pub fn find(id: &str) -> Option<&'static QuestionDefinition> {
    QUESTIONS.iter().find(|q| q.id == id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_ids_unique() {
        let mut ids: Vec<_> = questions().iter().map(|q| q.id).collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), question_count());
    }

    #[test]
    fn test_parse_decimal_comma_and_dot() {
        assert_eq!(parse_decimal("4,17"), Some(4.17));
        assert_eq!(parse_decimal("4.17"), Some(4.17));
        assert_eq!(parse_decimal(" 3 "), Some(3.0));
        assert_eq!(parse_decimal("abc"), None);
        assert_eq!(parse_decimal("1,2,3"), None);
        assert_eq!(parse_decimal("inf"), None);
    }

    #[test]
    fn test_choice_requires_exact_option() {
        let q = find("gaming").unwrap();
        assert!(q.is_valid(&Answer::Text("2-3 Hours".to_string())));
        assert!(!q.is_valid(&Answer::Text("2-3 hours".to_string())));
        assert!(!q.is_valid(&Answer::Text(String::new())));
    }

    #[test]
    fn test_scale_requires_integer_in_range() {
        let q = find("computer_skill").unwrap();
        assert!(q.is_valid(&Answer::Number(3.0)));
        assert!(q.is_valid(&Answer::Number(5.0)));
        assert!(!q.is_valid(&Answer::Number(3.5)));
        assert!(!q.is_valid(&Answer::Number(0.0)));
        assert!(!q.is_valid(&Answer::Number(6.0)));
    }

    #[test]
    fn test_number_accepts_comma_decimal_text() {
        let q = find("overall_gpa").unwrap();
        assert!(q.is_valid(&Answer::Text("4,17".to_string())));
        assert!(q.is_valid(&Answer::Number(4.17)));
        assert!(!q.is_valid(&Answer::Text("5,5".to_string())));
        assert!(!q.is_valid(&Answer::Text("four".to_string())));
    }

    #[test]
    fn test_coerce_numeric_kinds() {
        let gpa = find("last_gpa").unwrap();
        assert_eq!(gpa.coerce("3,5"), Answer::Number(3.5));
        assert_eq!(gpa.coerce("oops"), Answer::Text("oops".to_string()));

        let choice = find("job").unwrap();
        assert_eq!(choice.coerce("Yes"), Answer::Text("Yes".to_string()));
    }
}
