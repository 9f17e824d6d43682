use serde_json::{Map, Value};

use crate::registry::{self, Answer, QuestionKind};
use crate::wizard::AnswerMap;

/// The flat wire-format request body. Built fresh per submission and never
/// mutated afterwards.
pub type ScoringRequest = Map<String, Value>;

/// Fixed mapping from internal question id to the backend field name.
/// Adding a question means adding an entry here; there is no dynamic
/// lookup or renaming at call time.
static FIELD_TABLE: &[(&str, &str)] = &[
    ("gender", "Gender"),
    ("hometown", "Hometown"),
    ("income", "Income"),
    ("ssc_grade", "SSC"),
    ("hsc_grade", "HSC"),
    ("semester", "Semester"),
    ("last_gpa", "Last"),
    ("overall_gpa", "Overall"),
    ("preparation", "Preparation"),
    ("attendance", "Attendance"),
    ("gaming", "Gaming"),
    ("extracurricular", "Extra"),
    ("job", "Job"),
    ("computer_skill", "Computer"),
    ("english_skill", "English"),
];

/// Build the scoring request from the answer map. Every backend field is
/// present; questions the user never answered serialize as null. The
/// Semester field is always sent as a string because the backend's own
/// parser expects text there.
pub fn build_request(answers: &AnswerMap) -> ScoringRequest {
    let mut request = Map::new();

    for (question_id, field_name) in FIELD_TABLE {
        let value = answers
            .get(*question_id)
            .map(|answer| field_value(question_id, answer))
            .unwrap_or(Value::Null);
        request.insert((*field_name).to_string(), value);
    }

    request
}

fn field_value(question_id: &str, answer: &Answer) -> Value {
    if question_id == "semester" {
        return semester_value(answer);
    }

    let kind = registry::find(question_id).map(|q| &q.kind);
    match kind {
        Some(QuestionKind::Choice { .. }) => match answer {
            Answer::Text(s) => Value::String(s.clone()),
            Answer::Number(n) => Value::String(format_number(*n)),
        },
        Some(QuestionKind::Scale { .. }) => match answer.as_number() {
            Some(n) => Value::from(n as i64),
            None => Value::Null,
        },
        Some(QuestionKind::Number { .. }) | None => match answer.as_number() {
            Some(n) => Value::from(n),
            None => Value::Null,
        },
    }
}

fn semester_value(answer: &Answer) -> Value {
    match answer.as_number() {
        Some(n) => Value::String(format_number(n)),
        None => match answer.as_text() {
            Some(s) if !s.trim().is_empty() => Value::String(s.trim().to_string()),
            _ => Value::Null,
        },
    }
}

fn format_number(n: f64) -> String {
    if n.fract() == 0.0 {
        format!("{}", n as i64)
    } else {
        format!("{}", n)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::questions;
    use crate::wizard::AnswerMap;

    fn full_answers() -> AnswerMap {
        let mut answers = AnswerMap::new();
        answers.insert("gender".into(), Answer::Text("Male".into()));
        answers.insert("hometown".into(), Answer::Text("City".into()));
        answers.insert(
            "income".into(),
            Answer::Text("Lower middle (15,000-30,000)".into()),
        );
        answers.insert("ssc_grade".into(), Answer::Number(4.75));
        answers.insert("hsc_grade".into(), Answer::Number(4.5));
        answers.insert("semester".into(), Answer::Number(2.0));
        answers.insert("last_gpa".into(), Answer::Text("3,5".into()));
        answers.insert("overall_gpa".into(), Answer::Number(3.5));
        answers.insert("preparation".into(), Answer::Text("2-3 Hours".into()));
        answers.insert("attendance".into(), Answer::Text("80%-100%".into()));
        answers.insert("gaming".into(), Answer::Text("More than 3 Hours".into()));
        answers.insert("extracurricular".into(), Answer::Text("Yes".into()));
        answers.insert("job".into(), Answer::Text("No".into()));
        answers.insert("computer_skill".into(), Answer::Number(3.0));
        answers.insert("english_skill".into(), Answer::Number(4.0));
        answers
    }

    #[test]
    fn test_every_backend_field_present() {
        let request = build_request(&full_answers());
        assert_eq!(request.len(), FIELD_TABLE.len());
        for (_, field) in FIELD_TABLE {
            assert!(request.contains_key(*field), "missing field {}", field);
        }
    }

    #[test]
    fn test_field_table_covers_catalog() {
        for q in questions() {
            assert!(
                FIELD_TABLE.iter().any(|(id, _)| *id == q.id),
                "no field table entry for question {}",
                q.id
            );
        }
    }

    #[test]
    fn test_comma_decimal_parses_to_number() {
        let request = build_request(&full_answers());
        assert_eq!(request["Last"], Value::from(3.5));
    }

    #[test]
    fn test_semester_serializes_as_string() {
        let request = build_request(&full_answers());
        assert_eq!(request["Semester"], Value::String("2".to_string()));
    }

    #[test]
    fn test_scale_serializes_as_integer() {
        let request = build_request(&full_answers());
        assert_eq!(request["Computer"], Value::from(3));
        assert_eq!(request["English"], Value::from(4));
    }

    #[test]
    fn test_unanswered_fields_are_null() {
        let mut answers = AnswerMap::new();
        answers.insert("gender".into(), Answer::Text("Female".into()));
        let request = build_request(&answers);

        assert_eq!(request["Gender"], Value::String("Female".to_string()));
        assert_eq!(request["Overall"], Value::Null);
        assert_eq!(request["Semester"], Value::Null);
        assert_eq!(request.len(), FIELD_TABLE.len());
    }
}
