//! Parser for the classification oracle's untrusted free-text output.
//!
//! All structural validation of oracle output happens here and nowhere
//! else; consumers only ever see the tagged outcome, never the raw text
//! plus ad hoc prefix checks.

use serde_json::Value;

use super::result::ClassificationResult;

/// Tagged result of validating raw oracle output.
#[derive(Debug, Clone, PartialEq)]
pub enum ParseOutcome {
    /// Output matched the structural contract.
    Valid(ClassificationResult),
    /// Output violated the contract; kept verbatim for logging.
    Malformed {
        /// The raw oracle text after fence stripping.
        raw: String,
        /// Which part of the contract it violated.
        reason: String,
    },
}

/// Validates raw oracle output against the structural contract.
///
/// The contract: after stripping code-fence wrapping, the text must parse
/// as a single flat JSON object containing exactly the keys `category`
/// (string) and `confidence` (number). Whether `category` is a member of
/// the currently valid label set is deliberately not checked.
pub fn parse_classification(raw: &str) -> ParseOutcome {
    let cleaned = strip_wrapping(raw);

    let value: Value = match serde_json::from_str(cleaned) {
        Ok(value) => value,
        Err(error) => return malformed(cleaned, format!("not valid JSON: {error}")),
    };

    let object = match value {
        Value::Object(object) => object,
        Value::Array(_) => return malformed(cleaned, "expected an object, got an array"),
        other => {
            return malformed(cleaned, format!("expected an object, got {}", kind(&other)))
        }
    };

    if object.len() != 2 || !object.contains_key("category") || !object.contains_key("confidence")
    {
        let keys: Vec<&str> = object.keys().map(String::as_str).collect();
        return malformed(
            cleaned,
            format!(
                "expected exactly the keys category and confidence, got [{}]",
                keys.join(", ")
            ),
        );
    }

    let category = match &object["category"] {
        Value::String(category) => category.clone(),
        other => return malformed(cleaned, format!("category must be a string, got {}", kind(other))),
    };

    let confidence = match object["confidence"].as_f64() {
        Some(confidence) => confidence as f32,
        None => {
            return malformed(
                cleaned,
                format!("confidence must be a number, got {}", kind(&object["confidence"])),
            )
        }
    };

    ParseOutcome::Valid(ClassificationResult::new(category, confidence))
}

/// Strips markdown code fences and single-backtick wrapping.
///
/// Oracles routinely wrap their JSON in ```json fences despite being told
/// not to; the wrapping is presentation noise, not a contract violation.
fn strip_wrapping(raw: &str) -> &str {
    let mut text = raw.trim();

    if let Some(rest) = text.strip_prefix("```") {
        // Drop the info string ("json", "JSON", empty) up to the newline.
        let rest = match rest.split_once('\n') {
            Some((_, body)) => body,
            None => rest.trim_start_matches(|c: char| c.is_ascii_alphabetic()),
        };
        text = rest.strip_suffix("```").unwrap_or(rest).trim();
    } else if text.len() >= 2 && text.starts_with('`') && text.ends_with('`') {
        text = text[1..text.len() - 1].trim();
    }

    text
}

fn malformed(raw: &str, reason: impl Into<String>) -> ParseOutcome {
    ParseOutcome::Malformed {
        raw: raw.to_string(),
        reason: reason.into(),
    }
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn expect_valid(raw: &str) -> ClassificationResult {
        match parse_classification(raw) {
            ParseOutcome::Valid(result) => result,
            ParseOutcome::Malformed { reason, .. } => {
                panic!("expected valid output, got malformed: {reason}")
            }
        }
    }

    fn expect_malformed(raw: &str) -> String {
        match parse_classification(raw) {
            ParseOutcome::Malformed { reason, .. } => reason,
            ParseOutcome::Valid(result) => panic!("expected malformed, parsed {result:?}"),
        }
    }

    mod accepts {
        use super::*;

        #[test]
        fn plain_object() {
            let result = expect_valid(r#"{"category": "物流", "confidence": 0.92}"#);
            assert_eq!(result.category, "物流");
            assert!((result.confidence - 0.92).abs() < 1e-6);
        }

        #[test]
        fn fenced_object() {
            let result =
                expect_valid("```json\n{\"category\": \"退貨\", \"confidence\": 0.88}\n```");
            assert_eq!(result.category, "退貨");
        }

        #[test]
        fn bare_fenced_object() {
            let result = expect_valid("```\n{\"category\": \"訂單\", \"confidence\": 1}\n```");
            assert_eq!(result.category, "訂單");
            assert_eq!(result.confidence, 1.0);
        }

        #[test]
        fn backtick_wrapped_object() {
            let result = expect_valid("`{\"category\": \"訂單\", \"confidence\": 0.9}`");
            assert_eq!(result.category, "訂單");
        }

        #[test]
        fn integer_confidence() {
            let result = expect_valid(r#"{"category": "其他", "confidence": 0}"#);
            assert_eq!(result.confidence, 0.0);
        }

        #[test]
        fn category_outside_known_set_is_still_valid() {
            // Membership is the answer resolver's concern, not the parser's.
            let result = expect_valid(r#"{"category": "made-up-label", "confidence": 0.99}"#);
            assert_eq!(result.category, "made-up-label");
        }
    }

    mod rejects {
        use super::*;

        #[test]
        fn prose() {
            let reason = expect_malformed("I think this is about shipping.");
            assert!(reason.contains("not valid JSON"));
        }

        #[test]
        fn arrays() {
            let reason = expect_malformed(r#"[{"category": "a", "confidence": 1}]"#);
            assert!(reason.contains("array"));
        }

        #[test]
        fn scalars() {
            expect_malformed(r#""shipping""#);
            expect_malformed("0.9");
        }

        #[test]
        fn missing_keys() {
            let reason = expect_malformed(r#"{"category": "a"}"#);
            assert!(reason.contains("exactly the keys"));
        }

        #[test]
        fn extra_keys() {
            let reason =
                expect_malformed(r#"{"category": "a", "confidence": 1, "intent": "ask"}"#);
            assert!(reason.contains("exactly the keys"));
        }

        #[test]
        fn wrong_category_type() {
            let reason = expect_malformed(r#"{"category": 3, "confidence": 1}"#);
            assert!(reason.contains("category must be a string"));
        }

        #[test]
        fn wrong_confidence_type() {
            let reason = expect_malformed(r#"{"category": "a", "confidence": "high"}"#);
            assert!(reason.contains("confidence must be a number"));
        }
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn never_panics(raw in "\\PC*") {
                let _ = parse_classification(&raw);
            }

            #[test]
            fn valid_output_roundtrips_category(
                category in "[a-z\\u4e00-\\u9fa5]{1,12}",
                confidence in 0.0f32..1.0f32,
            ) {
                let raw = serde_json::json!({
                    "category": category.clone(),
                    "confidence": confidence,
                })
                .to_string();
                match parse_classification(&raw) {
                    ParseOutcome::Valid(result) => prop_assert_eq!(result.category, category),
                    ParseOutcome::Malformed { reason, .. } => {
                        return Err(TestCaseError::fail(reason));
                    }
                }
            }
        }
    }
}
