//! Domain filter translation
//!
//! A domain is a prefix-notation list of terms: logical operators (`&`, `|`,
//! `!`) and `[field, operator, value]` leaves, implicitly AND-ed. Only the
//! shape is checked here; operator and field semantics belong to the server.
//! A validated [`Domain`] serializes back to exactly the JSON it came from.

use serde::{Serialize, Serializer};
use serde_json::Value;

use crate::error::{OdooError, Result};

/// Prefix logical operator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogicalOp {
    And,
    Or,
    Not,
}

impl LogicalOp {
    fn parse(token: &str) -> Option<Self> {
        match token {
            "&" => Some(Self::And),
            "|" => Some(Self::Or),
            "!" => Some(Self::Not),
            _ => None,
        }
    }

    pub fn token(self) -> &'static str {
        match self {
            Self::And => "&",
            Self::Or => "|",
            Self::Not => "!",
        }
    }

    fn arity(self) -> usize {
        match self {
            Self::Not => 1,
            Self::And | Self::Or => 2,
        }
    }
}

/// One domain term
#[derive(Debug, Clone, PartialEq)]
pub enum DomainTerm {
    Operator(LogicalOp),
    /// `[field, operator, value]`; `field` is kept as sent so the constant
    /// leaves `[1, "=", 1]` and `[0, "=", 1]` pass through untouched
    Leaf {
        field: Value,
        operator: String,
        value: Value,
    },
}

impl DomainTerm {
    fn to_value(&self) -> Value {
        match self {
            Self::Operator(op) => Value::String(op.token().to_string()),
            Self::Leaf {
                field,
                operator,
                value,
            } => Value::Array(vec![
                field.clone(),
                Value::String(operator.clone()),
                value.clone(),
            ]),
        }
    }
}

/// Structurally valid domain filter
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Domain {
    terms: Vec<DomainTerm>,
}

impl Domain {
    /// Empty domain, matches every record
    pub fn all() -> Self {
        Self::default()
    }

    /// Validate a JSON domain; `null` is the empty domain
    pub fn parse(raw: &Value) -> Result<Self> {
        let items = match raw {
            Value::Null => return Ok(Self::all()),
            Value::Array(items) => items,
            other => {
                return Err(OdooError::validation(format!(
                    "domain must be a list, got {}",
                    json_kind(other)
                )))
            }
        };

        let terms = items
            .iter()
            .enumerate()
            .map(|(index, item)| parse_term(index, item))
            .collect::<Result<Vec<_>>>()?;

        check_arity(&terms)?;
        Ok(Self { terms })
    }

    /// Single-leaf domain, e.g. `[["model", "=", "res.partner"]]`
    pub fn leaf(field: &str, operator: &str, value: impl Into<Value>) -> Self {
        Self {
            terms: vec![DomainTerm::Leaf {
                field: Value::String(field.to_string()),
                operator: operator.to_string(),
                value: value.into(),
            }],
        }
    }

    pub fn terms(&self) -> &[DomainTerm] {
        &self.terms
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    /// JSON form, identical to the accepted input
    pub fn to_value(&self) -> Value {
        Value::Array(self.terms.iter().map(DomainTerm::to_value).collect())
    }
}

impl Serialize for Domain {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        self.to_value().serialize(serializer)
    }
}

fn parse_term(index: usize, item: &Value) -> Result<DomainTerm> {
    match item {
        Value::String(token) => LogicalOp::parse(token)
            .map(DomainTerm::Operator)
            .ok_or_else(|| {
                OdooError::validation(format!(
                    "domain term {}: unknown logical operator '{}' (expected '&', '|' or '!')",
                    index, token
                ))
            }),
        Value::Array(parts) if parts.len() == 3 => {
            let field = match &parts[0] {
                Value::String(name) if !name.trim().is_empty() => parts[0].clone(),
                Value::Number(n) if n.as_i64() == Some(0) || n.as_i64() == Some(1) => {
                    parts[0].clone()
                }
                other => {
                    return Err(OdooError::validation(format!(
                        "domain term {}: field must be a non-empty string, got {}",
                        index,
                        json_kind(other)
                    )))
                }
            };
            let operator = match &parts[1] {
                Value::String(op) if !op.trim().is_empty() => op.clone(),
                other => {
                    return Err(OdooError::validation(format!(
                        "domain term {}: operator must be a non-empty string, got {}",
                        index,
                        json_kind(other)
                    )))
                }
            };
            Ok(DomainTerm::Leaf {
                field,
                operator,
                value: parts[2].clone(),
            })
        }
        Value::Array(parts) => Err(OdooError::validation(format!(
            "domain term {}: comparison needs exactly 3 elements [field, operator, value], got {}",
            index,
            parts.len()
        ))),
        other => Err(OdooError::validation(format!(
            "domain term {}: expected a logical operator or [field, operator, value], got {}",
            index,
            json_kind(other)
        ))),
    }
}

/// Walk right to left counting complete expressions; every operator must
/// find enough operands to its right.
fn check_arity(terms: &[DomainTerm]) -> Result<()> {
    let mut available = 0usize;
    for (index, term) in terms.iter().enumerate().rev() {
        match term {
            DomainTerm::Leaf { .. } => available += 1,
            DomainTerm::Operator(op) => {
                let needed = op.arity();
                if available < needed {
                    return Err(OdooError::validation(format!(
                        "domain term {}: operator '{}' needs {} operand(s), found {}",
                        index,
                        op.token(),
                        needed,
                        available
                    )));
                }
                available = available - needed + 1;
            }
        }
    }
    Ok(())
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a list",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::json;

    #[test]
    fn null_and_empty_are_match_all() {
        assert!(Domain::parse(&Value::Null).unwrap().is_empty());
        assert!(Domain::parse(&json!([])).unwrap().is_empty());
    }

    #[test]
    fn passes_through_unchanged() {
        let raw = json!([
            "|",
            ["name", "ilike", "acme"],
            "!",
            ["customer_rank", ">", 0],
            ["country_id.code", "in", ["FR", "BE"]],
            [1, "=", 1]
        ]);
        let domain = Domain::parse(&raw).unwrap();
        assert_eq!(domain.terms().len(), 6);
        assert_eq!(domain.to_value(), raw);
        assert_eq!(serde_json::to_value(&domain).unwrap(), raw);
    }

    #[test]
    fn operators_are_not_rewritten() {
        // unknown comparison operators are the server's business
        let raw = json!([["name", "fuzzy~", "x"]]);
        assert_eq!(Domain::parse(&raw).unwrap().to_value(), raw);
    }

    #[test]
    fn rejects_two_element_comparison() {
        let err = Domain::parse(&json!([["name", "acme"]])).unwrap_err();
        assert!(matches!(err, OdooError::Validation(_)));
        assert!(err.to_string().contains("exactly 3 elements"));
    }

    #[test]
    fn rejects_bad_shapes() {
        for raw in [
            json!({"name": "acme"}),
            json!("name = acme"),
            json!([42]),
            json!(["OR", ["a", "=", 1], ["b", "=", 2]]),
            json!([["", "=", 1]]),
            json!([["name", 5, 1]]),
            json!([[2, "=", 1]]),
        ] {
            assert!(
                matches!(Domain::parse(&raw), Err(OdooError::Validation(_))),
                "accepted {}",
                raw
            );
        }
    }

    #[test]
    fn rejects_dangling_operators() {
        assert!(Domain::parse(&json!(["|", ["a", "=", 1]])).is_err());
        assert!(Domain::parse(&json!(["!"])).is_err());
        assert!(Domain::parse(&json!([["a", "=", 1], "&"])).is_err());
        assert!(Domain::parse(&json!(["&", "|", ["a", "=", 1], ["b", "=", 2]])).is_err());
        assert!(Domain::parse(&json!(["&", "|", ["a", "=", 1], ["b", "=", 2], ["c", "=", 3]])).is_ok());
    }

    #[test]
    fn leaf_builder() {
        assert_eq!(
            Domain::leaf("model", "=", "res.partner").to_value(),
            json!([["model", "=", "res.partner"]])
        );
    }

    fn arb_json() -> impl Strategy<Value = Value> {
        let leaf = prop_oneof![
            Just(Value::Null),
            any::<bool>().prop_map(Value::Bool),
            any::<i32>().prop_map(Value::from),
            "[a-z|&!=]{0,6}".prop_map(Value::String),
        ];
        leaf.prop_recursive(3, 24, 4, |inner| {
            prop::collection::vec(inner, 0..5).prop_map(Value::Array)
        })
    }

    proptest! {
        #[test]
        fn parse_never_panics_and_round_trips(raw in arb_json()) {
            if let Ok(domain) = Domain::parse(&raw) {
                let expected = if raw.is_null() { json!([]) } else { raw.clone() };
                prop_assert_eq!(domain.to_value(), expected);
            }
        }
    }
}
