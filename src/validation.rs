//! Partner field schema and submission validation.
//!
//! The schema is a static table of [`FieldSpec`]s. Validation walks the table in
//! order, collects every violation, and keeps only schema fields so unknown keys
//! never reach the partner.

use regex::Regex;
use serde_json::{Map, Value};
use std::sync::LazyLock;

use crate::models::{FieldError, LeadSubmission, BANK_MONTHS, SUB_ID3};

/// RFC 5322 simplified, with at least one dot in the domain.
static EMAIL_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^[a-zA-Z0-9.!#$%&'*+/=?^_`{|}~-]+@[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?(?:\.[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?)+$",
    )
    .expect("email regex is valid")
});

static DATE_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9]{4}-[0-9]{2}-[0-9]{2}$").expect("date regex is valid"));

/// Constraint applied to a single field's value.
#[derive(Debug, Clone, Copy)]
pub enum Rule {
    /// String with at least `min` characters.
    Text { min: usize },
    /// String of exactly this many characters.
    Exact(usize),
    Email,
    /// String shaped `YYYY-MM-DD`.
    Date,
    /// String from a closed set, case-sensitive.
    OneOf(&'static [&'static str]),
    /// Integral JSON number within `min..=max`.
    Integer { min: i64, max: i64 },
    /// String or number, kept as sent.
    TextOrNumber,
}

#[derive(Debug, Clone, Copy)]
pub struct FieldSpec {
    pub name: &'static str,
    pub rule: Rule,
    pub required: bool,
}

const fn required(name: &'static str, rule: Rule) -> FieldSpec {
    FieldSpec {
        name,
        rule,
        required: true,
    }
}

const fn optional(name: &'static str, rule: Rule) -> FieldSpec {
    FieldSpec {
        name,
        rule,
        required: false,
    }
}

const TEXT: Rule = Rule::Text { min: 1 };
const ANY_TEXT: Rule = Rule::Text { min: 0 };
const STATE: Rule = Rule::Exact(2);
const PHONE: Rule = Rule::Text { min: 10 };
const YEARS: Rule = Rule::Integer { min: 0, max: 127 };
const MONTHS: Rule = Rule::Integer { min: 0, max: 11 };

pub const OWN_RENT: &[&str] = &["own", "rent"];
pub const INCOME_SOURCES: &[&str] = &["EMPLOYMENT", "BENEFITS"];
pub const PAY_METHODS: &[&str] = &["DIRECT_DEPOSIT", "PAPER_CHECK"];
pub const PAY_PERIODS: &[&str] = &["WEEKLY", "BI_WEEKLY", "SEMI_MONTHLY", "MONTHLY"];
pub const BANK_ACCOUNT_TYPES: &[&str] = &["CHECKING", "SAVINGS"];
pub const GENDERS: &[&str] = &["MALE", "FEMALE"];

/// The partner's lead schema, in reporting order.
pub const LEAD_SCHEMA: &[FieldSpec] = &[
    // Campaign
    required("campaignID", Rule::Integer { min: 0, max: i64::MAX }),
    required("ipAddress", TEXT),
    required("sourceURL", TEXT),
    required("minPrice", Rule::TextOrNumber),
    // Identity
    required("firstName", TEXT),
    required("lastName", TEXT),
    required("address", TEXT),
    optional("address2", ANY_TEXT),
    required("city", TEXT),
    required("state", STATE),
    required("zipCode", Rule::Text { min: 5 }),
    required("ssn", Rule::Exact(9)),
    required("dateOfBirth", Rule::Date),
    required("licenseNumber", TEXT),
    required("licenseState", STATE),
    optional("gender", Rule::OneOf(GENDERS)),
    // Contact
    required("homePhone", PHONE),
    required("workPhone", PHONE),
    required("cellPhone", PHONE),
    required("email", Rule::Email),
    // Residence
    required("ownRent", Rule::OneOf(OWN_RENT)),
    required("addressYears", YEARS),
    required("addressMonths", MONTHS),
    // Employment
    required("employerName", TEXT),
    required("employerState", STATE),
    required("employmentYears", YEARS),
    required("employmentMonths", MONTHS),
    required("monthlyIncome", Rule::TextOrNumber),
    required("incomeSource", Rule::OneOf(INCOME_SOURCES)),
    // Banking
    required("bankName", TEXT),
    required("bankAccountNumber", TEXT),
    required("bankRoutingNumber", TEXT),
    required("bankAccountType", Rule::OneOf(BANK_ACCOUNT_TYPES)),
    required("payMethod", Rule::OneOf(PAY_METHODS)),
    required("payPeriod", Rule::OneOf(PAY_PERIODS)),
    required("firstPayDate", Rule::Date),
    required("secondPayDate", Rule::Date),
    // Loan
    required("loanAmount", Rule::TextOrNumber),
    required("activeMilitary", Rule::TextOrNumber),
    // References
    optional("reference1Name", ANY_TEXT),
    optional("reference1Phone", ANY_TEXT),
    optional("reference1Relationship", ANY_TEXT),
    optional("reference2Name", ANY_TEXT),
    optional("reference2Phone", ANY_TEXT),
    optional("reference2Relationship", ANY_TEXT),
    // Sub-tracking
    optional("subID", ANY_TEXT),
    optional("subID2", ANY_TEXT),
    optional(SUB_ID3, Rule::TextOrNumber),
    optional("subID4", ANY_TEXT),
    optional("subID5", ANY_TEXT),
    optional("subID6", ANY_TEXT),
    optional("subID7", ANY_TEXT),
    optional("subID8", ANY_TEXT),
    optional("subID9", ANY_TEXT),
    optional("subID10", ANY_TEXT),
    optional("subIDBig", ANY_TEXT),
    optional(BANK_MONTHS, Rule::TextOrNumber),
];

/// Validates a raw request body against [`LEAD_SCHEMA`].
///
/// Returns every violation found, or the submission restricted to schema fields.
/// A JSON `null` on an optional field counts as absent.
pub fn validate_submission(body: &Value) -> Result<LeadSubmission, Vec<FieldError>> {
    let Some(object) = body.as_object() else {
        return Err(vec![FieldError::new("", "expected a JSON object")]);
    };

    let mut errors = Vec::new();
    let mut fields = Map::new();

    for spec in LEAD_SCHEMA {
        match object.get(spec.name) {
            None | Some(Value::Null) if !spec.required => {}
            None | Some(Value::Null) => errors.push(FieldError::new(spec.name, "is required")),
            Some(value) => match check_rule(spec.rule, value) {
                Ok(()) => {
                    fields.insert(spec.name.to_string(), value.clone());
                }
                Err(message) => errors.push(FieldError::new(spec.name, message)),
            },
        }
    }

    if !is_present(object, SUB_ID3) && !is_present(object, BANK_MONTHS) {
        errors.push(FieldError::new(
            BANK_MONTHS,
            "is required when subID3 is not provided",
        ));
    }

    if errors.is_empty() {
        Ok(LeadSubmission::from_fields(fields))
    } else {
        Err(errors)
    }
}

fn is_present(object: &Map<String, Value>, field: &str) -> bool {
    matches!(object.get(field), Some(value) if !value.is_null())
}

fn check_rule(rule: Rule, value: &Value) -> Result<(), String> {
    match rule {
        Rule::Text { min } => {
            let text = expect_str(value)?;
            if text.chars().count() < min {
                return Err(if min == 1 {
                    "must not be empty".to_string()
                } else {
                    format!("must be at least {} characters", min)
                });
            }
            Ok(())
        }
        Rule::Exact(len) => {
            if expect_str(value)?.chars().count() != len {
                return Err(format!("must be exactly {} characters", len));
            }
            Ok(())
        }
        Rule::Email => {
            if !is_valid_email(expect_str(value)?) {
                return Err("must be a valid email address".to_string());
            }
            Ok(())
        }
        Rule::Date => {
            if !is_iso_date(expect_str(value)?) {
                return Err("must be a date in YYYY-MM-DD format".to_string());
            }
            Ok(())
        }
        Rule::OneOf(allowed) => {
            let text = expect_str(value)?;
            if !allowed.contains(&text) {
                return Err(format!("must be one of: {}", allowed.join(", ")));
            }
            Ok(())
        }
        Rule::Integer { min, max } => {
            let number = value
                .as_i64()
                .ok_or_else(|| "expected integer".to_string())?;
            if number < min || number > max {
                return Err(format!("must be between {} and {}", min, max));
            }
            Ok(())
        }
        Rule::TextOrNumber => match value {
            Value::String(_) | Value::Number(_) => Ok(()),
            _ => Err("expected string or number".to_string()),
        },
    }
}

fn expect_str(value: &Value) -> Result<&str, String> {
    value.as_str().ok_or_else(|| "expected string".to_string())
}

/// Syntactic email check: `local@domain.tld`.
pub fn is_valid_email(email: &str) -> bool {
    EMAIL_REGEX.is_match(email)
}

/// Shape-only check for `YYYY-MM-DD`; calendar validity is the partner's call.
pub fn is_iso_date(date: &str) -> bool {
    DATE_REGEX.is_match(date)
}
