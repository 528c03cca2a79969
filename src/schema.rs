//! Static questionnaire schema: the validation plan, the coded-column
//! rename map and the per-column value recode maps.
//!
//! The tables are process-wide constants, built and verified once on
//! first use. Construction fails fast on a rename collision or a
//! malformed recode map instead of silently overwriting column data.

use std::collections::HashMap;

use once_cell::sync::OnceCell;

use crate::error::{CleanerError, Result};
use crate::pipeline::validate::Domain;

/// Column that uniquely identifies a respondent; keys diagnostic reports.
pub const ID_COLUMN: &str = "ID";

/// One step of the validation plan, applied in declaration order.
#[derive(Debug, Clone)]
pub enum ValidationStep {
    /// Ordinary domain check with mode repair.
    Columns {
        columns: &'static [&'static str],
        domain: Domain,
    },
    /// Domain check gated on a yes/no companion column.
    Gated {
        target: &'static str,
        gate: &'static str,
        domain: Domain,
    },
}

/// The verified questionnaire schema.
pub struct SurveySchema {
    pub steps: Vec<ValidationStep>,
    pub renames: HashMap<&'static str, &'static str>,
    pub recodes: HashMap<&'static str, HashMap<i64, &'static str>>,
}

static SCHEMA: OnceCell<SurveySchema> = OnceCell::new();

/// The questionnaire schema, built and verified once per process.
pub fn survey_schema() -> Result<&'static SurveySchema> {
    SCHEMA.get_or_try_init(SurveySchema::build)
}

/// Income-source indicators plus the behavioral flags, all coded 1/0.
const BINARY_CODED_COLUMNS: &[&str] = &[
    "Q8_1",
    "Q8_2",
    "Q8_3",
    "Q8_4",
    "Q8_5",
    "Q8_6",
    "Q8_7",
    "Q8_8",
    "Q8_9",
    "Q8_10",
    "Q8_11",
    "mobile_money",
    "savings",
    "borrowing",
    "insurance",
];

/// Yes/no questions coded 1/2.
const ONE_TWO_CODED_COLUMNS: &[&str] = &["Q6", "Q7", "Q12", "Q14"];

fn validation_steps() -> Vec<ValidationStep> {
    use ValidationStep::{Columns, Gated};

    vec![
        Columns {
            columns: &["Q3"],
            domain: Domain::range(1, 4),
        },
        Columns {
            columns: BINARY_CODED_COLUMNS,
            domain: Domain::range(0, 1),
        },
        Columns {
            columns: ONE_TWO_CODED_COLUMNS,
            domain: Domain::range(1, 2),
        },
        Columns {
            columns: &["Q4"],
            domain: Domain::range(1, 7),
        },
        Columns {
            columns: &["Q5"],
            domain: Domain::range(1, 6),
        },
        Columns {
            columns: &["Q13", "Q15"],
            domain: Domain::with_not_applicable(0, 6),
        },
        Columns {
            columns: &["Q16", "Q17"],
            domain: Domain::with_not_applicable(0, 5),
        },
        Columns {
            columns: &["Q18", "Q19"],
            domain: Domain::range(0, 5),
        },
        // Employment type only means something for respondents who said
        // they earn salaries/wages, so it is gated on Q8_1
        Gated {
            target: "Q9",
            gate: "Q8_1",
            domain: Domain::with_not_applicable(1, 7),
        },
        Columns {
            columns: &["Q10"],
            domain: Domain::with_not_applicable(1, 10),
        },
        Columns {
            columns: &["Q11"],
            domain: Domain::with_not_applicable(1, 12),
        },
        Columns {
            columns: &["mobile_money_classification"],
            domain: Domain::range(0, 3),
        },
    ]
}

const COLUMN_RENAMES: &[(&str, &str)] = &[
    ("ID", "User ID"),
    ("Q1", "Age"),
    ("Q2", "Gender"),
    ("Q3", "Marital status"),
    ("Q4", "Highest level of education completed?"),
    ("Q5", "Ownership of land/plot"),
    ("Q6", "Ownership of land with certificates"),
    ("Q7", "Ownership of mobile phone"),
    ("Q8_1", "Salaries/wages"),
    ("Q8_2", "Trading/selling produce"),
    ("Q8_3", "Service providing income"),
    ("Q8_4", "Piece work/Casual labor"),
    ("Q8_5", "Rental income"),
    ("Q8_6", "Interest from savings/investments"),
    ("Q8_7", "Pension"),
    ("Q8_8", "Social welfare grant"),
    ("Q8_9", "Receive money from others"),
    ("Q8_10", "Expenses covered by others"),
    ("Q8_11", "Other income"),
    ("Q9", "Employment type"),
    ("Q10", "Main items sold"),
    ("Q11", "Main services provided"),
    ("Q12", "Sent money in last 12 months?"),
    ("Q13", "Last time sent money"),
    ("Q14", "Received money in last 12 months?"),
    ("Q15", "Last time received money"),
    ("Q16", "Frequency of mobile money usage for purchases"),
    ("Q17", "Frequency of mobile money usage for bill payment"),
    ("Q18", "Literacy in Kiswahili"),
    ("Q19", "Literacy in English"),
    ("mobile_money", "Use of mobile money"),
    ("savings", "Savings behavior"),
    ("borrowing", "Borrowing behavior"),
    ("insurance", "Insurance ownership"),
    ("mobile_money_classification", "Mobile money classification"),
];

const YES_NO: &[(i64, &str)] = &[(1, "Yes"), (0, "No")];
const YES_NO_ONE_TWO: &[(i64, &str)] = &[(1, "Yes"), (2, "No")];

const MONEY_RECENCY: &[(i64, &str)] = &[
    (-1, "Not applicable"),
    (1, "Yesterday/today"),
    (2, "In the past 7 days"),
    (3, "In the past 30 days"),
    (4, "In the past 90 days"),
    (5, "More than 90 days ago but less than 6 months ago"),
    (6, "6 months or longer ago"),
];

const USAGE_FREQUENCY: &[(i64, &str)] = &[
    (-1, "Not applicable"),
    (1, "Never"),
    (2, "Daily"),
    (3, "Weekly"),
    (4, "Monthly"),
    (5, "Less often than monthly"),
];

const LITERACY: &[(i64, &str)] = &[
    (1, "Can read and write"),
    (2, "Can read only"),
    (3, "Can write only"),
    (4, "Can neither read nor write"),
    (5, "Refused to read"),
];

const VALUE_RECODES: &[(&str, &[(i64, &str)])] = &[
    ("Gender", &[(1, "Male"), (2, "Female")]),
    (
        "Marital status",
        &[
            (1, "Married"),
            (2, "Divorced"),
            (3, "Widowed"),
            (4, "Single/never married"),
        ],
    ),
    (
        "Highest level of education completed?",
        &[
            (1, "No formal education"),
            (2, "Some primary"),
            (3, "Primary completed"),
            (4, "Post primary technical training"),
            (5, "Some secondary"),
            (6, "University or other higher education"),
            (7, "Do not know"),
        ],
    ),
    (
        "Ownership of land/plot",
        &[
            (1, "You personally own the land/plot where you live"),
            (2, "You own the land/plot together with someone else"),
            (3, "A household member owns the land/plot"),
            (4, "The land/plot is rented"),
            (5, "You do not own or rent the land"),
            (6, "Do not know"),
        ],
    ),
    ("Ownership of land with certificates", YES_NO_ONE_TWO),
    ("Ownership of mobile phone", YES_NO_ONE_TWO),
    ("Salaries/wages", YES_NO),
    ("Trading/selling produce", YES_NO),
    ("Service providing income", YES_NO),
    ("Piece work/Casual labor", YES_NO),
    ("Rental income", YES_NO),
    ("Interest from savings/investments", YES_NO),
    ("Pension", YES_NO),
    ("Social welfare grant", YES_NO),
    ("Receive money from others", YES_NO),
    ("Expenses covered by others", YES_NO),
    ("Other income", YES_NO),
    (
        "Employment type",
        &[
            (-1, "Not applicable"),
            (1, "Government"),
            (2, "Private company/business"),
            (3, "Individual who owns his own business"),
            (4, "Small scale farmer"),
            (5, "Commercial farmer"),
            (6, "Work for individual/household e.g. security guard, maid etc."),
            (7, "Other"),
        ],
    ),
    (
        "Main items sold",
        &[
            (-1, "Not applicable"),
            (1, "Crops/produce I grow"),
            (2, "Products I get from livestock"),
            (3, "Livestock"),
            (4, "Fish you catch yourself/aquaculture"),
            (5, "Things you buy from others - agricultural products"),
            (6, "Things you buy from others - non-agricultural products"),
            (7, "Things you make (clothes, art, crafts)"),
            (8, "Things you collect from nature (stones, sand, thatch, herbs)"),
            (9, "Things you process (honey, dairy products, flour)"),
            (10, "Other"),
        ],
    ),
    (
        "Main services provided",
        &[
            (-1, "Not applicable"),
            (1, "Personal services (hairdressers, massage, etc.)"),
            (2, "Telecommunications/IT"),
            (3, "Financial services"),
            (4, "Transport"),
            (5, "Hospitality /Accommodation, restaurants, etc."),
            (6, "Information/research"),
            (7, "Technical - mechanic, etc."),
            (8, "Educational/child care"),
            (9, "Health services - traditional healer etc."),
            (10, "Legal services"),
            (11, "Security"),
            (12, "Other, specify"),
        ],
    ),
    ("Sent money in last 12 months?", YES_NO_ONE_TWO),
    ("Last time sent money", MONEY_RECENCY),
    ("Received money in last 12 months?", YES_NO_ONE_TWO),
    ("Last time received money", MONEY_RECENCY),
    ("Frequency of mobile money usage for purchases", USAGE_FREQUENCY),
    (
        "Frequency of mobile money usage for bill payment",
        USAGE_FREQUENCY,
    ),
    ("Literacy in Kiswahili", LITERACY),
    ("Literacy in English", LITERACY),
    ("Use of mobile money", YES_NO),
    ("Savings behavior", YES_NO),
    ("Borrowing behavior", YES_NO),
    ("Insurance ownership", YES_NO),
    (
        "Mobile money classification",
        &[
            (0, "Does not use any financial service"),
            (1, "Does not use mobile money"),
            (2, "Uses mobile money only"),
            (3, "Uses both"),
        ],
    ),
];

impl SurveySchema {
    fn build() -> Result<Self> {
        let renames = build_renames(COLUMN_RENAMES)?;
        let recodes = build_recodes(VALUE_RECODES, &renames)?;

        Ok(Self {
            steps: validation_steps(),
            renames,
            recodes,
        })
    }
}

/// Build the rename map, rejecting duplicate sources and duplicate
/// targets. A duplicate target would silently merge two columns during
/// the rename pass.
fn build_renames(
    pairs: &[(&'static str, &'static str)],
) -> Result<HashMap<&'static str, &'static str>> {
    let mut renames = HashMap::new();
    let mut targets: HashMap<&str, &str> = HashMap::new();

    for &(code, label) in pairs {
        if let Some(previous) = targets.insert(label, code) {
            return Err(CleanerError::Config(format!(
                "rename collision: '{previous}' and '{code}' both map to '{label}'"
            )));
        }
        if renames.insert(code, label).is_some() {
            return Err(CleanerError::Config(format!(
                "duplicate rename source '{code}'"
            )));
        }
    }

    Ok(renames)
}

/// Build the per-column value maps, rejecting duplicate codes and maps
/// that target a column name the rename pass will never produce.
fn build_recodes(
    tables: &[(&'static str, &'static [(i64, &'static str)])],
    renames: &HashMap<&'static str, &'static str>,
) -> Result<HashMap<&'static str, HashMap<i64, &'static str>>> {
    let mut recodes = HashMap::new();

    for &(column, entries) in tables {
        if !renames.values().any(|&label| label == column) {
            return Err(CleanerError::Config(format!(
                "recode map targets unknown column '{column}'"
            )));
        }

        let mut value_map = HashMap::new();
        for &(code, label) in entries {
            if value_map.insert(code, label).is_some() {
                return Err(CleanerError::Config(format!(
                    "duplicate recode key {code} for column '{column}'"
                )));
            }
        }

        if recodes.insert(column, value_map).is_some() {
            return Err(CleanerError::Config(format!(
                "duplicate recode map for column '{column}'"
            )));
        }
    }

    Ok(recodes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_builds_cleanly() {
        let schema = survey_schema().unwrap();

        assert_eq!(schema.renames.len(), 35);
        assert_eq!(schema.renames["Q3"], "Marital status");
        assert_eq!(schema.recodes["Mobile money classification"].len(), 4);
        assert_eq!(
            schema.recodes["Mobile money classification"][&3],
            "Uses both"
        );
    }

    #[test]
    fn test_every_recode_column_is_a_rename_target() {
        let schema = survey_schema().unwrap();
        for column in schema.recodes.keys() {
            assert!(
                schema.renames.values().any(|label| label == column),
                "recode map for '{column}' has no matching rename target"
            );
        }
    }

    #[test]
    fn test_rename_collision_is_rejected() {
        let err = build_renames(&[("Q1", "Age"), ("Q2", "Age")]).unwrap_err();
        assert!(matches!(err, CleanerError::Config(_)));
    }

    #[test]
    fn test_duplicate_recode_key_is_rejected() {
        let renames = build_renames(&[("Q2", "Gender")]).unwrap();
        let err =
            build_recodes(&[("Gender", &[(1, "Male"), (1, "Female")])], &renames).unwrap_err();
        assert!(matches!(err, CleanerError::Config(_)));
    }

    #[test]
    fn test_recode_for_unknown_column_is_rejected() {
        let renames = build_renames(&[("Q2", "Gender")]).unwrap();
        let err = build_recodes(&[("Age", &[(1, "Young")])], &renames).unwrap_err();
        assert!(matches!(err, CleanerError::Config(_)));
    }
}
