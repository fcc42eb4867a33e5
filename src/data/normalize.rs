use std::fmt;

use thiserror::Error;

use super::model::{CellValue, Dataset, Record};

// ---------------------------------------------------------------------------
// Column roles
// ---------------------------------------------------------------------------

/// The logical meaning a sheet column can be bound to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ColumnRole {
    Team,
    Position,
    Salary,
    Name,
}

impl ColumnRole {
    pub const MANDATORY: [ColumnRole; 3] =
        [ColumnRole::Team, ColumnRole::Position, ColumnRole::Salary];
}

impl fmt::Display for ColumnRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ColumnRole::Team => "team",
            ColumnRole::Position => "position",
            ColumnRole::Salary => "salary",
            ColumnRole::Name => "player name",
        };
        f.write_str(s)
    }
}

/// Substrings that bind a field name to each role (case-insensitive).
#[derive(Debug, Clone)]
pub struct ColumnKeywords {
    pub team: Vec<String>,
    pub position: Vec<String>,
    pub salary: Vec<String>,
    pub name: Vec<String>,
}

impl Default for ColumnKeywords {
    fn default() -> Self {
        fn owned(words: &[&str]) -> Vec<String> {
            words.iter().map(|w| w.to_string()).collect()
        }
        Self {
            team: owned(&["team", "チーム"]),
            position: owned(&["position", "ポジション"]),
            salary: owned(&["salary", "年俸"]),
            name: owned(&["player name", "選手名"]),
        }
    }
}

impl ColumnKeywords {
    fn for_role(&self, role: ColumnRole) -> &[String] {
        match role {
            ColumnRole::Team => &self.team,
            ColumnRole::Position => &self.position,
            ColumnRole::Salary => &self.salary,
            ColumnRole::Name => &self.name,
        }
    }

    /// First field (in declaration order) whose name contains any keyword.
    fn find<'a>(&self, role: ColumnRole, fields: &[&'a str]) -> Option<&'a str> {
        let keywords: Vec<String> = self
            .for_role(role)
            .iter()
            .map(|k| k.to_lowercase())
            .collect();
        fields.iter().copied().find(|field| {
            let field = field.to_lowercase();
            keywords.iter().any(|k| field.contains(k.as_str()))
        })
    }
}

// ---------------------------------------------------------------------------
// Column binding
// ---------------------------------------------------------------------------

/// Which field of every record plays which role. Produced once per loaded
/// dataset and passed explicitly into every analysis call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnBinding {
    pub team: String,
    pub position: String,
    pub salary: String,
    pub name: Option<String>,
}

impl ColumnBinding {
    /// Display text of the record's name cell; empty when unbound or null.
    pub fn name_of(&self, record: &Record) -> String {
        self.name
            .as_deref()
            .and_then(|col| record.get(col))
            .map(|v| v.to_string())
            .unwrap_or_default()
    }

    pub fn team_of<'r>(&self, record: &'r Record) -> Option<&'r CellValue> {
        record.get(&self.team)
    }

    pub fn position_of<'r>(&self, record: &'r Record) -> Option<&'r CellValue> {
        record.get(&self.position)
    }

    pub fn salary_of(&self, record: &Record) -> Option<f64> {
        record.get(&self.salary).and_then(parse_salary)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("no column found for {}; columns in sheet: [{}]", join(.missing), .found.join(", "))]
pub struct MissingColumnError {
    /// Mandatory roles that no field matched.
    pub missing: Vec<ColumnRole>,
    /// Field names that were inspected, in declaration order.
    pub found: Vec<String>,
}

fn join(roles: &[ColumnRole]) -> String {
    roles
        .iter()
        .map(|r| format!("'{r}'"))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Bind the four roles to field names of the first non-empty record.
///
/// Team, position and salary are mandatory; a dataset without any non-empty
/// record reports all three missing. The name role is optional.
pub fn detect_columns(
    dataset: &Dataset,
    keywords: &ColumnKeywords,
) -> Result<ColumnBinding, MissingColumnError> {
    let fields: Vec<&str> = dataset
        .first_non_empty()
        .map(|r| r.keys().collect())
        .unwrap_or_default();

    let team = keywords.find(ColumnRole::Team, &fields);
    let position = keywords.find(ColumnRole::Position, &fields);
    let salary = keywords.find(ColumnRole::Salary, &fields);
    let name = keywords.find(ColumnRole::Name, &fields);

    match (team, position, salary) {
        (Some(team), Some(position), Some(salary)) => Ok(ColumnBinding {
            team: team.to_string(),
            position: position.to_string(),
            salary: salary.to_string(),
            name: name.map(str::to_string),
        }),
        _ => {
            let missing = ColumnRole::MANDATORY
                .into_iter()
                .zip([team, position, salary])
                .filter(|(_, found)| found.is_none())
                .map(|(role, _)| role)
                .collect();
            Err(MissingColumnError {
                missing,
                found: fields.iter().map(|f| f.to_string()).collect(),
            })
        }
    }
}

// ---------------------------------------------------------------------------
// Salary parsing
// ---------------------------------------------------------------------------

/// Interpret a raw cell as a salary.
///
/// Numbers pass through. Text keeps only ASCII digits and `.` (which drops
/// thousands separators, currency units and signs) and must then parse as a
/// float. Everything else, including `NaN`, is `None`.
pub fn parse_salary(value: &CellValue) -> Option<f64> {
    match value {
        CellValue::Integer(i) => Some(*i as f64),
        CellValue::Float(v) if !v.is_nan() => Some(*v),
        CellValue::String(s) => {
            let cleaned: String = s
                .chars()
                .filter(|c| c.is_ascii_digit() || *c == '.')
                .collect();
            cleaned.parse::<f64>().ok()
        }
        _ => None,
    }
}
