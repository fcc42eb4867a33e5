use std::fmt;

use serde::{Deserialize, Serialize};

use super::model::{CellValue, Dataset, Record};
use super::normalize::ColumnBinding;

/// How many of the league's best-paid players the top-N filter removes.
pub const TOP_EARNER_COUNT: usize = 10;

// ---------------------------------------------------------------------------
// User-facing controls
// ---------------------------------------------------------------------------

/// Which categorical column partitions the records.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum GroupBy {
    #[default]
    Team,
    Position,
}

impl GroupBy {
    pub const ALL: [GroupBy; 2] = [GroupBy::Team, GroupBy::Position];

    /// The group-key cell of `record` under this grouping.
    pub fn key_of<'r>(
        &self,
        binding: &ColumnBinding,
        record: &'r Record,
    ) -> Option<&'r CellValue> {
        match self {
            GroupBy::Team => binding.team_of(record),
            GroupBy::Position => binding.position_of(record),
        }
    }

    /// Capitalised unit name used in headers and axis titles.
    pub fn label(&self) -> &'static str {
        match self {
            GroupBy::Team => "Team",
            GroupBy::Position => "Position",
        }
    }
}

impl fmt::Display for GroupBy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GroupBy::Team => f.write_str("team"),
            GroupBy::Position => f.write_str("position"),
        }
    }
}

/// Which records are removed before the distributions are drawn.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FilterMode {
    /// Keep everything.
    #[default]
    None,
    /// Drop values outside each group's IQR fences.
    GroupOutliers,
    /// Drop the league-wide top earners before grouping.
    #[serde(rename = "top10")]
    TopTenExcluded,
}

impl FilterMode {
    pub const ALL: [FilterMode; 3] = [
        FilterMode::None,
        FilterMode::GroupOutliers,
        FilterMode::TopTenExcluded,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            FilterMode::None => "Show all data",
            FilterMode::GroupOutliers => "Exclude outliers within each group",
            FilterMode::TopTenExcluded => "Exclude the league's top 10 earners",
        }
    }
}

/// The two controls that drive every analysis run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisConfig {
    pub group_by: GroupBy,
    pub filter: FilterMode,
}

impl AnalysisConfig {
    /// One-line explanation of what the chart currently shows.
    pub fn describe(&self) -> String {
        let unit = self.group_by;
        let mut text = format!("Showing salaries by {unit} as box plots.");
        match self.filter {
            FilterMode::None => text.push_str(" All data, outliers included."),
            FilterMode::GroupOutliers => text.push_str(&format!(
                " Within each {unit}, values outside the IQR fences are excluded."
            )),
            FilterMode::TopTenExcluded => text.push_str(&format!(
                " The league's top {TOP_EARNER_COUNT} earners are removed first."
            )),
        }
        text
    }
}

// ---------------------------------------------------------------------------
// Top-earner selection
// ---------------------------------------------------------------------------

/// A record index with its parsed salary.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RankedSalary {
    pub index: usize,
    pub salary: f64,
}

/// The `n` best-paid records across the whole dataset, highest first.
///
/// Independent of any grouping. Records whose salary does not parse are
/// ignored; equal salaries keep their sheet order.
pub fn top_earners(dataset: &Dataset, binding: &ColumnBinding, n: usize) -> Vec<RankedSalary> {
    let mut ranked: Vec<RankedSalary> = dataset
        .records
        .iter()
        .enumerate()
        .filter_map(|(index, record)| {
            binding
                .salary_of(record)
                .map(|salary| RankedSalary { index, salary })
        })
        .collect();
    ranked.sort_by(|a, b| b.salary.total_cmp(&a.salary));
    ranked.truncate(n);
    ranked
}
