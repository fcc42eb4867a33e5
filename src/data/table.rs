use super::analysis::{HighlightEntry, HighlightMarker, Highlights};
use super::filter::GroupBy;
use super::model::Dataset;

/// A renderer-agnostic table: header labels and rows of cell text.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TableView {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl TableView {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Every row of the dataset, with the first non-empty record's fields as
/// columns. Cells a record lacks are left blank.
pub fn preview_table(dataset: &Dataset) -> TableView {
    let headers = dataset.column_names();
    let rows = dataset
        .records
        .iter()
        .map(|record| {
            headers
                .iter()
                .map(|h| record.get(h).map(|v| v.to_string()).unwrap_or_default())
                .collect()
        })
        .collect();
    TableView { headers, rows }
}

/// The secondary table for the current filter, or `None` when the filter
/// lists nothing.
pub fn highlight_table(highlights: &Highlights, group_by: GroupBy) -> Option<TableView> {
    let first = match highlights {
        Highlights::Disabled => return None,
        Highlights::Outliers(_) => group_by.label(),
        Highlights::TopEarners(_) => "Rank",
    };
    let headers = [first, "Player", "Team", "Position", "Salary"]
        .into_iter()
        .map(str::to_string)
        .collect();
    let rows = highlights.entries().iter().map(highlight_row).collect();
    Some(TableView { headers, rows })
}

fn highlight_row(entry: &HighlightEntry) -> Vec<String> {
    let marker = match &entry.marker {
        HighlightMarker::Group(label) => label.to_string(),
        HighlightMarker::Rank(rank) => rank.to_string(),
    };
    vec![
        marker,
        entry.name.clone(),
        entry.team.to_string(),
        entry.position.to_string(),
        entry.salary.to_string(),
    ]
}

/// Explanatory line shown above the highlight table.
pub fn highlight_note(highlights: Option<&Highlights>, group_by: GroupBy) -> String {
    match highlights {
        None => "No data loaded.".to_string(),
        Some(Highlights::Disabled) => {
            "Players are listed here when outliers or the top 10 earners are excluded.".to_string()
        }
        Some(Highlights::Outliers(_)) => {
            format!("Players flagged as IQR outliers within their {group_by}.")
        }
        Some(Highlights::TopEarners(_)) => "The league's 10 highest salaries.".to_string(),
    }
}
