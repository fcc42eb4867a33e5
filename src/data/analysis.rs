use std::collections::{BTreeSet, HashMap};

use serde::Serialize;

use super::filter::{top_earners, AnalysisConfig, FilterMode, GroupBy, TOP_EARNER_COUNT};
use super::model::{CellValue, Dataset};
use super::normalize::ColumnBinding;
use super::stats::{median, sort_ascending, IqrBounds};

// ---------------------------------------------------------------------------
// Engine output
// ---------------------------------------------------------------------------

/// One box of the chart: a group label and its ascending salaries.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Distribution {
    pub label: CellValue,
    pub values: Vec<f64>,
    /// Used for ordering only.
    pub median: f64,
}

/// Why a record appears in the highlight table.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum HighlightMarker {
    /// Outlier inside the named group.
    Group(CellValue),
    /// 1-based league-wide salary rank.
    Rank(usize),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HighlightEntry {
    pub marker: HighlightMarker,
    pub name: String,
    pub team: CellValue,
    pub position: CellValue,
    pub salary: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "entries", rename_all = "snake_case")]
pub enum Highlights {
    /// `FilterMode::None`: nothing to list.
    Disabled,
    Outliers(Vec<HighlightEntry>),
    TopEarners(Vec<HighlightEntry>),
}

impl Highlights {
    pub fn entries(&self) -> &[HighlightEntry] {
        match self {
            Highlights::Disabled => &[],
            Highlights::Outliers(e) | Highlights::TopEarners(e) => e,
        }
    }
}

/// Result of one run of the engine for a given configuration.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Analysis {
    pub config: AnalysisConfig,
    /// Ordered by descending median; empty means "nothing left to draw".
    pub distributions: Vec<Distribution>,
    pub highlights: Highlights,
}

impl Analysis {
    /// Every group was filtered away (or nothing was valid to begin with).
    pub fn is_empty(&self) -> bool {
        self.distributions.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Grouping
// ---------------------------------------------------------------------------

struct Member {
    index: usize,
    salary: f64,
}

struct Group<'d> {
    key: &'d CellValue,
    members: Vec<Member>,
}

impl Group<'_> {
    fn sorted_salaries(&self) -> Vec<f64> {
        let mut values: Vec<f64> = self.members.iter().map(|m| m.salary).collect();
        sort_ascending(&mut values);
        values
    }
}

/// Partition contributing records by group key, in order of first appearance.
///
/// A record contributes when its key is present and non-blank, its salary
/// parses, and its index is not in `excluded`.
fn collect_groups<'d>(
    dataset: &'d Dataset,
    binding: &ColumnBinding,
    group_by: GroupBy,
    excluded: &BTreeSet<usize>,
) -> Vec<Group<'d>> {
    let mut groups: Vec<Group<'d>> = Vec::new();
    let mut slot_of: HashMap<&'d CellValue, usize> = HashMap::new();

    for (index, record) in dataset.records.iter().enumerate() {
        let Some(key) = group_by.key_of(binding, record).filter(|k| !k.is_blank()) else {
            log::trace!("row {index}: no {group_by} value, skipped");
            continue;
        };
        let Some(salary) = binding.salary_of(record) else {
            log::trace!("row {index}: salary does not parse, skipped");
            continue;
        };
        if excluded.contains(&index) {
            continue;
        }

        let slot = *slot_of.entry(key).or_insert_with(|| {
            groups.push(Group {
                key,
                members: Vec::new(),
            });
            groups.len() - 1
        });
        groups[slot].members.push(Member { index, salary });
    }
    groups
}

// ---------------------------------------------------------------------------
// Engine entry-point
// ---------------------------------------------------------------------------

/// Build the ordered distributions and the highlight list for one
/// grouping/filter combination. Never fails: unusable rows are skipped.
pub fn analyze(dataset: &Dataset, binding: &ColumnBinding, config: AnalysisConfig) -> Analysis {
    let top = match config.filter {
        FilterMode::TopTenExcluded => top_earners(dataset, binding, TOP_EARNER_COUNT),
        _ => Vec::new(),
    };
    let excluded: BTreeSet<usize> = top.iter().map(|r| r.index).collect();

    let groups = collect_groups(dataset, binding, config.group_by, &excluded);
    log::debug!(
        "{} {} groups ({} top earners excluded)",
        groups.len(),
        config.group_by,
        excluded.len()
    );

    let mut distributions: Vec<Distribution> = groups
        .iter()
        .filter_map(|group| {
            let mut values = group.sorted_salaries();
            if config.filter == FilterMode::GroupOutliers {
                if let Some(bounds) = IqrBounds::from_sorted(&values) {
                    values.retain(|v| bounds.contains(*v));
                }
            }
            if values.is_empty() {
                return None;
            }
            Some(Distribution {
                label: group.key.clone(),
                median: median(&values),
                values,
            })
        })
        .collect();

    // Highest median first; equal medians fall back to the label.
    distributions.sort_by(|a, b| {
        b.median
            .total_cmp(&a.median)
            .then_with(|| a.label.cmp(&b.label))
    });
    log::debug!("{} distributions after filtering", distributions.len());

    let highlights = match config.filter {
        FilterMode::None => Highlights::Disabled,
        FilterMode::GroupOutliers => {
            Highlights::Outliers(group_outliers(dataset, binding, &groups))
        }
        FilterMode::TopTenExcluded => Highlights::TopEarners(
            top.iter()
                .enumerate()
                .map(|(rank, r)| {
                    let marker = HighlightMarker::Rank(rank + 1);
                    entry(dataset, binding, r.index, r.salary, marker)
                })
                .collect(),
        ),
    };

    Analysis {
        config,
        distributions,
        highlights,
    }
}

/// Records outside their group's IQR fences, group by group in order of first
/// appearance, records in sheet order.
fn group_outliers(
    dataset: &Dataset,
    binding: &ColumnBinding,
    groups: &[Group<'_>],
) -> Vec<HighlightEntry> {
    let mut out = Vec::new();
    for group in groups {
        let Some(bounds) = IqrBounds::from_sorted(&group.sorted_salaries()) else {
            continue;
        };
        for m in group.members.iter().filter(|m| !bounds.contains(m.salary)) {
            out.push(entry(
                dataset,
                binding,
                m.index,
                m.salary,
                HighlightMarker::Group(group.key.clone()),
            ));
        }
    }
    out
}

fn entry(
    dataset: &Dataset,
    binding: &ColumnBinding,
    index: usize,
    salary: f64,
    marker: HighlightMarker,
) -> HighlightEntry {
    let record = &dataset.records[index];
    HighlightEntry {
        marker,
        name: binding.name_of(record),
        team: binding.team_of(record).cloned().unwrap_or(CellValue::Null),
        position: binding.position_of(record).cloned().unwrap_or(CellValue::Null),
        salary,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::Record;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    fn binding() -> ColumnBinding {
        ColumnBinding {
            team: "Team".into(),
            position: "Position".into(),
            salary: "Salary".into(),
            name: Some("Player Name".into()),
        }
    }

    fn row(name: &str, team: CellValue, position: &str, salary: CellValue) -> Record {
        [
            ("Player Name", CellValue::from(name)),
            ("Team", team),
            ("Position", CellValue::from(position)),
            ("Salary", salary),
        ]
        .into_iter()
        .collect()
    }

    fn config(group_by: GroupBy, filter: FilterMode) -> AnalysisConfig {
        AnalysisConfig { group_by, filter }
    }

    #[test]
    fn single_team_outlier_is_removed_and_listed() {
        let ds = Dataset::from_records(
            [100, 200, 300, 400, 10000]
                .iter()
                .enumerate()
                .map(|(i, s)| row(&format!("p{i}"), "A".into(), "P", CellValue::from(*s as i64)))
                .collect(),
        );
        let a = analyze(&ds, &binding(), config(GroupBy::Team, FilterMode::GroupOutliers));

        assert_eq!(
            a.distributions,
            vec![Distribution {
                label: "A".into(),
                values: vec![100.0, 200.0, 300.0, 400.0],
                median: 250.0,
            }]
        );
        assert_eq!(
            a.highlights,
            Highlights::Outliers(vec![HighlightEntry {
                marker: HighlightMarker::Group("A".into()),
                name: "p4".into(),
                team: "A".into(),
                position: "P".into(),
                salary: 10000.0,
            }])
        );
    }

    #[test]
    fn top_ten_scenario_removes_exactly_the_ranked_rows() {
        // 12 players, two teams, distinct salaries 100..=1200.
        let ds = Dataset::from_records(
            (1..=12_i64)
                .map(|i| {
                    let team = if i % 2 == 0 { "Even" } else { "Odd" };
                    row(&format!("p{i}"), team.into(), "P", CellValue::from(i * 100))
                })
                .collect(),
        );
        let a = analyze(&ds, &binding(), config(GroupBy::Team, FilterMode::TopTenExcluded));

        let entries = a.highlights.entries();
        assert_eq!(entries.len(), 10);
        assert_eq!(
            entries.iter().map(|e| e.marker.clone()).collect::<Vec<_>>(),
            (1..=10).map(HighlightMarker::Rank).collect::<Vec<_>>()
        );
        assert_eq!(entries[0].salary, 1200.0);
        assert_eq!(entries[9].salary, 300.0);

        assert_eq!(
            a.distributions,
            vec![
                Distribution {
                    label: "Even".into(),
                    values: vec![200.0],
                    median: 200.0,
                },
                Distribution {
                    label: "Odd".into(),
                    values: vec![100.0],
                    median: 100.0,
                },
            ]
        );
    }

    #[test]
    fn top_ten_does_not_depend_on_grouping() {
        let ds = Dataset::from_records(
            (1..=15_i64)
                .map(|i| {
                    let team = CellValue::String(format!("T{}", i % 3));
                    let position = if i < 8 { "C" } else { "P" };
                    row("", team, position, CellValue::from(i))
                })
                .collect(),
        );
        let by_team = analyze(
            &ds,
            &binding(),
            config(GroupBy::Team, FilterMode::TopTenExcluded),
        );
        let by_pos = analyze(
            &ds,
            &binding(),
            config(GroupBy::Position, FilterMode::TopTenExcluded),
        );
        assert_eq!(by_team.highlights, by_pos.highlights);

        let total = |a: &Analysis| a.distributions.iter().map(|d| d.values.len()).sum::<usize>();
        assert_eq!(total(&by_team), 5);
        assert_eq!(total(&by_pos), 5);
    }

    #[test]
    fn rows_without_key_or_salary_are_dropped() {
        let ds = Dataset::from_records(vec![
            row("a", "A".into(), "P", CellValue::from("1,000")),
            row("b", CellValue::Null, "P", CellValue::from(2000_i64)),
            row("c", "".into(), "P", CellValue::from(2000_i64)),
            row("d", "A".into(), "P", CellValue::from("n/a")),
            row("e", "A".into(), "P", CellValue::Null),
        ]);
        let a = analyze(&ds, &binding(), AnalysisConfig::default());
        assert_eq!(a.distributions.len(), 1);
        assert_eq!(a.distributions[0].values, vec![1000.0]);
        assert_eq!(a.highlights, Highlights::Disabled);
    }

    #[test]
    fn group_keys_compare_raw() {
        let ds = Dataset::from_records(vec![
            row("a", "A".into(), "P", CellValue::from(1_i64)),
            row("b", "A ".into(), "P", CellValue::from(1_i64)),
            row("c", CellValue::from(1_i64), "P", CellValue::from(1_i64)),
            row("d", "1".into(), "P", CellValue::from(1_i64)),
        ]);
        let a = analyze(&ds, &binding(), AnalysisConfig::default());
        assert_eq!(a.distributions.len(), 4);
    }

    #[test]
    fn nan_keys_are_blank_and_signed_zeros_stay_apart() {
        let ds = Dataset::from_records(vec![
            row("a", CellValue::Float(f64::NAN), "P", CellValue::from(1_i64)),
            row("b", CellValue::Float(f64::NAN), "P", CellValue::from(2_i64)),
            row("c", CellValue::Float(0.0), "P", CellValue::from(3_i64)),
            row("d", CellValue::Float(-0.0), "P", CellValue::from(4_i64)),
            row("e", CellValue::Float(0.0), "P", CellValue::from(7_i64)),
        ]);
        let a = analyze(&ds, &binding(), AnalysisConfig::default());

        let groups: Vec<(String, Vec<f64>)> = a
            .distributions
            .iter()
            .map(|d| (d.label.to_string(), d.values.clone()))
            .collect();
        assert_eq!(
            groups,
            vec![
                ("0".to_string(), vec![3.0, 7.0]),
                ("-0".to_string(), vec![4.0]),
            ]
        );
    }

    #[test]
    fn ordering_by_median_then_label() {
        let ds = Dataset::from_records(vec![
            row("", "B".into(), "P", CellValue::from(500_i64)),
            row("", "C".into(), "P", CellValue::from(900_i64)),
            row("", "A".into(), "P", CellValue::from(500_i64)),
            row("", "D".into(), "P", CellValue::from(100_i64)),
        ]);
        let a = analyze(&ds, &binding(), AnalysisConfig::default());
        let labels: Vec<String> = a.distributions.iter().map(|d| d.label.to_string()).collect();
        assert_eq!(labels, vec!["C", "A", "B", "D"]);
    }

    #[test]
    fn empty_dataset_yields_empty_analysis() {
        let cfg = config(GroupBy::Position, FilterMode::TopTenExcluded);
        let a = analyze(&Dataset::default(), &binding(), cfg);
        assert!(a.is_empty());
        assert_eq!(a.highlights, Highlights::TopEarners(Vec::new()));
    }

    #[test]
    fn outlier_highlights_follow_selected_grouping() {
        // By position the 10000 is an outlier among pitchers; by team each
        // team has fewer than four members.
        let mut records = Vec::new();
        for (i, s) in [100_i64, 200, 300, 400, 10000].iter().enumerate() {
            let team = format!("T{i}");
            records.push(row("", team.as_str().into(), "Pitcher", CellValue::from(*s)));
        }
        let ds = Dataset::from_records(records);

        let by_pos = analyze(
            &ds,
            &binding(),
            config(GroupBy::Position, FilterMode::GroupOutliers),
        );
        assert_eq!(by_pos.highlights.entries().len(), 1);
        assert_eq!(
            by_pos.highlights.entries()[0].marker,
            HighlightMarker::Group("Pitcher".into())
        );

        let by_team = analyze(&ds, &binding(), config(GroupBy::Team, FilterMode::GroupOutliers));
        assert!(by_team.highlights.entries().is_empty());
        assert_eq!(by_team.distributions.len(), 5);
    }

    #[test]
    fn missing_name_binding_renders_blank() {
        let mut b = binding();
        b.name = None;
        let ds = Dataset::from_records(vec![row(
            "Ichiro",
            "A".into(),
            "P",
            CellValue::from(1_i64),
        )]);
        let a = analyze(&ds, &b, config(GroupBy::Team, FilterMode::TopTenExcluded));
        assert_eq!(a.highlights.entries()[0].name, "");
    }

    // -- Properties ---------------------------------------------------------

    fn arb_salary() -> impl Strategy<Value = CellValue> {
        prop_oneof![
            (0i64..100_000).prop_map(CellValue::Integer),
            // Few distinct amounts, so equal salaries are common.
            (1i64..4).prop_map(|n| CellValue::Integer(n * 1000)),
            (0i64..100_000).prop_map(|n| CellValue::String(format!("{n}万円"))),
            Just(CellValue::Null),
            Just(CellValue::from("-")),
        ]
    }

    fn arb_team() -> impl Strategy<Value = CellValue> {
        prop_oneof![
            4 => (0u8..5).prop_map(|t| CellValue::String(format!("T{t}"))),
            1 => Just(CellValue::Null),
            1 => Just(CellValue::from("")),
        ]
    }

    fn arb_dataset() -> impl Strategy<Value = Dataset> {
        proptest::collection::vec((arb_team(), arb_salary()), 0..60).prop_map(|rows| {
            Dataset::from_records(
                rows.into_iter()
                    .enumerate()
                    .map(|(i, (team, salary))| row(&i.to_string(), team, "P", salary))
                    .collect(),
            )
        })
    }

    fn valid_count(ds: &Dataset) -> usize {
        let b = binding();
        ds.records
            .iter()
            .filter(|r| b.team_of(r).is_some_and(|t| !t.is_blank()) && b.salary_of(r).is_some())
            .count()
    }

    proptest! {
        #[test]
        fn unfiltered_counts_match_valid_rows(ds in arb_dataset()) {
            let a = analyze(&ds, &binding(), AnalysisConfig::default());
            let total: usize = a.distributions.iter().map(|d| d.values.len()).sum();
            prop_assert_eq!(total, valid_count(&ds));
        }

        #[test]
        fn filtered_counts_never_exceed_valid_rows(ds in arb_dataset()) {
            for filter in FilterMode::ALL {
                let a = analyze(&ds, &binding(), config(GroupBy::Team, filter));
                let total: usize = a.distributions.iter().map(|d| d.values.len()).sum();
                prop_assert!(total <= valid_count(&ds));
                prop_assert!(a.distributions.iter().all(|d| !d.values.is_empty()));
            }
        }

        #[test]
        fn top_ten_list_ranks_by_salary_then_sheet_order(ds in arb_dataset()) {
            let b = binding();
            let a = analyze(&ds, &b, config(GroupBy::Team, FilterMode::TopTenExcluded));
            let entries = a.highlights.entries();
            prop_assert!(entries.windows(2).all(|w| w[0].salary >= w[1].salary));

            // Highest salary first; equal salaries in sheet order.
            let mut ranked: Vec<(usize, f64)> = ds
                .records
                .iter()
                .enumerate()
                .filter_map(|(i, r)| b.salary_of(r).map(|s| (i, s)))
                .collect();
            ranked.sort_by(|x, y| y.1.total_cmp(&x.1).then(x.0.cmp(&y.0)));
            let expected: Vec<(String, f64)> = ranked
                .into_iter()
                .take(TOP_EARNER_COUNT)
                .map(|(i, s)| (i.to_string(), s))
                .collect();

            let actual: Vec<(String, f64)> =
                entries.iter().map(|e| (e.name.clone(), e.salary)).collect();
            prop_assert_eq!(actual, expected);
        }

        #[test]
        fn small_groups_are_untouched(ds in arb_dataset()) {
            let plain = analyze(&ds, &binding(), AnalysisConfig::default());
            let filtered =
                analyze(&ds, &binding(), config(GroupBy::Team, FilterMode::GroupOutliers));
            for d in plain.distributions.iter().filter(|d| d.values.len() < 4) {
                let same = filtered.distributions.iter().find(|f| f.label == d.label);
                prop_assert_eq!(same.map(|f| &f.values), Some(&d.values));
                prop_assert!(filtered
                    .highlights
                    .entries()
                    .iter()
                    .all(|e| e.marker != HighlightMarker::Group(d.label.clone())));
            }
        }

        #[test]
        fn distributions_sorted_by_median(ds in arb_dataset()) {
            let a = analyze(&ds, &binding(), AnalysisConfig::default());
            prop_assert!(a.distributions.windows(2).all(|w| w[0].median >= w[1].median));
            prop_assert!(a
                .distributions
                .iter()
                .all(|d| d.values.windows(2).all(|w| w[0] <= w[1])));
        }
    }
}
