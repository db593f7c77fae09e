//! Grouped attrition-rate aggregation
//!
//! Every chart on the dashboard is a group-by over some key followed by a
//! left/stayed percentage per group. This module holds that shared machinery
//! plus the two reshaping steps built on it: the tenure summary and the
//! job level by tenure heatmap.

use crate::types::{
    Employee, HeatmapPivot, HeatmapRow, RateRow, TenureBucket, TenureSummaryEntry,
};
use std::collections::{BTreeMap, HashMap};
use std::hash::Hash;

/// Running counts for one group
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GroupCounts {
    pub count: usize,
    pub left: usize,
}

impl GroupCounts {
    fn add(&mut self, employee: &Employee) {
        self.count += 1;
        if employee.attrition {
            self.left += 1;
        }
    }

    /// Left percentage, `None` for an empty group
    pub fn left_rate(&self) -> Option<f64> {
        percentage(self.left, self.count)
    }

    fn into_row<K>(self, key: K) -> RateRow<K> {
        let stayed = self.count - self.left;
        RateRow {
            key,
            count: self.count,
            left: self.left,
            stayed,
            left_rate: percentage(self.left, self.count).unwrap_or(0.0),
            stayed_rate: percentage(stayed, self.count).unwrap_or(0.0),
        }
    }
}

fn percentage(part: usize, total: usize) -> Option<f64> {
    if total == 0 {
        None
    } else {
        Some(100.0 * part as f64 / total as f64)
    }
}

/// Group employees by `key` and compute left/stayed rates per group.
///
/// One row per distinct key present in the input, in order of first
/// appearance. Absent keys are never synthesized, so an empty input gives an
/// empty result.
pub fn group_rates<'a, K, I, F>(employees: I, key: F) -> Vec<RateRow<K>>
where
    I: IntoIterator<Item = &'a Employee>,
    F: Fn(&Employee) -> K,
    K: Eq + Hash + Clone,
{
    group_keyed_rates(employees.into_iter().map(|e| (key(e), e)))
}

/// Same as [`group_rates`] for employees whose keys were computed up front
pub fn group_keyed_rates<'a, K, I>(keyed: I) -> Vec<RateRow<K>>
where
    I: IntoIterator<Item = (K, &'a Employee)>,
    K: Eq + Hash + Clone,
{
    let mut index: HashMap<K, usize> = HashMap::new();
    let mut groups: Vec<(K, GroupCounts)> = Vec::new();

    for (k, employee) in keyed {
        let slot = *index.entry(k.clone()).or_insert_with(|| {
            groups.push((k, GroupCounts::default()));
            groups.len() - 1
        });
        groups[slot].1.add(employee);
    }

    groups
        .into_iter()
        .map(|(k, counts)| counts.into_row(k))
        .collect()
}

/// Sort by left-rate descending. Ties keep their incoming order.
pub fn rank_by_left_rate<K>(mut rows: Vec<RateRow<K>>) -> Vec<RateRow<K>> {
    rows.sort_by(|a, b| b.left_rate.total_cmp(&a.left_rate));
    rows
}

/// Sort by grouping key ascending
pub fn sort_by_key<K: Ord>(mut rows: Vec<RateRow<K>>) -> Vec<RateRow<K>> {
    rows.sort_by(|a, b| a.key.cmp(&b.key));
    rows
}

/// Drop groups with fewer than `min_count` members.
///
/// Returns the kept rows and the number removed.
pub fn suppress_small_groups<K>(rows: Vec<RateRow<K>>, min_count: usize) -> (Vec<RateRow<K>>, usize) {
    let before = rows.len();
    let kept: Vec<RateRow<K>> = rows.into_iter().filter(|r| r.count >= min_count).collect();
    let removed = before - kept.len();
    (kept, removed)
}

/// Attrition rate (%) over all given employees, 0.0 when there are none
pub fn overall_rate<'a, I>(employees: I) -> f64
where
    I: IntoIterator<Item = &'a Employee>,
{
    let mut counts = GroupCounts::default();
    for employee in employees {
        counts.add(employee);
    }
    counts.left_rate().unwrap_or(0.0)
}

/// Member count per tenure bucket, in bucket order
pub fn tenure_bucket_counts(employees: &[Employee]) -> [usize; 4] {
    let mut counts = [0usize; 4];
    for employee in employees {
        counts[employee.tenure_bucket as usize] += 1;
    }
    counts
}

/// Attrition rate for each of the four tenure buckets.
///
/// Every bucket is present; buckets with no members carry `None`.
pub fn tenure_summary(employees: &[Employee]) -> Vec<TenureSummaryEntry> {
    let mut counts = [GroupCounts::default(); 4];
    for employee in employees {
        counts[employee.tenure_bucket as usize].add(employee);
    }

    TenureBucket::ALL
        .iter()
        .zip(counts.iter())
        .map(|(bucket, c)| TenureSummaryEntry {
            tenure_bucket: *bucket,
            count: c.count,
            attrition_rate: c.left_rate(),
        })
        .collect()
}

/// Pivot of left-rate by job level (rows) and tenure bucket (columns).
///
/// Rows are the observed job levels in ascending order. Columns are all four
/// tenure buckets; a cell with no members is `None`, never 0.
pub fn job_level_tenure_heatmap(employees: &[Employee]) -> HeatmapPivot {
    let mut cells: BTreeMap<u32, [GroupCounts; 4]> = BTreeMap::new();
    for employee in employees {
        cells.entry(employee.job_level).or_default()[employee.tenure_bucket as usize]
            .add(employee);
    }

    let rows = cells
        .into_iter()
        .map(|(job_level, counts)| HeatmapRow {
            job_level,
            cells: counts.iter().map(GroupCounts::left_rate).collect(),
        })
        .collect();

    HeatmapPivot {
        columns: TenureBucket::ALL.to_vec(),
        rows,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn employee(role: &str, level: u32, years: f64, left: bool) -> Employee {
        Employee {
            employee_id: format!("{role}-{level}-{years}"),
            department: "Sales".to_string(),
            job_role: role.to_string(),
            gender: "Female".to_string(),
            job_level: level,
            distance_from_home: 1.0,
            years_at_company: years,
            attrition: left,
            overtime: false,
            tenure_bucket: TenureBucket::from_years(years).unwrap(),
        }
    }

    fn role_rows(groups: &[(&str, usize, usize)]) -> Vec<Employee> {
        let mut out = Vec::new();
        for (role, total, left) in groups {
            for i in 0..*total {
                out.push(employee(role, 1, 1.0, i < *left));
            }
        }
        out
    }

    #[test]
    fn test_overall_rate_four_of_ten() {
        let employees = role_rows(&[("Analyst", 10, 4)]);
        assert_eq!(overall_rate(&employees), 40.0);
        assert_eq!(format!("{:.1}%", overall_rate(&employees)), "40.0%");
    }

    #[test]
    fn test_overall_rate_empty_is_zero() {
        let employees: Vec<Employee> = Vec::new();
        assert_eq!(overall_rate(&employees), 0.0);
    }

    #[test]
    fn test_group_rates_first_appearance_order() {
        let employees = vec![
            employee("B", 1, 1.0, true),
            employee("A", 1, 1.0, false),
            employee("B", 1, 1.0, false),
        ];
        let rows = group_rates(&employees, |e| e.job_role.clone());

        let keys: Vec<&str> = rows.iter().map(|r| r.key.as_str()).collect();
        assert_eq!(keys, vec!["B", "A"]);
        assert_eq!(rows[0].count, 2);
        assert_eq!(rows[0].left, 1);
        assert_eq!(rows[0].left_rate, 50.0);
        assert_eq!(rows[1].left_rate, 0.0);
        assert_eq!(rows[1].stayed_rate, 100.0);
    }

    #[test]
    fn test_rates_sum_to_hundred() {
        let employees = role_rows(&[("A", 3, 1), ("B", 7, 3), ("C", 11, 5), ("D", 13, 13)]);
        for row in group_rates(&employees, |e| e.job_role.clone()) {
            assert!(row.count > 0);
            assert!((row.left_rate + row.stayed_rate - 100.0).abs() < 1e-9);
            assert_eq!(row.left + row.stayed, row.count);
        }
    }

    #[test]
    fn test_empty_input_gives_empty_result() {
        let employees: Vec<Employee> = Vec::new();
        assert!(group_rates(&employees, |e| e.job_role.clone()).is_empty());
    }

    #[test]
    fn test_rank_is_stable_on_ties() {
        let employees = role_rows(&[("A", 5, 2), ("B", 10, 4), ("C", 4, 1)]);
        let ranked = rank_by_left_rate(group_rates(&employees, |e| e.job_role.clone()));
        let keys: Vec<&str> = ranked.iter().map(|r| r.key.as_str()).collect();
        assert_eq!(keys, vec!["A", "B", "C"]);

        let employees = role_rows(&[("C", 4, 1), ("B", 10, 4), ("A", 5, 2)]);
        let ranked = rank_by_left_rate(group_rates(&employees, |e| e.job_role.clone()));
        let keys: Vec<&str> = ranked.iter().map(|r| r.key.as_str()).collect();
        assert_eq!(keys, vec!["B", "A", "C"]);
    }

    #[test]
    fn test_sort_by_key() {
        let employees = vec![
            employee("A", 3, 1.0, false),
            employee("A", 1, 1.0, false),
            employee("A", 2, 1.0, false),
        ];
        let rows = sort_by_key(group_rates(&employees, |e| e.job_level));
        let keys: Vec<u32> = rows.iter().map(|r| r.key).collect();
        assert_eq!(keys, vec![1, 2, 3]);
    }

    #[test]
    fn test_suppression_threshold() {
        let employees = role_rows(&[("Seven", 7, 1), ("Eight", 8, 1)]);
        let rows = group_rates(&employees, |e| e.job_role.clone());
        let (kept, removed) = suppress_small_groups(rows, 8);

        assert_eq!(removed, 1);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].key, "Eight");
    }

    #[test]
    fn test_tenure_bucket_counts_sum_to_total() {
        let employees: Vec<Employee> = [0.0, 1.5, 2.0, 4.9, 5.0, 9.0, 10.0, 33.0, 0.5]
            .iter()
            .map(|y| employee("A", 1, *y, false))
            .collect();
        let counts = tenure_bucket_counts(&employees);
        assert_eq!(counts, [3, 2, 2, 2]);
        assert_eq!(counts.iter().sum::<usize>(), employees.len());
    }

    #[test]
    fn test_tenure_summary_includes_empty_buckets() {
        let employees = vec![
            employee("A", 1, 0.0, true),
            employee("A", 1, 1.0, false),
            employee("A", 1, 12.0, false),
        ];
        let summary = tenure_summary(&employees);

        assert_eq!(summary.len(), 4);
        assert_eq!(summary[0].attrition_rate, Some(50.0));
        assert_eq!(summary[1].attrition_rate, None);
        assert_eq!(summary[2].attrition_rate, None);
        assert_eq!(summary[3].attrition_rate, Some(0.0));
        assert_eq!(summary[3].count, 1);
    }

    #[test]
    fn test_heatmap_distinguishes_empty_from_zero() {
        let employees = vec![
            employee("A", 1, 0.5, true),
            employee("A", 1, 1.0, false),
            employee("A", 1, 3.0, false),
            employee("A", 2, 12.0, true),
        ];
        let pivot = job_level_tenure_heatmap(&employees);

        assert_eq!(pivot.columns, TenureBucket::ALL.to_vec());
        assert_eq!(
            pivot.rows,
            vec![
                HeatmapRow {
                    job_level: 1,
                    cells: vec![Some(50.0), Some(0.0), None, None],
                },
                HeatmapRow {
                    job_level: 2,
                    cells: vec![None, None, None, Some(100.0)],
                },
            ]
        );
    }

    #[test]
    fn test_recompute_is_identical() {
        let employees = role_rows(&[("A", 5, 2), ("B", 9, 4)]);
        let first = rank_by_left_rate(group_rates(&employees, |e| e.job_role.clone()));
        let second = rank_by_left_rate(group_rates(&employees, |e| e.job_role.clone()));
        assert_eq!(first, second);
        assert_eq!(
            job_level_tenure_heatmap(&employees),
            job_level_tenure_heatmap(&employees)
        );
    }
}
