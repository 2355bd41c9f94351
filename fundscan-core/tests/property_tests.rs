//! Property tests for scanner invariants.
//!
//! Uses proptest to verify:
//! 1. Early-exit equivalence — on files with contiguous per-fund rows, the
//!    early-exit scan emits exactly what a plain filter would
//! 2. Date axis bijection — matrix row index and date round-trip over any
//!    month range
//! 3. Presence ordering — `present_by` agrees with chronological ordering

use fundscan_core::domain::{Observation, PresenceRecord, YearMonth};
use fundscan_core::scan::scan_month;
use fundscan_core::matrix::QuoteMatrix;
use proptest::prelude::*;
use std::collections::BTreeSet;
use std::io::Write;
use std::path::Path;

// ── Strategies (proptest) ────────────────────────────────────────────

const POOL: [&str; 6] = ["F1", "F2", "F3", "F4", "F5", "F6"];

/// A monthly file layout: a permutation of fund groups, each with 1..=5 rows.
fn arb_groups() -> impl Strategy<Value = Vec<(usize, usize)>> {
    // (pool index, row count) with distinct pool indices in shuffled order.
    Just((0..POOL.len()).collect::<Vec<_>>())
        .prop_shuffle()
        .prop_flat_map(|order| {
            let len = order.len();
            (Just(order), proptest::collection::vec(1..=5usize, len))
        })
        .prop_map(|(order, counts)| order.into_iter().zip(counts).collect())
}

/// A requested subset of the pool, possibly empty.
fn arb_requested() -> impl Strategy<Value = BTreeSet<String>> {
    proptest::collection::btree_set(0..POOL.len(), 0..=POOL.len())
        .prop_map(|idxs| idxs.into_iter().map(|i| POOL[i].to_string()).collect())
}

/// Write a monthly fixture with contiguous per-fund rows.
fn write_fixture(path: &Path, groups: &[(usize, usize)]) {
    let mut file = std::fs::File::create(path).unwrap();
    writeln!(file, "CNPJ_FUNDO;DT_COMPTC;VL_QUOTA;NR_COTST").unwrap();
    for &(idx, rows) in groups {
        for day in 1..=rows {
            writeln!(file, "{};2021-01-{:02};{}.5;10", POOL[idx], day, idx + 1).unwrap();
        }
    }
}

// ── 1. Early-Exit Equivalence ────────────────────────────────────────

proptest! {
    /// On a grouped file, the early-exit scan emits exactly the rows a plain
    /// "keep every requested row" filter would, in file order.
    #[test]
    fn early_exit_matches_plain_filter(
        groups in arb_groups(),
        requested in arb_requested(),
    ) {
        prop_assume!(!requested.is_empty());

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("inf_diario_fi_202101.csv");
        write_fixture(&path, &groups);

        let mut actual: Vec<Observation> = Vec::new();
        let stats = scan_month(&path, &requested, &mut actual).unwrap();

        let expected: Vec<&str> = groups
            .iter()
            .flat_map(|&(idx, rows)| std::iter::repeat(POOL[idx]).take(rows))
            .filter(|id| requested.contains(*id))
            .collect();

        prop_assert_eq!(actual.len(), expected.len());
        for (obs, id) in actual.iter().zip(&expected) {
            prop_assert_eq!(obs.cnpj.as_str(), *id);
        }
        prop_assert_eq!(stats.accepted, expected.len());
        prop_assert_eq!(stats.matched, requested.len());
    }

    /// Every accepted row carries the quota the fixture wrote for its fund.
    #[test]
    fn accepted_rows_parse_faithfully(
        groups in arb_groups(),
        requested in arb_requested(),
    ) {
        prop_assume!(!requested.is_empty());

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("inf_diario_fi_202101.csv");
        write_fixture(&path, &groups);

        let mut actual: Vec<Observation> = Vec::new();
        scan_month(&path, &requested, &mut actual).unwrap();

        for obs in &actual {
            let idx = POOL.iter().position(|p| *p == obs.cnpj).unwrap();
            prop_assert!((obs.quota - (idx as f64 + 1.5)).abs() < 1e-12);
            prop_assert_eq!(obs.holders, 10);
            prop_assert_eq!(obs.date.format("%Y-%m").to_string(), "2021-01");
        }
    }
}

// ── 2. Date Axis Bijection ───────────────────────────────────────────

proptest! {
    /// Matrix row index and date round-trip over any month range.
    #[test]
    fn row_index_round_trips(
        year in 2005..=2099i32,
        start_month in 1..=12u32,
        span in 0..=24u32,
    ) {
        let start = YearMonth::new(year, start_month).unwrap();
        let mut end = start;
        for _ in 0..span {
            end = end.succ();
        }

        let requested: BTreeSet<String> = std::iter::once("F1".to_string()).collect();
        let m = QuoteMatrix::new(start, end, &requested);

        prop_assert_eq!(m.start_date(), start.first_day());
        prop_assert_eq!(m.end_date(), end.last_day());
        for row in 0..m.row_count() {
            prop_assert_eq!(m.row_index(m.date_at(row)), Some(row));
        }
        prop_assert_eq!(m.row_index(start.first_day() - chrono::Duration::days(1)), None);
        prop_assert_eq!(m.row_index(end.last_day() + chrono::Duration::days(1)), None);
    }
}

// ── 3. Presence Ordering ─────────────────────────────────────────────

proptest! {
    /// `present_by` agrees with the chronological ordering of YearMonth.
    #[test]
    fn present_by_matches_ordering(
        first_year in 2005..=2099i32,
        first_month in 1..=12u32,
        probe_year in 2005..=2099i32,
        probe_month in 1..=12u32,
    ) {
        let first = YearMonth::new(first_year, first_month).unwrap();
        let probe = YearMonth::new(probe_year, probe_month).unwrap();
        let record = PresenceRecord::new(String::from("F1"), first);

        prop_assert_eq!(record.present_by(probe), first <= probe);
    }
}

// ── Early-Exit Precondition (unit) ───────────────────────────────────

/// When a requested fund's rows reappear after every requested fund has been
/// matched, the early exit drops the trailing rows. This documents the
/// contiguity assumption the scan relies on.
#[test]
fn non_contiguous_file_loses_trailing_rows() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("inf_diario_fi_202101.csv");
    let mut file = std::fs::File::create(&path).unwrap();
    writeln!(file, "CNPJ_FUNDO;DT_COMPTC;VL_QUOTA;NR_COTST").unwrap();
    writeln!(file, "F1;2021-01-04;1.5;10").unwrap();
    writeln!(file, "F9;2021-01-04;9.5;10").unwrap();
    // F1 reappears out of order: unreachable past the early exit.
    writeln!(file, "F1;2021-01-05;1.6;10").unwrap();
    drop(file);

    let requested: BTreeSet<String> = std::iter::once("F1".to_string()).collect();
    let mut actual: Vec<Observation> = Vec::new();
    let stats = scan_month(&path, &requested, &mut actual).unwrap();

    assert!(stats.early_exit);
    assert_eq!(actual.len(), 1);
    assert_eq!(actual[0].quota, 1.5);
}
