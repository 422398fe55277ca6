use chrono::NaiveDate;
use klinemerge::models::{CanonicalSchema, Granularity, NormalizedRow, SourceFragment};
use klinemerge::services::artifact_writer::write_artifact;
use klinemerge::services::merger::{merge_fragments, FragmentRows};
use proptest::prelude::*;
use std::collections::BTreeMap;
use std::fs;

const BASE_TS: i64 = 1_704_067_200_000;

fn schema() -> CanonicalSchema {
    CanonicalSchema::new(vec!["open_time".into(), "close".into()]).unwrap()
}

fn arb_rows() -> impl Strategy<Value = Vec<(i64, u32)>> {
    // Small minute range so fragments collide on timestamps
    proptest::collection::vec((0i64..120, 0u32..10_000), 1..40)
        .prop_map(|rows| rows.into_iter().map(|(m, v)| (BASE_TS + m * 60_000, v)).collect())
}

fn arb_fragments() -> impl Strategy<Value = Vec<(u32, Vec<(i64, u32)>)>> {
    proptest::collection::vec((1u32..=28, arb_rows()), 1..6)
}

fn batches(fragments: &[(u32, Vec<(i64, u32)>)]) -> Vec<FragmentRows> {
    fragments.iter()
        .enumerate()
        .map(|(i, (day, rows))| FragmentRows {
            fragment: SourceFragment::new(
                "BTCUSDT",
                format!("BTCUSDT-1m-2024-01-{:02}-{}.csv", day, i),
                NaiveDate::from_ymd_opt(2024, 1, *day).unwrap(),
                Granularity::Daily,
            ),
            rows: rows
                .iter()
                .map(|(ts, v)| NormalizedRow::new(vec![Some(ts.to_string()), Some(v.to_string())]))
                .collect(),
        })
        .collect()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn output_is_sorted_and_unique(fragments in arb_fragments()) {
        let artifact = merge_fragments("BTCUSDT", &schema(), batches(&fragments)).unwrap();
        for pair in artifact.rows.windows(2) {
            prop_assert!(pair[0].timestamp < pair[1].timestamp);
        }
    }

    #[test]
    fn most_recent_fragment_wins(fragments in arb_fragments()) {
        let mut ordered = batches(&fragments);
        ordered.sort_by(|a, b| SourceFragment::recency_order(&a.fragment, &b.fragment));

        let mut expected: BTreeMap<i64, String> = BTreeMap::new();
        for batch in &ordered {
            for row in &batch.rows {
                let ts: i64 = row.get(0).unwrap().parse().unwrap();
                expected.entry(ts).or_insert_with(|| row.get(1).unwrap().to_string());
            }
        }

        let artifact = merge_fragments("BTCUSDT", &schema(), batches(&fragments)).unwrap();
        prop_assert_eq!(artifact.row_count(), expected.len());
        for merged in &artifact.rows {
            prop_assert_eq!(merged.row.get(1), expected.get(&merged.timestamp).map(String::as_str));
        }
    }

    #[test]
    fn input_order_does_not_change_output_bytes(fragments in arb_fragments()) {
        let forward = merge_fragments("BTCUSDT", &schema(), batches(&fragments)).unwrap();
        let mut reversed_batches = batches(&fragments);
        reversed_batches.reverse();
        let reversed = merge_fragments("BTCUSDT", &schema(), reversed_batches).unwrap();

        let a = tempfile::tempdir().unwrap();
        let b = tempfile::tempdir().unwrap();
        let path_a = write_artifact(&forward, a.path()).unwrap();
        let path_b = write_artifact(&reversed, b.path()).unwrap();

        prop_assert_eq!(path_a.file_name(), path_b.file_name());
        prop_assert_eq!(fs::read(&path_a).unwrap(), fs::read(&path_b).unwrap());
    }

    #[test]
    fn remerging_output_is_a_fixed_point(fragments in arb_fragments()) {
        let first = merge_fragments("BTCUSDT", &schema(), batches(&fragments)).unwrap();
        let again = merge_fragments(
            "BTCUSDT",
            &schema(),
            vec![FragmentRows {
                fragment: SourceFragment::new(
                    "BTCUSDT",
                    "BTCUSDT_merged.csv",
                    first.end_date,
                    Granularity::Daily,
                ),
                rows: first.rows.iter().map(|r| r.row.clone()).collect(),
            }],
        )
        .unwrap();

        prop_assert_eq!(first.rows, again.rows);
    }
}
