use std::collections::{BTreeMap, BTreeSet};

use proptest::prelude::*;
use world_happiness::{
    Frame, ReconcileConfig,
    alias::apply_aliases,
    align::intersect_and_align,
    append::append_with_precedence,
    columns::normalize_key,
    geo::merge_coordinates,
};

const HEADERS: [&str; 3] = ["country_name", "ladder_score", "year"];

const PANEL_SPELLINGS: [&str; 8] = [
    "Country name",
    "Life Ladder",
    "Log GDP per capita",
    "Healthy life expectancy at birth",
    "ladder_score",
    "Generosity",
    "Perceptions of corruption",
    "year",
];

fn frame_from(rows: &[(String, i64, String)]) -> Frame {
    Frame::new(
        HEADERS.iter().map(|h| h.to_string()).collect(),
        rows.iter()
            .map(|(country, year, score)| vec![country.clone(), score.clone(), year.to_string()])
            .collect(),
    )
}

fn keyed_rows() -> impl Strategy<Value = Vec<(String, i64, String)>> {
    proptest::collection::vec(
        ("[A-D]", 2015i64..2022, "[0-9]\\.[0-9]"),
        0..12,
    )
}

proptest! {
    #[test]
    fn normalisation_is_idempotent(raw in "[A-Za-zÀ-ÿ0-9 _\\-%./()\\[\\]]{0,24}") {
        let once = normalize_key(&raw);
        prop_assert_eq!(normalize_key(&once), once);
    }

    #[test]
    fn aliasing_twice_equals_aliasing_once(
        headers in proptest::sample::subsequence(PANEL_SPELLINGS.to_vec(), 1..=PANEL_SPELLINGS.len())
            .prop_shuffle()
    ) {
        let config = ReconcileConfig::default();
        let frame = Frame::new(headers.iter().map(|h| h.to_string()).collect(), Vec::new());
        let once = apply_aliases(frame, config.aliases());
        let twice = apply_aliases(once.clone(), config.aliases());
        prop_assert_eq!(once, twice);
    }

    #[test]
    fn aligned_frames_always_share_headers(
        left in proptest::collection::vec("[a-c ]{1,4}", 1..6),
        right in proptest::collection::vec("[a-c ]{1,4}", 1..6),
    ) {
        let a = Frame::new(left, Vec::new());
        let b = Frame::new(right, Vec::new());
        if let Ok((a2, b2)) = intersect_and_align(&a, &b, "a", "b") {
            prop_assert!(!a2.headers.is_empty());
            prop_assert_eq!(&a2.headers, &b2.headers);
            let (b3, a3) = intersect_and_align(&b, &a, "b", "a").unwrap();
            prop_assert_eq!(&a3.headers, &b3.headers);
            prop_assert_eq!(&a2.headers, &a3.headers);
        }
    }

    #[test]
    fn append_keeps_every_key_once_with_snapshot_precedence(
        panel_rows in keyed_rows(),
        snapshot_rows in keyed_rows(),
    ) {
        let panel = frame_from(&panel_rows);
        let snapshot = frame_from(&snapshot_rows);
        let out = append_with_precedence(&panel, &snapshot).unwrap();

        let expected_keys: BTreeSet<(String, String)> = panel_rows
            .iter()
            .chain(snapshot_rows.iter())
            .map(|(c, y, _)| (c.clone(), y.to_string()))
            .collect();
        let out_keys: Vec<(String, String)> = out
            .rows
            .iter()
            .map(|r| (r[0].clone(), r[2].clone()))
            .collect();
        prop_assert_eq!(out_keys.len(), expected_keys.len());
        prop_assert_eq!(out_keys.iter().cloned().collect::<BTreeSet<_>>(), expected_keys);

        let mut last_snapshot: BTreeMap<(String, String), &Vec<String>> = BTreeMap::new();
        for row in &snapshot.rows {
            last_snapshot.insert((row[0].clone(), row[2].clone()), row);
        }
        for row in &out.rows {
            if let Some(snap) = last_snapshot.get(&(row[0].clone(), row[2].clone())) {
                prop_assert_eq!(row, *snap);
            }
        }
    }

    #[test]
    fn geo_merge_never_drops_rows(rows in keyed_rows()) {
        let gold = frame_from(&rows);
        let geo = Frame::from_rows(
            &["country_name", "latitude", "longitude"],
            &[&["A", "1.0", "2.0"], &["C", "3.0", "4.0"]],
        );
        let (merged, coverage) = merge_coordinates(gold.clone(), &geo, &BTreeMap::new()).unwrap();
        prop_assert_eq!(merged.row_count(), gold.row_count());
        let expected_missing = rows.iter().filter(|(c, _, _)| c != "A" && c != "C").count();
        prop_assert_eq!(coverage.rows_missing_coordinates, expected_missing);
    }
}
