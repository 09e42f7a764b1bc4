use lending_core::feeds::{score_series, FeedImportError, ScoringFeedImporter};
use lending_core::progression::top_n;
use rust_decimal_macros::dec;
use std::io::Write;

const SCORING_CSV: &str = "PointScore,Percentage
610,0.61
742.5,0.74
742.5,0.80
480,0.48
";

#[test]
fn scoring_import_assigns_sequential_user_ids() {
    let rows = ScoringFeedImporter::from_reader(SCORING_CSV.as_bytes()).expect("feed imports");
    let ids: Vec<_> = rows.iter().map(|row| row.user_id).collect();
    assert_eq!(ids, vec![101, 102, 103, 104]);
    assert_eq!(rows[1].point_score, dec!(742.5));
}

#[test]
fn leaderboard_from_imported_scores_keeps_tie_order() {
    let rows = ScoringFeedImporter::from_reader(SCORING_CSV.as_bytes()).expect("feed imports");
    let accounts: Vec<_> = rows.iter().map(|row| row.to_scored_account()).collect();

    let leaders = top_n(&accounts, 3);
    let ids: Vec<_> = leaders.iter().map(|a| a.account_id.0.as_str()).collect();
    assert_eq!(ids, vec!["102", "103", "101"]);

    let series = score_series(&rows);
    assert_eq!(series.point_scores.len(), 4);
    assert_eq!(series.percentages[3].x, 4);
}

#[test]
fn scoring_import_reads_from_disk() {
    let path = std::env::temp_dir().join(format!(
        "lending-core-scoring-{}.csv",
        std::process::id()
    ));
    let mut file = std::fs::File::create(&path).expect("temp file created");
    file.write_all(SCORING_CSV.as_bytes()).expect("csv written");
    drop(file);

    let rows = ScoringFeedImporter::from_path(&path).expect("feed imports from disk");
    std::fs::remove_file(&path).ok();
    assert_eq!(rows.len(), 4);
}

#[test]
fn scoring_import_rejects_non_numeric_scores() {
    let csv = "PointScore,Percentage\nhigh,0.5\n";
    let err = ScoringFeedImporter::from_reader(csv.as_bytes()).expect_err("row rejected");
    assert!(matches!(
        err,
        FeedImportError::InvalidRow {
            line: 2,
            column: "PointScore",
            ..
        }
    ));
}

#[test]
fn scoring_import_reports_missing_file() {
    let err = ScoringFeedImporter::from_path("/nonexistent/scoring.csv").expect_err("io error");
    assert!(matches!(err, FeedImportError::Io(_)));
}
