use std::fs;
use std::io::Write;

use chrono::NaiveDate;
use flate2::Compression;
use flate2::write::GzEncoder;
use kira_recist::io::lesions::{
    parse_baseline_dates, parse_lesion_feed, read_baseline_dates, read_lesion_feed,
};
use kira_recist::response::{LesionClass, LesionStatus};
use tempfile::TempDir;

const FEED: &str = "subject_id\tlesion_id\torgan\tassessment_date\tdiameter_mm\tlesion_class\tstatus\n\
S1\tT1\tliver\t2024-01-01\t42.5\tTARGET\t\n\
S1\tNT1\tbone\t2024-01-01\t\tNON_TARGET\tPRESENT\n\
S1\tX1\tbrain\t2024-03-01\t6\tNEW\t\n";

#[test]
fn parses_feed_rows() {
    let rows = parse_lesion_feed(FEED, "feed.tsv").unwrap();
    assert_eq!(rows.len(), 3);
    assert_eq!(rows[0].diameter_mm, Some(42.5));
    assert_eq!(rows[0].lesion_class, LesionClass::Target);
    assert_eq!(rows[0].status, None);
    assert_eq!(rows[1].diameter_mm, None);
    assert_eq!(rows[1].status, Some(LesionStatus::Present));
    assert_eq!(rows[2].lesion_class, LesionClass::New);
    assert_eq!(rows[2].assessment_date, NaiveDate::from_ymd_opt(2024, 3, 1).unwrap());
}

#[test]
fn columns_found_by_header_name() {
    let content = "lesion_class\tassessment_date\torgan\tlesion_id\tsubject_id\n\
TARGET\t2024-01-01\tlung\tT1\tS2\n";
    let rows = parse_lesion_feed(content, "feed.tsv").unwrap();
    assert_eq!(rows[0].subject_id, "S2");
    assert_eq!(rows[0].diameter_mm, None);
}

#[test]
fn missing_column_is_fatal() {
    let content = "subject_id\tlesion_id\tassessment_date\tlesion_class\nS1\tT1\t2024-01-01\tTARGET\n";
    let err = parse_lesion_feed(content, "feed.tsv").unwrap_err();
    assert!(err.to_string().contains("missing required column 'organ'"));
}

#[test]
fn bad_values_report_line() {
    let bad_date = FEED.replace("2024-03-01", "2024-13-01");
    let err = parse_lesion_feed(&bad_date, "feed.tsv").unwrap_err();
    assert!(err.to_string().starts_with("feed.tsv:4"));

    let bad_class = FEED.replace("NEW", "MAYBE");
    assert!(parse_lesion_feed(&bad_class, "feed.tsv").is_err());

    let negative = FEED.replace("42.5", "-1");
    assert!(parse_lesion_feed(&negative, "feed.tsv").is_err());

    assert!(parse_lesion_feed("", "feed.tsv").is_err());
}

#[test]
fn reads_plain_and_gzip_feeds() {
    let tmp = TempDir::new().unwrap();
    let plain = tmp.path().join("lesions.tsv");
    fs::write(&plain, FEED).unwrap();
    assert_eq!(read_lesion_feed(&plain).unwrap().len(), 3);

    let gz = tmp.path().join("lesions.tsv.gz");
    let mut encoder = GzEncoder::new(fs::File::create(&gz).unwrap(), Compression::default());
    encoder.write_all(FEED.as_bytes()).unwrap();
    encoder.finish().unwrap();
    assert_eq!(read_lesion_feed(&gz).unwrap(), read_lesion_feed(&plain).unwrap());
}

#[test]
fn baseline_dates() {
    let map = parse_baseline_dates("subject_id\treference_date\nS1\t2024-01-05\nS2\t2024-02-01\n", "ref.tsv")
        .unwrap();
    assert_eq!(map.len(), 2);
    assert_eq!(map["S1"], NaiveDate::from_ymd_opt(2024, 1, 5).unwrap());

    assert!(parse_baseline_dates("S1\t2024-01-05\nS1\t2024-01-06\n", "ref.tsv").is_err());
    assert!(parse_baseline_dates("S1\t05/01/2024\n", "ref.tsv").is_err());

    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("ref.tsv");
    fs::write(&path, "S3\t2024-04-01\n").unwrap();
    assert_eq!(read_baseline_dates(&path).unwrap().len(), 1);
}
