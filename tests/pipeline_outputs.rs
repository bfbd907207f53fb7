use std::fs;
use std::path::Path;

use kira_recist::ctx::Ctx;
use kira_recist::pipeline::Pipeline;
use kira_recist::response::ResponseCategory;
use kira_recist::response::timeline::evaluate_subject;
use tempfile::TempDir;

const FEED: &str = "subject_id\tlesion_id\torgan\tassessment_date\tdiameter_mm\tlesion_class\tstatus
S1\tT1\tliver\t2024-01-01\t60\tTARGET\t
S1\tT2\tlung\t2024-01-01\t40\tTARGET\t
S1\tNT1\tbone\t2024-01-01\t\tNON_TARGET\tPRESENT
S1\tT1\tliver\t2024-02-26\t42\tTARGET\t
S1\tT2\tlung\t2024-02-26\t28\tTARGET\t
S1\tNT1\tbone\t2024-02-26\t\tNON_TARGET\tPRESENT
S1\tT1\tliver\t2024-03-25\t42\tTARGET\t
S1\tT2\tlung\t2024-03-25\t28\tTARGET\t
S1\tNT1\tbone\t2024-03-25\t\tNON_TARGET\tPRESENT
S2\tT1\tliver\t2024-01-01\t50\tTARGET\t
S2\tT1\tliver\t2024-02-26\t70\tTARGET\t
S3\tT1\tliver\t2024-01-01\t30\tTARGET\t
S3\tT1\tliver\t2024-01-01\t31\tTARGET\t
";

fn run_full(dir: &Path, threads: usize) -> Ctx {
    let input = dir.join("lesions.tsv");
    fs::write(&input, FEED).unwrap();
    let mut ctx = Ctx::new(
        input,
        dir.join("out"),
        None,
        None,
        true,
        true,
        "0.0.0-test",
    );
    ctx.write_rs = true;
    ctx.study_id = "TRIAL01".to_string();
    ctx.threads = threads;
    Pipeline::full().run(&mut ctx).unwrap();
    ctx
}

#[test]
fn full_pipeline_writes_all_outputs() {
    let tmp = TempDir::new().unwrap();
    let ctx = run_full(tmp.path(), 0);

    assert!(ctx.output.json_path.exists());
    assert!(ctx.output.timepoints_path.exists());
    assert!(ctx.output.bor_path.exists());
    assert!(ctx.output.rs_path.exists());

    let bors: Vec<(String, ResponseCategory)> = ctx
        .subjects
        .iter()
        .map(|s| (s.subject_id.clone(), s.bor.as_ref().unwrap().bor))
        .collect();
    assert_eq!(
        bors,
        vec![
            ("S1".to_string(), ResponseCategory::Pr),
            ("S2".to_string(), ResponseCategory::Pd),
            ("S3".to_string(), ResponseCategory::Ne),
        ]
    );
    assert_eq!(ctx.error_count(), 1);
    assert_eq!(ctx.input_meta.lesion_rows, Some(13));
    assert_eq!(ctx.input_meta.subjects, Some(3));
    assert_eq!(ctx.input_meta.assessments, Some(5));
}

#[test]
fn timepoint_and_bor_tables() {
    let tmp = TempDir::new().unwrap();
    let ctx = run_full(tmp.path(), 0);

    let content = fs::read_to_string(&ctx.output.timepoints_path).unwrap();
    let lines: Vec<&str> = content.lines().collect();
    assert_eq!(lines.len(), 6);
    assert!(lines[0].starts_with("subject_id\tassessment_date\tstudy_day\tbaseline\tsld_mm"));
    assert_eq!(lines[1], "S1\t2024-01-01\t0\tY\t100.00\t\t100.00\t\t\t\t\tN\t");
    assert_eq!(
        lines[2],
        "S1\t2024-02-26\t56\tN\t70.00\t-30.00\t70.00\t\t\tPR\tNON-CR/NON-PD\tN\tPR"
    );
    assert!(lines[5].starts_with("S2\t2024-02-26\t56\tN\t70.00\t40.00"));
    assert!(lines[5].ends_with("\tPD\tNA\tN\tPD"));

    let content = fs::read_to_string(&ctx.output.bor_path).unwrap();
    let lines: Vec<&str> = content.lines().collect();
    assert_eq!(lines.len(), 4);
    assert_eq!(lines[0], "subject_id\tbor\tbor_date\tconfirmed\tbasis");
    assert!(lines[1].starts_with("S1\tPR\t2024-02-26\tY\t"));
    assert!(lines[2].starts_with("S2\tPD\t2024-02-26\tN\t"));
    assert!(lines[3].starts_with("S3\tNE\t\tN\tdata quality:"));
}

#[test]
fn rs_domain_table() {
    let tmp = TempDir::new().unwrap();
    let ctx = run_full(tmp.path(), 0);

    let content = fs::read_to_string(&ctx.output.rs_path).unwrap();
    let lines: Vec<&str> = content.lines().collect();
    assert_eq!(lines.len(), 16);
    assert!(lines[0].starts_with("STUDYID\tDOMAIN\tUSUBJID\tRSSEQ\tRSTESTCD"));
    assert!(lines.iter().skip(1).all(|l| l.starts_with("TRIAL01\tRS\t")));
    assert!(lines[0].contains("\tRSSTRESC\tRSSTRESN\tVISITNUM\tVISIT\tRSDTC\tRSDY"));
    assert!(lines.iter().all(|l| l.split('\t').count() == 14));
    assert!(lines.contains(
        &"TRIAL01\tRS\tS1\t1\tTRGRESP\tTarget Response\tRECIST 1.1\tPR\tPR\t\t2\tASSESSMENT 2\t2024-02-26\t56"
    ));
    assert!(lines.contains(
        &"TRIAL01\tRS\tS1\t8\tOVRLRESP\tOverall Response\tRECIST 1.1\tPR\tPR\t\t3\tASSESSMENT 3\t2024-03-25\t84"
    ));
    assert!(lines.contains(
        &"TRIAL01\tRS\tS1\t9\tBESTRSP\tBest Overall Response\tRECIST 1.1\tPR\tPR\t\t\t\t2024-02-26\t56"
    ));
}

#[test]
fn pipeline_matches_single_subject_evaluation() {
    let tmp = TempDir::new().unwrap();
    let ctx = run_full(tmp.path(), 2);

    for record in &ctx.subjects {
        let eval = evaluate_subject(
            &record.subject_id,
            &record.rows,
            record.reference_date,
            &ctx.criteria,
        );
        assert_eq!(record.timeline, eval.timeline, "{}", record.subject_id);
        assert_eq!(record.bor.as_ref(), Some(&eval.bor), "{}", record.subject_id);
        assert_eq!(record.errors, eval.errors, "{}", record.subject_id);
        assert_eq!(record.warnings, eval.warnings, "{}", record.subject_id);
    }
    let s3 = &ctx.subjects[2];
    assert!(s3.bor.as_ref().unwrap().basis.starts_with("data quality:"));
}

#[test]
fn thread_count_does_not_change_results() {
    let a = TempDir::new().unwrap();
    let b = TempDir::new().unwrap();
    let single = run_full(a.path(), 1);
    let multi = run_full(b.path(), 4);

    for name in ["timepoints.tsv", "bor.tsv", "rs.tsv"] {
        let left = fs::read_to_string(single.output.out_dir.join(name)).unwrap();
        let right = fs::read_to_string(multi.output.out_dir.join(name)).unwrap();
        assert_eq!(left, right, "{}", name);
    }
}

#[test]
fn baseline_reference_file_is_applied() {
    let tmp = TempDir::new().unwrap();
    let input = tmp.path().join("lesions.tsv");
    fs::write(&input, FEED).unwrap();
    let refs = tmp.path().join("ref.tsv");
    fs::write(&refs, "subject_id\treference_date\nS2\t2023-12-01\nS9\t2024-01-01\n").unwrap();

    let mut ctx = Ctx::new(
        input,
        tmp.path().join("out"),
        Some(refs),
        None,
        false,
        false,
        "0.0.0-test",
    );
    Pipeline::validate().run(&mut ctx).unwrap();

    let s2 = ctx.subjects.iter().find(|s| s.subject_id == "S2").unwrap();
    assert!(s2.timeline.is_none());
    assert_eq!(s2.bor.as_ref().unwrap().bor, ResponseCategory::Ne);
    assert_eq!(ctx.error_count(), 2);
    assert!(ctx.warnings.iter().any(|w| w.contains("S9")));
    assert!(!ctx.output.out_dir.exists());
}
