use std::fs;

use kira_recist::criteria::{
    CrWithNeNonTarget, ResponseCriteria, SmallLesionPolicy, TargetSelection, apply_entries,
    load_builtin, load_criteria, parse_criteria_tsv,
};
use tempfile::TempDir;

#[test]
fn builtin_matches_defaults() {
    let builtin = load_builtin().unwrap();
    assert_eq!(builtin, ResponseCriteria::default());
    assert_eq!(load_criteria(None).unwrap(), builtin);
}

#[test]
fn builtin_entries_cover_every_key() {
    let criteria = load_builtin().unwrap();
    let entries = criteria.entries();
    assert_eq!(entries.len(), 16);
    assert_eq!(entries[0], ("pr_threshold_pct", "-30".to_string()));
    assert!(entries.contains(&("small_lesion_policy", "zero".to_string())));
    assert!(entries.contains(&("confirmation_required", "true".to_string())));
}

#[test]
fn user_tsv_overlays_builtin() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("criteria.tsv");
    fs::write(
        &path,
        "# protocol overrides\nsmall_lesion_policy\tnominal\ncr_with_ne_nontarget\tne\nsd_min_days\t56\ntarget_selection\tsource\n",
    )
    .unwrap();

    let criteria = load_criteria(Some(&path)).unwrap();
    assert_eq!(criteria.small_lesion_policy, SmallLesionPolicy::Nominal);
    assert_eq!(criteria.cr_with_ne_nontarget, CrWithNeNonTarget::Ne);
    assert_eq!(criteria.sd_min_days, 56);
    assert_eq!(criteria.target_selection, TargetSelection::Source);
    assert_eq!(criteria.pd_threshold_pct, 20.0);
}

#[test]
fn unknown_key_rejected() {
    let entries = parse_criteria_tsv("pd_threshold\t25\n", "user").unwrap();
    let mut criteria = ResponseCriteria::default();
    let err = apply_entries(&mut criteria, &entries, "user").unwrap_err();
    assert!(err.to_string().contains("user:1 unknown criteria key"));
}

#[test]
fn malformed_rows_rejected() {
    assert!(parse_criteria_tsv("sd_min_days\n", "user").is_err());
    assert!(parse_criteria_tsv("sd_min_days\t42\nsd_min_days\t56\n", "user").is_err());
    assert!(parse_criteria_tsv("sd_min_days\t\n", "user").is_err());
}

#[test]
fn invalid_values_rejected() {
    let cases = [
        "confirm_min_days\t90\n",
        "study_day_origin\t2\n",
        "max_targets\t0\n",
        "confirmation_required\tyes\n",
        "pr_threshold_pct\tabc\n",
        "small_lesion_policy\thalf\n",
    ];
    for content in cases {
        let entries = parse_criteria_tsv(content, "user").unwrap();
        let mut criteria = ResponseCriteria::default();
        assert!(
            apply_entries(&mut criteria, &entries, "user").is_err(),
            "{}",
            content.trim()
        );
    }
}
