//! Integration tests for rule-based window labeling

use chrono::{Duration, NaiveDateTime};
use motion_dataset::loader::parse_timestamp;
use motion_dataset::{
    assign_labels, LabelRule, LabelRuleSet, Labeler, LabelingConfig, Window, WindowDataset,
    WindowLabel,
};

fn at(s: &str) -> NaiveDateTime {
    parse_timestamp(s).unwrap()
}

fn session_rules() -> Vec<LabelRule> {
    vec![
        LabelRule::new("2025-07-25", "14:55:00", "16:15:00", "sedentary"),
        LabelRule::new("2025-08-01", "16:16:00", "16:57:00", "light"),
        LabelRule::new("2025-08-04", "16:35:00", "17:29:59", "sedentary"),
        LabelRule::new("2025-08-04", "17:30:00", "18:15:00", "sleep"),
        LabelRule::new("2025-08-04", "18:20:00", "18:31:00", "moderate-vigorous"),
        LabelRule::new("2025-08-04", "20:58:00", "22:06:00", "sedentary"),
    ]
}

/// One window every 10 s starting at `start`, all from `period_id`.
fn windows_from(start: &str, n: i64, period_id: usize) -> Vec<Window> {
    (0..n)
        .map(|i| Window {
            start: at(start) + Duration::seconds(10 * i),
            samples: vec![[0.0, 0.0, 9.81]; 3],
            period_id,
        })
        .collect()
}

#[test]
fn test_sleep_rule_scenario() {
    let rules = vec![LabelRule::new("2025-08-04", "17:30:00", "18:15:00", "sleep")];
    let rule_set = LabelRuleSet::compile(&rules, None).unwrap();
    let sleep = rule_set.class_mapping().index_of("sleep").unwrap();

    let labels = assign_labels(&[at("2025-08-04 17:45:00"), at("2025-08-04 19:00:00")], &rule_set);
    assert_eq!(labels, vec![WindowLabel::Category(sleep), WindowLabel::Unlabeled]);
}

#[test]
fn test_rule_end_boundary_inclusive() {
    let rule_set = LabelRuleSet::compile(&session_rules(), None).unwrap();
    let sleep = rule_set.class_mapping().index_of("sleep").unwrap();

    let labels = assign_labels(
        &[
            at("2025-08-04 18:15:00"),
            at("2025-08-04 17:30:00"),
            at("2025-08-04 18:15:10"),
        ],
        &rule_set,
    );
    assert_eq!(labels[0], WindowLabel::Category(sleep));
    assert_eq!(labels[1], WindowLabel::Category(sleep));
    assert_eq!(labels[2], WindowLabel::Unlabeled);
}

#[test]
fn test_default_mapping_is_alphabetical() {
    let rule_set = LabelRuleSet::compile(&session_rules(), None).unwrap();
    let mapping = rule_set.class_mapping();
    assert_eq!(mapping.index_of("light"), Some(0));
    assert_eq!(mapping.index_of("moderate-vigorous"), Some(1));
    assert_eq!(mapping.index_of("sedentary"), Some(2));
    assert_eq!(mapping.index_of("sleep"), Some(3));
}

#[test]
fn test_labeling_is_pure() {
    let rule_set = LabelRuleSet::compile(&session_rules(), None).unwrap();
    let timestamps: Vec<NaiveDateTime> = (0..500)
        .map(|i| at("2025-08-04 16:00:00") + Duration::seconds(30 * i))
        .collect();

    let first = assign_labels(&timestamps, &rule_set);
    let second = assign_labels(&timestamps, &rule_set);
    assert_eq!(first, second);
    assert_eq!(first.len(), timestamps.len());
}

#[test]
fn test_first_declared_rule_wins() {
    let rules = vec![
        LabelRule::new("2025-08-04", "17:00:00", "18:00:00", "sleep"),
        LabelRule::new("2025-08-04", "17:30:00", "18:30:00", "light"),
    ];
    let rule_set = LabelRuleSet::compile(&rules, None).unwrap();
    let mapping = rule_set.class_mapping().clone();

    let labels = assign_labels(
        &[at("2025-08-04 17:45:00"), at("2025-08-04 18:15:00")],
        &rule_set,
    );
    assert_eq!(mapping.label_name(labels[0]), "sleep");
    assert_eq!(mapping.label_name(labels[1]), "light");
}

#[test]
fn test_labeler_splits_dataset_and_reports() {
    let mut windows = windows_from("2025-08-04 17:29:40", 6, 0); // 17:29:40 .. 17:30:30
    windows.extend(windows_from("2025-08-04 19:00:00", 3, 1));
    let dataset = WindowDataset::new(windows, 3).unwrap();

    let labeling = LabelingConfig::new(session_rules());
    let output = Labeler::new(labeling.compile().unwrap()).label(&dataset).unwrap();

    // 17:29:40, 17:29:50 sedentary; 17:30:00.. sleep; period 1 unlabeled
    let mapping = output.dataset.class_mapping();
    let names: Vec<&str> = output
        .dataset
        .labels()
        .iter()
        .map(|&idx| mapping.name(idx).unwrap())
        .collect();
    assert_eq!(names, vec!["sedentary", "sedentary", "sleep", "sleep", "sleep", "sleep"]);

    assert_eq!(output.dataset.total_windows(), 9);
    assert_eq!(
        output.dataset.labeled_mask(),
        vec![true, true, true, true, true, true, false, false, false]
    );

    let report = &output.report;
    assert_eq!(report.labeled, 6);
    assert_eq!(report.unlabeled(), 3);
    assert_eq!(report.per_period[&0].labeled, 6);
    assert_eq!(report.per_period[&1].labeled, 0);
    assert_eq!(report.per_category[&3], 4);
    assert_eq!(
        report.labeled_span,
        Some((at("2025-08-04 17:29:40"), at("2025-08-04 17:30:30")))
    );
}

#[test]
fn test_explicit_categories_control_indices() {
    let labeling = LabelingConfig::new(session_rules())
        .with_categories(["sleep", "sedentary", "light", "moderate-vigorous"]);
    let rule_set = labeling.compile().unwrap();
    let labels = assign_labels(&[at("2025-08-04 17:45:00")], &rule_set);
    assert_eq!(labels, vec![WindowLabel::Category(0)]);
}

#[test]
fn test_invalid_rules_are_config_errors() {
    let rules = vec![LabelRule::new("2025-08-04", "18:15:00", "17:30:00", "sleep")];
    let err = LabelRuleSet::compile(&rules, None).unwrap_err();
    assert!(matches!(err, motion_dataset::DatasetError::Config(_)));

    let rules = vec![LabelRule::new("04/08/2025", "17:30:00", "18:15:00", "sleep")];
    assert!(LabelRuleSet::compile(&rules, None).is_err());
}
