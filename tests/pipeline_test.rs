//! End-to-end pipeline tests over a synthetic three-division snapshot.

mod common;

use chrono::NaiveDate;
use opcert::analysis::{
    Analysis, AnalysisReport, BottleneckSeverity, Category, Priority, RequirementBasis,
};
use opcert::config::AnalysisConfig;
use opcert::diagnostics::FindingKind;
use opcert::ingest::{Dataset, RecordAdapter};
use opcert::normalize::normalize;
use opcert::requirements::{Classification, RequirementLookup};
use std::collections::{BTreeSet, HashMap, HashSet};

fn dataset() -> Dataset {
    Dataset::adapt(&common::raw_snapshot(), &RecordAdapter::v1())
}

fn run(config: AnalysisConfig) -> AnalysisReport {
    let as_of = NaiveDate::from_ymd_opt(2024, 3, 1)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap();
    Analysis::new(config, as_of).unwrap().run(&dataset())
}

#[test]
fn fixture_volumes() {
    let dataset = dataset();
    assert_eq!(dataset.operators.len(), 81);
    assert_eq!(dataset.certifications.len(), common::CERTIFICATION_RECORDS);
    assert_eq!(dataset.events.len(), common::EVENTS);
}

#[test]
fn summary_counts() {
    let report = run(AnalysisConfig::default());
    let s = &report.summary;

    assert_eq!(s.operators, 81);
    assert_eq!(s.divisions, 3);
    assert_eq!(s.steps, 9);
    assert_eq!(s.requirement_entries, 9);
    assert_eq!(s.certification_records, common::CERTIFICATION_RECORDS);
    assert_eq!(s.counted_records, common::COUNTED_RECORDS);
    assert_eq!(s.events, 174);
    assert_eq!(s.operators_with_gaps, 39);
    assert_eq!(s.operators_ready, 42);
    // 75 journeys with stages: 36 x 60, 6 x 56, 9 x 46 and 24 x 20 days.
    assert_eq!(s.average_journey_days, 45.2);
}

#[test]
fn every_operator_has_one_journey() {
    let report = run(AnalysisConfig::default());
    assert_eq!(report.journeys.len(), report.summary.operators);

    let ids: BTreeSet<&str> = report
        .journeys
        .iter()
        .map(|j| j.operator_id.as_str())
        .collect();
    assert_eq!(ids.len(), report.summary.operators);
    assert!(!ids.contains(common::UNKNOWN_OPERATOR));
    for gap in &report.gaps {
        assert!(ids.contains(gap.operator_id.as_str()));
    }

    let empty: BTreeSet<String> = report
        .journeys
        .iter()
        .filter(|j| j.stages.is_empty())
        .map(|j| j.operator_id.clone())
        .collect();
    let expected: BTreeSet<String> = (0..3)
        .flat_map(|d| {
            (common::APPLICANTS_WITH_HISTORY..common::APPLICANTS)
                .map(move |n| common::operator_id(d, n))
        })
        .collect();
    assert_eq!(empty, expected);
    assert!(report
        .journeys
        .iter()
        .filter(|j| j.stages.is_empty())
        .all(|j| j.total_days == 0 && j.current_status.is_none()));
}

#[test]
fn stage_count_matches_distinct_events() {
    let dataset = dataset();
    let report = run(AnalysisConfig::default());

    let mut distinct: HashMap<&str, HashSet<(&str, &str)>> = HashMap::new();
    for event in &dataset.events {
        distinct
            .entry(event.operator_id.as_str())
            .or_default()
            .insert((event.status_id.as_str(), event.timestamp_raw.as_str()));
    }

    for journey in &report.journeys {
        let expected = distinct
            .get(journey.operator_id.as_str())
            .map_or(0, HashSet::len);
        assert_eq!(
            journey.stages.len(),
            expected,
            "operator {}",
            journey.operator_id
        );
    }

    let collapsed = report
        .findings
        .iter()
        .filter(|f| f.kind == FindingKind::DuplicateEvent)
        .count();
    assert_eq!(collapsed, 24);
}

#[test]
fn sent_back_operator_keeps_every_stage() {
    let report = run(AnalysisConfig::default());

    let journey = report.journey(&common::operator_id(1, 10)).unwrap();
    let path: Vec<(&str, i64)> = journey
        .stages
        .iter()
        .map(|s| (s.status.as_str(), s.days))
        .collect();
    assert_eq!(
        path,
        vec![
            ("Applicant", 15),
            ("Onboarding", 5),
            ("Applicant", 7),
            ("Onboarding", 29),
        ]
    );
    assert_eq!(journey.current_status.as_deref(), Some("Onboarding"));
    assert_eq!(journey.total_days, 56);
}

#[test]
fn missing_is_a_subset_of_required() {
    let report = run(AnalysisConfig::default());
    assert_eq!(report.gaps.len(), report.summary.operators);

    for gap in &report.gaps {
        let required: BTreeSet<_> = gap.required.iter().map(|c| &c.key).collect();
        let satisfied: BTreeSet<_> = gap.satisfied.iter().map(|c| &c.key).collect();
        let missing: BTreeSet<_> = gap.missing.iter().map(|c| &c.key).collect();

        assert!(missing.is_subset(&required), "operator {}", gap.operator_id);
        assert!(missing.is_disjoint(&satisfied), "operator {}", gap.operator_id);
        assert_eq!(
            missing.len() + satisfied.len(),
            required.len(),
            "operator {}",
            gap.operator_id
        );
    }
}

#[test]
fn active_requirements_in_every_division() {
    let report = run(AnalysisConfig::default());

    for division in common::DIVISIONS {
        let active = report.requirements.get(division, "Active").unwrap();
        assert_eq!(active.population, common::ACTIVE);

        let class = |name: &str| {
            active
                .certification(&normalize(name))
                .map(|c| c.classification)
        };
        assert_eq!(class("Background Check"), Some(Classification::Required));
        assert_eq!(class("Drug Test"), Some(Classification::Required));
        assert_eq!(class("CPR"), Some(Classification::Common));
        assert_eq!(class("First Aid"), Some(Classification::Optional));
    }
}

#[test]
fn exactly_eighty_percent_is_required() {
    let report = run(AnalysisConfig::default());

    let onboarding = report.requirements.get("2 - IL", "Onboarding").unwrap();
    let drug_test = onboarding.certification(&normalize("drug test")).unwrap();
    assert_eq!(drug_test.holders, 4);
    assert_eq!(drug_test.classification, Classification::Required);

    match report.requirements.required("2 - IL", "Onboarding") {
        RequirementLookup::Computed { required } => assert_eq!(required.len(), 2),
        other => panic!("unexpected lookup {:?}", other),
    }
}

#[test]
fn gaps_point_at_the_next_step() {
    let report = run(AnalysisConfig::default());

    let applicant = report.gap(&common::operator_id(0, 0)).unwrap();
    assert_eq!(applicant.next_status, "Onboarding");
    assert_eq!(applicant.missing.len(), 2);
    assert_eq!(applicant.progress_percent, 0);

    let lacking = report.gap(&common::operator_id(1, 14)).unwrap();
    assert_eq!(lacking.current_status, "Onboarding");
    assert_eq!(lacking.next_status, "Active");
    assert_eq!(lacking.missing[0].name, "Drug Test");
    assert_eq!(lacking.progress_percent, 50);

    let ready = report.gap(&common::operator_id(1, 10)).unwrap();
    assert!(ready.is_ready());
    assert_eq!(ready.basis, RequirementBasis::Computed);
}

#[test]
fn final_step_is_checked_against_itself() {
    let report = run(AnalysisConfig::default());

    // Active operators 10 and 11 hold no drug test.
    let gap = report.gap(&common::operator_id(0, 26)).unwrap();
    assert_eq!(gap.current_status, "Active");
    assert_eq!(gap.next_status, "FINAL STATUS");
    assert_eq!(gap.target.as_ref().unwrap().status, "Active");
    assert!(gap.has_gap());
}

#[test]
fn gap_summary_by_status() {
    let report = run(AnalysisConfig::default());
    let by_status = &report.gap_summary.by_status;

    assert_eq!(by_status["Applicant"].non_compliant, 30);
    assert_eq!(by_status["Onboarding"].non_compliant, 3);
    assert_eq!(by_status["Onboarding"].missing["Drug Test"], 3);
    assert_eq!(by_status["Active"].compliant, 30);
}

#[test]
fn bottlenecks() {
    let report = run(AnalysisConfig::default());
    let b = &report.bottlenecks;

    let statuses: Vec<(&str, usize)> = b
        .statuses
        .iter()
        .map(|s| (s.status.as_str(), s.operators))
        .collect();
    assert_eq!(statuses, vec![("Active", 36), ("Applicant", 30)]);
    assert!(b
        .statuses
        .iter()
        .all(|s| s.severity == BottleneckSeverity::High));

    assert_eq!(b.divisions.len(), 3);
    assert!(b.divisions.iter().all(|d| d.status == "Active"));
    assert!(b.health.iter().all(|h| h.spread == 2));
    assert!(b.empty_steps.is_empty());
}

#[test]
fn journey_durations() {
    let report = run(AnalysisConfig::default());

    let journey = report.journey(&common::operator_id(2, 15)).unwrap();
    let days: Vec<i64> = journey.stages.iter().map(|s| s.days).collect();
    assert_eq!(days, vec![10, 21, 29]);
    assert_eq!(journey.total_days, 60);

    let onboarding = report
        .bottlenecks
        .durations
        .iter()
        .find(|d| d.status == "Onboarding")
        .unwrap();
    assert_eq!(onboarding.operators, 51);
    assert_eq!(onboarding.stages, 57);
    assert_eq!(onboarding.min_days, 5);
    assert_eq!(onboarding.max_days, 29);
}

#[test]
fn recommendations_follow_the_findings() {
    let report = run(AnalysisConfig::default());
    let recs = &report.recommendations;

    let keys: Vec<(Priority, Category)> = recs.iter().map(|r| (r.priority, r.category)).collect();
    assert_eq!(
        keys,
        vec![
            (Priority::Critical, Category::EarlyStage),
            (Priority::High, Category::VolumeBottleneck),
            (Priority::High, Category::VolumeBottleneck),
            (Priority::High, Category::DivisionIssue),
            (Priority::High, Category::DivisionIssue),
            (Priority::High, Category::DivisionIssue),
            (Priority::High, Category::ComplianceGap),
        ]
    );
    assert_eq!(
        recs[6].issue,
        "30 of 30 operators at 'Applicant' are missing 'Background Check'"
    );
    assert_eq!(recs[3].division.as_deref(), Some("1 - NY"));
}

#[test]
fn naming_drift_is_reported() {
    let report = run(AnalysisConfig::default());

    let groups: Vec<_> = report.naming.inconsistent().collect();
    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0].display_name, "Background Check");
    assert!(report
        .findings
        .iter()
        .any(|f| f.kind == FindingKind::NamingDrift));
}

#[test]
fn excluded_division_is_dropped() {
    let mut config = AnalysisConfig::default();
    config.divisions.exclude = vec!["3".to_string()];
    let report = run(config);

    assert_eq!(report.summary.operators, 54);
    assert!(report.requirements.get("3 - TX", "Active").is_none());
    assert!(report.gap(&common::operator_id(2, 0)).is_none());
    assert!(report.naming.inconsistent().next().is_none());
}

#[test]
fn report_serializes() {
    let report = run(AnalysisConfig::default());
    let json = serde_json::to_value(&report).unwrap();

    assert_eq!(json["summary"]["operators"], 81);
    assert_eq!(json["as_of"], "2024-03-01T00:00:00");
    assert_eq!(json["lifecycle"].as_array().unwrap().len(), 3);
    assert_eq!(json["journeys"].as_array().unwrap().len(), 81);
    assert_eq!(json["recommendations"][0]["priority"], "critical");
}
