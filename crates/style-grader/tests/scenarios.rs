//! End-to-end grading scenarios.

use std::time::Duration;
use style_grader::checks::all_checks;
use style_grader::{
    grade_rules_only, grade_with, AnalysisStatus, Grader, GraderBuilder, Origin, SemanticError,
    SemanticRequest, SemanticService, Severity, StyleGuide, Violation,
};

const FULL_GUIDE: &str = "\
CRITICAL
- Every new must have a matching delete
- Code must contain comments

WARNING
- Indent with spaces, never tabs
- Use nullptr instead of NULL
- Avoid magic numbers

MINOR
- Lines must not exceed 200 characters
";

const SOURCE: &str = "\
// stats.cpp: running totals
int total(int* values, int n)
{
\tint sum = 0;
    for (int i = 0; i < n; i++) {
        sum += values[i] * 3;
    }
    int* scratch = new int[8];
    int* p = NULL;
    return sum;
}
";

/// Answers every request with a fixed response.
struct Fixed(String);

impl SemanticService for Fixed {
    async fn review(&self, _request: &SemanticRequest) -> Result<String, SemanticError> {
        Ok(self.0.clone())
    }
}

/// Never answers within any reasonable budget.
struct Stalled;

impl SemanticService for Stalled {
    async fn review(&self, _request: &SemanticRequest) -> Result<String, SemanticError> {
        tokio::time::sleep(Duration::from_secs(60)).await;
        Ok(String::new())
    }
}

fn keys(violations: &[Violation]) -> Vec<(usize, Severity, String)> {
    violations
        .iter()
        .map(|v| (v.line, v.severity, v.kind.clone()))
        .collect()
}

fn rules_grader(guide: &str) -> Grader {
    Grader::builder()
        .guide(StyleGuide::parse(guide).unwrap())
        .checks(all_checks())
        .build()
        .unwrap()
}

#[test]
fn scenario_a_mixed_indentation_flags_minority_line() {
    let guide = "CRITICAL\n- No tabs for indentation\n";
    let source = "int main()\n{\n\tint a = 0;\n    return a;\n}\n";

    let result = grade_rules_only("a.cpp", source, guide);

    assert_eq!(result.total_violations, 1);
    let v = &result.violations[0];
    assert_eq!(v.kind, "indentation");
    assert_eq!(v.severity, Severity::Warning);
    assert_eq!(v.line, 4);
    assert_eq!(v.guide_ref.as_deref(), Some("CRITICAL: No tabs for indentation"));
}

#[test]
fn scenario_b_uncommented_file_is_one_critical() {
    let guide = "CRITICAL\n- Code must contain comments\n";
    let source = "int main()\n{\n    return 0;\n}\n";

    let result = grade_rules_only("b.cpp", source, guide);

    assert_eq!(
        keys(&result.violations),
        vec![(1, Severity::Critical, "no_comments".to_string())]
    );
}

#[test]
fn scenario_c_unfreed_array_is_a_leak() {
    let guide = "CRITICAL\n- Every new must have a matching delete\n";
    let source = "// fills a buffer\nvoid fill()\n{\n    int* data = new int[5];\n    data[0] = 1;\n}\n";

    let result = grade_rules_only("c.cpp", source, guide);

    assert_eq!(
        keys(&result.violations),
        vec![(4, Severity::Critical, "memory_leak".to_string())]
    );
    assert_eq!(
        result.violations[0].snippet.as_deref(),
        Some("int* data = new int[5];")
    );
}

#[tokio::test]
async fn scenario_d_semantic_timeout_keeps_rule_based_result() {
    let expected = rules_grader(FULL_GUIDE).grade_rules_only("d.cpp", SOURCE);

    let grader = GraderBuilder::new()
        .guide(StyleGuide::parse(FULL_GUIDE).unwrap())
        .checks(all_checks())
        .semantic(Stalled)
        .semantic_timeout(Duration::from_millis(50))
        .build()
        .unwrap();
    let result = grader.grade("d.cpp", SOURCE).await;

    assert_eq!(result.status, AnalysisStatus::Success);
    assert!(result.degraded);
    assert!(result.error_message.is_none());
    assert!(!expected.violations.is_empty());
    assert_eq!(
        serde_json::to_string(&result.violations).unwrap(),
        serde_json::to_string(&expected.violations).unwrap()
    );
}

#[test]
fn rule_based_grading_is_idempotent() {
    let grader = rules_grader(FULL_GUIDE);
    let first = grader.grade_rules_only("s.cpp", SOURCE);
    let second = grader.grade_rules_only("s.cpp", SOURCE);

    assert_eq!(
        serde_json::to_string(&first.violations).unwrap(),
        serde_json::to_string(&second.violations).unwrap()
    );
}

#[tokio::test]
async fn semantic_duplicates_never_survive() {
    let rule_based = rules_grader(FULL_GUIDE).grade_rules_only("s.cpp", SOURCE);
    let leak = rule_based
        .violations
        .iter()
        .find(|v| v.kind == "memory_leak")
        .unwrap()
        .line;

    let response = format!(
        "LINE {leak} | CRITICAL | Memory Leak | scratch is never released\n\
         LINE 6 | MINOR | magic_number | 3 is unexplained\n\
         LINE 2 | WARNING | naming_convention | total is vague\n\
         LINE 2 | MINOR | naming-convention | repeated\n\
         LINE 99 | MINOR | style | past the end\n"
    );
    let result = grade_with(Fixed(response), "s.cpp", SOURCE, FULL_GUIDE).await;

    for v in &rule_based.violations {
        let same_key: Vec<&Violation> = result
            .violations
            .iter()
            .filter(|r| r.line == v.line && r.kind == v.kind)
            .collect();
        assert_eq!(same_key.len(), 1, "duplicate at {}:{}", v.line, v.kind);
        assert_eq!(same_key[0].origin, Origin::RuleBased);
    }

    let semantic: Vec<&Violation> = result
        .violations
        .iter()
        .filter(|v| v.origin == Origin::Semantic)
        .collect();
    assert_eq!(semantic.len(), 1);
    assert_eq!(semantic[0].line, 2);
    assert_eq!(semantic[0].description, "total is vague");
    assert!(!result.degraded);
}

#[tokio::test]
async fn merged_list_is_sorted_and_counted() {
    let response = "LINE 1 | MINOR | file_header | header lacks author\n\
                    LINE 11 | WARNING | style | closing brace\n"
        .to_string();
    let result = grade_with(Fixed(response), "s.cpp", SOURCE, FULL_GUIDE).await;

    assert!(result
        .violations
        .windows(2)
        .all(|pair| pair[0].line <= pair[1].line));
    assert_eq!(result.total_violations, result.violations.len());
    assert_eq!(
        result.violations_by_severity.values().sum::<usize>(),
        result.total_violations
    );
    assert_eq!(
        result.violations_by_type.values().sum::<usize>(),
        result.total_violations
    );
    assert_eq!(result.violations.last().map(|v| v.line), Some(11));
}

#[test]
fn removing_a_trigger_silences_its_check() {
    let with_null = grade_rules_only("s.cpp", SOURCE, FULL_GUIDE);
    assert!(with_null.violations.iter().any(|v| v.kind == "null_usage"));

    let without_null = FULL_GUIDE.replace("- Use nullptr instead of NULL\n", "");
    let result = grade_rules_only("s.cpp", SOURCE, &without_null);
    assert!(result.violations.iter().all(|v| v.kind != "null_usage"));
    assert_eq!(result.total_violations + 1, with_null.total_violations);
}

#[test]
fn unparseable_guide_is_an_error_status() {
    let result = grade_rules_only("s.cpp", SOURCE, "Just be tidy.\n");

    assert_eq!(result.status, AnalysisStatus::Error);
    assert!(result.error_message.is_some());
    assert_eq!(result.total_violations, 0);
}
