mod common;

use csv_insights::Analysis;

use common::{analyze, dataset, monthly_sales, numeric_dataset};

fn sales() -> Analysis {
    analyze(&monthly_sales())
}

#[test]
fn total_sums_positive_columns() {
    let answer = sales().answer_question("What is the total revenue?");
    assert!(answer.answer.starts_with("Summary of totals in your sales data"));
    assert!(answer.answer.contains("Grand Total: 26,286"));
    assert!(answer.answer.contains("\u{2022} revenue: 26,100"));
    assert!(!answer.answer.contains("refunds"));
    assert_eq!(answer.follow_up.len(), 3);
}

#[test]
fn highest_reports_peak_row() {
    let answer = sales().answer_question("Which month had the highest revenue?");
    assert!(
        answer
            .answer
            .starts_with("The peak revenue in your sales data is 9,000, found in row 6.")
    );
    assert_eq!(answer.follow_up[0], "What caused the high revenue in row 6?");
}

#[test]
fn lowest_uses_named_column() {
    let answer = sales().answer_question("What is the lowest units value?");
    assert!(
        answer
            .answer
            .starts_with("The lowest units in your sales data is 10, found in row 1.")
    );
}

#[test]
fn average_reports_mean_and_median() {
    let answer = sales().answer_question("What is the average units?");
    assert!(answer.answer.contains("The average (mean) units in your sales data is 15.5"));
    assert!(answer.answer.contains("The median (middle value) is 15.5"));
}

#[test]
fn cause_points_at_extreme_row() {
    let answer = sales().answer_question("Why is revenue so high?");
    assert!(answer.answer.starts_with("The \"revenue\" shows"));
    assert!(answer.answer.contains("The most extreme value is 9,000 in row 6"));
    assert!(answer.answer.contains("Found 1 unusual data point(s)"));
    assert_eq!(answer.follow_up[2], "Should I investigate row 6 specifically?");
}

#[test]
fn anomaly_question_lists_most_significant() {
    let answer = sales().answer_question("Are there any outliers?");
    assert!(answer.answer.starts_with("Found 1 unusual data point(s) in your sales data"));
    assert!(answer.answer.contains("\u{2022} Column: revenue"));
    assert!(answer.answer.contains("\u{2022} Row: 6"));
}

#[test]
fn anomaly_question_without_anomalies_reassures() {
    let analysis = analyze(&numeric_dataset("visits", &[1.0, 2.0, 3.0, 4.0]));
    let answer = analysis.answer_question("anything unusual?");
    assert!(answer.answer.starts_with("Great news!"));
    assert_eq!(answer.follow_up.len(), 3);
}

#[test]
fn comparison_of_two_named_columns() {
    let answer = sales().answer_question("Compare revenue vs units");
    assert!(answer.answer.starts_with("Comparison: \"revenue\" vs \"units\""));
    assert!(answer.answer.contains("\"units\":\n\u{2022} Average: 15.5"));
    assert_eq!(answer.follow_up[0], "Why is revenue higher than units?");
}

#[test]
fn trend_growth_describe_recommend_and_benchmark() {
    let analysis = sales();
    let trend = analysis.answer_question("What trends exist in my data?");
    assert!(trend.answer.contains("Strongest Pattern:"));

    let growth = analysis.answer_question("Which metrics show growth?");
    assert!(growth.answer.starts_with("Growth Analysis for your sales data"));
    assert!(growth.answer.contains("units"));

    let describe = analysis.answer_question("Tell me about units");
    assert!(describe.answer.starts_with("\"units\" Analysis in your sales data"));
    assert!(describe.answer.contains("\u{2022} Total: 186"));

    let recommend = analysis.answer_question("What should I do next?");
    assert!(recommend.answer.starts_with("Recommendations for your sales data"));
    assert!(recommend.answer.contains("Investigate Anomalies"));

    let benchmark = analysis.answer_question("How do we stack up against industry benchmarks?");
    assert!(benchmark.answer.starts_with("Benchmarks and context"));
    assert!(benchmark.answer.contains("Domain Context"));
}

#[test]
fn unmatched_question_gets_help() {
    let answer = sales().answer_question("hello there");
    assert!(answer.answer.starts_with("I'd be happy to help you analyze your sales data!"));
    assert!(answer.answer.contains("1. revenue"));
    assert_eq!(answer.follow_up.len(), 4);
}

#[test]
fn declining_handler_falls_through_to_help() {
    let analysis = analyze(&numeric_dataset("refunds", &[0.0, 0.0, 0.0]));
    let answer = analysis.answer_question("What is the total?");
    assert!(answer.answer.starts_with("I'd be happy to help"));
}

#[test]
fn empty_dataset_gets_no_data_answer() {
    let analysis = analyze(&dataset(&["revenue"], &[]));
    let answer = analysis.answer_question("What is the total revenue?");
    assert!(answer.answer.starts_with("There is no data to analyze yet."));
    assert_eq!(answer.follow_up.len(), 2);
}

#[test]
fn matching_is_case_insensitive() {
    let analysis = sales();
    assert_eq!(
        analysis.answer_question("WHAT IS THE TOTAL REVENUE?"),
        analysis.answer_question("what is the total revenue?")
    );
}
