//! Domain classification from header vocabulary.
//!
//! The classifier is table driven: [`DOMAINS`] lists every known domain with
//! its keyword groups and the descriptor bundle that narratives interpolate.
//! Adding a domain means adding a row to the table. Declaration order doubles
//! as the tie-break order when two domains reach the same score.

use log::debug;
use serde::Serialize;

use crate::{
    config::AnalysisOptions,
    data::{Dataset, parse_naive_date},
    extract,
    stats::mean,
};

#[derive(Debug)]
pub struct DomainProfile {
    pub tag: &'static str,
    pub groups: &'static [&'static [&'static str]],
    pub label: &'static str,
    pub description: &'static str,
    pub metrics: &'static [&'static str],
    pub verbs: &'static [&'static str],
    pub context: &'static str,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DomainClassification {
    #[serde(rename = "type")]
    pub tag: &'static str,
    pub label: &'static str,
    pub description: &'static str,
    pub metrics: Vec<&'static str>,
    pub verbs: Vec<&'static str>,
    pub context: &'static str,
    pub confidence: f64,
    pub keywords: Vec<Vec<&'static str>>,
}

impl DomainClassification {
    fn from_profile(
        profile: &DomainProfile,
        confidence: f64,
        keywords: Vec<Vec<&'static str>>,
    ) -> Self {
        Self {
            tag: profile.tag,
            label: profile.label,
            description: profile.description,
            metrics: profile.metrics.to_vec(),
            verbs: profile.verbs.to_vec(),
            context: profile.context,
            confidence,
            keywords,
        }
    }

    /// Lower-cased label for use mid-sentence ("your sales data").
    pub fn noun(&self) -> String {
        self.label.to_lowercase()
    }

    pub fn metric(&self, idx: usize, fallback: &'static str) -> &'static str {
        self.metrics.get(idx).copied().unwrap_or(fallback)
    }

    pub fn verb(&self, idx: usize, fallback: &'static str) -> &'static str {
        self.verbs.get(idx).copied().unwrap_or(fallback)
    }

    /// Classification used when the dataset has no rows.
    pub fn empty() -> Self {
        Self::from_profile(&EMPTY, 0.0, Vec::new())
    }
}

pub static DOMAINS: &[DomainProfile] = &[
    DomainProfile {
        tag: "sales",
        groups: &[
            &["sales", "revenue", "income"],
            &["order", "quantity", "units sold"],
            &["customer", "purchase", "transaction"],
            &["region", "territory", "area"],
        ],
        label: "Sales Data",
        description: "Transaction records, customer purchases, revenue metrics, and sales performance indicators",
        metrics: &["Revenue", "Units Sold", "Average Order Value", "Customer Count"],
        verbs: &["generated", "sold", "purchased", "earned"],
        context: "sales periods, customer segments, and product performance",
    },
    DomainProfile {
        tag: "jobs",
        groups: &[
            &["job", "position", "role", "title"],
            &["salary", "wage", "compensation", "pay"],
            &["employee", "hire", "hiring", "recruitment"],
            &["department", "team", "manager"],
            &["experience", "skill", "qualification"],
            &["application", "applicant", "interview"],
        ],
        label: "Employment Data",
        description: "Job listings, salary information, hiring records, and workforce metrics",
        metrics: &["Salary Range", "Positions Available", "Applications per Role", "Hiring Rate"],
        verbs: &["paying", "offering", "hiring for", "recruiting"],
        context: "job market, salary benchmarks, and talent acquisition",
    },
    DomainProfile {
        tag: "marketing",
        groups: &[
            &["campaign", "ad", "advertisement"],
            &["impression", "click", "ctr", "conversion"],
            &["lead", "prospect", "opportunity"],
            &["audience", "segment", "target"],
            &["engagement", "reach", "follower"],
        ],
        label: "Marketing Data",
        description: "Campaign performance, audience engagement, lead generation, and conversion metrics",
        metrics: &["Impressions", "Click-through Rate", "Conversions", "Cost per Lead"],
        verbs: &["converted", "engaged", "clicked", "responded"],
        context: "campaign effectiveness, audience reach, and ROI",
    },
    DomainProfile {
        tag: "financial",
        groups: &[
            &["profit", "loss", "ebitda"],
            &["budget", "expense", "cost"],
            &["investment", "roi", "return"],
            &["asset", "liability", "equity"],
            &["cash", "flow", "balance"],
        ],
        label: "Financial Data",
        description: "Revenue, expenses, profits, investments, and other monetary metrics",
        metrics: &["Total Revenue", "Net Profit", "Operating Costs", "Cash Flow"],
        verbs: &["earned", "spent", "invested", "generated"],
        context: "fiscal performance, profitability, and financial health",
    },
    DomainProfile {
        tag: "inventory",
        groups: &[
            &["stock", "inventory", "warehouse"],
            &["sku", "product", "item"],
            &["supplier", "vendor", "po"],
            &["reorder", "lead time"],
            &["quantity", "on hand"],
        ],
        label: "Inventory Data",
        description: "Stock levels, product quantities, supply chain, and warehouse metrics",
        metrics: &["Stock Level", "Reorder Point", "Turnover Rate", "Lead Time"],
        verbs: &["stocked", "ordered", "shipped", "reordered"],
        context: "stock availability, supply chain efficiency, and reorder needs",
    },
    DomainProfile {
        tag: "healthcare",
        groups: &[
            &["patient", "diagnosis", "treatment"],
            &["admission", "discharge", "length of stay"],
            &["procedure", "surgery", "medication"],
            &["department", "ward", "room"],
            &["insurance", "billing", "claim"],
        ],
        label: "Healthcare Data",
        description: "Patient information, treatment outcomes, hospital operations, and medical metrics",
        metrics: &["Patient Count", "Treatment Duration", "Admission Rate", "Success Rate"],
        verbs: &["treated", "admitted", "discharged", "diagnosed"],
        context: "patient care quality, operational efficiency, and health outcomes",
    },
    DomainProfile {
        tag: "education",
        groups: &[
            &["student", "grade", "gpa"],
            &["course", "class", "subject"],
            &["enrollment", "admission"],
            &["teacher", "professor", "instructor"],
            &["score", "assessment", "exam"],
        ],
        label: "Education Data",
        description: "Student performance, enrollment figures, course metrics, and educational outcomes",
        metrics: &["Enrollment", "Average Grade", "Completion Rate", "Attendance"],
        verbs: &["enrolled", "completed", "graduated", "scored"],
        context: "academic performance, student success, and institutional effectiveness",
    },
    DomainProfile {
        tag: "ecommerce",
        groups: &[
            &["cart", "checkout", "abandonment"],
            &["product", "category", "sku"],
            &["review", "rating", "feedback"],
            &["shipping", "delivery", "return"],
        ],
        label: "E-Commerce Data",
        description: "Online shopping behavior, product performance, customer purchasing patterns",
        metrics: &["Cart Abandonment", "Conversion Rate", "Average Order Value", "Product Views"],
        verbs: &["bought", "added to cart", "reviewed", "purchased"],
        context: "shopping behavior, conversion funnels, and customer preferences",
    },
    DomainProfile {
        tag: "hr",
        groups: &[
            &["performance", "review", "rating"],
            &["benefit", "leave", "vacation"],
            &["turnover", "retention", "attrition"],
            &["training", "development", "certification"],
        ],
        label: "HR Data",
        description: "Employee information, performance metrics, benefits usage, and workforce analytics",
        metrics: &["Retention Rate", "Performance Score", "Training Hours", "Leave Balance"],
        verbs: &["performed", "received", "utilized", "completed"],
        context: "employee productivity, satisfaction, and organizational health",
    },
    DomainProfile {
        tag: "logistics",
        groups: &[
            &["shipment", "delivery", "route"],
            &["driver", "vehicle", "fleet"],
            &["distance", "mileage", "fuel"],
            &["eta", "dispatch", "schedule"],
        ],
        label: "Logistics Data",
        description: "Shipping schedules, delivery performance, fleet management, and transportation metrics",
        metrics: &["Delivery Time", "On-time Rate", "Distance Covered", "Fuel Efficiency"],
        verbs: &["delivered", "shipped", "dispatched", "transported"],
        context: "delivery efficiency, route optimization, and service levels",
    },
    DomainProfile {
        tag: "manufacturing",
        groups: &[
            &["production", "output", "yield"],
            &["defect", "quality", "scrap"],
            &["machine", "equipment", "maintenance"],
            &["shift", "worker", "operator"],
        ],
        label: "Manufacturing Data",
        description: "Production output, quality control, equipment performance, and operational metrics",
        metrics: &["Units Produced", "Defect Rate", "Machine Uptime", "Worker Productivity"],
        verbs: &["produced", "manufactured", "assembled", "fabricated"],
        context: "production efficiency, quality standards, and operational capacity",
    },
    DomainProfile {
        tag: "realestate",
        groups: &[
            &["property", "listing", "sale"],
            &["price", "sqft", "acre"],
            &["agent", "broker", "buyer"],
            &["mortgage", "interest", "loan"],
        ],
        label: "Real Estate Data",
        description: "Property listings, sales records, pricing trends, and market analytics",
        metrics: &["Property Price", "Days on Market", "Square Footage", "Commission"],
        verbs: &["sold", "listed", "valued", "appraised"],
        context: "market conditions, property values, and sales performance",
    },
    DomainProfile {
        tag: "customerService",
        groups: &[
            &["ticket", "case", "resolution"],
            &["response time", "wait time", "sla"],
            &["complaint", "satisfaction", "nps"],
            &["agent", "representative", "support"],
        ],
        label: "Customer Service Data",
        description: "Support tickets, resolution times, customer satisfaction, and service metrics",
        metrics: &["Resolution Time", "Satisfaction Score", "Ticket Volume", "First Contact Resolution"],
        verbs: &["resolved", "responded to", "escalated", "addressed"],
        context: "service quality, response efficiency, and customer satisfaction",
    },
    DomainProfile {
        tag: "websiteAnalytics",
        groups: &[
            &["pageview", "session", "user"],
            &["bounce", "exit", "duration"],
            &["source", "referral", "utm"],
            &["device", "browser", "location"],
        ],
        label: "Website Analytics",
        description: "Web traffic, user behavior, page performance, and visitor metrics",
        metrics: &["Page Views", "Session Duration", "Bounce Rate", "Traffic Sources"],
        verbs: &["visited", "browsed", "navigated", "engaged with"],
        context: "user engagement, site performance, and traffic patterns",
    },
    DomainProfile {
        tag: "socialMedia",
        groups: &[
            &["post", "share", "retweet"],
            &["like", "comment", "reaction"],
            &["follower", "unfollower", "growth"],
            &["engagement", "reach", "impression"],
        ],
        label: "Social Media Data",
        description: "Post performance, audience growth, engagement metrics, and content analytics",
        metrics: &["Engagement Rate", "Follower Growth", "Post Reach", "Share of Voice"],
        verbs: &["liked", "shared", "commented on", "engaged with"],
        context: "audience growth, content performance, and brand engagement",
    },
];

static TIME_SERIES: DomainProfile = DomainProfile {
    tag: "timeSeries",
    groups: &[],
    label: "Time Series Data",
    description: "Temporal data with measurements across different time periods",
    metrics: &["Period Values", "Growth Rate", "Seasonal Patterns", "Trends"],
    verbs: &["measured", "recorded", "tracked", "observed"],
    context: "temporal patterns, seasonal variations, and historical trends",
};

static GENERAL: DomainProfile = DomainProfile {
    tag: "general",
    groups: &[],
    label: "General Numeric Data",
    description: "Multi-dimensional numeric dataset for analysis",
    metrics: &["Averages", "Totals", "Ranges", "Distributions"],
    verbs: &["measured", "calculated", "aggregated", "compared"],
    context: "statistical patterns and data distributions",
};

static SURVEY: DomainProfile = DomainProfile {
    tag: "survey",
    groups: &[],
    label: "Survey/Metrics Data",
    description: "Survey responses, ratings, or metric measurements",
    metrics: &["Average Score", "Response Distribution", "Satisfaction Rate"],
    verbs: &["rated", "scored", "responded", "evaluated"],
    context: "respondent feedback, satisfaction levels, and opinion distributions",
};

static CATEGORICAL: DomainProfile = DomainProfile {
    tag: "categorical",
    groups: &[],
    label: "Categorical Data",
    description: "Text-based or categorical information without numeric analysis",
    metrics: &["Categories", "Counts", "Distributions"],
    verbs: &["categorized", "grouped", "classified", "organized"],
    context: "category distributions and groupings",
};

static EMPTY: DomainProfile = DomainProfile {
    tag: "empty",
    groups: &[],
    label: "Empty Dataset",
    description: "No records were provided for analysis",
    metrics: &[],
    verbs: &[],
    context: "no data",
};

const FALLBACK_CONFIDENCE: f64 = 0.5;
const DATE_HEADER_TOKENS: &[&str] = &["date", "month", "year"];
const SURVEY_MAGNITUDE: f64 = 100.0;

/// Scores every domain against the joined, lower-cased header text. A keyword
/// hit adds the size of its group, so dense specific groups outweigh single
/// incidental matches.
pub fn score_domains(headers: &[String]) -> Vec<(&'static DomainProfile, usize)> {
    let header_text = headers.join(" ").to_lowercase();
    DOMAINS
        .iter()
        .map(|profile| {
            let score = profile
                .groups
                .iter()
                .map(|group| {
                    group
                        .iter()
                        .filter(|keyword| header_text.contains(*keyword))
                        .count()
                        * group.len()
                })
                .sum();
            (profile, score)
        })
        .collect()
}

pub fn classify(dataset: &Dataset, options: &AnalysisOptions) -> DomainClassification {
    let headers = dataset.headers();
    let scores = score_domains(headers);
    let mut best: Option<(&'static DomainProfile, usize)> = None;
    for (profile, score) in scores {
        if score > 0 && best.is_none_or(|(_, top)| score > top) {
            best = Some((profile, score));
        }
    }

    if let Some((profile, score)) = best {
        let header_text = headers.join(" ").to_lowercase();
        let keywords = profile
            .groups
            .iter()
            .filter(|group| group.iter().any(|k| header_text.contains(k)))
            .map(|group| group.to_vec())
            .collect();
        let confidence = (0.5 + score as f64 * 0.1).min(0.95);
        debug!("Classified headers as '{}' (score {score})", profile.tag);
        return DomainClassification::from_profile(profile, confidence, keywords);
    }

    let fallback = fallback_profile(dataset, options);
    debug!("No domain keywords matched; falling back to '{}'", fallback.tag);
    DomainClassification::from_profile(fallback, FALLBACK_CONFIDENCE, Vec::new())
}

fn fallback_profile(dataset: &Dataset, options: &AnalysisOptions) -> &'static DomainProfile {
    let numeric = extract::numeric_headers(
        dataset,
        options.numeric_sample_rows,
        options.classifier_numeric_ratio,
    );
    if numeric.len() > 3 {
        if has_temporal_column(dataset, options.numeric_sample_rows) {
            return &TIME_SERIES;
        }
        return &GENERAL;
    }
    if let Some(first) = numeric.first() {
        let sampled = extract::numeric_values(dataset, first)
            .into_iter()
            .take(options.numeric_sample_rows)
            .collect::<Vec<_>>();
        if mean(&sampled).is_some_and(|avg| avg > SURVEY_MAGNITUDE) {
            return &SURVEY;
        }
        return &GENERAL;
    }
    &CATEGORICAL
}

fn has_temporal_column(dataset: &Dataset, sample_rows: usize) -> bool {
    let by_name = dataset.headers().iter().any(|header| {
        let lower = header.to_lowercase();
        DATE_HEADER_TOKENS.iter().any(|token| lower.contains(token))
    });
    by_name
        || dataset
            .headers()
            .iter()
            .any(|header| column_parses_as_dates(dataset, header, sample_rows))
}

fn column_parses_as_dates(dataset: &Dataset, column: &str, sample_rows: usize) -> bool {
    let sampled = dataset
        .column(column)
        .take(sample_rows)
        .flatten()
        .map(|value| value.as_display())
        .collect::<Vec<_>>();
    if sampled.is_empty() {
        return false;
    }
    let dates = sampled
        .iter()
        .filter(|raw| parse_naive_date(raw).is_some())
        .count();
    dates as f64 / sampled.len() as f64 > 0.7
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dataset(headers: &[&str], rows: &[&[&str]]) -> Dataset {
        Dataset::from_records(
            headers.iter().map(|h| h.to_string()).collect(),
            rows.iter()
                .map(|r| r.iter().map(|c| c.to_string()).collect())
                .collect(),
        )
        .unwrap()
    }

    #[test]
    fn scores_weight_hits_by_group_size() {
        let headers = vec!["Employee Name".to_string(), "Salary".to_string()];
        let scores = score_domains(&headers);
        let jobs = scores.iter().find(|(p, _)| p.tag == "jobs").unwrap();
        assert_eq!(jobs.1, 8);
    }

    #[test]
    fn revenue_headers_classify_as_sales() {
        let data = dataset(&["month", "revenue"], &[&["Jan", "100"]]);
        let result = classify(&data, &AnalysisOptions::default());
        assert_eq!(result.tag, "sales");
        assert_eq!(result.label, "Sales Data");
        assert!((result.confidence - 0.8).abs() < 1e-9);
        assert_eq!(result.keywords, vec![vec!["sales", "revenue", "income"]]);
    }

    #[test]
    fn confidence_is_capped() {
        let data = dataset(
            &["Employee Name", "Department", "Salary", "Job Title"],
            &[&["Ann", "Ops", "50000", "Lead"]],
        );
        let result = classify(&data, &AnalysisOptions::default());
        assert_eq!(result.tag, "jobs");
        assert_eq!(result.confidence, 0.95);
    }

    #[test]
    fn fallback_detects_time_series_by_date_values() {
        let data = dataset(
            &["when", "a", "b", "c", "d"],
            &[
                &["2024-01-01", "1", "2", "3", "4"],
                &["2024-01-02", "2", "3", "4", "5"],
            ],
        );
        assert_eq!(classify(&data, &AnalysisOptions::default()).tag, "timeSeries");
    }

    #[test]
    fn fallback_distinguishes_general_survey_and_categorical() {
        let options = AnalysisOptions::default();
        let wide = dataset(&["a", "b", "c", "d"], &[&["1", "2", "3", "4"]]);
        assert_eq!(classify(&wide, &options).tag, "general");

        let large = dataset(&["x", "y"], &[&["250", "n"], &["300", "m"]]);
        assert_eq!(classify(&large, &options).tag, "survey");

        let small = dataset(&["x"], &[&["2"], &["3"]]);
        assert_eq!(classify(&small, &options).tag, "general");

        let text = dataset(&["color", "shape"], &[&["red", "round"]]);
        let result = classify(&text, &options);
        assert_eq!(result.tag, "categorical");
        assert_eq!(result.confidence, 0.5);
        assert!(result.keywords.is_empty());
    }

    #[test]
    fn ties_resolve_to_first_declared_domain() {
        // "product" scores 3 for inventory and 3 for ecommerce.
        let data = dataset(&["product"], &[&["widget"]]);
        assert_eq!(classify(&data, &AnalysisOptions::default()).tag, "inventory");
    }
}
