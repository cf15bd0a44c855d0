use std::time::Instant;

use super::hierarchy::BucketHierarchy;
use super::summary::{summarize, Summary};

// Metric family names are part of the scrape contract; scrape-side
// dashboards and alerts key on them verbatim.
const GLOBAL_TIMINGS: &str = "solvronis_global_response_timings";
const ROUTE_TIMINGS: &str = "solvronis_route_response_timings";
const ROUTE_STATUS_TIMINGS: &str = "solvronis_route_status_response_timings";
const REQUEST_COUNT: &str = "solvronis_route_request_count";

/// Renders the full text exposition for `buckets`.
///
/// Walks routes → methods → statuses in first-creation order. Every leaf
/// is evicted as it is visited (a real mutation, so even a pure scrape
/// keeps windows trimmed), its counter line is always emitted, and its
/// timing summary only when samples remain. Leaf sample arrays are sorted
/// once, then flattened and re-sorted per method and once more for the
/// global summary, so each level's quantiles come from the union of its
/// children's retained samples.
pub(crate) fn render_report(buckets: &mut BucketHierarchy, now: Instant) -> String {
    let mut lines: Vec<String> = vec![
        format!("# HELP {GLOBAL_TIMINGS} Response time summary across every route"),
        format!("# TYPE {GLOBAL_TIMINGS} summary"),
        format!("# HELP {ROUTE_TIMINGS} Response time summary per route and method"),
        format!("# TYPE {ROUTE_TIMINGS} summary"),
        format!("# HELP {ROUTE_STATUS_TIMINGS} Response time summary per route, method and status"),
        format!("# TYPE {ROUTE_STATUS_TIMINGS} summary"),
        format!("# HELP {REQUEST_COUNT} Requests observed per route, method and status"),
        format!("# TYPE {REQUEST_COUNT} counter"),
    ];

    let mut global_samples: Vec<Vec<f64>> = Vec::new();

    for route_level in buckets.routes_mut() {
        let route = route_level.route().to_owned();

        for method_level in route_level.methods_mut() {
            let method = method_level.method().to_owned();
            let mut method_samples: Vec<Vec<f64>> = Vec::new();

            for leaf in method_level.statuses_mut() {
                let status = leaf.status();
                let window = leaf.window_mut();
                window.evict_stale(now);

                // Counter line reflects the lifetime count, not sample
                // presence; emitted even for an empty window.
                lines.push(format!(
                    "{REQUEST_COUNT}{{route=\"{route}\", method=\"{method}\", status=\"{status}\"}} {}",
                    window.request_count()
                ));

                if window.is_empty() {
                    continue;
                }

                let mut values = window.elapsed_values();
                values.sort_by(|a, b| a.total_cmp(b));
                let labels = format!(
                    "route=\"{route}\", method=\"{method}\", status=\"{status}\""
                );
                push_summary_lines(
                    &mut lines,
                    ROUTE_STATUS_TIMINGS,
                    &labels,
                    &summarize(&values),
                );
                method_samples.push(values);
            }

            if !method_samples.is_empty() {
                let mut flattened = method_samples.concat();
                flattened.sort_by(|a, b| a.total_cmp(b));
                let labels = format!("route=\"{route}\", method=\"{method}\"");
                push_summary_lines(
                    &mut lines,
                    ROUTE_TIMINGS,
                    &labels,
                    &summarize(&flattened),
                );
                global_samples.push(flattened);
            }
        }
    }

    if !global_samples.is_empty() {
        let mut flattened = global_samples.concat();
        flattened.sort_by(|a, b| a.total_cmp(b));
        push_summary_lines(&mut lines, GLOBAL_TIMINGS, "", &summarize(&flattened));
    }

    lines.join("\n")
}

/// One line per present quantile, then `_sum` and `_count`. An empty
/// `labels` string means the unlabeled (global) family.
fn push_summary_lines(
    lines: &mut Vec<String>,
    name: &str,
    labels: &str,
    summary: &Summary,
) {
    for (label, value) in &summary.quantiles {
        if labels.is_empty() {
            lines.push(format!("{name}{{quantile=\"{label}\"}} {value}"));
        } else {
            lines.push(format!("{name}{{{labels}, quantile=\"{label}\"}} {value}"));
        }
    }
    if labels.is_empty() {
        lines.push(format!("{name}_sum {}", summary.sum));
        lines.push(format!("{name}_count {}", summary.count));
    } else {
        lines.push(format!("{name}_sum{{{labels}}} {}", summary.sum));
        lines.push(format!("{name}_count{{{labels}}} {}", summary.count));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn header_only() -> String {
        let mut empty = BucketHierarchy::new();
        render_report(&mut empty, Instant::now())
    }

    #[test]
    fn empty_hierarchy_renders_header_only() {
        let report = header_only();
        assert_eq!(report.lines().count(), 8);
        assert!(report.starts_with("# HELP solvronis_global_response_timings"));
        assert!(report.ends_with("# TYPE solvronis_route_request_count counter"));
    }

    #[test]
    fn aggregates_statuses_into_route_and_global_summaries() {
        let now = Instant::now();
        let mut buckets = BucketHierarchy::new();

        let ok = buckets.get_or_create("/a", "GET", 200);
        ok.note_request();
        ok.record_sample(now, 10.0);
        ok.note_request();
        ok.record_sample(now, 20.0);

        let err = buckets.get_or_create("/a", "GET", 500);
        err.note_request();
        err.record_sample(now, 5000.0);

        let report = render_report(&mut buckets, now);
        let lines: Vec<&str> = report.lines().collect();

        assert!(lines.contains(
            &r#"solvronis_route_request_count{route="/a", method="GET", status="200"} 2"#
        ));
        assert!(lines.contains(
            &r#"solvronis_route_request_count{route="/a", method="GET", status="500"} 1"#
        ));

        // Status level: [10, 20] → median is the rank-1 sample.
        assert!(lines.contains(
            &r#"solvronis_route_status_response_timings{route="/a", method="GET", status="200", quantile="0.5"} 10"#
        ));
        assert!(lines.contains(
            &r#"solvronis_route_status_response_timings_sum{route="/a", method="GET", status="200"} 30"#
        ));

        // Route+method level: union of both statuses, re-sorted.
        assert!(lines.contains(
            &r#"solvronis_route_response_timings_sum{route="/a", method="GET"} 5030"#
        ));
        assert!(lines.contains(
            &r#"solvronis_route_response_timings_count{route="/a", method="GET"} 3"#
        ));
        assert!(lines.contains(
            &r#"solvronis_route_response_timings{route="/a", method="GET", quantile="0.5"} 20"#
        ));

        // Global level mirrors the single route's totals here.
        assert!(lines.contains(&"solvronis_global_response_timings_sum 5030"));
        assert!(lines.contains(&"solvronis_global_response_timings_count 3"));
    }

    #[test]
    fn route_summary_equals_summary_of_status_union() {
        let now = Instant::now();
        let mut buckets = BucketHierarchy::new();
        let spread = [3.0, 9.0, 1.0, 7.0, 5.0];
        for (i, &elapsed) in spread.iter().enumerate() {
            let status = if i % 2 == 0 { 200 } else { 404 };
            let window = buckets.get_or_create("/u", "GET", status);
            window.note_request();
            window.record_sample(now, elapsed);
        }

        let report = render_report(&mut buckets, now);

        let mut union = spread.to_vec();
        union.sort_by(|a, b| a.total_cmp(b));
        let expected = summarize(&union);
        for (label, value) in &expected.quantiles {
            let line = format!(
                r#"solvronis_route_response_timings{{route="/u", method="GET", quantile="{label}"}} {value}"#
            );
            assert!(
                report.lines().any(|l| l == line),
                "missing line: {line}"
            );
        }
    }

    #[test]
    fn countless_window_emits_counter_but_no_timings() {
        let now = Instant::now();
        let mut buckets = BucketHierarchy::new();
        // A request whose caller never set a start mark: counted, no sample.
        buckets.get_or_create("/p", "POST", 201).note_request();

        let report = render_report(&mut buckets, now);

        assert!(report.contains(
            r#"solvronis_route_request_count{route="/p", method="POST", status="201"} 1"#
        ));
        assert!(!report.contains(r#"solvronis_route_status_response_timings{route="/p""#));
        // No samples anywhere → no aggregate summaries either.
        assert!(!report.contains("solvronis_global_response_timings_sum"));
    }

    #[test]
    fn render_evicts_as_it_walks() {
        let now = Instant::now() + Duration::from_secs(3600);
        let mut buckets = BucketHierarchy::new();
        let window = buckets.get_or_create("/old", "GET", 200);
        window.note_request();
        window.record_sample(now - Duration::from_secs(120), 8.0);

        let report = render_report(&mut buckets, now);

        // The stale sample is gone from the output...
        assert!(report.contains(
            r#"solvronis_route_request_count{route="/old", method="GET", status="200"} 1"#
        ));
        assert!(!report.contains("solvronis_route_status_response_timings{route=\"/old\""));
        // ...and from the window itself.
        assert!(buckets.get_or_create("/old", "GET", 200).is_empty());
    }

    #[test]
    fn repeated_render_is_stable_without_new_traffic() {
        let now = Instant::now();
        let mut buckets = BucketHierarchy::new();
        for route in ["/b", "/a"] {
            let window = buckets.get_or_create(route, "GET", 200);
            window.note_request();
            window.record_sample(now, 12.5);
        }

        let first = render_report(&mut buckets, now);
        let second = render_report(&mut buckets, now);
        assert_eq!(first, second);

        // Insertion order, not lexicographic: /b renders before /a.
        let b_pos = first.find(r#"route="/b""#).unwrap();
        let a_pos = first.find(r#"route="/a""#).unwrap();
        assert!(b_pos < a_pos);
    }
}
