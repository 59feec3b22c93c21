//! End-to-end scrape tests (needs a POSIX `sh`).

#![cfg(unix)]
#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use std::collections::BTreeSet;

use axum::body::Body;
use axum::extract::State;
use axum::http::{Request, StatusCode};
use prometheus::proto::MetricFamily;
use tower::ServiceExt;

use cmd_exporter::app_state::AppState;
use cmd_exporter::collector::{metric_name, CommandCollector};
use cmd_exporter::config::{self, ExporterConfig};
use cmd_exporter::ops;
use cmd_exporter::router::build_router;

const DEMO: &str = r#"
listen_address: 127.0.0.1
port: 9111
metrics_prefix: demo
help_message: "demo commands"
commands:
  ok: "true"
  fail: "sh -c 'exit 7'"
  missing: /no/such/binary
  hello: "echo hello"
"#;

fn demo() -> ExporterConfig {
    config::load_from_str(DEMO).unwrap()
}

fn family<'a>(families: &'a [MetricFamily], name: &str) -> &'a MetricFamily {
    families
        .iter()
        .find(|f| f.get_name() == name)
        .unwrap_or_else(|| panic!("missing family {name}"))
}

fn label<'a>(f: &'a MetricFamily, name: &str) -> &'a str {
    f.get_metric()[0]
        .get_label()
        .iter()
        .find(|l| l.get_name() == name)
        .map(|l| l.get_value())
        .unwrap_or_else(|| panic!("missing label {name}"))
}

fn value(f: &MetricFamily) -> f64 {
    f.get_metric()[0].get_gauge().get_value()
}

#[test]
fn demo_scrape_values() {
    let state = AppState::new(demo()).unwrap();
    assert_eq!(state.cfg().metrics_prefix, "demo");
    let families = state.registry().gather();

    let ok = family(&families, "demo_ok");
    assert_eq!(value(ok), 0.0);
    assert_eq!(label(ok, "error"), "");
    assert_eq!(ok.get_help(), "demo commands");

    let fail = family(&families, "demo_fail");
    assert_eq!(value(fail), 7.0);

    let missing = family(&families, "demo_missing");
    assert_eq!(value(missing), -1.0);
    assert!(!label(missing, "error").is_empty());

    let hello = family(&families, "demo_hello");
    assert_eq!(value(hello), 0.0);
    assert_eq!(label(hello, "output"), "hello");
}

#[test]
fn metric_names_match_config_keys() {
    let cfg = demo();
    let collector = CommandCollector::new(&cfg).unwrap();

    let expected: BTreeSet<String> = cfg
        .commands
        .keys()
        .map(|k| format!("{}_{}", cfg.metrics_prefix, k))
        .collect();
    let described: BTreeSet<String> =
        collector.metric_names().into_iter().map(String::from).collect();
    assert_eq!(described, expected);

    let collected: BTreeSet<String> = collector
        .collect_samples()
        .into_iter()
        .map(|s| s.name)
        .collect();
    assert_eq!(collected, expected);
}

#[test]
fn descriptors_carry_output_and_error_labels() {
    let collector = CommandCollector::new(&demo()).unwrap();
    for (_, m) in collector.describe() {
        assert_eq!(m.desc().variable_labels, vec!["output", "error"]);
        assert_eq!(m.desc().help, "demo commands");
    }
}

#[test]
fn consecutive_scrapes_are_identical() {
    let collector = CommandCollector::new(&demo()).unwrap();
    let first = collector.collect_samples();
    let second = collector.collect_samples();
    assert_eq!(first, second);
}

#[test]
fn one_failure_does_not_hide_the_others() {
    let cfg = config::load_from_str(
        r#"
port: 9111
metrics_prefix: iso
commands:
  a: /no/such/binary
  b: "sh -c 'echo after'"
"#,
    )
    .unwrap();
    let samples = CommandCollector::new(&cfg).unwrap().collect_samples();
    assert_eq!(samples.len(), 2);
    assert_eq!(samples[0].value, -1.0);
    assert_eq!(samples[1].value, 0.0);
    assert_eq!(samples[1].output, "after");
}

#[test]
fn untokenizable_line_is_reported_per_sample() {
    let cfg = config::load_from_str(
        r#"
port: 9111
metrics_prefix: cfg
commands:
  bad: "sh -c 'echo"
  blank: "  "
  good: "echo fine"
"#,
    )
    .unwrap();
    let state = AppState::new(cfg).unwrap();
    let families = state.registry().gather();

    for name in ["cfg_bad", "cfg_blank"] {
        let f = family(&families, name);
        assert_eq!(value(f), -1.0, "metric={name}");
        assert!(!label(f, "error").is_empty(), "metric={name}");
        assert_eq!(label(f, "output"), "", "metric={name}");
    }

    let good = family(&families, "cfg_good");
    assert_eq!(value(good), 0.0);
    assert_eq!(label(good, "output"), "fine");
}

#[tokio::test]
async fn empty_command_map_serves_empty_metrics() {
    let cfg = config::load_from_str("port: 9111\nmetrics_prefix: none\ncommands: {}\n").unwrap();
    let state = AppState::new(cfg).unwrap();
    assert!(state.registry().gather().is_empty());

    let (_, body) = ops::render(state).await.unwrap();
    assert!(body.is_empty());
}

#[test]
fn keys_are_sanitized_and_collisions_keep_the_last_key() {
    assert_eq!(metric_name("demo", "disk-usage"), "demo_disk_usage");
    assert_eq!(metric_name("demo", "a.b c"), "demo_a_b_c");

    let cfg = config::load_from_str(
        r#"
port: 9111
metrics_prefix: demo
commands:
  disk-usage: "true"
  disk_usage: "false"
"#,
    )
    .unwrap();
    let collector = CommandCollector::new(&cfg).unwrap();
    assert_eq!(collector.metric_names(), vec!["demo_disk_usage"]);

    let samples = collector.collect_samples();
    assert_eq!(samples.len(), 1);
    assert_eq!(samples[0].key, "disk_usage");
    assert_eq!(samples[0].value, 1.0);

    // still registrable: one descriptor per name
    assert!(AppState::new(cfg).is_ok());
}

#[tokio::test]
async fn metrics_endpoint_renders_text_format() {
    let state = AppState::new(demo()).unwrap();

    let resp = ops::metrics(State(state)).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let content_type = resp.headers()["content-type"].to_str().unwrap().to_string();
    assert!(content_type.starts_with("text/plain"), "content-type={content_type}");

    let body = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    let text = String::from_utf8(body.to_vec()).unwrap();

    assert!(text.contains("# TYPE demo_ok gauge"), "{text}");
    assert!(text.contains("# HELP demo_ok demo commands"), "{text}");

    let sample_line = |name: &str| {
        text.lines()
            .find(|l| l.starts_with(&format!("{name}{{")))
            .unwrap_or_else(|| panic!("missing {name} in {text}"))
            .to_string()
    };
    assert!(sample_line("demo_ok").ends_with(" 0"));
    assert!(sample_line("demo_fail").ends_with(" 7"));
    assert!(sample_line("demo_missing").ends_with(" -1"));
    assert!(sample_line("demo_hello").contains(r#"output="hello""#));
}

#[tokio::test]
async fn overlapping_scrapes_succeed() {
    let state = AppState::new(demo()).unwrap();
    let (a, b) = tokio::join!(ops::render(state.clone()), ops::render(state));
    assert_eq!(a.unwrap().1, b.unwrap().1);
}

#[tokio::test]
async fn router_serves_metrics_path() {
    let app = build_router(AppState::new(demo()).unwrap());

    let resp = app
        .oneshot(Request::builder().uri("/metrics").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let body = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    let text = String::from_utf8(body.to_vec()).unwrap();
    for name in ["demo_ok", "demo_fail", "demo_missing", "demo_hello"] {
        assert!(text.contains(&format!("# TYPE {name} gauge")), "{text}");
    }
}

#[tokio::test]
async fn router_rejects_other_paths() {
    let app = build_router(AppState::new(demo()).unwrap());

    for uri in ["/", "/healthz", "/metrics/extra"] {
        let resp = app
            .clone()
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND, "uri={uri}");
    }
}
