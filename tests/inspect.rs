use std::time::Duration;

use flow_replay::{summarize, Flow, ReplaySettings};

fn search_flow() -> Flow {
    Flow::from_json(include_str!("fixtures/search_flow.json")).unwrap()
}

#[test]
fn test_summary_lists_every_step() {
    let summary = summarize(&search_flow(), &ReplaySettings::default());

    assert_eq!(summary.title, "Search boots");
    assert_eq!(summary.step_count, 8);
    assert_eq!(summary.steps.len(), 8);

    let kinds: Vec<_> = summary.steps.iter().map(|step| step.kind).collect();
    assert_eq!(
        kinds,
        [
            "setViewport",
            "navigate",
            "click",
            "change",
            "keyDown",
            "keyUp",
            "waitForExpression",
            "click"
        ]
    );
}

#[test]
fn test_summary_applies_timeout_cascade() {
    let flow = search_flow();

    let summary = summarize(&flow, &ReplaySettings::default());
    // Step timeout beats the flow timeout
    assert_eq!(summary.steps[6].timeout_ms, 1500);
    assert_eq!(summary.steps[2].timeout_ms, 3000);

    let mut untimed = flow.clone();
    untimed.timeout = None;
    let engine = ReplaySettings::default().with_default_timeout(Duration::from_millis(700));
    assert_eq!(summarize(&untimed, &engine).steps[2].timeout_ms, 700);
    assert_eq!(summarize(&untimed, &ReplaySettings::default()).steps[2].timeout_ms, 5000);
}

#[test]
fn test_summary_routes_and_selectors() {
    let summary = summarize(&search_flow(), &ReplaySettings::default());

    let navigate = &summary.steps[1];
    assert_eq!(navigate.target, "main");
    assert_eq!(navigate.asserted_events, ["navigation https://shop.test/"]);

    let click = &summary.steps[2];
    assert_eq!(click.selectors, ["aria/Search", "#search"]);

    let framed = &summary.steps[7];
    assert_eq!(framed.target, "https://shop.test/help");
    assert_eq!(framed.frame, [0]);
}

#[test]
fn test_human_rendering() {
    let text = summarize(&search_flow(), &ReplaySettings::default()).to_string();

    assert!(text.starts_with("Flow: Search boots (8 steps)\n"));
    assert!(text.contains("selector #search"));
    assert!(text.contains("expects navigation https://shop.test/"));
    assert!(text.contains("frame=[0]"));
}
