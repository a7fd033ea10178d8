use replay_core_types::{Flow, Step};
use replay_flow::{ReplayError, ReplaySettings, StepExecutor};
use replay_primitives::fake::{FakeBrowser, FakePage};
use replay_primitives::{DriverError, MouseButton, Viewport};
use std::sync::Arc;
use std::time::{Duration, Instant};

struct Harness {
    browser: Arc<FakeBrowser>,
    page: Arc<FakePage>,
    executor: StepExecutor,
}

fn fast_settings() -> ReplaySettings {
    ReplaySettings {
        key_settle: Duration::from_millis(10),
        scroll_poll_interval: Duration::from_millis(10),
        wait_poll_interval: Duration::from_millis(10),
        ..ReplaySettings::default()
    }
}

fn harness() -> Harness {
    harness_with(fast_settings())
}

fn harness_with(settings: ReplaySettings) -> Harness {
    let browser = Arc::new(FakeBrowser::new());
    let page = browser.new_page("https://app.test/");
    let executor = StepExecutor::new(browser.clone(), page.clone()).with_settings(settings);
    Harness {
        browser,
        page,
        executor,
    }
}

fn flow() -> Flow {
    Flow::new("executor").with_timeout(1000)
}

fn step(json: &str) -> Step {
    serde_json::from_str(json).unwrap()
}

#[tokio::test]
async fn test_set_viewport_applies_to_page() {
    let h = harness();
    h.executor
        .execute(
            &step(r#"{"type": "setViewport", "width": 1280, "height": 720, "deviceScaleFactor": 2,
                      "isMobile": true, "hasTouch": true, "isLandscape": false}"#),
            &flow(),
        )
        .await
        .unwrap();

    assert_eq!(
        h.page.viewport(),
        Some(Viewport {
            width: 1280,
            height: 720,
            device_scale_factor: 2.0,
            is_mobile: true,
            has_touch: true,
            is_landscape: false,
        })
    );
}

#[tokio::test]
async fn test_navigation_wait_is_armed_before_navigate() {
    let h = harness();
    h.executor
        .execute(
            &step(
                r#"{"type": "navigate", "url": "https://app.test/next",
                    "assertedEvents": [{"type": "navigation", "url": "https://app.test/next", "title": ""}]}"#,
            ),
            &flow(),
        )
        .await
        .unwrap();

    let journal = h.browser.journal();
    let armed = journal.position("wait_for_navigation armed").unwrap();
    let navigated = journal.position("navigate https://app.test/next").unwrap();
    assert!(armed < navigated, "journal: {:?}", journal.entries());
    assert_eq!(h.page.current_url(), "https://app.test/next");
}

#[tokio::test]
async fn test_asserted_navigation_that_never_happens_times_out() {
    let h = harness();
    let err = h
        .executor
        .execute(
            &step(
                r#"{"type": "keyDown", "key": "Enter", "timeout": 80,
                    "assertedEvents": [{"type": "navigation"}]}"#,
            ),
            &flow(),
        )
        .await
        .err()
        .unwrap();

    assert!(matches!(err, ReplayError::Driver(DriverError::Timeout(_))));
}

#[tokio::test]
async fn test_unsupported_event_type_is_fatal() {
    let h = harness();
    let err = h
        .executor
        .execute(
            &step(r#"{"type": "keyUp", "key": "a", "assertedEvents": [{"type": "download"}]}"#),
            &flow(),
        )
        .await
        .err()
        .unwrap();

    assert!(matches!(err, ReplayError::UnsupportedEventType(kind) if kind == "download"));
    assert!(!h.browser.journal().contains("key_up"));
}

#[tokio::test]
async fn test_click_and_double_click() {
    let h = harness();
    let button = h.page.main().insert("#go");

    h.executor
        .execute(
            &step(r##"{"type": "click", "selectors": [["#go"]], "offsetX": 4, "offsetY": 5, "duration": 30}"##),
            &flow(),
        )
        .await
        .unwrap();
    h.executor
        .execute(
            &step(r##"{"type": "doubleClick", "selectors": [["#go"]], "offsetX": 4, "offsetY": 5, "button": "auxiliary"}"##),
            &flow(),
        )
        .await
        .unwrap();

    let clicks = button.clicks();
    assert_eq!(clicks.len(), 2);
    assert_eq!(clicks[0].button, MouseButton::Left);
    assert_eq!(clicks[0].click_count, 1);
    assert_eq!(clicks[0].delay, Some(Duration::from_millis(30)));
    assert_eq!(clicks[1].button, MouseButton::Middle);
    assert_eq!(clicks[1].click_count, 2);
}

#[tokio::test]
async fn test_click_falls_back_to_script_click() {
    let h = harness();
    let button = h.page.main().insert("#covered");
    button.fail_clicks(DriverError::NotInteractable("covered by overlay".into()));

    h.executor
        .execute(
            &step(r##"{"type": "click", "selectors": [["#covered"]], "offsetX": 1, "offsetY": 1}"##),
            &flow(),
        )
        .await
        .unwrap();

    assert!(button.clicks().is_empty());
    assert_eq!(button.script_clicks(), 1);
}

#[tokio::test]
async fn test_click_surfaces_original_error_when_fallback_fails() {
    let h = harness();
    let button = h.page.main().insert("#dead");
    button.fail_clicks(DriverError::NotInteractable("detached".into()));
    button.fail_script_clicks(DriverError::Evaluation("click is not a function".into()));

    let err = h
        .executor
        .execute(
            &step(r##"{"type": "click", "selectors": [["#dead"]], "offsetX": 1, "offsetY": 1}"##),
            &flow(),
        )
        .await
        .err()
        .unwrap();

    assert!(matches!(
        err,
        ReplayError::Driver(DriverError::NotInteractable(message)) if message == "detached"
    ));
}

#[tokio::test]
async fn test_click_scrolls_offscreen_element_into_view() {
    let h = harness();
    let button = h.page.main().insert("#below-fold");
    button.set_in_viewport(false);

    h.executor
        .execute(
            &step(r##"{"type": "click", "selectors": [["#below-fold"]], "offsetX": 1, "offsetY": 1}"##),
            &flow(),
        )
        .await
        .unwrap();

    let journal = h.browser.journal();
    assert_eq!(journal.count("evaluate scroll_into_view"), 1);
    assert!(journal.count("evaluate page_scroll_offsets") >= 2);
    assert!(button.in_viewport());
    assert_eq!(button.clicks().len(), 1);
}

#[tokio::test]
async fn test_missing_selector_fails_with_selector_not_found() {
    let h = harness();
    let err = h
        .executor
        .execute(
            &step(r##"{"type": "hover", "selectors": [["#nope"], ["aria/Nope"]], "timeout": 50}"##),
            &flow(),
        )
        .await
        .err()
        .unwrap();

    assert!(matches!(err, ReplayError::SelectorNotFound(_)));
    assert_eq!(
        err.to_string(),
        "Could not find element for selectors: #nope; aria/Nope"
    );
}

#[tokio::test]
async fn test_change_types_only_the_missing_suffix() {
    let h = harness();
    let input = h.page.main().insert("#name");
    input.set_input_type("text");
    input.set_value("abc");

    h.executor
        .execute(
            &step(r##"{"type": "change", "selectors": [["#name"]], "value": "abcdef"}"##),
            &flow(),
        )
        .await
        .unwrap();

    assert_eq!(input.typed(), ["def"]);
    assert_eq!(input.value(), "abcdef");
    assert!(h.browser.journal().contains("evaluate reset_cursor"));
}

#[tokio::test]
async fn test_change_clears_and_retypes_without_common_prefix() {
    let h = harness();
    let input = h.page.main().insert("textarea");
    input.set_input_type("textarea");
    input.set_value("xyz");

    h.executor
        .execute(
            &step(r#"{"type": "change", "selectors": [["textarea"]], "value": "abc"}"#),
            &flow(),
        )
        .await
        .unwrap();

    assert_eq!(input.typed(), ["abc"]);
    assert_eq!(input.value(), "abc");
    assert!(h.browser.journal().contains("evaluate clear_value"));
}

#[tokio::test]
async fn test_change_equal_value_types_nothing() {
    let h = harness();
    let input = h.page.main().insert("#email");
    input.set_input_type("email");
    input.set_value("a@b.test");

    h.executor
        .execute(
            &step(r##"{"type": "change", "selectors": [["#email"]], "value": "a@b.test"}"##),
            &flow(),
        )
        .await
        .unwrap();

    assert!(input.typed().is_empty());
}

#[tokio::test]
async fn test_change_select_sets_value_then_blurs_and_focuses() {
    let h = harness();
    let select = h.page.main().insert("#size");
    select.set_input_type("select-one");

    h.executor
        .execute(
            &step(r##"{"type": "change", "selectors": [["#size"]], "value": "large"}"##),
            &flow(),
        )
        .await
        .unwrap();

    assert_eq!(select.selected(), ["large"]);
    assert_eq!(select.events(), ["blur", "focus"]);
    assert!(select.typed().is_empty());
}

#[tokio::test]
async fn test_change_other_inputs_assign_value_and_dispatch_events() {
    let h = harness();
    let picker = h.page.main().insert("#color");
    picker.set_input_type("color");

    h.executor
        .execute(
            &step(r##"{"type": "change", "selectors": [["#color"]], "value": "#ff0000"}"##),
            &flow(),
        )
        .await
        .unwrap();

    assert_eq!(picker.focus_count(), 1);
    assert_eq!(picker.value(), "#ff0000");
    assert_eq!(picker.events(), ["input", "change"]);
    assert!(picker.typed().is_empty());
}

#[tokio::test]
async fn test_key_events_pause_for_settle_interval() {
    let browser = Arc::new(FakeBrowser::new());
    let page = browser.new_page("https://app.test/");
    let executor = StepExecutor::new(browser.clone(), page);

    let started = Instant::now();
    executor
        .execute(&step(r#"{"type": "keyDown", "key": "Shift"}"#), &flow())
        .await
        .unwrap();
    assert!(started.elapsed() >= Duration::from_millis(100));

    executor
        .execute(&step(r#"{"type": "keyUp", "key": "Shift"}"#), &flow())
        .await
        .unwrap();

    let journal = browser.journal();
    assert!(journal.position("key_down Shift").unwrap() < journal.position("key_up Shift").unwrap());
}

#[tokio::test]
async fn test_hover_requires_visible_element() {
    let h = harness();
    let hidden = h.page.main().insert(".menu");
    hidden.set_visible(false);
    let shown = h.page.main().insert_after(".menu", Duration::from_millis(30));

    h.executor
        .execute(&step(r#"{"type": "hover", "selectors": [[".menu"]]}"#), &flow())
        .await
        .unwrap();

    assert!(!hidden.hovered());
    assert!(shown.hovered());
}

#[tokio::test]
async fn test_scroll_window_and_element() {
    let h = harness();
    h.executor
        .execute(&step(r#"{"type": "scroll", "x": 0, "y": 640}"#), &flow())
        .await
        .unwrap();
    assert_eq!(h.page.main().scroll_offsets(), (0.0, 640.0));

    let list = h.page.main().insert("#feed");
    h.executor
        .execute(
            &step(r##"{"type": "scroll", "selectors": [["#feed"]], "offsetX": 10, "offsetY": 250}"##),
            &flow(),
        )
        .await
        .unwrap();
    assert_eq!(list.scroll_position(), (10.0, 250.0));
}

#[tokio::test]
async fn test_wait_for_element_succeeds_once_second_element_appears() {
    let h = harness();
    h.page.main().insert(".row");
    h.page
        .main()
        .insert_after(".row", Duration::from_millis(100));

    let started = Instant::now();
    h.executor
        .execute(
            &step(r#"{"type": "waitForElement", "selectors": [[".row"]], "operator": ">=", "count": 2}"#),
            &flow(),
        )
        .await
        .unwrap();

    assert!(started.elapsed() >= Duration::from_millis(100));
}

#[tokio::test]
async fn test_wait_for_element_times_out_with_count_message() {
    let h = harness();
    h.page.main().insert(".row");

    let err = h
        .executor
        .execute(
            &step(r#"{"type": "waitForElement", "selectors": [[".row"]], "operator": "==", "count": 3, "timeout": 60}"#),
            &flow(),
        )
        .await
        .err()
        .unwrap();

    assert!(err.is_timeout());
    assert_eq!(
        err.to_string(),
        "Timeout: Could not find ==3 elements for selectors: .row"
    );
}

#[tokio::test]
async fn test_wait_for_element_at_most_counts_visible_only() {
    let h = harness();
    h.page.main().insert(".toast").set_visible(false);
    h.page.main().insert(".toast").set_visible(false);

    h.executor
        .execute(
            &step(r#"{"type": "waitForElement", "selectors": [[".toast"]], "operator": "<=", "count": 0}"#),
            &flow(),
        )
        .await
        .unwrap();
}

#[tokio::test]
async fn test_wait_for_expression() {
    let h = harness();
    h.page
        .main()
        .set_expression_truthy_after("window.ready", Duration::from_millis(30));
    h.executor
        .execute(
            &step(r#"{"type": "waitForExpression", "expression": "window.ready"}"#),
            &flow(),
        )
        .await
        .unwrap();

    h.page.main().set_expression_never_truthy("window.never");
    let err = h
        .executor
        .execute(
            &step(r#"{"type": "waitForExpression", "expression": "window.never", "timeout": 40}"#),
            &flow(),
        )
        .await
        .err()
        .unwrap();
    assert!(err.is_timeout());
}

#[tokio::test]
async fn test_emulate_network_conditions() {
    let h = harness();
    h.executor
        .execute(
            &step(r#"{"type": "emulateNetworkConditions", "download": 50000, "upload": 20000, "latency": 400}"#),
            &flow(),
        )
        .await
        .unwrap();

    let conditions = h.page.network_conditions().unwrap();
    assert_eq!(conditions.latency, 400.0);
    assert_eq!(conditions.download, 50000.0);
}

#[tokio::test]
async fn test_close_main_page() {
    let h = harness();
    h.executor
        .execute(&step(r#"{"type": "close"}"#), &flow())
        .await
        .unwrap();
    assert!(h.page.is_closed());
}

#[tokio::test]
async fn test_close_without_matching_page_is_a_no_op() {
    let h = harness();
    h.executor
        .execute(
            &step(r#"{"type": "close", "target": "https://gone.test/", "timeout": 30}"#),
            &flow(),
        )
        .await
        .unwrap();
    assert!(!h.page.is_closed());
}

#[tokio::test]
async fn test_custom_step_is_skipped() {
    let h = harness();
    h.executor
        .execute(
            &step(r#"{"type": "customStep", "name": "screenshot", "parameters": {"path": "a.png"}}"#),
            &flow(),
        )
        .await
        .unwrap();
    assert!(h.browser.journal().entries().is_empty());
}

#[tokio::test]
async fn test_step_runs_in_popup_target() {
    let h = harness();
    let popup = h
        .browser
        .open_page_after("https://app.test/popup", Duration::from_millis(40));
    let confirm = popup.main().insert("#confirm");

    h.executor
        .execute(
            &step(r##"{"type": "click", "target": "https://app.test/popup", "selectors": [["#confirm"]],
                      "offsetX": 1, "offsetY": 1}"##),
            &flow(),
        )
        .await
        .unwrap();

    assert_eq!(confirm.clicks().len(), 1);
    assert_eq!(popup.default_timeout(), Some(Duration::from_millis(1000)));
}

#[tokio::test]
async fn test_out_of_process_frame_target() {
    let h = harness();
    let widget = h.page.attach_out_of_process_frame("https://widget.test/embed");
    let pay = widget.insert("#pay");

    h.executor
        .execute(
            &step(r##"{"type": "click", "target": "https://widget.test/embed", "selectors": [["#pay"]],
                      "offsetX": 1, "offsetY": 1, "timeout": 60}"##),
            &flow(),
        )
        .await
        .unwrap();
    assert_eq!(pay.clicks().len(), 1);

    // Page-level actions go to the primary page hosting the frame
    h.executor
        .execute(
            &step(r#"{"type": "keyDown", "key": "Tab", "target": "https://widget.test/embed", "timeout": 60}"#),
            &flow(),
        )
        .await
        .unwrap();
    assert!(h.browser.journal().contains("page(https://app.test/) key_down Tab"));
}

#[tokio::test]
async fn test_unknown_target_fails_with_target_not_found() {
    let h = harness();
    let err = h
        .executor
        .execute(
            &step(r##"{"type": "click", "target": "https://ghost.test/", "selectors": [["#a"]],
                      "offsetX": 1, "offsetY": 1, "timeout": 40}"##),
            &flow(),
        )
        .await
        .err()
        .unwrap();

    assert!(matches!(err, ReplayError::TargetNotFound(url) if url == "https://ghost.test/"));
}

#[tokio::test]
async fn test_frame_path_descends_child_frames() {
    let h = harness();
    let outer = h.page.main().add_child_frame("https://app.test/outer", "outer");
    let inner = outer.add_child_frame("https://app.test/inner", "inner");
    let field = inner.insert("#deep");

    h.executor
        .execute(
            &step(r##"{"type": "click", "frame": [0, 0], "selectors": [["#deep"]], "offsetX": 1, "offsetY": 1}"##),
            &flow(),
        )
        .await
        .unwrap();
    assert_eq!(field.clicks().len(), 1);

    let err = h
        .executor
        .execute(
            &step(r##"{"type": "click", "frame": [0, 3], "selectors": [["#deep"]], "offsetX": 1, "offsetY": 1}"##),
            &flow(),
        )
        .await
        .err()
        .unwrap();
    assert!(matches!(
        err,
        ReplayError::InvalidFrameIndex {
            index: 3,
            available: 1
        }
    ));
}

#[tokio::test]
async fn test_engine_default_timeout_applies_without_step_or_flow_timeout() {
    let browser = Arc::new(FakeBrowser::new());
    let page = browser.new_page("https://app.test/");
    let executor = StepExecutor::new(browser.clone(), page)
        .with_settings(fast_settings().with_default_timeout(Duration::from_millis(40)));

    let started = Instant::now();
    let err = executor
        .execute(
            &step(r##"{"type": "hover", "selectors": [["#never"]]}"##),
            &Flow::new("no timeouts"),
        )
        .await
        .err()
        .unwrap();

    assert!(matches!(err, ReplayError::SelectorNotFound(_)));
    assert!(started.elapsed() < Duration::from_millis(1000));
}

#[tokio::test]
async fn test_close_rejects_unsupported_event_before_closing() {
    let h = harness();
    let err = h
        .executor
        .execute(
            &step(r#"{"type": "close", "assertedEvents": [{"type": "download"}]}"#),
            &flow(),
        )
        .await
        .err()
        .unwrap();

    assert!(matches!(err, ReplayError::UnsupportedEventType(kind) if kind == "download"));
    assert!(!h.page.is_closed());
}

#[tokio::test]
async fn test_custom_step_waits_for_asserted_navigation() {
    let h = harness();
    let err = h
        .executor
        .execute(
            &step(
                r#"{"type": "customStep", "name": "screenshot", "parameters": {}, "timeout": 80,
                    "assertedEvents": [{"type": "navigation"}]}"#,
            ),
            &flow(),
        )
        .await
        .err()
        .unwrap();

    assert!(matches!(err, ReplayError::Driver(DriverError::Timeout(_))));
    assert!(h.browser.journal().contains("wait_for_navigation armed"));
}

#[tokio::test]
async fn test_unsettled_scroll_is_bounded_by_step_timeout() {
    let h = harness();
    h.page.main().drift_scroll_offsets();
    let button = h.page.main().insert("#below-fold");
    button.set_in_viewport(false);

    let started = Instant::now();
    h.executor
        .execute(
            &step(
                r##"{"type": "click", "selectors": [["#below-fold"]], "offsetX": 1, "offsetY": 1,
                     "timeout": 150}"##,
            ),
            &flow(),
        )
        .await
        .unwrap();
    let elapsed = started.elapsed();

    assert!(elapsed >= Duration::from_millis(150), "elapsed: {:?}", elapsed);
    assert!(elapsed < Duration::from_millis(1000), "elapsed: {:?}", elapsed);
    assert_eq!(button.clicks().len(), 1);
}

#[tokio::test]
async fn test_unbounded_scroll_settle_keeps_polling() {
    let h = harness_with(ReplaySettings {
        bound_scroll_settle: false,
        ..fast_settings()
    });
    h.page.main().drift_scroll_offsets();
    let button = h.page.main().insert("#below-fold");
    button.set_in_viewport(false);

    let click = step(
        r##"{"type": "click", "selectors": [["#below-fold"]], "offsetX": 1, "offsetY": 1,
             "timeout": 50}"##,
    );
    let outcome = tokio::time::timeout(
        Duration::from_millis(400),
        h.executor.execute(&click, &flow()),
    )
    .await;

    assert!(outcome.is_err(), "settle poll stopped on its own");
    assert!(button.clicks().is_empty());
    // Far more samples than fit in the 50ms step timeout
    assert!(h.browser.journal().count("evaluate page_scroll_offsets") > 10);
}

#[tokio::test]
async fn test_scroll_settle_samples_page_offsets_from_child_frame() {
    let h = harness();
    let child = h.page.main().add_child_frame("https://app.test/child", "child");
    let button = child.insert("#nested");
    button.set_in_viewport(false);

    h.executor
        .execute(
            &step(r##"{"type": "click", "frame": [0], "selectors": [["#nested"]], "offsetX": 1, "offsetY": 1}"##),
            &flow(),
        )
        .await
        .unwrap();

    let journal = h.browser.journal();
    assert!(journal.contains("frame(https://app.test/) evaluate page_scroll_offsets"));
    assert!(!journal.contains("frame(https://app.test/child) evaluate page_scroll_offsets"));
    assert_eq!(button.clicks().len(), 1);
}
