use comp_refresh::extract::{PageAction, PageScript};
use comp_refresh::{BrowserSession, LaunchOptions, Locator, PageNavigator, RefreshError, Role};
use std::time::Duration;

const RATES_PAGE: &str = "data:text/html,<html><body>\
<label><input type='checkbox' id='yearly'>Yearly</label>\
<button onclick=\"document.getElementById('rates').style.display='table'\">Retrieve data</button>\
<table id='rates' style='display:none'><tr><td>Average</td><td>1.123456</td></tr></table>\
</body></html>";

fn session() -> BrowserSession {
    BrowserSession::launch(LaunchOptions::new().headless(true)).expect("Failed to launch browser")
}

#[test]
#[ignore] // Requires Chrome to be installed
fn test_script_reads_value_after_submit() {
    let mut session = session();

    let extraction = PageScript::new()
        .navigate(RATES_PAGE)
        .configure("select yearly frequency", PageAction::Check(Locator::label("Yearly")))
        .submit("retrieve data", PageAction::Click(Locator::role(Role::Button, "Retrieve data")))
        .await_ready(Locator::role(Role::Cell, "Average"))
        .read(Locator::role(Role::Cell, "Average").next_sibling("td"));

    let text = extraction
        .run(&mut session, Duration::from_secs(3), &mut |_| {})
        .expect("Failed to run script");
    assert_eq!(text.trim(), "1.123456");
}

#[test]
#[ignore]
fn test_hidden_element_times_out() {
    let mut session = session();
    session.navigate(RATES_PAGE).expect("Failed to navigate");

    let err = session
        .wait_until_visible(&Locator::id("rates"), Duration::from_millis(300))
        .unwrap_err();
    assert!(matches!(err, RefreshError::ReadinessTimeout { .. }));
}

#[test]
#[ignore]
fn test_fill_replaces_existing_value() {
    let mut session = session();
    session
        .navigate("data:text/html,<html><body><input id='q' value='old'></body></html>")
        .expect("Failed to navigate");

    let input = session.locate(&Locator::id("q")).expect("Failed to locate input");
    session.fill(&input, "Lisbon").expect("Failed to fill");

    let value = session
        .tab()
        .evaluate("document.getElementById('q').value", false)
        .expect("Failed to evaluate")
        .value;
    assert_eq!(value, Some(serde_json::json!("Lisbon")));
}
