mod support;

use bitte_spec::{fetch_spec_with_retry, FetchError, FetchOptions, RetryPolicy};
use std::time::Duration;
use support::Reply;

fn direct() -> FetchOptions {
    FetchOptions {
        no_proxy: true,
        ..FetchOptions::default()
    }
}

fn fast(max_retries: u32) -> RetryPolicy {
    RetryPolicy::new(max_retries, Duration::from_millis(5))
}

#[tokio::test]
async fn returns_body_of_first_successful_response() -> eyre::Result<()> {
    let server = support::spawn(vec![Reply::json(r#"{"openapi":"3.0.0"}"#)]).await?;
    let text = fetch_spec_with_retry(&server.url, &direct(), &fast(3)).await?;
    assert_eq!(text, r#"{"openapi":"3.0.0"}"#);
    assert_eq!(server.hits(), 1);
    Ok(())
}

#[tokio::test]
async fn always_failing_server_gets_initial_attempt_plus_retries() -> eyre::Result<()> {
    let server = support::spawn(vec![Reply::status(500)]).await?;
    let err = match fetch_spec_with_retry(&server.url, &direct(), &fast(3)).await {
        Ok(_) => eyre::bail!("expected failure"),
        Err(e) => e,
    };

    assert_eq!(server.hits(), 4);
    let msg = err.to_string();
    assert!(msg.contains(&server.url), "message: {msg}");
    assert!(msg.contains("3 retries"), "message: {msg}");
    assert!(msg.contains("HTTP error! status: 500"), "message: {msg}");
    assert!(matches!(err, FetchError::Exhausted { retries: 3, .. }));
    Ok(())
}

#[tokio::test]
async fn recovers_after_transient_failures() -> eyre::Result<()> {
    let server = support::spawn(vec![
        Reply::status(503),
        Reply::status(502),
        Reply::json("{}"),
    ])
    .await?;
    let text = fetch_spec_with_retry(&server.url, &direct(), &fast(3)).await?;
    assert_eq!(text, "{}");
    assert_eq!(server.hits(), 3);
    Ok(())
}

#[tokio::test]
async fn malformed_json_body_is_retried() -> eyre::Result<()> {
    let server = support::spawn(vec![Reply::json("{\"openapi\":"), Reply::json("{}")]).await?;
    let text = fetch_spec_with_retry(&server.url, &direct(), &fast(1)).await?;
    assert_eq!(text, "{}");
    assert_eq!(server.hits(), 2);
    Ok(())
}

#[tokio::test]
async fn non_json_content_is_returned_unchecked() -> eyre::Result<()> {
    let server = support::spawn(vec![Reply {
        status: 200,
        content_type: "text/yaml",
        body: "openapi: 3.0.0".into(),
    }])
    .await?;
    let text = fetch_spec_with_retry(&server.url, &direct(), &fast(0)).await?;
    assert_eq!(text, "openapi: 3.0.0");
    Ok(())
}

#[tokio::test]
async fn zero_retries_makes_a_single_attempt() -> eyre::Result<()> {
    let server = support::spawn(vec![Reply::status(404)]).await?;
    let res = fetch_spec_with_retry(&server.url, &direct(), &fast(0)).await;
    assert!(res.is_err());
    assert_eq!(server.hits(), 1);
    Ok(())
}
