// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! What ends up in the JSON log output.

mod common;

use axum::http::StatusCode;
use common::{create_test_app, get_request, refresh_token_for, register, send};
use std::io::Write;
use std::sync::{Arc, Mutex};
use tracing::subscriber::DefaultGuard;
use tracing::Level;

/// Shared buffer the JSON formatter writes into.
#[derive(Clone, Default)]
struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

impl CapturedLogs {
    fn contents(&self) -> String {
        String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
    }
}

impl Write for CapturedLogs {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

/// Route this thread's log output into a buffer until the guard drops.
fn capture_logs() -> (CapturedLogs, DefaultGuard) {
    let logs = CapturedLogs::default();
    let writer = logs.clone();
    let subscriber = tracing_subscriber::fmt()
        .json()
        .with_current_span(true)
        .with_span_list(true)
        .with_max_level(Level::TRACE)
        .with_writer(move || writer.clone())
        .finish();
    (logs, tracing::subscriber::set_default(subscriber))
}

#[tokio::test]
async fn test_file_request_logs_omit_refresh_token() {
    let (logs, _guard) = capture_logs();

    let app = create_test_app();
    let token = refresh_token_for(&app, "42").await;

    let (status, _) = send(
        &app.router,
        get_request(&format!(
            "/api/v1/file?discordId=42&refreshToken={}&prefix=configs",
            token
        )),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let output = logs.contents();
    assert!(output.contains("/api/v1/file"), "no request logged: {}", output);
    assert!(
        !output.contains(&token),
        "refresh token leaked into logs: {}",
        output
    );
    assert!(!output.contains("refreshToken="));
}

#[tokio::test]
async fn test_failed_reenable_is_logged() {
    let (logs, _guard) = capture_logs();

    let app = create_test_app();
    register(&app, "1001").await;
    app.pool.set_enable_fails(true);

    let body = register(&app, "1001").await;
    assert!(body["credentials"]["refresh_token"].is_string());

    let output = logs.contents();
    assert!(
        output.contains("Could not re-enable existing user"),
        "missing warning: {}",
        output
    );
}
