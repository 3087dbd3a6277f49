// SPDX-License-Identifier: MIT OR Apache-2.0

//! Correlated log lines from fanned-out request handling.

use super::say;
use crate::branch;
use crate::correlation::CorrelationService;
use futures::future::join_all;
use std::time::Duration;

pub async fn run() -> anyhow::Result<()> {
    say("\n=== Logging Context Example ===\n");
    let service = CorrelationService::global();
    process_request(service, "Get User Profile").await?;
    process_request(service, "Update Settings").await?;
    Ok(())
}

/// Handles one request inside a fresh correlation scope.
pub async fn process_request(service: &'static CorrelationService, request: &str) -> anyhow::Result<()> {
    let _scope = service.new_scope();
    service.log(&format!("Starting request: {request}"));

    let (data, background) = futures::join!(
        branch::fork(data_access(service, request.to_string())),
        branch::fork(background_work(service, request.to_string()))
    );
    data?;
    background?;

    service.log(&format!("Completed request: {request}"));
    Ok(())
}

async fn data_access(service: &'static CorrelationService, operation: String) -> anyhow::Result<()> {
    service.log(&format!("Starting database operation for {operation}"));
    tokio::time::sleep(Duration::from_millis(100)).await;

    let query = operation.clone();
    branch::spawn(async move {
        service.log(&format!("Executing database query for {query}"));
        tokio::time::sleep(Duration::from_millis(50)).await;
        service.log(&format!("Database query completed for {query}"));
    })
    .await?;

    service.log(&format!("Database operation completed for {operation}"));
    Ok(())
}

async fn background_work(service: &'static CorrelationService, operation: String) -> anyhow::Result<()> {
    service.log(&format!("Starting background processing for {operation}"));

    let tasks = [(1, 75), (2, 50)].map(|(n, delay)| {
        let operation = operation.clone();
        branch::spawn(async move {
            service.log(&format!("Background task {n} for {operation}"));
            tokio::time::sleep(Duration::from_millis(delay)).await;
        })
    });
    for result in join_all(tasks).await {
        result?;
    }

    service.log(&format!("Background processing completed for {operation}"));
    Ok(())
}
