//! Health probe
//!
//! Four sequential checks: server reachable, credentials accepted, core
//! models readable, latency of a trivial query. The first three are fatal;
//! the report stops at the first fatal failure.

use std::time::Duration;

use serde::Serialize;
use serde_json::{json, Value};
use tokio::time::Instant;
use tracing::info;

use super::dispatcher::Dispatcher;
use crate::error::OdooError;

pub const CORE_MODELS: [&str; 3] = ["res.partner", "res.users", "ir.model"];

const SLOW_THRESHOLD: Duration = Duration::from_secs(1);
const VERY_SLOW_THRESHOLD: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Success,
    Warning,
    Error,
}

impl HealthStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Warning => "warning",
            Self::Error => "error",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepOutcome {
    Ok(String),
    Warn(String),
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HealthStep {
    pub name: &'static str,
    pub outcome: StepOutcome,
}

/// Result of one probe run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HealthReport {
    pub steps: Vec<HealthStep>,
    pub status: HealthStatus,
}

impl HealthReport {
    fn new(steps: Vec<HealthStep>) -> Self {
        let fatal = steps
            .iter()
            .any(|s| s.name != "Performance Test" && matches!(s.outcome, StepOutcome::Failed(_)));
        let degraded = steps
            .iter()
            .any(|s| !matches!(s.outcome, StepOutcome::Ok(_)));
        let status = if fatal {
            HealthStatus::Error
        } else if degraded {
            HealthStatus::Warning
        } else {
            HealthStatus::Success
        };
        Self { steps, status }
    }

    /// Human-readable report text
    pub fn render(&self) -> String {
        let mut out = String::from("Odoo Health Check Report\n");
        out.push_str(&"=".repeat(30));
        out.push_str("\n\n");

        for (index, step) in self.steps.iter().enumerate() {
            let line = match &step.outcome {
                StepOutcome::Ok(detail) => format!("✓ OK ({})", detail),
                StepOutcome::Warn(detail) => format!("⚠ {}", detail),
                StepOutcome::Failed(detail) => format!("✗ FAILED - {}", detail),
            };
            out.push_str(&format!("{}. {}: {}\n", index + 1, step.name, line));
        }

        out.push_str("\nSummary: ");
        out.push_str(match self.status {
            HealthStatus::Error => "❌ System has issues - check failed tests above",
            HealthStatus::Warning => "⚠️ System operational with warnings",
            HealthStatus::Success => "✅ All systems operational",
        });
        out
    }
}

/// Run the probe. Never fails: every problem lands in the report.
pub async fn run_health_check(dispatcher: &Dispatcher) -> HealthReport {
    let mut steps = Vec::new();
    let limit = dispatcher.timeout();

    // 1. server reachable
    let version = match tokio::time::timeout(limit, dispatcher.connector().server_version()).await {
        Ok(Ok(version)) => version,
        Ok(Err(err)) => return fatal(steps, "Connection Test", &err),
        Err(_) => {
            return fatal(
                steps,
                "Connection Test",
                &OdooError::Timeout {
                    seconds: limit.as_secs(),
                },
            )
        }
    };
    steps.push(HealthStep {
        name: "Connection Test",
        outcome: StepOutcome::Ok(format!("Odoo {}", server_version(&version))),
    });

    // 2. credentials
    let scope = match dispatcher.open().await {
        Ok(scope) => scope,
        Err(err) => return fatal(steps, "Authentication Test", &err),
    };
    steps.push(HealthStep {
        name: "Authentication Test",
        outcome: StepOutcome::Ok(format!("UID: {}", scope.uid())),
    });

    // 3. core models
    let mut failed_models = Vec::new();
    let mut last_error = None;
    for model in CORE_MODELS {
        if let Err(err) = scope.call_args(model, "search_count", vec![json!([])]).await {
            failed_models.push(model);
            last_error = Some(err);
        }
    }
    let outcome = if failed_models.is_empty() {
        StepOutcome::Ok("Core models accessible".to_string())
    } else if failed_models.len() == CORE_MODELS.len() {
        let reason = last_error.map(|e| e.to_string()).unwrap_or_default();
        StepOutcome::Failed(format!("No core model accessible: {}", reason))
    } else {
        StepOutcome::Warn(format!("PARTIAL - Failed models: {}", failed_models.join(", ")))
    };
    let database_failed = matches!(outcome, StepOutcome::Failed(_));
    steps.push(HealthStep {
        name: "Database Access Test",
        outcome,
    });
    if database_failed {
        return HealthReport::new(steps);
    }

    // 4. latency
    let started = Instant::now();
    let outcome = match scope
        .call_args("res.partner", "search_count", vec![json!([])])
        .await
    {
        Ok(_) => classify_latency(started.elapsed()),
        Err(err) => StepOutcome::Failed(err.to_string()),
    };
    steps.push(HealthStep {
        name: "Performance Test",
        outcome,
    });

    let report = HealthReport::new(steps);
    info!(status = report.status.as_str(), "Health check finished");
    report
}

fn fatal(mut steps: Vec<HealthStep>, name: &'static str, err: &OdooError) -> HealthReport {
    steps.push(HealthStep {
        name,
        outcome: StepOutcome::Failed(err.to_string()),
    });
    HealthReport::new(steps)
}

fn server_version(version: &Value) -> String {
    version
        .get("server_version")
        .and_then(Value::as_str)
        .unwrap_or("Unknown")
        .to_string()
}

/// < 1s OK, < 5s SLOW, otherwise VERY SLOW
pub fn classify_latency(elapsed: Duration) -> StepOutcome {
    let secs = format!("{:.2}s", elapsed.as_secs_f64());
    if elapsed < SLOW_THRESHOLD {
        StepOutcome::Ok(secs)
    } else if elapsed < VERY_SLOW_THRESHOLD {
        StepOutcome::Warn(format!("SLOW ({})", secs))
    } else {
        StepOutcome::Warn(format!("VERY SLOW ({})", secs))
    }
}
