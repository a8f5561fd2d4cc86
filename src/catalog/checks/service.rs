//! Service probes

use crate::catalog::SERVICE_CHECK_TYPE;
use crate::core::health::{BaseCheck, CheckResult};
use crate::utils::error::{HealthError, Result};
use sea_orm::{ConnectionTrait, Database, Statement};
use std::collections::HashMap;
use std::path::PathBuf;
use std::time::{Duration, Instant, SystemTime};
use tokio::process::Command;

/// Options of [`http_endpoint`]
#[derive(Debug, Clone)]
pub struct HttpCheckOptions {
    pub name: String,
    pub url: String,
    pub method: String,
    pub headers: HashMap<String, String>,
    /// Expected status code
    pub expected_status: u16,
    /// Substring the body must contain
    pub expected_body: Option<String>,
    pub timeout: Duration,
}

impl HttpCheckOptions {
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
            method: "GET".to_string(),
            headers: HashMap::new(),
            expected_status: 200,
            expected_body: None,
            timeout: Duration::from_secs(5),
        }
    }

    pub fn with_expected_status(mut self, status: u16) -> Self {
        self.expected_status = status;
        self
    }

    pub fn with_expected_body(mut self, body: impl Into<String>) -> Self {
        self.expected_body = Some(body.into());
        self
    }

    pub fn with_header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(key.into(), value.into());
        self
    }

    pub fn with_method(mut self, method: impl Into<String>) -> Self {
        self.method = method.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// The endpoint must answer with the expected status and, if set, body substring
pub fn http_endpoint(options: HttpCheckOptions) -> Result<BaseCheck> {
    let method = reqwest::Method::from_bytes(options.method.to_ascii_uppercase().as_bytes())
        .map_err(|_| HealthError::config(format!("invalid HTTP method '{}'", options.method)))?;
    let client = reqwest::Client::builder().timeout(options.timeout).build()?;
    let timeout = options.timeout;
    let name = options.name.clone();

    Ok(BaseCheck::new(name, SERVICE_CHECK_TYPE, "http")
        .with_timeout(timeout)
        .with_check(move || {
            let client = client.clone();
            let method = method.clone();
            let options = options.clone();
            async move {
                let mut request = client.request(method.clone(), &options.url);
                for (key, value) in &options.headers {
                    request = request.header(key, value);
                }

                let started = Instant::now();
                let response = match request.send().await {
                    Ok(response) => response,
                    Err(e) => {
                        return CheckResult::unhealthy(format!("request to {} failed", options.url))
                            .with_detail("endpoint", options.url.clone())
                            .with_detail("method", method.to_string())
                            .with_error(e);
                    }
                };
                let status = response.status().as_u16();
                let elapsed_ms = started.elapsed().as_millis() as u64;

                let result = if status != options.expected_status {
                    CheckResult::unhealthy(format!(
                        "unexpected status {} from {}, expected {}",
                        status, options.url, options.expected_status
                    ))
                } else if let Some(expected) = options.expected_body.as_deref() {
                    match response.text().await {
                        Ok(body) if body.contains(expected) => {
                            CheckResult::healthy(format!("{} answered {}", options.url, status))
                        }
                        Ok(_) => CheckResult::unhealthy(format!(
                            "response from {} does not contain '{}'",
                            options.url, expected
                        )),
                        Err(e) => CheckResult::unhealthy(format!(
                            "failed to read response body from {}",
                            options.url
                        ))
                        .with_error(e),
                    }
                } else {
                    CheckResult::healthy(format!("{} answered {}", options.url, status))
                };
                result
                    .with_detail("endpoint", options.url.clone())
                    .with_detail("status_code", status)
                    .with_detail("response_time_ms", elapsed_ms)
            }
        }))
}

/// A TCP connection to `host:port` must succeed
pub fn tcp_port(name: impl Into<String>, host: impl Into<String>, port: u16) -> BaseCheck {
    let host = host.into();
    BaseCheck::new(name, SERVICE_CHECK_TYPE, "tcp").with_check(move || {
        let host = host.clone();
        async move {
            let started = Instant::now();
            match tokio::net::TcpStream::connect((host.as_str(), port)).await {
                Ok(_) => CheckResult::healthy(format!("{}:{} reachable", host, port))
                    .with_detail("host", host.clone())
                    .with_detail("port", port)
                    .with_detail("connect_ms", started.elapsed().as_millis() as u64),
                Err(e) => CheckResult::unhealthy(format!("{}:{} unreachable", host, port))
                    .with_detail("host", host.clone())
                    .with_detail("port", port)
                    .with_error(e),
            }
        }
    })
}

/// An OS process named `process_name` must be running
pub fn process(name: impl Into<String>, process_name: impl Into<String>) -> BaseCheck {
    let process_name = process_name.into();
    BaseCheck::new(name, SERVICE_CHECK_TYPE, "process").with_check(move || {
        let process_name = process_name.clone();
        async move {
            let mut command = if cfg!(windows) {
                let mut command = Command::new("tasklist");
                command
                    .arg("/FI")
                    .arg(format!("IMAGENAME eq {}", process_name));
                command
            } else {
                let mut command = Command::new("pgrep");
                command.arg(&process_name);
                command
            };
            command.kill_on_drop(true);

            match command.output().await {
                Ok(output) if output.status.success() => {
                    let stdout = String::from_utf8_lossy(&output.stdout);
                    if cfg!(windows) && !stdout.contains(&process_name) {
                        return CheckResult::unhealthy(format!("process {} is not running", process_name))
                            .with_detail("process", process_name.clone());
                    }
                    let pids: Vec<String> = stdout
                        .split_whitespace()
                        .map(str::to_string)
                        .collect();
                    CheckResult::healthy(format!("process {} is running", process_name))
                        .with_detail("process", process_name.clone())
                        .with_detail("pids", pids)
                }
                Ok(output) => CheckResult::unhealthy(format!("process {} is not running", process_name))
                    .with_detail("process", process_name.clone())
                    .with_detail("exit_code", output.status.code().unwrap_or(-1)),
                Err(e) => CheckResult::unknown(format!("failed to look up process {}", process_name))
                    .with_error(e),
            }
        }
    })
}

/// Replace the password of a URL-shaped DSN with asterisks
pub fn mask_dsn(dsn: &str) -> String {
    match url::Url::parse(dsn) {
        Ok(mut parsed) if parsed.password().is_some() => {
            if parsed.set_password(Some("******")).is_ok() {
                parsed.to_string()
            } else {
                dsn.to_string()
            }
        }
        _ => dsn.to_string(),
    }
}

/// Connecting to `dsn` and running `query` must succeed
pub fn database(name: impl Into<String>, dsn: impl Into<String>, query: impl Into<String>) -> BaseCheck {
    let dsn = dsn.into();
    let query = query.into();
    let masked = mask_dsn(&dsn);
    BaseCheck::new(name, SERVICE_CHECK_TYPE, "database").with_check(move || {
        let dsn = dsn.clone();
        let query = query.clone();
        let masked = masked.clone();
        async move {
            let started = Instant::now();
            match round_trip(&dsn, &query).await {
                Ok(()) => CheckResult::healthy("database query succeeded")
                    .with_detail("dsn", masked)
                    .with_detail("query", query)
                    .with_detail("response_time_ms", started.elapsed().as_millis() as u64),
                Err(e) => CheckResult::unhealthy("database query failed")
                    .with_detail("dsn", masked)
                    .with_detail("query", query)
                    .with_error(e),
            }
        }
    })
}

async fn round_trip(dsn: &str, query: &str) -> Result<()> {
    let connection = Database::connect(dsn).await?;
    let backend = connection.get_database_backend();
    let outcome = connection
        .query_one(Statement::from_string(backend, query.to_string()))
        .await;
    let _ = connection.close().await;
    outcome?;
    Ok(())
}

/// `path` must exist and, with `max_age`, have been modified within it
pub fn file_exists(name: impl Into<String>, path: impl Into<PathBuf>, max_age: Option<Duration>) -> BaseCheck {
    let path = path.into();
    BaseCheck::new(name, SERVICE_CHECK_TYPE, "file").with_check(move || {
        let path = path.clone();
        async move {
            let display = path.display().to_string();
            let metadata = match tokio::fs::metadata(&path).await {
                Ok(metadata) => metadata,
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                    return CheckResult::unhealthy(format!("{} does not exist", display))
                        .with_detail("path", display);
                }
                Err(e) => {
                    return CheckResult::unknown(format!("failed to stat {}", display))
                        .with_detail("path", display)
                        .with_error(e);
                }
            };

            let age = metadata
                .modified()
                .ok()
                .and_then(|modified| SystemTime::now().duration_since(modified).ok())
                .unwrap_or_default();

            let result = match max_age {
                Some(max_age) if age > max_age => CheckResult::unhealthy(format!(
                    "{} is stale: modified {}s ago, limit {}s",
                    display,
                    age.as_secs(),
                    max_age.as_secs()
                )),
                _ => CheckResult::healthy(format!("{} exists", display)),
            };
            result
                .with_detail("path", display)
                .with_detail("size_bytes", metadata.len())
                .with_detail("age_secs", age.as_secs())
        }
    })
}

/// `command` must exit successfully and, if set, print `expected_output`
pub fn command(
    name: impl Into<String>,
    program: impl Into<String>,
    args: Vec<String>,
    expected_output: Option<String>,
) -> BaseCheck {
    let program = program.into();
    BaseCheck::new(name, SERVICE_CHECK_TYPE, "command").with_check(move || {
        let program = program.clone();
        let args = args.clone();
        let expected_output = expected_output.clone();
        async move {
            let output = Command::new(&program)
                .args(&args)
                .kill_on_drop(true)
                .output()
                .await;
            let output = match output {
                Ok(output) => output,
                Err(e) => {
                    return CheckResult::unhealthy(format!("failed to run {}", program))
                        .with_detail("command", program.clone())
                        .with_error(e);
                }
            };

            let mut combined = String::from_utf8_lossy(&output.stdout).into_owned();
            combined.push_str(&String::from_utf8_lossy(&output.stderr));

            let result = if !output.status.success() {
                CheckResult::unhealthy(format!("{} exited with {}", program, output.status))
                    .with_error(format!("exit status {}", output.status))
            } else if let Some(expected) = expected_output
                .as_deref()
                .filter(|expected| !combined.contains(expected))
            {
                CheckResult::unhealthy(format!("{} output does not contain '{}'", program, expected))
            } else {
                CheckResult::healthy(format!("{} succeeded", program))
            };
            result
                .with_detail("command", program.clone())
                .with_detail("args", args)
                .with_detail("output", combined)
        }
    })
}
