//! Thread export operation.
//!
//! Fetches a post with its complete comment thread and writes the aggregate
//! to a file or stdout for an external renderer.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::time::Duration;

use chrono::Local;
use treehole_export::config::OutputTarget;
use treehole_export::export::{ExportFormat, default_file_name, write_aggregate};
use treehole_export::{
    Aggregate, CommentQuery, ExportConfig, PostId, RequestTransport, ThreadIntake,
    TreeholeClient, TreeholeError,
};

/// Exports a Treehole thread.
///
/// # Errors
///
/// Returns an error if:
/// - The post id is missing or invalid
/// - The sort order, page size, or format is invalid
/// - Any API request fails or exceeds the configured deadline
/// - Writing to the output fails
pub async fn run(config: &ExportConfig) -> Result<(), TreeholeError> {
    let pid = config.require_pid()?;
    let query = config.comment_query()?;
    let format = config.export_format()?;

    let client = TreeholeClient::for_base(config.api_base(), config.credentials())?;
    let aggregate = load_with_deadline(&client, pid, query, config.timeout()).await?;

    write_output(config, pid, &aggregate, format)
}

async fn load_with_deadline<Transport: RequestTransport>(
    client: &TreeholeClient<Transport>,
    pid: PostId,
    query: CommentQuery,
    deadline: Option<Duration>,
) -> Result<Aggregate, TreeholeError> {
    let intake = ThreadIntake::new(client);
    let Some(deadline) = deadline else {
        return intake.load(pid, query).await;
    };
    tokio::time::timeout(deadline, intake.load(pid, query))
        .await
        .map_err(|_| TreeholeError::Timeout {
            seconds: deadline.as_secs(),
        })?
}

/// Writes the aggregate to the configured output destination.
fn write_output(
    config: &ExportConfig,
    pid: PostId,
    aggregate: &Aggregate,
    format: ExportFormat,
) -> Result<(), TreeholeError> {
    let path = match config.output_target() {
        OutputTarget::Stdout => {
            let stdout = io::stdout();
            let mut writer = stdout.lock();
            return write_aggregate(&mut writer, aggregate, format);
        }
        OutputTarget::File(path) => path,
        OutputTarget::Generated => default_file_name(pid, &Local::now(), format),
    };

    let file = File::create(&path).map_err(|e| TreeholeError::Io {
        message: format!("failed to create output file '{path}': {e}"),
    })?;
    let mut writer = BufWriter::new(file);
    write_aggregate(&mut writer, aggregate, format)?;
    writer.flush().map_err(|e| TreeholeError::Io {
        message: format!("failed to flush output file: {e}"),
    })?;
    tracing::info!("wrote {path}");
    Ok(())
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use rstest::rstest;
    use serde_json::{Value, json};
    use tempfile::TempDir;
    use treehole_export::treehole::ApiRequest;

    use super::*;

    /// Answers every request after `delay`, with a one-page thread.
    struct DelayedTransport {
        delay: Duration,
    }

    #[async_trait]
    impl RequestTransport for DelayedTransport {
        async fn get(&self, request: &ApiRequest) -> Result<Value, TreeholeError> {
            tokio::time::sleep(self.delay).await;
            let data = if request.path().as_str().starts_with("pku/") {
                json!({
                    "pid": 7,
                    "text": "hello",
                    "type": "text",
                    "timestamp": 1_700_000_000,
                    "reply": 0,
                    "likenum": 0,
                    "anonymous": 1,
                    "url": ""
                })
            } else {
                json!({
                    "current_page": 1,
                    "data": [],
                    "from": null,
                    "to": null,
                    "total": 0,
                    "last_page": 1
                })
            };
            Ok(json!({
                "code": 20000,
                "message": "success",
                "timestamp": 1_700_000_000,
                "success": true,
                "data": data
            }))
        }
    }

    fn delayed_client(seconds: u64) -> TreeholeClient<DelayedTransport> {
        TreeholeClient::new(DelayedTransport {
            delay: Duration::from_secs(seconds),
        })
    }

    #[tokio::test(start_paused = true)]
    async fn slow_intake_past_deadline_times_out() {
        let client = delayed_client(3_600);

        let result = load_with_deadline(
            &client,
            pid(),
            CommentQuery::default(),
            Some(Duration::from_secs(5)),
        )
        .await;

        assert_eq!(result, Err(TreeholeError::Timeout { seconds: 5 }));
    }

    #[tokio::test(start_paused = true)]
    async fn intake_within_deadline_returns_aggregate() {
        let client = delayed_client(1);

        let aggregate = load_with_deadline(
            &client,
            pid(),
            CommentQuery::default(),
            Some(Duration::from_secs(5)),
        )
        .await
        .expect("intake should finish before the deadline");

        assert_eq!(aggregate.post.pid, 7);
        assert_eq!(aggregate.users, vec!["洞主".to_owned()]);
    }

    #[tokio::test(start_paused = true)]
    async fn intake_without_deadline_waits_for_slow_server() {
        let client = delayed_client(3_600);

        let aggregate = load_with_deadline(&client, pid(), CommentQuery::default(), None)
            .await
            .expect("intake should finish without a deadline");

        assert!(aggregate.comments.is_empty());
    }

    fn pid() -> PostId {
        PostId::new(7).expect("7 is a valid post id")
    }

    fn aggregate() -> Aggregate {
        serde_json::from_value(json!({
            "post": {
                "pid": 7,
                "text": "hello",
                "type": "text",
                "timestamp": 1_700_000_000,
                "reply": 0,
                "likenum": 0,
                "anonymous": 1,
                "url": ""
            },
            "comments": [],
            "users": ["洞主"]
        }))
        .expect("fixture should deserialise")
    }

    #[rstest]
    fn write_output_creates_named_file() {
        let dir = TempDir::new().expect("temp dir");
        let path = dir.path().join("thread.json");
        let config = ExportConfig {
            output: Some(path.to_string_lossy().into_owned()),
            ..Default::default()
        };

        write_output(&config, pid(), &aggregate(), ExportFormat::Json)
            .expect("write should succeed");

        let written = std::fs::read_to_string(&path).expect("file should exist");
        let parsed: serde_json::Value = serde_json::from_str(&written).expect("valid JSON");
        assert_eq!(parsed.pointer("/post/pid"), Some(&json!(7)));
    }

    #[rstest]
    fn write_output_reports_unwritable_path() {
        let dir = TempDir::new().expect("temp dir");
        let path = dir.path().join("missing").join("thread.json");
        let config = ExportConfig {
            output: Some(path.to_string_lossy().into_owned()),
            ..Default::default()
        };

        let result = write_output(&config, pid(), &aggregate(), ExportFormat::Json);

        assert!(
            matches!(result, Err(TreeholeError::Io { .. })),
            "expected Io error, got {result:?}"
        );
    }
}
