#![cfg(unix)]

use std::time::{Duration, Instant};

use tempfile::tempdir;
use tokio_test::{assert_err, assert_ok};

use channel_dl::downloader::DownloadConfig;
use channel_dl::{BatchDownloader, DateFilter, DownloadError, DownloadRequest, ExternalTool, ProcessTool};

/// Stand-in for yt-dlp: lists two items, resolves titles, fails the second download
const FAKE_FETCHER: &str = r#"
case "$1" in
  --flat-playlist)
    printf 'https://y/1\nhttps://y/2\n'
    ;;
  --get-title)
    echo "Title for $2"
    ;;
  *)
    for last; do :; done
    if [ "$last" = "https://y/2" ]; then
      echo "ERROR: Private video" >&2
      exit 1
    fi
    ;;
esac
"#;

fn shell(script: &str) -> ProcessTool {
    ProcessTool::new("sh").with_base_args(["-c", script, "sh"])
}

fn shell_config(script: &str) -> DownloadConfig {
    DownloadConfig {
        tool_path: "sh".into(),
        tool_base_args: vec!["-c".to_string(), script.to_string(), "sh".to_string()],
        ..DownloadConfig::default()
    }
}

fn args(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| v.to_string()).collect()
}

#[tokio::test]
async fn test_capture_combines_stdout_and_stderr() {
    let tool = shell("printf out; printf err >&2");
    let output = assert_ok!(tool.capture(&[], None).await);
    assert_eq!(output, "outerr");
}

#[tokio::test]
async fn test_capture_passes_arguments() {
    let tool = shell(r#"printf '%s\n' "$@""#);
    let output = assert_ok!(tool.capture(&args(&["--get-title", "https://y/1"]), None).await);
    assert_eq!(output, "--get-title\nhttps://y/1\n");
}

#[tokio::test]
async fn test_nonzero_exit_keeps_output() {
    let tool = shell("echo 'ERROR: Unsupported URL' >&2; exit 3");
    let error = assert_err!(tool.capture(&[], None).await);

    match error {
        DownloadError::ToolExited { code, output, .. } => {
            assert_eq!(code, Some(3));
            assert_eq!(output, "ERROR: Unsupported URL\n");
        }
        other => panic!("unexpected error: {:?}", other),
    }
}

#[tokio::test]
async fn test_capture_timeout() {
    let tool = shell("sleep 5");
    let started = Instant::now();

    let error = assert_err!(tool.capture(&[], Some(Duration::from_millis(200))).await);

    assert!(matches!(error, DownloadError::ToolTimeout { .. }));
    assert!(started.elapsed() < Duration::from_secs(4));
}

#[tokio::test]
async fn test_streaming_timeout_kills_the_child() {
    let tool = shell("sleep 5");
    let started = Instant::now();

    let error = assert_err!(tool.run_streaming(&[], Some(Duration::from_millis(200))).await);

    assert!(matches!(error, DownloadError::ToolTimeout { .. }));
    assert!(started.elapsed() < Duration::from_secs(4));
}

#[tokio::test]
async fn test_missing_program() {
    let tool = ProcessTool::new("/nonexistent/yt-dlp");
    let error = assert_err!(tool.capture(&[], None).await);
    assert!(matches!(error, DownloadError::ToolSpawn { .. }));
}

#[tokio::test]
async fn test_enumeration_reaches_the_tool() {
    let downloader = assert_ok!(BatchDownloader::new(shell_config(r#"printf '%s\n' "$@""#)));
    let temp_dir = tempdir().unwrap();
    let request = DownloadRequest::new("https://www.youtube.com/@chan", temp_dir.path())
        .with_date_filter(DateFilter::parse("20240101"));

    let items = assert_ok!(downloader.enumerate(&request).await);

    assert!(items.entries().iter().any(|entry| entry == "--dateafter=20240101"));
    assert!(items.entries().iter().any(|entry| entry == "https://www.youtube.com/@chan"));
}

#[tokio::test]
async fn test_batch_against_fake_fetcher() {
    let downloader = assert_ok!(BatchDownloader::new(shell_config(FAKE_FETCHER)));
    let temp_dir = tempdir().unwrap();
    let request = DownloadRequest::new("https://www.youtube.com/@chan/videos", temp_dir.path().join("chan"));

    let summary = assert_ok!(downloader.run(&request, None).await);

    assert_eq!(summary.total_listed, 2);
    assert_eq!(summary.skipped_empty, 0);
    assert_eq!(summary.succeeded, 1);
    assert_eq!(summary.failed, 1);
    assert_eq!(summary.failures[0].item, "https://y/2");

    let log = tokio::fs::read_to_string(request.video_dir().join("names.txt"))
        .await
        .unwrap();
    assert_eq!(log, "Title for https://y/1\nTitle for https://y/2\n");
    assert!(request.audio_dir().is_dir());
}
