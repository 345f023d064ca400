//! Integration tests for the background renderer

use base64::Engine as Base64Engine;
use bridgecheck::{Config, RenderOutcome, Viewport};
use std::path::Path;
use std::process::Command;

// 1x1 PNG
const TINY_PNG_B64: &str =
    "iVBORw0KGgoAAAANSUhEUgAAAAEAAAABCAYAAAAfFcSJAAAADUlEQVR42mNkYPhfDwAChwGA60e6kgAAAABJRU5ErkJggg==";

fn config_in(dir: &Path, image_name: &str) -> Config {
    let _ = env_logger::builder().is_test(true).try_init();
    Config {
        image_path: dir.join("public").join(image_name),
        output_path: dir.join("public/debug_screenshot.png"),
        viewport: Viewport { width: 640, height: 360 },
        settle_ms: 100,
        ..Default::default()
    }
}

fn write_tiny_png(path: &Path) {
    let bytes = base64::engine::general_purpose::STANDARD
        .decode(TINY_PNG_B64)
        .unwrap();
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(path, bytes).unwrap();
}

#[cfg(target_os = "linux")]
fn process_alive(pid: u32) -> bool {
    match std::fs::read_to_string(format!("/proc/{}/stat", pid)) {
        // Field 3 is the state; a zombie has already released everything
        Ok(stat) => !stat
            .rsplit(')')
            .next()
            .map(|rest| rest.trim_start().starts_with('Z'))
            .unwrap_or(false),
        Err(_) => false,
    }
}

#[test]
fn test_missing_image_produces_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let config = config_in(dir.path(), "background.jpg");

    let outcome = bridgecheck::render::render_with(&config, |_| -> bridgecheck::Result<bridgecheck::cdp::CdpRenderer> {
        panic!("the renderer must not be launched without an image")
    })
    .expect("render_with failed");

    assert_eq!(
        outcome,
        RenderOutcome::ImageMissing {
            path: config.image_path.clone()
        }
    );
    assert!(!config.output_path.exists());
}

#[test]
fn test_cli_reports_missing_image() {
    let dir = tempfile::tempdir().unwrap();
    let image = dir.path().join("public/background.jpg");
    let output_path = dir.path().join("public/debug_screenshot.png");

    let output = Command::new(env!("CARGO_BIN_EXE_bridgecheck"))
        .arg("render")
        .arg("--image")
        .arg(&image)
        .arg("--output")
        .arg(&output_path)
        .output()
        .expect("failed to run bridgecheck");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("not found"), "stdout was: {}", stdout);
    assert!(!output_path.exists());
}

#[test]
fn test_cli_missing_image_ignores_http_flags() {
    let dir = tempfile::tempdir().unwrap();
    let image = dir.path().join("public/background.jpg");
    let output_path = dir.path().join("public/debug_screenshot.png");

    let output = Command::new(env!("CARGO_BIN_EXE_bridgecheck"))
        .args(["--base-url", "localhost:3005", "--timeout-ms", "0"])
        .arg("render")
        .arg("--image")
        .arg(&image)
        .arg("--output")
        .arg(&output_path)
        .output()
        .expect("failed to run bridgecheck");

    assert!(output.status.success(), "stderr was: {}", String::from_utf8_lossy(&output.stderr));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("not found"), "stdout was: {}", stdout);
    assert!(!output_path.exists());
}

#[test]
fn test_cli_fails_when_image_is_directory() {
    let dir = tempfile::tempdir().unwrap();
    let image = dir.path().join("public/background.jpg");
    std::fs::create_dir_all(&image).unwrap();
    let output_path = dir.path().join("public/debug_screenshot.png");

    let output = Command::new(env!("CARGO_BIN_EXE_bridgecheck"))
        .arg("render")
        .arg("--image")
        .arg(&image)
        .arg("--output")
        .arg(&output_path)
        .output()
        .expect("failed to run bridgecheck");

    assert!(!output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(!stdout.contains("not found"), "stdout was: {}", stdout);
    assert!(!output_path.exists());
}

#[test]
fn test_cli_render_help_describes_flags() {
    let output = Command::new(env!("CARGO_BIN_EXE_bridgecheck"))
        .args(["render", "--help"])
        .output()
        .expect("failed to run bridgecheck");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Window width in pixels"), "stdout was: {}", stdout);
    assert!(stdout.contains("Window height in pixels"), "stdout was: {}", stdout);
    assert!(stdout.contains("--ready-timeout-ms"), "stdout was: {}", stdout);
}

#[test]
#[ignore] // Requires Chrome to be installed
fn test_render_writes_png() {
    let dir = tempfile::tempdir().unwrap();
    let config = config_in(dir.path(), "background.png");
    write_tiny_png(&config.image_path);

    let outcome = bridgecheck::render::render_background(&config).expect("render failed");
    let report = match outcome {
        RenderOutcome::Saved(r) => r,
        other => panic!("unexpected outcome: {:?}", other),
    };

    let png = std::fs::read(&config.output_path).expect("screenshot missing");
    assert!(png.len() > 100, "PNG data seems too small");
    assert_eq!(&png[0..8], b"\x89PNG\r\n\x1a\n");
    assert_eq!(report.bytes, png.len());
    assert_eq!(report.sha256.len(), 64);
}

#[test]
#[ignore] // Requires Chrome to be installed
fn test_render_releases_browser() {
    use bridgecheck::cdp::CdpRenderer;
    use bridgecheck::Renderer;

    let dir = tempfile::tempdir().unwrap();
    let config = config_in(dir.path(), "background.png");
    write_tiny_png(&config.image_path);

    let renderer = CdpRenderer::launch(&config).expect("Failed to launch Chrome");
    let pid = renderer.process_id().expect("Chrome pid");

    let outcome = bridgecheck::render::render_with(&config, move |_| Ok(renderer)).expect("render failed");
    assert!(matches!(outcome, RenderOutcome::Saved(_)));

    #[cfg(target_os = "linux")]
    {
        let mut alive = process_alive(pid);
        for _ in 0..50 {
            if !alive {
                break;
            }
            std::thread::sleep(std::time::Duration::from_millis(100));
            alive = process_alive(pid);
        }
        assert!(!alive, "Chrome process {} still running after render", pid);
    }
    #[cfg(not(target_os = "linux"))]
    let _ = pid;
}

#[tokio::test]
#[ignore] // Requires Chrome to be installed
async fn test_async_render() {
    let dir = tempfile::tempdir().unwrap();
    let config = config_in(dir.path(), "background.png");
    write_tiny_png(&config.image_path);
    let output_path = config.output_path.clone();

    let outcome = bridgecheck::async_api::render_background(config)
        .await
        .expect("async render failed");
    assert!(matches!(outcome, RenderOutcome::Saved(_)));
    assert!(output_path.exists());
}
