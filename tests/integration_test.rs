use std::sync::Arc;
use std::time::Duration;

use qvc_appointment_bot::browser::BrowserSession;
use qvc_appointment_bot::config::Config;
use qvc_appointment_bot::infrastructure::PageDriver;
use qvc_appointment_bot::logger;
use qvc_appointment_bot::models::{LogKind, Phase};
use qvc_appointment_bot::services::{CaptchaRelay, ShotWriter, SlotDetector, StatusStore};

#[tokio::test]
#[ignore] // 默认忽略，需要本机有 Chromium：cargo test -- --ignored
async fn test_browser_session_launch_and_close() {
    // 初始化日志
    logger::init();

    let config = Config::from_env();

    let session = BrowserSession::launch(&config)
        .await
        .expect("启动浏览器失败");
    session.close().await;
}

#[tokio::test]
#[ignore]
async fn test_navigate_and_write_latest_screenshot() {
    logger::init();

    let config = Config::from_env();
    let session = BrowserSession::launch(&config)
        .await
        .expect("启动浏览器失败");
    let driver = PageDriver::new(session.page().clone(), Duration::from_secs(10));

    driver.goto("https://example.com/").await.expect("导航失败");
    driver.wait_for_dom_ready().await.expect("页面未就绪");
    assert!(driver.is_alive().await);

    let dir = tempfile::tempdir().expect("创建临时目录失败");
    let shots = ShotWriter::with_dir(dir.path());
    shots.write_latest(&driver).await.expect("写入截图失败");
    assert!(dir.path().join("latest.png").exists());

    session.close().await;
}

#[tokio::test]
#[ignore]
async fn test_slot_detector_empty_on_blank_page() {
    logger::init();

    let config = Config::from_env();
    let session = BrowserSession::launch(&config)
        .await
        .expect("启动浏览器失败");
    let driver = PageDriver::new(session.page().clone(), Duration::from_secs(10));

    driver.goto("about:blank").await.expect("导航失败");
    let labels = SlotDetector::new().detect(&driver).await.expect("探测失败");
    assert!(labels.is_empty(), "空白页不应有可选日期");

    session.close().await;
}

// ========== 不依赖浏览器的跨模块场景 ==========

/// 场景：挑战发布后外部提交答案，引擎在一个轮询间隔内拿到该值
#[tokio::test]
async fn test_captcha_handoff_roundtrip() {
    let dir = tempfile::tempdir().expect("创建临时目录失败");
    let relay = Arc::new(CaptchaRelay::with_settings(
        dir.path().join("captcha.png"),
        Duration::from_millis(10),
    ));

    relay.submit("stale");
    relay
        .publish(Some(b"fake-png".as_slice()))
        .await
        .expect("发布挑战失败");

    let relay_clone = relay.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(30)).await;
        relay_clone.submit("AB12");
    });

    // 旧答案已被 publish 清除，拿到的必须是新答案
    assert_eq!(relay.await_solution().await, "AB12");
    assert!(dir.path().join("captcha.png").exists());
}

/// 场景：致命错误被记录后，错误信息在状态里保持可读
#[tokio::test]
async fn test_fatal_error_recorded_and_readable() {
    let dir = tempfile::tempdir().expect("创建临时目录失败");
    let store = StatusStore::with_paths(
        dir.path().join("status.json"),
        dir.path().join("logs.txt"),
    );

    store.set_phase(Phase::Monitor);
    store.update(|s| s.error = Some("导航到 https://example.com 失败".to_string()));
    store
        .record(LogKind::Event, "❌ 致命错误: 导航失败，重启流程...")
        .expect("记录失败");

    let snap = store.snapshot();
    assert!(snap.error.as_deref().unwrap_or("").contains("导航"));
    assert!(store.log_tail().contains("致命错误"));

    // 下一次 Attempt 的第一个可观察阶段是 Navigate
    store.set_phase(Phase::Navigate);
    let snap = store.snapshot();
    assert_eq!(snap.phase, Phase::Navigate);
    // 错误在被后续事件覆盖前一直可读
    assert!(snap.error.is_some());
}
