use anyhow::Result;
use std::sync::Arc;

use qvc_appointment_bot::config::Config;
use qvc_appointment_bot::logger;
use qvc_appointment_bot::models::Credentials;
use qvc_appointment_bot::orchestrator::Supervisor;
use qvc_appointment_bot::services::{CaptchaRelay, StatusStore};

#[tokio::main]
async fn main() -> Result<()> {
    // 初始化日志
    logger::init();

    // 加载配置与凭据
    let config = Config::from_env();
    let credentials = Credentials::load(&config.credentials_file)?;

    // 共享资源：仪表盘经由这两者读状态、交答案
    let status = Arc::new(StatusStore::new(&config)?);
    let relay = Arc::new(CaptchaRelay::new(&config));

    // 运行监督循环（永不返回）
    Supervisor::new(config, credentials, status, relay)
        .run_forever()
        .await
}
