use std::path::PathBuf;

/// 程序配置
#[derive(Clone, Debug)]
pub struct Config {
    /// 目标站点 URL
    pub target_url: String,
    /// 静态产物目录（截图、状态文件、日志尾部）
    pub static_dir: String,
    /// 凭据文件路径
    pub credentials_file: String,
    /// 每个步骤之后的固定等待时间（秒），给页面布局留出稳定时间
    pub step_settle_secs: u64,
    /// 监控轮询间隔（秒）
    pub poll_interval_secs: u64,
    /// 验证码答案邮箱的轮询间隔（秒）
    pub captcha_poll_secs: u64,
    /// 监控循环瞬态错误后的退避时间（秒）
    pub monitor_backoff_secs: u64,
    /// 等待元素/页面就绪的超时上限（秒）
    pub step_wait_timeout_secs: u64,
    /// 语言下拉选项
    pub language: String,
    /// 国家下拉选项
    pub country: String,
    /// 签证中心选项
    pub visa_centre: String,
    /// 致命错误后重启下一次 Attempt 前的等待时间（秒）。
    /// 刻意为 0：监督循环不做退避、不限重试次数。
    pub restart_delay_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            target_url: "https://www.qatarvisacenter.com/".to_string(),
            static_dir: "static".to_string(),
            credentials_file: "credentials.txt".to_string(),
            step_settle_secs: 3,
            poll_interval_secs: 2,
            captcha_poll_secs: 1,
            monitor_backoff_secs: 2,
            step_wait_timeout_secs: 60,
            language: "English".to_string(),
            country: "Pakistan".to_string(),
            visa_centre: "Islamabad".to_string(),
            restart_delay_secs: 0,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        let default = Self::default();
        Self {
            target_url: std::env::var("TARGET_URL").unwrap_or(default.target_url),
            static_dir: std::env::var("STATIC_DIR").unwrap_or(default.static_dir),
            credentials_file: std::env::var("CREDENTIALS_FILE").unwrap_or(default.credentials_file),
            step_settle_secs: std::env::var("STEP_SETTLE_SECS").ok().and_then(|v| v.parse().ok()).unwrap_or(default.step_settle_secs),
            poll_interval_secs: std::env::var("POLL_INTERVAL_SECS").ok().and_then(|v| v.parse().ok()).unwrap_or(default.poll_interval_secs),
            captcha_poll_secs: std::env::var("CAPTCHA_POLL_SECS").ok().and_then(|v| v.parse().ok()).unwrap_or(default.captcha_poll_secs),
            monitor_backoff_secs: std::env::var("MONITOR_BACKOFF_SECS").ok().and_then(|v| v.parse().ok()).unwrap_or(default.monitor_backoff_secs),
            step_wait_timeout_secs: std::env::var("STEP_WAIT_TIMEOUT_SECS").ok().and_then(|v| v.parse().ok()).unwrap_or(default.step_wait_timeout_secs),
            language: std::env::var("PORTAL_LANGUAGE").unwrap_or(default.language),
            country: std::env::var("PORTAL_COUNTRY").unwrap_or(default.country),
            visa_centre: std::env::var("VISA_CENTRE").unwrap_or(default.visa_centre),
            restart_delay_secs: std::env::var("RESTART_DELAY_SECS").ok().and_then(|v| v.parse().ok()).unwrap_or(default.restart_delay_secs),
        }
    }

    /// status.json 路径
    pub fn status_path(&self) -> PathBuf {
        PathBuf::from(&self.static_dir).join("status.json")
    }

    /// logs.txt 路径
    pub fn log_path(&self) -> PathBuf {
        PathBuf::from(&self.static_dir).join("logs.txt")
    }

    /// 验证码图片路径
    pub fn captcha_image_path(&self) -> PathBuf {
        PathBuf::from(&self.static_dir).join("captcha.png")
    }
}
