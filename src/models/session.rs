//! 会话状态模型
//!
//! 整个进程生命周期内只有一份 SessionState，由引擎侧独占写入，
//! 仪表盘只能通过 StatusStore 拿到快照，不共享引用。

use serde::{Deserialize, Serialize};
use std::fmt;

/// 工作流阶段
///
/// 状态机的当前命名阶段，按流程顺序排列。
/// 序列化为 snake_case 字符串写入 status.json。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    /// 空闲（尚未开始任何 Attempt）
    Idle,
    /// 导航到目标站点
    Navigate,
    /// 选择语言
    LanguageSelect,
    /// 选择国家
    CountrySelect,
    /// 点击预约入口
    BookAppointment,
    /// 必读提示确认
    MandatoryAck,
    /// 填写护照/签证号
    CredentialsEntry,
    /// 等待人工验证码
    CaptchaWait,
    /// 提交表单
    Submit,
    /// 填写申请人信息
    ApplicantDetails,
    /// 确认申请人信息
    ApplicantConfirm,
    /// 选择签证中心
    LocationSelect,
    /// 监控可预约日期
    Monitor,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Phase::Idle => "idle",
            Phase::Navigate => "navigate",
            Phase::LanguageSelect => "language_select",
            Phase::CountrySelect => "country_select",
            Phase::BookAppointment => "book_appointment",
            Phase::MandatoryAck => "mandatory_ack",
            Phase::CredentialsEntry => "credentials_entry",
            Phase::CaptchaWait => "captcha_wait",
            Phase::Submit => "submit",
            Phase::ApplicantDetails => "applicant_details",
            Phase::ApplicantConfirm => "applicant_confirm",
            Phase::LocationSelect => "location_select",
            Phase::Monitor => "monitor",
        };
        write!(f, "{}", name)
    }
}

/// 会话状态快照
///
/// 每次有意义的状态迁移和每次监控轮询都会更新；
/// 进程存续期间只覆盖、从不销毁。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionState {
    /// 当前阶段
    pub phase: Phase,
    /// 当前页面 URL
    pub current_url: String,
    /// 最近一次错误（瞬态或致命），被后续事件覆盖前一直可读
    pub error: Option<String>,
    /// 最近一次轮询是否发现了可预约日期
    pub date_found: bool,
    /// 发现的日期标签，按页面顺序
    pub date_matches: Vec<String>,
    /// 最近一次更新时间（`YYYY-MM-DD HH:MM:SS`）
    pub last_update: String,
}

impl Default for SessionState {
    fn default() -> Self {
        Self {
            phase: Phase::Idle,
            current_url: String::new(),
            error: None,
            date_found: false,
            date_matches: Vec::new(),
            last_update: String::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_phase_serializes_snake_case() {
        let json = serde_json::to_string(&Phase::CaptchaWait).unwrap();
        assert_eq!(json, "\"captcha_wait\"");
        let json = serde_json::to_string(&Phase::Monitor).unwrap();
        assert_eq!(json, "\"monitor\"");
    }

    #[test]
    fn test_display_matches_serde_name() {
        let json = serde_json::to_string(&Phase::ApplicantDetails).unwrap();
        assert_eq!(json, format!("\"{}\"", Phase::ApplicantDetails));
    }

    #[test]
    fn test_default_state_is_idle() {
        let state = SessionState::default();
        assert_eq!(state.phase, Phase::Idle);
        assert!(!state.date_found);
        assert!(state.date_matches.is_empty());
        assert!(state.error.is_none());
    }
}
