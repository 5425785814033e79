//! 预约流程 - 流程层
//!
//! 核心职责：按固定顺序执行一次完整的预约流程
//!
//! 流程顺序：
//! 导航 → 语言 → 国家 → 预约入口 → 必读确认 → 护照/签证 →
//! 验证码 → 提交 → 申请人信息 → 确认 → 签证中心 → 监控循环
//!
//! 每个步骤：页面交互 → 截图/日志 → 固定的稳定等待。
//! 失败策略由统一的步骤执行器按 StepKind 机械应用。

use anyhow::Result;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;

use crate::config::Config;
use crate::infrastructure::PageDriver;
use crate::models::{Credentials, LogKind, Phase};
use crate::services::{CaptchaRelay, ShotWriter, SlotDetector, StatusStore};
use crate::workflow::monitor;
use crate::workflow::step::StepKind;

/// 验证码图片元素
const CAPTCHA_IMAGE_SELECTOR: &str = "#captchaImage";

/// 预约流程
///
/// - 编排完整的步骤序列，只依赖业务能力（services）
/// - 不持有 page 资源（由 PageDriver 持有）
/// - 正常情况下永不返回：流程末尾进入监控循环，
///   唯一的退出方式是致命错误向上传播给监督者
pub struct BookingFlow {
    config: Config,
    credentials: Credentials,
    status: Arc<StatusStore>,
    relay: Arc<CaptchaRelay>,
    detector: SlotDetector,
    shots: ShotWriter,
}

impl BookingFlow {
    /// 创建新的预约流程
    pub fn new(
        config: &Config,
        credentials: Credentials,
        status: Arc<StatusStore>,
        relay: Arc<CaptchaRelay>,
    ) -> Self {
        Self {
            config: config.clone(),
            credentials,
            status,
            relay,
            detector: SlotDetector::new(),
            shots: ShotWriter::new(config),
        }
    }

    /// 执行一次完整流程
    pub async fn run(&self, driver: &PageDriver) -> Result<()> {
        self.run_step(driver, Phase::Navigate, "导航", StepKind::Required, || async move {
            driver.goto(&self.config.target_url).await?;
            self.shots.write_latest(driver).await?;
            self.status.record(LogKind::Event, "✅ 页面加载完成")?;
            Ok(())
        })
        .await?;

        self.run_step(
            driver,
            Phase::LanguageSelect,
            "选择语言",
            StepKind::Required,
            || async move {
                driver
                    .click("input[placeholder='-- Select Language --']")
                    .await?;
                driver
                    .click_by_text("ul.dropdown-menu li", &self.config.language)
                    .await?;
                self.shots.write_latest(driver).await?;
                self.status.record(
                    LogKind::Event,
                    format!("✅ 已选择语言: {}", self.config.language),
                )?;
                Ok(())
            },
        )
        .await?;

        self.run_step(
            driver,
            Phase::CountrySelect,
            "选择国家",
            StepKind::Required,
            || async move {
                driver
                    .click("input[placeholder='-- Select Country --']")
                    .await?;
                driver
                    .click_by_text("ul.dropdown-menu li", &self.config.country)
                    .await?;
                self.shots.write_latest(driver).await?;
                self.status.record(
                    LogKind::Event,
                    format!("✅ 已选择国家: {}", self.config.country),
                )?;
                Ok(())
            },
        )
        .await?;

        self.run_step(
            driver,
            Phase::BookAppointment,
            "预约入口",
            StepKind::Required,
            || async move {
                driver.click_by_text("a.card-box", "Book Appointment").await?;
                self.shots.write_latest(driver).await?;
                self.status
                    .record(LogKind::Event, "✅ 已点击 Book Appointment")?;
                Ok(())
            },
        )
        .await?;

        self.run_step(
            driver,
            Phase::MandatoryAck,
            "必读确认",
            StepKind::Required,
            || async move {
                driver.click_by_text("button.cir-em-btn", "OK").await?;
                self.shots.write_latest(driver).await?;
                self.status.record(LogKind::Event, "✅ 已确认必读提示")?;
                Ok(())
            },
        )
        .await?;

        self.run_step(
            driver,
            Phase::CredentialsEntry,
            "填写护照/签证",
            StepKind::Required,
            || async move {
                driver
                    .fill(
                        "input[placeholder='Passport Number']",
                        &self.credentials.passport_number,
                    )
                    .await?;
                driver
                    .fill(
                        "input[placeholder='Visa Number']",
                        &self.credentials.visa_number,
                    )
                    .await?;
                self.shots.write_latest(driver).await?;
                self.status.record(
                    LogKind::Event,
                    format!(
                        "🛂 护照号 {}, 签证号 {}",
                        self.credentials.passport_number, self.credentials.visa_number
                    ),
                )?;
                Ok(())
            },
        )
        .await?;

        self.run_step(
            driver,
            Phase::CaptchaWait,
            "验证码",
            StepKind::Required,
            || async move {
                let image = driver.screenshot_element(CAPTCHA_IMAGE_SELECTOR).await?;
                if image.is_some() {
                    self.status
                        .record(LogKind::Event, "📸 已截取验证码，等待人工输入")?;
                } else {
                    self.status
                        .record(LogKind::Event, "⚠️ 未找到验证码图片，仍等待人工输入")?;
                }
                self.relay.publish(image.as_deref()).await?;
                let solution = self.relay.await_solution().await;
                driver.fill("input[name='captcha']", &solution).await?;
                self.status
                    .record(LogKind::Event, format!("✅ 验证码已填入: {}", solution))?;
                Ok(())
            },
        )
        .await?;

        self.run_step(driver, Phase::Submit, "提交", StepKind::Required, || async move {
            driver.click("button.btn-brand-arrow").await?;
            self.shots.write_latest(driver).await?;
            self.status.record(LogKind::Event, "✅ 已提交表单")?;
            Ok(())
        })
        .await?;

        self.run_step(
            driver,
            Phase::ApplicantDetails,
            "申请人提示确认",
            StepKind::Optional,
            || async move {
                driver.click_by_text("button.cir-em-btn", "OK").await?;
                self.status.record(LogKind::Event, "✅ 已确认申请人提示")?;
                Ok(())
            },
        )
        .await?;

        self.run_step(
            driver,
            Phase::ApplicantDetails,
            "填写主要联系方式",
            StepKind::Required,
            || async move {
                driver.wait_for_selector("#phone").await?;
                driver.fill("#phone", &self.credentials.phone_number).await?;
                self.status.record(
                    LogKind::Event,
                    format!("📱 已填写主要联系电话: {}", self.credentials.phone_number),
                )?;

                driver.wait_for_selector("#email").await?;
                driver.fill("#email", &self.credentials.email_address).await?;
                self.status.record(
                    LogKind::Event,
                    format!("📧 已填写主要邮箱: {}", self.credentials.email_address),
                )?;
                Ok(())
            },
        )
        .await?;

        self.run_step(
            driver,
            Phase::ApplicantDetails,
            "主要联系人勾选",
            StepKind::Optional,
            || async move {
                driver.check("#checkVal").await?;
                self.status.record(LogKind::Event, "☑️ 已勾选主要联系人")?;
                Ok(())
            },
        )
        .await?;

        self.run_step(
            driver,
            Phase::ApplicantDetails,
            "填写申请人联系方式",
            StepKind::Required,
            || async move {
                driver.wait_for_selector("#contactNumber").await?;
                driver
                    .fill("#contactNumber", &self.credentials.phone_number)
                    .await?;
                self.status.record(
                    LogKind::Event,
                    format!("📱 已填写申请人联系电话: {}", self.credentials.phone_number),
                )?;

                driver.wait_for_selector("#emailId").await?;
                driver
                    .fill("#emailId", &self.credentials.email_address)
                    .await?;
                self.status.record(
                    LogKind::Event,
                    format!("📧 已填写申请人邮箱: {}", self.credentials.email_address),
                )?;
                Ok(())
            },
        )
        .await?;

        self.run_step(
            driver,
            Phase::ApplicantConfirm,
            "确认申请人信息",
            StepKind::Required,
            || async move {
                driver.wait_for_selector("button.cir-sb-btn").await?;
                driver.click("button.cir-sb-btn").await?;
                self.shots.write_latest(driver).await?;
                self.status.record(LogKind::Event, "✅ 申请人信息已确认")?;
                Ok(())
            },
        )
        .await?;

        self.run_step(
            driver,
            Phase::LocationSelect,
            "管理提示确认",
            StepKind::Optional,
            || async move {
                driver.click_by_text("button.cir-em-btn", "OK").await?;
                self.status.record(LogKind::Event, "✅ 已确认管理提示")?;
                Ok(())
            },
        )
        .await?;

        self.run_step(
            driver,
            Phase::LocationSelect,
            "选择签证中心",
            StepKind::Required,
            || async move {
                driver.click("button[name='selectedVsc']").await?;
                driver
                    .click_by_text("a, button, li, span, option, td", &self.config.visa_centre)
                    .await?;
                self.shots.write_latest(driver).await?;
                self.status.record(
                    LogKind::Event,
                    format!("✅ 已选择签证中心: {}", self.config.visa_centre),
                )?;
                Ok(())
            },
        )
        .await?;

        // 进入监控：这一去不回，只有致命错误才会离开
        self.status.set_phase(Phase::Monitor);
        self.status
            .record(LogKind::Event, "🕒 开始监控可预约日期...")?;
        monitor::monitor_loop(
            driver,
            &self.status,
            &self.detector,
            &self.shots,
            &self.config,
        )
        .await
    }

    /// 统一的步骤执行器
    ///
    /// 1. 切换阶段
    /// 2. 执行步骤体，按 StepKind 应用失败策略
    /// 3. 刷新当前 URL
    /// 4. 固定的稳定等待，给页面布局留时间
    async fn run_step<F, Fut>(
        &self,
        driver: &PageDriver,
        phase: Phase,
        name: &str,
        kind: StepKind,
        body: F,
    ) -> Result<()>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<()>>,
    {
        self.status.set_phase(phase);

        match body().await {
            Ok(()) => {}
            Err(e) => match kind {
                StepKind::Required => {
                    return Err(e.context(format!("必需步骤 '{}' 失败", name)));
                }
                StepKind::Optional => {
                    self.status.record(
                        LogKind::Event,
                        format!("ℹ️ 可选步骤 '{}' 未生效: {:#}", name, e),
                    )?;
                }
            },
        }

        let url = driver.current_url().await;
        self.status.update(|s| s.current_url = url);

        sleep(Duration::from_secs(self.config.step_settle_secs)).await;
        Ok(())
    }
}
