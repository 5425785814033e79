//! 预约人凭据
//!
//! 启动时从 credentials.txt 读取一次，进程存续期间不可变。

use anyhow::{Context, Result};
use std::path::Path;
use tracing::{debug, warn};

/// 预约人凭据
///
/// 四个字段对应凭据文件中的 PASSPORT / VISA / NUMBER / EMAIL 四个键，
/// 缺失的键保持空字符串，未识别的键忽略。
#[derive(Debug, Clone, Default)]
pub struct Credentials {
    /// 护照号
    pub passport_number: String,
    /// 签证号
    pub visa_number: String,
    /// 联系电话
    pub phone_number: String,
    /// 邮箱地址
    pub email_address: String,
}

impl Credentials {
    /// 从 key=value 文本文件加载
    ///
    /// 文件不存在时返回全空凭据（流程仍可跑到需要凭据的步骤才失败）
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            warn!("⚠️ 凭据文件不存在: {}", path.display());
            return Ok(Self::default());
        }

        let text = std::fs::read_to_string(path)
            .with_context(|| format!("读取凭据文件失败: {}", path.display()))?;
        let creds = Self::parse(&text);
        debug!("凭据已加载: {}", path.display());
        Ok(creds)
    }

    /// 解析 key=value 文本
    fn parse(text: &str) -> Self {
        let mut creds = Self::default();
        for line in text.lines() {
            let Some((key, value)) = line.trim().split_once('=') else {
                continue;
            };
            match key {
                "PASSPORT" => creds.passport_number = value.to_string(),
                "VISA" => creds.visa_number = value.to_string(),
                "NUMBER" => creds.phone_number = value.to_string(),
                "EMAIL" => creds.email_address = value.to_string(),
                _ => {}
            }
        }
        creds
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_all_keys() {
        let creds = Credentials::parse(
            "PASSPORT=AB1234567\nVISA=V-998877\nNUMBER=+923001234567\nEMAIL=user@example.com\n",
        );
        assert_eq!(creds.passport_number, "AB1234567");
        assert_eq!(creds.visa_number, "V-998877");
        assert_eq!(creds.phone_number, "+923001234567");
        assert_eq!(creds.email_address, "user@example.com");
    }

    #[test]
    fn test_parse_missing_keys_default_empty() {
        let creds = Credentials::parse("PASSPORT=AB1234567\n");
        assert_eq!(creds.passport_number, "AB1234567");
        assert_eq!(creds.visa_number, "");
        assert_eq!(creds.phone_number, "");
        assert_eq!(creds.email_address, "");
    }

    #[test]
    fn test_parse_ignores_unknown_keys_and_garbage() {
        let creds = Credentials::parse("FOO=bar\n没有等号的行\nEMAIL=a@b.c\n");
        assert_eq!(creds.email_address, "a@b.c");
        assert_eq!(creds.passport_number, "");
    }

    #[test]
    fn test_parse_value_keeps_inner_equals() {
        // 只按第一个等号切分
        let creds = Credentials::parse("VISA=a=b=c\n");
        assert_eq!(creds.visa_number, "a=b=c");
    }

    #[test]
    fn test_load_missing_file_is_empty() {
        let creds = Credentials::load("definitely_missing_credentials.txt").unwrap();
        assert_eq!(creds.passport_number, "");
    }
}
