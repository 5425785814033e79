use std::fmt;

/// 应用程序错误类型
#[derive(Debug)]
pub enum AppError {
    /// 浏览器会话相关错误
    Browser(BrowserError),
    /// 页面交互错误
    Page(PageError),
    /// 产物（截图/状态文件）写入错误
    Artifact(ArtifactError),
    /// 其他错误（用于包装第三方库错误）
    Other(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Browser(e) => write!(f, "浏览器错误: {}", e),
            AppError::Page(e) => write!(f, "页面交互错误: {}", e),
            AppError::Artifact(e) => write!(f, "产物写入错误: {}", e),
            AppError::Other(msg) => write!(f, "错误: {}", msg),
        }
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AppError::Browser(e) => Some(e),
            AppError::Page(e) => Some(e),
            AppError::Artifact(e) => Some(e),
            AppError::Other(_) => None,
        }
    }
}

/// 浏览器会话相关错误
#[derive(Debug)]
pub enum BrowserError {
    /// 浏览器配置构建失败
    ConfigurationFailed {
        message: String,
    },
    /// 启动浏览器失败
    LaunchFailed {
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// 创建页面失败
    PageCreationFailed {
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// 会话环境设置失败（UA/脚本注入）
    SetupFailed {
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

impl fmt::Display for BrowserError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BrowserError::ConfigurationFailed { message } => {
                write!(f, "浏览器配置失败: {}", message)
            }
            BrowserError::LaunchFailed { source } => {
                write!(f, "启动浏览器失败: {}", source)
            }
            BrowserError::PageCreationFailed { source } => {
                write!(f, "创建页面失败: {}", source)
            }
            BrowserError::SetupFailed { source } => {
                write!(f, "会话环境设置失败: {}", source)
            }
        }
    }
}

impl std::error::Error for BrowserError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            BrowserError::ConfigurationFailed { .. } => None,
            BrowserError::LaunchFailed { source }
            | BrowserError::PageCreationFailed { source }
            | BrowserError::SetupFailed { source } => {
                Some(source.as_ref() as &(dyn std::error::Error + 'static))
            }
        }
    }
}

/// 页面交互错误
#[derive(Debug)]
pub enum PageError {
    /// 元素不存在
    ElementNotFound {
        selector: String,
    },
    /// 指定文本的元素不存在
    TextNotFound {
        selector: String,
        text: String,
    },
    /// 等待超时
    WaitTimeout {
        what: String,
        secs: u64,
    },
    /// 导航失败
    NavigationFailed {
        url: String,
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// 元素交互失败（点击/输入）
    InteractionFailed {
        selector: String,
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// 执行脚本失败
    ScriptExecutionFailed {
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// 脚本结果解析失败
    ResultParseFailed {
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

impl fmt::Display for PageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PageError::ElementNotFound { selector } => {
                write!(f, "元素不存在: {}", selector)
            }
            PageError::TextNotFound { selector, text } => {
                write!(f, "未找到文本为 '{}' 的元素 (选择器: {})", text, selector)
            }
            PageError::WaitTimeout { what, secs } => {
                write!(f, "等待 {} 超时 ({}秒)", what, secs)
            }
            PageError::NavigationFailed { url, source } => {
                write!(f, "导航到 {} 失败: {}", url, source)
            }
            PageError::InteractionFailed { selector, source } => {
                write!(f, "元素交互失败 ({}): {}", selector, source)
            }
            PageError::ScriptExecutionFailed { source } => {
                write!(f, "执行脚本失败: {}", source)
            }
            PageError::ResultParseFailed { source } => {
                write!(f, "脚本结果解析失败: {}", source)
            }
        }
    }
}

impl std::error::Error for PageError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            PageError::NavigationFailed { source, .. }
            | PageError::InteractionFailed { source, .. }
            | PageError::ScriptExecutionFailed { source }
            | PageError::ResultParseFailed { source } => {
                Some(source.as_ref() as &(dyn std::error::Error + 'static))
            }
            _ => None,
        }
    }
}

/// 产物写入错误
#[derive(Debug)]
pub enum ArtifactError {
    /// 截图失败
    ScreenshotFailed {
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// 写入文件失败
    WriteFailed {
        path: String,
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

impl fmt::Display for ArtifactError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArtifactError::ScreenshotFailed { source } => {
                write!(f, "截图失败: {}", source)
            }
            ArtifactError::WriteFailed { path, source } => {
                write!(f, "写入文件失败 ({}): {}", path, source)
            }
        }
    }
}

impl std::error::Error for ArtifactError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ArtifactError::ScreenshotFailed { source }
            | ArtifactError::WriteFailed { source, .. } => {
                Some(source.as_ref() as &(dyn std::error::Error + 'static))
            }
        }
    }
}

// ========== 从常见错误类型转换 ==========
// 注意：不需要手动实现 From<AppError> for anyhow::Error，
// 因为 anyhow 已经为所有实现了 std::error::Error 的类型提供了自动实现

impl From<chromiumoxide::error::CdpError> for AppError {
    fn from(err: chromiumoxide::error::CdpError) -> Self {
        AppError::Page(PageError::ScriptExecutionFailed {
            source: Box::new(err),
        })
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Page(PageError::ResultParseFailed {
            source: Box::new(err),
        })
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::Artifact(ArtifactError::WriteFailed {
            path: String::new(), // IO 错误通常不包含路径信息
            source: Box::new(err),
        })
    }
}

// ========== 便捷构造函数 ==========

impl AppError {
    /// 创建浏览器配置错误
    pub fn browser_config_failed(message: impl Into<String>) -> Self {
        AppError::Browser(BrowserError::ConfigurationFailed {
            message: message.into(),
        })
    }

    /// 创建浏览器启动错误
    pub fn browser_launch_failed(source: impl std::error::Error + Send + Sync + 'static) -> Self {
        AppError::Browser(BrowserError::LaunchFailed {
            source: Box::new(source),
        })
    }

    /// 创建页面创建错误
    pub fn page_creation_failed(source: impl std::error::Error + Send + Sync + 'static) -> Self {
        AppError::Browser(BrowserError::PageCreationFailed {
            source: Box::new(source),
        })
    }

    /// 创建会话环境设置错误
    pub fn session_setup_failed(source: impl std::error::Error + Send + Sync + 'static) -> Self {
        AppError::Browser(BrowserError::SetupFailed {
            source: Box::new(source),
        })
    }

    /// 创建元素不存在错误
    pub fn element_not_found(selector: impl Into<String>) -> Self {
        AppError::Page(PageError::ElementNotFound {
            selector: selector.into(),
        })
    }

    /// 创建文本不存在错误
    pub fn text_not_found(selector: impl Into<String>, text: impl Into<String>) -> Self {
        AppError::Page(PageError::TextNotFound {
            selector: selector.into(),
            text: text.into(),
        })
    }

    /// 创建等待超时错误
    pub fn wait_timeout(what: impl Into<String>, secs: u64) -> Self {
        AppError::Page(PageError::WaitTimeout {
            what: what.into(),
            secs,
        })
    }

    /// 创建导航错误
    pub fn navigation_failed(
        url: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        AppError::Page(PageError::NavigationFailed {
            url: url.into(),
            source: Box::new(source),
        })
    }

    /// 创建元素交互错误
    pub fn interaction_failed(
        selector: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        AppError::Page(PageError::InteractionFailed {
            selector: selector.into(),
            source: Box::new(source),
        })
    }

    /// 创建截图错误
    pub fn screenshot_failed(source: impl std::error::Error + Send + Sync + 'static) -> Self {
        AppError::Artifact(ArtifactError::ScreenshotFailed {
            source: Box::new(source),
        })
    }
}

// ========== Result 类型别名 ==========

/// 应用程序结果类型
pub type AppResult<T> = Result<T, AppError>;
