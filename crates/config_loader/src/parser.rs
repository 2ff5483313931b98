//! 配置解析模块
//!
//! TOML 为主，JSON 可选。解析错误带行列号，方便定位手写配置里的问题。

use std::path::Path;

use contracts::{AcquisitionBlueprint, ContractError};

/// 配置文件格式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    /// TOML 格式 (推荐)
    Toml,
    /// JSON 格式
    Json,
}

impl ConfigFormat {
    /// 从文件扩展名推断格式 (大小写不敏感)
    pub fn from_extension(ext: &str) -> Option<Self> {
        if ext.eq_ignore_ascii_case("toml") {
            Some(Self::Toml)
        } else if ext.eq_ignore_ascii_case("json") {
            Some(Self::Json)
        } else {
            None
        }
    }

    /// Infer the format of a config file
    ///
    /// # Errors
    /// `ConfigParse` when the path has no extension or an unknown one.
    pub fn from_path(path: &Path) -> Result<Self, ContractError> {
        let ext = path.extension().and_then(|e| e.to_str()).ok_or_else(|| {
            ContractError::config_parse(format!(
                "cannot determine config format of '{}'",
                path.display()
            ))
        })?;

        Self::from_extension(ext).ok_or_else(|| {
            ContractError::config_parse(format!("unsupported config format: .{ext}"))
        })
    }

    fn label(self) -> &'static str {
        match self {
            Self::Toml => "TOML",
            Self::Json => "JSON",
        }
    }

    /// Parse a blueprint (no validation)
    pub fn parse(self, content: &str) -> Result<AcquisitionBlueprint, ContractError> {
        match self {
            Self::Toml => toml::from_str(content).map_err(|e| {
                let at = e
                    .span()
                    .map(|span| location(content, span.start))
                    .unwrap_or_default();
                parse_error(self, at, e)
            }),
            Self::Json => serde_json::from_str(content).map_err(|e| {
                let at = format!(" at line {}, column {}", e.line(), e.column());
                parse_error(self, at, e)
            }),
        }
    }

    /// Render a blueprint in this format
    pub fn render(self, blueprint: &AcquisitionBlueprint) -> Result<String, ContractError> {
        let rendered = match self {
            Self::Toml => toml::to_string_pretty(blueprint).map_err(|e| e.to_string()),
            Self::Json => serde_json::to_string_pretty(blueprint).map_err(|e| e.to_string()),
        };

        rendered.map_err(|e| {
            ContractError::config_parse(format!("{} serialize error: {e}", self.label()))
        })
    }
}

/// " at line L, column C" for a byte offset (1-based)
fn location(content: &str, offset: usize) -> String {
    let before = &content[..offset.min(content.len())];
    let line = before.matches('\n').count() + 1;
    let column = before.rfind('\n').map_or(before.len(), |nl| before.len() - nl - 1) + 1;
    format!(" at line {line}, column {column}")
}

fn parse_error<E>(format: ConfigFormat, at: String, e: E) -> ContractError
where
    E: std::error::Error + Send + Sync + 'static,
{
    let reason = e.to_string();
    let reason = reason.lines().last().unwrap_or_default().trim().to_string();
    ContractError::ConfigParse {
        message: format!("{} parse error{at}: {reason}", format.label()),
        source: Some(Box::new(e)),
    }
}
