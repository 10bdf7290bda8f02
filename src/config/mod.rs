//! # 配置管理模块
//!
//! 本模块提供网关路由核心的配置管理功能，包括：
//!
//! - TOML配置文件解析和验证
//! - 环境变量替换和扩展
//! - 配置热重载支持
//! - 类型安全的配置结构定义
//!
//! ## 配置结构
//!
//! 主配置包含以下子模块：
//! - `routes`: 路由规则、加权目标和规则表达式配置
//! - `backends`: 后端网络/协议标识配置
//! - `plugins`: 插件声明配置（全局作用域）
//!
//! ## 使用示例
//!
//! ```rust,no_run
//! use junction::config::GatewayConfig;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = GatewayConfig::from_file_with_env("gateway.toml").await?;
//! println!("路由规则数量: {}", config.routes.len());
//! # Ok(())
//! # }
//! ```

pub mod backends; // 后端配置模块
pub mod manager; // 配置管理器和热重载模块
pub mod plugins; // 插件声明配置模块
pub mod routes; // 路由规则配置模块

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::env;
use std::path::Path;
use tracing::{info, warn};

// Re-export all public types
pub use backends::Backend;
pub use manager::ConfigManager;
pub use plugins::PluginConfig;
pub use routes::{Condition, RouteRule, RouteTarget, RuleConfig};

/// 网关路由核心主配置结构
///
/// 一次重载周期产生一份配置文档；文档本身不可变，仅被路由表构建器消费。
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct GatewayConfig {
    /// 路由规则列表
    #[serde(default)]
    pub routes: Vec<RouteRule>,
    /// 后端描述列表
    #[serde(default)]
    pub backends: Vec<Backend>,
    /// 全局作用域插件列表
    #[serde(default)]
    pub plugins: Vec<PluginConfig>,
}

impl GatewayConfig {
    /// Load configuration from file with environment variable expansion
    pub async fn from_file_with_env<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = tokio::fs::read_to_string(path.as_ref()).await?;

        // Expand environment variables in the content
        let expanded_content = expand_env_vars(&content);

        let config: GatewayConfig = toml::from_str(&expanded_content)?;
        config.validate()?;

        info!("Configuration loaded from {:?}", path.as_ref());
        Ok(config)
    }

    /// Validate the entire configuration document.
    ///
    /// This is the structural pass; reference resolution (backend names,
    /// protocol handlers, plugin checks) happens during index build.
    pub fn validate(&self) -> Result<()> {
        if self.routes.is_empty() {
            return Err(anyhow::anyhow!("at least one route must be configured"));
        }

        if self.backends.is_empty() {
            warn!("No backends configured - only plugin-only routes can resolve");
        }

        for route in &self.routes {
            route.validate()?;
        }

        for backend in &self.backends {
            backend.validate()?;
        }

        for plugin in &self.plugins {
            plugin.validate()?;
        }

        Ok(())
    }
}

/// Expand environment variables in configuration content
/// Supports ${VAR} and ${VAR:-default} syntax
fn expand_env_vars(content: &str) -> String {
    let mut result = content.to_string();

    while let Some(start) = result.find("${") {
        if let Some(end) = result[start..].find('}') {
            let var_expr = &result[start + 2..start + end];
            let replacement = if let Some(default_pos) = var_expr.find(":-") {
                let var_name = &var_expr[..default_pos];
                let default_value = &var_expr[default_pos + 2..];
                env::var(var_name).unwrap_or_else(|_| default_value.to_string())
            } else {
                env::var(var_expr).unwrap_or_else(|_| {
                    warn!(
                        "Environment variable '{}' not found, using empty string",
                        var_expr
                    );
                    String::new()
                })
            };

            result.replace_range(start..start + end + 1, &replacement);
        } else {
            break; // Malformed ${VAR expression
        }
    }

    result
}
