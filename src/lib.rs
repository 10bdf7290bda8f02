//! # Junction - API网关路由与规则匹配核心
//!
//! Junction是一个用Rust编写的API网关路由核心，专注于路由决策：对每个入站
//! 请求决定由哪个后端接收、使用哪个加权变体（灰度/金丝雀）、应用什么路径
//! 改写，以及用哪条有序插件链包裹转发调用。全部决策由一张可在运行时热重
//! 载的声明式路由表驱动，重载期间在途请求不受影响。
//!
//! ## 核心功能
//!
//! - **匹配级联**: 精确、最长前缀、正则三段式路径匹配，主机与规则两级收窄
//! - **规则表达式**: `"0&&1||2"` 形式的布尔表达式，条件在构建期预编译
//! - **灰度发布**: 加权随机选择，支持按请求属性哈希的会话保持
//! - **插件链解析**: 全局/后端/路由三作用域合并，配置取最具体、执行从最宽
//! - **配置热重载**: 旁路构建、原子替换，坏配置不影响在服务的路由表
//!
//! ## 使用示例
//!
//! ```rust,no_run
//! use junction::config::ConfigManager;
//! use junction::plugins::PluginRegistry;
//! use junction::protocol::ProtocolRegistry;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let protocols = Arc::new(ProtocolRegistry::new());
//!     let plugins = Arc::new(PluginRegistry::new());
//!     // 传输层在此注册各协议的转发处理器、各插件的配置检查器
//!
//!     let mut manager = ConfigManager::new("gateway.toml", protocols, plugins).await?;
//!     manager.start_hot_reload().await?;
//!
//!     let table = manager.table();
//!     let decision = table.resolve("/user/info", "api.example.com", &|_| None)?;
//!     println!("转发到: {}", decision.backend.address);
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod plugins;
pub mod protocol;
pub mod router;
pub mod rules;

// Re-export commonly used types
pub use config::{Backend, ConfigManager, GatewayConfig, PluginConfig, RouteRule, RouteTarget};
pub use error::{ErrorSeverity, JunctionError, JunctionResult};
pub use plugins::{PluginChecker, PluginRegistry, ResolvedPlugin};
pub use protocol::{ProtocolHandler, ProtocolRegistry, ProtocolType};
pub use router::{RouteIndex, RouteTable, RoutingDecision};
pub use rules::{CompiledRule, LogicOp};
