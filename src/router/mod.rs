//! # 路由引擎模块
//!
//! 本模块提供路由表的构建、匹配和目标选择：
//!
//! - 前缀树、正则路由组和后端映射组成的不可变索引快照
//! - 精确 → 最长前缀 → 正则的匹配级联，主机与规则两级收窄
//! - 加权随机与哈希会话保持的目标选择
//! - 原子替换的热重载，读者永不阻塞
//!
//! ## 主要组件
//!
//! - `RouteTable`: 当前索引快照的持有者，请求入口
//! - `RouteIndex`: 单次构建的完整索引
//! - `RoutingDecision`: 一次解析的完整结果
//!
//! ## 使用示例
//!
//! ```rust,no_run
//! use junction::config::GatewayConfig;
//! use junction::plugins::PluginRegistry;
//! use junction::protocol::ProtocolRegistry;
//! use junction::router::RouteTable;
//! use std::sync::Arc;
//!
//! # fn example(config: GatewayConfig) -> Result<(), Box<dyn std::error::Error>> {
//! let protocols = Arc::new(ProtocolRegistry::new());
//! let plugins = Arc::new(PluginRegistry::new());
//! let table = RouteTable::build(&config, protocols, plugins)?;
//!
//! let decision = table.resolve("/user/info", "api.example.com", &|_| None)?;
//! println!("转发到后端: {}", decision.backend.name);
//! # Ok(())
//! # }
//! ```

pub mod index;
pub mod matcher;
pub mod selector;
pub mod table;
pub mod trie;

// 重新导出主要类型
pub use index::{RegexGroup, ResolvedTarget, RouteEntry, RouteIndex};
pub use selector::select_target;
pub use table::{RouteTable, RoutingDecision};
pub use trie::PathTrie;
