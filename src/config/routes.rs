//! 路由规则配置结构定义
//!
//! 本模块包含路由表的配置结构体：路由规则、加权目标、规则表达式和原子条件。

use serde::{Deserialize, Serialize};

use super::plugins::PluginConfig;
use crate::error::{JunctionError, JunctionResult};

/// 单条路由规则
///
/// `path` 是路径模式：精确路径、以 `/` 结尾的前缀路径，或在 `is_regexp`
/// 为真时的正则表达式。多条规则可以共享同一字面路径，由主机名和规则
/// 表达式进一步区分。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RouteRule {
    /// 规则唯一标识（用于日志记录和决策结果）
    pub id: String,
    /// 路径模式
    pub path: String,
    /// 路径模式是否为正则表达式
    #[serde(default)]
    pub is_regexp: bool,
    /// 允许的主机名列表（为空表示不限制主机）
    #[serde(default)]
    pub hosts: Vec<String>,
    /// 细粒度匹配规则（可选）
    pub rule: Option<RuleConfig>,
    /// 加权目标列表
    #[serde(default)]
    pub targets: Vec<RouteTarget>,
    /// 灰度会话保持使用的请求属性名（可选）
    pub hash_key: Option<String>,
    /// 转发前是否剥离匹配到的路径前缀
    #[serde(default)]
    pub strip_prefix: bool,
    /// 转发路径改写（可选，优先级低于目标级改写）
    pub rewrite: Option<String>,
    /// 对外上报路径模式而非实际请求路径
    #[serde(default)]
    pub report_pattern: bool,
    /// 路由级插件列表
    #[serde(default)]
    pub plugins: Vec<PluginConfig>,
}

impl RouteRule {
    /// 验证路由规则的结构完整性
    pub fn validate(&self) -> JunctionResult<()> {
        if self.id.is_empty() {
            return Err(JunctionError::config("route has empty id"));
        }

        if self.path.is_empty() {
            return Err(JunctionError::config(format!(
                "route '{}' has empty path",
                self.id
            )));
        }

        if self.path == "/" {
            return Err(JunctionError::config(format!(
                "route '{}' uses the bare root path",
                self.id
            )));
        }

        if self.targets.is_empty() {
            return Err(JunctionError::config(format!(
                "route '{}' has no targets",
                self.id
            )));
        }

        if self.targets.len() > 1 && self.total_weight() == 0 {
            return Err(JunctionError::config(format!(
                "route '{}' has multiple targets with zero total weight",
                self.id
            )));
        }

        for target in &self.targets {
            target.validate(&self.id)?;
        }

        for plugin in &self.plugins {
            plugin.validate()?;
        }

        Ok(())
    }

    /// 所有目标的权重之和
    pub fn total_weight(&self) -> u64 {
        self.targets.iter().map(|t| t.weight as u64).sum()
    }
}

/// 加权目标：按名称引用一个后端
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RouteTarget {
    /// 后端名称（构建时解析，未知名称导致构建失败）
    pub backend: String,
    /// 选择权重
    #[serde(default = "default_weight")]
    pub weight: u32,
    /// 目标级前缀剥离开关（覆盖路由级设置）
    pub strip_prefix: Option<bool>,
    /// 目标级路径改写（覆盖路由级设置）
    pub rewrite: Option<String>,
    /// 目标级插件列表（非空时取代路由级插件参与合并）
    #[serde(default)]
    pub plugins: Vec<PluginConfig>,
}

fn default_weight() -> u32 {
    1
}

impl RouteTarget {
    /// 验证目标配置
    pub fn validate(&self, route_id: &str) -> JunctionResult<()> {
        if self.backend.is_empty() {
            return Err(JunctionError::config(format!(
                "route '{}' has a target with empty backend name",
                route_id
            )));
        }

        for plugin in &self.plugins {
            plugin.validate()?;
        }

        Ok(())
    }
}

/// 细粒度匹配规则：条件列表加布尔表达式
///
/// 表达式以条件下标引用条件，例如 `"0&&1||2"`。下标必须按升序出现，
/// 且不能超出条件列表长度。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuleConfig {
    /// 有序条件列表
    #[serde(default)]
    pub conditions: Vec<Condition>,
    /// 布尔表达式
    pub expression: String,
}

/// 原子条件：请求属性与字面值的一次比较
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Condition {
    /// 请求属性名（头部、查询参数、Cookie 等，由调用方提供取值函数）
    pub key: String,
    /// 比较操作符：`>` `>=` `<` `<=` `==` `!=` `in` `!in` `regexp`
    pub oper: String,
    /// 比较字面值（`in`/`!in` 为逗号分隔集合，`regexp` 为正则模式）
    pub val: String,
}
