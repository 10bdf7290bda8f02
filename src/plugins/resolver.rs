//! 作用域合并
//!
//! 同名插件可以同时声明在全局、后端、路由三个作用域。合并时配置取最具体
//! 作用域的声明，而执行顺序保持全局 → 后端 → 路由；存活的声明停留在其
//! 最具体出现位置上，不会被提升到更早的作用域段。

use serde_json::Value;
use std::collections::HashMap;

use crate::config::plugins::PluginConfig;
use crate::error::JunctionResult;

use super::registry::PluginRegistry;

/// 合并并通过配置检查后的插件描述
#[derive(Debug, Clone)]
pub struct ResolvedPlugin {
    pub name: String,
    pub kind: String,
    /// 原始配置
    pub props: Value,
    /// 配置检查器返回的解析结果
    pub config: Value,
}

/// 合并三个作用域的插件声明为一条有序、去重的列表
///
/// 输入按执行顺序给出（全局、后端、路由）。同名声明只保留最后一次出现
/// （即最具体作用域），并保留其出现位置；解析后 `disable` 为真的插件被
/// 整体剔除，即使更宽作用域里启用过它。
pub fn merge_plugin_scopes(
    global: &[PluginConfig],
    backend: &[PluginConfig],
    route: &[PluginConfig],
) -> Vec<PluginConfig> {
    let candidates: Vec<&PluginConfig> = global
        .iter()
        .chain(backend.iter())
        .chain(route.iter())
        .collect();

    let mut last_occurrence: HashMap<&str, usize> = HashMap::new();
    for (position, plugin) in candidates.iter().enumerate() {
        last_occurrence.insert(plugin.name.as_str(), position);
    }

    candidates
        .iter()
        .enumerate()
        .filter(|(position, plugin)| last_occurrence[plugin.name.as_str()] == *position)
        .filter(|(_, plugin)| !plugin.disable)
        .map(|(_, plugin)| (*plugin).clone())
        .collect()
}

/// 合并插件链并逐个运行配置检查
pub fn resolve_plugin_chain(
    global: &[PluginConfig],
    backend: &[PluginConfig],
    route: &[PluginConfig],
    registry: &PluginRegistry,
) -> JunctionResult<Vec<ResolvedPlugin>> {
    merge_plugin_scopes(global, backend, route)
        .into_iter()
        .map(|plugin| {
            let config = registry.check(&plugin.name, &plugin.props)?;
            Ok(ResolvedPlugin {
                name: plugin.name,
                kind: plugin.kind,
                props: plugin.props,
                config,
            })
        })
        .collect()
}
