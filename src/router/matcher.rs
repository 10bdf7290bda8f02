//! 路由匹配
//!
//! 匹配级联按 精确 → 最长前缀 → 正则 的顺序尝试，第一个命中的阶段给出
//! 候选集；随后按主机、再按规则表达式在候选集内收窄。两级收窄都遵循
//! "有更具体的用更具体的，否则回退到最不具体的" 策略：运营方可以在同一
//! 路径上同时声明带主机/规则的覆盖项和无约束的默认项，而不需要显式优先级。

use std::sync::Arc;
use tracing::warn;

use crate::error::{JunctionError, JunctionResult};

use super::index::{RouteEntry, RouteIndex};

impl RouteIndex {
    /// 匹配请求路径和主机，返回唯一的路由条目
    pub fn match_route<F>(
        &self,
        path: &str,
        host: &str,
        lookup: &F,
    ) -> JunctionResult<&Arc<RouteEntry>>
    where
        F: Fn(&str) -> Option<String>,
    {
        let candidates = self
            .path_candidates(path)
            .ok_or_else(|| JunctionError::route_not_found(path, host))?;

        self.narrow(candidates, host, lookup)
            .ok_or_else(|| JunctionError::route_not_found(path, host))
    }

    /// 路径级联：精确命中、可接受的最长前缀、正则线性扫描
    fn path_candidates(&self, path: &str) -> Option<&[Arc<RouteEntry>]> {
        if let Some(candidates) = self.trie.get(path) {
            return Some(candidates);
        }

        if let Some((key, candidates)) = self.trie.longest_prefix(path) {
            // 只接受以 '/' 结尾的非根前缀键，防止无关的更长字面路径因共享
            // 字符而被当成前缀命中
            if key != "/" && key.ends_with('/') {
                return Some(candidates);
            }
        }

        // 正则路由按配置顺序线性扫描；正则路由预期只占少数且模式已预编译
        self.regex_groups
            .iter()
            .find(|group| group.regex.is_match(path))
            .map(|group| group.routes.as_slice())
    }

    /// 主机收窄后再做规则收窄
    fn narrow<'a, F>(
        &self,
        candidates: &'a [Arc<RouteEntry>],
        host: &str,
        lookup: &F,
    ) -> Option<&'a Arc<RouteEntry>>
    where
        F: Fn(&str) -> Option<String>,
    {
        let host = host.to_lowercase();

        let host_matched: Vec<&Arc<RouteEntry>> = candidates
            .iter()
            .filter(|entry| entry.hosts.contains(&host))
            .collect();

        let pool: Vec<&Arc<RouteEntry>> = if host_matched.is_empty() {
            candidates
                .iter()
                .filter(|entry| entry.hosts.is_empty())
                .collect()
        } else {
            host_matched
        };

        // 第一遍：带规则的候选按配置顺序求值，第一个为真的胜出
        for &entry in &pool {
            if let Some(rule) = &entry.rule {
                match rule.evaluate(lookup) {
                    Ok(true) => return Some(entry),
                    Ok(false) => {}
                    Err(e) => {
                        // 单条规则损坏只跳过该候选，不中断整个解析
                        warn!(route = %entry.id, "rule evaluation failed, skipping candidate: {}", e);
                    }
                }
            }
        }

        // 第二遍：回退到第一个不带规则的候选
        pool.into_iter().find(|entry| entry.rule.is_none())
    }
}
