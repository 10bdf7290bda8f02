//! 路由索引构建
//!
//! 一次重载构建一份完整索引：前缀树、正则路由组和已解析的后端映射。索引
//! 构建完成后不可变；任何一条路由校验失败都会丢弃整份索引（失败关闭），
//! 绝不对外提供半成品路由表。

use regex::Regex;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tracing::warn;

use crate::config::{Backend, GatewayConfig, RouteRule};
use crate::error::{JunctionError, JunctionResult};
use crate::plugins::{resolve_plugin_chain, PluginRegistry, ResolvedPlugin};
use crate::protocol::ProtocolRegistry;
use crate::rules::CompiledRule;

use super::trie::PathTrie;

/// 构建期解析完成的单个加权目标
#[derive(Debug, Clone)]
pub struct ResolvedTarget {
    /// 绑定的后端描述
    pub backend: Arc<Backend>,
    /// 选择权重
    pub weight: u32,
    /// 目标级前缀剥离开关（覆盖路由级）
    pub strip_prefix: Option<bool>,
    /// 目标级路径改写（覆盖路由级）
    pub rewrite: Option<String>,
    /// 合并后的有序插件链
    pub plugins: Arc<Vec<ResolvedPlugin>>,
}

/// 构建期编译完成的单条路由
#[derive(Debug)]
pub struct RouteEntry {
    pub id: String,
    /// 配置的路径模式原文
    pub pattern: String,
    pub is_regexp: bool,
    /// 小写化的主机集合；为空表示不限制主机
    pub hosts: HashSet<String>,
    pub rule: Option<CompiledRule>,
    pub targets: Vec<ResolvedTarget>,
    pub hash_key: Option<String>,
    pub strip_prefix: bool,
    pub rewrite: Option<String>,
    pub report_pattern: bool,
}

/// 共享同一正则模式的路由组
#[derive(Debug)]
pub struct RegexGroup {
    pub pattern: String,
    pub regex: Regex,
    pub routes: Vec<Arc<RouteEntry>>,
}

/// 某一时刻的完整路由索引快照
///
/// 构建后不可变；重载时整体替换，正在处理请求的读者继续持有旧快照。
#[derive(Debug)]
pub struct RouteIndex {
    pub(crate) trie: PathTrie<Vec<Arc<RouteEntry>>>,
    pub(crate) regex_groups: Vec<RegexGroup>,
    pub(crate) backends: HashMap<String, Arc<Backend>>,
}

impl RouteIndex {
    /// 校验整份配置并构建新索引
    pub fn build(
        config: &GatewayConfig,
        protocols: &ProtocolRegistry,
        plugins: &PluginRegistry,
    ) -> JunctionResult<Self> {
        let backends = Self::resolve_backends(config, protocols)?;

        if config.routes.is_empty() {
            // 空路由表会把一次误提交变成全量 404，直接拒绝
            return Err(JunctionError::config("route list is empty"));
        }

        let mut trie: PathTrie<Vec<Arc<RouteEntry>>> = PathTrie::new();
        let mut regex_groups: Vec<RegexGroup> = Vec::new();
        let mut group_positions: HashMap<String, usize> = HashMap::new();
        let mut seen_ids: HashSet<&str> = HashSet::new();

        for route in &config.routes {
            route.validate()?;

            if !seen_ids.insert(route.id.as_str()) {
                return Err(JunctionError::config(format!(
                    "duplicate route id '{}'",
                    route.id
                )));
            }

            let entry = Arc::new(Self::compile_route(route, config, &backends, plugins)?);

            if route.is_regexp {
                match group_positions.get(route.path.as_str()) {
                    Some(&position) => regex_groups[position].routes.push(entry),
                    None => {
                        let regex = Regex::new(&route.path).map_err(|e| {
                            JunctionError::config(format!(
                                "route '{}' has invalid regex pattern: {}",
                                route.id, e
                            ))
                        })?;
                        group_positions.insert(route.path.clone(), regex_groups.len());
                        regex_groups.push(RegexGroup {
                            pattern: route.path.clone(),
                            regex,
                            routes: vec![entry],
                        });
                    }
                }
            } else {
                // 同一字面路径可以挂多条规则，由主机和规则表达式再区分
                match trie.get_mut(&route.path) {
                    Some(candidates) => candidates.push(entry),
                    None => {
                        trie.insert(&route.path, vec![entry]);
                    }
                }
            }
        }

        Ok(Self {
            trie,
            regex_groups,
            backends,
        })
    }

    fn resolve_backends(
        config: &GatewayConfig,
        protocols: &ProtocolRegistry,
    ) -> JunctionResult<HashMap<String, Arc<Backend>>> {
        if config.backends.is_empty() {
            warn!("No backends configured; any route referencing one will fail the build");
        }

        let mut backends = HashMap::new();
        for backend in &config.backends {
            backend.validate()?;

            if !protocols.contains(backend.protocol) {
                return Err(JunctionError::config(format!(
                    "backend '{}' uses protocol '{}' with no registered forwarding handler",
                    backend.name, backend.protocol
                )));
            }

            if backends
                .insert(backend.name.clone(), Arc::new(backend.clone()))
                .is_some()
            {
                return Err(JunctionError::config(format!(
                    "duplicate backend name '{}'",
                    backend.name
                )));
            }
        }

        Ok(backends)
    }

    fn compile_route(
        route: &RouteRule,
        config: &GatewayConfig,
        backends: &HashMap<String, Arc<Backend>>,
        plugins: &PluginRegistry,
    ) -> JunctionResult<RouteEntry> {
        let rule = route
            .rule
            .as_ref()
            .map(CompiledRule::compile)
            .transpose()
            .map_err(|e| JunctionError::config(format!("route '{}': {}", route.id, e)))?;

        let hosts = route.hosts.iter().map(|h| h.to_lowercase()).collect();

        let mut targets = Vec::with_capacity(route.targets.len());
        for target in &route.targets {
            let backend = backends.get(&target.backend).cloned().ok_or_else(|| {
                JunctionError::config(format!(
                    "route '{}' references unknown backend '{}'",
                    route.id, target.backend
                ))
            })?;

            // 目标自带插件列表时，它取代路由级列表参与作用域合并
            let route_scope = if target.plugins.is_empty() {
                route.plugins.as_slice()
            } else {
                target.plugins.as_slice()
            };
            let chain =
                resolve_plugin_chain(&config.plugins, &backend.plugins, route_scope, plugins)
                    .map_err(|e| {
                        JunctionError::config(format!("route '{}': {}", route.id, e))
                    })?;

            targets.push(ResolvedTarget {
                backend,
                weight: target.weight,
                strip_prefix: target.strip_prefix,
                rewrite: target.rewrite.clone(),
                plugins: Arc::new(chain),
            });
        }

        Ok(RouteEntry {
            id: route.id.clone(),
            pattern: route.path.clone(),
            is_regexp: route.is_regexp,
            hosts,
            rule,
            targets,
            hash_key: route.hash_key.clone(),
            strip_prefix: route.strip_prefix,
            rewrite: route.rewrite.clone(),
            report_pattern: route.report_pattern,
        })
    }

    /// 按名称查找已解析的后端
    pub fn backend(&self, name: &str) -> Option<&Arc<Backend>> {
        self.backends.get(name)
    }

    /// 字面路径键的数量
    pub fn literal_route_count(&self) -> usize {
        self.trie.len()
    }

    /// 不同正则模式的数量
    pub fn regex_group_count(&self) -> usize {
        self.regex_groups.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{PluginConfig, RouteTarget};
    use crate::plugins::registry::PassthroughCheck;
    use crate::protocol::{ProtocolHandler, ProtocolType};
    use serde_json::json;

    struct StubForwarder;

    impl ProtocolHandler for StubForwarder {
        fn protocol(&self) -> ProtocolType {
            ProtocolType::Http
        }
        fn name(&self) -> &str {
            "stub-http"
        }
    }

    fn registries() -> (ProtocolRegistry, PluginRegistry) {
        let protocols = ProtocolRegistry::new();
        protocols.register(Arc::new(StubForwarder));
        let plugins = PluginRegistry::new();
        plugins.register("access-log", Arc::new(PassthroughCheck));
        plugins.register("cors", Arc::new(PassthroughCheck));
        (protocols, plugins)
    }

    fn backend(name: &str) -> Backend {
        Backend {
            name: name.to_string(),
            address: "10.0.0.1:8080".to_string(),
            network: "tcp".to_string(),
            protocol: ProtocolType::Http,
            timeout: None,
            hints: Default::default(),
            plugins: vec![],
        }
    }

    fn route(id: &str, path: &str) -> RouteRule {
        RouteRule {
            id: id.to_string(),
            path: path.to_string(),
            is_regexp: false,
            hosts: vec![],
            rule: None,
            targets: vec![RouteTarget {
                backend: "users".to_string(),
                weight: 1,
                strip_prefix: None,
                rewrite: None,
                plugins: vec![],
            }],
            hash_key: None,
            strip_prefix: false,
            rewrite: None,
            report_pattern: false,
            plugins: vec![],
        }
    }

    fn config(routes: Vec<RouteRule>) -> GatewayConfig {
        GatewayConfig {
            routes,
            backends: vec![backend("users")],
            plugins: vec![],
        }
    }

    #[test]
    fn test_build_minimal_index() {
        let (protocols, plugins) = registries();
        let index =
            RouteIndex::build(&config(vec![route("r1", "/user/info")]), &protocols, &plugins)
                .unwrap();

        assert_eq!(index.literal_route_count(), 1);
        assert_eq!(index.regex_group_count(), 0);
        assert!(index.backend("users").is_some());
    }

    #[test]
    fn test_empty_route_list_fails() {
        let (protocols, plugins) = registries();
        let err = RouteIndex::build(&config(vec![]), &protocols, &plugins).unwrap_err();
        assert!(matches!(err, JunctionError::Config { .. }));
    }

    #[test]
    fn test_empty_backend_list_tolerated_until_referenced() {
        let (protocols, plugins) = registries();
        let mut cfg = config(vec![route("r1", "/user/info")]);
        cfg.backends.clear();

        let err = RouteIndex::build(&cfg, &protocols, &plugins).unwrap_err();
        assert!(err.to_string().contains("unknown backend"));
    }

    #[test]
    fn test_unresolvable_backend_reference_fails() {
        let (protocols, plugins) = registries();
        let mut bad = route("r1", "/user/info");
        bad.targets[0].backend = "ghost".to_string();

        let err = RouteIndex::build(&config(vec![bad]), &protocols, &plugins).unwrap_err();
        assert!(err.to_string().contains("ghost"));
    }

    #[test]
    fn test_missing_protocol_handler_fails() {
        let protocols = ProtocolRegistry::new(); // nothing registered
        let plugins = PluginRegistry::new();

        let err = RouteIndex::build(&config(vec![route("r1", "/a/")]), &protocols, &plugins)
            .unwrap_err();
        assert!(err.to_string().contains("no registered forwarding handler"));
    }

    #[test]
    fn test_duplicate_route_id_fails() {
        let (protocols, plugins) = registries();
        let cfg = config(vec![route("r1", "/a/"), route("r1", "/b/")]);
        let err = RouteIndex::build(&cfg, &protocols, &plugins).unwrap_err();
        assert!(err.to_string().contains("duplicate route id"));
    }

    #[test]
    fn test_shared_literal_path_appends_candidates() {
        let (protocols, plugins) = registries();
        let mut second = route("r2", "/user/info");
        second.hosts = vec!["a.com".to_string()];

        let index = RouteIndex::build(
            &config(vec![route("r1", "/user/info"), second]),
            &protocols,
            &plugins,
        )
        .unwrap();

        assert_eq!(index.literal_route_count(), 1);
        assert_eq!(index.trie.get("/user/info").unwrap().len(), 2);
    }

    #[test]
    fn test_identical_regex_patterns_grouped_and_compiled_once() {
        let (protocols, plugins) = registries();
        let mut r1 = route("r1", "^/v[0-9]+/user");
        r1.is_regexp = true;
        let mut r2 = route("r2", "^/v[0-9]+/user");
        r2.is_regexp = true;
        let mut r3 = route("r3", "^/api/.*");
        r3.is_regexp = true;

        let index = RouteIndex::build(&config(vec![r1, r2, r3]), &protocols, &plugins).unwrap();
        assert_eq!(index.regex_group_count(), 2);
        assert_eq!(index.regex_groups[0].routes.len(), 2);
    }

    #[test]
    fn test_invalid_regex_fails_build() {
        let (protocols, plugins) = registries();
        let mut bad = route("r1", "[unclosed");
        bad.is_regexp = true;

        assert!(RouteIndex::build(&config(vec![bad]), &protocols, &plugins).is_err());
    }

    #[test]
    fn test_bad_rule_expression_fails_build() {
        let (protocols, plugins) = registries();
        let mut bad = route("r1", "/user/info");
        bad.rule = Some(crate::config::RuleConfig {
            conditions: vec![crate::config::Condition {
                key: "a".to_string(),
                oper: "==".to_string(),
                val: "1".to_string(),
            }],
            expression: "1&&0".to_string(),
        });

        let err = RouteIndex::build(&config(vec![bad]), &protocols, &plugins).unwrap_err();
        assert!(err.to_string().contains("r1"));
    }

    #[test]
    fn test_one_bad_route_discards_whole_index() {
        let (protocols, plugins) = registries();
        let mut bad = route("r2", "/broken/");
        bad.targets[0].backend = "ghost".to_string();

        let cfg = config(vec![route("r1", "/fine/"), bad]);
        assert!(RouteIndex::build(&cfg, &protocols, &plugins).is_err());
    }

    #[test]
    fn test_unregistered_plugin_fails_build() {
        let (protocols, plugins) = registries();
        let mut r = route("r1", "/user/info");
        r.plugins = vec![PluginConfig {
            name: "ghost-plugin".to_string(),
            kind: "gateway".to_string(),
            props: json!({}),
            disable: false,
        }];

        let err = RouteIndex::build(&config(vec![r]), &protocols, &plugins).unwrap_err();
        assert!(err.to_string().contains("ghost-plugin"));
    }

    #[test]
    fn test_target_plugins_replace_route_scope() {
        let (protocols, plugins) = registries();
        let mut r = route("r1", "/user/info");
        r.plugins = vec![PluginConfig {
            name: "access-log".to_string(),
            kind: "gateway".to_string(),
            props: json!({"scope": "route"}),
            disable: false,
        }];
        r.targets[0].plugins = vec![PluginConfig {
            name: "cors".to_string(),
            kind: "gateway".to_string(),
            props: json!({"scope": "target"}),
            disable: false,
        }];

        let index = RouteIndex::build(&config(vec![r]), &protocols, &plugins).unwrap();
        let candidates = index.trie.get("/user/info").unwrap();
        let chain = &candidates[0].targets[0].plugins;
        assert_eq!(chain.len(), 1);
        assert_eq!(chain[0].name, "cors");
    }
}
