//! 路由表
//!
//! 持有当前生效的路由索引快照。读者每次请求只做一次原子加载拿到完整快照，
//! 之后全程在本地副本上工作，不会与重载互相阻塞；重载在旁路构建并校验新
//! 索引，成功后整体替换，失败则当前快照原样继续服务。

use arc_swap::ArcSwap;
use std::sync::Arc;
use tracing::info;

use crate::config::{Backend, GatewayConfig};
use crate::error::JunctionResult;
use crate::plugins::{PluginRegistry, ResolvedPlugin};
use crate::protocol::ProtocolRegistry;

use super::index::{ResolvedTarget, RouteEntry, RouteIndex};
use super::selector::select_target;

/// 一次路由解析的完整结果
///
/// 调用方（请求处理层）据此执行插件链并通过传输层转发。
#[derive(Debug, Clone)]
pub struct RoutingDecision {
    /// 命中的路由标识
    pub route_id: String,
    /// 选中的后端
    pub backend: Arc<Backend>,
    /// 解析完成的有序插件链
    pub plugins: Arc<Vec<ResolvedPlugin>>,
    /// 改写后的转发路径
    pub path: String,
    /// 对外上报的路径（模式或实际路径，取决于路由配置）
    pub reported_path: String,
}

/// 当前生效路由索引的持有者
pub struct RouteTable {
    current: ArcSwap<RouteIndex>,
    protocols: Arc<ProtocolRegistry>,
    plugins: Arc<PluginRegistry>,
}

impl RouteTable {
    /// 用初始配置构建路由表；构建失败则没有可服务的表
    pub fn build(
        config: &GatewayConfig,
        protocols: Arc<ProtocolRegistry>,
        plugins: Arc<PluginRegistry>,
    ) -> JunctionResult<Self> {
        let index = RouteIndex::build(config, &protocols, &plugins)?;
        Ok(Self {
            current: ArcSwap::from_pointee(index),
            protocols,
            plugins,
        })
    }

    /// 在旁路构建新索引并原子替换
    ///
    /// 构建失败时返回错误且不触碰当前快照：引擎宁可继续服务旧配置也不
    /// 服务半成品。
    pub fn reload(&self, config: &GatewayConfig) -> JunctionResult<()> {
        let index = RouteIndex::build(config, &self.protocols, &self.plugins)?;
        self.swap(index);
        info!("Route index reloaded and swapped in");
        Ok(())
    }

    /// 用一份已构建完成的索引原子替换当前快照
    pub fn swap(&self, index: RouteIndex) {
        self.current.store(Arc::new(index));
    }

    /// 取当前索引快照；快照在持有期间保持完整一致
    pub fn snapshot(&self) -> Arc<RouteIndex> {
        self.current.load_full()
    }

    /// 解析一次请求：匹配路由、选择目标、计算改写路径
    pub fn resolve<F>(&self, path: &str, host: &str, lookup: &F) -> JunctionResult<RoutingDecision>
    where
        F: Fn(&str) -> Option<String>,
    {
        let index = self.snapshot();
        let entry = index.match_route(path, host, lookup)?;
        let target = select_target(&entry.targets, entry.hash_key.as_deref(), lookup)?;

        let outbound = rewrite_path(entry, target, path);
        let reported_path = if entry.report_pattern {
            entry.pattern.clone()
        } else {
            path.to_string()
        };

        Ok(RoutingDecision {
            route_id: entry.id.clone(),
            backend: Arc::clone(&target.backend),
            plugins: Arc::clone(&target.plugins),
            path: outbound,
            reported_path,
        })
    }
}

/// 计算转发路径：目标级改写/剥离覆盖路由级设置
fn rewrite_path(entry: &RouteEntry, target: &ResolvedTarget, path: &str) -> String {
    if let Some(rewrite) = target.rewrite.as_ref().or(entry.rewrite.as_ref()) {
        return rewrite.clone();
    }

    let strip = target.strip_prefix.unwrap_or(entry.strip_prefix);
    // 正则模式不是字面前缀，剥离对其没有意义
    if strip && !entry.is_regexp {
        let prefix = entry.pattern.trim_end_matches('/');
        if let Some(rest) = path.strip_prefix(prefix) {
            if rest.is_empty() {
                return "/".to_string();
            }
            if rest.starts_with('/') {
                return rest.to_string();
            }
            return format!("/{}", rest);
        }
    }

    path.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{RouteRule, RouteTarget};
    use crate::plugins::registry::PassthroughCheck;
    use crate::protocol::{ProtocolHandler, ProtocolType};

    struct StubForwarder;

    impl ProtocolHandler for StubForwarder {
        fn protocol(&self) -> ProtocolType {
            ProtocolType::Http
        }
        fn name(&self) -> &str {
            "stub-http"
        }
    }

    fn no_values(_: &str) -> Option<String> {
        None
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
            backends: vec![Backend {
                name: "users".to_string(),
                address: "10.0.0.1:8080".to_string(),
                network: "tcp".to_string(),
                protocol: ProtocolType::Http,
                timeout: None,
                hints: Default::default(),
                plugins: vec![],
            }],
            plugins: vec![],
        }
    }

    fn table(routes: Vec<RouteRule>) -> RouteTable {
        let protocols = Arc::new(ProtocolRegistry::new());
        protocols.register(Arc::new(StubForwarder));
        let plugins = Arc::new(PluginRegistry::new());
        plugins.register("access-log", Arc::new(PassthroughCheck));
        RouteTable::build(&config(routes), protocols, plugins).unwrap()
    }

    #[test]
    fn test_resolve_returns_decision() {
        let table = table(vec![route("r1", "/user/info")]);
        let decision = table.resolve("/user/info", "", &no_values).unwrap();

        assert_eq!(decision.route_id, "r1");
        assert_eq!(decision.backend.name, "users");
        assert_eq!(decision.path, "/user/info");
        assert_eq!(decision.reported_path, "/user/info");
        assert!(decision.plugins.is_empty());
    }

    #[test]
    fn test_route_level_strip_prefix() {
        let mut r = route("r1", "/user/");
        r.strip_prefix = true;

        let table = table(vec![r]);
        let decision = table.resolve("/user/info", "", &no_values).unwrap();
        assert_eq!(decision.path, "/info");
    }

    #[test]
    fn test_strip_prefix_on_exact_match_yields_root() {
        let mut r = route("r1", "/user/info");
        r.strip_prefix = true;

        let table = table(vec![r]);
        let decision = table.resolve("/user/info", "", &no_values).unwrap();
        assert_eq!(decision.path, "/");
    }

    #[test]
    fn test_target_rewrite_overrides_route_settings() {
        let mut r = route("r1", "/user/");
        r.strip_prefix = true;
        r.rewrite = Some("/route-level".to_string());
        r.targets[0].rewrite = Some("/internal/user".to_string());

        let table = table(vec![r]);
        let decision = table.resolve("/user/info", "", &no_values).unwrap();
        assert_eq!(decision.path, "/internal/user");
    }

    #[test]
    fn test_target_strip_override_disables_route_strip() {
        let mut r = route("r1", "/user/");
        r.strip_prefix = true;
        r.targets[0].strip_prefix = Some(false);

        let table = table(vec![r]);
        let decision = table.resolve("/user/info", "", &no_values).unwrap();
        assert_eq!(decision.path, "/user/info");
    }

    #[test]
    fn test_reported_path_uses_pattern_when_configured() {
        let mut r = route("r1", "/user/");
        r.report_pattern = true;

        let table = table(vec![r]);
        let decision = table.resolve("/user/info", "", &no_values).unwrap();
        assert_eq!(decision.reported_path, "/user/");
        assert_eq!(decision.path, "/user/info");
    }

    #[test]
    fn test_reload_swaps_index() {
        let table = table(vec![route("old", "/old/")]);
        assert!(table.resolve("/old/x", "", &no_values).is_ok());

        table.reload(&config(vec![route("new", "/new/")])).unwrap();

        assert!(table.resolve("/old/x", "", &no_values).is_err());
        let decision = table.resolve("/new/x", "", &no_values).unwrap();
        assert_eq!(decision.route_id, "new");
    }

    #[test]
    fn test_failed_reload_keeps_serving_previous_index() {
        let table = table(vec![route("r1", "/user/")]);

        // Empty route list never builds.
        assert!(table.reload(&config(vec![])).is_err());

        let decision = table.resolve("/user/info", "", &no_values).unwrap();
        assert_eq!(decision.route_id, "r1");
    }

    #[test]
    fn test_in_flight_snapshot_survives_reload() {
        let table = table(vec![route("old", "/old/")]);
        let snapshot = table.snapshot();

        table.reload(&config(vec![route("new", "/new/")])).unwrap();

        // The pre-reload snapshot still matches the old route in full.
        assert!(snapshot.match_route("/old/x", "", &no_values).is_ok());
        // A fresh load observes the new one.
        assert!(table.snapshot().match_route("/new/x", "", &no_values).is_ok());
    }
}
