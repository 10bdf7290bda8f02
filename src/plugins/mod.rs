//! # 插件链解析模块
//!
//! 插件本身（CORS、限流、改写等）由外部实现；本模块只负责在构建期把
//! 全局、后端、路由三个作用域声明的插件合并为一条有序、去重的执行链：
//!
//! - 配置优先级：路由 > 后端 > 全局（同名插件取最具体作用域的配置）
//! - 执行顺序：全局 → 后端 → 路由（作用域越宽的插件包裹得越靠外）
//! - `disable` 的插件从合并结果中剔除
//! - 存活插件的配置交由注册的配置检查器解析，解析失败导致构建失败

pub mod registry;
pub mod resolver;

pub use registry::{PluginChecker, PluginRegistry};
pub use resolver::{merge_plugin_scopes, resolve_plugin_chain, ResolvedPlugin};
