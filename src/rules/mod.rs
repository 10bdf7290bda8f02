//! # 规则表达式模块
//!
//! 本模块实现细粒度请求匹配使用的布尔表达式子语言：
//!
//! - 将 `"0&&1||2"` 形式的表达式解析为条件下标序列和操作符序列
//! - 在构建期预编译条件（`in`/`!in` 集合、`regexp` 模式）
//! - 在请求期按从左到右折叠求值，取值函数由调用方注入
//!
//! ## 主要组件
//!
//! - `parse_expression`: 表达式解析和验证
//! - `CompiledCondition`: 预编译的原子条件
//! - `CompiledRule`: 可求值的完整规则

pub mod conditions;
pub mod expression;

pub use conditions::{CompiledCondition, CompiledRule};
pub use expression::{parse_expression, LogicOp};
