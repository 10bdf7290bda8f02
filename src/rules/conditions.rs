//! 条件预编译与求值
//!
//! 条件在路由表构建期编译一次（集合拆分、正则编译），请求期只做查表和
//! 预编译模式匹配，热路径上不再发生任何编译动作。

use regex::Regex;
use std::cmp::Ordering;
use std::collections::HashSet;

use crate::config::routes::{Condition, RuleConfig};
use crate::error::{JunctionError, JunctionResult};

use super::expression::{parse_expression, LogicOp};

/// 构建期派生的条件比较物
#[derive(Debug, Clone)]
enum ParsedVal {
    /// 标量比较，无预编译产物
    Scalar,
    /// `in` / `!in` 的成员集合（逗号分隔，已去除空白）
    Set(HashSet<String>),
    /// `regexp` 的预编译模式
    Pattern(Regex),
}

/// 预编译的原子条件
#[derive(Debug, Clone)]
pub struct CompiledCondition {
    /// 请求属性名
    pub key: String,
    /// 操作符原文
    pub oper: String,
    /// 比较字面值原文
    pub val: String,
    parsed: ParsedVal,
}

impl CompiledCondition {
    /// 编译一个条件；`regexp` 模式非法时返回配置错误
    pub fn compile(condition: &Condition) -> JunctionResult<Self> {
        if condition.key.is_empty() {
            return Err(JunctionError::config("condition has empty key"));
        }

        let parsed = match condition.oper.as_str() {
            "in" | "!in" => {
                let set = condition
                    .val
                    .split(',')
                    .map(|s| s.trim().to_string())
                    .collect();
                ParsedVal::Set(set)
            }
            "regexp" => ParsedVal::Pattern(Regex::new(&condition.val)?),
            _ => ParsedVal::Scalar,
        };

        Ok(Self {
            key: condition.key.clone(),
            oper: condition.oper.clone(),
            val: condition.val.clone(),
            parsed,
        })
    }

    /// 用请求属性值求值此条件
    ///
    /// 未知操作符返回 `false`（失败关闭），不会中断整条请求路径。
    pub fn evaluate(&self, actual: &str) -> bool {
        match self.oper.as_str() {
            ">" => compare_scalar(actual, &self.val) == Ordering::Greater,
            ">=" => compare_scalar(actual, &self.val) != Ordering::Less,
            "<" => compare_scalar(actual, &self.val) == Ordering::Less,
            "<=" => compare_scalar(actual, &self.val) != Ordering::Greater,
            "==" => actual == self.val,
            "!=" => actual != self.val,
            "in" => match &self.parsed {
                ParsedVal::Set(set) => set.contains(actual),
                _ => false,
            },
            "!in" => match &self.parsed {
                ParsedVal::Set(set) => !set.contains(actual),
                _ => false,
            },
            "regexp" => match &self.parsed {
                ParsedVal::Pattern(pattern) => pattern.is_match(actual),
                _ => false,
            },
            _ => false,
        }
    }
}

/// 数值优先的标量比较：两侧都能解析为整数时按数值比较，否则按字典序
fn compare_scalar(actual: &str, expected: &str) -> Ordering {
    match (actual.parse::<i64>(), expected.parse::<i64>()) {
        (Ok(a), Ok(b)) => a.cmp(&b),
        _ => actual.cmp(expected),
    }
}

/// 预编译的完整规则：条件列表加解析后的表达式
#[derive(Debug, Clone)]
pub struct CompiledRule {
    conditions: Vec<CompiledCondition>,
    indices: Vec<usize>,
    operators: Vec<LogicOp>,
}

impl CompiledRule {
    /// 编译规则配置；表达式或条件非法时返回配置错误
    pub fn compile(config: &RuleConfig) -> JunctionResult<Self> {
        let (indices, operators) = parse_expression(&config.expression, config.conditions.len())?;

        let conditions = config
            .conditions
            .iter()
            .map(CompiledCondition::compile)
            .collect::<JunctionResult<Vec<_>>>()?;

        Ok(Self {
            conditions,
            indices,
            operators,
        })
    }

    /// 从左到右折叠求值
    ///
    /// 取值函数返回 `None` 时按空字符串比较。下标越界说明规则在解析后被
    /// 改动过，返回求值错误而不是 panic。
    pub fn evaluate<F>(&self, lookup: F) -> JunctionResult<bool>
    where
        F: Fn(&str) -> Option<String>,
    {
        let first = *self.indices.first().ok_or_else(|| {
            JunctionError::rule_evaluation("rule has an empty condition index sequence")
        })?;

        let mut result = self.evaluate_at(first, &lookup)?;
        for (op, &index) in self.operators.iter().zip(self.indices.iter().skip(1)) {
            let rhs = self.evaluate_at(index, &lookup)?;
            result = match op {
                LogicOp::And => result && rhs,
                LogicOp::Or => result || rhs,
            };
        }

        Ok(result)
    }

    fn evaluate_at<F>(&self, index: usize, lookup: &F) -> JunctionResult<bool>
    where
        F: Fn(&str) -> Option<String>,
    {
        let condition = self.conditions.get(index).ok_or_else(|| {
            JunctionError::rule_evaluation(format!(
                "condition index {} out of range ({} conditions)",
                index,
                self.conditions.len()
            ))
        })?;

        let actual = lookup(&condition.key).unwrap_or_default();
        Ok(condition.evaluate(&actual))
    }
}
