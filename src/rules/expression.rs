//! 布尔表达式解析
//!
//! 表达式由条件下标和二元操作符交替组成，例如 `"0&&1||2"`。解析提取所有
//! 数字串作为下标序列，剩余的非数字串作为操作符序列；首尾的分割残留会被
//! 丢弃。下标必须升序出现且小于条件数量。

use std::fmt;

use crate::error::{JunctionError, JunctionResult};

/// 表达式中的二元逻辑操作符
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogicOp {
    And,
    Or,
}

impl LogicOp {
    fn from_token(token: &str) -> Option<Self> {
        match token {
            "&&" => Some(LogicOp::And),
            "||" => Some(LogicOp::Or),
            _ => None,
        }
    }
}

impl fmt::Display for LogicOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogicOp::And => write!(f, "&&"),
            LogicOp::Or => write!(f, "||"),
        }
    }
}

/// 解析表达式为（条件下标序列, 操作符序列）
///
/// 验证内容：操作符只能是 `&&` 或 `||`；下标升序；最大下标小于
/// `condition_count`；操作符数量恰好比下标数量少一。空表达式或零条件
/// 数量是解析错误。
pub fn parse_expression(
    expr: &str,
    condition_count: usize,
) -> JunctionResult<(Vec<usize>, Vec<LogicOp>)> {
    if expr.is_empty() {
        return Err(JunctionError::config("rule expression is empty"));
    }

    if condition_count == 0 {
        return Err(JunctionError::config(
            "rule expression given with zero conditions",
        ));
    }

    let mut indices: Vec<usize> = Vec::new();
    let mut operators: Vec<LogicOp> = Vec::new();

    let mut chars = expr.char_indices().peekable();
    while let Some(&(start, c)) = chars.peek() {
        let mut end = start;
        if c.is_ascii_digit() {
            while let Some(&(i, c)) = chars.peek() {
                if !c.is_ascii_digit() {
                    break;
                }
                end = i + c.len_utf8();
                chars.next();
            }
            let run = &expr[start..end];
            let index: usize = run.parse().map_err(|_| {
                JunctionError::config(format!("invalid condition index '{}' in '{}'", run, expr))
            })?;
            indices.push(index);
        } else {
            while let Some(&(i, c)) = chars.peek() {
                if c.is_ascii_digit() {
                    break;
                }
                end = i + c.len_utf8();
                chars.next();
            }
            // Leading and trailing runs are split artifacts; only runs between
            // two indices are operators.
            if indices.is_empty() || chars.peek().is_none() {
                continue;
            }
            let token = &expr[start..end];
            let op = LogicOp::from_token(token).ok_or_else(|| {
                JunctionError::config(format!("unknown operator '{}' in '{}'", token, expr))
            })?;
            operators.push(op);
        }
    }

    if indices.is_empty() {
        return Err(JunctionError::config(format!(
            "rule expression '{}' contains no condition indices",
            expr
        )));
    }

    if operators.len() + 1 != indices.len() {
        return Err(JunctionError::config(format!(
            "rule expression '{}' has {} indices but {} operators",
            expr,
            indices.len(),
            operators.len()
        )));
    }

    if indices.windows(2).any(|w| w[0] > w[1]) {
        return Err(JunctionError::config(format!(
            "rule expression '{}' indices are not in sorted order",
            expr
        )));
    }

    if let Some(&max) = indices.iter().max() {
        if max >= condition_count {
            return Err(JunctionError::config(format!(
                "rule expression '{}' references condition {} but only {} conditions exist",
                expr, max, condition_count
            )));
        }
    }

    Ok((indices, operators))
}
