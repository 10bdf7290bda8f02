//! 加权目标选择
//!
//! 在累计权重轴上取一个选择点：配置了 hash_key 且请求带有该属性时，选择
//! 点由属性值的确定性哈希给出（同一属性值总是落在同一目标，实现灰度会话
//! 保持）；否则均匀随机。零权重目标永远不会被选中。

use rand::Rng;
use xxhash_rust::xxh3::xxh3_64;

use crate::error::{JunctionError, JunctionResult};

use super::index::ResolvedTarget;

/// 从加权目标列表中选出一个目标
///
/// 空列表和零总权重都返回服务不可用错误；后者在构建期已对多目标路由拒绝
/// 过，这里是请求期的防御性复查。
pub fn select_target<'a, F>(
    targets: &'a [ResolvedTarget],
    hash_key: Option<&str>,
    lookup: &F,
) -> JunctionResult<&'a ResolvedTarget>
where
    F: Fn(&str) -> Option<String>,
{
    if targets.is_empty() {
        return Err(JunctionError::service_unavailable("route has no targets"));
    }

    // 单目标直接返回，跳过权重计算
    if targets.len() == 1 {
        return Ok(&targets[0]);
    }

    let total: u64 = targets.iter().map(|t| t.weight as u64).sum();
    if total == 0 {
        return Err(JunctionError::service_unavailable(
            "total target weight is zero",
        ));
    }

    let sticky_value = hash_key
        .and_then(|key| lookup(key))
        .filter(|value| !value.is_empty());

    let point = match sticky_value {
        Some(value) => xxh3_64(value.as_bytes()) % total,
        None => rand::thread_rng().gen_range(0..total),
    };

    let mut cumulative = 0u64;
    for target in targets {
        cumulative += target.weight as u64;
        if point < cumulative {
            return Ok(target);
        }
    }

    Err(JunctionError::internal(
        "weighted selection walked past the total weight",
    ))
}
