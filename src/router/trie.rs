//! 路径前缀树
//!
//! 以 `/` 分段组织键，支持精确查找和最长字符串前缀查找。一个键可以存放
//! 任意值（路由表里是候选路由列表）；重复插入同一键会替换旧值，追加语义
//! 由调用方通过 `get_mut` 实现。

use std::collections::HashMap;

#[derive(Debug)]
struct TrieNode<T> {
    children: HashMap<String, TrieNode<T>>,
    /// 键在此节点终止时存放（完整键原文, 值）
    entry: Option<(String, T)>,
}

impl<T> TrieNode<T> {
    fn new() -> Self {
        Self {
            children: HashMap::new(),
            entry: None,
        }
    }
}

/// 按 `/` 分段的前缀树
#[derive(Debug)]
pub struct PathTrie<T> {
    root: TrieNode<T>,
    len: usize,
}

impl<T> Default for PathTrie<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> PathTrie<T> {
    /// 创建空树
    pub fn new() -> Self {
        Self {
            root: TrieNode::new(),
            len: 0,
        }
    }

    /// 键的数量
    pub fn len(&self) -> usize {
        self.len
    }

    /// 是否为空
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// 插入键值；键已存在时替换并返回旧值
    pub fn insert(&mut self, key: &str, value: T) -> Option<T> {
        let mut node = &mut self.root;
        for segment in key.split('/') {
            node = node
                .children
                .entry(segment.to_string())
                .or_insert_with(TrieNode::new);
        }

        let old = node.entry.replace((key.to_string(), value));
        match old {
            Some((_, value)) => Some(value),
            None => {
                self.len += 1;
                None
            }
        }
    }

    fn node(&self, key: &str) -> Option<&TrieNode<T>> {
        let mut node = &self.root;
        for segment in key.split('/') {
            node = node.children.get(segment)?;
        }
        Some(node)
    }

    /// 精确查找
    pub fn get(&self, key: &str) -> Option<&T> {
        self.node(key)
            .and_then(|n| n.entry.as_ref())
            .map(|(_, value)| value)
    }

    /// 精确查找（可变）
    pub fn get_mut(&mut self, key: &str) -> Option<&mut T> {
        let mut node = &mut self.root;
        for segment in key.split('/') {
            node = node.children.get_mut(segment)?;
        }
        node.entry.as_mut().map(|(_, value)| value)
    }

    /// 最长前缀查找：返回作为 `path` 字符串前缀的最长键及其值
    ///
    /// 只有单一最长结果；是否接受该结果（例如要求键以 `/` 结尾）由调用方
    /// 判断，这里不回退到更短的前缀。
    pub fn longest_prefix(&self, path: &str) -> Option<(&str, &T)> {
        let segments: Vec<&str> = path.split('/').collect();
        let mut node = &self.root;
        let mut best: Option<(&str, &T)> = None;

        for (position, segment) in segments.iter().enumerate() {
            let Some(next) = node.children.get(*segment) else {
                break;
            };
            node = next;
            let consumed = position + 1;

            if consumed == segments.len() {
                // 键与路径完全相等也算前缀
                if let Some((key, value)) = &node.entry {
                    best = Some((key.as_str(), value));
                }
            } else {
                // 路径在此节点之后还有内容，因此以 '/' 继续：节点自身的键
                // （如 "/user"）和带尾斜杠的键（如 "/user/"，挂在 "" 子节点
                // 上）都是路径的字符串前缀，后者更长。
                if let Some((key, value)) = &node.entry {
                    best = Some((key.as_str(), value));
                }
                if let Some(slash_child) = node.children.get("") {
                    if let Some((key, value)) = &slash_child.entry {
                        best = Some((key.as_str(), value));
                    }
                }
            }
        }

        best
    }
}
