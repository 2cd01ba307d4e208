//! Context：query → 结果 的累积映射
//!
//! 键唯一，重复 query 时后写覆盖；迭代顺序为键首次出现的顺序，值为最近一次写入。

use std::collections::HashMap;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Context {
    entries: Vec<(String, String)>,
    positions: HashMap<String, usize>,
}

impl Context {
    pub fn new() -> Self {
        Self::default()
    }

    /// 写入结果；query 已存在时覆盖并返回旧值
    pub fn insert(&mut self, query: impl Into<String>, result: impl Into<String>) -> Option<String> {
        let query = query.into();
        let result = result.into();
        match self.positions.get(&query) {
            Some(&pos) => Some(std::mem::replace(&mut self.entries[pos].1, result)),
            None => {
                self.positions.insert(query.clone(), self.entries.len());
                self.entries.push((query, result));
                None
            }
        }
    }

    pub fn get(&self, query: &str) -> Option<&str> {
        self.positions
            .get(query)
            .map(|&pos| self.entries[pos].1.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(q, r)| (q.as_str(), r.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_last_write_wins_keeps_first_position() {
        let mut ctx = Context::new();
        assert_eq!(ctx.insert("a", "1"), None);
        ctx.insert("b", "2");
        assert_eq!(ctx.insert("a", "3"), Some("1".to_string()));

        let entries: Vec<_> = ctx.iter().collect();
        assert_eq!(entries, vec![("a", "3"), ("b", "2")]);
        assert_eq!(ctx.len(), 2);
        assert_eq!(ctx.get("a"), Some("3"));
        assert_eq!(ctx.get("missing"), None);
    }
}
