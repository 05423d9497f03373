//! Template arena
//!
//! Token templates reference their child templates by tooling symbol. The arena
//! resolves those references into index links once, so traversals never chase
//! symbols and can detect cycles by tracking the current path.

use super::core::TokenTemplate;
use crate::error::TaxonomyError;
use crate::types::SymbolMap;
use std::collections::HashMap;

/// One template in the arena
#[derive(Debug, Clone)]
pub struct TemplateNode {
    pub symbol: String,
    pub children: Vec<usize>,
    pub parents: Vec<usize>,
}

/// A template reached during a traversal, with its depth below the start node
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeVisit {
    pub symbol: String,
    pub depth: usize,
}

#[derive(Debug, Clone, Default)]
pub struct TemplateTree {
    nodes: Vec<TemplateNode>,
    index: HashMap<String, usize>,
}

impl TemplateTree {
    /// Build the arena from the template collection.
    ///
    /// Child references that do not resolve to a template are logged and dropped.
    pub fn build(templates: &SymbolMap<TokenTemplate>) -> Self {
        let mut tree = TemplateTree::default();
        for symbol in templates.keys() {
            tree.index.insert(symbol.clone(), tree.nodes.len());
            tree.nodes.push(TemplateNode {
                symbol: symbol.clone(),
                children: Vec::new(),
                parents: Vec::new(),
            });
        }

        for (symbol, template) in templates {
            let parent = tree.index[symbol];
            for child in &template.child_tokens {
                match tree.index.get(&child.tooling) {
                    Some(&child_idx) => {
                        tree.nodes[parent].children.push(child_idx);
                        tree.nodes[child_idx].parents.push(parent);
                    }
                    None => {
                        tracing::warn!(
                            "Template {} references unknown child template {}",
                            symbol,
                            child.tooling
                        );
                    }
                }
            }
        }
        tree
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn node(&self, symbol: &str) -> Option<&TemplateNode> {
        self.index.get(symbol).map(|&idx| &self.nodes[idx])
    }

    /// Resolved child symbols of a template, in descriptor order
    pub fn children(&self, symbol: &str) -> Vec<&str> {
        self.node(symbol)
            .map(|node| {
                node.children
                    .iter()
                    .map(|&idx| self.nodes[idx].symbol.as_str())
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Templates that are nobody's child
    pub fn roots(&self) -> Vec<&str> {
        self.nodes
            .iter()
            .filter(|node| node.parents.is_empty())
            .map(|node| node.symbol.as_str())
            .collect()
    }

    /// Depth-first pre-order walk from `root`.
    ///
    /// Shared children (DAG) are visited once per path that reaches them.
    /// Fails with `TemplateCycle` when a template is reached again on its own
    /// path, and with `InvalidArgument` when `max_depth` is exceeded.
    pub fn walk(&self, root: &str, max_depth: usize) -> Result<Vec<TreeVisit>, TaxonomyError> {
        let start = *self
            .index
            .get(root)
            .ok_or_else(|| TaxonomyError::NotFound(format!("Token template: {}", root)))?;

        let mut visits = Vec::new();
        let mut path = Vec::new();
        self.walk_from(start, 0, max_depth, &mut path, &mut visits)?;
        Ok(visits)
    }

    fn walk_from(
        &self,
        idx: usize,
        depth: usize,
        max_depth: usize,
        path: &mut Vec<usize>,
        visits: &mut Vec<TreeVisit>,
    ) -> Result<(), TaxonomyError> {
        if path.contains(&idx) {
            return Err(TaxonomyError::TemplateCycle(self.describe_path(path, idx)));
        }
        if depth > max_depth {
            return Err(TaxonomyError::InvalidArgument(format!(
                "Template tree below {} exceeds maximum depth {}",
                self.nodes[path[0]].symbol, max_depth
            )));
        }

        visits.push(TreeVisit {
            symbol: self.nodes[idx].symbol.clone(),
            depth,
        });
        path.push(idx);
        for &child in &self.nodes[idx].children {
            self.walk_from(child, depth + 1, max_depth, path, visits)?;
        }
        path.pop();
        Ok(())
    }

    /// First cycle found in the arena, as a symbol path ending where it started
    ///
    /// Iterative, so arbitrarily long child chains are safe to check.
    pub fn find_cycle(&self) -> Option<Vec<String>> {
        // 0 = unvisited, 1 = on the current path, 2 = done
        let mut state = vec![0u8; self.nodes.len()];
        for start in 0..self.nodes.len() {
            if state[start] != 0 {
                continue;
            }
            // (node, position of the next child to visit)
            let mut frames: Vec<(usize, usize)> = vec![(start, 0)];
            state[start] = 1;
            while let Some(frame) = frames.last_mut() {
                let (idx, next) = *frame;
                match self.nodes[idx].children.get(next) {
                    Some(&child) => {
                        frame.1 += 1;
                        match state[child] {
                            0 => {
                                state[child] = 1;
                                frames.push((child, 0));
                            }
                            1 => return Some(self.cycle_symbols(&frames, child)),
                            _ => {}
                        }
                    }
                    None => {
                        state[idx] = 2;
                        frames.pop();
                    }
                }
            }
        }
        None
    }

    fn cycle_symbols(&self, frames: &[(usize, usize)], repeated: usize) -> Vec<String> {
        let pos = frames.iter().position(|&(i, _)| i == repeated).unwrap_or(0);
        let mut cycle: Vec<String> = frames[pos..]
            .iter()
            .map(|&(i, _)| self.nodes[i].symbol.clone())
            .collect();
        cycle.push(self.nodes[repeated].symbol.clone());
        cycle
    }

    fn describe_path(&self, path: &[usize], repeated: usize) -> String {
        let mut symbols: Vec<&str> = path.iter().map(|&i| self.nodes[i].symbol.as_str()).collect();
        symbols.push(self.nodes[repeated].symbol.as_str());
        symbols.join(" -> ")
    }
}
