//! Skill point allocation over the adjacency-gated tree.

use std::collections::BTreeMap;

use gem_defence_core::{
    catalog::{skill_neighbours, skill_node, SKILL_ROOT},
    CommandError, SkillNodeId,
};

#[derive(Clone, Debug)]
pub(crate) struct SkillAllocations {
    ranks: BTreeMap<SkillNodeId, u8>,
    points: u32,
}

impl Default for SkillAllocations {
    fn default() -> Self {
        let mut ranks = BTreeMap::new();
        let _ = ranks.insert(SKILL_ROOT, 1);
        Self { ranks, points: 0 }
    }
}

impl SkillAllocations {
    pub(crate) fn rank(&self, node: SkillNodeId) -> u8 {
        self.ranks.get(&node).copied().unwrap_or(0)
    }

    pub(crate) fn points(&self) -> u32 {
        self.points
    }

    pub(crate) fn grant(&mut self, points: u32) {
        self.points = self.points.saturating_add(points);
    }

    /// Allocated ranks in node order.
    pub(crate) fn ranks(&self) -> Vec<(SkillNodeId, u8)> {
        self.ranks
            .iter()
            .filter(|(_, rank)| **rank > 0)
            .map(|(node, rank)| (*node, *rank))
            .collect()
    }

    /// Spends one point on `node`, returning its new rank.
    ///
    /// A node with no rank yet needs an allocated neighbour along an edge in
    /// either direction.
    pub(crate) fn allocate(&mut self, node: SkillNodeId) -> Result<u8, CommandError> {
        let definition = skill_node(node).ok_or(CommandError::UnknownSkillNode(node))?;
        let rank = self.rank(node);
        if rank >= definition.max_rank {
            return Err(CommandError::SkillNodeCapped(node));
        }
        if rank == 0 && !skill_neighbours(node).any(|neighbour| self.rank(neighbour) > 0) {
            return Err(CommandError::SkillNodeUnconnected(node));
        }
        if self.points == 0 {
            return Err(CommandError::NoSkillPoints);
        }

        self.points -= 1;
        let rank = rank + 1;
        let _ = self.ranks.insert(node, rank);
        Ok(rank)
    }
}
