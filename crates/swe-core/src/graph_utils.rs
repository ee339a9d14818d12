use crate::{BusId, Grid, Node};
use petgraph::stable_graph::NodeIndex;
use petgraph::visit::EdgeRef;
use std::collections::{HashSet, VecDeque};

/// One synchronous island: buses linked by closed AC lines and transformers.
#[derive(Debug, Clone)]
pub struct Island {
    pub island_id: usize,
    pub buses: Vec<BusId>,
}

/// Labels synchronous islands by breadth-first search over closed AC edges.
///
/// Islands are ordered by decreasing size, ties broken by their smallest bus
/// id, so island 0 is the main synchronous component.
pub fn find_islands(grid: &Grid) -> Vec<Island> {
    let mut visited: HashSet<NodeIndex> = HashSet::new();
    let mut islands: Vec<Vec<BusId>> = Vec::new();

    for start in grid.graph.node_indices() {
        if !matches!(grid.graph[start], Node::Bus(_)) || visited.contains(&start) {
            continue;
        }
        let mut queue = VecDeque::new();
        queue.push_back(start);
        let mut members = Vec::new();
        while let Some(node) = queue.pop_front() {
            if !visited.insert(node) {
                continue;
            }
            if let Node::Bus(bus) = &grid.graph[node] {
                members.push(bus.id.clone());
            }
            for edge in grid.graph.edges(node) {
                if !edge.weight().is_closed_ac() {
                    continue;
                }
                let neighbor = if edge.source() == node {
                    edge.target()
                } else {
                    edge.source()
                };
                if !visited.contains(&neighbor) {
                    queue.push_back(neighbor);
                }
            }
        }
        members.sort();
        islands.push(members);
    }

    islands.sort_by(|a, b| b.len().cmp(&a.len()).then_with(|| a.first().cmp(&b.first())));
    islands
        .into_iter()
        .enumerate()
        .map(|(island_id, buses)| Island { island_id, buses })
        .collect()
}

/// Buses of the main synchronous component.
pub fn main_component_buses(grid: &Grid) -> HashSet<BusId> {
    find_islands(grid)
        .into_iter()
        .next()
        .map(|island| island.buses.into_iter().collect())
        .unwrap_or_default()
}

impl Grid {
    /// Whether `bus_id` belongs to the main synchronous component.
    ///
    /// Recomputes the islands; callers checking many buses should use
    /// [`main_component_buses`] once instead.
    pub fn is_in_main_component(&self, bus_id: &BusId) -> bool {
        main_component_buses(self).contains(bus_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Branch, BranchId, Bus, Kilovolts, Transformer, Zone};

    fn grid_with_islands() -> Grid {
        let mut grid = Grid::new();
        for id in ["A1", "A2", "A3", "B1", "B2", "C1"] {
            grid.add_bus(Bus::new(id, Zone::Es, Kilovolts(400.0))).unwrap();
        }
        grid.add_line(Branch::new("A1-A2", "A1", "A2", 0.0, 0.01)).unwrap();
        grid.add_line(Branch::new("A2-A3", "A2", "A3", 0.0, 0.01)).unwrap();
        grid.add_line(Branch::new("B1-B2", "B1", "B2", 0.0, 0.01)).unwrap();
        let mut open = Transformer::new("T-A3-C1", "A3", "C1", 0.05);
        open.connected2 = false;
        grid.add_transformer(open).unwrap();
        grid
    }

    #[test]
    fn islands_are_sorted_by_size() {
        let islands = find_islands(&grid_with_islands());
        assert_eq!(islands.len(), 3);
        assert_eq!(islands[0].buses.len(), 3);
        assert_eq!(islands[1].buses.len(), 2);
        assert_eq!(islands[2].buses, vec![BusId::new("C1")]);
    }

    #[test]
    fn open_transformer_isolates_bus() {
        let mut grid = grid_with_islands();
        assert!(!grid.is_in_main_component(&BusId::new("C1")));
        grid.transformer_mut(&BranchId::new("T-A3-C1"))
            .unwrap()
            .connected2 = true;
        assert!(grid.is_in_main_component(&BusId::new("C1")));
    }

    #[test]
    fn line_open_on_one_side_splits_component() {
        let mut grid = grid_with_islands();
        grid.line_mut(&BranchId::new("A2-A3")).unwrap().connected1 = false;
        let main = main_component_buses(&grid);
        // {A1, A2} and {B1, B2} tie on size; A1 sorts first
        assert!(main.contains(&BusId::new("A1")));
        assert!(!main.contains(&BusId::new("A3")));
    }

    #[test]
    fn empty_grid_has_no_main_component() {
        assert!(main_component_buses(&Grid::new()).is_empty());
    }
}
