//! Schematic: node set plus an ordered list of components.

use super::types::{ComponentId, NodeId};
use crate::components::{BranchRequirement, Component};
use crate::error::{NodalError, Result};

/// Circuit topology handed to the transient simulator.
///
/// Components are stamped in the order they were added, which keeps the
/// floating-point accumulation of every step reproducible.
#[derive(Debug, Clone)]
pub struct Schematic {
    /// Number of nodes, including ground
    node_count: usize,
    /// All components, in insertion order
    components: Vec<Component>,
}

impl Default for Schematic {
    fn default() -> Self {
        Self::new()
    }
}

impl Schematic {
    /// Create a schematic containing only the ground node.
    pub fn new() -> Self {
        Self {
            node_count: 1,
            components: Vec::new(),
        }
    }

    /// Create a schematic with `count` nodes besides ground.
    pub fn with_nodes(count: usize) -> Self {
        Self {
            node_count: count + 1,
            components: Vec::new(),
        }
    }

    /// Declare a new node.
    pub fn add_node(&mut self) -> NodeId {
        let node = NodeId(self.node_count);
        self.node_count += 1;
        node
    }

    /// Add a component, assigning it the next [`ComponentId`].
    ///
    /// Every terminal must name a declared node and the component name must
    /// be unique within the schematic.
    pub fn add_component(&mut self, component: impl Into<Component>) -> Result<ComponentId> {
        let mut component = component.into();

        for node in component.nodes() {
            if node.0 >= self.node_count {
                return Err(NodalError::NodeNotFound { node: node.0 });
            }
        }
        if self.find_component(component.name()).is_some() {
            return Err(NodalError::DuplicateComponent {
                name: component.name().to_string(),
            });
        }

        let id = ComponentId(self.components.len());
        component.assign_id(id);
        self.components.push(component);
        Ok(id)
    }

    /// Number of nodes, including ground.
    pub fn node_count(&self) -> usize {
        self.node_count
    }

    /// All node IDs, ground first.
    pub fn nodes(&self) -> impl Iterator<Item = NodeId> {
        (0..self.node_count).map(NodeId)
    }

    /// Components in stamping order.
    pub fn components(&self) -> &[Component] {
        &self.components
    }

    pub fn component(&self, id: ComponentId) -> Option<&Component> {
        self.components.get(id.0)
    }

    /// Find a component by name.
    pub fn find_component(&self, name: &str) -> Option<&Component> {
        self.components.iter().find(|c| c.name() == name)
    }

    /// Number of components that need their own system row.
    pub fn source_row_count(&self) -> usize {
        self.components
            .iter()
            .filter(|c| c.branch_requirement() == BranchRequirement::SourceRow)
            .count()
    }

    /// Dimension of the per-step system: node voltages (excluding ground)
    /// followed by source branch currents.
    pub fn system_size(&self) -> usize {
        (self.node_count - 1) + self.source_row_count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::{Inductor, Resistor, VoltageSource};

    #[test]
    fn test_new_schematic_has_only_ground() {
        let s = Schematic::new();
        assert_eq!(s.node_count(), 1);
        assert_eq!(s.system_size(), 0);
        assert_eq!(s.nodes().collect::<Vec<_>>(), vec![NodeId::GROUND]);
    }

    #[test]
    fn test_add_components_in_order() {
        let mut s = Schematic::new();
        let n1 = s.add_node();
        let n2 = s.add_node();
        let v = s.add_component(VoltageSource::new("V1", [n1, NodeId::GROUND], 5.0)).unwrap();
        let r = s.add_component(Resistor::new("R1", [n1, n2], 100.0)).unwrap();
        let l = s.add_component(Inductor::new("L1", [n2, NodeId::GROUND], 1e-3)).unwrap();

        assert_eq!((v, r, l), (ComponentId(0), ComponentId(1), ComponentId(2)));
        assert_eq!(s.component(r).unwrap().name(), "R1");
        assert_eq!(s.find_component("L1").unwrap().id(), l);
        assert_eq!(s.system_size(), 3);
    }

    #[test]
    fn test_unknown_node_rejected() {
        let mut s = Schematic::with_nodes(1);
        let err = s
            .add_component(Resistor::new("R1", [NodeId(1), NodeId(2)], 1.0))
            .unwrap_err();
        assert_eq!(err, NodalError::NodeNotFound { node: 2 });
        assert!(s.components().is_empty());
    }

    #[test]
    fn test_duplicate_name_rejected() {
        let mut s = Schematic::with_nodes(1);
        s.add_component(Resistor::new("R1", [NodeId(1), NodeId(0)], 1.0)).unwrap();
        let err = s
            .add_component(Resistor::new("R1", [NodeId(1), NodeId(0)], 2.0))
            .unwrap_err();
        assert!(matches!(err, NodalError::DuplicateComponent { .. }));
    }
}
