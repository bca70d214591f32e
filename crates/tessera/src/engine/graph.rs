use tessera_core::schema::{Model, Relation};
use tessera_core::Schema;

use indexmap::IndexMap;
use std::collections::HashMap;

/// Shape of a payload rooted at one model, derived from the schema.
///
/// Nodes are created on first use and memoized by entity, so cyclic relation
/// graphs (users -> posts -> users) resolve to a finite arena.
pub(crate) struct Graph<'a> {
    schema: &'a Schema,
    nodes: Vec<Node<'a>>,
    by_entity: HashMap<&'a str, NodeId>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct NodeId(usize);

pub(crate) struct Node<'a> {
    pub(crate) model: &'a Model,
    pub(crate) slots: IndexMap<&'a str, Slot<'a>>,
}

/// How a relation field nests inside its owner.
#[derive(Debug, Clone, Copy)]
pub(crate) enum Slot<'a> {
    One(NodeId),
    Many(NodeId),
    /// Polymorphic: the target model is named by the owner's `ty` field.
    Union { ty: &'a str },
}

impl<'a> Graph<'a> {
    pub(crate) fn new(schema: &'a Schema) -> Graph<'a> {
        Graph {
            schema,
            nodes: vec![],
            by_entity: HashMap::new(),
        }
    }

    pub(crate) fn node(&mut self, model: &'a Model) -> NodeId {
        if let Some(id) = self.by_entity.get(model.entity.as_str()) {
            return *id;
        }

        // Register before recursing so cycles find the node
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            model,
            slots: IndexMap::new(),
        });
        self.by_entity.insert(&model.entity, id);

        for (name, relation) in model.relations() {
            let slot = match relation {
                Relation::MorphTo(rel) => Slot::Union { ty: &rel.ty },
                relation => {
                    let Some(related) = relation.related().and_then(|e| self.schema.get(e)) else {
                        continue;
                    };
                    let child = self.node(related);
                    if relation.is_plural() {
                        Slot::Many(child)
                    } else {
                        Slot::One(child)
                    }
                }
            };

            self.nodes[id.0].slots.insert(name, slot);
        }

        id
    }

    pub(crate) fn get(&self, id: NodeId) -> &Node<'a> {
        &self.nodes[id.0]
    }
}
