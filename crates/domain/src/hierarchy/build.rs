use std::collections::HashMap;
use std::str::FromStr;

use terreno_core::NonEmptyString;

use crate::Role;

use super::{
    FlatHierarchyRecord, HierarchyNode, HierarchyNodePayload, HierarchyPayload, HierarchyTree,
    ReportedNetworkSummary, ReportedTotals, StructuralError,
};

impl HierarchyTree {
    /// Builds and aggregates a tree from a nested hierarchy payload.
    ///
    /// Fails on a missing root, blank or repeated identifiers, self references,
    /// ancestor references, unknown roles and negative counts.
    pub fn build(payload: &HierarchyPayload) -> Result<Self, StructuralError> {
        let root = payload
            .lider_general
            .as_ref()
            .ok_or(StructuralError::MissingRoot)?;
        let reported_summary = ReportedNetworkSummary::from_payload(payload)?;

        let mut assembler = TreeAssembler::default();
        let mut pending: Vec<(&HierarchyNodePayload, Option<usize>)> = vec![(root, None)];
        while let Some((node, parent)) = pending.pop() {
            let index = assembler.push(parent, NodeFields::from_nested(node)?)?;
            pending.extend(
                node.subordinados
                    .iter()
                    .rev()
                    .map(|child| (child, Some(index))),
            );
        }

        Ok(assembler.finish(reported_summary))
    }

    /// Builds and aggregates a tree from a flat roster with parent references.
    ///
    /// Exactly one record must have no parent. Records that cannot be reached from
    /// that root form a cycle among themselves and are rejected.
    pub fn from_flat(records: &[FlatHierarchyRecord]) -> Result<Self, StructuralError> {
        let mut ids = Vec::with_capacity(records.len());
        let mut position_by_id = HashMap::with_capacity(records.len());
        for (position, record) in records.iter().enumerate() {
            let id = record.id.canonical();
            if id.is_empty() {
                return Err(StructuralError::EmptyIdentifier);
            }
            if position_by_id.insert(id.clone(), position).is_some() {
                return Err(StructuralError::DuplicateId { id });
            }
            ids.push(id);
        }

        let mut root: Option<usize> = None;
        let mut children_by_parent: HashMap<usize, Vec<usize>> = HashMap::new();
        for (position, record) in records.iter().enumerate() {
            let id = &ids[position];
            let Some(parent_id) = record.parent_id.as_ref().map(|value| value.canonical()) else {
                if let Some(first) = root {
                    return Err(StructuralError::MultipleRoots {
                        first: ids[first].clone(),
                        second: id.clone(),
                    });
                }
                root = Some(position);
                continue;
            };

            if &parent_id == id {
                return Err(StructuralError::SelfReference { id: id.clone() });
            }

            let parent_position = position_by_id.get(&parent_id).copied().ok_or_else(|| {
                StructuralError::UnknownParent {
                    id: id.clone(),
                    parent_id,
                }
            })?;
            children_by_parent
                .entry(parent_position)
                .or_default()
                .push(position);
        }

        let root = root.ok_or(StructuralError::MissingRoot)?;
        let mut assembler = TreeAssembler::default();
        let mut pending: Vec<(usize, Option<usize>)> = vec![(root, None)];
        while let Some((position, parent)) = pending.pop() {
            let fields = NodeFields::from_flat(&records[position], ids[position].as_str())?;
            let index = assembler.push(parent, fields)?;
            if let Some(children) = children_by_parent.get(&position) {
                pending.extend(children.iter().rev().map(|child| (*child, Some(index))));
            }
        }

        if let Some(unreachable) = ids.iter().find(|id| !assembler.contains(id)) {
            return Err(StructuralError::Cycle {
                id: unreachable.clone(),
            });
        }

        Ok(assembler.finish(ReportedNetworkSummary::default()))
    }
}

impl ReportedNetworkSummary {
    fn from_payload(payload: &HierarchyPayload) -> Result<Self, StructuralError> {
        let summary_count = |field: &'static str, value: Option<i64>| {
            value
                .map(|value| {
                    u64::try_from(value)
                        .map_err(|_| StructuralError::NegativeSummaryCount { field, value })
                })
                .transpose()
        };

        Ok(Self {
            total_people: summary_count("total_personas_red", payload.total_personas_red)?,
            total_leaders: summary_count("total_lideres_red", payload.total_lideres_red)?,
            levels: summary_count("niveles_jerarquia", payload.niveles_jerarquia)?,
        })
    }
}

struct NodeFields {
    id: NonEmptyString,
    name: String,
    role: Role,
    direct_person_count: u64,
    reported: ReportedTotals,
}

impl NodeFields {
    fn from_nested(node: &HierarchyNodePayload) -> Result<Self, StructuralError> {
        let id = node_id(node.id.canonical())?;
        let total_personas = non_negative(id.as_str(), "total_personas", node.total_personas)?;
        let total_subordinados =
            non_negative(id.as_str(), "total_subordinados", node.total_subordinados)?;

        // Without an explicit direct count, the upstream subtree total minus the
        // children's subtree totals is what this leader manages personally.
        let direct_person_count = match (node.personas_directas, node.total_personas) {
            (Some(direct), _) => count(id.as_str(), "personas_directas", direct)?,
            (None, Some(total)) => {
                let children_total = node
                    .subordinados
                    .iter()
                    .filter_map(|child| child.total_personas)
                    .fold(0_i64, i64::saturating_add);
                count(
                    id.as_str(),
                    "personas_directas",
                    total.saturating_sub(children_total),
                )?
            }
            (None, None) => 0,
        };

        Ok(Self {
            role: parse_role(id.as_str(), node.rol.as_str())?,
            id,
            name: node.nombre.trim().to_owned(),
            direct_person_count,
            reported: ReportedTotals {
                total_personas,
                total_subordinados,
            },
        })
    }

    fn from_flat(record: &FlatHierarchyRecord, id: &str) -> Result<Self, StructuralError> {
        Ok(Self {
            id: node_id(id.to_owned())?,
            role: parse_role(id, record.rol.as_str())?,
            direct_person_count: count(id, "personas_directas", record.personas_directas)?,
            name: record.nombre.trim().to_owned(),
            reported: ReportedTotals::default(),
        })
    }
}

#[derive(Default)]
struct TreeAssembler {
    nodes: Vec<HierarchyNode>,
    index_by_id: HashMap<String, usize>,
}

impl TreeAssembler {
    /// Appends a node; callers push in depth-first pre-order.
    fn push(
        &mut self,
        parent: Option<usize>,
        fields: NodeFields,
    ) -> Result<usize, StructuralError> {
        let id = fields.id.as_str().to_owned();
        if let Some(existing) = self.index_by_id.get(&id).copied() {
            return Err(self.repeated_id_error(existing, parent, id));
        }

        let index = self.nodes.len();
        let depth = match parent {
            Some(parent) => {
                let parent = &mut self.nodes[parent];
                parent.children.push(index);
                parent.depth + 1
            }
            None => 0,
        };

        self.nodes.push(HierarchyNode {
            index,
            id: fields.id,
            name: fields.name,
            role: fields.role,
            direct_person_count: fields.direct_person_count,
            parent,
            children: Vec::new(),
            depth,
            total_person_count: 0,
            total_subordinate_count: 0,
            reported: fields.reported,
        });
        self.index_by_id.insert(id, index);

        Ok(index)
    }

    fn contains(&self, id: &str) -> bool {
        self.index_by_id.contains_key(id)
    }

    fn repeated_id_error(
        &self,
        existing: usize,
        parent: Option<usize>,
        id: String,
    ) -> StructuralError {
        if parent == Some(existing) {
            return StructuralError::SelfReference { id };
        }

        let mut ancestor = parent;
        while let Some(index) = ancestor {
            if index == existing {
                return StructuralError::Cycle { id };
            }
            ancestor = self.nodes[index].parent;
        }

        StructuralError::DuplicateId { id }
    }

    fn finish(self, reported_summary: ReportedNetworkSummary) -> HierarchyTree {
        let mut tree = HierarchyTree {
            nodes: self.nodes,
            index_by_id: self.index_by_id,
            reported_summary,
        };
        tree.aggregate();
        tree
    }
}

fn node_id(id: String) -> Result<NonEmptyString, StructuralError> {
    NonEmptyString::new(id).map_err(|_| StructuralError::EmptyIdentifier)
}

fn parse_role(id: &str, value: &str) -> Result<Role, StructuralError> {
    Role::from_str(value.trim()).map_err(|_| StructuralError::UnknownRole {
        id: id.to_owned(),
        role: value.to_owned(),
    })
}

fn count(id: &str, field: &'static str, value: i64) -> Result<u64, StructuralError> {
    u64::try_from(value).map_err(|_| StructuralError::NegativeCount {
        id: id.to_owned(),
        field,
        value,
    })
}

fn non_negative(
    id: &str,
    field: &'static str,
    value: Option<i64>,
) -> Result<Option<u64>, StructuralError> {
    value.map(|value| count(id, field, value)).transpose()
}
