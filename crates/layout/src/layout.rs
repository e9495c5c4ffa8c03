use std::collections::HashMap;

use glam::Vec3;
use neoncity_common::{CellCoord, EntityId};
use serde::{Deserialize, Serialize};

use crate::config::LayoutConfig;

/// Marks the one entity whose activation opens an interactive session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityTag {
    Ordinary,
    Special,
}

/// Theme band plus the variant picked inside it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MaterialVariant {
    pub theme: u32,
    pub variant: u32,
}

/// A placed building. Immutable once the layout is built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    pub id: EntityId,
    /// Box centre in world space.
    pub position: Vec3,
    pub cell: CellCoord,
    pub material: MaterialVariant,
    pub edge_variant: u32,
    pub tag: EntityTag,
}

impl Entity {
    pub fn is_special(&self) -> bool {
        self.tag == EntityTag::Special
    }
}

/// Derived view of one grid address.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cell {
    pub coord: CellCoord,
    /// `None` for void cells, which carry no building.
    pub theme_index: Option<u32>,
    pub is_void: bool,
    pub is_special: bool,
}

/// Reasons a serialized layout is refused.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LayoutError {
    #[error("special index {index} is out of range for {len} entities")]
    SpecialOutOfRange { index: usize, len: usize },
    #[error("entity {index} is marked special but is not tagged special")]
    SpecialNotTagged { index: usize },
    #[error("special tags do not match the special index")]
    SpecialMismatch,
    #[error("entity at {0} lies outside the grid or inside the void")]
    CellNotBuildable(CellCoord),
    #[error("two entities share cell {0}")]
    DuplicateCell(CellCoord),
}

/// Wire form of a [`Layout`]; the cell lookup is rebuilt on load.
#[derive(Deserialize)]
struct LayoutParts {
    config: LayoutConfig,
    entities: Vec<Entity>,
    special: Option<usize>,
}

impl TryFrom<LayoutParts> for Layout {
    type Error = LayoutError;

    fn try_from(parts: LayoutParts) -> Result<Self, LayoutError> {
        let LayoutParts {
            config,
            entities,
            special,
        } = parts;
        let len = entities.len();
        if let Some(index) = special {
            match entities.get(index) {
                None => return Err(LayoutError::SpecialOutOfRange { index, len }),
                Some(e) if !e.is_special() => return Err(LayoutError::SpecialNotTagged { index }),
                Some(_) => {}
            }
        }
        if entities.iter().filter(|e| e.is_special()).count() > usize::from(special.is_some()) {
            return Err(LayoutError::SpecialMismatch);
        }
        let layout = Self::from_parts(config, entities, special);
        if let Some(e) = layout
            .entities
            .iter()
            .find(|e| !layout.config.in_bounds(e.cell) || layout.config.is_void(e.cell))
        {
            return Err(LayoutError::CellNotBuildable(e.cell));
        }
        if layout.by_cell.len() != len {
            let mut seen = std::collections::HashSet::new();
            if let Some(e) = layout.entities.iter().find(|e| !seen.insert(e.cell)) {
                return Err(LayoutError::DuplicateCell(e.cell));
            }
        }
        Ok(layout)
    }
}

/// The static scene: every placed entity plus a cell lookup.
///
/// Built once by [`crate::generate`] and read-only afterwards. Deserializing
/// goes through the same checks a generated layout satisfies.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "LayoutParts")]
pub struct Layout {
    config: LayoutConfig,
    entities: Vec<Entity>,
    #[serde(skip)]
    by_cell: HashMap<CellCoord, usize>,
    special: Option<usize>,
}

impl Layout {
    pub(crate) fn from_parts(
        config: LayoutConfig,
        entities: Vec<Entity>,
        special: Option<usize>,
    ) -> Self {
        let by_cell = entities
            .iter()
            .enumerate()
            .map(|(idx, e)| (e.cell, idx))
            .collect();
        Self {
            config,
            entities,
            by_cell,
            special,
        }
    }

    pub fn config(&self) -> &LayoutConfig {
        &self.config
    }

    /// All placed entities in row-major order.
    pub fn entities(&self) -> &[Entity] {
        &self.entities
    }

    pub fn entity_count(&self) -> usize {
        self.entities.len()
    }

    pub fn get(&self, id: EntityId) -> Option<&Entity> {
        self.entities.get(id.0 as usize)
    }

    /// Entity placed at a grid address, if any.
    pub fn at(&self, cell: CellCoord) -> Option<&Entity> {
        self.by_cell.get(&cell).map(|&idx| &self.entities[idx])
    }

    /// The special entity, or `None` when the placement search came up empty.
    pub fn special(&self) -> Option<&Entity> {
        self.special.map(|idx| &self.entities[idx])
    }

    /// Describe a grid address. `None` outside the grid.
    pub fn cell(&self, coord: CellCoord) -> Option<Cell> {
        if !self.config.in_bounds(coord) {
            return None;
        }
        let entity = self.at(coord);
        Some(Cell {
            coord,
            theme_index: entity.map(|e| e.material.theme),
            is_void: self.config.is_void(coord),
            is_special: entity.is_some_and(Entity::is_special),
        })
    }

    /// Number of entities per theme band, indexed by theme.
    pub fn theme_histogram(&self) -> Vec<usize> {
        let mut counts = vec![0; self.config.theme_count as usize];
        for e in &self.entities {
            if let Some(slot) = counts.get_mut(e.material.theme as usize) {
                *slot += 1;
            }
        }
        counts
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generate;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn layout() -> Layout {
        generate(&LayoutConfig::default(), &mut ChaCha8Rng::seed_from_u64(17)).unwrap()
    }

    fn reload(value: serde_json::Value) -> Result<Layout, serde_json::Error> {
        serde_json::from_value(value)
    }

    #[test]
    fn loaded_layout_answers_cell_lookups() {
        let original = layout();
        let loaded = reload(serde_json::to_value(&original).unwrap()).unwrap();
        let origin = CellCoord::new(0, 0);
        assert_eq!(loaded.at(origin), original.at(origin));
        assert!(loaded.at(origin).is_some());
        assert_eq!(loaded.special().map(|e| e.id), original.special().map(|e| e.id));
        assert_eq!(loaded.entity_count(), original.entity_count());
    }

    #[test]
    fn out_of_range_special_is_refused() {
        let mut value = serde_json::to_value(layout()).unwrap();
        value["special"] = serde_json::json!(999_999);
        let err = reload(value).unwrap_err().to_string();
        assert!(err.contains("special index 999999"), "{err}");
    }

    #[test]
    fn special_index_must_point_at_special_entity() {
        let original = layout();
        let special = original.special().unwrap().id.0 as usize;
        let mut value = serde_json::to_value(&original).unwrap();
        value["special"] = serde_json::json!(if special == 0 { 1 } else { 0 });
        assert!(reload(value).is_err());

        let mut value = serde_json::to_value(&original).unwrap();
        value["special"] = serde_json::Value::Null;
        assert!(reload(value).is_err());
    }

    #[test]
    fn duplicate_and_void_cells_are_refused() {
        let original = layout();
        let mut value = serde_json::to_value(&original).unwrap();
        value["entities"][1]["cell"] = value["entities"][0]["cell"].clone();
        let err = reload(value).unwrap_err().to_string();
        assert!(err.contains("share cell"), "{err}");

        let mut value = serde_json::to_value(&original).unwrap();
        value["entities"][0]["cell"] = serde_json::json!({ "row": 3, "col": 7 });
        let err = reload(value).unwrap_err().to_string();
        assert!(err.contains("void"), "{err}");
    }
}
