use glam::Vec3;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::grid::Footprint;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BuildingKind {
    House,
    MarketStall,
}

impl BuildingKind {
    /// Wall height used by the wireframe view.
    pub fn height(self) -> f32 {
        match self {
            BuildingKind::House => 3.0,
            BuildingKind::MarketStall => 3.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Building {
    pub name: String,
    pub kind: BuildingKind,
    pub position: [f32; 3],
    pub footprint: Footprint,
}

impl Building {
    pub fn position(&self) -> Vec3 {
        Vec3::from_array(self.position)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NpcSpec {
    pub name: String,
    pub position: [f32; 3],
    pub speech: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Greeting {
    pub speaker: String,
    pub text: String,
}

/// Static description of the town the session is built from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct WorldLayout {
    pub player_name: String,
    pub player_spawn: [f32; 3],
    #[serde(default)]
    pub buildings: Vec<Building>,
    #[serde(default)]
    pub npcs: Vec<NpcSpec>,
    #[serde(default)]
    pub greetings: Vec<Greeting>,
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum LayoutError {
    #[error("{field} must not be empty")]
    EmptyName { field: String },
    #[error("{field} has a non-finite coordinate")]
    NonFiniteCoordinate { field: String },
    #[error("building '{building}' footprint must have positive size, got {width}x{depth}")]
    InvalidFootprint {
        building: String,
        width: f32,
        depth: f32,
    },
}

impl Default for WorldLayout {
    fn default() -> Self {
        Self {
            player_name: "UNNAMED".to_string(),
            player_spawn: [0.0, 0.8, 0.0],
            buildings: vec![
                Building {
                    name: "house".to_string(),
                    kind: BuildingKind::House,
                    position: [-8.0, 0.0, -8.0],
                    footprint: Footprint {
                        origin_x: -10.0,
                        origin_z: -10.0,
                        width: 4.0,
                        depth: 4.0,
                    },
                },
                Building {
                    name: "market_stall".to_string(),
                    kind: BuildingKind::MarketStall,
                    position: [5.0, 0.0, -3.0],
                    footprint: Footprint {
                        origin_x: 3.0,
                        origin_z: -5.0,
                        width: 4.0,
                        depth: 4.0,
                    },
                },
            ],
            npcs: vec![
                NpcSpec {
                    name: "Shopkeeper".to_string(),
                    position: [5.0, 0.8, -1.0],
                    speech: "Selling 2 coal certs".to_string(),
                },
                NpcSpec {
                    name: "Trader".to_string(),
                    position: [-5.0, 0.8, 5.0],
                    speech: "Best prices in town!".to_string(),
                },
            ],
            greetings: vec![
                Greeting {
                    speaker: "Shopkeeper".to_string(),
                    text: "Welcome to my shop!".to_string(),
                },
                Greeting {
                    speaker: "Trader".to_string(),
                    text: "Best prices in town!".to_string(),
                },
            ],
        }
    }
}

impl WorldLayout {
    pub fn validate(&self) -> Result<(), LayoutError> {
        require_name("player_name", &self.player_name)?;
        require_finite("player_spawn", &self.player_spawn)?;

        for (index, building) in self.buildings.iter().enumerate() {
            require_name(&format!("buildings[{index}].name"), &building.name)?;
            require_finite(&format!("buildings[{index}].position"), &building.position)?;
            let footprint = building.footprint;
            require_finite(
                &format!("buildings[{index}].footprint"),
                &[
                    footprint.origin_x,
                    footprint.origin_z,
                    footprint.width,
                    footprint.depth,
                ],
            )?;
            if footprint.width <= 0.0 || footprint.depth <= 0.0 {
                return Err(LayoutError::InvalidFootprint {
                    building: building.name.clone(),
                    width: footprint.width,
                    depth: footprint.depth,
                });
            }
        }

        for (index, npc) in self.npcs.iter().enumerate() {
            require_name(&format!("npcs[{index}].name"), &npc.name)?;
            require_finite(&format!("npcs[{index}].position"), &npc.position)?;
        }

        for (index, greeting) in self.greetings.iter().enumerate() {
            require_name(&format!("greetings[{index}].speaker"), &greeting.speaker)?;
        }
        Ok(())
    }
}

fn require_name(field: &str, value: &str) -> Result<(), LayoutError> {
    if value.trim().is_empty() {
        return Err(LayoutError::EmptyName {
            field: field.to_string(),
        });
    }
    Ok(())
}

fn require_finite(field: &str, values: &[f32]) -> Result<(), LayoutError> {
    if values.iter().all(|value| value.is_finite()) {
        Ok(())
    } else {
        Err(LayoutError::NonFiniteCoordinate {
            field: field.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn built_in_town_is_valid() {
        let layout = WorldLayout::default();
        assert_eq!(layout.validate(), Ok(()));
        assert_eq!(layout.buildings.len(), 2);
        assert_eq!(layout.npcs.len(), 2);
        assert_eq!(layout.greetings[0].text, "Welcome to my shop!");
    }

    #[test]
    fn flat_footprint_is_rejected() {
        let mut layout = WorldLayout::default();
        layout.buildings[1].footprint.depth = 0.0;
        assert_eq!(
            layout.validate(),
            Err(LayoutError::InvalidFootprint {
                building: "market_stall".to_string(),
                width: 4.0,
                depth: 0.0,
            })
        );
    }

    #[test]
    fn blank_npc_name_is_reported_with_its_index() {
        let mut layout = WorldLayout::default();
        layout.npcs[1].name = "   ".to_string();
        let error = layout.validate().expect_err("blank name");
        assert_eq!(error.to_string(), "npcs[1].name must not be empty");
    }

    #[test]
    fn non_finite_spawn_is_rejected() {
        let mut layout = WorldLayout::default();
        layout.player_spawn[2] = f32::NAN;
        assert!(matches!(
            layout.validate(),
            Err(LayoutError::NonFiniteCoordinate { field }) if field == "player_spawn"
        ));
    }

    #[test]
    fn layout_parses_from_json_with_default_lists() {
        let raw = r#"{
            "player_name": "Wanderer",
            "player_spawn": [2.0, 0.8, -4.0],
            "buildings": [{
                "name": "well",
                "kind": "market_stall",
                "position": [0.0, 0.0, 0.0],
                "footprint": { "origin_x": -1.0, "origin_z": -1.0, "width": 2.0, "depth": 2.0 }
            }]
        }"#;
        let layout: WorldLayout = serde_json::from_str(raw).expect("layout");
        assert_eq!(layout.player_name, "Wanderer");
        assert_eq!(layout.buildings[0].kind, BuildingKind::MarketStall);
        assert!(layout.npcs.is_empty());
        assert!(layout.greetings.is_empty());
    }
}
