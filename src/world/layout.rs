//! Radial world layout: a hub at the origin, themed islands on a ring, and
//! the bridge graph that connects them.
//!
//! Uses petgraph for the island/bridge graph so extra links (island to
//! island) are just more edges.

use std::f32::consts::TAU;

use bevy::prelude::*;
use petgraph::graph::UnGraph;
use thiserror::Error;

use super::bridges::BridgeSpan;
use super::island::{Island, IslandKind, IslandTheme};
use super::themes;
use super::WorldConfig;

/// Why a layout could not be built.
#[derive(Debug, Error, PartialEq)]
pub enum LayoutError {
    #[error("layout has no themed islands")]
    Empty,
    #[error("islands `{a}` and `{b}` overlap: centers {distance:.1} apart, need {required:.1}")]
    Overlap {
        a: String,
        b: String,
        distance: f32,
        required: f32,
    },
}

/// Node in the bridge graph: index into [`Archipelago::islands`], or the hub.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum IslandNode {
    Hub,
    Themed(usize),
}

/// Themed islands placed around the hub, in ring order.
pub fn default_roster() -> Vec<(Box<dyn IslandTheme>, f32)> {
    vec![
        (Box::new(themes::BasketballArena), 28.0),
        (Box::new(themes::RacingTrack), 30.0),
        (Box::new(themes::BoulderingWall), 24.0),
        (Box::new(themes::AnimeShrine), 26.0),
        (Box::new(themes::Campus), 28.0),
        (Box::new(themes::TechShowcase), 27.0),
    ]
}

/// The whole set of islands plus the bridges between them.
#[derive(Resource, Debug)]
pub struct Archipelago {
    pub hub: Island,
    pub islands: Vec<Island>,
    graph: UnGraph<IslandNode, BridgeSpan>,
}

impl Archipelago {
    /// Place `roster` around the hub and connect each island to it.
    pub fn generate(config: &WorldConfig, roster: Vec<(Box<dyn IslandTheme>, f32)>) -> Result<Self, LayoutError> {
        if roster.is_empty() {
            return Err(LayoutError::Empty);
        }

        let hub = Island::new(
            IslandKind::Hub.display_name(),
            Vec2::ZERO,
            config.hub_radius,
            config.seed,
            Box::new(themes::Hub),
        );

        let count = roster.len();
        let islands: Vec<Island> = roster
            .into_iter()
            .enumerate()
            .map(|(i, (theme, radius))| {
                let angle = config.ring_phase + i as f32 / count as f32 * TAU;
                let center = Vec2::new(angle.cos(), angle.sin()) * config.ring_radius;
                let seed = config.seed.wrapping_add(1 + i as u32 * 7919);
                let name = theme.kind().display_name();
                Island::new(name, center, radius, seed, theme)
            })
            .collect();

        validate_spacing(std::iter::once(&hub).chain(&islands), config.min_island_gap)?;

        let mut graph = UnGraph::new_undirected();
        let hub_node = graph.add_node(IslandNode::Hub);
        for (i, island) in islands.iter().enumerate() {
            let node = graph.add_node(IslandNode::Themed(i));
            graph.add_edge(hub_node, node, BridgeSpan::between(&hub, island, config.bridge));
        }

        Ok(Self { hub, islands, graph })
    }

    /// Islands in the order ground queries scan them: themed first, then the hub.
    pub fn scan_order(&self) -> impl Iterator<Item = &Island> {
        self.islands.iter().chain(std::iter::once(&self.hub))
    }

    /// First island whose footprint contains the point.
    pub fn island_at(&self, x: f32, z: f32) -> Option<&Island> {
        self.scan_order().find(|island| island.contains_xz(x, z))
    }

    /// Terrain height from the first island claiming the point.
    pub fn ground_height(&self, x: f32, z: f32) -> Option<f32> {
        self.scan_order().find_map(|island| island.height_at_world(x, z))
    }

    pub fn bridges(&self) -> impl Iterator<Item = &BridgeSpan> {
        self.graph.edge_references().map(|e| e.weight())
    }

    /// Spawn point on the hub plaza.
    pub fn spawn_point(&self) -> Vec3 {
        let y = self.hub.height_at_local(Vec2::ZERO);
        self.hub.to_world(Vec2::ZERO, y)
    }
}

fn validate_spacing<'a>(islands: impl Iterator<Item = &'a Island> + Clone, gap: f32) -> Result<(), LayoutError> {
    let all: Vec<&Island> = islands.collect();
    for (i, a) in all.iter().enumerate() {
        for b in &all[i + 1..] {
            let distance = a.center.distance(b.center);
            let required = a.radius + b.radius + gap;
            if distance < required {
                return Err(LayoutError::Overlap {
                    a: a.name.clone(),
                    b: b.name.clone(),
                    distance,
                    required,
                });
            }
        }
    }
    Ok(())
}
