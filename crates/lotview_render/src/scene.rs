//! Retained-mode 3D scene renderer
//!
//! The tile layer is built once per layout. Vehicles live in a keyed node
//! arena that is synchronised with each frame by set difference: nodes for
//! vanished entities are removed, new entities get a node, survivors are
//! moved. Each call emits the commands describing that sync plus the HUD.
//!
//! Grid `(x, y)` maps to world `(x, 0, y)` with +Y up. A grid heading of
//! `atan2(dy, dx)` becomes a yaw of `-heading` about +Y.

use crate::adapter::{RenderSummary, RendererAdapter};
use crate::overlay::stats_lines;
use crate::palette;
use lotview_core::{CellType, Color, EntityClass, EntityId, Grid, Mat4, Vec3};
use lotview_playback::{Frame, InterpolatedPose};
use rustc_hash::FxHashMap;
use slotmap::{new_key_type, SlotMap};
use smallvec::SmallVec;

new_key_type! {
    pub struct NodeKey;
}

/// Vehicle body footprint in world units (length along +X before yaw, width along Z)
const CAR_LENGTH: f32 = 0.7;
const CAR_WIDTH: f32 = 0.45;
const TILE_THICKNESS: f32 = 0.05;

/// Camera projection type
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum CameraProjection {
    Perspective {
        fov_y: f32,
        aspect: f32,
        near: f32,
        far: f32,
    },
}

/// Camera looking down at the lot
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Camera {
    pub position: Vec3,
    pub target: Vec3,
    pub up: Vec3,
    pub projection: CameraProjection,
}

impl Camera {
    pub fn perspective(position: Vec3, target: Vec3, fov_y: f32) -> Self {
        Self {
            position,
            target,
            up: Vec3::UP,
            projection: CameraProjection::Perspective {
                fov_y,
                aspect: 16.0 / 9.0,
                near: 0.1,
                far: 1000.0,
            },
        }
    }

    /// Perspective camera framing a `width` x `height` grid from above and behind
    pub fn framing(width: u32, height: u32) -> Self {
        let cx = (width as f32 - 1.0).max(0.0) / 2.0;
        let cz = (height as f32 - 1.0).max(0.0) / 2.0;
        let span = width.max(height).max(1) as f32;
        Self::perspective(
            Vec3::new(cx, span * 1.2, cz + span * 0.9),
            Vec3::new(cx, 0.0, cz),
            std::f32::consts::FRAC_PI_4,
        )
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::framing(1, 1)
    }
}

/// Scene dimensions
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SceneConfig {
    /// Edge length of a floor tile in world units; below 1.0 leaves gaps
    pub tile_size: f32,
    /// Height of a vehicle body in world units
    pub car_height: f32,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            tile_size: 0.96,
            car_height: 0.35,
        }
    }
}

/// Static floor tile
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Tile {
    pub x: u32,
    pub y: u32,
    pub cell_type: CellType,
    pub transform: Mat4,
    pub color: Color,
}

/// Retained vehicle node
#[derive(Clone, Debug, PartialEq)]
pub struct CarNode {
    pub id: EntityId,
    pub class: EntityClass,
    /// World position of the node origin (on the floor)
    pub position: Vec3,
    /// Radians about +Y
    pub yaw: f32,
    pub color: Color,
}

impl CarNode {
    /// Model matrix: translate * rotate * scale
    pub fn transform(&self, config: &SceneConfig) -> Mat4 {
        Mat4::translation(self.position.x, self.position.y, self.position.z)
            .mul(&Mat4::rotation_y(self.yaw))
            .mul(&Mat4::scale(CAR_LENGTH, config.car_height, CAR_WIDTH))
    }
}

/// A scene-graph mutation for the host 3D engine
#[derive(Clone, Debug, PartialEq)]
pub enum Scene3DCommand {
    AddNode {
        key: NodeKey,
        id: EntityId,
        transform: Mat4,
        color: Color,
    },
    RemoveNode {
        key: NodeKey,
        id: EntityId,
    },
    SetTransform {
        key: NodeKey,
        transform: Mat4,
    },
    SetCamera {
        camera: Camera,
    },
    SetHud {
        lines: Vec<String>,
    },
}

/// Grid position to world position
pub fn grid_to_world(pose: &InterpolatedPose) -> Vec3 {
    Vec3::new(pose.x, 0.0, pose.y)
}

/// Yaw for a pose. Heading memory belongs to playback, so an unknown
/// heading always faces +X.
fn yaw_for(pose: &InterpolatedPose) -> f32 {
    pose.heading.map_or(0.0, |h| -h)
}

/// 3D renderer keeping a node per visible vehicle
#[derive(Debug)]
pub struct SceneRenderer {
    config: SceneConfig,
    camera: Camera,
    tiles: Vec<Tile>,
    nodes: SlotMap<NodeKey, CarNode>,
    index: FxHashMap<EntityId, NodeKey>,
    /// Layout changes waiting to go out with the next frame
    pending: Vec<Scene3DCommand>,
    commands: Vec<Scene3DCommand>,
}

impl SceneRenderer {
    pub fn new(config: SceneConfig) -> Self {
        Self {
            config,
            camera: Camera::default(),
            tiles: Vec::new(),
            nodes: SlotMap::with_key(),
            index: FxHashMap::default(),
            pending: Vec::new(),
            commands: Vec::new(),
        }
    }

    pub fn config(&self) -> &SceneConfig {
        &self.config
    }

    pub fn tiles(&self) -> &[Tile] {
        &self.tiles
    }

    /// Commands emitted by the most recent [`RendererAdapter::render`] call
    pub fn commands(&self) -> &[Scene3DCommand] {
        &self.commands
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn node(&self, id: &str) -> Option<&CarNode> {
        self.index.get(id).and_then(|&key| self.nodes.get(key))
    }

    /// Iterate all live nodes
    pub fn nodes(&self) -> impl Iterator<Item = (NodeKey, &CarNode)> {
        self.nodes.iter()
    }

    /// Drop every node, recording a removal for each. Returns how many went.
    fn clear_nodes(&mut self) -> usize {
        self.index.clear();
        let count = self.nodes.len();
        for (key, node) in self.nodes.drain() {
            self.pending
                .push(Scene3DCommand::RemoveNode { key, id: node.id });
        }
        count
    }

    /// Remove nodes whose entity is not in `frame`. Returns how many went.
    fn remove_stale(&mut self, frame: &Frame) -> usize {
        let stale: SmallVec<[(EntityId, NodeKey); 8]> = self
            .index
            .iter()
            .filter(|(id, _)| frame.pose(id.as_str()).is_none())
            .map(|(id, &key)| (id.clone(), key))
            .collect();

        for (id, key) in &stale {
            self.index.remove(id);
            self.nodes.remove(*key);
            self.commands.push(Scene3DCommand::RemoveNode {
                key: *key,
                id: id.clone(),
            });
        }
        stale.len()
    }

    /// Create or move a node for every entity in `frame`. Returns how many were created.
    fn upsert(&mut self, frame: &Frame) -> usize {
        let mut added = 0;

        for entity in &frame.poses {
            let position = grid_to_world(&entity.pose);

            if let Some(&key) = self.index.get(&entity.id) {
                let Some(node) = self.nodes.get_mut(key) else {
                    continue;
                };
                let before = node.transform(&self.config);
                node.position = position;
                node.class = entity.class;
                node.color = palette::entity_color(entity.class);
                node.yaw = yaw_for(&entity.pose);
                let transform = node.transform(&self.config);
                if transform != before {
                    self.commands
                        .push(Scene3DCommand::SetTransform { key, transform });
                }
            } else {
                let node = CarNode {
                    id: entity.id.clone(),
                    class: entity.class,
                    position,
                    yaw: yaw_for(&entity.pose),
                    color: palette::entity_color(entity.class),
                };
                let transform = node.transform(&self.config);
                let color = node.color;
                let key = self.nodes.insert(node);
                self.index.insert(entity.id.clone(), key);
                self.commands.push(Scene3DCommand::AddNode {
                    key,
                    id: entity.id.clone(),
                    transform,
                    color,
                });
                added += 1;
            }
        }

        added
    }
}

impl Default for SceneRenderer {
    fn default() -> Self {
        Self::new(SceneConfig::default())
    }
}

impl RendererAdapter for SceneRenderer {
    fn name(&self) -> &'static str {
        "scene3d"
    }

    fn set_layout(&mut self, grid: &Grid) {
        let size = self.config.tile_size;
        self.tiles = grid
            .cells()
            .map(|c| {
                let lift = if c.cell_type == CellType::Wall {
                    TILE_THICKNESS * 4.0
                } else {
                    TILE_THICKNESS
                };
                Tile {
                    x: c.x,
                    y: c.y,
                    cell_type: c.cell_type,
                    transform: Mat4::translation(c.x as f32, 0.0, c.y as f32)
                        .mul(&Mat4::scale(size, lift, size)),
                    color: palette::cell_color(c.cell_type),
                }
            })
            .collect();
        self.camera = Camera::framing(grid.width(), grid.height());
        let dropped = self.clear_nodes();
        self.pending.push(Scene3DCommand::SetCamera {
            camera: self.camera,
        });

        tracing::debug!(tiles = self.tiles.len(), dropped, "scene layout built");
    }

    fn render(&mut self, frame: &Frame) -> RenderSummary {
        self.commands.clear();
        self.commands.append(&mut self.pending);

        let removed = self.remove_stale(frame);
        let added = self.upsert(frame);
        self.commands.push(Scene3DCommand::SetHud {
            lines: stats_lines(frame),
        });

        tracing::trace!(
            index = frame.index,
            added,
            removed,
            nodes = self.nodes.len(),
            "scene sync"
        );

        RenderSummary {
            index: frame.index,
            entities: frame.poses.len(),
            commands: self.commands.len(),
            added,
            removed,
        }
    }
}
