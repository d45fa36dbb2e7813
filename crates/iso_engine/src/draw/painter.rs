//! # Scene Painter
//!
//! Turns the scene graph, the current lighting and the weather pool into a
//! [`DrawList`] for one frame.
//!
//! ## Paint order
//!
//! 1. Sky clear
//! 2. World layers (ground, structures, entities, effects) through the camera
//! 3. Weather particles in screen space
//! 4. Overlay widgets in screen space
//!
//! World colors are multiplied by the daylight tint scaled with ambient light,
//! so night darkens everything under the camera but not the overlay.

use std::collections::HashMap;

use crate::animation::SpritePose;
use crate::coords::{CoordinateTransform, IsoPoint};
use crate::core::config::AnimationConfig;
use crate::environment::{format_clock, DaylightSample, Particle, ParticleKind, TimeOfDay};
use crate::foundation::collections::NodeKey;
use crate::foundation::math::Vec2;
use crate::scene::{Camera, EffectKind, LayerMask, NodeKind, OverlayWidget, SceneGraph, SceneNode};

use super::color::{Color, Palette};
use super::draw_list::DrawList;
use super::sprite::{SpriteAtlas, FIGURE_HEIGHT};

const GRASS_LIGHT: u32 = 0x7C_B8_6A;
const GRASS_DARK: u32 = 0x72_AE_60;
const WINDOW_LIT: u32 = 0xFF_DF_8A;
const RAIN_COLOR: u32 = 0xB4_C8_E6;
const NIGHT_WASH: u32 = 0x0A_10_30;
const LABEL_SIZE: f32 = 11.0;
const CLOCK_SIZE: f32 = 16.0;
/// Extra screen margin before world nodes are culled
const CULL_MARGIN: f32 = 160.0;

/// Per-frame inputs that do not live in the scene graph
#[derive(Debug, Clone, Copy)]
pub struct FrameContext<'a> {
    /// Current lighting
    pub daylight: DaylightSample,
    /// Window light level in `[0, 1]`
    pub building_light: f32,
    /// Weather particles in screen pixels
    pub particles: &'a [Particle],
    /// Whether to draw names under figures and on roofs
    pub show_labels: bool,
}

/// Lighting and camera state shared by every node in one frame
struct Frame {
    camera: Camera,
    light: Color,
    building_light: f32,
    show_labels: bool,
}

impl Frame {
    fn lit(&self, color: Color, alpha: f32) -> Color {
        let shaded = color.modulate(self.light);
        shaded.with_alpha(shaded.a * alpha)
    }

    fn screen(&self, world: IsoPoint) -> Vec2 {
        self.camera.world_to_screen(world)
    }

    fn zoom(&self) -> f32 {
        self.camera.zoom()
    }

    fn is_visible(&self, screen: Vec2) -> bool {
        let viewport = self.camera.viewport();
        let margin = CULL_MARGIN * self.zoom();
        screen.x >= -margin
            && screen.y >= -margin
            && screen.x <= viewport.x + margin
            && screen.y <= viewport.y + margin
    }
}

/// Records a frame of the scene as draw commands
pub struct Painter {
    atlas: SpriteAtlas,
    transform: CoordinateTransform,
    entity_palettes: HashMap<String, Palette>,
    structure_palettes: HashMap<String, Palette>,
}

impl Painter {
    /// Create a painter, building the sprite atlas up front
    pub fn new(transform: CoordinateTransform, animation: &AnimationConfig) -> Self {
        Self {
            atlas: SpriteAtlas::build(animation),
            transform,
            entity_palettes: HashMap::new(),
            structure_palettes: HashMap::new(),
        }
    }

    /// The sprite atlas in use
    pub fn atlas(&self) -> &SpriteAtlas {
        &self.atlas
    }

    /// Paint one frame
    pub fn paint(&mut self, scene: &mut SceneGraph, context: &FrameContext<'_>) -> DrawList {
        let mut list = DrawList::new();
        let ambient = context.daylight.ambient.clamp(0.0, 1.0);
        let frame = Frame {
            camera: scene.camera().clone(),
            light: context.daylight.tint.scaled(0.4 + 0.6 * ambient),
            building_light: context.building_light.clamp(0.0, 1.0),
            show_labels: context.show_labels,
        };

        list.clear(context.daylight.sky);

        for key in scene.paint_order(LayerMask::WORLD) {
            if let Some(node) = scene.get(key) {
                self.paint_world_node(&mut list, &frame, key, node);
            }
        }

        for particle in context.particles {
            paint_particle(&mut list, particle);
        }

        for key in scene.paint_order(LayerMask::OVERLAY) {
            if let Some(node) = scene.get(key) {
                paint_overlay_node(&mut list, node, &context.daylight);
            }
        }
        list
    }

    fn paint_world_node(&mut self, list: &mut DrawList, frame: &Frame, key: NodeKey, node: &SceneNode) {
        let anchor = frame.screen(node.position());
        if !frame.is_visible(anchor) {
            return;
        }
        match node.kind() {
            NodeKind::GroundTile { column, row } => {
                self.paint_tile(list, frame, anchor, (column + row) % 2 == 0, node.alpha());
            }
            NodeKind::Structure { width, height, category, label } => {
                let palette = self
                    .structure_palettes
                    .entry(category.clone())
                    .or_insert_with(|| Palette::for_structure(category))
                    .clone();
                self.paint_structure(list, frame, node, (*width, *height), &palette, label);
            }
            NodeKind::MobileEntity { category, label, pose } => {
                let palette = self
                    .entity_palettes
                    .entry(category.clone())
                    .or_insert_with(|| Palette::for_entity(category))
                    .clone();
                self.paint_figure(list, frame, node, *pose, &palette, label);
            }
            NodeKind::Effect(EffectKind::SnapMarker) => {
                let outline = self.diamond(frame, anchor, 1.0);
                list.polygon(outline, Color::WHITE.with_alpha(0.35 * node.alpha()));
            }
            NodeKind::Overlay(_) => {
                log::trace!("Overlay node {key:?} found in a world layer");
            }
        }
    }

    fn diamond(&self, frame: &Frame, center: Vec2, scale: f32) -> Vec<Vec2> {
        let hw = self.transform.tile_width() / 2.0 * frame.zoom() * scale;
        let hh = self.transform.tile_height() / 2.0 * frame.zoom() * scale;
        vec![
            center + Vec2::new(0.0, -hh),
            center + Vec2::new(hw, 0.0),
            center + Vec2::new(0.0, hh),
            center + Vec2::new(-hw, 0.0),
        ]
    }

    fn paint_tile(&self, list: &mut DrawList, frame: &Frame, center: Vec2, light: bool, alpha: f32) {
        let base = Color::from_hex(if light { GRASS_LIGHT } else { GRASS_DARK });
        list.polygon(self.diamond(frame, center, 1.0), frame.lit(base, alpha));
    }

    fn paint_structure(
        &self,
        list: &mut DrawList,
        frame: &Frame,
        node: &SceneNode,
        footprint: (f32, f32),
        palette: &Palette,
        label: &str,
    ) {
        let (width, depth) = footprint;
        let alpha = node.alpha();
        let zoom = frame.zoom() * node.scale();
        let center = node.position().to_vec();
        let corner = |bx: f32, by: f32| {
            let offset = self.transform.backend_float_to_iso(bx, by).to_vec();
            frame.camera.world_to_screen(IsoPoint::from_vec(center + offset))
        };
        let (hw, hd) = (width / 2.0, depth / 2.0);
        let top = corner(-hw, -hd);
        let right = corner(hw, -hd);
        let bottom = corner(hw, hd);
        let left = corner(-hw, hd);

        let wall_height = self.transform.tile_height() * (1.0 + 0.25 * width.min(depth).min(6.0)) * zoom;
        let up = Vec2::new(0.0, -wall_height);

        list.polygon(vec![left, bottom, bottom + up, left + up], frame.lit(palette.wall, alpha));
        list.polygon(vec![bottom, right, right + up, bottom + up], frame.lit(palette.wall_shade, alpha));
        list.polygon(vec![top + up, right + up, bottom + up, left + up], frame.lit(palette.roof, alpha));

        // windows glow on their own and are not darkened by the night tint
        let window = palette
            .window
            .modulate(frame.light)
            .lerp(Color::from_hex(WINDOW_LIT), frame.building_light)
            .with_alpha(alpha);
        let pane = Vec2::new(4.0, 5.0) * zoom;
        for (from, to) in [(left, bottom), (bottom, right)] {
            for t in [0.3_f32, 0.7] {
                let base = from + (to - from) * t;
                let origin = base + up * 0.6 - pane / 2.0;
                list.rect(origin, pane, window);
            }
        }

        let door_base = left + (bottom - left) * 0.5;
        let door = Vec2::new(5.0, 8.0) * zoom;
        list.rect(door_base - Vec2::new(door.x / 2.0, door.y), door, frame.lit(palette.door, alpha));

        if frame.show_labels && !label.is_empty() {
            let roof_top = top + up - Vec2::new(0.0, LABEL_SIZE * zoom);
            list.text(roof_top, label, LABEL_SIZE * zoom, Color::WHITE.with_alpha(alpha));
        }
    }

    fn paint_figure(
        &self,
        list: &mut DrawList,
        frame: &Frame,
        node: &SceneNode,
        pose: SpritePose,
        palette: &Palette,
        label: &str,
    ) {
        let alpha = node.alpha();
        let unit = frame.zoom() * node.scale();
        let feet = frame.screen(node.position());

        list.ellipse(feet, Vec2::new(6.0, 2.5) * unit, Color::BLACK.with_alpha(0.25 * alpha));

        let mirrored = pose.direction.is_mirrored();
        let shows_face = pose.direction.shows_face();
        for part in self.atlas.parts(pose.state, pose.frame) {
            if part.front_only && !shows_face {
                continue;
            }
            let part = if mirrored { part.mirrored() } else { *part };
            let origin = feet + Vec2::new(part.dx, part.dy) * unit;
            let size = Vec2::new(part.w, part.h) * unit;
            list.rect(origin, size, frame.lit(palette.resolve(part.role), alpha));
        }

        if frame.show_labels && !label.is_empty() {
            let above = feet - Vec2::new(0.0, (FIGURE_HEIGHT + LABEL_SIZE) * unit);
            list.text(above, label, LABEL_SIZE * unit, Color::WHITE.with_alpha(alpha));
        }
    }
}

fn paint_particle(list: &mut DrawList, particle: &Particle) {
    match particle.kind {
        ParticleKind::Raindrop => {
            let direction = particle.velocity.try_normalize(f32::EPSILON).unwrap_or_else(|| Vec2::new(0.0, 1.0));
            let tail = particle.position - direction * particle.size;
            list.line(tail, particle.position, 1.0, Color::from_hex(RAIN_COLOR).with_alpha(particle.opacity));
        }
        ParticleKind::DriftingShape => {
            let radii = Vec2::new(particle.size / 2.0, particle.size / 5.0);
            list.ellipse(particle.position, radii, Color::WHITE.with_alpha(particle.opacity));
        }
    }
}

fn paint_overlay_node(list: &mut DrawList, node: &SceneNode, daylight: &DaylightSample) {
    match node.kind() {
        NodeKind::Overlay(OverlayWidget::NightTint) => {
            let darkness = (1.0 - daylight.ambient.clamp(0.0, 1.0)) * 0.5 * node.alpha();
            list.tint(Color::from_hex(NIGHT_WASH).with_alpha(darkness));
        }
        NodeKind::Overlay(OverlayWidget::Clock) => {
            let text = format!("{} {}", format_clock(daylight.hour), TimeOfDay::from_hour(daylight.hour));
            let position = node.position().to_vec();
            list.text(position, text, CLOCK_SIZE, Color::WHITE.with_alpha(node.alpha()));
        }
        other => log::trace!("Skipping {other:?} in the overlay layer"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::draw::DrawCommand;
    use crate::environment::DaylightCycle;

    fn context(hour: f32) -> FrameContext<'static> {
        FrameContext {
            daylight: DaylightCycle::default().get_config(hour),
            building_light: crate::environment::building_light_intensity(hour),
            particles: &[],
            show_labels: true,
        }
    }

    fn centered_scene() -> SceneGraph {
        let mut scene = SceneGraph::default();
        scene.camera_mut().focus_on(IsoPoint::new(0.0, 0.0));
        scene
    }

    #[test]
    fn test_frame_starts_with_sky() {
        let mut painter = Painter::new(CoordinateTransform::default(), &AnimationConfig::default());
        let mut scene = centered_scene();
        let list = painter.paint(&mut scene, &context(12.0));
        assert_eq!(list.commands().first(), Some(&DrawCommand::Clear(context(12.0).daylight.sky)));
    }

    #[test]
    fn test_figure_emits_parts_and_label() {
        let mut painter = Painter::new(CoordinateTransform::default(), &AnimationConfig::default());
        let mut scene = centered_scene();
        scene.add(SceneNode::new(
            NodeKind::MobileEntity {
                category: "resident".into(),
                label: "Ada".into(),
                pose: SpritePose::default(),
            },
            IsoPoint::default(),
        ));
        let list = painter.paint(&mut scene, &context(12.0));
        let rects = list.commands().iter().filter(|c| matches!(c, DrawCommand::Rect { .. })).count();
        assert_eq!(rects, painter.atlas().parts(Default::default(), 0).len());
        assert!(list
            .commands()
            .iter()
            .any(|c| matches!(c, DrawCommand::Text { text, .. } if text == "Ada")));
    }

    #[test]
    fn test_back_facing_figure_hides_eyes() {
        let mut painter = Painter::new(CoordinateTransform::default(), &AnimationConfig::default());
        let mut scene = centered_scene();
        let pose = SpritePose {
            direction: crate::animation::Direction8::North,
            ..SpritePose::default()
        };
        scene.add(SceneNode::new(
            NodeKind::MobileEntity { category: "resident".into(), label: String::new(), pose },
            IsoPoint::default(),
        ));
        let list = painter.paint(&mut scene, &context(12.0));
        let rects = list.commands().iter().filter(|c| matches!(c, DrawCommand::Rect { .. })).count();
        assert_eq!(rects, painter.atlas().parts(Default::default(), 0).len() - 2);
    }

    #[test]
    fn test_windows_lit_at_night() {
        let mut painter = Painter::new(CoordinateTransform::default(), &AnimationConfig::default());
        let mut scene = centered_scene();
        scene.add(SceneNode::new(
            NodeKind::Structure {
                width: 4.0,
                height: 4.0,
                category: "cafe".into(),
                label: String::new(),
            },
            IsoPoint::default(),
        ));
        let lit = WINDOW_LIT;
        let rect_colors = |list: &DrawList| -> Vec<u32> {
            list.commands()
                .iter()
                .filter_map(|c| match c {
                    DrawCommand::Rect { color, .. } => Some(color.to_hex()),
                    _ => None,
                })
                .collect()
        };

        let night = painter.paint(&mut scene, &context(22.0));
        assert!(rect_colors(&night).contains(&lit));

        let day = painter.paint(&mut scene, &context(12.0));
        assert!(!rect_colors(&day).contains(&lit));
    }

    #[test]
    fn test_overlay_drawn_after_particles() {
        let mut painter = Painter::new(CoordinateTransform::default(), &AnimationConfig::default());
        let mut scene = centered_scene();
        scene.add(SceneNode::new(NodeKind::Overlay(OverlayWidget::Clock), IsoPoint::new(20.0, 20.0)));
        let particles = [Particle {
            kind: ParticleKind::Raindrop,
            position: Vec2::new(10.0, 10.0),
            velocity: Vec2::new(0.0, 10.0),
            size: 12.0,
            opacity: 0.5,
        }];
        let frame = FrameContext { particles: &particles, ..context(6.5) };
        let list = painter.paint(&mut scene, &frame);
        let line = list.commands().iter().position(|c| matches!(c, DrawCommand::Line { .. }));
        let clock = list
            .commands()
            .iter()
            .position(|c| matches!(c, DrawCommand::Text { text, .. } if text == "06:30 dawn"));
        assert!(line.is_some() && clock.is_some());
        assert!(line < clock);
    }

    #[test]
    fn test_offscreen_tiles_culled() {
        let mut painter = Painter::new(CoordinateTransform::default(), &AnimationConfig::default());
        let mut scene = centered_scene();
        scene.add(SceneNode::new(NodeKind::GroundTile { column: 0, row: 0 }, IsoPoint::new(10_000.0, 0.0)));
        let list = painter.paint(&mut scene, &context(12.0));
        assert_eq!(list.len(), 1);
    }
}
