//! Everything the host owns once it is ready

use crate::coords::{CoordinateTransform, GridPoint, IsoPoint};
use crate::core::config::EngineConfig;
use crate::draw::{DrawList, FrameContext, Painter};
use crate::entities::{
    DragCommit, EntityBrief, EntityLifecycle, FrameChange, MobileEntityManager, ReconcileReport, StructureBrief,
    StructureManager,
};
use crate::environment::{building_light_intensity, DaylightCycle, DaylightEvent, WeatherMode, WeatherSimulator};
use crate::foundation::math::Vec2;
use crate::scene::{Camera, NodeKind, OverlayWidget, SceneGraph, SceneNode};
use crate::tween::TweenEngine;

/// Screen position of the clock readout
const CLOCK_POSITION: (f32, f32) = (16.0, 16.0);

/// What a pointer landed on
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Hit {
    /// A mobile entity id
    Entity(String),
    /// A structure id
    Structure(String),
}

/// Scene, subsystems and managers for one initialized host
pub struct SceneWorld {
    transform: CoordinateTransform,
    scene: SceneGraph,
    tweens: TweenEngine,
    daylight: DaylightCycle,
    weather: WeatherSimulator,
    mobiles: MobileEntityManager,
    structures: StructureManager,
    painter: Painter,
    hit_radius: f32,
    show_labels: bool,
}

impl SceneWorld {
    /// Build the ground, the overlay widgets and every subsystem
    pub fn new(config: &EngineConfig) -> Self {
        let transform = CoordinateTransform::new(&config.projection);
        let (width, height) = (config.host.width as f32, config.host.height as f32);

        let mut camera = Camera::new(&config.camera, width, height);
        let center = transform.grid_max() / 2;
        camera.focus_on(transform.backend_to_iso(GridPoint::new(center, center)));
        let mut scene = SceneGraph::new(camera);

        let tiles = transform.tiles_per_axis();
        for row in 0..tiles {
            for column in 0..tiles {
                let kind = NodeKind::GroundTile { column, row };
                scene.add(SceneNode::new(kind, transform.tile_center(column, row)));
            }
        }
        scene.add(SceneNode::new(NodeKind::Overlay(OverlayWidget::NightTint), IsoPoint::default()));
        scene.add(SceneNode::new(
            NodeKind::Overlay(OverlayWidget::Clock),
            IsoPoint::new(CLOCK_POSITION.0, CLOCK_POSITION.1),
        ));
        log::debug!("Scene built with {} ground tiles", tiles * tiles);

        Self {
            scene,
            tweens: TweenEngine::new(),
            daylight: DaylightCycle::new(&config.daylight),
            weather: WeatherSimulator::new(&config.weather, width, height),
            mobiles: MobileEntityManager::new(transform.clone(), &config.entities, &config.animation),
            structures: StructureManager::new(transform.clone(), &config.entities, config.host.drag_enabled),
            painter: Painter::new(transform.clone(), &config.animation),
            transform,
            hit_radius: config.entities.hit_radius,
            show_labels: config.host.show_labels,
        }
    }

    /// Projection in use
    pub fn transform(&self) -> &CoordinateTransform {
        &self.transform
    }

    /// The scene graph
    pub fn scene(&self) -> &SceneGraph {
        &self.scene
    }

    /// Running tweens
    pub fn tweens(&self) -> &TweenEngine {
        &self.tweens
    }

    /// Lighting state
    pub fn daylight(&self) -> &DaylightCycle {
        &self.daylight
    }

    /// Weather state
    pub fn weather(&self) -> &WeatherSimulator {
        &self.weather
    }

    /// Mobile entities
    pub fn mobiles(&self) -> &MobileEntityManager {
        &self.mobiles
    }

    /// Structures
    pub fn structures(&self) -> &StructureManager {
        &self.structures
    }

    /// The view camera
    pub fn camera(&self) -> &Camera {
        self.scene.camera()
    }

    /// Mutable access to the view camera
    pub fn camera_mut(&mut self) -> &mut Camera {
        self.scene.camera_mut()
    }

    /// Reconcile mobile entities against the latest feed
    pub fn sync_entities(&mut self, briefs: &[EntityBrief]) -> ReconcileReport {
        self.mobiles.reconcile(briefs, &mut self.scene, &mut self.tweens)
    }

    /// Reconcile structures and refresh the locations entities walk to
    pub fn sync_structures(&mut self, briefs: &[StructureBrief]) -> ReconcileReport {
        let report = self.structures.reconcile(briefs, &mut self.scene, &mut self.tweens);
        self.mobiles.set_locations(briefs, &mut self.scene, &mut self.tweens);
        report
    }

    /// Push the external clock
    pub fn set_hour(&mut self, hour: f32) -> Vec<DaylightEvent> {
        self.daylight.set_hour(hour)
    }

    /// Switch weather; returns false when unchanged
    pub fn set_weather(&mut self, mode: WeatherMode) -> bool {
        self.weather.set_mode(mode)
    }

    /// Adapt camera and weather bounds to a new viewport
    pub fn resize(&mut self, width: u32, height: u32) {
        let (width, height) = (width as f32, height as f32);
        self.scene.camera_mut().resize(width, height);
        self.weather.resize(width, height);
    }

    /// Tweens, then entity settling and animation, then weather
    pub fn advance(&mut self, delta_seconds: f32) -> Vec<FrameChange> {
        let finished = self.tweens.update(&mut self.scene, delta_seconds);
        if !finished.is_empty() {
            log::trace!("{} tweens finished", finished.len());
        }
        let changes = self.mobiles.update(delta_seconds, &mut self.scene, &mut self.tweens);
        self.weather.update(delta_seconds);
        changes
    }

    /// Record the current frame
    pub fn paint(&mut self) -> DrawList {
        let context = FrameContext {
            daylight: self.daylight.sample(),
            building_light: self.daylight.hour().map_or(0.0, building_light_intensity),
            particles: self.weather.particles(),
            show_labels: self.show_labels,
        };
        self.painter.paint(&mut self.scene, &context)
    }

    fn to_world(&self, screen: Vec2) -> IsoPoint {
        self.scene.camera().screen_to_world(screen)
    }

    /// Picking radius in world units; constant on screen at any zoom
    fn pick_radius(&self) -> f32 {
        self.hit_radius / self.scene.camera().zoom()
    }

    /// Entity or structure under a screen point; entities win ties
    pub fn hit_test(&self, screen: Vec2) -> Option<Hit> {
        let world = self.to_world(screen);
        let radius = self.pick_radius();
        if let Some(id) = self.mobiles.hit_test(&self.scene, world, radius) {
            return Some(Hit::Entity(id.to_owned()));
        }
        self.structures
            .hit_test(&self.scene, world, radius)
            .map(|id| Hit::Structure(id.to_owned()))
    }

    /// World position of an entity or structure node
    pub fn position_of(&self, id: &str) -> Option<IsoPoint> {
        let node = self.mobiles.node_of(id).or_else(|| self.structures.node_of(id))?;
        self.scene.get(node).map(SceneNode::position)
    }

    /// Allow or forbid structure dragging
    pub fn set_drag_enabled(&mut self, enabled: bool) {
        self.structures.set_drag_enabled(enabled, &mut self.scene, &mut self.tweens);
    }

    /// Begin a drag at a screen point
    pub fn pointer_down(&mut self, screen: Vec2) -> bool {
        let world = self.to_world(screen);
        let radius = self.pick_radius();
        self.structures.pointer_down(world, radius, &mut self.scene, &mut self.tweens)
    }

    /// Continue a drag
    pub fn pointer_move(&mut self, screen: Vec2) -> bool {
        let world = self.to_world(screen);
        self.structures.pointer_move(world, &mut self.scene)
    }

    /// Finish a drag; residents of the moved structure follow it
    pub fn pointer_up(&mut self, screen: Vec2) -> Option<DragCommit> {
        let world = self.to_world(screen);
        let commit = self.structures.pointer_up(world, &mut self.scene)?;
        if let Some(name) = self.structures.get(&commit.id).map(|record| record.name().to_owned()) {
            let point = GridPoint::new(commit.x, commit.y);
            self.mobiles.move_location(&name, point, &mut self.scene, &mut self.tweens);
        }
        Some(commit)
    }

    /// Abandon a drag
    pub fn cancel_drag(&mut self) -> bool {
        self.structures.cancel_drag(&mut self.scene, &mut self.tweens)
    }

    /// Drop every entity, structure and tween
    pub fn clear(&mut self) {
        self.mobiles.clear(&mut self.scene, &mut self.tweens);
        self.structures.clear(&mut self.scene, &mut self.tweens);
        self.tweens.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::draw::DrawCommand;
    use crate::scene::Layer;

    fn world() -> SceneWorld {
        SceneWorld::new(&EngineConfig::default().with_surface_size(800, 600).with_weather_seed(3))
    }

    #[test]
    fn test_new_world_has_ground_and_overlay() {
        let world = world();
        assert_eq!(world.scene().layer_len(Layer::Ground), 50 * 50);
        assert_eq!(world.scene().layer_len(Layer::Overlay), 2);
        let center = world.transform().backend_to_iso(GridPoint::new(50, 50));
        let screen = world.camera().world_to_screen(center);
        assert!((screen - world.camera().viewport_center()).norm() < 1e-3);
    }

    #[test]
    fn test_structures_feed_locations() {
        let mut world = world();
        world.sync_structures(&[StructureBrief::new("s1", "Cafe", 10.0, 10.0)]);
        world.sync_entities(&[EntityBrief::new("a", "Ada", "Cafe")]);
        let anchor = world.transform().backend_to_iso(GridPoint::new(10, 10));
        let at = world.position_of("a").expect("entity placed");
        assert!(at.distance(anchor) <= 24.0);
    }

    #[test]
    fn test_paint_ends_with_clock() {
        let mut world = world();
        world.set_hour(6.5);
        let frame = world.paint();
        let last = frame.commands().last();
        assert!(matches!(last, Some(DrawCommand::Text { text, .. }) if text.starts_with("06:30")));
    }

    #[test]
    fn test_hit_test_prefers_entities() {
        let mut world = world();
        world.sync_structures(&[StructureBrief::new("s1", "Cafe", 10.0, 10.0)]);
        world.sync_entities(&[EntityBrief::new("a", "Ada", "Cafe")]);
        let at = world.position_of("a").expect("entity placed");
        let screen = world.camera().world_to_screen(at);
        assert_eq!(world.hit_test(screen), Some(Hit::Entity("a".into())));
    }

    #[test]
    fn test_grab_radius_tracks_zoom() {
        let mut world = world();
        world.sync_structures(&[StructureBrief::new("s1", "Kiosk", 50.0, 50.0).with_size(0.2, 0.2)]);
        let anchor = world.transform().backend_to_iso(GridPoint::new(50, 50));

        // 30 px is beyond the 20 px pick radius once zoomed in
        world.camera_mut().set_zoom(3.0);
        let screen = world.camera().world_to_screen(anchor) + Vec2::new(30.0, 0.0);
        assert!(!world.pointer_down(screen));

        // 16 px is within it when zoomed out, although that spans more world units
        world.camera_mut().set_zoom(0.5);
        let screen = world.camera().world_to_screen(anchor) + Vec2::new(16.0, 0.0);
        assert!(world.pointer_down(screen));
        assert!(world.cancel_drag());
    }
}
