use std::collections::HashMap;

use prism_engine::coords::Viewport;
use prism_engine::window::FrameTicket;
use rand::SeedableRng;
use rand::rngs::StdRng;

use crate::config::AnimatorConfig;
use crate::error::Result;
use crate::host::{Host, ListenerId, Signal};
use crate::scene::AmbientScene;
use crate::surface::{Frame, FrameOutcome, RenderSurface, TemplateId};

/// The ambient geometry animator.
///
/// Owns the shape population, the camera and a render surface between
/// [`mount`](Self::mount) and [`unmount`](Self::unmount). Every entry point is
/// a no-op while unmounted, so late events and ticks after teardown are safe.
pub struct Animator<S: RenderSurface> {
    config: AnimatorConfig,
    mounted: Option<Mounted<S>>,
}

struct Mounted<S> {
    surface: S,
    scene: AmbientScene,
    frame: Frame,
    /// One entry per distinct geometry, released on teardown.
    templates: Vec<TemplateId>,
    listeners: [ListenerId; 2],
    ticket: Option<FrameTicket>,
    /// Host timestamp of the first tick.
    started_at: Option<f64>,
}

impl<S: RenderSurface> Animator<S> {
    pub fn new(config: AnimatorConfig) -> Self {
        Self { config, mounted: None }
    }

    pub fn config(&self) -> &AnimatorConfig {
        &self.config
    }

    #[inline]
    pub fn is_mounted(&self) -> bool {
        self.mounted.is_some()
    }

    pub fn scene(&self) -> Option<&AmbientScene> {
        self.mounted.as_ref().map(|m| &m.scene)
    }

    pub fn surface(&self) -> Option<&S> {
        self.mounted.as_ref().map(|m| &m.surface)
    }

    pub fn surface_mut(&mut self) -> Option<&mut S> {
        self.mounted.as_mut().map(|m| &mut m.surface)
    }

    /// Ticket of the next scheduled tick, if any.
    pub fn pending_ticket(&self) -> Option<FrameTicket> {
        self.mounted.as_ref().and_then(|m| m.ticket)
    }

    /// Mounts into `host` at `viewport`.
    ///
    /// An invalid configuration is the only error. If the host cannot provide
    /// a surface, or the surface rejects a template, the failure is logged and
    /// the animator stays unmounted.
    pub fn mount<H>(&mut self, host: &mut H, viewport: Viewport) -> Result<()>
    where
        H: Host<Surface = S>,
    {
        self.config.validate()?;
        self.unmount(host);

        let mut surface = match host.acquire_surface(viewport) {
            Ok(surface) => surface,
            Err(e) => {
                log::warn!("ambient layer disabled: {e}");
                return Ok(());
            }
        };

        let Some((templates, per_entry)) = upload_templates(&mut surface, &self.config) else {
            surface.release();
            return Ok(());
        };

        let mut rng = match self.config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let scene = AmbientScene::spawn(&self.config, viewport, &per_entry, &mut rng);

        let listeners = [
            host.subscribe(Signal::PointerMove),
            host.subscribe(Signal::Resize),
        ];
        let ticket = host.request_frame();

        log::debug!(
            "ambient layer mounted: {} shapes, {} templates, viewport {}x{}",
            scene.shapes().len(),
            templates.len(),
            viewport.width,
            viewport.height
        );

        self.mounted = Some(Mounted {
            surface,
            frame: Frame::with_capacity(scene.shapes().len()),
            scene,
            templates,
            listeners,
            ticket: Some(ticket),
            started_at: None,
        });
        Ok(())
    }

    /// Runs one frame: advances the simulation, draws, and schedules the next
    /// tick. `now` is a monotonic host timestamp in seconds.
    ///
    /// Returns `None` while unmounted.
    pub fn tick<H>(&mut self, host: &mut H, now: f64) -> Option<FrameOutcome>
    where
        H: Host<Surface = S>,
    {
        let m = self.mounted.as_mut()?;

        // The pending request is what brought us here.
        m.ticket = None;

        let started_at = *m.started_at.get_or_insert(now);
        let elapsed = (now - started_at).max(0.0) as f32;

        m.scene.step(elapsed);
        m.scene.write_frame(&mut m.frame);

        let result = m.surface.draw(&m.frame);
        if let Err(e) = &result {
            log::debug!("ambient frame skipped: {e}");
        }

        m.ticket = Some(host.request_frame());
        Some(FrameOutcome::from_draw(&result))
    }

    /// Applies a viewport resize. Degenerate sizes are ignored.
    pub fn resize(&mut self, viewport: Viewport) {
        let Some(m) = self.mounted.as_mut() else { return };
        if m.scene.resize(viewport) {
            m.surface.resize(viewport);
        }
    }

    /// Records a pointer position in logical pixels. The event is observed
    /// only; the caller keeps handling it.
    pub fn pointer_moved(&mut self, x: f32, y: f32) {
        if let Some(m) = self.mounted.as_mut() {
            m.scene.set_pointer(x, y);
        }
    }

    /// Stops ticking, unsubscribes both listeners and releases every template
    /// and the surface. Calling it again is a no-op.
    pub fn unmount<H>(&mut self, host: &mut H)
    where
        H: Host<Surface = S>,
    {
        let Some(mut m) = self.mounted.take() else { return };

        if let Some(ticket) = m.ticket.take() {
            host.cancel_frame(ticket);
        }
        for id in m.listeners {
            if !host.unsubscribe(id) {
                log::debug!("listener {id:?} was already gone");
            }
        }
        for id in m.templates.drain(..) {
            m.surface.release_template(id);
        }
        m.surface.release();

        log::debug!("ambient layer unmounted");
    }
}

/// Uploads one template per distinct geometry spec. Returns the unique
/// templates and, for every geometry table entry, the template it uses.
fn upload_templates<S: RenderSurface>(
    surface: &mut S,
    config: &AnimatorConfig,
) -> Option<(Vec<TemplateId>, Vec<TemplateId>)> {
    let mut by_key = HashMap::new();
    let mut unique = Vec::new();
    let mut per_entry = Vec::with_capacity(config.geometry.len());

    for spec in &config.geometry {
        if let Some(&id) = by_key.get(&spec.key()) {
            per_entry.push(id);
            continue;
        }
        match surface.upload_template(&spec.build()) {
            Ok(id) => {
                by_key.insert(spec.key(), id);
                unique.push(id);
                per_entry.push(id);
            }
            Err(e) => {
                log::warn!("ambient layer disabled: {:?} template rejected: {e}", spec.kind);
                for id in unique {
                    surface.release_template(id);
                }
                return None;
            }
        }
    }

    Some((unique, per_entry))
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;
    use crate::error::SurfaceError;
    use crate::geometry::{GeometryKind, GeometrySpec};
    use crate::surface::NullSurface;
    use prism_engine::window::FrameScheduler;

    #[derive(Default)]
    struct RecordingHost {
        frames: FrameScheduler<()>,
        listeners: BTreeMap<ListenerId, Signal>,
        next_listener: u64,
        requests: usize,
        cancels: usize,
        fail_surface: bool,
    }

    impl Host for RecordingHost {
        type Surface = NullSurface;

        fn acquire_surface(&mut self, viewport: Viewport) -> std::result::Result<NullSurface, SurfaceError> {
            if self.fail_surface {
                return Err(SurfaceError::Unavailable("no adapter".into()));
            }
            Ok(NullSurface::new(viewport))
        }

        fn subscribe(&mut self, signal: Signal) -> ListenerId {
            self.next_listener += 1;
            let id = ListenerId(self.next_listener);
            self.listeners.insert(id, signal);
            id
        }

        fn unsubscribe(&mut self, id: ListenerId) -> bool {
            self.listeners.remove(&id).is_some()
        }

        fn request_frame(&mut self) -> FrameTicket {
            self.requests += 1;
            self.frames.request(())
        }

        fn cancel_frame(&mut self, ticket: FrameTicket) -> bool {
            self.cancels += 1;
            self.frames.cancel(ticket)
        }
    }

    impl RecordingHost {
        /// Fires due frames the way the engine runtime does before ticking.
        fn fire(&mut self) -> usize {
            self.frames.take_due(())
        }
    }

    fn viewport() -> Viewport {
        Viewport::new(1280.0, 720.0)
    }

    fn animator() -> Animator<NullSurface> {
        Animator::new(AnimatorConfig::default().with_seed(17))
    }

    #[test]
    fn mount_registers_listeners_and_first_frame() {
        let mut host = RecordingHost::default();
        let mut anim = animator();
        anim.mount(&mut host, viewport()).unwrap();

        assert!(anim.is_mounted());
        assert_eq!(host.listeners.len(), 2);
        assert_eq!(host.frames.pending_count(), 1);
        assert_eq!(anim.scene().unwrap().shapes().len(), 12);

        // Every default table entry is distinct, so each is uploaded once.
        let surface = anim.surface().unwrap();
        assert_eq!(surface.uploads, 8);
        assert_eq!(surface.live_templates.len(), 8);
    }

    #[test]
    fn identical_geometry_entries_share_a_template() {
        let mut config = AnimatorConfig::default().with_seed(1);
        config.geometry = vec![
            GeometrySpec::new(GeometryKind::Octahedron, 1.0),
            GeometrySpec::new(GeometryKind::Octahedron, 1.0),
            GeometrySpec::new(GeometryKind::Sphere, 0.5),
        ];
        let mut host = RecordingHost::default();
        let mut anim = Animator::new(config);
        anim.mount(&mut host, viewport()).unwrap();

        assert_eq!(anim.surface().unwrap().uploads, 2);
        let shapes = anim.scene().unwrap().shapes();
        assert_eq!(shapes[0].template, shapes[1].template);
        assert_ne!(shapes[0].template, shapes[2].template);
    }

    #[test]
    fn unmount_twice_is_idempotent() {
        let mut host = RecordingHost::default();
        let mut anim = animator();
        anim.mount(&mut host, viewport()).unwrap();

        anim.unmount(&mut host);
        anim.unmount(&mut host);

        assert!(!anim.is_mounted());
        assert_eq!(host.cancels, 1);
        assert!(host.listeners.is_empty());
        assert_eq!(host.frames.pending_count(), 0);
        assert_eq!(host.fire(), 0);
    }

    #[test]
    fn ticks_after_unmount_are_ignored() {
        let mut host = RecordingHost::default();
        let mut anim = animator();
        anim.mount(&mut host, viewport()).unwrap();
        anim.unmount(&mut host);

        let requests = host.requests;
        assert_eq!(anim.tick(&mut host, 1.0), None);
        anim.resize(Viewport::new(10.0, 10.0));
        anim.pointer_moved(5.0, 5.0);
        assert_eq!(host.requests, requests);
    }

    #[test]
    fn tick_draws_and_reschedules() {
        let mut host = RecordingHost::default();
        let mut anim = animator();
        anim.mount(&mut host, viewport()).unwrap();

        for frame in 0..5 {
            assert_eq!(host.fire(), 1);
            let outcome = anim.tick(&mut host, 100.0 + frame as f64 / 60.0);
            assert_eq!(outcome, Some(FrameOutcome::Drawn));
            assert_eq!(host.frames.pending_count(), 1);
        }

        let surface = anim.surface().unwrap();
        assert_eq!(surface.frames_drawn, 5);
        assert_eq!(surface.last_frame.as_ref().unwrap().draws.len(), 12);
    }

    #[test]
    fn failed_draw_skips_but_keeps_ticking() {
        let mut host = RecordingHost::default();
        let mut anim = animator();
        anim.mount(&mut host, viewport()).unwrap();
        anim.surface_mut().unwrap().fail_draw = Some(SurfaceError::Lost);

        host.fire();
        assert_eq!(anim.tick(&mut host, 0.0), Some(FrameOutcome::Skipped));
        assert!(anim.pending_ticket().is_some());
        assert_eq!(host.frames.pending_count(), 1);
    }

    #[test]
    fn surface_failure_leaves_animator_unmounted() {
        let mut host = RecordingHost { fail_surface: true, ..RecordingHost::default() };
        let mut anim = animator();

        assert!(anim.mount(&mut host, viewport()).is_ok());
        assert!(!anim.is_mounted());
        assert!(host.listeners.is_empty());
        assert_eq!(host.requests, 0);

        anim.unmount(&mut host);
        assert_eq!(host.cancels, 0);
    }

    #[test]
    fn invalid_config_is_an_error() {
        let mut host = RecordingHost::default();
        let mut anim: Animator<NullSurface> = Animator::new(AnimatorConfig::default().with_population(3));
        assert!(anim.mount(&mut host, viewport()).is_err());
        assert!(!anim.is_mounted());
    }

    #[test]
    fn remount_does_not_duplicate_listeners() {
        let mut host = RecordingHost::default();
        let mut anim = animator();
        anim.mount(&mut host, viewport()).unwrap();
        anim.mount(&mut host, viewport()).unwrap();

        assert_eq!(host.listeners.len(), 2);
        assert_eq!(host.frames.pending_count(), 1);
        assert_eq!(host.cancels, 1);
    }

    #[test]
    fn resize_updates_surface_and_ignores_zero() {
        let mut host = RecordingHost::default();
        let mut anim = animator();
        anim.mount(&mut host, viewport()).unwrap();

        let shapes = anim.scene().unwrap().shapes().to_vec();
        anim.resize(Viewport::new(800.0, 600.0));
        assert_eq!(anim.surface().unwrap().viewport, Viewport::new(800.0, 600.0));
        assert_eq!(anim.scene().unwrap().shapes(), &shapes[..]);

        anim.resize(Viewport::new(0.0, 0.0));
        assert_eq!(anim.surface().unwrap().viewport, Viewport::new(800.0, 600.0));
    }

    #[test]
    fn pointer_is_normalized_against_viewport() {
        let mut host = RecordingHost::default();
        let mut anim = animator();
        anim.mount(&mut host, viewport()).unwrap();

        anim.pointer_moved(640.0, 360.0);
        assert_eq!(anim.scene().unwrap().pointer(), glam::Vec2::ZERO);
        anim.pointer_moved(-50.0, 5000.0);
        assert_eq!(anim.scene().unwrap().pointer(), glam::Vec2::new(-1.0, -1.0));
    }

    #[test]
    fn seeded_mounts_are_reproducible() {
        let mut host = RecordingHost::default();
        let mut a = animator();
        let mut b = animator();
        a.mount(&mut host, viewport()).unwrap();
        b.mount(&mut host, viewport()).unwrap();
        assert_eq!(a.scene().unwrap().shapes(), b.scene().unwrap().shapes());
    }
}
