//! The per-frame update and draw step.
//!
//! A tick reads the clock, spins every animated node, lets the input
//! controller move the camera and draws the scene. The host calls
//! [`FrameLoop::tick`] once per display frame and schedules the next call as
//! long as [`TickOutcome::reschedule`] says so. Errors inside a tick are
//! logged and counted; the loop carries on with the next frame.

use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};

use anyhow::Context as _;
use cgmath::Rad;

use crate::{
    clock::Clock,
    composer::AnimatedMeshSet,
    context::SceneContext,
    controls::InputController,
    data_structures::scene_graph::Scene,
    render::Renderer,
};

/// Cancellation token for the frame loop. Clones share the flag.
#[derive(Clone, Debug)]
pub struct RunFlag(Arc<AtomicBool>);

impl RunFlag {
    /// A flag in the running state.
    pub fn new() -> Self {
        Self(Arc::new(AtomicBool::new(true)))
    }

    pub fn is_running(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }

    /// Stop the loop before its next tick. Cannot be undone.
    pub fn stop(&self) {
        self.0.store(false, Ordering::Release);
    }
}

impl Default for RunFlag {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TickOutcome {
    Rendered,
    /// Something in the tick failed. It has been logged.
    Failed,
    /// The run flag was cleared; nothing was touched.
    Stopped,
}

impl TickOutcome {
    /// Whether the host should schedule another tick.
    pub fn reschedule(&self) -> bool {
        !matches!(self, TickOutcome::Stopped)
    }
}

/// Set `rotation.x` and `rotation.z` of every animated node to `elapsed`
/// radians. `rotation.y` keeps whatever the composer gave it.
pub fn animate(scene: &mut Scene, animated: &AnimatedMeshSet, elapsed: f32) -> anyhow::Result<()> {
    for id in animated.iter() {
        let node = scene
            .node_mut(id)
            .with_context(|| format!("animated node {:?} is not in the scene", id))?;
        node.transform.rotation.x = Rad(elapsed);
        node.transform.rotation.z = Rad(elapsed);
    }
    Ok(())
}

#[derive(Debug)]
pub struct FrameLoop<C: Clock> {
    clock: C,
    run_flag: RunFlag,
    ticks: u64,
    failed_ticks: u64,
}

impl<C: Clock> FrameLoop<C> {
    pub fn new(clock: C, run_flag: RunFlag) -> Self {
        Self {
            clock,
            run_flag,
            ticks: 0,
            failed_ticks: 0,
        }
    }

    pub fn run_flag(&self) -> &RunFlag {
        &self.run_flag
    }

    /// Ticks started so far, failed ones included.
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    pub fn failed_ticks(&self) -> u64 {
        self.failed_ticks
    }

    pub fn tick(
        &mut self,
        ctx: &mut SceneContext,
        controls: &mut dyn InputController,
        renderer: &mut dyn Renderer,
    ) -> TickOutcome {
        if !self.run_flag.is_running() {
            return TickOutcome::Stopped;
        }
        self.ticks += 1;
        let elapsed = self.clock.elapsed_secs();

        match step(ctx, controls, renderer, elapsed) {
            Ok(()) => TickOutcome::Rendered,
            Err(e) => {
                self.failed_ticks += 1;
                log::error!("tick {} at {:.3}s failed: {:#}", self.ticks, elapsed, e);
                TickOutcome::Failed
            }
        }
    }
}

fn step(
    ctx: &mut SceneContext,
    controls: &mut dyn InputController,
    renderer: &mut dyn Renderer,
    elapsed: f32,
) -> anyhow::Result<()> {
    animate(&mut ctx.scene, &ctx.animated, elapsed)?;
    {
        let (transform, camera) = ctx.scene.camera_mut(ctx.camera)?;
        controls.update(transform, camera);
    }
    renderer.render(&ctx.scene, ctx.camera)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stopped_flag_is_shared_between_clones() {
        let flag = RunFlag::new();
        let clone = flag.clone();
        assert!(clone.is_running());
        flag.stop();
        assert!(!clone.is_running());
    }

    #[test]
    fn only_stopped_ticks_end_the_loop() {
        assert!(TickOutcome::Rendered.reschedule());
        assert!(TickOutcome::Failed.reschedule());
        assert!(!TickOutcome::Stopped.reschedule());
    }
}
