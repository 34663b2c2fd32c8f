use crate::raster::Rows;
use crate::render::{DrawTask, RenderEngine};

/// Draws every primitive on the calling thread before returning.
#[derive(Clone, Copy, Debug, Default)]
pub struct SyncEngine;

impl SyncEngine {
    pub fn new() -> Self {
        Self
    }
}

impl RenderEngine for SyncEngine {
    fn name(&self) -> &'static str {
        "sync"
    }

    fn submit(&mut self, task: DrawTask) {
        task.run(Rows::All);
    }

    fn join(&mut self) {}
}
