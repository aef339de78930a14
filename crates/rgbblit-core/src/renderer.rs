use log::{debug, info, warn};

use crate::canvas::Canvas;
use crate::channel::PointReceiver;
use crate::context::RunContext;
use crate::error::{BlitError, Result};
use crate::geometry::Geometry;

/// Outcome of draining the point channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RenderStats {
    pub received: u64,
    /// Points that landed on an already painted coordinate. Zero whenever
    /// the partition is sound.
    pub duplicates: u64,
}

/// Single consumer of every worker's points; sole owner of the canvas.
pub struct Renderer {
    ctx: RunContext,
    geometry: Geometry,
}

impl Renderer {
    pub fn new(ctx: RunContext, geometry: Geometry) -> Self {
        Self { ctx, geometry }
    }

    /// Points to consume before the image is complete, counted across all workers.
    pub fn expected_points(&self) -> u64 {
        self.geometry.pixel_count()
    }

    /// Open the canvas, paint every point, then hold the canvas until its
    /// close signal and release it. On any failure after open the canvas is
    /// discarded instead.
    pub fn render<C, R>(&self, canvas: &mut C, points: &mut R) -> Result<RenderStats>
    where
        C: Canvas + ?Sized,
        R: PointReceiver + ?Sized,
    {
        canvas.open(self.geometry)?;
        info!(
            "{}: canvas {}x{} open, waiting for {} points from {} workers",
            self.ctx,
            self.geometry.width,
            self.geometry.height,
            self.expected_points(),
            self.ctx.worker_count
        );

        let stats = match self.paint(canvas, points) {
            Ok(stats) => stats,
            Err(e) => {
                if let Err(discard_err) = canvas.discard() {
                    debug!("{}: discard after failure: {discard_err}", self.ctx);
                }
                return Err(e);
            }
        };
        canvas.close()?;
        Ok(stats)
    }

    /// Receive every point, flush, then wait for the close signal.
    fn paint<C, R>(&self, canvas: &mut C, points: &mut R) -> Result<RenderStats>
    where
        C: Canvas + ?Sized,
        R: PointReceiver + ?Sized,
    {
        let stats = self.receive_all(canvas, points)?;
        canvas.flush()?;
        if stats.duplicates > 0 {
            warn!(
                "{}: {} points overwrote an already painted pixel",
                self.ctx, stats.duplicates
            );
        }
        info!("{}: received all {} points", self.ctx, stats.received);

        canvas.wait_for_close()?;
        Ok(stats)
    }

    /// Paint points as they arrive, from any sender in any order, until the
    /// expected count is reached.
    pub fn receive_all<C, R>(&self, canvas: &mut C, points: &mut R) -> Result<RenderStats>
    where
        C: Canvas + ?Sized,
        R: PointReceiver + ?Sized,
    {
        let expected = self.expected_points();
        let flush_every = self.geometry.width as u64;
        let mut painted = vec![false; expected as usize];
        let mut stats = RenderStats::default();

        while stats.received < expected {
            let point = points.recv()?.ok_or(BlitError::Disconnected {
                received: stats.received,
                expected,
            })?;
            if !self.geometry.contains(point.x, point.y) {
                return Err(BlitError::PointOutOfBounds {
                    x: point.x,
                    y: point.y,
                    width: self.geometry.width,
                    height: self.geometry.height,
                });
            }

            let idx = self.geometry.index_of(point.x, point.y);
            if std::mem::replace(&mut painted[idx], true) {
                stats.duplicates += 1;
                debug!("{}: duplicate point at ({}, {})", self.ctx, point.x, point.y);
            }
            canvas.set_pixel(point.x, point.y, point.color)?;
            stats.received += 1;

            if stats.received % flush_every == 0 {
                canvas.flush()?;
            }
        }
        Ok(stats)
    }
}
