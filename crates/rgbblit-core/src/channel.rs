//! Point transport between workers and the renderer.
//!
//! Senders never wait for a matching receive: the in-memory channel is
//! unbounded and stream senders buffer into the OS pipe.

use std::io::{BufReader, BufWriter, ErrorKind, Read, Write};
use std::sync::mpsc;
use std::thread::{self, JoinHandle};

use crate::error::{BlitError, Result};
use crate::point::PixelPoint;

/// Sending half held by a worker.
pub trait PointSender: Send {
    fn send(&mut self, point: PixelPoint) -> Result<()>;

    /// Push out anything buffered. Called once after the last point.
    fn flush(&mut self) -> Result<()> {
        Ok(())
    }
}

/// Receiving half held by the renderer. Accepts points from any sender.
pub trait PointReceiver: Send {
    /// Block for the next point. `Ok(None)` once every sender has hung up.
    fn recv(&mut self) -> Result<Option<PixelPoint>>;
}

impl<S: PointSender + ?Sized> PointSender for Box<S> {
    fn send(&mut self, point: PixelPoint) -> Result<()> {
        (**self).send(point)
    }

    fn flush(&mut self) -> Result<()> {
        (**self).flush()
    }
}

impl<R: PointReceiver + ?Sized> PointReceiver for Box<R> {
    fn recv(&mut self) -> Result<Option<PixelPoint>> {
        (**self).recv()
    }
}

// =============================================================================
// In-memory channel
// =============================================================================

#[derive(Debug, Clone)]
pub struct MemorySender {
    tx: mpsc::Sender<PixelPoint>,
}

#[derive(Debug)]
pub struct MemoryReceiver {
    rx: mpsc::Receiver<PixelPoint>,
}

/// Unbounded many-to-one channel. Clone the sender once per worker.
pub fn memory_channel() -> (MemorySender, MemoryReceiver) {
    let (tx, rx) = mpsc::channel();
    (MemorySender { tx }, MemoryReceiver { rx })
}

impl PointSender for MemorySender {
    fn send(&mut self, point: PixelPoint) -> Result<()> {
        self.tx.send(point).map_err(|_| BlitError::ReceiverGone {
            x: point.x,
            y: point.y,
        })
    }
}

impl PointReceiver for MemoryReceiver {
    fn recv(&mut self) -> Result<Option<PixelPoint>> {
        Ok(self.rx.recv().ok())
    }
}

// =============================================================================
// Byte streams (pipes between processes)
// =============================================================================

/// Writes fixed-size point records to any byte sink.
pub struct StreamSender<W: Write + Send> {
    inner: BufWriter<W>,
}

impl<W: Write + Send> StreamSender<W> {
    pub fn new(writer: W) -> Self {
        Self {
            inner: BufWriter::new(writer),
        }
    }
}

impl<W: Write + Send> PointSender for StreamSender<W> {
    fn send(&mut self, point: PixelPoint) -> Result<()> {
        self.inner.write_all(&point.encode()).map_err(|e| match e.kind() {
            ErrorKind::BrokenPipe => BlitError::ReceiverGone {
                x: point.x,
                y: point.y,
            },
            _ => BlitError::Stream(e),
        })
    }

    fn flush(&mut self) -> Result<()> {
        self.inner.flush()?;
        Ok(())
    }
}

/// Reads fixed-size point records from a byte source until EOF.
pub struct StreamReceiver<R: Read + Send> {
    inner: BufReader<R>,
}

impl<R: Read + Send> StreamReceiver<R> {
    pub fn new(reader: R) -> Self {
        Self {
            inner: BufReader::new(reader),
        }
    }
}

impl<R: Read + Send> PointReceiver for StreamReceiver<R> {
    fn recv(&mut self) -> Result<Option<PixelPoint>> {
        let mut record = [0u8; PixelPoint::WIRE_SIZE];
        let mut got = 0;
        while got < record.len() {
            match self.inner.read(&mut record[got..]) {
                Ok(0) => break,
                Ok(n) => got += n,
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            }
        }
        match got {
            0 => Ok(None),
            PixelPoint::WIRE_SIZE => PixelPoint::decode(&record).map(Some),
            _ => Err(BlitError::TruncatedRecord {
                got,
                expected: PixelPoint::WIRE_SIZE,
            }),
        }
    }
}

/// Merge several record streams into one receiver.
///
/// One forwarding thread per stream; each returns how many points it relayed.
/// The merged receiver reports hang-up once every stream has hit EOF.
pub fn fan_in<R>(streams: Vec<R>) -> (MemoryReceiver, Vec<JoinHandle<Result<u64>>>)
where
    R: Read + Send + 'static,
{
    let (tx, rx) = memory_channel();
    let forwarders = streams
        .into_iter()
        .map(|stream| {
            let mut tx = tx.clone();
            thread::spawn(move || -> Result<u64> {
                let mut source = StreamReceiver::new(stream);
                let mut relayed = 0u64;
                let mut listening = true;
                while let Some(point) = source.recv()? {
                    // Once the renderer stops listening keep draining, so a
                    // writer never blocks on a full pipe.
                    if listening && tx.send(point).is_ok() {
                        relayed += 1;
                    } else {
                        listening = false;
                    }
                }
                Ok(relayed)
            })
        })
        .collect();
    (rx, forwarders)
}
