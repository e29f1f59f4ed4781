//! Carving of whole chunks on worker threads.

use std::time::{Duration, Instant};
use std::sync::Arc;
use std::thread;
use std::io;

use crossbeam_channel::{bounded, Sender, Receiver, TrySendError, TryRecvError};
use tracing::trace;

use crate::carve::ChunkCarver;
use crate::chunk::Chunk;


/// A pool of worker threads sharing a chunk carver, chunks are sent to the workers and
/// returned to this pool once carved. Workers are stopped when the pool is dropped.
pub struct CarvePool {
    command_sender: Sender<CarveCommand>,
    event_receiver: Receiver<CarvedChunk>,
    /// Number of requested chunks not yet returned.
    pending: usize,
}

impl CarvePool {

    /// Create a pool with the given number of worker threads, at least one.
    pub fn new(carver: Arc<ChunkCarver>, workers_count: usize) -> io::Result<Self> {

        let workers_count = workers_count.max(1);

        let (
            command_sender,
            command_receiver,
        ) = bounded(workers_count * 100);

        let (
            event_sender,
            event_receiver,
        ) = bounded(workers_count * 100);

        for i in 0..workers_count {

            let worker = Worker {
                carver: Arc::clone(&carver),
                command_receiver: command_receiver.clone(),
                event_sender: event_sender.clone(),
            };

            thread::Builder::new()
                .name(format!("Carve Thread #{i}"))
                .spawn(move || worker.run())?;

        }

        Ok(Self {
            command_sender,
            event_receiver,
            pending: 0,
        })

    }

    /// Request a chunk to be carved, the chunk is given back if the request queue is
    /// full.
    pub fn request(&mut self, cx: i32, cz: i32, chunk: Box<Chunk>) -> Result<(), Box<Chunk>> {
        match self.command_sender.try_send(CarveCommand { cx, cz, chunk }) {
            Ok(()) => {
                self.pending += 1;
                Ok(())
            }
            Err(TrySendError::Full(command)) => Err(command.chunk),
            Err(TrySendError::Disconnected(_)) => panic!("worker thread should not disconnect"),
        }
    }

    /// Number of requested chunks that have not been returned yet.
    #[inline]
    pub fn pending(&self) -> usize {
        self.pending
    }

    /// Poll the next carved chunk, if any.
    pub fn poll(&mut self) -> Option<CarvedChunk> {
        match self.event_receiver.try_recv() {
            Ok(carved) => {
                self.pending -= 1;
                Some(carved)
            }
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => panic!("worker thread should not disconnect"),
        }
    }

    /// Block until the next carved chunk is available, none if no chunk is pending.
    pub fn wait(&mut self) -> Option<CarvedChunk> {
        if self.pending == 0 {
            return None;
        }
        match self.event_receiver.recv() {
            Ok(carved) => {
                self.pending -= 1;
                Some(carved)
            }
            Err(_) => panic!("worker thread should not disconnect"),
        }
    }

}


/// A chunk returned by the pool once carved.
pub struct CarvedChunk {
    pub cx: i32,
    pub cz: i32,
    pub chunk: Box<Chunk>,
    /// Time spent carving the chunk.
    pub duration: Duration,
}

/// Internal command sent to workers.
struct CarveCommand {
    cx: i32,
    cz: i32,
    chunk: Box<Chunk>,
}

/// Inner structure of a worker thread.
struct Worker {
    carver: Arc<ChunkCarver>,
    command_receiver: Receiver<CarveCommand>,
    event_sender: Sender<CarvedChunk>,
}

impl Worker {

    /// Run the worker until the commands channel is disconnected.
    fn run(self) {
        while let Ok(CarveCommand { cx, cz, mut chunk }) = self.command_receiver.recv() {

            let start = Instant::now();
            self.carver.carve(&mut *chunk, cx, cz);
            let duration = start.elapsed();

            trace!("chunk {cx}/{cz} carved in {duration:?}");

            // If the pool has been dropped, we should shutdown.
            if self.event_sender.send(CarvedChunk { cx, cz, chunk, duration }).is_err() {
                break;
            }

        }
    }

}
