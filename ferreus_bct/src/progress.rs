/////////////////////////////////////////////////////////////////////////////////////////////
//
// Defines progress reporting messages, sinks, and helper functions for long-running processes.
//
// Created on: 15 Nov 2025     Author: Daniel Owen
//
// Copyright (c) 2025, Maptek Pty Ltd. All rights reserved. Licensed under the MIT License.
//
/////////////////////////////////////////////////////////////////////////////////////////////

//! Progress reporting primitives for tree construction and fast multiplies.

use std::fmt::Debug;
use std::sync::{Arc, mpsc};
use std::thread;

/// Progress events emitted during construction and multiplication.
#[derive(Debug, Clone)]
pub enum ProgressMsg {
    /// Event indicating that block-cluster classification finished.
    PairsClassified {
        admissible: usize,
        inadmissible: usize,
        elapsed_ms: u128,
    },

    /// Timing breakdown of one percolated fast multiply, split into the
    /// exact near-field phase and the aggregated far-field phase.
    FastMultiply {
        near_field_ms: u128,
        far_field_ms: u128,
    },

    /// Arbitrary informational message.
    Message { message: String },
}

/// Sink that consumes progress messages.
pub trait ProgressSink: Send + Sync + Debug {
    fn emit(&self, msg: ProgressMsg);
}

/// Progress sink that forwards messages over a channel.
#[derive(Debug)]
pub struct ClosureSink {
    tx: mpsc::SyncSender<ProgressMsg>,
}

impl ProgressSink for ClosureSink {
    #[inline]
    fn emit(&self, msg: ProgressMsg) {
        let _ = self.tx.try_send(msg);
    }
}

/// Spawns a listener thread that runs a handler closure for each progress message.
pub fn closure_sink<F>(
    buffer: usize,
    mut handler: F,
) -> (Arc<dyn ProgressSink>, thread::JoinHandle<()>)
where
    F: FnMut(ProgressMsg) + Send + 'static,
{
    let (tx, rx) = mpsc::sync_channel::<ProgressMsg>(buffer.max(1));
    let sink: Arc<dyn ProgressSink> = Arc::new(ClosureSink { tx });

    let handle = thread::spawn(move || {
        while let Ok(msg) = rx.recv() {
            handler(msg);
        }
    });

    (sink, handle)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn closure_sink_delivers_messages_in_order() {
        let (tx, rx) = std::sync::mpsc::channel();
        let (sink, handle) = closure_sink(16, move |msg| {
            if let ProgressMsg::Message { message } = msg {
                let _ = tx.send(message);
            }
        });

        sink.emit(ProgressMsg::Message {
            message: "first".into(),
        });
        sink.emit(ProgressMsg::Message {
            message: "second".into(),
        });
        drop(sink);

        assert_eq!(rx.recv().unwrap(), "first");
        assert_eq!(rx.recv().unwrap(), "second");
        handle.join().unwrap();
    }
}
