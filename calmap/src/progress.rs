/////////////////////////////////////////////////////////////////////////////////////////////
//
// Defines progress reporting messages, sinks, and helper functions for table and log processing.
//
// Created on: 15 Nov 2025     Author: Daniel Owen
//
// Copyright (c) 2025, Maptek Pty Ltd. All rights reserved. Licensed under the MIT License.
//
/////////////////////////////////////////////////////////////////////////////////////////////

//! Progress reporting primitives for model building and log processing.

use std::fmt::Debug;
use std::sync::{mpsc, Arc};
use std::thread;

/// Progress events emitted while building models and processing logs.
#[derive(Debug, Clone, PartialEq)]
pub enum ProgressMsg {
    /// Event indicating that table rows with non-finite entries were dropped.
    RowsDiscarded { num_rows: usize },

    /// Event indicating that duplicate table coordinates were removed.
    DuplicatesRemoved { num_duplicates: usize },

    /// Event indicating that the triangulation of a table has been built.
    TriangulationBuilt { num_points: usize, num_triangles: usize },

    /// Event summarising how each evaluated sample was resolved.
    EvaluationSummary {
        linear: usize,
        nearest: usize,
        missing: usize,
    },

    /// Event summarising a concentration histogram.
    ConcentrationComputed {
        valid_samples: usize,
        missing_samples: usize,
        outside_samples: usize,
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
///
/// The thread exits once every clone of the returned sink has been dropped.
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

/// Emits `msg` if a sink is attached.
#[inline]
pub(crate) fn report(sink: &Option<Arc<dyn ProgressSink>>, msg: ProgressMsg) {
    if let Some(sink) = sink {
        sink.emit(msg);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[test]
    fn closure_sink_delivers_in_order() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let seen_in_handler = Arc::clone(&seen);
        let (sink, handle) = closure_sink(16, move |msg| {
            seen_in_handler.lock().unwrap().push(msg);
        });

        sink.emit(ProgressMsg::RowsDiscarded { num_rows: 2 });
        sink.emit(ProgressMsg::DuplicatesRemoved { num_duplicates: 1 });
        drop(sink);
        handle.join().unwrap();

        let seen = seen.lock().unwrap();
        assert_eq!(
            *seen,
            vec![
                ProgressMsg::RowsDiscarded { num_rows: 2 },
                ProgressMsg::DuplicatesRemoved { num_duplicates: 1 },
            ]
        );
    }

    #[test]
    fn report_without_sink_is_silent() {
        report(&None, ProgressMsg::Message { message: "ignored".into() });
    }
}
