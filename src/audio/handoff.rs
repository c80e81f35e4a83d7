//! Lock-free "latest value wins" handoff of room parameters.
//!
//! Single producer (simulation thread), single consumer (audio callback),
//! over a [`TripleBuffer`]. Neither side ever waits, and older unread
//! snapshots are simply overwritten. The consumer only swaps buffers, so
//! it never allocates or frees.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use triple_buffer::{Input, Output, TripleBuffer};

use crate::sim::Reflection;

/// One snapshot of renderer targets
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RoomParams {
    pub bands: Vec<f32>,
    pub reflections: Vec<Reflection>,
}

impl RoomParams {
    fn with_capacity(bands: usize, reflections: usize) -> Self {
        Self {
            bands: Vec::with_capacity(bands),
            reflections: Vec::with_capacity(reflections),
        }
    }

    /// Overwrite with `other`, reusing existing allocations
    fn copy_from(&mut self, other: &Self) {
        self.bands.clear();
        self.bands.extend_from_slice(&other.bands);
        self.reflections.clear();
        self.reflections.extend_from_slice(&other.reflections);
    }
}

/// Create a connected publisher/subscriber pair with preallocated buffers.
pub fn room_channel(bands: usize, max_reflections: usize) -> (RoomPublisher, RoomSubscriber) {
    let (input, output) =
        TripleBuffer::new(&RoomParams::with_capacity(bands, max_reflections)).split();
    let rejected = Arc::new(AtomicU64::new(0));

    let publisher = RoomPublisher {
        input,
        latest: RoomParams::with_capacity(bands, max_reflections),
        max_reflections,
        rejected: Arc::clone(&rejected),
    };
    let subscriber = RoomSubscriber { output, rejected };
    (publisher, subscriber)
}

/// Simulation-side half
pub struct RoomPublisher {
    input: Input<RoomParams>,
    latest: RoomParams,
    max_reflections: usize,
    /// Snapshots the consumer refused (wrong band count)
    rejected: Arc<AtomicU64>,
}

impl RoomPublisher {
    /// Merge an update into the latest snapshot and hand it to the consumer.
    ///
    /// A missing part keeps its previously published value. Reflections
    /// beyond the configured maximum are dropped.
    pub fn publish(&mut self, bands: Option<&[f32]>, reflections: Option<&[Reflection]>) {
        if let Some(bands) = bands {
            self.latest.bands.clear();
            self.latest.bands.extend_from_slice(bands);
        }
        if let Some(reflections) = reflections {
            let keep = reflections.len().min(self.max_reflections);
            self.latest.reflections.clear();
            self.latest.reflections.extend_from_slice(&reflections[..keep]);
        }

        // The back buffer holds an older snapshot; overwrite all of it
        self.input.input_buffer_mut().copy_from(&self.latest);
        self.input.publish();
    }

    /// Snapshots the consumer has discarded so far
    pub fn rejected_count(&self) -> u64 {
        self.rejected.load(Ordering::Relaxed)
    }
}

/// Audio-side half; never blocks or allocates
pub struct RoomSubscriber {
    output: Output<RoomParams>,
    rejected: Arc<AtomicU64>,
}

impl RoomSubscriber {
    /// Take the newest snapshot if one arrived since the last call.
    #[inline]
    pub fn poll(&mut self) -> Option<&RoomParams> {
        if !self.output.updated() {
            return None;
        }
        Some(self.output.read())
    }

    /// Record that a polled snapshot was unusable
    #[inline]
    pub fn note_rejected(&self) {
        self.rejected.fetch_add(1, Ordering::Relaxed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn test_nothing_before_first_publish() {
        let (_publisher, mut subscriber) = room_channel(2, 4);
        assert!(subscriber.poll().is_none());
    }

    #[test]
    fn test_latest_value_wins() {
        let (mut publisher, mut subscriber) = room_channel(2, 4);
        publisher.publish(Some(&[1.0, 1.0]), None);
        publisher.publish(Some(&[2.0, 2.0]), None);
        publisher.publish(Some(&[3.0, 3.0]), None);

        assert_eq!(subscriber.poll().unwrap().bands, vec![3.0, 3.0]);
        assert!(subscriber.poll().is_none());
    }

    #[test]
    fn test_partial_updates_merge() {
        let (mut publisher, mut subscriber) = room_channel(2, 4);
        publisher.publish(Some(&[0.5, 0.5]), Some(&[Reflection::new(0.1, 0.2)]));
        publisher.publish(None, Some(&[]));

        let params = subscriber.poll().unwrap();
        assert_eq!(params.bands, vec![0.5, 0.5]);
        assert!(params.reflections.is_empty());

        publisher.publish(Some(&[0.7, 0.7]), None);
        let params = subscriber.poll().unwrap();
        assert_eq!(params.bands, vec![0.7, 0.7]);
        assert!(params.reflections.is_empty());
    }

    #[test]
    fn test_reflections_capped() {
        let (mut publisher, mut subscriber) = room_channel(1, 2);
        publisher.publish(None, Some(&[Reflection::new(0.1, 0.1); 5]));
        assert_eq!(subscriber.poll().unwrap().reflections.len(), 2);
    }

    #[test]
    fn test_rejections_visible_to_publisher() {
        let (publisher, subscriber) = room_channel(1, 1);
        subscriber.note_rejected();
        subscriber.note_rejected();
        assert_eq!(publisher.rejected_count(), 2);
    }

    #[test]
    fn test_cross_thread_snapshots_are_whole() {
        let (mut publisher, mut subscriber) = room_channel(8, 4);

        let producer = thread::spawn(move || {
            for i in 1..=2000 {
                let value = i as f32;
                publisher.publish(Some(&[value; 8]), Some(&[Reflection::new(value, value)]));
            }
            publisher
        });

        let mut last_seen = 0.0;
        while !producer.is_finished() {
            if let Some(params) = subscriber.poll() {
                let first = params.bands[0];
                assert!(params.bands.iter().all(|&v| v == first));
                assert_eq!(params.reflections[0].gain, first);
                assert!(first >= last_seen);
                last_seen = first;
            }
        }
        producer.join().unwrap();

        if let Some(params) = subscriber.poll() {
            last_seen = params.bands[0];
        }
        assert_eq!(last_seen, 2000.0);
    }
}
