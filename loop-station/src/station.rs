//! The station coordinator.
//!
//! A `LoopStation` owns three tracks: two waiting tracks (one per pod
//! class) and the launched loop. Pods are created straight onto a waiting
//! track, launched in priority-then-age order, and swept off the loop once
//! they stop responding.

use tracing::debug;

use crate::pod::{Pod, PodClass};
use crate::track::Track;

/// Error returned by [`LoopStation::launch_pod`] when no pod is waiting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("no pods waiting to launch")]
pub struct NothingWaiting;

/// A station managing pods across two waiting tracks and a launched loop.
///
/// # Examples
///
/// ```
/// use loop_station::pod::PodClass;
/// use loop_station::station::LoopStation;
///
/// let mut station = LoopStation::new();
/// station.create_pod(2, PodClass::Priority).board("Ada").unwrap();
/// station.create_pod(4, PodClass::Standard);
///
/// assert_eq!(station.waiting_count(), 2);
/// assert_eq!(station.passenger_count(), 1);
///
/// station.launch_pod().unwrap();
/// assert_eq!(station.launched_count(), 1);
/// ```
#[derive(Debug, Default)]
pub struct LoopStation {
    waiting_priority: Track,
    waiting_standard: Track,
    launched: Track,
}

impl LoopStation {
    /// Creates a station with three empty tracks.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a new pod on the waiting track matching its class and hands
    /// back a reference to it in place.
    ///
    /// The pod joins at its class's insertion end (head for priority,
    /// tail for standard), so the returned reference is the track's front
    /// or back respectively. Board passengers or arm a fault through it
    /// before the pod launches.
    pub fn create_pod(&mut self, capacity: usize, class: PodClass) -> &mut Pod {
        let pod = Pod::new(capacity, class);
        match class {
            PodClass::Priority => {
                self.waiting_priority.add(pod);
                self.waiting_priority
                    .front_mut()
                    .expect("a new pod always passes the admission probe")
            }
            PodClass::Standard => {
                self.waiting_standard.add(pod);
                self.waiting_standard
                    .back_mut()
                    .expect("a new pod always passes the admission probe")
            }
        }
    }

    /// Launches the next waiting pod onto the loop.
    ///
    /// Priority pods go first, and within each class the least recently
    /// created pod goes first. A pod that failed while waiting is still
    /// taken off its waiting track, but the launched track's admission
    /// probe then drops it, so it vanishes from the station entirely;
    /// the launch still reports success.
    ///
    /// # Errors
    ///
    /// Returns [`NothingWaiting`] when both waiting tracks are empty.
    pub fn launch_pod(&mut self) -> Result<(), NothingWaiting> {
        if let Some(pod) = self.waiting_priority.pop_back() {
            let admitted = self.launched.add(pod);
            debug!(queue = "priority", admitted, "pod launched");
            return Ok(());
        }
        let pod = self.waiting_standard.pop_front().ok_or(NothingWaiting)?;
        let admitted = self.launched.add(pod);
        debug!(queue = "standard", admitted, "pod launched");
        Ok(())
    }

    /// Sweeps the launched loop, removing every pod that fails its
    /// self-test, and returns how many were removed.
    ///
    /// Each removal shifts later pods towards the head, so the sweep
    /// rescans from the head until a full pass finds no fault. The sweep's
    /// own self-tests can trip marginal pods, so a pod may fail during
    /// the very sweep that removes it.
    pub fn clear_faulty(&mut self) -> usize {
        let mut removed = 0;
        while let Some(index) = self.launched.find_first_faulty() {
            self.launched
                .remove(index)
                .expect("scan reported an in-bounds position");
            removed += 1;
        }
        if removed > 0 {
            debug!(removed, "cleared faulty pods from the loop");
        }
        removed
    }

    /// Returns the number of pods waiting across both classes.
    pub fn waiting_count(&self) -> usize {
        self.waiting_priority.len() + self.waiting_standard.len()
    }

    /// Returns the number of pods on the launched loop.
    pub fn launched_count(&self) -> usize {
        self.launched.len()
    }

    /// Returns the number of passengers seated anywhere in the station.
    ///
    /// Pods that cannot answer are counted as carrying nobody.
    pub fn passenger_count(&self) -> usize {
        track_passengers(&self.waiting_priority)
            + track_passengers(&self.waiting_standard)
            + track_passengers(&self.launched)
    }

    /// The waiting track for priority pods.
    pub fn waiting_priority(&self) -> &Track {
        &self.waiting_priority
    }

    /// The waiting track for standard pods.
    pub fn waiting_standard(&self) -> &Track {
        &self.waiting_standard
    }

    /// The launched loop.
    pub fn launched(&self) -> &Track {
        &self.launched
    }
}

fn track_passengers(track: &Track) -> usize {
    track
        .iter()
        .filter_map(|pod| pod.passenger_count().ok())
        .sum()
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    fn tags(track: &Track) -> Vec<usize> {
        track.iter().map(|pod| pod.capacity().unwrap()).collect()
    }

    proptest! {
        /// Creation fills the waiting tracks by class; a full drain then
        /// launches every pod, priority before standard and oldest first
        /// within each class, which stacks the loop as the reversed
        /// priority creation order followed by the standard creation
        /// order.
        #[test]
        fn create_then_drain_follows_class_and_age(
            classes in proptest::collection::vec(any::<bool>(), 0..12)
        ) {
            let mut station = LoopStation::new();
            let mut priority = Vec::new();
            let mut standard = Vec::new();

            for (tag, &is_priority) in classes.iter().enumerate() {
                let class = if is_priority {
                    PodClass::Priority
                } else {
                    PodClass::Standard
                };
                station.create_pod(tag, class);
                if is_priority {
                    priority.push(tag);
                } else {
                    standard.push(tag);
                }
            }

            let expected_waiting: Vec<usize> = priority.iter().rev().copied().collect();
            prop_assert_eq!(tags(station.waiting_priority()), expected_waiting);
            prop_assert_eq!(&tags(station.waiting_standard()), &standard);

            let mut launches = 0;
            while station.launch_pod().is_ok() {
                launches += 1;
            }

            prop_assert_eq!(launches, classes.len());
            prop_assert_eq!(station.waiting_count(), 0);
            prop_assert_eq!(station.launched_count(), classes.len());

            let expected_launched: Vec<usize> = priority
                .iter()
                .rev()
                .chain(standard.iter())
                .copied()
                .collect();
            prop_assert_eq!(tags(station.launched()), expected_launched);
        }
    }
}
