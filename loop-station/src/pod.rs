//! Pod types for the hyperloop station.
//!
//! A `Pod` is a capacity-bounded passenger vehicle with a class tag and
//! onboard systems that can fail. Every probe of a failed pod answers with
//! `PodFault` instead of a value; code that scans a track is expected to
//! swallow that signal and keep scanning, while fault scans treat it as
//! the find they were looking for.

use std::fmt;

/// Signal returned when a pod's onboard systems are down.
///
/// This is transient-fault signalling, not a fatal error: track scans skip
/// the pod and continue, and a fault scan reports the pod's position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("pod is malfunctioning")]
pub struct PodFault;

/// The two service classes a pod can run.
///
/// Class determines where a pod joins a track and when it launches:
/// priority pods join at the head and launch before any standard pod.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PodClass {
    /// Joins a track at the head; launches ahead of standard pods.
    Priority,
    /// Joins a track at the tail; launches after all priority pods.
    Standard,
}

impl fmt::Display for PodClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PodClass::Priority => f.write_str("priority"),
            PodClass::Standard => f.write_str("standard"),
        }
    }
}

/// Health of a pod's onboard systems.
///
/// Health only ever degrades. A marginal pod still answers probes but has
/// a bounded number of self-tests left in it; the test that exhausts the
/// count is the one that trips the pod.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Condition {
    Operational,
    Marginal { tests_left: u32 },
    Failed,
}

/// A capacity-bounded passenger vehicle.
///
/// Class and capacity are fixed at construction; the passenger manifest
/// grows through [`board`](Pod::board). A pod's systems may fail — either
/// immediately via [`set_failed`](Pod::set_failed) or after a counted
/// number of self-tests via [`set_fault_after`](Pod::set_fault_after) —
/// after which every probe returns [`PodFault`].
///
/// # Examples
///
/// ```
/// use loop_station::pod::{Pod, PodClass};
///
/// let mut pod = Pod::new(2, PodClass::Priority);
/// pod.board("Ada").unwrap();
///
/// assert_eq!(pod.class().unwrap(), PodClass::Priority);
/// assert_eq!(pod.passenger_count().unwrap(), 1);
/// assert!(!pod.is_full().unwrap());
///
/// // A failed pod stops answering.
/// pod.set_failed();
/// assert!(pod.class().is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pod {
    class: PodClass,
    capacity: usize,
    passengers: Vec<String>,
    condition: Condition,
}

impl Pod {
    /// Creates an operational pod with an empty manifest.
    pub fn new(capacity: usize, class: PodClass) -> Self {
        Self {
            class,
            capacity,
            passengers: Vec::new(),
            condition: Condition::Operational,
        }
    }

    /// Returns the pod's class.
    ///
    /// # Errors
    ///
    /// Fails if the pod's systems are down.
    pub fn class(&self) -> Result<PodClass, PodFault> {
        self.respond()?;
        Ok(self.class)
    }

    /// Returns the pod's seat capacity.
    ///
    /// # Errors
    ///
    /// Fails if the pod's systems are down.
    pub fn capacity(&self) -> Result<usize, PodFault> {
        self.respond()?;
        Ok(self.capacity)
    }

    /// Returns the number of passengers currently aboard.
    ///
    /// # Errors
    ///
    /// Fails if the pod's systems are down.
    pub fn passenger_count(&self) -> Result<usize, PodFault> {
        self.respond()?;
        Ok(self.passengers.len())
    }

    /// Returns true if no seat remains.
    ///
    /// A zero-capacity pod is always full.
    ///
    /// # Errors
    ///
    /// Fails if the pod's systems are down.
    pub fn is_full(&self) -> Result<bool, PodFault> {
        self.respond()?;
        Ok(self.passengers.len() >= self.capacity)
    }

    /// Returns true if a passenger with this name is aboard.
    ///
    /// # Errors
    ///
    /// Fails if the pod's systems are down.
    pub fn contains_passenger(&self, name: &str) -> Result<bool, PodFault> {
        self.respond()?;
        Ok(self.passengers.iter().any(|passenger| passenger == name))
    }

    /// Seats a passenger.
    ///
    /// Does not check capacity: [`Track::board_passenger`] checks
    /// [`is_full`](Pod::is_full) before seating, and direct boarding
    /// through a reference held by the caller carries the same contract.
    ///
    /// # Errors
    ///
    /// Fails if the pod's systems are down.
    ///
    /// [`Track::board_passenger`]: crate::track::Track::board_passenger
    pub fn board(&mut self, name: &str) -> Result<(), PodFault> {
        self.respond()?;
        self.passengers.push(name.to_string());
        Ok(())
    }

    /// Runs the onboard self-test.
    ///
    /// This is the validity probe: `Ok` means the pod is fit for service.
    /// On a marginal pod the test itself consumes the countdown, so the
    /// probe that discovers the fault is also the one that trips it.
    ///
    /// # Errors
    ///
    /// Fails if the pod has failed, including when this very test
    /// exhausts a marginal pod.
    pub fn self_test(&mut self) -> Result<(), PodFault> {
        match self.condition {
            Condition::Operational => Ok(()),
            Condition::Marginal { tests_left: 0 } => {
                self.condition = Condition::Failed;
                Err(PodFault)
            }
            Condition::Marginal { tests_left } => {
                self.condition = Condition::Marginal {
                    tests_left: tests_left - 1,
                };
                Ok(())
            }
            Condition::Failed => Err(PodFault),
        }
    }

    /// Marks the pod failed immediately.
    ///
    /// Failure is permanent; every subsequent probe returns [`PodFault`].
    pub fn set_failed(&mut self) {
        self.condition = Condition::Failed;
    }

    /// Arms a latent fault: the pod passes exactly `tests` more
    /// self-tests, then fails during the next one.
    ///
    /// With `tests == 0` the very next self-test trips the pod, while
    /// ordinary probes (`class`, `is_full`, ...) keep answering until
    /// then.
    pub fn set_fault_after(&mut self, tests: u32) {
        self.condition = Condition::Marginal { tests_left: tests };
    }

    /// Err when the systems are down; ordinary probes never change the
    /// condition, only `self_test` does.
    fn respond(&self) -> Result<(), PodFault> {
        match self.condition {
            Condition::Failed => Err(PodFault),
            Condition::Operational | Condition::Marginal { .. } => Ok(()),
        }
    }
}

impl fmt::Display for Pod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tag = match self.class {
            PodClass::Priority => 'P',
            PodClass::Standard => 'S',
        };
        write!(f, "[{tag} {}/{}", self.passengers.len(), self.capacity)?;
        if self.condition == Condition::Failed {
            f.write_str(" failed")?;
        }
        f.write_str("]")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_pod_is_operational() {
        let pod = Pod::new(4, PodClass::Standard);

        assert_eq!(pod.class(), Ok(PodClass::Standard));
        assert_eq!(pod.capacity(), Ok(4));
        assert_eq!(pod.passenger_count(), Ok(0));
        assert_eq!(pod.is_full(), Ok(false));
    }

    #[test]
    fn board_and_find_passengers() {
        let mut pod = Pod::new(3, PodClass::Priority);

        pod.board("Ada").unwrap();
        pod.board("Grace").unwrap();

        assert_eq!(pod.passenger_count(), Ok(2));
        assert_eq!(pod.contains_passenger("Ada"), Ok(true));
        assert_eq!(pod.contains_passenger("Grace"), Ok(true));
        assert_eq!(pod.contains_passenger("Edsger"), Ok(false));
    }

    #[test]
    fn full_at_capacity() {
        let mut pod = Pod::new(2, PodClass::Standard);

        pod.board("Ada").unwrap();
        assert_eq!(pod.is_full(), Ok(false));

        pod.board("Grace").unwrap();
        assert_eq!(pod.is_full(), Ok(true));
    }

    #[test]
    fn zero_capacity_is_always_full() {
        let pod = Pod::new(0, PodClass::Priority);
        assert_eq!(pod.is_full(), Ok(true));
    }

    #[test]
    fn failed_pod_answers_nothing() {
        let mut pod = Pod::new(4, PodClass::Priority);
        pod.board("Ada").unwrap();
        pod.set_failed();

        assert_eq!(pod.class(), Err(PodFault));
        assert_eq!(pod.capacity(), Err(PodFault));
        assert_eq!(pod.passenger_count(), Err(PodFault));
        assert_eq!(pod.is_full(), Err(PodFault));
        assert_eq!(pod.contains_passenger("Ada"), Err(PodFault));
        assert_eq!(pod.board("Grace"), Err(PodFault));
        assert_eq!(pod.self_test(), Err(PodFault));
    }

    #[test]
    fn self_test_trips_marginal_pod() {
        let mut pod = Pod::new(4, PodClass::Standard);
        pod.set_fault_after(2);

        assert!(pod.self_test().is_ok());
        assert!(pod.self_test().is_ok());
        assert!(pod.self_test().is_err());

        // Failure is sticky.
        assert!(pod.self_test().is_err());
        assert!(pod.class().is_err());
    }

    #[test]
    fn ordinary_probes_do_not_consume_the_countdown() {
        let mut pod = Pod::new(4, PodClass::Standard);
        pod.set_fault_after(1);

        for _ in 0..10 {
            assert!(pod.class().is_ok());
            assert!(pod.is_full().is_ok());
            assert!(pod.contains_passenger("Ada").is_ok());
        }

        assert!(pod.self_test().is_ok());
        assert!(pod.self_test().is_err());
    }

    #[test]
    fn armed_pod_answers_until_tested() {
        let mut pod = Pod::new(4, PodClass::Priority);
        pod.set_fault_after(0);

        // Not yet failed: the fault only reveals itself under test.
        assert_eq!(pod.class(), Ok(PodClass::Priority));
        assert!(pod.self_test().is_err());
        assert_eq!(pod.class(), Err(PodFault));
    }

    #[test]
    fn value_equality() {
        let mut a = Pod::new(2, PodClass::Priority);
        let mut b = Pod::new(2, PodClass::Priority);
        assert_eq!(a, b);

        a.board("Ada").unwrap();
        assert_ne!(a, b);

        b.board("Ada").unwrap();
        assert_eq!(a, b);

        assert_ne!(Pod::new(2, PodClass::Priority), Pod::new(3, PodClass::Priority));
        assert_ne!(Pod::new(2, PodClass::Priority), Pod::new(2, PodClass::Standard));
    }

    #[test]
    fn display() {
        let mut pod = Pod::new(8, PodClass::Priority);
        pod.board("Ada").unwrap();
        pod.board("Grace").unwrap();
        assert_eq!(pod.to_string(), "[P 2/8]");

        pod.set_failed();
        assert_eq!(pod.to_string(), "[P 2/8 failed]");

        assert_eq!(Pod::new(4, PodClass::Standard).to_string(), "[S 0/4]");
    }

    #[test]
    fn class_display() {
        assert_eq!(PodClass::Priority.to_string(), "priority");
        assert_eq!(PodClass::Standard.to_string(), "standard");
    }

    #[test]
    fn fault_display() {
        assert_eq!(PodFault.to_string(), "pod is malfunctioning");
    }
}
