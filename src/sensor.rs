//! Sensor subscription capability
//!
//! The sampler never talks to a platform sensor API directly. A host
//! implements [`SensorService`] on top of whatever delivers accelerometer
//! events and pushes each [`Sample`] into the registered handler.
//!
//! Two implementations ship with the crate:
//! - [`ReplaySensor`]: delivers a scripted queue of samples on demand
//! - [`NoSensor`]: a device without an accelerometer

use crate::types::Sample;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::time::Duration;

/// Callback invoked once per delivered sample
pub type SampleHandler = Box<dyn FnMut(Sample)>;

/// Requested delivery rate. Only a hint; services may deliver faster or slower.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeliveryRate {
    Fastest,
    Game,
    Ui,
    Normal,
}

impl DeliveryRate {
    /// Nominal interval between samples
    pub fn nominal_period(&self) -> Duration {
        match self {
            DeliveryRate::Fastest => Duration::ZERO,
            DeliveryRate::Game => Duration::from_millis(20),
            DeliveryRate::Ui => Duration::from_millis(60),
            DeliveryRate::Normal => Duration::from_millis(200),
        }
    }
}

/// Rate used by sensor sessions
pub const DEFAULT_DELIVERY_RATE: DeliveryRate = DeliveryRate::Ui;

/// Token returned by a successful subscription
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionHandle(u64);

impl SubscriptionHandle {
    pub fn id(&self) -> u64 {
        self.0
    }
}

/// Start/stop access to a stream of accelerometer samples
pub trait SensorService {
    /// Register a handler. Returns `None` when no sensor is present, in
    /// which case the handler is dropped and nothing is ever delivered.
    fn subscribe(&mut self, rate: DeliveryRate, handler: SampleHandler) -> Option<SubscriptionHandle>;

    /// Stop delivery to a handler. Unknown handles are ignored.
    fn unsubscribe(&mut self, handle: SubscriptionHandle);
}

/// A device without an accelerometer
#[derive(Debug, Clone, Copy, Default)]
pub struct NoSensor;

impl SensorService for NoSensor {
    fn subscribe(&mut self, _rate: DeliveryRate, _handler: SampleHandler) -> Option<SubscriptionHandle> {
        None
    }

    fn unsubscribe(&mut self, _handle: SubscriptionHandle) {}
}

struct Subscriber {
    handle: SubscriptionHandle,
    rate: DeliveryRate,
    handler: SampleHandler,
}

/// Sensor that replays a queue of samples when asked to.
///
/// Samples delivered while nobody is subscribed are lost, the same way a
/// real sensor keeps producing events nobody listens to.
#[derive(Default)]
pub struct ReplaySensor {
    pending: VecDeque<Sample>,
    subscribers: Vec<Subscriber>,
    next_id: u64,
    delivered: usize,
    dropped: usize,
}

impl ReplaySensor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a sensor preloaded with samples
    pub fn with_samples<I>(samples: I) -> Self
    where
        I: IntoIterator<Item = Sample>,
    {
        let mut sensor = Self::new();
        sensor.queue_all(samples);
        sensor
    }

    pub fn queue(&mut self, sample: Sample) {
        self.pending.push_back(sample);
    }

    pub fn queue_all<I>(&mut self, samples: I)
    where
        I: IntoIterator<Item = Sample>,
    {
        self.pending.extend(samples);
    }

    /// Deliver the next queued sample to every subscriber.
    ///
    /// Returns `false` once the queue is empty.
    pub fn deliver_next(&mut self) -> bool {
        let Some(sample) = self.pending.pop_front() else {
            return false;
        };

        if self.subscribers.is_empty() {
            self.dropped += 1;
        } else {
            for subscriber in self.subscribers.iter_mut() {
                (subscriber.handler)(sample);
            }
            self.delivered += 1;
        }
        true
    }

    /// Deliver every queued sample, returning how many were consumed
    pub fn deliver_all(&mut self) -> usize {
        let mut count = 0;
        while self.deliver_next() {
            count += 1;
        }
        count
    }

    pub fn pending(&self) -> usize {
        self.pending.len()
    }

    /// Samples that reached at least one subscriber
    pub fn delivered(&self) -> usize {
        self.delivered
    }

    /// Samples consumed while nobody was subscribed
    pub fn dropped(&self) -> usize {
        self.dropped
    }

    pub fn active_subscriptions(&self) -> usize {
        self.subscribers.len()
    }

    /// Rate requested by a live subscription
    pub fn rate_of(&self, handle: SubscriptionHandle) -> Option<DeliveryRate> {
        self.subscribers
            .iter()
            .find(|s| s.handle == handle)
            .map(|s| s.rate)
    }
}

impl SensorService for ReplaySensor {
    fn subscribe(&mut self, rate: DeliveryRate, handler: SampleHandler) -> Option<SubscriptionHandle> {
        let handle = SubscriptionHandle(self.next_id);
        self.next_id += 1;
        self.subscribers.push(Subscriber {
            handle,
            rate,
            handler,
        });
        Some(handle)
    }

    fn unsubscribe(&mut self, handle: SubscriptionHandle) {
        self.subscribers.retain(|s| s.handle != handle);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn collector() -> (Rc<RefCell<Vec<Sample>>>, SampleHandler) {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        (seen, Box::new(move |s| sink.borrow_mut().push(s)))
    }

    #[test]
    fn test_no_sensor_never_subscribes() {
        let (_, handler) = collector();
        let mut sensor = NoSensor;
        assert!(sensor.subscribe(DeliveryRate::Ui, handler).is_none());
    }

    #[test]
    fn test_replay_delivers_in_order() {
        let (seen, handler) = collector();
        let mut sensor = ReplaySensor::with_samples(vec![
            Sample::new(1.0, 0.0, 0.0),
            Sample::new(2.0, 0.0, 0.0),
        ]);

        let handle = sensor.subscribe(DeliveryRate::Ui, handler).unwrap();
        assert_eq!(sensor.rate_of(handle), Some(DeliveryRate::Ui));
        assert_eq!(sensor.deliver_all(), 2);

        let seen = seen.borrow();
        assert_eq!(seen.len(), 2);
        assert_eq!(seen[0].x, 1.0);
        assert_eq!(seen[1].x, 2.0);
    }

    #[test]
    fn test_unsubscribe_stops_delivery() {
        let (seen, handler) = collector();
        let mut sensor = ReplaySensor::with_samples(vec![Sample::new(0.0, 0.0, 9.8); 3]);

        let handle = sensor.subscribe(DeliveryRate::Game, handler).unwrap();
        assert!(sensor.deliver_next());
        sensor.unsubscribe(handle);
        assert_eq!(sensor.active_subscriptions(), 0);

        assert_eq!(sensor.deliver_all(), 2);
        assert_eq!(seen.borrow().len(), 1);
        assert_eq!(sensor.delivered(), 1);
        assert_eq!(sensor.dropped(), 2);
    }

    #[test]
    fn test_handles_are_unique() {
        let (_, h1) = collector();
        let (_, h2) = collector();
        let mut sensor = ReplaySensor::new();

        let a = sensor.subscribe(DeliveryRate::Ui, h1).unwrap();
        let b = sensor.subscribe(DeliveryRate::Ui, h2).unwrap();
        assert_ne!(a, b);
        assert_eq!(sensor.active_subscriptions(), 2);

        sensor.unsubscribe(a);
        sensor.unsubscribe(a);
        assert_eq!(sensor.active_subscriptions(), 1);
    }

    #[test]
    fn test_nominal_periods() {
        assert_eq!(DeliveryRate::Fastest.nominal_period(), Duration::ZERO);
        assert!(DeliveryRate::Game.nominal_period() < DeliveryRate::Ui.nominal_period());
        assert!(DeliveryRate::Ui.nominal_period() < DeliveryRate::Normal.nominal_period());
    }
}
