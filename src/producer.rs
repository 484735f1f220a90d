//! Session producers
//!
//! Two independent ways of creating records that share nothing but the
//! [`SessionSink`] they write to:
//! - [`ManualEntry`]: a name and a free-text duration typed by the user
//! - [`SensorSession`]: a timed accelerometer session classified at the end

use crate::classifier::{self, DURATION_SUFFIX};
use crate::error::MotionLogError;
use crate::sampler::MotionSampler;
use crate::sensor::{
    DeliveryRate, SampleHandler, SensorService, SubscriptionHandle, DEFAULT_DELIVERY_RATE,
};
use crate::session_log::SessionSink;
use crate::types::{ActivityType, InstantReading, Sample, SessionRecord};
use chrono::{DateTime, Utc};
use std::cell::RefCell;
use std::rc::Rc;

/// A validated manual entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManualEntry {
    name: String,
    duration: String,
}

impl ManualEntry {
    /// Validate user input. Blank or whitespace-only fields are rejected;
    /// accepted text is kept as typed.
    pub fn new(name: impl Into<String>, duration: impl Into<String>) -> Result<Self, MotionLogError> {
        let name = name.into();
        let duration = duration.into();

        if name.trim().is_empty() {
            return Err(MotionLogError::BlankField("name"));
        }
        if duration.trim().is_empty() {
            return Err(MotionLogError::BlankField("duration"));
        }

        Ok(Self { name, duration })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn into_record(self) -> SessionRecord {
        self.into_record_at(Utc::now())
    }

    pub fn into_record_at(self, timestamp: DateTime<Utc>) -> SessionRecord {
        SessionRecord::new(
            self.name,
            format!("{}{}", self.duration, DURATION_SUFFIX),
            timestamp,
            ActivityType::Manual,
        )
    }

    /// Append the entry to a sink, stamped now
    pub fn submit(self, sink: &mut dyn SessionSink) {
        sink.append(self.into_record());
    }
}

/// A live accelerometer session.
///
/// Sampling is tied to visibility: call [`resume`](Self::resume) when the
/// owning screen becomes active and [`pause`](Self::pause) when it goes away.
/// Forgetting to pause keeps the sensor running.
pub struct SensorSession {
    sampler: Rc<RefCell<MotionSampler>>,
    started_at: DateTime<Utc>,
    rate: DeliveryRate,
    subscription: Option<SubscriptionHandle>,
}

impl Default for SensorSession {
    fn default() -> Self {
        Self::new()
    }
}

impl SensorSession {
    /// Start a session now with an empty buffer
    pub fn new() -> Self {
        Self::started_at(Utc::now())
    }

    /// Start a session at an explicit instant
    pub fn started_at(started_at: DateTime<Utc>) -> Self {
        tracing::debug!(%started_at, "sensor session started");
        Self {
            sampler: Rc::new(RefCell::new(MotionSampler::new())),
            started_at,
            rate: DEFAULT_DELIVERY_RATE,
            subscription: None,
        }
    }

    /// Override the requested delivery rate for future subscriptions
    pub fn with_rate(mut self, rate: DeliveryRate) -> Self {
        self.rate = rate;
        self
    }

    pub fn start_time(&self) -> DateTime<Utc> {
        self.started_at
    }

    /// Subscribe to the sensor. Returns whether sampling is active.
    ///
    /// Without sensor hardware the session stays idle and will finish as a
    /// resting record with no samples.
    pub fn resume(&mut self, service: &mut dyn SensorService) -> bool {
        if self.subscription.is_some() {
            return true;
        }

        let sampler = Rc::clone(&self.sampler);
        let handler: SampleHandler = Box::new(move |sample: Sample| {
            sampler.borrow_mut().on_sample(sample);
        });

        match service.subscribe(self.rate, handler) {
            Some(handle) => {
                tracing::debug!(handle = handle.id(), rate = ?self.rate, "subscribed to accelerometer");
                self.subscription = Some(handle);
                true
            }
            None => {
                tracing::warn!("no accelerometer available, session will not sample");
                false
            }
        }
    }

    /// Unsubscribe from the sensor. Safe to call when not subscribed.
    pub fn pause(&mut self, service: &mut dyn SensorService) {
        if let Some(handle) = self.subscription.take() {
            service.unsubscribe(handle);
            tracing::debug!(handle = handle.id(), "unsubscribed from accelerometer");
        }
    }

    pub fn is_sampling(&self) -> bool {
        self.subscription.is_some()
    }

    /// Latest live reading for feedback, if any sample has arrived
    pub fn last_reading(&self) -> Option<InstantReading> {
        self.sampler.borrow().last_reading()
    }

    pub fn sample_count(&self) -> usize {
        self.sampler.borrow().len()
    }

    /// Feed a sample directly, bypassing a sensor service.
    ///
    /// Used by hosts that already own the event loop (FFI, CLI streaming).
    pub fn push_sample(&mut self, sample: Sample) -> InstantReading {
        self.sampler.borrow_mut().on_sample(sample)
    }

    /// End the session now
    pub fn finish(self, service: &mut dyn SensorService) -> SessionRecord {
        self.finish_at(service, Utc::now())
    }

    /// End the session at an explicit instant and classify it
    pub fn finish_at(mut self, service: &mut dyn SensorService, now: DateTime<Utc>) -> SessionRecord {
        self.pause(service);
        self.into_record_at(now)
    }

    /// Classify the session without a sensor service (the caller already
    /// stopped delivery)
    pub fn into_record_at(self, now: DateTime<Utc>) -> SessionRecord {
        let elapsed_millis = (now - self.started_at).num_milliseconds();
        let buffer = self.sampler.borrow_mut().take_buffer();
        classifier::finalize_at(&buffer, elapsed_millis, now)
    }

    /// End the session with a known elapsed time instead of the wall clock.
    ///
    /// Recorded and scripted sessions carry their own length; `now` only
    /// stamps the record.
    pub fn finish_with_elapsed(
        mut self,
        service: &mut dyn SensorService,
        elapsed_millis: i64,
        now: DateTime<Utc>,
    ) -> SessionRecord {
        self.pause(service);
        let buffer = self.sampler.borrow_mut().take_buffer();
        classifier::finalize_at(&buffer, elapsed_millis, now)
    }

    /// End the session and append its record to a sink
    pub fn submit_to(self, service: &mut dyn SensorService, sink: &mut dyn SessionSink) {
        let record = self.finish(service);
        sink.append(record);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sensor::{NoSensor, ReplaySensor};
    use crate::session_log::SessionLog;
    use crate::types::IntensityTier;
    use chrono::{Duration, TimeZone};
    use pretty_assertions::assert_eq;

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 15, 14, 0, 0).unwrap()
    }

    #[test]
    fn test_manual_entry_record() {
        let entry = ManualEntry::new("Cycling", "45").unwrap();
        let record = entry.into_record_at(t0());

        assert_eq!(record.name, "Cycling");
        assert_eq!(record.duration, "45 min");
        assert_eq!(record.activity_type, ActivityType::Manual);
        assert_eq!(record.timestamp, t0());
    }

    #[test]
    fn test_manual_entry_rejects_blank_fields() {
        assert!(matches!(
            ManualEntry::new("", "30"),
            Err(MotionLogError::BlankField("name"))
        ));
        assert!(matches!(
            ManualEntry::new("Run", "   "),
            Err(MotionLogError::BlankField("duration"))
        ));
        assert!(matches!(
            ManualEntry::new(" \t", ""),
            Err(MotionLogError::BlankField("name"))
        ));
    }

    #[test]
    fn test_manual_entry_keeps_text_as_typed() {
        let record = ManualEntry::new(" Yoga ", "20").unwrap().into_record_at(t0());
        assert_eq!(record.name, " Yoga ");
    }

    #[test]
    fn test_manual_submit_prepends() {
        let mut log = SessionLog::new();
        ManualEntry::new("Walk", "10").unwrap().submit(&mut log);
        ManualEntry::new("Swim", "25").unwrap().submit(&mut log);

        let names: Vec<&str> = log.all().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["Swim", "Walk"]);
    }

    #[test]
    fn test_sensor_session_classifies_buffer() {
        // Net motion 1.0, 2.0, 3.0 -> mean 2.0
        let mut sensor = ReplaySensor::with_samples(vec![
            Sample::new(0.0, 0.0, 10.8),
            Sample::new(0.0, 0.0, 11.8),
            Sample::new(0.0, 0.0, 12.8),
        ]);

        let mut session = SensorSession::started_at(t0());
        assert!(session.resume(&mut sensor));
        sensor.deliver_all();
        assert_eq!(session.sample_count(), 3);
        assert_eq!(session.last_reading().map(|r| r.tier), Some(IntensityTier::LightMovement));

        let record = session.finish_at(&mut sensor, t0() + Duration::milliseconds(125_000));
        assert_eq!(record.name, "Live session: Moderate Activity");
        assert_eq!(record.duration, "02:05 min");
        assert_eq!(record.activity_type, ActivityType::Sensor);
        assert_eq!(sensor.active_subscriptions(), 0);
    }

    #[test]
    fn test_pause_and_resume_lifecycle() {
        let mut sensor = ReplaySensor::new();
        let mut session = SensorSession::started_at(t0());

        assert!(session.resume(&mut sensor));
        // Resuming twice does not stack subscriptions
        assert!(session.resume(&mut sensor));
        assert_eq!(sensor.active_subscriptions(), 1);

        sensor.queue(Sample::new(0.0, 0.0, 20.0));
        sensor.deliver_all();

        session.pause(&mut sensor);
        session.pause(&mut sensor);
        assert!(!session.is_sampling());
        assert_eq!(sensor.active_subscriptions(), 0);

        // Samples while paused never reach the buffer
        sensor.queue(Sample::new(0.0, 0.0, 20.0));
        sensor.deliver_all();
        assert_eq!(session.sample_count(), 1);

        session.resume(&mut sensor);
        sensor.queue(Sample::new(0.0, 0.0, 20.0));
        sensor.deliver_all();
        assert_eq!(session.sample_count(), 2);

        let record = session.finish_at(&mut sensor, t0() + Duration::seconds(59));
        assert_eq!(record.name, "Live session: Intense Activity");
        assert_eq!(record.duration, "00:59 min");
        assert_eq!(sensor.active_subscriptions(), 0);
    }

    #[test]
    fn test_missing_sensor_is_not_fatal() {
        let mut sensor = NoSensor;
        let mut session = SensorSession::started_at(t0());

        assert!(!session.resume(&mut sensor));
        assert!(!session.is_sampling());
        assert!(session.last_reading().is_none());

        let record = session.finish_at(&mut sensor, t0() + Duration::seconds(3));
        assert_eq!(record.name, "Live session: Resting");
        assert_eq!(record.duration, "00:03 min");
    }

    #[test]
    fn test_sessions_do_not_share_buffers() {
        let mut sensor = ReplaySensor::new();

        let mut first = SensorSession::started_at(t0());
        first.resume(&mut sensor);
        sensor.queue_all(vec![Sample::new(0.0, 0.0, 30.0); 4]);
        sensor.deliver_all();
        let first_record = first.finish_at(&mut sensor, t0() + Duration::seconds(10));

        let mut second = SensorSession::started_at(t0());
        second.resume(&mut sensor);
        assert_eq!(second.sample_count(), 0);
        let second_record = second.finish_at(&mut sensor, t0() + Duration::seconds(10));

        assert_eq!(first_record.name, "Live session: Intense Activity");
        assert_eq!(second_record.name, "Live session: Resting");
    }

    #[test]
    fn test_both_producers_share_one_log() {
        let mut log = SessionLog::new();
        let mut sensor = ReplaySensor::with_samples(vec![Sample::new(0.0, 0.0, 9.8); 5]);

        ManualEntry::new("Stretching", "15").unwrap().submit(&mut log);

        let mut session = SensorSession::new();
        session.resume(&mut sensor);
        sensor.deliver_all();
        session.submit_to(&mut sensor, &mut log);

        assert_eq!(log.len(), 2);
        let types: Vec<ActivityType> = log.all().map(|r| r.activity_type).collect();
        assert_eq!(types, vec![ActivityType::Sensor, ActivityType::Manual]);
        assert_eq!(log.latest().unwrap().name, "Live session: Resting");
    }

    #[test]
    fn test_finish_with_elapsed_ignores_wall_clock() {
        let mut sensor = ReplaySensor::with_samples(vec![Sample::new(0.0, 0.0, 14.8); 3]);
        let mut session = SensorSession::started_at(t0());
        assert_eq!(session.start_time(), t0());

        session.resume(&mut sensor);
        sensor.deliver_all();

        let record = session.finish_with_elapsed(&mut sensor, 125_000, t0());
        assert_eq!(record.name, "Live session: Intense Activity");
        assert_eq!(record.duration, "02:05 min");
        assert_eq!(record.timestamp, t0());
        assert_eq!(sensor.active_subscriptions(), 0);
    }

    #[test]
    fn test_finish_with_elapsed_extremes() {
        let mut sensor = NoSensor;

        let session = SensorSession::started_at(t0());
        let record = session.finish_with_elapsed(&mut sensor, i64::MIN, t0());
        assert_eq!(record.duration, "00:00 min");

        let session = SensorSession::started_at(t0());
        let record = session.finish_with_elapsed(&mut sensor, i64::MAX, t0());
        assert_eq!(record.name, "Live session: Resting");
        assert_eq!(record.timestamp, t0());
    }

    #[test]
    fn test_dropping_subscribed_session_leaves_handler_registered() {
        let mut sensor = ReplaySensor::new();
        {
            let mut session = SensorSession::started_at(t0());
            assert!(session.resume(&mut sensor));
            assert_eq!(sensor.active_subscriptions(), 1);
        }
        assert_eq!(sensor.active_subscriptions(), 1);

        // The orphaned handler still owns its buffer, so delivery is harmless
        sensor.queue(Sample::new(0.0, 0.0, 20.0));
        assert_eq!(sensor.deliver_all(), 1);
    }

    #[test]
    fn test_push_sample_without_service() {
        let mut session = SensorSession::started_at(t0());
        let reading = session.push_sample(Sample::new(0.0, 0.0, 0.0));
        assert_eq!(reading.tier, IntensityTier::NoMovement);
        assert_eq!(session.sample_count(), 1);
    }
}
