//! Motion sampling
//!
//! Converts raw accelerometer samples into net motion values (magnitude with
//! gravity removed) and buffers them for the active session. Also provides
//! the per-sample advisory tiering used for live feedback.

use crate::types::{InstantReading, IntensityTier, Sample};

/// Standard gravity subtracted from every magnitude (m/s²)
pub const GRAVITY: f64 = 9.8;

/// Below this net motion a sample reads as no movement
pub const LIGHT_MOVEMENT_THRESHOLD: f64 = 1.0;

/// At or above this net motion a sample reads as intense movement
pub const INTENSE_MOVEMENT_THRESHOLD: f64 = 5.0;

/// Net motion of a sample: Euclidean norm minus gravity
pub fn net_motion(sample: &Sample) -> f64 {
    sample.magnitude() - GRAVITY
}

/// Map a net motion value to its live feedback tier
pub fn classify_instant(value: f64) -> InstantReading {
    let tier = if value < LIGHT_MOVEMENT_THRESHOLD {
        IntensityTier::NoMovement
    } else if value < INTENSE_MOVEMENT_THRESHOLD {
        IntensityTier::LightMovement
    } else {
        IntensityTier::IntenseMovement
    };

    InstantReading { value, tier }
}

/// Session-scoped buffer of net motion values
#[derive(Debug, Clone, Default)]
pub struct MotionSampler {
    buffer: Vec<f64>,
    last_reading: Option<InstantReading>,
}

impl MotionSampler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Consume one sample, buffer its net motion and return the live reading
    pub fn on_sample(&mut self, sample: Sample) -> InstantReading {
        let value = net_motion(&sample);
        self.buffer.push(value);

        let reading = classify_instant(value);
        tracing::trace!(value, tier = ?reading.tier, buffered = self.buffer.len(), "sample");
        self.last_reading = Some(reading);
        reading
    }

    /// Most recent reading, if any sample arrived this session
    pub fn last_reading(&self) -> Option<InstantReading> {
        self.last_reading
    }

    pub fn buffer(&self) -> &[f64] {
        &self.buffer
    }

    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// Move the buffered values out, leaving the sampler empty
    pub fn take_buffer(&mut self) -> Vec<f64> {
        self.last_reading = None;
        std::mem::take(&mut self.buffer)
    }

    /// Start a new session
    pub fn reset(&mut self) {
        self.buffer.clear();
        self.last_reading = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_vector_is_negative_gravity() {
        let value = net_motion(&Sample::new(0.0, 0.0, 0.0));
        assert!((value - -9.8).abs() < 1e-12);
    }

    #[test]
    fn test_gravity_magnitude_is_zero() {
        assert!(net_motion(&Sample::new(0.0, 0.0, 9.8)).abs() < 1e-12);
        assert!(net_motion(&Sample::new(9.8, 0.0, 0.0)).abs() < 1e-12);

        // Any vector of length 9.8
        let c = 9.8 / 3.0_f64.sqrt();
        assert!(net_motion(&Sample::new(c, -c, c)).abs() < 1e-9);
    }

    #[test]
    fn test_instant_thresholds() {
        assert_eq!(classify_instant(-9.8).tier, IntensityTier::NoMovement);
        assert_eq!(classify_instant(0.99).tier, IntensityTier::NoMovement);
        assert_eq!(classify_instant(1.0).tier, IntensityTier::LightMovement);
        assert_eq!(classify_instant(4.99).tier, IntensityTier::LightMovement);
        assert_eq!(classify_instant(5.0).tier, IntensityTier::IntenseMovement);
        assert_eq!(classify_instant(42.0).tier, IntensityTier::IntenseMovement);
    }

    #[test]
    fn test_instant_reading_keeps_value() {
        let reading = classify_instant(2.5);
        assert_eq!(reading.value, 2.5);
        assert_eq!(reading.label(), "Light movement");
    }

    #[test]
    fn test_on_sample_buffers_in_order() {
        let mut sampler = MotionSampler::new();
        sampler.on_sample(Sample::new(0.0, 0.0, 9.8));
        sampler.on_sample(Sample::new(0.0, 0.0, 12.8));
        let reading = sampler.on_sample(Sample::new(0.0, 0.0, 20.0));

        assert_eq!(sampler.len(), 3);
        assert!((sampler.buffer()[0]).abs() < 1e-12);
        assert!((sampler.buffer()[1] - 3.0).abs() < 1e-9);
        assert!((sampler.buffer()[2] - 10.2).abs() < 1e-9);
        assert_eq!(reading.tier, IntensityTier::IntenseMovement);
        assert_eq!(sampler.last_reading(), Some(reading));
    }

    #[test]
    fn test_reset_clears_session() {
        let mut sampler = MotionSampler::new();
        sampler.on_sample(Sample::new(1.0, 2.0, 3.0));
        sampler.reset();

        assert!(sampler.is_empty());
        assert!(sampler.last_reading().is_none());
    }

    #[test]
    fn test_take_buffer_empties_sampler() {
        let mut sampler = MotionSampler::new();
        sampler.on_sample(Sample::new(0.0, 0.0, 9.8));
        sampler.on_sample(Sample::new(0.0, 0.0, 9.8));

        let taken = sampler.take_buffer();
        assert_eq!(taken.len(), 2);
        assert!(sampler.is_empty());
    }
}
