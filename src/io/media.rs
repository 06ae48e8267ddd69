// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Media playback transport.
//!
//! Video decoding and rendering are delegated to an external player
//! backend; this module owns the playback clock the rest of the application
//! reads and drives: position, duration, play/pause state and rate.

use std::time::Instant;

/// Control surface of the video player service.
///
/// The annotation model consumes only `position_ms`; it never mutates
/// playback state itself. Seeking is clamped to `[0, duration]` rather than
/// treated as an error.
pub trait PlayerControl {
    fn position_ms(&self) -> u64;
    fn duration_ms(&self) -> u64;
    fn is_playing(&self) -> bool;
    fn play(&mut self);
    fn pause(&mut self);
    fn seek(&mut self, position_ms: u64);
    fn set_rate(&mut self, rate: f32);
    fn rate(&self) -> f32;
}

/// Wall-clock playback transport.
///
/// Stands in for a decoder backend: position advances with real time
/// (scaled by the rate) while playing and is clamped to the duration.
#[derive(Debug)]
pub struct Transport {
    duration_ms: u64,
    /// Position at the last play/pause/seek/rate transition.
    anchor_ms: u64,
    /// Wall-clock instant of the last transition; `Some` while playing.
    started: Option<Instant>,
    rate: f32,
}

impl Transport {
    pub fn new() -> Self {
        Self {
            duration_ms: 0,
            anchor_ms: 0,
            started: None,
            rate: 1.0,
        }
    }

    /// Reset the clock for a newly selected video.
    pub fn open(&mut self, duration_ms: u64) {
        self.duration_ms = duration_ms;
        self.anchor_ms = 0;
        self.started = None;
    }

    fn clock_ms(&self) -> u64 {
        let mut position = self.anchor_ms;
        if let Some(started) = self.started {
            let elapsed = started.elapsed().as_millis() as f64 * self.rate as f64;
            position += elapsed as u64;
        }
        position.min(self.duration_ms)
    }

    /// Re-anchor the clock at the current position so a state change does
    /// not retroactively rescale elapsed time.
    fn re_anchor(&mut self) {
        self.anchor_ms = self.clock_ms();
        if self.started.is_some() {
            self.started = Some(Instant::now());
        }
    }
}

impl Default for Transport {
    fn default() -> Self {
        Self::new()
    }
}

impl PlayerControl for Transport {
    fn position_ms(&self) -> u64 {
        self.clock_ms()
    }

    fn duration_ms(&self) -> u64 {
        self.duration_ms
    }

    fn is_playing(&self) -> bool {
        self.started.is_some()
    }

    fn play(&mut self) {
        if self.started.is_none() {
            self.anchor_ms = self.clock_ms();
            self.started = Some(Instant::now());
        }
    }

    fn pause(&mut self) {
        self.anchor_ms = self.clock_ms();
        self.started = None;
    }

    fn seek(&mut self, position_ms: u64) {
        self.anchor_ms = position_ms.min(self.duration_ms);
        if self.started.is_some() {
            self.started = Some(Instant::now());
        }
    }

    fn set_rate(&mut self, rate: f32) {
        self.re_anchor();
        self.rate = rate.max(0.0);
    }

    fn rate(&self) -> f32 {
        self.rate
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_transport_is_stopped_at_zero() {
        let transport = Transport::new();
        assert_eq!(transport.position_ms(), 0);
        assert_eq!(transport.duration_ms(), 0);
        assert!(!transport.is_playing());
        assert_eq!(transport.rate(), 1.0);
    }

    #[test]
    fn test_seek_clamps_to_duration() {
        let mut transport = Transport::new();
        transport.open(10_000);
        transport.seek(25_000);
        assert_eq!(transport.position_ms(), 10_000);
        transport.seek(4_000);
        assert_eq!(transport.position_ms(), 4_000);
    }

    #[test]
    fn test_pause_freezes_position() {
        let mut transport = Transport::new();
        transport.open(60_000);
        transport.seek(1_000);
        transport.play();
        transport.pause();
        let frozen = transport.position_ms();
        std::thread::sleep(std::time::Duration::from_millis(20));
        assert_eq!(transport.position_ms(), frozen);
    }

    #[test]
    fn test_position_advances_while_playing() {
        let mut transport = Transport::new();
        transport.open(60_000);
        transport.play();
        assert!(transport.is_playing());
        std::thread::sleep(std::time::Duration::from_millis(30));
        assert!(transport.position_ms() > 0);
        assert!(transport.position_ms() <= 60_000);
    }

    #[test]
    fn test_open_resets_clock() {
        let mut transport = Transport::new();
        transport.open(60_000);
        transport.seek(30_000);
        transport.play();
        transport.open(5_000);
        assert_eq!(transport.position_ms(), 0);
        assert!(!transport.is_playing());
        assert_eq!(transport.duration_ms(), 5_000);
    }

    #[test]
    fn test_set_rate_keeps_position_and_floors_at_zero() {
        let mut transport = Transport::new();
        transport.open(60_000);
        transport.seek(10_000);
        transport.set_rate(2.0);
        assert_eq!(transport.position_ms(), 10_000);
        assert_eq!(transport.rate(), 2.0);
        transport.set_rate(-1.0);
        assert_eq!(transport.rate(), 0.0);
    }
}
