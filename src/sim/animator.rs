//! Looping frame cursor for animated sprites

/// Advances through `frame_count` frames, each lasting `duration` ticks
#[derive(Debug, Clone, PartialEq)]
pub struct Animator {
    frame_count: usize,
    duration: f64,
    frame: usize,
    elapsed: f64,
}

impl Animator {
    pub fn new(frame_count: usize, duration: f64) -> Self {
        Self {
            frame_count: frame_count.max(1),
            duration: if duration > 0.0 { duration } else { 1.0 },
            frame: 0,
            elapsed: 0.0,
        }
    }

    /// Current frame without advancing
    pub fn frame(&self) -> usize {
        self.frame
    }

    pub fn frame_count(&self) -> usize {
        self.frame_count
    }

    /// Advance one tick and return the frame to show
    pub fn next_frame(&mut self) -> usize {
        self.elapsed += 1.0;
        while self.elapsed >= self.duration {
            self.frame = (self.frame + 1) % self.frame_count;
            self.elapsed -= self.duration;
        }
        self.frame
    }
}
