//! Clip playback into the renderer, with a lock-free transport.

use std::sync::atomic::{AtomicBool, AtomicU8, AtomicUsize, Ordering};
use std::sync::Arc;

/// Transport state as seen by both threads
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackState {
    Stopped,
    Playing,
    Paused,
}

impl PlaybackState {
    fn from_u8(value: u8) -> Self {
        match value {
            1 => Self::Playing,
            2 => Self::Paused,
            _ => Self::Stopped,
        }
    }

    fn as_u8(self) -> u8 {
        match self {
            Self::Stopped => 0,
            Self::Playing => 1,
            Self::Paused => 2,
        }
    }
}

/// Shared play/pause/stop control and playback position
#[derive(Debug)]
pub struct Transport {
    state: AtomicU8,
    rewind: AtomicBool,
    position: AtomicUsize,
    sample_rate_hz: u32,
}

impl Transport {
    pub fn new(sample_rate_hz: u32) -> Self {
        Self {
            state: AtomicU8::new(PlaybackState::Stopped.as_u8()),
            rewind: AtomicBool::new(false),
            position: AtomicUsize::new(0),
            sample_rate_hz,
        }
    }

    pub fn state(&self) -> PlaybackState {
        PlaybackState::from_u8(self.state.load(Ordering::Acquire))
    }

    /// Start from the top if stopped; no-op while already playing
    pub fn play(&self) {
        let _ = self.state.compare_exchange(
            PlaybackState::Stopped.as_u8(),
            PlaybackState::Playing.as_u8(),
            Ordering::AcqRel,
            Ordering::Acquire,
        );
    }

    pub fn pause(&self) {
        let _ = self.state.compare_exchange(
            PlaybackState::Playing.as_u8(),
            PlaybackState::Paused.as_u8(),
            Ordering::AcqRel,
            Ordering::Acquire,
        );
    }

    pub fn resume(&self) {
        let _ = self.state.compare_exchange(
            PlaybackState::Paused.as_u8(),
            PlaybackState::Playing.as_u8(),
            Ordering::AcqRel,
            Ordering::Acquire,
        );
    }

    /// Stop and rewind to the start
    pub fn stop(&self) {
        self.rewind.store(true, Ordering::Release);
        self.position.store(0, Ordering::Release);
        self.state
            .store(PlaybackState::Stopped.as_u8(), Ordering::Release);
    }

    /// Samples played since the last rewind
    pub fn position(&self) -> usize {
        self.position.load(Ordering::Acquire)
    }

    /// Playback time in seconds
    pub fn elapsed_s(&self) -> f64 {
        self.position() as f64 / self.sample_rate_hz.max(1) as f64
    }

    pub fn is_playing(&self) -> bool {
        self.state() == PlaybackState::Playing
    }
}

/// Audio-thread reader over a decoded clip
pub struct SourcePlayer {
    clip: Arc<[f32]>,
    cursor: usize,
    looping: bool,
    rewound: bool,
    transport: Arc<Transport>,
}

impl SourcePlayer {
    pub fn new(clip: Arc<[f32]>, looping: bool, transport: Arc<Transport>) -> Self {
        Self {
            clip,
            cursor: 0,
            looping,
            rewound: false,
            transport,
        }
    }

    pub fn transport(&self) -> &Arc<Transport> {
        &self.transport
    }

    /// Whether a fill since the last call rewound the clip (stop or end of
    /// clip). Clears the flag.
    pub fn take_rewound(&mut self) -> bool {
        std::mem::take(&mut self.rewound)
    }

    /// Copy the next samples into `block`.
    ///
    /// Returns how many samples are valid, or `None` while not playing.
    /// A non-looping clip stops itself when it runs out.
    pub fn fill(&mut self, block: &mut [f32]) -> Option<usize> {
        if self.transport.rewind.swap(false, Ordering::AcqRel) {
            self.rewound = true;
            self.cursor = 0;
            self.transport.position.store(0, Ordering::Release);
        }
        if !self.transport.is_playing() || self.clip.is_empty() {
            return None;
        }

        let mut written = 0;
        while written < block.len() {
            if self.cursor >= self.clip.len() {
                if !self.looping {
                    break;
                }
                self.cursor = 0;
            }
            let n = (block.len() - written).min(self.clip.len() - self.cursor);
            block[written..written + n].copy_from_slice(&self.clip[self.cursor..self.cursor + n]);
            self.cursor += n;
            written += n;
        }

        self.transport.position.fetch_add(written, Ordering::AcqRel);
        if written < block.len() {
            self.transport
                .state
                .store(PlaybackState::Stopped.as_u8(), Ordering::Release);
            self.transport.rewind.store(true, Ordering::Release);
        }
        (written > 0).then_some(written)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn player(samples: &[f32], looping: bool) -> SourcePlayer {
        SourcePlayer::new(samples.into(), looping, Arc::new(Transport::new(4)))
    }

    #[test]
    fn test_silent_until_played() {
        let mut player = player(&[1.0, 2.0, 3.0], false);
        let mut block = [0.0; 2];
        assert_eq!(player.fill(&mut block), None);

        player.transport().play();
        assert_eq!(player.fill(&mut block), Some(2));
        assert_eq!(block, [1.0, 2.0]);
        assert_eq!(player.transport().position(), 2);
        assert!((player.transport().elapsed_s() - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_end_of_clip_stops() {
        let mut player = player(&[1.0, 2.0, 3.0], false);
        player.transport().play();
        let mut block = [0.0; 2];
        player.fill(&mut block);

        assert_eq!(player.fill(&mut block), Some(1));
        assert_eq!(block[0], 3.0);
        assert_eq!(player.transport().state(), PlaybackState::Stopped);
        assert_eq!(player.fill(&mut block), None);

        // play again starts from the top
        player.transport().play();
        assert_eq!(player.fill(&mut block), Some(2));
        assert_eq!(block, [1.0, 2.0]);
    }

    #[test]
    fn test_looping_wraps() {
        let mut player = player(&[1.0, 2.0, 3.0], true);
        player.transport().play();
        let mut block = [0.0; 7];
        assert_eq!(player.fill(&mut block), Some(7));
        assert_eq!(block, [1.0, 2.0, 3.0, 1.0, 2.0, 3.0, 1.0]);
        assert!(player.transport().is_playing());
    }

    #[test]
    fn test_pause_resume_keeps_position() {
        let mut player = player(&[1.0, 2.0, 3.0, 4.0], false);
        player.transport().play();
        let mut block = [0.0; 1];
        player.fill(&mut block);

        player.transport().pause();
        assert_eq!(player.fill(&mut block), None);

        player.transport().resume();
        player.fill(&mut block);
        assert_eq!(block[0], 2.0);
    }

    #[test]
    fn test_stop_rewinds() {
        let mut player = player(&[1.0, 2.0, 3.0], false);
        player.transport().play();
        let mut block = [0.0; 2];
        player.fill(&mut block);

        assert!(!player.take_rewound());

        player.transport().stop();
        assert_eq!(player.transport().position(), 0);
        assert_eq!(player.fill(&mut block), None);
        assert!(player.take_rewound());
        assert!(!player.take_rewound());

        player.transport().play();
        player.fill(&mut block);
        assert_eq!(block, [1.0, 2.0]);
    }
}
