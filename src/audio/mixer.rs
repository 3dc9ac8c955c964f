//! Mixer abstraction: the boundary to the audio backend.
//!
//! The crossfade director only ever talks to a [`Mixer`], so the engine
//! below it can be a real platform mixer or the in-memory
//! [`SoftwareMixer`] used by tests and headless runs.

use std::time::Duration;

use derive_more::Display;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Handle for an audio clip known to the backend.
pub type ClipId = String;

/// Full volume, in decibels of attenuation.
pub const FULL_DB: f32 = 0.0;

/// The silent floor, in decibels of attenuation.
pub const SILENT_DB: f32 = -80.0;

/// Wall-clock interval between fade steps.
pub const FADE_TICK: Duration = Duration::from_millis(100);

/// One of the two symmetric crossfade channels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, strum::EnumIter)]
pub enum FadeChannel {
    /// Crossfade channel one.
    #[display("one")]
    One,
    /// Crossfade channel two.
    #[display("two")]
    Two,
}

impl FadeChannel {
    /// The opposite channel.
    pub fn other(self) -> Self {
        match self {
            FadeChannel::One => FadeChannel::Two,
            FadeChannel::Two => FadeChannel::One,
        }
    }
}

/// The audio backend the crossfade director drives.
///
/// Implementations clamp attenuation writes to `[SILENT_DB, FULL_DB]`.
/// One-shot playback is fire-and-forget and independent of the channel
/// state machine.
pub trait Mixer {
    /// Current attenuation of `channel` in decibels.
    fn attenuation(&self, channel: FadeChannel) -> f32;

    /// Sets the attenuation of `channel`, clamped to `[SILENT_DB, FULL_DB]`.
    fn set_attenuation(&mut self, channel: FadeChannel, db: f32);

    /// Assigns a clip to `channel` without starting playback.
    fn assign_clip(&mut self, channel: FadeChannel, clip: ClipId);

    /// Starts playback of the clip assigned to `channel`.
    fn start(&mut self, channel: FadeChannel);

    /// Plays a one-shot sound effect to completion, never blocking the
    /// channel state machine.
    fn play_one_shot(&mut self, clip: ClipId);
}

#[derive(Debug, Clone, Default, PartialEq)]
struct ChannelState {
    attenuation: f32,
    clip: Option<ClipId>,
    playing: bool,
}

/// In-memory [`Mixer`] that records every write for inspection.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SoftwareMixer {
    one: ChannelState,
    two: ChannelState,
    one_shots: Vec<ClipId>,
    attenuation_log: Vec<(FadeChannel, f32)>,
}

impl SoftwareMixer {
    /// Creates a mixer with both channels at the silent floor and nothing
    /// assigned.
    pub fn new() -> Self {
        Self {
            one: ChannelState {
                attenuation: SILENT_DB,
                ..ChannelState::default()
            },
            two: ChannelState {
                attenuation: SILENT_DB,
                ..ChannelState::default()
            },
            one_shots: Vec::new(),
            attenuation_log: Vec::new(),
        }
    }

    fn channel(&self, channel: FadeChannel) -> &ChannelState {
        match channel {
            FadeChannel::One => &self.one,
            FadeChannel::Two => &self.two,
        }
    }

    fn channel_mut(&mut self, channel: FadeChannel) -> &mut ChannelState {
        match channel {
            FadeChannel::One => &mut self.one,
            FadeChannel::Two => &mut self.two,
        }
    }

    /// The clip currently assigned to `channel`, if any.
    pub fn clip(&self, channel: FadeChannel) -> Option<&ClipId> {
        self.channel(channel).clip.as_ref()
    }

    /// Whether `channel` has been started since its last clip assignment.
    pub fn is_playing(&self, channel: FadeChannel) -> bool {
        self.channel(channel).playing
    }

    /// Every one-shot played, in order.
    pub fn one_shots(&self) -> &[ClipId] {
        &self.one_shots
    }

    /// Every attenuation write, in order. Lets tests assert on the shape
    /// of a fade rather than just its end state.
    pub fn attenuation_log(&self) -> &[(FadeChannel, f32)] {
        &self.attenuation_log
    }
}

impl Mixer for SoftwareMixer {
    fn attenuation(&self, channel: FadeChannel) -> f32 {
        self.channel(channel).attenuation
    }

    fn set_attenuation(&mut self, channel: FadeChannel, db: f32) {
        let clamped = db.clamp(SILENT_DB, FULL_DB);
        self.channel_mut(channel).attenuation = clamped;
        self.attenuation_log.push((channel, clamped));
    }

    fn assign_clip(&mut self, channel: FadeChannel, clip: ClipId) {
        debug!(%channel, %clip, "clip assigned");
        let state = self.channel_mut(channel);
        state.clip = Some(clip);
        state.playing = false;
    }

    fn start(&mut self, channel: FadeChannel) {
        self.channel_mut(channel).playing = true;
    }

    fn play_one_shot(&mut self, clip: ClipId) {
        debug!(%clip, "one-shot played");
        self.one_shots.push(clip);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_mixer_is_silent() {
        let mixer = SoftwareMixer::new();
        assert_eq!(mixer.attenuation(FadeChannel::One), SILENT_DB);
        assert_eq!(mixer.attenuation(FadeChannel::Two), SILENT_DB);
        assert!(!mixer.is_playing(FadeChannel::One));
    }

    #[test]
    fn test_set_attenuation_clamps() {
        let mut mixer = SoftwareMixer::new();
        mixer.set_attenuation(FadeChannel::One, 12.0);
        assert_eq!(mixer.attenuation(FadeChannel::One), FULL_DB);
        mixer.set_attenuation(FadeChannel::One, -200.0);
        assert_eq!(mixer.attenuation(FadeChannel::One), SILENT_DB);
    }

    #[test]
    fn test_assign_then_start() {
        let mut mixer = SoftwareMixer::new();
        mixer.assign_clip(FadeChannel::Two, "menu_theme".to_string());
        assert!(!mixer.is_playing(FadeChannel::Two));
        mixer.start(FadeChannel::Two);
        assert!(mixer.is_playing(FadeChannel::Two));
        assert_eq!(
            mixer.clip(FadeChannel::Two).map(String::as_str),
            Some("menu_theme")
        );
    }

    #[test]
    fn test_one_shots_accumulate() {
        let mut mixer = SoftwareMixer::new();
        mixer.play_one_shot("place".to_string());
        mixer.play_one_shot("fanfare".to_string());
        assert_eq!(mixer.one_shots(), ["place", "fanfare"]);
    }

    #[test]
    fn test_other_channel() {
        assert_eq!(FadeChannel::One.other(), FadeChannel::Two);
        assert_eq!(FadeChannel::Two.other(), FadeChannel::One);
    }
}
