//! Time-driven crossfade and fade-out director.
//!
//! Fades run as tokio tasks stepping the mixer every [`FADE_TICK`]. At most
//! one fade is in flight: starting any fade, snap, or halt bumps a
//! generation counter, and the running task re-checks the generation
//! between ticks and exits quietly when superseded (replace, not queue).

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, info, instrument};

use super::mixer::{ClipId, FADE_TICK, FULL_DB, FadeChannel, Mixer, SILENT_DB};

/// Drives crossfades, fade-outs, and one-shots against a [`Mixer`].
pub struct AudioDirector<M> {
    mixer: Arc<Mutex<M>>,
    generation: Arc<AtomicU64>,
    default_fade: Duration,
    original_default_fade: Duration,
}

impl<M: Mixer + Send + 'static> AudioDirector<M> {
    /// Wraps a mixer with the given default fade duration.
    pub fn new(mixer: M, default_fade: Duration) -> Self {
        Self {
            mixer: Arc::new(Mutex::new(mixer)),
            generation: Arc::new(AtomicU64::new(0)),
            default_fade,
            original_default_fade: default_fade,
        }
    }

    /// Shared handle to the underlying mixer.
    pub fn mixer(&self) -> Arc<Mutex<M>> {
        Arc::clone(&self.mixer)
    }

    /// The duration used by the default-fade variants.
    pub fn default_fade(&self) -> Duration {
        self.default_fade
    }

    /// Overrides the default fade duration until reset.
    pub fn set_default_fade(&mut self, duration: Duration) {
        self.default_fade = duration;
    }

    /// Restores the default fade duration to its construction value.
    pub fn reset_default_fade(&mut self) {
        self.default_fade = self.original_default_fade;
    }

    /// Cancels any in-flight fade and returns the new generation.
    fn supersede(&self) -> u64 {
        self.generation.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Plays a one-shot sound effect, independent of the channel state
    /// machine.
    pub fn play_sound(&self, clip: ClipId) {
        self.mixer.lock().unwrap().play_one_shot(clip);
    }

    /// Cancels any in-flight fade and snaps both channels to the silent
    /// floor.
    #[instrument(skip(self))]
    pub fn halt_all(&self) {
        self.supersede();
        let mut mixer = self.mixer.lock().unwrap();
        mixer.set_attenuation(FadeChannel::One, SILENT_DB);
        mixer.set_attenuation(FadeChannel::Two, SILENT_DB);
    }

    /// Swaps `clip` in at full volume with no transition.
    ///
    /// Cancels any in-flight fade, then snaps the quieter channel to full
    /// volume with `clip` assigned and started, and the louder channel to
    /// the silent floor. The comparison matches the crossfade's: when the
    /// channels are equally loud, channel two is the one raised.
    #[instrument(skip(self))]
    pub fn play_immediate(&self, clip: ClipId) {
        self.supersede();
        let mut mixer = self.mixer.lock().unwrap();
        let (to_lower, to_raise) = pick_channels(&*mixer);
        mixer.assign_clip(to_raise, clip);
        mixer.set_attenuation(to_raise, FULL_DB);
        mixer.set_attenuation(to_lower, SILENT_DB);
        mixer.start(to_raise);
        info!(raised = %to_raise, "music changed immediately");
    }

    /// Crossfades to `clip` over the default fade duration.
    pub fn crossfade_default(&self, clip: ClipId) -> JoinHandle<()> {
        self.crossfade_to(clip, self.default_fade)
    }

    /// Crossfades to `clip` over `duration`.
    ///
    /// The louder channel ramps down to the silent floor while the quieter
    /// ramps up to full volume with `clip` playing from the first tick.
    /// Per-tick deltas are computed once at start as the distance each
    /// channel must travel divided by the tick count, so both ramps are
    /// linear and monotonic. A duration shorter than one tick snaps both
    /// channels to their targets.
    #[instrument(skip(self))]
    pub fn crossfade_to(&self, clip: ClipId, duration: Duration) -> JoinHandle<()> {
        let generation = self.supersede();
        let ticks = tick_count(duration);
        let (to_lower, to_raise, lower_start, raise_start) = {
            let mut mixer = self.mixer.lock().unwrap();
            let (to_lower, to_raise) = pick_channels(&*mixer);
            mixer.assign_clip(to_raise, clip);
            mixer.start(to_raise);

            if ticks == 0 {
                mixer.set_attenuation(to_lower, SILENT_DB);
                mixer.set_attenuation(to_raise, FULL_DB);
                return tokio::spawn(async {});
            }

            let lower_start = mixer.attenuation(to_lower);
            let raise_start = mixer.attenuation(to_raise);
            (to_lower, to_raise, lower_start, raise_start)
        };
        // Per-tick deltas are fixed at start; each tick writes an absolute
        // target so float error cannot accumulate, and the final tick lands
        // exactly on the endpoints.
        let lower_delta = (lower_start - SILENT_DB) / ticks as f32;
        let raise_delta = (FULL_DB - raise_start) / ticks as f32;

        info!(lowering = %to_lower, raising = %to_raise, ?duration, "crossfade started");
        let mixer = Arc::clone(&self.mixer);
        let current = Arc::clone(&self.generation);
        tokio::spawn(async move {
            for tick in 1..=ticks {
                tokio::time::sleep(FADE_TICK).await;
                if current.load(Ordering::SeqCst) != generation {
                    debug!("crossfade superseded");
                    return;
                }
                let (lowered, raised) = if tick == ticks {
                    (SILENT_DB, FULL_DB)
                } else {
                    (
                        (lower_start - lower_delta * tick as f32).max(SILENT_DB),
                        (raise_start + raise_delta * tick as f32).min(FULL_DB),
                    )
                };
                let mut mixer = mixer.lock().unwrap();
                mixer.set_attenuation(to_lower, lowered);
                mixer.set_attenuation(to_raise, raised);
            }
            debug!("crossfade complete");
        })
    }

    /// Fades both channels out over the default fade duration.
    pub fn fade_out_default(&self) -> JoinHandle<()> {
        self.fade_out_all(self.default_fade)
    }

    /// Ramps both channels down to the silent floor over `duration`.
    ///
    /// Each channel moves by its own per-tick delta so both arrive at the
    /// floor together. A duration shorter than one tick snaps both.
    #[instrument(skip(self))]
    pub fn fade_out_all(&self, duration: Duration) -> JoinHandle<()> {
        let generation = self.supersede();
        let ticks = tick_count(duration);
        let (one_start, two_start) = {
            let mut mixer = self.mixer.lock().unwrap();
            if ticks == 0 {
                mixer.set_attenuation(FadeChannel::One, SILENT_DB);
                mixer.set_attenuation(FadeChannel::Two, SILENT_DB);
                return tokio::spawn(async {});
            }
            (
                mixer.attenuation(FadeChannel::One),
                mixer.attenuation(FadeChannel::Two),
            )
        };
        let one_delta = (one_start - SILENT_DB) / ticks as f32;
        let two_delta = (two_start - SILENT_DB) / ticks as f32;

        info!(?duration, "fade-out started");
        let mixer = Arc::clone(&self.mixer);
        let current = Arc::clone(&self.generation);
        tokio::spawn(async move {
            for tick in 1..=ticks {
                tokio::time::sleep(FADE_TICK).await;
                if current.load(Ordering::SeqCst) != generation {
                    debug!("fade-out superseded");
                    return;
                }
                let (one, two) = if tick == ticks {
                    (SILENT_DB, SILENT_DB)
                } else {
                    (
                        (one_start - one_delta * tick as f32).max(SILENT_DB),
                        (two_start - two_delta * tick as f32).max(SILENT_DB),
                    )
                };
                let mut mixer = mixer.lock().unwrap();
                mixer.set_attenuation(FadeChannel::One, one);
                mixer.set_attenuation(FadeChannel::Two, two);
            }
            debug!("fade-out complete");
        })
    }
}

impl<M> std::fmt::Debug for AudioDirector<M> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AudioDirector")
            .field("generation", &self.generation.load(Ordering::SeqCst))
            .field("default_fade", &self.default_fade)
            .finish()
    }
}

/// Chooses the channel pair for a transition: the louder channel is
/// lowered, the quieter raised. Equal attenuations lower channel one.
fn pick_channels<M: Mixer>(mixer: &M) -> (FadeChannel, FadeChannel) {
    if mixer.attenuation(FadeChannel::One) >= mixer.attenuation(FadeChannel::Two) {
        (FadeChannel::One, FadeChannel::Two)
    } else {
        (FadeChannel::Two, FadeChannel::One)
    }
}

/// Number of whole ticks in `duration`. Durations shorter than one tick
/// run zero ticks, which callers treat as an instant snap.
fn tick_count(duration: Duration) -> u64 {
    (duration.as_millis() / FADE_TICK.as_millis()) as u64
}
