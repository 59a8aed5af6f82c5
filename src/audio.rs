//! Audio sinks
//!
//! The simulation emits `GameEvent`s; a sink turns them into sound. In the
//! browser that is a Web Audio synth, natively it is silent.

use crate::sim::GameEvent;

/// Consumer of gameplay events plus the combat music switch
pub trait AudioSink {
    fn play(&mut self, event: GameEvent);
    fn set_combat_music(&mut self, on: bool);
    fn set_muted(&mut self, muted: bool);
    fn is_muted(&self) -> bool;
}

/// Sink that only tracks mute and music state
#[derive(Debug, Default, Clone)]
pub struct SilentAudio {
    muted: bool,
    combat_music: bool,
}

impl SilentAudio {
    pub fn new(muted: bool) -> Self {
        Self {
            muted,
            combat_music: false,
        }
    }

    pub fn combat_music(&self) -> bool {
        self.combat_music
    }
}

impl AudioSink for SilentAudio {
    fn play(&mut self, event: GameEvent) {
        log::trace!("sfx {:?}", event);
    }

    fn set_combat_music(&mut self, on: bool) {
        self.combat_music = on;
    }

    fn set_muted(&mut self, muted: bool) {
        self.muted = muted;
    }

    fn is_muted(&self) -> bool {
        self.muted
    }
}

#[cfg(target_arch = "wasm32")]
pub use web::AudioManager;

#[cfg(target_arch = "wasm32")]
mod web {
    //! Procedurally generated sound effects - no external files needed!

    use web_sys::{AudioContext, GainNode, OscillatorNode, OscillatorType};

    use super::AudioSink;
    use crate::sim::{EnemyKind, GameEvent};

    /// Web Audio synth
    pub struct AudioManager {
        ctx: Option<AudioContext>,
        master_volume: f32,
        muted: bool,
        music: Option<(OscillatorNode, GainNode)>,
    }

    impl Default for AudioManager {
        fn default() -> Self {
            Self::new(false)
        }
    }

    impl AudioManager {
        pub fn new(muted: bool) -> Self {
            // May fail outside a secure context
            let ctx = AudioContext::new().ok();
            if ctx.is_none() {
                log::warn!("Failed to create AudioContext - audio disabled");
            }
            Self {
                ctx,
                master_volume: 0.8,
                muted,
                music: None,
            }
        }

        /// Resume audio context (required after user gesture)
        pub fn resume(&self) {
            if let Some(ctx) = &self.ctx {
                let _ = ctx.resume();
            }
        }

        fn volume(&self) -> f32 {
            if self.muted { 0.0 } else { self.master_volume }
        }

        /// Create an oscillator with gain envelope
        fn create_osc(
            ctx: &AudioContext,
            freq: f32,
            osc_type: OscillatorType,
        ) -> Option<(OscillatorNode, GainNode)> {
            let osc = ctx.create_oscillator().ok()?;
            let gain = ctx.create_gain().ok()?;
            osc.set_type(osc_type);
            osc.frequency().set_value(freq);
            osc.connect_with_audio_node(&gain).ok()?;
            gain.connect_with_audio_node(&ctx.destination()).ok()?;
            Some((osc, gain))
        }

        /// One enveloped tone sweeping from `from` to `to` Hz
        fn blip(
            ctx: &AudioContext,
            from: f32,
            to: f32,
            length: f64,
            level: f32,
            osc_type: OscillatorType,
            delay: f64,
        ) {
            let Some((osc, gain)) = Self::create_osc(ctx, from, osc_type) else {
                return;
            };
            let t = ctx.current_time() + delay;
            gain.gain().set_value_at_time(level, t).ok();
            gain.gain()
                .exponential_ramp_to_value_at_time(0.001, t + length)
                .ok();
            osc.frequency().set_value_at_time(from, t).ok();
            osc.frequency()
                .exponential_ramp_to_value_at_time(to.max(1.0), t + length)
                .ok();
            osc.start_with_when(t).ok();
            osc.stop_with_when(t + length + 0.05).ok();
        }

        fn stop_music(&mut self) {
            if let Some((osc, _)) = self.music.take() {
                osc.stop().ok();
            }
        }
    }

    impl AudioSink for AudioManager {
        fn play(&mut self, event: GameEvent) {
            let vol = self.volume();
            if vol <= 0.0 {
                return;
            }
            let Some(ctx) = &self.ctx else { return };
            // Browsers start suspended until a user gesture
            if ctx.state() == web_sys::AudioContextState::Suspended {
                let _ = ctx.resume();
            }

            use OscillatorType::{Sawtooth, Sine, Square, Triangle};
            match event {
                GameEvent::Shoot => Self::blip(ctx, 880.0, 420.0, 0.06, vol * 0.08, Square, 0.0),
                GameEvent::EnemyHit => Self::blip(ctx, 320.0, 220.0, 0.05, vol * 0.12, Triangle, 0.0),
                GameEvent::EnemyExplode { kind, .. } => {
                    let (from, length) = match kind {
                        EnemyKind::Boss => (140.0, 0.7),
                        EnemyKind::Tank => (120.0, 0.35),
                        _ => (180.0, 0.2),
                    };
                    Self::blip(ctx, from, 30.0, length, vol * 0.4, Sawtooth, 0.0);
                    Self::blip(ctx, 1500.0, 400.0, 0.08, vol * 0.12, Square, 0.0);
                }
                GameEvent::PlayerDamaged => Self::blip(ctx, 220.0, 70.0, 0.25, vol * 0.4, Sawtooth, 0.0),
                GameEvent::LevelUp => {
                    for (i, freq) in [400.0, 500.0, 600.0, 800.0].into_iter().enumerate() {
                        Self::blip(ctx, freq, freq, 0.35, vol * 0.25, Triangle, i as f64 * 0.1);
                    }
                }
                GameEvent::Powerup(_) => {
                    for (i, freq) in [600.0, 800.0, 1000.0].into_iter().enumerate() {
                        Self::blip(ctx, freq, freq, 0.15, vol * 0.22, Sine, i as f64 * 0.07);
                    }
                }
                GameEvent::PhasePulse => Self::blip(ctx, 900.0, 120.0, 0.5, vol * 0.3, Sine, 0.0),
                GameEvent::CannonBlast => Self::blip(ctx, 90.0, 25.0, 0.6, vol * 0.5, Sawtooth, 0.0),
                GameEvent::ArcZap => Self::blip(ctx, 2400.0, 600.0, 0.05, vol * 0.1, Square, 0.0),
                GameEvent::OverdriveActivated => Self::blip(ctx, 200.0, 1200.0, 0.4, vol * 0.3, Sawtooth, 0.0),
                GameEvent::ShieldRecharge => Self::blip(ctx, 300.0, 600.0, 0.2, vol * 0.12, Sine, 0.0),
                GameEvent::ShieldRestored => Self::blip(ctx, 700.0, 1100.0, 0.18, vol * 0.15, Sine, 0.0),
                GameEvent::BossSpawned => Self::blip(ctx, 60.0, 40.0, 1.2, vol * 0.45, Sawtooth, 0.0),
                GameEvent::GameOver => {
                    for (i, freq) in [400.0, 350.0, 300.0, 200.0].into_iter().enumerate() {
                        Self::blip(ctx, freq, freq * 0.9, 0.3, vol * 0.3, Sine, i as f64 * 0.2);
                    }
                }
            }
        }

        fn set_combat_music(&mut self, on: bool) {
            if !on || self.muted {
                self.stop_music();
                return;
            }
            if self.music.is_some() {
                return;
            }
            let Some(ctx) = &self.ctx else { return };
            if let Some((osc, gain)) = Self::create_osc(ctx, 55.0, OscillatorType::Triangle) {
                gain.gain().set_value(self.master_volume * 0.06);
                osc.start().ok();
                self.music = Some((osc, gain));
            }
        }

        fn set_muted(&mut self, muted: bool) {
            self.muted = muted;
            if muted {
                self.stop_music();
            }
        }

        fn is_muted(&self) -> bool {
            self.muted
        }
    }
}
