//! Sound cues using the Web Audio API
//!
//! Procedurally generated, no audio files. Any Web Audio failure is logged
//! and the cue is skipped; gameplay never depends on sound.

use wasm_bindgen::JsValue;
use web_sys::{AudioContext, GainNode, OscillatorNode, OscillatorType};

use crate::settings::Settings;
use crate::sim::GameEvent;

/// Sound cue types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SoundEffect {
    /// Milk bottle collected
    Coin,
    /// Flap
    Jump,
    /// Boss entered
    BossArrived,
    /// Round over
    GameOver,
}

impl SoundEffect {
    /// Cue for a simulation event, if it has one
    pub fn for_event(event: &GameEvent) -> Option<Self> {
        match event {
            GameEvent::CoinCollected { .. } => Some(SoundEffect::Coin),
            GameEvent::Jump => Some(SoundEffect::Jump),
            GameEvent::BossArrived { .. } => Some(SoundEffect::BossArrived),
            GameEvent::RoundEnded { .. } => Some(SoundEffect::GameOver),
            _ => None,
        }
    }
}

/// Audio manager for the game
pub struct AudioManager {
    ctx: Option<AudioContext>,
    volume: f32,
}

impl AudioManager {
    pub fn new(settings: &Settings) -> Self {
        // May fail outside a secure context
        let ctx = match AudioContext::new() {
            Ok(ctx) => Some(ctx),
            Err(e) => {
                log::warn!("Failed to create AudioContext, audio disabled: {:?}", e);
                None
            }
        };
        Self {
            ctx,
            volume: settings.effective_volume(),
        }
    }

    /// Pick up volume/mute changes
    pub fn apply_settings(&mut self, settings: &Settings) {
        self.volume = settings.effective_volume();
    }

    /// Play the cues for a batch of drained events
    pub fn play_events(&self, events: &[GameEvent]) {
        for effect in events.iter().filter_map(SoundEffect::for_event) {
            self.play(effect);
        }
    }

    pub fn play(&self, effect: SoundEffect) {
        if self.volume <= 0.0 {
            return;
        }
        let Some(ctx) = &self.ctx else { return };

        // Browsers keep the context suspended until a user gesture
        if ctx.state() == web_sys::AudioContextState::Suspended {
            if let Err(e) = ctx.resume() {
                log::warn!("AudioContext resume failed: {:?}", e);
            }
        }

        let result = match effect {
            SoundEffect::Coin => self.play_coin(ctx, self.volume),
            SoundEffect::Jump => self.play_jump(ctx, self.volume),
            SoundEffect::BossArrived => self.play_boss(ctx, self.volume),
            SoundEffect::GameOver => self.play_game_over(ctx, self.volume),
        };
        if let Err(e) = result {
            log::warn!("Sound {:?} failed: {:?}", effect, e);
        }
    }

    // === Sound generators ===

    fn create_osc(
        &self,
        ctx: &AudioContext,
        freq: f32,
        osc_type: OscillatorType,
    ) -> Result<(OscillatorNode, GainNode), JsValue> {
        let osc = ctx.create_oscillator()?;
        let gain = ctx.create_gain()?;

        osc.set_type(osc_type);
        osc.frequency().set_value(freq);
        osc.connect_with_audio_node(&gain)?;
        gain.connect_with_audio_node(&ctx.destination())?;

        Ok((osc, gain))
    }

    /// Coin - rising sine chirp
    fn play_coin(&self, ctx: &AudioContext, vol: f32) -> Result<(), JsValue> {
        let (osc, gain) = self.create_osc(ctx, 880.0, OscillatorType::Sine)?;
        let t = ctx.current_time();

        osc.frequency().set_value_at_time(880.0, t)?;
        osc.frequency()
            .exponential_ramp_to_value_at_time(1760.0, t + 0.1)?;
        gain.gain().set_value_at_time(0.1 * vol, t)?;
        gain.gain()
            .exponential_ramp_to_value_at_time(0.01, t + 0.2)?;

        osc.start()?;
        osc.stop_with_when(t + 0.2)?;
        Ok(())
    }

    /// Jump - short soft whoosh
    fn play_jump(&self, ctx: &AudioContext, vol: f32) -> Result<(), JsValue> {
        let (osc, gain) = self.create_osc(ctx, 300.0, OscillatorType::Triangle)?;
        let t = ctx.current_time();

        gain.gain().set_value_at_time(vol * 0.05, t)?;
        gain.gain()
            .exponential_ramp_to_value_at_time(0.005, t + 0.08)?;
        osc.frequency()
            .exponential_ramp_to_value_at_time(450.0, t + 0.08)?;

        osc.start()?;
        osc.stop_with_when(t + 0.1)?;
        Ok(())
    }

    /// Boss - low two-note warning
    fn play_boss(&self, ctx: &AudioContext, vol: f32) -> Result<(), JsValue> {
        for (i, freq) in [220.0, 165.0].iter().enumerate() {
            let (osc, gain) = self.create_osc(ctx, *freq, OscillatorType::Square)?;
            let t = ctx.current_time() + i as f64 * 0.18;
            gain.gain().set_value_at_time(vol * 0.08, t)?;
            gain.gain()
                .exponential_ramp_to_value_at_time(0.01, t + 0.16)?;
            osc.start_with_when(t)?;
            osc.stop_with_when(t + 0.18)?;
        }
        Ok(())
    }

    /// Game over - sad descending
    fn play_game_over(&self, ctx: &AudioContext, vol: f32) -> Result<(), JsValue> {
        for (i, freq) in [400.0, 300.0, 200.0].iter().enumerate() {
            let (osc, gain) = self.create_osc(ctx, *freq, OscillatorType::Sine)?;
            let t = ctx.current_time() + i as f64 * 0.2;
            gain.gain().set_value_at_time(vol * 0.2, t)?;
            gain.gain()
                .exponential_ramp_to_value_at_time(0.01, t + 0.3)?;
            osc.start_with_when(t)?;
            osc.stop_with_when(t + 0.4)?;
        }
        Ok(())
    }
}
