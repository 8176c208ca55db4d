use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use crate::library::AudioRef;

use super::output::MediaOutput;
use super::tap::SampleTap;
use super::types::AudioError;

/// What the fake output has been asked to do.
#[derive(Debug, Default)]
pub(crate) struct FakeState {
    pub loaded: Option<AudioRef>,
    pub loads: usize,
    pub playing: bool,
    pub position: Duration,
    pub volume: f32,
    pub ended: bool,
    pub fail_play: bool,
    pub fail_tap: bool,
    pub taps: usize,
    pub decoder_duration: Option<Duration>,
}

/// In-memory [`MediaOutput`] whose state stays observable through the
/// shared handle after the box is handed to a controller.
#[derive(Debug, Default, Clone)]
pub(crate) struct FakeOutput {
    pub state: Rc<RefCell<FakeState>>,
}

impl FakeOutput {
    pub fn boxed() -> (Box<dyn MediaOutput>, Rc<RefCell<FakeState>>) {
        let fake = Self::default();
        let state = fake.state.clone();
        (Box::new(fake), state)
    }
}

impl MediaOutput for FakeOutput {
    fn load(&mut self, source: &AudioRef) -> Result<Option<Duration>, AudioError> {
        let mut s = self.state.borrow_mut();
        s.loaded = Some(source.clone());
        s.loads += 1;
        s.playing = false;
        s.position = Duration::ZERO;
        s.ended = false;
        Ok(s.decoder_duration)
    }

    fn play(&mut self) -> Result<(), AudioError> {
        let mut s = self.state.borrow_mut();
        if s.fail_play {
            return Err(AudioError::Device("fake device refused".into()));
        }
        if s.loaded.is_none() {
            return Err(AudioError::NothingLoaded);
        }
        s.playing = true;
        Ok(())
    }

    fn pause(&mut self) {
        self.state.borrow_mut().playing = false;
    }

    fn stop(&mut self) {
        let mut s = self.state.borrow_mut();
        s.loaded = None;
        s.playing = false;
        s.position = Duration::ZERO;
    }

    fn position(&self) -> Duration {
        self.state.borrow().position
    }

    fn seek(&mut self, position: Duration) -> Result<(), AudioError> {
        let mut s = self.state.borrow_mut();
        if s.loaded.is_none() {
            return Err(AudioError::NothingLoaded);
        }
        s.position = position;
        Ok(())
    }

    fn set_volume(&mut self, volume: f32) {
        self.state.borrow_mut().volume = volume;
    }

    fn ended(&self) -> bool {
        self.state.borrow().ended
    }

    fn attach_tap(&mut self, _tap: SampleTap) -> Result<(), AudioError> {
        let mut s = self.state.borrow_mut();
        if s.fail_tap || s.taps > 0 {
            return Err(AudioError::TapAlreadyAttached);
        }
        s.taps += 1;
        Ok(())
    }
}
