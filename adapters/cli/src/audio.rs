use std::{collections::BTreeSet, mem};

use horde_core::AudioCue;
use tracing::{debug, info, warn};

const CUE_BANK: [AudioCue; 2] = [AudioCue::WaveStart, AudioCue::WaveFinish];

/// Audio service stand-in that logs cues instead of playing them.
#[derive(Debug, Default)]
pub(crate) struct ConsoleAudio {
    playing: BTreeSet<&'static str>,
    paused: BTreeSet<&'static str>,
}

impl ConsoleAudio {
    /// Plays the named cue. Unknown names are ignored.
    pub(crate) fn play(&mut self, name: &str) {
        let Some(cue) = lookup(name) else {
            warn!(cue = name, "no sound registered under this name");
            return;
        };

        if self.is_playing(cue.name()) {
            debug!(cue = cue.name(), "restarting cue");
        }
        let _ = self.playing.insert(cue.name());
        info!(cue = cue.name(), "playing cue");
    }

    /// Stops the named cue if it is playing or paused.
    pub(crate) fn stop(&mut self, name: &str) {
        if self.playing.remove(name) | self.paused.remove(name) {
            debug!(cue = name, "stopped cue");
        }
    }

    /// Holds every playing cue while the game is paused.
    pub(crate) fn pause(&mut self) {
        for cue in mem::take(&mut self.playing) {
            debug!(cue, "paused cue");
            let _ = self.paused.insert(cue);
        }
    }

    /// Continues the cues held by [`ConsoleAudio::pause`].
    pub(crate) fn resume(&mut self) {
        for cue in mem::take(&mut self.paused) {
            debug!(cue, "resumed cue");
            let _ = self.playing.insert(cue);
        }
    }

    /// Reports whether the named cue is playing.
    #[must_use]
    pub(crate) fn is_playing(&self, name: &str) -> bool {
        self.playing.contains(name)
    }

    /// Stops every cue, used when the session shuts down.
    pub(crate) fn stop_all(&mut self) {
        for cue in CUE_BANK {
            self.stop(cue.name());
        }
    }
}

fn lookup(name: &str) -> Option<AudioCue> {
    CUE_BANK.into_iter().find(|cue| cue.name() == name)
}
