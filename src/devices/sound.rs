//! The sound trigger boundary C3 calls into. Playback itself (decoding a
//! WAV, mixing, output devices) is a host collaborator's problem; the core
//! only needs to name a sample and hold a handle to a looping channel
//! across `OUT 3` writes.

/// One of the cabinet's nine distinct sample triggers, matching the fixed
/// table the original hardware's sound board indexes into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SoundId {
    Ufo,
    Shot,
    PlayerDie,
    InvaderDie,
    FleetMove1,
    FleetMove2,
    FleetMove3,
    FleetMove4,
    UfoDie,
}

/// Opaque handle to a looping channel, returned by `play_loop` and later
/// passed back to `stop`. The core never inspects its value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChannelHandle(pub u32);

/// Collaborator boundary for audio. A sound subsystem failure must never
/// propagate as a fatal error from here; implementations should log and
/// carry on so the game remains playable without sound.
pub trait SoundSink {
    fn play_once(&mut self, id: SoundId);
    fn play_loop(&mut self, id: SoundId) -> ChannelHandle;
    fn stop(&mut self, channel: ChannelHandle);
}

/// A `SoundSink` that does nothing; used by headless tests and scenario
/// harnesses that don't want to open a real audio device.
#[derive(Debug, Default)]
pub struct NullSink {
    next_channel: u32,
}

impl SoundSink for NullSink {
    fn play_once(&mut self, _id: SoundId) {}

    fn play_loop(&mut self, _id: SoundId) -> ChannelHandle {
        self.next_channel = self.next_channel.wrapping_add(1);
        ChannelHandle(self.next_channel)
    }

    fn stop(&mut self, _channel: ChannelHandle) {}
}
