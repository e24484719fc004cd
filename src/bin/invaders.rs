//! The demo binary: opens a window via `minifb`, an audio device via
//! `rodio`, and drives `Emulator::tick` until the window closes. Every
//! collaborator trait the core defines (`InputSource`, `FrameSink`,
//! `SoundSink`) is implemented concretely here and nowhere else.

use std::cell::RefCell;
use std::io::BufReader;
use std::path::PathBuf;
use std::process::ExitCode;
use std::rc::Rc;

use clap::Parser;
use minifb::{Key, Window, WindowOptions};
use rodio::buffer::SamplesBuffer;
use rodio::{Decoder, OutputStream, OutputStreamHandle, Sink, Source};

use invaders8080::devices::sound::{ChannelHandle, SoundId, SoundSink};
use invaders8080::input::{CabinetInputs, InputSource};
use invaders8080::scheduler::{FrameSink, Signal};
use invaders8080::video;
use invaders8080::Emulator;

/// Space Invaders (1978) cabinet emulator: an Intel 8080 interpreter with
/// cabinet-specific I/O ports, two per-frame interrupts, and a minifb/rodio
/// front end.
#[derive(Parser, Debug)]
#[command(name = "invaders", version, about)]
struct Cli {
    /// Path to the headerless 8080 ROM image.
    rom: PathBuf,

    /// Allow writes to the ROM region, for self-test images like cpudiag.bin.
    #[arg(long)]
    cpudiag: bool,

    /// Wall-clock-to-cycle scale factor; 1.0 is real time.
    #[arg(long, default_value_t = 1.0)]
    speed: f64,

    /// Directory containing the cabinet's WAV samples (see README naming).
    #[arg(long, default_value = "sounds")]
    sounds_dir: PathBuf,
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            log::error!("{err:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let mut sound = RodioSink::open(cli.sounds_dir)?;

    let mut emulator = Emulator::from_path(&cli.rom, cli.cpudiag, cli.speed, &mut sound)?;

    let window = Rc::new(RefCell::new(
        Window::new(
            "Space Invaders",
            video::FRAME_WIDTH,
            video::FRAME_HEIGHT,
            WindowOptions { scale: minifb::Scale::X2, ..WindowOptions::default() },
        )
        .map_err(|err| anyhow::anyhow!("could not open window: {err}"))?,
    ));

    let mut input = MinifbInput { window: Rc::clone(&window) };
    let mut frame_sink = MinifbFrameSink { window: Rc::clone(&window) };

    while window.borrow().is_open() && !window.borrow().is_key_down(Key::Escape) {
        match emulator.tick(&mut input, &mut frame_sink) {
            Signal::Ok => {}
            Signal::Quit => break,
        }
        window.borrow_mut().update();
    }

    Ok(())
}

/// Translates minifb's key state into the fixed cabinet keymap described in
/// the design doc. Shares the `Window` with `MinifbFrameSink` via `Rc`,
/// since `Emulator::tick` borrows the input source and frame sink at
/// different points of the same call rather than concurrently.
struct MinifbInput {
    window: Rc<RefCell<Window>>,
}

impl InputSource for MinifbInput {
    fn poll(&mut self) -> CabinetInputs {
        let window = self.window.borrow();
        let shoot = window.is_key_down(Key::Space) || window.is_key_down(Key::P);
        let left = window.is_key_down(Key::Left) || window.is_key_down(Key::A);
        let right = window.is_key_down(Key::Right) || window.is_key_down(Key::D);
        CabinetInputs {
            credit: window.is_key_down(Key::Enter),
            p1_start: window.is_key_down(Key::Key1),
            p2_start: window.is_key_down(Key::Key2),
            p1_shoot: shoot,
            p1_left: left,
            p1_right: right,
            p2_shoot: shoot,
            p2_left: left,
            p2_right: right,
            tilt: window.is_key_down(Key::Tab),
            dip3: window.is_key_down(Key::Key3),
            dip5: window.is_key_down(Key::Key5),
            dip6: window.is_key_down(Key::Key6),
            dip7: window.is_key_down(Key::Key7),
            pause: window.is_key_down(Key::Key0),
        }
    }
}

struct MinifbFrameSink {
    window: Rc<RefCell<Window>>,
}

impl FrameSink for MinifbFrameSink {
    fn present(&mut self, frame: &[u32]) {
        let mut window = self.window.borrow_mut();
        if let Err(err) = window.update_with_buffer(frame, video::FRAME_WIDTH, video::FRAME_HEIGHT) {
            log::warn!("could not present frame: {err}");
        }
    }
}

/// Plays the cabinet's nine samples from WAV files named after the sound
/// they trigger, resolved relative to `--sounds-dir`. A missing or
/// undecodable file is logged at debug level and otherwise ignored: per the
/// error handling design, a sound subsystem failure must never make the
/// game unplayable.
struct RodioSink {
    _stream: OutputStream,
    stream_handle: OutputStreamHandle,
    sounds_dir: PathBuf,
    ufo_sink: Option<Sink>,
}

impl RodioSink {
    fn open(sounds_dir: PathBuf) -> anyhow::Result<Self> {
        let (stream, stream_handle) =
            OutputStream::try_default().map_err(|err| anyhow::anyhow!("could not open audio device: {err}"))?;
        Ok(RodioSink { _stream: stream, stream_handle, sounds_dir, ufo_sink: None })
    }

    fn path_for(&self, id: SoundId) -> PathBuf {
        let name = match id {
            SoundId::Ufo => "ufo.wav",
            SoundId::Shot => "shoot.wav",
            SoundId::PlayerDie => "player_die.wav",
            SoundId::InvaderDie => "invader_die.wav",
            SoundId::FleetMove1 => "fleet_movement_1.wav",
            SoundId::FleetMove2 => "fleet_movement_2.wav",
            SoundId::FleetMove3 => "fleet_movement_3.wav",
            SoundId::FleetMove4 => "fleet_movement_4.wav",
            SoundId::UfoDie => "ufo_die.wav",
        };
        self.sounds_dir.join(name)
    }

    /// Decodes the whole sample eagerly into a `SamplesBuffer`, which is
    /// `Clone` and therefore can be looped with `repeat_infinite`, unlike a
    /// `Decoder` streaming straight off the file handle.
    fn load(&self, id: SoundId) -> Option<SamplesBuffer<f32>> {
        let path = self.path_for(id);
        let file = std::fs::File::open(&path)
            .map_err(|err| log::debug!("sound asset {path:?} unavailable: {err}"))
            .ok()?;
        let decoder = Decoder::new(BufReader::new(file))
            .map_err(|err| log::debug!("could not decode {path:?}: {err}"))
            .ok()?;
        let channels = decoder.channels();
        let sample_rate = decoder.sample_rate();
        let samples: Vec<f32> = decoder.convert_samples().collect();
        Some(SamplesBuffer::new(channels, sample_rate, samples))
    }
}

impl SoundSink for RodioSink {
    fn play_once(&mut self, id: SoundId) {
        let Some(buffer) = self.load(id) else { return };
        if let Err(err) = self.stream_handle.play_raw(buffer.convert_samples()) {
            log::debug!("could not play sound {id:?}: {err}");
        }
    }

    fn play_loop(&mut self, id: SoundId) -> ChannelHandle {
        if let Some(buffer) = self.load(id) {
            match Sink::try_new(&self.stream_handle) {
                Ok(sink) => {
                    sink.append(buffer.repeat_infinite());
                    self.ufo_sink = Some(sink);
                }
                Err(err) => log::debug!("could not open channel for {id:?}: {err}"),
            }
        }
        ChannelHandle(0)
    }

    fn stop(&mut self, _channel: ChannelHandle) {
        if let Some(sink) = self.ufo_sink.take() {
            sink.stop();
        }
    }
}
