//! rodio-backed media playback: the external library the engine reads its
//! clock from.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use rodio::source::Buffered;
use rodio::{Decoder, OutputStream, OutputStreamHandle, Sink, Source};

use trackmarker_core::{MediaBackend, PlaybackSession, TrackError};

/// Decoded audio read from a file.
type DecodedSource = Decoder<BufReader<File>>;
/// Buffered so the track is decoded once and replayed per record session.
type BufferedSource = Buffered<DecodedSource>;

pub struct RodioBackend {
    // Held so the output device outlives the sinks spawned from `handle`.
    _stream: OutputStream,
    handle: OutputStreamHandle,
    source: Option<BufferedSource>,
}

impl RodioBackend {
    pub fn new() -> Result<Self, TrackError> {
        let (stream, handle) =
            OutputStream::try_default().map_err(|e| TrackError::Backend(e.to_string()))?;
        Ok(Self {
            _stream: stream,
            handle,
            source: None,
        })
    }
}

impl MediaBackend for RodioBackend {
    fn load(&mut self, path: &Path) -> Result<(), TrackError> {
        let file = File::open(path)?;
        let decoder =
            Decoder::new(BufReader::new(file)).map_err(|e| TrackError::Backend(e.to_string()))?;
        self.source = Some(decoder.buffered());
        Ok(())
    }

    fn start_session(&mut self) -> Result<Box<dyn PlaybackSession>, TrackError> {
        let source = self.source.clone().ok_or(TrackError::NoTrack)?;
        let sink = Sink::try_new(&self.handle).map_err(|e| TrackError::Backend(e.to_string()))?;
        sink.append(source);
        sink.play();
        Ok(Box::new(RodioSession { sink }))
    }
}

/// One playback of the bound track. Dropping the sink (when the controller
/// replaces the session) stops its audio.
struct RodioSession {
    sink: Sink,
}

impl PlaybackSession for RodioSession {
    fn position(&self) -> f64 {
        self.sink.get_pos().as_secs_f64()
    }

    fn pause(&mut self) {
        self.sink.pause()
    }

    fn is_finished(&self) -> bool {
        self.sink.empty()
    }
}
