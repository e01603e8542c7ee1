use std::io::{Cursor, Seek, Write};

use bytes::Bytes;
use hound::WavWriter;
use rubato::{
    Resampler, SincFixedIn, SincInterpolationParameters, SincInterpolationType, WindowFunction,
};
use symphonia::core::audio::{AudioBufferRef, SampleBuffer};
use symphonia::core::codecs::{Decoder, DecoderOptions};
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::{FormatOptions, FormatReader};
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;

use crate::application::ports::{AudioNormalizer, ConversionError};
use crate::domain::{AudioBlob, AudioContainer, CANONICAL_SAMPLE_RATE, NormalizedAudio, RunId};

use super::wav;

const RESAMPLER_CHUNK: usize = 1024;

/// Decodes and resamples in-process. No external binary and no temp files,
/// but no Opus support, so browser WebM recordings need the ffmpeg variant.
#[derive(Debug, Default)]
pub struct SymphoniaAudioNormalizer;

impl AudioNormalizer for SymphoniaAudioNormalizer {
    fn normalize(
        &self,
        blob: &AudioBlob,
        _run_id: RunId,
    ) -> Result<NormalizedAudio, ConversionError> {
        if let Some(audio) = wav::passthrough(blob) {
            tracing::debug!("Audio already canonical, skipping decode");
            return Ok(audio);
        }

        let mut track = TrackReader::open(blob)?;
        let mut buffer = Cursor::new(Vec::with_capacity(blob.data.len()));
        let mut sink = CanonicalSink::new(&mut buffer)?;
        track.decode_into(&mut sink)?;
        let frames = sink.finish()?;

        tracing::debug!(frames, "Audio decoded to canonical PCM");

        wav::read_canonical(Bytes::from(buffer.into_inner()))
    }
}

struct TrackReader {
    format: Box<dyn FormatReader>,
    decoder: Box<dyn Decoder>,
    track_id: u32,
}

impl TrackReader {
    fn open(blob: &AudioBlob) -> Result<Self, ConversionError> {
        let cursor = Cursor::new(blob.data.clone());
        let source = MediaSourceStream::new(Box::new(cursor), Default::default());

        let mut hint = Hint::new();
        let container = blob.container();
        if container != AudioContainer::Unknown {
            hint.with_extension(container.extension());
        }

        let format = symphonia::default::get_probe()
            .format(
                &hint,
                source,
                &FormatOptions::default(),
                &MetadataOptions::default(),
            )
            .map_err(|e| decoding("probe", e))?
            .format;

        let track = format
            .default_track()
            .ok_or_else(|| ConversionError::DecodingFailed("no audio track found".to_string()))?;
        let track_id = track.id;
        let decoder = symphonia::default::get_codecs()
            .make(&track.codec_params, &DecoderOptions::default())
            .map_err(|e| decoding("codec", e))?;

        Ok(Self {
            format,
            decoder,
            track_id,
        })
    }

    /// Feeds every decoded buffer of the track to `sink`. Corrupt frames are
    /// skipped; anything else stops the run.
    fn decode_into<W: Write + Seek>(
        &mut self,
        sink: &mut CanonicalSink<W>,
    ) -> Result<(), ConversionError> {
        loop {
            let packet = match self.format.next_packet() {
                Ok(packet) => packet,
                Err(SymphoniaError::IoError(e))
                    if e.kind() == std::io::ErrorKind::UnexpectedEof =>
                {
                    return Ok(());
                }
                Err(SymphoniaError::ResetRequired) => return Ok(()),
                Err(e) => return Err(decoding("packet", e)),
            };
            if packet.track_id() != self.track_id {
                continue;
            }

            match self.decoder.decode(&packet) {
                Ok(decoded) => sink.push(decoded)?,
                Err(SymphoniaError::DecodeError(e)) => {
                    tracing::warn!(error = %e, "Skipping corrupt audio frame");
                }
                Err(e) => return Err(decoding("decode", e)),
            }
        }
    }
}

/// Down-mixes, resamples and writes each decoded buffer straight into a
/// canonical WAV writer. The source rate and channel layout come from the
/// first decoded buffer.
struct CanonicalSink<W: Write + Seek> {
    writer: WavWriter<W>,
    source_rate: Option<u32>,
    converter: Option<RateConverter>,
    interleaved: Option<SampleBuffer<f32>>,
    mono: Vec<f32>,
    frames_written: u32,
}

impl<W: Write + Seek> CanonicalSink<W> {
    fn new(out: W) -> Result<Self, ConversionError> {
        let writer = WavWriter::new(out, wav::canonical_spec()).map_err(encoding)?;
        Ok(Self {
            writer,
            source_rate: None,
            converter: None,
            interleaved: None,
            mono: Vec::new(),
            frames_written: 0,
        })
    }

    fn push(&mut self, decoded: AudioBufferRef<'_>) -> Result<(), ConversionError> {
        let spec = *decoded.spec();
        if decoded.frames() == 0 {
            return Ok(());
        }

        match self.source_rate {
            None => {
                self.source_rate = Some(spec.rate);
                if spec.rate != CANONICAL_SAMPLE_RATE {
                    self.converter = Some(RateConverter::new(spec.rate)?);
                }
            }
            Some(rate) if rate != spec.rate => {
                return Err(ConversionError::DecodingFailed(format!(
                    "sample rate changed mid-stream from {} to {} Hz",
                    rate, spec.rate
                )));
            }
            Some(_) => {}
        }

        let channels = spec.channels.count().max(1);
        let needed = decoded.capacity() * channels;
        if self.interleaved.as_ref().is_none_or(|b| b.capacity() < needed) {
            self.interleaved = Some(SampleBuffer::new(decoded.capacity() as u64, spec));
        }
        let Some(interleaved) = self.interleaved.as_mut() else {
            return Ok(());
        };
        interleaved.copy_interleaved_ref(decoded);

        self.mono.clear();
        self.mono.extend(
            interleaved
                .samples()
                .chunks_exact(channels)
                .map(|frame| frame.iter().sum::<f32>() / channels as f32),
        );

        self.frames_written += match self.converter.as_mut() {
            Some(converter) => write_pcm(&mut self.writer, &converter.push(&self.mono)?)?,
            None => write_pcm(&mut self.writer, &self.mono)?,
        };
        Ok(())
    }

    /// Flushes the resampler tail and finalizes the WAV header.
    fn finish(mut self) -> Result<u32, ConversionError> {
        if self.source_rate.is_none() {
            return Err(ConversionError::DecodingFailed(
                "no audio samples decoded".to_string(),
            ));
        }
        if let Some(converter) = self.converter.take() {
            self.frames_written += write_pcm(&mut self.writer, &converter.finish()?)?;
        }

        let frames = self.frames_written;
        self.writer.finalize().map_err(encoding)?;
        Ok(frames)
    }
}

/// Streaming mono rate conversion to the canonical rate. Input is buffered to
/// the resampler's fixed chunk size; the short final chunk goes through
/// `process_partial`. The resampler's output delay is dropped from the front
/// so output stays aligned with input.
struct RateConverter {
    resampler: SincFixedIn<f32>,
    ratio: f64,
    pending: Vec<f32>,
    delay_left: usize,
    frames_in: usize,
    frames_out: usize,
}

impl RateConverter {
    fn new(source_rate: u32) -> Result<Self, ConversionError> {
        let params = SincInterpolationParameters {
            sinc_len: 128,
            f_cutoff: 0.9,
            interpolation: SincInterpolationType::Cubic,
            oversampling_factor: 128,
            window: WindowFunction::Blackman2,
        };
        let ratio = CANONICAL_SAMPLE_RATE as f64 / source_rate as f64;
        let resampler = SincFixedIn::<f32>::new(ratio, 1.0, params, RESAMPLER_CHUNK, 1)
            .map_err(|e| ConversionError::DecodingFailed(format!("resampler: {}", e)))?;
        let delay_left = resampler.output_delay();

        Ok(Self {
            resampler,
            ratio,
            pending: Vec::with_capacity(RESAMPLER_CHUNK * 2),
            delay_left,
            frames_in: 0,
            frames_out: 0,
        })
    }

    fn push(&mut self, samples: &[f32]) -> Result<Vec<f32>, ConversionError> {
        self.frames_in += samples.len();
        self.pending.extend_from_slice(samples);

        let mut out = Vec::new();
        loop {
            let chunk = self.resampler.input_frames_next();
            if self.pending.len() < chunk {
                break;
            }
            let produced = self
                .resampler
                .process(&[&self.pending[..chunk]], None)
                .map_err(resampling)?;
            self.pending.drain(..chunk);
            self.keep(produced, &mut out);
        }
        Ok(out)
    }

    fn finish(mut self) -> Result<Vec<f32>, ConversionError> {
        let expected = (self.frames_in as f64 * self.ratio).round() as usize;
        let mut out = Vec::new();

        if !self.pending.is_empty() {
            let tail: &[f32] = &self.pending;
            let produced = self
                .resampler
                .process_partial(Some(&[tail][..]), None)
                .map_err(resampling)?;
            self.pending.clear();
            self.keep(produced, &mut out);
        }

        // Zero-fed flushes push the delayed tail of real samples out.
        while self.frames_out < expected {
            let produced = self
                .resampler
                .process_partial(None::<&[&[f32]]>, None)
                .map_err(resampling)?;
            if produced.first().is_none_or(|channel| channel.is_empty()) {
                break;
            }
            self.keep(produced, &mut out);
        }

        let excess = self.frames_out.saturating_sub(expected);
        out.truncate(out.len().saturating_sub(excess));
        Ok(out)
    }

    fn keep(&mut self, mut produced: Vec<Vec<f32>>, out: &mut Vec<f32>) {
        let Some(channel) = produced.pop() else {
            return;
        };
        let skip = self.delay_left.min(channel.len());
        self.delay_left -= skip;
        self.frames_out += channel.len() - skip;
        out.extend_from_slice(&channel[skip..]);
    }
}

fn write_pcm<W: Write + Seek>(
    writer: &mut WavWriter<W>,
    samples: &[f32],
) -> Result<u32, ConversionError> {
    for &sample in samples {
        writer.write_sample(wav::pcm16(sample)).map_err(encoding)?;
    }
    Ok(samples.len() as u32)
}

fn decoding(step: &str, e: SymphoniaError) -> ConversionError {
    ConversionError::DecodingFailed(format!("{}: {}", step, e))
}

fn encoding(e: hound::Error) -> ConversionError {
    ConversionError::TranscoderFailed(format!("wav: {}", e))
}

fn resampling(e: rubato::ResampleError) -> ConversionError {
    ConversionError::TranscoderFailed(format!("resample: {}", e))
}
