//! IQ Capture Files
//!
//! Two on-disk layouts are supported:
//! - Stereo 16-bit PCM WAV: left channel = I, right channel = Q (raw lane
//!   values at `GAIN` scale)
//! - Raw bus words: little-endian `u32`, low 16 bits = I, high 16 bits = Q

use std::fs;
use std::path::{Path, PathBuf};

use hound::{SampleFormat, WavReader, WavSpec, WavWriter};
use snafu::{ensure, ResultExt, Snafu};
use tracing::debug;

use crate::fixed::{ComplexSample, FixedFormat};

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum IqFileError {
    #[snafu(display("WAV error on {}: {}", path.display(), source))]
    Wav { path: PathBuf, source: hound::Error },

    #[snafu(display(
        "{} must be stereo 16-bit integer PCM, got {} channel(s) at {} bits",
        path.display(),
        channels,
        bits_per_sample
    ))]
    UnsupportedWav {
        path: PathBuf,
        channels: u16,
        bits_per_sample: u16,
    },

    #[snafu(display("I/O error on {}: {}", path.display(), source))]
    Io { path: PathBuf, source: std::io::Error },

    #[snafu(display("{} is {} bytes, not a whole number of 32-bit words", path.display(), len))]
    PartialWord { path: PathBuf, len: usize },
}

/// Read a stereo 16-bit WAV as IQ16 samples
pub fn read_iq_wav(path: impl AsRef<Path>) -> Result<Vec<ComplexSample>, IqFileError> {
    let path = path.as_ref();
    let mut reader = WavReader::open(path).context(WavSnafu { path })?;
    let spec = reader.spec();
    ensure!(
        spec.channels == 2 && spec.bits_per_sample == 16 && spec.sample_format == SampleFormat::Int,
        UnsupportedWavSnafu {
            path,
            channels: spec.channels,
            bits_per_sample: spec.bits_per_sample
        }
    );

    let raw: Vec<i16> = reader
        .samples::<i16>()
        .collect::<Result<Vec<i16>, _>>()
        .context(WavSnafu { path })?;
    let samples: Vec<ComplexSample> = raw
        .chunks_exact(2)
        .map(|iq| ComplexSample::from_raw(iq[0] as i64, iq[1] as i64, FixedFormat::IQ16))
        .collect();

    debug!(path = %path.display(), samples = samples.len(), sample_rate = spec.sample_rate, "read IQ WAV");
    Ok(samples)
}

/// Write IQ samples as a stereo 16-bit WAV (lanes saturated to 16 bits)
pub fn write_iq_wav(
    path: impl AsRef<Path>,
    samples: &[ComplexSample],
    sample_rate: u32,
) -> Result<(), IqFileError> {
    let path = path.as_ref();
    let spec = WavSpec {
        channels: 2,
        sample_rate,
        bits_per_sample: 16,
        sample_format: SampleFormat::Int,
    };

    let mut writer = WavWriter::create(path, spec).context(WavSnafu { path })?;
    for sample in samples {
        let i = sample.i.convert(FixedFormat::IQ16).raw();
        let q = sample.q.convert(FixedFormat::IQ16).raw();
        writer.write_sample(i as i16).context(WavSnafu { path })?;
        writer.write_sample(q as i16).context(WavSnafu { path })?;
    }
    writer.finalize().context(WavSnafu { path })?;

    debug!(path = %path.display(), samples = samples.len(), "wrote IQ WAV");
    Ok(())
}

/// Read a raw file of little-endian bus words
pub fn read_bus_words(path: impl AsRef<Path>) -> Result<Vec<u32>, IqFileError> {
    let path = path.as_ref();
    let bytes = fs::read(path).context(IoSnafu { path })?;
    ensure!(
        bytes.len() % 4 == 0,
        PartialWordSnafu {
            path,
            len: bytes.len()
        }
    );
    Ok(bytes
        .chunks_exact(4)
        .map(|b| u32::from_le_bytes([b[0], b[1], b[2], b[3]]))
        .collect())
}

/// Write bus words as little-endian `u32`
pub fn write_bus_words(path: impl AsRef<Path>, words: &[u32]) -> Result<(), IqFileError> {
    let path = path.as_ref();
    let bytes: Vec<u8> = words.iter().flat_map(|w| w.to_le_bytes()).collect();
    fs::write(path, bytes).context(IoSnafu { path })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("rustyrx_{}_{}", std::process::id(), name))
    }

    #[test]
    fn test_wav_round_trip() {
        let path = temp_path("round_trip.wav");
        let samples: Vec<ComplexSample> = [(0, 0), (1024, -1024), (32767, -32768), (-7, 9)]
            .iter()
            .map(|&(i, q)| ComplexSample::from_raw(i, q, FixedFormat::IQ16))
            .collect();

        write_iq_wav(&path, &samples, 64_000_000).unwrap();
        let back = read_iq_wav(&path).unwrap();
        fs::remove_file(&path).ok();

        assert_eq!(back, samples);
    }

    #[test]
    fn test_mono_wav_rejected() {
        let path = temp_path("mono.wav");
        let spec = WavSpec {
            channels: 1,
            sample_rate: 8000,
            bits_per_sample: 16,
            sample_format: SampleFormat::Int,
        };
        let mut writer = WavWriter::create(&path, spec).unwrap();
        writer.write_sample(1i16).unwrap();
        writer.finalize().unwrap();

        let result = read_iq_wav(&path);
        fs::remove_file(&path).ok();
        assert!(matches!(
            result,
            Err(IqFileError::UnsupportedWav { channels: 1, .. })
        ));
    }

    #[test]
    fn test_bus_words_round_trip() {
        let path = temp_path("words.bin");
        let words = [0x0002_FFFFu32, 0x8000_7FFF, 0];
        write_bus_words(&path, &words).unwrap();
        let back = read_bus_words(&path).unwrap();
        fs::remove_file(&path).ok();
        assert_eq!(back, words);
    }

    #[test]
    fn test_partial_word_rejected() {
        let path = temp_path("partial.bin");
        fs::write(&path, [1u8, 2, 3]).unwrap();
        let result = read_bus_words(&path);
        fs::remove_file(&path).ok();
        assert!(matches!(result, Err(IqFileError::PartialWord { len: 3, .. })));
    }

    #[test]
    fn test_missing_file() {
        assert!(matches!(
            read_bus_words(temp_path("does_not_exist.bin")),
            Err(IqFileError::Io { .. })
        ));
    }
}
