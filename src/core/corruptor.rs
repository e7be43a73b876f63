use crate::domain::model::{CorruptionStats, Semantics};
use crate::utils::error::{FlipError, Result};
use rand::Rng;
use std::fs::{self, File};
use std::io::{ErrorKind, Read, Write};
use std::path::Path;
use tempfile::{Builder, NamedTempFile};

pub const DEFAULT_BUFFER_SIZE: usize = 64 * 1024;
pub const MAX_BUFFER_SIZE: usize = 64 * 1024 * 1024;

/// Inverts one uniformly chosen bit of `byte`.
pub fn flip_random_bit<R: Rng + ?Sized>(rng: &mut R, byte: u8) -> u8 {
    let bit_position = rng.gen_range(0..8u8);
    byte ^ (1 << bit_position)
}

/// Applies single-bit upsets to a byte stream.
///
/// Every byte consumes one uniform draw, and a selected byte consumes one
/// more for its bit index. The draw order is the byte order, so buffer size
/// never changes the output for a given RNG state.
pub struct Corruptor<R: Rng> {
    rng: R,
    semantics: Semantics,
    buffer_size: usize,
}

impl<R: Rng> Corruptor<R> {
    pub fn new(rng: R, semantics: Semantics) -> Self {
        Self {
            rng,
            semantics,
            buffer_size: DEFAULT_BUFFER_SIZE,
        }
    }

    pub fn with_buffer_size(mut self, buffer_size: usize) -> Self {
        self.buffer_size = buffer_size.clamp(1, MAX_BUFFER_SIZE);
        self
    }

    pub fn semantics(&self) -> Semantics {
        self.semantics
    }

    /// Chance that a single byte is hit. Per-bit semantics use `8p`, which
    /// only approximates `1 - (1 - p)^8` for small `p`; at most one bit is
    /// ever flipped per byte.
    pub fn byte_chance(&self, probability: f64) -> f64 {
        match self.semantics {
            Semantics::PerBit => probability * 8.0,
            Semantics::PerByte => probability,
        }
    }

    pub fn corrupt_byte(&mut self, byte: u8, chance: f64) -> (u8, bool) {
        if self.rng.gen::<f64>() < chance {
            (flip_random_bit(&mut self.rng, byte), true)
        } else {
            (byte, false)
        }
    }

    /// Corrupts `buf` in place and returns how many bytes were changed.
    pub fn corrupt_slice(&mut self, buf: &mut [u8], chance: f64) -> u64 {
        let mut flipped = 0;
        for byte in buf.iter_mut() {
            let (value, hit) = self.corrupt_byte(*byte, chance);
            *byte = value;
            flipped += u64::from(hit);
        }
        flipped
    }

    pub fn transform<I: Read, O: Write>(
        &mut self,
        mut input: I,
        mut output: O,
        probability: f64,
    ) -> Result<CorruptionStats> {
        let chance = self.byte_chance(probability);
        let mut buf = vec![0u8; self.buffer_size];
        let mut stats = CorruptionStats::default();

        loop {
            let n = match input.read(&mut buf) {
                Ok(0) => break,
                Ok(n) => n,
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            };

            stats.bytes_flipped += self.corrupt_slice(&mut buf[..n], chance);
            stats.bytes_processed += n as u64;
            output.write_all(&buf[..n])?;
        }

        output.flush()?;
        tracing::debug!(
            "Processed {} bytes, flipped {}",
            stats.bytes_processed,
            stats.bytes_flipped
        );
        Ok(stats)
    }
}

/// Copies `input_path` to `output_path` through the corruptor.
///
/// The output is staged next to its destination and renamed into place only
/// after the whole stream succeeded, so a failed run leaves any existing
/// output untouched.
pub fn corrupt_file<R: Rng>(
    input_path: &Path,
    output_path: &Path,
    probability: f64,
    corruptor: &mut Corruptor<R>,
) -> Result<CorruptionStats> {
    let input = File::open(input_path).map_err(|e| match e.kind() {
        ErrorKind::NotFound => FlipError::NotFoundError {
            path: input_path.display().to_string(),
        },
        _ => FlipError::IoError(e),
    })?;

    let parent = match output_path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    fs::create_dir_all(parent)?;

    let mut staged = stage_output(parent, output_path)?;
    tracing::debug!("Staging output in {}", staged.path().display());

    let stats = corruptor.transform(input, staged.as_file_mut(), probability)?;

    staged
        .persist(output_path)
        .map_err(|e| FlipError::IoError(e.error))?;

    Ok(stats)
}

/// Creates the staging file. An existing output keeps its mode; a new one
/// gets 0o666 under the umask, as a plain create would.
fn stage_output(parent: &Path, output_path: &Path) -> Result<NamedTempFile> {
    let existing = fs::metadata(output_path).ok().map(|m| m.permissions());

    let mut builder = Builder::new();
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        if existing.is_none() {
            builder.permissions(fs::Permissions::from_mode(0o666));
        }
    }

    let staged = builder.tempfile_in(parent)?;
    if let Some(permissions) = existing {
        staged.as_file().set_permissions(permissions)?;
    }
    Ok(staged)
}
