//! Gzip decoding of staged sitemap files

use flate2::read::MultiGzDecoder;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// First two bytes of every gzip member
pub const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

/// Errors that can occur while decompressing an archive
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("{} is not gzip data", .path.display())]
    NotGzip { path: PathBuf },

    #[error("Corrupt gzip stream in {}: {source}", .path.display())]
    Corrupt {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("IO error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

fn has_gz_extension(path: &Path) -> bool {
    path.extension().map_or(false, |ext| ext == "gz")
}

/// Where the decoded copy of `path` is written
///
/// `sitemap.xml.gz` decodes to `sitemap.xml`; a file without the `.gz`
/// suffix decodes to `<name>.decoded` so it never overwrites its input.
pub fn decoded_path(path: &Path) -> PathBuf {
    if has_gz_extension(path) {
        path.with_extension("")
    } else {
        let mut name = path.as_os_str().to_owned();
        name.push(".decoded");
        PathBuf::from(name)
    }
}

/// Decompresses a single-file gzip archive next to itself
///
/// Input without the gzip magic bytes is rejected outright rather than
/// passed through.
///
/// # Returns
///
/// * `Ok(PathBuf)` - Path of the decompressed sibling file
/// * `Err(DecodeError)` - The file is missing, not gzip, or corrupt
pub fn decode_file(path: &Path) -> Result<PathBuf, DecodeError> {
    if !has_gz_extension(path) {
        tracing::warn!(
            "{} does not have a .gz extension; decoding anyway",
            path.display()
        );
    }

    let io_err = |source| DecodeError::Io {
        path: path.to_path_buf(),
        source,
    };

    let mut reader = BufReader::new(File::open(path).map_err(io_err)?);

    let mut compressed = Vec::new();
    reader.read_to_end(&mut compressed).map_err(io_err)?;

    if !compressed.starts_with(&GZIP_MAGIC) {
        return Err(DecodeError::NotGzip {
            path: path.to_path_buf(),
        });
    }

    let mut data = Vec::new();
    // Concatenated members decode as one stream
    MultiGzDecoder::new(compressed.as_slice())
        .read_to_end(&mut data)
        .map_err(|source| DecodeError::Corrupt {
            path: path.to_path_buf(),
            source,
        })?;

    let output = decoded_path(path);
    std::fs::write(&output, &data).map_err(|source| DecodeError::Io {
        path: output.clone(),
        source,
    })?;

    tracing::debug!(
        "Decoded {} ({} -> {} bytes)",
        path.display(),
        compressed.len(),
        data.len()
    );
    Ok(output)
}
