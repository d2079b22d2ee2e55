use crate::backup::compress::{Compressor, CompressorBuilder};
use crate::backup::result_error::result::Result;
use liblzma::stream::{Check, MtStreamBuilder};
use liblzma::write::XzEncoder;
use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;
use std::io::Write;
use validator::Validate;

/// Default compression level (balance of speed vs size)
static DEFAULT_COMPRESSION_LEVEL: u32 = 6;

/// Configuration for XZ (LZMA) compression
///
/// Runs on the calling thread unless `thread` asks for more.
#[skip_serializing_none]
#[derive(Clone, Default, Validate, Serialize, Deserialize, Debug)]
#[serde(deny_unknown_fields)]
pub struct XzConfig {
    /// Compression level (0-9)
    #[validate(range(min = 0, max = 9))]
    level: Option<u32>,

    /// Number of compression threads, 1 when unset
    #[validate(range(min = 1))]
    thread: Option<u32>,
}

impl<W: Write> CompressorBuilder<W> for XzConfig {
    fn build_compressor(&self, writer: W) -> Result<Compressor<W>> {
        let level = self.level.unwrap_or(DEFAULT_COMPRESSION_LEVEL);
        let thread = self.thread.unwrap_or(1);

        tracing::debug!("Creating XZ compressor with level={}, threads={}", level, thread);

        if thread == 1 {
            Ok(XzEncoder::new(writer, level).into())
        } else {
            let stream = MtStreamBuilder::new()
                .preset(level)
                .check(Check::Crc64)
                .threads(thread)
                .encoder()?;
            Ok(XzEncoder::new_stream(writer, stream).into())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use liblzma::read::XzDecoder;
    use std::io::{Cursor, Read};

    fn compress_and_decompress(config: XzConfig, data: &[u8]) -> Vec<u8> {
        let mut compressor = config.build_compressor(Cursor::new(Vec::new())).unwrap();
        compressor.write_all(data).unwrap();
        let compressed = compressor.finish().unwrap().into_inner();

        let mut decompressed = Vec::new();
        XzDecoder::new(compressed.as_slice())
            .read_to_end(&mut decompressed)
            .unwrap();
        decompressed
    }

    #[test]
    fn test_xz_config_default() {
        let config = XzConfig::default();
        assert!(config.level.is_none());
        assert!(config.thread.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_xz_config_invalid_level() {
        let config = XzConfig { level: Some(10), thread: Some(1) };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_xz_config_invalid_thread() {
        let config = XzConfig { level: Some(5), thread: Some(0) };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_single_thread_compression_is_readable() {
        let data = b"backup me ".repeat(100);
        let out = compress_and_decompress(XzConfig { level: Some(1), thread: None }, &data);
        assert_eq!(out, data);
    }

    #[test]
    fn test_multi_thread_compression_is_readable() {
        let data = b"backup me too ".repeat(100);
        let out = compress_and_decompress(XzConfig { level: Some(3), thread: Some(2) }, &data);
        assert_eq!(out, data);
    }
}
