pub mod xz;

use crate::backup::result_error::result::Result;
use crate::backup::result_error::ErrorContext;
use derive_more::From;
use io_enum::Write;
use liblzma::write::XzEncoder;
use serde::{Deserialize, Serialize};
use std::io;
use std::io::Write;
use std::result;
use validator::{Validate, ValidationErrors};

/// Writer the tar stream goes through before reaching the archive file.
#[derive(Write, From)]
pub enum Compressor<W: Write> {
    None(W),
    XzEncoder(XzEncoder<W>),
}

impl<W: Write> Compressor<W> {
    /// Flushes any trailing compressed data and hands back the inner writer.
    pub fn finish(self) -> io::Result<W> {
        match self {
            Compressor::None(w) => Ok(w),
            Compressor::XzEncoder(w) => w.finish(),
        }
    }
}

/// Compression applied to the tar stream of every source archive.
///
/// Defaults to single threaded xz so that a run stays on one core.
#[derive(Clone, From, Serialize, Deserialize, Debug)]
#[serde(tag = "compressor_type")]
#[serde(rename_all = "snake_case")]
#[serde(deny_unknown_fields)]
pub enum CompressorConfig {
    None,
    Xz(xz::XzConfig),
}

impl Default for CompressorConfig {
    fn default() -> Self {
        Self::Xz(xz::XzConfig::default())
    }
}

impl Validate for CompressorConfig {
    fn validate(&self) -> result::Result<(), ValidationErrors> {
        match self {
            CompressorConfig::None => Ok(()),
            CompressorConfig::Xz(xz) => xz.validate(),
        }
    }
}

pub trait CompressorBuilder<W: Write> {
    fn build_compressor(&self, writer: W) -> Result<Compressor<W>>;
}

impl<W: Write> CompressorBuilder<W> for CompressorConfig {
    fn build_compressor(&self, writer: W) -> Result<Compressor<W>> {
        match self {
            CompressorConfig::None => {
                tracing::debug!("Writing uncompressed tar stream");
                Ok(Compressor::None(writer))
            }
            CompressorConfig::Xz(xz) => xz.build_compressor(writer),
        }
        .with_debug_object(self.clone(), "build_compressor")
    }
}

impl CompressorConfig {
    /// Extension of the finished archive, tar container included.
    pub fn archive_ext(&self) -> &'static str {
        match self {
            CompressorConfig::None => "tar",
            CompressorConfig::Xz(_) => "tar.xz",
        }
    }
}
