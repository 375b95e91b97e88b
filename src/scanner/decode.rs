use crate::models::{ContainerKind, StreamInfo};
use lofty::config::ParseOptions;
use lofty::error::{ErrorKind, LoftyError};
use lofty::file::{AudioFile, FileType, TaggedFile, TaggedFileExt};
use lofty::id3::v2::Id3v2Version;
use lofty::iff::wav::WavFile;
use lofty::mpeg::MpegFile;
use lofty::probe::Probe;
use lofty::tag::Tag;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DecodeError {
    /// The container type was identified but its structure is broken.
    #[error("malformed {kind} file: {message}")]
    Malformed { kind: ContainerKind, message: String },
    #[error("unreadable file: {0}")]
    Unreadable(String),
    #[error("unrecognized audio format")]
    Unrecognized,
}

/// Everything the decoder knows about one file, before normalization.
#[derive(Clone)]
pub struct DecodedFile {
    pub kind: ContainerKind,
    pub stream: StreamInfo,
    /// All tags found in the file, in the order the decoder reports them.
    pub tags: Vec<Tag>,
    /// Version of the ID3v2 tag as stored on disk (mp3 and wave only).
    pub id3_version: Option<String>,
}

// lofty's Tag has no Debug impl
impl std::fmt::Debug for DecodedFile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DecodedFile")
            .field("kind", &self.kind)
            .field("stream", &self.stream)
            .field("tags", &self.tags.len())
            .field("id3_version", &self.id3_version)
            .finish()
    }
}

/// Reads container type, stream properties and tags from an audio file.
pub trait TagDecoder {
    fn decode(&self, path: &Path) -> Result<DecodedFile, DecodeError>;
}

/// Production decoder backed by lofty.
#[derive(Debug, Default, Clone, Copy)]
pub struct LoftyDecoder;

impl TagDecoder for LoftyDecoder {
    fn decode(&self, path: &Path) -> Result<DecodedFile, DecodeError> {
        let probe = Probe::open(path)
            .map_err(|e| DecodeError::Unreadable(e.to_string()))?
            .guess_file_type()
            .map_err(|e| DecodeError::Unreadable(e.to_string()))?;

        // Content sniffing falls back to the extension when it can't decide.
        let Some(file_type) = probe.file_type() else {
            return Err(DecodeError::Unrecognized);
        };
        let kind = container_kind(&file_type);
        let options = ParseOptions::new();

        let (tagged, id3_version) = match file_type {
            FileType::Mpeg => {
                let mut reader = probe.into_inner();
                let mpeg = MpegFile::read_from(&mut reader, options)
                    .map_err(|e| malformed(&kind, e))?;
                let version = mpeg.id3v2().map(|t| id3_version_string(t.original_version()));
                (TaggedFile::from(mpeg), version)
            }
            FileType::Wav => {
                let mut reader = probe.into_inner();
                let wav = WavFile::read_from(&mut reader, options)
                    .map_err(|e| classify_error(&kind, e))?;
                let version = wav.id3v2().map(|t| id3_version_string(t.original_version()));
                (TaggedFile::from(wav), version)
            }
            _ => {
                let tagged = probe
                    .options(options)
                    .read()
                    .map_err(|e| classify_error(&kind, e))?;
                (tagged, None)
            }
        };

        Ok(DecodedFile {
            kind,
            stream: stream_info(&tagged),
            tags: tagged.tags().to_vec(),
            id3_version,
        })
    }
}

fn container_kind(file_type: &FileType) -> ContainerKind {
    match file_type {
        FileType::Mpeg => ContainerKind::Mp3,
        FileType::Flac => ContainerKind::Flac,
        FileType::Vorbis => ContainerKind::OggVorbis,
        FileType::Wav => ContainerKind::Wave,
        other => ContainerKind::Other(format!("{other:?}").to_lowercase()),
    }
}

fn stream_info(tagged: &TaggedFile) -> StreamInfo {
    let props = tagged.properties();
    let secs = props.duration().as_secs_f64();
    StreamInfo {
        duration_secs: if secs > 0.0 { Some(secs) } else { None },
        sample_rate: props.sample_rate(),
        channels: props.channels(),
        bitrate: props.audio_bitrate().or_else(|| props.overall_bitrate()),
    }
}

fn id3_version_string(version: Id3v2Version) -> String {
    match version {
        Id3v2Version::V2 => "2.2.0",
        Id3v2Version::V3 => "2.3.0",
        Id3v2Version::V4 => "2.4.0",
    }
    .to_string()
}

/// Every failure inside an MPEG read is a broken mp3 (bad frames, bad ID3).
fn malformed(kind: &ContainerKind, err: LoftyError) -> DecodeError {
    DecodeError::Malformed {
        kind: kind.clone(),
        message: err.to_string(),
    }
}

fn classify_error(kind: &ContainerKind, err: LoftyError) -> DecodeError {
    match err.kind() {
        ErrorKind::UnknownFormat => DecodeError::Unrecognized,
        ErrorKind::Io(_) => DecodeError::Unreadable(err.to_string()),
        _ => malformed(kind, err),
    }
}
