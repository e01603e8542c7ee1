use bytes::Bytes;

/// An uploaded recording as received, before any decoding.
#[derive(Debug, Clone, PartialEq)]
pub struct AudioBlob {
    pub data: Bytes,
    pub content_type: Option<String>,
    pub filename: Option<String>,
}

impl AudioBlob {
    pub fn new(
        data: impl Into<Bytes>,
        content_type: Option<String>,
        filename: Option<String>,
    ) -> Self {
        Self {
            data: data.into(),
            content_type,
            filename,
        }
    }

    pub fn size_bytes(&self) -> u64 {
        self.data.len() as u64
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Declared container, MIME type first and file extension second.
    pub fn container(&self) -> AudioContainer {
        self.content_type
            .as_deref()
            .and_then(AudioContainer::from_mime)
            .or_else(|| {
                self.filename
                    .as_deref()
                    .and_then(|name| name.rsplit_once('.'))
                    .and_then(|(_, ext)| AudioContainer::from_extension(ext))
            })
            .unwrap_or(AudioContainer::Unknown)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AudioContainer {
    Wav,
    Webm,
    Ogg,
    Mp4,
    Mpeg,
    Flac,
    Unknown,
}

impl AudioContainer {
    pub fn from_mime(mime: &str) -> Option<Self> {
        // Browsers append codec parameters, e.g. "audio/webm;codecs=opus".
        let essence = mime.split(';').next().unwrap_or(mime).trim();
        match essence.to_ascii_lowercase().as_str() {
            "audio/wav" | "audio/wave" | "audio/x-wav" | "audio/vnd.wave" => Some(Self::Wav),
            "audio/webm" | "video/webm" => Some(Self::Webm),
            "audio/ogg" | "audio/opus" | "application/ogg" => Some(Self::Ogg),
            "audio/mp4" | "audio/m4a" | "audio/x-m4a" | "audio/aac" | "video/mp4" => {
                Some(Self::Mp4)
            }
            "audio/mpeg" | "audio/mp3" => Some(Self::Mpeg),
            "audio/flac" | "audio/x-flac" => Some(Self::Flac),
            _ => None,
        }
    }

    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "wav" | "wave" => Some(Self::Wav),
            "webm" => Some(Self::Webm),
            "ogg" | "oga" | "opus" => Some(Self::Ogg),
            "mp4" | "m4a" | "aac" => Some(Self::Mp4),
            "mp3" => Some(Self::Mpeg),
            "flac" => Some(Self::Flac),
            _ => None,
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            Self::Wav => "wav",
            Self::Webm => "webm",
            Self::Ogg => "ogg",
            Self::Mp4 => "m4a",
            Self::Mpeg => "mp3",
            Self::Flac => "flac",
            Self::Unknown => "bin",
        }
    }
}
