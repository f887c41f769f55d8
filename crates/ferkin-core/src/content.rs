use alloc::borrow::Cow;

const UTF8_BOM: &[u8] = &[0xEF, 0xBB, 0xBF];

/// Line terminator of the source file, captured before
/// normalization and re-applied on output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineEnding {
    Lf,
    CrLf,
    Cr,
}

#[derive(Debug, thiserror::Error)]
pub enum ContentError {
    #[error("unable to decode {charset} input")]
    Charset { charset: &'static str },
}

/// Byte-level properties of a source file that survive formatting:
/// charset, UTF-8 BOM, line terminator.
#[derive(Debug, Clone)]
pub struct ContentSettings {
    line_ending: LineEnding,
    has_bom: bool,
    charset: &'static str,
}

impl ContentSettings {
    /// Detect the input's charset, BOM, and line terminator, and
    /// return the settings together with normalized content:
    /// UTF-8, no BOM, `\n` line endings.
    ///
    /// # Errors
    ///
    /// Returns [`ContentError::Charset`] when the detected encoding
    /// cannot decode the input cleanly.
    pub fn prepare(bytes: &[u8]) -> Result<(Self, String), ContentError> {
        let mut detector = chardetng::EncodingDetector::new();
        detector.feed(bytes, true);
        let encoding = detector.guess(None, true);

        let (decoded, had_errors) = encoding.decode_with_bom_removal(bytes);
        if had_errors {
            return Err(ContentError::Charset {
                charset: encoding.name(),
            });
        }

        let line_ending = if decoded.contains("\r\n") {
            LineEnding::CrLf
        } else if decoded.contains('\r') {
            LineEnding::Cr
        } else {
            LineEnding::Lf
        };

        let settings = Self {
            line_ending,
            has_bom: bytes.starts_with(UTF8_BOM),
            charset: encoding.name(),
        };
        tracing::debug!(
            charset = settings.charset,
            bom = settings.has_bom,
            "prepared source content"
        );

        let normalized = match line_ending {
            LineEnding::Lf => decoded.into_owned(),
            LineEnding::CrLf => decoded.replace("\r\n", "\n"),
            LineEnding::Cr => decoded.replace('\r', "\n"),
        };
        Ok((settings, normalized))
    }

    /// Re-apply the captured BOM and line terminator to formatted
    /// content. Output is always UTF-8 regardless of the source
    /// charset.
    pub fn restore(&self, content: &str) -> Vec<u8> {
        let text: Cow<'_, str> = match self.line_ending {
            LineEnding::Lf => Cow::Borrowed(content),
            LineEnding::CrLf => Cow::Owned(content.replace('\n', "\r\n")),
            LineEnding::Cr => Cow::Owned(content.replace('\n', "\r")),
        };

        let mut out = Vec::with_capacity(text.len() + UTF8_BOM.len());
        if self.has_bom {
            out.extend_from_slice(UTF8_BOM);
        }
        out.extend_from_slice(text.as_bytes());
        out
    }

    pub fn line_ending(&self) -> LineEnding {
        self.line_ending
    }

    pub fn has_bom(&self) -> bool {
        self.has_bom
    }

    pub fn charset(&self) -> &'static str {
        self.charset
    }
}
