//! Shared types used across the pipeline.

use std::fmt;

/// Raster format written for every generated size.
///
/// Both formats are always produced, PNG first. [`OutputFormat::ALL`] fixes
/// that order, and its length is the per-size file multiplier in the batch
/// progress denominator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OutputFormat {
    Png,
    Jpg,
}

impl OutputFormat {
    /// Every output format, in processing order.
    pub const ALL: [OutputFormat; 2] = [OutputFormat::Png, OutputFormat::Jpg];

    /// File extension without the leading dot.
    pub fn extension(self) -> &'static str {
        match self {
            OutputFormat::Png => "png",
            OutputFormat::Jpg => "jpg",
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn png_comes_before_jpg() {
        assert_eq!(OutputFormat::ALL, [OutputFormat::Png, OutputFormat::Jpg]);
    }

    #[test]
    fn extensions() {
        assert_eq!(OutputFormat::Png.extension(), "png");
        assert_eq!(OutputFormat::Jpg.extension(), "jpg");
        assert_eq!(OutputFormat::Jpg.to_string(), "jpg");
    }
}
