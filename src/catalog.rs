//! The print size catalog.
//!
//! Every source image is rendered at a fixed set of physical print sizes,
//! grouped into ratio families. Which set applies depends only on the source
//! orientation:
//!
//! ```text
//! vertical (h > w)             horizontal (w >= h)
//! 2:3    4x6 … 24x36           3:2    6x4 … 36x24
//! 4:5    4x5 … 24x30           5:4    5x4 … 30x24
//! ISO    A5 … A0               ISO    A5 … A0 (landscape)
//! 11x14  11x14                 14x11  14x11
//! ```
//!
//! Family order and size order inside a family are the processing order.
//!
//! ## Size Labels
//!
//! Output files are suffixed with a size label. ISO sizes get their paper
//! code (`A4`); every other size gets `{width}x{height}` in inches (`20x30`,
//! `8.5x11`). The ISO table is an ordered list matched with a small epsilon,
//! so a size computed at runtime still finds its code.
//!
//! ## Square Sources
//!
//! A source with `width == height` uses the horizontal catalog.

use crate::types::OutputFormat;
use std::fmt;
use std::sync::LazyLock;

/// Tolerance for matching a size against the ISO label table, in inches.
const LABEL_EPSILON: f64 = 1e-6;

/// A physical print size in inches.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SizeSpec {
    pub width: f64,
    pub height: f64,
}

impl SizeSpec {
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// Width-to-height ratio.
    pub fn ratio(self) -> f64 {
        self.width / self.height
    }

    /// The same size turned 90 degrees.
    pub fn rotated(self) -> Self {
        Self::new(self.height, self.width)
    }

    fn approx_eq(self, other: SizeSpec) -> bool {
        (self.width - other.width).abs() < LABEL_EPSILON
            && (self.height - other.height).abs() < LABEL_EPSILON
    }
}

/// Which half of the catalog applies to a source image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orientation {
    Vertical,
    Horizontal,
}

impl Orientation {
    /// Orientation of a `width` × `height` source. Square sources are horizontal.
    pub fn of(width: u32, height: u32) -> Self {
        if height > width {
            Orientation::Vertical
        } else {
            Orientation::Horizontal
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Orientation::Vertical => "vertical",
            Orientation::Horizontal => "horizontal",
        }
    }
}

impl fmt::Display for Orientation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A named, ordered group of print sizes, e.g. `"2:3"` or `"ISO"`.
#[derive(Debug, Clone, PartialEq)]
pub struct RatioFamily {
    pub name: String,
    pub sizes: Vec<SizeSpec>,
}

impl RatioFamily {
    pub fn new(name: impl Into<String>, sizes: Vec<SizeSpec>) -> Self {
        Self {
            name: name.into(),
            sizes,
        }
    }
}

/// Exact-size → paper code table (A0–A5, both orientations).
#[derive(Debug, Clone, PartialEq)]
pub struct IsoLabelTable {
    entries: Vec<(SizeSpec, &'static str)>,
}

impl IsoLabelTable {
    /// Build a table from portrait entries; landscape entries are added
    /// after them with the same codes.
    pub fn from_portrait(portrait: &[(SizeSpec, &'static str)]) -> Self {
        let mut entries = portrait.to_vec();
        entries.extend(portrait.iter().map(|&(size, code)| (size.rotated(), code)));
        Self { entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[(SizeSpec, &'static str)] {
        &self.entries
    }

    /// Paper code for `size`, first match in table order.
    pub fn lookup(&self, size: SizeSpec) -> Option<&'static str> {
        self.entries
            .iter()
            .find(|(candidate, _)| candidate.approx_eq(size))
            .map(|(_, code)| *code)
    }

    /// Paper code for `size`, or `"{width}x{height}"` when it is not an ISO size.
    pub fn label_for(&self, size: SizeSpec) -> String {
        match self.lookup(size) {
            Some(code) => code.to_string(),
            None => format!("{}x{}", size.width, size.height),
        }
    }
}

/// Immutable catalog: ratio families per orientation plus the ISO label table.
///
/// Build once (see [`SizeCatalog::standard`]) and share by reference.
#[derive(Debug, Clone, PartialEq)]
pub struct SizeCatalog {
    vertical: Vec<RatioFamily>,
    horizontal: Vec<RatioFamily>,
    iso: IsoLabelTable,
}

const ISO_PORTRAIT: [(SizeSpec, &str); 6] = [
    (SizeSpec::new(5.8, 8.3), "A5"),
    (SizeSpec::new(8.3, 11.7), "A4"),
    (SizeSpec::new(11.7, 16.5), "A3"),
    (SizeSpec::new(16.5, 23.4), "A2"),
    (SizeSpec::new(23.4, 33.1), "A1"),
    (SizeSpec::new(33.1, 46.8), "A0"),
];

const PROPORTIONAL_2X3: [SizeSpec; 6] = [
    SizeSpec::new(4.0, 6.0),
    SizeSpec::new(8.0, 12.0),
    SizeSpec::new(12.0, 18.0),
    SizeSpec::new(16.0, 24.0),
    SizeSpec::new(20.0, 30.0),
    SizeSpec::new(24.0, 36.0),
];

const NEAR_SQUARE_4X5: [SizeSpec; 6] = [
    SizeSpec::new(4.0, 5.0),
    SizeSpec::new(8.0, 10.0),
    SizeSpec::new(12.0, 15.0),
    SizeSpec::new(16.0, 20.0),
    SizeSpec::new(20.0, 25.0),
    SizeSpec::new(24.0, 30.0),
];

const FIXED_11X14: SizeSpec = SizeSpec::new(11.0, 14.0);

fn rotate_all(sizes: &[SizeSpec]) -> Vec<SizeSpec> {
    sizes.iter().map(|s| s.rotated()).collect()
}

static STANDARD: LazyLock<SizeCatalog> = LazyLock::new(|| {
    let iso_portrait: Vec<SizeSpec> = ISO_PORTRAIT.iter().map(|(size, _)| *size).collect();
    let vertical = vec![
        RatioFamily::new("2:3", PROPORTIONAL_2X3.to_vec()),
        RatioFamily::new("4:5", NEAR_SQUARE_4X5.to_vec()),
        RatioFamily::new("ISO", iso_portrait.clone()),
        RatioFamily::new("11x14", vec![FIXED_11X14]),
    ];
    let horizontal = vec![
        RatioFamily::new("3:2", rotate_all(&PROPORTIONAL_2X3)),
        RatioFamily::new("5:4", rotate_all(&NEAR_SQUARE_4X5)),
        RatioFamily::new("ISO", rotate_all(&iso_portrait)),
        RatioFamily::new("14x11", vec![FIXED_11X14.rotated()]),
    ];

    SizeCatalog::new(vertical, horizontal, IsoLabelTable::from_portrait(&ISO_PORTRAIT))
});

impl SizeCatalog {
    pub fn new(
        vertical: Vec<RatioFamily>,
        horizontal: Vec<RatioFamily>,
        iso: IsoLabelTable,
    ) -> Self {
        Self {
            vertical,
            horizontal,
            iso,
        }
    }

    /// The built-in catalog, constructed on first use.
    pub fn standard() -> &'static SizeCatalog {
        &STANDARD
    }

    /// Families for the given orientation, in processing order.
    pub fn families(&self, orientation: Orientation) -> &[RatioFamily] {
        match orientation {
            Orientation::Vertical => &self.vertical,
            Orientation::Horizontal => &self.horizontal,
        }
    }

    /// Families matching a `width` × `height` source.
    pub fn select_sizes(&self, width: u32, height: u32) -> &[RatioFamily] {
        self.families(Orientation::of(width, height))
    }

    pub fn iso_labels(&self) -> &IsoLabelTable {
        &self.iso
    }

    /// Size label used in output file names.
    pub fn label_for(&self, size: SizeSpec) -> String {
        self.iso.label_for(size)
    }

    /// Number of files one source of this orientation produces.
    pub fn file_count(&self, orientation: Orientation) -> usize {
        self.families(orientation)
            .iter()
            .map(|family| family.sizes.len())
            .sum::<usize>()
            * OutputFormat::ALL.len()
    }
}

/// Shorthand for [`SizeCatalog::label_for`] on the standard catalog.
pub fn label_for(width: f64, height: f64) -> String {
    SizeCatalog::standard().label_for(SizeSpec::new(width, height))
}
