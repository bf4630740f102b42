// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Art style labels offered to the artist

use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Style {
    Watercolor,
    OilPainting,
    PencilSketch,
    Anime,
    PixelArt,
    PopArt,
    Photorealistic,
    Cartoon,
    Render3d,
    Impressionist,
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown style '{0}'")]
pub struct UnknownStyle(pub String);

impl Style {
    pub const ALL: [Style; 10] = [
        Style::Watercolor,
        Style::OilPainting,
        Style::PencilSketch,
        Style::Anime,
        Style::PixelArt,
        Style::PopArt,
        Style::Photorealistic,
        Style::Cartoon,
        Style::Render3d,
        Style::Impressionist,
    ];

    /// Display label as shown in the style picker
    pub fn label(&self) -> &'static str {
        match self {
            Style::Watercolor => "Watercolor",
            Style::OilPainting => "Oil Painting",
            Style::PencilSketch => "Pencil Sketch",
            Style::Anime => "Anime",
            Style::PixelArt => "Pixel Art",
            Style::PopArt => "Pop Art",
            Style::Photorealistic => "Photorealistic",
            Style::Cartoon => "Cartoon",
            Style::Render3d => "3D Render",
            Style::Impressionist => "Impressionist",
        }
    }

    /// Visual traits that make the style recognisable
    pub fn traits(&self) -> &'static str {
        match self {
            Style::Watercolor => "soft translucent washes, bleeding pigment edges, paper grain",
            Style::OilPainting => "thick impasto brushstrokes, rich layered color, canvas texture",
            Style::PencilSketch => "graphite linework, cross-hatched shading, monochrome tones",
            Style::Anime => "clean cel shading, bold outlines, expressive saturated color",
            Style::PixelArt => "low-resolution pixel grid, limited palette, crisp hard edges",
            Style::PopArt => "flat bold colors, halftone dots, thick black outlines",
            Style::Photorealistic => "natural lighting, realistic materials, photographic detail",
            Style::Cartoon => "simplified shapes, playful proportions, bright flat color",
            Style::Render3d => "smooth volumetric shading, global illumination, studio lighting",
            Style::Impressionist => "loose dabbed brushwork, vibrant light, soft blurred forms",
        }
    }

    /// Parse a picker label; blank means no style
    pub fn parse_optional(value: Option<&str>) -> Result<Option<Style>, UnknownStyle> {
        match value.map(str::trim) {
            None | Some("") => Ok(None),
            Some(label) => label.parse().map(Some),
        }
    }
}

/// Lowercase and drop separators so "oil-painting", "Oil Painting" and "OIL_PAINTING" agree
fn normalize(label: &str) -> String {
    label
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

impl FromStr for Style {
    type Err = UnknownStyle;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = normalize(s);
        Style::ALL
            .into_iter()
            .find(|style| normalize(style.label()) == wanted)
            .ok_or_else(|| UnknownStyle(s.trim().to_string()))
    }
}

impl fmt::Display for Style {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
