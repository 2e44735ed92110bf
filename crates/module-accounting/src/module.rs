// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Module and stage vocabularies.

use std::fmt;

/// A named pipeline module to which time and compute are charged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize)]
pub enum Module {
    #[serde(rename = "nn_part_1")]
    NnPart1,
    #[serde(rename = "feature_reduction")]
    FeatureReduction,
    #[serde(rename = "inner_codec")]
    InnerCodec,
    #[serde(rename = "conversion")]
    Conversion,
    #[serde(rename = "feature_restoration")]
    FeatureRestoration,
    #[serde(rename = "nn_part_2")]
    NnPart2,
}

/// Modules reported for the encoder side of a codec.
pub const ENCODE_MODULES: [Module; 3] = [Module::FeatureReduction, Module::Conversion, Module::InnerCodec];

/// Modules reported for the decoder side of a codec.
pub const DECODE_MODULES: [Module; 3] = [Module::InnerCodec, Module::Conversion, Module::FeatureRestoration];

impl Module {
    pub const ALL: [Module; 6] = [
        Module::NnPart1,
        Module::FeatureReduction,
        Module::InnerCodec,
        Module::Conversion,
        Module::FeatureRestoration,
        Module::NnPart2,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Module::NnPart1 => "nn_part_1",
            Module::FeatureReduction => "feature_reduction",
            Module::InnerCodec => "inner_codec",
            Module::Conversion => "conversion",
            Module::FeatureRestoration => "feature_restoration",
            Module::NnPart2 => "nn_part_2",
        }
    }
}

impl fmt::Display for Module {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A coarse stage timed directly by the pipeline around one adapter call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize)]
pub enum Stage {
    #[serde(rename = "nn_part_1")]
    NnPart1,
    #[serde(rename = "encode")]
    Encode,
    #[serde(rename = "decode")]
    Decode,
    #[serde(rename = "nn_part_2")]
    NnPart2,
}

impl Stage {
    pub const ALL: [Stage; 4] = [Stage::NnPart1, Stage::Encode, Stage::Decode, Stage::NnPart2];

    pub fn as_str(self) -> &'static str {
        match self {
            Stage::NnPart1 => "nn_part_1",
            Stage::Encode => "encode",
            Stage::Decode => "decode",
            Stage::NnPart2 => "nn_part_2",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
