//! Well-known index ids

use std::fmt;

/// Index holding the reference tables of every other index
pub const REFERENCE_TABLE_INDEX: u8 = 255;

macro_rules! cache_indexes {
    ($($(#[$doc:meta])* $name:ident = $id:literal,)+) => {
        /// Index ids with a known purpose
        ///
        /// The mapping follows the NXT-era client; older caches reuse the low
        /// ids for different content, so names are best-effort.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        #[repr(u8)]
        pub enum CacheIndex {
            $(#[doc = concat!("Index ", stringify!($id))] $(#[$doc])* $name = $id,)+
        }

        impl CacheIndex {
            /// Look up a known index id
            pub const fn from_id(id: u8) -> Option<Self> {
                match id {
                    $($id => Some(Self::$name),)+
                    _ => None,
                }
            }

            /// Index name
            pub const fn name(self) -> &'static str {
                match self {
                    $(Self::$name => stringify!($name),)+
                }
            }
        }
    };
}

cache_indexes! {
    AnimationFrames = 0,
    AnimationFrameBases = 1,
    Config = 2,
    Interfaces = 3,
    SoundEffects = 4,
    /// Map squares, mostly encrypted
    Maps = 5,
    Music = 6,
    Models = 7,
    Sprites = 8,
    Textures = 9,
    HuffmanEncoding = 10,
    Music2 = 11,
    InterfaceScripts = 12,
    FontMetrics = 13,
    Vorbis = 14,
    Midi = 15,
    ConfigLocations = 16,
    ConfigEnums = 17,
    ConfigNpcs = 18,
    ConfigItems = 19,
    ConfigSequences = 20,
    ConfigSpotAnimations = 21,
    ConfigStructs = 22,
    WorldMap = 23,
    QuickChat = 24,
    GlobalQuickChat = 25,
    Materials = 26,
    ConfigParticles = 27,
    Defaults = 28,
    ConfigBillboards = 29,
    Dlls = 30,
    Shaders = 31,
    LoadingSprites = 32,
    LoadingScreens = 33,
    LoadingSpritesRaw = 34,
    Cutscenes = 35,
    AudioStreams = 40,
    WorldMapAreas = 41,
    WorldMapLabels = 42,
    TexturesDiffusePng = 43,
    TexturesHdrPng = 44,
    TexturesDiffuseDxt = 45,
    TexturesHdrDxt = 46,
    TexturesDiffuseEtc = 47,
    TexturesHdrEtc = 48,
    TypeFonts = 49,
    /// Reference tables, one file per index
    ReferenceTables = 255,
}

impl CacheIndex {
    /// Index id
    pub const fn id(self) -> u8 {
        self as u8
    }
}

impl fmt::Display for CacheIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
